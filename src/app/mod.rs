//! Application kernel.
//!
//! An [`Application`] owns the configuration and every manager as a typed
//! field; nothing lives in ambient globals and nothing is looked up by
//! string at call sites. It is assembled through [`ApplicationBuilder`],
//! which couples each [`Unit`] with an installer closure and drives the
//! whole set through the dependency-ordered [`Loader`].

pub mod hooks;

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::admin::AdminManager;
use crate::config::{Config, ConfigError};
use crate::datetime::{DateTimeError, DateTimeService};
use crate::loading::{LoadError, Loader, Unit, UnitHost};
use crate::observability::Metrics;
use crate::security::hashing::{HashingError, HashingManager};
use crate::security::session::Session;
use crate::security::token::{TokenError, TokenManager};
use crate::validator::ValidatorManager;

use hooks::AppHook;

/// Lifecycle phase of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppStatus {
    Initializing,
    Loading,
    Ready,
    Running,
    Terminated,
}

impl AppStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Running => "running",
            Self::Terminated => "terminated",
        }
    }
}

impl fmt::Display for AppStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    DateTime(#[from] DateTimeError),

    #[error(transparent)]
    Hashing(#[from] HashingError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("hook '{hook}' rejected startup: {reason}")]
    Hook { hook: String, reason: String },

    #[error("cannot move from status '{from}' to '{to}'")]
    InvalidTransition { from: AppStatus, to: AppStatus },
}

/// Error raised by a unit installer, surfaced through
/// [`LoadError::UnitFailed`].
#[derive(Debug, Error)]
#[error("{0}")]
pub struct InstallError(String);

impl InstallError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A unit installer: mutates the application under construction, typically
/// registering handlers into one of its managers.
pub type Installer = Box<dyn FnOnce(&mut Application) -> Result<(), Box<dyn Error + Send + Sync>>>;

/// The assembled application.
pub struct Application {
    config: Config,
    status: AppStatus,
    hashing: HashingManager,
    token: TokenManager,
    validator: ValidatorManager,
    admin: AdminManager,
    datetime: DateTimeService,
    metrics: Arc<Metrics>,
    load_order: Vec<String>,
    hooks: Vec<Arc<dyn AppHook>>,
}

impl Application {
    fn initialize(config: Config, hooks: Vec<Arc<dyn AppHook>>) -> Result<Self, AppError> {
        let datetime = DateTimeService::new(&config.app.timezone)?;
        let metrics = Arc::new(Metrics::new());
        Ok(Self {
            status: AppStatus::Initializing,
            hashing: HashingManager::new(&config.security.hashing)?,
            token: TokenManager::new(&config.security.token, metrics.clone())?,
            validator: ValidatorManager::new(&config.validator, metrics.clone()),
            admin: AdminManager::new(&config.admin),
            datetime,
            metrics,
            load_order: Vec::new(),
            hooks,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn status(&self) -> AppStatus {
        self.status
    }

    /// Units in the order they were loaded, reserved units included.
    pub fn load_order(&self) -> &[String] {
        &self.load_order
    }

    pub fn hashing(&self) -> &HashingManager {
        &self.hashing
    }

    pub fn hashing_mut(&mut self) -> &mut HashingManager {
        &mut self.hashing
    }

    pub fn token(&self) -> &TokenManager {
        &self.token
    }

    pub fn token_mut(&mut self) -> &mut TokenManager {
        &mut self.token
    }

    pub fn validator(&self) -> &ValidatorManager {
        &self.validator
    }

    pub fn validator_mut(&mut self) -> &mut ValidatorManager {
        &mut self.validator
    }

    pub fn admin(&self) -> &AdminManager {
        &self.admin
    }

    pub fn admin_mut(&mut self) -> &mut AdminManager {
        &mut self.admin
    }

    pub fn datetime(&self) -> &DateTimeService {
        &self.datetime
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Session for a request carrying a token: the payload is verified and
    /// checked against the blacklist before the session is built.
    pub fn session_from_token(&self, token: &str) -> Result<Session, TokenError> {
        let payload = self.token.get_payload(token)?;
        Ok(Session::with_payload(payload))
    }

    /// Session for an anonymous request.
    pub fn anonymous_session(&self) -> Session {
        Session::new()
    }

    /// Move a booted application into service.
    pub fn start(&mut self) -> Result<(), AppError> {
        if self.status != AppStatus::Ready {
            return Err(AppError::InvalidTransition {
                from: self.status,
                to: AppStatus::Running,
            });
        }
        self.set_status(AppStatus::Running);
        Ok(())
    }

    /// Final state; idempotent.
    pub fn terminate(&mut self) {
        if self.status != AppStatus::Terminated {
            self.set_status(AppStatus::Terminated);
        }
    }

    fn set_status(&mut self, status: AppStatus) {
        let previous = self.status;
        self.status = status;
        tracing::info!(from = %previous, to = %status, "Application status changed");
        for hook in &self.hooks {
            hook.on_status_change(previous, status);
        }
    }

    fn fire_after_loaded(&self) -> Result<(), AppError> {
        for hook in &self.hooks {
            hook.after_loaded(&self.load_order)
                .map_err(|reason| AppError::Hook {
                    hook: hook.name().to_string(),
                    reason,
                })?;
        }
        Ok(())
    }

    fn fire_on_ready(&self) -> Result<(), AppError> {
        for hook in &self.hooks {
            hook.on_ready().map_err(|reason| AppError::Hook {
                hook: hook.name().to_string(),
                reason,
            })?;
        }
        Ok(())
    }
}

/// Runs installers against the application as the loader walks the order.
struct BootHost<'a> {
    app: &'a mut Application,
    installers: BTreeMap<String, Installer>,
}

impl UnitHost for BootHost<'_> {
    type Error = InstallError;

    fn load(&mut self, unit: &str) -> Result<(), Self::Error> {
        // reserved units carry no installer
        if let Some(installer) = self.installers.remove(unit) {
            installer(self.app).map_err(|source| InstallError(source.to_string()))?;
        }
        Ok(())
    }

    fn loaded(&mut self, unit: &str) -> Result<(), Self::Error> {
        let _ = unit;
        self.app.metrics.unit_loaded();
        Ok(())
    }
}

/// Collects configuration, units, and hooks, then boots the application.
#[derive(Default)]
pub struct ApplicationBuilder {
    config: Option<Config>,
    config_path: Option<PathBuf>,
    units: Vec<Unit>,
    installers: BTreeMap<String, Installer>,
    hooks: Vec<Arc<dyn AppHook>>,
}

impl ApplicationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an already-built configuration instead of loading one.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Load configuration from an explicit file path.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Declare a unit along with the installer that realizes it.
    pub fn unit<F>(mut self, unit: Unit, installer: F) -> Self
    where
        F: FnOnce(&mut Application) -> Result<(), Box<dyn Error + Send + Sync>> + 'static,
    {
        self.installers
            .insert(unit.name.clone(), Box::new(installer));
        self.units.push(unit);
        self
    }

    pub fn hook(mut self, hook: Arc<dyn AppHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Boot the application: load configuration, order the units, run every
    /// installer in dependency order, and fire lifecycle hooks.
    ///
    /// Any failure is fatal; a partially loaded application is never
    /// returned.
    pub fn boot(self) -> Result<Application, AppError> {
        let config = match (self.config, &self.config_path) {
            // programmatic configs have not been through `Config::load`
            (Some(config), _) => {
                config.validate()?;
                config
            }
            (None, Some(path)) => Config::load_from_path(path.clone())?,
            (None, None) => Config::load()?,
        };

        tracing::info!(
            app = %config.app.name,
            environment = %config.app.environment,
            units = self.units.len(),
            "Booting application"
        );

        let mut app = Application::initialize(config, self.hooks)?;
        app.set_status(AppStatus::Loading);

        let loader = Loader::new(self.units);
        let mut host = BootHost {
            app: &mut app,
            installers: self.installers,
        };
        let order = loader.run(&mut host)?;

        app.load_order = order;
        let registered =
            app.hashing.len() + app.token.len() + app.validator.len() + app.admin.len();
        app.metrics.handlers_registered(registered as u64);
        app.fire_after_loaded()?;
        app.set_status(AppStatus::Ready);
        app.fire_on_ready()?;

        tracing::info!(units = app.load_order.len(), "Application ready");
        Ok(app)
    }
}
