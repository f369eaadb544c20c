//! Admin page registry.
//!
//! Pages register under a category (the domain) with a unique route. The
//! manager only tracks metadata and URLs; rendering belongs to whatever web
//! layer mounts the pages.

use std::sync::Arc;

use thiserror::Error;

use crate::config::AdminConfig;
use crate::registry::{DomainHandler, DomainRegistry, RegistryError};

#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("admin panel is disabled")]
    Disabled,

    #[error("route '{route}' is already taken by page '{existing}'")]
    DuplicateRoute { route: String, existing: String },

    #[error("page '{name}' has an empty route")]
    EmptyRoute { name: String },
}

/// One page of the admin panel.
pub trait AdminPage: DomainHandler {
    /// Route segment under the admin base route, without slashes.
    fn route(&self) -> &str;

    /// Title shown in listings. Defaults to the page name.
    fn title(&self) -> &str {
        self.name()
    }
}

/// Metadata snapshot for listings and the audit report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInfo {
    pub category: String,
    pub name: String,
    pub title: String,
    pub url: String,
}

pub struct AdminManager {
    pages: DomainRegistry<dyn AdminPage>,
    enabled: bool,
    base_route: String,
}

impl AdminManager {
    pub fn new(config: &AdminConfig) -> Self {
        Self {
            pages: DomainRegistry::new(),
            enabled: config.enabled,
            base_route: config.base_route.trim_end_matches('/').to_string(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Register a page; its route must be unique across all categories.
    pub fn register_page(
        &mut self,
        page: Arc<dyn AdminPage>,
        replace: bool,
    ) -> Result<(), AdminError> {
        if !self.enabled {
            return Err(AdminError::Disabled);
        }

        let route = page.route().trim();
        if route.is_empty() {
            return Err(AdminError::EmptyRoute {
                name: page.name().to_string(),
            });
        }

        let replacing_self = self
            .pages
            .get(page.domain(), page.name())
            .is_ok_and(|existing| existing.route() == route);
        if !replacing_self
            && let Some(existing) = self.page_by_route(route)
        {
            return Err(AdminError::DuplicateRoute {
                route: route.to_string(),
                existing: existing.name().to_string(),
            });
        }

        self.pages.register(page, replace)?;
        Ok(())
    }

    pub fn get_page(&self, category: &str, name: &str) -> Result<Arc<dyn AdminPage>, AdminError> {
        Ok(self.pages.get(category, name)?)
    }

    pub fn has_page(&self, category: &str, name: &str) -> bool {
        self.pages.has(category, name)
    }

    /// Pages of one category, in name order. Unknown categories list empty.
    pub fn category_pages(&self, category: &str) -> Vec<PageInfo> {
        self.pages
            .get_domain(category)
            .values()
            .map(|page| self.info(page.as_ref()))
            .collect()
    }

    /// Every page, grouped by category then name.
    pub fn list_pages(&self) -> Vec<PageInfo> {
        self.pages
            .domains()
            .flat_map(|category| self.category_pages(category))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Full URL of a page under the admin base route.
    pub fn url_for(&self, category: &str, name: &str) -> Result<String, AdminError> {
        let page = self.get_page(category, name)?;
        Ok(format!("{}/{}", self.base_route, page.route()))
    }

    fn info(&self, page: &dyn AdminPage) -> PageInfo {
        PageInfo {
            category: page.domain().to_string(),
            name: page.name().to_string(),
            title: page.title().to_string(),
            url: format!("{}/{}", self.base_route, page.route()),
        }
    }

    fn page_by_route(&self, route: &str) -> Option<&Arc<dyn AdminPage>> {
        self.pages
            .handlers()
            .find(|page| page.route().trim() == route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Handler;

    struct Page {
        category: &'static str,
        name: &'static str,
        route: &'static str,
    }

    impl Handler for Page {
        fn name(&self) -> &str {
            self.name
        }
    }

    impl DomainHandler for Page {
        fn domain(&self) -> &str {
            self.category
        }
    }

    impl AdminPage for Page {
        fn route(&self) -> &str {
            self.route
        }
    }

    fn page(category: &'static str, name: &'static str, route: &'static str) -> Arc<Page> {
        Arc::new(Page {
            category,
            name,
            route,
        })
    }

    fn manager() -> AdminManager {
        AdminManager::new(&AdminConfig::default())
    }

    #[test]
    fn register_and_resolve_url() {
        let mut admin = manager();
        admin.register_page(page("security", "users", "users"), false).unwrap();

        assert!(admin.has_page("security", "users"));
        assert_eq!(admin.url_for("security", "users").unwrap(), "/admin/users");
    }

    #[test]
    fn duplicate_route_rejected_across_categories() {
        let mut admin = manager();
        admin.register_page(page("security", "users", "users"), false).unwrap();

        let err = admin
            .register_page(page("billing", "accounts", "users"), false)
            .unwrap_err();
        assert!(matches!(err, AdminError::DuplicateRoute { .. }));
    }

    #[test]
    fn duplicate_route_detected_despite_padding() {
        let mut admin = manager();
        admin
            .register_page(page("security", "users", " users "), false)
            .unwrap();

        let err = admin
            .register_page(page("billing", "accounts", "users"), false)
            .unwrap_err();
        assert!(matches!(err, AdminError::DuplicateRoute { ref existing, .. } if existing == "users"));
    }

    #[test]
    fn replace_keeps_the_route_usable() {
        let mut admin = manager();
        admin.register_page(page("security", "users", "users"), false).unwrap();
        admin.register_page(page("security", "users", "users"), true).unwrap();

        assert_eq!(admin.len(), 1);
    }

    #[test]
    fn empty_route_rejected() {
        let mut admin = manager();
        let err = admin
            .register_page(page("security", "users", "  "), false)
            .unwrap_err();
        assert!(matches!(err, AdminError::EmptyRoute { .. }));
    }

    #[test]
    fn disabled_panel_refuses_pages() {
        let mut admin = AdminManager::new(&AdminConfig {
            enabled: false,
            ..AdminConfig::default()
        });
        let err = admin
            .register_page(page("security", "users", "users"), false)
            .unwrap_err();
        assert!(matches!(err, AdminError::Disabled));
    }

    #[test]
    fn listing_groups_by_category_then_name() {
        let mut admin = manager();
        admin.register_page(page("security", "users", "users"), false).unwrap();
        admin.register_page(page("billing", "invoices", "invoices"), false).unwrap();
        admin.register_page(page("billing", "accounts", "accounts"), false).unwrap();

        let names: Vec<_> = admin
            .list_pages()
            .into_iter()
            .map(|info| (info.category, info.name))
            .collect();
        assert_eq!(
            names,
            vec![
                ("billing".to_string(), "accounts".to_string()),
                ("billing".to_string(), "invoices".to_string()),
                ("security".to_string(), "users".to_string()),
            ]
        );
    }
}
