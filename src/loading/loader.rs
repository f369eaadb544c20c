use std::collections::HashSet;
use std::error::Error;
use thiserror::Error;

use super::unit::{RESERVED_UNITS, Unit};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unit '{name}' is declared more than once")]
    DuplicateUnit { name: String },

    #[error("unit '{name}' shadows a reserved unit")]
    ReservedName { name: String },

    #[error("unit '{unit}' depends on undeclared unit '{dependency}'")]
    UnknownDependency { unit: String, dependency: String },

    #[error(
        "unit '{unit}' declares a dependency on reserved unit '{dependency}'; \
         reserved units are always loaded first and must not be declared"
    )]
    ReservedDependency { unit: String, dependency: String },

    #[error("cyclic dependency among units: {}", members.join(", "))]
    Cycle { members: Vec<String> },

    #[error("unit '{unit}' failed to load")]
    UnitFailed {
        unit: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

/// Load-side collaborator supplied by the hosting application.
///
/// For every unit, in the computed order, the loader calls `load` and then
/// `loaded`, each exactly once, synchronously, with the previous unit fully
/// finished before the next starts. Either callback failing aborts the
/// whole sequence; startup failures are fatal and never retried.
pub trait UnitHost {
    type Error: Error + Send + Sync + 'static;

    fn load(&mut self, unit: &str) -> Result<(), Self::Error>;

    fn loaded(&mut self, unit: &str) -> Result<(), Self::Error> {
        let _ = unit;
        Ok(())
    }
}

/// Computes a dependency-respecting load order over a set of units and
/// drives a [`UnitHost`] through it.
pub struct Loader {
    units: Vec<Unit>,
}

impl Loader {
    pub fn new(units: Vec<Unit>) -> Self {
        Self { units }
    }

    /// Compute the total load order, reserved units first.
    ///
    /// Ordering is deterministic: among units whose dependencies are all
    /// placed, declaration order decides. A cycle is reported with the whole
    /// unresolved subset so the offending edges can be found in one pass.
    pub fn order(&self) -> Result<Vec<String>, LoadError> {
        self.check_declarations()?;

        let mut placed: HashSet<&str> = RESERVED_UNITS.iter().copied().collect();
        let mut order: Vec<String> = RESERVED_UNITS.iter().map(|u| u.to_string()).collect();

        let mut remaining: Vec<&Unit> = self.units.iter().collect();
        while !remaining.is_empty() {
            let ready = remaining.iter().position(|unit| {
                unit.depends
                    .iter()
                    .all(|dep| placed.contains(dep.as_str()))
            });

            match ready {
                Some(index) => {
                    let unit = remaining.remove(index);
                    placed.insert(unit.name.as_str());
                    order.push(unit.name.clone());
                }
                None => {
                    return Err(LoadError::Cycle {
                        members: remaining.iter().map(|u| u.name.clone()).collect(),
                    });
                }
            }
        }

        Ok(order)
    }

    /// Compute the order and run the host through it.
    ///
    /// Returns the order actually loaded. Nothing is loaded when ordering
    /// fails, so units inside a cyclic subset never observe a partial load.
    pub fn run<H: UnitHost>(&self, host: &mut H) -> Result<Vec<String>, LoadError> {
        let order = self.order()?;

        for unit in &order {
            tracing::info!(unit, "Loading unit");
            host.load(unit).map_err(|source| LoadError::UnitFailed {
                unit: unit.clone(),
                source: Box::new(source),
            })?;
            host.loaded(unit).map_err(|source| LoadError::UnitFailed {
                unit: unit.clone(),
                source: Box::new(source),
            })?;
            tracing::debug!(unit, "Unit loaded");
        }

        Ok(order)
    }

    fn check_declarations(&self) -> Result<(), LoadError> {
        let mut names: HashSet<&str> = HashSet::new();
        for unit in &self.units {
            if unit.is_reserved() {
                return Err(LoadError::ReservedName {
                    name: unit.name.clone(),
                });
            }
            if !names.insert(unit.name.as_str()) {
                return Err(LoadError::DuplicateUnit {
                    name: unit.name.clone(),
                });
            }
        }

        for unit in &self.units {
            for dep in &unit.depends {
                if RESERVED_UNITS.contains(&dep.as_str()) {
                    return Err(LoadError::ReservedDependency {
                        unit: unit.name.clone(),
                        dependency: dep.clone(),
                    });
                }
                if !names.contains(dep.as_str()) {
                    return Err(LoadError::UnknownDependency {
                        unit: unit.name.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    #[derive(Default)]
    struct Recorder {
        loads: Vec<String>,
        notifications: Vec<String>,
    }

    impl UnitHost for Recorder {
        type Error = Infallible;

        fn load(&mut self, unit: &str) -> Result<(), Self::Error> {
            self.loads.push(unit.to_string());
            Ok(())
        }

        fn loaded(&mut self, unit: &str) -> Result<(), Self::Error> {
            self.notifications.push(unit.to_string());
            Ok(())
        }
    }

    #[test]
    fn reserved_units_come_first() {
        let loader = Loader::new(vec![
            Unit::new("db"),
            Unit::new("api").depends_on("db"),
        ]);

        let order = loader.order().unwrap();
        assert_eq!(order, vec!["core", "bootstrap", "db", "api"]);
    }

    #[test]
    fn declaration_order_breaks_ties() {
        // no edges at all: declaration order must be preserved exactly
        let loader = Loader::new(vec![
            Unit::new("gamma"),
            Unit::new("alpha"),
            Unit::new("beta"),
        ]);

        let order = loader.order().unwrap();
        assert_eq!(order, vec!["core", "bootstrap", "gamma", "alpha", "beta"]);
    }

    #[test]
    fn order_is_deterministic_across_runs() {
        let units = vec![
            Unit::new("logging"),
            Unit::new("db").depends_on("logging"),
            Unit::new("cache").depends_on("logging"),
            Unit::new("api").depends_on("db").depends_on("cache"),
        ];

        let first = Loader::new(units.clone()).order().unwrap();
        let second = Loader::new(units).order().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn dependency_always_precedes_dependent() {
        let loader = Loader::new(vec![
            Unit::new("api").depends_on("db"),
            Unit::new("db").depends_on("logging"),
            Unit::new("logging"),
        ]);

        let order = loader.order().unwrap();
        let pos = |name: &str| order.iter().position(|u| u == name).unwrap();
        assert!(pos("logging") < pos("db"));
        assert!(pos("db") < pos("api"));
    }

    #[test]
    fn cycle_reports_whole_subset_and_loads_nothing() {
        let loader = Loader::new(vec![
            Unit::new("standalone"),
            Unit::new("a").depends_on("b"),
            Unit::new("b").depends_on("a"),
        ]);

        let mut host = Recorder::default();
        let err = loader.run(&mut host).unwrap_err();

        match err {
            LoadError::Cycle { members } => {
                assert_eq!(members, vec!["a", "b"]);
            }
            other => panic!("expected cycle, got {other:?}"),
        }
        assert!(host.loads.is_empty());
    }

    #[test]
    fn unknown_dependency_rejected() {
        let loader = Loader::new(vec![Unit::new("api").depends_on("ghost")]);
        let err = loader.order().unwrap_err();
        assert!(matches!(err, LoadError::UnknownDependency { .. }));
    }

    #[test]
    fn reserved_dependency_rejected() {
        let loader = Loader::new(vec![Unit::new("api").depends_on("core")]);
        let err = loader.order().unwrap_err();
        assert!(matches!(err, LoadError::ReservedDependency { .. }));
    }

    #[test]
    fn duplicate_unit_rejected() {
        let loader = Loader::new(vec![Unit::new("db"), Unit::new("db")]);
        let err = loader.order().unwrap_err();
        assert!(matches!(err, LoadError::DuplicateUnit { .. }));
    }

    #[test]
    fn shadowing_reserved_unit_rejected() {
        let loader = Loader::new(vec![Unit::new("bootstrap")]);
        let err = loader.order().unwrap_err();
        assert!(matches!(err, LoadError::ReservedName { .. }));
    }

    #[test]
    fn host_called_once_per_unit_in_order() {
        let loader = Loader::new(vec![
            Unit::new("db"),
            Unit::new("api").depends_on("db"),
        ]);

        let mut host = Recorder::default();
        let order = loader.run(&mut host).unwrap();

        assert_eq!(host.loads, order);
        assert_eq!(host.notifications, order);
    }

    #[derive(Debug, Error)]
    #[error("refused")]
    struct Refusal;

    struct FailingHost {
        fail_on: &'static str,
        loads: Vec<String>,
    }

    impl UnitHost for FailingHost {
        type Error = Refusal;

        fn load(&mut self, unit: &str) -> Result<(), Self::Error> {
            if unit == self.fail_on {
                return Err(Refusal);
            }
            self.loads.push(unit.to_string());
            Ok(())
        }
    }

    #[test]
    fn load_failure_aborts_sequence() {
        let loader = Loader::new(vec![
            Unit::new("db"),
            Unit::new("api").depends_on("db"),
        ]);

        let mut host = FailingHost {
            fail_on: "db",
            loads: Vec::new(),
        };
        let err = loader.run(&mut host).unwrap_err();

        assert!(matches!(err, LoadError::UnitFailed { ref unit, .. } if unit == "db"));
        // only the reserved units before the failure were loaded
        assert_eq!(host.loads, vec!["core", "bootstrap"]);
    }
}
