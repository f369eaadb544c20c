/// Reserved unit loaded before everything else.
pub const CORE_UNIT: &str = "core";

/// Reserved unit loaded right after [`CORE_UNIT`].
pub const BOOTSTRAP_UNIT: &str = "bootstrap";

/// Reserved units in their fixed load positions.
pub const RESERVED_UNITS: [&str; 2] = [CORE_UNIT, BOOTSTRAP_UNIT];

/// A loadable unit and its declared prerequisites.
///
/// Dependencies on the reserved units are implicit and must not be declared;
/// the loader rejects a `depends` list naming them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    pub name: String,
    pub depends: Vec<String>,
}

impl Unit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            depends: Vec::new(),
        }
    }

    pub fn depends_on(mut self, unit: impl Into<String>) -> Self {
        self.depends.push(unit.into());
        self
    }

    pub fn is_reserved(&self) -> bool {
        RESERVED_UNITS.contains(&self.name.as_str())
    }
}
