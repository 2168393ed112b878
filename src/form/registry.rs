pub const DEFAULT_FIELD_COUNT: usize = 5;
pub const MAX_FIELDS: usize = 15;

pub const ADD_FIELD_LABEL: &str = "Add field";
pub const CAPACITY_REACHED_LABEL: &str = "Maximum of 15 fields reached";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("cannot add more than {MAX_FIELDS} fields")]
    CapacityReached,
}

/// The ordered set of field names shown by the form.
///
/// Names are synthesized from the current count (`field 1`, `field 2`, ...).
/// The registry only grows, so a synthesized name can never collide with an
/// existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRegistry {
    names: Vec<String>,
}

impl Default for FieldRegistry {
    fn default() -> Self {
        let mut registry = Self { names: Vec::new() };
        for _ in 0..DEFAULT_FIELD_COUNT {
            registry.names.push(registry.next_name());
        }
        registry
    }
}

impl FieldRegistry {
    /// Builds a registry from explicit names, skipping duplicates and anything
    /// past the capacity.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Self { names: Vec::new() };
        for name in names {
            let name = name.into();
            if registry.is_full() {
                break;
            }
            if !registry.contains(&name) {
                registry.names.push(name);
            }
        }
        registry
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|existing| existing == name)
    }

    pub fn is_full(&self) -> bool {
        self.names.len() >= MAX_FIELDS
    }

    pub fn can_add(&self) -> bool {
        !self.is_full()
    }

    /// Label of the add-field control; switches to the capacity message once
    /// the registry is full.
    pub fn add_label(&self) -> &'static str {
        if self.is_full() {
            CAPACITY_REACHED_LABEL
        } else {
            ADD_FIELD_LABEL
        }
    }

    pub fn add(&mut self) -> Result<&str, FieldError> {
        if self.is_full() {
            return Err(FieldError::CapacityReached);
        }
        let mut name = self.next_name();
        // Only reachable for registries built with `from_names`.
        let mut suffix = self.names.len() + 1;
        while self.contains(&name) {
            suffix += 1;
            name = format!("field {suffix}");
        }
        self.names.push(name);
        Ok(self.names[self.names.len() - 1].as_str())
    }

    fn next_name(&self) -> String {
        format!("field {}", self.names.len() + 1)
    }
}
