//! Class and method identity types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of one method body: owning class, method name and descriptor.
///
/// Used as the key for per-method instruction streams and as the fatal-error
/// context whenever analysis has to abort. Class names use internal form
/// (`com/example/Foo`); descriptors use the compiled form (`(I)V`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MethodLocation {
    class: String,
    method: String,
    descriptor: String,
}

impl MethodLocation {
    /// Create a new method location.
    pub fn new(
        class: impl Into<String>,
        method: impl Into<String>,
        descriptor: impl Into<String>,
    ) -> Self {
        Self {
            class: class.into(),
            method: method.into(),
            descriptor: descriptor.into(),
        }
    }

    /// Internal name of the owning class.
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Method name.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Method descriptor.
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }
}

impl fmt::Display for MethodLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}{}", self.class, self.method, self.descriptor)
    }
}
