//! Rewrite options: which interface opts a type in, which helper gets
//! called, how storage fields are named.
use std::path::Path;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, LoadError};

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

pub const DEFAULT_INTERFACE: &str = "System.ComponentModel.INotifyPropertyChanged";
pub const DEFAULT_HELPER: &str = "OnPropertyChanged";
pub const DEFAULT_STORAGE_PREFIX: &str = "__pc_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Protocol {
    /// Fully-qualified name of the marker interface.
    pub interface: String,
    /// Helper method name looked up through the inheritance chain.
    pub helper: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RewriteOptions {
    pub protocol: Protocol,
    pub storage_prefix: String,
    /// Process compilation units on the rayon pool.
    pub parallel: bool,
}

impl Default for Protocol {
    fn default() -> Self {
        Self {
            interface: DEFAULT_INTERFACE.to_string(),
            helper: DEFAULT_HELPER.to_string(),
        }
    }
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            protocol: Protocol::default(),
            storage_prefix: DEFAULT_STORAGE_PREFIX.to_string(),
            parallel: true,
        }
    }
}

impl RewriteOptions {
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        crate::path_de::read_json_file(path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.protocol.interface.trim().is_empty() {
            return Err(ConfigError::EmptyInterface);
        }
        if !is_identifier(&self.protocol.helper) {
            return Err(ConfigError::InvalidHelper(self.protocol.helper.clone()));
        }
        if !is_identifier(&self.storage_prefix) {
            return Err(ConfigError::InvalidStoragePrefix(self.storage_prefix.clone()));
        }
        Ok(())
    }
}

pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}
