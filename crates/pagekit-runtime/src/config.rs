#![forbid(unsafe_code)]

//! Static page configuration.
//!
//! A page declares which external notifiers it tracks and which optional
//! capabilities it carries. Configuration is built in code; with the
//! `policy-config` feature it can also be loaded from TOML or JSON:
//!
//! ```toml
//! [lifecycle]
//! culture = true
//! workspace = false
//! catalog = true
//!
//! [capabilities]
//! breadcrumbs = true
//! ```
//!
//! Missing keys take their defaults (everything enabled).

use crate::notifier::NotifierKind;

/// Which notifiers [`LifecycleHost`](crate::lifecycle::LifecycleHost)
/// subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "policy-config", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct LifecycleConfig {
    /// Re-render on culture changes.
    pub culture: bool,
    /// Reload and re-render on workspace changes.
    pub workspace: bool,
    /// Reload and re-render on catalog changes.
    pub catalog: bool,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            culture: true,
            workspace: true,
            catalog: true,
        }
    }
}

impl LifecycleConfig {
    /// A config that tracks nothing.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            culture: false,
            workspace: false,
            catalog: false,
        }
    }

    #[must_use]
    pub fn with(mut self, kind: NotifierKind, enabled: bool) -> Self {
        match kind {
            NotifierKind::Culture => self.culture = enabled,
            NotifierKind::Workspace => self.workspace = enabled,
            NotifierKind::Catalog => self.catalog = enabled,
        }
        self
    }

    #[must_use]
    pub const fn tracks(&self, kind: NotifierKind) -> bool {
        match kind {
            NotifierKind::Culture => self.culture,
            NotifierKind::Workspace => self.workspace,
            NotifierKind::Catalog => self.catalog,
        }
    }
}

/// Optional capabilities composed into a [`Page`](crate::page::Page).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "policy-config", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct Capabilities {
    /// Register breadcrumbs after lifecycle initialization.
    pub breadcrumbs: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self { breadcrumbs: true }
    }
}

/// Full page configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "policy-config", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct PageConfig {
    pub lifecycle: LifecycleConfig,
    pub capabilities: Capabilities,
}

#[cfg(feature = "policy-config")]
impl PageConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, crate::error::ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Parse a JSON document.
    pub fn from_json_str(text: &str) -> Result<Self, crate::error::ConfigError> {
        Ok(serde_json::from_str(text)?)
    }
}
