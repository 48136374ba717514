#![forbid(unsafe_code)]

//! Page composition.
//!
//! A [`Page`] is a [`LifecycleHost`] plus optional capabilities. Breadcrumb
//! registration runs once, after the host has attached its subscriptions.
//! A page with a provider but no crumbs still registers: the provider gets
//! `None` and drops whatever trail the previous page left.

use std::fmt;
use std::rc::Rc;

use crate::breadcrumbs::{Breadcrumb, BreadcrumbsProvider};
use crate::config::{Capabilities, PageConfig};
use crate::error::BoxError;
use crate::lifecycle::{LifecycleHost, LifecycleHostBuilder};

/// A page: lifecycle host plus composed capabilities.
pub struct Page {
    host: LifecycleHost,
    capabilities: Capabilities,
    provider: Option<Rc<dyn BreadcrumbsProvider>>,
    crumbs: Option<Vec<Breadcrumb>>,
    registered: bool,
}

impl Page {
    /// Build a page from a host builder and a page config. The config's
    /// lifecycle section replaces whatever the builder carried.
    #[must_use]
    pub fn new(host: LifecycleHostBuilder, config: PageConfig) -> Self {
        Self {
            host: host.config(config.lifecycle).build(),
            capabilities: config.capabilities,
            provider: None,
            crumbs: None,
            registered: false,
        }
    }

    /// Report this page's crumbs, or their absence, to `provider` on first
    /// initialization.
    #[must_use]
    pub fn with_breadcrumbs_provider(mut self, provider: Rc<dyn BreadcrumbsProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Register `crumbs` with `provider` on first initialization.
    #[must_use]
    pub fn with_breadcrumbs(
        mut self,
        provider: Rc<dyn BreadcrumbsProvider>,
        crumbs: Vec<Breadcrumb>,
    ) -> Self {
        self.crumbs = Some(crumbs);
        self.with_breadcrumbs_provider(provider)
    }

    /// Attach lifecycle subscriptions, then register breadcrumbs once.
    /// Returns the number of subscriptions attached by this call.
    pub fn initialize(&mut self) -> usize {
        let attached = self.host.initialize();
        if self.host.is_disposed() || self.registered || !self.capabilities.breadcrumbs {
            return attached;
        }
        if let Some(provider) = &self.provider {
            provider.initialize(self.crumbs.as_deref());
            self.registered = true;
            tracing::debug!(
                count = self.crumbs.as_ref().map_or(0, Vec::len),
                "page breadcrumbs registered"
            );
        }
        attached
    }

    /// Run the initial data load.
    pub async fn initialize_async(&self) -> Result<(), BoxError> {
        self.host.initialize_async().await
    }

    #[must_use]
    pub fn host(&self) -> &LifecycleHost {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut LifecycleHost {
        &mut self.host
    }

    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    #[must_use]
    pub fn breadcrumbs_registered(&self) -> bool {
        self.registered
    }

    pub fn dispose(&mut self) {
        self.host.dispose();
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("host", &self.host)
            .field("capabilities", &self.capabilities)
            .field("breadcrumbs_registered", &self.registered)
            .finish_non_exhaustive()
    }
}
