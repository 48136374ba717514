#![forbid(unsafe_code)]

//! Breadcrumb navigation.

use std::fmt;

use crate::reactive::Observable;

/// One navigation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breadcrumb {
    pub key: String,
    pub label: String,
    /// Route template the crumb links to, if any.
    pub template: Option<String>,
}

impl Breadcrumb {
    #[must_use]
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            template: None,
        }
    }

    #[must_use]
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// The root crumb every workspace page starts from.
    #[must_use]
    pub fn workspace() -> Self {
        Self::new("Workspace", "Workspace").with_template("workspace")
    }
}

impl fmt::Display for Breadcrumb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Receives the page's breadcrumbs.
pub trait BreadcrumbsProvider {
    /// Register `crumbs`, or clear the trail when `None`.
    fn initialize(&self, crumbs: Option<&[Breadcrumb]>);
}

/// Observable breadcrumb trail, usable as a [`BreadcrumbsProvider`].
#[derive(Debug, Clone, Default)]
pub struct BreadcrumbTrail {
    crumbs: Observable<Vec<Breadcrumb>>,
}

impl BreadcrumbTrail {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn crumbs(&self) -> Vec<Breadcrumb> {
        self.crumbs.get()
    }

    /// The underlying observable, for navigation components to watch.
    #[must_use]
    pub fn observable(&self) -> &Observable<Vec<Breadcrumb>> {
        &self.crumbs
    }

    /// `"Workspace / Orders / Edit"`.
    #[must_use]
    pub fn path(&self) -> String {
        self.crumbs.with(|crumbs| {
            crumbs
                .iter()
                .map(|c| c.label.as_str())
                .collect::<Vec<_>>()
                .join(" / ")
        })
    }
}

impl BreadcrumbsProvider for BreadcrumbTrail {
    fn initialize(&self, crumbs: Option<&[Breadcrumb]>) {
        tracing::trace!(count = crumbs.map_or(0, <[_]>::len), "breadcrumbs registered");
        self.crumbs.set(crumbs.map(<[_]>::to_vec).unwrap_or_default());
    }
}
