#![forbid(unsafe_code)]

//! Re-render requests.

use std::cell::Cell;
use std::rc::Rc;

/// Cloneable handle that asks the hosting framework to re-render a page.
///
/// Every clone shares one suppression flag. Once the owning page is
/// disposed the flag is set and all later requests are dropped, including
/// requests from refreshes that were still in flight at disposal.
#[derive(Clone)]
pub struct RenderHandle {
    request: Rc<dyn Fn()>,
    suppressed: Rc<Cell<bool>>,
    requested: Rc<Cell<u64>>,
}

impl RenderHandle {
    /// Forward render requests to `request`.
    pub fn new(request: impl Fn() + 'static) -> Self {
        Self {
            request: Rc::new(request),
            suppressed: Rc::new(Cell::new(false)),
            requested: Rc::new(Cell::new(0)),
        }
    }

    /// A handle that only counts requests.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(|| {})
    }

    /// Ask for a re-render. Returns `false` when suppressed.
    pub fn request(&self) -> bool {
        if self.suppressed.get() {
            tracing::trace!("render request suppressed after dispose");
            return false;
        }
        self.requested.set(self.requested.get() + 1);
        (self.request)();
        true
    }

    /// Drop all future requests from every clone of this handle.
    pub fn suppress(&self) {
        self.suppressed.set(true);
    }

    #[must_use]
    pub fn is_suppressed(&self) -> bool {
        self.suppressed.get()
    }

    /// Number of requests forwarded so far.
    #[must_use]
    pub fn request_count(&self) -> u64 {
        self.requested.get()
    }
}

impl std::fmt::Debug for RenderHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderHandle")
            .field("suppressed", &self.suppressed.get())
            .field("requested", &self.requested.get())
            .finish()
    }
}
