//! Sub-applications.
//!
//! An [`App`] is a bundle of middleware built elsewhere and mounted on a
//! virtual host as one unit. Its functions run in the order they were added.

use super::func::{HandlerFn, IntoHandlerFn};

#[derive(Debug, Clone, Default)]
pub struct App {
    middleware: Vec<HandlerFn>,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a middleware function.
    pub fn with<F, M>(mut self, f: F) -> Self
    where
        F: IntoHandlerFn<M>,
    {
        self.push(f);
        self
    }

    /// Append a middleware function in place.
    pub fn push<F, M>(&mut self, f: F) -> &mut Self
    where
        F: IntoHandlerFn<M>,
    {
        self.middleware.push(f.into_handler_fn());
        self
    }

    pub fn middleware(&self) -> &[HandlerFn] {
        &self.middleware
    }

    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }

    pub(crate) fn into_middleware(self) -> Vec<HandlerFn> {
        self.middleware
    }
}
