//! Map custom errors to DispatchError in handlers without writing .map_err(|e| DispatchError::Handler(Box::new(e))).

use super::error::DispatchError;

/// Convert any error to a handler fault. Use in handlers: `.map_err(IntoDispatchError::into_dispatch_error)?`.
pub trait IntoDispatchError {
    fn into_dispatch_error(self) -> DispatchError;
}

impl<E: std::error::Error + Send + Sync + 'static> IntoDispatchError for E {
    fn into_dispatch_error(self) -> DispatchError {
        DispatchError::Handler(Box::new(self))
    }
}
