//! Core: errors and registry options.

pub mod error;
pub mod into_dispatch_error;
pub mod options;

pub use error::DispatchError;
pub use into_dispatch_error::IntoDispatchError;
pub use options::{HandlerScope, RegistryOptions};
