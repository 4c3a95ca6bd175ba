//! Command and Query message traits. Derive them with `#[derive(Command)]` / `#[derive(Query)]`.

use herald_core::{Open, Specialization};

use crate::ddd::command_handler::{CommandHandler, QueryHandler};

/// Command: fire-and-forget intent; identity is the Rust type.
pub trait Command: Send + Sync + 'static {
    /// Open-generic handler definition servicing this command when no closed handler is registered.
    /// See [`crate::open_command_handler`].
    fn open_handler() -> Option<Specialization<dyn CommandHandler<Self>>>
    where
        Self: Sized,
    {
        None
    }
}

/// Query: intent that returns `Result`.
pub trait Query: Send + Sync + 'static {
    type Result: Send + 'static;

    /// Open-generic handler definition servicing this query when no closed handler is registered.
    fn open_handler() -> Option<Specialization<dyn QueryHandler<Self>>>
    where
        Self: Sized,
    {
        None
    }
}

// `Open` stands in for the message argument when naming the open handler contracts.
impl Command for Open {}

impl Query for Open {
    type Result = ();
}
