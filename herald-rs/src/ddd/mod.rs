//! DDD: commands, queries and their handler contracts.

pub mod command_handler;
pub mod commands;

pub use command_handler::{CommandHandler, QueryHandler};
pub use commands::{Command, Query};
