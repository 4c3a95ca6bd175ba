//! Registry options: lifetime of handlers/executors and per-invocation handler scopes.

use herald_core::Lifetime;
use serde::{Deserialize, Serialize};

/// Where a handler runs relative to the scope its executor was resolved from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerScope {
    /// Resolve and run in the executor's scope.
    #[default]
    Ambient,
    /// Every invocation gets its own nested scope, disposed when the handler returns.
    PerInvocation,
}

/// Options for `register_command_handlers_with` / `register_query_handlers_with`.
///
/// ```json
/// { "lifetime": "transient", "handler_scope": "per_invocation" }
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryOptions {
    pub lifetime: Lifetime,
    pub handler_scope: HandlerScope,
}

impl RegistryOptions {
    pub fn with_lifetime(lifetime: Lifetime) -> Self {
        Self {
            lifetime,
            ..Self::default()
        }
    }

    pub fn per_invocation_scope(mut self) -> Self {
        self.handler_scope = HandlerScope::PerInvocation;
        self
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
