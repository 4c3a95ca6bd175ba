//! Lifetime policy of a registration.

use serde::{Deserialize, Serialize};

/// How many resolutions share one instance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifetime {
    /// A new instance on every resolution.
    Transient,
    /// One instance per scope (unit of work).
    #[default]
    Scoped,
    /// One instance per container.
    Singleton,
}
