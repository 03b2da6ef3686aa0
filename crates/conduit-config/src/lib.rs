//! Configuration types for Conduit.
//!
//! A [`ConnectorConfig`] names the base URL of a remote service and the path
//! used to probe its readiness. It can be read from YAML, with `${VAR}`
//! expansion, and overridden from prefixed environment variables.

pub mod env;
pub mod loader;
pub mod types;

pub use env::*;
pub use loader::*;
pub use types::*;
