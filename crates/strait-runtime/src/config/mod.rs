//! Configuration for Strait-based processes.

mod loader;
mod schema;
mod validation;

pub use loader::ConfigLoader;
pub use schema::{ContextConfig, LogFormat, LogLevel, LogOutput, LoggingConfig, StraitConfig};
pub use validation::validate;
