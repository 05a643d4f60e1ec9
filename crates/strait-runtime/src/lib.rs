//! # Strait Runtime
//!
//! Runtime wiring for Strait-based processes: configuration loading,
//! logging setup, and per-context bus assembly.
//!
//! ## Example
//!
//! ```rust,ignore
//! use strait_runtime::config::ConfigLoader;
//! use strait_runtime::{ContextRuntime, logging};
//! use strait_transport::InProcessHub;
//!
//! let config = ConfigLoader::new().load()?;
//! logging::init_from_config(&config.logging);
//!
//! let hub = InProcessHub::new();
//! let context = ContextRuntime::derive_context(&config.context);
//! let runtime = ContextRuntime::join_hub(&hub, context).await?;
//! let bus = runtime.bus();
//! // ... register receivers, create senders ...
//! runtime.shutdown().await?;
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use config::{ConfigLoader, StraitConfig};
pub use error::{ConfigError, ConfigResult, RuntimeError, RuntimeResult};
pub use logging::LoggingBuilder;
pub use runtime::ContextRuntime;
