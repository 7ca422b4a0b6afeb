//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → LoggingConfig (validated, immutable)
//!     → runtime.rs (compile redactor, publish via ArcSwap)
//!
//! On reload signal:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → atomic swap of the runtime snapshot
//!     → contexts created afterwards see the new policy
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - A context captures its policy at construction; reloads never mutate it

pub mod loader;
pub mod runtime;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use runtime::{build_redactor, RuntimeConfig};
pub use schema::{
    AdapterKind, CallbacksConfig, LangfuseConfig, LogFormat, LoggingConfig, ObservabilityConfig,
    PatternConfig, PolicyConfig, RedactionConfig,
};
pub use validation::{validate_config, ValidationError};
pub use watcher::ConfigWatcher;
