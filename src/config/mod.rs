//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, duration parsing)
//!     → Settings (validated, immutable)
//!     → owned by the Provider for its whole lifetime
//! ```
//!
//! # Design Decisions
//! - Config is immutable once validated; changes require a new provider
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::ConfigError;
pub use schema::EndpointConfig;
pub use schema::FetchConfig;
pub use schema::ObservabilityConfig;
pub use schema::ProviderConfig;
pub use schema::TransformPolicy;
pub use validation::{validate_config, Settings, ValidationError};
