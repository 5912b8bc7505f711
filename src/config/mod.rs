//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → Settings (validated, immutable)
//!     → BreakerConfig copied into each CircuitBreaker
//! ```
//!
//! # Design Decisions
//! - Config is immutable once a breaker is built
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::AdminConfig;
pub use schema::BreakerConfig;
pub use schema::ObservabilityConfig;
pub use schema::Settings;
pub use schema::SlidingWindow;
