//! Domain layer for Java Style Guard
//!
//! CDD Principle: Domain Model - Pure logic for style convention enforcement
//! - Contains violations, severities, reports and the error taxonomy
//! - Independent of file systems, configuration formats and terminals

pub mod violations;

// Re-export main domain types for convenience
pub use violations::*;
