//! LCM Pipeline - the migration core
//!
//! Converts legacy Python 2 source into three derived artifacts:
//! modernized Python 3 code, a prose change explanation, and a normalized
//! list of security issues. The pipeline is a strictly sequential chain:
//!
//! 1. validation
//! 2. syntactic rewrite ([`lcm_transform`])
//! 3. modernization exchange (sanitized to raw code)
//! 4. explanation exchange (prose, returned as-is)
//! 5. security audit (advisory, degrades to no issues)
//!
//! # Example
//!
//! ```rust,ignore
//! use lcm_pipeline::{MigrationRequest, Migrator};
//!
//! # async fn example(migrator: Migrator) -> Result<(), lcm_pipeline::MigrationError> {
//! let request = MigrationRequest::new("print \"hi\"", "hello.py");
//! let result = migrator.migrate(request).await?;
//! println!("{}", result.modernized_code);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

mod audit;
mod error;
mod migrate;
mod prompts;
mod types;

pub use audit::SecurityAuditor;
pub use error::MigrationError;
pub use migrate::{Migrator, PipelineConfig};
pub use types::{
    ComplianceStandard, MigrationRequest, MigrationResult, SecurityIssue, Severity,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for running migrations
    pub use crate::{MigrationError, MigrationRequest, MigrationResult, Migrator, PipelineConfig};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
