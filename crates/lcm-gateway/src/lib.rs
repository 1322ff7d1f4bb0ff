//! LCM Gateway - model-service access for the migration pipeline
//!
//! One exchange at a time against a completions-style endpoint:
//! - `ChatBackend` is the dependency seam (production client or test double)
//! - `ModelGateway` adds the per-model temperature policy and
//!   retry/backoff on throttling signals
//! - `sanitize` recovers raw code from a formatted model response
//!
//! # Example
//!
//! ```rust,ignore
//! use lcm_gateway::{ChatMessage, ModelGateway, OpenAiClient};
//! use lcm_secrets::HelperProcess;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), lcm_gateway::GatewayError> {
//! let client = OpenAiClient::new(Arc::new(HelperProcess::from_env()));
//! let gateway = ModelGateway::new(Arc::new(client));
//! let text = gateway
//!     .complete_with_retry("gpt-4.1", &[ChatMessage::user("hello")], 0.0)
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

mod client;
mod error;
mod message;
mod retry;
pub mod sanitize;

pub use client::{ChatBackend, OpenAiClient, DEFAULT_BASE_URL, KEY_PROVIDER};
pub use error::GatewayError;
pub use message::{ChatMessage, Role};
pub use retry::{
    effective_temperature, is_reasoning_tier, parse_wait_hint, ModelGateway, RetryPolicy,
};
pub use sanitize::sanitize;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
