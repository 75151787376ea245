/// Insights Service Library
///
/// Backend for the LinkedIn insights dashboard: connects a member's LinkedIn
/// account, syncs their posts, classifies post sentiment through an LLM and
/// serves engagement analytics computed by the `engagement-metrics` crate.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and route registration
/// - `services`: Analytics, LinkedIn OAuth/sync and billing logic
/// - `providers`: Outbound clients (OpenAI, LinkedIn, Stripe)
/// - `db`: Post store and LinkedIn connection persistence
/// - `middleware`: JWT session extraction and request metrics
/// - `metrics`: Prometheus collectors
/// - `error`: Error types and HTTP mapping
/// - `config`: Configuration management
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod providers;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
