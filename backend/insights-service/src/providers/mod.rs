/// Outbound clients
///
/// - `openai`: LLM-backed sentiment classification behind `SentimentClassifier`
/// - `linkedin`: OAuth code exchange, member posts and post statistics
/// - `stripe`: Checkout Session creation for the premium plan
///
/// Every client takes its base URL from configuration so tests can point it
/// at a mock server.
pub mod linkedin;
pub mod openai;
pub mod stripe;

pub use linkedin::{AccessToken, LinkedInClient, LinkedInError, LinkedInPost, PostStats};
pub use openai::{ClassifierError, OpenAiSentimentClassifier, SentimentClassifier};
pub use stripe::{BillingError, CheckoutSession, StripeClient};
