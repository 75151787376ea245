/// Business logic layer
///
/// Handlers stay thin and delegate here; services depend on the store and
/// provider seams rather than on concrete backends where tests need fakes.
pub mod analytics;
pub mod billing;
pub mod oauth;
pub mod sync;

pub use analytics::{AnalyticsReport, AnalyticsService};
pub use billing::BillingService;
pub use oauth::{callback_redirect, LinkedInOAuthService};
pub use sync::{LinkedInSyncService, SyncSummary};
