pub mod best_effort;
pub mod distribution;
pub mod notification;
pub mod rate_limit;
pub mod webhook;

pub use best_effort::BestEffort;
pub use distribution::{
    DistributionService, FileTesterGroupStore, PlaceholderReleaseApi, ReleaseApi,
    TesterGroupStore,
};
pub use notification::{ChatClient, ChatMessage, Notifier, SlackClient};
pub use rate_limit::{QuotaExceeded, RateLimitEntry, RateLimiter};
pub use webhook::{EventOutcome, TestSource, WebhookHandler};
