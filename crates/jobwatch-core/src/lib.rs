pub mod chat;
pub mod error;
pub mod filters;
pub mod models;
pub mod platform;
pub mod poller;
pub mod resolver;
pub mod schedule;
pub mod traits;
pub mod util;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use chat::ChatCommands;
pub use error::AppError;
pub use filters::FilterSet;
pub use models::{
    BudgetInfo, Category, EmployerInfo, JobDetail, JobSummary, Keyword, NewCategory, Watermark,
};
pub use platform::Platform;
pub use poller::{CycleReport, PollReporter, PollingDriver, TracingPollReporter};
pub use schedule::{PollerConfig, RetryConfig};
pub use traits::{ChatSurface, FilterStore, MessageRef, Notifier, SourceAdapter, WatermarkStore};
