pub mod browser;
pub mod freelancer;
pub mod guru;
pub mod registry;
pub mod slack;

#[cfg(feature = "browser")]
pub use browser::ChromiumDriver;
pub use browser::PageDriver;
pub use freelancer::{FreelancerAdapter, FreelancerConfig};
pub use guru::{GuruAdapter, GuruCredentials};
pub use registry::{Source, SourceRegistry};
pub use slack::{SlackClient, SlackConfig};
