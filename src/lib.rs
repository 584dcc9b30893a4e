pub mod config;
pub mod effects;
pub mod form;
pub mod messages;
pub mod scheduler;

pub use config::{ConfigError, FolioConfig};
pub use form::{FormController, FormValidator, SubmissionStatus};
pub use messages::MessageCatalog;
pub use scheduler::{ManualScheduler, Scheduler, SpawnScheduler};
