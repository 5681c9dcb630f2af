pub mod backend;
pub mod scheduler_client;

pub use backend::{CatalogSource, ExportBackend, JobBackend, SettingsStore};
pub use scheduler_client::SchedulerClient;
