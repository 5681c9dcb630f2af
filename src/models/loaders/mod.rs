pub mod settings_loader;

pub use settings_loader::{load_catalog, load_schedule, load_settings, save_json};
