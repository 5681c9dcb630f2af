pub mod catalog;
pub mod loaders;
pub mod report;
pub mod schedule;
pub mod settings;

pub use catalog::{Catalog, HallRecord, ProfessorRecord, SubjectRecord};
pub use loaders::{load_catalog, load_schedule, load_settings, save_json};
pub use report::{GenerationReport, TerminalPayload};
pub use schedule::{is_shortage, ExamSlot, Hall, HallTier, ScheduleResult, SHORTAGE_MARKER};
pub use settings::{BalancingStrategy, GenerationSettings};
