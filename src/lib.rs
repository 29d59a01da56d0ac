// TaskBoard - Per-framework task tracking for a single session

pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod models;
pub mod notes;
pub mod session;
pub mod store;
pub mod view;

// Re-export main types for convenience
pub use config::Config;
pub use error::{StoreError, StoreResult};
pub use export::{ExportSink, to_csv};
pub use filter::TaskFilter;
pub use models::{FRAMEWORK_CATALOG, Task, TaskId, TaskStatus};
pub use notes::NotesSink;
pub use session::{Flow, Session};
pub use store::TaskStore;
