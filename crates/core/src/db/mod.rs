//! Project configuration, layout and the SQLite run history.
//!
//! - `ProjectConfig`: serializable project metadata, engine and pass settings.
//! - `ProjectLayout`: computed paths for project directories/files.
//! - `ProjectDb`: a small SQLite wrapper recording launches and builds.
//! - `ProjectContext`: layout + config + open DB, and the pipeline built from them.

pub mod config;
pub mod context;
pub mod layout;
pub mod models;
pub mod project_db;
pub mod util;

pub use config::{DbConfig, ProjectConfig};
pub use context::ProjectContext;
pub use layout::ProjectLayout;
pub use models::{BuildRecord, LaunchRecord};
pub use project_db::{DbError, DbResult, ProjectDb, CURRENT_SCHEMA_VERSION};
pub use util::{load_project_config, open_project_db};
