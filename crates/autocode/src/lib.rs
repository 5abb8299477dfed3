pub mod ast;
pub mod config;
pub mod database;
pub mod error;
pub mod history;
pub mod registry;
pub mod utils;

pub use config::AutoCodeConfig;
pub use database::{setup_database, DbRegistry};
pub use error::AutoCodeError;
pub use history::{AutoCodeHistoryService, HistoryCreate, PageInfo, RollbackReport, RollbackRequest};
