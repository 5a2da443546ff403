pub mod config;
pub mod error;
pub mod matching;
pub mod models;
pub mod registry;
pub mod review;
pub mod tables;
pub mod utils;

pub use config::ReconcileConfig;
pub use error::ReconcileError;
pub use matching::manager::{run_reconciliation, PreparedRun, ReconcileOutput, Reconciler};
