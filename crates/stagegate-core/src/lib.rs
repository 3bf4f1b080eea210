pub mod artifact;
pub mod classify;
pub mod config;
pub mod context;
pub mod error;
pub mod gate_check;
pub mod io;
pub mod mapping;
pub mod paths;
pub mod project;
pub mod regression;
pub mod registry;
pub mod review;
pub mod review_status;
pub mod store;
pub mod task;
pub mod track;
pub mod types;
pub mod validate;

pub use error::{Result, StagegateError};
pub use project::Project;
