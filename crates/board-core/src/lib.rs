pub mod config;
pub mod error;
pub mod import;
pub mod io;
pub mod paths;
pub mod project;
pub mod session;
pub mod task;
pub mod types;

pub use error::{BoardError, Result};
