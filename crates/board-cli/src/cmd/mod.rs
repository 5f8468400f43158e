pub mod config;
pub mod init;
pub mod project;
pub mod report;
pub mod session;
pub mod task;
pub mod ui;
