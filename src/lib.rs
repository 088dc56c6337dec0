// Library surface shared by the binary and the integration tests.
pub mod app;
pub mod app_dirs;
pub mod codes;
pub mod config;
pub mod forms;
pub mod record;
pub mod report;
pub mod runtime;
pub mod scoring;
pub mod section;
pub mod store;
pub mod ui;
pub mod util;
