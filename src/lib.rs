// Library surface shared by the binary and the integration tests.
pub mod app;
pub mod app_dirs;
pub mod celebration;
pub mod config;
pub mod corpus;
pub mod error;
pub mod high_score;
pub mod logging;
pub mod runtime;
pub mod trial;
pub mod ui;

pub use error::{Error, Result};
