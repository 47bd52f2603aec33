pub mod config;
pub mod error;
pub mod module;
pub mod pom;
pub mod scenario;
pub mod session;
pub mod ui;
pub mod vcs;
pub mod warning;

pub use error::{BumpError, Result};
