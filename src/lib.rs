pub mod bootstrap;
pub mod config;
pub mod error;
pub mod git;
pub mod guard;
pub mod orchestrator;
pub mod paths;
pub mod ui;
pub mod version;

pub use error::{KernelBumpError, Result};
