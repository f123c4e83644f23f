pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod render;
pub mod tui;

pub use application::{Extracted, jsonblock, pipeline, transcript};
pub use application::{agent, tooling};
pub use domain::{result, types};
pub use infrastructure::{logstore, model};
