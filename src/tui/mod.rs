pub mod screens;
pub mod terminal;

pub use screens::query::run;
