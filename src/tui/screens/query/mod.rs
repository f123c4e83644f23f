mod input;
mod runner;
mod state;
mod ui;

pub use input::{Action, handle_input};
pub use runner::run;
pub use state::{AppState, ResultsView, Tab};
