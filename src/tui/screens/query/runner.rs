//! Event loop for the query screen

use super::input::{Action, handle_input};
use super::state::AppState;
use super::ui::QueryUi;
use crate::application::pipeline::{self, QueryOutcome};
use crate::application::transcript::TranscriptGap;
use crate::application::Extracted;
use crate::config::AppConfig;
use crate::domain::result::QueryResult;
use crate::infrastructure::logstore::{Identity, LogStore};
use crate::infrastructure::model::ModelProvider;
use crate::render::build_display;
use crate::tui::terminal::{Tui, init_terminal, restore_terminal};
use crossterm::event;
use serde_json::{Map, Value};
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Run the TUI until the user exits.
pub async fn run<P>(
    provider: Arc<P>,
    store: Arc<dyn LogStore>,
    config: Arc<AppConfig>,
    identity: Identity,
) -> Result<(), Box<dyn Error>>
where
    P: ModelProvider + 'static,
{
    let mut terminal = init_terminal()?;
    let mut state = AppState::new();
    state.status_message = Some("Type a question about your logs and press Enter".into());

    let result = run_loop(&mut terminal, &mut state, provider, store, config, &identity).await;

    restore_terminal()?;
    result
}

enum ResponseEvent {
    Query(Box<QueryOutcome>),
    QueryFailed(String),
    Groups(Vec<Value>, Option<String>),
}

async fn run_loop<P>(
    terminal: &mut Tui,
    state: &mut AppState,
    provider: Arc<P>,
    store: Arc<dyn LogStore>,
    config: Arc<AppConfig>,
    identity: &Identity,
) -> Result<(), Box<dyn Error>>
where
    P: ModelProvider + 'static,
{
    let (response_tx, mut response_rx) = mpsc::channel::<ResponseEvent>(10);

    loop {
        terminal.draw(|frame| {
            QueryUi::render(frame, state, Some(&identity.account), &config.model);
        })?;

        while let Ok(response) = response_rx.try_recv() {
            match response {
                ResponseEvent::Query(outcome) => {
                    state.loading = false;
                    apply_outcome(state, *outcome);
                }
                ResponseEvent::QueryFailed(message) => {
                    state.loading = false;
                    state.status_message = Some(message);
                }
                ResponseEvent::Groups(groups, error) => {
                    state.loading = false;
                    state.status_message = match &error {
                        Some(message) => Some(message.clone()),
                        None => Some(format!("Found {} log groups", groups.len())),
                    };
                    let mut map = Map::new();
                    map.insert("logGroups".to_string(), Value::Array(groups));
                    state
                        .groups
                        .set_sections(build_display(&QueryResult::Object(map)));
                }
            }
        }

        let timeout = if state.loading {
            Duration::from_millis(100)
        } else {
            Duration::from_millis(50)
        };

        if event::poll(timeout)? {
            let action = handle_input(state, event::read()?);
            match action {
                Action::Exit => return Ok(()),

                Action::Submit => {
                    let query = state.take_input();
                    if !query.is_empty() {
                        state.loading = true;
                        state.status_message = None;
                        state.notice = None;
                        let provider = provider.clone();
                        let config = config.clone();
                        let tx = response_tx.clone();
                        tokio::spawn(async move {
                            let event =
                                match pipeline::run_query(provider, &config, query).await {
                                    Ok(outcome) => ResponseEvent::Query(Box::new(outcome)),
                                    Err(err) => ResponseEvent::QueryFailed(err.user_message()),
                                };
                            let _ = tx.send(event).await;
                        });
                    }
                }

                Action::RefreshGroups => {
                    state.loading = true;
                    state.status_message = Some("Refreshing log groups...".into());
                    let store = store.clone();
                    let limit = config.group_limit;
                    let tx = response_tx.clone();
                    tokio::spawn(async move {
                        let (groups, error) =
                            pipeline::refresh_log_groups(store.as_ref(), limit).await;
                        let _ = tx.send(ResponseEvent::Groups(groups, error)).await;
                    });
                }

                Action::ToggleEntry => state.active_view_mut().toggle_selected(),
                Action::ToggleRaw => state.toggle_raw(),
                Action::SwitchTab => state.switch_tab(),
                Action::None => {}
            }
        } else if state.loading {
            state.tick_loading();
        }
    }
}

fn apply_outcome(state: &mut AppState, outcome: QueryOutcome) {
    match outcome.answer {
        Extracted::Found(_) => {
            state.notice = None;
        }
        Extracted::Missing(TranscriptGap::NoAssistantMessage) => {
            state.notice = Some("The agent produced no reply.".into());
        }
        Extracted::Missing(TranscriptGap::NoTextContent) => {
            state.notice = Some("The agent's reply contained no text.".into());
        }
    }

    match outcome.result {
        Some(result) => {
            state.raw_view = Some(result.raw());
            state.show_raw = false;
            state.results.set_sections(build_display(&result));
            state.status_message = Some("Query complete".into());
        }
        None => {
            state.raw_view = None;
            state.show_raw = false;
            state.results.clear();
        }
    }
}
