use crate::application::tooling::ToolSessionError;
use crate::infrastructure::model::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Tool(#[from] ToolSessionError),
    #[error("invalid agent response: {0}")]
    InvalidResponse(String),
    #[error("agent exceeded the maximum of {0} tool interactions")]
    StepLimit(usize),
}

impl AgentError {
    pub fn user_message(&self) -> String {
        match self {
            AgentError::Model(err) => err.user_message(),
            AgentError::Tool(err) => err.user_message(),
            AgentError::InvalidResponse(_) => {
                "The model returned a reply the agent could not act on. Try rephrasing the query."
                    .to_string()
            }
            AgentError::StepLimit(limit) => {
                format!("The agent stopped after {limit} tool calls without a final answer.")
            }
        }
    }
}
