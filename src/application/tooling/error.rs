use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolSessionError {
    #[error("failed to spawn tool server '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("tool server transport error: {message}")]
    Transport { message: String },
    #[error("tool server sent invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },
    #[error("tool server returned JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("tool server terminated unexpectedly")]
    Terminated,
    #[error("tool server request cancelled")]
    Cancelled,
}

impl ToolSessionError {
    pub fn user_message(&self) -> String {
        match self {
            ToolSessionError::Spawn { command, .. } => {
                format!("Could not start the log tool server ('{command}'). Check that it is installed and on PATH.")
            }
            ToolSessionError::Transport { .. }
            | ToolSessionError::InvalidJson { .. }
            | ToolSessionError::Terminated => {
                "Lost the connection to the log tool server.".to_string()
            }
            ToolSessionError::Rpc { message, .. } => {
                format!("The log tool server rejected the request: {message}")
            }
            ToolSessionError::Cancelled => "The tool request was cancelled.".to_string(),
        }
    }
}
