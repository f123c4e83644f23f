//! Tool-provider process lifecycle

use logscope::application::tooling::{ToolSession, ToolSessionError};
use logscope::config::ToolServerConfig;
use std::collections::HashMap;

#[tokio::test]
async fn spawn_failure_surfaces_as_spawn_error() {
    let config = ToolServerConfig {
        command: "/definitely/not/a/real/binary".to_string(),
        args: Vec::new(),
        env: HashMap::new(),
        workdir: None,
    };

    let err = match ToolSession::open(&config).await {
        Ok(session) => {
            session.shutdown().await;
            panic!("open should not succeed for a missing binary");
        }
        Err(err) => err,
    };
    assert!(matches!(err, ToolSessionError::Spawn { .. }));
    assert!(err.user_message().contains("/definitely/not/a/real/binary"));
}

#[tokio::test]
async fn handshake_failure_reaps_the_child() {
    // `true` exits immediately without speaking JSON-RPC, so the initialize
    // request must fail rather than hang; the exact error depends on whether
    // the exit is observed before or after the request is written.
    let config = ToolServerConfig {
        command: "true".to_string(),
        args: Vec::new(),
        env: HashMap::new(),
        workdir: None,
    };

    let result = ToolSession::open(&config).await;
    assert!(matches!(
        result,
        Err(ToolSessionError::Terminated
            | ToolSessionError::Cancelled
            | ToolSessionError::Transport { .. })
    ));
}
