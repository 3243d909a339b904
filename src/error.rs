use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("no open connection to the game server")]
    TransportUnavailable,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed server message: {0}")]
    MalformedServerMessage(#[source] serde_json::Error),
    #[error("failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("the game is over, no further moves are accepted")]
    SessionEnded,
    #[error("failed to start network runtime: {0}")]
    Runtime(#[from] std::io::Error),
}
