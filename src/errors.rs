use thiserror::Error;

use crate::profile::ProfileId;

pub type Result<T> = std::result::Result<T, FeedError>;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Unexpected HTTP status: {0}")]
    Status(u16),
    #[error("Parsing error")]
    Parse,
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("Profile index is empty")]
    EmptyIndex,
    #[error("Unknown profile: {0}")]
    UnknownProfile(ProfileId),
    #[error("Invalid identity: {0}")]
    InvalidIdentity(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<serde_json::Error> for FeedError {
    fn from(_: serde_json::Error) -> Self {
        Self::Parse
    }
}
