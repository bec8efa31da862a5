use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Failed to load {url}: {reason}")]
    Navigation { url: String, reason: String },

    #[error("CDP error: {0}")]
    Cdp(String),
}

impl From<chromiumoxide::error::CdpError> for SessionError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        SessionError::Cdp(err.to_string())
    }
}
