//! Order Handoff
//!
//! Orders leave the engine as a chat deep link pre-filled with the order summary.
//! Nothing comes back: a built link is all the confirmation there is.

use mockall::automock;
use reqwest::Url;
use thiserror::Error;
use tracing::info;

/// Errors building or opening an order link.
#[derive(Debug, Error)]
pub enum HandoffError {
    /// The recipient contains no digits.
    #[error("messaging recipient {0:?} has no digits")]
    InvalidRecipient(String),

    /// The configured base URL cannot be parsed.
    #[error("invalid messaging url: {0}")]
    InvalidUrl(String),

    /// The link could not be opened.
    #[error("failed to open order link: {0}")]
    Open(String),
}

/// Build `<base_url>/<recipient digits>?text=<summary>`.
///
/// # Errors
///
/// Returns a [`HandoffError`] if the recipient has no digits or the URL is invalid.
pub fn order_link(base_url: &str, recipient: &str, summary: &str) -> Result<Url, HandoffError> {
    let digits: String = recipient.chars().filter(char::is_ascii_digit).collect();

    if digits.is_empty() {
        return Err(HandoffError::InvalidRecipient(recipient.to_string()));
    }

    let mut url = Url::parse(&format!("{}/{digits}", base_url.trim_end_matches('/')))
        .map_err(|error| HandoffError::InvalidUrl(error.to_string()))?;

    url.query_pairs_mut().append_pair("text", summary);

    Ok(url)
}

/// Opens order links, e.g. in a browser tab.
#[automock]
pub trait OrderHandoff: Send + Sync {
    /// Open the link.
    ///
    /// # Errors
    ///
    /// Returns [`HandoffError::Open`] if the link could not be opened.
    fn open(&self, url: &Url) -> Result<(), HandoffError>;
}

/// Handoff that records the link in the logs and leaves opening it to the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingHandoff;

impl OrderHandoff for LoggingHandoff {
    fn open(&self, url: &Url) -> Result<(), HandoffError> {
        info!(host = url.host_str().unwrap_or_default(), path = url.path(), "order link ready");

        Ok(())
    }
}
