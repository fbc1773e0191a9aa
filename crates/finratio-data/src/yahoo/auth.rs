//! Yahoo Finance cookie/crumb session.
//!
//! The `quoteSummary` endpoint rejects requests without a session cookie from
//! `fc.yahoo.com` and a matching crumb token. The cookie lives in the
//! client's cookie jar; the crumb is fetched once and reused.

use crate::error::{DataError, Result};
use tokio::sync::Mutex;
use tracing::debug;

const COOKIE_URL: &str = "https://fc.yahoo.com";
const CRUMB_URL: &str = "https://query1.finance.yahoo.com/v1/test/getcrumb";

/// Cached crumb for an authenticated Yahoo session.
#[derive(Debug, Default)]
pub(crate) struct CrumbSession {
    crumb: Mutex<Option<String>>,
}

impl CrumbSession {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Return the cached crumb, performing the handshake on first use.
    pub(crate) async fn crumb(&self, client: &reqwest::Client) -> Result<String> {
        let mut guard = self.crumb.lock().await;
        if let Some(crumb) = guard.as_ref() {
            return Ok(crumb.clone());
        }

        let crumb = Self::handshake(client).await?;
        *guard = Some(crumb.clone());
        Ok(crumb)
    }

    /// Drop the cached crumb so the next call re-authenticates.
    pub(crate) async fn invalidate(&self) {
        *self.crumb.lock().await = None;
    }

    async fn handshake(client: &reqwest::Client) -> Result<String> {
        // fc.yahoo.com answers 404 but still sets the session cookie.
        client
            .get(COOKIE_URL)
            .send()
            .await
            .map_err(DataError::Network)?;

        let response = client
            .get(CRUMB_URL)
            .send()
            .await
            .map_err(DataError::Network)?;

        if !response.status().is_success() {
            return Err(DataError::YahooApi(format!(
                "Failed to fetch crumb: HTTP {}",
                response.status()
            )));
        }

        let body = response.text().await.map_err(DataError::Network)?;
        let crumb = body.trim();
        if !is_valid_crumb(crumb) {
            return Err(DataError::YahooApi("Invalid crumb returned".to_string()));
        }

        debug!("obtained Yahoo crumb");
        Ok(crumb.to_string())
    }
}

/// A crumb is a short token; anything else is an error page.
fn is_valid_crumb(crumb: &str) -> bool {
    !crumb.is_empty() && crumb.len() <= 64 && !crumb.contains('<') && !crumb.contains(' ')
}
