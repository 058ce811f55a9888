//! Shared HTTP client configuration.
//!
//! Every adapter goes through one client so the transport rules are uniform:
//! a bounded per-request timeout and a hard cap on redirect hops. Upstream
//! listing pages occasionally redirect between www/non-www hosts; the cap
//! turns a redirect loop into an ordinary transport error instead of an
//! unbounded chase.

use std::error::Error;
use std::time::Duration;

use reqwest::redirect::Policy;
use tracing::debug;

/// Per-request timeout. Upstream government endpoints can be slow, but past
/// this bound the request is treated as failed for this run.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(12);

/// Maximum redirect hops before the request is abandoned.
const MAX_REDIRECTS: usize = 5;

/// Build the shared client used by all adapters.
pub fn client() -> Result<reqwest::Client, Box<dyn Error>> {
    let client = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .user_agent(concat!("food_safety_wire/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// GET a URL and return its body, failing on any non-success status.
pub async fn get_text(client: &reqwest::Client, url: &str) -> Result<String, Box<dyn Error>> {
    let response = client.get(url).send().await?.error_for_status()?;
    let body = response.text().await?;
    debug!(%url, bytes = body.len(), "Fetched document");
    Ok(body)
}
