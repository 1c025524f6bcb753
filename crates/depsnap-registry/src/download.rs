//! HTTP fetching with retries.

use std::time::Duration;

use reqwest::Client;

use depsnap_util::errors::DepsnapError;

const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Build a shared reqwest client for registry queries.
pub fn build_client(timeout: Duration) -> Result<Client, DepsnapError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("depsnap/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| DepsnapError::Generic {
            message: format!("Failed to create HTTP client: {e}"),
        })
}

/// A single GET against the registry.
pub struct Fetch<'a> {
    pub client: &'a Client,
    pub url: &'a str,
    pub accept: &'a str,
    pub token: Option<&'a str>,
    pub retries: u32,
}

impl Fetch<'_> {
    /// Download the response body, retrying timeouts, connect errors and 5xx.
    ///
    /// Returns `Ok(None)` for 404. `package` names the query in errors.
    pub async fn bytes(&self, package: &str) -> Result<Option<Vec<u8>>, DepsnapError> {
        let url = self.url;
        let mut last_err = String::new();

        for attempt in 0..=self.retries {
            if attempt > 0 {
                tracing::debug!(%url, attempt, "retrying registry request");
                tokio::time::sleep(RETRY_DELAY * attempt).await;
            }

            let mut req = self
                .client
                .get(url)
                .header(reqwest::header::ACCEPT, self.accept);
            if let Some(token) = self.token {
                req = req.bearer_auth(token);
            }

            match req.send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if status == reqwest::StatusCode::NOT_FOUND {
                        return Ok(None);
                    }
                    if status.is_server_error() {
                        last_err = format!("HTTP {status} from {url}");
                        continue;
                    }
                    if !status.is_success() {
                        return Err(DepsnapError::oracle(
                            package,
                            format!("HTTP {status} fetching {url}"),
                        ));
                    }

                    let bytes = resp.bytes().await.map_err(|e| {
                        DepsnapError::oracle(
                            package,
                            format!("Failed to read response from {url}: {e}"),
                        )
                    })?;
                    return Ok(Some(bytes.to_vec()));
                }
                Err(e) if e.is_timeout() || e.is_connect() => {
                    last_err = format!("{e}");
                    continue;
                }
                Err(e) => {
                    return Err(DepsnapError::oracle(
                        package,
                        format!("Request to {url} failed: {e}"),
                    ));
                }
            }
        }

        Err(DepsnapError::oracle(
            package,
            format!(
                "Failed after {} attempts for {url}: {last_err}",
                self.retries + 1
            ),
        ))
    }
}
