//! Fetch a page over HTTP and extract its structured data

use std::time::Duration;

use url::Url;

use crate::config::{ExtractOptions, FetchOptions};
use crate::error::{MicrodataError, Result};
use crate::extractors::extract_all;
use crate::model::Microdata;

/// Fetch `url` using ureq (simple blocking HTTP) and extract items,
/// resolving relative references against the requested URL.
///
/// The body is decoded with the charset declared in `Content-Type`.
pub fn fetch_microdata_blocking(url: &str, options: &FetchOptions) -> Result<Microdata> {
    let parsed = Url::parse(url).map_err(|source| MicrodataError::Url {
        url: url.to_string(),
        source,
    })?;

    let agent = ureq::Agent::new_with_config(
        ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(options.timeout_secs)))
            .user_agent(options.user_agent.as_str())
            .build(),
    );

    let html = match agent.get(parsed.as_str()).call() {
        Ok(resp) => resp
            .into_body()
            .read_to_string()
            .map_err(|e| MicrodataError::Fetch {
                url: url.to_string(),
                message: e.to_string(),
            })?,
        Err(ureq::Error::StatusCode(status)) => {
            return Err(MicrodataError::Status {
                url: url.to_string(),
                status,
            });
        }
        Err(e) => {
            return Err(MicrodataError::Fetch {
                url: url.to_string(),
                message: e.to_string(),
            });
        }
    };

    log::debug!("Fetched {} bytes from {}", html.len(), parsed);

    Ok(extract_all(&html, &ExtractOptions::with_base_url(parsed.as_str())))
}
