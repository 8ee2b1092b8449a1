//! Extraction and fetch options

use serde::{Deserialize, Serialize};

/// Script `type` marking a linked-data block.
pub const LINKED_DATA_TYPE: &str = "application/ld+json";

/// Options for a single extraction pass.
///
/// Deserializable from JSON so the FFI layer can take them as a string.
/// Every field is optional.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExtractOptions {
    /// Base URL for resolving `href`/`src`/`itemid` references
    pub base_url: Option<String>,
    /// Script type identifying linked-data blocks
    pub linked_data_type: String,
    /// Walk `itemscope` microdata
    pub microdata: bool,
    /// Merge linked-data script blocks
    pub linked_data: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            base_url: None,
            linked_data_type: LINKED_DATA_TYPE.to_string(),
            microdata: true,
            linked_data: true,
        }
    }
}

impl ExtractOptions {
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: Some(base_url.to_string()),
            ..Self::default()
        }
    }
}

/// Options for fetching a document over HTTP
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FetchOptions {
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            user_agent: concat!("microdata_parser/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_options_json() {
        let options: ExtractOptions =
            serde_json::from_str(r#"{"base_url": "https://example.com/"}"#).unwrap();
        assert_eq!(options.base_url.as_deref(), Some("https://example.com/"));
        assert_eq!(options.linked_data_type, LINKED_DATA_TYPE);
        assert!(options.microdata);
        assert!(options.linked_data);
    }

    #[test]
    fn test_empty_options_json() {
        let options: ExtractOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, ExtractOptions::default());
    }
}
