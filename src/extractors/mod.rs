//! HTML extraction modules
//!
//! Microdata attributes and JSON-LD blocks are extracted into one item list:
//! microdata items first, in document order, then linked-data items.

mod jsonld_extractor;
mod lenient_json;
mod microdata_extractor;

pub use jsonld_extractor::*;
pub use lenient_json::*;
pub use microdata_extractor::*;

use scraper::Html;

use jsonld_extractor::merge_linked_data_blocks;
use microdata_extractor::{parse_base_url, walk_items, DocumentIndex};

use crate::config::ExtractOptions;
use crate::model::Microdata;

/// Extract all structured data from raw HTML
pub fn extract_all(html: &str, options: &ExtractOptions) -> Microdata {
    let document = Html::parse_document(html);
    extract_document(&document, options)
}

/// Extract all structured data from an already parsed document
pub fn extract_document(document: &Html, options: &ExtractOptions) -> Microdata {
    let base_url = parse_base_url(options.base_url.as_deref());
    let linked_data_type = options.linked_data.then_some(options.linked_data_type.as_str());
    let index = DocumentIndex::build(document, linked_data_type);

    let mut data = Microdata::default();
    if options.microdata {
        walk_items(&index, base_url.as_ref(), &mut data);
    }
    if options.linked_data {
        merge_linked_data_blocks(&index.linked_data, &mut data);
    }

    log::debug!(
        "Extracted {} items ({} scope elements, {} linked-data blocks)",
        data.len(),
        index.top_level.len(),
        index.linked_data.len()
    );

    data
}

/// Extract all structured data, resolving URLs against `base_url`
pub fn parse_html(html: &str, base_url: &str) -> Microdata {
    extract_all(html, &ExtractOptions::with_base_url(base_url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PropertyValue;

    const MIXED: &str = r#"
    <html>
    <head>
        <script type="application/ld+json">{"@type": "Organization", "name": "Acme"}</script>
        <script type="application/ld+json">{"@type": "Broken" "name": }</script>
    </head>
    <body>
        <div itemscope itemtype="https://schema.org/Product">
            <span itemprop="name">Anvil</span>
            <a itemprop="url" href="/anvil">Anvil</a>
        </div>
        <script type="application/ld+json">[{"@type": "WebPage"}, {"@type": "BreadcrumbList"}]</script>
    </body>
    </html>
    "#;

    #[test]
    fn test_microdata_then_linked_data() {
        let data = parse_html(MIXED, "https://shop.example.com/");
        let types: Vec<&str> = data
            .items
            .iter()
            .map(|item| item.types[0].as_str())
            .collect();
        assert_eq!(
            types,
            vec!["https://schema.org/Product", "Organization", "WebPage", "BreadcrumbList"]
        );

        let product = data.first_of_schema_type("Product").unwrap();
        assert_eq!(
            product.get_property(&["url"]),
            Some(&PropertyValue::Text("https://shop.example.com/anvil".to_string()))
        );
    }

    #[test]
    fn test_sources_can_be_disabled() {
        let only_microdata = ExtractOptions {
            linked_data: false,
            ..ExtractOptions::with_base_url("https://shop.example.com/")
        };
        assert_eq!(extract_all(MIXED, &only_microdata).len(), 1);

        let only_linked_data = ExtractOptions {
            microdata: false,
            ..ExtractOptions::default()
        };
        assert_eq!(extract_all(MIXED, &only_linked_data).len(), 3);
    }

    #[test]
    fn test_custom_linked_data_type() {
        let html = r#"<script type="application/json+oembed">{"@type": "Video"}</script>"#;
        let options = ExtractOptions {
            linked_data_type: "application/json+oembed".to_string(),
            ..ExtractOptions::default()
        };
        let data = extract_all(html, &options);
        assert_eq!(data.items[0].types, vec!["Video"]);
    }

    #[test]
    fn test_empty_document() {
        let data = parse_html("", "https://example.com");
        assert!(data.is_empty());
        assert_eq!(serde_json::to_string(&data).unwrap(), r#"{"items":[]}"#);
    }

    #[test]
    fn test_reserialization_is_stable() {
        let data = parse_html(MIXED, "https://shop.example.com/");
        let first = serde_json::to_vec(&data).unwrap();
        let second = serde_json::to_vec(&data).unwrap();
        assert_eq!(first, second);
    }
}
