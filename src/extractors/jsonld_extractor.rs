//! JSON-LD extraction from HTML
//!
//! Folds <script type="application/ld+json"> blocks into the same item model
//! as microdata. Objects become items, arrays spread into their parent.

use scraper::{ElementRef, Html};
use serde_json::{Map, Value};

use super::lenient_json::decode_lenient;
use super::microdata_extractor::DocumentIndex;
use crate::config::LINKED_DATA_TYPE;
use crate::model::{Item, Microdata, PropertyValue};

const TYPE_KEYS: [&str; 2] = ["@type", "type"];

/// Extract JSON-LD items only
pub fn extract_jsonld(html: &str) -> Microdata {
    let document = Html::parse_document(html);
    let index = DocumentIndex::build(&document, Some(LINKED_DATA_TYPE));

    let mut data = Microdata::default();
    merge_linked_data_blocks(&index.linked_data, &mut data);
    data
}

/// Decode and merge every block; undecodable blocks are logged and skipped
pub(crate) fn merge_linked_data_blocks(blocks: &[ElementRef<'_>], data: &mut Microdata) {
    for (position, element) in blocks.iter().enumerate() {
        let content = element.text().collect::<String>();
        if content.trim().is_empty() {
            continue;
        }

        match decode_lenient(&content) {
            Ok(json) => merge_jsonld(&json, data),
            Err(e) => log::warn!("Error parsing linked-data block #{position}: {e}"),
        }
    }
}

/// Merge a decoded JSON-LD value; each top-level object becomes an item
pub fn merge_jsonld(value: &Value, data: &mut Microdata) {
    match value {
        Value::Array(values) => {
            for v in values {
                merge_jsonld(v, data);
            }
        }
        Value::Object(obj) => data.add_item(item_from_object(obj)),
        _ => {}
    }
}

fn item_from_object(obj: &Map<String, Value>) -> Item {
    let mut item = Item::new();

    for key in TYPE_KEYS {
        if let Some(types) = obj.get(key) {
            read_types(&mut item, types);
        }
    }

    // A bare "type" stays a property as well; only "@type" is reserved
    for (key, value) in obj {
        if key != "@type" {
            merge_property(&mut item, key, value);
        }
    }

    item
}

fn read_types(item: &mut Item, value: &Value) {
    match value {
        Value::String(s) => item.add_type(s),
        Value::Array(values) => {
            for v in values {
                read_types(item, v);
            }
        }
        _ => {}
    }
}

fn merge_property(item: &mut Item, key: &str, value: &Value) {
    match value {
        Value::Array(values) => {
            for v in values {
                merge_property(item, key, v);
            }
        }
        Value::Object(obj) => item.add_property(key, PropertyValue::Item(item_from_object(obj))),
        Value::Null => {}
        Value::String(s) if s.is_empty() => {}
        Value::String(s) => item.add_property(key, s.as_str().into()),
        Value::Bool(_) | Value::Number(_) => item.add_property(key, value.to_string().into()),
    }
}
