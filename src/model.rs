//! Extracted item model and read-only query helpers

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const SCHEMA_ORG_HTTP: &str = "http://schema.org/";
const SCHEMA_ORG_HTTPS: &str = "https://schema.org/";
const GRAPH_KEY: &str = "@graph";

/// Property name -> values in discovery order
pub type PropertyMap = BTreeMap<String, Vec<PropertyValue>>;

/// Single property occurrence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Text(String),
    Item(Item),
}

impl PropertyValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            PropertyValue::Item(_) => None,
        }
    }

    pub fn as_item(&self) -> Option<&Item> {
        match self {
            PropertyValue::Item(item) => Some(item),
            PropertyValue::Text(_) => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            PropertyValue::Text(_) => "text",
            PropertyValue::Item(_) => "item",
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Text(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Text(s)
    }
}

impl From<Item> for PropertyValue {
    fn from(item: Item) -> Self {
        PropertyValue::Item(item)
    }
}

/// One extracted record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "type", default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub properties: PropertyMap,
    /// Raw markup of text-sourced property values
    #[serde(rename = "innerHTML", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub inner_html: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Item {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_type(&mut self, value: &str) {
        self.types.push(value.to_string());
    }

    pub(crate) fn add_property(&mut self, key: &str, value: PropertyValue) {
        self.properties.entry(key.to_string()).or_default().push(value);
    }

    pub(crate) fn add_property_with_html(&mut self, key: &str, value: String, inner_html: String) {
        self.add_property(key, PropertyValue::Text(value));
        self.inner_html
            .entry(key.to_string())
            .or_default()
            .push(inner_html);
    }

    /// True if any declared type equals one of `types`
    pub fn is_of_type(&self, types: &[&str]) -> bool {
        self.types
            .iter()
            .any(|t1| types.iter().any(|t2| t1 == t2))
    }

    /// Like [`Item::is_of_type`] for a bare schema.org name under either scheme
    pub fn is_of_schema_type(&self, item_type: &str) -> bool {
        let http = format!("{SCHEMA_ORG_HTTP}{item_type}");
        let https = format!("{SCHEMA_ORG_HTTPS}{item_type}");
        self.is_of_type(&[item_type, &http, &https])
    }

    /// First value under the first key that has any values
    pub fn get_property(&self, keys: &[&str]) -> Option<&PropertyValue> {
        self.get_properties(keys).and_then(|values| values.first())
    }

    /// All values under the first key that has any values
    pub fn get_properties(&self, keys: &[&str]) -> Option<&[PropertyValue]> {
        keys.iter()
            .filter_map(|key| self.properties.get(*key))
            .find(|values| !values.is_empty())
            .map(Vec::as_slice)
    }

    /// First text value under the first key that has any values
    pub fn get_text(&self, keys: &[&str]) -> Option<&str> {
        self.get_properties(keys)?
            .iter()
            .find_map(PropertyValue::as_text)
    }

    /// Nested items under the first key holding at least one item
    pub fn nested_items(&self, keys: &[&str]) -> Vec<&Item> {
        for key in keys {
            let items: Vec<&Item> = self
                .properties
                .get(*key)
                .map(|values| values.iter().filter_map(PropertyValue::as_item).collect())
                .unwrap_or_default();
            if !items.is_empty() {
                return items;
            }
        }
        Vec::new()
    }

    /// Nested items as a detached collection
    pub fn get_nested(&self, keys: &[&str]) -> Option<Microdata> {
        let items = self.nested_items(keys);
        if items.is_empty() {
            return None;
        }
        Some(Microdata {
            items: items.into_iter().cloned().collect(),
        })
    }

    pub fn get_nested_item(&self, keys: &[&str]) -> Option<&Item> {
        self.nested_items(keys).into_iter().next()
    }

    /// Count value kinds per dotted property path.
    ///
    /// Keys look like `offers.price[text]` or `author[item]`.
    pub fn count_paths(&self, prefix: &str, paths: &mut BTreeMap<String, usize>) {
        for (key, values) in &self.properties {
            let path = format!("{prefix}{key}");
            for value in values {
                *paths
                    .entry(format!("{path}[{}]", value.kind()))
                    .or_default() += 1;

                if let PropertyValue::Item(nested) = value {
                    nested.count_paths(&format!("{path}."), paths);
                }
            }
        }
    }
}

/// All items found in one document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Microdata {
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Microdata {
    pub(crate) fn add_item(&mut self, item: Item) {
        self.items.push(item);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// First item with any of the given types, descending into `@graph`
    pub fn first_of_type(&self, types: &[&str]) -> Option<&Item> {
        first_of_type_in(self.items.iter(), types)
    }

    pub fn first_of_schema_type(&self, item_type: &str) -> Option<&Item> {
        let http = format!("{SCHEMA_ORG_HTTP}{item_type}");
        let https = format!("{SCHEMA_ORG_HTTPS}{item_type}");
        self.first_of_type(&[item_type, &http, &https])
    }

    pub fn count_paths(&self) -> BTreeMap<String, usize> {
        let mut paths = BTreeMap::new();
        for item in &self.items {
            item.count_paths("", &mut paths);
        }
        paths
    }
}

fn first_of_type_in<'a>(
    items: impl Iterator<Item = &'a Item>,
    types: &[&str],
) -> Option<&'a Item> {
    for item in items {
        if item.is_of_type(types) {
            return Some(item);
        }

        let graph = item.nested_items(&[GRAPH_KEY]);
        if let Some(found) = first_of_type_in(graph.into_iter(), types) {
            return Some(found);
        }
    }
    None
}
