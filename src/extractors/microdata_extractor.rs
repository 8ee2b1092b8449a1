//! Microdata (itemscope/itemprop attributes) extraction
//!
//! Walks the DOM from every top-level `itemscope` element, building nested
//! items for `itemscope itemprop` elements and following `itemref` links.
//! Reference: https://html.spec.whatwg.org/multipage/microdata.html

use std::collections::HashMap;

use scraper::{ElementRef, Html};
use url::{Position, Url};

use crate::model::{Item, Microdata, PropertyValue};

const ITEMSCOPE: &str = "itemscope";
const ITEMPROP: &str = "itemprop";
const ITEMTYPE: &str = "itemtype";
const ITEMID: &str = "itemid";
const ITEMREF: &str = "itemref";

/// Extract microdata items only, resolving URLs against `base_url`
pub fn extract_microdata(html: &str, base_url: &str) -> Microdata {
    let document = Html::parse_document(html);
    let index = DocumentIndex::build(&document, None);
    let base_url = parse_base_url(Some(base_url));

    let mut data = Microdata::default();
    walk_items(&index, base_url.as_ref(), &mut data);
    data
}

/// Elements collected in one pass over the document
pub(crate) struct DocumentIndex<'a> {
    /// `itemscope` elements without `itemprop`, at any depth
    pub(crate) top_level: Vec<ElementRef<'a>>,
    /// Linked-data `<script>` blocks; empty when no script type was requested
    pub(crate) linked_data: Vec<ElementRef<'a>>,
    /// `id` attribute -> element, for `itemref`
    pub(crate) identified: HashMap<&'a str, ElementRef<'a>>,
}

impl<'a> DocumentIndex<'a> {
    pub(crate) fn build(document: &'a Html, linked_data_type: Option<&str>) -> Self {
        let mut index = DocumentIndex {
            top_level: Vec::new(),
            linked_data: Vec::new(),
            identified: HashMap::new(),
        };

        for element in document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
        {
            let el = element.value();

            if let (Some(script_type), "script") = (linked_data_type, el.name()) {
                if el
                    .attr("type")
                    .is_some_and(|t| t.trim().eq_ignore_ascii_case(script_type))
                {
                    index.linked_data.push(element);
                }
            }

            if el.attr(ITEMSCOPE).is_some() && el.attr(ITEMPROP).is_none() {
                index.top_level.push(element);
            }

            if let Some(id) = el.attr("id") {
                index.identified.insert(id, element);
            }
        }

        index
    }
}

/// Build one item per top-level scope element, in document order
pub(crate) fn walk_items(index: &DocumentIndex<'_>, base_url: Option<&Url>, data: &mut Microdata) {
    let mut walker = ScopeWalker {
        base_url,
        identified: &index.identified,
        expanding: Vec::new(),
    };

    for &element in &index.top_level {
        let mut item = Item::new();
        walker.apply_attributes(&mut item, element);
        walker.populate(&mut item, element, true);
        data.add_item(item);
    }
}

/// How an element takes part in the item currently being built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeState<'a> {
    /// `itemscope itemprop`: a nested item attached under each name
    NestedItem { names: &'a str },
    /// `itemprop` only: a value for the current item
    Property { names: &'a str },
    /// `itemscope` only, below the item being opened: walked on its own
    SeparateItem,
    Transparent,
}

impl<'a> ScopeState<'a> {
    fn of(element: &ElementRef<'a>, opening: bool) -> Self {
        let el = element.value();
        let has_scope = el.attr(ITEMSCOPE).is_some();

        match el.attr(ITEMPROP) {
            Some(names) if has_scope => ScopeState::NestedItem { names },
            Some(names) => ScopeState::Property { names },
            None if has_scope && !opening => ScopeState::SeparateItem,
            None => ScopeState::Transparent,
        }
    }
}

struct ScopeWalker<'a, 'i> {
    base_url: Option<&'i Url>,
    identified: &'i HashMap<&'a str, ElementRef<'a>>,
    /// Referenced elements currently being expanded; breaks `itemref` cycles
    expanding: Vec<ElementRef<'a>>,
}

impl<'a> ScopeWalker<'a, '_> {
    fn populate(&mut self, item: &mut Item, element: ElementRef<'a>, opening: bool) {
        match ScopeState::of(&element, opening) {
            ScopeState::NestedItem { names } => {
                let mut nested = Item::new();
                self.apply_attributes(&mut nested, element);
                self.populate_children(&mut nested, element);
                attach_nested(item, names, nested);
                return;
            }
            ScopeState::Property { names } => {
                let extracted = extract_value(&element, self.base_url);
                if !extracted.value.is_empty() {
                    for name in names.split_whitespace() {
                        match &extracted.inner_html {
                            Some(html) => {
                                item.add_property_with_html(name, extracted.value.clone(), html.clone())
                            }
                            None => item.add_property(name, extracted.value.as_str().into()),
                        }
                    }
                }
            }
            ScopeState::SeparateItem => return,
            ScopeState::Transparent => {}
        }

        self.populate_children(item, element);
    }

    fn populate_children(&mut self, item: &mut Item, element: ElementRef<'a>) {
        for child in element.children().filter_map(ElementRef::wrap) {
            self.populate(item, child, false);
        }
    }

    /// Apply itemtype/itemid and pull in itemref targets
    fn apply_attributes(&mut self, item: &mut Item, element: ElementRef<'a>) {
        let el = element.value();

        // itemid only counts on typed items
        if let Some(item_type) = el.attr(ITEMTYPE) {
            for t in item_type.split_whitespace() {
                item.add_type(t);
            }

            if let Some(id) = el.attr(ITEMID).and_then(|id| resolve_url(self.base_url, id)) {
                item.id = Some(id);
            }
        }

        let Some(item_ref) = el.attr(ITEMREF) else {
            return;
        };

        for token in item_ref.split_whitespace() {
            let Some(&target) = self.identified.get(token) else {
                log::debug!("itemref {token:?} matches no element id");
                continue;
            };

            if self.expanding.contains(&target) {
                log::debug!("Skipping cyclic itemref {token:?}");
                continue;
            }

            self.expanding.push(target);
            self.populate(item, target, false);
            self.expanding.pop();
        }
    }
}

fn attach_nested(item: &mut Item, names: &str, nested: Item) {
    let names: Vec<&str> = names.split_whitespace().collect();
    if let Some((last, rest)) = names.split_last() {
        for name in rest {
            item.add_property(name, PropertyValue::Item(nested.clone()));
        }
        item.add_property(last, PropertyValue::Item(nested));
    }
}

/// Value of a property element
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct ExtractedValue {
    pub(crate) value: String,
    /// Serialized children; only set when `value` is text content
    pub(crate) inner_html: Option<String>,
}

pub(crate) fn extract_value(element: &ElementRef<'_>, base_url: Option<&Url>) -> ExtractedValue {
    let el = element.value();
    let url_attr = |reference: Option<&str>| reference.and_then(|r| resolve_url(base_url, r));

    let value = match el.name() {
        "meta" => el.attr("content").map(String::from),
        "audio" | "embed" | "iframe" | "source" | "track" | "video" => url_attr(el.attr("src")),
        "img" => url_attr(el.attr("data-src").or_else(|| el.attr("src"))),
        "a" | "area" | "link" => url_attr(el.attr("href")),
        "data" | "meter" => el.attr("value").map(String::from),
        "time" => el.attr("datetime").map(String::from),
        _ => match el.attr("content") {
            Some(content) => Some(content.to_string()),
            None => {
                return ExtractedValue {
                    value: element.text().collect(),
                    inner_html: Some(element.inner_html()),
                };
            }
        },
    };

    ExtractedValue {
        value: value.unwrap_or_default(),
        inner_html: None,
    }
}

/// Parse a base URL; empty or invalid input means no base
pub(crate) fn parse_base_url(base_url: Option<&str>) -> Option<Url> {
    let raw = base_url.map(str::trim).filter(|s| !s.is_empty())?;
    match Url::parse(raw) {
        Ok(url) => Some(url),
        Err(e) => {
            log::debug!("Ignoring invalid base URL {raw:?}: {e}");
            None
        }
    }
}

/// Resolve a reference against the base URL.
///
/// Without a base, absolute references pass through and relative ones are
/// normalised to a root-relative form such as `/images/house.jpeg`.
pub(crate) fn resolve_url(base_url: Option<&Url>, reference: &str) -> Option<String> {
    let resolved = match base_url {
        Some(base) => base.join(reference).map(String::from),
        None => resolve_without_base(reference),
    };

    match resolved {
        Ok(url) => Some(url),
        Err(e) => {
            log::debug!("Cannot resolve URL {reference:?}: {e}");
            None
        }
    }
}

// Stand-in origin, stripped again after joining
const RELATIVE_ORIGIN: &str = "http://relative.invalid/";
const RELATIVE_HOST: &str = "relative.invalid";

fn resolve_without_base(reference: &str) -> Result<String, url::ParseError> {
    match Url::parse(reference) {
        Err(url::ParseError::RelativeUrlWithoutBase) => {}
        other => return other.map(String::from),
    }

    let reference = reference.trim();
    if reference.starts_with('?') || reference.starts_with('#') {
        return Ok(reference.to_string());
    }

    let joined = Url::parse(RELATIVE_ORIGIN)?.join(reference)?;
    if joined.host_str() == Some(RELATIVE_HOST) {
        Ok(joined[Position::BeforePath..].to_string())
    } else {
        // Protocol-relative reference to another host
        Ok(joined[Position::AfterScheme..].trim_start_matches(':').to_string())
    }
}
