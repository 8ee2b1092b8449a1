//! Tolerant JSON decoding for hand-written linked-data blocks
//!
//! Pages often ship JSON-LD with trailing commas, comments or raw newlines
//! inside strings. Strict parsing is tried first; on failure the text is
//! repaired and parsed again.

use serde_json::Value;

use crate::error::Result;

/// Decode possibly-malformed JSON text
pub fn decode_lenient(text: &str) -> Result<Value> {
    let body = strip_wrappers(text.trim());

    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return Ok(value);
    }

    let repaired = repair(body);
    Ok(serde_json::from_str::<Value>(&repaired)?)
}

/// Remove `<!-- -->` and `<![CDATA[ ]]>` envelopes some CMSes emit
fn strip_wrappers(text: &str) -> &str {
    let mut body = text;
    loop {
        let before = body;
        if let Some(inner) = body
            .strip_prefix("<!--")
            .and_then(|rest| rest.strip_suffix("-->"))
        {
            body = inner.trim();
        }
        if let Some(inner) = body
            .strip_prefix("<![CDATA[")
            .and_then(|rest| rest.strip_suffix("]]>"))
        {
            body = inner.trim();
        }
        if body.len() == before.len() {
            return body;
        }
    }
}

fn repair(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if in_string {
            if escaped {
                escaped = false;
                out.push(c);
            } else {
                match c {
                    '\\' => {
                        escaped = true;
                        out.push(c);
                    }
                    '"' => {
                        in_string = false;
                        out.push(c);
                    }
                    '\n' => out.push_str("\\n"),
                    '\r' => out.push_str("\\r"),
                    '\t' => out.push_str("\\t"),
                    c if c.is_control() && (c as u32) < 0x20 => {}
                    _ => out.push(c),
                }
            }
            i += 1;
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
                i += 1;
            }
            '/' if chars.get(i + 1) == Some(&'/') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    i += 1;
                }
                i += 2;
            }
            ',' => {
                let next = chars[i + 1..]
                    .iter()
                    .find(|ch| !ch.is_whitespace())
                    .copied();
                if !matches!(next, Some('}') | Some(']') | None) {
                    out.push(c);
                }
                i += 1;
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_json() {
        let value = decode_lenient(r#"{"@type": "Person", "name": "Dave"}"#).unwrap();
        assert_eq!(value["name"], "Dave");
    }

    #[test]
    fn test_trailing_commas() {
        let value = decode_lenient(
            r#"{
                "@type": "Recipe",
                "recipeIngredient": ["flour", "sugar",],
            }"#,
        )
        .unwrap();
        assert_eq!(value["recipeIngredient"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_comments_and_raw_newlines() {
        let text = "{\n  // generated\n  \"name\": \"line one\nline two\", /* note */ \"url\": \"https://example.com/a//b\"\n}";
        let value = decode_lenient(text).unwrap();
        assert_eq!(value["name"], "line one\nline two");
        assert_eq!(value["url"], "https://example.com/a//b");
    }

    #[test]
    fn test_wrapped_in_comment() {
        let value = decode_lenient("<!-- {\"@type\": \"Thing\"} -->").unwrap();
        assert_eq!(value["@type"], "Thing");
    }

    #[test]
    fn test_unrecoverable() {
        assert!(decode_lenient("{not json").is_err());
        assert!(decode_lenient("").is_err());
    }
}
