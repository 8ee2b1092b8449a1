//! FFI interface for C/C++ interop
//!
//! Provides C-compatible functions for extracting microdata from HTML.
//! Options go in and results come out as JSON strings.

use std::ffi::{c_char, CStr, CString};
use std::ptr;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{ExtractOptions, FetchOptions};
use crate::error::MicrodataError;
use crate::extractors::extract_all;
use crate::fetch::fetch_microdata_blocking;

/// Result struct returned to C/C++
/// Both pointers are owned by Rust and must be freed via free_extraction_result
#[repr(C)]
#[derive(Debug)]
pub struct ExtractionResultFFI {
    /// JSON-serialized Microdata (null-terminated)
    pub json_ptr: *mut c_char,
    /// Error message if extraction failed (null-terminated), or null on success
    pub error_ptr: *mut c_char,
}

/// Extract microdata and JSON-LD items from HTML.
///
/// # Arguments
/// * `html_ptr` - Pointer to HTML content (UTF-8, not necessarily null-terminated)
/// * `html_len` - Length of HTML content in bytes
/// * `options_json` - JSON-serialized ExtractOptions (null-terminated), or null for defaults
///
/// # Returns
/// ExtractionResultFFI with either json_ptr set (success) or error_ptr set (failure)
///
/// # Safety
/// - `html_ptr` must point to valid memory of at least `html_len` bytes
/// - `options_json` must be null or a valid null-terminated C string
/// - Caller must free the result via `free_extraction_result`
#[no_mangle]
pub unsafe extern "C" fn extract_microdata_ffi(
    html_ptr: *const c_char,
    html_len: usize,
    options_json: *const c_char,
) -> ExtractionResultFFI {
    let html = if html_ptr.is_null() || html_len == 0 {
        ""
    } else {
        let slice = std::slice::from_raw_parts(html_ptr as *const u8, html_len);
        match std::str::from_utf8(slice) {
            Ok(s) => s,
            Err(_) => return make_error_result("Invalid UTF-8 in HTML content"),
        }
    };

    let options: ExtractOptions = match parse_options(options_json) {
        Ok(o) => o,
        Err(e) => return make_error_result(&e.to_string()),
    };

    make_json_result(&extract_all(html, &options))
}

/// Fetch a URL and extract its items.
///
/// # Safety
/// - `url` must be a valid null-terminated C string
/// - `options_json` must be null or a valid null-terminated C string holding FetchOptions
/// - Caller must free the result via `free_extraction_result`
#[no_mangle]
pub unsafe extern "C" fn fetch_microdata_ffi(
    url: *const c_char,
    options_json: *const c_char,
) -> ExtractionResultFFI {
    let url = if url.is_null() {
        return make_error_result("URL is null");
    } else {
        match CStr::from_ptr(url).to_str() {
            Ok(s) => s,
            Err(_) => return make_error_result("Invalid UTF-8 in URL"),
        }
    };

    let options: FetchOptions = match parse_options(options_json) {
        Ok(o) => o,
        Err(e) => return make_error_result(&e.to_string()),
    };

    match fetch_microdata_blocking(url, &options) {
        Ok(data) => make_json_result(&data),
        Err(e) => make_error_result(&e.to_string()),
    }
}

/// Free an ExtractionResultFFI returned by this library
///
/// # Safety
/// - `result` must have been returned by `extract_microdata_ffi` or `fetch_microdata_ffi`
/// - Must only be called once per result
#[no_mangle]
pub unsafe extern "C" fn free_extraction_result(result: ExtractionResultFFI) {
    if !result.json_ptr.is_null() {
        drop(CString::from_raw(result.json_ptr));
    }
    if !result.error_ptr.is_null() {
        drop(CString::from_raw(result.error_ptr));
    }
}

// Null means defaults
unsafe fn parse_options<T: DeserializeOwned + Default>(
    options_json: *const c_char,
) -> Result<T, MicrodataError> {
    if options_json.is_null() {
        return Ok(T::default());
    }

    let raw = CStr::from_ptr(options_json)
        .to_str()
        .map_err(|_| MicrodataError::Options("invalid UTF-8".to_string()))?;
    if raw.trim().is_empty() {
        return Ok(T::default());
    }

    serde_json::from_str(raw).map_err(|e| MicrodataError::Options(e.to_string()))
}

fn make_json_result<T: Serialize>(value: &T) -> ExtractionResultFFI {
    match serde_json::to_string(value) {
        Ok(json) => match CString::new(json) {
            Ok(cstr) => ExtractionResultFFI {
                json_ptr: cstr.into_raw(),
                error_ptr: ptr::null_mut(),
            },
            Err(_) => make_error_result("Result JSON contains null bytes"),
        },
        Err(e) => make_error_result(&format!("Failed to serialize result: {}", e)),
    }
}

fn make_error_result(msg: &str) -> ExtractionResultFFI {
    let error_cstr = CString::new(msg.replace('\0', "")).unwrap_or_default();
    ExtractionResultFFI {
        json_ptr: ptr::null_mut(),
        error_ptr: error_cstr.into_raw(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Microdata;

    unsafe fn take_json(result: ExtractionResultFFI) -> Result<String, String> {
        let out = if result.error_ptr.is_null() {
            Ok(CStr::from_ptr(result.json_ptr).to_str().unwrap().to_string())
        } else {
            Err(CStr::from_ptr(result.error_ptr).to_str().unwrap().to_string())
        };
        free_extraction_result(result);
        out
    }

    #[test]
    fn test_extract_ffi_roundtrip() {
        let html = r#"<div itemscope itemtype="https://schema.org/Thing"><a itemprop="url" href="/x">x</a></div>"#;
        let options = CString::new(r#"{"base_url": "https://example.com/"}"#).unwrap();

        let json = unsafe {
            take_json(extract_microdata_ffi(
                html.as_ptr() as *const c_char,
                html.len(),
                options.as_ptr(),
            ))
        }
        .unwrap();

        let data: Microdata = serde_json::from_str(&json).unwrap();
        assert_eq!(data.items.len(), 1);
        assert_eq!(data.items[0].get_text(&["url"]), Some("https://example.com/x"));
    }

    #[test]
    fn test_extract_ffi_null_input() {
        let json = unsafe { take_json(extract_microdata_ffi(ptr::null(), 0, ptr::null())) }.unwrap();
        assert_eq!(json, r#"{"items":[]}"#);
    }

    #[test]
    fn test_extract_ffi_bad_options() {
        let html = "<p></p>";
        let options = CString::new("{base_url:").unwrap();
        let err = unsafe {
            take_json(extract_microdata_ffi(
                html.as_ptr() as *const c_char,
                html.len(),
                options.as_ptr(),
            ))
        }
        .unwrap_err();
        assert!(err.starts_with("invalid extraction options"));
    }

    #[test]
    fn test_extract_ffi_invalid_utf8() {
        let bytes = [0xffu8, 0xfe, 0xfd];
        let err = unsafe {
            take_json(extract_microdata_ffi(
                bytes.as_ptr() as *const c_char,
                bytes.len(),
                ptr::null(),
            ))
        }
        .unwrap_err();
        assert_eq!(err, "Invalid UTF-8 in HTML content");
    }

    #[test]
    fn test_fetch_ffi_null_url() {
        let err = unsafe { take_json(fetch_microdata_ffi(ptr::null(), ptr::null())) }.unwrap_err();
        assert_eq!(err, "URL is null");
    }
}
