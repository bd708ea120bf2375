//! Shareable-URL handling.
//!
//! The state travels as one query parameter whose value is the JSON
//! snapshot, base64url encoded without padding so it needs no further
//! escaping. Other query parameters and the fragment are left alone.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Query parameter that carries the state.
pub const SHARE_PARAM: &str = "s";

/// Encodes a JSON snapshot as a query parameter value.
pub fn encode_share_value(json: &str) -> String {
    URL_SAFE_NO_PAD.encode(json.as_bytes())
}

/// Decodes a query parameter value back into JSON text.
///
/// Percent-escapes added by whatever relayed the link are undone first.
/// Returns `None` if the value is not base64url or not UTF-8.
pub fn decode_share_value(value: &str) -> Option<String> {
    let unescaped = percent_decode(value)?;
    let bytes = URL_SAFE_NO_PAD
        .decode(unescaped.trim_end_matches('='))
        .ok()?;
    String::from_utf8(bytes).ok()
}

/// Undoes `%XX` escapes. `None` on a truncated or non-hex escape.
fn percent_decode(value: &str) -> Option<String> {
    if !value.contains('%') {
        return Some(value.to_string());
    }

    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = std::str::from_utf8(bytes.get(i + 1..i + 3)?).ok()?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

/// Splits `url` into (base, query, fragment). The query and fragment exclude
/// their leading `?` / `#`.
fn split_url(url: &str) -> (&str, Option<&str>, Option<&str>) {
    let (rest, fragment) = match url.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment)),
        None => (url, None),
    };
    match rest.split_once('?') {
        Some((base, query)) => (base, Some(query), fragment),
        None => (rest, None, fragment),
    }
}

/// Returns the raw value of query parameter `name`, if present.
pub fn query_param<'a>(
    url: &'a str,
    name: &str,
) -> Option<&'a str> {
    let (_, query, _) = split_url(url);
    query?
        .split('&')
        .filter_map(|pair| pair.split_once('=').or(Some((pair, ""))))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// Returns `url` with query parameter `name` set to `value`.
///
/// An existing occurrence is replaced in place; otherwise the parameter is
/// appended.
pub fn with_query_param(
    url: &str,
    name: &str,
    value: &str,
) -> String {
    let (base, query, fragment) = split_url(url);

    let mut pairs: Vec<String> = Vec::new();
    let mut replaced = false;
    for pair in query.unwrap_or("").split('&').filter(|p| !p.is_empty()) {
        let key = pair.split_once('=').map_or(pair, |(key, _)| key);
        if key == name {
            if !replaced {
                pairs.push(format!("{name}={value}"));
                replaced = true;
            }
        } else {
            pairs.push(pair.to_string());
        }
    }
    if !replaced {
        pairs.push(format!("{name}={value}"));
    }

    let mut out = format!("{base}?{}", pairs.join("&"));
    if let Some(fragment) = fragment {
        out.push('#');
        out.push_str(fragment);
    }
    out
}
