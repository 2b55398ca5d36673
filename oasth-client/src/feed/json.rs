//! Extractor for the loose-JSON live endpoints.
//!
//! The live endpoints answer with a flat JSON array of flat objects whose
//! values are all strings: `[{"k":"v",...},{...}]`. That fixed shape is
//! taken apart with plain substring work; this is deliberately not a JSON
//! parser and must not grow into one. Nested objects or arrays and
//! non-string literals are unsupported, and every value keeps its string
//! form for the caller to re-parse.

use std::collections::HashMap;

/// Marker splitting a `"key":"value"` pair.
///
/// Splitting on the quoted form rather than a bare colon keeps colons
/// inside timestamp values intact.
const PAIR_MARKER: &str = "\":\"";

/// Whether a body is one of the known "no data" responses.
///
/// There is no single empty response across the upstream endpoints: some
/// answer `null`, others `[]`, and an invalid parameter answers the same
/// way as a genuinely empty result.
pub(crate) fn is_empty_response(body: &str) -> bool {
    let trimmed = body.trim();
    trimmed.is_empty() || trimmed == "null" || trimmed == "[]"
}

/// Splits a loose-JSON array body into one string map per object.
///
/// A "no data" body yields an empty sequence. A malformed key-value pair
/// (no `":"` marker, or more than one) is dropped silently, which also
/// swallows trailing-comma artifacts.
pub(crate) fn extract_objects(body: &str) -> Vec<HashMap<String, String>> {
    if is_empty_response(body) {
        return Vec::new();
    }

    let trimmed = body.trim();
    let data = trimmed.strip_prefix('[').unwrap_or(trimmed);
    let data = data.strip_suffix(']').unwrap_or(data);

    let mut objects = Vec::new();
    for chunk in data.split('}') {
        // Every object except the first trails the previous one's
        // separator comma; all of them open with a brace.
        let chunk = chunk.strip_prefix(',').unwrap_or(chunk);
        let chunk = chunk.strip_prefix('{').unwrap_or(chunk);
        if chunk.trim().is_empty() {
            continue;
        }

        let mut object = HashMap::new();
        for pair in chunk.split(',') {
            let pieces: Vec<&str> = pair.split(PAIR_MARKER).collect();
            if pieces.len() != 2 {
                continue;
            }
            let key = pieces[0].replace('"', "");
            let value = pieces[1].replace('"', "");
            object.insert(key, value);
        }
        objects.push(object);
    }
    objects
}
