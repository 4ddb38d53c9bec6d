//! Header and cookie extraction.

use http::{header, HeaderMap, HeaderValue};
use signet_core::{RawData, RawValue};

use crate::multi::{collapse, text_pair};
use crate::HeaderValues;

fn header_text(value: &HeaderValue) -> String {
    value.to_str().map_or_else(
        |_| String::from_utf8_lossy(value.as_bytes()).into_owned(),
        ToOwned::to_owned,
    )
}

/// Collects request headers keyed by lowercase name.
pub fn parse_headers(headers: &HeaderMap, mode: HeaderValues) -> RawData {
    match mode {
        HeaderValues::Collapse => collapse(
            headers
                .iter()
                .map(|(name, value)| text_pair((name.as_str().to_owned(), header_text(value)))),
        ),
        HeaderValues::Join => headers
            .keys()
            .map(|name| {
                let joined = headers
                    .get_all(name)
                    .iter()
                    .map(header_text)
                    .collect::<Vec<_>>()
                    .join(", ");
                (name.as_str().to_owned(), RawValue::text(joined))
            })
            .collect(),
    }
}

/// Collects cookies from every `Cookie` header. A later cookie with the
/// same name wins.
pub fn parse_cookies(headers: &HeaderMap) -> RawData {
    let mut data = RawData::new();
    for value in headers.get_all(header::COOKIE) {
        let Ok(value) = value.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }
            if let Some((name, value)) = pair.split_once('=') {
                let value = value.trim().trim_matches('"');
                data.insert(name.trim().to_owned(), RawValue::text(value));
            }
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_collapse_mode() {
        let map = headers(&[("x-token", "a"), ("x-tag", "1"), ("x-tag", "2")]);
        let data = parse_headers(&map, HeaderValues::Collapse);
        assert_eq!(data["x-token"], RawValue::text("a"));
        assert_eq!(
            data["x-tag"],
            RawValue::Many(vec![RawValue::text("1"), RawValue::text("2")])
        );
    }

    #[test]
    fn test_join_mode() {
        let map = headers(&[("x-tag", "1"), ("x-tag", "2")]);
        let data = parse_headers(&map, HeaderValues::Join);
        assert_eq!(data["x-tag"], RawValue::text("1, 2"));
    }

    #[test]
    fn test_cookies() {
        let map = headers(&[
            ("cookie", "session=abc; theme=\"dark\""),
            ("cookie", "session=def"),
        ]);
        let data = parse_cookies(&map);
        assert_eq!(data["session"], RawValue::text("def"));
        assert_eq!(data["theme"], RawValue::text("dark"));
    }

    #[test]
    fn test_cookie_without_value_is_skipped() {
        let map = headers(&[("cookie", "flag; a=1")]);
        let data = parse_cookies(&map);
        assert_eq!(data.len(), 1);
    }
}
