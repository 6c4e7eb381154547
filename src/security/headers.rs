//! Trust-bearing header relay.
//!
//! # Responsibilities
//! - Capture the fixed identity header set from an inbound request
//! - Echo the inbound request path as a `Path` header
//! - Re-apply the captured set onto outbound calls, overwriting
//!
//! # Design Decisions
//! - The key set is fixed; absent headers relay as empty values, never absent keys
//! - No other inbound header is ever forwarded

use axum::http::{
    header::{AUTHORIZATION, COOKIE},
    HeaderMap, HeaderName, HeaderValue,
};

pub const X_CSRF_TOKEN: HeaderName = HeaderName::from_static("x-csrf-token");
pub const CLIENT_TYPE: HeaderName = HeaderName::from_static("client-type");
pub const PATH: HeaderName = HeaderName::from_static("path");

/// Relayed header names, in relay order.
pub static RELAYED_HEADER_NAMES: [HeaderName; 5] =
    [AUTHORIZATION, X_CSRF_TOKEN, COOKIE, CLIENT_TYPE, PATH];

/// Header snapshot taken from one inbound request for the outbound calls it makes.
#[derive(Debug, Clone)]
pub struct RelayedHeaders {
    values: [HeaderValue; 5],
}

impl RelayedHeaders {
    /// Capture the relayed set from inbound headers and the request path.
    pub fn extract(headers: &HeaderMap, path: &str) -> Self {
        let captured = |name: &HeaderName| {
            headers
                .get(name)
                .cloned()
                .unwrap_or_else(|| HeaderValue::from_static(""))
        };
        let path =
            HeaderValue::from_str(path).unwrap_or_else(|_| HeaderValue::from_static(""));

        Self {
            values: [
                captured(&AUTHORIZATION),
                captured(&X_CSRF_TOKEN),
                captured(&COOKIE),
                captured(&CLIENT_TYPE),
                path,
            ],
        }
    }

    /// Set every relayed header on `target`, replacing existing values.
    pub fn apply(&self, target: &mut HeaderMap) {
        for (name, value) in self.iter() {
            target.insert(name.clone(), value.clone());
        }
    }

    /// Relayed headers as an owned map, ready for `RequestBuilder::headers`.
    pub fn to_header_map(&self) -> HeaderMap {
        let mut map = HeaderMap::with_capacity(RELAYED_HEADER_NAMES.len());
        self.apply(&mut map);
        map
    }

    /// Iterate `(name, value)` pairs in relay order.
    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &HeaderValue)> {
        RELAYED_HEADER_NAMES.iter().zip(self.values.iter())
    }

    /// Value of a relayed header as text; empty when absent or not valid text.
    pub fn get(&self, name: &HeaderName) -> &str {
        self.iter()
            .find(|(n, _)| *n == name)
            .and_then(|(_, v)| v.to_str().ok())
            .unwrap_or("")
    }

    pub fn authorization(&self) -> &str {
        self.get(&AUTHORIZATION)
    }

    pub fn client_type(&self) -> &str {
        self.get(&CLIENT_TYPE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_always_yields_five_keys() {
        let relayed = RelayedHeaders::extract(&HeaderMap::new(), "/api/v1/me");

        let names: Vec<_> = relayed.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(
            names,
            ["authorization", "x-csrf-token", "cookie", "client-type", "path"]
        );
        assert_eq!(relayed.authorization(), "");
        assert_eq!(relayed.get(&PATH), "/api/v1/me");
    }

    #[test]
    fn test_extract_ignores_unrelated_headers() {
        let mut inbound = HeaderMap::new();
        inbound.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        inbound.insert("client-type", HeaderValue::from_static("web"));
        inbound.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.1"));

        let map = RelayedHeaders::extract(&inbound, "/files").to_header_map();
        assert_eq!(map.len(), 5);
        assert!(map.get("x-forwarded-for").is_none());
        assert_eq!(map.get(AUTHORIZATION).unwrap(), "Bearer abc");
        assert_eq!(map.get("client-type").unwrap(), "web");
        assert_eq!(map.get("cookie").unwrap(), "");
    }

    #[test]
    fn test_apply_overwrites_existing_values() {
        let mut inbound = HeaderMap::new();
        inbound.insert(COOKIE, HeaderValue::from_static("sid=1"));
        let relayed = RelayedHeaders::extract(&inbound, "/");

        let mut outbound = HeaderMap::new();
        outbound.append(COOKIE, HeaderValue::from_static("stale=1"));
        outbound.append(COOKIE, HeaderValue::from_static("stale=2"));
        outbound.insert("accept", HeaderValue::from_static("*/*"));
        relayed.apply(&mut outbound);

        assert_eq!(outbound.get_all(COOKIE).iter().count(), 1);
        assert_eq!(outbound.get(COOKIE).unwrap(), "sid=1");
        assert_eq!(outbound.get("accept").unwrap(), "*/*");
    }
}
