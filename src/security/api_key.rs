//! Static API key checks.

use axum::http::HeaderMap;

pub const API_KEY_HEADER: &str = "x-api-key";

/// The keys accepted on the `x-api-key` header, loaded once from config.
#[derive(Debug, Clone)]
pub struct ApiKeys {
    client_keys: Vec<String>,
    automation_key: String,
}

impl ApiKeys {
    pub fn new(client_keys: Vec<String>, automation_key: String) -> Self {
        Self {
            client_keys,
            automation_key,
        }
    }

    fn header_value<'a>(headers: &'a HeaderMap) -> Option<&'a str> {
        headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok())
    }

    /// True when the request carries one of the web/mobile client keys.
    pub fn is_client(&self, headers: &HeaderMap) -> bool {
        Self::header_value(headers)
            .is_some_and(|key| self.client_keys.iter().any(|k| !k.is_empty() && k == key))
    }

    /// True when the request carries the automation (CI pipeline) key.
    pub fn is_automation(&self, headers: &HeaderMap) -> bool {
        Self::header_value(headers)
            .is_some_and(|key| !self.automation_key.is_empty() && key == self.automation_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(key: Option<&str>) -> HeaderMap {
        let mut h = HeaderMap::new();
        if let Some(key) = key {
            h.insert(API_KEY_HEADER, HeaderValue::from_str(key).unwrap());
        }
        h
    }

    fn keys() -> ApiKeys {
        ApiKeys::new(vec!["web".into(), "mobile".into()], "automation".into())
    }

    #[test]
    fn test_client_keys() {
        let k = keys();
        assert!(k.is_client(&headers(Some("web"))));
        assert!(k.is_client(&headers(Some("mobile"))));
        assert!(!k.is_client(&headers(Some("automation"))));
        assert!(!k.is_client(&headers(Some("nope"))));
        assert!(!k.is_client(&headers(None)));
    }

    #[test]
    fn test_automation_key() {
        let k = keys();
        assert!(k.is_automation(&headers(Some("automation"))));
        assert!(!k.is_automation(&headers(Some("web"))));
    }

    #[test]
    fn test_empty_configured_key_never_matches() {
        let k = ApiKeys::new(vec![String::new()], String::new());
        assert!(!k.is_client(&headers(Some(""))));
        assert!(!k.is_automation(&headers(Some(""))));
    }
}
