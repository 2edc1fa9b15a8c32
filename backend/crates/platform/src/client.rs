//! Caller identification for gated endpoints
//!
//! The access gate records who called which API, and rejects keys that are
//! not worth a policy lookup.

use axum::http::HeaderMap;
use std::net::IpAddr;

/// Caller address for the audit trail.
///
/// The first entry of `X-Forwarded-For` wins when it parses; otherwise the
/// socket peer is used.
pub fn extract_client_ip(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> Option<IpAddr> {
    if let Some(xff) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok())
        && let Some(first_ip) = xff.split(',').next()
        && let Ok(ip) = first_ip.trim().parse::<IpAddr>()
    {
        return Some(ip);
    }
    direct_ip
}

/// API name used by the policy store: the first path segment.
///
/// `/HRldap` and `/HRldap/anything` both yield `HRldap`. The root path
/// yields an empty name, which the policy store rejects.
pub fn api_name_from_path(path: &str) -> &str {
    path.trim_start_matches('/').split('/').next().unwrap_or_default()
}

/// Access keys are plain ASCII alphanumerics.
pub fn is_valid_access_key(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_client_ip_xff() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("192.168.1.1, 10.0.0.1"),
        );

        let ip = extract_client_ip(&headers, None);
        assert_eq!(ip, Some("192.168.1.1".parse().unwrap()));
    }

    #[test]
    fn test_extract_client_ip_bad_xff_falls_back() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("unknown"));
        let direct: IpAddr = "10.1.2.3".parse().unwrap();

        assert_eq!(extract_client_ip(&headers, Some(direct)), Some(direct));
    }

    #[test]
    fn test_extract_client_ip_direct() {
        let headers = HeaderMap::new();
        let direct: IpAddr = "127.0.0.1".parse().unwrap();

        let ip = extract_client_ip(&headers, Some(direct));
        assert_eq!(ip, Some(direct));
    }

    #[test]
    fn test_api_name_from_path() {
        assert_eq!(api_name_from_path("/HRldap"), "HRldap");
        assert_eq!(api_name_from_path("/Loginotp/extra"), "Loginotp");
        assert_eq!(api_name_from_path("Sessiondata"), "Sessiondata");
        assert_eq!(api_name_from_path("/"), "");
    }

    #[test]
    fn test_access_key_format() {
        assert!(is_valid_access_key("AbC123xyz"));
        assert!(!is_valid_access_key(""));
        assert!(!is_valid_access_key("abc-123"));
        assert!(!is_valid_access_key("abc 123"));
        assert!(!is_valid_access_key("ключ"));
    }
}
