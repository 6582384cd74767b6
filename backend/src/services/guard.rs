use actix_web::HttpRequest;

use crate::config::Config;
use crate::error::ApiError;

pub const API_KEY_HEADER: &str = "X-API-Key";

/// Rejects the request unless it carries the configured API key. Open when
/// no key is configured.
pub fn require_api_key(req: &HttpRequest, config: &Config) -> Result<(), ApiError> {
    let Some(expected) = config.api_key.as_deref() else {
        return Ok(());
    };

    match req.headers().get(API_KEY_HEADER) {
        Some(key) if constant_time_eq(key.as_bytes(), expected.as_bytes()) => Ok(()),
        _ => Err(ApiError::Unauthorized),
    }
}

/// Byte comparison whose running time depends only on the lengths, not on
/// where the first difference is.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let len = a.len().max(b.len());
    let mut diff = a.len() ^ b.len();
    for i in 0..len {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        diff |= usize::from(x ^ y);
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn open_without_configured_key() {
        let req = TestRequest::default().to_http_request();
        assert!(require_api_key(&req, &Config::default()).is_ok());
    }

    #[test]
    fn checks_header_against_configured_key() {
        let config = Config {
            api_key: Some("s3cret".into()),
            ..Config::default()
        };

        let missing = TestRequest::default().to_http_request();
        assert!(matches!(require_api_key(&missing, &config), Err(ApiError::Unauthorized)));

        let wrong = TestRequest::default()
            .insert_header((API_KEY_HEADER, "nope"))
            .to_http_request();
        assert!(require_api_key(&wrong, &config).is_err());

        let right = TestRequest::default()
            .insert_header((API_KEY_HEADER, "s3cret"))
            .to_http_request();
        assert!(require_api_key(&right, &config).is_ok());
    }

    #[test]
    fn key_comparison_needs_every_byte_and_the_length() {
        assert!(constant_time_eq(b"s3cret", b"s3cret"));
        assert!(constant_time_eq(b"", b""));
        assert!(!constant_time_eq(b"s3cret", b"s3creT"));
        assert!(!constant_time_eq(b"s3cret", b"s3cret\0"));
        assert!(!constant_time_eq(b"s3cre", b"s3cret"));
        assert!(!constant_time_eq(b"", b"s3cret"));
    }

    #[test]
    fn key_prefix_is_rejected() {
        let config = Config {
            api_key: Some("s3cret".into()),
            ..Config::default()
        };
        for key in ["s3cre", "s3cret ", "S3CRET"] {
            let req = TestRequest::default()
                .insert_header((API_KEY_HEADER, key))
                .to_http_request();
            assert!(matches!(require_api_key(&req, &config), Err(ApiError::Unauthorized)), "{}", key);
        }
    }
}
