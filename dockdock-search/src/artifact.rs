//! Per-candidate artifact outcomes and their classification.
//!
//! Fetching a candidate's `docker-compose.yml` never produces a
//! [`crate::SearchError`]. Every outcome is an [`ArtifactResult`] value so
//! the enricher can drop failed candidates without any chance of a
//! per-candidate failure escalating into a request failure.

use base64::Engine as _;
use reqwest::StatusCode;

/// Outcome of fetching the artifact from one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactResult {
    /// The artifact exists; decoded text content.
    Found(String),
    /// The repository has no such file (HTTP 404). Expected, not a failure.
    NotFound,
    /// Network failure, 5xx or 429. Might succeed later.
    TransientError(String),
    /// Unexpected 4xx, malformed payload or undecodable content.
    FatalError(String),
}

/// Classify a non-success contents-endpoint status.
///
/// - 404 is [`ArtifactResult::NotFound`]
/// - 408, 429 and every 5xx are [`ArtifactResult::TransientError`]
/// - any other status is [`ArtifactResult::FatalError`]
pub fn classify_status(status: StatusCode) -> ArtifactResult {
    match status {
        StatusCode::NOT_FOUND => ArtifactResult::NotFound,
        StatusCode::TOO_MANY_REQUESTS | StatusCode::REQUEST_TIMEOUT => {
            ArtifactResult::TransientError(format!("HTTP {}", status.as_u16()))
        }
        s if s.is_server_error() => ArtifactResult::TransientError(format!("HTTP {}", s.as_u16())),
        s => ArtifactResult::FatalError(format!("unexpected HTTP {}", s.as_u16())),
    }
}

/// Decode the base64 `content` field of a contents-endpoint payload.
///
/// GitHub wraps the encoded text at 60 columns, so ASCII whitespace is
/// stripped before decoding. Invalid base64 or non-UTF-8 bytes give
/// [`ArtifactResult::FatalError`].
pub fn decode_content(encoded: &str) -> ArtifactResult {
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    let bytes = match base64::engine::general_purpose::STANDARD.decode(compact.as_bytes()) {
        Ok(bytes) => bytes,
        Err(e) => return ArtifactResult::FatalError(format!("invalid base64 content: {e}")),
    };

    match String::from_utf8(bytes) {
        Ok(text) => ArtifactResult::Found(text),
        Err(e) => ArtifactResult::FatalError(format!("content is not UTF-8: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(text: &str) -> String {
        base64::engine::general_purpose::STANDARD.encode(text)
    }

    #[test]
    fn not_found_is_not_a_failure() {
        assert_eq!(classify_status(StatusCode::NOT_FOUND), ArtifactResult::NotFound);
    }

    #[test]
    fn server_errors_and_throttling_are_transient() {
        for status in [
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::BAD_GATEWAY,
            StatusCode::SERVICE_UNAVAILABLE,
            StatusCode::TOO_MANY_REQUESTS,
        ] {
            assert!(
                matches!(classify_status(status), ArtifactResult::TransientError(_)),
                "{status} should be transient"
            );
        }
    }

    #[test]
    fn unexpected_client_errors_are_fatal() {
        for status in [
            StatusCode::BAD_REQUEST,
            StatusCode::FORBIDDEN,
            StatusCode::UNPROCESSABLE_ENTITY,
        ] {
            assert!(
                matches!(classify_status(status), ArtifactResult::FatalError(_)),
                "{status} should be fatal"
            );
        }
    }

    #[test]
    fn failures_never_carry_content() {
        for status in [StatusCode::BAD_GATEWAY, StatusCode::BAD_REQUEST, StatusCode::NOT_FOUND] {
            assert!(!matches!(classify_status(status), ArtifactResult::Found(_)));
        }
    }

    #[test]
    fn decodes_plain_base64() {
        let result = decode_content(&encode("services:\n  web:\n    image: nginx\n"));
        assert_eq!(
            result,
            ArtifactResult::Found("services:\n  web:\n    image: nginx\n".into())
        );
    }

    #[test]
    fn decodes_line_wrapped_base64() {
        let text = concat!(
            "version: '3.8'\n",
            "services:\n",
            "  db:\n",
            "    image: postgres:16\n",
            "    environment:\n",
            "      POSTGRES_DB: app\n",
        );
        let encoded = encode(text);
        let wrapped: String = encoded
            .as_bytes()
            .chunks(60)
            .map(|chunk| format!("{}\n", String::from_utf8_lossy(chunk)))
            .collect();
        assert!(wrapped.contains('\n'));
        assert_eq!(decode_content(&wrapped), ArtifactResult::Found(text.to_owned()));
    }

    #[test]
    fn invalid_base64_is_fatal() {
        assert!(matches!(
            decode_content("!!! not base64 !!!"),
            ArtifactResult::FatalError(_)
        ));
    }

    #[test]
    fn non_utf8_is_fatal() {
        let encoded = base64::engine::general_purpose::STANDARD.encode([0xff, 0xfe, 0xfd]);
        let result = decode_content(&encoded);
        assert!(matches!(result, ArtifactResult::FatalError(ref m) if m.contains("UTF-8")));
    }
}
