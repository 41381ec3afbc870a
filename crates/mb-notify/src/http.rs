//! Response status handling for the notification service.

use crate::error::NotifyError;

/// Wait used when a 429 carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Pass successful responses through; map 429 and other failures to
/// [`NotifyError`].
pub(crate) async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, NotifyError> {
    let status = resp.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(NotifyError::RateLimited {
            retry_after_secs: retry_after_secs(&resp),
        });
    }
    if status.is_success() {
        return Ok(resp);
    }
    Err(NotifyError::Api {
        status: status.as_u16(),
        message: resp.text().await.unwrap_or_default(),
    })
}

fn retry_after_secs(resp: &reqwest::Response) -> u64 {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, retry_after: Option<&str>, body: &'static str) -> reqwest::Response {
        let mut builder = ::http::Response::builder().status(status);
        if let Some(value) = retry_after {
            builder = builder.header("Retry-After", value);
        }
        reqwest::Response::from(builder.body(body).unwrap())
    }

    #[test]
    fn retry_after_header_or_default() {
        assert_eq!(retry_after_secs(&response(429, Some("120"), "")), 120);
        assert_eq!(retry_after_secs(&response(429, None, "")), 60);
        // HTTP-date form is not supported.
        assert_eq!(
            retry_after_secs(&response(429, Some("Wed, 21 Oct 2026 07:28:00 GMT"), "")),
            60
        );
    }

    #[tokio::test]
    async fn too_many_requests_is_rate_limited() {
        let err = check_response(response(429, Some("30"), "")).await.unwrap_err();
        assert!(matches!(err, NotifyError::RateLimited { retry_after_secs: 30 }));
    }

    #[tokio::test]
    async fn failure_keeps_body() {
        let err = check_response(response(422, None, "mentor email missing"))
            .await
            .unwrap_err();
        match err {
            NotifyError::Api { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "mentor email missing");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn accepted_passes_through() {
        assert!(check_response(response(202, None, "")).await.is_ok());
    }
}
