//! # mb-notify
//!
//! Client for the notification microservice that emails mentors.
//!
//! The only message today is the overdue-report reminder, POSTed as JSON to
//! `{base_url}/report-reminders` with the key in an `x-api-key` header.

mod error;
mod http;

pub use error::NotifyError;

use std::time::Duration;

use chrono::NaiveDate;
use mb_config::NotificationConfig;
use serde::{Deserialize, Serialize};

use crate::http::check_response;

/// Body of a report reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportReminder {
    pub student_session_id: String,
    pub mentor_email: String,
    pub mentor_name: String,
    pub student_name: String,
    pub attend_on: NaiveDate,
    pub days_overdue: i64,
}

/// Result of one reminder in [`NotifyClient::send_all`].
#[derive(Debug)]
pub struct SendOutcome {
    pub student_session_id: String,
    pub result: Result<(), NotifyError>,
}

/// HTTP client for the notification service.
#[derive(Debug, Clone)]
pub struct NotifyClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl NotifyClient {
    /// # Errors
    ///
    /// Returns [`NotifyError::NotConfigured`] when the URL or key is unset,
    /// or [`NotifyError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &NotificationConfig) -> Result<Self, NotifyError> {
        if !config.is_configured() {
            return Err(NotifyError::NotConfigured);
        }
        let http = reqwest::Client::builder()
            .user_agent(concat!("mentorbase/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self::with_http(http, config))
    }

    fn with_http(http: reqwest::Client, config: &NotificationConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    /// # Errors
    ///
    /// Returns [`NotifyError::RateLimited`] on 429, [`NotifyError::Api`] on
    /// other failures, and [`NotifyError::Http`] for transport errors.
    pub async fn send_report_reminder(&self, reminder: &ReportReminder) -> Result<(), NotifyError> {
        let resp = self
            .http
            .post(self.endpoint("report-reminders"))
            .header("x-api-key", &self.api_key)
            .json(reminder)
            .send()
            .await?;
        check_response(resp).await?;
        tracing::debug!(student_session = %reminder.student_session_id, "report reminder sent");
        Ok(())
    }

    /// Send reminders one at a time. A failure is recorded and the rest
    /// are still sent.
    pub async fn send_all(&self, reminders: &[ReportReminder]) -> Vec<SendOutcome> {
        let mut outcomes = Vec::with_capacity(reminders.len());
        for reminder in reminders {
            let result = self.send_report_reminder(reminder).await;
            if let Err(ref e) = result {
                tracing::warn!(student_session = %reminder.student_session_id, %e, "report reminder failed");
            }
            outcomes.push(SendOutcome {
                student_session_id: reminder.student_session_id.clone(),
                result,
            });
        }
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;

    fn config(base_url: &str) -> NotificationConfig {
        NotificationConfig {
            base_url: base_url.into(),
            api_key: "secret".into(),
            ..NotificationConfig::default()
        }
    }

    fn reminder(id: &str) -> ReportReminder {
        ReportReminder {
            student_session_id: id.into(),
            mentor_email: "jo@example.org".into(),
            mentor_name: "Jo Bloggs".into(),
            student_name: "Mia Tran".into(),
            attend_on: NaiveDate::from_ymd_opt(2026, 2, 7).unwrap(),
            days_overdue: 10,
        }
    }

    /// Serve one canned response per connection, reporting each raw request.
    async fn fake_service(responses: Vec<&'static str>) -> (String, mpsc::UnboundedReceiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            for response in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                loop {
                    let n = socket.read(&mut chunk).await.unwrap();
                    buf.extend_from_slice(&chunk[..n]);
                    let text = String::from_utf8_lossy(&buf).to_string();
                    if let Some(head_end) = text.find("\r\n\r\n") {
                        let length = text[..head_end]
                            .lines()
                            .find_map(|l| {
                                let (name, value) = l.split_once(':')?;
                                name.eq_ignore_ascii_case("content-length")
                                    .then(|| value.trim().parse::<usize>().ok())
                                    .flatten()
                            })
                            .unwrap_or(0);
                        if buf.len() >= head_end + 4 + length {
                            break;
                        }
                    }
                    if n == 0 {
                        break;
                    }
                }
                tx.send(String::from_utf8_lossy(&buf).to_string()).unwrap();
                socket.write_all(response.as_bytes()).await.unwrap();
                socket.shutdown().await.unwrap();
            }
        });
        (format!("http://{addr}/api/"), rx)
    }

    #[test]
    fn unconfigured_client_refused() {
        let err = NotifyClient::new(&NotificationConfig::default()).unwrap_err();
        assert!(matches!(err, NotifyError::NotConfigured));
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let client = NotifyClient::new(&config("https://notify.example.org/api/")).unwrap();
        assert_eq!(
            client.endpoint("report-reminders"),
            "https://notify.example.org/api/report-reminders"
        );
    }

    #[tokio::test]
    async fn send_all_continues_after_failure() {
        let (base_url, mut requests) = fake_service(vec![
            "HTTP/1.1 429 Too Many Requests\r\nRetry-After: 5\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            "HTTP/1.1 202 Accepted\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        ])
        .await;
        // Bypass any proxy configured in the environment.
        let http = reqwest::Client::builder().no_proxy().build().unwrap();
        let client = NotifyClient::with_http(http, &config(&base_url));

        let outcomes = client.send_all(&[reminder("sts-1"), reminder("sts-2")]).await;
        assert_eq!(outcomes.len(), 2);
        assert!(matches!(
            outcomes[0].result,
            Err(NotifyError::RateLimited { retry_after_secs: 5 })
        ));
        assert!(outcomes[1].result.is_ok());
        assert_eq!(outcomes[1].student_session_id, "sts-2");

        let first = requests.recv().await.unwrap();
        assert!(first.starts_with("POST /api/report-reminders HTTP/1.1"));
        assert!(first.to_ascii_lowercase().contains("x-api-key: secret"));
        assert!(first.contains(r#""student_session_id":"sts-1""#));
    }
}
