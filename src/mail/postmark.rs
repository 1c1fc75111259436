//! Postmark transactional email API.
//!
//! Only the single-message endpoint (`POST /email`) is used. Postmark answers
//! with a JSON body on success and on most failures; a non-zero `ErrorCode`
//! means the message was not accepted even when the HTTP status is 200.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::MailError;
use crate::mail::traits::{DeliveryReceipt, EmailSender, OutgoingEmail};

pub const DEFAULT_API_URL: &str = "https://api.postmarkapp.com";
/// Postmark's sandbox token: requests are validated but nothing is delivered
pub const SANDBOX_TOKEN: &str = "POSTMARK_API_TEST";
const TOKEN_HEADER: &str = "X-Postmark-Server-Token";
const PROVIDER: &str = "Postmark";

/// Postmark server API client
pub struct PostmarkClient {
    client: Client,
    endpoint: Url,
    server_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: String,
    subject: &'a str,
    html_body: &'a str,
    text_body: &'a str,
    message_stream: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailResponse {
    #[serde(default)]
    error_code: i64,
    #[serde(default)]
    message: String,
    #[serde(rename = "MessageID", default)]
    message_id: Option<String>,
    #[serde(default)]
    submitted_at: Option<String>,
}

impl PostmarkClient {
    /// Create a client against `api_url` (normally [`DEFAULT_API_URL`])
    pub fn new(api_url: &Url, server_token: &str, timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("parking-scout/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: email_endpoint(api_url),
            server_token: server_token.to_owned(),
        })
    }
}

/// `{api_url}/email`, keeping any path prefix of `api_url`
fn email_endpoint(api_url: &Url) -> Url {
    let mut endpoint = api_url.clone();
    let path = format!("{}/email", api_url.path().trim_end_matches('/'));
    endpoint.set_path(&path);
    endpoint
}

#[async_trait]
impl EmailSender for PostmarkClient {
    async fn send(&self, email: &OutgoingEmail) -> Result<DeliveryReceipt, MailError> {
        if email.to.is_empty() {
            return Err(MailError::NoRecipients);
        }

        info!(
            "Sending email to {} with subject: {}",
            email.to.join(", "),
            email.subject
        );

        let request = SendEmailRequest {
            from: &email.from,
            to: email.to.join(", "),
            subject: &email.subject,
            html_body: &email.html_body,
            text_body: &email.text_body,
            message_stream: &email.message_stream,
        };

        let http_error = |source: reqwest::Error| MailError::Http {
            provider: PROVIDER,
            source,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(ACCEPT, "application/json")
            .header(TOKEN_HEADER, &self.server_token)
            .json(&request)
            .send()
            .await
            .map_err(http_error)?;

        let status = response.status();
        let body = response.text().await.map_err(http_error)?;

        let parsed = serde_json::from_str::<SendEmailResponse>(&body);
        match parsed {
            Ok(reply) if status.is_success() && reply.error_code == 0 => {
                debug!(
                    "Postmark accepted message {:?} at {:?}",
                    reply.message_id, reply.submitted_at
                );
                Ok(DeliveryReceipt {
                    message_id: reply.message_id,
                })
            }
            Ok(reply) => Err(MailError::Rejected {
                provider: PROVIDER,
                status: status.as_u16(),
                code: reply.error_code,
                message: reply.message,
            }),
            Err(_) => Err(MailError::Rejected {
                provider: PROVIDER,
                status: status.as_u16(),
                code: -1,
                message: body.chars().take(200).collect(),
            }),
        }
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_appends_email_path() {
        let url = Url::parse("https://api.postmarkapp.com").unwrap();
        assert_eq!(email_endpoint(&url).as_str(), "https://api.postmarkapp.com/email");

        let url = Url::parse("http://127.0.0.1:8080/proxy/").unwrap();
        assert_eq!(email_endpoint(&url).as_str(), "http://127.0.0.1:8080/proxy/email");
    }

    #[test]
    fn request_uses_postmark_field_names() {
        let request = SendEmailRequest {
            from: "a@example.com",
            to: "b@example.com, c@example.com".to_string(),
            subject: "s",
            html_body: "<p>h</p>",
            text_body: "t",
            message_stream: "outbound",
        };
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["From"], "a@example.com");
        assert_eq!(value["To"], "b@example.com, c@example.com");
        assert_eq!(value["HtmlBody"], "<p>h</p>");
        assert_eq!(value["TextBody"], "t");
        assert_eq!(value["MessageStream"], "outbound");
    }
}
