use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::settings::Settings;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("graph request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("graph api returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Outbound mail seam. The dispatch pass talks to this trait so tests can
/// stand in a mock instead of the Graph API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), DispatchError>;
}

pub struct GraphMailer {
    client: Client,
    client_id: String,
    client_secret: String,
    token_endpoint: Url,
    send_endpoint: Url,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl GraphMailer {
    pub fn new(
        settings: &Settings,
        token_endpoint: Option<&str>,
        send_endpoint: Option<&str>,
    ) -> GraphMailer {
        let default_token_endpoint = format!(
            "https://login.microsoftonline.com/{}/oauth2/v2.0/token",
            settings.tenant_id
        );
        let default_send_endpoint = format!(
            "https://graph.microsoft.com/v1.0/users/{}/sendMail",
            settings.sender_email
        );
        GraphMailer {
            client: Client::new(),
            client_id: settings.client_id.clone(),
            client_secret: settings.client_secret.clone(),
            token_endpoint: Url::parse(token_endpoint.unwrap_or(&default_token_endpoint))
                .expect("Could not parse token_endpoint"),
            send_endpoint: Url::parse(send_endpoint.unwrap_or(&default_send_endpoint))
                .expect("Could not parse send_endpoint"),
        }
    }

    // Client-credentials grant. A fresh token per send keeps the client
    // stateless; campaign sizes are small enough that caching isn't worth it.
    async fn access_token(&self) -> Result<String, DispatchError> {
        let response = self
            .client
            .post(self.token_endpoint.clone())
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "client_credentials"),
                ("scope", "https://graph.microsoft.com/.default"),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(DispatchError::Rejected {
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl Mailer for GraphMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), DispatchError> {
        let token = self.access_token().await?;
        let payload = json!({
            "message": {
                "subject": subject,
                "body": {
                    "contentType": "HTML",
                    "content": html_body,
                },
                "toRecipients": [
                    {
                        "emailAddress": {
                            "address": to,
                        }
                    }
                ],
            }
        });
        let response = self
            .client
            .post(self.send_endpoint.clone())
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(DispatchError::Rejected {
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        Ok(())
    }
}
