//! Reqwest-backed mail relay adapter.
//!
//! The relay receives `{from, to, subject, text}` as JSON. Any non-2xx answer
//! is reported as [`EmailTransportError::Rejected`]; delivery is attempted
//! once.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;

use crate::domain::ports::{EmailTransport, EmailTransportError};
use crate::domain::{EmailAddress, OutboundEmail};

#[derive(Debug, Serialize)]
struct RelayMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Mail transport that POSTs to a single relay endpoint.
pub struct HttpMailRelay {
    client: Client,
    endpoint: Url,
    from: EmailAddress,
}

impl HttpMailRelay {
    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, from: EmailAddress, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            from,
        })
    }
}

#[async_trait]
impl EmailTransport for HttpMailRelay {
    async fn send(&self, email: &OutboundEmail) -> Result<(), EmailTransportError> {
        let message = RelayMessage {
            from: self.from.as_ref(),
            to: email.to.as_ref(),
            subject: &email.subject,
            text: &email.text,
        };
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&message)
            .send()
            .await
            .map_err(|err| EmailTransportError::transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EmailTransportError::rejected(status.as_u16()));
        }
        Ok(())
    }
}
