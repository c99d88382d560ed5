//! Mail transport adapters.
//!
//! [`HttpMailRelay`] posts each email as JSON to a relay endpoint.
//! [`LogOnlyMailer`] is used when no relay is configured and only records
//! what would have been sent.

mod http_relay;

use async_trait::async_trait;
use tracing::info;

use crate::domain::OutboundEmail;
use crate::domain::ports::{EmailTransport, EmailTransportError};

pub use http_relay::HttpMailRelay;

/// Mailer that logs instead of delivering.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOnlyMailer;

#[async_trait]
impl EmailTransport for LogOnlyMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), EmailTransportError> {
        info!(
            to = %email.to,
            subject = %email.subject,
            "mail relay not configured; email not sent"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EmailAddress;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn log_only_mailer_reports_success() {
        let email = OutboundEmail::deleted(
            EmailAddress::new("ada@example.com").expect("to"),
            "Printer on fire",
        );

        LogOnlyMailer.send(&email).await.expect("logged");
    }
}
