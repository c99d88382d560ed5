//! Application settings loaded via OrthoConfig.
//!
//! Every field may come from the command line, a configuration file, or a
//! `HELPDESK_`-prefixed environment variable. Raw values are kept as loaded;
//! the accessors validate them and apply defaults so a bad value fails at
//! start-up rather than on first use.

use std::net::SocketAddr;

use chrono::TimeDelta;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::{
    AccessPolicy, DEFAULT_NOTIFICATION_QUEUE_CAPACITY, EmailAddress, UnknownAccessPolicy,
};
use crate::inbound::ws::state::AllowedOrigins;
use crate::outbound::security::DEFAULT_TOKEN_TTL_SECONDS;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAIL_FROM: &str = "no-reply@helpdesk.local";
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000";

/// Errors raised when a configured value cannot be used.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// `bind_addr` is not a socket address.
    #[error("invalid bind address `{value}`: {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    /// `access_policy` is not a known policy.
    #[error(transparent)]
    AccessPolicy(#[from] UnknownAccessPolicy),
    /// `mail_relay_url` or an allowed origin is not a URL.
    #[error("invalid URL `{value}`: {source}")]
    Url {
        value: String,
        #[source]
        source: url::ParseError,
    },
    /// `mail_from` is not an email address.
    #[error("invalid sender address `{value}`")]
    MailFrom { value: String },
}

fn seconds_to_delta(seconds: u64) -> Option<TimeDelta> {
    i64::try_from(seconds).ok().and_then(TimeDelta::try_seconds)
}

/// Process-wide configuration for the helpdesk service.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "HELPDESK")]
pub struct AppSettings {
    /// Listen address, e.g. `0.0.0.0:8080`.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; in-memory storage is used when absent.
    pub database_url: Option<String>,
    /// `owner` (default) or `shared`.
    pub access_policy: Option<String>,
    /// Bearer token lifetime in seconds.
    pub token_ttl_seconds: Option<u64>,
    /// Mail relay endpoint; emails are only logged when absent.
    pub mail_relay_url: Option<String>,
    /// Sender address used for outbound email.
    pub mail_from: Option<String>,
    /// Bound of the notification queue.
    pub notification_queue_capacity: Option<usize>,
    /// Comma-separated origins allowed to open the WebSocket.
    pub allowed_origins: Option<String>,
}

impl AppSettings {
    /// Socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::BindAddr`] when the value does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// Configured database URL, if any.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Ticket access policy.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::AccessPolicy`] for unknown labels.
    pub fn access_policy(&self) -> Result<AccessPolicy, SettingsError> {
        match self.access_policy.as_deref() {
            Some(raw) => Ok(raw.parse()?),
            None => Ok(AccessPolicy::default()),
        }
    }

    /// Lifetime of issued bearer tokens; zero or out-of-range values fall
    /// back to the default.
    pub fn token_ttl(&self) -> TimeDelta {
        self.token_ttl_seconds
            .filter(|seconds| *seconds > 0)
            .and_then(seconds_to_delta)
            .or_else(|| seconds_to_delta(DEFAULT_TOKEN_TTL_SECONDS))
            .unwrap_or_else(|| TimeDelta::hours(1))
    }

    /// Relay endpoint and sender address when a relay is configured.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Url`] or [`SettingsError::MailFrom`] when
    /// either value is malformed.
    pub fn mail_relay(&self) -> Result<Option<(Url, EmailAddress)>, SettingsError> {
        let Some(raw) = self.mail_relay_url.as_deref().map(str::trim).filter(|raw| !raw.is_empty())
        else {
            return Ok(None);
        };
        let url = Url::parse(raw).map_err(|source| SettingsError::Url {
            value: raw.to_owned(),
            source,
        })?;
        let from_raw = self.mail_from.as_deref().unwrap_or(DEFAULT_MAIL_FROM);
        let from = EmailAddress::new(from_raw).map_err(|_| SettingsError::MailFrom {
            value: from_raw.to_owned(),
        })?;
        Ok(Some((url, from)))
    }

    /// Capacity of the notification queue.
    pub fn notification_queue_capacity(&self) -> usize {
        self.notification_queue_capacity
            .unwrap_or(DEFAULT_NOTIFICATION_QUEUE_CAPACITY)
    }

    /// Origins allowed to open the real-time channel.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Url`] naming the first entry that does not
    /// parse.
    pub fn allowed_origins(&self) -> Result<AllowedOrigins, SettingsError> {
        let raw = self
            .allowed_origins
            .as_deref()
            .unwrap_or(DEFAULT_ALLOWED_ORIGINS);
        let urls = raw
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                Url::parse(entry).map_err(|source| SettingsError::Url {
                    value: entry.to_owned(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(AllowedOrigins::new(urls))
    }
}
