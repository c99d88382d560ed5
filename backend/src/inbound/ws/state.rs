//! Shared WebSocket adapter state.
//!
//! The upgrade handler depends on the [`TicketEventFeed`] port rather than on
//! the concrete hub so tests can drive it with any broadcast source.

use std::sync::Arc;

use url::Url;

use crate::domain::ports::TicketEventFeed;

/// Origins permitted to open the real-time channel.
///
/// Matching compares scheme, host and port of the `Origin` header against
/// each configured entry.
#[derive(Debug, Clone, Default)]
pub struct AllowedOrigins {
    origins: Vec<url::Origin>,
}

impl AllowedOrigins {
    /// Build an allow-list from already parsed URLs.
    pub fn new(urls: impl IntoIterator<Item = Url>) -> Self {
        Self {
            origins: urls.into_iter().map(|url| url.origin()).collect(),
        }
    }

    /// Parse each entry as a URL, returning the first one that fails.
    pub fn parse<I, S>(raw: I) -> Result<Self, url::ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let urls = raw
            .into_iter()
            .map(|value| Url::parse(value.as_ref().trim()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(urls))
    }

    /// Whether `origin` matches an entry.
    pub fn permits(&self, origin: &Url) -> bool {
        let candidate = origin.origin();
        candidate.is_tuple() && self.origins.iter().any(|allowed| *allowed == candidate)
    }

    /// Number of configured origins.
    pub fn len(&self) -> usize {
        self.origins.len()
    }

    /// True when no origin is allowed.
    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }
}

/// Dependency bundle for the WebSocket entry point.
#[derive(Clone)]
pub struct WsState {
    pub feed: Arc<dyn TicketEventFeed>,
    pub origins: AllowedOrigins,
}

impl WsState {
    /// Construct state from a feed and an origin allow-list.
    pub fn new(feed: Arc<dyn TicketEventFeed>, origins: AllowedOrigins) -> Self {
        Self { feed, origins }
    }
}
