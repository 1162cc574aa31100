use std::time::Duration;

use ustr::Ustr;

/// Request timeout applied to every REST call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client-side lifetime of an admin token; matches the server's one hour expiry.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);

pub const DEFAULT_LOCALE: &str = "zh";

#[derive(Debug, Clone)]
pub struct BusinessConfig {
    /// Origin of the portal, e.g. `https://mc.example.com`. Empty means same-origin.
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub session_ttl: Duration,
    /// Language tag sent with admin calls that produce localized messages.
    pub locale: String,
}

impl BusinessConfig {
    pub fn new(base_url: String) -> Self {
        Self {
            api_base_url: base_url,
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn api_url(&self) -> Ustr {
        let base = self.api_base_url.trim_end_matches('/');
        if base.is_empty() {
            Ustr::from("/api")
        } else {
            Ustr::from(&format!("{base}/api"))
        }
    }
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            session_ttl: DEFAULT_SESSION_TTL,
            locale: DEFAULT_LOCALE.to_owned(),
        }
    }
}
