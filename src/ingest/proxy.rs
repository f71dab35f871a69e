//! Relay endpoint templates
//!
//! A template wraps the target URL into a request against a CORS relay. Each
//! template is a pure function of the target URL; the gateway builds its
//! candidate list by applying every template in order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::utils::error::FetchError;

/// Placeholder replaced by the target URL verbatim
pub const RAW_PLACEHOLDER: &str = "{url}";

/// Placeholder replaced by the form-encoded target URL
pub const ENCODED_PLACEHOLDER: &str = "{url_encoded}";

/// Relays tried after the direct request, in order
pub const DEFAULT_PROXY_TEMPLATES: &[&str] = &[
    "https://cors.isomorphic-git.org/{url}",
    "https://api.allorigins.win/raw?url={url_encoded}",
    "https://thingproxy.freeboard.io/fetch/{url}",
];

/// A relay URL template containing `{url}` or `{url_encoded}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProxyTemplate {
    template: String,
}

impl ProxyTemplate {
    /// Parse a template string
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidTemplate` when no placeholder is present
    pub fn new(template: impl Into<String>) -> Result<Self, FetchError> {
        let template = template.into();
        if !template.contains(RAW_PLACEHOLDER) && !template.contains(ENCODED_PLACEHOLDER) {
            return Err(FetchError::InvalidTemplate(format!(
                "'{template}' has neither {RAW_PLACEHOLDER} nor {ENCODED_PLACEHOLDER}"
            )));
        }
        Ok(Self { template })
    }

    /// The built-in relay list
    pub fn defaults() -> Vec<Self> {
        DEFAULT_PROXY_TEMPLATES
            .iter()
            .map(|t| Self {
                template: (*t).to_string(),
            })
            .collect()
    }

    /// Build the relay request URL for a target
    ///
    /// # Examples
    ///
    /// ```
    /// use standings::ingest::proxy::ProxyTemplate;
    ///
    /// let relay = ProxyTemplate::new("https://relay.test/raw?url={url_encoded}").unwrap();
    /// assert_eq!(
    ///     relay.build("https://a.test/x?y=1"),
    ///     "https://relay.test/raw?url=https%3A%2F%2Fa.test%2Fx%3Fy%3D1"
    /// );
    /// ```
    pub fn build(&self, target: &str) -> String {
        let encoded: String = form_urlencoded::byte_serialize(target.as_bytes()).collect();
        self.template
            .replace(ENCODED_PLACEHOLDER, &encoded)
            .replace(RAW_PLACEHOLDER, target)
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }
}

impl FromStr for ProxyTemplate {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ProxyTemplate {
    type Error = FetchError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ProxyTemplate> for String {
    fn from(value: ProxyTemplate) -> Self {
        value.template
    }
}

impl fmt::Display for ProxyTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TARGET: &str = "https://docs.google.com/spreadsheets/d/abc/export?format=csv&gid=1";

    #[test]
    fn test_raw_placeholder() {
        let relay = ProxyTemplate::new("https://cors.isomorphic-git.org/{url}").unwrap();
        assert_eq!(
            relay.build(TARGET),
            format!("https://cors.isomorphic-git.org/{TARGET}")
        );
    }

    #[test]
    fn test_encoded_placeholder() {
        let relay = ProxyTemplate::new("https://api.allorigins.win/raw?url={url_encoded}").unwrap();
        let built = relay.build(TARGET);
        assert!(built.starts_with("https://api.allorigins.win/raw?url=https%3A%2F%2F"));
        assert!(!built[30..].contains('&'));
    }

    #[test]
    fn test_template_without_placeholder_rejected() {
        assert!(matches!(
            ProxyTemplate::new("https://relay.test/"),
            Err(FetchError::InvalidTemplate(_))
        ));
    }

    #[test]
    fn test_defaults_order() {
        let defaults = ProxyTemplate::defaults();
        assert_eq!(defaults.len(), 3);
        assert!(defaults[0].as_str().contains("isomorphic-git"));
        assert!(defaults[2].as_str().contains("thingproxy"));
    }

    #[test]
    fn test_serde_validates() {
        let parsed: Result<Vec<ProxyTemplate>, _> =
            serde_json::from_str(r#"["https://r.test/{url}", "https://bad.test/"]"#);
        assert!(parsed.is_err());

        let parsed: Vec<ProxyTemplate> = serde_json::from_str(r#"["https://r.test/{url}"]"#).unwrap();
        assert_eq!(parsed[0].build("x"), "https://r.test/x");
    }
}
