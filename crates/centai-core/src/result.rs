use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

/// Canonical reference to a generated image
///
/// Always an absolute URL; provider envelopes are reduced to this by the
/// response normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationResult {
    url: Url,
}

impl GenerationResult {
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

impl fmt::Display for GenerationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}
