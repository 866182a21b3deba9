use std::fmt;

/// Number of leading characters shown by [`Credential::masked`].
const VISIBLE_PREFIX_LEN: usize = 6;

/// An API key issued by the aggregator on successful registration.
///
/// Only constructed from a validated registration response, so holding one
/// means the key is non-empty. `Debug` never prints the key.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Validate a raw key. Returns `None` for empty or whitespace-only input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// The raw key, for the one-time display after sign-up and the bearer header.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Short form safe for the status bar, e.g. `a1b2c3…`.
    pub fn masked(&self) -> String {
        let prefix: String = self.0.chars().take(VISIBLE_PREFIX_LEN).collect();
        format!("{}…", prefix)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}
