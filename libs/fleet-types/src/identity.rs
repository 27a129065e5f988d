//! Worker identity parsed from instance hostnames.
//!
//! Every instance derives which input shard it owns from its own hostname:
//! the launcher names instances `{base_name}{index}`, so stripping
//! everything up to and including the identity token leaves the index.

use std::fmt;

use serde::Serialize;

/// Token that terminates the hostname prefix. `yt-scraper3` -> `3`.
pub const IDENTITY_TOKEN: &str = "scraper";

/// Object-store prefix under which per-group manifests live.
pub const MANIFEST_PREFIX: &str = "manifests";

/// Identity of one worker instance, keyed off its hostname suffix.
///
/// A hostname without a suffix after the token (or without the token at
/// all) yields an empty identity. That is a legal value: callers that need
/// a shard-specific manifest must check [`GroupId::is_empty`] and fail
/// before fetching, rather than fetching an ambiguous object path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupId(String);

impl GroupId {
    /// Parse a group ID from a hostname by stripping the prefix up to and
    /// including `token`.
    pub fn from_hostname(hostname: &str, token: &str) -> Self {
        match hostname.find(token) {
            Some(pos) => Self(hostname[pos + token.len()..].to_string()),
            None => Self(String::new()),
        }
    }

    /// The raw identity string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when no identity could be parsed from the hostname.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Full object-store URL of this group's manifest.
    pub fn manifest_object(&self, bucket: &str) -> String {
        format!("gs://{}/{}/group_{}.txt", bucket, MANIFEST_PREFIX, self.0)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
