//! Profile value types flowing through the pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The closed set of recognized profile protocols.
///
/// Resolved once during normalization; scoring and display dispatch as a
/// match over the variant rather than repeated substring tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Vless,
    Hy2,
    Tuic,
    Trojan,
    Ss,
}

impl Protocol {
    /// All recognized protocols, in prefix-test order.
    pub const ALL: [Protocol; 5] = [
        Protocol::Vless,
        Protocol::Hy2,
        Protocol::Tuic,
        Protocol::Trojan,
        Protocol::Ss,
    ];

    /// URI scheme for this protocol.
    pub fn scheme(&self) -> &'static str {
        match self {
            Protocol::Vless => "vless",
            Protocol::Hy2 => "hy2",
            Protocol::Tuic => "tuic",
            Protocol::Trojan => "trojan",
            Protocol::Ss => "ss",
        }
    }

    /// Resolve a URI scheme to a protocol, if recognized.
    pub fn from_scheme(scheme: &str) -> Option<Protocol> {
        Protocol::ALL.iter().copied().find(|p| p.scheme() == scheme)
    }

    /// `scheme://` prefix used when scanning message lines.
    pub fn uri_prefix(&self) -> &'static str {
        match self {
            Protocol::Vless => "vless://",
            Protocol::Hy2 => "hy2://",
            Protocol::Tuic => "tuic://",
            Protocol::Trojan => "trojan://",
            Protocol::Ss => "ss://",
        }
    }

    /// Display emoji for synthesized profile names.
    pub fn emoji(&self) -> &'static str {
        match self {
            Protocol::Vless => "\u{1F320}",  // 🌠
            Protocol::Hy2 => "\u{26A1}",     // ⚡
            Protocol::Tuic => "\u{1F680}",   // 🚀
            Protocol::Trojan => "\u{1F6E1}\u{FE0F}", // 🛡️
            Protocol::Ss => "\u{1F9E6}",     // 🧦
        }
    }

    /// Upper-case display label.
    pub fn label(&self) -> &'static str {
        match self {
            Protocol::Vless => "VLESS",
            Protocol::Hy2 => "HY2",
            Protocol::Tuic => "TUIC",
            Protocol::Trojan => "TROJAN",
            Protocol::Ss => "SS",
        }
    }
}

/// A harvested, not-yet-validated profile URI with its message timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCandidate {
    /// Feed handle the candidate came from.
    pub source_id: String,
    /// Raw profile text as found in the message.
    pub uri: String,
    /// Message timestamp, when one could be parsed.
    pub timestamp: Option<DateTime<Utc>>,
    /// Quality score computed at extraction time.
    pub score: i64,
}

/// A structurally valid candidate: host and port are always present and the
/// protocol is from the allow-list. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedProfile {
    /// Cleaned URI with the synthesized display name as its fragment.
    pub uri: String,
    pub protocol: Protocol,
    pub host: String,
    pub port: u16,
    pub score: i64,
    pub timestamp: Option<DateTime<Utc>>,
    /// Human-readable label, e.g. `🌠 VLESS | TLS`.
    pub display_name: String,
}

impl NormalizedProfile {
    /// The dedup key identifying a unique endpoint.
    pub fn endpoint(&self) -> (&str, u16, Protocol) {
        (self.host.as_str(), self.port, self.protocol)
    }
}
