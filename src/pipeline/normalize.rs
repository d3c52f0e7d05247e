//! Raw candidate cleaning and canonicalization.
//!
//! Third-party message text is hostile input: rejection here is silent and
//! routine, logged at debug granularity only.

use regex::RegexBuilder;
use tracing::{debug, warn};
use url::Url;

use crate::models::{NormalizedProfile, Protocol, RawCandidate};

/// Cleans raw profile text and builds canonical candidates.
pub struct ProfileNormalizer {
    rules: Vec<regex::Regex>,
}

impl ProfileNormalizer {
    /// Compile the configured cleaning rules. Invalid patterns are skipped
    /// with a warning rather than failing the run.
    pub fn new(cleaning_rules: &[String]) -> Self {
        let rules = cleaning_rules
            .iter()
            .filter_map(|rule| {
                match RegexBuilder::new(rule).case_insensitive(true).build() {
                    Ok(re) => Some(re),
                    Err(e) => {
                        warn!("Ignoring invalid cleaning rule '{}': {}", rule, e);
                        None
                    }
                }
            })
            .collect();
        Self { rules }
    }

    /// Normalize one candidate, or reject it.
    pub fn normalize(&self, candidate: &RawCandidate) -> Option<NormalizedProfile> {
        let cleaned = self.clean(&candidate.uri);

        let parsed = match Url::parse(&cleaned) {
            Ok(u) => u,
            Err(_) => {
                debug!("Rejecting unparsable candidate: {}", truncate(&cleaned));
                return None;
            }
        };

        let Some(protocol) = Protocol::from_scheme(parsed.scheme()) else {
            debug!("Rejecting unknown scheme '{}'", parsed.scheme());
            return None;
        };
        let Some(host) = parsed.host_str() else {
            debug!("Rejecting candidate without host: {}", truncate(&cleaned));
            return None;
        };
        let Some(port) = parsed.port() else {
            debug!("Rejecting candidate without port: {}", truncate(&cleaned));
            return None;
        };

        let security = security_label(protocol, &parsed);
        let display_name = format!("{} {} | {}", protocol.emoji(), protocol.label(), security);

        // Replace whatever fragment the message carried with our label.
        let without_fragment = cleaned.split('#').next().unwrap_or_default();
        let uri = format!("{}#{}", without_fragment, display_name);

        Some(NormalizedProfile {
            uri,
            protocol,
            host: host.to_string(),
            port,
            score: candidate.score,
            timestamp: candidate.timestamp,
            display_name,
        })
    }

    /// Strip noise tokens and artifacts, then percent-decode twice to
    /// unwind double-encoded profiles.
    fn clean(&self, raw: &str) -> String {
        let mut text = raw.to_string();
        for rule in &self.rules {
            text = rule.replace_all(&text, "").into_owned();
        }
        for _ in 0..2 {
            if let Ok(decoded) = urlencoding::decode(&text) {
                text = decoded.into_owned();
            }
        }
        text.trim()
            .replace(' ', "")
            .replace(['\u{0}', '\u{1}'], "")
    }
}

/// Transport-security indicator for the display label.
fn security_label(protocol: Protocol, parsed: &Url) -> &'static str {
    match protocol {
        Protocol::Tuic => "QUIC",
        Protocol::Ss => "Shadowsocks",
        _ => {
            let tls = parsed
                .query_pairs()
                .any(|(k, v)| k == "security" && v == "tls");
            if tls {
                "TLS"
            } else {
                "NoTLS"
            }
        }
    }
}

fn truncate(s: &str) -> &str {
    let mut end = s.len().min(100);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(uri: &str) -> RawCandidate {
        RawCandidate {
            source_id: "chan".to_string(),
            uri: uri.to_string(),
            timestamp: None,
            score: 5,
        }
    }

    fn normalizer() -> ProfileNormalizer {
        ProfileNormalizer::new(&[])
    }

    #[test]
    fn builds_canonical_profile_with_display_fragment() {
        let profile = normalizer()
            .normalize(&candidate(
                "vless://uuid@1.2.3.4:443?security=tls&sni=x#oldname",
            ))
            .unwrap();
        assert_eq!(profile.protocol, Protocol::Vless);
        assert_eq!(profile.host, "1.2.3.4");
        assert_eq!(profile.port, 443);
        assert_eq!(profile.display_name, "\u{1F320} VLESS | TLS");
        assert_eq!(
            profile.uri,
            format!(
                "vless://uuid@1.2.3.4:443?security=tls&sni=x#{}",
                profile.display_name
            )
        );
    }

    #[test]
    fn unknown_scheme_is_rejected() {
        assert!(normalizer()
            .normalize(&candidate("vmess://uuid@1.2.3.4:443"))
            .is_none());
    }

    #[test]
    fn missing_port_is_rejected() {
        assert!(normalizer()
            .normalize(&candidate("trojan://pw@example.com"))
            .is_none());
        assert!(normalizer()
            .normalize(&candidate("garbage text"))
            .is_none());
    }

    #[test]
    fn double_encoded_uris_are_unwound() {
        // '%2540' decodes to '%40' then to '@'.
        let profile = normalizer()
            .normalize(&candidate("ss://YWJj%25401.2.3.4:8388"))
            .unwrap();
        assert_eq!(profile.host, "1.2.3.4");
        assert_eq!(profile.port, 8388);
    }

    #[test]
    fn cleaning_rules_strip_noise_tokens() {
        let normalizer = ProfileNormalizer::new(&["JOIN-OUR-CHANNEL".to_string()]);
        let profile = normalizer
            .normalize(&candidate("hy2://pw@1.2.3.4:443join-our-channel"))
            .unwrap();
        assert_eq!(profile.host, "1.2.3.4");
        assert!(!profile.uri.contains("join"));
    }

    #[test]
    fn normalize_is_idempotent_on_endpoint() {
        let n = normalizer();
        let first = n
            .normalize(&candidate("tuic://uuid:pw@9.9.9.9:443?alpn=h3"))
            .unwrap();
        let second = n.normalize(&candidate(&first.uri)).unwrap();
        assert_eq!(first.endpoint(), second.endpoint());
        assert_eq!(first.display_name, second.display_name);
    }

    #[test]
    fn quic_and_shadowsocks_labels() {
        let n = normalizer();
        let tuic = n
            .normalize(&candidate("tuic://u@1.1.1.1:443"))
            .unwrap();
        assert!(tuic.display_name.ends_with("TUIC | QUIC"));
        let ss = n.normalize(&candidate("ss://YWJj@1.1.1.1:8388")).unwrap();
        assert!(ss.display_name.ends_with("SS | Shadowsocks"));
    }
}
