//! Query target handling: normalization, classification and the extension
//! key used against the root server.

use crate::errors::WhoisError;
use std::net::IpAddr;

/// How a normalized target is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    /// A bare label such as a TLD; the root server answers it directly.
    RootLabel,
    /// A domain, IP literal or AS number that goes through server resolution.
    Registry,
}

/// Trims whitespace and dots from both ends, in any interleaving.
pub fn normalize(raw: &str) -> Result<String, WhoisError> {
    let target = raw.trim_matches(|c: char| c.is_whitespace() || c == '.');
    if target.is_empty() {
        return Err(WhoisError::EmptyTarget);
    }
    Ok(target.to_string())
}

pub fn classify(target: &str) -> TargetKind {
    if contains_as(target) || target.contains('.') || target.contains(':') {
        return TargetKind::Registry;
    }

    if strip_as(target).parse::<f64>().is_ok() {
        TargetKind::Registry
    } else {
        TargetKind::RootLabel
    }
}

/// Key sent to the root server: the last label of a domain, or the whole
/// target for IP literals and anything without dots. Path-like suffixes after
/// `/` are dropped.
pub fn extension(target: &str) -> &str {
    let ext = if target.parse::<IpAddr>().is_ok() {
        target
    } else {
        target.rsplit('.').next().unwrap_or(target)
    };

    match ext.split_once('/') {
        Some((head, _)) => head,
        None => ext,
    }
}

// Plain substring match, not a word boundary: "aspen.example" counts.
fn contains_as(target: &str) -> bool {
    target.to_ascii_lowercase().contains("as")
}

fn strip_as(target: &str) -> String {
    target.to_ascii_uppercase().replace("AS", "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  example.com.  ").unwrap(), "example.com");
        assert_eq!(normalize("example.com...").unwrap(), "example.com");
        assert_eq!(normalize("\tAS15169\n").unwrap(), "AS15169");
        assert_eq!(normalize(".com").unwrap(), "com");
        assert_eq!(normalize(". example.com").unwrap(), "example.com");
        assert_eq!(normalize(" . example.com . \n").unwrap(), "example.com");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in ["  example.com. ", "192.0.2.1", " AS13335..", "2001:db8::1", "com", ". example.com", "example.com . "] {
            let once = normalize(raw).unwrap();
            let twice = normalize(&once).unwrap();
            assert_eq!(once, twice, "normalizing {:?} twice changed it", raw);
        }
    }

    #[test]
    fn test_normalize_rejects_empty() {
        for raw in ["", "   ", "...", " . . ", "\t.\n"] {
            assert!(
                matches!(normalize(raw), Err(WhoisError::EmptyTarget)),
                "expected EmptyTarget for {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_classify_bare_labels() {
        assert_eq!(classify("com"), TargetKind::RootLabel);
        assert_eq!(classify("io"), TargetKind::RootLabel);
        assert_eq!(classify("RADB-MNT"), TargetKind::RootLabel);
    }

    #[test]
    fn test_classify_registry_targets() {
        assert_eq!(classify("example.com"), TargetKind::Registry);
        assert_eq!(classify("192.0.2.1"), TargetKind::Registry);
        assert_eq!(classify("2001:db8::1"), TargetKind::Registry);
        assert_eq!(classify("AS15169"), TargetKind::Registry);
        assert_eq!(classify("as15169"), TargetKind::Registry);
        assert_eq!(classify("15169"), TargetKind::Registry);
    }

    #[test]
    fn test_classify_as_substring_is_not_word_bounded() {
        // Any "as" sends the target to server resolution, even in plain words.
        assert_eq!(classify("gas"), TargetKind::Registry);
        assert_eq!(classify("Asia"), TargetKind::Registry);
        assert_eq!(classify("aspen"), TargetKind::Registry);
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension("foo.bar.com"), "com");
        assert_eq!(extension("example.co.uk"), "uk");
        assert_eq!(extension("192.0.2.1"), "192.0.2.1");
        assert_eq!(extension("2001:db8::1"), "2001:db8::1");
        assert_eq!(extension("com/path"), "com");
        assert_eq!(extension("AS15169"), "AS15169");
    }

    #[test]
    fn test_extension_of_prefixes() {
        // CIDR notation is not an IP literal, so it splits like a domain.
        assert_eq!(extension("192.0.2.0/24"), "0");
        assert_eq!(extension("2001:db8::/32"), "2001:db8::");
    }
}
