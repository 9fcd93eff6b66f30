// src/version/mod.rs

//! Version ordering for mod packages
//!
//! Descriptors carry semantic versions without a leading `v`. Ordering
//! follows semver precedence with a few rules the mirror has always applied:
//!
//! - `MAJOR` and `MAJOR.MINOR` are accepted as shorthand (`1.2` is `1.2.0`)
//! - build metadata does not take part in precedence
//! - a string that does not parse (including `v1.0.0`) sorts below every
//!   valid version, so it can only be the newest when nothing valid exists

use semver::{BuildMetadata, Version};
use std::cmp::Ordering;

/// Parse a descriptor version, accepting shorthand forms
///
/// Returns `None` for strings that are not valid versions.
pub fn parse_version(s: &str) -> Option<Version> {
    if let Ok(v) = Version::parse(s) {
        return Some(v);
    }

    // Shorthand only applies to bare numeric components
    let parts: Vec<&str> = s.split('.').collect();
    let numeric = |p: &&str| {
        !p.is_empty()
            && p.bytes().all(|b| b.is_ascii_digit())
            && (p.len() == 1 || !p.starts_with('0'))
    };
    if parts.len() > 2 || !parts.iter().all(numeric) {
        return None;
    }

    let padded = match parts.len() {
        1 => format!("{s}.0.0"),
        _ => format!("{s}.0"),
    };
    Version::parse(&padded).ok()
}

/// Compare two version strings by precedence
///
/// Malformed versions compare below valid ones and equal to each other.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    match (parse_version(a), parse_version(b)) {
        (Some(mut a), Some(mut b)) => {
            a.build = BuildMetadata::EMPTY;
            b.build = BuildMetadata::EMPTY;
            a.cmp(&b)
        }
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

/// Pick the newest of a set of version strings
///
/// Versions of equal precedence (`1.2` and `1.2.0`, or two malformed
/// strings) are decided by plain string order so the result never depends
/// on iteration order.
pub fn newest<'a, I>(versions: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    versions
        .into_iter()
        .max_by(|a, b| compare_versions(a, b).then_with(|| a.cmp(b)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_and_shorthand() {
        assert_eq!(parse_version("1.2.3"), Some(Version::new(1, 2, 3)));
        assert_eq!(parse_version("1.2"), Some(Version::new(1, 2, 0)));
        assert_eq!(parse_version("4"), Some(Version::new(4, 0, 0)));
        assert_eq!(
            parse_version("1.0.0-beta.2").map(|v| v.pre.to_string()),
            Some("beta.2".to_string())
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(parse_version("bogus"), None);
        assert_eq!(parse_version("v1.0.0"), None);
        assert_eq!(parse_version(""), None);
        assert_eq!(parse_version("1.2-beta"), None);
        assert_eq!(parse_version("01.2.3"), None);
        assert_eq!(parse_version("1..2"), None);
    }

    #[test]
    fn test_compare() {
        assert_eq!(compare_versions("1.2.0", "1.10.0"), Ordering::Less);
        assert_eq!(compare_versions("1.0.0", "1.0.0-rc.1"), Ordering::Greater);
        assert_eq!(compare_versions("1.0.0+a", "1.0.0+b"), Ordering::Equal);
        assert_eq!(compare_versions("1.2", "1.2.0"), Ordering::Equal);
        assert_eq!(compare_versions("bogus", "0.0.1"), Ordering::Less);
        assert_eq!(compare_versions("bogus", "junk"), Ordering::Equal);
    }

    #[test]
    fn test_newest() {
        assert_eq!(newest(["1.0.0", "1.2.0"]), Some("1.2.0"));
        assert_eq!(newest(["bogus", "0.9.0"]), Some("0.9.0"));
        assert_eq!(newest(["2.0.0-rc.1", "1.9.9"]), Some("2.0.0-rc.1"));
        assert_eq!(newest(Vec::<&str>::new()), None);
    }

    #[test]
    fn test_newest_is_order_independent() {
        assert_eq!(newest(["1.2", "1.2.0"]), newest(["1.2.0", "1.2"]));
        assert_eq!(newest(["junk", "bogus"]), Some("junk"));
        assert_eq!(newest(["bogus", "junk"]), Some("junk"));
    }

    #[test]
    fn test_newest_of_zero_versions() {
        assert_eq!(newest(["0.0.0"]), Some("0.0.0"));
        assert_eq!(newest(["0.0.0-pre"]), Some("0.0.0-pre"));
        assert_eq!(newest(["0.0.0-pre", "0.0.0"]), Some("0.0.0"));
        assert_eq!(newest(["bogus", "0.0.0-pre"]), Some("0.0.0-pre"));
    }
}
