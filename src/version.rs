//! Validation of the version string reported by an oftr library
//!
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ProbeError, Result};

/// `<major>.<minor>.<patch> (<commit>) <url>`, any number of spaces before the URL.
pub const VERSION_PATTERN: &str = r"^([0-9]+)\.([0-9]+)\.([0-9]+) \(([0-9a-f]+)\) *<(https://github\.com/byllyfish/oftr)>$";

static VERSION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(VERSION_PATTERN)
        .unwrap_or_else(|e| panic!("BUG: Invalid version regex pattern: {e}"))
});

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionInfo {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub commit: String,
    pub url: String,
}

impl VersionInfo {
    pub fn parse(text: &str) -> Option<Self> {
        let caps = VERSION_REGEX.captures(text)?;
        Some(Self {
            major: caps[1].parse().ok()?,
            minor: caps[2].parse().ok()?,
            patch: caps[3].parse().ok()?,
            commit: caps[4].to_string(),
            url: caps[5].to_string(),
        })
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{} ({})", self.major, self.minor, self.patch, self.commit)
    }
}

pub fn check(text: &str) -> Result<VersionInfo> {
    VersionInfo::parse(text).ok_or_else(|| ProbeError::VersionMismatch {
        actual: text.to_string(),
        pattern: VERSION_PATTERN,
    })
}

#[cfg(test)]
mod tests {
    use super::{check, VersionInfo, VERSION_PATTERN};
    use crate::ProbeError;

    #[test]
    fn accepts_single_space() {
        let info = check("1.14.0 (abcdef1) <https://github.com/byllyfish/oftr>").unwrap();
        assert_eq!(1, info.major);
        assert_eq!(14, info.minor);
        assert_eq!(0, info.patch);
        assert_eq!("abcdef1", info.commit);
        assert_eq!("https://github.com/byllyfish/oftr", info.url);
        assert_eq!("1.14.0 (abcdef1)", info.to_string());
    }

    #[test]
    fn accepts_any_spacing_before_url() {
        assert!(check("0.50.1 (0123456)  <https://github.com/byllyfish/oftr>").is_ok());
        assert!(check("0.50.1 (0123456)<https://github.com/byllyfish/oftr>").is_ok());
    }

    #[test]
    fn rejects_short_version() {
        match check("1.2 (abc)") {
            Err(ProbeError::VersionMismatch { actual, pattern }) => {
                assert_eq!("1.2 (abc)", actual);
                assert_eq!(VERSION_PATTERN, pattern);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed() {
        for text in [
            "",
            "1.14.0 (ABCDEF1) <https://github.com/byllyfish/oftr>",
            "1.14.0 (abcdef1) <https://github.com/byllyfish/oftr> trailing",
            "v1.14.0 (abcdef1) <https://github.com/byllyfish/oftr>",
            "1.14.0 () <https://github.com/byllyfish/oftr>",
            "1.14.0 (abcdef1) <https://github.com/byllyfish/oftrx>",
            "1.14.0 (abcdef1) <https://githubXcom/byllyfish/oftr>",
        ] {
            assert!(VersionInfo::parse(text).is_none(), "{text}");
        }
    }

    #[test]
    fn mismatch_message_shows_text_and_pattern() {
        let err = check("1.2 (abc)").unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("'1.2 (abc)' does not match"), "{msg}");
        assert!(msg.contains(VERSION_PATTERN), "{msg}");
    }
}
