//! Semantic version parsing and precedence.
//!
//! Accepted dialect:
//! - optional `v` / `V` prefix
//! - one to three numeric release components (`1`, `1.2`, `1.2.3`), missing
//!   components default to zero
//! - optional `-prerelease` made of dot-separated identifiers
//! - optional `+build` metadata, which is discarded

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::ParseVersionError;

/// A comparable semantic version.
///
/// Equality and ordering follow semantic-version precedence: build metadata
/// never takes part, and a pre-release ranks below its release.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SemVersion {
    major: u64,
    minor: u64,
    patch: u64,
    pre: Vec<Identifier>,
}

/// One dot-separated pre-release identifier.
///
/// Variant order matters: numeric identifiers rank below alphanumeric ones.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Identifier {
    Numeric(u64),
    Alpha(String),
}

impl SemVersion {
    /// Creates a release version without pre-release identifiers.
    ///
    /// # Examples
    ///
    /// ```
    /// use retainer_core::SemVersion;
    ///
    /// let v = SemVersion::new(1, 2, 3);
    /// assert_eq!(v.to_string(), "1.2.3");
    /// assert_eq!(v, "v1.2.3".parse().unwrap());
    /// ```
    #[must_use]
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            pre: Vec::new(),
        }
    }

    /// Returns the major component.
    #[must_use]
    pub const fn major(&self) -> u64 {
        self.major
    }

    /// Returns the minor component.
    #[must_use]
    pub const fn minor(&self) -> u64 {
        self.minor
    }

    /// Returns the patch component.
    #[must_use]
    pub const fn patch(&self) -> u64 {
        self.patch
    }

    /// Returns true if the version carries pre-release identifiers.
    #[must_use]
    pub fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }

    fn parse_component(input: &str, component: &str) -> Result<u64, ParseVersionError> {
        if component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseVersionError::InvalidComponent {
                input: input.to_string(),
                component: component.to_string(),
            });
        }

        component
            .parse()
            .map_err(|_| ParseVersionError::InvalidComponent {
                input: input.to_string(),
                component: component.to_string(),
            })
    }

    fn parse_identifier(input: &str, identifier: &str) -> Result<Identifier, ParseVersionError> {
        let invalid = || ParseVersionError::InvalidPrerelease {
            input: input.to_string(),
            identifier: identifier.to_string(),
        };

        if identifier.is_empty()
            || !identifier
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-')
        {
            return Err(invalid());
        }

        if identifier.bytes().all(|b| b.is_ascii_digit()) {
            identifier.parse().map(Identifier::Numeric).map_err(|_| invalid())
        } else {
            Ok(Identifier::Alpha(identifier.to_string()))
        }
    }
}

impl FromStr for SemVersion {
    type Err = ParseVersionError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let body = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);

        if body.is_empty() {
            return Err(ParseVersionError::Empty);
        }

        // Build metadata never affects precedence.
        let body = body.split_once('+').map_or(body, |(head, _)| head);

        let (release, pre) = match body.split_once('-') {
            Some((release, pre)) => (release, Some(pre)),
            None => (body, None),
        };

        let parts: Vec<&str> = release.split('.').collect();
        if parts.len() > 3 {
            return Err(ParseVersionError::TooManyComponents {
                input: input.to_string(),
            });
        }

        let mut numbers = [0_u64; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            *slot = Self::parse_component(input, part)?;
        }

        let pre = match pre {
            Some(pre) => pre
                .split('.')
                .map(|identifier| Self::parse_identifier(input, identifier))
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        Ok(Self {
            major: numbers[0],
            minor: numbers[1],
            patch: numbers[2],
            pre,
        })
    }
}

impl Ord for SemVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then_with(|| self.minor.cmp(&other.minor))
            .then_with(|| self.patch.cmp(&other.patch))
            .then_with(|| match (self.pre.is_empty(), other.pre.is_empty()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => self.pre.cmp(&other.pre),
            })
    }
}

impl PartialOrd for SemVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SemVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        for (i, identifier) in self.pre.iter().enumerate() {
            f.write_str(if i == 0 { "-" } else { "." })?;
            match identifier {
                Identifier::Numeric(n) => write!(f, "{n}")?,
                Identifier::Alpha(s) => f.write_str(s)?,
            }
        }
        Ok(())
    }
}
