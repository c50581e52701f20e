//! Locale identifiers
//!
//! Reference data is localized per BCP 47 locale (`en-US`, `en-ZA`, ...).
//! Locale matching throughout the party domain is case-insensitive, so a
//! request for `EN-us` finds rows stored under `en-US`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use unic_langid::LanguageIdentifier;

/// A locale identifier that failed BCP 47 parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid locale identifier '{0}'")]
pub struct InvalidLocaleError(pub String);

/// A validated locale identifier in canonical form
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LocaleId(String);

impl LocaleId {
    /// Parses and canonicalizes a locale identifier
    ///
    /// # Errors
    ///
    /// Returns [`InvalidLocaleError`] when the value is not a BCP 47 tag
    pub fn parse(value: &str) -> Result<Self, InvalidLocaleError> {
        let langid: LanguageIdentifier = value
            .parse()
            .map_err(|_| InvalidLocaleError(value.to_string()))?;
        Ok(Self(langid.to_string()))
    }

    /// Returns the canonical string form
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the language subtag (`en` for `en-US`)
    pub fn language(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }

    /// Case-insensitive comparison with a raw locale string
    pub fn matches(&self, other: &str) -> bool {
        locale_matches(&self.0, other)
    }
}

/// Case-insensitive locale comparison used by every locale-scoped lookup
pub fn locale_matches(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

impl Default for LocaleId {
    fn default() -> Self {
        Self("en-US".to_string())
    }
}

impl fmt::Display for LocaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LocaleId {
    type Err = InvalidLocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for LocaleId {
    type Error = InvalidLocaleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<LocaleId> for String {
    fn from(locale: LocaleId) -> String {
        locale.0
    }
}

impl AsRef<str> for LocaleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
