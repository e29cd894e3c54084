// Image Domain Values: locators and blur levels

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::{DomainError, Result};

/// Scheme of an image locator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocatorScheme {
    /// `file:///absolute/path.png`
    File,
    /// `content://media/...`
    Content,
    /// `android.resource://<package>/<type>/<name>`
    Resource,
    Other(String),
}

/// Opaque reference to an image resource (input, intermediate or output)
///
/// The only validation is "not blank"; everything else is up to the
/// content resolver that eventually opens it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageLocator(String);

impl ImageLocator {
    pub const FILE_PREFIX: &'static str = "file://";
    pub const CONTENT_PREFIX: &'static str = "content://";
    pub const RESOURCE_PREFIX: &'static str = "android.resource://";

    pub fn parse(s: impl Into<String>) -> Result<Self> {
        let s = s.into();
        if s.trim().is_empty() {
            return Err(DomainError::InvalidLocator("locator is blank".to_string()));
        }
        Ok(Self(s))
    }

    /// Build a `file://` locator from an absolute path
    pub fn from_path(path: &std::path::Path) -> Self {
        Self(format!("{}{}", Self::FILE_PREFIX, path.display()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn scheme(&self) -> LocatorScheme {
        if self.0.starts_with(Self::FILE_PREFIX) {
            LocatorScheme::File
        } else if self.0.starts_with(Self::CONTENT_PREFIX) {
            LocatorScheme::Content
        } else if self.0.starts_with(Self::RESOURCE_PREFIX) {
            LocatorScheme::Resource
        } else {
            let scheme = self.0.split_once("://").map(|(s, _)| s).unwrap_or_default();
            LocatorScheme::Other(scheme.to_string())
        }
    }

    /// Everything after `<scheme>://`
    pub fn path_part(&self) -> &str {
        self.0
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.0)
    }
}

impl fmt::Display for ImageLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<String> for ImageLocator {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<ImageLocator> for String {
    fn from(value: ImageLocator) -> Self {
        value.0
    }
}

/// Blur level (>= 1), controls the downsample factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct BlurLevel(u32);

impl BlurLevel {
    pub const MIN: BlurLevel = BlurLevel(1);

    pub fn new(level: i64) -> Result<Self> {
        if level < 1 || level > i64::from(u32::MAX) {
            return Err(DomainError::InvalidBlurLevel(level));
        }
        Ok(Self(level as u32))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Divisor applied to both dimensions when downsampling
    pub fn scale_divisor(self) -> u32 {
        self.0.saturating_mul(5)
    }
}

impl Default for BlurLevel {
    fn default() -> Self {
        Self::MIN
    }
}

impl fmt::Display for BlurLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<i64> for BlurLevel {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<BlurLevel> for i64 {
    fn from(value: BlurLevel) -> Self {
        i64::from(value.0)
    }
}

/// A selectable blur option shown on the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlurAmount {
    pub label: &'static str,
    pub level: BlurLevel,
}

impl BlurAmount {
    /// The three options offered to the user
    pub fn options() -> Vec<BlurAmount> {
        vec![
            BlurAmount {
                label: "A little blurred",
                level: BlurLevel(1),
            },
            BlurAmount {
                label: "More blurred",
                level: BlurLevel(2),
            },
            BlurAmount {
                label: "The most blurred",
                level: BlurLevel(3),
            },
        ]
    }
}
