use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::constants::{ARTIFACT_NAME_PREFIX, CANONICAL_EXTENSION};

static ARTIFACT_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^image-(\d{1,19})-(\d{1,10})\.jpg$").expect("artifact name pattern is valid")
});

/// Name under which a canonical image is stored and referenced.
///
/// Always has the form `image-<unix millis>-<random>.jpg`. The name never
/// carries anything supplied by the client, so it is safe to use directly as
/// a storage key and as a URL path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "image-1717171717171-482913377.jpg")]
pub struct ArtifactName(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid artifact name: {0:?}")]
pub struct InvalidArtifactName(pub String);

impl ArtifactName {
    /// Build a name from a millisecond timestamp and a random component.
    pub fn from_parts(timestamp_ms: u64, random: u64) -> Self {
        ArtifactName(format!(
            "{}-{}-{}.{}",
            ARTIFACT_NAME_PREFIX, timestamp_ms, random, CANONICAL_EXTENSION
        ))
    }

    /// Parse a name received from outside (URL path, database row).
    pub fn parse(value: &str) -> Result<Self, InvalidArtifactName> {
        if ARTIFACT_NAME_PATTERN.is_match(value) {
            Ok(ArtifactName(value.to_string()))
        } else {
            Err(InvalidArtifactName(value.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ArtifactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ArtifactName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ArtifactName {
    type Error = InvalidArtifactName;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if ARTIFACT_NAME_PATTERN.is_match(&value) {
            Ok(ArtifactName(value))
        } else {
            Err(InvalidArtifactName(value))
        }
    }
}

impl From<ArtifactName> for String {
    fn from(name: ArtifactName) -> Self {
        name.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts_format() {
        let name = ArtifactName::from_parts(1_717_171_717_171, 42);
        assert_eq!(name.as_str(), "image-1717171717171-42.jpg");
        assert_eq!(ArtifactName::parse(name.as_str()), Ok(name));
    }

    #[test]
    fn test_parse_rejects_foreign_names() {
        for bad in [
            "",
            "photo.jpg",
            "image-1-2.png",
            "image-abc-2.jpg",
            "../image-1-2.jpg",
            "image-1-2.jpg/../../etc/passwd",
            "image-1-2.jpg ",
        ] {
            assert!(ArtifactName::parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_serde_is_a_plain_string() {
        let name = ArtifactName::from_parts(10, 20);
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"image-10-20.jpg\"");

        let back: ArtifactName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, name);

        assert!(serde_json::from_str::<ArtifactName>("\"evil.sh\"").is_err());
    }
}
