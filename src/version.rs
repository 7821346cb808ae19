use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Schema revision recorded on every persisted snippet.
pub const CURRENT_SCHEMA_VERSION: &str = "0.1.7";

/// Documents below this revision predate `baseFontSize` and still carry
/// the document-level `clearThemeBackground` flag.
pub const BASE_FONT_SIZE_SINCE: &str = "0.1.7";

/// `major.minor.patch` revision of the settings schema.
///
/// Ordering is numeric per component. Pre-release and build suffixes are
/// accepted but ignored, since the schema only ever moves by release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl SchemaVersion {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// The revision this build writes.
    pub fn current() -> Self {
        Self::parse_static(CURRENT_SCHEMA_VERSION)
    }

    /// First revision that carries `baseFontSize`.
    pub fn base_font_size_since() -> Self {
        Self::parse_static(BASE_FONT_SIZE_SINCE)
    }

    fn parse_static(value: &str) -> Self {
        value
            .parse()
            .unwrap_or_else(|err| panic!("built-in schema version {value:?} is invalid: {err}"))
    }

    /// Evaluate `self <op> other`.
    pub fn satisfies(&self, op: VersionOp, other: &SchemaVersion) -> bool {
        op.holds(self.cmp(other))
    }
}

/// Comparison used to gate document-level migration steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionOp {
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
}

impl VersionOp {
    fn holds(self, ordering: Ordering) -> bool {
        match self {
            Self::Lt => ordering == Ordering::Less,
            Self::Le => ordering != Ordering::Greater,
            Self::Eq => ordering == Ordering::Equal,
            Self::Ge => ordering != Ordering::Less,
            Self::Gt => ordering == Ordering::Greater,
        }
    }
}

impl FromStr for VersionOp {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "<" => Ok(Self::Lt),
            "<=" => Ok(Self::Le),
            "=" | "==" => Ok(Self::Eq),
            ">=" => Ok(Self::Ge),
            ">" => Ok(Self::Gt),
            other => Err(VersionParseError::UnknownOperator(other.to_string())),
        }
    }
}

/// Compare two version strings, e.g. `compare("0.1.6", "0.1.7", "<")`.
pub fn compare(a: &str, b: &str, op: &str) -> Result<bool, VersionParseError> {
    let a: SchemaVersion = a.parse()?;
    let b: SchemaVersion = b.parse()?;
    let op: VersionOp = op.parse()?;
    Ok(a.satisfies(op, &b))
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for SchemaVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
        if trimmed.is_empty() {
            return Err(VersionParseError::Empty);
        }

        // Drop `-pre` and `+build` suffixes.
        let core = trimmed
            .split(['-', '+'])
            .next()
            .unwrap_or_default();

        let mut parts = [0_u64; 3];
        let mut count = 0;
        for piece in core.split('.') {
            if count == parts.len() {
                return Err(VersionParseError::TooManyComponents(s.to_string()));
            }
            if piece.is_empty() || !piece.bytes().all(|b| b.is_ascii_digit()) {
                return Err(VersionParseError::InvalidComponent(piece.to_string()));
            }
            parts[count] = piece
                .parse()
                .map_err(|_| VersionParseError::InvalidComponent(piece.to_string()))?;
            count += 1;
        }

        Ok(Self::new(parts[0], parts[1], parts[2]))
    }
}

impl TryFrom<&str> for SchemaVersion {
    type Error = VersionParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Serialize for SchemaVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SchemaVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionParseError {
    Empty,
    InvalidComponent(String),
    TooManyComponents(String),
    UnknownOperator(String),
}

impl fmt::Display for VersionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "version cannot be empty"),
            Self::InvalidComponent(piece) => {
                write!(f, "version component '{piece}' is not a number")
            }
            Self::TooManyComponents(raw) => {
                write!(f, "version '{raw}' has more than three components")
            }
            Self::UnknownOperator(op) => write!(f, "unknown version operator '{op}'"),
        }
    }
}

impl std::error::Error for VersionParseError {}

impl From<VersionParseError> for crate::error::SnippetorError {
    fn from(value: VersionParseError) -> Self {
        Self::InvalidVersion(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_and_partial_versions() {
        assert_eq!("0.1.7".parse::<SchemaVersion>().unwrap(), SchemaVersion::new(0, 1, 7));
        assert_eq!("1.2".parse::<SchemaVersion>().unwrap(), SchemaVersion::new(1, 2, 0));
        assert_eq!("v2".parse::<SchemaVersion>().unwrap(), SchemaVersion::new(2, 0, 0));
    }

    #[test]
    fn ignores_prerelease_and_build_suffixes() {
        let v: SchemaVersion = "0.2.0-beta.1+abc".parse().unwrap();
        assert_eq!(v, SchemaVersion::new(0, 2, 0));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!("".parse::<SchemaVersion>().unwrap_err(), VersionParseError::Empty);
        assert!(matches!(
            "0.x.1".parse::<SchemaVersion>().unwrap_err(),
            VersionParseError::InvalidComponent(_)
        ));
        assert!(matches!(
            "1.2.3.4".parse::<SchemaVersion>().unwrap_err(),
            VersionParseError::TooManyComponents(_)
        ));
    }

    #[test]
    fn orders_numerically_not_lexically() {
        let a: SchemaVersion = "0.1.10".parse().unwrap();
        let b: SchemaVersion = "0.1.9".parse().unwrap();
        assert!(a > b);
    }

    #[test]
    fn compare_supports_every_operator() {
        assert!(compare("0.1.6", "0.1.7", "<").unwrap());
        assert!(compare("0.1.7", "0.1.7", "<=").unwrap());
        assert!(compare("0.1.7", "0.1.7", "==").unwrap());
        assert!(compare("0.2.0", "0.1.7", ">=").unwrap());
        assert!(compare("1.0.0", "0.9.9", ">").unwrap());
        assert!(!compare("0.1.7", "0.1.6", "<").unwrap());
    }

    #[test]
    fn compare_rejects_unknown_operator() {
        let err = compare("0.1.0", "0.1.0", "~").unwrap_err();
        assert_eq!(err, VersionParseError::UnknownOperator("~".into()));
    }

    #[test]
    fn serde_uses_plain_string() {
        let v = SchemaVersion::new(0, 1, 7);
        assert_eq!(serde_json::to_string(&v).unwrap(), "\"0.1.7\"");
        let back: SchemaVersion = serde_json::from_str("\"0.1.7\"").unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn builtin_constants_parse() {
        assert_eq!(SchemaVersion::current().to_string(), CURRENT_SCHEMA_VERSION);
        assert!(SchemaVersion::base_font_size_since() <= SchemaVersion::current());
    }
}
