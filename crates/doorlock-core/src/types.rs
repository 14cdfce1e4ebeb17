use crate::{
    Result,
    constants::{MAX_UID_LENGTH, MIN_UID_LENGTH},
    error::Error,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use subtle::ConstantTimeEq;

/// Card unique identifier (4-10 bytes) as reported by the reader.
///
/// # Security
/// Equality is evaluated in constant time over the bytes so the allow-list
/// check does not leak how many leading bytes of a guess were correct.
/// Identifiers of different lengths are never equal.
///
/// # Examples
///
/// ```
/// use doorlock_core::CardUid;
///
/// let uid: CardUid = "12:34:56:78".parse().unwrap();
/// assert_eq!(uid.as_bytes(), &[0x12, 0x34, 0x56, 0x78]);
/// assert_eq!(uid.to_string(), "12 34 56 78");
/// assert_eq!(uid.to_decimal_string(), "18, 52, 86, 120");
/// ```
#[derive(Debug, Clone, Eq)]
pub struct CardUid(Vec<u8>);

impl CardUid {
    /// Create a new UID with length validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidUidLength` if the UID is not 4-10 bytes long.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        let len = bytes.len();
        if !(MIN_UID_LENGTH..=MAX_UID_LENGTH).contains(&len) {
            return Err(Error::InvalidUidLength {
                len,
                min: MIN_UID_LENGTH,
                max: MAX_UID_LENGTH,
            });
        }
        Ok(CardUid(bytes))
    }

    /// Raw identifier bytes, in the order the card reported them.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Number of bytes in the identifier.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compact uppercase hex without separators (`12345678`).
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02X}")).collect()
    }

    /// Comma-separated decimal bytes (`18, 52, 86, 120`).
    #[must_use]
    pub fn to_decimal_string(&self) -> String {
        self.0
            .iter()
            .map(u8::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for CardUid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for CardUid {
    type Err = Error;

    /// Parse hex with optional `:`, `-` or space separators between bytes.
    fn from_str(s: &str) -> Result<Self> {
        let digits: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ':' | '-' | ' '))
            .collect();

        if digits.is_empty() || digits.len() % 2 != 0 || !digits.is_ascii() {
            return Err(Error::InvalidUidFormat(format!(
                "expected an even number of hex digits, got '{s}'"
            )));
        }

        let bytes = (0..digits.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&digits[i..i + 2], 16))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| Error::InvalidUidFormat(format!("invalid hex digit in '{s}'")))?;

        CardUid::new(bytes)
    }
}

impl TryFrom<&[u8]> for CardUid {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        CardUid::new(bytes.to_vec())
    }
}

/// Constant-time comparison implementation for CardUid
///
/// `ct_eq` on slices of different lengths returns false without looking at
/// the contents, so a short UID never matches a longer one by prefix.
impl PartialEq for CardUid {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_slice().ct_eq(other.0.as_slice()).into()
    }
}

impl std::hash::Hash for CardUid {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

/// UIDs travel through configuration files as hex strings.
impl Serialize for CardUid {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for CardUid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Outcome of comparing a scanned identifier against the allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessDecision {
    /// The identifier matched the allow-list entry at `entry`.
    Granted { entry: usize },

    /// The identifier matched no entry.
    Denied,
}

impl AccessDecision {
    /// Returns `true` if access was granted.
    #[inline]
    #[must_use]
    pub fn is_granted(self) -> bool {
        matches!(self, AccessDecision::Granted { .. })
    }

    /// Returns `true` if access was denied.
    #[inline]
    #[must_use]
    pub fn is_denied(self) -> bool {
        matches!(self, AccessDecision::Denied)
    }
}

impl fmt::Display for AccessDecision {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AccessDecision::Granted { .. } => write!(f, "Granted"),
            AccessDecision::Denied => write!(f, "Denied"),
        }
    }
}
