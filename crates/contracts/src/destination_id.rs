//! DestinationId - provider-assigned chat identifier
//!
//! Stable within one catalog snapshot; display names are never used for identity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a broadcast destination.
///
/// Wraps the numeric peer id reported by the chat provider. Copy-cheap, so it is
/// passed by value everywhere (exclusion sets, events, metrics labels).
///
/// # Examples
/// ```
/// use contracts::DestinationId;
///
/// let id: DestinationId = "-100123".parse().unwrap();
/// assert_eq!(id, DestinationId::new(-100123));
/// assert_eq!(id.to_string(), "-100123");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DestinationId(i64);

impl DestinationId {
    #[inline]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw provider value
    #[inline]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for DestinationId {
    #[inline]
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl From<DestinationId> for i64 {
    #[inline]
    fn from(id: DestinationId) -> Self {
        id.0
    }
}

impl FromStr for DestinationId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self)
    }
}

impl fmt::Display for DestinationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_parse_trims_whitespace() {
        let id: DestinationId = " 42 ".parse().unwrap();
        assert_eq!(id.get(), 42);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("abc".parse::<DestinationId>().is_err());
    }

    #[test]
    fn test_serde_is_transparent() {
        let json = serde_json::to_string(&DestinationId::new(-7)).unwrap();
        assert_eq!(json, "-7");
        let back: DestinationId = serde_json::from_str("15").unwrap();
        assert_eq!(back, DestinationId::new(15));
    }

    #[test]
    fn test_set_membership() {
        let set: HashSet<DestinationId> = [1, 2, 3].into_iter().map(DestinationId::new).collect();
        assert!(set.contains(&DestinationId::new(2)));
        assert!(!set.contains(&DestinationId::new(4)));
    }
}
