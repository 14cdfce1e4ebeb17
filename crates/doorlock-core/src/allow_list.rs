//! Fixed set of authorized card identifiers.
//!
//! An [`AllowList`] is built once from configuration and never changes while
//! the controller runs. Lookups use exact byte-sequence equality: a UID that
//! is a prefix of an entry, or that an entry is a prefix of, does not match.

use serde::{Deserialize, Serialize};

use crate::types::{AccessDecision, CardUid};

/// Immutable list of authorized identifiers.
///
/// # Examples
///
/// ```
/// use doorlock_core::{AccessDecision, AllowList, CardUid};
///
/// let list = AllowList::new(vec!["12345678".parse().unwrap()]);
///
/// let card: CardUid = "12 34 56 78".parse().unwrap();
/// assert_eq!(list.check(&card), AccessDecision::Granted { entry: 0 });
///
/// let stranger: CardUid = "00000000".parse().unwrap();
/// assert_eq!(list.check(&stranger), AccessDecision::Denied);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllowList {
    entries: Vec<CardUid>,
}

impl AllowList {
    /// Create an allow-list from the given entries, in priority order.
    pub fn new(entries: Vec<CardUid>) -> Self {
        Self { entries }
    }

    /// Compare `uid` against every entry; the first match wins.
    #[must_use]
    pub fn check(&self, uid: &CardUid) -> AccessDecision {
        self.find(uid)
            .map_or(AccessDecision::Denied, |entry| AccessDecision::Granted { entry })
    }

    /// Index of the first entry equal to `uid`, if any.
    #[must_use]
    pub fn find(&self, uid: &CardUid) -> Option<usize> {
        self.entries.iter().position(|entry| entry == uid)
    }

    /// Returns `true` if `uid` is authorized.
    #[must_use]
    pub fn contains(&self, uid: &CardUid) -> bool {
        self.find(uid).is_some()
    }

    /// Entry at `index`, if present.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&CardUid> {
        self.entries.get(index)
    }

    /// All entries, in priority order.
    pub fn entries(&self) -> &[CardUid] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<CardUid> for AllowList {
    fn from_iter<I: IntoIterator<Item = CardUid>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn uid(s: &str) -> CardUid {
        s.parse().unwrap()
    }

    fn reference_list() -> AllowList {
        AllowList::new(vec![uid("12345678"), uid("ABCDEF01"), uid("23456789")])
    }

    #[rstest]
    #[case("12345678", 0)]
    #[case("ABCDEF01", 1)]
    #[case("23456789", 2)]
    fn test_authorized_cards_are_granted(#[case] card: &str, #[case] entry: usize) {
        assert_eq!(
            reference_list().check(&uid(card)),
            AccessDecision::Granted { entry }
        );
    }

    #[rstest]
    #[case("00000000")]
    #[case("12345679")] // last byte differs
    #[case("78563412")] // reversed
    #[case("1234567800")] // entry is a prefix
    #[case("12345678ABCDEF")] // 7-byte UID starting with an entry
    fn test_other_cards_are_denied(#[case] card: &str) {
        assert_eq!(reference_list().check(&uid(card)), AccessDecision::Denied);
    }

    #[test]
    fn test_first_match_wins() {
        let list = AllowList::new(vec![uid("01020304"), uid("0A0B0C0D"), uid("01020304")]);
        assert_eq!(list.find(&uid("01020304")), Some(0));
    }

    #[test]
    fn test_empty_list_denies_everything() {
        let list = AllowList::new(Vec::new());
        assert!(list.is_empty());
        assert_eq!(list.check(&uid("12345678")), AccessDecision::Denied);
    }

    #[test]
    fn test_collect_and_accessors() {
        let list: AllowList = ["12345678", "ABCDEF01"].into_iter().map(uid).collect();
        assert_eq!(list.len(), 2);
        assert!(list.contains(&uid("abcdef01")));
        assert_eq!(list.get(1), Some(&uid("ABCDEF01")));
        assert_eq!(list.get(2), None);
        assert_eq!(list.entries().len(), 2);
    }
}
