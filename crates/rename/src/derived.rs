use crate::{RuleMode, RuleParameters};
use orderly_board::{Item, ItemId};
use std::fmt::{Display, Formatter, Result as FmtResult};
use time::UtcDateTime;

/// Identifies the derived items produced by a single rename action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey(String);
impl GroupKey {
    /// Build the key from the prefix in effect and the creation time:
    /// `{prefix}-{unix millis}`, with `group` standing in for a blank prefix.
    ///
    /// Two renames with the same prefix inside one millisecond get the same
    /// key (and the same derived ids); callers keeping several groups must
    /// refuse a key they already hold.
    pub fn new(prefix: &str, created_at: UtcDateTime) -> Self {
        let prefix = match prefix.trim() {
            "" => "group",
            p => p,
        };
        let millis = created_at.unix_timestamp_nanos() / 1_000_000;
        Self(format!("{prefix}-{millis}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl From<String> for GroupKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}
impl From<&str> for GroupKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
impl Display for GroupKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// A renamed copy of a board [`Item`].
///
/// Lives independently of its source: removing the source item from the
/// board leaves derived copies in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedItem {
    /// Copy of the source item under a new id, with the derived name as its
    /// display name.
    pub item: Item,
    pub derived_name: String,
    /// Lookup reference to the item this was derived from.
    pub source_id: ItemId,
    pub parameters: RuleParameters,
    pub group_key: GroupKey,
    pub created_at: UtcDateTime,
}
impl DerivedItem {
    pub fn mode(&self) -> RuleMode {
        self.parameters.mode
    }
}

/// A display/upload group: all derived items sharing a [`GroupKey`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group<'a> {
    pub key: &'a GroupKey,
    pub items: Vec<&'a DerivedItem>,
}

/// Cluster derived items by group key. Groups appear in the order their
/// first item appears; items keep their relative order within a group.
pub fn group_derived(items: &[DerivedItem]) -> Vec<Group<'_>> {
    let mut groups: Vec<Group<'_>> = Vec::new();
    for item in items {
        match groups.iter_mut().find(|group| *group.key == item.group_key) {
            Some(group) => group.items.push(item),
            None => groups.push(Group { key: &item.group_key, items: vec![item] }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(seconds: i64) -> UtcDateTime {
        UtcDateTime::from_unix_timestamp(seconds).unwrap()
    }

    fn derived(id: &str, group: &str) -> DerivedItem {
        DerivedItem {
            item: Item::new(id, "x.png", 1, "image/png"),
            derived_name: format!("{id}.png"),
            source_id: ItemId::from("source"),
            parameters: RuleParameters::default(),
            group_key: GroupKey::from(group),
            created_at: at(0),
        }
    }

    #[test]
    fn test_group_key_format() {
        assert_eq!(GroupKey::new("SKU1", at(1_700_000_000)).as_str(), "SKU1-1700000000000");
        assert_eq!(GroupKey::new("  ", at(1)).as_str(), "group-1000");
    }

    #[test]
    fn test_group_derived_preserves_order() {
        let items = [derived("a", "g1"), derived("b", "g2"), derived("c", "g1")];
        let groups = group_derived(&items);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key.as_str(), "g1");
        let ids: Vec<_> = groups[0].items.iter().map(|d| d.item.id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);
        assert_eq!(groups[1].items.len(), 1);
    }
}
