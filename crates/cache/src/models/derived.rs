use crate::error::{Error, ErrorKind, Result};
use crate::models::{Cached, ItemRow};
use exn::ResultExt;
use orderly_board::{BlobRef, Item, ItemId};
use orderly_rename::{DerivedItem, GroupKey, RuleMode, RuleParameters};
use serde::{Deserialize, Serialize};
use time::UtcDateTime;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedRow {
    item: ItemRow,
    derived_name: String,
    source_id: String,
    mode: String,
    #[serde(default)]
    prefix: String,
    #[serde(default)]
    suffix: String,
    #[serde(default)]
    sequence: String,
    group_key: String,
    /// Milliseconds since the Unix epoch.
    created_at: i64,
}
impl TryFrom<&DerivedItem> for DerivedRow {
    type Error = Error;
    fn try_from(derived: &DerivedItem) -> Result<Self> {
        let millis = derived.created_at.unix_timestamp_nanos() / 1_000_000;
        Ok(Self {
            item: ItemRow::from(&derived.item),
            derived_name: derived.derived_name.clone(),
            source_id: derived.source_id.to_string(),
            mode: derived.parameters.mode.as_str().to_string(),
            prefix: derived.parameters.prefix.clone(),
            suffix: derived.parameters.suffix.clone(),
            sequence: derived.parameters.sequence.clone(),
            group_key: derived.group_key.to_string(),
            created_at: i64::try_from(millis).or_raise(|| ErrorKind::InvalidData("created at"))?,
        })
    }
}
impl TryFrom<DerivedRow> for DerivedItem {
    type Error = Error;
    fn try_from(row: DerivedRow) -> Result<Self> {
        let mode = row.mode.parse::<RuleMode>().or_raise(|| ErrorKind::InvalidData("rule mode"))?;
        // Millisecond precision is all that's stored; the group key carries the same.
        let created_at = UtcDateTime::from_unix_timestamp_nanos(i128::from(row.created_at) * 1_000_000)
            .or_raise(|| ErrorKind::InvalidData("created at"))?;
        Ok(Self {
            item: Item::try_from(row.item)?,
            derived_name: row.derived_name,
            source_id: ItemId::from(row.source_id),
            parameters: RuleParameters {
                mode,
                prefix: row.prefix,
                suffix: row.suffix,
                sequence: row.sequence,
            },
            group_key: GroupKey::from(row.group_key),
            created_at,
        })
    }
}

impl Cached for DerivedItem {
    type Row = DerivedRow;

    fn to_row(&self) -> Result<DerivedRow> {
        DerivedRow::try_from(self)
    }

    fn from_row(row: DerivedRow) -> Result<Self> {
        DerivedItem::try_from(row)
    }

    fn blob_mut(&mut self) -> &mut Option<BlobRef> {
        &mut self.item.blob
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn derived() -> DerivedItem {
        let source = Item::new("src", "IMG_1.jpg", 12, "image/jpeg").with_blob(BlobRef::new("blobs/aa.jpg"));
        let params = RuleParameters::new(RuleMode::Amazon).with_prefix("SKU1");
        let at = UtcDateTime::from_unix_timestamp_nanos(1_700_000_000_123_456_789).unwrap();
        orderly_rename::apply_at([&source], &params, at).remove(0)
    }

    #[test]
    fn test_round_trip_truncates_to_millis() {
        let original = derived();
        let restored = DerivedItem::try_from(DerivedRow::try_from(&original).unwrap()).unwrap();
        assert_eq!(restored.item, original.item);
        assert_eq!(restored.derived_name, "SKU1.MAIN.jpg");
        assert_eq!(restored.group_key, original.group_key);
        assert_eq!(restored.parameters, original.parameters);
        assert_eq!(restored.created_at.unix_timestamp_nanos(), 1_700_000_000_123_000_000);
    }

    #[test]
    fn test_rejects_unknown_mode() {
        let mut row = DerivedRow::try_from(&derived()).unwrap();
        row.mode = "ebay".to_string();
        let err = DerivedItem::try_from(row).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidData("rule mode")));
    }
}
