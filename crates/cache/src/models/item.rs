use crate::error::{Error, ErrorKind, Result};
use crate::models::Cached;
use orderly_board::{BlobRef, Item, ItemId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRow {
    id: String,
    original_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
    size_bytes: u64,
    mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    blob: Option<String>,
}
impl From<&Item> for ItemRow {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id.to_string(),
            original_name: item.original_name.clone(),
            display_name: item.display_name.clone(),
            size_bytes: item.size_bytes,
            mime_type: item.mime_type.clone(),
            blob: item.blob.as_ref().map(|b| b.as_str().to_string()),
        }
    }
}
impl TryFrom<ItemRow> for Item {
    type Error = Error;
    fn try_from(row: ItemRow) -> Result<Self> {
        if row.id.is_empty() {
            exn::bail!(ErrorKind::InvalidData("item id"));
        }
        Ok(Self {
            id: ItemId::from(row.id),
            original_name: row.original_name,
            display_name: row.display_name,
            size_bytes: row.size_bytes,
            mime_type: row.mime_type,
            blob: row.blob.map(BlobRef::new),
        })
    }
}

impl Cached for Item {
    type Row = ItemRow;

    fn to_row(&self) -> Result<ItemRow> {
        Ok(ItemRow::from(self))
    }

    fn from_row(row: ItemRow) -> Result<Self> {
        Item::try_from(row)
    }

    fn blob_mut(&mut self) -> &mut Option<BlobRef> {
        &mut self.blob
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_omits_empty_fields() {
        let item = Item::new("a", "a.png", 3, "image/png");
        let json = serde_json::to_string(&ItemRow::from(&item)).unwrap();
        assert_eq!(json, r#"{"id":"a","original_name":"a.png","size_bytes":3,"mime_type":"image/png"}"#);
    }

    #[test]
    fn test_row_to_model() {
        let json = r#"{"id":"7","original_name":"IMG_7.jpg","display_name":"cover.jpg","size_bytes":10,"mime_type":"image/jpeg","blob":"blobs/ab.jpg"}"#;
        let item = Item::try_from(serde_json::from_str::<ItemRow>(json).unwrap()).unwrap();
        assert_eq!(item.id.as_str(), "7");
        assert_eq!(item.name(), "cover.jpg");
        assert_eq!(item.blob, Some(BlobRef::new("blobs/ab.jpg")));
    }

    #[test]
    fn test_rejects_empty_id() {
        let row = ItemRow::from(&Item::new("", "a.png", 1, "image/png"));
        let err = Item::try_from(row).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidData("item id")));
    }
}
