//! Remote store seam

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeSet;

use serde_json::Value;

use obra_core::EntityKind;

use crate::{SyncError, SyncResult};

/// A remote table store keyed by record id.
///
/// Rows are JSON objects whose field names match the entity attributes
/// (`taxId`, `fileNumber`, ...).
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// All rows of the table backing `kind`
    async fn fetch(&self, kind: EntityKind) -> SyncResult<Vec<Value>>;

    /// Insert or replace rows by id
    async fn upsert(&self, kind: EntityKind, rows: Vec<Value>) -> SyncResult<()>;
}

/// Encode records as rows sharing one key set; a bulk upsert rejects rows
/// whose keys differ, so absent optional fields are sent as `null`.
pub(crate) fn encode_rows<T: Serialize>(items: &[T]) -> SyncResult<Vec<Value>> {
    let mut rows = items
        .iter()
        .map(|item| serde_json::to_value(item).map_err(SyncError::from))
        .collect::<SyncResult<Vec<_>>>()?;

    let keys: BTreeSet<String> = rows
        .iter()
        .filter_map(Value::as_object)
        .flat_map(|row| row.keys().cloned())
        .collect();
    for row in rows.iter_mut().filter_map(Value::as_object_mut) {
        for key in &keys {
            row.entry(key.as_str()).or_insert(Value::Null);
        }
    }
    Ok(rows)
}

pub(crate) fn decode_rows<T: DeserializeOwned>(
    kind: EntityKind,
    rows: Vec<Value>,
) -> SyncResult<Vec<T>> {
    rows.into_iter()
        .map(|row| {
            serde_json::from_value(row).map_err(|source| SyncError::Decode {
                table: kind.table_name(),
                source,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use obra_core::{Contractor, EntityId, Rating};

    fn contractor(id: &str, specialty: Option<&str>, rating: Option<Rating>) -> Contractor {
        Contractor {
            id: EntityId::new(id),
            name: "Vial Norte".into(),
            tax_id: "30-1".into(),
            contact: String::new(),
            specialty: specialty.map(str::to_string),
            rating,
        }
    }

    fn keys(row: &Value) -> Vec<&str> {
        row.as_object().unwrap().keys().map(String::as_str).collect()
    }

    #[test]
    fn test_rows_share_one_key_set() {
        let items = vec![
            contractor("c1", Some("Vial"), None),
            contractor("c2", None, Some(Rating::Score(4.0))),
            contractor("c3", None, None),
        ];
        let rows = encode_rows(&items).unwrap();

        let expected = ["contact", "id", "name", "rating", "specialty", "taxId"];
        for row in &rows {
            let mut found = keys(row);
            found.sort_unstable();
            assert_eq!(found, expected);
        }
        assert_eq!(rows[2]["specialty"], Value::Null);
        assert_eq!(rows[2]["rating"], Value::Null);
    }

    #[test]
    fn test_null_padded_rows_decode_back() {
        let items = vec![
            contractor("c1", Some("Vial"), Some(Rating::Label("A".into()))),
            contractor("c2", None, None),
        ];
        let rows = encode_rows(&items).unwrap();
        let back: Vec<Contractor> = decode_rows(EntityKind::Contractor, rows).unwrap();
        assert_eq!(back, items);
    }
}
