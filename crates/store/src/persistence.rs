//! Per-page persisted records.
//!
//! Four logical records, all JSON blobs in a [`KeyValueStorage`]:
//!
//! | key | value |
//! |---|---|
//! | `<ns>_panelCollapsed_v1` | boolean |
//! | `<ns>_showOnlyMarked_v1` | boolean |
//! | `<ns>_marks_v1::<url>` | array of POI ids |
//! | `<ns>_colorTags_v1::<url>` | array of `{ "id", "colorTag" }` |

use poi_dom::DomNode;
use poi_outline::Poi;
use poi_traits::{KeyValueStorage, StorageError};
use poi_types::{ColorTag, PoiId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

#[derive(Debug, Serialize, Deserialize)]
struct ColorTagRecord {
    id: String,
    #[serde(rename = "colorTag")]
    color_tag: String,
}

#[derive(Debug, Clone)]
pub struct AnnotationRepository {
    storage: Rc<dyn KeyValueStorage>,
    namespace: String,
}

impl AnnotationRepository {
    pub fn new(storage: Rc<dyn KeyValueStorage>, namespace: impl Into<String>) -> Self {
        Self {
            storage,
            namespace: namespace.into(),
        }
    }

    pub fn panel_collapsed_key(&self) -> String {
        format!("{}_panelCollapsed_v1", self.namespace)
    }

    pub fn show_only_marked_key(&self) -> String {
        format!("{}_showOnlyMarked_v1", self.namespace)
    }

    pub fn marks_key(&self, url: &str) -> String {
        format!("{}_marks_v1::{}", self.namespace, url)
    }

    pub fn color_tags_key(&self, url: &str) -> String {
        format!("{}_colorTags_v1::{}", self.namespace, url)
    }

    /// Reads a boolean flag. Absent means `false`; any JSON value is accepted and
    /// judged by truthiness.
    pub fn load_flag(&self, key: &str) -> Result<bool, StorageError> {
        let Some(raw) = self.storage.get(key)? else {
            return Ok(false);
        };
        let value = parse_json(key, &raw)?;
        Ok(is_truthy(&value))
    }

    pub fn store_flag(&self, key: &str, value: bool) -> Result<(), StorageError> {
        self.storage.set(key, if value { "true" } else { "false" })
    }

    /// Marked ids for `url`. A record that is not an array counts as empty.
    pub fn load_marks(&self, url: &str) -> Result<HashSet<PoiId>, StorageError> {
        let key = self.marks_key(url);
        let Some(raw) = self.storage.get(&key)? else {
            return Ok(HashSet::new());
        };
        let Value::Array(items) = parse_json(&key, &raw)? else {
            return Ok(HashSet::new());
        };
        let ids = items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(PoiId::from(s)),
                Value::Number(n) => Some(PoiId::from(n.to_string())),
                _ => None,
            })
            .collect();
        Ok(ids)
    }

    /// Writes the ids of every marked entry in `pois`. Stored ids outside
    /// `pois` are kept.
    pub fn store_marks<N: DomNode>(&self, url: &str, pois: &[Poi<N>]) -> Result<usize, StorageError> {
        let key = self.marks_key(url);
        let current = outline_ids(pois);
        let mut carried: Vec<String> = self
            .load_marks(url)
            .unwrap_or_else(|err| {
                log::debug!("overwriting unreadable marks for {}: {}", url, err);
                HashSet::new()
            })
            .into_iter()
            .filter(|id| !current.contains(id.as_str()))
            .map(|id| id.to_string())
            .collect();
        carried.sort();

        let mut ids: Vec<String> = pois
            .iter()
            .filter(|p| p.marked)
            .map(|p| p.id.to_string())
            .collect();
        ids.extend(carried);

        let json = serde_json::to_string(&ids).map_err(|e| StorageError::WriteFailed {
            key: key.clone(),
            message: e.to_string(),
        })?;
        self.storage.set(&key, &json)?;
        Ok(ids.len())
    }

    /// Color tags for `url`. Malformed entries and unknown tags are skipped.
    pub fn load_color_tags(&self, url: &str) -> Result<HashMap<PoiId, ColorTag>, StorageError> {
        let key = self.color_tags_key(url);
        let Some(raw) = self.storage.get(&key)? else {
            return Ok(HashMap::new());
        };
        let Value::Array(items) = parse_json(&key, &raw)? else {
            return Ok(HashMap::new());
        };

        let mut tags = HashMap::new();
        for item in items {
            let Ok(record) = serde_json::from_value::<ColorTagRecord>(item) else {
                continue;
            };
            match record.color_tag.parse::<ColorTag>() {
                Ok(tag) => {
                    tags.insert(PoiId::from(record.id), tag);
                }
                Err(err) => log::debug!("skipping stored color tag for '{}': {}", record.id, err),
            }
        }
        Ok(tags)
    }

    /// Writes the color tag of every tagged entry in `pois`, keeping stored tags
    /// of ids outside `pois`.
    pub fn store_color_tags<N: DomNode>(&self, url: &str, pois: &[Poi<N>]) -> Result<usize, StorageError> {
        let key = self.color_tags_key(url);
        let current = outline_ids(pois);
        let mut carried: Vec<(PoiId, ColorTag)> = self
            .load_color_tags(url)
            .unwrap_or_else(|err| {
                log::debug!("overwriting unreadable color tags for {}: {}", url, err);
                HashMap::new()
            })
            .into_iter()
            .filter(|(id, _)| !current.contains(id.as_str()))
            .collect();
        carried.sort_by(|a, b| a.0.cmp(&b.0));

        let records: Vec<ColorTagRecord> = pois
            .iter()
            .filter_map(|p| p.color_tag.map(|tag| (p.id.clone(), tag)))
            .chain(carried)
            .map(|(id, tag)| ColorTagRecord {
                id: id.to_string(),
                color_tag: tag.as_str().to_string(),
            })
            .collect();
        let json = serde_json::to_string(&records).map_err(|e| StorageError::WriteFailed {
            key: key.clone(),
            message: e.to_string(),
        })?;
        self.storage.set(&key, &json)?;
        Ok(records.len())
    }
}

fn outline_ids<N: DomNode>(pois: &[Poi<N>]) -> HashSet<&str> {
    pois.iter().map(|p| p.id.as_str()).collect()
}

fn parse_json(key: &str, raw: &str) -> Result<Value, StorageError> {
    serde_json::from_str(raw).map_err(|e| StorageError::Corrupt {
        key: key.to_string(),
        message: e.to_string(),
    })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use poi_traits::InMemoryStorage;

    fn repo() -> (Rc<InMemoryStorage>, AnnotationRepository) {
        let storage = Rc::new(InMemoryStorage::new());
        let repo = AnnotationRepository::new(storage.clone(), "test");
        (storage, repo)
    }

    #[test]
    fn keys_are_scoped_by_url() {
        let (_, repo) = repo();
        assert_eq!(repo.marks_key("https://x/c/1"), "test_marks_v1::https://x/c/1");
        assert_eq!(repo.color_tags_key("u"), "test_colorTags_v1::u");
        assert_eq!(repo.panel_collapsed_key(), "test_panelCollapsed_v1");
    }

    #[test]
    fn flags_default_to_false_and_use_truthiness() {
        let (storage, repo) = repo();
        let key = repo.show_only_marked_key();
        assert!(!repo.load_flag(&key).unwrap());
        storage.set(&key, "1").unwrap();
        assert!(repo.load_flag(&key).unwrap());
        storage.set(&key, "\"\"").unwrap();
        assert!(!repo.load_flag(&key).unwrap());
        repo.store_flag(&key, true).unwrap();
        assert_eq!(storage.get(&key).unwrap().as_deref(), Some("true"));
    }

    #[test]
    fn corrupt_records_are_reported() {
        let (storage, repo) = repo();
        storage.set(&repo.marks_key("u"), "{not json").unwrap();
        assert!(matches!(repo.load_marks("u"), Err(StorageError::Corrupt { .. })));
    }

    #[test]
    fn non_array_marks_are_empty() {
        let (storage, repo) = repo();
        storage.set(&repo.marks_key("u"), "{\"a\":1}").unwrap();
        assert!(repo.load_marks("u").unwrap().is_empty());
    }

    #[test]
    fn color_tags_skip_malformed_entries() {
        let (storage, repo) = repo();
        storage
            .set(
                &repo.color_tags_key("u"),
                r#"[{"id":"msg_1_prompt","colorTag":"sky"},{"id":3,"colorTag":"mint"},{"id":"msg_2_response","colorTag":"teal"},null]"#,
            )
            .unwrap();
        let tags = repo.load_color_tags("u").unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags.get("msg_1_prompt"), Some(&ColorTag::Sky));
    }
}
