use crate::error::{FacetError, Result};
use crate::index::snapshot::SnapshotCell;
use crate::types::{FacetKey, FacetKeyRef, Field, Item};
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

/// Immutable item set the engine aggregates over.
///
/// `schema` lists the fields this corpus provides. A facet whose field is
/// missing from the schema is omitted from responses; an empty corpus still
/// provides every field by default.
#[derive(Debug, Clone)]
pub struct CorpusSnapshot {
    items: Vec<Item>,
    schema: BTreeSet<Field>,
    known: HashMap<Field, HashSet<FacetKey>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CorpusDocument {
    Items(Vec<Item>),
    WithSchema {
        items: Vec<Item>,
        #[serde(default)]
        fields: Option<Vec<Field>>,
    },
}

impl CorpusSnapshot {
    pub fn new(items: Vec<Item>) -> Self {
        Self::with_schema(items, Field::ALL)
    }

    pub fn with_schema<I>(items: Vec<Item>, fields: I) -> Self
    where
        I: IntoIterator<Item = Field>,
    {
        let items: Vec<Item> = items.into_iter().map(Item::normalized).collect();
        let schema: BTreeSet<Field> = fields.into_iter().collect();

        let mut known: HashMap<Field, HashSet<FacetKey>> = HashMap::new();
        for field in schema.iter().copied().filter(|f| f.is_categorical()) {
            let values = known.entry(field).or_default();
            values.extend(items.iter().filter_map(|item| item.key(field)).map(FacetKeyRef::to_owned_key));
        }

        CorpusSnapshot {
            items,
            schema,
            known,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Parses either a bare JSON array of items or `{"items": [...], "fields": [...]}`.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let doc: CorpusDocument = serde_json::from_value(value)
            .map_err(|e| FacetError::InvalidCorpus(e.to_string()))?;
        Ok(match doc {
            CorpusDocument::Items(items) => Self::new(items),
            CorpusDocument::WithSchema {
                items,
                fields: Some(fields),
            } => Self::with_schema(items, fields),
            CorpusDocument::WithSchema { items, fields: None } => Self::new(items),
        })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let value: serde_json::Value = serde_json::from_str(&content)?;
        Self::from_json(value)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn schema(&self) -> &BTreeSet<Field> {
        &self.schema
    }

    pub fn provides(&self, field: Field) -> bool {
        self.schema.contains(&field)
    }

    /// Whether any item carries `key` for `field`.
    pub fn knows(&self, field: Field, key: &FacetKey) -> bool {
        self.known
            .get(&field)
            .map_or(false, |values| values.contains(key))
    }
}

impl Default for CorpusSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

/// Supplies the current corpus snapshot for a request.
pub trait CorpusProvider: Send + Sync {
    fn snapshot(&self) -> Arc<CorpusSnapshot>;
}

impl CorpusProvider for Arc<CorpusSnapshot> {
    fn snapshot(&self) -> Arc<CorpusSnapshot> {
        Arc::clone(self)
    }
}

/// In-memory corpus provider refreshed by swapping whole snapshots.
#[derive(Default)]
pub struct CorpusStore {
    cell: SnapshotCell<CorpusSnapshot>,
}

impl CorpusStore {
    pub fn new(snapshot: CorpusSnapshot) -> Self {
        CorpusStore {
            cell: SnapshotCell::new(snapshot),
        }
    }

    /// Loads `{dir}/items.json` if present, otherwise starts empty.
    pub fn load_or_empty<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let path = dir.as_ref().join("items.json");
        if !path.exists() {
            tracing::info!("No items.json in {}, starting with an empty corpus", dir.as_ref().display());
            return Ok(Self::default());
        }
        let snapshot = CorpusSnapshot::load(&path)?;
        tracing::info!(items = snapshot.len(), "Corpus loaded from {}", path.display());
        Ok(Self::new(snapshot))
    }

    /// Installs a new snapshot; in-flight requests keep the old one.
    pub fn replace(&self, snapshot: CorpusSnapshot) -> Arc<CorpusSnapshot> {
        let items = snapshot.len();
        let previous = self.cell.store(snapshot);
        tracing::info!(items, previous_items = previous.len(), "Corpus snapshot replaced");
        previous
    }
}

impl CorpusProvider for CorpusStore {
    fn snapshot(&self) -> Arc<CorpusSnapshot> {
        self.cell.load()
    }
}
