//! In-memory knowledge store with category and keyword inverted indexes.
//!
//! The entry table and both indexes are updated together under a single
//! write lock, so readers never observe an entry listed under a stale
//! keyword or category. The store is a cloneable handle; clones share the
//! same underlying data.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use docent_core::types::Category;

use crate::error::{KnowledgeError, Result};
use crate::normalize::normalize;

// =============================================================================
// Entry shapes
// =============================================================================

/// One knowledge-base item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    /// Unique, immutable after creation.
    pub id: Uuid,
    pub category: Category,
    pub question: String,
    pub answer: String,
    pub keywords: Vec<String>,
    /// Strictly increases on every mutation of this entry.
    pub last_updated: DateTime<Utc>,
}

/// Input shape for [`KnowledgeStore::add`] and [`KnowledgeStore::bulk_import`]:
/// an entry without its store-assigned fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewEntry {
    pub category: Category,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl NewEntry {
    pub fn new(
        category: Category,
        question: impl Into<String>,
        answer: impl Into<String>,
        keywords: &[&str],
    ) -> Self {
        Self {
            category,
            question: question.into(),
            answer: answer.into(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Partial update: only the supplied fields change.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EntryPatch {
    pub category: Option<Category>,
    pub question: Option<String>,
    pub answer: Option<String>,
    pub keywords: Option<Vec<String>>,
}

/// Outcome of a bulk import.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
}

/// Aggregate statistics over the store.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StoreStats {
    pub total_entries: usize,
    pub per_category: HashMap<Category, usize>,
    pub distinct_keywords: usize,
    pub last_modified: Option<DateTime<Utc>>,
}

// =============================================================================
// KnowledgeStore
// =============================================================================

#[derive(Debug, Default)]
struct StoreInner {
    entries: HashMap<Uuid, KnowledgeEntry>,
    /// Insertion order of live entries; search tie-breaks rely on it.
    order: Vec<Uuid>,
    by_category: HashMap<Category, HashSet<Uuid>>,
    by_keyword: HashMap<String, HashSet<Uuid>>,
}

impl StoreInner {
    /// Add the entry's id to the category bucket and each normalized keyword
    /// bucket.
    fn index_entry(&mut self, entry: &KnowledgeEntry) {
        self.by_category
            .entry(entry.category)
            .or_default()
            .insert(entry.id);
        for keyword in &entry.keywords {
            let key = normalize(keyword);
            if key.is_empty() {
                continue;
            }
            self.by_keyword.entry(key).or_default().insert(entry.id);
        }
    }

    /// Remove all of the entry's index associations. Empty buckets are
    /// dropped so no stale keys accumulate.
    fn unindex_entry(&mut self, entry: &KnowledgeEntry) {
        if let Some(bucket) = self.by_category.get_mut(&entry.category) {
            bucket.remove(&entry.id);
            if bucket.is_empty() {
                self.by_category.remove(&entry.category);
            }
        }
        for keyword in &entry.keywords {
            let key = normalize(keyword);
            if let Some(bucket) = self.by_keyword.get_mut(&key) {
                bucket.remove(&entry.id);
                if bucket.is_empty() {
                    self.by_keyword.remove(&key);
                }
            }
        }
    }

    fn insert_new(&mut self, new: NewEntry) -> KnowledgeEntry {
        let entry = KnowledgeEntry {
            id: Uuid::new_v4(),
            category: new.category,
            question: new.question,
            answer: new.answer,
            keywords: new.keywords,
            last_updated: Utc::now(),
        };
        self.index_entry(&entry);
        self.order.push(entry.id);
        self.entries.insert(entry.id, entry.clone());
        entry
    }

    /// Entries in insertion order, filtered by an id set.
    fn in_order(&self, ids: &HashSet<Uuid>) -> Vec<KnowledgeEntry> {
        self.order
            .iter()
            .filter(|id| ids.contains(*id))
            .filter_map(|id| self.entries.get(id).cloned())
            .collect()
    }
}

/// Timestamp for a mutation, strictly greater than the previous stamp even
/// when the wall clock has not advanced.
fn next_timestamp(prev: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > prev {
        now
    } else {
        prev + Duration::microseconds(1)
    }
}

fn validate(new: &NewEntry) -> std::result::Result<(), String> {
    if new.question.trim().is_empty() {
        return Err("question is empty".to_string());
    }
    if new.answer.trim().is_empty() {
        return Err("answer is empty".to_string());
    }
    Ok(())
}

/// In-memory knowledge store.
///
/// Constructed explicitly and handed to whoever needs it, never ambient
/// process state. Mutations are serialized against each other and against
/// index reads by the interior lock.
#[derive(Clone, Debug, Default)]
pub struct KnowledgeStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl KnowledgeStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreInner>> {
        self.inner
            .read()
            .map_err(|e| KnowledgeError::LockPoisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreInner>> {
        self.inner
            .write()
            .map_err(|e| KnowledgeError::LockPoisoned(e.to_string()))
    }

    /// Add a new entry, assigning it a fresh id and timestamp.
    ///
    /// The keyword list may be empty; question and answer may not.
    pub fn add(&self, new: NewEntry) -> Result<KnowledgeEntry> {
        validate(&new).map_err(KnowledgeError::Validation)?;
        let mut inner = self.write()?;
        let entry = inner.insert_new(new);
        debug!(id = %entry.id, category = entry.category.as_str(), "knowledge entry added");
        Ok(entry)
    }

    /// Apply a partial update to an entry.
    ///
    /// Old index associations are removed, the supplied fields merged, a
    /// strictly newer `last_updated` stamped, and the entry re-indexed, all
    /// under one write lock. A miss returns `NotFound` with no side effects.
    pub fn update(&self, id: Uuid, patch: EntryPatch) -> Result<KnowledgeEntry> {
        let mut inner = self.write()?;
        let old = inner
            .entries
            .get(&id)
            .cloned()
            .ok_or(KnowledgeError::NotFound(id))?;

        inner.unindex_entry(&old);

        let updated = KnowledgeEntry {
            id,
            category: patch.category.unwrap_or(old.category),
            question: patch.question.unwrap_or(old.question),
            answer: patch.answer.unwrap_or(old.answer),
            keywords: patch.keywords.unwrap_or(old.keywords),
            last_updated: next_timestamp(old.last_updated),
        };

        inner.index_entry(&updated);
        inner.entries.insert(id, updated.clone());
        debug!(id = %id, "knowledge entry updated");
        Ok(updated)
    }

    /// Delete an entry and all its index associations.
    ///
    /// Returns whether an entry existed.
    pub fn delete(&self, id: Uuid) -> Result<bool> {
        let mut inner = self.write()?;
        match inner.entries.remove(&id) {
            Some(entry) => {
                inner.unindex_entry(&entry);
                inner.order.retain(|o| *o != id);
                debug!(id = %id, "knowledge entry deleted");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Look up an entry by id.
    pub fn get(&self, id: Uuid) -> Result<Option<KnowledgeEntry>> {
        Ok(self.read()?.entries.get(&id).cloned())
    }

    /// All entries, in insertion order.
    pub fn get_all(&self) -> Result<Vec<KnowledgeEntry>> {
        let inner = self.read()?;
        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.entries.get(id).cloned())
            .collect())
    }

    /// Entries of one category.
    pub fn get_by_category(&self, category: Category) -> Result<Vec<KnowledgeEntry>> {
        let inner = self.read()?;
        match inner.by_category.get(&category) {
            Some(ids) => Ok(inner.in_order(ids)),
            None => Ok(Vec::new()),
        }
    }

    /// Union of keyword-index lookups after normalization, without
    /// duplicates.
    pub fn find_by_keywords<S: AsRef<str>>(&self, keywords: &[S]) -> Result<Vec<KnowledgeEntry>> {
        let inner = self.read()?;
        let mut ids: HashSet<Uuid> = HashSet::new();
        for keyword in keywords {
            let key = normalize(keyword.as_ref());
            if let Some(bucket) = inner.by_keyword.get(&key) {
                ids.extend(bucket.iter().copied());
            }
        }
        Ok(inner.in_order(&ids))
    }

    /// Empty the entry table and both indexes.
    pub fn clear(&self) -> Result<()> {
        let mut inner = self.write()?;
        inner.entries.clear();
        inner.order.clear();
        inner.by_category.clear();
        inner.by_keyword.clear();
        debug!("knowledge store cleared");
        Ok(())
    }

    /// Import a batch of entries.
    ///
    /// Entries failing validation are skipped and counted, never fatal to
    /// the batch.
    pub fn bulk_import(&self, entries: Vec<NewEntry>) -> Result<ImportReport> {
        let mut inner = self.write()?;
        let mut report = ImportReport::default();
        for new in entries {
            match validate(&new) {
                Ok(()) => {
                    inner.insert_new(new);
                    report.imported += 1;
                }
                Err(reason) => {
                    debug!(reason = %reason, "bulk import skipped entry");
                    report.skipped += 1;
                }
            }
        }
        Ok(report)
    }

    /// Export all entries as a plain sequence, in insertion order.
    ///
    /// No persistence guarantee is attached; this is the inverse of
    /// [`bulk_import`](Self::bulk_import) for callers that want to carry the
    /// set across processes themselves.
    pub fn export(&self) -> Result<Vec<KnowledgeEntry>> {
        self.get_all()
    }

    /// Aggregate statistics.
    pub fn stats(&self) -> Result<StoreStats> {
        let inner = self.read()?;
        let per_category = inner
            .by_category
            .iter()
            .map(|(category, ids)| (*category, ids.len()))
            .collect();
        let last_modified = inner.entries.values().map(|e| e.last_updated).max();
        Ok(StoreStats {
            total_entries: inner.entries.len(),
            per_category,
            distinct_keywords: inner.by_keyword.len(),
            last_modified,
        })
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.read().map(|inner| inner.entries.len()).unwrap_or(0)
    }

    /// True if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// Tests
// =============================================================================
