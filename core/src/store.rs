//! Document collections addressed by opaque identifiers.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access store {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("store {path} is not valid JSON: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("store {path} has no object collection '{collection}'")]
    MissingCollection { path: PathBuf, collection: String },
    #[error("document '{0}' not found")]
    NotFound(String),
    #[error("document '{0}' is not an object")]
    NotAnObject(String),
}

/// One collection of JSON documents.
pub trait DocumentStore {
    /// All documents as `(id, body)` pairs, ordered by id.
    fn list(&self) -> Result<Vec<(String, Value)>, StoreError>;
    fn get(&self, id: &str) -> Result<Option<Value>, StoreError>;
    /// Overwrites a single top-level field of an existing document.
    fn update_field(&mut self, id: &str, field: &str, value: Value) -> Result<(), StoreError>;
}

/// Collection persisted in a JSON file shaped `{ "<collection>": { "<id>": {..} } }`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    collection: String,
    // everything in the file except the collection itself
    rest: Map<String, Value>,
    documents: Map<String, Value>,
}

impl JsonFileStore {
    pub fn open(path: impl AsRef<Path>, collection: &str) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let raw = fs::read_to_string(&path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        let mut rest: Map<String, Value> =
            serde_json::from_str(&raw).map_err(|source| StoreError::Format {
                path: path.clone(),
                source,
            })?;
        let documents = match rest.remove(collection) {
            Some(Value::Object(documents)) => documents,
            _ => {
                return Err(StoreError::MissingCollection {
                    path,
                    collection: collection.to_string(),
                })
            }
        };
        tracing::debug!(
            path = %path.display(),
            collection,
            documents = documents.len(),
            "opened document store"
        );
        Ok(Self {
            path,
            collection: collection.to_string(),
            rest,
            documents,
        })
    }

    fn persist(&self) -> Result<(), StoreError> {
        let mut root = self.rest.clone();
        root.insert(
            self.collection.clone(),
            Value::Object(self.documents.clone()),
        );
        let serialized =
            serde_json::to_string_pretty(&root).map_err(|source| StoreError::Format {
                path: self.path.clone(),
                source,
            })?;
        let io_error = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        // replace the file by rename so a failed write leaves the old store intact
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut staged = NamedTempFile::new_in(dir).map_err(io_error)?;
        staged.write_all(serialized.as_bytes()).map_err(io_error)?;
        staged.as_file().sync_all().map_err(io_error)?;
        staged
            .persist(&self.path)
            .map_err(|err| io_error(err.error))?;
        Ok(())
    }
}

impl DocumentStore for JsonFileStore {
    fn list(&self) -> Result<Vec<(String, Value)>, StoreError> {
        let sorted: BTreeMap<&String, &Value> = self.documents.iter().collect();
        Ok(sorted
            .into_iter()
            .map(|(id, doc)| (id.clone(), doc.clone()))
            .collect())
    }

    fn get(&self, id: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.documents.get(id).cloned())
    }

    fn update_field(&mut self, id: &str, field: &str, value: Value) -> Result<(), StoreError> {
        let doc = self
            .documents
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let Value::Object(fields) = doc else {
            return Err(StoreError::NotAnObject(id.to_string()));
        };
        fields.insert(field.to_string(), value);
        self.persist()
    }
}
