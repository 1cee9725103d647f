//! Reshaping of the `configSchema` field on service documents.
//!
//! Older services carry a single schema mapping; newer ones carry an ordered
//! list of configuration steps.

use crate::store::{DocumentStore, StoreError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const CONFIG_SCHEMA_FIELD: &str = "configSchema";
pub const DEFAULT_STEP_NAME: &str = "Configuración";

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("configSchema of '{0}' is not a list")]
    NotAList(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MigrationReport {
    pub scanned: usize,
    pub migrated: Vec<String>,
}

/// Wraps a mapping-shaped `configSchema` into a one-step list.
///
/// Returns whether the document changed. Absent fields and lists are left alone.
pub fn wrap_config_schema(document: &mut Value) -> bool {
    let Some(slot) = document.get_mut(CONFIG_SCHEMA_FIELD) else {
        return false;
    };
    if !slot.is_object() {
        return false;
    }
    let schema = slot.take();
    *slot = json!([{
        "name": DEFAULT_STEP_NAME,
        "instructions": null,
        "schema": schema,
    }]);
    true
}

/// Inserts `step` at `index`; an index past the end appends.
pub fn insert_config_step(
    document: &mut Value,
    document_id: &str,
    index: usize,
    step: Value,
) -> Result<(), SchemaError> {
    let steps = document
        .get_mut(CONFIG_SCHEMA_FIELD)
        .and_then(Value::as_array_mut)
        .ok_or_else(|| SchemaError::NotAList(document_id.to_string()))?;
    let at = index.min(steps.len());
    steps.insert(at, step);
    Ok(())
}

/// Wraps every mapping-shaped `configSchema` in the collection.
pub fn migrate_collection<S: DocumentStore + ?Sized>(
    store: &mut S,
) -> Result<MigrationReport, StoreError> {
    let mut report = MigrationReport::default();
    for (id, mut document) in store.list()? {
        report.scanned += 1;
        if !wrap_config_schema(&mut document) {
            continue;
        }
        let wrapped = document
            .get_mut(CONFIG_SCHEMA_FIELD)
            .map(Value::take)
            .unwrap_or(Value::Null);
        store.update_field(&id, CONFIG_SCHEMA_FIELD, wrapped)?;
        tracing::info!(service = %id, "migrated service");
        report.migrated.push(id);
    }
    tracing::info!(
        scanned = report.scanned,
        updated = report.migrated.len(),
        "migration finished"
    );
    Ok(report)
}

/// Read-modify-write of one service's step list.
pub fn insert_step<S: DocumentStore + ?Sized>(
    store: &mut S,
    service_id: &str,
    index: usize,
    step: Value,
) -> Result<Value, SchemaError> {
    let mut document = store
        .get(service_id)?
        .ok_or_else(|| StoreError::NotFound(service_id.to_string()))?;
    insert_config_step(&mut document, service_id, index, step)?;
    let steps = document
        .get_mut(CONFIG_SCHEMA_FIELD)
        .map(Value::take)
        .unwrap_or(Value::Null);
    store.update_field(service_id, CONFIG_SCHEMA_FIELD, steps.clone())?;
    tracing::info!(service = %service_id, index, config_schema = %steps, "service updated");
    Ok(steps)
}
