//! In-memory remote table store
//!
//! Behaves like the hosted tables (server-assigned ids, `name` unique in
//! `resources`) without a network. Failures can be injected per table or
//! for the whole store.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::RemoteError;
use crate::remote::{Filter, RemoteStore, Table};

#[derive(Clone, Default)]
pub struct MemoryRemote {
    tables: Arc<RwLock<HashMap<Table, Vec<Value>>>>,
    next_id: Arc<AtomicU64>,
    offline: Arc<AtomicBool>,
    failing: Arc<RwLock<HashSet<Table>>>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a table with existing rows
    pub async fn with_rows(self, table: Table, rows: Vec<Value>) -> Self {
        self.tables.write().await.entry(table).or_default().extend(rows);
        self
    }

    /// Make every call fail with a network error
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Make every call on `table` fail with a 500
    pub async fn fail_table(&self, table: Table) {
        self.failing.write().await.insert(table);
    }

    pub async fn heal_table(&self, table: Table) {
        self.failing.write().await.remove(&table);
    }

    /// Current rows of a table
    pub async fn rows(&self, table: Table) -> Vec<Value> {
        self.tables.read().await.get(&table).cloned().unwrap_or_default()
    }

    async fn check(&self, table: Table) -> Result<(), RemoteError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RemoteError::Network("store offline".to_string()));
        }
        if self.failing.read().await.contains(&table) {
            return Err(RemoteError::Status {
                status: 500,
                body: format!("{} unavailable", table),
            });
        }
        Ok(())
    }

    fn assign_id(&self) -> String {
        format!("srv-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

fn object(row: Value) -> Result<Map<String, Value>, RemoteError> {
    match row {
        Value::Object(map) => Ok(map),
        other => Err(RemoteError::Decode(format!("expected object, got {}", other))),
    }
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn fetch_all(&self, table: Table) -> Result<Vec<Value>, RemoteError> {
        self.check(table).await?;
        Ok(self.rows(table).await)
    }

    async fn insert(&self, table: Table, row: Value) -> Result<Value, RemoteError> {
        self.check(table).await?;
        let mut row = object(row)?;

        let mut tables = self.tables.write().await;
        let rows = tables.entry(table).or_default();

        if table == Table::Resources {
            let name = row.get("name").cloned().unwrap_or(Value::Null);
            if rows.iter().any(|r| r.get("name") == Some(&name)) {
                return Err(RemoteError::Status {
                    status: 409,
                    body: format!("duplicate key value: {}", name),
                });
            }
        } else {
            row.insert("id".to_string(), Value::String(self.assign_id()));
        }

        let stored = Value::Object(row);
        rows.push(stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        table: Table,
        filter: &Filter,
        patch: Value,
    ) -> Result<Vec<Value>, RemoteError> {
        self.check(table).await?;
        let patch = object(patch)?;

        let mut tables = self.tables.write().await;
        let mut updated = Vec::new();

        for row in tables.entry(table).or_default().iter_mut() {
            if !filter.matches(row) {
                continue;
            }
            if let Value::Object(fields) = row {
                for (key, value) in &patch {
                    fields.insert(key.clone(), value.clone());
                }
            }
            updated.push(row.clone());
        }

        Ok(updated)
    }

    async fn delete(&self, table: Table, filter: &Filter) -> Result<(), RemoteError> {
        self.check(table).await?;
        let mut tables = self.tables.write().await;
        tables.entry(table).or_default().retain(|row| !filter.matches(row));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
