//! In-memory store, for running the pipeline against injected datasets.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{StorageError, StorageResult};
use crate::models::{EnrichedTable, RawFxRate, TransactionTable};

use super::DatasetStore;

/// [`DatasetStore`] keeping every dataset in memory, keyed by location.
#[derive(Debug, Default)]
pub struct MemoryStore {
    transactions: HashMap<String, TransactionTable>,
    rates: HashMap<String, Vec<RawFxRate>>,
    outputs: Mutex<HashMap<String, EnrichedTable>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transactions(mut self, location: &str, table: TransactionTable) -> Self {
        self.transactions.insert(location.to_string(), table);
        self
    }

    pub fn with_rates(mut self, location: &str, rates: Vec<RawFxRate>) -> Self {
        self.rates.insert(location.to_string(), rates);
        self
    }

    /// The table last written to `location`.
    pub fn output(&self, location: &str) -> Option<EnrichedTable> {
        self.outputs
            .lock()
            .ok()
            .and_then(|outputs| outputs.get(location).cloned())
    }
}

impl DatasetStore for MemoryStore {
    fn read_transactions(&self, location: &str) -> StorageResult<TransactionTable> {
        self.transactions
            .get(location)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(location.to_string()))
    }

    fn read_rates(&self, location: &str) -> StorageResult<Vec<RawFxRate>> {
        self.rates
            .get(location)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(location.to_string()))
    }

    fn write_enriched(&self, location: &str, table: &EnrichedTable) -> StorageResult<usize> {
        let mut outputs = self.outputs.lock().map_err(|e| StorageError::Write {
            location: location.to_string(),
            message: e.to_string(),
        })?;
        outputs.insert(location.to_string(), table.clone());
        Ok(table.rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_location_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(store.read_rates("rates"), Err(StorageError::NotFound(_))));
        assert!(matches!(store.read_transactions("txns"), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_write_replaces_previous_output() {
        let store = MemoryStore::new();
        let first = EnrichedTable { headers: vec!["a".to_string()], rows: vec![] };
        let second = EnrichedTable { headers: vec!["b".to_string()], rows: vec![] };

        store.write_enriched("out", &first).unwrap();
        store.write_enriched("out", &second).unwrap();

        assert_eq!(store.output("out"), Some(second));
    }
}
