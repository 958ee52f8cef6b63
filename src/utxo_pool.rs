use crate::{OutputIndex, Transaction, TransactionOutput, UtxoId};
use std::collections::HashMap;

/// A pool of confirmed and unspent transaction outputs, indexed by the
/// transaction that created them and their index within that transaction.
///
/// An identifier present in the pool has never been consumed. The pool is
/// seeded externally before a batch runs and is mutated only when an
/// accepted transaction commits. `Clone` deep-copies the entries, so a
/// processor can work on a private copy without touching the caller's pool.
#[derive(Debug, Clone, Default)]
pub struct UtxoPool {
    utxos: HashMap<UtxoId, TransactionOutput>,
}

impl UtxoPool {
    pub fn new() -> Self {
        Self {
            utxos: HashMap::new(),
        }
    }

    pub fn contains(&self, utxo_id: &UtxoId) -> bool {
        self.utxos.contains_key(utxo_id)
    }

    pub fn get(&self, utxo_id: &UtxoId) -> Option<&TransactionOutput> {
        self.utxos.get(utxo_id)
    }

    pub fn insert(&mut self, utxo_id: UtxoId, output: TransactionOutput) {
        self.utxos.insert(utxo_id, output);
    }

    pub fn remove(&mut self, utxo_id: &UtxoId) {
        self.utxos.remove(utxo_id);
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    pub fn utxo_ids(&self) -> impl Iterator<Item = &UtxoId> {
        self.utxos.keys()
    }

    /// The sum of every unspent output's value.
    pub fn total_value(&self) -> f64 {
        self.utxos.values().map(TransactionOutput::value).sum()
    }

    /// Applies an accepted transaction's effects: every consumed identifier
    /// leaves the pool and every produced output joins it.
    pub fn commit(&mut self, transaction: &Transaction) {
        for input in transaction.inputs() {
            self.remove(input.source());
        }
        for (index, output) in transaction.outputs().iter().enumerate() {
            let utxo_id = UtxoId::new(*transaction.id(), OutputIndex::new(index as u32));
            self.insert(utxo_id, output.clone());
        }
    }
}
