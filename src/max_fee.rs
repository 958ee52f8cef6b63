use crate::{
    SignatureVerifier, Transaction, TransactionId, TransactionOutput, TransactionValidator,
    UtxoId, UtxoPool,
};
use std::collections::{HashMap, HashSet};

/// The dependency graph of a batch, annotated with fees and with the
/// batch-local double-spend conflicts needed to pick between competing
/// spenders of the same output.
///
/// Fees are computed against a snapshot pool that is pre-populated with every
/// batch-local output referenced by a batch input, so a transaction's fee is
/// known before any commit order is decided. The snapshot is never mutated
/// once built; the real pool is only touched by the processor's commit loop.
struct FeeGraph {
    snapshot: UtxoPool,
    edges: HashMap<TransactionId, HashSet<TransactionId>>,
    batch: HashMap<TransactionId, Transaction>,
    fee_cache: HashMap<TransactionId, f64>,
    // For each batch transaction, the output identifiers it competes for.
    conflicted_utxos: HashMap<TransactionId, HashSet<UtxoId>>,
    first_claimant: HashMap<UtxoId, TransactionId>,
}

impl FeeGraph {
    fn build(transactions: &[Transaction], pool: &UtxoPool) -> Self {
        let mut graph = Self {
            snapshot: pool.clone(),
            edges: HashMap::new(),
            batch: HashMap::new(),
            fee_cache: HashMap::new(),
            conflicted_utxos: HashMap::new(),
            first_claimant: HashMap::new(),
        };
        for transaction in transactions {
            graph.batch.insert(*transaction.id(), transaction.clone());
        }
        for transaction in transactions {
            graph.add_transaction(transaction);
        }
        graph
    }

    fn add_transaction(&mut self, transaction: &Transaction) {
        let current = *transaction.id();
        self.conflicted_utxos.entry(current).or_default();
        for input in transaction.inputs() {
            let utxo_id = *input.source();
            let parent = *utxo_id.tx_id();

            // Outputs created within the batch join the fee snapshot so that
            // spenders of not-yet-committed outputs still get a fee.
            if let Some(parent_tx) = self.batch.get(&parent) {
                if let Some(output) = parent_tx.outputs().get(utxo_id.output_index().as_usize()) {
                    let output = output.clone();
                    self.snapshot.insert(utxo_id, output);
                }
            }

            self.mark_double_spenders(utxo_id, current);
            self.edges.entry(parent).or_default().insert(current);
        }
    }

    /// The first spender of a UTXO is only remembered; every later spender
    /// marks both itself and the first one as conflicting over it.
    fn mark_double_spenders(&mut self, utxo_id: UtxoId, spender: TransactionId) {
        match self.first_claimant.get(&utxo_id) {
            None => {
                self.first_claimant.insert(utxo_id, spender);
            }
            Some(other) => {
                let other = *other;
                self.conflicted_utxos.entry(spender).or_default().insert(utxo_id);
                self.conflicted_utxos.entry(other).or_default().insert(utxo_id);
            }
        }
    }

    /// Returns the batch transactions that survive conflict resolution, in
    /// dependency-respecting order.
    fn max_fee_order(&mut self, verifier: &dyn SignatureVerifier) -> Vec<Transaction> {
        let mut visited = HashSet::new();
        let mut pending = Vec::new();
        let roots: Vec<TransactionId> = self.edges.keys().copied().collect();
        for vertex in roots {
            self.walk(vertex, &mut visited, &mut pending, verifier);
        }
        pending
            .iter()
            .rev()
            .filter_map(|id| self.batch.get(id).cloned())
            .collect()
    }

    /// Post-order DFS that accumulates the subtree fee of `vertex`: its own
    /// fee if it validates against the snapshot, plus the fees of its
    /// non-conflicting children. Conflicting children are resolved pairwise
    /// as they are encountered: the pending candidate with the lower fee is
    /// evicted from the emission, and conflicting fees never contribute to
    /// the parent's total. This greedy resolution is a heuristic and can be
    /// suboptimal for conflict sets larger than two or for chained
    /// conflicts; it is deliberately not an exact solver.
    fn walk(
        &mut self,
        vertex: TransactionId,
        visited: &mut HashSet<TransactionId>,
        pending: &mut Vec<TransactionId>,
        verifier: &dyn SignatureVerifier,
    ) -> f64 {
        if visited.contains(&vertex) {
            // A revisited vertex with no cached fee can only be part of a
            // dependency cycle; it contributes nothing.
            return self.fee_cache.get(&vertex).copied().unwrap_or(0.0);
        }
        visited.insert(vertex);

        let mut sum_fee = 0.0;
        let children: Vec<TransactionId> = self
            .edges
            .get(&vertex)
            .map(|children| children.iter().copied().collect())
            .unwrap_or_default();
        // The conflicting candidates of this subtree that are still winning.
        let mut best_candidates: HashMap<TransactionId, f64> = HashMap::new();

        for child in children {
            let fee = self.walk(child, visited, pending, verifier);
            let conflicts = self
                .conflicted_utxos
                .get(&child)
                .cloned()
                .unwrap_or_default();
            if conflicts.is_empty() {
                sum_fee += fee;
                continue;
            }
            if best_candidates.is_empty() {
                best_candidates.insert(child, fee);
                continue;
            }
            let mut loser = None;
            for (candidate, candidate_fee) in &best_candidates {
                let candidate_conflicts = match self.conflicted_utxos.get(candidate) {
                    Some(utxos) => utxos,
                    None => continue,
                };
                if conflicts.is_disjoint(candidate_conflicts) {
                    continue;
                }
                if fee > *candidate_fee {
                    loser = Some(*candidate);
                } else {
                    loser = Some(child);
                }
                break;
            }
            if let Some(loser) = loser {
                if loser != child {
                    best_candidates.insert(child, fee);
                }
                best_candidates.remove(&loser);
                if let Some(position) = pending.iter().position(|id| *id == loser) {
                    pending.remove(position);
                }
            }
        }

        if let Some(transaction) = self.batch.get(&vertex).cloned() {
            if TransactionValidator::new(verifier).is_valid(&transaction, &self.snapshot) {
                pending.push(vertex);
                sum_fee += self.fee_of(&transaction);
            } else {
                sum_fee = 0.0;
            }
            self.fee_cache.insert(vertex, sum_fee);
        }
        sum_fee
    }

    /// Input sum minus output sum, both taken against the fee snapshot.
    fn fee_of(&self, transaction: &Transaction) -> f64 {
        let input_sum: f64 = transaction
            .inputs()
            .iter()
            .filter_map(|input| self.snapshot.get(input.source()))
            .map(TransactionOutput::value)
            .sum();
        let output_sum: f64 = transaction
            .outputs()
            .iter()
            .map(TransactionOutput::value)
            .sum();
        input_sum - output_sum
    }
}

/// Variant of the batch processor that resolves batch-local double spends in
/// favor of the competitor with the higher aggregate fee.
///
/// Selection is best-effort: conflicts are resolved pairwise during the
/// dependency walk rather than by solving the underlying maximum-weight
/// selection problem exactly.
pub struct MaxFeeBatchProcessor<V: SignatureVerifier> {
    pool: UtxoPool,
    verifier: V,
}

impl<V: SignatureVerifier> MaxFeeBatchProcessor<V> {
    /// Copies `pool`; the caller's pool is never mutated by this processor.
    pub fn new(pool: &UtxoPool, verifier: V) -> Self {
        Self {
            pool: pool.clone(),
            verifier,
        }
    }

    /// The pool as mutated by the batches handled so far.
    pub fn pool(&self) -> &UtxoPool {
        &self.pool
    }

    pub fn is_valid_tx(&self, transaction: &Transaction) -> bool {
        TransactionValidator::new(&self.verifier).is_valid(transaction, &self.pool)
    }

    /// Same surface as the basic processor, but at most one spender of any
    /// contested output survives, preferring higher aggregate fee. Every
    /// selected transaction is re-validated against the real pool as it is
    /// committed, so a selection whose ancestors were dropped falls away
    /// here.
    pub fn handle_txs(&mut self, proposed: &[Transaction]) -> Vec<Transaction> {
        let mut graph = FeeGraph::build(proposed, &self.pool);
        let mut approved = Vec::new();
        for transaction in graph.max_fee_order(&self.verifier) {
            if self.is_valid_tx(&transaction) {
                self.pool.commit(&transaction);
                approved.push(transaction);
            }
        }
        approved
    }
}
