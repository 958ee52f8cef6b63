use crate::{SignatureVerifier, Transaction, TransactionValidator, TxGraph, UtxoPool};

/// Processes batches of proposed transactions against a private copy of the
/// unspent-output pool.
///
/// Each batch is validated transaction-by-transaction in dependency order, so
/// a transaction may spend an output created earlier in the same batch.
/// Invalid transactions are skipped, never reported: anything that depended
/// on them fails its own pool lookup afterwards.
pub struct BatchProcessor<V: SignatureVerifier> {
    pool: UtxoPool,
    verifier: V,
}

impl<V: SignatureVerifier> BatchProcessor<V> {
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

    /// Handles an unordered batch of proposed transactions: checks each one
    /// for correctness against the pool as mutated by previously accepted
    /// transactions, returns the accepted transactions in commit order, and
    /// updates the pool accordingly.
    pub fn handle_txs(&mut self, proposed: &[Transaction]) -> Vec<Transaction> {
        let mut approved = Vec::new();
        for transaction in TxGraph::build(proposed).topological_order() {
            if self.is_valid_tx(&transaction) {
                self.pool.commit(&transaction);
                approved.push(transaction);
            }
        }
        approved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        OutputIndex, PublicKey, Sha256, Signature, TransactionId, TransactionInput,
        TransactionOutput, UtxoId,
    };
    use std::collections::HashSet;

    struct AcceptAll;
    impl SignatureVerifier for AcceptAll {
        fn verify(&self, _: &PublicKey, _: &[u8], _: &Signature) -> bool {
            true
        }
    }

    fn tx_id(tag: &[u8]) -> TransactionId {
        TransactionId::new(Sha256::digest(tag))
    }

    fn owner() -> PublicKey {
        PublicKey::new(String::from("alice"))
    }

    fn input(tag: &[u8], index: u32) -> TransactionInput {
        TransactionInput::new(
            UtxoId::new(tx_id(tag), OutputIndex::new(index)),
            Signature::new(vec![]),
        )
    }

    fn outputs(values: &[f64]) -> Vec<TransactionOutput> {
        values
            .iter()
            .map(|v| TransactionOutput::new(*v, owner()))
            .collect()
    }

    /// One settled transaction producing outputs of 10, 15, 20 and 30.
    fn seeded_pool() -> UtxoPool {
        let mut pool = UtxoPool::new();
        for (index, value) in [10.0, 15.0, 20.0, 30.0].iter().enumerate() {
            pool.insert(
                UtxoId::new(tx_id(b"prev"), OutputIndex::new(index as u32)),
                TransactionOutput::new(*value, owner()),
            );
        }
        pool
    }

    #[test]
    fn empty_batch_yields_empty_result_and_no_mutation() {
        let pool = seeded_pool();
        let mut processor = BatchProcessor::new(&pool, AcceptAll);
        assert!(processor.handle_txs(&[]).is_empty());
        assert_eq!(processor.pool().len(), 4);
        assert_eq!(processor.pool().total_value(), 75.0);
    }

    #[test]
    fn callers_pool_is_untouched() {
        let pool = seeded_pool();
        let mut processor = BatchProcessor::new(&pool, AcceptAll);
        let spend = Transaction::new(tx_id(b"tx1"), vec![input(b"prev", 0)], outputs(&[8.0]));
        assert_eq!(processor.handle_txs(&[spend]).len(), 1);
        assert_eq!(pool.len(), 4);
    }

    #[test]
    fn only_the_mutually_valid_subset_is_accepted() {
        // tx1 spends output 0 (10.0) validly; tx2 over-spends output 1
        // (15.0 in, 16.0 out); tx3 claims outputs 2 and 0, but 0 is taken
        // by tx1 or tx3, so exactly one of the two can land.
        let tx1 = Transaction::new(
            tx_id(b"tx1"),
            vec![input(b"prev", 0)],
            outputs(&[8.0, 2.0]),
        );
        let tx2 = Transaction::new(
            tx_id(b"tx2"),
            vec![input(b"prev", 1)],
            outputs(&[14.0, 2.0]),
        );
        let tx3 = Transaction::new(
            tx_id(b"tx3"),
            vec![input(b"prev", 2), input(b"prev", 0)],
            outputs(&[19.0, 10.0]),
        );

        let mut processor = BatchProcessor::new(&seeded_pool(), AcceptAll);
        let approved = processor.handle_txs(&[tx1, tx2, tx3]);

        assert_eq!(approved.len(), 1);
        let approved_id = *approved[0].id();
        assert!(approved_id == tx_id(b"tx1") || approved_id == tx_id(b"tx3"));
    }

    #[test]
    fn dependency_chain_is_accepted_in_order() {
        let tx1 = Transaction::new(tx_id(b"tx1"), vec![input(b"prev", 0)], outputs(&[8.0]));
        let tx2 = Transaction::new(tx_id(b"tx2"), vec![input(b"tx1", 0)], outputs(&[7.0]));
        let tx3 = Transaction::new(
            tx_id(b"tx3"),
            vec![input(b"tx2", 0), input(b"prev", 1)],
            outputs(&[4.0, 2.0]),
        );

        for batch in [
            vec![tx3.clone(), tx1.clone(), tx2.clone()],
            vec![tx2.clone(), tx3.clone(), tx1.clone()],
            vec![tx1.clone(), tx2.clone(), tx3.clone()],
        ]
        .iter()
        {
            let mut processor = BatchProcessor::new(&seeded_pool(), AcceptAll);
            let approved = processor.handle_txs(batch);
            assert_eq!(approved.len(), 3);
            assert_eq!(approved[0].id(), &tx_id(b"tx1"));
            assert_eq!(approved[1].id(), &tx_id(b"tx2"));
            assert_eq!(approved[2].id(), &tx_id(b"tx3"));
        }
    }

    #[test]
    fn rejecting_a_parent_rejects_its_dependents() {
        // tx1 over-spends and fails; tx2 spends tx1's output, which never
        // enters the pool.
        let tx1 = Transaction::new(tx_id(b"tx1"), vec![input(b"prev", 0)], outputs(&[11.0]));
        let tx2 = Transaction::new(tx_id(b"tx2"), vec![input(b"tx1", 0)], outputs(&[1.0]));

        let mut processor = BatchProcessor::new(&seeded_pool(), AcceptAll);
        assert!(processor.handle_txs(&[tx2, tx1]).is_empty());
        assert_eq!(processor.pool().len(), 4);
    }

    #[test]
    fn accepted_spends_are_pairwise_disjoint_and_value_is_conserved() {
        let tx1 = Transaction::new(
            tx_id(b"tx1"),
            vec![input(b"prev", 0)],
            outputs(&[8.0, 2.0]),
        );
        let tx2 = Transaction::new(tx_id(b"tx2"), vec![input(b"prev", 0)], outputs(&[1.0]));
        let tx3 = Transaction::new(tx_id(b"tx3"), vec![input(b"prev", 3)], outputs(&[25.0]));

        let pool = seeded_pool();
        let total_before = pool.total_value();
        let mut processor = BatchProcessor::new(&pool, AcceptAll);
        let approved = processor.handle_txs(&[tx1, tx2, tx3]);

        let mut consumed = HashSet::new();
        for transaction in &approved {
            for input in transaction.inputs() {
                assert!(consumed.insert(*input.source()));
            }
        }
        assert!(processor.pool().total_value() <= total_before);
    }

    #[test]
    fn cyclic_batch_members_are_omitted() {
        let tx1 = Transaction::new(tx_id(b"tx1"), vec![input(b"tx2", 0)], outputs(&[1.0]));
        let tx2 = Transaction::new(tx_id(b"tx2"), vec![input(b"tx1", 0)], outputs(&[1.0]));

        let mut processor = BatchProcessor::new(&seeded_pool(), AcceptAll);
        assert!(processor.handle_txs(&[tx1, tx2]).is_empty());
        assert_eq!(processor.pool().len(), 4);
    }
}
