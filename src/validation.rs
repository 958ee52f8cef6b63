use crate::{SignatureVerifier, Transaction, UtxoPool};
use std::collections::HashSet;

/// Responsible for deciding whether a single transaction may spend from a pool.
/// The check is a pure predicate: the pool is read-only and the result is a
/// plain boolean, so rejected transactions carry no error detail.
pub struct TransactionValidator<'a> {
    verifier: &'a dyn SignatureVerifier,
}

impl<'a> TransactionValidator<'a> {
    pub fn new(verifier: &'a dyn SignatureVerifier) -> Self {
        Self { verifier }
    }

    /// A transaction is valid iff all of the following hold:
    /// (1) every output claimed by the transaction is in the pool,
    /// (2) the signature on each input verifies against the owner of the
    ///     claimed output and the canonical signable payload for that input,
    /// (3) no UTXO is claimed more than once by the transaction,
    /// (4) all of the transaction's output values are non-negative, and
    /// (5) the sum of input values is greater than or equal to the sum of
    ///     output values.
    ///
    /// Returns early on the first input whose claimed output is missing from
    /// the pool; the remaining conditions are independent accumulations.
    pub fn is_valid(&self, transaction: &Transaction, pool: &UtxoPool) -> bool {
        let mut is_valid = true;
        let mut claimed_utxos = HashSet::new();
        let mut input_sum = 0.0;

        for (index, input) in transaction.inputs().iter().enumerate() {
            let utxo_id = *input.source();
            let output = match pool.get(&utxo_id) {
                Some(output) => output,
                None => return false,
            };

            let signed_message = match transaction.raw_signable_bytes(index) {
                Ok(message) => message,
                Err(_) => return false,
            };
            is_valid = is_valid
                && self
                    .verifier
                    .verify(output.owner(), &signed_message, input.signature());

            is_valid = is_valid && !claimed_utxos.contains(&utxo_id);
            claimed_utxos.insert(utxo_id);

            input_sum += output.value();
        }

        let mut output_sum = 0.0;
        for output in transaction.outputs() {
            is_valid = is_valid && output.value() >= 0.0;
            output_sum += output.value();
        }

        is_valid && input_sum >= output_sum
    }
}
