use crate::{PublicKey, Sha256, Signature};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// An opaque identifier of a transaction.
/// It is assigned by whoever built the transaction and is never derived here.
#[derive(Debug, Hash, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct TransactionId(Sha256);

impl Display for TransactionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TransactionId {
    pub fn new(data: Sha256) -> Self {
        Self(data)
    }

    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }
}

/// The index of the transaction output, the first one is 0.
#[derive(Debug, Hash, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct OutputIndex(u32);

impl Display for OutputIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl OutputIndex {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

/// Uniquely names one spendable output: the transaction that created it
/// plus the output's position within that transaction.
/// An identifier is never reused once the output has been created.
#[derive(Debug, Hash, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub struct UtxoId {
    tx_id: TransactionId,
    output_index: OutputIndex,
}

impl UtxoId {
    pub fn new(tx_id: TransactionId, output_index: OutputIndex) -> Self {
        Self {
            tx_id,
            output_index,
        }
    }

    pub fn tx_id(&self) -> &TransactionId {
        &self.tx_id
    }

    pub fn output_index(&self) -> &OutputIndex {
        &self.output_index
    }
}

impl Display for UtxoId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.tx_id, self.output_index)
    }
}

/// A spendable amount locked to a public key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionOutput {
    value: f64,
    owner: PublicKey,
}

impl Display for TransactionOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}->{}", self.value, self.owner)
    }
}

impl TransactionOutput {
    pub fn new(value: f64, owner: PublicKey) -> Self {
        Self { value, owner }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn owner(&self) -> &PublicKey {
        &self.owner
    }
}

/// References exactly one unspent output and carries the signature
/// authorizing its consumption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionInput {
    source: UtxoId,
    signature: Signature,
}

impl Display for TransactionInput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl TransactionInput {
    pub fn new(source: UtxoId, signature: Signature) -> Self {
        Self { source, signature }
    }

    pub fn source(&self) -> &UtxoId {
        &self.source
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }
}

/// A transfer of value from a set of unspent outputs to a set of new outputs.
/// Outputs are addressed by position; their index together with the
/// transaction id forms the identifier of the UTXO they become.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    id: TransactionId,
    inputs: Vec<TransactionInput>,
    outputs: Vec<TransactionOutput>,
}

impl Transaction {
    pub fn new(
        id: TransactionId,
        inputs: Vec<TransactionInput>,
        outputs: Vec<TransactionOutput>,
    ) -> Self {
        Self {
            id,
            inputs,
            outputs,
        }
    }

    pub fn id(&self) -> &TransactionId {
        &self.id
    }

    pub fn inputs(&self) -> &Vec<TransactionInput> {
        &self.inputs
    }

    pub fn outputs(&self) -> &Vec<TransactionOutput> {
        &self.outputs
    }

    /// The canonical payload that must be signed to authorize the input at
    /// `input_index`: the input's source reference together with every
    /// declared output. Signatures themselves are never part of the payload.
    pub fn raw_signable_bytes(&self, input_index: usize) -> Result<Vec<u8>, String> {
        let input = self
            .inputs
            .get(input_index)
            .ok_or_else(|| format!("No input at index: {} in: {}", input_index, self.id))?;
        bincode::serialize(&(input.source(), &self.outputs)).map_err(|e| e.to_string())
    }
}

impl Display for Transaction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}
