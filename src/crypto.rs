use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The public key that owns an unspent output.
/// The representation is opaque to this crate; it only has to be value-equal.
#[derive(Debug, Clone, Hash, Serialize, Deserialize, Eq, PartialEq)]
pub struct PublicKey(String);

impl PublicKey {
    pub fn new(public_key: String) -> Self {
        Self(public_key)
    }
}

impl Display for PublicKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A signature authorizing the consumption of one unspent output.
#[derive(Debug, Clone, Hash, Serialize, Deserialize, Eq, PartialEq)]
pub struct Signature(Vec<u8>);

impl Signature {
    pub fn new(raw_bytes: Vec<u8>) -> Self {
        Self(raw_bytes)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0[..]
    }
}

/// Verifies that a signature over a message was produced by the holder of a public key.
/// The verification math lives outside this crate; the batch processors only
/// ever call through this trait.
pub trait SignatureVerifier {
    fn verify(&self, public_key: &PublicKey, message: &[u8], signature: &Signature) -> bool;
}
