pub mod batch_processor;
pub mod crypto;
pub mod hash;
pub mod max_fee;
pub mod transaction;
pub mod tx_graph;
pub mod utxo_pool;
pub mod validation;

pub use self::{
    batch_processor::*, crypto::*, hash::*, max_fee::*, transaction::*, tx_graph::*,
    utxo_pool::*, validation::*,
};
