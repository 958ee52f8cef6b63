use crate::{Transaction, TransactionId};
use std::collections::{HashMap, HashSet};

/// The dependency graph over a batch of proposed transactions.
///
/// Nodes are transaction ids. An edge points from the transaction that
/// created an output to the batch transaction that spends it, whether or not
/// the creating transaction is itself in the batch. Ids that are referenced
/// but not in the batch are already settled in the pool; they act as roots
/// with no further ancestry and are walked for ordering purposes only.
pub struct TxGraph {
    edges: HashMap<TransactionId, HashSet<TransactionId>>,
    batch: HashMap<TransactionId, Transaction>,
}

impl TxGraph {
    pub fn build(transactions: &[Transaction]) -> Self {
        let mut graph = Self {
            edges: HashMap::new(),
            batch: HashMap::new(),
        };
        for transaction in transactions {
            graph.batch.insert(*transaction.id(), transaction.clone());
        }
        for transaction in transactions {
            for input in transaction.inputs() {
                graph.add_edge(*input.source().tx_id(), *transaction.id());
            }
        }
        graph
    }

    fn add_edge(&mut self, parent: TransactionId, child: TransactionId) {
        self.edges.entry(parent).or_default().insert(child);
    }

    /// Returns the batch transactions ordered so that every transaction
    /// appears after all batch-local transactions whose outputs it consumes.
    ///
    /// Members of a dependency cycle admit no valid placement; they still
    /// appear in the emission, but whichever comes first references outputs
    /// that never enter the pool, so none of them can ever commit.
    pub fn topological_order(&self) -> Vec<Transaction> {
        let mut visited = HashSet::new();
        let mut post_order = Vec::new();
        for vertex in self.edges.keys() {
            self.visit(*vertex, &mut visited, &mut post_order);
        }
        post_order
            .iter()
            .rev()
            .filter_map(|id| self.batch.get(id).cloned())
            .collect()
    }

    /// Depth-first walk from `root`, pushing each batch vertex once all of
    /// its descendants have been placed. Iterative with an explicit stack so
    /// that deep dependency chains cannot overflow the call stack; a vertex
    /// is pushed twice, the second occurrence marking its post-order slot.
    fn visit(
        &self,
        root: TransactionId,
        visited: &mut HashSet<TransactionId>,
        post_order: &mut Vec<TransactionId>,
    ) {
        let mut stack = vec![(root, false)];
        while let Some((vertex, children_done)) = stack.pop() {
            if children_done {
                if self.batch.contains_key(&vertex) {
                    post_order.push(vertex);
                }
                continue;
            }
            if !visited.insert(vertex) {
                continue;
            }
            stack.push((vertex, true));
            if let Some(children) = self.edges.get(&vertex) {
                for child in children {
                    if !visited.contains(child) {
                        stack.push((*child, false));
                    }
                }
            }
        }
    }
}
