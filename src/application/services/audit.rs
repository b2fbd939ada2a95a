//! Step-by-step invariant audit of an insert/remove sequence

use std::fmt;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{AvlTree, BalanceStrategy, Key, Tally, TreeOptions, TreeSummary, TreeView};

/// Outcome of a clean audit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditReport {
    /// Mutations that were checked
    pub steps: usize,
    pub tally: Tally,
    /// Shape after all inserts, before the removals
    pub full: TreeSummary,
}

/// Replays keys into an AVL tree under both strategies and checks every
/// intermediate tree.
///
/// Each key is inserted in order, then removed in the same order. After every
/// step the full invariant check runs and both strategies must agree on the
/// exact shape.
#[derive(Debug, Clone, Default)]
pub struct AuditService {
    node_limit: Option<usize>,
}

impl AuditService {
    pub fn new(node_limit: Option<usize>) -> Self {
        Self { node_limit }
    }

    fn tree(&self, strategy: BalanceStrategy) -> AvlTree {
        AvlTree::with_options(TreeOptions {
            strategy,
            node_limit: self.node_limit,
            verify: false,
        })
    }

    #[instrument(level = "debug", skip(self, keys), fields(keys = keys.len()))]
    pub fn run(&self, keys: &[Key]) -> ApplicationResult<AuditReport> {
        let mut factor = self.tree(BalanceStrategy::BalanceFactor);
        let mut height = self.tree(BalanceStrategy::Height);
        let mut tally = Tally::default();
        let mut steps = 0;

        for &key in keys {
            let outcome = factor.insert(key)?;
            let other = height.insert(key)?;
            agree(outcome, other, &format!("insert {key}"))?;
            tally.record_insert(outcome);
            steps += 1;
            check_step(&factor, &height, &format!("insert {key}"))?;
        }
        let full = factor.summary();

        for &key in keys {
            let outcome = factor.remove(key);
            let other = height.remove(key);
            agree(outcome, other, &format!("remove {key}"))?;
            tally.record_remove(outcome);
            steps += 1;
            check_step(&factor, &height, &format!("remove {key}"))?;
        }
        debug!(steps, "audit clean");

        Ok(AuditReport { steps, tally, full })
    }
}

/// Both strategies must report the same outcome for the same operation.
fn agree<T: PartialEq + fmt::Debug>(factor: T, height: T, step: &str) -> ApplicationResult<()> {
    if factor == height {
        return Ok(());
    }
    Err(ApplicationError::Inconsistent {
        context: format!(
            "outcomes differ on {step}: {} reported {factor:?}, {} reported {height:?}",
            BalanceStrategy::BalanceFactor,
            BalanceStrategy::Height
        ),
    })
}

fn check_step(factor: &AvlTree, height: &AvlTree, step: &str) -> ApplicationResult<()> {
    for tree in [factor, height] {
        tree.check_invariants()
            .map_err(|violation| ApplicationError::Invariant {
                step: format!("{step} ({})", tree.strategy()),
                violation,
            })?;
    }
    let (left, right) = (
        factor.to_tree_string().to_string(),
        height.to_tree_string().to_string(),
    );
    if left != right {
        return Err(ApplicationError::Inconsistent {
            context: format!("strategies diverge after {step}"),
        });
    }
    Ok(())
}
