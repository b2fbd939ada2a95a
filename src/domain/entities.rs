//! Domain entities: keys, outcomes and tree options

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Ordering and identity value of a node.
pub type Key = i32;

/// Result of an insert that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum InsertOutcome {
    Inserted,
    /// Key already present, tree unchanged.
    Duplicate,
}

impl InsertOutcome {
    pub fn is_inserted(self) -> bool {
        matches!(self, InsertOutcome::Inserted)
    }
}

/// Result of a remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum RemoveOutcome {
    Removed,
    /// Key not present, tree unchanged.
    Absent,
}

impl RemoveOutcome {
    pub fn is_removed(self) -> bool {
        matches!(self, RemoveOutcome::Removed)
    }
}

/// Local restructuring case applied while rebalancing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rotation {
    /// Single right rotation (left child was left-heavy or balanced)
    LL,
    /// Single left rotation (right child was right-heavy or balanced)
    RR,
    /// Left rotation on the left child, then right rotation
    LR,
    /// Right rotation on the right child, then left rotation
    RL,
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Rotation::LL => "LL",
            Rotation::RR => "RR",
            Rotation::LR => "LR",
            Rotation::RL => "RL",
        };
        f.write_str(name)
    }
}

/// How rebalancing decisions are made on the way back up.
///
/// `BalanceFactor` propagates a "height changed" signal and updates balances
/// by case rules. `Height` recomputes subtree heights and checks the balance
/// after the fact. Both yield the same tree for the same operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BalanceStrategy {
    #[default]
    BalanceFactor,
    Height,
}

impl fmt::Display for BalanceStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BalanceStrategy::BalanceFactor => f.write_str("balance-factor"),
            BalanceStrategy::Height => f.write_str("height"),
        }
    }
}

impl FromStr for BalanceStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "balance-factor" | "balance_factor" | "factor" => Ok(BalanceStrategy::BalanceFactor),
            "height" => Ok(BalanceStrategy::Height),
            other => Err(format!(
                "unknown balance strategy '{other}' (expected balance-factor or height)"
            )),
        }
    }
}

/// Construction options of an [`AvlTree`](crate::domain::AvlTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeOptions {
    pub strategy: BalanceStrategy,
    /// Maximum number of live nodes, `None` for unbounded
    pub node_limit: Option<usize>,
    /// Run the full invariant check after every mutation (debug builds only)
    pub verify: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            strategy: BalanceStrategy::default(),
            node_limit: None,
            verify: cfg!(debug_assertions),
        }
    }
}

/// Caller-owned accumulator for bulk updates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub inserted: usize,
    pub duplicates: usize,
    pub removed: usize,
    pub absent: usize,
}

impl Tally {
    pub fn record_insert(&mut self, outcome: InsertOutcome) {
        match outcome {
            InsertOutcome::Inserted => self.inserted += 1,
            InsertOutcome::Duplicate => self.duplicates += 1,
        }
    }

    pub fn record_remove(&mut self, outcome: RemoveOutcome) {
        match outcome {
            RemoveOutcome::Removed => self.removed += 1,
            RemoveOutcome::Absent => self.absent += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_mixed_outcomes_when_recording_then_tally_counts_each_kind() {
        let mut tally = Tally::default();
        tally.record_insert(InsertOutcome::Inserted);
        tally.record_insert(InsertOutcome::Duplicate);
        tally.record_insert(InsertOutcome::Inserted);
        tally.record_remove(RemoveOutcome::Absent);

        assert_eq!(tally.inserted, 2);
        assert_eq!(tally.duplicates, 1);
        assert_eq!(tally.removed, 0);
        assert_eq!(tally.absent, 1);
    }

    #[test]
    fn given_strategy_when_serialized_then_uses_kebab_case() {
        let s = toml::to_string(&Wrapper {
            strategy: BalanceStrategy::BalanceFactor,
        })
        .unwrap();
        assert_eq!(s.trim(), "strategy = \"balance-factor\"");
    }

    #[test]
    fn given_strategy_names_when_parsed_then_accepts_aliases() {
        assert_eq!("height".parse(), Ok(BalanceStrategy::Height));
        assert_eq!("Balance_Factor".parse(), Ok(BalanceStrategy::BalanceFactor));
        assert!("red-black".parse::<BalanceStrategy>().is_err());
    }

    #[derive(Serialize)]
    struct Wrapper {
        strategy: BalanceStrategy,
    }
}
