//! Comparison of tree shapes built from one key set
//!
//! The perfectly balanced tree is the lower bound for height and depth; the
//! AVL tree and the plain search tree are built by inserting the keys in
//! generation order.

use std::fmt;

use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::application::services::KeyGenerator;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{AvlTree, Key, PerfectTree, SearchTree, TreeOptions, TreeSummary, TreeView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeKind {
    Perfect,
    Avl,
    Search,
}

impl fmt::Display for TreeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TreeKind::Perfect => "perfect",
            TreeKind::Avl => "AVL",
            TreeKind::Search => "BST",
        };
        f.write_str(name)
    }
}

/// Parameters for a randomized comparison run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareRequest {
    pub count: usize,
    pub min_key: Key,
    pub max_key: Key,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub kind: TreeKind,
    pub summary: TreeSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    /// Keys in insertion order
    pub keys: Vec<Key>,
    pub rows: Vec<ReportRow>,
    /// All trees agree on size, checksum and in-order sequence
    pub consistent: bool,
}

impl ComparisonReport {
    pub fn row(&self, kind: TreeKind) -> Option<&ReportRow> {
        self.rows.iter().find(|row| row.kind == kind)
    }

    /// Turns a disagreement between the trees into an error.
    pub fn ensure_consistent(&self) -> ApplicationResult<()> {
        if self.consistent {
            return Ok(());
        }
        let detail = self
            .rows
            .iter()
            .map(|row| {
                format!(
                    "{} size={} checksum={}",
                    row.kind, row.summary.size, row.summary.checksum
                )
            })
            .collect::<Vec<_>>()
            .join(", ");
        Err(ApplicationError::Inconsistent { context: detail })
    }
}

/// Builds the three tree kinds and summarizes them.
#[derive(Debug, Clone, Default)]
pub struct ComparisonService {
    options: TreeOptions,
}

impl ComparisonService {
    pub fn new(options: TreeOptions) -> Self {
        Self { options }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn run(&self, request: &CompareRequest) -> ApplicationResult<ComparisonReport> {
        let keys = KeyGenerator::new(request.seed).unique(
            request.count,
            request.min_key,
            request.max_key,
        )?;
        self.compare(keys)
    }

    /// Compares trees built from `keys`; duplicates are allowed and skipped.
    pub fn compare(&self, keys: Vec<Key>) -> ApplicationResult<ComparisonReport> {
        let perfect = PerfectTree::from_keys(keys.iter().copied())?;
        let avl = AvlTree::from_keys(keys.iter().copied(), self.options)?;
        let mut search = SearchTree::with_limit(self.options.node_limit);
        for &key in &keys {
            let _ = search.insert(key)?;
        }

        let reference = perfect.keys();
        let consistent = avl.keys() == reference && search.keys() == reference;
        if !consistent {
            warn!("trees built from the same keys disagree");
        }

        let rows = vec![
            ReportRow {
                kind: TreeKind::Perfect,
                summary: perfect.summary(),
            },
            ReportRow {
                kind: TreeKind::Avl,
                summary: avl.summary(),
            },
            ReportRow {
                kind: TreeKind::Search,
                summary: search.summary(),
            },
        ];
        let first = rows[0].summary;
        let consistent = consistent
            && rows
                .iter()
                .all(|row| row.summary.size == first.size && row.summary.checksum == first.checksum);
        debug!(keys = keys.len(), consistent, "comparison complete");

        Ok(ComparisonReport {
            keys,
            rows,
            consistent,
        })
    }
}
