//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use std::fmt::Display;

use colored::Colorize;
use itertools::Itertools;

use crate::application::services::ComparisonReport;
use crate::domain::{Key, TreeSummary};

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print success status (green checkmark)
pub fn success(msg: &(impl Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print indented detail (no color)
pub fn detail(msg: &(impl Display + ?Sized)) {
    println!("  {}", msg);
}

/// Print plain output (no color, for data)
pub fn info(msg: &(impl Display + ?Sized)) {
    println!("{}", msg);
}

/// Space-separated keys.
pub fn key_line(keys: &[Key]) -> String {
    keys.iter().join(" ")
}

/// Indented `name: value` lines for one summary.
pub fn summary(summary: &TreeSummary) {
    detail(&format!("size:               {}", summary.size));
    detail(&format!("checksum:           {}", summary.checksum));
    detail(&format!("height:             {}", summary.height));
    detail(&format!("leaves:             {}", summary.leaves));
    detail(&format!(
        "average leaf depth: {:.3}",
        summary.average_leaf_depth
    ));
    detail(&format!(
        "average node depth: {:.3}",
        summary.average_node_depth
    ));
}

/// One row per tree kind.
pub fn comparison_table(report: &ComparisonReport) -> String {
    let head = format!(
        "{:<8} {:>6} {:>12} {:>7} {:>7} {:>10} {:>10}",
        "tree", "size", "checksum", "height", "leaves", "leaf avg", "node avg"
    );
    let rows = report.rows.iter().map(|row| {
        let s = &row.summary;
        format!(
            "{:<8} {:>6} {:>12} {:>7} {:>7} {:>10.3} {:>10.3}",
            row.kind.to_string(),
            s.size,
            s.checksum,
            s.height,
            s.leaves,
            s.average_leaf_depth,
            s.average_node_depth
        )
    });
    std::iter::once(head).chain(rows).join("\n")
}
