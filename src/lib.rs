//! rsavl: height-balanced binary search trees over an index arena
//!
//! The [`domain`] layer holds the tree engine (AVL, plain search tree,
//! perfectly balanced builder) and its statistics. [`application`] services
//! drive the engine for comparisons and audits, [`config`] loads layered
//! settings and [`cli`] exposes it all on the command line.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;
