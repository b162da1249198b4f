//! # Depset Library
//!
//! This library provides ordered sharing sets and lazily materialized
//! argument lists, the two building blocks a build tool needs to pass large,
//! heavily overlapping sets of inputs to commands without copying them at
//! every level of the dependency graph. It is used by the `depset`
//! command-line tool but has no dependency on it.
//!
//! ## Quick Example
//!
//! ```
//! use depset::args::{AllOptions, Args};
//! use depset::depset::{Depset, Order};
//!
//! // Two libraries share a common base set
//! let base = Depset::leaf(vec!["base.h"], Order::Postorder);
//! let net = Depset::new(vec!["net.h"], vec![base.clone()], Order::Postorder).unwrap();
//! let log = Depset::new(vec!["log.h"], vec![base], Order::Postorder).unwrap();
//! let app = Depset::new(vec!["app.h"], vec![net, log], Order::Postorder).unwrap();
//!
//! // The shared base appears once, before everything that includes it
//! assert_eq!(app.flatten(), vec!["base.h", "net.h", "log.h", "app.h"]);
//!
//! // Build a command line from the set without expanding it yet
//! let mut args = Args::new();
//! args.add("cc");
//! args.add_all(app, AllOptions::new().before_each("-include")).unwrap();
//! assert_eq!(args.materialize().unwrap().len(), 9);
//! ```
//!
//! ## Core Concepts
//!
//! - **Sets (`depset`)**: Immutable DAG nodes of direct elements plus shared
//!   child sets. Flattening deduplicates and honours one of four orders.
//! - **Named Sets (`graph`)**: Sets declared by name, which may reference each
//!   other in any order. Resolution builds each set once and reports cycles.
//! - **Argument Lists (`args`)**: Ordered entries expanded only at
//!   materialization, with optional spilling to a param file.
//! - **Manifests (`manifest`)**: The YAML format the CLI reads sets and
//!   command lines from.
//!
//! Errors from every module share the [`error::Error`] type.

pub mod args;
pub mod defaults;
pub mod depset;
pub mod error;
pub mod graph;
pub mod manifest;
pub mod output;

#[cfg(test)]
mod depset_proptest;
