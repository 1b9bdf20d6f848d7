//! Typed representation of a publication manifest.
//!
//! This module contains:
//! - The term taxonomy of each node kind
//! - Nodes and property values
//! - The processed manifest wrapper

mod manifest;
mod node;
pub mod terms;

pub use manifest::Manifest;
pub use node::{Direction, EntityKind, Node, NodeKind, Value};
pub use terms::{TermCategory, Terms};
