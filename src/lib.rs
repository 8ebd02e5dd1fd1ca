// ABOUTME: Nested binary device tree inspection library with zero-copy traversal
// ABOUTME: Walks the tree, infers how each property value should read and renders it as text

//! # Device Tree Inspect
//!
//! Walk nested binary device trees (node headers with property and child
//! counts, fixed 32-byte property names, 4-byte padded values) without
//! copying, and turn opaque property values into readable text.
//! Designed for `no_std` environments with `alloc`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! # use devicetree_inspect::{DeviceTreeParser, RenderConfig, render};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = std::fs::read("path/to/DeviceTree.bin")?;
//!
//! // Print every node and property
//! let mut text = String::new();
//! render(&data, &RenderConfig::default(), &mut text)?;
//! print!("{text}");
//!
//! // Or build a borrowed tree and query it
//! let parser = DeviceTreeParser::new(&data);
//! let root = parser.parse_tree()?;
//! if let Some(chosen) = root.find_node("/chosen") {
//!     println!("dram-base: {:?}", chosen.prop_u64("dram-base"));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Main Types
//!
//! - [`DeviceTreeParser`] - Parser interface over a borrowed buffer
//! - [`Events`] / [`Visitor`] - Pull-based and push-based traversal
//! - [`Node`] - Borrowed tree node with lookup helpers
//! - [`DisplayKind`] - Inferred rendering style of a property value
//! - [`ValueBuffer`] - Capacity-limited text sink for rendered values

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod devtree;
pub mod render;
pub mod value;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

#[cfg(test)]
mod integration_tests;

// Re-export main types
pub use devtree::{
    DeviceTreeError, DeviceTreeParser, Event, Events, Node, NodeEntry, NodeIterator,
    PropertyEntry, PropertyName, Traversal, Visitor, iterate, node_name,
    scan_immediate_properties,
};
pub use render::{IndentStyle, RenderConfig, RenderError, render};
pub use value::{
    Completion, DisplayKind, ValueBuffer, ValueLimit, classify, format_value, render_value,
};
