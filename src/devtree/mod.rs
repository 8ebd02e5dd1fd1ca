// ABOUTME: Nested binary device tree traversal module
// ABOUTME: Provides no_std compatible, zero-copy walking and tree building

pub mod error;
pub mod header;
pub mod parser;
pub mod tree;
pub mod walker;

pub use error::DeviceTreeError;
pub use header::{NodeHeader, PropertyHeader, PropertyName};
pub use parser::DeviceTreeParser;
pub use tree::{Node, NodeIterator};
pub use walker::{
    Event, Events, NodeEntry, PropertyEntry, Traversal, Visitor, iterate, node_name,
    scan_immediate_properties,
};
