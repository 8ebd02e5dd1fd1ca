// ABOUTME: Encoder for synthetic device tree buffers used by tests and benchmarks
// ABOUTME: Builds nested nodes with padded values, substitution flags and unpadded endings

//! Test utilities for building device tree buffers.
//!
//! This module is only compiled for tests and benchmarks.

use crate::devtree::header::{PropertyHeader, padding_for};
use alloc::string::String;
use alloc::vec::Vec;

/// In-memory node used to encode test fixtures
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeBuilder {
    properties: Vec<(String, Vec<u8>, bool)>,
    children: Vec<NodeBuilder>,
}

impl NodeBuilder {
    /// Create a node with no properties or children.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a node carrying a `name` property.
    pub fn named(name: &str) -> Self {
        Self::new().string_property("name", name)
    }

    /// Add a property with a raw value.
    ///
    /// Panics if the name does not fit the 32-byte name field.
    pub fn property(mut self, name: &str, value: &[u8]) -> Self {
        assert!(name.len() < PropertyHeader::NAME_LEN, "property name too long");
        self.properties.push((name.into(), value.to_vec(), false));
        self
    }

    /// Add a property with the substitution flag set.
    pub fn substituted_property(mut self, name: &str, value: &[u8]) -> Self {
        self = self.property(name, value);
        if let Some(last) = self.properties.last_mut() {
            last.2 = true;
        }
        self
    }

    /// Add a NUL-terminated string property.
    pub fn string_property(self, name: &str, value: &str) -> Self {
        let mut bytes = value.as_bytes().to_vec();
        bytes.push(0);
        self.property(name, &bytes)
    }

    /// Add a little-endian u32 property.
    pub fn u32_property(self, name: &str, value: u32) -> Self {
        self.property(name, &value.to_le_bytes())
    }

    /// Add a little-endian u64 property.
    pub fn u64_property(self, name: &str, value: u64) -> Self {
        self.property(name, &value.to_le_bytes())
    }

    /// Append a child subtree.
    pub fn child(mut self, child: NodeBuilder) -> Self {
        self.children.push(child);
        self
    }

    /// Number of nodes in this subtree.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(NodeBuilder::node_count).sum::<usize>()
    }

    /// Number of properties in this subtree.
    pub fn property_count(&self) -> usize {
        self.properties.len()
            + self
                .children
                .iter()
                .map(NodeBuilder::property_count)
                .sum::<usize>()
    }

    /// Encode with every value padded to 4 bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_into(&mut out);
        out
    }

    /// Encode, dropping the padding of the final value in the buffer.
    pub fn encode_without_trailing_padding(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let trailing = self.encode_into(&mut out);
        out.truncate(out.len() - trailing);
        out
    }

    /// Returns the number of padding bytes at the very end of `out`.
    fn encode_into(&self, out: &mut Vec<u8>) -> usize {
        out.extend_from_slice(&(self.properties.len() as u32).to_le_bytes());
        out.extend_from_slice(&(self.children.len() as u32).to_le_bytes());
        let mut trailing = 0;

        for (name, value, substituted) in &self.properties {
            let mut field = [0u8; PropertyHeader::NAME_LEN];
            field[..name.len()].copy_from_slice(name.as_bytes());
            out.extend_from_slice(&field);

            let mut size = value.len() as u32;
            if *substituted {
                size |= PropertyHeader::SUBSTITUTION_FLAG;
            }
            out.extend_from_slice(&size.to_le_bytes());
            out.extend_from_slice(value);

            trailing = padding_for(value.len());
            out.resize(out.len() + trailing, 0);
        }

        for child in &self.children {
            trailing = child.encode_into(out);
        }

        trailing
    }
}
