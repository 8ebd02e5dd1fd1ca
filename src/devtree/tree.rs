// ABOUTME: Borrowed in-memory tree built from a device tree walk
// ABOUTME: Node lookup by name, path and compatible string plus typed property accessors

use super::walker::PropertyEntry;
use alloc::{vec, vec::Vec};
use core::ops::Index;

/// A device tree node whose properties borrow from the source buffer
#[derive(Debug, Clone, PartialEq)]
pub struct Node<'a> {
    /// Offset of the node header in the source buffer
    pub offset: usize,
    /// Node properties in encoded order
    pub properties: Vec<PropertyEntry<'a>>,
    /// Child nodes in encoded order
    pub children: Vec<Node<'a>>,
}

impl<'a> Node<'a> {
    /// Create an empty node located at `offset`
    pub fn new(offset: usize) -> Self {
        Self {
            offset,
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add a property to the node
    pub fn add_property(&mut self, property: PropertyEntry<'a>) {
        self.properties.push(property);
    }

    /// Add a child node
    pub fn add_child(&mut self, child: Node<'a>) {
        self.children.push(child);
    }

    /// Node name taken from its `name` property
    pub fn name(&self) -> Option<&'a str> {
        self.name_bytes()
            .and_then(|bytes| core::str::from_utf8(bytes).ok())
    }

    /// Raw node name bytes, up to the first NUL; the last `name` property wins
    pub fn name_bytes(&self) -> Option<&'a [u8]> {
        self.properties
            .iter()
            .rev()
            .find(|p| p.name == "name")
            .map(|p| p.value_cstr())
    }

    /// Find a property by name
    pub fn find_property(&self, name: &str) -> Option<&PropertyEntry<'a>> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Check if property exists
    pub fn has_property(&self, name: &str) -> bool {
        self.find_property(name).is_some()
    }

    /// Get property value as raw bytes
    pub fn prop_bytes(&self, name: &str) -> Option<&'a [u8]> {
        self.find_property(name).map(|p| p.value)
    }

    /// Get a 4-byte property as a little-endian u32
    pub fn prop_u32(&self, name: &str) -> Option<u32> {
        let bytes: [u8; 4] = self.prop_bytes(name)?.try_into().ok()?;
        Some(u32::from_le_bytes(bytes))
    }

    /// Get an 8-byte property as a little-endian u64
    pub fn prop_u64(&self, name: &str) -> Option<u64> {
        let bytes: [u8; 8] = self.prop_bytes(name)?.try_into().ok()?;
        Some(u64::from_le_bytes(bytes))
    }

    /// Get property value as a string, up to the first NUL
    pub fn prop_str(&self, name: &str) -> Option<&'a str> {
        let property = self.find_property(name)?;
        core::str::from_utf8(property.value_cstr()).ok()
    }

    /// Entries of the NUL-separated `compatible` list
    pub fn compatible(&self) -> impl Iterator<Item = &'a str> + use<'a> {
        let value = self.prop_bytes("compatible").unwrap_or_default();
        value
            .split(|&b| b == 0)
            .filter(|entry| !entry.is_empty())
            .filter_map(|entry| core::str::from_utf8(entry).ok())
    }

    /// Find a direct child by name
    pub fn find_child(&self, name: &str) -> Option<&Node<'a>> {
        self.children.iter().find(|c| c.name() == Some(name))
    }

    /// Find a node by path (e.g., "/arm-io/uart0"), relative to this node
    pub fn find_node(&self, path: &str) -> Option<&Node<'a>> {
        path.split('/')
            .filter(|part| !part.is_empty())
            .try_fold(self, |node, part| node.find_child(part))
    }

    /// Get all nodes with a specific property
    pub fn find_nodes_with_property(&self, property_name: &str) -> Vec<&Node<'a>> {
        self.iter_nodes()
            .filter(|node| node.has_property(property_name))
            .collect()
    }

    /// Get all nodes whose `compatible` list contains `compatible`
    pub fn find_compatible_nodes(&self, compatible: &str) -> Vec<&Node<'a>> {
        self.iter_nodes()
            .filter(|node| node.compatible().any(|entry| entry == compatible))
            .collect()
    }

    /// Get iterator over all nodes (depth-first traversal)
    pub fn iter_nodes(&self) -> NodeIterator<'_, 'a> {
        NodeIterator::new(self)
    }

    /// Get iterator over all properties
    pub fn iter_properties(&self) -> core::slice::Iter<'_, PropertyEntry<'a>> {
        self.properties.iter()
    }

    /// Get iterator over child nodes
    pub fn iter_children(&self) -> core::slice::Iter<'_, Node<'a>> {
        self.children.iter()
    }
}

impl<'a> Index<&str> for Node<'a> {
    type Output = PropertyEntry<'a>;

    /// Panics if the property does not exist; see [`Node::find_property`].
    fn index(&self, name: &str) -> &Self::Output {
        self.find_property(name)
            .unwrap_or_else(|| panic!("no property named {name:?}"))
    }
}

impl<'n, 'a> IntoIterator for &'n Node<'a> {
    type Item = &'n Node<'a>;
    type IntoIter = core::slice::Iter<'n, Node<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.children.iter()
    }
}

/// Iterator for depth-first traversal of tree nodes
pub struct NodeIterator<'n, 'a> {
    stack: Vec<&'n Node<'a>>,
}

impl<'n, 'a> NodeIterator<'n, 'a> {
    fn new(root: &'n Node<'a>) -> Self {
        Self { stack: vec![root] }
    }
}

impl<'n, 'a> Iterator for NodeIterator<'n, 'a> {
    type Item = &'n Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Push children in reverse so the first child is visited next
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
