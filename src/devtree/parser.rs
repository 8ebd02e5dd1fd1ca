// ABOUTME: Core device tree parser entry point over a borrowed buffer
// ABOUTME: Provides the DeviceTreeParser struct, tree building and lookups

use super::error::DeviceTreeError;
use super::tree::Node;
use super::walker::{self, Event, Events, PropertyEntry, Traversal, Visitor};
use alloc::vec::Vec;
use core::ops::ControlFlow;

/// Main device tree parser struct
#[derive(Debug, Clone, Copy)]
pub struct DeviceTreeParser<'a> {
    data: &'a [u8],
}

impl<'a> DeviceTreeParser<'a> {
    /// Create a new parser over a device tree buffer
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Get the underlying data slice
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Pull-based event stream over the whole tree
    pub fn events(&self) -> Events<'a> {
        Events::new(self.data)
    }

    /// Walk the tree, feeding every event to `visitor`
    pub fn iterate<V: Visitor<'a>>(&self, visitor: V) -> Result<Traversal, DeviceTreeError> {
        walker::iterate(self.data, visitor)
    }

    /// Visit the root node's own properties, without descending
    pub fn scan_immediate_properties<F>(&self, on_property: F) -> Result<(), DeviceTreeError>
    where
        F: FnMut(&PropertyEntry<'a>) -> ControlFlow<()>,
    {
        walker::scan_immediate_properties(self.data, on_property)
    }

    /// Name of the root node, if it has a `name` property (the last one wins)
    pub fn root_name(&self) -> Result<Option<&'a [u8]>, DeviceTreeError> {
        let mut name = None;
        self.scan_immediate_properties(|property| {
            if property.name == "name" {
                name = Some(property.value_cstr());
            }
            ControlFlow::Continue(())
        })?;
        Ok(name)
    }

    /// Walk the whole tree and check that it spans the entire buffer
    pub fn validate(&self) -> Result<(), DeviceTreeError> {
        let traversal = self.iterate(())?;
        if traversal.consumed != self.data.len() {
            return Err(DeviceTreeError::TrailingBytes);
        }
        Ok(())
    }

    /// Parse the complete device tree structure
    pub fn parse_tree(&self) -> Result<Node<'a>, DeviceTreeError> {
        let mut events = self.events();
        let root = build_tree(&mut events)?;

        if events.offset() != self.data.len() {
            return Err(DeviceTreeError::TrailingBytes);
        }
        Ok(root)
    }

    /// Find node by path
    pub fn find_node(&self, path: &str) -> Result<Option<Node<'a>>, DeviceTreeError> {
        let root = self.parse_tree()?;
        Ok(root.find_node(path).cloned())
    }

    /// Find all nodes with a specific compatible string
    pub fn find_compatible_nodes(&self, compatible: &str) -> Result<Vec<Node<'a>>, DeviceTreeError> {
        let root = self.parse_tree()?;
        let nodes = root.find_compatible_nodes(compatible);
        Ok(nodes.into_iter().cloned().collect())
    }
}

/// Build the node hierarchy from an event stream using an explicit stack
fn build_tree<'a>(events: &mut Events<'a>) -> Result<Node<'a>, DeviceTreeError> {
    let mut node_stack: Vec<Node<'a>> = Vec::new();

    for event in events {
        match event? {
            Event::NodeEntered(entry) => {
                node_stack.push(Node::new(entry.offset));
            }
            Event::Property(property) => {
                if let Some(current_node) = node_stack.last_mut() {
                    current_node.add_property(property);
                }
            }
            Event::NodeExited { .. } => {
                if let Some(completed_node) = node_stack.pop() {
                    match node_stack.last_mut() {
                        Some(parent_node) => parent_node.add_child(completed_node),
                        // The root closes last; the stream ends here
                        None => return Ok(completed_node),
                    }
                }
            }
        }
    }

    // A well-formed stream always closes the root before ending
    Err(DeviceTreeError::TruncatedNodeHeader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::NodeBuilder;
    use alloc::vec;

    fn sample() -> Vec<u8> {
        NodeBuilder::named("device-tree")
            .string_property("compatible", "N71AP\0iPhone8,1\0AppleARM")
            .child(
                NodeBuilder::named("arm-io")
                    .child(
                        NodeBuilder::named("uart0")
                            .string_property("compatible", "uart-1,samsung")
                            .property("reg", &[0u8; 16]),
                    )
                    .child(NodeBuilder::named("gpio").u32_property("#gpio-pins", 208)),
            )
            .child(NodeBuilder::named("chosen").u64_property("dram-base", 0x8_0000_0000))
            .encode()
    }

    #[test]
    fn test_parse_tree() {
        let data = sample();
        let parser = DeviceTreeParser::new(&data);
        let root = parser.parse_tree().unwrap();

        assert_eq!(root.name(), Some("device-tree"));
        assert_eq!(root.offset, 0);
        assert_eq!(root.children.len(), 2);
        assert_eq!(
            root.compatible().collect::<Vec<_>>(),
            vec!["N71AP", "iPhone8,1", "AppleARM"]
        );

        let gpio = root.find_node("/arm-io/gpio").unwrap();
        assert_eq!(gpio.prop_u32("#gpio-pins"), Some(208));

        let chosen = root.find_child("chosen").unwrap();
        assert_eq!(chosen.prop_u64("dram-base"), Some(0x8_0000_0000));
        assert_eq!(root.iter_nodes().count(), 5);
    }

    #[test]
    fn test_parse_tree_trailing_bytes() {
        let mut data = sample();
        data.extend_from_slice(&[0, 0, 0, 0]);
        let parser = DeviceTreeParser::new(&data);
        assert_eq!(parser.parse_tree(), Err(DeviceTreeError::TrailingBytes));
        assert_eq!(parser.validate(), Err(DeviceTreeError::TrailingBytes));
    }

    #[test]
    fn test_parse_tree_truncated() {
        let data = sample();
        let parser = DeviceTreeParser::new(&data[..data.len() - 8]);
        assert_eq!(parser.parse_tree(), Err(DeviceTreeError::ValueOverrun));
    }

    #[test]
    fn test_root_name() {
        let data = sample();
        let parser = DeviceTreeParser::new(&data);
        assert_eq!(parser.root_name(), Ok(Some(&b"device-tree"[..])));
        assert_eq!(parser.validate(), Ok(()));

        let anonymous = NodeBuilder::new().encode();
        assert_eq!(DeviceTreeParser::new(&anonymous).root_name(), Ok(None));

        let renamed = NodeBuilder::named("first")
            .string_property("name", "second")
            .encode();
        let parser = DeviceTreeParser::new(&renamed);
        assert_eq!(parser.root_name(), Ok(Some(&b"second"[..])));
        assert_eq!(parser.parse_tree().unwrap().name(), Some("second"));
    }

    #[test]
    fn test_find_helpers() {
        let data = sample();
        let parser = DeviceTreeParser::new(&data);

        let uart = parser.find_node("/arm-io/uart0").unwrap().unwrap();
        assert!(uart.has_property("reg"));
        assert!(parser.find_node("/missing").unwrap().is_none());

        let uarts = parser.find_compatible_nodes("uart-1,samsung").unwrap();
        assert_eq!(uarts.len(), 1);
        assert_eq!(uarts[0].name(), Some("uart0"));
    }
}
