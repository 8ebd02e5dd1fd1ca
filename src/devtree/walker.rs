// ABOUTME: Depth-first traversal engine over a borrowed device tree buffer
// ABOUTME: Pull-based event stream plus a visitor driver with early stop

use super::error::DeviceTreeError;
use super::header::{NodeHeader, PropertyHeader, PropertyName};
use alloc::vec::Vec;
use core::iter::FusedIterator;
use core::ops::ControlFlow;

/// A node as seen during traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeEntry<'a> {
    /// Nesting depth, 0 for the root
    pub depth: u32,
    /// Offset of the node header from the start of the buffer
    pub offset: usize,
    /// Bytes from the node header to the end of the buffer
    pub bytes: &'a [u8],
    /// Number of properties declared by the header
    pub n_properties: u32,
    /// Number of children declared by the header
    pub n_children: u32,
}

/// A property as seen during traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyEntry<'a> {
    /// Depth of the owning node plus one
    pub depth: u32,
    /// Property name
    pub name: PropertyName<'a>,
    /// Value bytes, without padding
    pub value: &'a [u8],
    /// Whether the loader is expected to substitute this value
    pub needs_substitution: bool,
}

impl<'a> PropertyEntry<'a> {
    /// Value size in bytes
    pub fn size(&self) -> usize {
        self.value.len()
    }

    /// Value up to the first NUL (or the whole value if there is none)
    pub fn value_cstr(&self) -> &'a [u8] {
        let end = self
            .value
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.value.len());
        &self.value[..end]
    }
}

/// Traversal event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event<'a> {
    /// A node header was read; its properties follow
    NodeEntered(NodeEntry<'a>),
    /// A property of the most recently entered, still open node
    Property(PropertyEntry<'a>),
    /// All properties and children of a node have been visited
    NodeExited {
        /// Depth of the node being closed
        depth: u32,
    },
}

#[derive(Debug)]
struct Frame {
    depth: u32,
    properties_left: u32,
    children_left: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    Walking,
    Finished,
    Failed,
}

/// Pull-based depth-first event stream.
///
/// Events come in pre-order: a node, its properties, then each child subtree,
/// then the node's exit. The walk keeps its own stack, so nesting depth is
/// limited by memory rather than by the call stack. A consumer stops the walk
/// simply by not pulling further events.
///
/// After a structural error is yielded the stream is exhausted.
#[derive(Debug)]
pub struct Events<'a> {
    data: &'a [u8],
    remaining: &'a [u8],
    stack: Vec<Frame>,
    state: State,
}

impl<'a> Events<'a> {
    /// Start a walk at the root node at the front of `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            remaining: data,
            stack: Vec::new(),
            state: State::Start,
        }
    }

    /// Number of bytes consumed so far
    pub fn offset(&self) -> usize {
        self.data.len() - self.remaining.len()
    }

    /// Whether the root subtree has been fully walked
    pub fn is_complete(&self) -> bool {
        self.state == State::Finished
    }

    fn enter_node(&mut self, depth: u32) -> Result<Event<'a>, DeviceTreeError> {
        let offset = self.offset();
        let bytes = self.remaining;
        let (remaining, header) = NodeHeader::parse(bytes)?;
        self.remaining = remaining;

        self.stack.push(Frame {
            depth,
            properties_left: header.n_properties,
            children_left: header.n_children,
        });

        Ok(Event::NodeEntered(NodeEntry {
            depth,
            offset,
            bytes,
            n_properties: header.n_properties,
            n_children: header.n_children,
        }))
    }

    fn read_property(&mut self, depth: u32) -> Result<Event<'a>, DeviceTreeError> {
        let (remaining, header) = PropertyHeader::parse(self.remaining)?;
        let (remaining, value) = header.split_value(remaining)?;
        self.remaining = remaining;

        Ok(Event::Property(PropertyEntry {
            depth,
            name: header.name,
            value,
            needs_substitution: header.needs_substitution,
        }))
    }

    fn step(&mut self) -> Option<Result<Event<'a>, DeviceTreeError>> {
        if self.state == State::Start {
            self.state = State::Walking;
            return Some(self.enter_node(0));
        }

        let frame = self.stack.last_mut()?;
        let depth = frame.depth;

        if frame.properties_left > 0 {
            frame.properties_left -= 1;
            Some(self.read_property(depth + 1))
        } else if frame.children_left > 0 {
            frame.children_left -= 1;
            Some(self.enter_node(depth + 1))
        } else {
            self.stack.pop();
            if self.stack.is_empty() {
                self.state = State::Finished;
            }
            Some(Ok(Event::NodeExited { depth }))
        }
    }
}

impl<'a> Iterator for Events<'a> {
    type Item = Result<Event<'a>, DeviceTreeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if matches!(self.state, State::Finished | State::Failed) {
            return None;
        }

        let event = self.step();
        if let Some(Err(err)) = &event {
            log::debug!("device tree walk failed at offset {}: {err}", self.offset());
            self.stack.clear();
            self.state = State::Failed;
        }
        event
    }
}

impl FusedIterator for Events<'_> {}

/// Observer of traversal events.
///
/// Each method returns [`ControlFlow::Break`] to stop the walk. Stopping is not
/// an error: the walk reports success with a shorter consumed length.
pub trait Visitor<'a> {
    /// Called when a node header has been read
    fn visit_node(&mut self, _node: &NodeEntry<'a>) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    /// Called for each property, in order, before any child of its node
    fn visit_property(&mut self, _property: &PropertyEntry<'a>) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    /// Called after a node's last child subtree
    fn leave_node(&mut self, _depth: u32) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

impl Visitor<'_> for () {}

impl<'a, V: Visitor<'a> + ?Sized> Visitor<'a> for &mut V {
    fn visit_node(&mut self, node: &NodeEntry<'a>) -> ControlFlow<()> {
        (**self).visit_node(node)
    }

    fn visit_property(&mut self, property: &PropertyEntry<'a>) -> ControlFlow<()> {
        (**self).visit_property(property)
    }

    fn leave_node(&mut self, depth: u32) -> ControlFlow<()> {
        (**self).leave_node(depth)
    }
}

/// Outcome of a successful walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Traversal {
    /// Bytes consumed when the walk ended
    pub consumed: usize,
    /// Whether a visitor asked to stop early
    pub stopped: bool,
}

/// Walk the tree at the front of `data`, feeding every event to `visitor`.
///
/// Returns the consumed length on success or early stop. For a complete walk
/// `consumed` is the length of the root subtree, which equals `data.len()`
/// for a buffer holding exactly one tree.
pub fn iterate<'a, V: Visitor<'a>>(
    data: &'a [u8],
    mut visitor: V,
) -> Result<Traversal, DeviceTreeError> {
    let mut events = Events::new(data);

    while let Some(event) = events.next() {
        let flow = match event? {
            Event::NodeEntered(node) => visitor.visit_node(&node),
            Event::Property(property) => visitor.visit_property(&property),
            Event::NodeExited { depth } => visitor.leave_node(depth),
        };

        if flow.is_break() {
            log::trace!("device tree walk stopped at offset {}", events.offset());
            return Ok(Traversal {
                consumed: events.offset(),
                stopped: true,
            });
        }
    }

    Ok(Traversal {
        consumed: events.offset(),
        stopped: false,
    })
}

/// Visit only the direct properties of the node at the front of `node`.
///
/// The walk halts as soon as the first child is entered, so no property of a
/// descendant is ever reported. Children are not validated.
pub fn scan_immediate_properties<'a, F>(node: &'a [u8], on_property: F) -> Result<(), DeviceTreeError>
where
    F: FnMut(&PropertyEntry<'a>) -> ControlFlow<()>,
{
    struct DirectProperties<F>(F);

    impl<'a, F> Visitor<'a> for DirectProperties<F>
    where
        F: FnMut(&PropertyEntry<'a>) -> ControlFlow<()>,
    {
        fn visit_node(&mut self, node: &NodeEntry<'a>) -> ControlFlow<()> {
            if node.depth == 0 {
                ControlFlow::Continue(())
            } else {
                ControlFlow::Break(())
            }
        }

        fn visit_property(&mut self, property: &PropertyEntry<'a>) -> ControlFlow<()> {
            (self.0)(property)
        }
    }

    iterate(node, DirectProperties(on_property)).map(|_| ())
}

/// Display name of a node: the NUL-terminated prefix of its `name` property.
///
/// If a node carries several `name` properties the last one wins.
pub fn node_name<'a>(node: &NodeEntry<'a>) -> Option<&'a [u8]> {
    let mut name = None;
    let scanned = scan_immediate_properties(node.bytes, |property| {
        if property.name == "name" {
            name = Some(property.value_cstr());
        }
        ControlFlow::Continue(())
    });

    scanned.ok().and(name)
}
