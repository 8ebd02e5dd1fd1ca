// ABOUTME: Line-oriented text dump of a device tree
// ABOUTME: One line per node and per property, with flat or tree-drawing indentation

use crate::devtree::{DeviceTreeError, NodeEntry, PropertyEntry, Visitor, iterate, node_name};
use crate::value::{Escaped, ValueBuffer, ValueLimit, render_value};
use core::fmt::{self, Write};
use core::ops::ControlFlow;
use thiserror::Error;

/// Shown for nodes without a readable `name` property
pub const UNNAMED_NODE: &str = "NODE";

/// Marker appended to values cut off by the value limit
pub const TRUNCATION_MARKER: &str = "...";

/// How nesting is drawn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IndentStyle {
    /// Four spaces per level
    #[default]
    Flat,
    /// `|   ` per ancestor level and `|-- ` before each entry
    Tree,
}

/// Output settings for [`render`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderConfig {
    /// Indentation style
    pub style: IndentStyle,
    /// Maximum rendered length of each property value
    pub value_limit: ValueLimit,
}

impl RenderConfig {
    /// Render values in full
    pub fn verbose(mut self) -> Self {
        self.value_limit = ValueLimit::Unbounded;
        self
    }

    /// Use the given indentation style
    pub fn with_style(mut self, style: IndentStyle) -> Self {
        self.style = style;
        self
    }
}

/// Failure while rendering a tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The buffer is not a well-formed tree
    #[error("malformed device tree: {0}")]
    Structure(#[from] DeviceTreeError),
    /// The output sink refused a write
    #[error("failed to write output")]
    Output(#[from] fmt::Error),
}

/// Render the tree in `data` as text into `out`.
///
/// Lines are written as the walk proceeds, so a structural error leaves the
/// lines for everything before the failure in `out`.
pub fn render<W: Write + ?Sized>(
    data: &[u8],
    config: &RenderConfig,
    out: &mut W,
) -> Result<(), RenderError> {
    let mut printer = Printer {
        out,
        style: config.style,
        buffer: ValueBuffer::new(config.value_limit),
        failed: false,
    };

    let traversal = iterate(data, &mut printer)?;
    if printer.failed {
        return Err(RenderError::Output(fmt::Error));
    }
    if traversal.consumed != data.len() {
        return Err(DeviceTreeError::TrailingBytes.into());
    }
    Ok(())
}

struct Printer<'w, W: ?Sized> {
    out: &'w mut W,
    style: IndentStyle,
    buffer: ValueBuffer,
    failed: bool,
}

impl<W: Write + ?Sized> Printer<'_, W> {
    fn write_indent(&mut self, depth: u32) -> fmt::Result {
        match self.style {
            IndentStyle::Flat => {
                for _ in 0..depth {
                    self.out.write_str("    ")?;
                }
            }
            IndentStyle::Tree => {
                if depth > 0 {
                    for _ in 1..depth {
                        self.out.write_str("|   ")?;
                    }
                    self.out.write_str("|-- ")?;
                }
            }
        }
        Ok(())
    }

    fn write_node(&mut self, node: &NodeEntry<'_>) -> fmt::Result {
        self.write_indent(node.depth)?;
        match node_name(node) {
            Some(name) => writeln!(self.out, "{}:", Escaped(name)),
            None => writeln!(self.out, "{UNNAMED_NODE}:"),
        }
    }

    fn write_property(&mut self, property: &PropertyEntry<'_>) -> fmt::Result {
        self.write_indent(property.depth)?;
        write!(self.out, "{} ({})", property.name, property.size())?;

        if !property.value.is_empty() {
            self.buffer.clear();
            let completion = render_value(property.name.as_bytes(), property.value, &mut self.buffer);
            write!(self.out, ": {}", self.buffer.as_str())?;
            if !completion.is_complete() {
                self.out.write_str(TRUNCATION_MARKER)?;
            }
        }

        self.out.write_char('\n')
    }

    fn check(&mut self, result: fmt::Result) -> ControlFlow<()> {
        match result {
            Ok(()) => ControlFlow::Continue(()),
            Err(fmt::Error) => {
                self.failed = true;
                ControlFlow::Break(())
            }
        }
    }
}

impl<'a, W: Write + ?Sized> Visitor<'a> for Printer<'_, W> {
    fn visit_node(&mut self, node: &NodeEntry<'a>) -> ControlFlow<()> {
        let result = self.write_node(node);
        self.check(result)
    }

    fn visit_property(&mut self, property: &PropertyEntry<'a>) -> ControlFlow<()> {
        let result = self.write_property(property);
        self.check(result)
    }
}
