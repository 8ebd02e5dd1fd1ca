// ABOUTME: Property value classification and text rendering
// ABOUTME: Infers a display kind from name and bytes, then formats into a bounded sink

pub mod classify;
pub mod format;
pub mod sink;

pub use classify::{DisplayKind, ValueStats, classify};
pub use format::{Completion, Escaped, format_value};
pub use sink::{ValueBuffer, ValueLimit};

use core::fmt::Write;

/// Classify and format one property value.
///
/// Empty values are not classified and render as nothing.
pub fn render_value<W: Write + ?Sized>(name: &[u8], bytes: &[u8], out: &mut W) -> Completion {
    if bytes.is_empty() {
        return Completion::Complete;
    }
    format_value(classify(name, bytes), bytes, out)
}
