// ABOUTME: Error types for device tree traversal
// ABOUTME: Structural failures only; early stop and value truncation are not errors

use thiserror::Error;

/// Structural error raised while walking a device tree buffer.
///
/// Any of these aborts the whole traversal. Observers may already have seen
/// events for the part of the buffer that preceded the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeviceTreeError {
    /// Buffer ends inside a node header
    #[error("truncated node header")]
    TruncatedNodeHeader,
    /// Buffer ends inside a property header
    #[error("truncated property header")]
    TruncatedPropertyHeader,
    /// Last byte of a property name field is not NUL
    #[error("property name is not NUL-terminated")]
    UnterminatedName,
    /// Property value (plus padding) runs past the end of the buffer
    #[error("property value overruns the buffer")]
    ValueOverrun,
    /// The root subtree ended before the end of the buffer
    #[error("trailing bytes after the root node")]
    TrailingBytes,
}
