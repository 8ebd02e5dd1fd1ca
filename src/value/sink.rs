// ABOUTME: Capacity-limited text buffer used as the value rendering sink
// ABOUTME: Grows geometrically up to its limit, then keeps the prefix and refuses more

use alloc::string::String;
use core::fmt;

/// Maximum rendered length of one value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueLimit {
    /// Stop after this many bytes of text
    Bounded(usize),
    /// Grow as needed
    Unbounded,
}

impl ValueLimit {
    /// Limit used for non-verbose output
    pub const DEFAULT: ValueLimit = ValueLimit::Bounded(63);
}

impl Default for ValueLimit {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Text sink with a configurable maximum size.
///
/// Writes that would pass the limit store the part that fits and fail with
/// [`fmt::Error`]; every later write fails without storing anything. The
/// text written so far is always a valid prefix of the full rendering.
#[derive(Debug, Clone)]
pub struct ValueBuffer {
    text: String,
    limit: ValueLimit,
    exhausted: bool,
}

impl ValueBuffer {
    /// Capacity allocated up front, unless the limit is smaller
    pub const INITIAL_CAPACITY: usize = 256;

    /// Create an empty buffer with the given limit
    pub fn new(limit: ValueLimit) -> Self {
        let capacity = match limit {
            ValueLimit::Bounded(max) => max.min(Self::INITIAL_CAPACITY),
            ValueLimit::Unbounded => Self::INITIAL_CAPACITY,
        };

        Self {
            text: String::with_capacity(capacity),
            limit,
            exhausted: false,
        }
    }

    /// Create a buffer that holds at most `max` bytes
    pub fn bounded(max: usize) -> Self {
        Self::new(ValueLimit::Bounded(max))
    }

    /// Create a buffer without a limit
    pub fn unbounded() -> Self {
        Self::new(ValueLimit::Unbounded)
    }

    /// Text written so far
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether a write has been refused for lack of room
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Configured limit
    pub fn limit(&self) -> ValueLimit {
        self.limit
    }

    /// Current allocation size
    pub fn capacity(&self) -> usize {
        self.text.capacity()
    }

    /// Forget the contents, keeping the allocation
    pub fn clear(&mut self) {
        self.text.clear();
        self.exhausted = false;
    }

    /// Take the text out of the buffer
    pub fn into_string(self) -> String {
        self.text
    }

    fn room(&self) -> usize {
        match self.limit {
            ValueLimit::Bounded(max) => max.saturating_sub(self.text.len()),
            ValueLimit::Unbounded => usize::MAX,
        }
    }

    // Double the allocation until `additional` more bytes fit, clamped to the limit.
    fn reserve(&mut self, additional: usize) {
        let needed = self.text.len() + additional;
        if needed <= self.text.capacity() {
            return;
        }

        let mut target = self.text.capacity().max(1).saturating_mul(2).max(needed);
        if let ValueLimit::Bounded(max) = self.limit {
            target = target.min(max);
        }
        self.text.reserve_exact(target - self.text.len());
    }
}

impl fmt::Write for ValueBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.exhausted {
            return Err(fmt::Error);
        }

        let room = self.room();
        if s.len() <= room {
            self.reserve(s.len());
            self.text.push_str(s);
            return Ok(());
        }

        let mut cut = room;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        self.reserve(cut);
        self.text.push_str(&s[..cut]);
        self.exhausted = true;
        Err(fmt::Error)
    }
}
