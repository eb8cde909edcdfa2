//! Scoped output capture.
//!
//! File templates write their output into an [`OutputCapture`] instead of a
//! process-wide stream. Creating a capture raises the current thread's
//! capture level and dropping it lowers the level again, whichever way the
//! render exits. [`capture_level`] reports how many captures are currently
//! open on the thread; outside a render it is always zero.

use std::cell::Cell;
use std::fmt;
use std::marker::PhantomData;

thread_local! {
    static CAPTURE_LEVEL: Cell<usize> = const { Cell::new(0) };
}

/// Number of output captures currently open on this thread.
pub fn capture_level() -> usize {
    CAPTURE_LEVEL.with(Cell::get)
}

/// A buffer that collects template output until it is finished or dropped.
///
/// The capture is tied to the thread that opened it.
///
/// ```rust
/// use std::fmt::Write;
/// use template_renderer::template::{capture_level, OutputCapture};
///
/// let mut capture = OutputCapture::begin();
/// assert_eq!(capture_level(), 1);
///
/// write!(capture, "Hello, {}!", "World").unwrap();
/// assert_eq!(capture.finish(), "Hello, World!");
/// assert_eq!(capture_level(), 0);
/// ```
pub struct OutputCapture {
    buffer: String,
    _not_send: PhantomData<*const ()>,
}

impl OutputCapture {
    /// Opens a new capture.
    pub fn begin() -> Self {
        CAPTURE_LEVEL.with(|level| level.set(level.get() + 1));
        Self {
            buffer: String::new(),
            _not_send: PhantomData,
        }
    }

    /// Appends text to the capture.
    pub fn push_str(&mut self, s: &str) {
        self.buffer.push_str(s);
    }

    /// Appends a single character to the capture.
    pub fn push(&mut self, c: char) {
        self.buffer.push(c);
    }

    /// Text captured so far.
    pub fn contents(&self) -> &str {
        &self.buffer
    }

    /// Closes the capture and returns everything written to it.
    pub fn finish(mut self) -> String {
        std::mem::take(&mut self.buffer)
    }
}

impl fmt::Write for OutputCapture {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_str(s);
        Ok(())
    }
}

impl Drop for OutputCapture {
    fn drop(&mut self) {
        CAPTURE_LEVEL.with(|level| level.set(level.get().saturating_sub(1)));
    }
}

impl fmt::Debug for OutputCapture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputCapture")
            .field("len", &self.buffer.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_tracks_open_captures() {
        assert_eq!(capture_level(), 0);
        let outer = OutputCapture::begin();
        {
            let _inner = OutputCapture::begin();
            assert_eq!(capture_level(), 2);
        }
        assert_eq!(capture_level(), 1);
        drop(outer);
        assert_eq!(capture_level(), 0);
    }

    #[test]
    fn finish_returns_buffer_and_releases() {
        let mut capture = OutputCapture::begin();
        capture.push_str("abc");
        capture.push('d');
        assert_eq!(capture.contents(), "abcd");
        assert_eq!(capture.finish(), "abcd");
        assert_eq!(capture_level(), 0);
    }

    #[test]
    fn released_on_early_return() {
        fn render(fail: bool) -> Result<String, ()> {
            let mut capture = OutputCapture::begin();
            capture.push_str("partial");
            if fail {
                return Err(());
            }
            Ok(capture.finish())
        }

        assert!(render(true).is_err());
        assert_eq!(capture_level(), 0);
        assert_eq!(render(false).unwrap(), "partial");
        assert_eq!(capture_level(), 0);
    }
}
