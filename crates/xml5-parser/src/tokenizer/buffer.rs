//! Transactional input buffer.
//!
//! The tokenizer reads through a [`Buffer`] one logical character at a time.
//! Reads move a `start` cursor; [`Buffer::commit`] moves the `committed` cursor
//! up to it once a tokenizer step has been fully applied, and
//! [`Buffer::undo`] moves `start` back when a step runs out of text. The
//! invariant `committed <= start <= data.len()` holds after every operation.
//!
//! Characters pushed back with [`Buffer::unget`] are re-read before the store.
//! When the pushed-back text is exactly what was just read from the store, the
//! cursor is rewound instead; otherwise the text goes into a queue. The queue
//! is part of the committed state, so an undo restores it too.

use std::collections::VecDeque;
use std::mem;

use crate::error::{Input, NeedMoreInput};

/// Substituted for U+0000 on input, which XML does not allow.
const REPLACEMENT_CHARACTER: char = '\u{FFFD}';

/// Accumulated input with a commit point and a pushback queue.
#[derive(Debug, Clone, Default)]
pub struct Buffer {
    /// Text appended so far, minus whatever compaction dropped.
    data: Vec<char>,
    /// Next character to read from `data`.
    start: usize,
    /// `start` as of the last commit.
    committed: usize,
    /// Pushed-back characters, read before `data`.
    queue: VecDeque<char>,
    /// `queue` as of the last commit.
    committed_queue: VecDeque<char>,
    /// Set once the caller signals there is no more input.
    eof: bool,
    /// The previous chunk ended with a carriage return.
    after_cr: bool,
    /// Logical characters handed out so far, pushback re-reads included.
    consumed: usize,
    /// `consumed` as of the last commit.
    committed_consumed: usize,
}

impl Buffer {
    /// Create an empty buffer that is still waiting for input.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk of input.
    ///
    /// Line endings are normalized to `\n` (a `\r\n` pair split across chunks
    /// still yields one `\n`) and U+0000 becomes U+FFFD.
    pub fn append(&mut self, chunk: &str) {
        self.data.reserve(chunk.len());
        for c in chunk.chars() {
            let after_cr = mem::replace(&mut self.after_cr, c == '\r');
            match c {
                '\r' => self.data.push('\n'),
                '\n' if after_cr => {}
                '\0' => self.data.push(REPLACEMENT_CHARACTER),
                c => self.data.push(c),
            }
        }
    }

    /// Signal end of input. Reads past the end now yield `None` instead of
    /// [`NeedMoreInput`].
    pub const fn set_eof(&mut self) {
        self.eof = true;
    }

    /// Whether end of input has been signaled.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        self.eof
    }

    /// Number of characters that can be read without more input.
    #[must_use]
    pub fn available(&self) -> usize {
        self.queue.len() + self.data.len() - self.start
    }

    /// Total logical characters read so far.
    ///
    /// Rolled back by [`Buffer::undo`] like the cursors are. Pushed-back text
    /// counts again when it is re-read.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.consumed
    }

    /// Consume one character.
    ///
    /// Returns `Ok(None)` once end of input has been signaled and everything
    /// has been read.
    ///
    /// # Errors
    ///
    /// [`NeedMoreInput`] when the buffer is drained but input may still come.
    pub fn char(&mut self) -> Input<Option<char>> {
        if let Some(c) = self.queue.pop_front() {
            self.consumed += 1;
            return Ok(Some(c));
        }
        if let Some(&c) = self.data.get(self.start) {
            self.start += 1;
            self.consumed += 1;
            return Ok(Some(c));
        }
        if self.eof { Ok(None) } else { Err(NeedMoreInput) }
    }

    /// Look at the next `n` characters without consuming them.
    ///
    /// After end of input this may return fewer than `n` characters.
    ///
    /// # Errors
    ///
    /// [`NeedMoreInput`] when fewer than `n` characters are buffered and input
    /// may still come.
    pub fn peek(&self, n: usize) -> Input<String> {
        if !self.eof && self.available() < n {
            return Err(NeedMoreInput);
        }
        Ok(self.upcoming().take(n).collect())
    }

    /// Consume the next `n` characters.
    ///
    /// # Errors
    ///
    /// [`NeedMoreInput`] under the same conditions as [`Buffer::peek`].
    pub fn shift(&mut self, n: usize) -> Input<String> {
        let text = self.peek(n)?;
        self.advance(text.chars().count());
        Ok(text)
    }

    /// Consume the longest run of characters satisfying `pred`.
    ///
    /// # Errors
    ///
    /// [`NeedMoreInput`] when the run reaches the end of the buffered text and
    /// input may still come, since the run could continue in the next chunk.
    pub fn match_while(&mut self, pred: impl Fn(char) -> bool) -> Input<String> {
        let run: String = self.upcoming().take_while(|&c| pred(c)).collect();
        let len = run.chars().count();
        if !self.eof && len == self.available() {
            return Err(NeedMoreInput);
        }
        self.advance(len);
        Ok(run)
    }

    /// Consume characters up to, but not including, the first one satisfying
    /// `pred`. After end of input, consumes everything that is left when no
    /// such character exists.
    ///
    /// # Errors
    ///
    /// [`NeedMoreInput`] when no terminator is buffered and input may still come.
    pub fn match_until(&mut self, pred: impl Fn(char) -> bool) -> Input<String> {
        self.match_while(|c| !pred(c))
    }

    /// Push `text` back so that it is read again next, in order.
    pub fn unget(&mut self, text: &str) {
        let chars: Vec<char> = text.chars().collect();
        let len = chars.len();
        if len == 0 {
            return;
        }
        let rewindable = self.queue.is_empty()
            && self.start >= self.committed + len
            && self.data[self.start - len..self.start] == chars[..];
        if rewindable {
            self.start -= len;
        } else {
            for &c in chars.iter().rev() {
                self.queue.push_front(c);
            }
        }
    }

    /// Push a single character back. See [`Buffer::unget`].
    pub fn unget_char(&mut self, c: char) {
        let mut tmp = [0; 4];
        self.unget(c.encode_utf8(&mut tmp));
    }

    /// Make everything read so far permanent.
    ///
    /// Once more than half of the store lies before the commit point, the
    /// store is compacted and the cursors rebased.
    pub fn commit(&mut self) {
        self.committed = self.start;
        self.committed_queue.clone_from(&self.queue);
        self.committed_consumed = self.consumed;
        if self.committed > self.data.len() / 2 {
            let _ = self.data.drain(..self.committed);
            self.start -= self.committed;
            self.committed = 0;
        }
    }

    /// Roll back every read and pushback since the last commit.
    pub fn undo(&mut self) {
        self.start = self.committed;
        self.queue.clone_from(&self.committed_queue);
        self.consumed = self.committed_consumed;
    }

    fn upcoming(&self) -> impl Iterator<Item = char> + '_ {
        self.queue
            .iter()
            .copied()
            .chain(self.data[self.start..].iter().copied())
    }

    fn advance(&mut self, mut count: usize) {
        self.consumed += count;
        while count > 0 && self.queue.pop_front().is_some() {
            count -= 1;
        }
        self.start = (self.start + count).min(self.data.len());
    }
}
