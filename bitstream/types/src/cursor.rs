use core::fmt;

/**
    A borrowed view over the unconsumed bytes of a working buffer.

    The cursor is what a parser sees on each call. [`Cursor::bytes`] is
    the window of unconsumed input; [`Cursor::padded`] extends it with the
    zeroed padding reserve so that a parser with bounded lookahead can read
    past the end of the window without going out of bounds.

    The final call of a session receives a flush cursor: empty, marked as
    end of stream, with [`Cursor::is_flush`] set.
*/
#[derive(Clone, Copy)]
pub struct Cursor<'a> {
    padded: &'a [u8],
    len: usize,
    offset: u64,
    eof: bool,
    flush: bool,
}

impl<'a> Cursor<'a> {
    /**
        Create a cursor over `data`, with no padding.

        `offset` is the absolute stream position of the first byte.
    */
    pub const fn new(data: &'a [u8], offset: u64) -> Self {
        Self {
            padded: data,
            len: data.len(),
            offset,
            eof: false,
            flush: false,
        }
    }

    /**
        Create a cursor whose first `len` bytes are input and whose
        remaining bytes are padding.

        # Panics

        Panics if `len` exceeds `padded.len()`.
    */
    pub fn with_padding(padded: &'a [u8], len: usize, offset: u64) -> Self {
        assert!(len <= padded.len(), "cursor window exceeds its backing slice");
        Self {
            padded,
            len,
            offset,
            eof: false,
            flush: false,
        }
    }

    /**
        The empty end-of-stream cursor used for the final flush call.
    */
    pub const fn flush(offset: u64) -> Self {
        Self {
            padded: &[],
            len: 0,
            offset,
            eof: true,
            flush: true,
        }
    }

    /**
        Mark these as the last bytes the source will ever produce.
    */
    pub const fn at_eof(mut self, eof: bool) -> Self {
        self.eof = eof;
        self
    }

    /**
        The unconsumed input bytes.
    */
    pub fn bytes(&self) -> &'a [u8] {
        &self.padded[..self.len]
    }

    /**
        The unconsumed input bytes followed by the padding reserve.
    */
    pub const fn padded(&self) -> &'a [u8] {
        self.padded
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /**
        Absolute position of the first unconsumed byte in the source.
    */
    pub const fn stream_offset(&self) -> u64 {
        self.offset
    }

    /**
        Returns true if the source is exhausted and no bytes will follow
        the ones in this cursor.
    */
    pub const fn is_eof(&self) -> bool {
        self.eof
    }

    /**
        Returns true for the final call of a session, which carries no input.
    */
    pub const fn is_flush(&self) -> bool {
        self.flush
    }
}

impl fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("len", &self.len)
            .field("padding", &(self.padded.len() - self.len))
            .field("offset", &self.offset)
            .field("eof", &self.eof)
            .field("flush", &self.flush)
            .finish()
    }
}
