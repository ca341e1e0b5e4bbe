/*!
    Fixed-capacity working buffer with a sliding input window.
*/

use std::io::{self, Read};

use bitstream_types::{Cursor, Error, Result};

/**
    A fixed-capacity byte arena holding the unconsumed input window.

    The arena is `capacity` bytes long. The first `capacity - padding`
    bytes form the data region; input is only ever written there. The
    window `start..start + len` holds bytes not yet consumed by the parser,
    and the `padding` bytes that follow the window are kept zeroed.

    Invariant: `start + len <= capacity - padding`.
*/
pub struct WorkingBuffer {
    data: Box<[u8]>,
    padding: usize,
    start: usize,
    len: usize,
}

impl WorkingBuffer {
    /**
        Allocate a zeroed buffer of `capacity` bytes with `padding` bytes reserved.

        Requires `capacity > padding > 0`. Returns [`Error::Allocation`] if
        the memory cannot be reserved.
    */
    pub fn new(capacity: usize, padding: usize) -> Result<Self> {
        if padding == 0 || capacity <= padding {
            return Err(Error::invalid_config(format!(
                "buffer needs capacity > padding > 0, got capacity {capacity} and padding {padding}"
            )));
        }

        let mut data = Vec::new();
        data.try_reserve_exact(capacity)
            .map_err(|source| Error::Allocation { capacity, source })?;
        data.resize(capacity, 0);

        Ok(Self {
            data: data.into_boxed_slice(),
            padding,
            start: 0,
            len: 0,
        })
    }

    /**
        Total size of the arena, padding included.
    */
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn padding(&self) -> usize {
        self.padding
    }

    /**
        Size of the region that may hold input bytes.
    */
    pub fn data_capacity(&self) -> usize {
        self.data.len() - self.padding
    }

    /**
        Offset of the first unconsumed byte.
    */
    pub fn start(&self) -> usize {
        self.start
    }

    /**
        Number of unconsumed bytes.
    */
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /**
        Returns true if the window fills the whole data region.
    */
    pub fn is_full(&self) -> bool {
        self.len == self.data_capacity()
    }

    /**
        Bytes that can be appended without recompacting first.
    */
    pub fn spare(&self) -> usize {
        self.data_capacity() - self.end()
    }

    /**
        The unconsumed window.
    */
    pub fn data(&self) -> &[u8] {
        &self.data[self.start..self.end()]
    }

    /**
        The unconsumed window followed by the zeroed padding.
    */
    pub fn padded(&self) -> &[u8] {
        &self.data[self.start..self.end() + self.padding]
    }

    /**
        A parser cursor over the window.
    */
    pub fn cursor(&self, stream_offset: u64, eof: bool) -> Cursor<'_> {
        Cursor::with_padding(self.padded(), self.len, stream_offset).at_eof(eof)
    }

    /**
        Mark `n` bytes at the front of the window as consumed.

        # Panics

        Panics if `n` exceeds the window length.
    */
    pub fn advance(&mut self, n: usize) {
        assert!(
            n <= self.len,
            "advance of {n} bytes past a window of {} bytes",
            self.len
        );
        self.start += n;
        self.len -= n;
        if self.len == 0 {
            self.start = 0;
        }
    }

    /**
        Move the window to the front of the buffer.

        The window is preserved byte for byte; the copy is overlap-safe.
        Returns the number of bytes moved.
    */
    pub fn compact(&mut self) -> usize {
        if self.start == 0 {
            return 0;
        }

        let end = self.end();
        self.data.copy_within(self.start..end, 0);
        self.start = 0;
        self.zero_padding();
        self.len
    }

    /**
        Issue a single read into the spare space after the window.

        Interrupted reads are retried. Returns the number of bytes appended,
        which is zero at end of stream or when there is no spare space.
    */
    pub fn fill_from<R: Read + ?Sized>(&mut self, source: &mut R) -> io::Result<usize> {
        let end = self.end();
        let limit = self.data_capacity();
        if end == limit {
            return Ok(0);
        }

        let n = loop {
            match source.read(&mut self.data[end..limit]) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        };
        if n > limit - end {
            return Err(io::Error::other(format!(
                "reader reported {n} bytes for a {} byte read",
                limit - end
            )));
        }

        self.len += n;
        self.zero_padding();
        Ok(n)
    }

    /**
        Drop the window without consuming it.
    */
    pub fn clear(&mut self) {
        self.start = 0;
        self.len = 0;
        self.zero_padding();
    }

    fn end(&self) -> usize {
        self.start + self.len
    }

    fn zero_padding(&mut self) {
        let end = self.end();
        self.data[end..end + self.padding].fill(0);
    }
}

impl std::fmt::Debug for WorkingBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkingBuffer")
            .field("capacity", &self.capacity())
            .field("padding", &self.padding)
            .field("start", &self.start)
            .field("len", &self.len)
            .finish()
    }
}
