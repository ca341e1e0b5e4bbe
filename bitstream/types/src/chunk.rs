/*!
    Parser output types.
*/

use std::ops::Deref;

/**
    One parser-recognized unit of input, such as a compressed frame.

    A chunk borrows its bytes either from the feeder's working buffer or
    from the parser's own state, so it is only valid until the next buffer
    mutation. Sinks that need to keep the data must copy it.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Chunk<'a> {
    data: &'a [u8],
}

impl<'a> Chunk<'a> {
    /**
        Create a chunk over the given bytes.
    */
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /**
        The chunk payload.
    */
    pub const fn data(&self) -> &'a [u8] {
        self.data
    }

    pub const fn len(&self) -> usize {
        self.data.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /**
        Copy the payload out of the borrowed buffer.
    */
    pub fn to_vec(&self) -> Vec<u8> {
        self.data.to_vec()
    }
}

impl Deref for Chunk<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.data
    }
}

impl AsRef<[u8]> for Chunk<'_> {
    fn as_ref(&self) -> &[u8] {
        self.data
    }
}

/**
    Outcome of a single parse call.

    `consumed` is how far the feeder advances its window. A parser may
    consume bytes without producing a chunk (it is buffering internally),
    produce a chunk without consuming anything (it is draining a unit it
    already holds), or do neither, which means it needs more input.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Parsed<'a> {
    pub consumed: usize,
    pub chunk: Option<Chunk<'a>>,
}

impl<'a> Parsed<'a> {
    /**
        The parser needs more data before it can make progress.
    */
    pub const fn need_more() -> Self {
        Self {
            consumed: 0,
            chunk: None,
        }
    }

    /**
        The parser took `consumed` bytes without completing a unit.
    */
    pub const fn skip(consumed: usize) -> Self {
        Self {
            consumed,
            chunk: None,
        }
    }

    /**
        The parser took `consumed` bytes and completed `chunk`.
    */
    pub const fn chunk(consumed: usize, chunk: Chunk<'a>) -> Self {
        Self {
            consumed,
            chunk: Some(chunk),
        }
    }

    /**
        Returns true if the call neither consumed input nor produced a chunk.
    */
    pub const fn is_stalled(&self) -> bool {
        self.consumed == 0 && self.chunk.is_none()
    }
}
