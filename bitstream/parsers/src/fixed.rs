use bitstream_feeder::ChunkParser;
use bitstream_types::{Chunk, Cursor, Error, ParseError, Parsed};

/**
    Splits input into chunks of exactly `size` bytes.

    Chunks borrow from the cursor, so a whole chunk must fit in the
    feeder's data region. The final chunk of a stream may be shorter.
*/
#[derive(Clone, Debug)]
pub struct FixedSizeParser {
    size: usize,
}

impl FixedSizeParser {
    /**
        Create a parser emitting `size`-byte chunks. `size` must be non-zero.
    */
    pub fn new(size: usize) -> crate::Result<Self> {
        if size == 0 {
            return Err(Error::invalid_config("chunk size must be non-zero"));
        }
        Ok(Self { size })
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

impl ChunkParser for FixedSizeParser {
    fn parse<'a>(&'a mut self, cursor: Cursor<'a>) -> Result<Parsed<'a>, ParseError> {
        let bytes = cursor.bytes();

        let take = if bytes.len() >= self.size {
            self.size
        } else if cursor.is_eof() && !bytes.is_empty() {
            bytes.len()
        } else {
            return Ok(Parsed::need_more());
        };

        Ok(Parsed::chunk(take, Chunk::new(&bytes[..take])))
    }
}
