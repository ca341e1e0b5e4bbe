/*!
    Parser and sink seams.
*/

use bitstream_types::{Chunk, ConsumeError, Cursor, ParseError, Parsed};

/**
    An incremental parser that turns a byte window into chunks.

    The feeder calls [`ChunkParser::parse`] repeatedly with the unconsumed
    window. The returned [`Parsed`] says how many bytes to drop from the
    front of the window and optionally carries one completed chunk. The
    chunk may borrow from the cursor or from the parser itself.

    After the source is exhausted the parser receives exactly one flush
    cursor ([`Cursor::is_flush`]) so it can hand out anything it still holds.
*/
pub trait ChunkParser {
    fn parse<'a>(&'a mut self, cursor: Cursor<'a>) -> Result<Parsed<'a>, ParseError>;
}

impl<P: ChunkParser + ?Sized> ChunkParser for &mut P {
    fn parse<'a>(&'a mut self, cursor: Cursor<'a>) -> Result<Parsed<'a>, ParseError> {
        (**self).parse(cursor)
    }
}

impl<P: ChunkParser + ?Sized> ChunkParser for Box<P> {
    fn parse<'a>(&'a mut self, cursor: Cursor<'a>) -> Result<Parsed<'a>, ParseError> {
        (**self).parse(cursor)
    }
}

/**
    Downstream consumer of parsed chunks.

    Any `FnMut(Chunk<'_>) -> Result<(), ConsumeError>` closure is a sink
    whose flush does nothing.
*/
pub trait ChunkSink {
    /**
        Take one chunk. The chunk is only valid for the duration of the call.
    */
    fn consume(&mut self, chunk: Chunk<'_>) -> Result<(), ConsumeError>;

    /**
        Called once after the last chunk of a session.
    */
    fn flush(&mut self) -> Result<(), ConsumeError> {
        Ok(())
    }
}

impl<F> ChunkSink for F
where
    F: FnMut(Chunk<'_>) -> Result<(), ConsumeError>,
{
    fn consume(&mut self, chunk: Chunk<'_>) -> Result<(), ConsumeError> {
        self(chunk)
    }
}
