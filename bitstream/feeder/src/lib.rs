/*!
    Incremental refill, parse and flush loop for elementary bitstreams.

    A [`Feeder`] owns a fixed-capacity working buffer. It refills the
    buffer from any [`std::io::Read`] source, hands the unconsumed window
    to a [`ChunkParser`], passes every chunk the parser recognizes to a
    [`ChunkSink`], and slides the unconsumed tail back to the front of the
    buffer before the next refill. When the source is exhausted the parser
    receives one final flush call and the sink is flushed.

    # Example

    ```ignore
    use bitstream_feeder::{Chunk, Feeder, FeederConfig};
    use bitstream_parsers::StartCodeParser;

    let file = std::fs::File::open("video.h264")?;
    let feeder = Feeder::with_config(file, FeederConfig::video())?;

    let mut parser = StartCodeParser::new();
    let mut units = 0;
    let stats = feeder.run(&mut parser, &mut |chunk: Chunk<'_>| {
        units += 1;
        Ok(())
    })?;
    ```

    # Decoders

    Decoders that follow the send / receive pattern, where one submitted
    chunk yields zero or more frames, plug in through [`Decode`] and
    [`DecodeSink`]:

    ```ignore
    let mut sink = DecodeSink::new(decoder, |frame| {
        // Process frame
        Ok(())
    });
    feeder.run(&mut parser, &mut sink)?;
    ```

    # Buffer Sizing

    The working buffer is `buffer_size + padding` bytes. Only `buffer_size`
    bytes ever hold input; the padding stays zeroed so parsers with bounded
    lookahead never read stale data. The window is recompacted and topped
    up whenever fewer than `refill_threshold` bytes remain.
*/

pub use bitstream_types::{
    Chunk, ConsumeError, Cursor, Error, FeedStats, ParseError, Parsed, Result,
};

mod buffer;
mod config;
mod decode;
mod feeder;
mod parse;

pub use buffer::WorkingBuffer;
pub use config::{DEFAULT_BUFFER_SIZE, DEFAULT_PADDING, FeederConfig};
pub use decode::{Decode, DecodeSink, Received};
pub use feeder::Feeder;
pub use parse::{ChunkParser, ChunkSink};
