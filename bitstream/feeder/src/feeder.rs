/*!
    The refill, parse and flush loop.
*/

use std::io::Read;

use tracing::{debug, trace, warn};

use bitstream_types::{Cursor, Error, FeedStats, ParseError, Result};

use crate::buffer::WorkingBuffer;
use crate::config::FeederConfig;
use crate::parse::{ChunkParser, ChunkSink};

/**
    Drives a byte source through an incremental parser into a sink.

    The feeder exclusively owns its working buffer for one session.
    [`Feeder::run`] consumes the feeder, so the buffer is released on every
    exit path, successful or not.
*/
pub struct Feeder<R> {
    source: R,
    buffer: WorkingBuffer,
    threshold: usize,
    offset: u64,
    eof: bool,
    stats: FeedStats,
}

impl<R: Read> Feeder<R> {
    /**
        Open a feeder over `source` with a buffer of `buffer_capacity` bytes,
        `padding_size` of which are reserved as zeroed padding.

        Requires `buffer_capacity > padding_size > 0`. No I/O is performed.
    */
    pub fn open(source: R, buffer_capacity: usize, padding_size: usize) -> Result<Self> {
        let config = FeederConfig::from_capacity(buffer_capacity, padding_size)?;
        Self::with_config(source, config)
    }

    /**
        Open a feeder over `source` with the given configuration.
    */
    pub fn with_config(source: R, config: FeederConfig) -> Result<Self> {
        config.validate()?;

        let buffer = WorkingBuffer::new(config.capacity(), config.padding)?;
        let threshold = config.threshold();

        debug!(
            capacity = buffer.capacity(),
            padding = buffer.padding(),
            threshold,
            "opened feeder"
        );

        Ok(Self {
            source,
            buffer,
            threshold,
            offset: 0,
            eof: false,
            stats: FeedStats::default(),
        })
    }

    /**
        The working buffer.
    */
    pub fn buffer(&self) -> &WorkingBuffer {
        &self.buffer
    }

    /**
        Effective refill threshold, in bytes.
    */
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /**
        Feed the whole source through `parser` into `sink`.

        Returns the session statistics once the source is exhausted, the
        parser has received its flush call and the sink has been flushed.
        Any error stops the session immediately.
    */
    pub fn run<P, S>(mut self, parser: &mut P, sink: &mut S) -> Result<FeedStats>
    where
        P: ChunkParser + ?Sized,
        S: ChunkSink + ?Sized,
    {
        match self.feed(parser, sink) {
            Ok(()) => {
                debug!(
                    bytes_read = self.stats.bytes_read,
                    chunks = self.stats.chunks,
                    reads = self.stats.reads,
                    compactions = self.stats.compactions,
                    "feeding finished"
                );
                Ok(self.stats)
            }
            Err(e) => {
                debug!(offset = self.offset, error = %e, "feeding aborted");
                Err(e)
            }
        }
    }

    fn feed<P, S>(&mut self, parser: &mut P, sink: &mut S) -> Result<()>
    where
        P: ChunkParser + ?Sized,
        S: ChunkSink + ?Sized,
    {
        loop {
            if !self.eof {
                self.refill()?;
            }
            if self.eof && self.buffer.is_empty() {
                break;
            }

            let stalled = self.parse_pass(parser, sink)?;

            if self.eof && (stalled || self.buffer.is_empty()) {
                break;
            }
            if stalled && self.buffer.is_full() {
                return Err(Error::Stalled {
                    buffered: self.buffer.len(),
                });
            }
        }

        self.discard_remaining();
        self.flush(parser, sink)
    }

    /**
        Move the window to the front and top it up with a single read.
    */
    fn refill(&mut self) -> Result<()> {
        let moved = self.buffer.compact();
        if moved > 0 {
            self.stats.compactions += 1;
            trace!(moved, "recompacted window");
        }

        debug_assert!(self.buffer.spare() > 0, "refill with a full window");
        let n = self.buffer.fill_from(&mut self.source)?;
        self.stats.reads += 1;
        self.stats.bytes_read += n as u64;

        if n == 0 {
            self.eof = true;
            debug!(buffered = self.buffer.len(), "source exhausted");
        } else {
            trace!(read = n, buffered = self.buffer.len(), "refilled window");
        }
        Ok(())
    }

    /**
        Parse until the window is empty, falls below the refill threshold,
        or the parser asks for more data. Returns true in the last case.
    */
    fn parse_pass<P, S>(&mut self, parser: &mut P, sink: &mut S) -> Result<bool>
    where
        P: ChunkParser + ?Sized,
        S: ChunkSink + ?Sized,
    {
        loop {
            let len = self.buffer.len();
            if len == 0 || (!self.eof && len < self.threshold) {
                return Ok(false);
            }

            let offset = self.offset;
            let cursor = self.buffer.cursor(offset, self.eof);
            self.stats.parse_calls += 1;

            let parsed = parser
                .parse(cursor)
                .map_err(|source| Error::Parse { offset, source })?;
            let consumed = parsed.consumed;
            let stalled = parsed.is_stalled();

            if consumed > len {
                return Err(Error::Parse {
                    offset,
                    source: ParseError::new(format!(
                        "parser consumed {consumed} bytes of a {len} byte window"
                    )),
                });
            }

            trace!(
                offset,
                consumed,
                chunk = parsed.chunk.map(|c| c.len()),
                "parsed"
            );

            if let Some(chunk) = parsed.chunk {
                self.stats.chunks += 1;
                sink.consume(chunk)?;
            }

            self.buffer.advance(consumed);
            self.offset += consumed as u64;
            self.stats.bytes_parsed += consumed as u64;

            if stalled {
                return Ok(true);
            }
        }
    }

    fn discard_remaining(&mut self) {
        let remaining = self.buffer.len();
        if remaining == 0 {
            return;
        }

        warn!(
            bytes = remaining,
            offset = self.offset,
            "discarding bytes the parser left unconsumed at end of stream"
        );
        self.stats.bytes_discarded += remaining as u64;
        self.offset += remaining as u64;
        self.buffer.clear();
    }

    /**
        Issue the final parser call and flush the sink.
    */
    fn flush<P, S>(&mut self, parser: &mut P, sink: &mut S) -> Result<()>
    where
        P: ChunkParser + ?Sized,
        S: ChunkSink + ?Sized,
    {
        let offset = self.offset;
        self.stats.parse_calls += 1;
        self.stats.flushed = true;

        let parsed = parser
            .parse(Cursor::flush(offset))
            .map_err(|source| Error::Parse { offset, source })?;

        if parsed.consumed > 0 {
            return Err(Error::Parse {
                offset,
                source: ParseError::new(format!(
                    "parser consumed {} bytes of the empty flush input",
                    parsed.consumed
                )),
            });
        }

        if let Some(chunk) = parsed.chunk {
            self.stats.chunks += 1;
            sink.consume(chunk)?;
        }
        sink.flush()?;

        debug!(offset, "flushed parser and sink");
        Ok(())
    }
}

impl<R> std::fmt::Debug for Feeder<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Feeder")
            .field("buffer", &self.buffer)
            .field("threshold", &self.threshold)
            .field("offset", &self.offset)
            .field("eof", &self.eof)
            .finish_non_exhaustive()
    }
}

// Ensure a feeder can move to a worker thread with its source
static_assertions::assert_impl_all!(Feeder<std::fs::File>: Send);

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::io;
    use std::rc::Rc;

    use bitstream_types::{Chunk, ConsumeError, Parsed};

    use super::*;

    type ParseResult<'a> = std::result::Result<Parsed<'a>, ParseError>;

    /// Consumes `step` bytes per call and emits them as a chunk.
    struct Steps {
        step: usize,
        chunks_at_flush: Option<usize>,
        emitted: usize,
        flushes: usize,
    }

    impl Steps {
        fn new(step: usize) -> Self {
            Self {
                step,
                chunks_at_flush: None,
                emitted: 0,
                flushes: 0,
            }
        }
    }

    impl ChunkParser for Steps {
        fn parse<'a>(&'a mut self, cursor: Cursor<'a>) -> ParseResult<'a> {
            if cursor.is_flush() {
                self.flushes += 1;
                self.chunks_at_flush = Some(self.emitted);
                return Ok(Parsed::need_more());
            }
            let take = if cursor.is_eof() {
                self.step.min(cursor.len())
            } else if cursor.len() >= self.step {
                self.step
            } else {
                return Ok(Parsed::need_more());
            };
            self.emitted += 1;
            Ok(Parsed::chunk(take, Chunk::new(&cursor.bytes()[..take])))
        }
    }

    /// Never consumes anything.
    struct Starved {
        calls: usize,
        flushes: usize,
    }

    impl ChunkParser for Starved {
        fn parse<'a>(&'a mut self, cursor: Cursor<'a>) -> ParseResult<'a> {
            self.calls += 1;
            if cursor.is_flush() {
                self.flushes += 1;
            }
            Ok(Parsed::need_more())
        }
    }

    /// Emits each 2-byte unit twice, the second time from its own copy
    /// without consuming input.
    #[derive(Default)]
    struct Replay {
        held: Vec<u8>,
        pending: bool,
    }

    impl ChunkParser for Replay {
        fn parse<'a>(&'a mut self, cursor: Cursor<'a>) -> ParseResult<'a> {
            if self.pending {
                self.pending = false;
                return Ok(Parsed::chunk(0, Chunk::new(&self.held)));
            }
            if cursor.is_flush() || cursor.len() < 2 {
                return Ok(Parsed::need_more());
            }
            self.held = cursor.bytes()[..2].to_vec();
            self.pending = true;
            Ok(Parsed::chunk(2, Chunk::new(&cursor.bytes()[..2])))
        }
    }

    /// Fails once it reaches the given stream offset.
    struct FailAt(u64);

    impl ChunkParser for FailAt {
        fn parse<'a>(&'a mut self, cursor: Cursor<'a>) -> ParseResult<'a> {
            if cursor.is_flush() {
                return Ok(Parsed::need_more());
            }
            if cursor.stream_offset() >= self.0 {
                return Err(ParseError::new("corrupt unit"));
            }
            Ok(Parsed::chunk(1, Chunk::new(&cursor.bytes()[..1])))
        }
    }

    /// Yields at most `step` bytes per read.
    struct Trickle<'a> {
        data: &'a [u8],
        step: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.step.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    /// Records when the feeder drops its source.
    struct Tracked<R> {
        inner: R,
        dropped: Rc<Cell<bool>>,
    }

    impl<R> Tracked<R> {
        fn new(inner: R) -> (Self, Rc<Cell<bool>>) {
            let dropped = Rc::new(Cell::new(false));
            let source = Self {
                inner,
                dropped: Rc::clone(&dropped),
            };
            (source, dropped)
        }
    }

    impl<R: Read> Read for Tracked<R> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.inner.read(buf)
        }
    }

    impl<R> Drop for Tracked<R> {
        fn drop(&mut self) {
            self.dropped.set(true);
        }
    }

    /// Yields its data, then fails.
    struct Broken<'a>(&'a [u8]);

    impl Read for Broken<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.0.is_empty() {
                return Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
            }
            let n = buf.len().min(self.0.len());
            buf[..n].copy_from_slice(&self.0[..n]);
            self.0 = &self.0[n..];
            Ok(n)
        }
    }

    #[derive(Default)]
    struct Collect {
        chunks: Vec<Vec<u8>>,
        flushes: usize,
    }

    impl ChunkSink for Collect {
        fn consume(&mut self, chunk: Chunk<'_>) -> std::result::Result<(), ConsumeError> {
            self.chunks.push(chunk.to_vec());
            Ok(())
        }

        fn flush(&mut self) -> std::result::Result<(), ConsumeError> {
            self.flushes += 1;
            Ok(())
        }
    }

    static EIGHT: [u8; 8] = [1, 2, 3, 4, 5, 6, 7, 8];

    #[test]
    fn open_validates_sizes() {
        assert!(Feeder::open(&EIGHT[..], 4, 0).is_err());
        assert!(Feeder::open(&EIGHT[..], 2, 2).is_err());

        let feeder = Feeder::open(&EIGHT[..], 6, 2).unwrap();
        assert_eq!(feeder.buffer().capacity(), 6);
        assert_eq!(feeder.buffer().data_capacity(), 4);
        assert!(feeder.buffer().is_empty());
    }

    #[test]
    fn pairs_in_order_then_flush() {
        let feeder = Feeder::open(&EIGHT[..], 6, 2).unwrap();
        let mut parser = Steps::new(2);
        let mut sink = Collect::default();

        let stats = feeder.run(&mut parser, &mut sink).unwrap();

        assert_eq!(
            sink.chunks,
            vec![vec![1, 2], vec![3, 4], vec![5, 6], vec![7, 8]]
        );
        assert_eq!(parser.flushes, 1);
        assert_eq!(parser.chunks_at_flush, Some(4));
        assert_eq!(sink.flushes, 1);
        assert_eq!(stats.chunks, 4);
        assert_eq!(stats.bytes_read, 8);
        assert_eq!(stats.bytes_parsed, 8);
        assert!(stats.flushed);
        assert!(stats.is_balanced());
    }

    #[test]
    fn pairs_with_two_byte_region() {
        let feeder = Feeder::open(&EIGHT[..], 4, 2).unwrap();
        let mut parser = Steps::new(2);
        let mut sink = Collect::default();

        feeder.run(&mut parser, &mut sink).unwrap();

        assert_eq!(
            sink.chunks,
            vec![vec![1, 2], vec![3, 4], vec![5, 6], vec![7, 8]]
        );
        assert_eq!(parser.flushes, 1);
    }

    #[test]
    fn starved_parser_ends_at_eof_and_still_flushes() {
        let data = [1u8, 2, 3];
        let feeder = Feeder::open(&data[..], 16, 4).unwrap();
        let mut parser = Starved {
            calls: 0,
            flushes: 0,
        };
        let mut sink = Collect::default();

        let stats = feeder.run(&mut parser, &mut sink).unwrap();

        assert!(sink.chunks.is_empty());
        assert_eq!(parser.flushes, 1);
        assert_eq!(sink.flushes, 1);
        assert_eq!(stats.chunks, 0);
        assert_eq!(stats.bytes_discarded, 3);
        assert!(stats.is_balanced());
    }

    #[test]
    fn empty_source_flushes_once() {
        let feeder = Feeder::open(io::empty(), 16, 4).unwrap();
        let mut parser = Starved {
            calls: 0,
            flushes: 0,
        };
        let mut sink = Collect::default();

        let stats = feeder.run(&mut parser, &mut sink).unwrap();

        assert_eq!(parser.calls, 1);
        assert_eq!(parser.flushes, 1);
        assert_eq!(sink.flushes, 1);
        assert_eq!(stats.reads, 1);
        assert_eq!(stats.parse_calls, 1);
    }

    #[test]
    fn parse_error_stops_before_sink() {
        let data: Vec<u8> = (0..32).collect();
        let feeder = Feeder::open(&data[..], 12, 2).unwrap();
        let mut parser = FailAt(5);
        let mut sink = Collect::default();

        let err = feeder.run(&mut parser, &mut sink).unwrap_err();

        assert!(matches!(err, Error::Parse { offset: 5, .. }));
        assert_eq!(sink.chunks, vec![vec![0], vec![1], vec![2], vec![3], vec![4]]);
        assert_eq!(sink.flushes, 0);
    }

    #[test]
    fn consumer_error_propagates() {
        let feeder = Feeder::open(&EIGHT[..], 6, 2).unwrap();
        let mut parser = Steps::new(2);
        let mut seen = 0;

        let err = feeder
            .run(&mut parser, &mut |_chunk: Chunk<'_>| {
                seen += 1;
                if seen == 2 {
                    return Err(ConsumeError::new("decoder rejected packet"));
                }
                Ok(())
            })
            .unwrap_err();

        assert!(err.is_consumer());
        assert_eq!(seen, 2);
        assert_eq!(parser.flushes, 0);
    }

    #[test]
    fn parse_error_releases_session() {
        let data: Vec<u8> = (0..32).collect();
        let (source, dropped) = Tracked::new(&data[..]);
        let feeder = Feeder::open(source, 12, 2).unwrap();
        let mut parser = FailAt(5);
        let mut sink = Collect::default();

        assert!(!dropped.get());
        let err = feeder.run(&mut parser, &mut sink).unwrap_err();

        assert!(err.is_parse());
        assert!(dropped.get());
    }

    #[test]
    fn consumer_error_releases_session() {
        let (source, dropped) = Tracked::new(&EIGHT[..]);
        let feeder = Feeder::open(source, 6, 2).unwrap();
        let mut parser = Steps::new(2);

        let err = feeder
            .run(
                &mut parser,
                &mut |_chunk: Chunk<'_>| -> std::result::Result<(), ConsumeError> {
                    Err(ConsumeError::new("decoder rejected packet"))
                },
            )
            .unwrap_err();

        assert!(err.is_consumer());
        assert!(dropped.get());
    }

    #[test]
    fn source_error_is_not_eof() {
        let feeder = Feeder::open(Broken(&EIGHT[..4]), 6, 2).unwrap();
        let mut parser = Steps::new(2);
        let mut sink = Collect::default();

        let err = feeder.run(&mut parser, &mut sink).unwrap_err();

        match err {
            Error::SourceRead(e) => assert_eq!(e.kind(), io::ErrorKind::ConnectionReset),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(sink.chunks, vec![vec![1, 2], vec![3, 4]]);
        assert_eq!(parser.flushes, 0);
    }

    #[test]
    fn oversized_unit_stalls() {
        let data = [0u8; 10];
        let feeder = Feeder::open(&data[..], 6, 2).unwrap();
        let mut parser = Steps::new(8);
        let mut sink = Collect::default();

        let err = feeder.run(&mut parser, &mut sink).unwrap_err();
        assert!(matches!(err, Error::Stalled { buffered: 4 }));
    }

    #[test]
    fn overrunning_parser_is_rejected() {
        struct Greedy;

        impl ChunkParser for Greedy {
            fn parse<'a>(&'a mut self, cursor: Cursor<'a>) -> ParseResult<'a> {
                Ok(Parsed::skip(cursor.len() + 1))
            }
        }

        let feeder = Feeder::open(&EIGHT[..], 6, 2).unwrap();
        let mut sink = Collect::default();
        let err = feeder.run(&mut Greedy, &mut sink).unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn chunks_without_consumption_keep_parsing() {
        let data = [1u8, 2, 3, 4];
        let feeder = Feeder::open(&data[..], 10, 2).unwrap();
        let mut parser = Replay::default();
        let mut sink = Collect::default();

        let stats = feeder.run(&mut parser, &mut sink).unwrap();

        assert_eq!(
            sink.chunks,
            vec![vec![1, 2], vec![1, 2], vec![3, 4], vec![3, 4]]
        );
        assert_eq!(stats.bytes_parsed, 4);
    }

    #[test]
    fn trickling_source_delivers_every_byte() {
        let data: Vec<u8> = (0..=255).collect();
        let source = Trickle {
            data: &data,
            step: 3,
        };
        let feeder = Feeder::with_config(
            source,
            FeederConfig::new().with_buffer_size(16).with_padding(4),
        )
        .unwrap();
        let mut parser = Steps::new(5);
        let mut sink = Collect::default();

        let stats = feeder.run(&mut parser, &mut sink).unwrap();

        let joined: Vec<u8> = sink.chunks.concat();
        assert_eq!(joined, data);
        assert!(sink.chunks[..sink.chunks.len() - 1].iter().all(|c| c.len() == 5));
        assert_eq!(stats.bytes_read, 256);
        assert!(stats.is_balanced());
    }

    #[test]
    fn threshold_controls_refills() {
        let data = [7u8; 40];

        let eager = Feeder::with_config(
            &data[..],
            FeederConfig::new()
                .with_buffer_size(10)
                .with_padding(2)
                .with_refill_threshold(10),
        )
        .unwrap();
        let lazy = Feeder::with_config(
            &data[..],
            FeederConfig::new()
                .with_buffer_size(10)
                .with_padding(2)
                .with_refill_threshold(0),
        )
        .unwrap();

        let eager = eager
            .run(&mut Steps::new(1), &mut Collect::default())
            .unwrap();
        let lazy = lazy.run(&mut Steps::new(1), &mut Collect::default()).unwrap();

        assert_eq!(eager.chunks, 40);
        assert_eq!(lazy.chunks, 40);
        assert!(eager.reads > lazy.reads);
        assert!(eager.compactions > 0);
        assert_eq!(lazy.compactions, 0);
    }

    #[test]
    fn parser_sees_offsets_and_zero_padding() {
        struct Inspect {
            offsets: Vec<u64>,
        }

        impl ChunkParser for Inspect {
            fn parse<'a>(&'a mut self, cursor: Cursor<'a>) -> ParseResult<'a> {
                if cursor.is_flush() {
                    return Ok(Parsed::need_more());
                }
                let padding = &cursor.padded()[cursor.len()..];
                assert_eq!(padding.len(), 3);
                assert!(padding.iter().all(|&b| b == 0));
                self.offsets.push(cursor.stream_offset());
                Ok(Parsed::skip(cursor.len().min(3)))
            }
        }

        let data = [0xffu8; 10];
        let feeder = Feeder::open(&data[..], 7, 3).unwrap();
        let mut parser = Inspect {
            offsets: Vec::new(),
        };
        feeder.run(&mut parser, &mut Collect::default()).unwrap();

        assert_eq!(parser.offsets, vec![0, 3, 4, 7, 8]);
    }
}
