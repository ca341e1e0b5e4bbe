/*!
    Shared types for the bitstream feeder crates.

    This crate defines the vocabulary that crosses crate boundaries: what a
    parser sees, what it hands back, and what a sink receives. It performs no
    I/O and owns no buffers, so parsers and sinks can depend on it without
    pulling in the feeder itself.

    # Parsing

    - [`Cursor`] - Borrowed view over the unconsumed bytes of the working buffer
    - [`Parsed`] - Result of a single parse call (bytes consumed, optional chunk)
    - [`Chunk`] - One parser-recognized unit, borrowed until the next buffer mutation

    # Statistics

    - [`FeedStats`] - Counters collected over one feeding session

    # Error Handling

    - [`Error`] and [`Result`] - Errors surfaced by a feeding session
    - [`ParseError`] - Failure reported by a parser
    - [`ConsumeError`] - Failure reported by a downstream sink
*/

mod chunk;
mod cursor;
mod error;
mod stats;

pub use chunk::{Chunk, Parsed};
pub use cursor::Cursor;
pub use error::{ConsumeError, Error, ParseError, Result};
pub use stats::FeedStats;
