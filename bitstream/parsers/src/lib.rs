/*!
    Reference incremental parsers for the bitstream feeder.

    - [`FixedSizeParser`] - Splits input into equal-sized chunks borrowed
      straight from the feeder's working buffer
    - [`StartCodeParser`] - Splits Annex B elementary streams (H.264, H.265,
      MPEG video) at start codes, accumulating each unit internally

    The two cover the shapes real codec parsers take: zero-copy parsers
    that need a whole unit inside the window, and accumulating parsers that
    consume everything they are given and hand out units from their own
    storage, including one last unit on the flush call.
*/

pub use bitstream_feeder::ChunkParser;
pub use bitstream_types::{Chunk, Cursor, Error, ParseError, Parsed, Result};

mod fixed;
mod start_code;

pub use fixed::FixedSizeParser;
pub use start_code::{StartCodeParser, find_start_code};
