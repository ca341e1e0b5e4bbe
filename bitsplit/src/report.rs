use std::fmt;

use serde::Serialize;

use bitstream_feeder::FeedStats;

/**
    Summary of one split, printed as text or JSON.
*/
#[derive(Debug, Serialize)]
pub struct Report {
    pub input: String,
    pub parser: &'static str,
    pub chunks: u64,
    pub chunk_bytes: u64,
    pub largest_chunk: usize,
    pub bytes_read: u64,
    pub bytes_parsed: u64,
    pub bytes_discarded: u64,
    pub reads: u64,
    pub compactions: u64,
    pub parse_calls: u64,
}

impl Report {
    pub fn new(input: String, parser: &'static str, stats: &FeedStats) -> Self {
        Self {
            input,
            parser,
            chunks: stats.chunks,
            chunk_bytes: 0,
            largest_chunk: 0,
            bytes_read: stats.bytes_read,
            bytes_parsed: stats.bytes_parsed,
            bytes_discarded: stats.bytes_discarded,
            reads: stats.reads,
            compactions: stats.compactions,
            parse_calls: stats.parse_calls,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({})", self.input, self.parser)?;
        writeln!(
            f,
            "  chunks:      {} ({} bytes, largest {})",
            self.chunks, self.chunk_bytes, self.largest_chunk
        )?;
        writeln!(
            f,
            "  read:        {} bytes in {} reads",
            self.bytes_read, self.reads
        )?;
        writeln!(
            f,
            "  parsed:      {} bytes in {} calls",
            self.bytes_parsed, self.parse_calls
        )?;
        writeln!(f, "  discarded:   {} bytes", self.bytes_discarded)?;
        write!(f, "  compactions: {}", self.compactions)
    }
}
