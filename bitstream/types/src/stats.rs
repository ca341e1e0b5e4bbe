/*!
    Session statistics.
*/

/**
    Counters collected over one feeding session.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeedStats {
    /// Bytes pulled from the source.
    pub bytes_read: u64,
    /// Bytes the parser reported as consumed.
    pub bytes_parsed: u64,
    /// Bytes left unconsumed when the source ended and the parser stalled.
    pub bytes_discarded: u64,
    /// Read calls issued against the source, including the final empty one.
    pub reads: u64,
    /// Recompactions that actually moved bytes.
    pub compactions: u64,
    /// Parse calls, including the flush call.
    pub parse_calls: u64,
    /// Chunks handed to the sink.
    pub chunks: u64,
    /// Whether the final flush call was issued.
    pub flushed: bool,
}

impl FeedStats {
    /**
        Returns true if every byte read was either parsed or discarded.
    */
    pub fn is_balanced(&self) -> bool {
        self.bytes_parsed + self.bytes_discarded == self.bytes_read
    }
}
