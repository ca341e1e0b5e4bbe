/*!
    Annex B start code splitter.

    Annex B streams delimit units with start codes (`0x00 0x00 0x01` or
    `0x00 0x00 0x00 0x01`). A unit runs from its start code up to the next
    one, so a unit is only known to be complete once the following start
    code has been seen, or the stream ends.
*/

use std::mem;

use tracing::trace;

use bitstream_feeder::ChunkParser;
use bitstream_types::{Chunk, Cursor, ParseError, Parsed};

/**
    Find the next start code in `data` at or after `from`.

    Returns the position and length of the start code. 4-byte start codes
    are checked first so that `0x00 0x00 0x01` is not matched inside a
    `0x00 0x00 0x00 0x01` sequence.
*/
pub fn find_start_code(data: &[u8], from: usize) -> Option<(usize, usize)> {
    if data.len() < 3 || from >= data.len() {
        return None;
    }

    let mut i = from;
    while i + 3 <= data.len() {
        if i + 4 <= data.len() && data[i..i + 4] == [0, 0, 0, 1] {
            return Some((i, 4));
        }
        if data[i..i + 3] == [0, 0, 1] {
            return Some((i, 3));
        }
        i += 1;
    }
    None
}

/**
    Length of the start code at the very beginning of `data`, if any.
*/
fn leading_start_code(data: &[u8]) -> usize {
    if data.starts_with(&[0, 0, 0, 1]) {
        4
    } else if data.starts_with(&[0, 0, 1]) {
        3
    } else {
        0
    }
}

/**
    Splits an Annex B elementary stream into units at start codes.

    Input is copied into an internal pending buffer. Each call either
    consumes its input and waits for the next start code, or completes
    exactly one unit and consumes only the bytes that belong to it. Start
    codes split across refills are handled. The last unit is handed out on
    the flush call.

    Emitted units include their leading start code. Bytes before the
    first start code of a stream are emitted as a unit of their own.
*/
#[derive(Debug, Default)]
pub struct StartCodeParser {
    pending: Vec<u8>,
    scan_from: usize,
    unit: Vec<u8>,
    units: u64,
}

impl StartCodeParser {
    pub fn new() -> Self {
        Self::default()
    }

    /**
        Number of units emitted so far.
    */
    pub fn units(&self) -> u64 {
        self.units
    }

    /**
        Bytes held back waiting for the end of the current unit.
    */
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    fn emit(&mut self, consumed: usize) -> Parsed<'_> {
        self.units += 1;
        trace!(units = self.units, len = self.unit.len(), "start code unit");
        Parsed::chunk(consumed, Chunk::new(&self.unit))
    }
}

impl ChunkParser for StartCodeParser {
    fn parse<'a>(&'a mut self, cursor: Cursor<'a>) -> Result<Parsed<'a>, ParseError> {
        if cursor.is_flush() {
            if self.pending.is_empty() {
                return Ok(Parsed::need_more());
            }
            self.unit = mem::take(&mut self.pending);
            self.scan_from = 0;
            return Ok(self.emit(0));
        }

        let input = cursor.bytes();
        let held = self.pending.len();
        self.pending.extend_from_slice(input);

        // Skip the start code that opens the current unit
        let from = self
            .scan_from
            .max(leading_start_code(&self.pending))
            .max(1);

        match find_start_code(&self.pending, from) {
            Some((pos, _)) => {
                // Input past the boundary stays in the window for the next call
                let keep = pos.max(held);
                self.pending.truncate(keep);
                self.unit.clear();
                self.unit.extend(self.pending.drain(..pos));
                self.scan_from = 0;
                Ok(self.emit(keep - held))
            }
            None => {
                self.scan_from = self.pending.len().saturating_sub(3);
                Ok(Parsed::skip(input.len()))
            }
        }
    }
}
