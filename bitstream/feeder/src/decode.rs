/*!
    Send / receive decoder adapter.
*/

use bitstream_types::{Chunk, ConsumeError};

use crate::parse::ChunkSink;

/**
    Outcome of asking a decoder for its next frame.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Received<T> {
    /// A decoded frame.
    Frame(T),
    /// The decoder needs another chunk before it can produce a frame.
    NeedsInput,
    /// The decoder has been flushed and holds no more frames.
    Drained,
}

/**
    A decoder that accepts chunks and produces frames asynchronously.

    One submitted chunk may yield zero, one or many frames. Sending `None`
    signals end of stream, after which the decoder hands out whatever it
    still buffers and then reports [`Received::Drained`].
*/
pub trait Decode {
    type Frame;

    /**
        Submit a chunk, or `None` to signal end of stream.
    */
    fn send(&mut self, chunk: Option<Chunk<'_>>) -> Result<(), ConsumeError>;

    /**
        Fetch the next decoded frame, if one is ready.
    */
    fn receive(&mut self) -> Result<Received<Self::Frame>, ConsumeError>;
}

/**
    A [`ChunkSink`] that submits chunks to a [`Decode`] implementation and
    passes every frame it produces to a callback.

    After each submission the decoder is drained until it asks for more
    input. Flushing sends end of stream and drains the remaining frames.
*/
pub struct DecodeSink<D, F> {
    decoder: D,
    on_frame: F,
    frames: u64,
}

impl<D, F> DecodeSink<D, F>
where
    D: Decode,
    F: FnMut(D::Frame) -> Result<(), ConsumeError>,
{
    /**
        Create a sink around `decoder`, calling `on_frame` for each frame.
    */
    pub fn new(decoder: D, on_frame: F) -> Self {
        Self {
            decoder,
            on_frame,
            frames: 0,
        }
    }

    /**
        Number of frames handed to the callback so far.
    */
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /**
        Consume the sink, returning the decoder.
    */
    pub fn into_inner(self) -> D {
        self.decoder
    }

    /**
        Receive all available frames from the decoder.
    */
    fn receive_frames(&mut self) -> Result<(), ConsumeError> {
        loop {
            match self.decoder.receive()? {
                Received::Frame(frame) => {
                    self.frames += 1;
                    (self.on_frame)(frame)?;
                }
                Received::NeedsInput | Received::Drained => return Ok(()),
            }
        }
    }
}

impl<D, F> ChunkSink for DecodeSink<D, F>
where
    D: Decode,
    F: FnMut(D::Frame) -> Result<(), ConsumeError>,
{
    fn consume(&mut self, chunk: Chunk<'_>) -> Result<(), ConsumeError> {
        self.decoder.send(Some(chunk))?;
        self.receive_frames()
    }

    fn flush(&mut self) -> Result<(), ConsumeError> {
        self.decoder.send(None)?;
        self.receive_frames()
    }
}

impl<D: std::fmt::Debug, F> std::fmt::Debug for DecodeSink<D, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodeSink")
            .field("decoder", &self.decoder)
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}
