/*!
    Feeder configuration types.
*/

use bitstream_types::{Error, Result};

/**
    Default size of the data region, in bytes.
*/
pub const DEFAULT_BUFFER_SIZE: usize = 20480;

/**
    Default size of the zeroed padding reserve, in bytes.

    Matches the input padding FFmpeg parsers expect after their input.
*/
pub const DEFAULT_PADDING: usize = 64;

/**
    Configuration for a [`Feeder`](crate::Feeder).
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeederConfig {
    /// Size of the data region that holds input bytes.
    pub buffer_size: usize,
    /// Zeroed reserve kept after the input window.
    pub padding: usize,
    /// Refill once fewer than this many bytes remain (None = a fifth of the data region).
    pub refill_threshold: Option<usize>,
}

impl Default for FeederConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            padding: DEFAULT_PADDING,
            refill_threshold: None,
        }
    }
}

impl FeederConfig {
    /**
        Create a new config with default settings.
    */
    pub fn new() -> Self {
        Self::default()
    }

    /**
        Create a config from a total capacity that includes the padding.

        Requires `capacity > padding > 0`.
    */
    pub fn from_capacity(capacity: usize, padding: usize) -> Result<Self> {
        if padding == 0 {
            return Err(Error::invalid_config("padding must be non-zero"));
        }
        if capacity <= padding {
            return Err(Error::invalid_config(format!(
                "capacity {capacity} must exceed padding {padding}"
            )));
        }
        Ok(Self {
            buffer_size: capacity - padding,
            padding,
            refill_threshold: None,
        })
    }

    /**
        Create a config sized for compressed audio streams.

        Large window, topped up once a fifth of it remains.
    */
    pub fn audio() -> Self {
        Self {
            buffer_size: 20480,
            padding: DEFAULT_PADDING,
            refill_threshold: Some(4096),
        }
    }

    /**
        Create a config sized for compressed video streams.

        Small window that is only refilled once the parser drained it or
        asked for more data. Suits parsers that accumulate units internally.
    */
    pub fn video() -> Self {
        Self {
            buffer_size: 4096,
            padding: DEFAULT_PADDING,
            refill_threshold: Some(0),
        }
    }

    /**
        Set the data region size.
    */
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /**
        Set the padding size.
    */
    pub fn with_padding(mut self, padding: usize) -> Self {
        self.padding = padding;
        self
    }

    /**
        Set the refill threshold.
    */
    pub fn with_refill_threshold(mut self, threshold: usize) -> Self {
        self.refill_threshold = Some(threshold);
        self
    }

    /**
        Total buffer capacity, padding included.
    */
    pub fn capacity(&self) -> usize {
        self.buffer_size.saturating_add(self.padding)
    }

    /**
        Effective refill threshold.
    */
    pub fn threshold(&self) -> usize {
        self.refill_threshold.unwrap_or(self.buffer_size / 5)
    }

    /**
        Check that the sizes are consistent.
    */
    pub fn validate(&self) -> Result<()> {
        if self.buffer_size == 0 {
            return Err(Error::invalid_config("buffer size must be non-zero"));
        }
        if self.padding == 0 {
            return Err(Error::invalid_config("padding must be non-zero"));
        }
        if self.buffer_size.checked_add(self.padding).is_none() {
            return Err(Error::invalid_config("buffer capacity overflows usize"));
        }
        let threshold = self.threshold();
        if threshold > self.buffer_size {
            return Err(Error::invalid_config(format!(
                "refill threshold {threshold} exceeds buffer size {}",
                self.buffer_size
            )));
        }
        Ok(())
    }
}
