//! Output framing.
//!
//! Two protocols are written to the output channel:
//!
//! - batch: a `0x10` sentinel byte immediately followed by one JSON envelope
//! - legacy: a JSON array streamed one element at a time, one line per write
//!
//! Every legacy write is newline-terminated so line-buffered readers see each
//! tuple as it is produced. A reader that stops before the closing `]` sees
//! an incomplete document.

use std::io::{self, Write};

use serde::Serialize;
use thiserror::Error;

/// Leading byte of a batch-protocol payload.
pub const BATCH_SENTINEL: u8 = 0x10;

#[derive(Debug, Error)]
pub enum FramingError {
    #[error("Array has not been started")]
    NotStarted,

    #[error("Array has already been started")]
    AlreadyStarted,

    #[error("Array has already been closed")]
    Closed,

    #[error("Write failed: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArrayState {
    Idle,
    Open { empty: bool },
    Closed,
}

/// Streams a JSON array, one flushed line per structural token or element.
#[derive(Debug)]
pub struct JsonArrayWriter<W: Write> {
    out: W,
    state: ArrayState,
}

impl<W: Write> JsonArrayWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            state: ArrayState::Idle,
        }
    }

    /// Writes the opening `[`.
    pub fn begin_array(&mut self) -> Result<(), FramingError> {
        match self.state {
            ArrayState::Idle => {
                self.emit(b"[\n")?;
                self.state = ArrayState::Open { empty: true };
                Ok(())
            }
            ArrayState::Open { .. } => Err(FramingError::AlreadyStarted),
            ArrayState::Closed => Err(FramingError::Closed),
        }
    }

    /// Writes one element, preceded by a separate `,` unless it is the first.
    pub fn write_element<T: Serialize + ?Sized>(&mut self, element: &T) -> Result<(), FramingError> {
        let ArrayState::Open { empty } = self.state else {
            return Err(match self.state {
                ArrayState::Closed => FramingError::Closed,
                _ => FramingError::NotStarted,
            });
        };

        // Serialize first so a failing element leaves the stream untouched.
        let mut bytes = serde_json::to_vec(element)?;
        bytes.push(b'\n');
        if !empty {
            self.emit(b",\n")?;
        }
        self.emit(&bytes)?;
        self.state = ArrayState::Open { empty: false };
        Ok(())
    }

    /// Writes the closing `]`.
    pub fn end_array(&mut self) -> Result<(), FramingError> {
        match self.state {
            ArrayState::Open { .. } => {
                self.emit(b"]\n")?;
                self.state = ArrayState::Closed;
                Ok(())
            }
            ArrayState::Idle => Err(FramingError::NotStarted),
            ArrayState::Closed => Err(FramingError::Closed),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.state == ArrayState::Closed
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, bytes: &[u8]) -> Result<(), FramingError> {
        self.out.write_all(bytes)?;
        self.out.flush()?;
        Ok(())
    }
}

/// Writes a batch-protocol payload: the sentinel then the JSON, in one write.
pub fn write_batch<W: Write, T: Serialize + ?Sized>(
    out: &mut W,
    payload: &T,
) -> Result<(), FramingError> {
    let mut bytes = vec![BATCH_SENTINEL];
    serde_json::to_writer(&mut bytes, payload)?;
    out.write_all(&bytes)?;
    out.flush()?;
    Ok(())
}
