//! Speech capture
//!
//! Recognition itself lives outside this crate. The host only needs
//! something that can be calibrated and asked for one utterance.

use std::io::{self, BufRead, StdinLock, Write};

#[derive(Debug, thiserror::Error)]
pub enum RecognitionError {
    #[error("no speech recognised")]
    NoSpeech,

    #[error("capture input closed")]
    Closed,

    #[error("capture device failed: {0}")]
    Io(#[from] io::Error),
}

/// Source of recognised speech
pub trait SpeechCapture {
    /// Adjust to the ambient noise level
    fn calibrate(&mut self) -> Result<(), RecognitionError>;

    /// Record one utterance and return its text
    fn capture(&mut self) -> Result<String, RecognitionError>;
}

/// Reads typed utterances, one per line
///
/// Stands in for a recogniser during bench testing: each capture prompts
/// and reads a line, an empty line counts as silence.
pub struct ConsoleCapture<R> {
    input: R,
}

impl ConsoleCapture<StdinLock<'static>> {
    /// Read utterances from standard input
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock())
    }
}

impl<R: BufRead> ConsoleCapture<R> {
    /// Read utterances from any buffered reader
    pub fn new(input: R) -> Self {
        Self { input }
    }
}

impl<R: BufRead> SpeechCapture for ConsoleCapture<R> {
    fn calibrate(&mut self) -> Result<(), RecognitionError> {
        Ok(())
    }

    fn capture(&mut self) -> Result<String, RecognitionError> {
        eprint!("speak> ");
        io::stderr().flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(RecognitionError::Closed);
        }

        let text = line.trim();
        if text.is_empty() {
            return Err(RecognitionError::NoSpeech);
        }
        Ok(text.to_owned())
    }
}
