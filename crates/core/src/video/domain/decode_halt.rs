use crate::shared::frame::Frame;

/// Ends a frame sequence at the first read failure instead of surfacing it.
///
/// A damaged packet or truncated container halfway through a video is
/// treated as end-of-stream; the run keeps every frame decoded so far.
pub struct DecodeHalt<I> {
    inner: I,
    decoded: usize,
    halted: bool,
}

impl<I> DecodeHalt<I> {
    pub fn new(inner: I) -> Self {
        Self {
            inner,
            decoded: 0,
            halted: false,
        }
    }

    /// Number of frames yielded so far.
    pub fn decoded(&self) -> usize {
        self.decoded
    }

    pub fn halted(&self) -> bool {
        self.halted
    }
}

impl<I> Iterator for DecodeHalt<I>
where
    I: Iterator<Item = Result<Frame, Box<dyn std::error::Error>>>,
{
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.halted {
            return None;
        }
        match self.inner.next()? {
            Ok(frame) => {
                self.decoded += 1;
                Some(frame)
            }
            Err(e) => {
                log::warn!(
                    "Decoding stopped after {} frame(s): {e}",
                    self.decoded
                );
                self.halted = true;
                None
            }
        }
    }
}
