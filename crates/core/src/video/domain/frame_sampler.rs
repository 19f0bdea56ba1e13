use crate::shared::frame::Frame;

/// Keeps every `interval`-th decoded frame (decode positions 0, N, 2N, ...).
///
/// Tracks decoded frames separately from kept ones; callers that persist
/// samples number files by their own saved count, never by decode position.
pub struct FrameSampler<I> {
    inner: I,
    interval: usize,
    decoded_count: usize,
    sampled_count: usize,
}

impl<I: Iterator<Item = Frame>> FrameSampler<I> {
    pub fn new(inner: I, interval: usize) -> Result<Self, &'static str> {
        if interval < 1 {
            return Err("frame_interval must be >= 1");
        }
        Ok(Self {
            inner,
            interval,
            decoded_count: 0,
            sampled_count: 0,
        })
    }

    pub fn decoded_count(&self) -> usize {
        self.decoded_count
    }

    pub fn sampled_count(&self) -> usize {
        self.sampled_count
    }
}

impl<I: Iterator<Item = Frame>> Iterator for FrameSampler<I> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        loop {
            let frame = self.inner.next()?;
            let position = self.decoded_count;
            self.decoded_count += 1;
            if position % self.interval == 0 {
                self.sampled_count += 1;
                return Some(frame);
            }
        }
    }
}
