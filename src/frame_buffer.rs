// src/frame_buffer.rs
//
// Fixed-capacity sample FIFO for the real-time path.

/// Fixed-capacity sample FIFO.
///
/// Backs both the pending-hop buffer and the playback buffer. The storage
/// is allocated once at construction and never grows; push/pop move
/// cursors only. The buffer compacts whenever it drains empty, so the
/// stored samples are always one contiguous slice — the engine fills a
/// hop, reads it in place, then clears, so wraparound never occurs on
/// this path.
#[derive(Debug)]
pub struct FrameBuffer {
    data: Vec<f32>,
    start: usize,
    end: usize,
}

impl FrameBuffer {
    /// Create a buffer that can hold up to `cap` samples.
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            data: vec![0.0; cap],
            start: 0,
            end: 0,
        }
    }

    /// Number of samples currently stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Fixed capacity in samples.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Drop all stored samples.
    #[inline]
    pub fn clear(&mut self) {
        self.start = 0;
        self.end = 0;
    }

    /// Append `input` to the back of the buffer.
    ///
    /// Returns `false` without storing anything if the samples do not fit.
    pub fn push_slice(&mut self, input: &[f32]) -> bool {
        if input.len() > self.capacity() - self.end {
            return false;
        }
        self.data[self.end..self.end + input.len()].copy_from_slice(input);
        self.end += input.len();
        true
    }

    /// Move up to `output.len()` samples from the front into `output`.
    ///
    /// Returns the number of samples moved. Samples beyond the returned
    /// count are left untouched in `output`.
    pub fn pop_slice(&mut self, output: &mut [f32]) -> usize {
        let n = output.len().min(self.len());
        output[..n].copy_from_slice(&self.data[self.start..self.start + n]);
        self.start += n;
        if self.start == self.end {
            self.start = 0;
            self.end = 0;
        }
        n
    }

    /// Contiguous view of all stored samples.
    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.data[self.start..self.end]
    }
}

#[cfg(test)]
mod tests {
    use super::FrameBuffer;

    #[test]
    fn push_then_drain_in_chunks() {
        let mut buf = FrameBuffer::with_capacity(8);
        assert!(buf.push_slice(&[1.0, 2.0, 3.0, 4.0]));
        assert_eq!(buf.len(), 4);

        let mut out = [0.0; 3];
        assert_eq!(buf.pop_slice(&mut out), 3);
        assert_eq!(out, [1.0, 2.0, 3.0]);
        assert_eq!(buf.len(), 1);

        let mut rest = [0.0; 3];
        assert_eq!(buf.pop_slice(&mut rest), 1);
        assert_eq!(rest[0], 4.0);
        assert!(buf.is_empty());
    }

    #[test]
    fn compacts_after_full_drain() {
        let mut buf = FrameBuffer::with_capacity(4);
        assert!(buf.push_slice(&[1.0, 2.0, 3.0, 4.0]));
        let mut out = [0.0; 4];
        assert_eq!(buf.pop_slice(&mut out), 4);
        // Fully drained, so the whole capacity is usable again.
        assert!(buf.push_slice(&[5.0, 6.0, 7.0, 8.0]));
        assert_eq!(buf.as_slice(), &[5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn rejects_overflow_without_partial_write() {
        let mut buf = FrameBuffer::with_capacity(4);
        assert!(buf.push_slice(&[1.0, 2.0, 3.0]));
        assert!(!buf.push_slice(&[4.0, 5.0]));
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.as_slice(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn clear_resets_cursors() {
        let mut buf = FrameBuffer::with_capacity(4);
        buf.push_slice(&[1.0, 2.0]);
        buf.clear();
        assert!(buf.is_empty());
        assert!(buf.push_slice(&[1.0, 2.0, 3.0, 4.0]));
    }
}
