//! A resizable, forward-only read cursor over a byte channel.
//!
//! Parsing code asks for a minimum number of contiguous bytes before
//! touching them; the cursor refills from the channel with at most one of
//! three actions per request: nothing (already satisfied), compact the
//! consumed prefix away and refill, or grow the backing buffer and refill.

use crate::error::Result;
use std::io::{ErrorKind, Read};

pub(crate) const DEFAULT_BUFFER_SIZE: usize = 1 << 16;

#[derive(Debug)]
pub struct BufferCursor<R> {
    channel: R,
    buf: Vec<u8>,
    /// Next unconsumed byte.
    start: usize,
    /// One past the last filled byte.
    end: usize,
}

impl<R: Read> BufferCursor<R> {
    pub fn new(channel: R) -> BufferCursor<R> {
        BufferCursor::with_capacity(channel, DEFAULT_BUFFER_SIZE)
    }

    pub fn with_capacity(channel: R, capacity: usize) -> BufferCursor<R> {
        BufferCursor {
            channel,
            buf: vec![0; capacity.max(8)],
            start: 0,
            end: 0,
        }
    }

    /// Bytes buffered and not yet consumed.
    pub fn available(&self) -> usize {
        self.end - self.start
    }

    /// The buffered, unconsumed bytes.
    pub fn data(&self) -> &[u8] {
        &self.buf[self.start..self.end]
    }

    /// Make at least `n` bytes available without further channel calls,
    /// returning the count actually available. A return below `n` means
    /// the channel ended; whatever remains stays buffered so the caller
    /// can decide whether a short tail is an error.
    pub fn ensure(&mut self, n: usize) -> Result<usize> {
        if self.available() >= n {
            return Ok(n);
        }
        if n > self.buf.len() {
            // grow-refill: carry the remainder into a larger buffer
            let mut grown = vec![0; n.max(self.buf.len() * 2)];
            grown[..self.available()].copy_from_slice(&self.buf[self.start..self.end]);
            self.end = self.available();
            self.start = 0;
            self.buf = grown;
        } else if self.start > 0 {
            // compact-refill: slide the remainder to the front
            self.buf.copy_within(self.start..self.end, 0);
            self.end = self.available();
            self.start = 0;
        }
        while self.available() < n {
            let read = match self.channel.read(&mut self.buf[self.end..]) {
                Ok(read) => read,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            if read == 0 {
                return Ok(self.available());
            }
            self.end += read;
        }
        Ok(n)
    }

    /// Advance past `n` previously ensured bytes.
    pub fn consume(&mut self, n: usize) {
        debug_assert!(n <= self.available());
        self.start += n;
    }

    /// Advance the logical position by `n` bytes, reading and discarding
    /// from the channel once the buffer is drained. Returns the count
    /// actually skipped, which falls short of `n` only at end of channel.
    pub fn skip(&mut self, n: u64) -> Result<u64> {
        let buffered = self.available() as u64;
        if n <= buffered {
            self.start += n as usize;
            return Ok(n);
        }
        self.start = 0;
        self.end = 0;
        let mut remaining = n - buffered;
        while remaining > 0 {
            let want = remaining.min(self.buf.len() as u64) as usize;
            let read = match self.channel.read(&mut self.buf[..want]) {
                Ok(read) => read,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            if read == 0 {
                return Ok(n - remaining);
            }
            remaining -= read as u64;
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Serves a fixed payload at most `chunk` bytes per read call.
    struct BoundedChannel {
        data: Vec<u8>,
        pos: usize,
        chunk: usize,
    }

    impl BoundedChannel {
        fn new(data: Vec<u8>, chunk: usize) -> BoundedChannel {
            BoundedChannel {
                data,
                pos: 0,
                chunk,
            }
        }
    }

    impl Read for BoundedChannel {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let n = buf
                .len()
                .min(self.chunk)
                .min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    fn payload(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    #[test]
    fn satisfied_without_channel_call() {
        let mut cursor = BufferCursor::with_capacity(BoundedChannel::new(payload(64), 7), 32);
        assert_eq!(cursor.ensure(16).unwrap(), 16);
        let before = cursor.available();
        // already buffered, second request must not shrink availability
        assert_eq!(cursor.ensure(8).unwrap(), 8);
        assert_eq!(cursor.available(), before);
        assert_eq!(cursor.data()[..4], payload(64)[..4]);
    }

    #[test]
    fn compact_refill_after_consume() {
        let mut cursor = BufferCursor::with_capacity(BoundedChannel::new(payload(64), 5), 16);
        assert_eq!(cursor.ensure(16).unwrap(), 16);
        cursor.consume(12);
        // 4 left, capacity 16: must compact, not grow
        assert_eq!(cursor.ensure(16).unwrap(), 16);
        assert_eq!(cursor.data()[..16], payload(64)[12..28]);
    }

    #[test]
    fn grow_refill_beyond_capacity() {
        let mut cursor = BufferCursor::with_capacity(BoundedChannel::new(payload(128), 9), 16);
        assert_eq!(cursor.ensure(10).unwrap(), 10);
        cursor.consume(4);
        assert_eq!(cursor.ensure(100).unwrap(), 100);
        assert_eq!(cursor.data()[..100], payload(128)[4..104]);
    }

    #[test]
    fn short_final_record_at_end_of_channel() {
        let mut cursor = BufferCursor::with_capacity(BoundedChannel::new(payload(10), 3), 16);
        assert_eq!(cursor.ensure(32).unwrap(), 10);
        // the short tail stays readable
        assert_eq!(cursor.data(), &payload(10)[..]);
    }

    #[test]
    fn skip_within_and_past_buffer() {
        let mut cursor = BufferCursor::with_capacity(BoundedChannel::new(payload(100), 7), 16);
        cursor.ensure(10).unwrap();
        assert_eq!(cursor.skip(6).unwrap(), 6);
        assert_eq!(cursor.skip(50).unwrap(), 50);
        cursor.ensure(4).unwrap();
        assert_eq!(cursor.data()[..4], payload(100)[56..60]);
    }

    #[test]
    fn skip_stops_at_end_of_channel() {
        let mut cursor = BufferCursor::with_capacity(BoundedChannel::new(payload(20), 6), 8);
        assert_eq!(cursor.skip(64).unwrap(), 20);
        assert_eq!(cursor.skip(1).unwrap(), 0);
    }
}
