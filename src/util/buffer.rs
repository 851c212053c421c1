//! Workload payloads
//!
//! Throughput-write payloads are random lowercase letters in shuffled order so
//! that controllers cannot trivially compress them. Endurance writes are a run
//! of a single random letter at a random in-bounds offset.

use crate::distribution::Distribution;

/// Total payload bytes a worker pre-generates for its [`BufferPool`]
pub const POOL_BYTES_BUDGET: u64 = 256 * 1024 * 1024;

/// Upper bound on payloads held by one [`BufferPool`]
pub const MAX_POOL_BUFFERS: usize = 4;

/// Generate `len` bytes of shuffled random lowercase letters
pub fn generate_buffer<D: Distribution + ?Sized>(dist: &mut D, len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    dist.fill_letters(&mut buf);
    buf
}

/// One endurance-mode write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndurancePlan {
    /// Bytes to write, in [1, max_write)
    pub length: usize,
    /// Offset in [0, file_size - length]
    pub offset: u64,
    /// Letter repeated `length` times
    pub fill: u8,
}

impl EndurancePlan {
    /// Draw the next write for a file of `file_size` bytes
    ///
    /// Needs `2 <= max_write <= file_size` (enforced by config validation).
    pub fn draw<D: Distribution + ?Sized>(dist: &mut D, file_size: u64, max_write: u64) -> Self {
        let length = dist.uniform_range(1, max_write as i64).max(1) as u64;
        let length = length.min(file_size);
        let fill = dist.random_letter();
        let offset = dist.uniform_index(file_size - length + 1);

        Self {
            length: length as usize,
            offset,
            fill,
        }
    }

    /// Write the payload for this plan into `buf`, returning the filled prefix
    pub fn payload<'a>(&self, buf: &'a mut Vec<u8>) -> &'a [u8] {
        buf.clear();
        buf.resize(self.length, self.fill);
        &buf[..]
    }

    /// First byte past the written range
    pub fn end(&self) -> u64 {
        self.offset + self.length as u64
    }
}

/// Pre-generated full-file payloads for one worker, cycled round-robin
pub struct BufferPool {
    buffers: Vec<Vec<u8>>,
    next: usize,
}

impl BufferPool {
    /// Number of payloads a pool holds for files of `buffer_size` bytes
    pub fn capacity_for(buffer_size: u64) -> usize {
        let fit = POOL_BYTES_BUDGET / buffer_size.max(1);
        (fit as usize).clamp(1, MAX_POOL_BUFFERS)
    }

    /// Generate `num_buffers` payloads of `buffer_size` bytes each
    pub fn generate<D: Distribution + ?Sized>(dist: &mut D, num_buffers: usize, buffer_size: usize) -> Self {
        let buffers = (0..num_buffers.max(1))
            .map(|_| generate_buffer(dist, buffer_size))
            .collect();

        Self { buffers, next: 0 }
    }

    /// Next payload in round-robin order
    #[inline]
    pub fn next_buffer(&mut self) -> &[u8] {
        let index = self.next;
        self.next = (self.next + 1) % self.buffers.len();
        &self.buffers[index]
    }

    #[inline]
    pub fn total_count(&self) -> usize {
        self.buffers.len()
    }
}
