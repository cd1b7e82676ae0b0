use std::io::{Read, Seek, SeekFrom};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::SortError;
use crate::region_reader::read_fully;

const PROGRESS_INTERVAL: u64 = 10_000;

#[derive(Debug)]
struct Slot {
    base: u64,
    filled: usize,
    window: Vec<u8>,
}

impl Slot {
    fn covers(&self, pos: u64, len: usize) -> bool {
        pos >= self.base && pos + len as u64 <= self.base + self.filled as u64
    }
}

/// Reads arbitrary byte ranges of an input through a set of equally sized cache slots.
///
/// A read served by no slot reloads a slot chosen at random, starting at the requested
/// position.
pub struct RandomAccessCache<R: Read + Seek> {
    input: R,
    slots: Vec<Slot>,
    slot_size: usize,
    rng: StdRng,
    reads: u64,
    misses: u64,
}

impl<R: Read + Seek> RandomAccessCache<R> {
    pub fn new(input: R, memory_budget: usize, cache_count: usize) -> Result<RandomAccessCache<R>, SortError> {
        if cache_count == 0 {
            return Err(SortError::Configuration("random access cache count must be positive".to_string()));
        }
        let slot_size = memory_budget / cache_count;
        if slot_size == 0 {
            return Err(
                SortError::Configuration(
                    format!("memory budget {} is too small for {} random access caches", memory_budget, cache_count)
                )
            );
        }
        let slots = (0..cache_count)
            .map(|_| Slot {
                base: 0,
                filled: 0,
                window: Vec::new(),
            })
            .collect();
        Ok(
            RandomAccessCache {
                input,
                slots,
                slot_size,
                rng: StdRng::seed_from_u64(5),
                reads: 0,
                misses: 0,
            }
        )
    }

    pub fn slot_size(&self) -> usize {
        self.slot_size
    }

    /// Fill `buf` with the bytes of the input starting at `pos`
    pub fn read(&mut self, buf: &mut [u8], pos: u64) -> Result<(), SortError> {
        if buf.len() > self.slot_size {
            return Err(
                SortError::InternalInvariant(
                    format!("read of {} bytes does not fit a cache slot of {} bytes", buf.len(), self.slot_size)
                )
            );
        }
        self.reads += 1;
        if self.reads % PROGRESS_INTERVAL == 0 {
            log::debug!("Random access reads: {}, miss rate: {:.4}", self.reads, self.miss_rate());
        }

        let slot = match self.slots.iter().position(|s| s.covers(pos, buf.len())) {
            Some(i) => i,
            None => {
                self.misses += 1;
                let i = self.rng.gen_range(0..self.slots.len());
                self.reload(i, pos)?;
                if !self.slots[i].covers(pos, buf.len()) {
                    return Err(
                        SortError::InternalInvariant(
                            format!("input ends before {} bytes at position {}", buf.len(), pos)
                        )
                    );
                }
                i
            }
        };
        let slot = &self.slots[slot];
        let from = (pos - slot.base) as usize;
        buf.copy_from_slice(&slot.window[from..from + buf.len()]);
        Ok(())
    }

    fn reload(&mut self, slot: usize, pos: u64) -> Result<(), SortError> {
        let slot_size = self.slot_size;
        let slot = &mut self.slots[slot];
        slot.window.resize(slot_size, 0);
        self.input.seek(SeekFrom::Start(pos))?;
        slot.filled = read_fully(&mut self.input, &mut slot.window)?;
        slot.base = pos;
        Ok(())
    }

    /// Share of reads that needed a reload, 0 before the first read
    pub fn miss_rate(&self) -> f64 {
        if self.reads == 0 {
            0.0
        } else {
            self.misses as f64 / self.reads as f64
        }
    }
}
