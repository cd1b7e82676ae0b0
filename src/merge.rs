//! K-way merge of pre-sorted runs of fixed length records.
//!
//! A binary file made of consecutive sorted runs of `presorted_len` bytes is merged either in a
//! single pass, with one read window per run, or in two passes when the memory budget cannot
//! hold a window of at least one record for every run. The first of two passes merges groups of
//! `k1` consecutive runs into an intermediate file, the second merges the resulting longer runs.

use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufReader, Read, Seek, Write};
use std::path::Path;

use anyhow::Context;

use crate::batch_sorter::BatchSorter;
use crate::binarizer::{binarize, debinarize};
use crate::binary_writer::BinaryWriter;
use crate::comparator::RecordComparator;
use crate::config::DEFAULT_TMP_PREFIX;
use crate::error::SortError;
use crate::file_manager::FileManager;
use crate::key::Key;
use crate::pairing_heap::PairingHeap;
use crate::record_layout::RecordLayout;
use crate::region_reader::{Region, RegionReader};
use crate::row::{RowSink, RowSource};
use crate::sort_key::SortKey;

/// Number of merge passes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Passes {
    /// One pass when the memory budget allows it, two passes otherwise
    Auto,
    Single,
    /// Two passes, the first one merging groups of `k1` runs. `k1` defaults to the square root
    /// of the record count.
    Double { k1: Option<usize> },
}

struct RegionHead {
    region: usize,
    record: Vec<u8>,
    keys: Vec<Key>,
    exhausted: bool,
}

pub struct KWayMerge {
    layout: RecordLayout,
    comparator: RecordComparator,
    memory_budget: usize,
    write_cache_size: usize,
}

impl KWayMerge {
    /// Fails when the memory budget is smaller than the write cache or the sort key does not fit
    /// the layout.
    pub fn new(layout: RecordLayout, sort_key: &SortKey, memory_budget: usize, write_cache_size: usize) -> Result<KWayMerge, SortError> {
        if write_cache_size == 0 {
            return Err(SortError::Configuration("write cache size must be positive".to_string()));
        }
        if memory_budget < write_cache_size {
            return Err(
                SortError::Configuration(
                    format!("memory budget {} is smaller than the write cache {}", memory_budget, write_cache_size)
                )
            );
        }
        let comparator = RecordComparator::new(layout.clone(), sort_key)?;
        Ok(
            KWayMerge {
                layout,
                comparator,
                memory_budget,
                write_cache_size,
            }
        )
    }

    pub fn layout(&self) -> &RecordLayout {
        &self.layout
    }

    /// Read window of each of `regions` runs of `presorted_len` bytes.
    ///
    /// The budget left after the write cache is shared evenly, a window never exceeds a run and
    /// holds whole records only. Less than one record per run is a configuration error.
    pub fn region_cache_size(&self, regions: usize, presorted_len: u64) -> Result<usize, SortError> {
        let record_length = self.layout.record_length();
        let available = (self.memory_budget - self.write_cache_size) / regions.max(1);
        let cache_size = (available as u64).min(presorted_len) as usize;
        let cache_size = cache_size - cache_size % record_length.max(1);
        if cache_size < record_length || cache_size == 0 {
            Err(
                SortError::Configuration(
                    format!(
                        "memory budget {} with a write cache of {} cannot hold a record of {} bytes for each of {} regions",
                        self.memory_budget, self.write_cache_size, record_length, regions
                    )
                )
            )
        } else {
            Ok(cache_size)
        }
    }

    /// Default number of runs merged together in the first of two passes
    pub fn default_k1(records: u64) -> usize {
        ((records as f64).sqrt().floor() as usize).max(1)
    }

    /// Largest number of runs one pass can merge within the memory budget
    pub fn max_fan_in(&self) -> usize {
        (self.memory_budget - self.write_cache_size) / self.layout.record_length().max(1)
    }

    /// Merge every region into `writer`, returns the number of records written.
    pub fn merge_regions<R, W>(&self, input: R, regions: Vec<Region>, cache_size: usize, writer: &mut BinaryWriter<W>) -> Result<u64, SortError>
        where R: Read + Seek, W: Write {
        let record_length = self.layout.record_length();
        let mut reader = RegionReader::new(input, regions, cache_size)?;
        let comparator = &self.comparator;
        let mut heap = PairingHeap::new(|a: &RegionHead, b: &RegionHead| {
            // exhausted regions come out last, that ends the merge
            let ordering = match (a.exhausted, b.exhausted) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => comparator.compare_keys(&a.keys, &b.keys),
            };
            ordering.then(a.region.cmp(&b.region))
        });

        for region in 0..reader.regions().len() {
            let mut head = RegionHead {
                region,
                record: vec![0u8; record_length],
                keys: Vec::new(),
                exhausted: false,
            };
            self.advance(&mut reader, &mut head)?;
            heap.insert(head);
        }

        let mut written: u64 = 0;
        while let Some(mut head) = heap.extract_min() {
            if head.exhausted {
                break;
            }
            writer.write(&head.record)?;
            written += 1;
            self.advance(&mut reader, &mut head)?;
            heap.insert(head);
        }

        let expected = reader.region_len_sum() / record_length as u64;
        if written != expected {
            return Err(
                SortError::InternalInvariant(format!("merged {} records out of {}", written, expected))
            );
        }
        Ok(written)
    }

    fn advance<R: Read + Seek>(&self, reader: &mut RegionReader<R>, head: &mut RegionHead) -> Result<(), SortError> {
        if reader.is_over(head.region) {
            head.exhausted = true;
            head.keys.clear();
            return Ok(());
        }
        let n = reader.read(&mut head.record, head.region)?;
        if n < head.record.len() {
            return Err(
                SortError::InternalInvariant(
                    format!("region {} ends inside a record, {} of {} bytes", head.region, n, head.record.len())
                )
            );
        }
        head.keys = self.comparator.keys(&head.record)?;
        Ok(())
    }

    fn regions(&self, input: &Path, presorted_len: u64) -> Result<Vec<Region>, SortError> {
        let record_length = self.layout.record_length() as u64;
        if presorted_len == 0 || presorted_len % record_length != 0 {
            return Err(
                SortError::MalformedInput(
                    format!("pre-sorted length {} is not a positive multiple of the record length {}", presorted_len, record_length)
                )
            );
        }
        let len = std::fs::metadata(input)?.len();
        if len % record_length != 0 {
            return Err(
                SortError::MalformedInput(
                    format!("{} holds {} bytes, not a multiple of the record length {}", input.to_string_lossy(), len, record_length)
                )
            );
        }
        Ok(Region::split(0, len, presorted_len))
    }

    /// Merge all runs of `input` at once into `output`
    pub fn single_pass(&self, input: &Path, output: &Path, presorted_len: u64) -> Result<u64, SortError> {
        let regions = self.regions(input, presorted_len)?;
        let cache_size = if regions.is_empty() {
            0
        } else {
            self.region_cache_size(regions.len(), presorted_len)?
        };
        log::info!(
            "Single pass merge of {} regions of {} bytes, region cache: {} bytes, write cache: {} bytes",
            regions.len(), presorted_len, cache_size, self.write_cache_size
        );

        let mut output_file = File::create(output)?;
        let mut writer = BinaryWriter::new(&mut output_file, self.write_cache_size)?;
        let written = if regions.is_empty() {
            0
        } else {
            self.merge_regions(File::open(input)?, regions, cache_size, &mut writer)?
        };
        writer.close()?;
        log::info!("Finished single pass merge, records: {}", written);
        Ok(written)
    }

    fn first_pass(&self, input: &Path, intermediate: &Path, presorted_len: u64, k1: usize) -> Result<u64, SortError> {
        if k1 == 0 {
            return Err(SortError::Configuration("regions per first pass group must be positive".to_string()));
        }
        let regions = self.regions(input, presorted_len)?;
        let groups = (regions.len() + k1 - 1) / k1;
        log::info!("First merge pass: {} regions in {} groups of up to {} regions", regions.len(), groups, k1);

        let input_file = File::open(input)?;
        let mut intermediate_file = File::create(intermediate)?;
        let mut writer = BinaryWriter::new(&mut intermediate_file, self.write_cache_size)?;
        let mut written = 0;
        for group in regions.chunks(k1) {
            let cache_size = self.region_cache_size(group.len(), presorted_len)?;
            log::debug!("Merge group of {} regions starting at {}, region cache: {} bytes", group.len(), group[0].start(), cache_size);
            written += self.merge_regions(&input_file, group.to_vec(), cache_size, &mut writer)?;
        }
        writer.close()?;
        Ok(written)
    }

    /// Merge groups of `k1` runs into an intermediate file, then merge that file in one pass
    pub fn double_pass(&self, input: &Path, output: &Path, presorted_len: u64, k1: usize, files: &mut FileManager) -> Result<u64, anyhow::Error> {
        let intermediate = files.create_temp_file("merge-pass-")
            .context("merge pass 1")?;
        self.first_pass(input, &intermediate, presorted_len, k1)
            .context("merge pass 1")?;
        let written = self.single_pass(&intermediate, output, presorted_len.saturating_mul(k1 as u64))
            .context("merge pass 2")?;
        Ok(written)
    }

    /// Merge the runs of `input` into `output` with the requested number of passes
    pub fn merge_file(&self, input: &Path, output: &Path, presorted_len: u64, passes: Passes, files: &mut FileManager) -> Result<u64, anyhow::Error> {
        let records = || -> Result<u64, SortError> {
            Ok(std::fs::metadata(input)?.len() / self.layout.record_length().max(1) as u64)
        };
        match passes {
            Passes::Single => {
                self.single_pass(input, output, presorted_len).context("merge pass 1")
            }
            Passes::Double { k1 } => {
                let k1 = match k1 {
                    Some(k1) => k1,
                    None => KWayMerge::default_k1(records().context("merge pass 1")?),
                };
                self.double_pass(input, output, presorted_len, k1, files)
            }
            Passes::Auto => {
                let regions = self.regions(input, presorted_len).context("merge pass 1")?;
                match self.region_cache_size(regions.len(), presorted_len) {
                    Ok(_) => {
                        self.single_pass(input, output, presorted_len).context("merge pass 1")
                    }
                    Err(SortError::Configuration(reason)) => {
                        let k1 = KWayMerge::default_k1(records().context("merge pass 1")?)
                            .min(self.max_fan_in())
                            .max(1);
                        log::warn!("Single pass merge is not possible, {}. Falling back to two passes with k1: {}", reason, k1);
                        self.double_pass(input, output, presorted_len, k1, files)
                    }
                    Err(e) => Err(e).context("merge pass 1"),
                }
            }
        }
    }

    /// Sort a row stream into a sink: batch sort, binarize, merge and debinarize.
    ///
    /// Rows are encoded with the whole layout of this merge. Returns the number of rows.
    pub fn sort_rows<S, K>(&self, source: S, sink: &mut K, batch_rows: usize, passes: Passes, files: &mut FileManager) -> Result<u64, anyhow::Error>
        where S: RowSource, K: RowSink + ?Sized {
        let binary = files.create_temp_file("binary-")?;
        let sorted = files.create_temp_file("sorted-")?;

        let rows = self.batch_sort_and_binarize(source, &binary, batch_rows)
            .context("batch sort and binarize")?;

        let presorted_len = (batch_rows as u64).saturating_mul(self.layout.record_length() as u64);
        self.merge_file(&binary, &sorted, presorted_len, passes, files)?;

        log::info!("Start debinarize");
        let mut reader = BufReader::new(File::open(&sorted).context("debinarize")?);
        let decoded = debinarize(&mut reader, &self.layout, sink)
            .context("debinarize")?;
        if decoded != rows {
            return Err(SortError::InternalInvariant(format!("decoded {} rows out of {}", decoded, rows)))
                .context("debinarize");
        }
        log::info!("Finished debinarize, rows: {}", decoded);
        Ok(rows)
    }

    pub(crate) fn batch_sort_and_binarize<S: RowSource>(&self, source: S, binary: &Path, batch_rows: usize) -> Result<u64, SortError> {
        log::info!("Start batch sort and binarize, batch rows: {}", batch_rows);
        let mut batch_sorter = BatchSorter::new(source, self.comparator.clone(), batch_rows)?;
        let mut binary_file = File::create(binary)?;
        let mut writer = BinaryWriter::new(&mut binary_file, self.write_cache_size)?;
        let rows = binarize(&mut batch_sorter, &self.layout, &mut writer)?;
        writer.close()?;
        log::info!("Finished batch sort and binarize, rows: {}, batches: {}", rows, batch_sorter.batches());
        Ok(rows)
    }
}

/// Merge the pre-sorted runs of a binary file of `layout` records into `output`.
///
/// Every `presorted_len` bytes of `input`, the last run possibly shorter, must already be sorted
/// by `sort_key`. Intermediate files go to std::env::temp_dir().
pub fn merge_binary(
    input: &Path,
    output: &Path,
    layout: RecordLayout,
    sort_key: &SortKey,
    memory_budget: usize,
    write_cache_size: usize,
    presorted_len: u64,
    passes: Passes,
) -> Result<u64, anyhow::Error> {
    let merge = KWayMerge::new(layout, sort_key, memory_budget, write_cache_size)?;
    let mut files = FileManager::new_in(&std::env::temp_dir(), DEFAULT_TMP_PREFIX)?;
    let written = merge.merge_file(input, output, presorted_len, passes, &mut files)?;
    files.delete()?;
    Ok(written)
}
