//! Sort strategies.
//!
//! [sort_binarize] encodes whole rows, merges them and decodes the result. [sort_maximum] only
//! encodes the key columns with the row ordinal, merges that narrow index and then copies the
//! lines of the original file in index order.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context;

use crate::binary_writer::BinaryWriter;
use crate::column_type::ColumnType;
use crate::config::Config;
use crate::error::SortError;
use crate::file_manager::FileManager;
use crate::merge::KWayMerge;
use crate::offsets::{extract_offsets, OffsetTable};
use crate::random_access::RandomAccessCache;
use crate::record_layout::RecordLayout;
use crate::region_reader::read_fully;
use crate::row::{RowSink, RowSource};
use crate::row_source::{CuttingSource, EnumeratingSource};
use crate::sort_key::SortKey;

/// Sort the rows of `source` into `sink`, encoding every column with `layout`.
///
/// The header of the source, if any, is written to the sink first. Returns the number of data
/// rows.
pub fn sort_binarize<S, K>(source: S, sort_key: &SortKey, layout: &RecordLayout, config: &Config, sink: &mut K) -> Result<u64, anyhow::Error>
    where S: RowSource, K: RowSink + ?Sized {
    config.validate()?;
    log::info!("Start binarize sort, columns: {}, record length: {}", layout.len(), layout.record_length());
    let merge = KWayMerge::new(layout.clone(), sort_key, config.memory_budget(), config.write_cache_size())?;
    let batch_rows = config.batch_rows(layout.record_length())?;
    let mut files = FileManager::new_in(config.tmp(), config.tmp_prefix())?;

    if source.meta().has_header() {
        if let Some(names) = source.meta().column_names() {
            sink.write(names)?;
        }
    }
    let rows = merge.sort_rows(source, sink, batch_rows, config.passes(), &mut files)?;
    files.delete()?;
    log::info!("Finished binarize sort, rows: {}", rows);
    Ok(rows)
}

/// Sort the text file `input_path` into `output_path` through a narrow index.
///
/// `source` reads the rows of `input_path`, `key_layout` holds one column type per sort key
/// field, in key order. Lines are copied byte for byte, the header line first.
pub fn sort_maximum<S>(
    input_path: &Path,
    source: S,
    sort_key: &SortKey,
    key_layout: &RecordLayout,
    output_path: &Path,
    config: &Config,
) -> Result<u64, anyhow::Error>
    where S: RowSource {
    config.validate()?;
    if key_layout.len() != sort_key.fields().len() {
        return Err(
            SortError::Configuration(
                format!("key layout has {} columns for {} sort key fields", key_layout.len(), sort_key.fields().len())
            ).into()
        );
    }

    let index_layout = key_layout.with_column(ColumnType::FixedInt64);
    let index_key = sort_key.index_key();
    let has_header = source.meta().has_header();
    log::info!(
        "Start index sort of {}, key columns: {:?}, index record length: {}",
        input_path.to_string_lossy(), sort_key.columns(), index_layout.record_length()
    );

    let merge = KWayMerge::new(index_layout.clone(), &index_key, config.memory_budget(), config.write_cache_size())?;
    let batch_rows = config.batch_rows(index_layout.record_length())?;
    let mut files = FileManager::new_in(config.tmp(), config.tmp_prefix())?;
    let index = files.create_temp_file("index-")?;
    let sorted_index = files.create_temp_file("sorted-index-")?;
    let offsets_path = files.create_temp_file("offsets-")?;

    let index_source = EnumeratingSource::new(CuttingSource::new(source, sort_key.columns()));
    let rows = merge.batch_sort_and_binarize(index_source, &index, batch_rows)
        .context("batch sort and binarize")?;
    let presorted_len = (batch_rows as u64).saturating_mul(index_layout.record_length() as u64);
    merge.merge_file(&index, &sorted_index, presorted_len, config.passes(), &mut files)?;

    log::info!("Start extract offsets");
    let offsets = File::open(input_path)
        .map_err(SortError::from)
        .and_then(|file| {
            let mut input = BufReader::with_capacity(config.write_cache_size(), file);
            let output = File::create(&offsets_path)?;
            extract_offsets(&mut input, output, config.write_cache_size(), config.write_cache_size(), has_header)
        })
        .context("extract offsets")?;
    if offsets.rows() != rows {
        return Err(
            SortError::InternalInvariant(format!("{} lines for {} rows", offsets.rows(), rows))
        ).context("extract offsets");
    }
    log::info!("Finished extract offsets, rows: {}, header end: {:?}", offsets.rows(), offsets.header_end());

    log::info!("Start permute");
    let miss_rate = permute(input_path, &sorted_index, &offsets_path, offsets.header_end(), &index_layout, output_path, config)
        .context("permute")?;
    log::info!("Finished permute, rows: {}, random access miss rate: {:.4}", rows, miss_rate);

    files.delete()?;
    Ok(rows)
}

fn permute(
    input_path: &Path,
    sorted_index: &Path,
    offsets_path: &Path,
    header_end: Option<u64>,
    index_layout: &RecordLayout,
    output_path: &Path,
    config: &Config,
) -> Result<f64, SortError> {
    let mut output_file = File::create(output_path)?;
    let mut writer = BinaryWriter::new(&mut output_file, config.write_cache_size())?;
    if let Some(header_end) = header_end {
        let mut header = vec![0u8; (header_end + 1) as usize];
        let n = read_fully(&mut File::open(input_path)?, &mut header)?;
        if n < header.len() {
            return Err(SortError::InternalInvariant(format!("header of {} bytes is cut short at {}", header.len(), n)));
        }
        writer.write(&header)?;
    }

    let mut table = OffsetTable::open(offsets_path, header_end)?;
    let mut cache = RandomAccessCache::new(
        File::open(input_path)?,
        random_access_budget(config),
        config.random_access_caches(),
    )?;
    let mut index = BufReader::with_capacity(config.write_cache_size(), File::open(sorted_index)?);
    let record_length = index_layout.record_length();
    let ordinal_offset = index_layout.column_offset(index_layout.len() - 1);
    let mut record = vec![0u8; record_length];
    let mut line = vec![0u8; cache.slot_size()];
    loop {
        let n = read_fully(&mut index, &mut record)?;
        if n == 0 {
            break;
        } else if n < record_length {
            return Err(SortError::InternalInvariant(format!("index record cut short: {} of {} bytes", n, record_length)));
        }
        let ordinal = read_ordinal(&record[ordinal_offset..])?;
        let (start, end) = table.row_span(ordinal)?;
        // lines longer than a cache slot are copied in slot sized pieces
        let mut pos = start;
        while pos < end {
            let len = ((end - pos) as usize).min(line.len());
            cache.read(&mut line[..len], pos)?;
            writer.write(&line[..len])?;
            pos += len as u64;
        }
        writer.write(b"\n")?;
    }
    writer.close()?;
    Ok(cache.miss_rate())
}

/// Budget left to the random access slots next to the output write cache and the index reader
fn random_access_budget(config: &Config) -> usize {
    config.memory_budget().saturating_sub(2 * config.write_cache_size())
}

fn read_ordinal(bytes: &[u8]) -> Result<u64, SortError> {
    let bytes: [u8; 8] = bytes.try_into()
        .map_err(|_| SortError::InternalInvariant(format!("row ordinal of {} bytes", bytes.len())))?;
    let ordinal = i64::from_be_bytes(bytes);
    u64::try_from(ordinal)
        .map_err(|_| SortError::InternalInvariant(format!("negative row ordinal {}", ordinal)))
}
