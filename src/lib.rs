//! This crate implements an external sort for delimited table files, for example CSV or TSV,
//! that can be much larger than the available memory.
//!
//! Every column is declared with a fixed width binary [ColumnType](column_type::ColumnType).
//! Rows are read in batches that fit the memory budget, each batch is sorted and encoded into
//! fixed length records, and the sorted runs are merged with a pairing heap in one or two passes
//! over the disk. The sorted rows are then rebuilt by one of two [strategies](strategy::Strategy):
//!
//! * [Binarize](strategy::Strategy::Binarize) encodes whole rows and decodes the merged records.
//! * [IndexPermute](strategy::Strategy::IndexPermute) encodes only the key columns together with
//!   the row ordinal, merges this narrow index and copies the original lines in index order
//!   through a random access cache. Lines reach the output byte for byte.
//!
//! Rows are ordered by the values their key columns are stored as, so `+8` in an integer column
//! sorts as `8` and characters outside a column's charset sort as `?`. Both strategies produce
//! the same order.
//!
//! Memory is bounded by construction: the write cache plus all read windows of a merge pass, the
//! random access cache slots and the pre-sorted batches all stay within the configured budget.
//! Intermediate files live in a temporary directory that is removed when the sort ends, whether
//! it succeeds or fails.
//!
//! # Examples
//! ```
//! use std::path::PathBuf;
//! use table_file_sort::column_type::{Charset, ColumnType};
//! use table_file_sort::field::Field;
//! use table_file_sort::field_type::FieldType;
//! use table_file_sort::sort::Sort;
//!
//! // optimized for use with Jemalloc
//! use tikv_jemallocator::Jemalloc;
//! #[global_allocator]
//! static GLOBAL: Jemalloc = Jemalloc;
//!
//! // sort a two column CSV file by its numeric first column
//! fn sort_records(input: PathBuf, output: PathBuf, tmp: PathBuf) -> Result<(), anyhow::Error> {
//!     let mut table_file_sort = Sort::new(input, output);
//!     table_file_sort.with_columns(vec![
//!         ColumnType::FixedInt64,
//!         ColumnType::fixed_string(16, Charset::UsAscii)?,
//!     ]);
//!     table_file_sort.add_field(Field::new(0, FieldType::Integer));
//!
//!     // set the memory budget in bytes, all caches and sorted batches share it
//!     table_file_sort.with_memory_budget(16 * 1024 * 1024);
//!
//!     // set the directory for intermediate results. The default is the system temp dir -
//!     // std::env::temp_dir(), however, for large files it is recommended to provide a dedicated
//!     // directory for intermediate files, preferably on the same file system as the output result.
//!     table_file_sort.with_tmp_dir(tmp);
//!
//!     table_file_sort.sort()
//! }
//! ```
//!

pub(crate) mod keyed_row;

pub mod batch_sorter;
pub mod binarizer;
pub mod binary_writer;
pub mod codec;
pub mod column_type;
pub mod comparator;
pub mod config;
pub mod delimited;
pub mod error;
pub mod field;
pub mod field_type;
pub mod file_manager;
pub mod key;
pub mod merge;
pub mod offsets;
pub mod order;
pub mod pairing_heap;
pub mod pipeline;
pub mod random_access;
pub mod record_layout;
pub mod region_reader;
pub mod row;
pub mod row_source;
pub mod sort;
pub mod sort_key;
pub mod strategy;
