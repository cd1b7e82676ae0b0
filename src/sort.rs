use std::cmp::Ordering;
use std::path::PathBuf;

use anyhow::Context;

use crate::column_type::ColumnType;
use crate::comparator::RecordComparator;
use crate::config::{Config, DEFAULT_MEMORY_BUDGET, DEFAULT_RANDOM_ACCESS_CACHES, DEFAULT_TMP_PREFIX, DEFAULT_WRITE_CACHE_SIZE};
use crate::delimited::{DelimitedReader, DelimitedWriter};
use crate::error::SortError;
use crate::field::Field;
use crate::keyed_row::KeyedRow;
use crate::merge::Passes;
use crate::pipeline::{sort_binarize, sort_maximum};
use crate::record_layout::RecordLayout;
use crate::row::RowSource;
use crate::sort_key::SortKey;
use crate::strategy::Strategy;

/// Sort a delimited table file
///
/// # Examples
/// ```
/// use std::path::PathBuf;
/// use table_file_sort::column_type::{Charset, ColumnType};
/// use table_file_sort::field::Field;
/// use table_file_sort::field_type::FieldType;
/// use table_file_sort::order::Order;
/// use table_file_sort::sort::Sort;
/// use table_file_sort::strategy::Strategy;
///
/// fn sort_table(input: PathBuf, output: PathBuf, tmp: PathBuf) -> Result<(), anyhow::Error> {
///     let mut table_file_sort = Sort::new(input, output);
///     // id,name,score
///     table_file_sort.with_header(true);
///     table_file_sort.with_columns(vec![
///         ColumnType::FixedInt64,
///         ColumnType::fixed_string(32, Charset::UsAscii)?,
///         ColumnType::fixed_big_int(16)?,
///     ]);
///     // highest score first, then by id
///     table_file_sort.add_field(Field::new(2, FieldType::BigInteger).with_order(Order::Desc));
///     table_file_sort.add_field(Field::new(0, FieldType::Integer));
///     // set the directory for intermediate results. The default is the system temp dir -
///     // std::env::temp_dir(), however, for large files it is recommended to provide a dedicated
///     // directory for intermediate files, preferably on the same file system as the output result.
///     table_file_sort.with_tmp_dir(tmp);
///     // copy the original lines instead of re-encoding them
///     table_file_sort.with_strategy(Strategy::IndexPermute);
///     table_file_sort.sort()
/// }
/// ```
pub struct Sort {
    input: PathBuf,
    output: PathBuf,
    tmp: PathBuf,
    field_separator: char,
    has_header: bool,
    columns: Vec<ColumnType>,
    fields: Vec<Field>,
    memory_budget: usize,
    write_cache_size: usize,
    random_access_caches: usize,
    batch_rows: Option<usize>,
    passes: Passes,
    strategy: Strategy,
}

impl Sort {
    /// Create a default Sort definition.
    ///
    /// A default Sort definition will use the system temporary
    /// directory as defined by std::env::temp_dir().
    /// * The default field separator is a comma (',')
    /// * the input has no header line
    /// * column types must be set, see [Sort::with_columns]
    /// * without fields all columns are compared as ascending strings
    /// * memory budget is 64 MiB with a write cache of 8 KiB
    /// * 16 random access caches are used by [Strategy::IndexPermute]
    /// * the number of merge passes is chosen automatically
    /// * the default strategy is [Strategy::Binarize]
    pub fn new(input: PathBuf, output: PathBuf) -> Sort {
        Sort {
            input,
            output,
            tmp: std::env::temp_dir(),
            field_separator: ',',
            has_header: false,
            columns: vec![],
            fields: vec![],
            memory_budget: DEFAULT_MEMORY_BUDGET,
            write_cache_size: DEFAULT_WRITE_CACHE_SIZE,
            random_access_caches: DEFAULT_RANDOM_ACCESS_CACHES,
            batch_rows: None,
            passes: Passes::Auto,
            strategy: Strategy::Binarize,
        }
    }

    /// Set directory for intermediate files. By default use std::env::temp_dir()
    /// It is recommended for large files to create a dedicated directory for intermediate files
    /// on the same file system as the output target
    pub fn with_tmp_dir(&mut self, tmp: PathBuf) {
        self.tmp = tmp;
    }

    /// Set the field separator. The default is ','
    pub fn with_field_separator(&mut self, field_separator: char) {
        self.field_separator = field_separator
    }

    /// The first line of the input names the columns and is copied to the output first
    pub fn with_header(&mut self, has_header: bool) {
        self.has_header = has_header
    }

    /// Set the binary type of every column, in column order
    pub fn with_columns(&mut self, columns: Vec<ColumnType>) {
        self.columns = columns
    }

    /// Append the binary type of the next column
    pub fn add_column(&mut self, column: ColumnType) {
        self.columns.push(column)
    }

    /// Add field specification. Without fields every column is compared as an ascending String
    pub fn add_field(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// Replace all fields with the `fields` value.
    pub fn with_fields(&mut self, fields: Vec<Field>) {
        self.fields = fields
    }

    /// Memory available to the sort in bytes, the write cache included
    pub fn with_memory_budget(&mut self, memory_budget: usize) {
        self.memory_budget = memory_budget
    }

    pub fn with_write_cache_size(&mut self, write_cache_size: usize) {
        self.write_cache_size = write_cache_size
    }

    /// Number of cache slots used to read lines of the input in [Strategy::IndexPermute]
    pub fn with_random_access_caches(&mut self, random_access_caches: usize) {
        self.random_access_caches = random_access_caches
    }

    /// Rows per pre-sorted batch. The default is as many rows as fit the memory budget
    pub fn with_batch_rows(&mut self, batch_rows: usize) {
        self.batch_rows = Some(batch_rows)
    }

    /// Set [Passes]
    pub fn with_passes(&mut self, passes: Passes) {
        self.passes = passes
    }

    /// Set [Strategy]
    pub fn with_strategy(&mut self, strategy: Strategy) {
        self.strategy = strategy
    }

    /// Sort the input file into the output file
    pub fn sort(&self) -> Result<(), anyhow::Error> {
        let config = self.create_config();
        config.validate()?;
        let layout = self.create_layout()?;
        let sort_key = self.create_sort_key();
        log::info!(
            "Sort {} into {}, strategy: {:?}, passes: {:?}, memory budget: {}",
            self.input.to_string_lossy(), self.output.to_string_lossy(), self.strategy, config.passes(), config.memory_budget()
        );

        let reader = self.open_reader(&layout)?;
        let rows = match self.strategy {
            Strategy::Binarize => {
                let mut writer = DelimitedWriter::create(&self.output, self.field_separator)
                    .with_context(|| format!("path: {}", self.output.to_string_lossy()))?;
                let rows = sort_binarize(reader, &sort_key, &layout, &config, &mut writer)?;
                writer.finish()?;
                rows
            }
            Strategy::IndexPermute => {
                let key_layout = layout.project(&sort_key.columns())?;
                sort_maximum(&self.input, reader, &sort_key, &key_layout, &self.output, &config)?
            }
        };
        log::info!("Finished sorting {} rows", rows);
        Ok(())
    }

    /// Check if the input is sorted by the sort key.
    ///
    /// Values are compared in their stored form, the same way [Sort::sort] orders them.
    pub fn check(&self) -> Result<bool, anyhow::Error> {
        let layout = self.create_layout()?;
        let sort_key = self.create_sort_key();
        let comparator = RecordComparator::new(layout.clone(), &sort_key)?;
        let mut reader = self.open_reader(&layout)?;

        let mut previous: Option<KeyedRow> = None;
        let mut n: u64 = 0;
        while let Some(row) = reader.next_row()? {
            let current = KeyedRow::new(row, &comparator)
                .with_context(|| format!("path: {}, row: {}", self.input.to_string_lossy(), n))?;
            if let Some(previous) = &previous {
                if previous.compare(&current, &comparator) == Ordering::Greater {
                    log::info!("Row {} of {} is out of order", n, self.input.to_string_lossy());
                    return Ok(false);
                }
            }
            previous = Some(current);
            n += 1;
        }
        Ok(true)
    }

    fn create_config(&self) -> Config {
        let config = Config::new(self.memory_budget)
            .with_tmp(self.tmp.clone())
            .with_tmp_prefix(DEFAULT_TMP_PREFIX)
            .with_write_cache_size(self.write_cache_size)
            .with_random_access_caches(self.random_access_caches)
            .with_passes(self.passes);
        match self.batch_rows {
            Some(batch_rows) => config.with_batch_rows(batch_rows),
            None => config,
        }
    }

    fn create_layout(&self) -> Result<RecordLayout, SortError> {
        if self.columns.is_empty() {
            Err(SortError::Configuration("column types are not set".to_string()))
        } else {
            Ok(RecordLayout::new(self.columns.clone()))
        }
    }

    fn create_sort_key(&self) -> SortKey {
        if self.fields.is_empty() {
            SortKey::all_columns(self.columns.len())
        } else {
            SortKey::new(self.fields.clone())
        }
    }

    fn open_reader(&self, layout: &RecordLayout) -> Result<DelimitedReader<std::io::BufReader<std::fs::File>>, anyhow::Error> {
        let reader = DelimitedReader::open(&self.input, self.field_separator, self.has_header)
            .with_context(|| format!("path: {}", self.input.to_string_lossy()))?;
        let columns = reader.meta().columns();
        if columns != 0 && columns != layout.len() {
            return Err(
                SortError::MalformedInput(
                    format!("{} has {} columns, {} column types are set", self.input.to_string_lossy(), columns, layout.len())
                ).into()
            );
        }
        Ok(reader)
    }
}
