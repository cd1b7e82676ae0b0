use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Error;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use simple_logger::SimpleLogger;

use table_file_sort::column_type::{Charset, ColumnType};
use table_file_sort::field::Field;
use table_file_sort::field_type::FieldType;
use table_file_sort::order::Order;
use table_file_sort::sort::Sort;
use table_file_sort::strategy::Strategy;

use tikv_jemallocator::Jemalloc;
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

fn create_table(path: &Path, rows: usize) -> Result<(), Error> {
    let mut rng = StdRng::seed_from_u64(1000);
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "id,name,score")?;
    for _ in 0..rows {
        let name_len = rng.gen_range(1..=12);
        let name: String = (0..name_len).map(|_| rng.gen_range(b'a'..=b'z') as char).collect();
        writeln!(writer, "{},{},{}", rng.gen_range(0..100), name, rng.gen_range(-1_000_000i64..1_000_000i64))?;
    }
    writer.flush()?;
    Ok(())
}

fn table_sort(input_path: &Path, output_path: &Path) -> Result<Sort, Error> {
    let mut table_file = Sort::new(input_path.to_path_buf(), output_path.to_path_buf());
    table_file.with_header(true);
    table_file.with_columns(vec![
        ColumnType::FixedInt32,
        ColumnType::fixed_string(12, Charset::UsAscii)?,
        ColumnType::fixed_big_int(4)?,
    ]);
    Ok(table_file)
}

fn sort_by_id_and_score(input_path: &Path, output_path: &Path) -> Result<(), Error> {
    let mut table_file = table_sort(input_path, output_path)?;
    table_file.add_field(Field::new(0, FieldType::Integer));
    table_file.add_field(Field::new(2, FieldType::BigInteger).with_order(Order::Desc));
    table_file.sort()?;
    Ok(())
}

fn sort_by_name(input_path: &Path, output_path: &Path) -> Result<(), Error> {
    let mut table_file = table_sort(input_path, output_path)?;
    table_file.add_field(Field::new(1, FieldType::String));
    // only the name column is encoded, lines are copied from the input
    table_file.with_strategy(Strategy::IndexPermute);
    table_file.sort()?;
    Ok(())
}

fn sort_columns(input_path: &Path, output_path: &Path) -> Result<(), Error> {
    // without fields all columns are compared as strings
    let table_file = table_sort(input_path, output_path)?;
    table_file.sort()?;
    Ok(())
}

// cargo run -r --example sort_table_file
pub fn main() -> Result<(), Error> {
    SimpleLogger::new().with_level(log::LevelFilter::Info).init()?;
    let input_path = PathBuf::from("./target/table-10000.csv");
    let by_id_path = PathBuf::from("./target/by-id-10000.csv");
    let by_name_path = PathBuf::from("./target/by-name-10000.csv");
    let columns_path = PathBuf::from("./target/columns-10000.csv");

    create_table(&input_path, 10_000)?;
    sort_by_id_and_score(&input_path, &by_id_path)?;
    sort_by_name(&input_path, &by_name_path)?;
    sort_columns(&input_path, &columns_path)?;

    let mut check = table_sort(&by_id_path, &PathBuf::new())?;
    check.add_field(Field::new(0, FieldType::Integer));
    log::info!("{} is sorted by id: {}", by_id_path.to_string_lossy(), check.check()?);
    Ok(())
}
