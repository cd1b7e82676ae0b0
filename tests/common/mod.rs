use std::cmp::Ordering;
use std::fs;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::str::FromStr;

use data_encoding::HEXLOWER;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use table_file_sort::column_type::{Charset, ColumnType};
use table_file_sort::field::Field;
use table_file_sort::field_type::FieldType;
use table_file_sort::order::Order;

pub fn setup() {
    let results_dir_path = PathBuf::from_str("./target/results/").unwrap();

    if !results_dir_path.exists() {
        fs::create_dir_all(&results_dir_path).unwrap_or_else(|_|
            panic!("Failed to create results directory: {:?}", results_dir_path)
        );
    }
}

#[allow(dead_code)]
pub fn read_lines(path: &PathBuf) -> Result<Vec<String>, anyhow::Error> {
    let reader = BufReader::new(File::open(path)?);
    let lines = reader.lines().map(|x| x.unwrap()).collect();
    Ok(lines)
}

#[allow(dead_code)]
pub fn write_lines(path: &PathBuf, lines: &[String]) -> Result<(), anyhow::Error> {
    let mut writer = BufWriter::new(File::create(path)?);
    for line in lines {
        writeln!(writer, "{}", line)?;
    }
    writer.flush()?;
    Ok(())
}

#[allow(dead_code)]
pub fn temp_file_name(dir: &str) -> PathBuf {
    let mut result = PathBuf::from(dir);
    let name = HEXLOWER.encode(&rand::random::<[u8; 16]>());
    result.push(name);
    result
}

/// A row of the generated table: id, name, score
#[allow(dead_code)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableRow {
    pub id: i64,
    pub name: String,
    pub score: i64,
}

impl TableRow {
    #[allow(dead_code)]
    pub fn line(&self) -> String {
        format!("{},{},{}", self.id, self.name, self.score)
    }
}

/// Rows with repeated ids so that ties are broken by the score
#[allow(dead_code)]
pub fn generate_rows(count: usize, seed: u64) -> Vec<TableRow> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let name_len = rng.gen_range(1..=8);
            let name: String = (0..name_len).map(|_| rng.gen_range(b'a'..=b'z') as char).collect();
            TableRow {
                id: rng.gen_range(0..(count as i64 / 4).max(1)),
                name,
                score: rng.gen_range(-1_000_000_000_000i64..1_000_000_000_000i64),
            }
        })
        .collect()
}

#[allow(dead_code)]
pub fn table_columns() -> Vec<ColumnType> {
    vec![
        ColumnType::FixedInt64,
        ColumnType::fixed_string(8, Charset::UsAscii).unwrap(),
        ColumnType::fixed_big_int(8).unwrap(),
    ]
}

/// id ascending, then score descending
#[allow(dead_code)]
pub fn table_fields() -> Vec<Field> {
    vec![
        Field::new(0, FieldType::Integer),
        Field::new(2, FieldType::BigInteger).with_order(Order::Desc),
    ]
}

/// Stable sort matching [table_fields]
#[allow(dead_code)]
pub fn sorted_lines(rows: &[TableRow]) -> Vec<String> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| match a.id.cmp(&b.id) {
        Ordering::Equal => b.score.cmp(&a.score),
        ordering => ordering,
    });
    sorted.iter().map(|r| r.line()).collect()
}
