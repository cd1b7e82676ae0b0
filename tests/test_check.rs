use std::fs;
use std::path::PathBuf;

use table_file_sort::field::Field;
use table_file_sort::field_type::FieldType;
use table_file_sort::order::Order;
use table_file_sort::sort::Sort;

mod common;

fn check(input_path: &PathBuf, fields: Vec<Field>) -> Result<bool, anyhow::Error> {
    let mut table_file_sort = Sort::new(input_path.clone(), PathBuf::new());
    table_file_sort.with_columns(common::table_columns());
    table_file_sort.with_fields(fields);
    table_file_sort.check()
}

#[test]
fn test_check_sorted() -> Result<(), anyhow::Error> {
    common::setup();
    let rows = common::generate_rows(1000, 5);
    let input_path = common::temp_file_name("./target/results/");
    common::write_lines(&input_path, &common::sorted_lines(&rows))?;

    assert!(check(&input_path, common::table_fields())?);
    // sorted by id alone as well
    assert!(check(&input_path, vec![Field::new(0, FieldType::Integer)])?);
    fs::remove_file(input_path)?;
    Ok(())
}

#[test]
fn test_check_sorted_desc() -> Result<(), anyhow::Error> {
    common::setup();
    let rows = common::generate_rows(1000, 5);
    let mut lines = common::sorted_lines(&rows);
    lines.reverse();
    let input_path = common::temp_file_name("./target/results/");
    common::write_lines(&input_path, &lines)?;

    let fields = vec![
        Field::new(0, FieldType::Integer).with_order(Order::Desc),
        Field::new(2, FieldType::BigInteger),
    ];
    assert!(check(&input_path, fields)?);
    assert!(!check(&input_path, common::table_fields())?);
    fs::remove_file(input_path)?;
    Ok(())
}

#[test]
fn test_check_not_sorted() -> Result<(), anyhow::Error> {
    common::setup();
    let rows = common::generate_rows(1000, 5);
    let input_path = common::temp_file_name("./target/results/");
    common::write_lines(&input_path, &rows.iter().map(|r| r.line()).collect::<Vec<String>>())?;

    assert!(!check(&input_path, common::table_fields())?);
    fs::remove_file(input_path)?;
    Ok(())
}

#[test]
fn test_check_numeric_not_lexicographic() -> Result<(), anyhow::Error> {
    let tmp = tempfile::tempdir()?;
    let input_path = tmp.path().join("input.csv");
    fs::write(&input_path, "9,a,1\n10,b,2\n")?;
    assert!(check(&input_path, vec![Field::new(0, FieldType::Integer)])?);
    assert!(!check(&input_path, vec![Field::new(0, FieldType::String)])?);
    Ok(())
}
