use std::fs::File;
use std::path::Path;

use csv::WriterBuilder;

use crate::error::InferError;
use crate::model::Table;

pub fn write_table_csv(path: &Path, table: &Table, delimiter: u8) -> Result<(), InferError> {
    let file = File::create(path)?;
    let mut writer = WriterBuilder::new().delimiter(delimiter).from_writer(file);
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn table_to_csv_string(table: &Table, delimiter: u8) -> Result<String, InferError> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::<u8>::new());
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;

    let bytes = writer
        .into_inner()
        .map_err(|error| InferError::Io(error.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}
