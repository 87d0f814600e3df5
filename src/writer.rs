use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};

use log::info;
use serde::Serialize;

use crate::errors::GlucodayError;

/// Write a rendered day as a single JSON document.
pub fn write_json<T: Serialize>(file: &PathBuf, value: &T) -> Result<(), GlucodayError> {
    let output_file = File::create(file).map_err(|e| GlucodayError::WriterError { source: e })?;
    let mut output_writer = BufWriter::new(output_file);
    to_writer(&mut output_writer, value)?;
    output_writer
        .flush()
        .map_err(|e| GlucodayError::WriterError { source: e })?;
    info!("Wrote {:?}", file);
    Ok(())
}

pub fn to_writer<W: Write, T: Serialize>(writer: &mut W, value: &T) -> Result<(), GlucodayError> {
    serde_json::to_writer_pretty(&mut *writer, value)
        .map_err(|e| GlucodayError::ChartSerializeError { source: e })?;
    writeln!(writer).map_err(|e| GlucodayError::WriterError { source: e })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::LinePoint;
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    #[test]
    fn test_write_points() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("day.json");
        let points = vec![LinePoint {
            x: Utc.with_ymd_and_hms(2025, 7, 20, 1, 0, 0).unwrap(),
            y: 5.4,
        }];
        write_json(&path, &points).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written[0]["y"], 5.4);
        assert_eq!(written[0]["x"], "2025-07-20T01:00:00Z");
    }

    #[test]
    fn test_write_to_missing_directory() {
        let path = PathBuf::from("/definitely/not/here/day.json");
        assert!(matches!(
            write_json(&path, &Vec::<LinePoint>::new()),
            Err(GlucodayError::WriterError { .. })
        ));
    }
}
