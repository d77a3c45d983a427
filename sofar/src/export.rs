//! Export raw entries as a CSV table.
//!
//! The first four columns are always `timestamp`, `latitude`, `longitude`, and `value`, followed
//! by every other field found in any entry, sorted by name. Missing and null fields are empty.

use failure::Error;
use response::Entry;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// The file name of the CSV export inside an output directory.
pub const CSV_FILE_NAME: &str = "spotter_data.csv";

const COLUMNS: [&str; 4] = ["timestamp", "latitude", "longitude", "value"];

/// Writes entries as CSV.
///
/// # Examples
///
/// ```
/// use sofar::Response;
/// let response: Response = r#"{"data": [
///     {"value": "3c543e", "latitude": 1.5, "longitude": 2, "timestamp": "t", "unit": "binary"}
/// ]}"#.parse().unwrap();
/// let mut csv = Vec::new();
/// sofar::write_csv(&mut csv, &response.data).unwrap();
/// assert_eq!(
///     "timestamp,latitude,longitude,value,unit\r\nt,1.5,2,3c543e,binary\r\n",
///     String::from_utf8(csv).unwrap()
/// );
/// ```
pub fn write_csv<W: Write>(mut writer: W, entries: &[Entry]) -> io::Result<()> {
    let extra = entries
        .iter()
        .flat_map(|entry| entry.extra.keys().map(|key| key.as_str()))
        .collect::<BTreeSet<_>>();
    let mut header = COLUMNS
        .iter()
        .map(|&column| escape(column))
        .collect::<Vec<_>>();
    header.extend(extra.iter().map(|&key| escape(key)));
    write_row(&mut writer, &header)?;
    for entry in entries {
        let mut row = vec![
            escape(&entry.timestamp),
            Cow::from(entry.latitude.to_string()),
            Cow::from(entry.longitude.to_string()),
            escape(&entry.value),
        ];
        row.extend(
            extra
                .iter()
                .map(|&key| cell(entry.extra.get(key)))
                .map(|s| Cow::from(escape(&s).into_owned())),
        );
        write_row(&mut writer, &row)?;
    }
    writer.flush()
}

/// Writes entries to the CSV file in the output directory and returns the file's path.
///
/// # Examples
///
/// ```
/// # extern crate sofar;
/// # extern crate tempfile;
/// # fn main() {
/// use sofar::Response;
/// let response = Response::from_path("fixtures/response.json").unwrap();
/// let directory = tempfile::tempdir().unwrap();
/// let path = sofar::export_csv(directory.path(), &response.data).unwrap();
/// assert!(path.ends_with("spotter_data.csv"));
/// # }
/// ```
pub fn export_csv<P: AsRef<Path>>(directory: P, entries: &[Entry]) -> Result<PathBuf, Error> {
    use std::fs::{self, File};
    use std::io::BufWriter;

    fs::create_dir_all(&directory)?;
    let path = directory.as_ref().join(CSV_FILE_NAME);
    let file = File::create(&path)?;
    write_csv(BufWriter::new(file), entries)?;
    info!("wrote {} entries to {}", entries.len(), path.display());
    Ok(path)
}

fn write_row<W: Write>(writer: &mut W, row: &[Cow<str>]) -> io::Result<()> {
    write!(writer, "{}\r\n", row.join(","))
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(&Value::Null) => String::new(),
        Some(&Value::String(ref s)) => s.clone(),
        Some(value) => value.to_string(),
    }
}

fn escape(field: &str) -> Cow<str> {
    if field.contains(|c: char| c == ',' || c == '"' || c == '\r' || c == '\n') {
        Cow::from(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::from(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use response::Response;
    use std::fs;
    use tempfile;

    #[test]
    fn fixture() {
        let response = Response::from_path("fixtures/response.json").unwrap();
        let mut csv = Vec::new();
        write_csv(&mut csv, &response.data).unwrap();
        let csv = String::from_utf8(csv).unwrap();
        let lines: Vec<&str> = csv.split("\r\n").collect();
        assert_eq!(9, lines.len());
        assert_eq!(
            "timestamp,latitude,longitude,value,data_type_name,sensorPosition,unit_type",
            lines[0]
        );
        assert_eq!(
            "2024-06-03T03:36:50.000Z,40.1,-70.5,3c535441525420494d4720333e,,1,binary",
            lines[2]
        );
        assert_eq!("", lines[8]);
    }

    #[test]
    fn missing_fields_are_empty() {
        let response: Response = r#"{"data": [
            {"value": "", "latitude": 0, "longitude": 0, "timestamp": "a", "x": 1},
            {"value": "", "latitude": 0, "longitude": 0, "timestamp": "b", "y": {"z": true}}
        ]}"#
            .parse()
            .unwrap();
        let mut csv = Vec::new();
        write_csv(&mut csv, &response.data).unwrap();
        assert_eq!(
            "timestamp,latitude,longitude,value,x,y\r\na,0,0,,1,\r\nb,0,0,,,\"{\"\"z\"\":true}\"\r\n",
            String::from_utf8(csv).unwrap()
        );
    }

    #[test]
    fn escape() {
        assert_eq!("plain", super::escape("plain"));
        assert_eq!("\"a,b\"", super::escape("a,b"));
        assert_eq!("\"say \"\"hi\"\"\"", super::escape("say \"hi\""));
        assert_eq!("\"two\nlines\"", super::escape("two\nlines"));
    }

    #[test]
    fn empty() {
        let mut csv = Vec::new();
        write_csv(&mut csv, &[]).unwrap();
        assert_eq!(
            "timestamp,latitude,longitude,value\r\n",
            String::from_utf8(csv).unwrap()
        );
    }

    #[test]
    fn export_creates_directory() {
        let directory = tempfile::tempdir().unwrap();
        let output = directory.path().join("2024-06-03_2024-06-03");
        let response = Response::from_path("fixtures/response.json").unwrap();
        let path = export_csv(&output, &response.data).unwrap();
        assert_eq!(output.join(CSV_FILE_NAME), path);
        let csv = fs::read_to_string(path).unwrap();
        assert!(csv.starts_with("timestamp,"));
    }
}
