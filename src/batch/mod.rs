//! Tabular input/output for batch runs.
//!
//! Addresses are read from one named column of a CSV file with a header row.
//! The output repeats every input row and appends `Is_Valid` and
//! `Validation_Message`.

mod error;

pub use error::BatchError;

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, WriterBuilder};

use crate::verify::BatchReport;

pub const VALID_COLUMN: &str = "Is_Valid";
pub const MESSAGE_COLUMN: &str = "Validation_Message";

/// Rows of an input sheet plus the index of the address column.
#[derive(Debug, Clone)]
pub struct AddressSheet {
    headers: StringRecord,
    rows: Vec<StringRecord>,
    column: usize,
}

impl AddressSheet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Trimmed cell of the address column for every row. Blank cells are kept
    /// so results stay aligned with rows.
    pub fn addresses(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.get(self.column).unwrap_or("").trim().to_string())
            .collect()
    }
}

/// Parse CSV data and locate `column` among its headers.
pub fn read_sheet<R: io::Read>(reader: R, column: &str) -> Result<AddressSheet, BatchError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();
    let index = headers
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| BatchError::MissingColumn {
            column: column.to_string(),
            available: headers.iter().collect::<Vec<_>>().join(", "),
        })?;

    let rows = rdr.records().collect::<Result<Vec<_>, _>>()?;
    Ok(AddressSheet {
        headers,
        rows,
        column: index,
    })
}

pub fn read_sheet_path(path: impl AsRef<Path>, column: &str) -> Result<AddressSheet, BatchError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|err| BatchError::open(path, err))?;
    read_sheet(io::BufReader::new(file), column)
}

/// Write `sheet` with the verdict columns appended, one result per row.
pub fn write_sheet<W: io::Write>(
    writer: W,
    sheet: &AddressSheet,
    report: &BatchReport,
) -> Result<(), BatchError> {
    if sheet.len() != report.len() {
        return Err(BatchError::RowMismatch {
            rows: sheet.len(),
            results: report.len(),
        });
    }

    let mut wtr = WriterBuilder::new().flexible(true).from_writer(writer);
    let mut header = sheet.headers.clone();
    header.push_field(VALID_COLUMN);
    header.push_field(MESSAGE_COLUMN);
    wtr.write_record(&header)?;

    for (row, result) in sheet.rows.iter().zip(report) {
        let mut record = row.clone();
        record.push_field(if result.is_valid { "true" } else { "false" });
        record.push_field(&result.message);
        wtr.write_record(&record)?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Like [`write_sheet`], but replaces `path` atomically: data goes to a
/// sibling `.tmp` file which is then renamed.
pub fn write_sheet_path(
    path: impl AsRef<Path>,
    sheet: &AddressSheet,
    report: &BatchReport,
) -> Result<(), BatchError> {
    let path = path.as_ref();
    let mut buf = Vec::new();
    write_sheet(&mut buf, sheet, report)?;
    write_all_atomically(path, &buf).map_err(|err| BatchError::write(path, err))
}

fn write_all_atomically(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp = tmp_path(path);
    {
        let mut f = File::create(&tmp)?;
        f.write_all(bytes)?;
        f.sync_all()?;
    }
    fs::rename(&tmp, path)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
