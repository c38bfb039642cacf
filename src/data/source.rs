use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use crate::config::Delimiter;
use crate::error::{ConvertError, Result};

use super::model::SourceRecord;

/// One pass over a source.
pub type Records<'a> = Box<dyn Iterator<Item = Result<SourceRecord>> + 'a>;

// ---------------------------------------------------------------------------
// RecordSource – where rows come from
// ---------------------------------------------------------------------------

/// A finite sequence of rows that can be walked one or more times.
///
/// Each call to [`RecordSource::open`] starts a new pass from the first row.
pub trait RecordSource {
    /// Start a pass.
    fn open(&mut self) -> Result<Records<'_>>;

    /// Input size in bytes, if known, for progress reporting.
    fn total_bytes(&self) -> Option<u64> {
        None
    }

    /// Whether more than one pass is possible.
    fn restartable(&self) -> bool {
        true
    }
}

fn csv_reader<R: Read>(reader: R, delimiter: Delimiter) -> csv::Reader<R> {
    // Headers are handled by the pipeline; row width by the layout.
    csv::ReaderBuilder::new()
        .delimiter(delimiter.as_byte())
        .has_headers(false)
        .flexible(true)
        .from_reader(reader)
}

fn to_source_record(record: csv::StringRecord) -> SourceRecord {
    let (line, byte) = record
        .position()
        .map(|pos| (pos.line(), pos.byte()))
        .unwrap_or((0, 0));
    SourceRecord::new(line, byte, record.iter().map(str::to_string).collect())
}

fn records_of<R: Read + 'static>(reader: csv::Reader<R>) -> Records<'static> {
    Box::new(
        reader
            .into_records()
            .map(|result| result.map(to_source_record).map_err(ConvertError::from)),
    )
}

// ---------------------------------------------------------------------------
// CsvSource – a file, reopened for every pass
// ---------------------------------------------------------------------------

/// Delimited text file on disk.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    delimiter: Delimiter,
    total_bytes: Option<u64>,
}

impl CsvSource {
    pub fn open_path(path: &Path, delimiter: Delimiter) -> Result<Self> {
        let metadata = std::fs::metadata(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            delimiter,
            total_bytes: Some(metadata.len()),
        })
    }
}

impl RecordSource for CsvSource {
    fn open(&mut self) -> Result<Records<'_>> {
        let file = File::open(&self.path)?;
        Ok(records_of(csv_reader(BufReader::new(file), self.delimiter)))
    }

    fn total_bytes(&self) -> Option<u64> {
        self.total_bytes
    }
}

// ---------------------------------------------------------------------------
// StreamSource – a reader that can only be walked once
// ---------------------------------------------------------------------------

/// One-shot source such as stdin. A second `open` fails.
pub struct StreamSource {
    reader: Option<csv::Reader<Box<dyn Read>>>,
}

impl StreamSource {
    pub fn new(reader: Box<dyn Read>, delimiter: Delimiter) -> Self {
        Self {
            reader: Some(csv_reader(reader, delimiter)),
        }
    }
}

impl RecordSource for StreamSource {
    fn open(&mut self) -> Result<Records<'_>> {
        let reader = self.reader.take().ok_or(ConvertError::SourceExhausted)?;
        Ok(records_of(reader))
    }

    fn restartable(&self) -> bool {
        false
    }
}

// ---------------------------------------------------------------------------
// MemorySource – rows held in memory
// ---------------------------------------------------------------------------

/// Rows buffered in memory; any number of passes.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: Vec<SourceRecord>,
    total_bytes: Option<u64>,
}

impl MemorySource {
    pub fn new(records: Vec<SourceRecord>) -> Self {
        Self {
            records,
            total_bytes: None,
        }
    }

    /// Read a whole delimited stream into memory.
    pub fn from_reader<R: Read>(reader: R, delimiter: Delimiter) -> Result<Self> {
        let mut csv = csv_reader(reader, delimiter);
        let records = csv
            .records()
            .map(|result| result.map(to_source_record))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let total_bytes = Some(csv.position().byte());
        Ok(Self {
            records,
            total_bytes,
        })
    }

    /// Rows from string slices; line numbers start at 1.
    pub fn from_rows(rows: &[&[&str]]) -> Self {
        Self::new(
            rows.iter()
                .zip(1..)
                .map(|(row, line)| SourceRecord::from_strs(line, row))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordSource for MemorySource {
    fn open(&mut self) -> Result<Records<'_>> {
        Ok(Box::new(self.records.iter().cloned().map(Ok::<_, ConvertError>)))
    }

    fn total_bytes(&self) -> Option<u64> {
        self.total_bytes
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};

    use super::*;

    fn collect(source: &mut dyn RecordSource) -> Vec<Vec<String>> {
        source
            .open()
            .unwrap()
            .map(|r| r.unwrap().fields)
            .collect()
    }

    #[test]
    fn file_source_can_be_read_twice() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "1,red,3.5\n0,\"blue, dark\",1\n").unwrap();

        let mut source = CsvSource::open_path(file.path(), Delimiter::Comma).unwrap();
        let first = collect(&mut source);
        let second = collect(&mut source);
        assert_eq!(first, second);
        assert_eq!(first[1], vec!["0", "blue, dark", "1"]);
        assert!(source.total_bytes().unwrap() > 0);
    }

    #[test]
    fn records_carry_line_numbers() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "a\tb\nc\td\n").unwrap();

        let mut source = CsvSource::open_path(file.path(), Delimiter::Tab).unwrap();
        let records: Vec<SourceRecord> = source.open().unwrap().map(|r| r.unwrap()).collect();
        assert_eq!(records[0].line, 1);
        assert_eq!(records[1].line, 2);
        assert_eq!(records[1].byte_offset, 4);
        assert_eq!(records[1].fields, vec!["c", "d"]);
    }

    #[test]
    fn ragged_rows_are_passed_through() {
        let mut source =
            MemorySource::from_reader(Cursor::new("a,b\nc\n"), Delimiter::Comma).unwrap();
        let rows = collect(&mut source);
        assert_eq!(rows, vec![vec!["a", "b"], vec!["c"]]);
        assert!(source.total_bytes().is_some());
    }

    #[test]
    fn stream_source_is_one_shot() {
        let mut source = StreamSource::new(Box::new(Cursor::new("a,b\n")), Delimiter::Comma);
        assert!(!source.restartable());
        assert_eq!(collect(&mut source), vec![vec!["a", "b"]]);
        assert!(matches!(source.open(), Err(ConvertError::SourceExhausted)));
    }

    #[test]
    fn memory_source_numbers_rows() {
        let mut source = MemorySource::from_rows(&[&["1", "x"], &["0", "y"]]);
        let records: Vec<SourceRecord> = source.open().unwrap().map(|r| r.unwrap()).collect();
        assert_eq!(records[1], SourceRecord::from_strs(2, &["0", "y"]));
        assert_eq!(source.len(), 2);
    }
}
