//! CSV/TSV loading with delimiter detection and dtype inference.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use super::column::{Column, parse_datetime};
use super::dtype::{DType, TimeUnit};
use super::frame::{Index, Table};
use super::value::{Label, Value};
use crate::error::{Error, Result};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Options for reading delimited text into a [`Table`].
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Whether the file has a header row.
    pub has_header: bool,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: u8,
    /// Column to use as the row index instead of `0..n`.
    pub index_column: Option<String>,
    /// Try to read ISO-like text columns as `datetime64[ns]`.
    pub parse_dates: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            max_rows: None,
            quote: b'"',
            index_column: None,
            parse_dates: false,
        }
    }
}

impl Table {
    /// Read a delimited file.
    pub fn from_csv_path(path: impl AsRef<Path>, options: &CsvOptions) -> Result<Table> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Table::from_csv_reader(file, options).map_err(|e| match e {
            Error::Io { source, .. } => Error::Io {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Read delimited text from any reader.
    pub fn from_csv_reader(mut reader: impl Read, options: &CsvOptions) -> Result<Table> {
        let mut contents = Vec::new();
        reader.read_to_end(&mut contents).map_err(|e| Error::Io {
            path: Default::default(),
            source: e,
        })?;

        let delimiter = match options.delimiter {
            Some(d) => d,
            None => detect_delimiter(&contents)?,
        };

        let (headers, rows) = read_records(&contents, delimiter, options)?;
        tracing::debug!(
            columns = headers.len(),
            rows = rows.len(),
            delimiter = %(delimiter as char).escape_default(),
            "loaded delimited text"
        );

        let mut labels = None;
        let mut columns = Vec::with_capacity(headers.len());
        for (position, name) in headers.into_iter().enumerate() {
            let cells = rows.iter().map(|row| row[position].as_str());
            if options.index_column.as_deref() == Some(name.as_str()) {
                labels = Some(Index::new(cells.map(parse_label)));
            } else {
                columns.push(build_column(name, cells, options.parse_dates));
            }
        }

        if let Some(wanted) = &options.index_column {
            if labels.is_none() {
                return Err(Error::Config(format!("index column '{wanted}' not found")));
            }
        }

        let table = Table::from_columns(columns)?;
        match labels {
            Some(index) => table.with_index(index),
            None => Ok(table),
        }
    }
}

fn read_records(
    bytes: &[u8],
    delimiter: u8,
    options: &CsvOptions,
) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(options.has_header)
        .quote(options.quote)
        .flexible(true)
        .from_reader(bytes);

    let mut records = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        if options.max_rows.is_some_and(|max| row_idx >= max) {
            break;
        }
        let record = result?;
        records.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    let headers: Vec<String> = if options.has_header {
        reader.headers()?.iter().map(str::to_string).collect()
    } else {
        let width = records.first().map(Vec::len).unwrap_or(0);
        (0..width).map(|i| format!("column_{}", i + 1)).collect()
    };

    if headers.is_empty() {
        return Err(Error::EmptyData("No columns found".to_string()));
    }

    // Pad short rows and drop surplus fields
    for row in &mut records {
        row.resize(headers.len(), String::new());
    }

    Ok((headers, records))
}

/// Check if a cell represents a missing value.
fn is_null_token(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("na")
        || trimmed.eq_ignore_ascii_case("n/a")
        || trimmed.eq_ignore_ascii_case("nan")
        || trimmed.eq_ignore_ascii_case("null")
        || trimmed.eq_ignore_ascii_case("none")
        || trimmed == "<NA>"
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

fn parse_label(value: &str) -> Label {
    value
        .trim()
        .parse::<i64>()
        .map(Label::Int)
        .unwrap_or_else(|_| Label::Str(value.to_string()))
}

/// Pick the narrowest dtype every non-null cell parses as.
fn build_column<'a>(
    name: String,
    cells: impl Iterator<Item = &'a str> + Clone,
    parse_dates: bool,
) -> Column {
    let present = cells.clone().filter(|c| !is_null_token(c));
    let has_null = cells.clone().any(is_null_token);

    if present.clone().next().is_some() {
        if present.clone().all(|c| parse_bool(c).is_some()) {
            // bool dtype has no null, a gap makes it object
            let dtype = if has_null { DType::Object } else { DType::Bool };
            let values = cells.map(|c| Value::from(parse_bool(c)));
            return Column::with_dtype(name, dtype, values);
        }
        if present.clone().all(|c| c.trim().parse::<i64>().is_ok()) {
            if !has_null {
                let values = cells.map(|c| Value::from(c.trim().parse::<i64>().ok()));
                return Column::with_dtype(name, DType::Int64, values);
            }
            let values = cells.map(|c| Value::Float(parse_float(c)));
            return Column::with_dtype(name, DType::Float64, values);
        }
        if present.clone().all(|c| c.trim().parse::<f64>().is_ok()) {
            let values = cells.map(|c| Value::Float(parse_float(c)));
            return Column::with_dtype(name, DType::Float64, values);
        }
        if parse_dates && present.clone().all(|c| parse_datetime(c.trim()).is_some()) {
            let values = cells.map(|c| Value::from(parse_datetime(c.trim())));
            return Column::with_dtype(name, DType::Datetime64(TimeUnit::Nano), values);
        }
    }

    let values = cells.map(|c| {
        if is_null_token(c) {
            Value::Null
        } else {
            Value::Str(c.to_string())
        }
    });
    Column::with_dtype(name, DType::Object, values)
}

/// Float cell, with null tokens read as `NaN`.
fn parse_float(cell: &str) -> f64 {
    if is_null_token(cell) {
        return f64::NAN;
    }
    cell.trim().parse().unwrap_or(f64::NAN)
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .lines()
        .take(10)
        .filter_map(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(Error::EmptyData("No lines to analyze".to_string()));
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        // Consistent counts across lines win; tab breaks ties
        let consistent = counts.iter().all(|&c| c == first_count);
        let score = if consistent {
            first_count * 1000 + if delim == b'\t' { 100 } else { 0 }
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Tabular;

    fn load(text: &str) -> Table {
        Table::from_csv_reader(text.as_bytes(), &CsvOptions::default()).unwrap()
    }

    #[test]
    fn test_detect_delimiter_csv() {
        let data = b"a,b,c\n1,2,3\n4,5,6";
        assert_eq!(detect_delimiter(data).unwrap(), b',');
    }

    #[test]
    fn test_detect_delimiter_tsv() {
        let data = b"a\tb\tc\n1\t2\t3\n4\t5\t6";
        assert_eq!(detect_delimiter(data).unwrap(), b'\t');
    }

    #[test]
    fn test_infers_column_dtypes() {
        let table = load("id,score,flag,name\n1,1.5,true,ann\n2,2.5,false,bob\n");
        assert_eq!(table.column("id").unwrap().dtype(), &DType::Int64);
        assert_eq!(table.column("score").unwrap().dtype(), &DType::Float64);
        assert_eq!(table.column("flag").unwrap().dtype(), &DType::Bool);
        assert_eq!(table.column("name").unwrap().dtype(), &DType::Object);
    }

    #[test]
    fn test_nulls_in_int_column_become_nan() {
        let table = load("a,b\n1,x\n,y\n3,NA\n");
        let a = table.column("a").unwrap();
        assert_eq!(a.dtype(), &DType::Float64);
        assert!(a.values()[1].is_nan());
        assert!(table.column("b").unwrap().values()[2].is_null());
    }

    #[test]
    fn test_bool_column_with_gap_keeps_flags() {
        let table = load("id,flag\n1,true\n2,\n3,false\n");
        let flag = table.column("flag").unwrap();
        assert_eq!(flag.dtype(), &DType::Object);
        assert_eq!(flag.values(), &[Value::Bool(true), Value::Null, Value::Bool(false)]);
    }

    #[test]
    fn test_inf_tokens_parse_as_float() {
        let table = load("a\n1\ninf\n-inf\n");
        let a = table.column("a").unwrap();
        assert_eq!(a.values()[1], Value::Float(f64::INFINITY));
        assert_eq!(a.values()[2], Value::Float(f64::NEG_INFINITY));
    }

    #[test]
    fn test_index_column() {
        let options = CsvOptions {
            index_column: Some("key".to_string()),
            ..CsvOptions::default()
        };
        let table = Table::from_csv_reader("key,v\nk1,1\nk2,2\n".as_bytes(), &options).unwrap();
        assert_eq!(table.column_names(), vec!["v"]);
        assert_eq!(table.index(), &Index::new(["k1", "k2"]));
    }

    #[test]
    fn test_missing_index_column() {
        let options = CsvOptions {
            index_column: Some("nope".to_string()),
            ..CsvOptions::default()
        };
        let err = Table::from_csv_reader("a\n1\n".as_bytes(), &options).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_parse_dates() {
        let options = CsvOptions {
            parse_dates: true,
            ..CsvOptions::default()
        };
        let table =
            Table::from_csv_reader("when\n2024-01-01\n2024-01-02 12:00:00\n".as_bytes(), &options)
                .unwrap();
        assert_eq!(
            table.column("when").unwrap().dtype(),
            &DType::Datetime64(TimeUnit::Nano)
        );
    }

    #[test]
    fn test_header_only_table_has_no_rows() {
        let table = load("a,b\n");
        assert_eq!(table.shape(), (0, 2));
    }
}
