use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use ndarray::Array2;

use super::error::{LoadError, Result};

/// Calendar columns every timestamped LOCATA table carries, in order.
pub const TIME_COLUMNS: [&str; 6] = ["year", "month", "day", "hour", "minute", "second"];

// ---------------------------------------------------------------------------
// Table – a tab-delimited text file with a header row
// ---------------------------------------------------------------------------

/// A fully read tab-delimited table. Cells are kept as text and parsed per
/// column on demand.
#[derive(Debug, Clone)]
pub struct Table {
    path: PathBuf,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

fn tsv_reader(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })
}

impl Table {
    /// Read a whole table. Every data row must have as many fields as the header.
    pub fn read(path: &Path) -> Result<Self> {
        let mut reader = tsv_reader(path)?;
        let csv_err = |source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        };

        let headers: Vec<String> = reader
            .headers()
            .map_err(csv_err)?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let mut rows = Vec::new();
        for (row_no, result) in reader.records().enumerate() {
            let record = result.map_err(csv_err)?;
            if record.len() != headers.len() {
                return Err(LoadError::RaggedTable {
                    path: path.to_path_buf(),
                    row: row_no,
                    expected: headers.len(),
                    found: record.len(),
                });
            }
            rows.push(record.iter().map(|c| c.to_string()).collect());
        }

        Ok(Table {
            path: path.to_path_buf(),
            headers,
            rows,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| LoadError::MissingColumn {
                path: self.path.clone(),
                column: name.to_string(),
            })
    }

    fn parse_error(&self, row: usize, column: &str, value: &str) -> LoadError {
        LoadError::Parse {
            path: self.path.clone(),
            row,
            column: column.to_string(),
            value: value.to_string(),
        }
    }

    pub fn f64_column(&self, name: &str) -> Result<Vec<f64>> {
        let idx = self.column_index(name)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(row, cells)| {
                let cell = &cells[idx];
                cell.parse::<f64>()
                    .map_err(|_| self.parse_error(row, name, cell))
            })
            .collect()
    }

    /// Integer column. Integral floats such as `2017.0` are accepted.
    pub fn i64_column(&self, name: &str) -> Result<Vec<i64>> {
        let idx = self.column_index(name)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(row, cells)| {
                let cell = &cells[idx];
                parse_integer(cell).ok_or_else(|| self.parse_error(row, name, cell))
            })
            .collect()
    }

    /// Boolean column: `true`/`false` in any case, or a number where
    /// non-zero means `true`.
    pub fn bool_column(&self, name: &str) -> Result<Vec<bool>> {
        let idx = self.column_index(name)?;
        self.rows
            .iter()
            .enumerate()
            .map(|(row, cells)| {
                let cell = &cells[idx];
                parse_flag(cell).ok_or_else(|| self.parse_error(row, name, cell))
            })
            .collect()
    }

    /// Gather `names` into a `names.len() x rows` matrix. Names may repeat.
    pub fn matrix(&self, names: &[&str]) -> Result<Array2<f64>> {
        let columns = names
            .iter()
            .map(|name| self.f64_column(name))
            .collect::<Result<Vec<_>>>()?;
        Ok(Array2::from_shape_fn((names.len(), self.len()), |(i, r)| {
            columns[i][r]
        }))
    }

    /// Combine the six calendar columns into one timestamp per row. The
    /// `second` column may carry a fractional part.
    pub fn timestamps(&self) -> Result<Vec<NaiveDateTime>> {
        let year = self.i64_column(TIME_COLUMNS[0])?;
        let month = self.i64_column(TIME_COLUMNS[1])?;
        let day = self.i64_column(TIME_COLUMNS[2])?;
        let hour = self.i64_column(TIME_COLUMNS[3])?;
        let minute = self.i64_column(TIME_COLUMNS[4])?;
        let second = self.f64_column(TIME_COLUMNS[5])?;

        (0..self.len())
            .map(|row| {
                compose_timestamp(year[row], month[row], day[row], hour[row], minute[row], second[row])
                    .ok_or_else(|| LoadError::InvalidTimestamp {
                        path: self.path.clone(),
                        row,
                    })
            })
            .collect()
    }
}

fn parse_integer(s: &str) -> Option<i64> {
    if let Ok(i) = s.parse::<i64>() {
        return Some(i);
    }
    let f = s.parse::<f64>().ok()?;
    (f.is_finite() && f.fract() == 0.0).then_some(f as i64)
}

fn parse_flag(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        return Some(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return Some(false);
    }
    s.parse::<f64>().ok().map(|v| v != 0.0)
}

fn compose_timestamp(
    year: i64,
    month: i64,
    day: i64,
    hour: i64,
    minute: i64,
    second: f64,
) -> Option<NaiveDateTime> {
    if !(0.0..60.0).contains(&second) {
        return None;
    }
    let whole = second.trunc();
    let nanos = ((second - whole) * 1e9).round().min(999_999_999.0);

    let date = NaiveDate::from_ymd_opt(
        i32::try_from(year).ok()?,
        u32::try_from(month).ok()?,
        u32::try_from(day).ok()?,
    )?;
    date.and_hms_nano_opt(
        u32::try_from(hour).ok()?,
        u32::try_from(minute).ok()?,
        whole as u32,
        nanos as u32,
    )
}

// ---------------------------------------------------------------------------
// Numeric tables
// ---------------------------------------------------------------------------

/// Read an all-numeric tab-delimited table, skipping its header row, and
/// return it transposed: one row per field, one column per data row.
pub fn read_numeric_table(path: &Path) -> Result<Array2<f64>> {
    let table = Table::read(path)?;
    let fields = table.headers().len();

    let mut rows: Vec<Vec<f64>> = Vec::with_capacity(table.len());
    for (row, cells) in table.rows.iter().enumerate() {
        let values = cells
            .iter()
            .enumerate()
            .map(|(col, cell)| {
                cell.parse::<f64>()
                    .map_err(|_| table.parse_error(row, &table.headers[col], cell))
            })
            .collect::<Result<Vec<_>>>()?;
        rows.push(values);
    }

    Ok(Array2::from_shape_fn((fields, rows.len()), |(f, r)| rows[r][f]))
}
