//! In-memory tabular sheets and the record <-> row mapping

use std::fmt;

use obra_core::{EntityId, EntityKind};

use crate::{ExchangeError, ExchangeResult};

/// One spreadsheet cell
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) => write!(f, "{n}"),
        }
    }
}

/// A named table: one header row plus data rows
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
        Sheet {
            name: name.into(),
            headers,
            rows: Vec::new(),
        }
    }

    pub fn column(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }
}

/// Typed access to one data row, addressed by header name
pub struct RowReader<'a> {
    sheet: &'static str,
    /// Spreadsheet row number (header is row 1)
    row: usize,
    headers: &'a [String],
    cells: &'a [Cell],
}

impl<'a> RowReader<'a> {
    fn cell(&self, column: &str) -> &'a Cell {
        static EMPTY: Cell = Cell::Empty;
        self.headers
            .iter()
            .position(|h| h == column)
            .and_then(|i| self.cells.get(i))
            .unwrap_or(&EMPTY)
    }

    /// Text column; numbers are rendered, empty becomes `""`
    pub fn text(&self, column: &str) -> String {
        self.cell(column).to_string()
    }

    pub fn optional_text(&self, column: &str) -> Option<String> {
        match self.cell(column) {
            Cell::Empty => None,
            cell => Some(cell.to_string()),
        }
    }

    pub fn id(&self, column: &str) -> EntityId {
        EntityId::new(self.text(column))
    }

    /// Numeric column; empty reads as 0, unparsable text is an error
    pub fn number(&self, column: &'static str) -> ExchangeResult<f64> {
        match self.cell(column) {
            Cell::Empty => Ok(0.0),
            Cell::Number(n) => Ok(*n),
            Cell::Text(s) => s.trim().parse().map_err(|_| ExchangeError::InvalidNumber {
                sheet: self.sheet,
                row: self.row,
                column,
                value: s.clone(),
            }),
        }
    }

    pub fn raw(&self, column: &str) -> &'a Cell {
        self.cell(column)
    }

    pub fn invalid(&self, column: &'static str, value: impl Into<String>) -> ExchangeError {
        ExchangeError::InvalidValue {
            sheet: self.sheet,
            row: self.row,
            column,
            value: value.into(),
        }
    }
}

/// A record that maps to one sheet row
pub trait SheetRecord: Sized {
    const KIND: EntityKind;
    const HEADERS: &'static [&'static str];

    /// Cells in `HEADERS` order
    fn to_cells(&self) -> Vec<Cell>;

    fn from_row(row: &RowReader<'_>) -> ExchangeResult<Self>;
}

/// Build the sheet for a collection; headers are always written
pub fn to_sheet<T: SheetRecord>(records: &[T]) -> Sheet {
    let headers = T::HEADERS.iter().map(|h| h.to_string()).collect();
    let mut sheet = Sheet::new(T::KIND.sheet_name(), headers);
    sheet.rows = records.iter().map(T::to_cells).collect();
    sheet
}

/// Parse a collection from its sheet, skipping blank rows
pub fn from_sheet<T: SheetRecord>(sheet: &Sheet) -> ExchangeResult<Vec<T>> {
    sheet
        .rows
        .iter()
        .enumerate()
        .filter(|(_, cells)| !cells.iter().all(Cell::is_empty))
        .map(|(i, cells)| {
            let reader = RowReader {
                sheet: T::KIND.sheet_name(),
                row: i + 2,
                headers: &sheet.headers,
                cells,
            };
            T::from_row(&reader)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(headers: &[&str], rows: Vec<Vec<Cell>>) -> Sheet {
        Sheet {
            name: "Pagos".into(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows,
        }
    }

    fn reader<'a>(s: &'a Sheet, row: usize) -> RowReader<'a> {
        RowReader {
            sheet: "Pagos",
            row: row + 2,
            headers: &s.headers,
            cells: &s.rows[row],
        }
    }

    #[test]
    fn test_numbers_in_text_columns_render_plainly() {
        let s = sheet(&["fileNumber"], vec![vec![Cell::Number(1234.0)]]);
        assert_eq!(reader(&s, 0).text("fileNumber"), "1234");
    }

    #[test]
    fn test_number_coercion() {
        let s = sheet(
            &["a", "b", "c"],
            vec![vec![Cell::Text(" 250.5 ".into()), Cell::Empty, Cell::Text("mil".into())]],
        );
        let r = reader(&s, 0);
        assert_eq!(r.number("a").unwrap(), 250.5);
        assert_eq!(r.number("b").unwrap(), 0.0);
        assert_eq!(r.number("missing").unwrap(), 0.0);

        match r.number("c") {
            Err(ExchangeError::InvalidNumber { row, column, .. }) => {
                assert_eq!(row, 2);
                assert_eq!(column, "c");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_short_rows_read_as_empty() {
        let s = sheet(&["a", "b"], vec![vec![Cell::Text("x".into())]]);
        let r = reader(&s, 0);
        assert_eq!(r.optional_text("b"), None);
        assert_eq!(r.text("b"), "");
    }

    #[test]
    fn test_empty_text_becomes_empty_cell() {
        assert_eq!(Cell::text(""), Cell::Empty);
        assert_eq!(Cell::text("a"), Cell::Text("a".into()));
    }
}
