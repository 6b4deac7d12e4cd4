//! Searchable, sortable view over a sheet

use std::cmp::Ordering;

use obra_core::format_currency;

use crate::{Cell, Sheet};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Filter and sort state for browsing one sheet
#[derive(Clone, Debug)]
pub struct SheetView<'a> {
    sheet: &'a Sheet,
    search: String,
    sort: Option<(usize, SortDirection)>,
}

impl<'a> SheetView<'a> {
    pub fn new(sheet: &'a Sheet) -> Self {
        SheetView {
            sheet,
            search: String::new(),
            sort: None,
        }
    }

    pub fn headers(&self) -> &'a [String] {
        &self.sheet.headers
    }

    /// Keep rows where any cell contains `term`, ignoring case
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into().to_lowercase();
    }

    /// Sort by `header`; asking twice for the same column flips to descending.
    /// Unknown headers leave the order unchanged.
    pub fn request_sort(&mut self, header: &str) {
        let Some(col) = self.sheet.column(header) else {
            return;
        };
        let direction = match self.sort {
            Some((current, SortDirection::Ascending)) if current == col => SortDirection::Descending,
            _ => SortDirection::Ascending,
        };
        self.sort = Some((col, direction));
    }

    pub fn sort(&self) -> Option<(&'a str, SortDirection)> {
        self.sort
            .map(|(col, dir)| (self.sheet.headers[col].as_str(), dir))
    }

    /// Visible rows after search and sort
    pub fn rows(&self) -> Vec<&'a [Cell]> {
        let mut rows: Vec<&'a [Cell]> = self
            .sheet
            .rows
            .iter()
            .map(Vec::as_slice)
            .filter(|cells| self.matches(cells))
            .collect();

        if let Some((col, direction)) = self.sort {
            rows.sort_by(|a, b| {
                let ord = compare_cells(a.get(col), b.get(col));
                match direction {
                    SortDirection::Ascending => ord,
                    SortDirection::Descending => ord.reverse(),
                }
            });
        }
        rows
    }

    fn matches(&self, cells: &[Cell]) -> bool {
        self.search.is_empty()
            || cells
                .iter()
                .any(|c| c.to_string().to_lowercase().contains(&self.search))
    }
}

fn rank(cell: Option<&Cell>) -> u8 {
    match cell {
        None | Some(Cell::Empty) => 0,
        Some(Cell::Number(_)) => 1,
        Some(Cell::Text(_)) => 2,
    }
}

/// Empty < numbers < text; numbers numerically, text lexically
fn compare_cells(a: Option<&Cell>, b: Option<&Cell>) -> Ordering {
    match (a, b) {
        (Some(Cell::Number(x)), Some(Cell::Number(y))) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (Some(Cell::Text(x)), Some(Cell::Text(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Display a cell the way the browse table does: large numbers as
/// currency, fractions between 0 and 1 as percentages
pub fn display_cell(cell: &Cell) -> String {
    match cell {
        Cell::Number(n) if *n > 1000.0 => format_currency(*n),
        Cell::Number(n) if *n > 0.0 && *n < 1.0 => format!("{:.1}%", n * 100.0),
        other => other.to_string(),
    }
}
