//! In-memory cell grid of a workbook sheet.

/// A single cell value as read from a sheet.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Blank text counts as empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Number(_) => false,
            Self::Text(s) => s.trim().is_empty(),
        }
    }

    /// Numeric value of the cell, accepting numeric text such as `"12.5"`.
    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            Self::Empty => return None,
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        n.is_finite().then_some(n)
    }

    /// Trimmed text used for labels and header matching.
    pub fn display(&self) -> String {
        match self {
            Self::Empty => String::new(),
            // Integers without decimals
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Self::Number(n) => format!("{n}"),
            Self::Text(s) => s.trim().to_string(),
        }
    }
}

/// One sheet: ragged rows of cells, row-major, top-left anchored at (0, 0).
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl Grid {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { name: name.into(), rows }
    }

    pub fn get(&self, row: usize, col: usize) -> &Cell {
        static EMPTY: Cell = Cell::Empty;
        self.rows.get(row).and_then(|r| r.get(col)).unwrap_or(&EMPTY)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }
}

/// Sheets of a workbook in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    pub sheets: Vec<Grid>,
}

impl Workbook {
    pub fn new(sheets: Vec<Grid>) -> Self {
        Self { sheets }
    }

    pub fn sheet(&self, name: &str) -> Option<&Grid> {
        self.sheets.iter().find(|g| g.name == name)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|g| g.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_text_parses() {
        assert_eq!(Cell::text(" 12.5 ").as_number(), Some(12.5));
        assert_eq!(Cell::text("-3").as_number(), Some(-3.0));
        assert_eq!(Cell::text("Asset").as_number(), None);
        assert_eq!(Cell::text("NaN").as_number(), None);
        assert_eq!(Cell::Empty.as_number(), None);
        assert_eq!(Cell::Number(f64::INFINITY).as_number(), None);
    }

    #[test]
    fn blank_text_is_empty() {
        assert!(Cell::text("   ").is_empty());
        assert!(!Cell::Number(0.0).is_empty());
    }

    #[test]
    fn display_formats_integers_plainly() {
        assert_eq!(Cell::Number(3.0).display(), "3");
        assert_eq!(Cell::Number(3.25).display(), "3.25");
        assert_eq!(Cell::text("  HY Total ").display(), "HY Total");
    }

    #[test]
    fn out_of_range_reads_empty() {
        let g = Grid::new("S", vec![vec![Cell::Number(1.0)]]);
        assert_eq!(g.get(0, 0), &Cell::Number(1.0));
        assert_eq!(g.get(0, 5), &Cell::Empty);
        assert_eq!(g.get(9, 0), &Cell::Empty);
    }
}
