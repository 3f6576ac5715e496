use serde::{Deserialize, Serialize};

/// A single typed cell value from a table.
///
/// Serializes as the natural JSON scalar (`null`, string, number, bool).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Cell {
    /// Returns the text content, if this cell holds text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Renders the cell as a display string. Numbers drop a trailing `.0`,
    /// empty cells render as the empty string.
    pub fn as_string(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Bool(b) => b.to_string(),
            Cell::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            Cell::Text(s) => s.clone(),
        }
    }

    /// Numeric value; text cells are parsed leniently.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => s.trim().parse().ok(),
            Cell::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Cell::Empty => None,
        }
    }

    /// Integer value, truncating fractional parts.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_f64().map(|n| n as i64)
    }

    /// Boolean value; accepts the spreadsheet-style text forms.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Cell::Bool(b) => Some(*b),
            Cell::Number(n) => Some(*n != 0.0),
            Cell::Text(s) => match s.trim().to_ascii_uppercase().as_str() {
                "TRUE" | "SI" | "YES" | "1" => Some(true),
                "FALSE" | "NO" | "0" => Some(false),
                _ => None,
            },
            Cell::Empty => None,
        }
    }

    /// Returns true for empty cells and blank text.
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<i64> for Cell {
    fn from(n: i64) -> Self {
        Cell::Number(n as f64)
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Cell::Bool(b)
    }
}

/// An ordered sequence of cells from one table.
///
/// Cells are addressed by ordinal index resolved through a
/// [`HeaderIndex`](crate::HeaderIndex), never by hard-coded offsets.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(Vec<Cell>);

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a row sized to `len` empty cells.
    pub fn with_len(len: usize) -> Self {
        Self(vec![Cell::Empty; len])
    }

    /// Returns the cell at `index`, or `None` past the end of the row.
    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.0.get(index)
    }

    /// Returns the cell at `index`, treating positions past the end of the
    /// row as empty. Short rows are common in spreadsheet-shaped data.
    pub fn cell(&self, index: usize) -> &Cell {
        static EMPTY: Cell = Cell::Empty;
        self.0.get(index).unwrap_or(&EMPTY)
    }

    /// Sets the cell at `index`, extending the row with empty cells as
    /// needed.
    pub fn set(&mut self, index: usize, cell: Cell) {
        if index >= self.0.len() {
            self.0.resize(index + 1, Cell::Empty);
        }
        self.0[index] = cell;
    }

    /// Appends a cell.
    pub fn push(&mut self, cell: Cell) {
        self.0.push(cell);
    }

    /// Number of cells in the row.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when the row has no cells.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the cells.
    pub fn iter(&self) -> std::slice::Iter<'_, Cell> {
        self.0.iter()
    }
}

impl From<Vec<Cell>> for Row {
    fn from(cells: Vec<Cell>) -> Self {
        Self(cells)
    }
}

impl FromIterator<Cell> for Row {
    fn from_iter<I: IntoIterator<Item = Cell>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Builds a row from heterogeneous cell-convertible values.
#[macro_export]
macro_rules! row {
    ($($value:expr),* $(,)?) => {
        $crate::Row::from(vec![$($crate::Cell::from($value)),*])
    };
}
