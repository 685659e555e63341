use std::fmt::{Display, Formatter};

use crate::error::ParseError;
use crate::words::lowercase_letter;
use crate::GridCoord;

/// Character used for blocked cells in templates and rendered output.
pub const BLOCK: char = '#';

/// Character used for open cells in templates and rendered output, and as the blank marker
/// returned by `CrosswordState::text_at`.
pub const BLANK: char = ' ';

/// Alternative open-cell character accepted in templates, since trailing spaces tend to get
/// eaten by editors.
pub const ALT_BLANK: char = '.';

/// The state of a single cell in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Blocked,
    Empty,
    Letter(char),
}

impl Cell {
    pub fn is_blocked(self) -> bool {
        matches!(self, Cell::Blocked)
    }

    /// The character this cell renders as.
    pub fn as_char(self) -> char {
        match self {
            Cell::Blocked => BLOCK,
            Cell::Empty => BLANK,
            Cell::Letter(letter) => letter,
        }
    }
}

/// A rectangular grid of cells, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
    width: usize,
}

impl Grid {
    /// Build a grid from rows of cells. Short rows are padded with open cells so that the grid is
    /// always rectangular.
    pub fn new(mut rows: Vec<Vec<Cell>>) -> Grid {
        let width = rows.iter().map(|row| row.len()).max().unwrap_or(0);
        for row in &mut rows {
            row.resize(width, Cell::Empty);
        }
        Grid { rows, width }
    }

    /// Parse a grid from a template string, with # representing blocks, a space or . representing
    /// open cells, and letters representing themselves. Leading and trailing empty lines are
    /// ignored, but whitespace inside a line is significant.
    pub fn from_template(template: &str) -> Result<Grid, ParseError> {
        let lines: Vec<&str> = template.lines().map(|line| line.trim_end_matches('\r')).collect();

        let first = lines.iter().position(|line| !line.is_empty());
        let last = lines.iter().rposition(|line| !line.is_empty());
        let lines = match (first, last) {
            (Some(first), Some(last)) => &lines[first..=last],
            _ => return Err(ParseError::EmptyGrid),
        };

        let mut rows: Vec<Vec<Cell>> = Vec::with_capacity(lines.len());
        for (row, line) in lines.iter().enumerate() {
            let cells = line.chars().enumerate().map(|(col, c)| {
                match c {
                    BLOCK => Ok(Cell::Blocked),
                    BLANK | ALT_BLANK => Ok(Cell::Empty),
                    c if c.is_alphabetic() || c == '\'' => Ok(Cell::Letter(lowercase_letter(c))),
                    found => Err(ParseError::InvalidCell { row, col, found }),
                }
            }).collect::<Result<Vec<Cell>, ParseError>>()?;
            rows.push(cells);
        }

        Ok(Grid::new(rows))
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Return the cell at the given coordinates, or `None` if they're out of bounds.
    pub fn get(&self, (row, col): GridCoord) -> Option<Cell> {
        self.rows.get(row).and_then(|cells| cells.get(col)).copied()
    }

    /// Overwrite the cell at the given coordinates, returning its previous contents. Out-of-bounds
    /// coordinates are ignored.
    pub(crate) fn set(&mut self, (row, col): GridCoord, cell: Cell) -> Option<Cell> {
        let slot = self.rows.get_mut(row).and_then(|cells| cells.get_mut(col))?;
        Some(std::mem::replace(slot, cell))
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.rows.iter().map(|row| row.as_slice())
    }

    /// Iterate over a single column, top to bottom.
    pub fn column(&self, col: usize) -> impl Iterator<Item = Cell> + '_ {
        self.rows.iter().map(move |row| row[col])
    }

    /// Does any open cell remain unfilled?
    pub fn has_blanks(&self) -> bool {
        self.rows.iter().flatten().any(|&cell| cell == Cell::Empty)
    }
}

impl Display for Grid {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let rendered: Vec<String> = self.rows.iter()
            .map(|row| row.iter().map(|cell| cell.as_char()).collect())
            .collect();
        write!(f, "{}", rendered.join("\n"))
    }
}

/// Parse a file containing several grid templates separated by empty lines.
pub fn parse_grids(text: &str) -> Result<Vec<Grid>, ParseError> {
    let mut grids = vec![];
    let mut current: Vec<&str> = vec![];

    for line in text.lines().map(|line| line.trim_end_matches('\r')) {
        if line.is_empty() {
            if !current.is_empty() {
                grids.push(Grid::from_template(&current.join("\n"))?);
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        grids.push(Grid::from_template(&current.join("\n"))?);
    }

    Ok(grids)
}
