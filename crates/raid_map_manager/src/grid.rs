use raid_core::Vector2;

pub const DEFAULT_GRID_SIZE: u32 = 100;
/// sizes offered by the grid overlay
pub const GRID_SIZES: [u32; 3] = [50, 100, 200];

/// Square grid laid over the map. Cells are named by a row letter and a 1-based column, `A1` is top left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridReference {
    cell_size: u32,
}

impl Default for GridReference {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_GRID_SIZE,
        }
    }
}

impl GridReference {
    /// a zero size falls back to the default grid
    pub fn new(cell_size: u32) -> Self {
        if cell_size == 0 {
            return Self::default();
        }
        Self { cell_size }
    }

    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    /// Positions left or above the map count as the first row or column.
    /// Rows past `Z` continue as `AA`, `AB`, ...
    pub fn to_grid(&self, position: Vector2) -> String {
        let size = f64::from(self.cell_size);
        let column = (position.x() / size).floor().max(0.0) as u64;
        let row = (position.y() / size).floor().max(0.0) as u64;
        format!("{}{}", row_letters(row), column.saturating_add(1))
    }

    /// Centre of the named cell. Anything that is not letters followed by a positive number gives the origin.
    pub fn from_grid(&self, cell: &str) -> Vector2 {
        let cell = cell.trim();
        let split = cell
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(cell.len());
        let (letters, number) = cell.split_at(split);
        let (Some(row), Ok(column @ 1..)) = (row_index(letters), number.parse::<u64>()) else {
            return Vector2::ZERO;
        };
        let size = f64::from(self.cell_size);
        Vector2::new(
            (column - 1) as f64 * size + size / 2.0,
            row as f64 * size + size / 2.0,
        )
    }
}

/// `0 -> A`, `25 -> Z`, `26 -> AA`
fn row_letters(row: u64) -> String {
    let mut n = u128::from(row) + 1;
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    letters.iter().rev().map(|&b| char::from(b)).collect()
}

fn row_index(letters: &str) -> Option<u64> {
    if letters.is_empty() {
        return None;
    }
    letters
        .bytes()
        .try_fold(0u64, |acc, b| {
            let digit = u64::from(b.to_ascii_uppercase() - b'A') + 1;
            acc.checked_mul(26)?.checked_add(digit)
        })
        .map(|n| n - 1)
}
