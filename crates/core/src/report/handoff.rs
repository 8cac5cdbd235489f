//! World handoff: a base station sends the ground-truth grid to the drone
//!
//! Layout: `rows` and `cols` as little-endian `i32`, then `rows * cols` cell
//! bytes in row-major order, [`CLEAR_CODE`] or [`FIRE_CODE`].

use crate::error::WireError;
use crate::grid::{CellState, GridWorld};
use rand::rngs::StdRng;
use std::io::{Read, Write};
use tracing::debug;

/// Byte for a clear cell
pub const CLEAR_CODE: u8 = b' ';
/// Byte for a burning cell
pub const FIRE_CODE: u8 = b'X';
/// Largest grid accepted from the wire
pub const MAX_WORLD_CELLS: usize = 1 << 24;

/// Send `grid` over `writer`
///
/// # Errors
/// Returns [`WireError::InvalidHeader`] if a dimension does not fit in an
/// `i32`, or [`WireError::Io`] on write failure.
pub fn write_world<W: Write>(writer: &mut W, grid: &GridWorld) -> Result<(), WireError> {
    let header_error = || WireError::InvalidHeader {
        rows: i32::try_from(grid.rows()).unwrap_or(i32::MAX),
        cols: i32::try_from(grid.cols()).unwrap_or(i32::MAX),
    };
    let rows = i32::try_from(grid.rows()).map_err(|_| header_error())?;
    let cols = i32::try_from(grid.cols()).map_err(|_| header_error())?;

    let mut buffer = Vec::with_capacity(8 + grid.cell_count());
    buffer.extend_from_slice(&rows.to_le_bytes());
    buffer.extend_from_slice(&cols.to_le_bytes());
    buffer.extend(grid.cells().iter().map(|cell| match cell {
        CellState::Clear => CLEAR_CODE,
        CellState::Fire => FIRE_CODE,
    }));

    writer.write_all(&buffer)?;
    writer.flush()?;
    debug!(
        "Sent {}x{} world ({} burning cells)",
        rows,
        cols,
        grid.fire_count()
    );
    Ok(())
}

/// Receive a grid from `reader`; `rng` drives its later fire spread.
///
/// # Errors
/// - [`WireError::InvalidHeader`] for non-positive or oversized dimensions
/// - [`WireError::UnknownCellCode`] for a byte that is neither code
/// - [`WireError::Io`] if the stream ends early
pub fn read_world<R: Read>(reader: &mut R, rng: StdRng) -> Result<GridWorld, WireError> {
    let mut header = [0u8; 8];
    reader.read_exact(&mut header)?;
    let raw_rows = i32::from_le_bytes([header[0], header[1], header[2], header[3]]);
    let raw_cols = i32::from_le_bytes([header[4], header[5], header[6], header[7]]);

    let invalid = WireError::InvalidHeader {
        rows: raw_rows,
        cols: raw_cols,
    };
    let (rows, cols) = match (usize::try_from(raw_rows), usize::try_from(raw_cols)) {
        (Ok(r), Ok(c)) if r > 0 && c > 0 && r.saturating_mul(c) <= MAX_WORLD_CELLS => (r, c),
        _ => return Err(invalid),
    };

    let mut bytes = vec![0u8; rows * cols];
    reader.read_exact(&mut bytes)?;

    let cells = bytes
        .iter()
        .enumerate()
        .map(|(index, &code)| match code {
            CLEAR_CODE => Ok(CellState::Clear),
            FIRE_CODE => Ok(CellState::Fire),
            _ => Err(WireError::UnknownCellCode { code, index }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let grid = GridWorld::from_cells(rows, cols, cells, rng)?;
    debug!(
        "Received {}x{} world ({} burning cells)",
        rows,
        cols,
        grid.fire_count()
    );
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Position;
    use rand::SeedableRng;
    use std::io::Cursor;

    #[test]
    fn test_handoff_layout() {
        let grid = GridWorld::from_layout("X.\n.X\n..", 1).unwrap();
        let mut bytes = Vec::new();
        write_world(&mut bytes, &grid).unwrap();

        assert_eq!(&bytes[..8], &[3, 0, 0, 0, 2, 0, 0, 0]);
        assert_eq!(&bytes[8..], b"X  X  ");

        let received = read_world(&mut Cursor::new(bytes), StdRng::seed_from_u64(2)).unwrap();
        assert_eq!(received.cells(), grid.cells());
        assert!(received.is_fire(Position::new(1, 1)));
    }

    #[test]
    fn test_rejects_bad_header() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0i32.to_le_bytes());
        bytes.extend_from_slice(&4i32.to_le_bytes());
        let result = read_world(&mut Cursor::new(bytes), StdRng::seed_from_u64(1));
        assert!(matches!(
            result,
            Err(WireError::InvalidHeader { rows: 0, cols: 4 })
        ));
    }

    #[test]
    fn test_rejects_unknown_code() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1i32.to_le_bytes());
        bytes.extend_from_slice(&2i32.to_le_bytes());
        bytes.extend_from_slice(b" ?");
        let result = read_world(&mut Cursor::new(bytes), StdRng::seed_from_u64(1));
        assert!(matches!(
            result,
            Err(WireError::UnknownCellCode {
                code: b'?',
                index: 1
            })
        ));
    }

    #[test]
    fn test_truncated_world() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&2i32.to_le_bytes());
        bytes.extend_from_slice(&2i32.to_le_bytes());
        bytes.push(CLEAR_CODE);
        let result = read_world(&mut Cursor::new(bytes), StdRng::seed_from_u64(1));
        assert!(matches!(result, Err(WireError::Io(_))));
    }
}
