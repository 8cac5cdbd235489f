//! ASCII rendering of the drone's map

use fire_scout_core::{MissionSnapshot, Position};
use std::fmt::Write;

/// Clear the terminal and move the cursor home
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

fn separator(out: &mut String, cols: usize) {
    out.push('+');
    for _ in 0..cols {
        out.push_str("---+");
    }
    out.push('\n');
}

/// Draw what the drone knows: `?` unseen, `D` drone, `X` fire, blank clear
pub fn render(snapshot: &MissionSnapshot<'_>) -> String {
    let grid = snapshot.grid;
    let knowledge = snapshot.knowledge;
    let mut out = String::with_capacity((grid.rows() * 2 + 3) * (grid.cols() * 4 + 2));

    for row in 0..grid.rows() {
        separator(&mut out, grid.cols());
        for col in 0..grid.cols() {
            let pos = Position::new(row, col);
            let glyph = if pos == snapshot.position {
                'D'
            } else if !knowledge.is_discovered(pos) {
                '?'
            } else if grid.is_fire(pos) {
                'X'
            } else {
                ' '
            };
            out.push_str("| ");
            out.push(glyph);
            out.push(' ');
        }
        out.push_str("|\n");
    }
    separator(&mut out, grid.cols());

    let _ = writeln!(
        out,
        "Step {} | {} | drone at {} | {}/{} cells seen",
        snapshot.steps,
        snapshot.state.name(),
        snapshot.position,
        knowledge.discovered().count(),
        grid.cell_count()
    );
    out
}
