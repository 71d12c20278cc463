//! Plain-text rendering of grids and dependency listings

use scriptsheet_core::{CellAddress, Grid, Snapshot, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

/// Draw a grid snapshot as a bordered table
///
/// Columns are headed by their letters and rows by their 1-based number.
/// Numbers are right-aligned, text and errors left-aligned.
///
/// ```text
/// +---+---+---+
/// |   | A | B |
/// +---+---+---+
/// | 1 | 3 | 2 |
/// | 2 | 5 |   |
/// +---+---+---+
/// ```
pub fn render_table(snapshot: &Snapshot) -> String {
    let mut headers = vec![String::new()];
    headers.extend((0..snapshot.cols()).map(CellAddress::column_to_letters));

    let rows: Vec<Vec<(String, Align)>> = snapshot
        .iter_rows()
        .enumerate()
        .map(|(row, values)| {
            let mut line = vec![((row + 1).to_string(), Align::Right)];
            line.extend(values.iter().map(|value| {
                let align = match value {
                    Value::Number(_) => Align::Right,
                    _ => Align::Left,
                };
                (value.to_string(), align)
            }));
            line
        })
        .collect();

    draw(&headers, &rows)
}

/// List every cell that has a formula or takes part in a link
///
/// One row per cell: its label, then the cells it reads and the cells
/// reading it. An unlinked grid renders as a single line saying so.
pub fn render_dependencies(grid: &Grid) -> String {
    let rows: Vec<Vec<(String, Align)>> = grid
        .linked_cells()
        .map(|cell| {
            vec![
                (cell.label(), Align::Left),
                (join(&cell.parents()), Align::Left),
                (join(&cell.children()), Align::Left),
            ]
        })
        .collect();

    if rows.is_empty() {
        return "No dependencies\n".to_string();
    }

    let headers = ["cell", "parents", "children"].map(String::from);
    draw(&headers, &rows)
}

fn join(addrs: &[CellAddress]) -> String {
    if addrs.is_empty() {
        return "-".to_string();
    }
    addrs
        .iter()
        .map(CellAddress::to_a1_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn draw(headers: &[String], rows: &[Vec<(String, Align)>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, (text, _)) in widths.iter_mut().zip(row) {
            *width = (*width).max(text.chars().count());
        }
    }

    let border = {
        let mut line = String::from("+");
        for width in &widths {
            line.push_str(&"-".repeat(width + 2));
            line.push('+');
        }
        line.push('\n');
        line
    };

    let mut out = border.clone();
    let header_cells: Vec<(String, Align)> = headers
        .iter()
        .map(|h| (h.clone(), Align::Left))
        .collect();
    push_row(&mut out, &header_cells, &widths);
    out.push_str(&border);
    for row in rows {
        push_row(&mut out, row, &widths);
    }
    out.push_str(&border);
    out
}

fn push_row(out: &mut String, cells: &[(String, Align)], widths: &[usize]) {
    out.push('|');
    for ((text, align), width) in cells.iter().zip(widths) {
        let cell = match align {
            Align::Left => format!(" {:<width$} |", text, width = width),
            Align::Right => format!(" {:>width$} |", text, width = width),
        };
        out.push_str(&cell);
    }
    out.push('\n');
}
