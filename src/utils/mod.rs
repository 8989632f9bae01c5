pub mod config;
pub mod errors;

pub use config::{AppConfig, API_KEY_ENV};
pub use errors::{ErrorKind, Result, ValidatorError};

/// Stands in for `|` inside cell values so rules like `a || b` still read
/// as concatenation without adding field separators.
pub const CELL_BAR: char = '\u{a6}';

/// Collapses a spreadsheet cell into something that fits on one
/// pipe-delimited prompt line.
pub fn flatten_cell(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending_space = false;
    for c in value.chars() {
        match c {
            '\r' | '\n' => pending_space = true,
            _ => {
                if pending_space {
                    out.push(' ');
                    pending_space = false;
                }
                out.push(if c == '|' { CELL_BAR } else { c });
            }
        }
    }
    if pending_space {
        out.push(' ');
    }
    out
}
