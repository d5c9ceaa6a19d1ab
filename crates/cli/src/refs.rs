//! A1-style cell and range references.
//!
//! `B2` addresses (row 1, column 1) zero-based; `B2:D5` is an inclusive
//! rectangle. Column letters beyond Z follow the usual AA, AB, ...
//! progression.

use metagrid_engine::geometry::{CellPos, Rect};

use crate::CliError;

/// Parse a cell reference like `B2`. Returns (row, column) zero-based.
pub fn parse_cell_ref(s: &str) -> Option<(usize, usize)> {
    let s = s.trim();
    let letters: String = s.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    let digits = &s[letters.len()..];
    if letters.is_empty() || digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let column = letters
        .to_uppercase()
        .chars()
        .fold(0usize, |acc, c| acc * 26 + (c as usize - 'A' as usize + 1))
        - 1;
    let row: usize = digits.parse().ok()?;
    if row == 0 {
        return None;
    }
    Some((row - 1, column))
}

/// Parse a range like `B2:D5`, or a single cell `B2` as a 1x1 rect.
pub fn parse_range(s: &str) -> Result<Rect, CliError> {
    let bad = || CliError::args(format!("invalid range reference {:?}", s));
    match s.split_once(':') {
        Some((a, b)) => {
            let (r1, c1) = parse_cell_ref(a).ok_or_else(bad)?;
            let (r2, c2) = parse_cell_ref(b).ok_or_else(bad)?;
            Ok(Rect::from_corners(CellPos::new(r1, c1), CellPos::new(r2, c2)))
        }
        None => {
            let (row, column) = parse_cell_ref(s).ok_or_else(bad)?;
            Ok(Rect::cell(CellPos::new(row, column)))
        }
    }
}

/// Column letters for a zero-based index: 0 -> A, 25 -> Z, 26 -> AA.
pub fn col_to_letter(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}
