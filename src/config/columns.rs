// src/config/columns.rs

use crate::error::{Error, Result};

/// Convert a spreadsheet column letter (`A`, `R`, `AE`, ...) into a 0-based index.
pub fn column_letter_to_index(letter: &str) -> Result<usize> {
    let trimmed = letter.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(Error::Configuration(format!(
            "invalid column letter {:?}",
            letter
        )));
    }

    let mut index: usize = 0;
    for c in trimmed.chars().map(|c| c.to_ascii_uppercase()) {
        index = index
            .checked_mul(26)
            .and_then(|i| i.checked_add((c as u8 - b'A') as usize + 1))
            .ok_or_else(|| Error::Configuration(format!("column letter {:?} too large", letter)))?;
    }
    Ok(index - 1)
}

/// Inverse of [`column_letter_to_index`]; used for diagnostics.
pub fn column_index_to_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut out = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    out.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_map_to_indices() {
        assert_eq!(column_letter_to_index("A").unwrap(), 0);
        assert_eq!(column_letter_to_index("r").unwrap(), 17);
        assert_eq!(column_letter_to_index("Z").unwrap(), 25);
        assert_eq!(column_letter_to_index("AA").unwrap(), 26);
        assert_eq!(column_letter_to_index("AE").unwrap(), 30);
        assert_eq!(column_letter_to_index("BD").unwrap(), 55);
    }

    #[test]
    fn indices_map_back_to_letters() {
        for letter in ["A", "B", "Z", "AA", "AI", "AP", "BC", "ZZ", "AAA"] {
            let idx = column_letter_to_index(letter).unwrap();
            assert_eq!(column_index_to_letter(idx), letter);
        }
    }

    #[test]
    fn rejects_non_letters() {
        for bad in ["", "  ", "A1", "7", "A-B"] {
            let err = column_letter_to_index(bad).unwrap_err();
            assert!(matches!(err, Error::Configuration(_)), "{bad:?}");
        }
    }
}
