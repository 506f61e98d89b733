//! Text to braille cells
//!
//! Translation tables are pluggable: anything implementing
//! [`Grade1Translator`] and [`Grade2Translator`] can back [`BrailleText`].
//! [`Alphabet`] is a small built-in table (letters, digits, space) with no
//! contractions.

use braille_protocol::{Cell, Grid};

use crate::dispatch::Grade;

/// Letter-by-letter translation
pub trait Grade1Translator {
    fn translate(&self, text: &str) -> Vec<Cell>;
}

/// Contracted translation, one cell sequence per word
pub trait Grade2Translator {
    fn translate_words(&self, text: &str) -> Vec<Vec<Cell>>;
}

/// Turns captured text into a display grid
#[derive(Debug, Clone, Default)]
pub struct BrailleText<G1 = Alphabet, G2 = Alphabet> {
    grade1: G1,
    grade2: G2,
}

impl<G1, G2> BrailleText<G1, G2>
where
    G1: Grade1Translator,
    G2: Grade2Translator,
{
    pub fn new(grade1: G1, grade2: G2) -> Self {
        Self { grade1, grade2 }
    }

    /// Cells for `text` before fitting them to the grid
    ///
    /// Grade 2 output gets a blank cell after every word.
    pub fn cells(&self, text: &str, grade: Grade) -> Vec<Cell> {
        match grade {
            Grade::One => self.grade1.translate(text),
            Grade::Two => self
                .grade2
                .translate_words(text)
                .into_iter()
                .flat_map(|word| word.into_iter().chain(std::iter::once(Cell::BLANK)))
                .collect(),
        }
    }

    /// Grid for `text`: excess cells are cut off, a short result is padded
    pub fn encode(&self, text: &str, grade: Grade) -> Grid {
        Grid::from_cells_padded(self.cells(text, grade))
    }
}

const NUMBER_SIGN: Cell = Cell::from_mask(0x3c);

/// Letters a-j; k-t add dot 3, u-z (except w) add dots 3 and 6
const FIRST_DECADE: [u8; 10] = [0x01, 0x03, 0x09, 0x19, 0x11, 0x0b, 0x1b, 0x13, 0x0a, 0x1a];

/// Uncontracted letters, digits and spaces
///
/// Case is ignored, digit runs start with the number sign, and other
/// characters are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct Alphabet;

impl Alphabet {
    /// Cell for a lowercase letter
    pub fn letter(c: char) -> Option<Cell> {
        let mask = match c {
            'a'..='j' => FIRST_DECADE[c as usize - 'a' as usize],
            'k'..='t' => FIRST_DECADE[c as usize - 'k' as usize] | 0x04,
            'w' => 0x3a,
            'u' | 'v' => FIRST_DECADE[c as usize - 'u' as usize] | 0x24,
            'x'..='z' => FIRST_DECADE[c as usize - 'x' as usize + 2] | 0x24,
            _ => return None,
        };
        Some(Cell::from_mask(mask))
    }

    /// Cell for a digit (without the number sign)
    pub fn digit(c: char) -> Option<Cell> {
        let value = c.to_digit(10)? as usize;
        // 1-9 are a-i, 0 is j
        let index = if value == 0 { 9 } else { value - 1 };
        Some(Cell::from_mask(FIRST_DECADE[index]))
    }

    fn push_word(out: &mut Vec<Cell>, word: &str) {
        let mut in_number = false;
        for c in word.chars().map(|c| c.to_ascii_lowercase()) {
            if let Some(cell) = Self::digit(c) {
                if !in_number {
                    out.push(NUMBER_SIGN);
                    in_number = true;
                }
                out.push(cell);
            } else if let Some(cell) = Self::letter(c) {
                in_number = false;
                out.push(cell);
            } else {
                in_number = false;
            }
        }
    }
}

impl Grade1Translator for Alphabet {
    fn translate(&self, text: &str) -> Vec<Cell> {
        let mut out = Vec::new();
        for (i, word) in text.split(' ').enumerate() {
            if i > 0 {
                out.push(Cell::BLANK);
            }
            Self::push_word(&mut out, word);
        }
        out
    }
}

impl Grade2Translator for Alphabet {
    fn translate_words(&self, text: &str) -> Vec<Vec<Cell>> {
        text.split_whitespace()
            .map(|word| {
                let mut cells = Vec::new();
                Self::push_word(&mut cells, word);
                cells
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use braille_protocol::GRID_CELLS;

    fn masks(cells: &[Cell]) -> Vec<u8> {
        cells.iter().map(Cell::mask).collect()
    }

    #[test]
    fn test_letters() {
        let a = Alphabet;
        // a, k, u, w, z
        assert_eq!(masks(&a.translate("akuwz")), vec![0x01, 0x05, 0x25, 0x3a, 0x35]);
        assert_eq!(masks(&a.translate("Dog")), masks(&a.translate("dog")));
    }

    #[test]
    fn test_digits_take_number_sign() {
        let a = Alphabet;
        assert_eq!(masks(&a.translate("10")), vec![0x3c, 0x01, 0x1a]);
        assert_eq!(masks(&a.translate("2b3")), vec![0x3c, 0x03, 0x03, 0x3c, 0x09]);
    }

    #[test]
    fn test_grade1_keeps_spaces() {
        let a = Alphabet;
        assert_eq!(masks(&a.translate("a b")), vec![0x01, 0x00, 0x01]);
    }

    #[test]
    fn test_grade2_blank_after_each_word() {
        let text = BrailleText::<Alphabet, Alphabet>::default();
        assert_eq!(
            masks(&text.cells("ab  c", Grade::Two)),
            vec![0x01, 0x03, 0x00, 0x09, 0x00]
        );
    }

    #[test]
    fn test_encode_pads_and_truncates() {
        let text = BrailleText::<Alphabet, Alphabet>::default();

        let short = text.encode("hi", Grade::One);
        assert_eq!(short.cell(0).map(Cell::mask), Some(0x13));
        assert!(short.cells()[2..].iter().all(Cell::is_blank));

        let long = text.encode("abcdefghijklmnop", Grade::One);
        assert_eq!(long.cells().len(), GRID_CELLS);
        assert_eq!(long.cell(11).map(Cell::mask), Some(0x07)); // l
    }

    #[test]
    fn test_alert_text_fits() {
        let text = BrailleText::<Alphabet, Alphabet>::default();
        let cells = text.cells("ALERT SIREN", Grade::One);
        assert_eq!(cells.len(), 11);
    }
}
