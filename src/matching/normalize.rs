// src/matching/normalize.rs
//
// Case and diacritic folding applied to every identifying field before it is
// compared. Raw text is never compared directly.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Transliterates `text` to a diacritic-free form and upper-cases it.
/// Whitespace and punctuation are kept as they are.
pub fn normalize(text: &str) -> String {
    fold_special_letters(text)
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_uppercase()
}

/// Same as [`normalize`], passing absent values through untouched.
pub fn normalize_cell(value: Option<&str>) -> Option<String> {
    value.map(normalize)
}

/// Key form of a primary field. Surrounding whitespace is dropped so that
/// `"Acme Corp "` and `"Acme Corp"` name the same entity.
pub fn normalize_key(text: &str) -> String {
    normalize(text.trim())
}

/// Countries compare case-insensitively and ignore surrounding whitespace.
pub fn normalize_country(country: &str) -> String {
    normalize(country.trim())
}

/// Letters that are not a base letter plus an accent, so NFD leaves them
/// alone, and a few typographic marks common in copied spreadsheet text.
fn fold_special_letters(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            'Ł' => out.push('L'),
            'ł' => out.push('l'),
            'Ø' => out.push('O'),
            'ø' => out.push('o'),
            'Æ' => out.push_str("AE"),
            'æ' => out.push_str("ae"),
            'Œ' => out.push_str("OE"),
            'œ' => out.push_str("oe"),
            'ß' => out.push_str("ss"),
            'Đ' | 'Ð' => out.push('D'),
            'đ' | 'ð' => out.push('d'),
            'Þ' => out.push_str("TH"),
            'þ' => out.push_str("th"),
            'ı' => out.push('i'),
            '\u{2018}' | '\u{2019}' | '\u{02BC}' => out.push('\''),
            '\u{201C}' | '\u{201D}' => out.push('"'),
            '\u{2013}' | '\u{2014}' => out.push('-'),
            '\u{00A0}' => out.push(' '),
            _ => out.push(c),
        }
    }
    out
}
