// NIK extraction from noisy recognized text.
//
// OCR output for a KTP reliably lands in one of three shapes: the NIK label
// followed by stray punctuation before the digits, the label followed by a
// plain colon, or a bare 16-character run in which the digit 1 may have been
// read as a lowercase L. One pattern per shape, tried in order.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NIK_PATTERNS: Vec<Regex> = vec![
        // Label with a stray semicolon between colon and digits
        Regex::new(r":\s*;\s*(\d{16})").unwrap(),
        // Label with a plain colon
        Regex::new(r":\s*(\d{16})").unwrap(),
        // Bare run, tolerating the l/1 confusion
        Regex::new(r"\b([0-9l]{16})\b").unwrap(),
    ];
    static ref NIK_EXACT: Regex = Regex::new(r"^\d{16}$").unwrap();
}

pub struct FieldExtractor;

impl FieldExtractor {
    /// Extract a candidate 16-digit identity number from recognized text.
    ///
    /// Only the first successful match is used; a candidate is accepted
    /// only if it consists of exactly 16 decimal digits after the l -> 1
    /// substitution pass.
    pub fn extract_identity_number(text: &str) -> Option<String> {
        for pattern in NIK_PATTERNS.iter() {
            if let Some(captures) = pattern.captures(text) {
                if let Some(matched) = captures.get(1) {
                    let cleaned = matched.as_str().replace('l', "1");
                    if NIK_EXACT.is_match(&cleaned) {
                        return Some(cleaned);
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_with_label_and_colon() {
        let text = "NIK : 3201010101990001\nNama: BUDI SANTOSO";
        assert_eq!(
            FieldExtractor::extract_identity_number(text),
            Some("3201010101990001".to_string())
        );
    }

    #[test]
    fn test_extract_with_stray_semicolon() {
        let text = "NIK : ; 3201010101990001";
        assert_eq!(
            FieldExtractor::extract_identity_number(text),
            Some("3201010101990001".to_string())
        );
    }

    #[test]
    fn test_extract_bare_run() {
        let text = "PROVINSI JAWA BARAT 3201010101990001 KOTA BOGOR";
        assert_eq!(
            FieldExtractor::extract_identity_number(text),
            Some("3201010101990001".to_string())
        );
    }

    #[test]
    fn test_corrects_ocr_l_confusion() {
        let text = "32010l0l01990001";
        assert_eq!(
            FieldExtractor::extract_identity_number(text),
            Some("3201010101990001".to_string())
        );
    }

    #[test]
    fn test_rejects_fifteen_digit_run() {
        assert_eq!(
            FieldExtractor::extract_identity_number("320101010199000"),
            None
        );
    }

    #[test]
    fn test_rejects_seventeen_digit_run() {
        assert_eq!(
            FieldExtractor::extract_identity_number("32010101019900011"),
            None
        );
    }

    #[test]
    fn test_rejects_corrupted_run() {
        // Sixteen characters but with a glyph outside the digit/l class
        assert_eq!(
            FieldExtractor::extract_identity_number("32010o0101990001"),
            None
        );
    }

    #[test]
    fn test_no_candidate_in_text() {
        assert_eq!(
            FieldExtractor::extract_identity_number("Nama: BUDI SANTOSO"),
            None
        );
    }

    #[test]
    fn test_first_match_wins() {
        let text = "NIK : 3201010101990001 lainnya 9999999999999999";
        assert_eq!(
            FieldExtractor::extract_identity_number(text),
            Some("3201010101990001".to_string())
        );
    }
}
