use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

pub const PHONE_WIDTH: usize = 11;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email pattern"));

/// NFKD-decompose, strip combining marks and drop anything outside ASCII.
/// Returns `None` when nothing printable is left.
pub fn transliterate(text: &str) -> Option<String> {
    let folded: String = text
        .nfkd()
        .filter(|c| !unicode_normalization::char::is_combining_mark(*c))
        .filter(char::is_ascii)
        .collect();
    let folded = folded.trim();
    if folded.is_empty() {
        None
    } else {
        Some(folded.to_string())
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Keep digits only and left-pad with zeros to eleven characters.
/// Longer numbers are left as they are.
pub fn normalize_phone(phone: &str) -> Option<String> {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    Some(format!("{digits:0>width$}", width = PHONE_WIDTH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_diacritics() {
        assert_eq!(transliterate("São Paulo").as_deref(), Some("Sao Paulo"));
        assert_eq!(transliterate("João Conceição").as_deref(), Some("Joao Conceicao"));
        assert_eq!(transliterate("Calça Ímã").as_deref(), Some("Calca Ima"));
    }

    #[test]
    fn non_latin_text_collapses_to_none() {
        assert_eq!(transliterate("東京"), None);
    }

    #[test]
    fn transliteration_is_idempotent() {
        let once = transliterate("Ação Móveis").unwrap();
        assert_eq!(transliterate(&once).unwrap(), once);
    }

    #[test]
    fn email_pattern() {
        assert!(is_valid_email("ana@loja.com.br"));
        assert!(!is_valid_email("ana.loja.com"));
        assert!(!is_valid_email("ana@loja"));
        assert!(!is_valid_email("a b@loja.com"));
        assert_eq!(normalize_email("  Ana@Loja.COM "), "ana@loja.com");
    }

    #[test]
    fn phone_is_digits_padded_to_eleven() {
        assert_eq!(normalize_phone("(11) 9876-5432").as_deref(), Some("01198765432"));
        assert_eq!(normalize_phone("11987654321").as_deref(), Some("11987654321"));
        assert_eq!(normalize_phone("+55 11 98765-4321").as_deref(), Some("5511987654321"));
        assert_eq!(normalize_phone("n/a"), None);
    }
}
