use regex::Regex;
use std::sync::OnceLock;

/// Collapse runs of whitespace into single spaces and trim the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Find an advertised item total such as "Showing 1 - 100 of 962 items"
pub fn find_total_count(text: &str) -> Option<u64> {
    static TOTAL: OnceLock<Option<Regex>> = OnceLock::new();
    let regex = TOTAL
        .get_or_init(|| Regex::new(r"(?i)\bof\s+([\d,]+)").ok())
        .as_ref()?;

    let digits = regex.captures(text)?.get(1)?.as_str().replace(',', "");
    digits.parse().ok()
}

/// True when `text` is a bare page number
pub fn page_number(text: &str) -> Option<u32> {
    let text = text.trim();
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b  c "), "a b c");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn test_find_total_count() {
        assert_eq!(find_total_count("Showing 1 - 100 of 962 items"), Some(962));
        assert_eq!(find_total_count("Page 2 OF 1,204"), Some(1204));
        assert_eq!(find_total_count("no totals here"), None);
        assert_eq!(find_total_count("proof of concept"), None);
    }

    #[test]
    fn test_page_number() {
        assert_eq!(page_number(" 7 "), Some(7));
        assert_eq!(page_number("..."), None);
        assert_eq!(page_number("-1"), None);
        assert_eq!(page_number(""), None);
    }
}
