//! Parsing free-form page references typed by users.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::Error;

/// An article URL on English Wikipedia; the host part is case-insensitive
/// and the scheme may be omitted (`//en.wikipedia.org/wiki/...`).
static ARTICLE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i:(?:https?:)?//en\.wikipedia\.org)/wiki/(\S+)$")
        .expect("article URL pattern is valid")
});

/// Page key of one input line: a bare key or an article URL.
/// Trailing slashes and URL fragments are dropped.
pub fn parse_page_line(line: &str) -> Option<String> {
    let line = line.trim();
    let key = match ARTICLE_URL.captures(line) {
        Some(caps) => {
            let rest = caps.get(1)?.as_str();
            rest.split('#').next().unwrap_or_default()
        }
        None if line.contains("://") || line.starts_with("//") => return None,
        None => line,
    };

    let key = key.trim_end_matches('/');
    if key.is_empty() || key.chars().any(char::is_whitespace) {
        return None;
    }
    Some(key.to_string())
}

/// Split a textarea into page keys. Blank lines are skipped; every other
/// line either yields a key or one validation error.
pub fn parse_pages(text: &str) -> (Vec<String>, Vec<Error>) {
    let mut pages = Vec::new();
    let mut errors = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match parse_page_line(line) {
            Some(page) => pages.push(page),
            None => errors.push(Error::Validation {
                line: line.to_string(),
            }),
        }
    }
    (pages, errors)
}

/// Sorted, without duplicates.
pub fn unique(mut pages: Vec<String>) -> Vec<String> {
    pages.sort();
    pages.dedup();
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_line() {
        let cases: &[(&str, Option<&str>)] = &[
            ("Debian", Some("Debian")),
            ("  Debian\t", Some("Debian")),
            ("Glasgow_Haskell_Compiler", Some("Glasgow_Haskell_Compiler")),
            (
                "https://en.wikipedia.org/wiki/Glasgow_Haskell_Compiler",
                Some("Glasgow_Haskell_Compiler"),
            ),
            ("http://en.wikipedia.org/wiki/Debian", Some("Debian")),
            ("HTTPS://EN.Wikipedia.ORG/wiki/Debian", Some("Debian")),
            ("//en.wikipedia.org/wiki/Debian", Some("Debian")),
            ("https://en.wikipedia.org/wiki/Debian/", Some("Debian")),
            ("https://en.wikipedia.org/wiki/Git#History", Some("Git")),
            ("https://en.wikipedia.org/wiki/AC/DC", Some("AC/DC")),
            ("C++", Some("C++")),
            ("Debian/", Some("Debian")),
            ("foo bar", None),
            ("https://en.wikipedia.org/wiki/", None),
            ("https://en.wikipedia.org/wiki/foo bar", None),
            ("https://de.wikipedia.org/wiki/Debian", None),
            ("https://example.com/Debian", None),
            ("//example.com/Debian", None),
            ("/", None),
            ("", None),
        ];
        for (line, want) in cases {
            assert_eq!(parse_page_line(line).as_deref(), *want, "line {line:?}");
        }
    }

    #[test]
    fn test_parse_pages_partitions_lines() {
        let text = "Debian\n\n   \nhttps://en.wikipedia.org/wiki/Glasgow_Haskell_Compiler\r\nfoo bar\n";
        let (pages, errors) = parse_pages(text);
        assert_eq!(pages, vec!["Debian", "Glasgow_Haskell_Compiler"]);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].subject(), Some("foo bar"));
        assert_eq!(errors[0].kind(), crate::ErrorKind::Validation);
    }

    #[test]
    fn test_parse_pages_empty_input() {
        let (pages, errors) = parse_pages("");
        assert!(pages.is_empty());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_unique() {
        let pages = vec!["b".to_string(), "a".to_string(), "b".to_string()];
        assert_eq!(unique(pages), vec!["a", "b"]);
    }
}
