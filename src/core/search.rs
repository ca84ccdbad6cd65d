//! Search and replace over a text buffer

use std::ops::Range;

use regex_lite::{NoExpand, Regex, RegexBuilder};

use super::error::{NotepadError, Result};

/// How a search pattern is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchOptions {
    /// Treat the pattern as a regular expression instead of literal text
    pub is_regex: bool,
    pub case_sensitive: bool,
}

/// A located occurrence of a pattern, as a byte offset and length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub offset: usize,
    pub length: usize,
}

impl Match {
    pub fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.length
    }
}

/// Compile `pattern` with the given options
pub fn compile(pattern: &str, options: SearchOptions) -> Result<Regex> {
    let source = if options.is_regex {
        pattern.to_string()
    } else {
        regex_lite::escape(pattern)
    };

    Ok(RegexBuilder::new(&source)
        .case_insensitive(!options.case_sensitive)
        .build()?)
}

/// Find every non-overlapping, non-empty match of `pattern` in `buffer`
pub fn find_all(buffer: &str, pattern: &str, options: SearchOptions) -> Result<Vec<Match>> {
    let regex = compile(pattern, options)?;

    // find_iter steps past empty matches itself; they are dropped here
    Ok(regex
        .find_iter(buffer)
        .filter(|m| m.end() > m.start())
        .map(|m| Match {
            offset: m.start(),
            length: m.end() - m.start(),
        })
        .collect())
}

/// Replace every match of `pattern` in `buffer`.
///
/// Regex patterns expand `$n` group references in `replacement`; literal
/// patterns insert it verbatim. Returns the new buffer and the number of
/// substitutions.
pub fn replace_all(
    buffer: &str,
    pattern: &str,
    replacement: &str,
    options: SearchOptions,
) -> Result<(String, usize)> {
    if pattern.is_empty() {
        return Err(NotepadError::EmptyPattern);
    }

    let regex = compile(pattern, options)?;
    let count = regex.find_iter(buffer).count();
    let replaced = if options.is_regex {
        regex.replace_all(buffer, replacement)
    } else {
        regex.replace_all(buffer, NoExpand(replacement))
    };

    Ok((replaced.into_owned(), count))
}

/// Match list over the active buffer with a cycling cursor
#[derive(Debug, Clone, Default)]
pub struct SearchEngine {
    matches: Vec<Match>,
    cursor: Option<usize>,
}

impl SearchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a search, replacing the match list and resetting the cursor.
    ///
    /// An empty pattern clears the list. A pattern that fails to compile
    /// leaves the previous list and cursor in place.
    pub fn search(&mut self, buffer: &str, pattern: &str, options: SearchOptions) -> Result<&[Match]> {
        let matches = if pattern.is_empty() {
            Vec::new()
        } else {
            find_all(buffer, pattern, options)?
        };

        self.matches = matches;
        self.cursor = None;
        Ok(&self.matches)
    }

    /// Advance to the next match, wrapping around. `None` when there are none.
    pub fn find_next(&mut self) -> Option<Match> {
        if self.matches.is_empty() {
            return None;
        }

        let next = self.cursor.map_or(0, |c| (c + 1) % self.matches.len());
        self.cursor = Some(next);
        Some(self.matches[next])
    }

    /// The match under the cursor
    pub fn current(&self) -> Option<Match> {
        self.cursor.and_then(|c| self.matches.get(c).copied())
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    /// Forget all matches, e.g. after the buffer changed
    pub fn invalidate(&mut self) {
        self.matches.clear();
        self.cursor = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LITERAL: SearchOptions = SearchOptions {
        is_regex: false,
        case_sensitive: false,
    };

    fn offsets(matches: &[Match]) -> Vec<usize> {
        matches.iter().map(|m| m.offset).collect()
    }

    #[test]
    fn test_case_insensitive_literal() {
        let matches = find_all("aAbB", "a", LITERAL).unwrap();
        assert_eq!(offsets(&matches), vec![0, 1]);
        assert!(matches.iter().all(|m| m.length == 1));
    }

    #[test]
    fn test_case_sensitive_literal() {
        let options = SearchOptions {
            case_sensitive: true,
            ..LITERAL
        };
        let matches = find_all("aAbB", "a", options).unwrap();
        assert_eq!(offsets(&matches), vec![0]);
    }

    #[test]
    fn test_case_insensitive_alternating() {
        let matches = find_all("aBaB", "a", LITERAL).unwrap();
        assert_eq!(offsets(&matches), vec![0, 2]);
    }

    #[test]
    fn test_literal_escapes_metacharacters() {
        let matches = find_all("a.b axb (c)", "a.b", LITERAL).unwrap();
        assert_eq!(offsets(&matches), vec![0]);
        let matches = find_all("a.b axb (c)", "(c)", LITERAL).unwrap();
        assert_eq!(offsets(&matches), vec![8]);
    }

    #[test]
    fn test_regex_search() {
        let options = SearchOptions {
            is_regex: true,
            case_sensitive: true,
        };
        let matches = find_all("cat cot cut", r"c[ao]t", options).unwrap();
        assert_eq!(offsets(&matches), vec![0, 4]);
        assert_eq!(matches[1].range(), 4..7);
    }

    #[test]
    fn test_zero_length_matches_terminate() {
        let options = SearchOptions {
            is_regex: true,
            ..LITERAL
        };
        let matches = find_all("abc", "x*", options).unwrap();
        assert!(matches.is_empty());

        let matches = find_all("baab", "a*", options).unwrap();
        assert_eq!(matches, vec![Match { offset: 1, length: 2 }]);
    }

    #[test]
    fn test_malformed_regex() {
        let options = SearchOptions {
            is_regex: true,
            ..LITERAL
        };
        let err = find_all("text", "(unbalanced", options).unwrap_err();
        assert!(matches!(err, NotepadError::InvalidPattern(_)));
    }

    #[test]
    fn test_engine_keeps_state_on_error() {
        let mut engine = SearchEngine::new();
        engine.search("foo bar foo", "foo", LITERAL).unwrap();
        engine.find_next();

        let options = SearchOptions {
            is_regex: true,
            ..LITERAL
        };
        assert!(engine.search("foo bar foo", "[", options).is_err());
        assert_eq!(offsets(engine.matches()), vec![0, 8]);
        assert_eq!(engine.cursor(), Some(0));
    }

    #[test]
    fn test_find_next_cycles() {
        let mut engine = SearchEngine::new();
        engine.search("foo bar foo", "foo", LITERAL).unwrap();
        assert_eq!(engine.cursor(), None);
        assert_eq!(engine.find_next().unwrap().offset, 0);
        assert_eq!(engine.find_next().unwrap().offset, 8);
        assert_eq!(engine.find_next().unwrap().offset, 0);
        assert_eq!(engine.current().unwrap().offset, 0);
    }

    #[test]
    fn test_find_next_without_matches() {
        let mut engine = SearchEngine::new();
        assert_eq!(engine.find_next(), None);
        assert_eq!(engine.cursor(), None);

        engine.search("abc", "z", LITERAL).unwrap();
        assert_eq!(engine.find_next(), None);
        assert_eq!(engine.cursor(), None);
    }

    #[test]
    fn test_empty_pattern_clears() {
        let mut engine = SearchEngine::new();
        engine.search("abc", "b", LITERAL).unwrap();
        assert!(engine.search("abc", "", LITERAL).unwrap().is_empty());
        assert_eq!(engine.find_next(), None);
    }

    #[test]
    fn test_invalidate() {
        let mut engine = SearchEngine::new();
        engine.search("abc", "b", LITERAL).unwrap();
        engine.find_next();
        engine.invalidate();
        assert!(engine.matches().is_empty());
        assert_eq!(engine.current(), None);
    }

    #[test]
    fn test_replace_all_literal() {
        let (text, count) = replace_all("foo foo foo", "foo", "bar", LITERAL).unwrap();
        assert_eq!(text, "bar bar bar");
        assert_eq!(count, 3);
    }

    #[test]
    fn test_replace_all_literal_keeps_dollar_signs() {
        let (text, count) = replace_all("price: X", "x", "$1.00", LITERAL).unwrap();
        assert_eq!(text, "price: $1.00");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_replace_all_regex_groups() {
        let options = SearchOptions {
            is_regex: true,
            case_sensitive: true,
        };
        let (text, count) = replace_all("john smith", r"(\w+) (\w+)", "$2 $1", options).unwrap();
        assert_eq!(text, "smith john");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_replace_all_errors() {
        assert!(matches!(
            replace_all("abc", "", "x", LITERAL),
            Err(NotepadError::EmptyPattern)
        ));

        let options = SearchOptions {
            is_regex: true,
            ..LITERAL
        };
        assert!(matches!(
            replace_all("abc", "a)", "x", options),
            Err(NotepadError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_replace_all_without_matches() {
        let (text, count) = replace_all("abc", "z", "y", LITERAL).unwrap();
        assert_eq!(text, "abc");
        assert_eq!(count, 0);
    }
}
