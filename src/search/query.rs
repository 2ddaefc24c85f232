//! FTS5 query translation / FTS5 查询转换
//!
//! Turns a Google-style search string into FTS5 query syntax / 将用户输入转换为 FTS5 查询语法：
//! - Bare words become quoted phrases, so `word:` is never read as a column filter / 裸词自动加引号
//! - `AND` / `OR` / `NOT` stay unquoted operators when followed by a boundary / 布尔关键字保持不加引号
//! - `'` is always doubled / 单引号始终转义为 `''`
//!
//! Single left-to-right scan over a closed set of states, no AST.
//!
//! ```
//! use fts5_index::search::query::translate;
//!
//! assert_eq!(translate("(foo AND bar) OR baz").unwrap(), r#"("foo" AND "bar") OR "baz""#);
//! assert_eq!(translate("ANDROID").unwrap(), r#""ANDROID""#);
//! ```

use thiserror::Error;

/// Boolean operators passed through to FTS5 / 透传给 FTS5 的布尔运算符
const KEYWORDS: [&str; 3] = ["AND", "OR", "NOT"];

/// Query translation error / 查询转换错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The keyword matcher holds letters that no keyword continues
    #[error("query parse error: no keyword continues {buffer:?} at offset {offset}")]
    UnresolvedKeyword { buffer: String, offset: usize },
}

/// What the keyword matcher needs next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Letter(char),
    /// Keyword fully spelled, waiting for whitespace, `(` or `"`
    Boundary,
}

/// Scanner state / 扫描状态
#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Bare,
    /// Inside a phrase the translator opened around a bare word
    ImplicitPhrase,
    /// Inside a phrase the user quoted
    ExplicitPhrase,
    MatchingKeyword { buffer: String, expected: Expect },
}

enum Step {
    Consumed,
    /// The same character must be fed again under the new state
    Reprocess,
}

struct Scanner {
    state: State,
    out: String,
}

/// Translate a raw search string into an FTS5 MATCH expression / 转换搜索字符串为 FTS5 MATCH 表达式
///
/// The result is meant to be bound as the `MATCH ?` parameter, never concatenated into SQL.
pub fn translate(query: &str) -> Result<String, ParseError> {
    let mut scanner = Scanner::new(query.len());
    for (offset, c) in query.char_indices() {
        scanner.feed(c, offset)?;
    }
    Ok(scanner.finish())
}

impl Scanner {
    fn new(capacity: usize) -> Self {
        Self {
            state: State::Bare,
            // quotes around every word plus doubled apostrophes
            out: String::with_capacity(capacity * 2 + 2),
        }
    }

    fn feed(&mut self, c: char, offset: usize) -> Result<(), ParseError> {
        while let Step::Reprocess = self.step(c, offset)? {}
        Ok(())
    }

    /// Single transition: consume `c` in the current state and move to the next one.
    fn step(&mut self, c: char, offset: usize) -> Result<Step, ParseError> {
        let state = std::mem::replace(&mut self.state, State::Bare);

        let (next, step) = match (state, c) {
            // SQL injection guard, applies in every state
            (State::MatchingKeyword { buffer, .. }, '\'') => {
                self.open_phrase(&buffer);
                self.out.push_str("''");
                (State::ImplicitPhrase, Step::Consumed)
            }
            (state, '\'') => {
                self.out.push_str("''");
                (state, Step::Consumed)
            }

            (State::MatchingKeyword { buffer, expected }, c) => {
                self.match_keyword(buffer, expected, c, offset)?
            }
            (State::Bare, 'A' | 'O' | 'N') => {
                let buffer = c.to_string();
                let expected = expectation_after(&buffer, offset)?;
                (State::MatchingKeyword { buffer, expected }, Step::Consumed)
            }

            // A user quote right after an auto-opened phrase closes that phrase
            (State::ImplicitPhrase, '"') | (State::ExplicitPhrase, '"') => {
                self.out.push('"');
                (State::Bare, Step::Consumed)
            }
            (State::Bare, '"') => {
                self.out.push('"');
                (State::ExplicitPhrase, Step::Consumed)
            }

            (State::ImplicitPhrase, c) if is_separator(c) => {
                self.out.push('"');
                self.out.push(c);
                (State::Bare, Step::Consumed)
            }
            (State::Bare, c) if is_separator(c) => {
                self.out.push(c);
                (State::Bare, Step::Consumed)
            }
            (State::Bare, c) => {
                self.out.push('"');
                self.out.push(c);
                (State::ImplicitPhrase, Step::Consumed)
            }

            // Plain content inside a phrase
            (state, c) => {
                self.out.push(c);
                (state, Step::Consumed)
            }
        };

        self.state = next;
        Ok(step)
    }

    fn match_keyword(
        &mut self,
        mut buffer: String,
        expected: Expect,
        c: char,
        offset: usize,
    ) -> Result<(State, Step), ParseError> {
        match expected {
            Expect::Letter(letter) if c == letter => {
                buffer.push(c);
                let expected = expectation_after(&buffer, offset)?;
                Ok((State::MatchingKeyword { buffer, expected }, Step::Consumed))
            }
            Expect::Boundary if is_boundary(c) => {
                self.out.push_str(&buffer);
                Ok((State::Bare, Step::Reprocess))
            }
            // Not a keyword after all: the letters become an ordinary word
            _ => {
                self.open_phrase(&buffer);
                Ok((State::ImplicitPhrase, Step::Reprocess))
            }
        }
    }

    fn open_phrase(&mut self, text: &str) {
        self.out.push('"');
        self.out.push_str(text);
    }

    fn finish(mut self) -> String {
        match self.state {
            // dangling partial keyword is passed through as typed
            State::MatchingKeyword { buffer, .. } => self.out.push_str(&buffer),
            State::ImplicitPhrase | State::ExplicitPhrase => self.out.push('"'),
            State::Bare => {}
        }
        self.out
    }
}

/// Next requirement for a keyword prefix: the following letter, or a boundary once complete
fn expectation_after(prefix: &str, offset: usize) -> Result<Expect, ParseError> {
    let keyword = KEYWORDS
        .iter()
        .find(|k| k.starts_with(prefix))
        .ok_or_else(|| ParseError::UnresolvedKeyword {
            buffer: prefix.to_string(),
            offset,
        })?;

    Ok(keyword[prefix.len()..]
        .chars()
        .next()
        .map_or(Expect::Boundary, Expect::Letter))
}

/// Characters that legally end a keyword token
fn is_boundary(c: char) -> bool {
    c.is_ascii_whitespace() || c == '(' || c == '"'
}

/// Characters that end an implicit phrase and are emitted on their own
///
/// Only ASCII whitespace separates words; other Unicode spaces are phrase content.
fn is_separator(c: char) -> bool {
    c.is_ascii_whitespace() || c == '(' || c == ')'
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn t(input: &str) -> String {
        translate(input).unwrap()
    }

    #[test]
    fn test_reference_queries() {
        let cases = [
            ("foo", r#""foo""#),
            ("foo bar", r#""foo" "bar""#),
            (r#""foo""#, r#""foo""#),
            (r#""foo bar""#, r#""foo bar""#),
            ("foo AND bar", r#""foo" AND "bar""#),
            ("(foo AND bar) OR baz", r#"("foo" AND "bar") OR "baz""#),
            ("foo AN bar", r#""foo" "AN" "bar""#),
            (r#""foo AN bar""#, r#""foo AN bar""#),
        ];
        for (i, (input, expected)) in cases.iter().enumerate() {
            assert_eq!(t(input), *expected, "case {}: {}", i, input);
        }
    }

    #[test]
    fn test_apostrophe_doubled_inside_implicit_phrase() {
        assert!(t("it's").starts_with(r#""it''s""#));
        assert_eq!(t("it's fine"), r#""it''s" "fine""#);
    }

    #[test]
    fn test_apostrophe_in_every_state() {
        assert_eq!(t("'"), "''");
        assert_eq!(t("'foo'"), r#"''"foo''""#);
        assert_eq!(t(r#""rock 'n' roll""#), r#""rock ''n'' roll""#);
        // injection attempt stays inside a bound parameter, quote doubled
        assert_eq!(t("x'; DROP TABLE search; --"), r#""x'';" "DROP" "TABLE" "search;" "--""#);
    }

    #[test]
    fn test_apostrophe_flushes_pending_keyword() {
        assert_eq!(t("AN'x"), r#""AN''x""#);
        assert_eq!(t("O'Reilly"), r#""O''Reilly""#);
        assert_eq!(t("NOT'"), r#""NOT''""#);
    }

    #[test]
    fn test_keyword_needs_boundary() {
        assert_eq!(t("ANDROID"), r#""ANDROID""#);
        assert_eq!(t("ORACLE"), r#""ORACLE""#);
        assert_eq!(t("NOTE"), r#""NOTE""#);
        assert_eq!(t("foo OR)"), r#""foo" "OR")"#);
    }

    #[test]
    fn test_keyword_followed_by_group_or_phrase() {
        assert_eq!(t("NOT(foo)"), r#"NOT("foo")"#);
        assert_eq!(t(r#"foo AND"bar baz""#), r#""foo" AND"bar baz""#);
        assert_eq!(t("foo\tOR\nbar"), "\"foo\"\tOR\n\"bar\"");
        assert_eq!(t("foo NOT bar"), r#""foo" NOT "bar""#);
    }

    #[test]
    fn test_keyword_mismatch_reprocesses_character() {
        assert_eq!(t("ANT"), r#""ANT""#);
        assert_eq!(t("NOR"), r#""NOR""#);
        assert_eq!(t("ON"), r#""ON""#);
        assert_eq!(t("AN(x)"), r#""AN"("x")"#);
        assert_eq!(t(r#"AN"x""#), r#""AN""x""#);
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        assert_eq!(t("foo and bar"), r#""foo" "and" "bar""#);
        assert_eq!(t("foo Or bar"), r#""foo" "Or" "bar""#);
    }

    #[test]
    fn test_keyword_letters_inside_words_are_plain() {
        assert_eq!(t("bANd"), r#""bANd""#);
        assert_eq!(t(r#""AND""#), r#""AND""#);
    }

    #[test]
    fn test_dangling_keyword_at_end() {
        assert_eq!(t("foo AND"), r#""foo" AND"#);
        assert_eq!(t("foo AN"), r#""foo" AN"#);
        assert_eq!(t("N"), "N");
    }

    #[test]
    fn test_user_quote_closes_implicit_phrase() {
        assert_eq!(t(r#"foo"bar""#), r#""foo""bar""#);
        assert_eq!(t(r#"foo" "bar baz""#), r#""foo" "bar baz""#);
    }

    #[test]
    fn test_column_filter_is_neutralised() {
        assert_eq!(t("title:rust"), r#""title:rust""#);
        assert_eq!(t("-foo ^bar"), r#""-foo" "^bar""#);
    }

    #[test]
    fn test_unterminated_phrase_is_closed() {
        assert_eq!(t(r#""foo bar"#), r#""foo bar""#);
        assert_eq!(t(r#"""#), r#""""#);
    }

    #[test]
    fn test_unbalanced_parentheses_pass_through() {
        assert_eq!(t("(foo"), r#"("foo""#);
        assert_eq!(t("foo))"), r#""foo"))"#);
    }

    #[test]
    fn test_empty_and_whitespace() {
        assert_eq!(t(""), "");
        assert_eq!(t("  \t"), "  \t");
    }

    #[test]
    fn test_unicode_passes_through() {
        assert_eq!(t("café résumé"), r#""café" "résumé""#);
        assert_eq!(t("搜索 引擎"), r#""搜索" "引擎""#);
    }

    #[test]
    fn test_non_ascii_space_is_phrase_content() {
        assert_eq!(t("foo\u{a0}bar"), "\"foo\u{a0}bar\"");
        assert_eq!(t("搜索\u{3000}引擎"), "\"搜索\u{3000}引擎\"");
        assert_eq!(t("foo\r\nbar"), "\"foo\"\r\n\"bar\"");
        // a keyword needs an ASCII boundary after it
        assert_eq!(t("AND\u{a0}x"), "\"AND\u{a0}x\"");
    }

    #[test]
    fn test_expectation_table() {
        assert_eq!(expectation_after("A", 0), Ok(Expect::Letter('N')));
        assert_eq!(expectation_after("NO", 0), Ok(Expect::Letter('T')));
        assert_eq!(expectation_after("OR", 0), Ok(Expect::Boundary));
        assert_eq!(
            expectation_after("AX", 3),
            Err(ParseError::UnresolvedKeyword { buffer: "AX".to_string(), offset: 3 })
        );
    }

    proptest! {
        #[test]
        fn prop_never_fails_and_quotes_balance(input in any::<String>()) {
            let out = translate(&input).unwrap();
            prop_assert_eq!(out.matches('"').count() % 2, 0);
        }

        #[test]
        fn prop_apostrophes_always_doubled(input in "[a-zA-Z '\"()]{0,40}") {
            let out = translate(&input).unwrap();
            prop_assert_eq!(out.matches('\'').count(), input.matches('\'').count() * 2);
            prop_assert!(!out.replace("''", "").contains('\''));
        }

        #[test]
        fn prop_explicit_phrase_is_unchanged(body in "[a-zA-Z0-9 ()ANDORNOT:*-]{0,30}") {
            let phrase = format!("\"{}\"", body);
            prop_assert_eq!(translate(&phrase).unwrap(), phrase);
        }

        #[test]
        fn prop_bare_words_are_each_quoted(
            words in proptest::collection::vec("[a-z0-9]{1,8}", 1..8),
            seps in proptest::collection::vec("[ \t\n]{1,3}", 8),
        ) {
            let mut input = String::new();
            let mut expected = String::new();
            for (i, word) in words.iter().enumerate() {
                if i > 0 {
                    input.push_str(&seps[i]);
                    expected.push_str(&seps[i]);
                }
                input.push_str(word);
                expected.push_str(&format!("\"{}\"", word));
            }
            prop_assert_eq!(translate(&input).unwrap(), expected);
        }

        #[test]
        fn prop_translation_is_deterministic(input in ".{0,40}") {
            prop_assert_eq!(translate(&input), translate(&input));
        }
    }
}
