use regex::Regex;

/// Selects suites and tests by a `suite/test` pattern. Each part is a
/// case-insensitive, unanchored regex; an empty part matches everything.
#[derive(Clone, Debug)]
pub struct TestMatcher {
    pub suite: Regex,
    pub test: Regex,
    pub pattern: String,
}

impl TestMatcher {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let parts = Self::split_regexp(pattern);
        let (suite, rest) = parts.split_first().map_or(("", &[][..]), |(s, r)| (*s, r));
        Ok(Self {
            suite: Regex::new(&format!("(?i:{suite})"))?,
            test: Regex::new(&format!("(?i:{})", rest.join("/")))?,
            pattern: pattern.to_string(),
        })
    }

    pub fn match_test(&self, suite: &str, test: &str) -> bool {
        if !self.suite.is_match(suite) {
            return false;
        }

        test.is_empty() || self.test.is_match(test)
    }

    /// Splits the pattern on every `/` that is not escaped and not nested in
    /// a character class or a group.
    fn split_regexp(pattern: &str) -> Vec<&str> {
        let mut parts = Vec::new();
        let mut brackets = 0usize;
        let mut parens = 0isize;
        let mut start = 0;
        let mut chars = pattern.char_indices();
        while let Some((index, ch)) = chars.next() {
            match ch {
                '\\' => {
                    chars.next();
                }
                '[' => brackets += 1,
                ']' => brackets = brackets.saturating_sub(1),
                '(' if brackets == 0 => parens += 1,
                ')' if brackets == 0 => parens -= 1,
                '/' if brackets == 0 && parens == 0 => {
                    parts.push(&pattern[start..index]);
                    start = index + 1;
                }
                _ => {}
            }
        }
        parts.push(&pattern[start..]);
        parts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(pattern: &str) -> TestMatcher {
        TestMatcher::new(pattern).expect("pattern compiles")
    }

    #[test]
    fn test_split_regexp() {
        assert_eq!(TestMatcher::split_regexp("suite"), vec!["suite"]);
        assert_eq!(TestMatcher::split_regexp("suite/test"), vec!["suite", "test"]);
        assert_eq!(
            TestMatcher::split_regexp("suite/test/1/2"),
            vec!["suite", "test", "1", "2"]
        );
        assert_eq!(TestMatcher::split_regexp("/test"), vec!["", "test"]);
        assert_eq!(TestMatcher::split_regexp("a[/]b/c"), vec!["a[/]b", "c"]);
        assert_eq!(TestMatcher::split_regexp("(a/b)/c"), vec!["(a/b)", "c"]);
        assert_eq!(TestMatcher::split_regexp(r"a\/b/c"), vec![r"a\/b", "c"]);
    }

    #[test]
    fn test_match_test() {
        let genesis = matcher("compare/genesis");

        assert!(genesis.match_test("compare-eth-calls", "eth_getBlockByNumber genesis"));
        assert!(genesis.match_test("Compare-Eth-Calls", "debug_traceBlockByNumber GENESIS"));
        assert!(!genesis.match_test("compare-eth-calls", "eth_getBlockByNumber post-fork"));
        assert!(!genesis.match_test("legacy-eth-calls", "genesis"));

        let syncing = matcher("/syncing");
        assert!(syncing.match_test("legacy-eth-calls", "eth_syncing (goerli)"));
        assert!(syncing.match_test("", "eth_Syncing"));
        assert!(!syncing.match_test("legacy-eth-calls", "eth_blockNumber"));
    }

    #[test]
    fn test_match_suite() {
        let legacy = matcher("legacy");

        assert!(legacy.match_test("legacy-eth-calls", ""));
        assert!(legacy.match_test("LEGACY-eth-calls", "anything"));
        assert!(!legacy.match_test("compare-eth-calls", ""));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(TestMatcher::new("compare/(unclosed").is_err());
    }
}
