/// Rough estimate: GPT-style token ≈ 4 chars, rounded up.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// Trims every line, drops the empty ones and joins the rest with a space.
pub fn minify(text: &str) -> String {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Percentage of tokens saved by minifying, or `None` for empty input.
pub fn savings_percent(tokens: usize, minified_tokens: usize) -> Option<i64> {
    if tokens == 0 {
        return None;
    }
    let saved = tokens as f64 - minified_tokens as f64;
    Some((100.0 * saved / tokens as f64).round() as i64)
}

/// Numbers shown in the status bar for one view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextMetrics {
    pub lines: usize,
    pub tokens: usize,
    pub minified_tokens: usize,
    pub savings_percent: Option<i64>,
}

impl TextMetrics {
    pub fn of(text: &str) -> Self {
        let tokens = estimate_tokens(text);
        let minified_tokens = estimate_tokens(&minify(text));
        TextMetrics {
            lines: if text.is_empty() {
                0
            } else {
                text.split('\n').count()
            },
            tokens,
            minified_tokens,
            savings_percent: savings_percent(tokens, minified_tokens),
        }
    }

    /// Savings worth advertising: only when minifying actually helps.
    pub fn savings_badge(&self) -> Option<i64> {
        if self.tokens > self.minified_tokens {
            self.savings_percent
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_round_up() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("a"), 1);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
        assert_eq!(estimate_tokens("ééééé"), 2);
    }

    #[test]
    fn minify_collapses_lines() {
        assert_eq!(minify("  fn main() {\n\n    body();\n  }\n"), "fn main() { body(); }");
        assert_eq!(minify(""), "");
        assert_eq!(minify("\n \n\t\n"), "");
    }

    #[test]
    fn minified_never_costs_more_tokens() {
        let samples = [
            "",
            "x",
            "a\nb",
            "   indented\n\n\n  more  \n",
            "one-line-without-breaks",
            "\n\n\n\n",
            "a\n b\n  c\n   d\n",
            "tab\tseparated\r\nwindows\r\n",
        ];
        for sample in samples {
            assert!(
                estimate_tokens(&minify(sample)) <= estimate_tokens(sample),
                "minify grew {:?}",
                sample
            );
        }
    }

    #[test]
    fn savings_are_omitted_for_empty_text() {
        assert_eq!(savings_percent(0, 0), None);
        assert_eq!(savings_percent(10, 5), Some(50));
        assert_eq!(savings_percent(3, 2), Some(33));
        assert_eq!(savings_percent(8, 7), Some(13));
    }

    #[test]
    fn text_metrics_for_status_bar() {
        let m = TextMetrics::of("    a\n    b\n");
        assert_eq!(m.lines, 3);
        assert_eq!(m.tokens, 3);
        assert_eq!(m.minified_tokens, 1);
        assert_eq!(m.savings_badge(), Some(67));

        let empty = TextMetrics::of("");
        assert_eq!(empty.lines, 0);
        assert_eq!(empty.savings_percent, None);
        assert_eq!(empty.savings_badge(), None);
    }
}
