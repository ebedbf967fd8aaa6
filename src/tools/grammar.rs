// src/tools/grammar.rs
//! Tag vocabulary of a tool call markup dialect.
//!
//! A dialect nests three constructs: an optional wrapper around one or more
//! function blocks, the function block itself (`<function=NAME>...</function>`
//! for Qwen) and zero or more parameter blocks inside it. Match rules are
//! derived from the literal tags, so a new dialect only supplies a grammar.

use regex::escape;

/// Terminates the name inside an opening function or parameter tag.
pub const TAG_END: char = '>';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkupGrammar {
    /// Dialect identifier, also used as the registry key
    pub name: &'static str,
    pub wrapper_open: &'static str,
    pub wrapper_close: &'static str,
    /// Opening function tag up to (not including) the name
    pub function_open: &'static str,
    pub function_close: &'static str,
    /// Opening parameter tag up to (not including) the name
    pub parameter_open: &'static str,
    pub parameter_close: &'static str,
    /// Regexes matched against the start of the lower-cased model name
    pub model_patterns: &'static [&'static str],
}

/// Qwen 2.5 / 3 coder style function markup.
pub const QWEN_GRAMMAR: MarkupGrammar = MarkupGrammar {
    name: "qwen",
    wrapper_open: "<tool_call>",
    wrapper_close: "</tool_call>",
    function_open: "<function=",
    function_close: "</function>",
    parameter_open: "<parameter=",
    parameter_close: "</parameter>",
    model_patterns: &[r"qwen.*"],
};

impl MarkupGrammar {
    /// Every structural marker of the dialect.
    pub fn markers(&self) -> [&'static str; 6] {
        [
            self.wrapper_open,
            self.wrapper_close,
            self.function_open,
            self.function_close,
            self.parameter_open,
            self.parameter_close,
        ]
    }

    /// Function block capturing (name, body).
    pub fn function_block_pattern(&self) -> String {
        Self::named_block(self.function_open, self.function_close)
    }

    /// Parameter block capturing (name, raw value).
    pub fn parameter_block_pattern(&self) -> String {
        Self::named_block(self.parameter_open, self.parameter_close)
    }

    /// A complete wrapper span, shortest match.
    pub fn wrapped_span_pattern(&self) -> String {
        Self::span(self.wrapper_open, self.wrapper_close)
    }

    /// A complete function span, shortest match.
    pub fn function_span_pattern(&self) -> String {
        Self::span(self.function_open, self.function_close)
    }

    /// Anchor a model name pattern at the start of the name.
    pub fn anchored_model_pattern(pattern: &str) -> String {
        format!("^(?:{})", pattern)
    }

    fn named_block(open: &str, close: &str) -> String {
        format!(
            "(?s){}(.*?){}(.*?){}",
            escape(open),
            escape(&TAG_END.to_string()),
            escape(close)
        )
    }

    fn span(open: &str, close: &str) -> String {
        format!("(?s){}.*?{}", escape(open), escape(close))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn test_qwen_markers() {
        assert_eq!(
            QWEN_GRAMMAR.markers(),
            [
                "<tool_call>",
                "</tool_call>",
                "<function=",
                "</function>",
                "<parameter=",
                "</parameter>"
            ]
        );
    }

    #[test]
    fn test_function_block_spans_newlines() {
        let re = Regex::new(&QWEN_GRAMMAR.function_block_pattern()).unwrap();
        let text = "<function=a>\n<parameter=p>\nx\n</parameter>\n</function><function=b></function>";
        let caps: Vec<_> = re.captures_iter(text).collect();
        assert_eq!(caps.len(), 2);
        assert_eq!(&caps[0][1], "a");
        assert!(caps[0][2].contains("<parameter=p>"));
        assert_eq!(&caps[1][1], "b");
    }

    #[test]
    fn test_parameter_block_is_non_greedy() {
        let re = Regex::new(&QWEN_GRAMMAR.parameter_block_pattern()).unwrap();
        let text = "<parameter=a>1</parameter><parameter=b>line1\nline2</parameter>";
        let pairs: Vec<(String, String)> = re
            .captures_iter(text)
            .map(|c| (c[1].to_string(), c[2].to_string()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "line1\nline2".to_string())
            ]
        );
    }

    #[test]
    fn test_anchored_model_pattern() {
        let re = Regex::new(&MarkupGrammar::anchored_model_pattern("qwen.*")).unwrap();
        assert!(re.is_match("qwen2.5-72b"));
        assert!(!re.is_match("my-qwen"));
    }
}
