//! Greedy word wrapping.

/// Wrap `text` into lines no wider than `max_width`, as measured by
/// `width_of`.
///
/// Explicit newlines start a new line and blank lines are kept. Runs of
/// whitespace inside a line collapse to a single space. Words wider than
/// `max_width` are split across lines; every line holds at least one
/// character. Trailing whitespace is dropped.
pub fn wrap_text<F>(text: &str, max_width: f32, width_of: F) -> Vec<String>
where
    F: Fn(&str) -> f32,
{
    let mut lines = Vec::new();

    for paragraph in text.trim_end().split('\n') {
        let mut current = String::new();

        for word in paragraph.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
            } else {
                let candidate = format!("{current} {word}");
                if width_of(&candidate) <= max_width {
                    current = candidate;
                    continue;
                }
                lines.push(std::mem::replace(&mut current, word.to_string()));
            }

            // An overlong word fills whole lines and carries the remainder
            while width_of(&current) > max_width && current.chars().count() > 1 {
                let split = split_point(&current, max_width, &width_of);
                let rest = current.split_off(split);
                lines.push(std::mem::replace(&mut current, rest));
            }
        }

        lines.push(current);
    }

    lines
}

/// Byte index of the longest prefix of `word` that fits, at least one char.
fn split_point<F>(word: &str, max_width: f32, width_of: &F) -> usize
where
    F: Fn(&str) -> f32,
{
    let mut fit = word.chars().next().map_or(0, char::len_utf8);
    for (index, ch) in word.char_indices().skip(1) {
        let end = index + ch.len_utf8();
        if width_of(&word[..end]) > max_width {
            break;
        }
        fit = end;
    }
    fit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(clippy::cast_precision_loss)]
    fn chars(text: &str) -> f32 {
        text.chars().count() as f32
    }

    #[allow(clippy::cast_precision_loss)]
    fn wrap(text: &str, width: usize) -> Vec<String> {
        wrap_text(text, width as f32, chars)
    }

    #[test]
    fn test_short_text_is_one_line() {
        assert_eq!(wrap("Hello world", 20), vec!["Hello world"]);
    }

    #[test]
    fn test_exact_fit() {
        assert_eq!(wrap("abc def", 7), vec!["abc def"]);
    }

    #[test]
    fn test_wraps_at_word_boundary() {
        assert_eq!(
            wrap("the quick brown fox jumps", 10),
            vec!["the quick", "brown fox", "jumps"]
        );
    }

    #[test]
    fn test_never_exceeds_width() {
        let text = "Results show statistically significant improvement in primary metric \
                    across every segment that was examined during the test window";
        for line in wrap(text, 17) {
            assert!(line.chars().count() <= 17, "line too long: {line:?}");
        }
    }

    #[test]
    fn test_long_word_is_split() {
        assert_eq!(
            wrap("a abcdefghij b", 4),
            vec!["a", "abcd", "efgh", "ij b"]
        );
    }

    #[test]
    fn test_explicit_newlines_and_blank_lines() {
        assert_eq!(
            wrap("first\n\nsecond\r\nthird", 40),
            vec!["first", "", "second", "third"]
        );
    }

    #[test]
    fn test_whitespace_collapses() {
        assert_eq!(wrap("a   b\t\tc", 40), vec!["a b c"]);
    }

    #[test]
    fn test_trailing_newline_dropped() {
        assert_eq!(wrap("done\n\n", 40), vec!["done"]);
    }

    #[test]
    fn test_multibyte_counts_chars() {
        assert_eq!(wrap("☐ élan ☑", 6), vec!["☐ élan", "☑"]);
        assert_eq!(wrap("éééé", 3), vec!["ééé", "é"]);
    }

    #[test]
    fn test_zero_width_keeps_one_char_per_line() {
        assert_eq!(wrap("ab", 0), vec!["a", "b"]);
    }

    #[test]
    fn test_measure_decides_breaks() {
        // Capitals count double
        let measure = |text: &str| -> f32 {
            text.chars()
                .map(|c| if c.is_ascii_uppercase() { 2.0 } else { 1.0 })
                .sum()
        };
        assert_eq!(
            wrap_text("AB cd ef gh", 6.0, measure),
            vec!["AB", "cd ef", "gh"]
        );
    }
}
