use colored::Colorize;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListStyle {
    /// Numbered lines around the cursor, current line marked with `>`.
    #[default]
    Window,
    /// The raw source text.
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    pub style: ListStyle,
    pub radius: usize,
    pub color: bool,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            style: ListStyle::Window,
            radius: 4,
            color: true,
        }
    }
}

const MIN_NUMBER_WIDTH: usize = 6;

fn count_digits(n: usize) -> usize {
    if n < 10 {
        1
    } else {
        1 + count_digits(n / 10)
    }
}

/// Render `text` according to `opts`, with `current_line` (1-based) as the
/// cursor.
pub fn render(text: &str, current_line: usize, opts: &ListOptions) -> String {
    if opts.style == ListStyle::Plain {
        return text.to_string();
    }

    let mut out = String::new();
    for (idx, contents) in text.lines().enumerate() {
        let number = idx + 1;
        if number.abs_diff(current_line) > opts.radius {
            continue;
        }

        let digits = count_digits(number);
        let width = if digits >= MIN_NUMBER_WIDTH {
            digits + 1
        } else {
            MIN_NUMBER_WIDTH
        };
        let padding = " ".repeat(width - digits);

        if number == current_line {
            let cursor = if opts.color {
                ">".green().to_string()
            } else {
                ">".to_string()
            };
            out.push_str(&format!("{cursor} {number}{padding}{contents}\n"));
        } else {
            let line = format!("  {number}{padding}{contents}");
            if opts.color {
                out.push_str(&format!("{}\n", line.bright_black()));
            } else {
                out.push_str(&line);
                out.push('\n');
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_window(radius: usize) -> ListOptions {
        ListOptions {
            style: ListStyle::Window,
            radius,
            color: false,
        }
    }

    #[test]
    fn test_window_around_cursor() {
        let text: String = (1..=12).map(|n| format!("line{n}\n")).collect();
        let out = render(&text, 6, &plain_window(4));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 9, "expected lines 2..=10");
        assert_eq!(lines[0], "  2     line2");
        assert_eq!(lines[4], "> 6     line6");
        assert_eq!(lines[8], "  10    line10");
    }

    #[test]
    fn test_window_clamps_at_start() {
        let out = render("a\nb\nc\n", 1, &plain_window(4));
        assert_eq!(out, "> 1     a\n  2     b\n  3     c\n");
    }

    #[test]
    fn test_wide_line_numbers_keep_a_gap() {
        let text: String = (1..=123_456).map(|_| "x\n").collect();
        let out = render(&text, 123_456, &plain_window(0));
        assert_eq!(out, "> 123456 x\n");
    }

    #[test]
    fn test_plain_style_returns_source() {
        let opts = ListOptions {
            style: ListStyle::Plain,
            ..ListOptions::default()
        };
        assert_eq!(render("a\nb\n", 2, &opts), "a\nb\n");
    }
}
