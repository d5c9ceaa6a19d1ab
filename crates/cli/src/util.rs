use unicode_width::UnicodeWidthStr;

/// Display width of a string, accounting for CJK double-width glyphs.
pub(crate) fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Pad or truncate to exactly `width` display columns. Truncation adds
/// ".." so cut-off values are visible as such.
pub(crate) fn pad_right(s: &str, width: usize) -> String {
    let sw = display_width(s);
    if sw > width {
        truncate_display(s, width)
    } else {
        let mut out = String::with_capacity(s.len() + width - sw);
        out.push_str(s);
        for _ in 0..(width - sw) {
            out.push(' ');
        }
        out
    }
}

fn truncate_display(s: &str, width: usize) -> String {
    if width < 3 {
        return s.chars().take(width).collect();
    }
    let budget = width - 2;
    let mut used = 0;
    let mut end_byte = 0;
    for (i, ch) in s.char_indices() {
        let cw = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + cw > budget {
            end_byte = i;
            break;
        }
        used += cw;
        end_byte = i + ch.len_utf8();
    }
    format!("{}..", &s[..end_byte])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_fills_to_width() {
        assert_eq!(pad_right("ab", 4), "ab  ");
        assert_eq!(pad_right("abcd", 4), "abcd");
    }

    #[test]
    fn overlong_values_truncate_with_ellipsis() {
        assert_eq!(pad_right("abcdefgh", 5), "abc..");
    }

    #[test]
    fn wide_glyphs_count_double() {
        // each CJK glyph is two columns wide
        assert_eq!(display_width("日本"), 4);
        assert_eq!(pad_right("日本", 5), "日本 ");
    }
}
