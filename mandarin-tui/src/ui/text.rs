use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Cuts `text` to at most `max_width` terminal columns, ending in `…` when
/// anything was dropped. Hangul takes two columns per syllable.
pub fn truncate_with_dots(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}
