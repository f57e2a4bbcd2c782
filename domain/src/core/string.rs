//! String utilities for the domain layer.

/// Shorten free text to at most `max_chars` characters for use inside a
/// clarification label, appending an ellipsis when anything was cut.
///
/// Counts characters rather than bytes so multi-byte text keeps a
/// predictable visible width.
pub fn truncate_label(s: &str, max_chars: usize) -> String {
    let mut chars = s.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_none() {
        head
    } else {
        let kept: String = head.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_untouched() {
        assert_eq!(truncate_label("lunch money", 40), "lunch money");
    }

    #[test]
    fn long_text_cut_with_ellipsis() {
        assert_eq!(truncate_label("paid back half of the ski trip", 10), "paid ba...");
    }

    #[test]
    fn multibyte_counts_characters() {
        assert_eq!(truncate_label("日本語のメモです", 20), "日本語のメモです");
        assert_eq!(truncate_label("日本語のメモです長い", 8), "日本語のメ...");
    }

    #[test]
    fn zero_width() {
        assert_eq!(truncate_label("note", 0), "...");
    }
}
