pub const MAX_CONTENT_CHARS: usize = 200;
pub const ELLIPSIS: &str = "...";

const BOUNDARY_CHARS: [char; 5] = ['。', '，', '.', ',', ' '];

pub fn refine_content(content: &str) -> String {
    refine_with_limit(content, MAX_CONTENT_CHARS)
}

/// Shortens `content` to at most `max_chars` characters, ellipsis included.
///
/// Text that already fits is returned verbatim. Longer text is cut after the
/// last sentence, clause or word boundary inside the budget when that boundary
/// sits past the halfway mark; otherwise it is cut hard at the budget.
pub fn refine_with_limit(content: &str, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        return content.to_string();
    }

    let budget = max_chars.saturating_sub(ELLIPSIS.chars().count());
    let window = content.chars().take(budget).collect::<Vec<_>>();
    let boundary = window
        .iter()
        .rposition(|c| BOUNDARY_CHARS.contains(c))
        .filter(|pos| pos * 2 > max_chars);

    let keep = boundary.map_or(budget, |pos| pos + 1);
    let mut refined = window.into_iter().take(keep).collect::<String>();
    refined.push_str(ELLIPSIS);
    refined
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_content_is_kept_verbatim() {
        assert_eq!(refine_content("用户需要一个总结服务。"), "用户需要一个总结服务。");
        let exact = "x".repeat(MAX_CONTENT_CHARS);
        assert_eq!(refine_content(&exact), exact);
    }

    #[test]
    fn long_content_without_boundary_is_cut_hard() {
        let refined = refine_content(&"a".repeat(260));
        assert_eq!(refined.chars().count(), MAX_CONTENT_CHARS);
        assert!(refined.ends_with(ELLIPSIS));
        assert_eq!(refined, format!("{}...", "a".repeat(197)));
    }

    #[test]
    fn long_content_prefers_late_boundary() {
        let text = format!("{}。{}", "字".repeat(150), "尾".repeat(100));
        let refined = refine_content(&text);
        assert_eq!(refined, format!("{}。...", "字".repeat(150)));
        assert!(refined.chars().count() <= MAX_CONTENT_CHARS);
    }

    #[test]
    fn early_boundary_is_ignored() {
        let text = format!("{} {}", "b".repeat(40), "c".repeat(300));
        let refined = refine_content(&text);
        assert_eq!(refined.chars().count(), MAX_CONTENT_CHARS);
        assert!(refined.starts_with(&"b".repeat(40)));
        assert!(refined.ends_with(&format!("{}...", "c".repeat(10))));
    }

    #[test]
    fn boundary_at_halfway_mark_is_not_enough() {
        // Boundary char at index 100 sits exactly on the halfway mark.
        let text = format!("{},{}", "d".repeat(100), "e".repeat(200));
        let refined = refine_content(&text);
        assert_eq!(refined.chars().count(), MAX_CONTENT_CHARS);

        let text = format!("{},{}", "d".repeat(101), "e".repeat(200));
        assert_eq!(refine_content(&text), format!("{},...", "d".repeat(101)));
    }

    #[test]
    fn custom_limit_is_honoured() {
        assert_eq!(refine_with_limit("abcdef ghijklmno", 10), "abcdef ...");
        assert_eq!(refine_with_limit("abcdefghijklmno", 10), "abcdefg...");
    }
}
