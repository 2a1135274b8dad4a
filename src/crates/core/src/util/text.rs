/// Cuts `s` to at most `max` bytes on a char boundary, marking the cut.
pub fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...[truncated {} bytes]", &s[..end], s.len() - end)
}

#[cfg(test)]
mod tests {
    use super::truncate;

    #[test]
    fn short_strings_are_untouched() {
        assert_eq!(truncate("abc", 10), "abc");
    }

    #[test]
    fn cut_respects_char_boundaries() {
        let cut = truncate("ééé", 3);
        assert!(cut.starts_with('é'));
        assert!(cut.ends_with("[truncated 4 bytes]"));
    }
}
