//! Shared helper functions for CLI commands

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Escape a field for tab-separated output
pub fn escape_tsv(s: &str) -> String {
    s.replace(['\t', '\n', '\r'], " ")
}

/// Parse a `LEVEL=COUNT` assignment; `-` or an empty count clears the level
pub fn parse_level_assignment(s: &str) -> Result<(u8, Option<u32>), String> {
    let (level, count) = s
        .split_once('=')
        .ok_or_else(|| format!("expected LEVEL=COUNT, got '{}'", s))?;

    let level: u8 = level
        .trim()
        .parse()
        .map_err(|_| format!("invalid level '{}'", level.trim()))?;

    let count = match count.trim() {
        "" | "-" => None,
        c => Some(
            c.parse::<u32>()
                .map_err(|_| format!("invalid misfire count '{}'", c))?,
        ),
    };

    Ok((level, count))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
    }

    #[test]
    fn test_escape_tsv() {
        assert_eq!(escape_tsv("lot\t7\nB"), "lot 7 B");
    }

    #[test]
    fn test_parse_level_assignment() {
        assert_eq!(parse_level_assignment("8=25"), Ok((8, Some(25))));
        assert_eq!(parse_level_assignment(" 16 = 0 "), Ok((16, Some(0))));
        assert_eq!(parse_level_assignment("3=-"), Ok((3, None)));
        assert_eq!(parse_level_assignment("3="), Ok((3, None)));
        assert!(parse_level_assignment("8").is_err());
        assert!(parse_level_assignment("x=1").is_err());
        assert!(parse_level_assignment("8=-1").is_err());
    }
}
