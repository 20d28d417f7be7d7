//! Shared utility functions.

use crate::types::{ChannelId, RoleId, UserId};

/// Hard limit Discord applies to message content.
pub const MESSAGE_CONTENT_LIMIT: usize = 2000;

/// Truncates a string to a maximum number of characters with an ellipsis.
///
/// Counts `char`s rather than bytes so emoji-heavy replies never split a
/// code point.
pub fn truncate_string(input: &str, max_length: usize) -> String {
    if input.chars().count() <= max_length {
        input.to_string()
    } else {
        let kept: String = input.chars().take(max_length.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Parses a channel reference: `<#123>` or a bare id.
pub fn parse_channel_mention(input: &str) -> Option<ChannelId> {
    parse_mention(input, &["<#"]).map(ChannelId)
}

/// Parses a user reference: `<@123>`, `<@!123>` or a bare id.
pub fn parse_user_mention(input: &str) -> Option<UserId> {
    parse_mention(input, &["<@!", "<@"]).map(UserId)
}

/// Parses a role reference: `<@&123>` or a bare id.
pub fn parse_role_mention(input: &str) -> Option<RoleId> {
    parse_mention(input, &["<@&"]).map(RoleId)
}

fn parse_mention(input: &str, openers: &[&str]) -> Option<u64> {
    let input = input.trim();
    let inner = openers
        .iter()
        .find_map(|opener| input.strip_prefix(opener))
        .map_or(Some(input), |rest| rest.strip_suffix('>'))?;

    if inner.is_empty() || !inner.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    inner.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        let input = "This is a very long string that should be truncated";
        let truncated = truncate_string(input, 20);
        assert_eq!(truncated, "This is a very lo...");

        let short = "Short";
        let not_truncated = truncate_string(short, 20);
        assert_eq!(not_truncated, "Short");
    }

    #[test]
    fn test_truncate_string_respects_char_boundaries() {
        let input = "🔒🔒🔒🔒🔒🔒";
        assert_eq!(truncate_string(input, 5), "🔒🔒...");
    }

    #[test]
    fn test_parse_channel_mention() {
        assert_eq!(parse_channel_mention("<#42>"), Some(ChannelId(42)));
        assert_eq!(parse_channel_mention("42"), Some(ChannelId(42)));
        assert_eq!(parse_channel_mention("<#42"), None);
        assert_eq!(parse_channel_mention("<@42>"), None);
        assert_eq!(parse_channel_mention("general"), None);
    }

    #[test]
    fn test_parse_user_mention_variants() {
        assert_eq!(parse_user_mention("<@7>"), Some(UserId(7)));
        assert_eq!(parse_user_mention("<@!7>"), Some(UserId(7)));
        assert_eq!(parse_user_mention(" 7 "), Some(UserId(7)));
        assert_eq!(parse_user_mention("<@&7>"), None);
    }

    #[test]
    fn test_parse_role_mention() {
        assert_eq!(parse_role_mention("<@&99>"), Some(RoleId(99)));
        assert_eq!(parse_role_mention("<@>"), None);
    }
}
