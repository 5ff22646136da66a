use std::fmt;

/// Telegram chat id (numeric). Identifies one conversation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bot commands understood by the conversation engine.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Command {
    /// `/start`, also the state of a conversation seen for the first time.
    #[default]
    Start,
    /// `/posts`: list recent posts and wait for a post number.
    Posts,
    /// `/details`: wait for a post URL.
    Details,
    /// Any other `/command`.
    Unrecognized(String),
}

impl Command {
    /// Parse a command message.
    ///
    /// Telegram may send `/cmd@botname arg1 ...`; only the command token counts.
    pub fn parse(text: &str) -> Self {
        let first = text.split_whitespace().next().unwrap_or("");
        let name = first
            .trim_start_matches('/')
            .split('@')
            .next()
            .unwrap_or("")
            .to_lowercase();

        match name.as_str() {
            "start" => Command::Start,
            "posts" => Command::Posts,
            "details" => Command::Details,
            _ => Command::Unrecognized(name),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Command::Start => "start",
            Command::Posts => "posts",
            Command::Details => "details",
            Command::Unrecognized(name) => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_commands() {
        assert_eq!(Command::parse("/start"), Command::Start);
        assert_eq!(Command::parse("/posts"), Command::Posts);
        assert_eq!(Command::parse("/details"), Command::Details);
    }

    #[test]
    fn strips_bot_mention_and_args() {
        assert_eq!(Command::parse("/posts@forhire_bot"), Command::Posts);
        assert_eq!(Command::parse("/Details now"), Command::Details);
    }

    #[test]
    fn unknown_commands_keep_their_name() {
        let cmd = Command::parse("/help");
        assert_eq!(cmd, Command::Unrecognized("help".to_string()));
        assert_eq!(cmd.name(), "help");
    }
}
