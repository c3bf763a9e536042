/// A recognized user intent. Anything else is `Unrecognized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Ping,
    TodayLessons,
    TomorrowLessons,
    Weather,
    NewYear,
    Unrecognized,
}

impl Command {
    pub const START: &'static str = "/start";
    pub const HELP: &'static str = "/help";
    pub const PING: &'static str = "/ping";
    pub const TODAY: &'static str = "/today";
    pub const TOMORROW: &'static str = "/tomorrow";
    pub const WEATHER: &'static str = "/weather";
    pub const NEW_YEAR: &'static str = "/newyear";

    fn from_literal(text: &str) -> Self {
        match text {
            Self::START => Command::Start,
            Self::HELP => Command::Help,
            Self::PING => Command::Ping,
            Self::TODAY => Command::TodayLessons,
            Self::TOMORROW => Command::TomorrowLessons,
            Self::WEATHER => Command::Weather,
            Self::NEW_YEAR => Command::NewYear,
            _ => Command::Unrecognized,
        }
    }
}

/// Removes the first occurrence of `mention` from `text`.
/// In group chats Telegram clients send commands as `/today@botname`.
fn strip_mention(text: &str, mention: &str) -> String {
    if mention.is_empty() {
        return text.to_string();
    }
    text.replacen(mention, "", 1)
}

/// Classify raw message text. Total over all inputs.
pub fn classify(text: &str, bot_mention: &str) -> Command {
    Command::from_literal(&strip_mention(text, bot_mention))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOT: &str = "@student_verochka_bot";

    #[test]
    fn test_plain_commands() {
        assert_eq!(classify("/start", BOT), Command::Start);
        assert_eq!(classify("/help", BOT), Command::Help);
        assert_eq!(classify("/ping", BOT), Command::Ping);
        assert_eq!(classify("/today", BOT), Command::TodayLessons);
        assert_eq!(classify("/tomorrow", BOT), Command::TomorrowLessons);
        assert_eq!(classify("/weather", BOT), Command::Weather);
        assert_eq!(classify("/newyear", BOT), Command::NewYear);
    }

    #[test]
    fn test_mention_is_stripped() {
        assert_eq!(
            classify("/today@student_verochka_bot", BOT),
            Command::TodayLessons
        );
        assert_eq!(classify("/ping@student_verochka_bot", BOT), Command::Ping);
    }

    #[test]
    fn test_only_first_mention_is_stripped() {
        assert_eq!(strip_mention("/ping @bot @bot", "@bot"), "/ping  @bot");
        assert_eq!(classify("/ping@bot@bot", "@bot"), Command::Unrecognized);
        assert_eq!(classify("/ping @bot @bot", "@bot"), Command::Unrecognized);
    }

    #[test]
    fn test_exact_match_only() {
        assert_eq!(classify("/Start", BOT), Command::Unrecognized);
        assert_eq!(classify("/start ", BOT), Command::Unrecognized);
        assert_eq!(classify(" /start", BOT), Command::Unrecognized);
        assert_eq!(classify("/starts", BOT), Command::Unrecognized);
        assert_eq!(classify("hello", BOT), Command::Unrecognized);
        assert_eq!(classify("", BOT), Command::Unrecognized);
    }

    #[test]
    fn test_other_bot_mention_is_not_stripped() {
        assert_eq!(classify("/today@other_bot", BOT), Command::Unrecognized);
    }

    #[test]
    fn test_empty_mention_strips_nothing() {
        assert_eq!(classify("/help", ""), Command::Help);
        assert_eq!(classify("/help@bot", ""), Command::Unrecognized);
    }

    #[test]
    fn test_classify_is_deterministic() {
        for text in ["/weather", "/weather@student_verochka_bot", "random", "🎄"] {
            assert_eq!(classify(text, BOT), classify(text, BOT));
        }
    }
}
