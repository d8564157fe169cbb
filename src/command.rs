//! Recognizes the two input surfaces: `/sor` and the legacy `!sor` prefix.

/// Result of parsing a message that addressed the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// A question to forward to the AI backend.
    Ask(String),
    /// The trigger was used with no question after it.
    MissingQuestion,
}

/// Parse a message text. Returns `None` for messages that are not for us,
/// including `/sor@othername` aimed at a different bot.
pub fn parse(text: &str, bot_username: Option<&str>) -> Option<Invocation> {
    let rest = if let Some(rest) = text.strip_prefix("/sor") {
        // An @mention after the command must be ours.
        if let Some(mention) = rest.strip_prefix('@') {
            let (name, tail) = mention
                .split_once(char::is_whitespace)
                .unwrap_or((mention, ""));
            match bot_username {
                Some(me) if name.eq_ignore_ascii_case(me) => tail,
                _ => return None,
            }
        } else if rest.is_empty() || rest.starts_with(char::is_whitespace) {
            rest
        } else {
            return None;
        }
    } else if let Some(rest) = text.strip_prefix("!sor") {
        if rest.is_empty() || rest.starts_with(char::is_whitespace) {
            rest
        } else {
            return None;
        }
    } else {
        return None;
    };

    let question = rest.split_whitespace().collect::<Vec<_>>().join(" ");
    if question.is_empty() {
        Some(Invocation::MissingQuestion)
    } else {
        Some(Invocation::Ask(question))
    }
}
