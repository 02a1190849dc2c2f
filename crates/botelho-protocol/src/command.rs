//! Chat commands understood by the bot.

use botelho_core::pizza;

use crate::types::Message;

/// A recognised chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/status`: last known open/closed state.
    Status,
    /// `/historico`: link to the occupancy history.
    History,
    /// `/grana`: this month's finances.
    Finances,
    /// `/quém`: a duck.
    Duck,
    /// `/boo`: a ghost.
    Boo,
    /// `/quem`: who is in the space.
    Who,
    /// `/quando`: next event.
    When,
    /// `/pizza`: ask how many people want pizza.
    Pizza,
    /// A reply to the pizza question, carrying the raw answer.
    PizzaAnswer(String),
}

/// Prefixes in matching order. `/quém` must be tried before `/quem`.
const PREFIXES: [(&str, Command); 8] = [
    ("/status", Command::Status),
    ("/historico", Command::History),
    ("/grana", Command::Finances),
    ("/quém", Command::Duck),
    ("/boo", Command::Boo),
    ("/quem", Command::Who),
    ("/quando", Command::When),
    ("/pizza", Command::Pizza),
];

impl Command {
    /// Matches `text` against the command prefixes.
    ///
    /// Anything after the prefix (arguments, `@botname`) is ignored.
    pub fn from_text(text: &str) -> Option<Self> {
        PREFIXES
            .iter()
            .find(|(prefix, _)| text.starts_with(prefix))
            .map(|(_, command)| command.clone())
    }

    /// Parses a message: commands first, then replies to the pizza question.
    pub fn parse(message: &Message) -> Option<Self> {
        let text = message.text();
        if let Some(command) = Self::from_text(text) {
            return Some(command);
        }
        match message.reply_to_text() {
            Some(original) if original.starts_with(pizza::PROMPT) => {
                Some(Self::PizzaAnswer(text.to_string()))
            }
            _ => None,
        }
    }

    /// Short name for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::History => "historico",
            Self::Finances => "grana",
            Self::Duck => "quém",
            Self::Boo => "boo",
            Self::Who => "quem",
            Self::When => "quando",
            Self::Pizza => "pizza",
            Self::PizzaAnswer(_) => "pizza-answer",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Chat;

    fn message(text: &str, reply_to: Option<&str>) -> Message {
        let chat = Chat {
            id: -1,
            kind: "group".to_string(),
            title: None,
        };
        Message {
            message_id: 2,
            from: None,
            chat: chat.clone(),
            date: 0,
            text: Some(text.to_string()),
            reply_to_message: reply_to.map(|t| {
                Box::new(Message {
                    message_id: 1,
                    from: None,
                    chat,
                    date: 0,
                    text: Some(t.to_string()),
                    reply_to_message: None,
                })
            }),
        }
    }

    #[test]
    fn matches_each_prefix() {
        assert_eq!(Command::from_text("/status"), Some(Command::Status));
        assert_eq!(Command::from_text("/historico"), Some(Command::History));
        assert_eq!(Command::from_text("/grana"), Some(Command::Finances));
        assert_eq!(Command::from_text("/boo"), Some(Command::Boo));
        assert_eq!(Command::from_text("/quando"), Some(Command::When));
        assert_eq!(Command::from_text("/pizza"), Some(Command::Pizza));
    }

    #[test]
    fn accented_quem_is_the_duck() {
        assert_eq!(Command::from_text("/quém"), Some(Command::Duck));
        assert_eq!(Command::from_text("/quem"), Some(Command::Who));
    }

    #[test]
    fn suffixes_are_ignored() {
        assert_eq!(
            Command::from_text("/status@lhc_bot"),
            Some(Command::Status)
        );
        assert_eq!(Command::from_text("/quem agora?"), Some(Command::Who));
        // Prefix matching: "/statusx" still counts.
        assert_eq!(Command::from_text("/statusx"), Some(Command::Status));
    }

    #[test]
    fn unknown_text_is_ignored() {
        assert_eq!(Command::from_text("bom dia"), None);
        assert_eq!(Command::from_text(" /status"), None);
        assert_eq!(Command::from_text(""), None);
    }

    #[test]
    fn reply_to_pizza_prompt() {
        let msg = message("7", Some(pizza::PROMPT));
        assert_eq!(
            Command::parse(&msg),
            Some(Command::PizzaAnswer("7".to_string()))
        );
    }

    #[test]
    fn reply_to_something_else_is_ignored() {
        let msg = message("7", Some("O LHC está aberto🔓"));
        assert_eq!(Command::parse(&msg), None);
    }

    #[test]
    fn command_wins_over_pizza_reply() {
        let msg = message("/status", Some(pizza::PROMPT));
        assert_eq!(Command::parse(&msg), Some(Command::Status));
    }
}
