//! Editing commands

use serde::{Deserialize, Serialize};

/// One keypress on the active entry buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Zero,
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Decimal,
    Negate,
    Backspace,
    Clear,
    Reset,
}

impl Command {
    const DIGITS: [Command; 10] = [
        Command::Zero,
        Command::One,
        Command::Two,
        Command::Three,
        Command::Four,
        Command::Five,
        Command::Six,
        Command::Seven,
        Command::Eight,
        Command::Nine,
    ];

    pub fn digit(n: u32) -> Option<Command> {
        Self::DIGITS.get(n as usize).copied()
    }

    /// Character appended to the buffer, digits only
    pub fn digit_char(self) -> Option<char> {
        let n = Self::DIGITS.iter().position(|d| *d == self)?;
        char::from_digit(n as u32, 10)
    }

    /// Commands for every character of `text`: digits, '.', and a leading '-'
    pub fn from_keys(text: &str) -> Option<Vec<Command>> {
        let mut commands = Vec::with_capacity(text.len());
        let mut negate = false;
        for (i, c) in text.chars().enumerate() {
            match c {
                '-' if i == 0 => negate = true,
                '.' => commands.push(Command::Decimal),
                _ => commands.push(Self::digit(c.to_digit(10)?)?),
            }
        }
        if negate {
            commands.push(Command::Negate);
        }
        Some(commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits() {
        assert_eq!(Command::digit(7), Some(Command::Seven));
        assert_eq!(Command::digit(10), None);
        assert_eq!(Command::Zero.digit_char(), Some('0'));
        assert_eq!(Command::Nine.digit_char(), Some('9'));
        assert_eq!(Command::Decimal.digit_char(), None);
    }

    #[test]
    fn test_from_keys() {
        assert_eq!(
            Command::from_keys("-1.5").unwrap(),
            vec![Command::One, Command::Decimal, Command::Five, Command::Negate]
        );
        assert!(Command::from_keys("1a").is_none());
        assert!(Command::from_keys("1-").is_none());
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&Command::Backspace).unwrap(), "\"backspace\"");
        let parsed: Command = serde_json::from_str("\"three\"").unwrap();
        assert_eq!(parsed, Command::Three);
    }
}
