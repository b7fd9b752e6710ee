//! Spoken phrases per announcement language.

use std::str::FromStr;

use chess_core::MoveToken;

use crate::error::GameError;

/// Speech rate for notices (words per minute hint)
pub const RATE_NOTICE: u32 = 120;
/// Engine moves are read slower so the squares are easy to follow
pub const RATE_MOVE: u32 = 90;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Language {
    Russian,
    English,
}

impl FromStr for Language {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ru" | "russian" => Ok(Self::Russian),
            "en" | "english" => Ok(Self::English),
            _ => Err(GameError::Config("ANNOUNCE_LANGUAGE must be 'ru' or 'en'")),
        }
    }
}

/// Spell a square for speech: `e4` becomes `E 4`.
fn spoken_square(square: &str) -> String {
    square
        .chars()
        .map(|c| c.to_ascii_uppercase().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

impl Language {
    pub fn greeting(self, human_plays_white: bool) -> String {
        match (self, human_plays_white) {
            (Language::Russian, true) => "Начинаем новую партию. Вы играете белыми".into(),
            (Language::Russian, false) => "Начинаем новую партию. Вы играете черными".into(),
            (Language::English, true) => "Starting a new game. You play White".into(),
            (Language::English, false) => "Starting a new game. You play Black".into(),
        }
    }

    pub fn invalid_move(self) -> &'static str {
        match self {
            Language::Russian => "Этот ход невозможен, попробуйте снова",
            Language::English => "That move is not possible, please try again",
        }
    }

    /// Announce an engine move by origin and destination square.
    pub fn engine_move(self, mv: &MoveToken) -> String {
        let from = spoken_square(mv.from_square());
        let to = spoken_square(mv.to_square());
        let mut text = match self {
            Language::Russian => format!("Я хожу {from} на {to}"),
            Language::English => format!("I play {from} to {to}"),
        };
        if let Some(piece) = mv.promotion() {
            text.push_str(self.promotion_suffix(piece));
        }
        text
    }

    fn promotion_suffix(self, piece: char) -> &'static str {
        match (self, piece) {
            (Language::Russian, 'q') => ", превращение в ферзя",
            (Language::Russian, 'r') => ", превращение в ладью",
            (Language::Russian, 'b') => ", превращение в слона",
            (Language::Russian, _) => ", превращение в коня",
            (Language::English, 'q') => ", promoting to a queen",
            (Language::English, 'r') => ", promoting to a rook",
            (Language::English, 'b') => ", promoting to a bishop",
            (Language::English, _) => ", promoting to a knight",
        }
    }

    pub fn checkmate(self) -> &'static str {
        match self {
            Language::Russian => "Мат! Игра окончена.",
            Language::English => "Checkmate! The game is over.",
        }
    }

    pub fn no_legal_moves(self) -> &'static str {
        match self {
            Language::Russian => "Игра окончена. Нет возможных ходов.",
            Language::English => "The game is over. There are no possible moves.",
        }
    }

    pub fn abandoned(self) -> &'static str {
        match self {
            Language::Russian => "Слишком много неудачных попыток. Игра остановлена.",
            Language::English => "Too many failed attempts. The game is stopped.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_move_template() {
        let mv: MoveToken = "e7e5".parse().unwrap();
        assert_eq!(Language::Russian.engine_move(&mv), "Я хожу E 7 на E 5");
        assert_eq!(Language::English.engine_move(&mv), "I play E 7 to E 5");
    }

    #[test]
    fn test_engine_promotion() {
        let mv: MoveToken = "b2b1n".parse().unwrap();
        assert_eq!(
            Language::Russian.engine_move(&mv),
            "Я хожу B 2 на B 1, превращение в коня"
        );
    }

    #[test]
    fn test_language_parse() {
        assert_eq!("RU".parse::<Language>().unwrap(), Language::Russian);
        assert_eq!("english".parse::<Language>().unwrap(), Language::English);
        assert!("de".parse::<Language>().is_err());
    }
}
