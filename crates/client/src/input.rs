//! Input processing for the terminal client.
//!
//! This module owns the line-to-command mapping so the rest of the
//! application can remain agnostic about concrete command words.

/// High-level outcome of parsing one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    Start,
    /// Pick the tile with this 1-based board position.
    Pick(usize),
    Next,
    Reveal,
    Menu,
    Again,
    Rename(String),
    ClearHistory,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

/// Parses a line typed by the player. Command words are case-insensitive.
pub fn parse_line(line: &str) -> InputCommand {
    let line = line.trim();
    if line.is_empty() {
        return InputCommand::Empty;
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    if let Ok(position) = word.parse::<usize>() {
        return match position {
            0 => InputCommand::Unknown(line.to_string()),
            n if rest.is_empty() => InputCommand::Pick(n),
            _ => InputCommand::Unknown(line.to_string()),
        };
    }

    match word.to_ascii_lowercase().as_str() {
        "start" | "s" | "play" => InputCommand::Start,
        "next" | "n" => InputCommand::Next,
        "reveal" | "r" => InputCommand::Reveal,
        "menu" | "m" => InputCommand::Menu,
        "again" | "retry" => InputCommand::Again,
        "name" | "rename" => InputCommand::Rename(rest.to_string()),
        "clear" => InputCommand::ClearHistory,
        "help" | "h" | "?" => InputCommand::Help,
        "quit" | "q" | "exit" => InputCommand::Quit,
        _ => InputCommand::Unknown(line.to_string()),
    }
}

pub const HELP: &str = "\
Commands:
  start         begin a run from the menu
  1..12         pick a tile
  reveal        show the answers after a round
  next          load the next case
  again         start over after game over
  menu          return to the menu
  name <new>    change your player name
  clear         forget recently played diagnoses
  quit          exit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_words_and_numbers() {
        assert_eq!(parse_line("start"), InputCommand::Start);
        assert_eq!(parse_line("  NEXT "), InputCommand::Next);
        assert_eq!(parse_line("7"), InputCommand::Pick(7));
        assert_eq!(parse_line("12"), InputCommand::Pick(12));
        assert_eq!(parse_line("q"), InputCommand::Quit);
        assert_eq!(parse_line(""), InputCommand::Empty);
    }

    #[test]
    fn rename_keeps_the_rest_of_the_line() {
        assert_eq!(
            parse_line("name  Dr. Ana  Lima "),
            InputCommand::Rename("Dr. Ana  Lima".to_string())
        );
        assert_eq!(parse_line("name"), InputCommand::Rename(String::new()));
    }

    #[test]
    fn rejects_zero_and_noise() {
        assert_eq!(parse_line("0"), InputCommand::Unknown("0".to_string()));
        assert_eq!(parse_line("3 4"), InputCommand::Unknown("3 4".to_string()));
        assert_eq!(
            parse_line("diagnose"),
            InputCommand::Unknown("diagnose".to_string())
        );
    }
}
