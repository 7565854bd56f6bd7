//! Parsing of the commands typed while a chapter is playing.

use novelvox_core::{PlaybackSpeed, Voice};

use crate::error::CliError;

/// One reader command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderCommand {
    TogglePlay,
    Next,
    Restart,
    Voice(Voice),
    Speed(PlaybackSpeed),
    Retry,
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "\
  p            play / pause
  n            next paragraph
  r            restart paragraph
  v <voice>    change voice (see `novelvox voices`)
  s <speed>    change speed (0.5 .. 2)
  retry        retry after an error
  status       show playback position
  q            quit";

/// Parse one line of input. Blank lines yield `None`.
pub fn parse_reader_command(line: &str) -> Result<Option<ReaderCommand>, CliError> {
    let mut parts = line.split_whitespace();
    let Some(word) = parts.next() else {
        return Ok(None);
    };
    let rest = parts.collect::<Vec<_>>().join(" ");

    let command = match word.to_ascii_lowercase().as_str() {
        "p" | "play" | "pause" => ReaderCommand::TogglePlay,
        "n" | "next" => ReaderCommand::Next,
        "r" | "restart" => ReaderCommand::Restart,
        "retry" => ReaderCommand::Retry,
        "status" => ReaderCommand::Status,
        "h" | "help" | "?" => ReaderCommand::Help,
        "q" | "quit" | "exit" => ReaderCommand::Quit,
        "v" | "voice" => ReaderCommand::Voice(
            rest.parse()
                .map_err(|e: novelvox_core::ParseVoiceError| CliError::Arguments(e.to_string()))?,
        ),
        "s" | "speed" => ReaderCommand::Speed(
            rest.parse()
                .map_err(|e: novelvox_core::ParseSpeedError| CliError::Arguments(e.to_string()))?,
        ),
        other => {
            return Err(CliError::Arguments(format!(
                "unknown command '{other}', type 'help'"
            )));
        }
    };
    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_letter_commands() {
        assert_eq!(parse_reader_command("p").unwrap(), Some(ReaderCommand::TogglePlay));
        assert_eq!(parse_reader_command(" n ").unwrap(), Some(ReaderCommand::Next));
        assert_eq!(parse_reader_command("R").unwrap(), Some(ReaderCommand::Restart));
        assert_eq!(parse_reader_command("q").unwrap(), Some(ReaderCommand::Quit));
        assert_eq!(parse_reader_command("retry").unwrap(), Some(ReaderCommand::Retry));
    }

    #[test]
    fn test_blank_line_is_ignored() {
        assert_eq!(parse_reader_command("   ").unwrap(), None);
    }

    #[test]
    fn test_voice_and_speed_arguments() {
        assert_eq!(
            parse_reader_command("v sonia").unwrap(),
            Some(ReaderCommand::Voice(Voice::Sonia))
        );
        assert_eq!(
            parse_reader_command("s 1.25").unwrap(),
            Some(ReaderCommand::Speed(PlaybackSpeed::OneAndQuarter))
        );
        assert!(parse_reader_command("s 3").is_err());
        assert!(parse_reader_command("v").is_err());
    }

    #[test]
    fn test_unknown_command() {
        let err = parse_reader_command("jump 4").unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
