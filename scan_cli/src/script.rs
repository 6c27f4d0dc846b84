//! Line commands driving the virtual switches (typed at the prompt or read
//! from a `--script` file).

use anyhow::{Result, anyhow, bail};
use scan_core::Key;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Press(Key),
    Release(Key),
    /// Press, release inside the tap window, then let the cooldown pass.
    Tap(Key),
    /// Press, keep down for the given ms, release.
    Hold(Key, u64),
    Wait(u64),
    Focus,
    Text,
    /// Wait for the newest suggestions before going on.
    Sync,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  tap scan | tap select        short press (advances clock past the cooldown)
  hold scan <ms> | hold select <ms>
  press scan | release scan    raw edges (also for select)
  wait <ms>                    advance the virtual clock
  focus                        show current focus
  text                         show the message
  sync                         wait for pending suggestions
  help
  quit";

/// `Ok(None)` for blank lines and `#` comments.
pub fn parse(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let words: Vec<&str> = line.split_whitespace().collect();
    let command = match words.as_slice() {
        ["press", key] => Command::Press(parse_key(key)?),
        ["release", key] => Command::Release(parse_key(key)?),
        ["tap", key] => Command::Tap(parse_key(key)?),
        ["hold", key, ms] => Command::Hold(parse_key(key)?, parse_ms(ms)?),
        ["wait", ms] => Command::Wait(parse_ms(ms)?),
        ["focus"] => Command::Focus,
        ["text"] => Command::Text,
        ["sync"] => Command::Sync,
        ["help"] | ["?"] => Command::Help,
        ["quit"] | ["exit"] | [":q"] => Command::Quit,
        _ => bail!("unknown command: {line}"),
    };
    Ok(Some(command))
}

fn parse_key(word: &str) -> Result<Key> {
    match word {
        "scan" | "space" => Ok(Key::Scan),
        "select" | "enter" => Ok(Key::Select),
        other => Err(anyhow!("unknown key: {other} (expected scan or select)")),
    }
}

fn parse_ms(word: &str) -> Result<u64> {
    word.trim_end_matches("ms")
        .parse()
        .map_err(|_| anyhow!("not a duration in ms: {word}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(parse("tap scan").unwrap(), Some(Command::Tap(Key::Scan)));
        assert_eq!(
            parse("  hold select 1200 ").unwrap(),
            Some(Command::Hold(Key::Select, 1200))
        );
        assert_eq!(parse("wait 600ms").unwrap(), Some(Command::Wait(600)));
        assert_eq!(parse("release enter").unwrap(), Some(Command::Release(Key::Select)));
        assert_eq!(parse("sync").unwrap(), Some(Command::Sync));
        assert_eq!(parse("quit").unwrap(), Some(Command::Quit));
    }

    #[test]
    fn blank_and_comment_lines_are_skipped() {
        assert_eq!(parse("").unwrap(), None);
        assert_eq!(parse("# wake up").unwrap(), None);
    }

    #[test]
    fn rejects_unknown_input() {
        assert!(parse("tap shift").is_err());
        assert!(parse("wait soon").is_err());
        assert!(parse("dance").is_err());
    }
}
