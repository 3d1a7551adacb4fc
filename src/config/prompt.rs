//! Interactive input sources for settings that no other layer supplied.

use std::io::{self, BufRead, IsTerminal, Write};

/// Source of answers for interactive prompts.
///
/// The resolver only prompts when [`InputSource::is_interactive`] is true;
/// otherwise a missing required field is an error.
pub trait InputSource {
    /// Whether a person can answer prompts.
    fn is_interactive(&self) -> bool;

    /// Show `message` and read one line of input, without the line ending.
    fn prompt(&mut self, message: &str) -> io::Result<String>;
}

/// Prompts on stderr and reads answers from stdin.
#[derive(Debug, Default)]
pub struct TerminalInput;

impl InputSource for TerminalInput {
    fn is_interactive(&self) -> bool {
        io::stdin().is_terminal()
    }

    fn prompt(&mut self, message: &str) -> io::Result<String> {
        let mut stderr = io::stderr().lock();
        write!(stderr, "{message}")?;
        stderr.flush()?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// Never answers; used with `--no-input` for scripted runs.
#[derive(Debug, Default)]
pub struct NoInput;

impl InputSource for NoInput {
    fn is_interactive(&self) -> bool {
        false
    }

    fn prompt(&mut self, _message: &str) -> io::Result<String> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "interactive input is disabled",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_input_is_not_interactive() {
        assert!(!NoInput.is_interactive());
    }

    #[test]
    fn test_no_input_refuses_to_prompt() {
        let err = NoInput.prompt("Enter host: ").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);
    }

    #[test]
    fn test_input_sources_are_object_safe() {
        let mut sources: Vec<Box<dyn InputSource>> =
            vec![Box::new(NoInput), Box::new(TerminalInput)];
        assert!(!sources[0].is_interactive());
        assert!(sources[0].prompt("x").is_err());
    }
}
