use thiserror::Error;

use crate::models::{NewFeed, ValidationError};

/// What the process was asked to do.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Tui,
    List,
    Add(NewFeed),
    Delete(i64),
}

#[derive(Debug, PartialEq, Eq, Error)]
pub enum CliError {
    #[error("Usage: livefeeds --add <name> <url>")]
    AddUsage,
    #[error("Usage: livefeeds --delete <id>")]
    DeleteUsage,
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl Command {
    /// Parses `std::env::args()`; the first element is the program name.
    pub fn parse(args: &[String]) -> Result<Self, CliError> {
        match args.get(1).map(String::as_str) {
            Some("--list") => Ok(Command::List),
            Some("--add") => {
                let (Some(name), Some(url)) = (args.get(2), args.get(3)) else {
                    return Err(CliError::AddUsage);
                };
                Ok(Command::Add(NewFeed::new(name, url)?))
            }
            Some("--delete") => args
                .get(2)
                .and_then(|s| s.parse().ok())
                .map(Command::Delete)
                .ok_or(CliError::DeleteUsage),
            _ => Ok(Command::Tui),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("livefeeds")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn no_flag_starts_the_tui() {
        assert_eq!(Command::parse(&args(&[])), Ok(Command::Tui));
        assert_eq!(Command::parse(&args(&["--list"])), Ok(Command::List));
    }

    #[test]
    fn add_validates_before_touching_the_store() {
        let err = Command::parse(&args(&["--add", "", "https://lichess.org/x"])).unwrap_err();
        assert_eq!(err, CliError::Invalid(ValidationError::MissingName));
        assert_eq!(err.to_string(), "Please fill in both fields! (name is empty)");
    }

    #[test]
    fn add_with_both_fields_yields_a_feed() {
        let Ok(Command::Add(feed)) = Command::parse(&args(&["--add", "Board", "https://example.com/s"]))
        else {
            panic!("expected an add command");
        };
        assert_eq!(feed.name, "Board");
        assert_eq!(feed.url, "https://example.com/s");
    }

    #[test]
    fn missing_or_malformed_arguments_report_usage() {
        assert_eq!(Command::parse(&args(&["--add", "Only"])), Err(CliError::AddUsage));
        assert_eq!(Command::parse(&args(&["--delete", "zz"])), Err(CliError::DeleteUsage));
        assert_eq!(Command::parse(&args(&["--delete"])), Err(CliError::DeleteUsage));
        assert_eq!(
            CliError::DeleteUsage.to_string(),
            "Usage: livefeeds --delete <id>"
        );
        assert_eq!(Command::parse(&args(&["--delete", "42"])), Ok(Command::Delete(42)));
    }
}
