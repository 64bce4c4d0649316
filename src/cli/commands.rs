// Slash command parsing for the interactive session

use crate::document::{CopyTarget, SectionKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    /// List the catalog with the current selection
    Caps,
    Toggle(String),
    Generate(String),
    Show,
    Edit(SectionKey, String),
    EditCapability(String, String),
    Copy(CopyTarget),
    Improve,
    Cancel,
    Apply(String),
    New,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command {0}; type /help for commands")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

impl Command {
    /// Parse one input line. Returns `None` for input that is not a slash
    /// command.
    pub fn parse(input: &str) -> Option<Result<Self, CommandError>> {
        let input = input.trim();
        if !input.starts_with('/') {
            return None;
        }
        let (name, rest) = match input.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (input, ""),
        };

        let command = match name {
            "/help" => Ok(Command::Help),
            "/quit" | "/exit" => Ok(Command::Quit),
            "/caps" => Ok(Command::Caps),
            "/show" => Ok(Command::Show),
            "/improve" => Ok(Command::Improve),
            "/cancel" => Ok(Command::Cancel),
            "/new" => Ok(Command::New),
            "/toggle" => non_empty(rest, "/toggle <capability>").map(Command::Toggle),
            "/generate" => non_empty(rest, "/generate <case description>").map(Command::Generate),
            "/apply" => non_empty(rest, "/apply <instruction>").map(Command::Apply),
            "/copy" => rest
                .parse()
                .map(Command::Copy)
                .map_err(|_| CommandError::Usage("/copy <section> | /copy capabilities.<name>")),
            "/edit" => parse_edit(rest),
            "/edit-cap" => parse_edit_capability(rest),
            other => Err(CommandError::Unknown(other.to_string())),
        };
        Some(command)
    }
}

fn non_empty(rest: &str, usage: &'static str) -> Result<String, CommandError> {
    if rest.is_empty() {
        Err(CommandError::Usage(usage))
    } else {
        Ok(rest.to_string())
    }
}

fn parse_edit(rest: &str) -> Result<Command, CommandError> {
    const USAGE: &str = "/edit <brief_description|reflection|learning_needs> <text>";
    let (section, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    let key: SectionKey = section.parse().map_err(|_| CommandError::Usage(USAGE))?;
    if !key.is_text() {
        return Err(CommandError::Usage(USAGE));
    }
    Ok(Command::Edit(key, text.trim().to_string()))
}

/// Capability names contain spaces, so the text follows a `|`.
fn parse_edit_capability(rest: &str) -> Result<Command, CommandError> {
    const USAGE: &str = "/edit-cap <capability> | <text>";
    match rest.split_once('|') {
        Some((name, text)) if !name.trim().is_empty() => Ok(Command::EditCapability(
            name.trim().to_string(),
            text.trim().to_string(),
        )),
        _ => Err(CommandError::Usage(USAGE)),
    }
}

pub fn format_help() -> String {
    r#"Available commands:
  /caps                         - List capabilities and the current selection
  /toggle <capability>          - Select or deselect a capability (max 3)
  /generate <description>       - Generate a case review
  /show                         - Show the current review
  /edit <section> <text>        - Replace brief_description, reflection or learning_needs
  /edit-cap <capability> | <text> - Replace one capability section
  /copy <section>               - Copy a section (capabilities copies all entries)
  /copy capabilities.<name>     - Copy a single capability entry
  /improve                      - Open the improvement prompt
  /apply <instruction>          - Submit improvement instructions
  /cancel                       - Close the improvement prompt
  /new                          - Discard the review and start a new case
  /help                         - Show this help message
  /quit                         - Exit"#
        .to_string()
}
