use super::{CommandInfo, CommandType};

/// Turns raw input lines into [`CommandInfo`] values.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandParser;

impl CommandParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse one input line.
    ///
    /// Returns `None` for blank input, an unknown namespace, a namespace not
    /// followed by whitespace, or (outside `/help`) a missing or unknown
    /// subcommand.
    pub fn parse_command(&self, input_text: &str) -> Option<CommandInfo> {
        let input = input_text.trim();
        if input.is_empty() {
            return None;
        }

        let command_type = identify_command_type(input)?;
        let rest = &input[command_type.prefix().len()..];
        if !(rest.is_empty() || rest.starts_with(char::is_whitespace)) {
            return None;
        }
        let rest = rest.trim_start();

        let (subcommand, args_str) = if command_type == CommandType::Help {
            (None, rest)
        } else {
            let (token, remainder) = rest
                .split_once(char::is_whitespace)
                .unwrap_or((rest, ""));
            let token = token.to_lowercase();
            if !command_type.subcommands().contains(&token.as_str()) {
                return None;
            }
            (Some(token), remainder)
        };

        Some(CommandInfo {
            command_type,
            subcommand,
            arguments: tokenize_arguments(args_str),
            raw_input: input.to_string(),
        })
    }

    /// `/help` is always valid; everything else needs an allowed subcommand.
    pub fn validate_command(&self, command_info: &CommandInfo) -> bool {
        if command_info.command_type == CommandType::Help {
            return true;
        }
        command_info
            .subcommand
            .as_deref()
            .is_some_and(|sub| command_info.command_type.subcommands().contains(&sub))
    }
}

/// Longest namespace prefix of `input`, compared case-insensitively.
fn identify_command_type(input: &str) -> Option<CommandType> {
    CommandType::ALL
        .into_iter()
        .filter(|t| {
            let prefix = t.prefix();
            input
                .get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
        })
        .max_by_key(|t| t.prefix().len())
}

/// Split an argument string on whitespace.
///
/// Double quotes group words and are dropped; a backslash makes the next
/// character literal. Empty tokens are never produced.
pub fn tokenize_arguments(args: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape_next = false;

    for c in args.chars() {
        if escape_next {
            current.push(c);
            escape_next = false;
        } else if c == '\\' {
            escape_next = true;
        } else if c == '"' {
            in_quotes = !in_quotes;
        } else if c.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
        } else {
            current.push(c);
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}
