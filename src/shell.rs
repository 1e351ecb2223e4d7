//! Line input for the interactive shell.
//!
//! A terminal gets a rustyline editor with slash-command completion and a
//! persistent history; piped input is read line by line from any
//! [`AsyncBufRead`].

use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::sync::mpsc as std_mpsc;

use rustyline::completion::Completer;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;

use crate::commands::CommandType;
use crate::console::Console;

pub const PROMPT: &str = "$ ";

const HISTORY_FILE: &str = "shell_history";

/// One read from the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellInput {
    Line(String),
    /// Ctrl+C at the prompt
    Interrupted,
    Eof,
}

pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> impl Future<Output = io::Result<ShellInput>>;
}

/// Lines from a byte stream. Invalid UTF-8 is replaced, never fatal.
pub struct ReaderLines<R> {
    reader: R,
    console: Console,
    buf: Vec<u8>,
}

impl<R: AsyncBufRead + Unpin> ReaderLines<R> {
    pub fn new(reader: R, console: Console) -> Self {
        Self {
            reader,
            console,
            buf: Vec::new(),
        }
    }
}

impl<R: AsyncBufRead + Unpin> LineSource for ReaderLines<R> {
    async fn read_line(&mut self, prompt: &str) -> io::Result<ShellInput> {
        self.console.print_inline(prompt);
        self.buf.clear();
        let read = tokio::select! {
            read = self.reader.read_until(b'\n', &mut self.buf) => read?,
            _ = tokio::signal::ctrl_c() => {
                self.console.blank_line();
                return Ok(ShellInput::Interrupted);
            },
        };
        if read == 0 {
            return Ok(ShellInput::Eof);
        }

        let line = String::from_utf8_lossy(&self.buf);
        if let std::borrow::Cow::Owned(_) = line {
            tracing::warn!("Input line contained invalid UTF-8");
        }
        Ok(ShellInput::Line(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

/// Terminal line editor running on a blocking thread.
///
/// The editor itself never leaves that thread; prompts go in over one
/// channel and lines come back over another.
pub struct LineEditor {
    prompts: std_mpsc::Sender<String>,
    replies: mpsc::UnboundedReceiver<io::Result<ShellInput>>,
}

impl LineEditor {
    pub fn spawn() -> Self {
        let (prompts, prompt_rx) = std_mpsc::channel::<String>();
        let (reply_tx, replies) = mpsc::unbounded_channel();
        tokio::task::spawn_blocking(move || editor_loop(prompt_rx, reply_tx));
        Self { prompts, replies }
    }
}

impl LineSource for LineEditor {
    async fn read_line(&mut self, prompt: &str) -> io::Result<ShellInput> {
        if self.prompts.send(prompt.to_string()).is_err() {
            return Ok(ShellInput::Eof);
        }
        self.replies.recv().await.unwrap_or(Ok(ShellInput::Eof))
    }
}

fn editor_loop(
    prompts: std_mpsc::Receiver<String>,
    replies: mpsc::UnboundedSender<io::Result<ShellInput>>,
) {
    let mut editor = match Editor::<SlashHelper, DefaultHistory>::new() {
        Ok(editor) => editor,
        Err(e) => {
            let _ = replies.send(Err(io::Error::other(e)));
            return;
        },
    };
    editor.set_helper(Some(SlashHelper));

    let history = history_path();
    if let Some(path) = history.as_ref().filter(|p| p.exists()) {
        if let Err(e) = editor.load_history(path) {
            tracing::warn!("Failed to load shell history from {}: {}", path.display(), e);
        }
    }

    // Ends when the session drops its sender
    while let Ok(prompt) = prompts.recv() {
        let input = match editor.readline(&prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = editor.add_history_entry(line.as_str());
                }
                Ok(ShellInput::Line(line))
            },
            Err(ReadlineError::Interrupted) => Ok(ShellInput::Interrupted),
            Err(ReadlineError::Eof) => Ok(ShellInput::Eof),
            Err(e) => Err(io::Error::other(e)),
        };
        if replies.send(input).is_err() {
            break;
        }
    }

    if let Some(path) = &history {
        if let Some(dir) = path.parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        if let Err(e) = editor.save_history(path) {
            tracing::warn!("Failed to save shell history to {}: {}", path.display(), e);
        }
    }
}

/// `~/.eol-tester/shell_history`
pub fn history_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".eol-tester").join(HISTORY_FILE))
}

/// Completion candidates for the text left of the cursor.
///
/// Returns the byte offset where the completed word starts and the
/// candidates that extend it: namespaces for the first word, subcommands
/// for the second (namespace names after `/help`).
pub fn complete_slash(line: &str) -> (usize, Vec<String>) {
    let word_start = line
        .rfind(char::is_whitespace)
        .map(|i| i + 1)
        .unwrap_or(0);
    let word = &line[word_start..];
    let previous: Vec<&str> = line[..word_start].split_whitespace().collect();

    let candidates: Vec<String> = match previous.as_slice() {
        [] => CommandType::ALL
            .iter()
            .map(CommandType::prefix)
            .filter(|p| p.starts_with(word))
            .map(str::to_string)
            .collect(),
        [namespace] => match CommandType::ALL.iter().find(|t| t.prefix() == *namespace) {
            Some(CommandType::Help) => CommandType::ALL
                .iter()
                .filter(|t| t.device().is_some())
                .map(CommandType::name)
                .filter(|n| n.starts_with(word))
                .map(str::to_string)
                .collect(),
            Some(command_type) => command_type
                .subcommands()
                .iter()
                .filter(|s| s.starts_with(word))
                .map(|s| s.to_string())
                .collect(),
            None => Vec::new(),
        },
        _ => Vec::new(),
    };
    (word_start, candidates)
}

struct SlashHelper;

impl Completer for SlashHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        Ok(complete_slash(&line[..pos]))
    }
}

impl Hinter for SlashHelper {
    type Hint = String;
}

impl Highlighter for SlashHelper {}

impl Validator for SlashHelper {}

impl Helper for SlashHelper {}
