//! Console output for slash commands.
//!
//! All user-facing output of the command handlers goes through a [`Console`].
//! The default sink is stdout; tests use an in-memory buffer.

use std::io::Write;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
}

impl MessageKind {
    pub fn icon(&self) -> &'static str {
        match self {
            MessageKind::Info => "ℹ",
            MessageKind::Success => "✓",
            MessageKind::Warning => "⚠",
            MessageKind::Error => "✗",
        }
    }
}

#[derive(Clone)]
enum Sink {
    Stdout,
    Buffer(Arc<Mutex<Vec<u8>>>),
}

#[derive(Clone)]
pub struct Console {
    sink: Sink,
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sink = match self.sink {
            Sink::Stdout => "stdout",
            Sink::Buffer(_) => "buffer",
        };
        f.debug_struct("Console").field("sink", &sink).finish()
    }
}

impl Console {
    pub fn stdout() -> Self {
        Self { sink: Sink::Stdout }
    }

    /// Capture output in memory; read it back with [`Console::contents`].
    pub fn buffered() -> Self {
        Self {
            sink: Sink::Buffer(Arc::new(Mutex::new(Vec::new()))),
        }
    }

    /// Everything written so far to a buffered console.
    pub fn contents(&self) -> String {
        match &self.sink {
            Sink::Stdout => String::new(),
            Sink::Buffer(buf) => {
                let buf = buf.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                String::from_utf8_lossy(&buf).into_owned()
            },
        }
    }

    fn write_str(&self, text: &str) {
        match &self.sink {
            Sink::Stdout => {
                let mut out = std::io::stdout().lock();
                out.write_all(text.as_bytes()).ok();
                out.flush().ok();
            },
            Sink::Buffer(buf) => {
                let mut buf = buf.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                buf.extend_from_slice(text.as_bytes());
            },
        }
    }

    /// Write text without a trailing newline (prompts).
    pub fn print_inline(&self, text: &str) {
        self.write_str(text);
    }

    pub fn print_line(&self, text: &str) {
        self.write_str(&format!("{}\n", text));
    }

    pub fn blank_line(&self) {
        self.write_str("\n");
    }

    pub fn print_message(&self, kind: MessageKind, text: &str, title: Option<&str>) {
        match title {
            Some(title) => self.print_line(&format!("{} {}: {}", kind.icon(), title, text)),
            None => self.print_line(&format!("{} {}", kind.icon(), text)),
        }
    }

    pub fn info(&self, text: &str) {
        self.print_message(MessageKind::Info, text, None);
    }

    pub fn success(&self, text: &str) {
        self.print_message(MessageKind::Success, text, None);
    }

    pub fn warning(&self, text: &str) {
        self.print_message(MessageKind::Warning, text, None);
    }

    pub fn error(&self, text: &str) {
        self.print_message(MessageKind::Error, text, None);
    }

    pub fn print_header(&self, title: &str, subtitle: &str) {
        self.print_line(&format!("\n═══ {} ═══", title));
        if !subtitle.is_empty() {
            self.print_line(subtitle);
        }
    }

    /// Status block: a title line with the overall state, then one
    /// `key: value` line per detail, in order.
    pub fn print_status(&self, title: &str, state: &str, details: &[(String, String)]) {
        let icon = if state == "CONNECTED" { "●" } else { "○" };
        let mut out = format!("{} {} [{}]\n", icon, title, state);
        for (key, value) in details {
            out.push_str(&format!("   {}: {}\n", key, value));
        }
        self.write_str(&out);
    }

    pub fn print_table(&self, title: &str, headers: &[&str], rows: &[Vec<String>]) {
        let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
        for row in rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(i) {
                    *width = (*width).max(cell.chars().count());
                }
            }
        }

        let mut out = format!("{}\n", title);
        out.push_str(&render_row(headers.iter().copied(), &widths));
        let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
        out.push_str(&format!("  {}\n", rule.join("  ")));
        for row in rows {
            out.push_str(&render_row(row.iter().map(String::as_str), &widths));
        }
        self.write_str(&out);
    }

    pub fn print_panel(&self, title: &str, body: &str) {
        let mut out = format!("┌─ {} ─\n", title);
        for line in body.lines() {
            out.push_str(&format!("│ {}\n", line));
        }
        out.push_str("└─\n");
        self.write_str(&out);
    }
}

fn render_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let line: Vec<String> = cells
        .zip(widths.iter())
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{}{}", cell, " ".repeat(pad))
        })
        .collect();
    format!("  {}\n", line.join("  ").trim_end())
}

impl Default for Console {
    fn default() -> Self {
        Self::stdout()
    }
}
