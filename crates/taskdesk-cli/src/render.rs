use std::cell::RefCell;
use std::io::{self, BufRead, IsTerminal, Write};

use taskdesk_core::{AssistantPanel, Session, Task, ViewRenderer};
use tracing::{debug, warn};
use unicode_width::UnicodeWidthStr;

/// Terminal renderer. Notices go to stderr as they arrive; the task list,
/// status line and assistant answer are kept until the command prints them.
#[derive(Debug, Default)]
pub struct TerminalView {
    color: bool,
    quiet: bool,
    assume_yes: bool,
    tasks: RefCell<Vec<Task>>,
    status: RefCell<String>,
    assistant: RefCell<Option<AssistantPanel>>,
    editing: RefCell<Option<Task>>,
}

impl TerminalView {
    pub fn new(color: bool, quiet: bool, assume_yes: bool) -> Self {
        Self {
            color,
            quiet,
            assume_yes,
            ..Self::default()
        }
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.borrow().clone()
    }

    pub fn status(&self) -> String {
        self.status.borrow().clone()
    }

    pub fn assistant(&self) -> Option<AssistantPanel> {
        self.assistant.borrow().clone()
    }

    pub fn editing(&self) -> Option<Task> {
        self.editing.borrow().clone()
    }

    pub fn print_task_table<W: Write>(&self, out: W) -> anyhow::Result<()> {
        let headers = vec![
            "ID".to_string(),
            "Done".to_string(),
            "Priority".to_string(),
            "Title".to_string(),
            "Tags".to_string(),
            "Owner".to_string(),
        ];

        let rows = self
            .tasks
            .borrow()
            .iter()
            .map(|task| {
                let done = if task.completed { "x" } else { "" };
                let priority = match task.priority.id() {
                    1 => self.paint(task.priority.as_str(), "31"),
                    _ => task.priority.to_string(),
                };
                vec![
                    self.paint(&task.id.to_string(), "33"),
                    done.to_string(),
                    priority,
                    task.title.clone(),
                    task.tags
                        .iter()
                        .map(|tag| format!("+{tag}"))
                        .collect::<Vec<_>>()
                        .join(" "),
                    task.created_by.clone().unwrap_or_default(),
                ]
            })
            .collect();

        write_table(out, headers, rows)
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }

    fn prompt_yes_no(&self, prompt: &str) -> bool {
        let stdin = io::stdin();
        if !stdin.is_terminal() {
            warn!(prompt, "no terminal to confirm on; pass --yes to proceed");
            return false;
        }

        eprint!("{prompt} [y/N] ");
        if io::stderr().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if stdin.lock().read_line(&mut answer).is_err() {
            return false;
        }
        parse_yes(&answer)
    }
}

fn parse_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

impl ViewRenderer for TerminalView {
    fn show_notice(&self, message: &str, is_error: bool) {
        if is_error {
            eprintln!("{}", self.paint(message, "31"));
        } else if !self.quiet {
            eprintln!("{message}");
        }
    }

    fn show_authenticated_view(&self, session: &Session) {
        debug!(username = session.username(), "authenticated");
    }

    fn show_unauthenticated_view(&self) {
        debug!("signed out");
    }

    fn render_task_list(&self, tasks: &[Task]) {
        *self.tasks.borrow_mut() = tasks.to_vec();
    }

    fn render_status_line(&self, message: &str) {
        *self.status.borrow_mut() = message.to_string();
    }

    fn render_draft_tags(&self, tags: &[String]) {
        debug!(?tags, "draft tags");
    }

    fn open_edit_form(&self, task: &Task) {
        *self.editing.borrow_mut() = Some(task.clone());
    }

    fn close_edit_form(&self) {
        self.editing.borrow_mut().take();
    }

    fn set_checkbox_state(&self, task_id: u64, checked: bool) {
        debug!(task_id, checked, "checkbox");
    }

    fn render_assistant(&self, panel: AssistantPanel) {
        *self.assistant.borrow_mut() = Some(panel);
    }

    fn confirm(&self, prompt: &str) -> bool {
        self.assume_yes || self.prompt_yes_no(prompt)
    }
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for (header, width) in headers.iter().zip(&widths) {
        write!(writer, "{header:width$} ")?;
    }
    writeln!(writer)?;

    for width in &widths {
        write!(writer, "{:-<width$} ", "")?;
    }
    writeln!(writer)?;

    for row in rows {
        for (cell, width) in row.iter().zip(&widths) {
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = width.saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}
