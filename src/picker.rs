//! Interactive terminal UI for the catalogue & services dropdown.
//!
//! Renders a [`SelectionDialog`] as an indented checkbox list and feeds key
//! presses back into it. Enter maps to "Done", Esc to "Cancel".

use std::io::{self, Write};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use log::debug;

use crate::dialog::{Row, SelectionDialog};
use crate::error::CategoryError;

/// Max rows shown at once.
const MAX_VISIBLE: usize = 15;

/// Format a number in a human-readable way (e.g., 1.2K, 3.5M).
#[allow(clippy::cast_precision_loss)]
pub fn humanize_count(n: usize) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// How the picker was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerOutcome {
    /// "Done": the edits were kept.
    Committed,
    /// "Cancel": the selection was restored.
    Cancelled,
}

/// Configuration for the picker UI.
pub struct PickerConfig {
    /// Prompt text shown at the top.
    pub prompt: String,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            prompt: "Select catalogue & services".to_string(),
        }
    }
}

/// Cursor and scroll position over the dialog's visible rows.
struct PickerState<'a> {
    dialog: &'a mut SelectionDialog,
    cursor: usize,
    scroll_offset: usize,
}

impl<'a> PickerState<'a> {
    const fn new(dialog: &'a mut SelectionDialog) -> Self {
        Self {
            dialog,
            cursor: 0,
            scroll_offset: 0,
        }
    }

    fn row_count(&self) -> usize {
        self.dialog.rows().len()
    }

    fn cursor_up(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.adjust_scroll();
        }
    }

    fn cursor_down(&mut self) {
        if self.cursor + 1 < self.row_count() {
            self.cursor += 1;
            self.adjust_scroll();
        }
    }

    /// Clamp cursor after a catalogue collapses.
    fn clamp_cursor(&mut self) {
        let count = self.row_count();
        if count == 0 {
            self.cursor = 0;
        } else if self.cursor >= count {
            self.cursor = count - 1;
        }
        self.adjust_scroll();
    }

    fn adjust_scroll(&mut self) {
        if self.cursor < self.scroll_offset {
            self.scroll_offset = self.cursor;
        } else if self.cursor >= self.scroll_offset + MAX_VISIBLE {
            self.scroll_offset = self.cursor - MAX_VISIBLE + 1;
        }
    }

    /// Flip the checkbox under the cursor.
    fn toggle_current(&mut self) -> Result<(), CategoryError> {
        let target = self.dialog.rows().get(self.cursor).map(|row| match *row {
            Row::Group { name, checked, .. } => (name.to_string(), None, !checked),
            Row::Item {
                group,
                name,
                checked,
            } => (group.to_string(), Some(name.to_string()), !checked),
        });

        match target {
            Some((group, None, on)) => self.dialog.toggle_group(&group, on)?,
            Some((group, Some(item), on)) => self.dialog.toggle_item(&group, &item, on)?,
            None => {}
        }
        self.clamp_cursor();
        Ok(())
    }
}

/// Actions that can result from key handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PickerAction {
    Continue,
    Done,
    Cancel,
}

/// Open the dialog and let the user edit it in the terminal.
///
/// Fails with [`CategoryError::EmptyGroupData`] before touching the terminal
/// when no catalogues are loaded.
///
/// # Non-TTY Fallback
///
/// When the terminal is not interactive the dialog is opened and committed
/// unchanged.
pub fn run_picker(
    dialog: &mut SelectionDialog,
    config: &PickerConfig,
) -> anyhow::Result<PickerOutcome> {
    dialog.show()?;

    if !is_interactive() {
        debug!("non-interactive terminal, keeping current selection");
        dialog.commit();
        return Ok(PickerOutcome::Committed);
    }

    let mut state = PickerState::new(dialog);

    terminal::enable_raw_mode()?;
    let result = run_picker_loop(&mut state, &config.prompt);
    terminal::disable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(
        stdout,
        cursor::Show,
        cursor::MoveTo(0, 0),
        terminal::Clear(ClearType::All),
    )?;
    println!();
    stdout.flush()?;

    match result {
        Ok(PickerAction::Done) => {
            dialog.commit();
            Ok(PickerOutcome::Committed)
        }
        Ok(_) => {
            dialog.cancel();
            Ok(PickerOutcome::Cancelled)
        }
        Err(e) => {
            dialog.cancel();
            Err(e)
        }
    }
}

/// Check if the terminal is interactive.
///
/// Returns false in these cases:
/// - stdin or stdout is not a TTY
/// - Running in a CI environment (CI env var is set)
/// - TERM is unset or "dumb"
/// - `SERVICEFINDER_NON_INTERACTIVE` env var is set
pub fn is_interactive() -> bool {
    use std::io::IsTerminal;

    if std::env::var("SERVICEFINDER_NON_INTERACTIVE").is_ok() {
        return false;
    }

    if std::env::var("CI").is_ok() {
        return false;
    }

    match std::env::var("TERM") {
        Ok(term) if !term.is_empty() && term != "dumb" => {}
        _ => return false,
    }

    io::stdin().is_terminal() && io::stdout().is_terminal()
}

fn run_picker_loop(state: &mut PickerState<'_>, prompt: &str) -> anyhow::Result<PickerAction> {
    let mut stdout = io::stdout();

    loop {
        render_ui(&mut stdout, state, prompt)?;

        if let Event::Key(key) = event::read()? {
            match handle_key(state, key)? {
                PickerAction::Continue => {}
                action => return Ok(action),
            }
        }
    }
}

/// Handle a key press.
fn handle_key(state: &mut PickerState<'_>, key: KeyEvent) -> Result<PickerAction, CategoryError> {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => state.cursor_up(),
        KeyCode::Down | KeyCode::Char('j') => state.cursor_down(),

        KeyCode::Char(' ') => state.toggle_current()?,
        KeyCode::Enter => return Ok(PickerAction::Done),
        KeyCode::Esc => return Ok(PickerAction::Cancel),

        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return Ok(PickerAction::Cancel);
        }

        _ => {}
    }
    Ok(PickerAction::Continue)
}

fn render_ui(stdout: &mut io::Stdout, state: &PickerState<'_>, prompt: &str) -> io::Result<()> {
    execute!(
        stdout,
        cursor::MoveTo(0, 0),
        terminal::Clear(ClearType::FromCursorDown)
    )?;

    execute!(
        stdout,
        SetForegroundColor(Color::Cyan),
        Print(prompt),
        ResetColor,
        Print("\r\n\r\n")
    )?;

    render_summary(stdout, state)?;
    execute!(stdout, Print("\r\n"))?;
    render_rows(stdout, state)?;
    render_help_line(stdout)?;

    stdout.flush()
}

fn render_summary(stdout: &mut io::Stdout, state: &PickerState<'_>) -> io::Result<()> {
    execute!(stdout, Print("Selected: "))?;

    if state.dialog.selection().is_empty() {
        execute!(
            stdout,
            SetForegroundColor(Color::DarkGrey),
            Print("none"),
            ResetColor
        )?;
    } else {
        execute!(stdout, Print(state.dialog.summary()))?;
    }

    execute!(stdout, Print("\r\n"))
}

fn render_rows(stdout: &mut io::Stdout, state: &PickerState<'_>) -> io::Result<()> {
    let rows = state.dialog.rows();

    if state.scroll_offset > 0 {
        execute!(
            stdout,
            SetForegroundColor(Color::DarkGrey),
            Print(format!(
                "  ↑ {} more above\r\n",
                humanize_count(state.scroll_offset)
            )),
            ResetColor
        )?;
    }

    for (i, row) in rows
        .iter()
        .enumerate()
        .skip(state.scroll_offset)
        .take(MAX_VISIBLE)
    {
        let is_cursor = i == state.cursor;

        if is_cursor {
            execute!(stdout, SetForegroundColor(Color::Cyan), Print("> "))?;
        } else {
            execute!(stdout, Print("  "))?;
        }

        let (indent, label, checked, counts) = match *row {
            Row::Group {
                name,
                checked,
                selected,
                total,
            } => (
                "",
                name,
                checked,
                Some(format!(
                    " ({}/{})",
                    humanize_count(selected),
                    humanize_count(total)
                )),
            ),
            Row::Item { name, checked, .. } => ("    ", name, checked, None),
        };

        execute!(stdout, Print(indent))?;
        if checked {
            execute!(
                stdout,
                SetForegroundColor(Color::Green),
                Print("[✓] "),
                ResetColor
            )?;
        } else {
            execute!(stdout, ResetColor, Print("[ ] "))?;
        }

        if is_cursor {
            execute!(
                stdout,
                SetForegroundColor(Color::Yellow),
                Print(label),
                ResetColor
            )?;
        } else {
            execute!(stdout, Print(label))?;
        }

        if let Some(counts) = counts {
            execute!(
                stdout,
                SetForegroundColor(Color::DarkGrey),
                Print(counts),
                ResetColor
            )?;
        }

        execute!(stdout, ResetColor, Print("\r\n"))?;
    }

    let remaining = rows.len().saturating_sub(state.scroll_offset + MAX_VISIBLE);
    if remaining > 0 {
        execute!(
            stdout,
            SetForegroundColor(Color::DarkGrey),
            Print(format!("  ↓ {} more below\r\n", humanize_count(remaining))),
            ResetColor
        )?;
    }

    Ok(())
}

/// Render a key hint with highlighted key.
fn render_key_hint(stdout: &mut io::Stdout, key: &str, action: &str) -> io::Result<()> {
    execute!(
        stdout,
        SetForegroundColor(Color::Cyan),
        Print(key),
        SetForegroundColor(Color::DarkGrey),
        Print(format!(" {action} ")),
        ResetColor
    )
}

fn render_help_line(stdout: &mut io::Stdout) -> io::Result<()> {
    execute!(stdout, Print("\r\n"))?;
    render_key_hint(stdout, "↑↓", "move")?;
    render_key_hint(stdout, "Space", "toggle")?;
    render_key_hint(stdout, "Enter", "done")?;
    render_key_hint(stdout, "Esc", "cancel")?;
    Ok(())
}
