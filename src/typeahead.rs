//! Incremental-search selection input. The selector owns its text, the
//! candidate filter, and the popup state machine, but knows nothing about the
//! terminal: the host feeds it keys, clicks, and focus changes, and reacts to
//! the returned [`SelectorOutcome`].

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use tracing::debug;

/// Rows the popup shows before it switches to a scrolling window.
pub const POPUP_MAX_ROWS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupState {
    Closed,
    /// Showing every candidate (opened by a click or by clearing the text).
    OpenFull,
    /// Showing candidates that contain the typed text.
    OpenFiltered,
}

/// Focus questions only the host can answer.
pub trait FocusProbe {
    /// Does this selector's text input currently hold focus?
    fn input_focused(&self) -> bool;
    /// Is the focused element owned by this selector's popup?
    fn popup_owns_focus(&self) -> bool;
}

/// What the host should do after feeding the selector an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorOutcome {
    /// Event not consumed; the host may handle it itself.
    Ignored,
    /// Text or popup contents changed; redraw.
    Updated,
    /// Move keyboard focus into the popup.
    FocusPopup,
    /// Move keyboard focus back to the text input.
    FocusInput,
    /// A candidate was committed as the input value; the popup is closed.
    Committed(String),
    /// The popup closed without a commit.
    Closed,
}

/// Visible slice of the popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupWindow {
    pub rows: usize,
    pub offset: usize,
    pub scrollbar: bool,
}

pub struct TypeaheadSelector {
    text: String,
    committed: Option<String>,
    candidates: Vec<String>,
    filtered: Vec<String>,
    state: PopupState,
    highlighted: Option<usize>,
    scroll: usize,
    grace: Duration,
    focus_check_due: Option<Instant>,
}

impl TypeaheadSelector {
    pub fn new(grace: Duration) -> Self {
        Self {
            text: String::new(),
            committed: None,
            candidates: Vec::new(),
            filtered: Vec::new(),
            state: PopupState::Closed,
            highlighted: None,
            scroll: 0,
            grace,
            focus_check_due: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Last value committed from the popup, untouched by typing or Escape.
    /// Read-only for the host: lending uses [`text`](Self::text), the view uses
    /// this to mark a field whose text still matches the picked entry.
    pub fn committed(&self) -> Option<&str> {
        self.committed.as_deref()
    }

    pub fn state(&self) -> PopupState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state != PopupState::Closed
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn filtered(&self) -> &[String] {
        &self.filtered
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn has_pending_focus_check(&self) -> bool {
        self.focus_check_due.is_some()
    }

    /// Replace the candidate list. An open popup is refiltered against the
    /// new list right away so it never shows stale entries.
    pub fn set_candidates(&mut self, candidates: Vec<String>) {
        self.candidates = candidates;
        match self.state {
            PopupState::Closed => {}
            PopupState::OpenFull => self.show_full(),
            PopupState::OpenFiltered => self.refilter(),
        }
    }

    /// Reset text, committed value, and popup.
    pub fn clear(&mut self) {
        self.text.clear();
        self.committed = None;
        self.close();
    }

    pub fn click_input(&mut self) -> SelectorOutcome {
        self.focus_check_due = None;
        self.show_full();
        if self.is_open() {
            SelectorOutcome::Updated
        } else {
            SelectorOutcome::Ignored
        }
    }

    /// Commit the entry at `index` of the filtered list.
    pub fn click_entry(&mut self, index: usize) -> SelectorOutcome {
        if !self.is_open() {
            return SelectorOutcome::Ignored;
        }
        match self.filtered.get(index).cloned() {
            Some(value) => self.commit(value),
            None => SelectorOutcome::Ignored,
        }
    }

    /// Key pressed while the text input holds focus.
    pub fn handle_key(&mut self, code: KeyCode) -> SelectorOutcome {
        match code {
            KeyCode::Down => {
                if !self.is_open() || self.filtered.is_empty() {
                    return SelectorOutcome::Ignored;
                }
                self.highlight(0);
                SelectorOutcome::FocusPopup
            }
            KeyCode::Enter => {
                if !self.is_open() {
                    return SelectorOutcome::Ignored;
                }
                let choice = self
                    .highlighted
                    .and_then(|idx| self.filtered.get(idx))
                    .or_else(|| self.filtered.first())
                    .cloned();
                match choice {
                    Some(value) => self.commit(value),
                    None => SelectorOutcome::Ignored,
                }
            }
            KeyCode::Esc => {
                if self.is_open() {
                    self.close();
                    SelectorOutcome::Closed
                } else {
                    SelectorOutcome::Ignored
                }
            }
            KeyCode::Up | KeyCode::Tab | KeyCode::BackTab => SelectorOutcome::Ignored,
            other => {
                self.edit(other);
                self.refilter();
                SelectorOutcome::Updated
            }
        }
    }

    /// Key pressed while focus sits inside the popup list.
    pub fn handle_popup_key(&mut self, code: KeyCode) -> SelectorOutcome {
        if !self.is_open() {
            return SelectorOutcome::FocusInput;
        }
        match code {
            KeyCode::Up => self.step(-1),
            KeyCode::Down => self.step(1),
            KeyCode::PageUp => self.step(-(POPUP_MAX_ROWS as isize)),
            KeyCode::PageDown => self.step(POPUP_MAX_ROWS as isize),
            KeyCode::Home => self.step(isize::MIN / 2),
            KeyCode::End => self.step(isize::MAX / 2),
            KeyCode::Enter => self.handle_key(KeyCode::Enter),
            KeyCode::Esc => {
                self.close();
                SelectorOutcome::Closed
            }
            KeyCode::Char(_) | KeyCode::Backspace => {
                self.edit(code);
                self.refilter();
                SelectorOutcome::FocusInput
            }
            _ => SelectorOutcome::Ignored,
        }
    }

    /// Focus left the input or the popup. The decision is deferred to
    /// [`tick`](Self::tick) because committing by click briefly moves focus.
    pub fn focus_lost(&mut self, now: Instant) {
        if self.is_open() {
            self.focus_check_due = Some(now + self.grace);
        }
    }

    /// Focus came back to the input or popup; any pending check is dropped.
    pub fn focus_gained(&mut self) {
        self.focus_check_due = None;
    }

    /// Run a due focus check. Focus is queried now, not when the check was
    /// scheduled.
    pub fn tick(&mut self, now: Instant, probe: &dyn FocusProbe) -> SelectorOutcome {
        let Some(due) = self.focus_check_due else {
            return SelectorOutcome::Ignored;
        };
        if now < due {
            return SelectorOutcome::Ignored;
        }
        self.focus_check_due = None;
        if self.is_open() && !probe.input_focused() && !probe.popup_owns_focus() {
            debug!(text = %self.text, "focus left selector, closing popup");
            self.close();
            return SelectorOutcome::Closed;
        }
        SelectorOutcome::Ignored
    }

    /// Visible window of the popup, or `None` when closed.
    pub fn popup_window(&self) -> Option<PopupWindow> {
        if !self.is_open() {
            return None;
        }
        let count = self.filtered.len();
        Some(PopupWindow {
            rows: count.clamp(1, POPUP_MAX_ROWS),
            offset: self.scroll,
            scrollbar: count > POPUP_MAX_ROWS,
        })
    }

    fn edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char(ch) if !ch.is_control() => self.text.push(ch),
            KeyCode::Backspace => {
                self.text.pop();
            }
            _ => {}
        }
    }

    fn show_full(&mut self) {
        self.filtered = self.candidates.clone();
        self.reset_cursor();
        self.state = if self.filtered.is_empty() {
            PopupState::Closed
        } else {
            PopupState::OpenFull
        };
    }

    fn refilter(&mut self) {
        let query = self.text.to_lowercase();
        if query.is_empty() {
            self.show_full();
            return;
        }
        self.filtered = self
            .candidates
            .iter()
            .filter(|candidate| candidate.to_lowercase().contains(&query))
            .cloned()
            .collect();
        self.reset_cursor();
        self.state = if self.filtered.is_empty() {
            PopupState::Closed
        } else {
            PopupState::OpenFiltered
        };
    }

    fn commit(&mut self, value: String) -> SelectorOutcome {
        self.text = value.clone();
        self.committed = Some(value.clone());
        self.close();
        SelectorOutcome::Committed(value)
    }

    fn close(&mut self) {
        self.state = PopupState::Closed;
        self.filtered.clear();
        self.reset_cursor();
        self.focus_check_due = None;
    }

    fn reset_cursor(&mut self) {
        self.highlighted = None;
        self.scroll = 0;
    }

    fn step(&mut self, offset: isize) -> SelectorOutcome {
        if self.filtered.is_empty() {
            return SelectorOutcome::Ignored;
        }
        let len = self.filtered.len() as isize;
        let current = self.highlighted.unwrap_or(0) as isize;
        let next = current.saturating_add(offset).clamp(0, len - 1);
        self.highlight(next as usize);
        SelectorOutcome::Updated
    }

    fn highlight(&mut self, index: usize) {
        self.highlighted = Some(index);
        if index < self.scroll {
            self.scroll = index;
        } else if index >= self.scroll + POPUP_MAX_ROWS {
            self.scroll = index + 1 - POPUP_MAX_ROWS;
        }
    }
}
