use std::mem;
use std::time::Instant;

use crossterm::event::{KeyCode, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Clear, List, ListItem, ListState, Paragraph, Scrollbar,
    ScrollbarOrientation, ScrollbarState, Wrap,
};
use ratatui::Frame;

use crate::controller::{ActionResult, AppController, Confirmation, Notice, Severity, ViewModel};
use crate::messages::{Label, Locale};
use crate::typeahead::{FocusProbe, SelectorOutcome, TypeaheadSelector};

use super::forms::{text_line, NameInput};
use super::helpers::{centered_rect, dropdown_rect, row_within};
use super::theme::{ButtonStyle, Theme};

const HEADER_HEIGHT: u16 = 3;
/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Lend panel border plus one bordered selector row.
const LEND_PANEL_HEIGHT: u16 = 5;
const HIGHLIGHT_SYMBOL: &str = "> ";

/// Every element that can hold keyboard focus.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Focus {
    ToolList,
    ToolInput,
    BorrowerList,
    BorrowerInput,
    ToolSelector,
    ToolPopup,
    BorrowerSelector,
    BorrowerPopup,
    Loans,
}

/// Tab order. Popups are reached with the arrow keys, not Tab.
const TAB_ORDER: [Focus; 7] = [
    Focus::ToolList,
    Focus::ToolInput,
    Focus::BorrowerList,
    Focus::BorrowerInput,
    Focus::ToolSelector,
    Focus::BorrowerSelector,
    Focus::Loans,
];

impl Focus {
    fn tab_stop(self) -> Focus {
        match self {
            Focus::ToolPopup => Focus::ToolSelector,
            Focus::BorrowerPopup => Focus::BorrowerSelector,
            other => other,
        }
    }

    fn cycle(self, step: isize) -> Focus {
        let stop = self.tab_stop();
        let len = TAB_ORDER.len() as isize;
        let idx = TAB_ORDER.iter().position(|f| *f == stop).unwrap_or(0) as isize;
        TAB_ORDER[(idx + step).rem_euclid(len) as usize]
    }
}

/// Tool or borrower half of a paired widget.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Side {
    Tool,
    Borrower,
}

const SIDES: [Side; 2] = [Side::Tool, Side::Borrower];

impl Side {
    fn list(self) -> Focus {
        match self {
            Side::Tool => Focus::ToolList,
            Side::Borrower => Focus::BorrowerList,
        }
    }

    fn name_input(self) -> Focus {
        match self {
            Side::Tool => Focus::ToolInput,
            Side::Borrower => Focus::BorrowerInput,
        }
    }

    fn selector(self) -> Focus {
        match self {
            Side::Tool => Focus::ToolSelector,
            Side::Borrower => Focus::BorrowerSelector,
        }
    }

    fn popup(self) -> Focus {
        match self {
            Side::Tool => Focus::ToolPopup,
            Side::Borrower => Focus::BorrowerPopup,
        }
    }

    fn owns(self, focus: Focus) -> bool {
        focus == self.selector() || focus == self.popup()
    }
}

/// Answers a selector's focus questions from the app's current focus.
struct SelectorFocus {
    current: Focus,
    side: Side,
}

impl FocusProbe for SelectorFocus {
    fn input_focused(&self) -> bool {
        self.current == self.side.selector()
    }

    fn popup_owns_focus(&self) -> bool {
        self.current == self.side.popup()
    }
}

enum Mode {
    Normal,
    Confirm(Confirmation),
    /// Warning or error that blocks input until dismissed.
    Notice(Notice),
}

/// Screen areas from the last draw, used to route mouse clicks.
#[derive(Default, Clone, Copy)]
struct HitMap {
    tool_list: Rect,
    tool_input: Rect,
    borrower_list: Rect,
    borrower_input: Rect,
    tool_selector: Rect,
    borrower_selector: Rect,
    loans: Rect,
    tool_popup: Option<Rect>,
    borrower_popup: Option<Rect>,
}

impl HitMap {
    fn list(&self, side: Side) -> Rect {
        match side {
            Side::Tool => self.tool_list,
            Side::Borrower => self.borrower_list,
        }
    }

    fn name_input(&self, side: Side) -> Rect {
        match side {
            Side::Tool => self.tool_input,
            Side::Borrower => self.borrower_input,
        }
    }

    fn selector(&self, side: Side) -> Rect {
        match side {
            Side::Tool => self.tool_selector,
            Side::Borrower => self.borrower_selector,
        }
    }

    fn popup(&self, side: Side) -> Option<Rect> {
        match side {
            Side::Tool => self.tool_popup,
            Side::Borrower => self.borrower_popup,
        }
    }

    fn set_popup(&mut self, side: Side, area: Option<Rect>) {
        match side {
            Side::Tool => self.tool_popup = area,
            Side::Borrower => self.borrower_popup = area,
        }
    }
}

/// Terminal front end. Owns the controller and everything that is purely
/// presentation: focus, list cursors, and the pending modal.
pub struct App {
    controller: AppController,
    locale: Locale,
    theme: Theme,
    view: ViewModel,
    focus: Focus,
    mode: Mode,
    status: Option<Notice>,
    tool_input: NameInput,
    borrower_input: NameInput,
    tool_rows: ListState,
    borrower_rows: ListState,
    loan_rows: ListState,
    hits: HitMap,
}

impl App {
    pub fn new(controller: AppController, locale: Locale, theme: Theme) -> Self {
        let mut app = Self {
            view: controller.view(),
            controller,
            locale,
            theme,
            focus: Focus::ToolList,
            mode: Mode::Normal,
            status: None,
            tool_input: NameInput::default(),
            borrower_input: NameInput::default(),
            tool_rows: ListState::default(),
            borrower_rows: ListState::default(),
            loan_rows: ListState::default(),
            hits: HitMap::default(),
        };
        app.refresh();
        app
    }

    pub fn controller(&self) -> &AppController {
        &self.controller
    }

    pub fn handle_key(&mut self, code: KeyCode, now: Instant) {
        let mode = mem::replace(&mut self.mode, Mode::Normal);
        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, now),
            Mode::Confirm(confirmation) => self.handle_confirm(code, confirmation),
            Mode::Notice(notice) => self.handle_notice(code, notice),
        };
    }

    /// Lend shortcut, honoured while focus is anywhere in the lend panel.
    pub fn handle_ctrl_l(&mut self) {
        if !matches!(self.mode, Mode::Normal) {
            return;
        }
        if SIDES.iter().any(|side| side.owns(self.focus)) {
            self.mode = self.lend();
        }
    }

    pub fn handle_mouse(&mut self, event: MouseEvent, now: Instant) {
        if event.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let mode = mem::replace(&mut self.mode, Mode::Normal);
        self.mode = match mode {
            Mode::Normal => self.handle_click(event.column, event.row, now),
            other => other,
        };
    }

    /// Fire any selector focus checks whose grace delay has run out.
    pub fn tick(&mut self, now: Instant) {
        for side in SIDES {
            let probe = SelectorFocus {
                current: self.focus,
                side,
            };
            self.selector_mut(side).tick(now, &probe);
        }
    }

    fn handle_normal_key(&mut self, code: KeyCode, now: Instant) -> Mode {
        match code {
            KeyCode::Tab => {
                self.move_focus(self.focus.cycle(1), now);
                return Mode::Normal;
            }
            KeyCode::BackTab => {
                self.move_focus(self.focus.cycle(-1), now);
                return Mode::Normal;
            }
            _ => {}
        }

        match self.focus {
            Focus::ToolList => self.handle_list_key(code, Side::Tool),
            Focus::BorrowerList => self.handle_list_key(code, Side::Borrower),
            Focus::ToolInput => self.handle_name_key(code, Side::Tool),
            Focus::BorrowerInput => self.handle_name_key(code, Side::Borrower),
            Focus::ToolSelector => self.handle_selector_key(code, Side::Tool),
            Focus::BorrowerSelector => self.handle_selector_key(code, Side::Borrower),
            Focus::ToolPopup => self.handle_popup_key(code, Side::Tool),
            Focus::BorrowerPopup => self.handle_popup_key(code, Side::Borrower),
            Focus::Loans => self.handle_loans_key(code),
        }
    }

    fn handle_list_key(&mut self, code: KeyCode, side: Side) -> Mode {
        let len = self.names(side).len();
        match code {
            KeyCode::Up => step(self.rows_mut(side), len, -1),
            KeyCode::Down => step(self.rows_mut(side), len, 1),
            KeyCode::Home => step(self.rows_mut(side), len, isize::MIN / 2),
            KeyCode::End => step(self.rows_mut(side), len, isize::MAX / 2),
            KeyCode::Delete | KeyCode::Char('-') => {
                let selection = self.selected_name(side);
                let request = match side {
                    Side::Tool => self.controller.request_delete_tool(selection.as_deref()),
                    Side::Borrower => self
                        .controller
                        .request_delete_borrower(selection.as_deref()),
                };
                return match request {
                    Ok(confirmation) => Mode::Confirm(confirmation),
                    Err(notice) => self.show(notice),
                };
            }
            _ => {}
        }
        Mode::Normal
    }

    fn handle_name_key(&mut self, code: KeyCode, side: Side) -> Mode {
        let input = self.name_input_mut(side);
        match code {
            KeyCode::Char(ch) => {
                input.push_char(ch);
            }
            KeyCode::Backspace => input.backspace(),
            KeyCode::Esc => input.clear(),
            KeyCode::Enter => {
                let raw = input.value.clone();
                let result = match side {
                    Side::Tool => self.controller.add_tool(&raw),
                    Side::Borrower => self.controller.add_borrower(&raw),
                };
                if result.is_ok() {
                    self.name_input_mut(side).clear();
                }
                return self.apply(result);
            }
            _ => {}
        }
        Mode::Normal
    }

    fn handle_selector_key(&mut self, code: KeyCode, side: Side) -> Mode {
        match self.selector_mut(side).handle_key(code) {
            SelectorOutcome::FocusPopup => self.focus = side.popup(),
            SelectorOutcome::Ignored if code == KeyCode::Enter => return self.lend(),
            _ => {}
        }
        Mode::Normal
    }

    fn handle_popup_key(&mut self, code: KeyCode, side: Side) -> Mode {
        match self.selector_mut(side).handle_popup_key(code) {
            SelectorOutcome::FocusInput | SelectorOutcome::Committed(_) | SelectorOutcome::Closed => {
                self.focus = side.selector();
            }
            _ => {}
        }
        Mode::Normal
    }

    fn handle_loans_key(&mut self, code: KeyCode) -> Mode {
        let len = self.view.loans.len();
        match code {
            KeyCode::Up => step(&mut self.loan_rows, len, -1),
            KeyCode::Down => step(&mut self.loan_rows, len, 1),
            KeyCode::Enter => return self.request_return(),
            _ => {}
        }
        Mode::Normal
    }

    fn handle_confirm(&mut self, code: KeyCode, confirmation: Confirmation) -> Mode {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                let result = self.controller.confirm(confirmation);
                self.apply(result)
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Mode::Normal,
            _ => Mode::Confirm(confirmation),
        }
    }

    fn handle_notice(&mut self, code: KeyCode, notice: Notice) -> Mode {
        match code {
            KeyCode::Enter | KeyCode::Esc => Mode::Normal,
            _ => Mode::Notice(notice),
        }
    }

    fn handle_click(&mut self, column: u16, row: u16, now: Instant) -> Mode {
        // Popups are drawn on top, so they win over whatever lies beneath.
        for side in SIDES {
            let Some(area) = self.hits.popup(side) else {
                continue;
            };
            if let Some(offset) = row_within(area, column, row) {
                let first = self
                    .selector(side)
                    .popup_window()
                    .map_or(0, |window| window.offset);
                self.move_focus(side.popup(), now);
                self.selector_mut(side).click_entry(first + offset);
                self.move_focus(side.selector(), now);
                return Mode::Normal;
            }
        }

        for side in SIDES {
            if row_within(self.hits.selector(side), column, row).is_some() {
                self.move_focus(side.selector(), now);
                self.selector_mut(side).click_input();
                return Mode::Normal;
            }
            if row_within(self.hits.name_input(side), column, row).is_some() {
                self.move_focus(side.name_input(), now);
                return Mode::Normal;
            }
            if let Some(offset) = row_within(self.hits.list(side), column, row) {
                self.move_focus(side.list(), now);
                let len = self.names(side).len();
                let rows = self.rows_mut(side);
                let index = rows.offset() + offset;
                if index < len {
                    rows.select(Some(index));
                }
                return Mode::Normal;
            }
        }

        if let Some(offset) = row_within(self.hits.loans, column, row) {
            self.move_focus(Focus::Loans, now);
            let index = self.loan_rows.offset() + offset;
            if index < self.view.loans.len() {
                self.loan_rows.select(Some(index));
                let label_width = self.locale.label(Label::Return).chars().count() as u16;
                if column >= self.hits.loans.right().saturating_sub(label_width) {
                    return self.request_return();
                }
            }
        }
        Mode::Normal
    }

    /// Change focus, telling selectors when it leaves or re-enters them.
    fn move_focus(&mut self, next: Focus, now: Instant) {
        let previous = mem::replace(&mut self.focus, next);
        for side in SIDES {
            let (was, is) = (side.owns(previous), side.owns(next));
            if was && !is {
                self.selector_mut(side).focus_lost(now);
            } else if !was && is {
                self.selector_mut(side).focus_gained();
            }
        }
    }

    fn lend(&mut self) -> Mode {
        let result = self.controller.lend();
        self.apply(result)
    }

    fn request_return(&mut self) -> Mode {
        let Some(loan) = self
            .loan_rows
            .selected()
            .and_then(|idx| self.view.loans.get(idx))
            .cloned()
        else {
            return Mode::Normal;
        };
        match self.controller.request_return(&loan) {
            Ok(confirmation) => Mode::Confirm(confirmation),
            Err(notice) => self.show(notice),
        }
    }

    fn apply(&mut self, result: ActionResult) -> Mode {
        self.refresh();
        match result {
            Ok(notice) | Err(notice) => self.show(notice),
        }
    }

    /// Info goes to the footer; warnings and errors also open a blocking modal.
    fn show(&mut self, notice: Notice) -> Mode {
        self.status = Some(notice.clone());
        match notice.severity {
            Severity::Info => Mode::Normal,
            Severity::Warning | Severity::Error => Mode::Notice(notice),
        }
    }

    fn refresh(&mut self) {
        self.view = self.controller.view();
        clamp(&mut self.tool_rows, self.view.tools.len());
        clamp(&mut self.borrower_rows, self.view.borrowers.len());
        clamp(&mut self.loan_rows, self.view.loans.len());
        for side in SIDES {
            if self.focus == side.popup() && !self.selector(side).is_open() {
                self.focus = side.selector();
            }
        }
    }

    fn names(&self, side: Side) -> &[String] {
        match side {
            Side::Tool => &self.view.tools,
            Side::Borrower => &self.view.borrowers,
        }
    }

    fn rows_mut(&mut self, side: Side) -> &mut ListState {
        match side {
            Side::Tool => &mut self.tool_rows,
            Side::Borrower => &mut self.borrower_rows,
        }
    }

    fn selected_name(&self, side: Side) -> Option<String> {
        let rows = match side {
            Side::Tool => &self.tool_rows,
            Side::Borrower => &self.borrower_rows,
        };
        rows.selected()
            .and_then(|idx| self.names(side).get(idx))
            .cloned()
    }

    fn name_input_mut(&mut self, side: Side) -> &mut NameInput {
        match side {
            Side::Tool => &mut self.tool_input,
            Side::Borrower => &mut self.borrower_input,
        }
    }

    fn selector(&self, side: Side) -> &TypeaheadSelector {
        match side {
            Side::Tool => self.controller.tool_selector(),
            Side::Borrower => self.controller.borrower_selector(),
        }
    }

    fn selector_mut(&mut self, side: Side) -> &mut TypeaheadSelector {
        match side {
            Side::Tool => self.controller.tool_selector_mut(),
            Side::Borrower => self.controller.borrower_selector_mut(),
        }
    }

    pub(crate) fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Min(6),
                Constraint::Length(LEND_PANEL_HEIGHT),
                Constraint::Min(4),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_header(frame, chunks[0]);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);
        self.draw_name_panel(frame, columns[0], Side::Tool);
        self.draw_name_panel(frame, columns[1], Side::Borrower);

        self.draw_lend_panel(frame, chunks[2]);
        self.draw_loans(frame, chunks[3]);
        self.draw_footer(frame, chunks[4]);

        for side in SIDES {
            self.draw_popup(frame, area, side);
        }

        match &self.mode {
            Mode::Confirm(confirmation) => self.draw_confirm(frame, area, confirmation),
            Mode::Notice(notice) => self.draw_notice(frame, area, notice),
            Mode::Normal => {}
        }
    }

    fn panel(&self, title: Label, focused: bool) -> Block<'static> {
        Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border(focused))
            .title(Span::styled(self.locale.label(title), self.theme.title()))
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border(false));
        let title = Paragraph::new(Span::styled(
            self.locale.label(Label::AppTitle),
            self.theme.title(),
        ))
        .alignment(Alignment::Center)
        .block(block);
        frame.render_widget(title, area);
    }

    fn draw_name_panel(&mut self, frame: &mut Frame, area: Rect, side: Side) {
        let title = match side {
            Side::Tool => Label::Tools,
            Side::Borrower => Label::Borrowers,
        };
        let focused = self.focus == side.list() || self.focus == side.name_input();
        let block = self.panel(title, focused);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner);

        let line = {
            let input = match side {
                Side::Tool => &self.tool_input,
                Side::Borrower => &self.borrower_input,
            };
            input.build_line(
                self.locale.label(Label::NewName),
                self.focus == side.name_input(),
                &self.theme,
            )
        };
        frame.render_widget(Paragraph::new(line), parts[1]);

        let (names, rows) = match side {
            Side::Tool => (&self.view.tools, &mut self.tool_rows),
            Side::Borrower => (&self.view.borrowers, &mut self.borrower_rows),
        };
        let items: Vec<ListItem> = names
            .iter()
            .map(|name| ListItem::new(Span::styled(name.as_str(), self.theme.text())))
            .collect();
        let highlight = if self.focus == side.list() {
            self.theme.highlight()
        } else {
            Style::default()
        };
        let list = List::new(items)
            .highlight_style(highlight)
            .highlight_symbol(HIGHLIGHT_SYMBOL);
        frame.render_stateful_widget(list, parts[0], rows);

        match side {
            Side::Tool => {
                self.hits.tool_list = parts[0];
                self.hits.tool_input = parts[1];
            }
            Side::Borrower => {
                self.hits.borrower_list = parts[0];
                self.hits.borrower_input = parts[1];
            }
        }
    }

    fn draw_lend_panel(&mut self, frame: &mut Frame, area: Rect) {
        let focused = SIDES.iter().any(|side| side.owns(self.focus));
        let block = self.panel(Label::LendPanel, focused);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(40),
                Constraint::Percentage(40),
                Constraint::Percentage(20),
            ])
            .split(inner);

        for (side, column) in SIDES.into_iter().zip(columns.iter().copied()) {
            let label = match side {
                Side::Tool => Label::ToolField,
                Side::Borrower => Label::BorrowerField,
            };
            let active = side.owns(self.focus);
            let field = Block::default()
                .borders(Borders::ALL)
                .border_style(self.theme.border(active));
            let selector = self.selector(side);
            let mut line = text_line(
                self.locale.label(label),
                selector.text(),
                self.focus == side.selector(),
                &self.theme,
            );
            if picked_from_list(selector) {
                line.push_span(Span::styled(" ✓", self.theme.muted()));
            }
            frame.render_widget(Paragraph::new(line).block(field), column);
            match side {
                Side::Tool => self.hits.tool_selector = column,
                Side::Borrower => self.hits.borrower_selector = column,
            }
        }

        let hint = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "[Ctrl+L]",
                self.theme.button(ButtonStyle::Normal),
            )),
        ])
        .alignment(Alignment::Center);
        frame.render_widget(hint, columns[2]);
    }

    fn draw_loans(&mut self, frame: &mut Frame, area: Rect) {
        let block = self.panel(Label::Borrowed, self.focus == Focus::Loans);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);
        self.hits.loans = inner;

        if self.view.loans.is_empty() {
            let placeholder = Paragraph::new(Span::styled(
                self.locale.label(Label::NoLoans),
                self.theme.muted(),
            ))
            .alignment(Alignment::Center);
            frame.render_widget(placeholder, inner);
            return;
        }

        let action = self.locale.label(Label::Return);
        let usable = usize::from(inner.width).saturating_sub(HIGHLIGHT_SYMBOL.len());
        let items: Vec<ListItem> = self
            .view
            .loans
            .iter()
            .map(|loan| {
                let text = loan.to_string();
                let pad = usable
                    .saturating_sub(text.chars().count())
                    .saturating_sub(action.chars().count());
                ListItem::new(Line::from(vec![
                    Span::styled(text, self.theme.text()),
                    Span::raw(" ".repeat(pad)),
                    Span::styled(action, self.theme.button(ButtonStyle::Normal)),
                ]))
            })
            .collect();
        let highlight = if self.focus == Focus::Loans {
            self.theme.highlight()
        } else {
            Style::default()
        };
        let list = List::new(items)
            .highlight_style(highlight)
            .highlight_symbol(HIGHLIGHT_SYMBOL);
        frame.render_stateful_widget(list, inner, &mut self.loan_rows);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::TOP)
            .border_style(self.theme.border(false));
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = match &self.status {
            Some(notice) => Line::from(Span::styled(
                self.locale.render(&notice.message),
                self.theme.severity(notice.severity),
            )),
            None => Line::from(""),
        };

        let paragraph =
            Paragraph::new(vec![status_line, self.footer_instructions()]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    /// Key hints with the keys picked out; destructive keys use the danger style.
    fn footer_instructions(&self) -> Line<'static> {
        let mut spans = Vec::new();
        for hint in self.locale.label(Label::MainHint).split("  ") {
            let (key, text) = match hint.find(']') {
                Some(end) => hint.split_at(end + 1),
                None => ("", hint),
            };
            let style = if key == "[Del]" {
                ButtonStyle::Danger
            } else {
                ButtonStyle::Normal
            };
            if !spans.is_empty() {
                spans.push(Span::raw("  "));
            }
            spans.push(Span::styled(key, self.theme.button(style)));
            spans.push(Span::styled(text, self.theme.muted()));
        }
        Line::from(spans)
    }

    fn draw_popup(&mut self, frame: &mut Frame, area: Rect, side: Side) {
        let selector = self.selector(side);
        let Some(window) = selector.popup_window() else {
            self.hits.set_popup(side, None);
            return;
        };

        let anchor = self.hits.selector(side);
        let popup_area = dropdown_rect(anchor, window.rows as u16 + 2, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border(self.focus == side.popup()));
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let items: Vec<ListItem> = selector
            .filtered()
            .iter()
            .enumerate()
            .skip(window.offset)
            .take(window.rows)
            .map(|(idx, name)| {
                let style = if Some(idx) == selector.highlighted() {
                    self.theme.highlight()
                } else {
                    self.theme.text()
                };
                ListItem::new(Span::styled(name.clone(), style))
            })
            .collect();
        frame.render_widget(List::new(items), inner);

        if window.scrollbar {
            let position = selector.highlighted().unwrap_or(window.offset);
            let mut state = ScrollbarState::new(selector.filtered().len()).position(position);
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight),
                popup_area.inner(Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut state,
            );
        }

        self.hits.set_popup(side, Some(inner));
    }

    fn draw_confirm(&self, frame: &mut Frame, area: Rect, confirmation: &Confirmation) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = self.panel(Label::Confirm, true);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(Span::styled(
                self.locale.render(&confirmation.prompt()),
                self.theme.text(),
            )),
            Line::from(""),
            Line::from(Span::styled(
                self.locale.label(Label::ConfirmHint),
                self.theme.muted(),
            )),
        ];
        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_notice(&self, frame: &mut Frame, area: Rect, notice: &Notice) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let title = match notice.severity {
            Severity::Info => Label::Info,
            Severity::Warning => Label::Warning,
            Severity::Error => Label::Error,
        };
        let style = self.theme.severity(notice.severity);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(style)
            .title(Span::styled(self.locale.label(title), style));
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(Span::styled(self.locale.render(&notice.message), style)),
            Line::from(""),
            Line::from(Span::styled(
                self.locale.label(Label::DismissHint),
                self.theme.muted(),
            )),
        ];
        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }
}

/// True while the selector text is still the entry last picked from its popup.
fn picked_from_list(selector: &TypeaheadSelector) -> bool {
    selector
        .committed()
        .is_some_and(|value| !value.is_empty() && value == selector.text())
}

/// Move a list cursor by `delta`, clamped to the list bounds.
fn step(rows: &mut ListState, len: usize, delta: isize) {
    if len == 0 {
        return;
    }
    let current = rows.selected().unwrap_or(0) as isize;
    let next = current.saturating_add(delta).clamp(0, len as isize - 1);
    rows.select(Some(next as usize));
}

/// Keep a list cursor valid after the list changed size.
fn clamp(rows: &mut ListState, len: usize) {
    match rows.selected() {
        _ if len == 0 => rows.select(None),
        None => rows.select(Some(0)),
        Some(idx) if idx >= len => rows.select(Some(len - 1)),
        Some(_) => {}
    }
}
