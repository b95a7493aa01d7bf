use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::debug;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use std::{io, time::Duration};
use textwrap::wrap;
use tui_input::{backend::crossterm::EventHandler, Input};

use msgboard::{Message, SendOutcome, Status, SyncError, SyncEvent};

// Export types needed by main module
pub use ratatui::backend::CrosstermBackend;
pub use ratatui::Terminal;

/// What the main loop should do after a key press.
#[derive(Debug, PartialEq)]
pub enum UiAction {
    Submit(Message),
    Reload,
    Quit,
}

pub struct BoardUI {
    messages: Vec<Message>,
    draft: Message,
    input: Input,
    // Set from submit until the outcome comes back, so Enter can't double-send
    sending: bool,
    notice: Option<String>,
}

impl BoardUI {
    pub fn new() -> Self {
        BoardUI {
            messages: Vec::new(),
            draft: Message::draft(),
            input: Input::default(),
            sending: false,
            notice: None,
        }
    }

    pub fn set_messages(&mut self, messages: Vec<Message>) {
        self.messages = messages;
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    /// Mirror service notifications onto the draft and the notice line.
    pub fn apply_event(&mut self, event: &SyncEvent) {
        match event {
            SyncEvent::StatusChanged { text, status } => {
                if self.sending && self.draft.text.trim() == text.as_str() {
                    self.draft.status = *status;
                }
            }
            SyncEvent::Loaded { count } => {
                self.notice = Some(format!("Loaded {} messages", count));
            }
            SyncEvent::LoadFailed { reason } => {
                self.notice = Some(format!("Could not refresh messages ({}); showing last known list", reason));
            }
            SyncEvent::Appended { .. } => {}
        }
    }

    pub fn finish_send(&mut self, result: Result<SendOutcome, SyncError>) {
        self.sending = false;
        match result {
            Ok(outcome) => {
                if outcome.is_sent() {
                    self.notice = None;
                } else {
                    self.notice = Some(format!("Message #{} failed to send", outcome.index));
                }
                self.draft = outcome.next_draft;
                self.input.reset();
            }
            Err(e) => {
                // Rejected before sending: keep the text so the user can fix it
                self.draft.status = Status::Draft;
                self.notice = Some(e.to_string());
            }
        }
    }

    /// Poll the terminal briefly and translate a key press into an action.
    pub fn handle_input(&mut self) -> Result<Option<UiAction>> {
        if event::poll(Duration::from_millis(10))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(self.handle_key(key));
                }
            }
        }
        Ok(None)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<UiAction> {
        match key.code {
            KeyCode::Esc => Some(UiAction::Quit),
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(UiAction::Reload),
            KeyCode::Enter => {
                if self.sending {
                    debug!("Ignoring submit while a send is in flight");
                    return None;
                }
                if self.draft.is_empty() {
                    self.notice = Some("Write a message first".to_string());
                    return None;
                }
                self.sending = true;
                self.notice = None;
                Some(UiAction::Submit(self.draft.clone()))
            }
            _ => {
                if !self.sending {
                    self.input.handle_event(&Event::Key(key));
                    self.draft.text = self.input.value().to_string();
                }
                None
            }
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        let size = frame.size();

        let preview_height = if self.draft.is_empty() { 0 } else { 4 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(5),                 // Board
                Constraint::Length(preview_height), // Draft preview
                Constraint::Length(3),              // Compose box
                Constraint::Length(1),              // Notice / help
            ])
            .split(size);

        draw_messages(frame, &self.messages, chunks[0]);

        if !self.draft.is_empty() {
            draw_preview(frame, &self.draft, chunks[1]);
        }

        let pending = self.draft.status == Status::Pending || self.sending;
        let input_block = Block::default()
            .title(if pending { "Write Message (sending...)" } else { "Write Message" })
            .borders(Borders::ALL)
            .border_style(if pending {
                Style::default().fg(Color::Gray)
            } else {
                Style::default().fg(Color::Yellow)
            });
        let input_widget = Paragraph::new(self.input.value()).block(input_block);
        frame.render_widget(input_widget, chunks[2]);

        let footer = match &self.notice {
            Some(notice) => Line::from(Span::styled(notice.as_str(), Style::default().fg(Color::Red))),
            None => Line::from(Span::styled(
                "Enter send | Ctrl+R reload | ESC quit",
                Style::default().fg(Color::Gray),
            )),
        };
        frame.render_widget(Paragraph::new(footer), chunks[3]);

        if !pending {
            frame.set_cursor(
                chunks[2].x + self.input.cursor() as u16 + 1,
                chunks[2].y + 1,
            );
        }
    }
}

fn status_style(status: Status) -> Style {
    match status {
        Status::Draft => Style::default().fg(Color::DarkGray),
        Status::Pending => Style::default().fg(Color::Blue),
        Status::Sent => Style::default(),
        Status::Failed => Style::default().fg(Color::Red),
    }
}

fn message_lines(label: &str, message: &Message, wrap_width: usize) -> Vec<ListItem<'static>> {
    let mut items = vec![ListItem::new(format!("#{} - {}", label, message.status))
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD))];
    let style = status_style(message.status);
    items.extend(
        wrap(&message.text, wrap_width.max(1))
            .into_iter()
            .map(|l| ListItem::new(format!("  {}", l)).style(style)),
    );
    items
}

fn draw_messages(f: &mut Frame, messages: &[Message], area: Rect) {
    let wrap_width = area.width.saturating_sub(4) as usize;

    let items: Vec<ListItem> = messages
        .iter()
        .enumerate()
        .flat_map(|(i, m)| message_lines(&i.to_string(), m, wrap_width))
        .collect();

    // Keep the newest message in view
    let mut list_state = ListState::default();
    if !items.is_empty() {
        list_state.select(Some(items.len() - 1));
    }

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Chat"))
        .highlight_style(Style::default());
    f.render_stateful_widget(list, area, &mut list_state);
}

fn draw_preview(f: &mut Frame, draft: &Message, area: Rect) {
    let wrap_width = area.width.saturating_sub(4) as usize;
    let items = message_lines("preview", draft, wrap_width);
    let list = List::new(items).block(Block::default().borders(Borders::LEFT | Borders::RIGHT));
    f.render_widget(list, area);
}

pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

pub fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
