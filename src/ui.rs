use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::debug;
use ratatui::{
    layout::Margin,
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};
use std::{io, time::Duration};
use textwrap::wrap;
use tui_input::{backend::crossterm::EventHandler, Input};

use chitchatty::{Contact, ContactId, ConversationController, ConversationPhase, Message};

// Export types needed by main module
pub use ratatui::backend::CrosstermBackend;
pub use ratatui::Terminal;

pub const EMOJI_PALETTE: [&str; 18] = [
    "😀", "😃", "😄", "😁", "😆", "😊", "😍", "😘", "😉", "😎", "🤔", "😴", "😢", "😂", "👍", "👏", "🙏", "🎉",
];

/// What the user asked for; applied to the controller by the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    SelectContact(ContactId),
    SendMessage(String),
    ToggleSidebar,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Contacts,
    Input,
}

struct EmojiPicker {
    selected: usize,
}

struct HelpDialog {}

pub struct ChatUI {
    input: Input,
    focus: Focus,
    contact_cursor: usize,
    emoji_picker: Option<EmojiPicker>,
    help_dialog: Option<HelpDialog>,
    user_name: String,
}

impl ChatUI {
    pub fn new(user_name: &str) -> Self {
        ChatUI {
            input: Input::default(),
            focus: Focus::Input,
            contact_cursor: 0,
            emoji_picker: None,
            help_dialog: None,
            user_name: user_name.to_string(),
        }
    }

    pub fn pending_input(&self) -> &str {
        self.input.value()
    }

    /// Polls the terminal for one key press and translates it.
    pub fn handle_input(&mut self, ctl: &ConversationController) -> Result<Option<Intent>> {
        if event::poll(Duration::from_millis(10))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(self.handle_key(key, ctl));
                }
            }
        }
        Ok(None)
    }

    pub fn handle_key(&mut self, key: KeyEvent, ctl: &ConversationController) -> Option<Intent> {
        // Any key closes the help dialog
        if self.help_dialog.is_some() {
            self.help_dialog = None;
            return None;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => return Some(Intent::Quit),
            KeyCode::Char('h') if ctrl => {
                self.help_dialog = Some(HelpDialog {});
                return None;
            }
            KeyCode::Char('b') if ctrl => {
                if ctl.is_sidebar_open() {
                    self.focus = Focus::Input;
                }
                return Some(Intent::ToggleSidebar);
            }
            KeyCode::Char('e') if ctrl => {
                // Nothing to insert into without an open conversation
                if ctl.selected_id().is_none() {
                    return None;
                }
                self.emoji_picker = match self.emoji_picker {
                    Some(_) => None,
                    None => Some(EmojiPicker { selected: 0 }),
                };
                self.focus = Focus::Input;
                return None;
            }
            KeyCode::Esc => {
                if self.emoji_picker.take().is_some() {
                    return None;
                }
                return Some(Intent::Quit);
            }
            KeyCode::Tab => {
                self.switch_focus(ctl);
                return None;
            }
            _ => {}
        }

        if let Some(picker) = &mut self.emoji_picker {
            match key.code {
                KeyCode::Left => {
                    picker.selected = (picker.selected + EMOJI_PALETTE.len() - 1) % EMOJI_PALETTE.len();
                    return None;
                }
                KeyCode::Right => {
                    picker.selected = (picker.selected + 1) % EMOJI_PALETTE.len();
                    return None;
                }
                KeyCode::Enter => {
                    let emoji = EMOJI_PALETTE[picker.selected];
                    self.input = Input::new(format!("{}{}", self.input.value(), emoji));
                    return None;
                }
                _ => {}
            }
        }

        match self.focus {
            Focus::Contacts => self.handle_contacts_key(key, ctl.list_contacts()),
            Focus::Input => self.handle_input_key(key, ctl),
        }
    }

    fn switch_focus(&mut self, ctl: &ConversationController) {
        self.focus = match self.focus {
            Focus::Input if ctl.is_sidebar_open() => {
                // Start from the active contact
                if let Some(selected) = ctl.selected_id() {
                    if let Some(idx) = ctl.list_contacts().iter().position(|c| c.id == selected) {
                        self.contact_cursor = idx;
                    }
                }
                Focus::Contacts
            }
            _ => Focus::Input,
        };
    }

    fn handle_contacts_key(&mut self, key: KeyEvent, contacts: &[Contact]) -> Option<Intent> {
        match key.code {
            KeyCode::Up => {
                self.contact_cursor = self.contact_cursor.saturating_sub(1);
                None
            }
            KeyCode::Down => {
                if self.contact_cursor + 1 < contacts.len() {
                    self.contact_cursor += 1;
                }
                None
            }
            KeyCode::Enter => {
                let contact = contacts.get(self.contact_cursor)?;
                self.focus = Focus::Input;
                Some(Intent::SelectContact(contact.id))
            }
            _ => None,
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent, ctl: &ConversationController) -> Option<Intent> {
        if key.code != KeyCode::Enter {
            self.input.handle_event(&Event::Key(key));
            return None;
        }

        // Nothing to send to, or nothing to send: keep the draft
        if ctl.selected_id().is_none() || self.input.value().trim().is_empty() {
            debug!("UI: Enter ignored, no contact or empty draft");
            return None;
        }

        let text = self.input.value().to_string();
        self.input = Input::default();
        self.emoji_picker = None;
        Some(Intent::SendMessage(text))
    }

    pub fn draw<B: Backend>(&self, frame: &mut Frame<B>, ctl: &ConversationController) {
        let size = frame.size();

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Header
                Constraint::Min(5),    // Sidebar + chat
                Constraint::Length(1), // Help line
            ])
            .split(size);

        draw_header(frame, &self.user_name, rows[0]);

        let chat_area = if ctl.is_sidebar_open() {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
                .split(rows[1]);
            self.draw_sidebar(frame, ctl, columns[0]);
            columns[1]
        } else {
            rows[1]
        };

        match ctl.selected_contact() {
            Some(contact) => self.draw_chat(frame, ctl, contact, chat_area),
            None => draw_welcome(frame, chat_area),
        }

        let help = Paragraph::new(Line::from(vec![Span::styled(
            "ESC quit | TAB focus | Ctrl+B sidebar | Ctrl+E emoji | Ctrl+H help",
            Style::default().fg(Color::Gray),
        )]));
        frame.render_widget(help, rows[2]);

        if self.help_dialog.is_some() {
            draw_help_dialog(frame, size);
        }
    }

    fn draw_sidebar<B: Backend>(&self, frame: &mut Frame<B>, ctl: &ConversationController, area: Rect) {
        let selected = ctl.selected_id();
        let items: Vec<ListItem> = ctl
            .list_contacts()
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let marker = if self.focus == Focus::Contacts && i == self.contact_cursor { "> " } else { "  " };
                let name_style = if Some(c.id) == selected {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };

                let mut top = vec![
                    Span::raw(format!("{}{} ", marker, c.avatar)),
                    Span::styled(c.name.clone(), name_style),
                ];
                if !c.time.is_empty() {
                    top.push(Span::styled(format!("  {}", c.time), Style::default().fg(Color::Gray)));
                }
                if c.unread > 0 {
                    top.push(Span::raw(" "));
                    top.push(Span::styled(
                        format!("({})", c.unread),
                        Style::default().fg(Color::Black).bg(Color::Green),
                    ));
                }

                let mut lines = vec![Line::from(top)];
                if c.has_preview() {
                    lines.push(Line::from(Span::styled(
                        format!("     {}", c.last_message),
                        Style::default().fg(Color::Gray),
                    )));
                }
                ListItem::new(Text::from(lines))
            })
            .collect();

        let list = List::new(items).block(
            Block::default()
                .title("Chats")
                .borders(Borders::ALL)
                .border_style(match self.focus {
                    Focus::Contacts => Style::default().fg(Color::Yellow),
                    Focus::Input => Style::default(),
                }),
        );
        frame.render_widget(list, area);
    }

    fn draw_chat<B: Backend>(&self, frame: &mut Frame<B>, ctl: &ConversationController, contact: &Contact, area: Rect) {
        let picker_height = if self.emoji_picker.is_some() { 3 } else { 0 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),             // Contact header
                Constraint::Min(3),                // Messages area
                Constraint::Length(picker_height), // Emoji palette
                Constraint::Length(3),             // Input box
            ])
            .split(area);

        let header = Paragraph::new(Line::from(vec![
            Span::raw(format!("{} ", contact.avatar)),
            Span::styled(contact.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled("  Online", Style::default().fg(Color::Green)),
        ]))
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);

        draw_messages(frame, ctl.active_thread(), contact, typing_label(ctl).as_deref(), chunks[1]);

        if let Some(picker) = &self.emoji_picker {
            draw_emoji_picker(frame, picker, chunks[2]);
        }

        let input_block = Block::default()
            .title("Message (Enter ➤ send)")
            .borders(Borders::ALL)
            .border_style(match self.focus {
                Focus::Input => Style::default().fg(Color::Yellow),
                Focus::Contacts => Style::default(),
            });
        let input_widget = Paragraph::new(self.pending_input()).block(input_block);
        frame.render_widget(input_widget, chunks[3]);

        if self.focus == Focus::Input && self.help_dialog.is_none() {
            frame.set_cursor(
                // Put cursor past the end of the input text
                chunks[3].x + self.input.visual_cursor() as u16 + 1,
                chunks[3].y + 1,
            );
        }
    }
}

fn draw_header<B: Backend>(f: &mut Frame<B>, user_name: &str, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled("💬 ChitChatty", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw("   👨‍💻 "),
        Span::raw(user_name.to_string()),
        Span::styled(" ● Online", Style::default().fg(Color::Green)),
    ]));
    f.render_widget(header, area);
}

fn draw_welcome<B: Backend>(f: &mut Frame<B>, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("💬", Style::default())),
        Line::from(Span::styled(
            "Welcome to ChitChatty",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from("Select a contact from the sidebar to start messaging"),
    ];
    let welcome = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(welcome, area);
}

/// Names whoever is typing. The flag is shared by all threads, so the open
/// thread's contact is not necessarily the one typing.
fn typing_label(ctl: &ConversationController) -> Option<String> {
    if !ctl.is_peer_typing() {
        return None;
    }
    let label = ctl
        .list_contacts()
        .iter()
        .find(|c| ctl.conversation_phase(c.id) == ConversationPhase::PeerTyping)
        .map(|c| format!(" {} is typing • • •", c.name))
        .unwrap_or_else(|| " typing • • •".to_string());
    Some(label)
}

fn draw_messages<B: Backend>(
    f: &mut Frame<B>,
    messages: &[Message],
    contact: &Contact,
    typing: Option<&str>,
    area: Rect,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // Messages
            Constraint::Length(1), // Typing indicator
        ])
        .split(area);

    let wrap_width = area.width.saturating_sub(2).max(1) as usize; // Account for borders

    let items: Vec<ListItem> = messages
        .iter()
        .flat_map(|m| {
            let full_content = if m.is_from_user() {
                format!("[{}] You: {} {}", m.time, m.text, m.status.glyph())
            } else {
                format!("[{}] {}: {}", m.time, contact.name, m.text)
            };

            let wrapped_lines: Vec<String> = wrap(&full_content, wrap_width)
                .into_iter()
                .map(|l| l.into_owned())
                .collect();

            let style = if m.is_from_user() {
                Style::default().fg(Color::Blue)
            } else {
                Style::default()
            };

            wrapped_lines
                .into_iter()
                .map(move |line| ListItem::new(Text::from(line)).style(style))
        })
        .collect();

    // Select the last line so the list scrolls to the newest message
    let mut list_state = ListState::default();
    if !items.is_empty() {
        list_state.select(Some(items.len() - 1));
    }

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Messages"))
        .highlight_style(Style::default());
    f.render_stateful_widget(list, chunks[0], &mut list_state);

    if let Some(label) = typing {
        let indicator = Paragraph::new(Span::styled(
            label.to_string(),
            Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
        ));
        f.render_widget(indicator, chunks[1]);
    }
}

fn draw_emoji_picker<B: Backend>(f: &mut Frame<B>, picker: &EmojiPicker, area: Rect) {
    let spans: Vec<Span> = EMOJI_PALETTE
        .iter()
        .enumerate()
        .map(|(i, emoji)| {
            let style = if i == picker.selected {
                Style::default().add_modifier(Modifier::REVERSED)
            } else {
                Style::default()
            };
            Span::styled(format!("{} ", emoji), style)
        })
        .collect();

    let palette = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .title("Emoji (←/→ pick, Enter insert, Esc close)")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(palette, area);
}

fn draw_help_dialog<B: Backend>(f: &mut Frame<B>, area: Rect) {
    let popup_width = 64.min(area.width.saturating_sub(4));
    let popup_height = 21.min(area.height.saturating_sub(4));
    let popup_x = (area.width - popup_width) / 2;
    let popup_y = (area.height - popup_height) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    let popup_block = Block::default()
        .title("Keyboard Shortcuts")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    f.render_widget(Clear, popup_area);
    f.render_widget(popup_block, popup_area);

    let inner_area = popup_area.inner(&Margin {
        vertical: 1,
        horizontal: 2,
    });

    let shortcuts = [
        ("General", ""),
        ("ESC", "Close emoji picker, or quit"),
        ("Tab", "Switch between Chats and Message"),
        ("Ctrl+B", "Show/hide the Chats sidebar"),
        ("Ctrl+H", "Show this help"),
        ("Ctrl+C", "Quit"),
        ("", ""),
        ("Chats", ""),
        ("↑/↓", "Move through contacts"),
        ("Enter", "Open the highlighted conversation"),
        ("", ""),
        ("Message", ""),
        ("Enter", "Send message"),
        ("Ctrl+E", "Emoji picker (←/→ and Enter to insert)"),
        ("", ""),
        ("Press any key to close this dialog", ""),
    ];

    let items: Vec<ListItem> = shortcuts
        .iter()
        .map(|(key, desc)| {
            if desc.is_empty() {
                if key.is_empty() {
                    ListItem::new("")
                } else {
                    // Category header
                    ListItem::new(Text::styled(
                        key.to_string(),
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    ))
                }
            } else {
                let line = Line::from(vec![
                    Span::styled(format!("{:<10}", key), Style::default().fg(Color::Green)),
                    Span::raw(desc.to_string()),
                ]);
                ListItem::new(line)
            }
        })
        .collect();

    f.render_widget(List::new(items), inner_area);
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
