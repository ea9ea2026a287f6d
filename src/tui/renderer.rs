//! Frame rendering
//!
//! Pure draw functions over the current [`App`] state. The layout is a chat
//! sidebar on the left and the transcript, pending widget, and input line on
//! the right.

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};
use ratatui::Frame;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::store::{MessageWidget, Role};

use super::app::{App, Focus};
use super::markdown::render_markdown;
use super::theme::Theme;

const SIDEBAR_WIDTH: u16 = 28;

pub fn draw(frame: &mut Frame, app: &App, theme: &Theme) {
    let outer = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
        .split(frame.area());

    draw_sidebar(frame, app, theme, outer[0]);
    draw_main(frame, app, theme, outer[1]);
}

fn draw_sidebar(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let border_color = if app.focus == Focus::Sidebar {
        theme.border_focused
    } else {
        theme.border
    };

    let active_id = app.store.active_chat_id();
    let items: Vec<ListItem> = app
        .store
        .chats()
        .iter()
        .map(|chat| {
            let is_active = Some(chat.id.as_str()) == active_id;
            let marker = if is_active { "> " } else { "  " };
            let title = truncate(&chat.title, (area.width as usize).saturating_sub(4));
            let style = if is_active {
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.text_secondary)
            };
            ListItem::new(Line::from(vec![
                Span::styled(marker, Style::default().fg(theme.accent)),
                Span::styled(title, style),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title(" Chats ")
            .title_style(Style::default().fg(theme.text_primary))
            .style(Style::default().bg(theme.bg_sidebar)),
    );
    frame.render_widget(list, area);
}

fn draw_main(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let widget_height = app
        .pending_widget()
        .map(|(_, w)| w.row_count() as u16 + 4)
        .unwrap_or(0);
    let bar_height = u16::from(app.error.is_some() || app.status.is_some());

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),
            Constraint::Length(widget_height),
            Constraint::Length(3),
            Constraint::Length(bar_height),
        ])
        .split(area);

    let is_empty = app
        .store
        .active_chat()
        .map_or(true, |chat| chat.messages.is_empty());
    if is_empty {
        draw_welcome(frame, app, theme, rows[0]);
    } else {
        draw_transcript(frame, app, theme, rows[0]);
    }
    if widget_height > 0 {
        draw_pending_widget(frame, app, theme, rows[1]);
    }
    draw_input(frame, app, theme, rows[2]);
    if bar_height > 0 {
        draw_status_bar(frame, app, theme, rows[3]);
    }
}

fn draw_welcome(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "QAI Prompt Architect",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Describe what you want to create, or pick a starter:",
            Style::default().fg(theme.text_secondary),
        )),
        Line::from(""),
    ];
    for (i, suggestion) in app.suggestions().iter().enumerate() {
        lines.push(Line::from(vec![
            Span::styled(
                format!("  [{}] ", i + 1),
                Style::default().fg(theme.accent),
            ),
            Span::styled(suggestion.clone(), Style::default().fg(theme.text_primary)),
        ]));
    }

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border))
                .style(Style::default().bg(theme.bg_main)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn draw_transcript(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let Some(chat) = app.store.active_chat() else {
        return;
    };

    let width = (area.width as usize).saturating_sub(4);
    let mut lines: Vec<Line> = Vec::new();
    for message in &chat.messages {
        let (label, color) = match message.role {
            Role::User => ("You", theme.user_fg),
            Role::Model => ("QAI", theme.accent),
        };
        lines.push(Line::from(Span::styled(
            label,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        match message.role {
            Role::User => {
                for l in message.text.lines() {
                    lines.push(Line::from(Span::styled(
                        l.to_string(),
                        Style::default().fg(theme.user_fg),
                    )));
                }
            }
            Role::Model => lines.extend(render_markdown(&message.text, theme, width)),
        }
        if let Some(MessageWidget::Checklist(list)) =
            message.widget.as_ref().filter(|w| w.is_submitted())
        {
            let (done, total) = list.progress();
            lines.push(Line::from(Span::styled(
                format!("[checklist submitted: {}/{} done]", done, total),
                Style::default().fg(theme.text_muted),
            )));
        }
        lines.push(Line::from(""));
    }
    if app.is_loading {
        lines.push(Line::from(Span::styled(
            "QAI is thinking...",
            Style::default()
                .fg(theme.text_muted)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    // Pin to the bottom, offset by manual scroll
    let visible = area.height.saturating_sub(2) as usize;
    let top = lines
        .len()
        .saturating_sub(visible)
        .saturating_sub(app.scroll_offset as usize);

    let title = format!(" {} ", chat.title);
    let paragraph = Paragraph::new(lines)
        .scroll((top as u16, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border))
                .title(title)
                .title_style(Style::default().fg(theme.text_primary))
                .style(Style::default().bg(theme.bg_main)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn draw_pending_widget(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let Some((_, widget)) = app.pending_widget() else {
        return;
    };
    let focused = app.focus == Focus::Widget;
    let border_color = if focused {
        theme.border_focused
    } else {
        theme.border
    };

    let (title, mut lines) = match widget {
        MessageWidget::Checklist(list) => {
            let (done, total) = list.progress();
            let lines: Vec<Line> = list
                .tasks
                .iter()
                .enumerate()
                .map(|(i, task)| {
                    let cursor = if focused && i == app.widget_cursor {
                        "> "
                    } else {
                        "  "
                    };
                    let mark = if task.completed { "[x]" } else { "[ ]" };
                    let style = if task.completed {
                        Style::default()
                            .fg(theme.text_muted)
                            .add_modifier(Modifier::CROSSED_OUT)
                    } else {
                        Style::default().fg(theme.text_primary)
                    };
                    Line::from(vec![
                        Span::styled(cursor, Style::default().fg(theme.accent)),
                        Span::styled(format!("{} ", mark), Style::default().fg(theme.green)),
                        Span::styled(task.text.clone(), style),
                    ])
                })
                .collect();
            (format!(" Tasks ({}/{}) ", done, total), lines)
        }
        MessageWidget::OptionPicker(picker) => {
            let lines: Vec<Line> = picker
                .options
                .iter()
                .enumerate()
                .map(|(i, option)| {
                    let cursor = if focused && i == app.widget_cursor {
                        "> "
                    } else {
                        "  "
                    };
                    let selected = picker.selected_id.as_deref() == Some(option.id.as_str());
                    let mark = if selected { "(o)" } else { "( )" };
                    Line::from(vec![
                        Span::styled(cursor, Style::default().fg(theme.accent)),
                        Span::styled(format!("{} ", mark), Style::default().fg(theme.yellow)),
                        Span::styled(
                            option.label.clone(),
                            Style::default().fg(theme.text_primary),
                        ),
                    ])
                })
                .collect();
            (format!(" {} ", picker.title), lines)
        }
    };

    let hint = match widget {
        MessageWidget::Checklist(_) => "space toggle / a all / enter submit",
        MessageWidget::OptionPicker(_) => "space select / enter submit",
    };
    lines.push(Line::from(Span::styled(
        hint,
        Style::default().fg(theme.text_muted),
    )));

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title(title)
            .title_style(Style::default().fg(theme.text_primary))
            .style(Style::default().bg(theme.bg_main)),
    );
    frame.render_widget(paragraph, area);
}

fn draw_input(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let border_color = if app.focus == Focus::Input {
        theme.border_focused
    } else {
        theme.border
    };
    let title = if app.is_loading {
        " Message (waiting...) "
    } else {
        " Message "
    };

    let paragraph = Paragraph::new(app.input.as_str())
        .style(Style::default().fg(theme.text_primary))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color))
                .title(title)
                .title_style(Style::default().fg(theme.text_secondary))
                .style(Style::default().bg(theme.bg_main)),
        );
    frame.render_widget(paragraph, area);

    if app.focus == Focus::Input {
        let x = area.x + 1 + app.input.width() as u16;
        frame.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

fn draw_status_bar(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let (text, color) = if let Some(error) = &app.error {
        (error.as_str(), theme.red)
    } else if let Some(status) = &app.status {
        (status.as_str(), theme.green)
    } else {
        return;
    };

    let paragraph = Paragraph::new(Span::styled(text, Style::default().fg(color)))
        .style(Style::default().bg(theme.bg_main));
    frame.render_widget(paragraph, area);
}

fn truncate(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut width = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if width + w + 1 > max_width {
            break;
        }
        out.push(ch);
        width += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_titles_untouched() {
        assert_eq!(truncate("New Chat", 20), "New Chat");
    }

    #[test]
    fn test_truncate_long_titles_get_ellipsis() {
        let out = truncate("A very long conversation title indeed", 10);
        assert!(out.ends_with('…'));
        assert!(out.width() <= 10);
    }
}
