//! Markdown rendering for transcript messages
//!
//! Converts assistant markdown into styled ratatui lines. Also extracts the
//! final fenced code block of a reply, which is where the crafted prompt
//! lands and what the copy shortcut grabs.

use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use super::theme::Theme;

/// Render markdown text to styled ratatui Lines
///
/// Supports bold, italic, inline code, fenced code blocks, bullet lists,
/// headings, and links (underlined).
pub fn render_markdown(text: &str, theme: &Theme, max_width: usize) -> Vec<Line<'static>> {
    let parser = Parser::new(text);
    let mut lines = Vec::new();
    let mut current_spans: Vec<Span> = Vec::new();
    let mut style_stack: Vec<Style> = vec![Style::default().fg(theme.text_primary)];
    let mut in_code_block = false;

    for event in parser {
        match event {
            Event::Text(text) => {
                if in_code_block {
                    for line in text.lines() {
                        lines.push(Line::from(vec![
                            Span::raw("  "),
                            Span::styled(
                                line.to_string(),
                                Style::default().fg(theme.text_primary).bg(theme.bg_code),
                            ),
                        ]));
                    }
                } else {
                    let style = style_stack.last().copied().unwrap_or_default();
                    current_spans.push(Span::styled(text.to_string(), style));
                }
            }
            Event::Code(code) => {
                current_spans.push(Span::styled(
                    format!("`{}`", code),
                    Style::default().fg(theme.accent).bg(theme.bg_code),
                ));
            }
            Event::Start(Tag::Strong) => {
                let current = style_stack.last().copied().unwrap_or_default();
                style_stack.push(current.add_modifier(Modifier::BOLD));
            }
            Event::End(TagEnd::Strong) => {
                style_stack.pop();
            }
            Event::Start(Tag::Emphasis) => {
                let current = style_stack.last().copied().unwrap_or_default();
                style_stack.push(current.add_modifier(Modifier::ITALIC));
            }
            Event::End(TagEnd::Emphasis) => {
                style_stack.pop();
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                in_code_block = true;
                let header = match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => format!("```{}", lang),
                    _ => "```".to_string(),
                };
                lines.push(Line::from(Span::styled(
                    header,
                    Style::default().fg(theme.text_muted),
                )));
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code_block = false;
                lines.push(Line::from(Span::styled(
                    "```",
                    Style::default().fg(theme.text_muted),
                )));
            }
            Event::Start(Tag::Item) => {
                current_spans.push(Span::styled("- ", Style::default().fg(theme.accent)));
            }
            Event::End(TagEnd::Item) => {
                if !current_spans.is_empty() {
                    lines.push(Line::from(std::mem::take(&mut current_spans)));
                }
            }
            Event::Start(Tag::Link { .. }) => {
                let current = style_stack.last().copied().unwrap_or_default();
                style_stack.push(current.fg(theme.accent).add_modifier(Modifier::UNDERLINED));
            }
            Event::End(TagEnd::Link) => {
                style_stack.pop();
            }
            Event::Start(Tag::Heading { .. }) => {
                let current = style_stack.last().copied().unwrap_or_default();
                style_stack.push(current.fg(theme.accent).add_modifier(Modifier::BOLD));
            }
            Event::End(TagEnd::Heading { .. }) => {
                style_stack.pop();
                if !current_spans.is_empty() {
                    lines.push(Line::from(std::mem::take(&mut current_spans)));
                }
                lines.push(Line::from(""));
            }
            Event::SoftBreak => {
                current_spans.push(Span::raw(" "));
            }
            Event::HardBreak => {
                if !current_spans.is_empty() {
                    lines.push(Line::from(std::mem::take(&mut current_spans)));
                }
            }
            Event::End(TagEnd::Paragraph) => {
                if !current_spans.is_empty() {
                    lines.push(Line::from(std::mem::take(&mut current_spans)));
                }
                lines.push(Line::from(""));
            }
            _ => {}
        }
    }

    if !current_spans.is_empty() {
        lines.push(Line::from(current_spans));
    }

    while lines.last().is_some_and(|l| l.spans.is_empty()) {
        lines.pop();
    }

    wrap_lines(lines, max_width)
}

/// Content of the last fenced code block in `text`, if any.
pub fn last_code_block(text: &str) -> Option<String> {
    let parser = Parser::new(text);
    let mut in_code_block = false;
    let mut current = String::new();
    let mut last: Option<String> = None;

    for event in parser {
        match event {
            Event::Start(Tag::CodeBlock(_)) => {
                in_code_block = true;
                current.clear();
            }
            Event::Text(t) if in_code_block => current.push_str(&t),
            Event::End(TagEnd::CodeBlock) => {
                in_code_block = false;
                last = Some(current.trim_end().to_string());
            }
            _ => {}
        }
    }

    last.filter(|s| !s.is_empty())
}

fn wrap_lines(lines: Vec<Line<'static>>, max_width: usize) -> Vec<Line<'static>> {
    if max_width == 0 {
        return lines;
    }

    let mut wrapped: Vec<Line<'static>> = Vec::new();

    for line in lines {
        if line.spans.is_empty() {
            wrapped.push(Line::from(""));
            continue;
        }

        let mut current_spans: Vec<Span<'static>> = Vec::new();
        let mut current_width = 0usize;

        for span in line.spans {
            let content = span.content.to_string();
            let style = span.style;

            for ch in content.chars() {
                if current_width >= max_width {
                    wrapped.push(Line::from(std::mem::take(&mut current_spans)));
                    current_width = 0;
                }
                current_spans.push(Span::styled(ch.to_string(), style));
                current_width += 1;
            }
        }

        wrapped.push(Line::from(current_spans));
    }

    wrapped
}
