//! Interactive widget sub-state embedded in assistant messages
//!
//! Two widget kinds exist: a task checklist (multi-select) and an option
//! picker (single-select). Both mutate locally and terminate in a submit
//! that synthesizes a plain-text summary for the ordinary send pipeline.
//! A message carries at most one widget; the enum makes that structural.

use serde::{Deserialize, Serialize};

/// Widget attached to an assistant message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageWidget {
    Checklist(TaskList),
    OptionPicker(OptionPicker),
}

impl MessageWidget {
    pub fn is_submitted(&self) -> bool {
        match self {
            MessageWidget::Checklist(list) => list.submitted,
            MessageWidget::OptionPicker(picker) => picker.submitted,
        }
    }

    pub fn mark_submitted(&mut self) {
        match self {
            MessageWidget::Checklist(list) => list.submitted = true,
            MessageWidget::OptionPicker(picker) => picker.submitted = true,
        }
    }

    /// Number of interactive rows (used for focus movement in the UI)
    pub fn row_count(&self) -> usize {
        match self {
            MessageWidget::Checklist(list) => list.tasks.len(),
            MessageWidget::OptionPicker(picker) => picker.options.len(),
        }
    }
}

/// One checklist item; never reordered or deleted after creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub text: String,
    pub completed: bool,
}

/// Checklist widget state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskList {
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub submitted: bool,
}

impl TaskList {
    pub fn new(items: impl IntoIterator<Item = String>) -> Self {
        let tasks = items
            .into_iter()
            .enumerate()
            .map(|(i, text)| Task {
                id: format!("task_{}", i + 1),
                text,
                completed: false,
            })
            .collect();
        Self {
            tasks,
            submitted: false,
        }
    }

    /// Flip one task; returns false when the id does not resolve.
    pub fn toggle(&mut self, task_id: &str) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == task_id) {
            Some(task) => {
                task.completed = !task.completed;
                true
            }
            None => false,
        }
    }

    /// Mass-uncheck only from the all-complete state; any other state
    /// (all-incomplete or mixed) mass-checks.
    pub fn toggle_all(&mut self) {
        let all_completed = self.tasks.iter().all(|t| t.completed);
        for task in &mut self.tasks {
            task.completed = !all_completed;
        }
    }

    pub fn progress(&self) -> (usize, usize) {
        let done = self.tasks.iter().filter(|t| t.completed).count();
        (done, self.tasks.len())
    }

    /// Outbound summary: completed and pending sections, either omitted
    /// when empty.
    pub fn submission_text(&self) -> String {
        let completed: Vec<&str> = self
            .tasks
            .iter()
            .filter(|t| t.completed)
            .map(|t| t.text.as_str())
            .collect();
        let pending: Vec<&str> = self
            .tasks
            .iter()
            .filter(|t| !t.completed)
            .map(|t| t.text.as_str())
            .collect();

        let mut text = String::from("I've updated the task list. ");
        if !completed.is_empty() {
            text.push_str(&format!("Completed: {}. ", completed.join(", ")));
        }
        if !pending.is_empty() {
            text.push_str(&format!("Still pending: {}.", pending.join(", ")));
        }
        text.trim_end().to_string()
    }
}

/// One selectable option
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickerOption {
    pub id: String,
    pub label: String,
}

/// Single-choice widget state; at most one option selected at a time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionPicker {
    pub title: String,
    pub options: Vec<PickerOption>,
    pub selected_id: Option<String>,
    #[serde(default)]
    pub submitted: bool,
}

impl OptionPicker {
    pub fn new(title: impl Into<String>, labels: impl IntoIterator<Item = String>) -> Self {
        let options = labels
            .into_iter()
            .enumerate()
            .map(|(i, label)| PickerOption {
                id: format!("opt_{}", i + 1),
                label,
            })
            .collect();
        Self {
            title: title.into(),
            options,
            selected_id: None,
            submitted: false,
        }
    }

    /// Select an option; ids outside the declared set are rejected.
    pub fn select(&mut self, option_id: &str) -> bool {
        if self.options.iter().any(|o| o.id == option_id) {
            self.selected_id = Some(option_id.to_string());
            true
        } else {
            false
        }
    }

    pub fn selected_label(&self) -> Option<&str> {
        let id = self.selected_id.as_deref()?;
        self.options
            .iter()
            .find(|o| o.id == id)
            .map(|o| o.label.as_str())
    }

    /// Outbound text; `None` while nothing is selected.
    pub fn submission_text(&self) -> Option<String> {
        self.selected_label()
            .map(|label| format!("I've selected the {} aesthetic.", label))
    }
}

/// Lift a widget declaration out of an assistant reply.
///
/// Replies may carry one fenced block tagged `tasks` or `options`, one item
/// per line (for `options`, the first line is the picker title). The block
/// is stripped from the displayed text; the first such block wins.
pub fn extract_widget(text: &str) -> (String, Option<MessageWidget>) {
    let mut display = String::new();
    let mut widget = None;
    let mut block_lines: Vec<String> = Vec::new();
    let mut in_block: Option<&str> = None;

    for line in text.lines() {
        let trimmed = line.trim();
        match in_block {
            Some(tag) => {
                if trimmed == "```" {
                    if widget.is_none() {
                        widget = build_widget(tag, &block_lines);
                    }
                    block_lines.clear();
                    in_block = None;
                } else {
                    block_lines.push(trimmed.to_string());
                }
            }
            None => {
                if widget.is_none() && trimmed == "```tasks" {
                    in_block = Some("tasks");
                } else if widget.is_none() && trimmed == "```options" {
                    in_block = Some("options");
                } else {
                    display.push_str(line);
                    display.push('\n');
                }
            }
        }
    }

    // Unterminated block: keep it as plain text rather than guessing
    if in_block.is_some() {
        for line in &block_lines {
            display.push_str(line);
            display.push('\n');
        }
    }

    (display.trim_end().to_string(), widget)
}

fn build_widget(tag: &str, lines: &[String]) -> Option<MessageWidget> {
    let items: Vec<String> = lines
        .iter()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect();
    match tag {
        "tasks" if !items.is_empty() => {
            Some(MessageWidget::Checklist(TaskList::new(items)))
        }
        "options" if items.len() >= 2 => {
            let title = items[0].clone();
            Some(MessageWidget::OptionPicker(OptionPicker::new(
                title,
                items[1..].iter().cloned(),
            )))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn list(states: &[bool]) -> TaskList {
        let mut l = TaskList::new(states.iter().enumerate().map(|(i, _)| format!("item {i}")));
        for (task, done) in l.tasks.iter_mut().zip(states) {
            task.completed = *done;
        }
        l
    }

    #[test]
    fn test_toggle_all_from_mixed_checks_everything() {
        let mut l = list(&[true, false]);
        l.toggle_all();
        assert!(l.tasks.iter().all(|t| t.completed));
    }

    #[test]
    fn test_toggle_all_from_complete_unchecks_everything() {
        let mut l = list(&[true, true]);
        l.toggle_all();
        assert!(l.tasks.iter().all(|t| !t.completed));
    }

    #[test]
    fn test_toggle_all_on_empty_is_idempotent() {
        let mut l = TaskList::new(std::iter::empty());
        l.toggle_all();
        l.toggle_all();
        assert!(l.tasks.is_empty());
    }

    proptest! {
        // Two consecutive toggle-alls return any non-empty list to its
        // original state.
        #[test]
        fn prop_toggle_all_is_an_involution(states in proptest::collection::vec(any::<bool>(), 1..16)) {
            let mut l = list(&states);
            let before: Vec<bool> = l.tasks.iter().map(|t| t.completed).collect();
            l.toggle_all();
            l.toggle_all();
            let after: Vec<bool> = l.tasks.iter().map(|t| t.completed).collect();
            prop_assert_eq!(before, after);
        }

        #[test]
        fn prop_submission_sections_match_state(states in proptest::collection::vec(any::<bool>(), 0..12)) {
            let l = list(&states);
            let text = l.submission_text();
            let any_done = states.iter().any(|s| *s);
            let any_pending = states.iter().any(|s| !*s);
            prop_assert_eq!(text.contains("Completed:"), any_done);
            prop_assert_eq!(text.contains("Still pending:"), any_pending);
        }
    }

    #[test]
    fn test_submission_text_all_complete_has_no_pending_clause() {
        let l = list(&[true, true]);
        assert_eq!(
            l.submission_text(),
            "I've updated the task list. Completed: item 0, item 1."
        );
    }

    #[test]
    fn test_submission_text_all_pending_has_no_completed_clause() {
        let l = list(&[false, false]);
        assert_eq!(
            l.submission_text(),
            "I've updated the task list. Still pending: item 0, item 1."
        );
    }

    #[test]
    fn test_submission_text_mixed_lists_both() {
        let l = list(&[true, false]);
        assert_eq!(
            l.submission_text(),
            "I've updated the task list. Completed: item 0. Still pending: item 1."
        );
    }

    #[test]
    fn test_picker_submission_requires_selection() {
        let mut p = OptionPicker::new("Aesthetic", ["Warm", "Cold"].iter().map(|s| s.to_string()));
        assert_eq!(p.submission_text(), None);

        assert!(!p.select("opt_99"));
        assert_eq!(p.selected_id, None);

        assert!(p.select("opt_2"));
        assert_eq!(
            p.submission_text().as_deref(),
            Some("I've selected the Cold aesthetic.")
        );
    }

    #[test]
    fn test_picker_reselect_replaces() {
        let mut p = OptionPicker::new("T", ["a", "b"].iter().map(|s| s.to_string()));
        p.select("opt_1");
        p.select("opt_2");
        assert_eq!(p.selected_id.as_deref(), Some("opt_2"));
    }

    #[test]
    fn test_extract_tasks_block() {
        let reply = "Let's break it down.\n```tasks\nDefine the audience\nChoose a tone\n```\nTick them off as you go.";
        let (display, widget) = extract_widget(reply);
        assert_eq!(display, "Let's break it down.\nTick them off as you go.");
        match widget {
            Some(MessageWidget::Checklist(list)) => {
                assert_eq!(list.tasks.len(), 2);
                assert_eq!(list.tasks[0].text, "Define the audience");
                assert!(!list.submitted);
            }
            other => panic!("expected checklist, got {other:?}"),
        }
    }

    #[test]
    fn test_extract_options_block_first_line_is_title() {
        let reply = "Which way?\n```options\nPick an aesthetic\nMinimalist\nMaximalist\n```";
        let (display, widget) = extract_widget(reply);
        assert_eq!(display, "Which way?");
        match widget {
            Some(MessageWidget::OptionPicker(p)) => {
                assert_eq!(p.title, "Pick an aesthetic");
                assert_eq!(p.options.len(), 2);
                assert_eq!(p.options[1].label, "Maximalist");
                assert_eq!(p.selected_id, None);
            }
            other => panic!("expected picker, got {other:?}"),
        }
    }

    #[test]
    fn test_extract_keeps_ordinary_code_fences() {
        let reply = "Your prompt:\n```\nWrite a haiku about rust\n```";
        let (display, widget) = extract_widget(reply);
        assert!(widget.is_none());
        assert_eq!(display, reply);
    }

    #[test]
    fn test_extract_only_first_widget_block_wins() {
        let reply = "```tasks\na\n```\n```options\nT\nx\ny\n```";
        let (_, widget) = extract_widget(reply);
        assert!(matches!(widget, Some(MessageWidget::Checklist(_))));
    }

    #[test]
    fn test_extract_plain_text_untouched() {
        let (display, widget) = extract_widget("Just a reply.");
        assert_eq!(display, "Just a reply.");
        assert!(widget.is_none());
    }
}
