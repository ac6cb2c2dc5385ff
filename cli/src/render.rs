use colored::{ColoredString, Colorize};
use todo_sync::{SyncState, Todo};

use crate::args::Theme;

struct Palette {
    done: fn(&str) -> ColoredString,
    open: fn(&str) -> ColoredString,
    muted: fn(&str) -> ColoredString,
}

impl Theme {
    fn palette(self) -> Palette {
        match self {
            Theme::Light => Palette {
                done: |s| s.green(),
                open: |s| s.black().bold(),
                muted: |s| s.bright_black(),
            },
            Theme::Dark => Palette {
                done: |s| s.bright_green(),
                open: |s| s.bright_white().bold(),
                muted: |s| s.white().dimmed(),
            },
        }
    }
}

fn render_todo(todo: &Todo, palette: &Palette) -> String {
    let (mark, title) = if todo.completed {
        ("[x]", (palette.done)(&todo.title).strikethrough())
    } else {
        ("[ ]", (palette.open)(&todo.title))
    };
    let mut line = format!("{mark} {} {title}", (palette.muted)(&format!("#{}", todo.id)));
    if !todo.description.is_empty() {
        line.push_str(&format!(" {}", (palette.muted)(&format!("- {}", todo.description))));
    }
    line
}

/// Render the current page. The pager line only shows when there is more
/// than one page.
pub fn render(state: &SyncState, theme: Theme) -> String {
    let palette = theme.palette();
    let mut lines = Vec::with_capacity(state.items.len() + 2);

    if state.items.is_empty() {
        lines.push((palette.muted)("No todos yet.").to_string());
    } else {
        lines.extend(state.items.iter().map(|todo| render_todo(todo, &palette)));
    }

    let pagination = &state.pagination;
    if pagination.total_pages > 1 {
        lines.push(
            (palette.muted)(&format!(
                "Page {} of {} ({} todos)",
                pagination.current_page, pagination.total_pages, pagination.total
            ))
            .to_string(),
        );
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use todo_sync::PaginationState;

    fn todo(id: u64, title: &str, description: &str, completed: bool) -> Todo {
        Todo {
            id,
            title: title.to_string(),
            description: description.to_string(),
            completed,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn plain(state: &SyncState) -> String {
        colored::control::set_override(false);
        render(state, Theme::Light)
    }

    #[test]
    fn empty_page() {
        assert_eq!(plain(&SyncState::default()), "No todos yet.");
    }

    #[test]
    fn items_with_marks_and_descriptions() {
        let state = SyncState {
            items: vec![todo(2, "Ship it", "", true), todo(1, "Write it", "first draft", false)],
            pagination: PaginationState {
                total_pages: 1,
                total: 2,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(plain(&state), "[x] #2 Ship it\n[ ] #1 Write it - first draft");
    }

    #[test]
    fn pager_line_on_multiple_pages() {
        let state = SyncState {
            items: vec![todo(3, "Later", "", false)],
            pagination: PaginationState {
                current_page: 2,
                total_pages: 3,
                total: 11,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(plain(&state), "[ ] #3 Later\nPage 2 of 3 (11 todos)");
    }
}
