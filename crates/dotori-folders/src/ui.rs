use dotori_core::interaction::{ColumnSpan, RowHit};
use dotori_core::render::render_items;
use dotori_core::ErrorReporter;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::{FolderRow, FolderTool};

pub const ADD_BUTTON: &str = "[+]";

const GUIDE_STYLE: Style = Style::new().fg(Color::DarkGray);
const HOVER_BG: Color = Color::Gray;
const ACTIVE_FG: Color = Color::Rgb(72, 191, 145);

/// Width of the expand icon column.
const ICON_WIDTH: u16 = 2;

/// Area of the folder list block, leaving the bottom line for status.
pub fn tree_area(area: Rect) -> Rect {
    Rect {
        height: area.height.saturating_sub(1),
        ..area
    }
}

/// Where rows are drawn: the folder list block minus its border.
pub fn list_area(area: Rect) -> Rect {
    Block::default().borders(Borders::ALL).inner(tree_area(area))
}

/// First visible row so that the cursor stays on screen.
pub fn scroll_offset(cursor: usize, visible_lines: usize) -> usize {
    if visible_lines > 0 && cursor >= visible_lines {
        cursor - visible_lines + 1
    } else {
        0
    }
}

/// Columns taken by guides and the expand icon before the label.
fn prefix_width(row: &FolderRow, indent: u16) -> u16 {
    u16::try_from(row.row.depth)
        .unwrap_or(u16::MAX)
        .saturating_mul(indent)
        .saturating_add(ICON_WIDTH)
}

/// Cut `name` down to at most `max` display columns.
fn fit_label(name: &str, max: u16) -> String {
    if name.width() <= max as usize {
        return name.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in name.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max as usize {
            break;
        }
        used += w;
        out.push(c);
    }
    out
}

fn label_room(row: &FolderRow, indent: u16, width: u16) -> u16 {
    let button = if row.shows_add_button() {
        ADD_BUTTON.len() as u16 + 1
    } else {
        0
    };
    width.saturating_sub(prefix_width(row, indent).saturating_add(button))
}

/// Column spans of the label and add button of a row drawn `width` wide.
pub fn row_hit(row: &FolderRow, indent: u16, width: u16) -> RowHit {
    let start = prefix_width(row, indent).min(width);
    let label = fit_label(&row.row.name, label_room(row, indent, width));
    let label = ColumnSpan::new(start, start.saturating_add(label.width() as u16));

    let button_width = ADD_BUTTON.len() as u16;
    let add_button = (row.shows_add_button() && width >= button_width)
        .then(|| ColumnSpan::new(width - button_width, width));

    RowHit { label, add_button }
}

/// Render the folder list and its status line.
pub fn render_folder_tool<R: ErrorReporter>(frame: &mut Frame, area: Rect, tool: &FolderTool<R>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue))
        .title(" Folders ");
    let tree_area = tree_area(area);
    let inner = block.inner(tree_area);
    frame.render_widget(block, tree_area);

    if inner.height > 0 && inner.width > 0 {
        render_rows(frame, inner, tool);
    }

    if area.height > 0 {
        let status_area = Rect {
            y: area.y + area.height - 1,
            height: 1,
            ..area
        };
        frame.render_widget(Paragraph::new(status_line(tool)), status_area);
    }
}

fn render_rows<R: ErrorReporter>(frame: &mut Frame, area: Rect, tool: &FolderTool<R>) {
    let items = render_items(tool.rows(), tool);

    if items.is_empty() {
        let message = if tool.is_loading() {
            "  Loading folders..."
        } else {
            "  No folders yet. Press 'A' to add one."
        };
        let empty = Paragraph::new(message).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }

    let visible_lines = area.height as usize;
    let offset = scroll_offset(tool.cursor(), visible_lines);

    let lines: Vec<Line> = items
        .iter()
        .skip(offset)
        .take(visible_lines)
        .map(|item| row_line(item, tool.indent(), area.width))
        .collect();

    frame.render_widget(Paragraph::new(lines), area);
}

/// Draw one row: guides, expand icon, label and, when shown, the add button
/// flush right.
pub fn row_line(item: &FolderRow, indent: u16, width: u16) -> Line<'static> {
    let row = &item.row;
    let base_style = if item.active {
        Style::default().fg(ACTIVE_FG).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    let base_style = if item.hovered {
        base_style.bg(HOVER_BG)
    } else {
        base_style
    };

    let mut spans: Vec<Span<'static>> = Vec::new();

    for d in 0..row.depth {
        let has_guide = row.guide_depths.get(d).copied().unwrap_or(false);
        let pad = " ".repeat(indent.saturating_sub(1) as usize);
        if has_guide && indent > 0 {
            let guide_style = if item.hovered {
                GUIDE_STYLE.bg(HOVER_BG)
            } else {
                GUIDE_STYLE
            };
            spans.push(Span::styled(format!("\u{2502}{pad}"), guide_style));
        } else {
            spans.push(Span::styled(" ".repeat(indent as usize), base_style));
        }
    }

    let icon = match (row.has_children, row.expanded) {
        (true, true) => "\u{25BC} ",
        (true, false) => "\u{25B6} ",
        (false, _) => "  ",
    };
    spans.push(Span::styled(icon, base_style));
    spans.push(Span::styled(
        fit_label(&row.name, label_room(item, indent, width)),
        base_style,
    ));

    let used: usize = spans.iter().map(|s| s.content.width()).sum();
    if item.shows_add_button() {
        let remaining = (width as usize).saturating_sub(used + ADD_BUTTON.len());
        spans.push(Span::styled(" ".repeat(remaining), base_style));
        spans.push(Span::styled(
            ADD_BUTTON,
            base_style.fg(ACTIVE_FG).add_modifier(Modifier::BOLD),
        ));
    } else if item.hovered {
        let remaining = (width as usize).saturating_sub(used);
        spans.push(Span::styled(" ".repeat(remaining), base_style));
    }

    Line::from(spans)
}

fn status_line<R: ErrorReporter>(tool: &FolderTool<R>) -> Line<'static> {
    let mut spans = vec![Span::styled(
        " selected: ",
        Style::default().fg(Color::DarkGray),
    )];
    spans.push(Span::styled(
        tool.selected_folder_name().unwrap_or("-").to_string(),
        Style::default().fg(ACTIVE_FG),
    ));

    if tool.is_loading() {
        spans.push(Span::raw("  loading..."));
    }
    if tool.pending_creations() > 0 {
        spans.push(Span::raw(format!("  creating {}...", tool.pending_creations())));
    }
    if let Some(error) = tool.last_error() {
        spans.push(Span::styled(
            format!("  {error}"),
            Style::default().fg(Color::Red),
        ));
    }

    Line::from(spans)
}
