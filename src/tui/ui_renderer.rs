use super::app_logic::TuiApp;
use super::app_state::{AppMode, VisibleRow};
use ctxyank::{FileSource, Theme};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

struct Palette {
    text: Color,
    dim: Color,
    accent: Color,
    highlight_bg: Color,
    warning: Color,
}

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Dark => Palette {
            text: Color::White,
            dim: Color::Gray,
            accent: Color::Cyan,
            highlight_bg: Color::DarkGray,
            warning: Color::Yellow,
        },
        Theme::Light => Palette {
            text: Color::Black,
            dim: Color::DarkGray,
            accent: Color::Blue,
            highlight_bg: Color::Gray,
            warning: Color::Red,
        },
    }
}

fn draw_help_block(f: &mut Frame, colors: &Palette, area: Rect) {
    let help_text_lines_content = vec![
        Line::from("Arrows/jk: Nav | Space/Enter: Sel | o/←/→: Fold | *: Expand All | -: Collapse All"),
        Line::from("Tab: Code/Structure | y: Yank | m: Yank minified | r: Refresh | O: Open folder | t: Theme | q: Quit"),
    ];
    let help_paragraph = Paragraph::new(help_text_lines_content)
        .style(Style::default().fg(colors.dim))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("ctxyank")
                .title_style(Style::default().fg(colors.accent)),
        );
    f.render_widget(help_paragraph, area);
}

fn draw_folder_input_block(f: &mut Frame, app: &TuiApp<'_, impl FileSource>, colors: &Palette, area: Rect) {
    let filter_paragraph = Paragraph::new(app.folder_input.as_str())
        .style(Style::default().fg(colors.text))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Open folder (Enter to open, Esc to cancel)"),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(filter_paragraph, area);
    let cursor_col = app.folder_input[..app.folder_cursor_pos].chars().count() as u16;
    f.set_cursor_position((area.x + 1 + cursor_col, area.y + 1));
}

fn row_line(app: &TuiApp<'_, impl FileSource>, row: &VisibleRow, colors: &Palette) -> Line<'static> {
    let selection = app.session.selection();
    let selection_prefix = if selection.is_selected(&row.path) {
        "[x] "
    } else {
        "[ ] "
    };
    let expansion_prefix = if row.is_dir {
        if selection.is_expanded(&row.path) { "▾ " } else { "▸ " }
    } else {
        "  "
    };
    let mut spans = vec![
        Span::raw("  ".repeat(row.depth)),
        Span::styled(expansion_prefix, Style::default().fg(colors.dim)),
        Span::raw(selection_prefix),
        Span::styled(
            row.name.clone(),
            if row.is_dir {
                Style::default().fg(colors.accent)
            } else {
                Style::default().fg(colors.text)
            },
        ),
    ];

    let shown_total = app
        .rollups
        .get(&row.path)
        .map(|stats| stats.displayed_total())
        .filter(|total| *total > 0);
    if let Some(total) = shown_total {
        spans.push(Span::styled(
            format!("  {} lines", total),
            Style::default().fg(colors.dim),
        ));
    }
    Line::from(spans)
}

fn draw_tree_block(f: &mut Frame, app: &mut TuiApp<'_, impl FileSource>, colors: &Palette, area: Rect) {
    app.list_viewport_height = area.height.saturating_sub(2) as usize;
    app.ensure_selection_is_visible_in_viewport();
    let app = &*app;

    let end = (app.scroll_offset + app.list_viewport_height).min(app.rows.len());
    let list_items: Vec<ListItem> = app.rows[app.scroll_offset.min(end)..end]
        .iter()
        .map(|row| ListItem::new(row_line(app, row, colors)))
        .collect();

    let list_title = match app.session.root_handle() {
        Some(root) => format!("Files ({})", root.display()),
        None => "Files (no folder open)".to_string(),
    };

    let list_widget = List::new(list_items)
        .block(Block::default().borders(Borders::ALL).title(list_title))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(colors.highlight_bg),
        )
        .highlight_symbol("❯ ");

    let mut list_state_for_view = ListState::default();
    if !app.rows.is_empty() {
        list_state_for_view.select(Some(app.current_row.saturating_sub(app.scroll_offset)));
    }
    f.render_stateful_widget(list_widget, area, &mut list_state_for_view);
}

fn draw_preview_block(f: &mut Frame, app: &TuiApp<'_, impl FileSource>, colors: &Palette, area: Rect) {
    let preview = app.current_preview();
    let title = if app.scheduler.is_pending() {
        format!("{} (updating…)", app.view.title())
    } else {
        app.view.title().to_string()
    };
    let body = if preview.text.is_empty() {
        Paragraph::new("Select files to see their combined text here.")
            .style(Style::default().fg(colors.dim))
    } else {
        Paragraph::new(preview.text.as_str()).style(Style::default().fg(colors.text))
    };
    let paragraph = body
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .title_style(Style::default().fg(colors.accent)),
        )
        .scroll((app.preview_scroll, 0));
    f.render_widget(paragraph, area);
}

fn draw_status_bar(f: &mut Frame, app: &TuiApp<'_, impl FileSource>, colors: &Palette, area: Rect) {
    let metrics = app.current_preview().metrics;
    let mut spans = vec![Span::styled(
        format!(
            "{} lines | ≈ {} tokens | minified ≈ {}",
            metrics.lines, metrics.tokens, metrics.minified_tokens
        ),
        Style::default().fg(colors.text),
    )];
    if let Some(savings) = metrics.savings_badge() {
        spans.push(Span::styled(
            format!(" (-{}%)", savings),
            Style::default().fg(colors.accent),
        ));
    }
    let warning_count = app.session.warnings().len();
    if warning_count > 0 {
        spans.push(Span::styled(
            format!(" | ⚠️ {} warnings", warning_count),
            Style::default().fg(colors.warning),
        ));
    }
    if let Some(status) = &app.status {
        spans.push(Span::styled(
            format!(" | {}", status),
            Style::default().fg(colors.dim),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

pub(super) fn ui_frame<S: FileSource>(frame: &mut Frame, app: &mut TuiApp<'_, S>) {
    let colors = palette(app.theme());
    let help_lines = 2;
    let folder_input_height = if app.mode == AppMode::OpenFolder { 3 } else { 0 };

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(help_lines + 2),
            Constraint::Length(folder_input_height),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let body_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(main_chunks[2]);

    draw_help_block(frame, &colors, main_chunks[0]);
    if app.mode == AppMode::OpenFolder {
        draw_folder_input_block(frame, app, &colors, main_chunks[1]);
    }
    draw_tree_block(frame, app, &colors, body_chunks[0]);
    draw_preview_block(frame, app, &colors, body_chunks[1]);
    draw_status_bar(frame, app, &colors, main_chunks[3]);
}
