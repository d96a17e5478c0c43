//! Generic rendering for any [`DataTable`].
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table, TableState as WidgetState};

use crate::app::theme::Theme;
use crate::error::{ApiError, GENERIC_FAILURE};
use crate::resources::Lookups;
use crate::table::{DataTable, SortDirection, TableView};
use crate::ui::components::themed_block;

pub struct TableProps<'a, R> {
    pub title: &'static str,
    pub table: &'a DataTable<R>,
    pub view: &'a TableView<'a, R>,
    pub lookups: &'a Lookups,
    pub theme: &'a Theme,
    pub error: Option<&'a ApiError>,
    pub searching: bool,
}

pub fn render_data_table<R>(f: &mut Frame, area: Rect, props: TableProps<'_, R>) {
    let TableProps {
        title,
        table,
        view,
        lookups,
        theme,
        error,
        searching,
    } = props;
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    // search line
    let state = table.state();
    let search = if searching {
        Line::from(vec![
            Span::styled("Search: ", Style::default().fg(theme.title)),
            Span::raw(state.query.clone()),
            Span::styled("▏", Style::default().fg(theme.highlight_fg)),
        ])
    } else if !state.query.is_empty() {
        Line::from(Span::styled(
            format!("Filter: {}  (/ to edit, Esc clears)", state.query),
            Style::default().fg(theme.muted),
        ))
    } else {
        Line::from(Span::styled("/ to search", Style::default().fg(theme.muted)))
    };
    f.render_widget(Paragraph::new(search), parts[0]);

    let block = themed_block(format!("{title} ({})", view.total), theme);
    if view.loading {
        let p = Paragraph::new("Loading…").style(Style::default().fg(theme.muted)).block(block);
        f.render_widget(p, parts[1]);
    } else if let (Some(err), true) = (error, view.total == 0) {
        let p = Paragraph::new(format!(
            "Could not load {}: {}\nPress r to retry.",
            title.to_lowercase(),
            err.user_message(GENERIC_FAILURE)
        ))
        .style(Style::default().fg(theme.error))
        .block(block);
        f.render_widget(p, parts[1]);
    } else if view.is_empty() {
        let p = Paragraph::new(table.config().empty_message.clone())
            .style(Style::default().fg(theme.muted))
            .block(block);
        f.render_widget(p, parts[1]);
    } else {
        let header = Row::new(table.columns().iter().enumerate().map(|(i, c)| {
            let marker = match state.sort {
                Some((s, SortDirection::Asc)) if s == i => " ▲",
                Some((s, SortDirection::Desc)) if s == i => " ▼",
                _ => "",
            };
            let mut style = Style::default().fg(theme.title).add_modifier(Modifier::BOLD);
            if i == state.focused_column {
                style = style.add_modifier(Modifier::UNDERLINED);
            }
            Cell::from(format!("{}{marker}", c.header)).style(style)
        }));
        let rows = view.rows.iter().map(|r| {
            Row::new(
                (0..table.columns().len())
                    .map(|i| Cell::from(table.cell_text(r, i, lookups)))
                    .collect::<Vec<_>>(),
            )
        });
        let widths: Vec<Constraint> = table
            .columns()
            .iter()
            .map(|c| match c.width {
                0 => Constraint::Fill(1),
                w => Constraint::Length(w),
            })
            .collect();
        let widget = Table::new(rows, widths)
            .header(header)
            .block(block)
            .style(Style::default().fg(theme.text))
            .row_highlight_style(
                Style::default()
                    .fg(theme.highlight_fg)
                    .bg(theme.highlight_bg)
                    .add_modifier(Modifier::REVERSED),
            )
            .column_spacing(1);
        let mut ws = WidgetState::default().with_selected(Some(view.selected));
        f.render_stateful_widget(widget, parts[1], &mut ws);
    }

    let footer = format!(
        "page {}/{}  rows/page: {}  {}",
        view.page + 1,
        view.page_count,
        state.page_size,
        error
            .map(|e| format!("  ! {}", e.user_message(GENERIC_FAILURE)))
            .unwrap_or_default()
    );
    f.render_widget(
        Paragraph::new(footer).style(Style::default().fg(theme.muted)),
        parts[2],
    );
}
