//! Shared UI components (status bar, toasts, help, modal helpers).
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::AppState;
use crate::app::theme::Theme;
use crate::notify::ToastLevel;
use crate::routes::Route;

/// Render the bottom status bar with mode, route and key hints.
pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let page = app.current_page();
    let mode = match page {
        Some(p) if p.dialog().is_some_and(|d| d.in_flight()) => "SAVING",
        Some(p) if p.dialog().is_some_and(|d| d.is_open()) => "DIALOG",
        Some(p) if p.captures_input() => "SEARCH",
        Some(_) => "NORMAL",
        None => match app.route() {
            Route::Login { .. } | Route::Register | Route::ForgotPassword => "FORM",
            _ => "VIEW",
        },
    };
    let hint = page.map(|p| p.hint()).unwrap_or(match app.route() {
        Route::Login { .. } => "Enter: sign in  Ctrl+R: register  Ctrl+F: forgot password  Esc: back",
        Route::Register | Route::ForgotPassword => "Tab: next field  Enter: submit  Esc: back to login",
        Route::UserDashboard => "r: refresh  L: sign out  q: quit",
        _ => "Enter: continue  q: quit",
    });
    let msg = format!("mode: {mode}  {}  {hint}  ?: help", app.route());
    let p = Paragraph::new(msg).style(Style::default().fg(app.theme.status_fg).bg(app.theme.status_bg));
    f.render_widget(p, area);
}

/// Compute a rectangle centered within `area` with a maximum size.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

pub fn level_style(theme: &Theme, level: ToastLevel) -> Style {
    let fg = match level {
        ToastLevel::Success => theme.success,
        ToastLevel::Info => theme.text,
        ToastLevel::Warning => theme.warning,
        ToastLevel::Error => theme.error,
    };
    Style::default().fg(fg)
}

/// Stack live toasts in the top-right corner, newest last.
pub fn render_toasts(f: &mut Frame, area: Rect, app: &AppState) {
    let toasts: Vec<_> = app.toasts.iter().collect();
    if toasts.is_empty() {
        return;
    }
    let width = 48u16.min(area.width);
    let mut y = area.y + 1;
    for toast in toasts {
        if y + 3 > area.y + area.height {
            break;
        }
        let rect = Rect {
            x: area.x + area.width.saturating_sub(width + 1),
            y,
            width,
            height: 3,
        };
        let style = level_style(&app.theme, toast.level);
        let p = Paragraph::new(toast.message.clone())
            .style(style)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).border_style(style));
        f.render_widget(Clear, rect);
        f.render_widget(p, rect);
        y += 3;
    }
}

/// Render the help modal from the active key bindings.
pub fn render_help_modal(f: &mut Frame, area: Rect, app: &AppState) {
    let width = 72u16.min(area.width.saturating_sub(4)).max(40);
    let height = 30u16.min(area.height.saturating_sub(2)).max(10);
    let rect = centered_rect(width, height, area);

    let summary = app.keymap.summary();
    let col1_w = summary.iter().map(|(a, _)| a.len()).max().unwrap_or(0);
    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled("Key bindings", Style::default().add_modifier(Modifier::BOLD))),
        Line::raw(""),
    ];
    for (action, keys) in summary {
        lines.push(Line::from(vec![
            Span::raw(format!("  {action:>col1_w$} │ ")),
            Span::styled(keys, Style::default().add_modifier(Modifier::ITALIC)),
        ]));
    }
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled("In dialogs", Style::default().add_modifier(Modifier::BOLD))));
    for (label, value) in [
        ("Next / previous field", "Tab, Shift+Tab, Up, Down"),
        ("Cycle choice or reference", "Left, Right"),
        ("Submit / confirm", "Enter, y"),
        ("Cancel", "Esc, n"),
    ] {
        lines.push(Line::from(vec![
            Span::raw(format!("  {label}: ")),
            Span::styled(value, Style::default().add_modifier(Modifier::ITALIC)),
        ]));
    }
    lines.push(Line::raw(""));
    lines.push(Line::from(vec![
        Span::raw("Close help: "),
        Span::styled("Esc / Enter", Style::default().add_modifier(Modifier::ITALIC)),
    ]));

    let p = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title("Help")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

/// Bordered block in the theme's colors.
pub fn themed_block<'a>(title: impl Into<Line<'a>>, theme: &Theme) -> Block<'a> {
    let title: Line<'a> = title.into();
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
}
