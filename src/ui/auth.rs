//! Public screens: landing, sign-in, registration, password reset, 404.
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Paragraph, Wrap};

use crate::app::AuthForm;
use crate::app::theme::Theme;
use crate::form::FieldKind;
use crate::ui::components::{centered_rect, themed_block};

pub fn render_home(f: &mut Frame, area: Rect, signed_in: bool, theme: &Theme) {
    let action = if signed_in {
        "Press Enter to open your dashboard."
    } else {
        "Press Enter to sign in."
    };
    let lines = vec![
        Line::from(Span::styled(
            "SACCO Back Office",
            Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
        Line::raw("Members, groups, accounts, savings, loans and payments in one console."),
        Line::raw(""),
        Line::from(Span::styled(action, Style::default().fg(theme.highlight_fg))),
    ];
    let rect = centered_rect(60, 9, area);
    f.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: true }).block(themed_block("Welcome", theme)),
        rect,
    );
}

pub fn render_login(f: &mut Frame, area: Rect, form: &AuthForm, session_expired: bool, theme: &Theme) {
    let note = session_expired.then_some("Your session has expired. Please log in again.");
    render_auth_form(
        f,
        area,
        "Sign in",
        form,
        note,
        "Enter: sign in  Ctrl+R: register  Ctrl+F: forgot password",
        theme,
    );
}

pub fn render_register(f: &mut Frame, area: Rect, form: &AuthForm, theme: &Theme) {
    render_auth_form(f, area, "Create account", form, None, "Enter: register  Esc: back to sign in", theme);
}

pub fn render_forgot(f: &mut Frame, area: Rect, form: &AuthForm, theme: &Theme) {
    render_auth_form(
        f,
        area,
        "Reset password",
        form,
        Some("Enter the email address on your account."),
        "Enter: send reset link  Esc: back to sign in",
        theme,
    );
}

pub fn render_not_found(f: &mut Frame, area: Rect, path: &str, theme: &Theme) {
    let body = format!("Page not found: {path}\n\nPress Enter to go home.");
    let rect = centered_rect(50, 6, area);
    f.render_widget(
        Paragraph::new(body)
            .style(Style::default().fg(theme.warning))
            .block(themed_block("404", theme)),
        rect,
    );
}

fn render_auth_form(
    f: &mut Frame,
    area: Rect,
    title: &str,
    auth: &AuthForm,
    note: Option<&str>,
    keys: &str,
    theme: &Theme,
) {
    let form = &auth.form;
    let mut lines: Vec<Line> = Vec::new();
    if let Some(note) = note {
        lines.push(Line::from(Span::styled(note.to_string(), Style::default().fg(theme.warning))));
        lines.push(Line::raw(""));
    }
    for (i, (spec, raw)) in form.specs().iter().zip(form.values()).enumerate() {
        let focused = i == form.focus();
        let shown = match spec.kind {
            FieldKind::Password => "•".repeat(raw.chars().count()),
            _ => raw.clone(),
        };
        let value_style = if focused {
            Style::default().fg(theme.highlight_fg).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text)
        };
        lines.push(Line::from(vec![
            Span::raw(if focused { "▶ " } else { "  " }),
            Span::styled(format!("{:<18}", format!("{}:", spec.label)), Style::default().fg(theme.title)),
            Span::styled(shown, value_style),
        ]));
        if let Some(msg) = form.errors().get(spec.name) {
            lines.push(Line::from(Span::styled(format!("    {msg}"), Style::default().fg(theme.error))));
        }
    }
    lines.push(Line::raw(""));
    if let Some(err) = &auth.error {
        lines.push(Line::from(Span::styled(err.clone(), Style::default().fg(theme.error))));
    }
    if auth.pending {
        lines.push(Line::from(Span::styled("Please wait…", Style::default().fg(theme.warning))));
    } else {
        lines.push(Line::from(Span::styled(keys.to_string(), Style::default().fg(theme.muted))));
    }

    let height = (lines.len() as u16 + 2).min(area.height);
    let rect = centered_rect(64, height, area);
    f.render_widget(Clear, rect);
    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(themed_block(title.to_string(), theme)),
        rect,
    );
}
