//! Modal rendering for [`DialogState`].
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Paragraph, Wrap};

use crate::app::theme::Theme;
use crate::dialog::{DialogMode, DialogState, RowAction, Target};
use crate::form::{FieldKind, FormState};
use crate::resources::{Lookups, RecordId};
use crate::ui::components::{centered_rect, themed_block};

pub fn render_dialog(
    f: &mut Frame,
    area: Rect,
    dialog: &DialogState,
    label: &str,
    lookups: &Lookups,
    theme: &Theme,
) {
    match dialog {
        DialogState::Closed => {}
        DialogState::Open { mode, form, error } => {
            render_form(f, area, mode, form, error.as_deref(), false, label, lookups, theme)
        }
        DialogState::Submitting { mode, form } => {
            render_form(f, area, mode, form, None, true, label, lookups, theme)
        }
        DialogState::RowMenu {
            target,
            options,
            selected,
            error,
        } => render_menu(f, area, target, options, *selected, error.as_deref(), false, theme),
        DialogState::Transitioning {
            target,
            options,
            selected,
        } => render_menu(f, area, target, options, *selected, None, true, theme),
        DialogState::ConfirmDelete { target, error } => {
            render_confirm(f, area, target, error.as_deref(), false, label, theme)
        }
        DialogState::Deleting { target } => render_confirm(f, area, target, None, true, label, theme),
    }
}

/// What the user sees for a field value; references show the looked-up name.
fn shown_value(kind: &FieldKind, raw: &str, lookups: &Lookups) -> String {
    match kind {
        FieldKind::Password => "•".repeat(raw.chars().count()),
        FieldKind::Reference(collection) if !raw.is_empty() => {
            match lookups.name(collection, &RecordId::parse(raw)) {
                Some(name) => format!("{name} (#{raw})"),
                None => format!("#{raw}"),
            }
        }
        FieldKind::Choice(_) | FieldKind::Reference(_) if raw.is_empty() => "◀ select ▶".to_string(),
        _ => raw.to_string(),
    }
}

#[allow(clippy::too_many_arguments)]
fn render_form(
    f: &mut Frame,
    area: Rect,
    mode: &DialogMode,
    form: &FormState,
    error: Option<&str>,
    saving: bool,
    label: &str,
    lookups: &Lookups,
    theme: &Theme,
) {
    let title = match mode {
        DialogMode::Create => format!("New {label}"),
        DialogMode::Edit(id) => format!("Edit {label} #{id}"),
    };
    let mut lines: Vec<Line> = Vec::new();
    for (i, (spec, raw)) in form.specs().iter().zip(form.values()).enumerate() {
        let focused = i == form.focus();
        let marker = if focused { "▶ " } else { "  " };
        let required = if spec.required { "*" } else { "" };
        let mut value_style = Style::default().fg(theme.text);
        if focused {
            value_style = value_style.fg(theme.highlight_fg).add_modifier(Modifier::BOLD);
        }
        lines.push(Line::from(vec![
            Span::raw(marker),
            Span::styled(format!("{}{required}: ", spec.label), Style::default().fg(theme.title)),
            Span::styled(shown_value(&spec.kind, raw, lookups), value_style),
        ]));
        if let Some(msg) = form.errors().get(spec.name) {
            lines.push(Line::from(Span::styled(
                format!("    {msg}"),
                Style::default().fg(theme.error),
            )));
        }
    }
    lines.push(Line::raw(""));
    if let Some(msg) = error {
        lines.push(Line::from(Span::styled(msg.to_string(), Style::default().fg(theme.error))));
    }
    if saving {
        lines.push(Line::from(Span::styled("Saving…", Style::default().fg(theme.warning))));
    } else {
        lines.push(Line::from(Span::styled(
            "Enter: save  Esc: cancel  Tab: next field",
            Style::default().fg(theme.muted),
        )));
    }

    let height = (lines.len() as u16 + 2).min(area.height);
    let rect = centered_rect(64, height, area);
    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(themed_block(title, theme));
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

#[allow(clippy::too_many_arguments)]
fn render_menu(
    f: &mut Frame,
    area: Rect,
    target: &Target,
    options: &[RowAction],
    selected: usize,
    error: Option<&str>,
    busy: bool,
    theme: &Theme,
) {
    let mut lines: Vec<Line> = options
        .iter()
        .enumerate()
        .map(|(i, action)| {
            if i == selected {
                Line::from(Span::styled(
                    format!("▶ {}", action.label()),
                    Style::default().fg(theme.highlight_fg).add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::raw(format!("  {}", action.label()))
            }
        })
        .collect();
    lines.push(Line::raw(""));
    if let Some(msg) = error {
        lines.push(Line::from(Span::styled(msg.to_string(), Style::default().fg(theme.error))));
    }
    if busy {
        lines.push(Line::from(Span::styled("Working…", Style::default().fg(theme.warning))));
    }
    let height = (lines.len() as u16 + 2).min(area.height);
    let rect = centered_rect(44, height, area);
    let p = Paragraph::new(lines).block(themed_block(target.label.clone(), theme));
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

fn render_confirm(
    f: &mut Frame,
    area: Rect,
    target: &Target,
    error: Option<&str>,
    busy: bool,
    label: &str,
    theme: &Theme,
) {
    let mut body = format!("Delete {label} '{}'?\n\n", target.label);
    if busy {
        body.push_str("Deleting…");
    } else {
        body.push_str("  [y] Yes    [n] No");
    }
    if let Some(msg) = error {
        body.push_str(&format!("\n\n{msg}"));
    }
    let rect = centered_rect(52, 8, area);
    let style = if error.is_some() {
        Style::default().fg(theme.error)
    } else {
        Style::default().fg(theme.text)
    };
    let p = Paragraph::new(body)
        .style(style)
        .wrap(Wrap { trim: true })
        .block(themed_block("Confirm delete", theme));
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}
