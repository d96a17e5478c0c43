//! Dashboard tiles, settings and the member landing screen.
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};

use crate::app::dispatch::PROFILE_KEY;
use crate::app::page::RenderCtx;
use crate::app::pages::{DashboardCard, SettingsEntry, SettingsPage};
use crate::error::GENERIC_FAILURE;
use crate::resources::User;
use crate::table::NOT_AVAILABLE;
use crate::ui::components::themed_block;

/// Cards in a row on top, recent notifications underneath.
pub fn render_dashboard(
    f: &mut Frame,
    area: Rect,
    cards: &[DashboardCard],
    selected: usize,
    ctx: &RenderCtx<'_>,
) {
    let theme = ctx.theme;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(3)])
        .split(area);
    let tiles = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, cards.len().max(1) as u32); cards.len()])
        .split(rows[0]);

    for (i, (card, rect)) in cards.iter().zip(tiles.iter()).enumerate() {
        let mut block = themed_block(card.title, theme);
        if i == selected {
            block = block.border_style(Style::default().fg(theme.highlight_fg).add_modifier(Modifier::BOLD));
        }
        let lines = vec![
            Line::from(Span::styled(
                card.value.clone(),
                Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(card.detail.clone(), Style::default().fg(theme.muted))),
        ];
        f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }).block(block), *rect);
    }

    let mut lines: Vec<Line> = ctx
        .feed
        .items()
        .iter()
        .take(rows[1].height.saturating_sub(2) as usize)
        .map(|n| {
            let style = if n.read {
                Style::default().fg(theme.muted)
            } else {
                Style::default().fg(theme.text).add_modifier(Modifier::BOLD)
            };
            Line::from(vec![
                Span::styled(format!("{}  ", n.created_at.format("%Y-%m-%d %H:%M")), Style::default().fg(theme.muted)),
                Span::styled(n.title.clone(), style),
                Span::raw(format!("  {}", n.message)),
            ])
        })
        .collect();
    if lines.is_empty() {
        lines.push(Line::from(Span::styled("No notifications", Style::default().fg(theme.muted))));
    }
    let title = format!("Recent activity ({} unread)", ctx.feed.unread());
    f.render_widget(Paragraph::new(lines).block(themed_block(title, theme)), rows[1]);
}

pub fn render_settings(f: &mut Frame, area: Rect, page: &SettingsPage, ctx: &RenderCtx<'_>) {
    let theme = ctx.theme;
    let info = page.info();
    let label = Style::default().fg(theme.title);
    let or_na = |s: &str| if s.is_empty() { NOT_AVAILABLE.to_string() } else { s.to_string() };
    let mut lines = vec![
        Line::from(vec![Span::styled("API base URL: ", label), Span::raw(or_na(&info.base_url))]),
        Line::from(vec![Span::styled("Config dir:   ", label), Span::raw(or_na(&info.config_dir))]),
        Line::from(vec![Span::styled("Log file:     ", label), Span::raw(or_na(&info.log_file))]),
        Line::from(vec![
            Span::styled("Signed in as: ", label),
            Span::raw(format!(
                "user {} ({})",
                ctx.session.user_id.as_deref().unwrap_or(NOT_AVAILABLE),
                ctx.session.role.as_deref().unwrap_or(NOT_AVAILABLE)
            )),
        ]),
        Line::from(vec![Span::styled("Theme:        ", label), Span::raw(theme.name)]),
        Line::raw(""),
    ];
    for entry in SettingsEntry::ALL {
        if entry == page.selected() {
            lines.push(Line::from(Span::styled(
                format!("▶ {}", entry.label()),
                Style::default().fg(theme.highlight_fg).add_modifier(Modifier::BOLD),
            )));
        } else {
            lines.push(Line::raw(format!("  {}", entry.label())));
        }
    }
    f.render_widget(Paragraph::new(lines).block(themed_block("Settings", theme)), area);
}

/// Landing screen for non-admin roles: the signed-in user's profile.
pub fn render_user_dashboard(f: &mut Frame, area: Rect, ctx: &RenderCtx<'_>) {
    let theme = ctx.theme;
    let label = Style::default().fg(theme.title);
    let lines = match ctx.cache.get::<User>(PROFILE_KEY) {
        Some(user) => vec![
            Line::from(vec![Span::styled("Username: ", label), Span::raw(user.username.clone())]),
            Line::from(vec![
                Span::styled("Email:    ", label),
                Span::raw(user.email.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string())),
            ]),
            Line::from(vec![
                Span::styled("Role:     ", label),
                Span::raw(ctx.session.role.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string())),
            ]),
            Line::from(vec![
                Span::styled("Status:   ", label),
                Span::raw(if user.enabled { "Enabled" } else { "Disabled" }),
            ]),
        ],
        None if ctx.cache.is_loading(PROFILE_KEY) => {
            vec![Line::from(Span::styled("Loading profile…", Style::default().fg(theme.muted)))]
        }
        None => match ctx.cache.error(PROFILE_KEY) {
            Some(err) => vec![
                Line::from(Span::styled(
                    format!("Could not load profile: {}", err.user_message(GENERIC_FAILURE)),
                    Style::default().fg(theme.error),
                )),
                Line::raw("Press r to retry."),
            ],
            None => vec![Line::raw(format!(
                "Signed in as user {}",
                ctx.session.user_id.as_deref().unwrap_or(NOT_AVAILABLE)
            ))],
        },
    };
    f.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: true }).block(themed_block("My account", theme)),
        area,
    );
}
