pub mod auth;
pub mod components;
pub mod dashboard;
pub mod dialog;
pub mod table;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use crate::app::AppState;
use crate::routes::{AdminPage, Route};
use crate::table::NOT_AVAILABLE;

const SIDEBAR_WIDTH: u16 = 24;

pub fn render(f: &mut Frame, app: &AppState) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(1)].as_ref())
        .split(f.area());
    let theme = &app.theme;
    let session = app.session();

    let who = if session.is_authenticated() {
        format!(
            "user {} ({})",
            session.user_id.as_deref().unwrap_or(NOT_AVAILABLE),
            session.role.as_deref().unwrap_or(NOT_AVAILABLE)
        )
    } else {
        "signed out".to_string()
    };
    let header = Paragraph::new(format!(
        "{}  {who}  unread: {}  theme: {}",
        app.route().path(),
        app.feed.unread(),
        theme.name
    ))
    .block(
        Block::default()
            .title("sacco-admin")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border)),
    )
    .style(Style::default().fg(theme.header_fg).bg(theme.header_bg));
    f.render_widget(header, root[0]);

    let body = root[1];
    match app.route() {
        Route::Admin(current) => {
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(10)])
                .split(body);
            let items: Vec<ListItem> = AdminPage::ALL
                .iter()
                .map(|p| {
                    let mut label = p.title().to_string();
                    if *p == AdminPage::Notifications && app.feed.unread() > 0 {
                        label.push_str(&format!(" ({})", app.feed.unread()));
                    }
                    ListItem::new(Line::from(Span::raw(label)))
                })
                .collect();
            let list = List::new(items)
                .block(components::themed_block("Menu", theme))
                .style(Style::default().fg(theme.text))
                .highlight_style(
                    Style::default()
                        .fg(theme.highlight_fg)
                        .bg(theme.highlight_bg)
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol("▶ ");
            let mut state = ListState::default().with_selected(Some(current.index()));
            f.render_stateful_widget(list, cols[0], &mut state);

            let ctx = app.render_ctx(&session);
            app.page(*current).render(f, cols[1], &ctx);
        }
        Route::Home => auth::render_home(f, body, session.is_authenticated(), theme),
        Route::Login { session_expired } => auth::render_login(f, body, &app.login, *session_expired, theme),
        Route::Register => auth::render_register(f, body, &app.register, theme),
        Route::ForgotPassword => auth::render_forgot(f, body, &app.forgot, theme),
        Route::UserDashboard => {
            let ctx = app.render_ctx(&session);
            dashboard::render_user_dashboard(f, body, &ctx);
        }
        Route::NotFound(path) => auth::render_not_found(f, body, path, theme),
    }

    components::render_status_bar(f, root[2], app);
    components::render_toasts(f, body, app);
    if app.show_help {
        components::render_help_modal(f, f.area(), app);
    }
}
