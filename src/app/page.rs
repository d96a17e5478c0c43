//! The `Page` trait and the generic CRUD page built on it.
//!
//! [`ResourcePage`] ties one [`Resource`] to a [`DataTable`] and a
//! [`DialogState`]. Reads come from the query cache; writes go through the
//! dispatcher and come back via [`Page::on_mutation`].
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use serde_json::Value;

use crate::app::dispatch::{Dispatcher, Mutation};
use crate::app::keymap::KeyAction;
use crate::app::theme::Theme;
use crate::dialog::{DialogMode, DialogState, RowAction, Target};
use crate::form::{FieldKind, FormState};
use crate::notify::{NotificationFeed, Toasts};
use crate::query::QueryCache;
use crate::resources::{Lookups, RecordId, Resource};
use crate::routes::{AdminPage, Route};
use crate::session::Session;
use crate::table::{DataTable, TableConfig};
use crate::ui;

/// What a page asks the shell to do after handling an action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PageEvent {
    Ignored,
    Handled,
    Navigate(Route),
    ToggleTheme,
    Logout,
}

/// Mutable app context lent to a page while it handles input.
pub struct PageCtx<'a> {
    pub cache: &'a mut QueryCache,
    pub lookups: &'a Lookups,
    pub dispatcher: &'a Dispatcher,
    pub toasts: &'a mut Toasts,
    pub feed: &'a mut NotificationFeed,
}

pub struct RenderCtx<'a> {
    pub cache: &'a QueryCache,
    pub lookups: &'a Lookups,
    pub theme: &'a Theme,
    pub feed: &'a NotificationFeed,
    pub session: &'a Session,
}

pub trait Page {
    fn id(&self) -> AdminPage;

    /// Cache keys this page reads; the shell fetches whichever are missing or stale.
    fn dependencies(&self) -> Vec<&'static str> {
        Vec::new()
    }

    /// True while raw keys go to the page (search box, open dialog).
    fn captures_input(&self) -> bool {
        false
    }

    /// Raw key handling while `captures_input` holds.
    fn handle_input(&mut self, _key: KeyEvent, _ctx: &mut PageCtx<'_>) -> bool {
        false
    }

    fn handle_action(&mut self, action: KeyAction, ctx: &mut PageCtx<'_>) -> PageEvent;

    /// A mutation started by this page settled. `Err` carries the toast text.
    fn on_mutation(&mut self, _result: Result<(), &str>) {}

    fn dialog(&self) -> Option<&DialogState> {
        None
    }

    /// Short key hint for the status bar.
    fn hint(&self) -> &'static str {
        ""
    }

    fn render(&self, f: &mut Frame, area: Rect, ctx: &RenderCtx<'_>);
}

/// Table + dialogs over one resource collection.
pub struct ResourcePage<R: Resource> {
    id: AdminPage,
    table: DataTable<R>,
    dialog: DialogState,
    searching: bool,
}

impl<R: Resource> ResourcePage<R> {
    pub fn new(id: AdminPage, page_size: usize) -> Self {
        let config = TableConfig {
            search_column: R::SEARCH_COLUMN,
            ..TableConfig::default()
        };
        let mut table = DataTable::new(R::columns(), config);
        table.set_page_size(page_size);
        Self {
            id,
            table,
            dialog: DialogState::Closed,
            searching: false,
        }
    }

    pub fn table(&self) -> &DataTable<R> {
        &self.table
    }

    pub fn is_searching(&self) -> bool {
        self.searching
    }

    fn rows(cache: &QueryCache) -> &[R] {
        cache.get::<Vec<R>>(R::KEY).map(Vec::as_slice).unwrap_or(&[])
    }

    fn selected(&self, ctx: &PageCtx<'_>) -> Option<R> {
        self.table.selected_row(Self::rows(ctx.cache), ctx.lookups).cloned()
    }

    fn target(row: &R) -> Target {
        Target {
            id: row.id(),
            label: row.display_name(),
        }
    }

    fn row_actions(row: &R) -> Vec<RowAction> {
        let mut out = Vec::new();
        if R::CAPABILITIES.update {
            out.push(RowAction::Edit);
        }
        out.extend(row.status_actions().into_iter().map(RowAction::Status));
        if R::CAPABILITIES.delete {
            out.push(RowAction::Delete);
        }
        out
    }

    fn open_edit(&mut self, row: &R) {
        let form = FormState::with_values(R::form(), row.form_values());
        self.dialog.open_edit(row.id(), form);
    }

    fn submit(&mut self, ctx: &mut PageCtx<'_>) {
        let Some(result) = self.dialog.submit() else {
            return;
        };
        let mut submission = match result {
            Ok(s) => s,
            Err(errors) => {
                tracing::debug!(resource = R::KEY, %errors, "form rejected");
                return;
            }
        };
        // cleared fields are sent as null beside the draft
        let cleared: Vec<String> = submission
            .payload
            .iter()
            .filter(|(_, v)| v.is_null())
            .map(|(k, _)| k.clone())
            .collect();
        submission.payload.retain(|_, v| !v.is_null());
        let draft: R::Draft = match serde_json::from_value(Value::Object(submission.payload)) {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!(resource = R::KEY, error = %e, "draft did not decode");
                self.dialog.fail(format!("Invalid input: {e}"));
                return;
            }
        };
        let mutation = match submission.mode {
            DialogMode::Create => Mutation::Create(draft),
            DialogMode::Edit(id) => Mutation::Update { id, draft, cleared },
        };
        ctx.dispatcher.mutate::<R>(self.id, mutation);
    }

    fn choose(&mut self, ctx: &mut PageCtx<'_>) {
        let Some((target, action)) = self.dialog.choose() else {
            return;
        };
        match action {
            RowAction::Edit => {
                let row = Self::rows(ctx.cache).iter().find(|r| r.id() == target.id).cloned();
                match row {
                    Some(row) => self.open_edit(&row),
                    None => self.dialog.fail(format!("{} is no longer listed", target.label)),
                }
            }
            RowAction::Delete => self.dialog.confirm_delete(target),
            RowAction::Status(sa) => ctx.dispatcher.mutate::<R>(
                self.id,
                Mutation::Transition {
                    id: target.id,
                    action: sa.action,
                    label: sa.label,
                },
            ),
        }
    }

    fn dialog_key(&mut self, key: KeyEvent, ctx: &mut PageCtx<'_>) {
        if self.dialog.in_flight() {
            if key.code == KeyCode::Esc {
                ctx.toasts.info("Request in progress");
            }
            return;
        }
        if matches!(self.dialog, DialogState::Open { .. }) {
            self.form_key(key, ctx);
        } else if matches!(self.dialog, DialogState::RowMenu { .. }) {
            match key.code {
                KeyCode::Esc => {
                    self.dialog.cancel();
                }
                KeyCode::Up | KeyCode::Char('k') => self.dialog.menu_move(false),
                KeyCode::Down | KeyCode::Char('j') => self.dialog.menu_move(true),
                KeyCode::Enter => self.choose(ctx),
                _ => {}
            }
        } else if matches!(self.dialog, DialogState::ConfirmDelete { .. }) {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    if let Some(target) = self.dialog.begin_delete() {
                        ctx.dispatcher.mutate::<R>(self.id, Mutation::Delete(target.id));
                    }
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.dialog.cancel();
                }
                _ => {}
            }
        }
    }

    fn form_key(&mut self, key: KeyEvent, ctx: &mut PageCtx<'_>) {
        if key.code == KeyCode::Enter {
            self.submit(ctx);
            return;
        }
        if key.code == KeyCode::Esc {
            self.dialog.cancel();
            return;
        }
        let Some(form) = self.dialog.form_mut() else {
            return;
        };
        match key.code {
            KeyCode::Tab | KeyCode::Down => form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
            KeyCode::Left | KeyCode::Right => {
                let forward = key.code == KeyCode::Right;
                let options: &[(RecordId, String)] = match form.focused_spec().map(|s| &s.kind) {
                    Some(FieldKind::Reference(collection)) => ctx.lookups.options(collection),
                    _ => &[],
                };
                form.cycle(forward, options);
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(c) => form.input(c),
            _ => {}
        }
    }

    fn search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.table.set_query("");
                self.searching = false;
            }
            KeyCode::Enter => self.searching = false,
            KeyCode::Backspace => self.table.pop_query(),
            KeyCode::Char(c) => self.table.push_query(c),
            _ => {}
        }
    }
}

impl<R: Resource> Page for ResourcePage<R> {
    fn id(&self) -> AdminPage {
        self.id
    }

    fn dependencies(&self) -> Vec<&'static str> {
        let mut keys = vec![R::KEY];
        keys.extend_from_slice(R::LOOKUPS);
        keys
    }

    fn captures_input(&self) -> bool {
        self.searching || self.dialog.is_open()
    }

    fn handle_input(&mut self, key: KeyEvent, ctx: &mut PageCtx<'_>) -> bool {
        if self.dialog.is_open() {
            self.dialog_key(key, ctx);
            true
        } else if self.searching {
            self.search_key(key);
            true
        } else {
            false
        }
    }

    fn handle_action(&mut self, action: KeyAction, ctx: &mut PageCtx<'_>) -> PageEvent {
        let (total, on_page) = {
            let view = self.table.view(Self::rows(ctx.cache), ctx.lookups, false);
            (view.total, view.rows.len())
        };
        match action {
            KeyAction::StartSearch if self.table.config().searchable => {
                self.searching = true;
            }
            KeyAction::NewRecord if R::CAPABILITIES.create => {
                self.dialog.open_create(FormState::new(R::form()));
            }
            KeyAction::EditRecord if R::CAPABILITIES.update => match self.selected(ctx) {
                Some(row) => self.open_edit(&row),
                None => return PageEvent::Ignored,
            },
            KeyAction::DeleteSelection if R::CAPABILITIES.delete => match self.selected(ctx) {
                Some(row) => self.dialog.confirm_delete(Self::target(&row)),
                None => return PageEvent::Ignored,
            },
            KeyAction::EnterAction => {
                let Some(row) = self.selected(ctx) else {
                    return PageEvent::Ignored;
                };
                let options = Self::row_actions(&row);
                if options.is_empty() {
                    ctx.toasts.info(format!("No actions available for {}", row.display_name()));
                } else {
                    self.dialog.open_menu(Self::target(&row), options);
                }
            }
            KeyAction::SortColumn => {
                self.table.sort_focused();
            }
            KeyAction::NextColumn => self.table.focus_column(true),
            KeyAction::PrevColumn => self.table.focus_column(false),
            KeyAction::CyclePageSize => {
                self.table.cycle_page_size();
            }
            KeyAction::Refresh => {
                for key in self.dependencies() {
                    ctx.cache.invalidate(key);
                }
            }
            KeyAction::MoveUp => self.table.select_prev(),
            KeyAction::MoveDown => self.table.select_next(on_page),
            KeyAction::MoveLeftPage => self.table.prev_page(),
            KeyAction::MoveRightPage => self.table.next_page(total),
            _ => return PageEvent::Ignored,
        }
        PageEvent::Handled
    }

    fn on_mutation(&mut self, result: Result<(), &str>) {
        match result {
            Ok(()) => self.dialog.succeed(),
            Err(message) => self.dialog.fail(message),
        }
    }

    fn dialog(&self) -> Option<&DialogState> {
        Some(&self.dialog)
    }

    fn hint(&self) -> &'static str {
        if self.searching {
            "type to filter  Enter: keep  Esc: clear"
        } else {
            "/: search  n: new  Enter: actions  s: sort  [ ]: column  p: page size  r: refresh"
        }
    }

    fn render(&self, f: &mut Frame, area: Rect, ctx: &RenderCtx<'_>) {
        let rows = Self::rows(ctx.cache);
        let view = self.table.view(rows, ctx.lookups, ctx.cache.is_loading(R::KEY));
        ui::table::render_data_table(
            f,
            area,
            ui::table::TableProps {
                title: self.id.title(),
                table: &self.table,
                view: &view,
                lookups: ctx.lookups,
                theme: ctx.theme,
                error: ctx.cache.error(R::KEY),
                searching: self.searching,
            },
        );
        if self.dialog.is_open() {
            ui::dialog::render_dialog(f, area, &self.dialog, R::LABEL, ctx.lookups, ctx.theme);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::Member;
    use crossterm::event::KeyModifiers;

    #[test]
    fn dependencies_include_lookups() {
        let page = ResourcePage::<crate::resources::Account>::new(AdminPage::Accounts, 10);
        assert_eq!(page.dependencies(), vec!["accounts", "members", "account-types"]);
    }

    #[test]
    fn row_menu_follows_capabilities_and_status() {
        let m: Member = serde_json::from_value(serde_json::json!({
            "id": 3, "firstName": "Amina", "lastName": "Wekesa", "status": "SUSPENDED"
        }))
        .unwrap();
        let labels: Vec<String> = ResourcePage::<Member>::row_actions(&m)
            .iter()
            .map(|a| a.label().to_string())
            .collect();
        assert_eq!(labels.first().map(String::as_str), Some("Edit"));
        assert_eq!(labels.last().map(String::as_str), Some("Delete"));
        assert!(labels.iter().any(|l| l == "Activate"));
        assert_eq!(ResourcePage::<Member>::target(&m).id, RecordId::Num(3));
    }

    #[test]
    fn search_mode_edits_query_and_esc_clears_it() {
        let mut page = ResourcePage::<Member>::new(AdminPage::Members, 10);
        page.searching = true;
        page.search_key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE));
        page.search_key(KeyEvent::new(KeyCode::Char('m'), KeyModifiers::NONE));
        assert_eq!(page.table().state().query, "am");
        page.search_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert!(page.table().state().query.is_empty());
        assert!(!page.is_searching());
    }
}
