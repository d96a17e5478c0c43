//! Pages that are not a single resource table: dashboard, notifications, settings.
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::app::keymap::KeyAction;
use crate::app::page::{Page, PageCtx, PageEvent, RenderCtx, ResourcePage};
use crate::notify::Notification;
use crate::query::QueryCache;
use crate::resources::loans::LoanStatus;
use crate::resources::members::MemberStatus;
use crate::resources::payments::PaymentStatus;
use crate::resources::*;
use crate::routes::{AdminPage, Route};
use crate::table::{CellValue, DataTable, NOT_AVAILABLE, TableConfig};
use crate::ui;

/// One summary tile on the dashboard.
#[derive(Clone, Debug, PartialEq)]
pub struct DashboardCard {
    pub title: &'static str,
    pub value: String,
    pub detail: String,
    pub target: AdminPage,
}

fn money(total: f64) -> String {
    CellValue::amount(total).display()
}

/// Build the dashboard tiles from whatever collections are cached.
pub fn summarize(cache: &QueryCache) -> Vec<DashboardCard> {
    let placeholder = |key: &str| {
        if cache.is_loading(key) {
            "…".to_string()
        } else {
            NOT_AVAILABLE.to_string()
        }
    };
    let mut cards = Vec::new();

    cards.push(match cache.get::<Vec<Member>>(Member::KEY) {
        Some(rows) => DashboardCard {
            title: "Members",
            value: rows.len().to_string(),
            detail: format!(
                "{} active",
                rows.iter().filter(|m| m.status == MemberStatus::Active).count()
            ),
            target: AdminPage::Members,
        },
        None => DashboardCard {
            title: "Members",
            value: placeholder(Member::KEY),
            detail: String::new(),
            target: AdminPage::Members,
        },
    });

    cards.push(match cache.get::<Vec<LoanApplication>>(LoanApplication::KEY) {
        Some(rows) => {
            let pending = rows.iter().filter(|l| l.status == LoanStatus::Pending).count();
            let book: f64 = rows
                .iter()
                .filter(|l| matches!(l.status, LoanStatus::Approved | LoanStatus::Disbursed))
                .filter_map(|l| l.amount)
                .sum();
            DashboardCard {
                title: "Loans",
                value: rows.len().to_string(),
                detail: format!("{pending} pending, {} on book", money(book)),
                target: AdminPage::Loans,
            }
        }
        None => DashboardCard {
            title: "Loans",
            value: placeholder(LoanApplication::KEY),
            detail: String::new(),
            target: AdminPage::Loans,
        },
    });

    cards.push(match cache.get::<Vec<Account>>(Account::KEY) {
        Some(rows) => DashboardCard {
            title: "Accounts",
            value: rows.len().to_string(),
            detail: format!(
                "{} total balance",
                money(rows.iter().filter_map(|a| a.balance).sum())
            ),
            target: AdminPage::Accounts,
        },
        None => DashboardCard {
            title: "Accounts",
            value: placeholder(Account::KEY),
            detail: String::new(),
            target: AdminPage::Accounts,
        },
    });

    cards.push(match cache.get::<Vec<Saving>>(Saving::KEY) {
        Some(rows) => DashboardCard {
            title: "Savings",
            value: money(rows.iter().filter_map(|s| s.amount).sum()),
            detail: format!("{} deposits", rows.len()),
            target: AdminPage::Savings,
        },
        None => DashboardCard {
            title: "Savings",
            value: placeholder(Saving::KEY),
            detail: String::new(),
            target: AdminPage::Savings,
        },
    });

    cards.push(match cache.get::<Vec<Payment>>(Payment::KEY) {
        Some(rows) => DashboardCard {
            title: "Payments",
            value: rows.len().to_string(),
            detail: format!(
                "{} completed",
                money(
                    rows.iter()
                        .filter(|p| p.status == PaymentStatus::Completed)
                        .filter_map(|p| p.amount)
                        .sum()
                )
            ),
            target: AdminPage::Payments,
        },
        None => DashboardCard {
            title: "Payments",
            value: placeholder(Payment::KEY),
            detail: String::new(),
            target: AdminPage::Payments,
        },
    });

    cards
}

#[derive(Default)]
pub struct DashboardPage {
    selected: usize,
}

const DASHBOARD_KEYS: [&str; 5] = [
    Member::KEY,
    LoanApplication::KEY,
    Account::KEY,
    Saving::KEY,
    Payment::KEY,
];

impl Page for DashboardPage {
    fn id(&self) -> AdminPage {
        AdminPage::Dashboard
    }

    fn dependencies(&self) -> Vec<&'static str> {
        DASHBOARD_KEYS.to_vec()
    }

    fn handle_action(&mut self, action: KeyAction, ctx: &mut PageCtx<'_>) -> PageEvent {
        let n = DASHBOARD_KEYS.len();
        match action {
            KeyAction::MoveUp | KeyAction::MoveLeftPage => self.selected = (self.selected + n - 1) % n,
            KeyAction::MoveDown | KeyAction::MoveRightPage => self.selected = (self.selected + 1) % n,
            KeyAction::EnterAction => {
                return match summarize(ctx.cache).get(self.selected) {
                    Some(card) => PageEvent::Navigate(Route::Admin(card.target)),
                    None => PageEvent::Ignored,
                };
            }
            KeyAction::Refresh => {
                for key in DASHBOARD_KEYS {
                    ctx.cache.invalidate(key);
                }
            }
            _ => return PageEvent::Ignored,
        }
        PageEvent::Handled
    }

    fn hint(&self) -> &'static str {
        "arrows: select card  Enter: open  r: refresh"
    }

    fn render(&self, f: &mut Frame, area: Rect, ctx: &RenderCtx<'_>) {
        ui::dashboard::render_dashboard(f, area, &summarize(ctx.cache), self.selected, ctx);
    }
}

/// Mocked notification inbox; rows come from the shared feed.
pub struct NotificationsPage {
    table: DataTable<Notification>,
    searching: bool,
}

impl NotificationsPage {
    pub fn new(page_size: usize) -> Self {
        let config = TableConfig {
            search_column: Some("title"),
            empty_message: "No notifications".to_string(),
            ..TableConfig::default()
        };
        let mut table = DataTable::new(<Notification as Resource>::columns(), config);
        table.set_page_size(page_size);
        Self {
            table,
            searching: false,
        }
    }
}

impl Page for NotificationsPage {
    fn id(&self) -> AdminPage {
        AdminPage::Notifications
    }

    fn captures_input(&self) -> bool {
        self.searching
    }

    fn handle_input(&mut self, key: KeyEvent, _ctx: &mut PageCtx<'_>) -> bool {
        if !self.searching {
            return false;
        }
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
        true
    }

    fn handle_action(&mut self, action: KeyAction, ctx: &mut PageCtx<'_>) -> PageEvent {
        let lookups = Lookups::default();
        let (total, on_page, selected) = {
            let view = self.table.view(ctx.feed.items(), &lookups, false);
            let selected = view.rows.get(view.selected).map(|n| n.id.clone());
            (view.total, view.rows.len(), selected)
        };
        match action {
            KeyAction::StartSearch => self.searching = true,
            KeyAction::MoveUp => self.table.select_prev(),
            KeyAction::MoveDown => self.table.select_next(on_page),
            KeyAction::MoveLeftPage => self.table.prev_page(),
            KeyAction::MoveRightPage => self.table.next_page(total),
            KeyAction::SortColumn => {
                self.table.sort_focused();
            }
            KeyAction::NextColumn => self.table.focus_column(true),
            KeyAction::PrevColumn => self.table.focus_column(false),
            KeyAction::CyclePageSize => {
                self.table.cycle_page_size();
            }
            KeyAction::EnterAction => {
                let Some(id) = selected else {
                    return PageEvent::Ignored;
                };
                ctx.feed.mark_read(&id);
            }
            KeyAction::DeleteSelection => {
                let Some(id) = selected else {
                    return PageEvent::Ignored;
                };
                if ctx.feed.remove(&id) {
                    ctx.toasts.success("Notification removed");
                }
            }
            KeyAction::MarkAllRead => {
                let n = ctx.feed.mark_all_read();
                ctx.toasts.info(format!("{n} notifications marked as read"));
            }
            _ => return PageEvent::Ignored,
        }
        PageEvent::Handled
    }

    fn hint(&self) -> &'static str {
        "Enter: mark read  d: delete  m: mark all read  /: search"
    }

    fn render(&self, f: &mut Frame, area: Rect, ctx: &RenderCtx<'_>) {
        let lookups = Lookups::default();
        let view = self.table.view(ctx.feed.items(), &lookups, false);
        ui::table::render_data_table(
            f,
            area,
            ui::table::TableProps {
                title: "Notifications",
                table: &self.table,
                view: &view,
                lookups: &lookups,
                theme: ctx.theme,
                error: None,
                searching: self.searching,
            },
        );
    }
}

/// Where things live on disk and on the network; shown on the settings page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SettingsInfo {
    pub base_url: String,
    pub config_dir: String,
    pub log_file: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SettingsEntry {
    ToggleTheme,
    SignOut,
}

impl SettingsEntry {
    pub const ALL: [SettingsEntry; 2] = [SettingsEntry::ToggleTheme, SettingsEntry::SignOut];

    pub fn label(self) -> &'static str {
        match self {
            SettingsEntry::ToggleTheme => "Switch theme",
            SettingsEntry::SignOut => "Sign out",
        }
    }
}

pub struct SettingsPage {
    info: SettingsInfo,
    selected: usize,
}

impl SettingsPage {
    pub fn new(info: SettingsInfo) -> Self {
        Self { info, selected: 0 }
    }

    pub fn info(&self) -> &SettingsInfo {
        &self.info
    }

    pub fn selected(&self) -> SettingsEntry {
        SettingsEntry::ALL[self.selected.min(SettingsEntry::ALL.len() - 1)]
    }
}

impl Page for SettingsPage {
    fn id(&self) -> AdminPage {
        AdminPage::Settings
    }

    fn handle_action(&mut self, action: KeyAction, _ctx: &mut PageCtx<'_>) -> PageEvent {
        match action {
            KeyAction::MoveUp => self.selected = self.selected.saturating_sub(1),
            KeyAction::MoveDown => {
                self.selected = (self.selected + 1).min(SettingsEntry::ALL.len() - 1);
            }
            KeyAction::EnterAction => {
                return match self.selected() {
                    SettingsEntry::ToggleTheme => PageEvent::ToggleTheme,
                    SettingsEntry::SignOut => PageEvent::Logout,
                };
            }
            _ => return PageEvent::Ignored,
        }
        PageEvent::Handled
    }

    fn hint(&self) -> &'static str {
        "Up/Down: select  Enter: apply"
    }

    fn render(&self, f: &mut Frame, area: Rect, ctx: &RenderCtx<'_>) {
        ui::dashboard::render_settings(f, area, self, ctx);
    }
}

/// One page per sidebar entry, in [`AdminPage::ALL`] order.
pub fn build_all(page_size: usize, info: SettingsInfo) -> Vec<Box<dyn Page>> {
    let mut info = Some(info);
    AdminPage::ALL
        .into_iter()
        .map(|id| -> Box<dyn Page> {
            match id {
                AdminPage::Dashboard => Box::new(DashboardPage::default()),
                AdminPage::Members => Box::new(ResourcePage::<Member>::new(id, page_size)),
                AdminPage::NextOfKin => Box::new(ResourcePage::<NextOfKin>::new(id, page_size)),
                AdminPage::Groups => Box::new(ResourcePage::<Group>::new(id, page_size)),
                AdminPage::GroupOfficials => Box::new(ResourcePage::<GroupOfficial>::new(id, page_size)),
                AdminPage::BoardMembers => Box::new(ResourcePage::<BoardMember>::new(id, page_size)),
                AdminPage::Accounts => Box::new(ResourcePage::<Account>::new(id, page_size)),
                AdminPage::AccountTypes => Box::new(ResourcePage::<AccountType>::new(id, page_size)),
                AdminPage::Savings => Box::new(ResourcePage::<Saving>::new(id, page_size)),
                AdminPage::Loans => Box::new(ResourcePage::<LoanApplication>::new(id, page_size)),
                AdminPage::LoanProducts => Box::new(ResourcePage::<LoanProduct>::new(id, page_size)),
                AdminPage::LoanPenalties => Box::new(ResourcePage::<LoanPenalty>::new(id, page_size)),
                AdminPage::LoanCollaterals => Box::new(ResourcePage::<LoanCollateral>::new(id, page_size)),
                AdminPage::LoanSchedules => Box::new(ResourcePage::<RepaymentSchedule>::new(id, page_size)),
                AdminPage::LoanRepayments => Box::new(ResourcePage::<Repayment>::new(id, page_size)),
                AdminPage::LoanDisbursements => Box::new(ResourcePage::<Disbursement>::new(id, page_size)),
                AdminPage::Payments => Box::new(ResourcePage::<Payment>::new(id, page_size)),
                AdminPage::PaymentTypes => Box::new(ResourcePage::<PaymentType>::new(id, page_size)),
                AdminPage::PaymentModes => Box::new(ResourcePage::<ModeOfPayment>::new(id, page_size)),
                AdminPage::Roles => Box::new(ResourcePage::<Role>::new(id, page_size)),
                AdminPage::Permissions => Box::new(ResourcePage::<Permission>::new(id, page_size)),
                AdminPage::Notifications => Box::new(NotificationsPage::new(page_size)),
                AdminPage::Settings => Box::new(SettingsPage::new(info.take().unwrap_or_default())),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pages_line_up_with_sidebar() {
        let pages = build_all(10, SettingsInfo::default());
        assert_eq!(pages.len(), AdminPage::ALL.len());
        for (i, page) in pages.iter().enumerate() {
            assert_eq!(page.id().index(), i);
        }
    }

    #[test]
    fn dashboard_counts_cached_collections() {
        let mut cache = QueryCache::new();
        let members: Vec<Member> = serde_json::from_value(json!([
            {"id": 1, "firstName": "A", "lastName": "B", "status": "ACTIVE"},
            {"id": 2, "firstName": "C", "lastName": "D", "status": "SUSPENDED"}
        ]))
        .unwrap();
        cache.put(Member::KEY, members);
        let loans: Vec<LoanApplication> = serde_json::from_value(json!([
            {"id": 1, "amount": 1000, "status": "APPROVED"},
            {"id": 2, "amount": 500, "status": "PENDING"}
        ]))
        .unwrap();
        cache.put(LoanApplication::KEY, loans);

        let cards = summarize(&cache);
        assert_eq!(cards[0].value, "2");
        assert_eq!(cards[0].detail, "1 active");
        assert_eq!(cards[1].value, "2");
        assert!(cards[1].detail.starts_with("1 pending"));
        assert_eq!(cards[2].value, NOT_AVAILABLE);
    }

    #[test]
    fn settings_entries_map_to_events() {
        let mut page = SettingsPage::new(SettingsInfo::default());
        assert_eq!(page.selected(), SettingsEntry::ToggleTheme);
        page.selected = 1;
        assert_eq!(page.selected(), SettingsEntry::SignOut);
    }
}
