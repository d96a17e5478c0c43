//! Route table and the authentication guard.
//!
//! Paths follow the web console's layout so a route can be named on the command
//! line (`--route /admin/loans`) or produced by the auth flow.
use std::fmt::{Display, Formatter};

/// One management page under `/admin/*`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AdminPage {
    Dashboard,
    Members,
    NextOfKin,
    Groups,
    GroupOfficials,
    BoardMembers,
    Accounts,
    AccountTypes,
    Savings,
    Loans,
    LoanProducts,
    LoanPenalties,
    LoanCollaterals,
    LoanSchedules,
    LoanRepayments,
    LoanDisbursements,
    Payments,
    PaymentTypes,
    PaymentModes,
    Roles,
    Permissions,
    Notifications,
    Settings,
}

impl AdminPage {
    /// Navigation order of the sidebar.
    pub const ALL: [AdminPage; 23] = [
        AdminPage::Dashboard,
        AdminPage::Members,
        AdminPage::NextOfKin,
        AdminPage::Groups,
        AdminPage::GroupOfficials,
        AdminPage::BoardMembers,
        AdminPage::Accounts,
        AdminPage::AccountTypes,
        AdminPage::Savings,
        AdminPage::Loans,
        AdminPage::LoanProducts,
        AdminPage::LoanPenalties,
        AdminPage::LoanCollaterals,
        AdminPage::LoanSchedules,
        AdminPage::LoanRepayments,
        AdminPage::LoanDisbursements,
        AdminPage::Payments,
        AdminPage::PaymentTypes,
        AdminPage::PaymentModes,
        AdminPage::Roles,
        AdminPage::Permissions,
        AdminPage::Notifications,
        AdminPage::Settings,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            AdminPage::Dashboard => "dashboard",
            AdminPage::Members => "members",
            AdminPage::NextOfKin => "next-of-kin",
            AdminPage::Groups => "groups",
            AdminPage::GroupOfficials => "group-officials",
            AdminPage::BoardMembers => "board-members",
            AdminPage::Accounts => "accounts",
            AdminPage::AccountTypes => "account-types",
            AdminPage::Savings => "savings",
            AdminPage::Loans => "loans",
            AdminPage::LoanProducts => "loan-products",
            AdminPage::LoanPenalties => "loan-penalties",
            AdminPage::LoanCollaterals => "loan-collaterals",
            AdminPage::LoanSchedules => "loan-schedules",
            AdminPage::LoanRepayments => "loan-repayments",
            AdminPage::LoanDisbursements => "loan-disbursements",
            AdminPage::Payments => "payments",
            AdminPage::PaymentTypes => "payment-types",
            AdminPage::PaymentModes => "payment-modes",
            AdminPage::Roles => "roles",
            AdminPage::Permissions => "permissions",
            AdminPage::Notifications => "notifications",
            AdminPage::Settings => "settings",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            AdminPage::Dashboard => "Dashboard",
            AdminPage::Members => "Members",
            AdminPage::NextOfKin => "Next of Kin",
            AdminPage::Groups => "Groups",
            AdminPage::GroupOfficials => "Group Officials",
            AdminPage::BoardMembers => "Board Members",
            AdminPage::Accounts => "Accounts",
            AdminPage::AccountTypes => "Account Types",
            AdminPage::Savings => "Savings",
            AdminPage::Loans => "Loans",
            AdminPage::LoanProducts => "Loan Products",
            AdminPage::LoanPenalties => "Loan Penalties",
            AdminPage::LoanCollaterals => "Loan Collaterals",
            AdminPage::LoanSchedules => "Repayment Schedules",
            AdminPage::LoanRepayments => "Repayments",
            AdminPage::LoanDisbursements => "Disbursements",
            AdminPage::Payments => "Payments",
            AdminPage::PaymentTypes => "Payment Types",
            AdminPage::PaymentModes => "Payment Modes",
            AdminPage::Roles => "Roles",
            AdminPage::Permissions => "Permissions",
            AdminPage::Notifications => "Notifications",
            AdminPage::Settings => "Settings",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.slug() == slug)
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|p| *p == self).unwrap_or(0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Home,
    Login { session_expired: bool },
    Register,
    ForgotPassword,
    Admin(AdminPage),
    UserDashboard,
    NotFound(String),
}

impl Route {
    pub fn login() -> Self {
        Route::Login {
            session_expired: false,
        }
    }

    /// Parse a path with an optional query string. Unknown paths become `NotFound`.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let (path, query) = raw.split_once('?').unwrap_or((raw, ""));
        let path = path.trim_end_matches('/');
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Route::Home,
            ["login"] => Route::Login {
                session_expired: query_flag(query, "sessionExpired"),
            },
            ["register"] => Route::Register,
            ["forgot-password"] => Route::ForgotPassword,
            ["admin"] => Route::Admin(AdminPage::Dashboard),
            ["admin", slug] => match AdminPage::from_slug(slug) {
                Some(page) => Route::Admin(page),
                None => Route::NotFound(raw.to_string()),
            },
            ["user", "dashboard"] => Route::UserDashboard,
            _ => Route::NotFound(raw.to_string()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Login {
                session_expired: false,
            } => "/login".to_string(),
            Route::Login {
                session_expired: true,
            } => "/login?sessionExpired=true".to_string(),
            Route::Register => "/register".to_string(),
            Route::ForgotPassword => "/forgot-password".to_string(),
            Route::Admin(page) => format!("/admin/{}", page.slug()),
            Route::UserDashboard => "/user/dashboard".to_string(),
            Route::NotFound(p) => p.clone(),
        }
    }

    /// Routes behind the authentication gate. Unknown paths under `/admin`
    /// or `/user` are gated too.
    pub fn is_gated(&self) -> bool {
        match self {
            Route::Admin(_) | Route::UserDashboard => true,
            Route::NotFound(raw) => {
                let path = raw.split('?').next().unwrap_or_default();
                matches!(
                    path.split('/').find(|s| !s.is_empty()),
                    Some("admin") | Some("user")
                )
            }
            _ => false,
        }
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

fn query_flag(query: &str, name: &str) -> bool {
    query.split('&').any(|pair| {
        let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
        k == name && v.eq_ignore_ascii_case("true")
    })
}

/// Redirect gated routes to the login screen when no credential is stored.
pub fn guard(route: Route, authenticated: bool) -> Route {
    if route.is_gated() && !authenticated {
        tracing::debug!(requested = %route, "no token; redirecting to login");
        Route::login()
    } else {
        route
    }
}
