//! Member accounts, account types and savings deposits.
use serde::{Deserialize, Serialize};

use super::{Capabilities, Lookups, RecordId, Resource, StatusAction, opt_string, opt_text};
use crate::form::{FieldKind, FieldSpec};
use crate::table::{CellValue, Column};

/// Account state as reported by the backend.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    #[default]
    Active,
    Dormant,
    Frozen,
    Closed,
    #[serde(other)]
    Unknown,
}

impl AccountStatus {
    pub fn label(self) -> &'static str {
        match self {
            AccountStatus::Active => "ACTIVE",
            AccountStatus::Dormant => "DORMANT",
            AccountStatus::Frozen => "FROZEN",
            AccountStatus::Closed => "CLOSED",
            AccountStatus::Unknown => "UNKNOWN",
        }
    }
}

/// A member account of some [`AccountType`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: RecordId,
    #[serde(default)]
    pub account_number: Option<String>,
    #[serde(default)]
    pub member_id: Option<RecordId>,
    #[serde(default)]
    pub account_type_id: Option<RecordId>,
    #[serde(default)]
    pub balance: Option<f64>,
    #[serde(default)]
    pub status: AccountStatus,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDraft {
    pub member_id: RecordId,
    pub account_type_id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
}

impl Resource for Account {
    type Draft = AccountDraft;
    const KEY: &'static str = "accounts";
    const LABEL: &'static str = "Account";
    const LOOKUPS: &'static [&'static str] = &["members", "account-types"];

    fn id(&self) -> RecordId {
        self.id.clone()
    }

    fn display_name(&self) -> String {
        self.account_number
            .clone()
            .unwrap_or_else(|| format!("Account #{}", self.id))
    }

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("accountNumber", "Account", |a: &Account, _: &Lookups| opt_text(&a.account_number))
                .sortable()
                .width(14),
            Column::new("member", "Member", |a: &Account, lk: &Lookups| lk.member(a.member_id.as_ref()))
                .sortable()
                .width(24),
            Column::new("type", "Type", |a: &Account, lk: &Lookups| {
                lk.name_or(AccountType::KEY, a.account_type_id.as_ref(), "Unknown Type")
            }),
            Column::new("balance", "Balance", |a: &Account, _: &Lookups| a.balance.into())
                .sortable()
                .width(12),
            Column::new("status", "Status", |a: &Account, _: &Lookups| a.status.label().into())
                .sortable()
                .width(9),
        ]
    }

    fn form() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("memberId", "Member", FieldKind::Reference("members")).required(),
            FieldSpec::new("accountTypeId", "Account type", FieldKind::Reference("account-types")).required(),
            FieldSpec::text("accountNumber", "Account number"),
        ]
    }

    fn form_values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("memberId", opt_string(&self.member_id)),
            ("accountTypeId", opt_string(&self.account_type_id)),
            ("accountNumber", opt_string(&self.account_number)),
        ]
    }

    fn status_actions(&self) -> Vec<StatusAction> {
        match self.status {
            AccountStatus::Active => vec![
                StatusAction::new("Freeze", "freeze"),
                StatusAction::new("Close", "close"),
            ],
            AccountStatus::Dormant | AccountStatus::Frozen => vec![StatusAction::new("Activate", "activate")],
            AccountStatus::Closed | AccountStatus::Unknown => Vec::new(),
        }
    }
}

/// Account product: name and interest rate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountType {
    pub id: RecordId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub interest_rate: Option<f64>,
    #[serde(default)]
    pub minimum_balance: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountTypeDraft {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interest_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_balance: Option<f64>,
}

impl Resource for AccountType {
    type Draft = AccountTypeDraft;
    const KEY: &'static str = "account-types";
    const LABEL: &'static str = "Account type";
    const RELATED: &'static [&'static str] = &["accounts"];

    fn id(&self) -> RecordId {
        self.id.clone()
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("name", "Name", |t: &AccountType, _: &Lookups| t.name.as_str().into())
                .sortable()
                .width(22),
            Column::new("description", "Description", |t: &AccountType, _: &Lookups| opt_text(&t.description)),
            Column::new("interestRate", "Rate %", |t: &AccountType, _: &Lookups| t.interest_rate.into())
                .sortable()
                .width(8),
            Column::new("minimumBalance", "Min. balance", |t: &AccountType, _: &Lookups| {
                t.minimum_balance.into()
            })
            .sortable()
            .width(13),
        ]
    }

    fn form() -> Vec<FieldSpec> {
        vec![
            FieldSpec::text("name", "Name").required(),
            FieldSpec::text("description", "Description"),
            FieldSpec::new("interestRate", "Interest rate %", FieldKind::Decimal),
            FieldSpec::new("minimumBalance", "Minimum balance", FieldKind::Decimal),
        ]
    }

    fn form_values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("name", self.name.clone()),
            ("description", opt_string(&self.description)),
            ("interestRate", opt_string(&self.interest_rate)),
            ("minimumBalance", opt_string(&self.minimum_balance)),
        ]
    }
}

/// A savings deposit into an account.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Saving {
    pub id: RecordId,
    #[serde(default)]
    pub member_id: Option<RecordId>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub saved_on: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingDraft {
    pub member_id: RecordId,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_on: Option<String>,
}

impl Resource for Saving {
    type Draft = SavingDraft;
    const KEY: &'static str = "savings";
    const LABEL: &'static str = "Saving";
    const RELATED: &'static [&'static str] = &["accounts"];
    const LOOKUPS: &'static [&'static str] = &["members"];
    const CAPABILITIES: Capabilities = Capabilities {
        create: true,
        update: true,
        delete: false,
    };

    fn id(&self) -> RecordId {
        self.id.clone()
    }

    fn display_name(&self) -> String {
        format!("Saving #{}", self.id)
    }

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("member", "Member", |s: &Saving, lk: &Lookups| lk.member(s.member_id.as_ref()))
                .sortable()
                .width(24),
            Column::new("amount", "Amount", |s: &Saving, _: &Lookups| s.amount.map(CellValue::amount).into())
                .sortable()
                .width(12),
            Column::new("savedOn", "Date", |s: &Saving, _: &Lookups| opt_text(&s.saved_on))
                .sortable()
                .width(12),
            Column::new("status", "Status", |s: &Saving, _: &Lookups| opt_text(&s.status)),
        ]
    }

    fn form() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("memberId", "Member", FieldKind::Reference("members")).required(),
            FieldSpec::new("amount", "Amount", FieldKind::Decimal).required(),
            FieldSpec::new("savedOn", "Date", FieldKind::Date),
        ]
    }

    fn form_values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("memberId", opt_string(&self.member_id)),
            ("amount", opt_string(&self.amount)),
            ("savedOn", opt_string(&self.saved_on)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn account_columns_join_member_and_type() {
        let mut lk = Lookups::default();
        lk.insert("members", vec![(RecordId::Num(1), "Amina Wekesa".into())]);
        lk.insert("account-types", vec![(RecordId::Num(2), "Ordinary Savings".into())]);
        let a: Account = serde_json::from_value(json!({
            "id": 10, "accountNumber": "ACC-0010", "memberId": 1, "accountTypeId": 2, "balance": 2500.5
        }))
        .unwrap();
        let cols = Account::columns();
        let cells: Vec<String> = cols.iter().map(|c| c.value(&a, &lk).display()).collect();
        assert_eq!(cells, vec!["ACC-0010", "Amina Wekesa", "Ordinary Savings", "2500.50", "ACTIVE"]);
    }

    #[test]
    fn frozen_account_can_be_activated() {
        let a: Account = serde_json::from_value(json!({"id": 1, "status": "FROZEN"})).unwrap();
        let actions = a.status_actions();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].label, "Activate");
    }
}
