//! Loan products and the loan lifecycle: applications, collateral, penalties,
//! repayment schedules, disbursements and repayments.
use serde::{Deserialize, Serialize};

use super::{Capabilities, Lookups, RecordId, Resource, StatusAction, opt_string, opt_text};
use crate::form::{FieldKind, FieldSpec};
use crate::table::Column;

/// Where an application sits in the approval flow.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Disbursed,
    Closed,
    #[serde(other)]
    Unknown,
}

impl LoanStatus {
    pub fn label(self) -> &'static str {
        match self {
            LoanStatus::Pending => "PENDING",
            LoanStatus::Approved => "APPROVED",
            LoanStatus::Rejected => "REJECTED",
            LoanStatus::Disbursed => "DISBURSED",
            LoanStatus::Closed => "CLOSED",
            LoanStatus::Unknown => "UNKNOWN",
        }
    }
}

/// A member loan application against a [`LoanProduct`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanApplication {
    pub id: RecordId,
    #[serde(default)]
    pub member_id: Option<RecordId>,
    #[serde(default)]
    pub loan_product_id: Option<RecordId>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub term_months: Option<u32>,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub application_date: Option<String>,
    #[serde(default)]
    pub status: LoanStatus,
}

/// Create/edit body for a loan application.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanApplicationDraft {
    pub member_id: RecordId,
    pub loan_product_id: RecordId,
    pub amount: f64,
    pub term_months: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

impl Resource for LoanApplication {
    type Draft = LoanApplicationDraft;
    const KEY: &'static str = "loan-applications";
    const LABEL: &'static str = "Loan";
    const RELATED: &'static [&'static str] = &["repayment-schedules", "disbursements"];
    const LOOKUPS: &'static [&'static str] = &["members", "loan-products"];

    fn id(&self) -> RecordId {
        self.id.clone()
    }

    fn display_name(&self) -> String {
        format!("Loan #{}", self.id)
    }

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("id", "Loan", |l: &LoanApplication, _: &Lookups| (&l.id).into())
                .sortable()
                .width(6),
            Column::new("member", "Member", |l: &LoanApplication, lk: &Lookups| lk.member(l.member_id.as_ref()))
                .sortable()
                .width(22),
            Column::new("product", "Product", |l: &LoanApplication, lk: &Lookups| {
                lk.name_or(LoanProduct::KEY, l.loan_product_id.as_ref(), "Unknown Product")
            })
            .width(18),
            Column::new("amount", "Amount", |l: &LoanApplication, _: &Lookups| l.amount.into())
                .sortable()
                .width(12),
            Column::new("termMonths", "Term", |l: &LoanApplication, _: &Lookups| l.term_months.into())
                .sortable()
                .width(5),
            Column::new("applicationDate", "Applied", |l: &LoanApplication, _: &Lookups| {
                opt_text(&l.application_date)
            })
            .sortable()
            .width(11),
            Column::new("status", "Status", |l: &LoanApplication, _: &Lookups| l.status.label().into())
                .sortable()
                .width(10),
        ]
    }

    fn form() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("memberId", "Member", FieldKind::Reference("members")).required(),
            FieldSpec::new("loanProductId", "Product", FieldKind::Reference("loan-products")).required(),
            FieldSpec::new("amount", "Amount", FieldKind::Decimal).required(),
            FieldSpec::new("termMonths", "Term (months)", FieldKind::Integer).required(),
            FieldSpec::text("purpose", "Purpose"),
        ]
    }

    fn form_values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("memberId", opt_string(&self.member_id)),
            ("loanProductId", opt_string(&self.loan_product_id)),
            ("amount", opt_string(&self.amount)),
            ("termMonths", opt_string(&self.term_months)),
            ("purpose", opt_string(&self.purpose)),
        ]
    }

    fn status_actions(&self) -> Vec<StatusAction> {
        match self.status {
            LoanStatus::Pending => vec![
                StatusAction::new("Approve", "approve"),
                StatusAction::new("Reject", "reject"),
            ],
            LoanStatus::Approved => vec![StatusAction::new("Disburse", "disburse")],
            _ => Vec::new(),
        }
    }
}

/// Loan product terms offered to members.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanProduct {
    pub id: RecordId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub interest_rate: Option<f64>,
    #[serde(default)]
    pub max_amount: Option<f64>,
    #[serde(default)]
    pub max_term_months: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanProductDraft {
    pub name: String,
    pub interest_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_term_months: Option<i64>,
}

impl Resource for LoanProduct {
    type Draft = LoanProductDraft;
    const KEY: &'static str = "loan-products";
    const LABEL: &'static str = "Loan product";
    const RELATED: &'static [&'static str] = &["loan-applications"];
    const SEARCH_COLUMN: Option<&'static str> = Some("name");

    fn id(&self) -> RecordId {
        self.id.clone()
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("name", "Name", |p: &LoanProduct, _: &Lookups| p.name.as_str().into())
                .sortable()
                .width(24),
            Column::new("interestRate", "Rate %", |p: &LoanProduct, _: &Lookups| p.interest_rate.into())
                .sortable()
                .width(8),
            Column::new("maxAmount", "Max amount", |p: &LoanProduct, _: &Lookups| p.max_amount.into())
                .sortable()
                .width(12),
            Column::new("maxTermMonths", "Max term", |p: &LoanProduct, _: &Lookups| p.max_term_months.into())
                .sortable()
                .width(9),
        ]
    }

    fn form() -> Vec<FieldSpec> {
        vec![
            FieldSpec::text("name", "Name").required(),
            FieldSpec::new("interestRate", "Interest rate %", FieldKind::Decimal).required(),
            FieldSpec::new("maxAmount", "Maximum amount", FieldKind::Decimal),
            FieldSpec::new("maxTermMonths", "Maximum term (months)", FieldKind::Integer),
        ]
    }

    fn form_values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("name", self.name.clone()),
            ("interestRate", opt_string(&self.interest_rate)),
            ("maxAmount", opt_string(&self.max_amount)),
            ("maxTermMonths", opt_string(&self.max_term_months)),
        ]
    }
}

/// Whether a penalty is still owed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PenaltyStatus {
    #[default]
    Unpaid,
    Paid,
    Waived,
    #[serde(other)]
    Unknown,
}

impl PenaltyStatus {
    pub fn label(self) -> &'static str {
        match self {
            PenaltyStatus::Unpaid => "UNPAID",
            PenaltyStatus::Paid => "PAID",
            PenaltyStatus::Waived => "WAIVED",
            PenaltyStatus::Unknown => "UNKNOWN",
        }
    }
}

/// A penalty charged against a loan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanPenalty {
    pub id: RecordId,
    #[serde(default)]
    pub loan_id: Option<RecordId>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub status: PenaltyStatus,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanPenaltyDraft {
    pub loan_id: RecordId,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Resource for LoanPenalty {
    type Draft = LoanPenaltyDraft;
    const KEY: &'static str = "loan-penalties";
    const LABEL: &'static str = "Loan penalty";
    const LOOKUPS: &'static [&'static str] = &["loan-applications"];

    fn id(&self) -> RecordId {
        self.id.clone()
    }

    fn display_name(&self) -> String {
        format!("Penalty #{}", self.id)
    }

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("loan", "Loan", |p: &LoanPenalty, lk: &Lookups| {
                lk.name_or(LoanApplication::KEY, p.loan_id.as_ref(), "Unknown Loan")
            })
            .sortable()
            .width(12),
            Column::new("amount", "Amount", |p: &LoanPenalty, _: &Lookups| p.amount.into())
                .sortable()
                .width(12),
            Column::new("reason", "Reason", |p: &LoanPenalty, _: &Lookups| opt_text(&p.reason)),
            Column::new("status", "Status", |p: &LoanPenalty, _: &Lookups| p.status.label().into())
                .sortable()
                .width(8),
        ]
    }

    fn form() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("loanId", "Loan", FieldKind::Reference("loan-applications")).required(),
            FieldSpec::new("amount", "Amount", FieldKind::Decimal).required(),
            FieldSpec::text("reason", "Reason"),
        ]
    }

    fn form_values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("loanId", opt_string(&self.loan_id)),
            ("amount", opt_string(&self.amount)),
            ("reason", opt_string(&self.reason)),
        ]
    }

    fn status_actions(&self) -> Vec<StatusAction> {
        match self.status {
            PenaltyStatus::Unpaid => vec![
                StatusAction::new("Mark paid", "pay"),
                StatusAction::new("Waive", "waive"),
            ],
            _ => Vec::new(),
        }
    }
}

/// Collateral pledged for a loan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanCollateral {
    pub id: RecordId,
    #[serde(default)]
    pub loan_id: Option<RecordId>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanCollateralDraft {
    pub loan_id: RecordId,
    pub description: String,
    pub value: f64,
}

impl Resource for LoanCollateral {
    type Draft = LoanCollateralDraft;
    const KEY: &'static str = "loan-collaterals";
    const LABEL: &'static str = "Collateral";
    const LOOKUPS: &'static [&'static str] = &["loan-applications"];

    fn id(&self) -> RecordId {
        self.id.clone()
    }

    fn display_name(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| format!("Collateral #{}", self.id))
    }

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("loan", "Loan", |c: &LoanCollateral, lk: &Lookups| {
                lk.name_or(LoanApplication::KEY, c.loan_id.as_ref(), "Unknown Loan")
            })
            .sortable()
            .width(12),
            Column::new("description", "Description", |c: &LoanCollateral, _: &Lookups| {
                opt_text(&c.description)
            }),
            Column::new("value", "Value", |c: &LoanCollateral, _: &Lookups| c.value.into())
                .sortable()
                .width(12),
        ]
    }

    fn form() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("loanId", "Loan", FieldKind::Reference("loan-applications")).required(),
            FieldSpec::text("description", "Description").required(),
            FieldSpec::new("value", "Value", FieldKind::Decimal).required(),
        ]
    }

    fn form_values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("loanId", opt_string(&self.loan_id)),
            ("description", opt_string(&self.description)),
            ("value", opt_string(&self.value)),
        ]
    }
}

/// Installment plan rows are generated by the backend when a loan is approved.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepaymentSchedule {
    pub id: RecordId,
    #[serde(default)]
    pub loan_id: Option<RecordId>,
    #[serde(default)]
    pub installment_number: Option<u32>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub amount_due: Option<f64>,
    #[serde(default)]
    pub amount_paid: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepaymentScheduleDraft {
    pub due_date: String,
    pub amount_due: f64,
}

impl Resource for RepaymentSchedule {
    type Draft = RepaymentScheduleDraft;
    const KEY: &'static str = "repayment-schedules";
    const LABEL: &'static str = "Schedule entry";
    const LOOKUPS: &'static [&'static str] = &["loan-applications"];
    const CAPABILITIES: Capabilities = Capabilities {
        create: false,
        update: true,
        delete: false,
    };

    fn id(&self) -> RecordId {
        self.id.clone()
    }

    fn display_name(&self) -> String {
        format!("Installment {}", opt_string(&self.installment_number))
    }

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("loan", "Loan", |s: &RepaymentSchedule, lk: &Lookups| {
                lk.name_or(LoanApplication::KEY, s.loan_id.as_ref(), "Unknown Loan")
            })
            .sortable()
            .width(12),
            Column::new("installmentNumber", "#", |s: &RepaymentSchedule, _: &Lookups| {
                s.installment_number.into()
            })
            .sortable()
            .width(4),
            Column::new("dueDate", "Due", |s: &RepaymentSchedule, _: &Lookups| opt_text(&s.due_date))
                .sortable()
                .width(11),
            Column::new("amountDue", "Due amount", |s: &RepaymentSchedule, _: &Lookups| s.amount_due.into())
                .sortable()
                .width(12),
            Column::new("amountPaid", "Paid", |s: &RepaymentSchedule, _: &Lookups| s.amount_paid.into())
                .sortable()
                .width(12),
            Column::new("status", "Status", |s: &RepaymentSchedule, _: &Lookups| opt_text(&s.status))
                .sortable(),
        ]
    }

    fn form() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("dueDate", "Due date", FieldKind::Date).required(),
            FieldSpec::new("amountDue", "Amount due", FieldKind::Decimal).required(),
        ]
    }

    fn form_values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("dueDate", opt_string(&self.due_date)),
            ("amountDue", opt_string(&self.amount_due)),
        ]
    }
}

/// A repayment received against a loan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repayment {
    pub id: RecordId,
    #[serde(default)]
    pub loan_id: Option<RecordId>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub paid_on: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepaymentDraft {
    pub loan_id: RecordId,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl Resource for Repayment {
    type Draft = RepaymentDraft;
    const KEY: &'static str = "repayments";
    const LABEL: &'static str = "Repayment";
    const RELATED: &'static [&'static str] = &["repayment-schedules", "loan-applications"];
    const LOOKUPS: &'static [&'static str] = &["loan-applications"];
    const CAPABILITIES: Capabilities = Capabilities::APPEND_ONLY;

    fn id(&self) -> RecordId {
        self.id.clone()
    }

    fn display_name(&self) -> String {
        format!("Repayment #{}", self.id)
    }

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("loan", "Loan", |r: &Repayment, lk: &Lookups| {
                lk.name_or(LoanApplication::KEY, r.loan_id.as_ref(), "Unknown Loan")
            })
            .sortable()
            .width(12),
            Column::new("amount", "Amount", |r: &Repayment, _: &Lookups| r.amount.into())
                .sortable()
                .width(12),
            Column::new("paidOn", "Paid on", |r: &Repayment, _: &Lookups| opt_text(&r.paid_on))
                .sortable()
                .width(11),
            Column::new("reference", "Reference", |r: &Repayment, _: &Lookups| opt_text(&r.reference)),
        ]
    }

    fn form() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("loanId", "Loan", FieldKind::Reference("loan-applications")).required(),
            FieldSpec::new("amount", "Amount", FieldKind::Decimal).required(),
            FieldSpec::new("paidOn", "Paid on", FieldKind::Date),
            FieldSpec::text("reference", "Reference"),
        ]
    }

    fn form_values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("loanId", opt_string(&self.loan_id)),
            ("amount", opt_string(&self.amount)),
            ("paidOn", opt_string(&self.paid_on)),
            ("reference", opt_string(&self.reference)),
        ]
    }
}

/// Funds released for an approved loan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Disbursement {
    pub id: RecordId,
    #[serde(default)]
    pub loan_id: Option<RecordId>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub disbursed_on: Option<String>,
    #[serde(default)]
    pub mode_of_payment_id: Option<RecordId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisbursementDraft {
    pub loan_id: RecordId,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disbursed_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode_of_payment_id: Option<RecordId>,
}

impl Resource for Disbursement {
    type Draft = DisbursementDraft;
    const KEY: &'static str = "disbursements";
    const LABEL: &'static str = "Disbursement";
    const RELATED: &'static [&'static str] = &["loan-applications", "repayment-schedules"];
    const LOOKUPS: &'static [&'static str] = &["loan-applications", "payment-modes"];
    const CAPABILITIES: Capabilities = Capabilities::APPEND_ONLY;

    fn id(&self) -> RecordId {
        self.id.clone()
    }

    fn display_name(&self) -> String {
        format!("Disbursement #{}", self.id)
    }

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("loan", "Loan", |d: &Disbursement, lk: &Lookups| {
                lk.name_or(LoanApplication::KEY, d.loan_id.as_ref(), "Unknown Loan")
            })
            .sortable()
            .width(12),
            Column::new("amount", "Amount", |d: &Disbursement, _: &Lookups| d.amount.into())
                .sortable()
                .width(12),
            Column::new("disbursedOn", "Date", |d: &Disbursement, _: &Lookups| opt_text(&d.disbursed_on))
                .sortable()
                .width(11),
            Column::new("mode", "Mode", |d: &Disbursement, lk: &Lookups| {
                lk.name_or("payment-modes", d.mode_of_payment_id.as_ref(), "Unknown Mode")
            }),
        ]
    }

    fn form() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("loanId", "Loan", FieldKind::Reference("loan-applications")).required(),
            FieldSpec::new("amount", "Amount", FieldKind::Decimal).required(),
            FieldSpec::new("disbursedOn", "Date", FieldKind::Date),
            FieldSpec::new("modeOfPaymentId", "Mode", FieldKind::Reference("payment-modes")),
        ]
    }

    fn form_values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("loanId", opt_string(&self.loan_id)),
            ("amount", opt_string(&self.amount)),
            ("disbursedOn", opt_string(&self.disbursed_on)),
            ("modeOfPaymentId", opt_string(&self.mode_of_payment_id)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pending_loan_can_be_approved_or_rejected() {
        let l: LoanApplication = serde_json::from_value(json!({"id": 7, "amount": 50000})).unwrap();
        assert_eq!(l.status, LoanStatus::Pending);
        let actions: Vec<&str> = l.status_actions().iter().map(|a| a.action).collect();
        assert_eq!(actions, vec!["approve", "reject"]);
    }

    #[test]
    fn loan_cells_tolerate_missing_product() {
        let mut lk = Lookups::default();
        lk.insert("members", vec![(RecordId::Num(1), "Amina Wekesa".into())]);
        let l: LoanApplication = serde_json::from_value(json!({
            "id": 7, "memberId": 1, "loanProductId": 3, "amount": 50000, "termMonths": 12
        }))
        .unwrap();
        let cells: Vec<String> = LoanApplication::columns()
            .iter()
            .map(|c| c.value(&l, &lk).display())
            .collect();
        assert_eq!(
            cells,
            vec!["7", "Amina Wekesa", "Unknown Product", "50000", "12", "N/A", "PENDING"]
        );
    }

    #[test]
    fn repayments_are_append_only() {
        assert!(Repayment::CAPABILITIES.create);
        assert!(!Repayment::CAPABILITIES.update);
        assert!(!Disbursement::CAPABILITIES.delete);
        assert!(!RepaymentSchedule::CAPABILITIES.create);
    }
}
