//! Payments and their reference data.
use serde::{Deserialize, Serialize};

use super::{Lookups, RecordId, Resource, StatusAction, opt_string, opt_text};
use crate::form::{FieldKind, FieldSpec};
use crate::table::Column;

/// Settlement state of a payment.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    Reversed,
    #[serde(other)]
    Unknown,
}

impl PaymentStatus {
    pub fn label(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Completed => "COMPLETED",
            PaymentStatus::Failed => "FAILED",
            PaymentStatus::Reversed => "REVERSED",
            PaymentStatus::Unknown => "UNKNOWN",
        }
    }
}

/// A payment made by a member.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: RecordId,
    #[serde(default)]
    pub member_id: Option<RecordId>,
    #[serde(default)]
    pub payment_type_id: Option<RecordId>,
    #[serde(default)]
    pub mode_of_payment_id: Option<RecordId>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub paid_on: Option<String>,
    #[serde(default)]
    pub status: PaymentStatus,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDraft {
    pub member_id: RecordId,
    pub payment_type_id: RecordId,
    pub mode_of_payment_id: RecordId,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_on: Option<String>,
}

impl Resource for Payment {
    type Draft = PaymentDraft;
    const KEY: &'static str = "payments";
    const LABEL: &'static str = "Payment";
    const RELATED: &'static [&'static str] = &["accounts"];
    const LOOKUPS: &'static [&'static str] = &["members", "payment-types", "payment-modes"];
    const SEARCH_COLUMN: Option<&'static str> = Some("reference");

    fn id(&self) -> RecordId {
        self.id.clone()
    }

    fn display_name(&self) -> String {
        self.reference
            .clone()
            .unwrap_or_else(|| format!("Payment #{}", self.id))
    }

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("reference", "Reference", |p: &Payment, _: &Lookups| opt_text(&p.reference))
                .sortable()
                .width(14),
            Column::new("member", "Member", |p: &Payment, lk: &Lookups| lk.member(p.member_id.as_ref()))
                .sortable()
                .width(22),
            Column::new("type", "Type", |p: &Payment, lk: &Lookups| {
                lk.name_or(PaymentType::KEY, p.payment_type_id.as_ref(), "Unknown Type")
            }),
            Column::new("mode", "Mode", |p: &Payment, lk: &Lookups| {
                lk.name_or(ModeOfPayment::KEY, p.mode_of_payment_id.as_ref(), "Unknown Mode")
            }),
            Column::new("amount", "Amount", |p: &Payment, _: &Lookups| p.amount.into())
                .sortable()
                .width(12),
            Column::new("paidOn", "Date", |p: &Payment, _: &Lookups| opt_text(&p.paid_on))
                .sortable()
                .width(11),
            Column::new("status", "Status", |p: &Payment, _: &Lookups| p.status.label().into())
                .sortable()
                .width(10),
        ]
    }

    fn form() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("memberId", "Member", FieldKind::Reference("members")).required(),
            FieldSpec::new("paymentTypeId", "Payment type", FieldKind::Reference("payment-types")).required(),
            FieldSpec::new("modeOfPaymentId", "Mode", FieldKind::Reference("payment-modes")).required(),
            FieldSpec::new("amount", "Amount", FieldKind::Decimal).required(),
            FieldSpec::text("reference", "Reference"),
            FieldSpec::new("paidOn", "Date", FieldKind::Date),
        ]
    }

    fn form_values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("memberId", opt_string(&self.member_id)),
            ("paymentTypeId", opt_string(&self.payment_type_id)),
            ("modeOfPaymentId", opt_string(&self.mode_of_payment_id)),
            ("amount", opt_string(&self.amount)),
            ("reference", opt_string(&self.reference)),
            ("paidOn", opt_string(&self.paid_on)),
        ]
    }

    fn status_actions(&self) -> Vec<StatusAction> {
        match self.status {
            PaymentStatus::Pending => vec![StatusAction::new("Confirm", "complete")],
            PaymentStatus::Completed => vec![StatusAction::new("Reverse", "reverse")],
            _ => Vec::new(),
        }
    }
}

/// Reference data: what a payment is for.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentType {
    pub id: RecordId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Shared by the two name-plus-description reference tables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedDraft {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn named_form() -> Vec<FieldSpec> {
    vec![
        FieldSpec::text("name", "Name").required(),
        FieldSpec::text("description", "Description"),
    ]
}

impl Resource for PaymentType {
    type Draft = NamedDraft;
    const KEY: &'static str = "payment-types";
    const LABEL: &'static str = "Payment type";
    const RELATED: &'static [&'static str] = &["payments"];

    fn id(&self) -> RecordId {
        self.id.clone()
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("name", "Name", |t: &PaymentType, _: &Lookups| t.name.as_str().into())
                .sortable()
                .width(24),
            Column::new("description", "Description", |t: &PaymentType, _: &Lookups| opt_text(&t.description)),
        ]
    }

    fn form() -> Vec<FieldSpec> {
        named_form()
    }

    fn form_values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("name", self.name.clone()),
            ("description", opt_string(&self.description)),
        ]
    }
}

/// Reference data: how a payment was made.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeOfPayment {
    pub id: RecordId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Resource for ModeOfPayment {
    type Draft = NamedDraft;
    const KEY: &'static str = "payment-modes";
    const LABEL: &'static str = "Payment mode";
    const RELATED: &'static [&'static str] = &["payments"];

    fn id(&self) -> RecordId {
        self.id.clone()
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("name", "Name", |m: &ModeOfPayment, _: &Lookups| m.name.as_str().into())
                .sortable()
                .width(24),
            Column::new("description", "Description", |m: &ModeOfPayment, _: &Lookups| {
                opt_text(&m.description)
            }),
        ]
    }

    fn form() -> Vec<FieldSpec> {
        named_form()
    }

    fn form_values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("name", self.name.clone()),
            ("description", opt_string(&self.description)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payment_joins_three_lookups() {
        let mut lk = Lookups::default();
        lk.insert("payment-types", vec![(RecordId::Num(1), "Share Contribution".into())]);
        lk.insert("payment-modes", vec![(RecordId::Num(2), "M-Pesa".into())]);
        let p: Payment = serde_json::from_value(json!({
            "id": 1, "memberId": 5, "paymentTypeId": 1, "modeOfPaymentId": 2, "amount": 1200, "reference": "QX12"
        }))
        .unwrap();
        let cols = Payment::columns();
        let cells: Vec<String> = cols.iter().map(|c| c.value(&p, &lk).display()).collect();
        assert_eq!(cells[1], "Unknown Member");
        assert_eq!(cells[2], "Share Contribution");
        assert_eq!(cells[3], "M-Pesa");
    }

    #[test]
    fn reversed_payment_has_no_actions() {
        let p: Payment = serde_json::from_value(json!({"id": 1, "status": "REVERSED"})).unwrap();
        assert!(p.status_actions().is_empty());
    }
}
