//! Members and their next of kin.
use serde::{Deserialize, Serialize};

use super::{Lookups, RecordId, Resource, StatusAction, opt_string, opt_text};
use crate::form::{FieldKind, FieldSpec};
use crate::table::Column;

/// Membership state as reported by the backend.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberStatus {
    Active,
    Suspended,
    #[default]
    Pending,
    Closed,
    #[serde(other)]
    Unknown,
}

impl MemberStatus {
    pub fn label(self) -> &'static str {
        match self {
            MemberStatus::Active => "ACTIVE",
            MemberStatus::Suspended => "SUSPENDED",
            MemberStatus::Pending => "PENDING",
            MemberStatus::Closed => "CLOSED",
            MemberStatus::Unknown => "UNKNOWN",
        }
    }
}

/// A registered SACCO member.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: RecordId,
    #[serde(default)]
    pub member_number: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub national_id: Option<String>,
    #[serde(default)]
    pub status: MemberStatus,
}

impl Member {
    /// First and last name joined by a space, trimmed.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

/// Create/edit body for a member.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub national_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_number: Option<String>,
}

impl Resource for Member {
    type Draft = MemberDraft;
    const KEY: &'static str = "members";
    const LABEL: &'static str = "Member";
    const RELATED: &'static [&'static str] = &["accounts", "loan-applications", "next-of-kin"];

    fn id(&self) -> RecordId {
        self.id.clone()
    }

    fn display_name(&self) -> String {
        self.full_name()
    }

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("memberNumber", "No.", |m: &Member, _: &Lookups| opt_text(&m.member_number))
                .sortable()
                .width(10),
            Column::new("name", "Name", |m: &Member, _: &Lookups| m.full_name().into())
                .sortable()
                .width(24),
            Column::new("email", "Email", |m: &Member, _: &Lookups| opt_text(&m.email)),
            Column::new("phone", "Phone", |m: &Member, _: &Lookups| opt_text(&m.phone)).width(14),
            Column::new("status", "Status", |m: &Member, _: &Lookups| m.status.label().into())
                .sortable()
                .width(10),
        ]
    }

    fn form() -> Vec<FieldSpec> {
        vec![
            FieldSpec::text("firstName", "First name").required(),
            FieldSpec::text("lastName", "Last name").required(),
            FieldSpec::new("email", "Email", FieldKind::Email).required(),
            FieldSpec::text("phone", "Phone").min_len(7),
            FieldSpec::text("nationalId", "National ID"),
            FieldSpec::text("memberNumber", "Member number"),
        ]
    }

    fn form_values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("firstName", self.first_name.clone()),
            ("lastName", self.last_name.clone()),
            ("email", opt_string(&self.email)),
            ("phone", opt_string(&self.phone)),
            ("nationalId", opt_string(&self.national_id)),
            ("memberNumber", opt_string(&self.member_number)),
        ]
    }

    fn status_actions(&self) -> Vec<StatusAction> {
        match self.status {
            MemberStatus::Pending => vec![StatusAction::new("Approve", "approve")],
            MemberStatus::Active => vec![
                StatusAction::new("Suspend", "suspend"),
                StatusAction::new("Close", "close"),
            ],
            MemberStatus::Suspended => vec![StatusAction::new("Activate", "activate")],
            MemberStatus::Closed | MemberStatus::Unknown => Vec::new(),
        }
    }
}

/// Next-of-kin contact attached to a member.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextOfKin {
    pub id: RecordId,
    #[serde(default)]
    pub member_id: Option<RecordId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub relationship: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextOfKinDraft {
    pub member_id: RecordId,
    pub name: String,
    pub relationship: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Resource for NextOfKin {
    type Draft = NextOfKinDraft;
    const KEY: &'static str = "next-of-kin";
    const LABEL: &'static str = "Next of kin";
    const LOOKUPS: &'static [&'static str] = &["members"];

    fn id(&self) -> RecordId {
        self.id.clone()
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("member", "Member", |k: &NextOfKin, lk: &Lookups| lk.member(k.member_id.as_ref()))
                .sortable()
                .width(24),
            Column::new("name", "Name", |k: &NextOfKin, _: &Lookups| k.name.as_str().into())
                .sortable()
                .width(24),
            Column::new("relationship", "Relationship", |k: &NextOfKin, _: &Lookups| {
                opt_text(&k.relationship)
            }),
            Column::new("phone", "Phone", |k: &NextOfKin, _: &Lookups| opt_text(&k.phone)).width(14),
        ]
    }

    fn form() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("memberId", "Member", FieldKind::Reference("members")).required(),
            FieldSpec::text("name", "Name").required(),
            FieldSpec::new(
                "relationship",
                "Relationship",
                FieldKind::Choice(&["SPOUSE", "CHILD", "PARENT", "SIBLING", "OTHER"]),
            )
            .required(),
            FieldSpec::text("phone", "Phone"),
        ]
    }

    fn form_values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("memberId", opt_string(&self.member_id)),
            ("name", self.name.clone()),
            ("relationship", opt_string(&self.relationship)),
            ("phone", opt_string(&self.phone)),
        ]
    }
}
