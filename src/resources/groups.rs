//! Member groups, their officials, and the SACCO board.
use serde::{Deserialize, Serialize};

use super::{Lookups, RecordId, Resource, StatusAction, opt_string, opt_text};
use crate::form::{FieldKind, FieldSpec};
use crate::table::Column;

const WEEKDAYS: &[&str] = &[
    "MONDAY",
    "TUESDAY",
    "WEDNESDAY",
    "THURSDAY",
    "FRIDAY",
    "SATURDAY",
    "SUNDAY",
];

/// Group lifecycle state.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupStatus {
    #[default]
    Active,
    Inactive,
    #[serde(other)]
    Unknown,
}

impl GroupStatus {
    pub fn label(self) -> &'static str {
        match self {
            GroupStatus::Active => "ACTIVE",
            GroupStatus::Inactive => "INACTIVE",
            GroupStatus::Unknown => "UNKNOWN",
        }
    }
}

/// A member group registered with the SACCO.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: RecordId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub registration_number: Option<String>,
    #[serde(default)]
    pub meeting_day: Option<String>,
    #[serde(default)]
    pub status: GroupStatus,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDraft {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_day: Option<String>,
}

impl Resource for Group {
    type Draft = GroupDraft;
    const KEY: &'static str = "groups";
    const LABEL: &'static str = "Group";
    const RELATED: &'static [&'static str] = &["group-officials"];
    const SEARCH_COLUMN: Option<&'static str> = Some("name");

    fn id(&self) -> RecordId {
        self.id.clone()
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("name", "Name", |g: &Group, _: &Lookups| g.name.as_str().into())
                .sortable()
                .width(28),
            Column::new("registrationNumber", "Reg. No.", |g: &Group, _: &Lookups| {
                opt_text(&g.registration_number)
            })
            .width(14),
            Column::new("meetingDay", "Meets", |g: &Group, _: &Lookups| opt_text(&g.meeting_day)),
            Column::new("status", "Status", |g: &Group, _: &Lookups| g.status.label().into())
                .sortable()
                .width(10),
        ]
    }

    fn form() -> Vec<FieldSpec> {
        vec![
            FieldSpec::text("name", "Name").required().min_len(3),
            FieldSpec::text("registrationNumber", "Registration number"),
            FieldSpec::new("meetingDay", "Meeting day", FieldKind::Choice(WEEKDAYS)),
        ]
    }

    fn form_values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("name", self.name.clone()),
            ("registrationNumber", opt_string(&self.registration_number)),
            ("meetingDay", opt_string(&self.meeting_day)),
        ]
    }

    fn status_actions(&self) -> Vec<StatusAction> {
        match self.status {
            GroupStatus::Active => vec![StatusAction::new("Deactivate", "deactivate")],
            GroupStatus::Inactive => vec![StatusAction::new("Activate", "activate")],
            GroupStatus::Unknown => Vec::new(),
        }
    }
}

/// A member holding an office in a group.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupOfficial {
    pub id: RecordId,
    #[serde(default)]
    pub group_id: Option<RecordId>,
    #[serde(default)]
    pub member_id: Option<RecordId>,
    #[serde(default)]
    pub position: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupOfficialDraft {
    pub group_id: RecordId,
    pub member_id: RecordId,
    pub position: String,
}

impl Resource for GroupOfficial {
    type Draft = GroupOfficialDraft;
    const KEY: &'static str = "group-officials";
    const LABEL: &'static str = "Group official";
    const LOOKUPS: &'static [&'static str] = &["groups", "members"];

    fn id(&self) -> RecordId {
        self.id.clone()
    }

    fn display_name(&self) -> String {
        format!("{} #{}", opt_string(&self.position), self.id)
    }

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("group", "Group", |o: &GroupOfficial, lk: &Lookups| {
                lk.name_or(Group::KEY, o.group_id.as_ref(), "Unknown Group")
            })
            .sortable()
            .width(24),
            Column::new("member", "Member", |o: &GroupOfficial, lk: &Lookups| lk.member(o.member_id.as_ref()))
                .sortable()
                .width(24),
            Column::new("position", "Position", |o: &GroupOfficial, _: &Lookups| opt_text(&o.position))
                .sortable(),
        ]
    }

    fn form() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("groupId", "Group", FieldKind::Reference("groups")).required(),
            FieldSpec::new("memberId", "Member", FieldKind::Reference("members")).required(),
            FieldSpec::new(
                "position",
                "Position",
                FieldKind::Choice(&["CHAIRPERSON", "SECRETARY", "TREASURER", "MEMBER"]),
            )
            .required(),
        ]
    }

    fn form_values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("groupId", opt_string(&self.group_id)),
            ("memberId", opt_string(&self.member_id)),
            ("position", opt_string(&self.position)),
        ]
    }
}

/// A member sitting on the SACCO board.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardMember {
    pub id: RecordId,
    #[serde(default)]
    pub member_id: Option<RecordId>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub term_start: Option<String>,
    #[serde(default)]
    pub term_end: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardMemberDraft {
    pub member_id: RecordId,
    pub position: String,
    pub term_start: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term_end: Option<String>,
}

impl Resource for BoardMember {
    type Draft = BoardMemberDraft;
    const KEY: &'static str = "board-members";
    const LABEL: &'static str = "Board member";
    const LOOKUPS: &'static [&'static str] = &["members"];

    fn id(&self) -> RecordId {
        self.id.clone()
    }

    fn display_name(&self) -> String {
        format!("{} #{}", opt_string(&self.position), self.id)
    }

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("member", "Member", |b: &BoardMember, lk: &Lookups| lk.member(b.member_id.as_ref()))
                .sortable()
                .width(24),
            Column::new("position", "Position", |b: &BoardMember, _: &Lookups| opt_text(&b.position))
                .sortable(),
            Column::new("termStart", "From", |b: &BoardMember, _: &Lookups| opt_text(&b.term_start))
                .sortable()
                .width(12),
            Column::new("termEnd", "To", |b: &BoardMember, _: &Lookups| opt_text(&b.term_end)).width(12),
        ]
    }

    fn form() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("memberId", "Member", FieldKind::Reference("members")).required(),
            FieldSpec::text("position", "Position").required(),
            FieldSpec::new("termStart", "Term start", FieldKind::Date).required(),
            FieldSpec::new("termEnd", "Term end", FieldKind::Date),
        ]
    }

    fn form_values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("memberId", opt_string(&self.member_id)),
            ("position", opt_string(&self.position)),
            ("termStart", opt_string(&self.term_start)),
            ("termEnd", opt_string(&self.term_end)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn officials_fall_back_when_group_list_missing() {
        let o: GroupOfficial =
            serde_json::from_value(json!({"id": 1, "groupId": 4, "memberId": 2, "position": "TREASURER"}))
                .unwrap();
        let cols = GroupOfficial::columns();
        let lk = Lookups::default();
        assert_eq!(cols[0].value(&o, &lk).display(), "Unknown Group");
        assert_eq!(cols[1].value(&o, &lk).display(), "Unknown Member");
    }

    #[test]
    fn inactive_group_offers_activate() {
        let g: Group = serde_json::from_value(json!({"id": 1, "name": "Umoja", "status": "INACTIVE"})).unwrap();
        assert_eq!(g.status_actions()[0].action, "activate");
    }
}
