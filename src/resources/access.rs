//! Roles, permissions and back-office user accounts.
use serde::{Deserialize, Serialize};

use super::{Lookups, RecordId, Resource, StatusAction, opt_string, opt_text};
use crate::form::{FieldKind, FieldSpec};
use crate::table::{CellValue, Column};

/// A named role granted to back-office users.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: RecordId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleDraft {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Resource for Role {
    type Draft = RoleDraft;
    const KEY: &'static str = "roles";
    const LABEL: &'static str = "Role";
    const RELATED: &'static [&'static str] = &["users"];
    const SEARCH_COLUMN: Option<&'static str> = Some("name");

    fn id(&self) -> RecordId {
        self.id.clone()
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("name", "Name", |r: &Role, _: &Lookups| r.name.as_str().into())
                .sortable()
                .width(20),
            Column::new("description", "Description", |r: &Role, _: &Lookups| opt_text(&r.description)),
            Column::new("permissions", "Permissions", |r: &Role, _: &Lookups| {
                (r.permissions.len() as i64).into()
            })
            .sortable()
            .width(12),
        ]
    }

    fn form() -> Vec<FieldSpec> {
        vec![
            FieldSpec::text("name", "Name").required(),
            FieldSpec::text("description", "Description"),
        ]
    }

    fn form_values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("name", self.name.clone()),
            ("description", opt_string(&self.description)),
        ]
    }
}

/// A single permission that roles can carry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub id: RecordId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionDraft {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Resource for Permission {
    type Draft = PermissionDraft;
    const KEY: &'static str = "permissions";
    const LABEL: &'static str = "Permission";
    const RELATED: &'static [&'static str] = &["roles"];
    const SEARCH_COLUMN: Option<&'static str> = Some("name");

    fn id(&self) -> RecordId {
        self.id.clone()
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("name", "Name", |p: &Permission, _: &Lookups| p.name.as_str().into())
                .sortable()
                .width(28),
            Column::new("description", "Description", |p: &Permission, _: &Lookups| opt_text(&p.description)),
        ]
    }

    fn form() -> Vec<FieldSpec> {
        vec![
            FieldSpec::text("name", "Name").required(),
            FieldSpec::text("description", "Description"),
        ]
    }

    fn form_values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("name", self.name.clone()),
            ("description", opt_string(&self.description)),
        ]
    }
}

/// Login account; the profile shown on the member dashboard.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: RecordId,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role_id: Option<RecordId>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDraft {
    pub username: String,
    pub email: String,
    pub role_id: RecordId,
}

impl Resource for User {
    type Draft = UserDraft;
    const KEY: &'static str = "users";
    const LABEL: &'static str = "User";
    const LOOKUPS: &'static [&'static str] = &["roles"];

    fn id(&self) -> RecordId {
        self.id.clone()
    }

    fn display_name(&self) -> String {
        self.username.clone()
    }

    fn columns() -> Vec<Column<Self>> {
        vec![
            Column::new("username", "Username", |u: &User, _: &Lookups| u.username.as_str().into())
                .sortable()
                .width(20),
            Column::new("email", "Email", |u: &User, _: &Lookups| opt_text(&u.email)),
            Column::new("role", "Role", |u: &User, lk: &Lookups| {
                lk.name_or(Role::KEY, u.role_id.as_ref(), "Unknown Role")
            })
            .sortable()
            .width(14),
            Column::new("enabled", "Enabled", |u: &User, _: &Lookups| CellValue::Bool(u.enabled)).width(8),
        ]
    }

    fn form() -> Vec<FieldSpec> {
        vec![
            FieldSpec::text("username", "Username").required().min_len(3),
            FieldSpec::new("email", "Email", FieldKind::Email).required(),
            FieldSpec::new("roleId", "Role", FieldKind::Reference("roles")).required(),
        ]
    }

    fn form_values(&self) -> Vec<(&'static str, String)> {
        vec![
            ("username", self.username.clone()),
            ("email", opt_string(&self.email)),
            ("roleId", opt_string(&self.role_id)),
        ]
    }

    fn status_actions(&self) -> Vec<StatusAction> {
        if self.enabled {
            vec![StatusAction::new("Disable", "disable")]
        } else {
            vec![StatusAction::new("Enable", "enable")]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn role_counts_permissions() {
        let r: Role = serde_json::from_value(json!({
            "id": 1, "name": "ADMIN", "permissions": ["members.read", "members.write"]
        }))
        .unwrap();
        assert_eq!(Role::columns()[2].value(&r, &Lookups::default()).display(), "2");
    }

    #[test]
    fn users_default_to_enabled() {
        let u: User = serde_json::from_value(json!({"id": 1, "username": "clerk"})).unwrap();
        assert!(u.enabled);
        assert_eq!(u.status_actions()[0].action, "disable");
    }
}
