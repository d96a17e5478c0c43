//! Typed records mirrored from the remote API and the generic service over them.
//!
//! Each entity implements [`Resource`], which names its REST collection, its
//! table columns and its form schema. [`ResourceService`] maps the collection
//! to `get_all` / `get_by_id` / `create` / `update` / `delete` / `transition`.
//! Foreign references are resolved client-side through [`Lookups`], built from
//! whatever collections currently sit in the query cache.
pub mod access;
pub mod accounts;
pub mod groups;
pub mod loans;
pub mod members;
pub mod payments;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;

use crate::api::{ApiClient, Method, unwrap_collection, unwrap_record};
use crate::error::ApiError;
use crate::form::FieldSpec;
use crate::query::QueryCache;
use crate::table::{CellValue, Column};

pub use access::{Permission, Role, User};
pub use accounts::{Account, AccountType, Saving};
pub use groups::{BoardMember, Group, GroupOfficial};
pub use loans::{
    Disbursement, LoanApplication, LoanCollateral, LoanPenalty, LoanProduct, Repayment,
    RepaymentSchedule,
};
pub use members::{Member, NextOfKin};
pub use payments::{ModeOfPayment, Payment, PaymentType};

/// Remote-assigned identifier; the backend uses numbers for most entities and
/// strings for a few.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Num(i64),
    Str(String),
}

impl RecordId {
    /// Parse user input: numeric when it looks numeric.
    pub fn parse(s: &str) -> Self {
        let t = s.trim();
        t.parse::<i64>()
            .map(RecordId::Num)
            .unwrap_or_else(|_| RecordId::Str(t.to_string()))
    }
}

impl Default for RecordId {
    fn default() -> Self {
        RecordId::Num(0)
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordId::Num(n) => write!(f, "{n}"),
            RecordId::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<&RecordId> for CellValue {
    fn from(id: &RecordId) -> Self {
        match id {
            RecordId::Num(n) => CellValue::Number(*n as f64),
            RecordId::Str(s) => CellValue::Text(s.clone()),
        }
    }
}

/// Which mutations the backend offers for a resource.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Capabilities {
    pub create: bool,
    pub update: bool,
    pub delete: bool,
}

impl Capabilities {
    pub const CRUD: Capabilities = Capabilities {
        create: true,
        update: true,
        delete: true,
    };
    pub const APPEND_ONLY: Capabilities = Capabilities {
        create: true,
        update: false,
        delete: false,
    };
}

/// A status-implied action, e.g. "Activate" on a suspended member. Sent as
/// `PUT /{collection}/{id}/{action}`; legality is decided by the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusAction {
    pub label: &'static str,
    pub action: &'static str,
}

impl StatusAction {
    pub const fn new(label: &'static str, action: &'static str) -> Self {
        Self { label, action }
    }
}

pub trait Resource: Clone + Send + Sync + DeserializeOwned + 'static {
    /// Request body for create and update.
    type Draft: Serialize + DeserializeOwned + Send + Sync + 'static;

    /// REST collection segment and query-cache key.
    const KEY: &'static str;
    /// Human label, singular.
    const LABEL: &'static str;
    /// Other cached collections made stale by a mutation of this one.
    const RELATED: &'static [&'static str] = &[];
    /// Collections joined in for display (member names and the like).
    const LOOKUPS: &'static [&'static str] = &[];
    const SEARCH_COLUMN: Option<&'static str> = None;
    const CAPABILITIES: Capabilities = Capabilities::CRUD;

    fn id(&self) -> RecordId;
    /// Short text naming the record in dialogs, toasts and lookups.
    fn display_name(&self) -> String;
    fn columns() -> Vec<Column<Self>>;
    fn form() -> Vec<FieldSpec>;
    /// Current field values for the edit dialog, keyed by form field name.
    fn form_values(&self) -> Vec<(&'static str, String)>;

    fn status_actions(&self) -> Vec<StatusAction> {
        Vec::new()
    }
}

/// CRUD over one REST collection.
pub struct ResourceService<R> {
    client: ApiClient,
    _marker: PhantomData<fn() -> R>,
}

impl<R> Clone for ResourceService<R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            _marker: PhantomData,
        }
    }
}

impl<R: Resource> ResourceService<R> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            _marker: PhantomData,
        }
    }

    fn collection_path() -> String {
        format!("/{}", R::KEY)
    }

    fn record_path(id: &RecordId) -> String {
        format!("/{}/{}", R::KEY, id)
    }

    pub async fn get_all(&self) -> Result<Vec<R>, ApiError> {
        let body = self
            .client
            .request(Method::Get, &Self::collection_path(), None)
            .await?;
        let rows: Vec<R> = serde_json::from_value(unwrap_collection(body))?;
        tracing::debug!(resource = R::KEY, count = rows.len(), "collection fetched");
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: &RecordId) -> Result<R, ApiError> {
        let body = self
            .client
            .request(Method::Get, &Self::record_path(id), None)
            .await?;
        Ok(serde_json::from_value(unwrap_record(body))?)
    }

    pub async fn create(&self, draft: &R::Draft) -> Result<Option<R>, ApiError> {
        let body = serde_json::to_value(draft)?;
        let resp = self
            .client
            .request(Method::Post, &Self::collection_path(), Some(body))
            .await?;
        Ok(parse_optional(resp))
    }

    /// PUT the draft. Fields named in `cleared` are sent as `null` so the
    /// server drops their stored value.
    pub async fn update(&self, id: &RecordId, draft: &R::Draft, cleared: &[String]) -> Result<Option<R>, ApiError> {
        let mut body = serde_json::to_value(draft)?;
        if let Value::Object(map) = &mut body {
            for name in cleared {
                map.insert(name.clone(), Value::Null);
            }
        }
        let resp = self
            .client
            .request(Method::Put, &Self::record_path(id), Some(body))
            .await?;
        Ok(parse_optional(resp))
    }

    pub async fn delete(&self, id: &RecordId) -> Result<(), ApiError> {
        self.client.delete(&Self::record_path(id)).await
    }

    pub async fn transition(&self, id: &RecordId, action: &str) -> Result<Option<R>, ApiError> {
        let path = format!("{}/{}", Self::record_path(id), action);
        let resp = self.client.request(Method::Put, &path, None).await?;
        Ok(parse_optional(resp))
    }
}

/// Mutation responses vary between the created record, a wrapper and nothing.
fn parse_optional<R: DeserializeOwned>(body: Value) -> Option<R> {
    if body.is_null() {
        return None;
    }
    serde_json::from_value(unwrap_record(body)).ok()
}

/// `(id, display name)` pairs per collection key, for joins and pickers.
#[derive(Clone, Debug, Default)]
pub struct Lookups {
    tables: HashMap<&'static str, Vec<(RecordId, String)>>,
}

impl Lookups {
    /// Collect every lookup-capable collection currently present in `cache`.
    pub fn from_cache(cache: &QueryCache) -> Self {
        let mut lk = Lookups::default();
        lk.absorb::<Member>(cache);
        lk.absorb::<Group>(cache);
        lk.absorb::<AccountType>(cache);
        lk.absorb::<Account>(cache);
        lk.absorb::<LoanProduct>(cache);
        lk.absorb::<LoanApplication>(cache);
        lk.absorb::<PaymentType>(cache);
        lk.absorb::<ModeOfPayment>(cache);
        lk.absorb::<Role>(cache);
        lk
    }

    fn absorb<R: Resource>(&mut self, cache: &QueryCache) {
        if let Some(rows) = cache.get::<Vec<R>>(R::KEY) {
            self.insert(R::KEY, rows.iter().map(|r| (r.id(), r.display_name())).collect());
        }
    }

    /// Replace the entries for `key`.
    pub fn insert(&mut self, key: &'static str, entries: Vec<(RecordId, String)>) {
        self.tables.insert(key, entries);
    }

    /// Display name of `id` in the `key` collection.
    pub fn name(&self, key: &str, id: &RecordId) -> Option<&str> {
        self.tables
            .get(key)?
            .iter()
            .find(|(k, _)| k == id)
            .map(|(_, v)| v.as_str())
    }

    /// Joined name, or `fallback` when the referenced list failed or lacks the id.
    pub fn name_or(&self, key: &str, id: Option<&RecordId>, fallback: &str) -> CellValue {
        match id {
            Some(id) => CellValue::Text(self.name(key, id).unwrap_or(fallback).to_string()),
            None => CellValue::Missing,
        }
    }

    /// Member name for a `memberId` reference.
    pub fn member(&self, id: Option<&RecordId>) -> CellValue {
        self.name_or(Member::KEY, id, "Unknown Member")
    }

    /// Choices for a reference picker; empty when `key` is not loaded.
    pub fn options(&self, key: &str) -> &[(RecordId, String)] {
        self.tables.get(key).map(|v| v.as_slice()).unwrap_or(&[])
    }
}

/// Start a background fetch of the collection stored under `key`.
/// Returns false for keys this registry does not know.
pub fn fetch_collection(dispatcher: &crate::app::dispatch::Dispatcher, key: &str, generation: u64) -> bool {
    macro_rules! registry {
        ($($ty:ty),* $(,)?) => {
            match key {
                $(k if k == <$ty as Resource>::KEY => dispatcher.fetch_all::<$ty>(generation),)*
                _ => return false,
            }
        };
    }
    registry!(
        Member,
        NextOfKin,
        Group,
        GroupOfficial,
        BoardMember,
        Account,
        AccountType,
        Saving,
        LoanApplication,
        LoanProduct,
        LoanPenalty,
        LoanCollateral,
        RepaymentSchedule,
        Repayment,
        Disbursement,
        Payment,
        PaymentType,
        ModeOfPayment,
        Role,
        Permission,
        User,
    );
    true
}

/// Shared accessor helpers for optional text fields.
pub(crate) fn opt_text(v: &Option<String>) -> CellValue {
    v.as_deref().map(CellValue::from).unwrap_or(CellValue::Missing)
}

pub(crate) fn opt_string<T: ToString>(v: &Option<T>) -> String {
    v.as_ref().map(|x| x.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::ScriptedTransport;
    use crate::session::{Session, SessionStore};
    use serde_json::json;

    fn client(responses: Vec<(u16, Value)>) -> (ApiClient, std::sync::Arc<ScriptedTransport>) {
        let t = ScriptedTransport::with(responses);
        let session = SessionStore::in_memory(Session {
            token: Some("t".into()),
            ..Session::default()
        });
        (ApiClient::new(t.clone(), session), t)
    }

    #[test]
    fn record_ids_accept_numbers_and_strings() {
        let ids: Vec<RecordId> = serde_json::from_value(json!([4, "M-7"])).unwrap();
        assert_eq!(ids, vec![RecordId::Num(4), RecordId::Str("M-7".into())]);
        assert_eq!(RecordId::parse(" 12 "), RecordId::Num(12));
        assert_eq!(RecordId::parse("abc").to_string(), "abc");
    }

    #[tokio::test]
    async fn service_maps_crud_to_rest_paths() {
        let (client, transport) = client(vec![
            (200, json!({"data": [{"id": 1, "firstName": "Amina", "lastName": "Wekesa", "status": "ACTIVE"}]})),
            (201, json!({"id": 2, "firstName": "Baraka", "lastName": "Mutua", "status": "PENDING"})),
            (200, Value::Null),
            (204, Value::Null),
            (200, Value::Null),
        ]);
        let svc = ResourceService::<Member>::new(client);
        let all = svc.get_all().await.unwrap();
        assert_eq!(all.len(), 1);

        let draft: <Member as Resource>::Draft = serde_json::from_value(json!({
            "firstName": "Baraka", "lastName": "Mutua", "email": "b@m.co"
        }))
        .unwrap();
        let created = svc.create(&draft).await.unwrap();
        assert_eq!(created.map(|m| m.id), Some(RecordId::Num(2)));
        let cleared = vec!["phone".to_string()];
        assert!(svc.update(&RecordId::Num(2), &draft, &cleared).await.unwrap().is_none());
        assert_eq!(
            transport.requests()[2].body,
            Some(json!({"firstName": "Baraka", "lastName": "Mutua", "email": "b@m.co", "phone": null}))
        );
        svc.delete(&RecordId::Num(2)).await.unwrap();
        svc.transition(&RecordId::Num(2), "activate").await.unwrap();

        let seen: Vec<(Method, String)> = transport
            .requests()
            .into_iter()
            .map(|r| (r.method, r.path))
            .collect();
        assert_eq!(
            seen,
            vec![
                (Method::Get, "/members".to_string()),
                (Method::Post, "/members".to_string()),
                (Method::Put, "/members/2".to_string()),
                (Method::Delete, "/members/2".to_string()),
                (Method::Put, "/members/2/activate".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn transport_errors_propagate_unchanged() {
        let (client, _) = client(vec![(422, json!({"message": "Amount exceeds product maximum"}))]);
        let svc = ResourceService::<LoanApplication>::new(client);
        let err = svc.get_all().await.unwrap_err();
        assert_eq!(
            err,
            ApiError::Status {
                status: 422,
                message: Some("Amount exceeds product maximum".into())
            }
        );
    }

    #[test]
    fn lookups_fall_back_to_unknown_member() {
        let mut lk = Lookups::default();
        lk.insert(Member::KEY, vec![(RecordId::Num(1), "Amina Wekesa".into())]);
        assert_eq!(lk.member(Some(&RecordId::Num(1))).display(), "Amina Wekesa");
        assert_eq!(lk.member(Some(&RecordId::Num(9))).display(), "Unknown Member");
        assert_eq!(lk.member(None).display(), "N/A");
    }
}
