//! Form schema and client-side validation.
//!
//! A form is a list of [`FieldSpec`]s plus the raw text typed into each field.
//! [`FormState::validate`] either yields a JSON object ready to be decoded into
//! a resource's request draft, or records field-level messages and yields
//! [`ValidationErrors`]. No network call happens on a validation failure.
use chrono::NaiveDate;
use serde_json::{Map, Number, Value};

use crate::error::ValidationErrors;
use crate::resources::RecordId;

#[derive(Clone, Debug, PartialEq)]
pub enum FieldKind {
    Text,
    Email,
    Password,
    Integer,
    Decimal,
    /// `YYYY-MM-DD`.
    Date,
    Choice(&'static [&'static str]),
    /// Id of a record in the named collection; cycled from the cached list.
    Reference(&'static str),
    Bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldSpec {
    /// JSON key sent to the API.
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub min_len: usize,
}

impl FieldSpec {
    pub fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        let min_len = if kind == FieldKind::Password { 6 } else { 0 };
        Self {
            name,
            label,
            kind,
            required: false,
            min_len,
        }
    }

    pub fn text(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Text)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn min_len(mut self, n: usize) -> Self {
        self.min_len = n;
        self
    }

    fn check(&self, raw: &str) -> Result<Option<Value>, String> {
        let v = raw.trim();
        if v.is_empty() {
            return if self.required {
                Err(format!("{} is required", self.label))
            } else {
                Ok(None)
            };
        }
        if v.chars().count() < self.min_len {
            return Err(format!("{} must be at least {} characters", self.label, self.min_len));
        }
        let value = match &self.kind {
            FieldKind::Text => Value::String(v.to_string()),
            FieldKind::Password => Value::String(raw.to_string()),
            FieldKind::Email => {
                let valid = v
                    .split_once('@')
                    .is_some_and(|(user, host)| !user.is_empty() && host.contains('.') && !host.ends_with('.'));
                if !valid {
                    return Err("Enter a valid email address".to_string());
                }
                Value::String(v.to_string())
            }
            FieldKind::Integer => v
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| format!("{} must be a whole number", self.label))?,
            FieldKind::Decimal => {
                let n = v
                    .parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite())
                    .ok_or_else(|| format!("{} must be a number", self.label))?;
                if n < 0.0 {
                    return Err(format!("{} cannot be negative", self.label));
                }
                Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
            }
            FieldKind::Date => {
                NaiveDate::parse_from_str(v, "%Y-%m-%d")
                    .map_err(|_| format!("{} must be a date (YYYY-MM-DD)", self.label))?;
                Value::String(v.to_string())
            }
            FieldKind::Choice(options) => {
                let hit = options
                    .iter()
                    .find(|o| o.eq_ignore_ascii_case(v))
                    .ok_or_else(|| format!("{} must be one of: {}", self.label, options.join(", ")))?;
                Value::String(hit.to_string())
            }
            FieldKind::Reference(_) => serde_json::to_value(RecordId::parse(v)).unwrap_or(Value::Null),
            FieldKind::Bool => match v.to_ascii_lowercase().as_str() {
                "true" | "yes" | "y" | "1" => Value::Bool(true),
                "false" | "no" | "n" | "0" => Value::Bool(false),
                _ => return Err(format!("{} must be yes or no", self.label)),
            },
        };
        Ok(Some(value))
    }
}

/// Values being edited in one dialog.
#[derive(Clone, Debug, PartialEq)]
pub struct FormState {
    specs: Vec<FieldSpec>,
    values: Vec<String>,
    /// Values the form was opened with; empty for a create form.
    initial: Vec<String>,
    errors: ValidationErrors,
    focus: usize,
}

impl FormState {
    pub fn new(specs: Vec<FieldSpec>) -> Self {
        let values = vec![String::new(); specs.len()];
        Self {
            specs,
            initial: values.clone(),
            values,
            errors: ValidationErrors::default(),
            focus: 0,
        }
    }

    /// A form prefilled for editing; unknown names are ignored.
    pub fn with_values(specs: Vec<FieldSpec>, values: Vec<(&'static str, String)>) -> Self {
        let mut form = Self::new(specs);
        for (name, value) in values {
            form.set(name, value);
        }
        form.initial = form.values.clone();
        form
    }

    pub fn specs(&self) -> &[FieldSpec] {
        &self.specs
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn focused_spec(&self) -> Option<&FieldSpec> {
        self.specs.get(self.focus)
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        let idx = self.specs.iter().position(|s| s.name == name)?;
        self.values.get(idx).map(|s| s.as_str())
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        if let Some(idx) = self.specs.iter().position(|s| s.name == name) {
            self.values[idx] = value.into();
        }
    }

    pub fn focus_next(&mut self) {
        if !self.specs.is_empty() {
            self.focus = (self.focus + 1) % self.specs.len();
        }
    }

    pub fn focus_prev(&mut self) {
        if !self.specs.is_empty() {
            self.focus = (self.focus + self.specs.len() - 1) % self.specs.len();
        }
    }

    pub fn input(&mut self, c: char) {
        if let Some(v) = self.values.get_mut(self.focus) {
            v.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(v) = self.values.get_mut(self.focus) {
            v.pop();
        }
    }

    /// Step the focused choice/reference/bool field through its options.
    /// `references` supplies the choices for reference fields.
    pub fn cycle(&mut self, forward: bool, references: &[(RecordId, String)]) {
        let Some(spec) = self.specs.get(self.focus) else {
            return;
        };
        let options: Vec<String> = match &spec.kind {
            FieldKind::Choice(opts) => opts.iter().map(|s| s.to_string()).collect(),
            FieldKind::Reference(_) => references.iter().map(|(id, _)| id.to_string()).collect(),
            FieldKind::Bool => vec!["yes".to_string(), "no".to_string()],
            _ => return,
        };
        if options.is_empty() {
            return;
        }
        let current = &self.values[self.focus];
        let next = match options.iter().position(|o| o.eq_ignore_ascii_case(current)) {
            Some(i) if forward => (i + 1) % options.len(),
            Some(i) => (i + options.len() - 1) % options.len(),
            None => 0,
        };
        self.values[self.focus] = options[next].clone();
    }

    /// Validate every field. On success the errors are cleared and the JSON
    /// object of non-empty fields is returned, plus `null` for optional fields
    /// that were prefilled and have since been emptied.
    pub fn validate(&mut self) -> Result<Map<String, Value>, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let mut out = Map::new();
        for ((spec, raw), initial) in self.specs.iter().zip(&self.values).zip(&self.initial) {
            match spec.check(raw) {
                Ok(Some(v)) => {
                    out.insert(spec.name.to_string(), v);
                }
                // an optional field emptied during an edit is sent as null
                Ok(None) if !initial.trim().is_empty() => {
                    out.insert(spec.name.to_string(), Value::Null);
                }
                Ok(None) => {}
                Err(msg) => errors.insert(spec.name, msg),
            }
        }
        self.errors = errors.clone();
        if errors.is_empty() { Ok(out) } else { Err(errors) }
    }

    /// Attach a message to a field from outside the schema (e.g. password confirmation).
    pub fn add_error(&mut self, field: &'static str, msg: impl Into<String>) {
        self.errors.insert(field, msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn member_form() -> FormState {
        FormState::new(vec![
            FieldSpec::text("firstName", "First name").required(),
            FieldSpec::new("email", "Email", FieldKind::Email).required(),
            FieldSpec::new("shares", "Shares", FieldKind::Integer),
            FieldSpec::new("joinedOn", "Joined", FieldKind::Date),
            FieldSpec::new("status", "Status", FieldKind::Choice(&["ACTIVE", "SUSPENDED"])),
        ])
    }

    #[test]
    fn valid_form_produces_typed_json() {
        let mut f = member_form();
        f.set("firstName", " Amina ");
        f.set("email", "amina@sacco.co.ke");
        f.set("shares", "40");
        f.set("joinedOn", "2024-02-29");
        f.set("status", "active");
        let out = f.validate().unwrap();
        assert_eq!(
            Value::Object(out),
            json!({
                "firstName": "Amina",
                "email": "amina@sacco.co.ke",
                "shares": 40,
                "joinedOn": "2024-02-29",
                "status": "ACTIVE"
            })
        );
    }

    #[test]
    fn invalid_fields_report_inline_messages() {
        let mut f = member_form();
        f.set("email", "not-an-email");
        f.set("shares", "4.5");
        f.set("joinedOn", "2023-02-30");
        let errs = f.validate().unwrap_err();
        assert_eq!(errs.get("firstName"), Some("First name is required"));
        assert_eq!(errs.get("email"), Some("Enter a valid email address"));
        assert!(errs.get("shares").is_some());
        assert!(errs.get("joinedOn").is_some());
        assert_eq!(f.errors(), &errs);
        // values survive a failed validation
        assert_eq!(f.value("email"), Some("not-an-email"));
    }

    #[test]
    fn password_requires_six_characters() {
        let mut f = FormState::new(vec![FieldSpec::new("password", "Password", FieldKind::Password).required()]);
        f.set("password", "abc");
        assert!(f.validate().is_err());
        f.set("password", "secret1");
        assert!(f.validate().is_ok());
    }

    #[test]
    fn typing_and_cycling() {
        let mut f = member_form();
        f.input('J');
        f.input('o');
        f.backspace();
        assert_eq!(f.value("firstName"), Some("J"));
        f.focus_prev();
        assert_eq!(f.focused_spec().map(|s| s.name), Some("status"));
        f.cycle(true, &[]);
        assert_eq!(f.value("status"), Some("ACTIVE"));
        f.cycle(true, &[]);
        assert_eq!(f.value("status"), Some("SUSPENDED"));
        f.cycle(true, &[]);
        assert_eq!(f.value("status"), Some("ACTIVE"));
    }

    #[test]
    fn reference_fields_cycle_through_lookup_ids() {
        let mut f = FormState::new(vec![FieldSpec::new("memberId", "Member", FieldKind::Reference("members")).required()]);
        let opts = vec![(RecordId::Num(3), "A".to_string()), (RecordId::Num(8), "B".to_string())];
        f.cycle(true, &opts);
        assert_eq!(f.value("memberId"), Some("3"));
        f.cycle(false, &opts);
        assert_eq!(f.value("memberId"), Some("8"));
        assert_eq!(f.validate().unwrap().get("memberId"), Some(&json!(8)));
    }

    #[test]
    fn emptied_prefilled_field_becomes_null() {
        let specs = vec![
            FieldSpec::text("firstName", "First name").required(),
            FieldSpec::text("phone", "Phone").min_len(7),
            FieldSpec::text("nationalId", "National ID"),
        ];
        let mut f = FormState::with_values(
            specs,
            vec![("firstName", "A".to_string()), ("phone", "0712345678".to_string())],
        );
        f.set("phone", "");
        let out = f.validate().unwrap();
        assert_eq!(Value::Object(out), json!({"firstName": "A", "phone": null}));
    }

    #[test]
    fn create_form_leaves_empty_fields_out() {
        let mut f = member_form();
        f.set("firstName", "A");
        f.set("email", "a@b.co");
        let out = f.validate().unwrap();
        assert!(!out.contains_key("shares"));
    }
}
