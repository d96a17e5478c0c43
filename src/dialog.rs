//! Create/edit/delete dialog state machine.
//!
//! ```text
//! Closed -> Open(Create|Edit) -> Submitting -> Closed            (success)
//!                                            -> Open { error }    (failure, values kept)
//! Closed -> RowMenu -> Transitioning -> Closed | RowMenu { error }
//! Closed -> ConfirmDelete -> Deleting -> Closed | ConfirmDelete { error }
//! ```
//! Cancelling an idle dialog discards whatever was entered. Cancelling while a
//! request is in flight is refused; the outcome decides the next state.
use serde_json::{Map, Value};

use crate::error::ValidationErrors;
use crate::form::FormState;
use crate::resources::{RecordId, StatusAction};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DialogMode {
    Create,
    Edit(RecordId),
}

/// The record a dialog acts on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    pub id: RecordId,
    pub label: String,
}

/// Entries of the per-row action menu.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RowAction {
    Edit,
    Delete,
    Status(StatusAction),
}

impl RowAction {
    pub fn label(&self) -> &str {
        match self {
            RowAction::Edit => "Edit",
            RowAction::Delete => "Delete",
            RowAction::Status(s) => s.label,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
pub enum DialogState {
    #[default]
    Closed,
    Open {
        mode: DialogMode,
        form: FormState,
        error: Option<String>,
    },
    Submitting {
        mode: DialogMode,
        form: FormState,
    },
    RowMenu {
        target: Target,
        options: Vec<RowAction>,
        selected: usize,
        error: Option<String>,
    },
    Transitioning {
        target: Target,
        options: Vec<RowAction>,
        selected: usize,
    },
    ConfirmDelete {
        target: Target,
        error: Option<String>,
    },
    Deleting {
        target: Target,
    },
}

/// What a successful `submit` hands to the caller.
#[derive(Clone, Debug, PartialEq)]
pub struct Submission {
    pub mode: DialogMode,
    pub payload: Map<String, Value>,
}

impl DialogState {
    pub fn is_open(&self) -> bool {
        !matches!(self, DialogState::Closed)
    }

    pub fn in_flight(&self) -> bool {
        matches!(
            self,
            DialogState::Submitting { .. } | DialogState::Transitioning { .. } | DialogState::Deleting { .. }
        )
    }

    pub fn open_create(&mut self, form: FormState) {
        *self = DialogState::Open {
            mode: DialogMode::Create,
            form,
            error: None,
        };
    }

    pub fn open_edit(&mut self, id: RecordId, form: FormState) {
        *self = DialogState::Open {
            mode: DialogMode::Edit(id),
            form,
            error: None,
        };
    }

    pub fn open_menu(&mut self, target: Target, options: Vec<RowAction>) {
        *self = DialogState::RowMenu {
            target,
            options,
            selected: 0,
            error: None,
        };
    }

    pub fn confirm_delete(&mut self, target: Target) {
        *self = DialogState::ConfirmDelete { target, error: None };
    }

    pub fn form_mut(&mut self) -> Option<&mut FormState> {
        match self {
            DialogState::Open { form, .. } => Some(form),
            _ => None,
        }
    }

    /// Validate the open form. Valid input moves to `Submitting`; invalid input
    /// stays `Open` with field errors recorded on the form.
    pub fn submit(&mut self) -> Option<Result<Submission, ValidationErrors>> {
        let DialogState::Open { mode, form, error } = self else {
            return None;
        };
        match form.validate() {
            Ok(payload) => {
                let mode = mode.clone();
                let form = std::mem::replace(form, FormState::new(Vec::new()));
                *self = DialogState::Submitting {
                    mode: mode.clone(),
                    form,
                };
                Some(Ok(Submission { mode, payload }))
            }
            Err(errs) => {
                *error = None;
                Some(Err(errs))
            }
        }
    }

    /// Start the selected row action. Status actions move to `Transitioning`;
    /// edit/delete are returned for the caller to open the matching dialog.
    pub fn choose(&mut self) -> Option<(Target, RowAction)> {
        let DialogState::RowMenu {
            target,
            options,
            selected,
            ..
        } = self
        else {
            return None;
        };
        let action = options.get(*selected)?.clone();
        let target = target.clone();
        if let RowAction::Status(_) = action {
            *self = DialogState::Transitioning {
                target: target.clone(),
                options: std::mem::take(options),
                selected: *selected,
            };
        }
        Some((target, action))
    }

    pub fn menu_move(&mut self, down: bool) {
        if let DialogState::RowMenu { options, selected, .. } = self {
            if down {
                if *selected + 1 < options.len() {
                    *selected += 1;
                }
            } else {
                *selected = selected.saturating_sub(1);
            }
        }
    }

    /// Confirmed delete moves to `Deleting` and returns the target.
    pub fn begin_delete(&mut self) -> Option<Target> {
        let DialogState::ConfirmDelete { target, .. } = self else {
            return None;
        };
        let target = target.clone();
        *self = DialogState::Deleting {
            target: target.clone(),
        };
        Some(target)
    }

    /// Request settled successfully.
    pub fn succeed(&mut self) {
        if self.in_flight() {
            *self = DialogState::Closed;
        }
    }

    /// Request failed: go back to the idle state with the message, keeping input.
    pub fn fail(&mut self, message: impl Into<String>) {
        let message = Some(message.into());
        *self = match std::mem::take(self) {
            DialogState::Submitting { mode, form } | DialogState::Open { mode, form, .. } => {
                DialogState::Open { mode, form, error: message }
            }
            DialogState::Transitioning {
                target,
                options,
                selected,
            }
            | DialogState::RowMenu {
                target,
                options,
                selected,
                ..
            } => DialogState::RowMenu {
                target,
                options,
                selected,
                error: message,
            },
            DialogState::Deleting { target } | DialogState::ConfirmDelete { target, .. } => {
                DialogState::ConfirmDelete { target, error: message }
            }
            DialogState::Closed => DialogState::Closed,
        };
    }

    /// Esc: close unless a request is in flight.
    pub fn cancel(&mut self) -> bool {
        if self.in_flight() {
            return false;
        }
        *self = DialogState::Closed;
        true
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            DialogState::Open { error, .. }
            | DialogState::RowMenu { error, .. }
            | DialogState::ConfirmDelete { error, .. } => error.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FieldSpec;

    fn form() -> FormState {
        FormState::new(vec![FieldSpec::text("name", "Name").required()])
    }

    fn target() -> Target {
        Target {
            id: RecordId::Num(5),
            label: "Umoja Group".into(),
        }
    }

    #[test]
    fn invalid_submit_stays_open_without_request() {
        let mut d = DialogState::Closed;
        d.open_create(form());
        let res = d.submit().unwrap();
        assert!(res.is_err());
        assert!(matches!(d, DialogState::Open { .. }));
    }

    #[test]
    fn success_closes_dialog() {
        let mut d = DialogState::Closed;
        d.open_edit(RecordId::Num(5), form());
        d.form_mut().unwrap().set("name", "Umoja");
        let sub = d.submit().unwrap().unwrap();
        assert_eq!(sub.mode, DialogMode::Edit(RecordId::Num(5)));
        assert!(d.in_flight());
        assert!(!d.cancel(), "cannot cancel while submitting");
        d.succeed();
        assert_eq!(d, DialogState::Closed);
    }

    #[test]
    fn failure_reopens_with_values_and_error() {
        let mut d = DialogState::Closed;
        d.open_create(form());
        d.form_mut().unwrap().set("name", "Umoja");
        d.submit().unwrap().unwrap();
        d.fail("Name already taken");
        match &d {
            DialogState::Open { mode, form, error } => {
                assert_eq!(*mode, DialogMode::Create);
                assert_eq!(form.value("name"), Some("Umoja"));
                assert_eq!(error.as_deref(), Some("Name already taken"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(d.cancel());
        assert!(!d.is_open());
    }

    #[test]
    fn delete_flow() {
        let mut d = DialogState::Closed;
        d.confirm_delete(target());
        assert_eq!(d.begin_delete(), Some(target()));
        d.fail("Group has members");
        assert_eq!(d.error(), Some("Group has members"));
        d.begin_delete();
        d.succeed();
        assert!(!d.is_open());
    }

    #[test]
    fn status_action_from_row_menu() {
        let mut d = DialogState::Closed;
        let opts = vec![
            RowAction::Edit,
            RowAction::Status(StatusAction::new("Activate", "activate")),
        ];
        d.open_menu(target(), opts);
        d.menu_move(true);
        d.menu_move(true);
        let (t, action) = d.choose().unwrap();
        assert_eq!(t, target());
        assert_eq!(action.label(), "Activate");
        assert!(d.in_flight());
        d.fail("Not allowed");
        assert!(matches!(d, DialogState::RowMenu { selected: 1, .. }));
    }

    #[test]
    fn edit_choice_leaves_menu_for_caller() {
        let mut d = DialogState::Closed;
        d.open_menu(target(), vec![RowAction::Edit, RowAction::Delete]);
        let (_, action) = d.choose().unwrap();
        assert_eq!(action, RowAction::Edit);
        assert!(matches!(d, DialogState::RowMenu { .. }));
    }
}
