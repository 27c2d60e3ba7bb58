// ── Form state ──
//
// The settings form as a value: registry, current and pristine data, and
// per-field errors. Every transition goes through `FormState::reduce`,
// which consumes one revision and returns the next.

use serde_json::Value;
use tracing::debug;

use crate::model::{ErrorMap, FormData, Project, SavedField};
use crate::registry::{self, Registry};

/// Where the form is in its save cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display)]
pub enum SubmitPhase {
    #[default]
    Idle,
    Submitting,
}

/// A transition of the form state.
#[derive(Debug, Clone, PartialEq)]
pub enum FormMsg {
    /// Rebuild everything from a freshly loaded project.
    Initialize(Project),
    /// Set one field's value and drop its error.
    ChangeField { key: String, value: Value },
    SubmitStarted,
    /// The server accepted the save and echoed these fields back.
    SubmitSucceeded(Vec<SavedField>),
    /// The save failed; `errors` is the structured map, when there was one.
    SubmitFailed { errors: Option<ErrorMap> },
    /// Runs after every submit outcome.
    SubmitCompleted,
    /// Discard local edits.
    Reset,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    /// True until the first `Initialize`.
    pub loading: bool,
    pub fields: Registry,
    pub initial_data: FormData,
    pub form_data: FormData,
    pub errors: ErrorMap,
    pub phase: SubmitPhase,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            loading: true,
            fields: Registry::new(),
            initial_data: FormData::new(),
            form_data: FormData::new(),
            errors: ErrorMap::new(),
            phase: SubmitPhase::Idle,
        }
    }
}

impl FormState {
    /// Fresh state for a project: registry merged, data and snapshot equal.
    pub fn initialize(project: &Project) -> Self {
        let fields = registry::build(project);
        let form_data = registry::initial_values(&fields, project);
        debug!(slug = %project.slug, fields = fields.len(), "form initialized");
        Self {
            loading: false,
            initial_data: form_data.clone(),
            form_data,
            fields,
            errors: ErrorMap::new(),
            phase: SubmitPhase::Idle,
        }
    }

    /// Apply one transition.
    #[must_use]
    pub fn reduce(mut self, msg: FormMsg) -> Self {
        match msg {
            FormMsg::Initialize(project) => return Self::initialize(&project),
            FormMsg::ChangeField { key, value } => {
                if let Some(slot) = self.form_data.get_mut(&key) {
                    *slot = value;
                    self.errors.remove(&key);
                } else {
                    debug!(key = %key, "ignoring change to unknown field");
                }
            }
            FormMsg::SubmitStarted => self.phase = SubmitPhase::Submitting,
            FormMsg::SubmitSucceeded(saved) => {
                for field in saved {
                    match self.form_data.get_mut(&field.name) {
                        Some(slot) => *slot = field.resolved(),
                        None => debug!(name = %field.name, "ignoring unknown saved field"),
                    }
                }
                self.initial_data = self.form_data.clone();
                self.errors.clear();
            }
            FormMsg::SubmitFailed { errors } => {
                self.errors = errors.unwrap_or_default();
            }
            FormMsg::SubmitCompleted => self.phase = SubmitPhase::Idle,
            FormMsg::Reset => {
                self.form_data = self.initial_data.clone();
                self.errors.clear();
            }
        }
        self
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == SubmitPhase::Submitting
    }

    /// Whether any field differs from the last loaded or saved value.
    pub fn is_dirty(&self) -> bool {
        self.form_data
            .iter()
            .any(|(key, value)| self.initial_data.get(key) != Some(value))
    }

    /// Keys of fields that differ from the last loaded or saved value.
    pub fn dirty_keys(&self) -> Vec<&str> {
        self.form_data
            .iter()
            .filter(|(key, value)| self.initial_data.get(*key) != Some(*value))
            .map(|(key, _)| key.as_str())
            .collect()
    }

    pub fn value(&self, key: &str) -> Option<&Value> {
        self.form_data.get(key)
    }

    pub fn error(&self, key: &str) -> Option<&str> {
        self.errors.get(key).map(String::as_str)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{FieldDescriptor, FieldKind};
    use crate::registry::{AUTO_RESOLVE_KEY, NAME_KEY, SLUG_KEY};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn project() -> Project {
        let mut options = serde_json::Map::new();
        options.insert("mail:subject_prefix".into(), json!("[be]"));
        options.insert(AUTO_RESOLVE_KEY.into(), json!(0));
        Project {
            id: Some("1".into()),
            name: "Backend".into(),
            slug: "backend".into(),
            security_token: Some("abc".into()),
            team: Some("core".into()),
            config: vec![
                FieldDescriptor::new("mail:subject_prefix", FieldKind::String, "Subject prefix"),
                FieldDescriptor::new("sentry:scrub_data", FieldKind::Boolean, "Data scrubber")
                    .default_value(json!(true)),
            ],
            options,
        }
    }

    fn change(key: &str, value: Value) -> FormMsg {
        FormMsg::ChangeField {
            key: key.into(),
            value,
        }
    }

    fn errors(pairs: &[(&str, &str)]) -> ErrorMap {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn default_state_is_loading() {
        let state = FormState::default();
        assert!(state.loading);
        assert!(state.form_data.is_empty());
    }

    #[test]
    fn initialize_sets_equal_snapshots() {
        let state = FormState::default().reduce(FormMsg::Initialize(project()));
        assert!(!state.loading);
        assert_eq!(state.form_data, state.initial_data);
        assert!(state.errors.is_empty());
        assert_eq!(state.phase, SubmitPhase::Idle);
        assert_eq!(
            state.fields.keys().collect::<Vec<_>>(),
            state.form_data.keys().collect::<Vec<_>>()
        );
        assert!(!state.is_dirty());
    }

    #[test]
    fn change_field_updates_value_and_clears_its_error() {
        let mut state = FormState::initialize(&project());
        state.errors = errors(&[(SLUG_KEY, "taken"), (NAME_KEY, "too long")]);

        let state = state.reduce(change(SLUG_KEY, json!("api")));
        assert_eq!(state.value(SLUG_KEY), Some(&json!("api")));
        assert_eq!(state.error(SLUG_KEY), None);
        assert_eq!(state.error(NAME_KEY), Some("too long"));
        assert_eq!(state.initial_data[SLUG_KEY], json!("backend"));
        assert_eq!(state.dirty_keys(), vec![SLUG_KEY]);
    }

    #[test]
    fn change_field_ignores_unknown_keys() {
        let before = FormState::initialize(&project());
        let after = before.clone().reduce(change("nope", json!(1)));
        assert_eq!(before, after);
    }

    #[test]
    fn success_adopts_returned_values() {
        let state = FormState::initialize(&project())
            .reduce(change(NAME_KEY, json!("Renamed")))
            .reduce(change(AUTO_RESOLVE_KEY, json!(24)))
            .reduce(FormMsg::SubmitStarted);
        assert!(state.is_submitting());

        let saved = vec![
            SavedField {
                name: AUTO_RESOLVE_KEY.into(),
                value: Some(json!(48)),
                default_value: None,
            },
            SavedField {
                name: "sentry:scrub_data".into(),
                value: None,
                default_value: Some(json!(false)),
            },
            SavedField {
                name: "mail:subject_prefix".into(),
                value: None,
                default_value: None,
            },
            SavedField {
                name: "not:in_registry".into(),
                value: Some(json!(1)),
                default_value: None,
            },
        ];
        let state = state
            .reduce(FormMsg::SubmitSucceeded(saved))
            .reduce(FormMsg::SubmitCompleted);

        assert_eq!(state.form_data[AUTO_RESOLVE_KEY], json!(48));
        assert_eq!(state.form_data["sentry:scrub_data"], json!(false));
        assert_eq!(state.form_data["mail:subject_prefix"], Value::Null);
        // keys missing from the response keep the submitted value
        assert_eq!(state.form_data[NAME_KEY], json!("Renamed"));
        assert!(!state.form_data.contains_key("not:in_registry"));
        assert_eq!(state.form_data, state.initial_data);
        assert!(state.errors.is_empty());
        assert_eq!(state.phase, SubmitPhase::Idle);
    }

    #[test]
    fn failure_replaces_errors_and_keeps_data() {
        let mut state = FormState::initialize(&project()).reduce(change(SLUG_KEY, json!("x y")));
        state.errors = errors(&[(NAME_KEY, "stale")]);
        let before = state.form_data.clone();

        let state = state
            .reduce(FormMsg::SubmitStarted)
            .reduce(FormMsg::SubmitFailed {
                errors: Some(errors(&[(SLUG_KEY, "Enter a valid slug.")])),
            })
            .reduce(FormMsg::SubmitCompleted);

        assert_eq!(state.errors, errors(&[(SLUG_KEY, "Enter a valid slug.")]));
        assert_eq!(state.form_data, before);
        assert_eq!(state.initial_data[SLUG_KEY], json!("backend"));
        assert_eq!(state.phase, SubmitPhase::Idle);
    }

    #[test]
    fn editing_after_a_rejected_save_clears_only_that_error() {
        let state = FormState::initialize(&project())
            .reduce(change(SLUG_KEY, json!("web")))
            .reduce(FormMsg::SubmitStarted)
            .reduce(FormMsg::SubmitFailed {
                errors: Some(errors(&[
                    (SLUG_KEY, "already taken"),
                    ("mail:subject_prefix", "too long"),
                ])),
            })
            .reduce(FormMsg::SubmitCompleted);
        assert_eq!(state.error(SLUG_KEY), Some("already taken"));
        let before = state.form_data.clone();

        let state = state.reduce(change(SLUG_KEY, json!("web-2")));

        assert_eq!(state.error(SLUG_KEY), None);
        assert_eq!(state.error("mail:subject_prefix"), Some("too long"));
        assert_eq!(state.form_data[SLUG_KEY], json!("web-2"));
        for (key, value) in &before {
            if key != SLUG_KEY {
                assert_eq!(state.form_data.get(key), Some(value), "{key} changed");
            }
        }
        assert_eq!(state.initial_data[SLUG_KEY], json!("backend"));
    }

    #[test]
    fn failure_without_structured_errors_clears_the_map() {
        let mut state = FormState::initialize(&project());
        state.errors = errors(&[(NAME_KEY, "stale")]);
        let state = state.reduce(FormMsg::SubmitFailed { errors: None });
        assert!(state.errors.is_empty());
    }

    #[test]
    fn reset_restores_snapshot() {
        let state = FormState::initialize(&project())
            .reduce(change(NAME_KEY, json!("Other")))
            .reduce(FormMsg::Reset);
        assert!(!state.is_dirty());
        assert_eq!(state.form_data[NAME_KEY], json!("Backend"));
    }

    #[test]
    fn reinitialize_discards_everything() {
        let mut state = FormState::initialize(&project())
            .reduce(change(NAME_KEY, json!("Other")))
            .reduce(FormMsg::SubmitStarted);
        state.errors = errors(&[(NAME_KEY, "bad")]);

        let state = state.reduce(FormMsg::Initialize(project()));
        assert_eq!(state, FormState::initialize(&project()));
    }
}
