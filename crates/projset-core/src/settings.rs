// ── Project settings controller ──
//
// Owns the props a settings view is rendered from plus its form state,
// and drives the submit cycle against an injected `SettingsApi`. Front
// ends either call `submit` directly (CLI) or split it into
// `begin_submit` / `finish_submit` around a spawned task (TUI).

use async_trait::async_trait;
use futures_util::future::try_join;
use serde_json::Value;
use tracing::{debug, info, warn};

use projset_api::ProjectClient;

use crate::error::CoreError;
use crate::form::{FormMsg, FormState};
use crate::layout::{self, RenderedSection};
use crate::model::{FormData, Location, Organization, Project, Props, RouteParams, SavedField};

// ── API seam ────────────────────────────────────────────────────────

/// Remote operations the settings form depends on.
#[async_trait]
pub trait SettingsApi: Send + Sync {
    /// Fetch the project and its organization.
    async fn load(&self, params: &RouteParams) -> Result<(Project, Organization), CoreError>;

    /// Send the full form data as an update; returns the saved fields.
    async fn save(
        &self,
        params: &RouteParams,
        data: &FormData,
    ) -> Result<Vec<SavedField>, CoreError>;
}

#[async_trait]
impl SettingsApi for ProjectClient {
    async fn load(&self, params: &RouteParams) -> Result<(Project, Organization), CoreError> {
        let (project, organization) = try_join(
            self.get_project(&params.org_id, &params.project_id),
            self.get_organization(&params.org_id),
        )
        .await?;
        Ok((project.into(), organization.into()))
    }

    async fn save(
        &self,
        params: &RouteParams,
        data: &FormData,
    ) -> Result<Vec<SavedField>, CoreError> {
        let response = self
            .update_project(&params.org_id, &params.project_id, data)
            .await?;
        Ok(response.config.into_iter().map(SavedField::from).collect())
    }
}

/// Load everything a settings view needs for `params`.
pub async fn load_props(
    api: &(impl SettingsApi + ?Sized),
    params: RouteParams,
) -> Result<Props, CoreError> {
    let (project, organization) = api.load(&params).await?;
    Ok(Props {
        project,
        organization,
        location: Location::for_route(&params),
        params,
    })
}

// ── Submit bookkeeping ──────────────────────────────────────────────

/// A save that has been started and must be finished with its outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitRequest {
    pub params: RouteParams,
    pub data: FormData,
    /// Form revision the request was taken from.
    pub revision: u64,
}

/// What a finished save did to the form.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Saved; the returned values are now the form's data and snapshot.
    Saved,
    /// Failed; the form's error map holds whatever field errors came back.
    Failed(CoreError),
    /// The form was rebuilt while the request was in flight; nothing applied.
    Discarded,
}

impl SubmitOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved)
    }
}

// ── Controller ──────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ProjectSettings {
    props: Props,
    state: FormState,
    revision: u64,
}

impl ProjectSettings {
    pub fn new(props: Props) -> Self {
        let state = FormState::default().reduce(FormMsg::Initialize(props.project.clone()));
        Self {
            props,
            state,
            revision: 0,
        }
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Adopt new props. A different pathname or search rebuilds the form from
    /// scratch; otherwise edits, errors, and any in-flight save are kept.
    ///
    /// Returns whether the form was rebuilt.
    pub fn receive_props(&mut self, next: Props) -> bool {
        let moved = next.location != self.props.location;
        if moved {
            debug!(
                from = %self.props.location.pathname,
                to = %next.location.pathname,
                "location changed, rebuilding form"
            );
            self.apply(FormMsg::Initialize(next.project.clone()));
            self.revision += 1;
        }
        self.props = next;
        moved
    }

    /// Set one field. Unknown keys leave the form untouched.
    pub fn change_field(&mut self, key: &str, value: Value) -> Result<(), CoreError> {
        if !self.state.fields.contains_key(key) {
            return Err(CoreError::UnknownField { key: key.into() });
        }
        self.apply(FormMsg::ChangeField {
            key: key.into(),
            value,
        });
        Ok(())
    }

    /// Discard local edits and errors.
    pub fn reset(&mut self) {
        self.apply(FormMsg::Reset);
    }

    /// Path of the resource a save is sent to.
    pub fn endpoint(&self) -> String {
        format!(
            "/projects/{}/{}/",
            self.props.params.org_id, self.props.params.project_id
        )
    }

    /// Mark a save as started and snapshot what to send.
    ///
    /// A second save while one is in flight is refused; only the first
    /// request's outcome is ever applied.
    pub fn begin_submit(&mut self) -> Result<SubmitRequest, CoreError> {
        if self.state.loading {
            return Err(CoreError::ProjectNotLoaded);
        }
        if self.state.is_submitting() {
            return Err(CoreError::SubmitInFlight);
        }
        self.apply(FormMsg::SubmitStarted);
        debug!(endpoint = %self.endpoint(), "submitting settings");
        Ok(SubmitRequest {
            params: self.props.params.clone(),
            data: self.state.form_data.clone(),
            revision: self.revision,
        })
    }

    /// Apply a save's result, then return to idle.
    pub fn finish_submit(
        &mut self,
        revision: u64,
        result: Result<Vec<SavedField>, CoreError>,
    ) -> SubmitOutcome {
        if revision != self.revision {
            debug!(revision, current = self.revision, "discarding stale save result");
            return SubmitOutcome::Discarded;
        }
        let outcome = match result {
            Ok(saved) => {
                info!(fields = saved.len(), "settings saved");
                self.apply(FormMsg::SubmitSucceeded(saved));
                SubmitOutcome::Saved
            }
            Err(err) => {
                let errors = match &err {
                    CoreError::Rejected { errors } => Some(errors.clone()),
                    _ => None,
                };
                warn!(error = %err, "settings save failed");
                self.apply(FormMsg::SubmitFailed { errors });
                SubmitOutcome::Failed(err)
            }
        };
        self.apply(FormMsg::SubmitCompleted);
        outcome
    }

    /// Run a whole save cycle against `api`.
    pub async fn submit(
        &mut self,
        api: &(impl SettingsApi + ?Sized),
    ) -> Result<SubmitOutcome, CoreError> {
        let request = self.begin_submit()?;
        let result = api.save(&request.params, &request.data).await;
        Ok(self.finish_submit(request.revision, result))
    }

    /// The sectioned view of the current state.
    pub fn sections(&self) -> Vec<RenderedSection> {
        layout::render_sections(&self.state, &self.props.organization)
    }

    fn apply(&mut self, msg: FormMsg) {
        let state = std::mem::take(&mut self.state);
        self.state = state.reduce(msg);
    }
}
