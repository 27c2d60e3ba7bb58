// ── Section layout ──
//
// Which fields the settings form shows, grouped under headings, and the
// per-field view model front ends draw from.

use serde::Serialize;
use serde_json::Value;

use crate::form::FormState;
use crate::model::{FieldDescriptor, Organization};
use crate::registry::{self, AUTO_RESOLVE_KEY, SECURITY_TOKEN_KEY, TEAM_KEY};

/// A heading and the field keys listed under it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub title: &'static str,
    /// Shown before the fields.
    pub intro: Option<&'static str>,
    /// Shown after the fields.
    pub note: Option<&'static str>,
    pub keys: &'static [&'static str],
}

pub const SECTIONS: &[Section] = &[
    Section {
        title: "Project Details",
        intro: None,
        note: None,
        keys: &["name", "slug", TEAM_KEY],
    },
    Section {
        title: "Email",
        intro: None,
        note: None,
        keys: &["mail:subject_prefix"],
    },
    Section {
        title: "Event Settings",
        intro: None,
        note: Some(
            "Note: Enabling auto resolve will immediately resolve anything that has not \
             been seen within this period of time. There is no undo!",
        ),
        keys: &["sentry:default_environment", AUTO_RESOLVE_KEY],
    },
    Section {
        title: "Data Privacy",
        intro: None,
        note: None,
        keys: &[
            "sentry:scrub_data",
            "sentry:scrub_defaults",
            "sentry:sensitive_fields",
            "sentry:safe_fields",
            "sentry:scrub_ip_address",
        ],
    },
    Section {
        title: "Client Security",
        intro: Some(
            "Configure origin URLs which events should be accepted from. This is used for \
             communication with browser clients. This will restrict requests based on the \
             Origin and Referer headers.",
        ),
        note: None,
        keys: &[
            "sentry:origins",
            "sentry:scrape_javascript",
            SECURITY_TOKEN_KEY,
            "sentry:blacklisted_ips",
        ],
    },
];

/// One field as it should be drawn right now.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedField {
    pub descriptor: FieldDescriptor,
    pub value: Value,
    pub error: Option<String>,
    /// Differs from the last loaded or saved value.
    pub dirty: bool,
}

impl RenderedField {
    pub fn key(&self) -> &str {
        &self.descriptor.key
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedSection {
    pub title: &'static str,
    pub intro: Option<&'static str>,
    pub note: Option<&'static str>,
    pub fields: Vec<RenderedField>,
}

/// View model for one field, or `None` when it should not be drawn.
///
/// Keys outside the registry are absent. The team field takes its choices
/// from the viewer's teams and is hidden when there is exactly one.
pub fn render_field(
    state: &FormState,
    organization: &Organization,
    key: &str,
) -> Option<RenderedField> {
    let mut descriptor = state.fields.get(key)?.clone();
    if key == TEAM_KEY {
        descriptor.choices = registry::team_choices(organization);
        if descriptor.choices.len() == 1 {
            return None;
        }
    }
    Some(RenderedField {
        value: state.value(key).cloned().unwrap_or(Value::Null),
        error: state.error(key).map(str::to_owned),
        dirty: state.initial_data.get(key) != state.form_data.get(key),
        descriptor,
    })
}

/// Every section, with only the fields that render.
pub fn render_sections(state: &FormState, organization: &Organization) -> Vec<RenderedSection> {
    SECTIONS
        .iter()
        .map(|section| RenderedSection {
            title: section.title,
            intro: section.intro,
            note: section.note,
            fields: section
                .keys
                .iter()
                .filter_map(|key| render_field(state, organization, key))
                .collect(),
        })
        .collect()
}
