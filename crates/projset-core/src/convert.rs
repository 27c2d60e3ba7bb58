// ── API-to-domain type conversions ──
//
// Bridges raw `projset_api` wire types into `projset_core::model` domain
// types. Field kinds and label formatters are parsed from their wire names,
// choice values are flattened to strings, and the project's team is
// reduced to its slug.

use serde_json::Value;

use projset_api::{
    ConfigField, ConfigValue, OrganizationDetails, ProjectDetails, TeamSummary,
};

use crate::model::{
    Choice, FieldDescriptor, FieldKind, LabelFormat, Organization, Project, SavedField, Team,
};

// ── Helpers ────────────────────────────────────────────────────────

/// Text form of a choice value; strings stay bare, everything else is JSON.
fn choice_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Humanize a field key when the server sends no label.
fn label_from_key(key: &str) -> String {
    let base = key.rsplit(':').next().unwrap_or(key);
    let mut label = base.replace('_', " ");
    if let Some(first) = label.get(..1) {
        let upper = first.to_uppercase();
        label.replace_range(..1, &upper);
    }
    label
}

// ── Descriptors ────────────────────────────────────────────────────

impl From<ConfigField> for FieldDescriptor {
    fn from(f: ConfigField) -> Self {
        let kind = if f.choices.is_empty() {
            FieldKind::from_wire(&f.kind)
        } else {
            FieldKind::Choice
        };
        Self {
            label: f.label.unwrap_or_else(|| label_from_key(&f.name)),
            key: f.name,
            kind,
            help: f.help,
            placeholder: f.placeholder,
            min: f.min,
            max: f.max,
            step: f.step,
            allowed_values: f.allowed_values,
            choices: f
                .choices
                .iter()
                .map(|(value, label)| Choice::new(choice_value(value), label.clone()))
                .collect(),
            required: f.required,
            default_value: f.default_value,
            format: f.format_label.as_deref().and_then(LabelFormat::from_wire),
        }
    }
}

// ── Project / organization ─────────────────────────────────────────

impl From<TeamSummary> for Team {
    fn from(t: TeamSummary) -> Self {
        Self {
            id: t.id,
            slug: t.slug,
            name: t.name,
            is_member: t.is_member,
        }
    }
}

impl From<OrganizationDetails> for Organization {
    fn from(o: OrganizationDetails) -> Self {
        Self {
            slug: o.slug,
            name: o.name,
            teams: o.teams.into_iter().map(Team::from).collect(),
        }
    }
}

impl From<ProjectDetails> for Project {
    fn from(p: ProjectDetails) -> Self {
        Self {
            id: p.id,
            name: p.name,
            slug: p.slug,
            security_token: p.security_token,
            team: p.team.map(|t| t.slug),
            config: p.config.into_iter().map(FieldDescriptor::from).collect(),
            options: p.options,
        }
    }
}

// ── Save response ──────────────────────────────────────────────────

impl From<ConfigValue> for SavedField {
    fn from(v: ConfigValue) -> Self {
        Self {
            name: v.name,
            value: v.value,
            default_value: v.default_value,
        }
    }
}
