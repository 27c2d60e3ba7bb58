// ── Domain model ──
//
// Field descriptors, the project and organization a form is built from,
// and the routing props that address it. Values stay as JSON: the server
// owns their shape, the form only carries them.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Current, user-editable values keyed by field key, in registry order.
pub type FormData = IndexMap<String, Value>;

/// Server-reported validation messages keyed by field key.
pub type ErrorMap = BTreeMap<String, String>;

// ── Field descriptors ───────────────────────────────────────────────

/// How a field is edited.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FieldKind {
    String,
    Secret,
    Email,
    Url,
    Number,
    Textarea,
    Boolean,
    Choice,
    Range,
}

impl FieldKind {
    /// Parse a wire type name, treating anything unknown as free text.
    pub fn from_wire(kind: &str) -> Self {
        kind.parse().unwrap_or(Self::String)
    }

    /// Whether the value is edited by typing.
    pub fn is_textual(self) -> bool {
        matches!(
            self,
            Self::String | Self::Secret | Self::Email | Self::Url | Self::Number | Self::Textarea
        )
    }
}

/// Client-side label formatter for a field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelFormat {
    /// A duration in hours: `Disabled`, `N hour(s)`, or `N day(s)`.
    Hours,
}

impl LabelFormat {
    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "hours" | "duration" => Some(Self::Hours),
            _ => None,
        }
    }
}

/// One selectable option of a choice field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

impl Choice {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Display and edit metadata for one configuration value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub key: String,
    pub kind: FieldKind,
    pub label: String,
    pub help: Option<String>,
    pub placeholder: Option<String>,
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub step: Option<i64>,
    pub allowed_values: Option<Vec<i64>>,
    pub choices: Vec<Choice>,
    /// Declarative only: nothing is enforced client-side.
    pub required: bool,
    pub default_value: Option<Value>,
    pub format: Option<LabelFormat>,
}

impl FieldDescriptor {
    pub fn new(key: impl Into<String>, kind: FieldKind, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind,
            label: label.into(),
            help: None,
            placeholder: None,
            min: None,
            max: None,
            step: None,
            allowed_values: None,
            choices: Vec::new(),
            required: false,
            default_value: None,
            format: None,
        }
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn range(mut self, min: i64, max: i64, step: i64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self.step = Some(step);
        self
    }

    pub fn allowed_values(mut self, values: Vec<i64>) -> Self {
        self.allowed_values = Some(values);
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn format(mut self, format: LabelFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }
}

// ── Project / organization ──────────────────────────────────────────

/// The project a settings form edits, as handed in by the loader.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Project {
    pub id: Option<String>,
    pub name: String,
    pub slug: String,
    pub security_token: Option<String>,
    /// Slug of the owning team.
    pub team: Option<String>,
    /// Server-supplied field descriptors.
    pub config: Vec<FieldDescriptor>,
    /// Current option values keyed by field key.
    pub options: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Team {
    pub id: String,
    pub slug: String,
    pub name: Option<String>,
    /// Whether the viewing user belongs to this team.
    pub is_member: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Organization {
    pub slug: String,
    pub name: Option<String>,
    pub teams: Vec<Team>,
}

/// A field as echoed back by a successful save.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedField {
    pub name: String,
    pub value: Option<Value>,
    pub default_value: Option<Value>,
}

impl SavedField {
    /// The saved value, falling back to the declared default, then null.
    pub fn resolved(self) -> Value {
        self.value
            .filter(|v| !v.is_null())
            .or(self.default_value)
            .unwrap_or(Value::Null)
    }
}

// ── Routing ─────────────────────────────────────────────────────────

/// Identifiers addressing the project resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteParams {
    pub org_id: String,
    pub project_id: String,
}

impl RouteParams {
    pub fn new(org_id: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            org_id: org_id.into(),
            project_id: project_id.into(),
        }
    }

    /// Parse `org/project`.
    pub fn parse(route: &str) -> Option<Self> {
        let (org, project) = route.trim().trim_matches('/').split_once('/')?;
        if org.is_empty() || project.is_empty() || project.contains('/') {
            return None;
        }
        Some(Self::new(org, project))
    }
}

impl std::fmt::Display for RouteParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.org_id, self.project_id)
    }
}

/// The view's addressed location, used only for change detection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Location {
    pub pathname: String,
    pub search: String,
}

impl Location {
    pub fn new(pathname: impl Into<String>, search: impl Into<String>) -> Self {
        Self {
            pathname: pathname.into(),
            search: search.into(),
        }
    }

    /// The canonical settings location for a route.
    pub fn for_route(params: &RouteParams) -> Self {
        Self::new(
            format!("/{}/{}/settings/", params.org_id, params.project_id),
            String::new(),
        )
    }
}

/// Everything a settings view is rendered from.
#[derive(Debug, Clone, PartialEq)]
pub struct Props {
    pub project: Project,
    pub organization: Organization,
    pub params: RouteParams,
    pub location: Location,
}
