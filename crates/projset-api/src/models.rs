// Wire types for the project settings API
//
// These mirror the JSON the server sends and receives. `projset-core`
// converts them into domain types; nothing here carries UI meaning.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// `GET /projects/{org}/{project}/`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetails {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub id: Option<String>,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub security_token: Option<String>,
    #[serde(default)]
    pub team: Option<TeamSummary>,
    /// Server-supplied field descriptors for the configurable options.
    #[serde(default)]
    pub config: Vec<ConfigField>,
    /// Current option values keyed by field name.
    #[serde(default)]
    pub options: Map<String, Value>,
    #[serde(default)]
    pub organization: Option<OrganizationDetails>,
}

/// One configuration descriptor as the server describes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigField {
    pub name: String,
    #[serde(rename = "type", default = "default_field_type")]
    pub kind: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub help: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub min: Option<i64>,
    #[serde(default)]
    pub max: Option<i64>,
    #[serde(default)]
    pub step: Option<i64>,
    #[serde(default)]
    pub allowed_values: Option<Vec<i64>>,
    /// `[value, label]` pairs for choice fields.
    #[serde(default)]
    pub choices: Vec<(Value, String)>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, alias = "default")]
    pub default_value: Option<Value>,
    /// Named label formatter (e.g. `"hours"`), when the server sends one.
    #[serde(default)]
    pub format_label: Option<String>,
}

fn default_field_type() -> String {
    "string".into()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSummary {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub slug: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_member: bool,
}

/// `GET /organizations/{org}/`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationDetails {
    pub slug: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub teams: Vec<TeamSummary>,
}

/// Body returned by a successful `PUT /projects/{org}/{project}/`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateResponse {
    #[serde(default)]
    pub config: Vec<ConfigValue>,
}

/// A saved field as echoed back by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigValue {
    pub name: String,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub default_value: Option<Value>,
}

/// Body of a failed request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub errors: Option<BTreeMap<String, ErrorMessage>>,
    #[serde(default)]
    pub detail: Option<String>,
}

/// A field error is either one message or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ErrorMessage {
    One(String),
    Many(Vec<String>),
}

impl ErrorMessage {
    pub fn into_text(self) -> String {
        match self {
            Self::One(msg) => msg,
            Self::Many(msgs) => msgs.join(" "),
        }
    }
}

impl ErrorBody {
    /// Extract per-field errors from a failure body.
    ///
    /// Prefers the `errors` envelope. A 400 without one is read as a bare
    /// field → message(s) map, the shape form serializers reply with;
    /// request-level keys such as `detail` are not field errors.
    pub fn field_errors(body: &str, status: u16) -> Option<BTreeMap<String, String>> {
        if let Ok(ErrorBody {
            errors: Some(errors),
            ..
        }) = serde_json::from_str::<ErrorBody>(body)
        {
            return Some(flatten(errors));
        }
        if status != 400 {
            return None;
        }
        serde_json::from_str::<BTreeMap<String, ErrorMessage>>(body)
            .ok()
            .map(|mut map| {
                map.retain(|key, _| !NON_FIELD_KEYS.contains(&key.as_str()));
                map
            })
            .filter(|map| !map.is_empty())
            .map(flatten)
    }

    /// Human-readable summary of a failure body.
    pub fn detail(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.detail)
    }
}

/// Keys of a bare error map that describe the request, not a field.
const NON_FIELD_KEYS: &[&str] = &["detail", "non_field_errors"];

fn flatten(errors: BTreeMap<String, ErrorMessage>) -> BTreeMap<String, String> {
    errors
        .into_iter()
        .map(|(field, msg)| (field, msg.into_text()))
        .collect()
}

fn string_or_number<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    match Value::deserialize(de)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

fn opt_string_or_number<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    match Option::<Value>::deserialize(de)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_errors_prefers_envelope() {
        let body = json!({ "errors": { "slug": "already taken" } }).to_string();
        let errors = ErrorBody::field_errors(&body, 400).unwrap();
        assert_eq!(errors.get("slug").map(String::as_str), Some("already taken"));
    }

    #[test]
    fn field_errors_joins_message_lists() {
        let body = json!({ "slug": ["Too long.", "Bad characters."] }).to_string();
        let errors = ErrorBody::field_errors(&body, 400).unwrap();
        assert_eq!(errors["slug"], "Too long. Bad characters.");
    }

    #[test]
    fn bare_maps_only_count_on_bad_request() {
        let body = json!({ "slug": "nope" }).to_string();
        assert!(ErrorBody::field_errors(&body, 500).is_none());
        assert!(ErrorBody::field_errors("<html>", 400).is_none());
    }

    #[test]
    fn request_level_messages_are_not_field_errors() {
        let body = json!({ "detail": "Invalid request" }).to_string();
        assert!(ErrorBody::field_errors(&body, 400).is_none());
        assert_eq!(ErrorBody::detail(&body).as_deref(), Some("Invalid request"));

        let body = json!({ "non_field_errors": ["Bad payload"], "slug": "nope" }).to_string();
        let errors = ErrorBody::field_errors(&body, 400).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["slug"], "nope");
    }

    #[test]
    fn team_ids_accept_numbers() {
        let team: TeamSummary =
            serde_json::from_value(json!({ "id": 7, "slug": "ops", "isMember": true })).unwrap();
        assert_eq!(team.id, "7");
        assert!(team.is_member);
    }

    #[test]
    fn config_field_defaults() {
        let field: ConfigField = serde_json::from_value(json!({
            "name": "sentry:resolve_age",
            "type": "range",
            "allowedValues": [0, 1, 2],
            "default": 0
        }))
        .unwrap();
        assert_eq!(field.kind, "range");
        assert_eq!(field.allowed_values, Some(vec![0, 1, 2]));
        assert_eq!(field.default_value, Some(json!(0)));
        assert!(!field.required);
    }
}
