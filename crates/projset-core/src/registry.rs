// ── Field registry ──
//
// Static descriptors for the project's identity fields, merged with the
// descriptors the server supplies for its configurable options.

use indexmap::IndexMap;
use serde_json::Value;

use crate::model::{
    Choice, FieldDescriptor, FieldKind, FormData, LabelFormat, Organization, Project,
};

/// Field key → descriptor, in render order.
pub type Registry = IndexMap<String, FieldDescriptor>;

pub const NAME_KEY: &str = "name";
pub const SLUG_KEY: &str = "slug";
pub const TEAM_KEY: &str = "team";
pub const SECURITY_TOKEN_KEY: &str = "securityToken";
pub const AUTO_RESOLVE_KEY: &str = "sentry:resolve_age";

/// Largest auto-resolve window, in hours (one week).
pub const AUTO_RESOLVE_MAX_HOURS: i64 = 168;

/// Selectable detents of the auto-resolve range control.
///
/// Hourly up to half a day, then progressively coarser steps up to a week.
pub fn auto_resolve_values() -> Vec<i64> {
    let mut values = Vec::new();
    let mut hours = 0;
    while hours <= AUTO_RESOLVE_MAX_HOURS {
        values.push(hours);
        hours += match hours {
            0..12 => 1,
            12..24 => 3,
            24..36 => 6,
            36..48 => 12,
            _ => 24,
        };
    }
    values
}

/// Render an hour count as `Disabled`, `N day(s)`, or `N hour(s)`.
pub fn format_hours(hours: i64) -> String {
    if hours == 0 {
        return "Disabled".into();
    }
    let (n, unit) = if hours > 23 && hours % 24 == 0 {
        (hours / 24, "day")
    } else {
        (hours, "hour")
    };
    let plural = if n == 1 { "" } else { "s" };
    format!("{n} {unit}{plural}")
}

/// The client-side descriptors every project form starts from.
pub fn static_defaults() -> Registry {
    [
        FieldDescriptor::new(NAME_KEY, FieldKind::String, "Project name")
            .placeholder("e.g. My Service Name"),
        FieldDescriptor::new(SLUG_KEY, FieldKind::String, "Short name")
            .help("A unique ID used to identify this project."),
        FieldDescriptor::new(TEAM_KEY, FieldKind::Choice, "Team"),
        FieldDescriptor::new(AUTO_RESOLVE_KEY, FieldKind::Range, "Auto resolve")
            .help("Automatically resolve an issue if it hasn't been seen for this amount of time.")
            .range(0, AUTO_RESOLVE_MAX_HOURS, 1)
            .allowed_values(auto_resolve_values())
            .format(LabelFormat::Hours)
            .required(false),
        FieldDescriptor::new(SECURITY_TOKEN_KEY, FieldKind::String, "Security token")
            .help(
                "Outbound requests matching Allowed Domains will have the header \
                 \"X-Sentry-Token: {token}\" appended.",
            )
            .required(false),
    ]
    .into_iter()
    .map(|d| (d.key.clone(), d))
    .collect()
}

/// Merge server-supplied descriptors over the static defaults.
///
/// A server entry replaces the static entry with the same key, and new keys
/// are appended in server order. The wire cannot carry a label formatter,
/// so a static formatter survives when the replacing entry has none; the
/// static allowed values survive the same way.
pub fn merge_descriptors(
    mut static_defaults: Registry,
    server: impl IntoIterator<Item = FieldDescriptor>,
) -> Registry {
    for mut descriptor in server {
        if let Some(existing) = static_defaults.get(&descriptor.key) {
            if descriptor.format.is_none() {
                descriptor.format = existing.format;
            }
            if descriptor.allowed_values.is_none() {
                descriptor.allowed_values.clone_from(&existing.allowed_values);
            }
        }
        static_defaults.insert(descriptor.key.clone(), descriptor);
    }
    static_defaults
}

/// Build the unified registry for a project.
pub fn build(project: &Project) -> Registry {
    merge_descriptors(static_defaults(), project.config.iter().cloned())
}

/// Initial value for every registry key.
///
/// Identity fields come from the project itself; everything else from the
/// project's option values, falling back to the descriptor default.
pub fn initial_values(registry: &Registry, project: &Project) -> FormData {
    registry
        .iter()
        .map(|(key, descriptor)| {
            let current = match key.as_str() {
                NAME_KEY => Some(Value::String(project.name.clone())),
                SLUG_KEY => Some(Value::String(project.slug.clone())),
                SECURITY_TOKEN_KEY => project.security_token.clone().map(Value::String),
                TEAM_KEY => project.team.clone().map(Value::String),
                _ => project.options.get(key).cloned(),
            };
            let value = current
                .filter(|v| !v.is_null())
                .or_else(|| descriptor.default_value.clone())
                .unwrap_or(Value::Null);
            (key.clone(), value)
        })
        .collect()
}

/// Teams the viewer belongs to, as choices for the team field.
pub fn team_choices(organization: &Organization) -> Vec<Choice> {
    organization
        .teams
        .iter()
        .filter(|team| team.is_member)
        .map(|team| Choice::new(team.slug.clone(), team.slug.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Team;
    use crate::value::step_range;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn project() -> Project {
        let mut options = serde_json::Map::new();
        options.insert("mail:subject_prefix".into(), json!("[backend]"));
        options.insert(AUTO_RESOLVE_KEY.into(), json!(48));
        Project {
            id: Some("2".into()),
            name: "Backend".into(),
            slug: "backend".into(),
            security_token: Some("tok".into()),
            team: Some("core".into()),
            config: vec![
                FieldDescriptor::new("mail:subject_prefix", FieldKind::String, "Subject prefix"),
                FieldDescriptor::new(AUTO_RESOLVE_KEY, FieldKind::Range, "Auto resolve")
                    .range(0, 168, 1),
                FieldDescriptor::new("sentry:scrub_data", FieldKind::Boolean, "Data scrubber")
                    .default_value(json!(true)),
            ],
            options,
        }
    }

    #[test]
    fn auto_resolve_detents() {
        let values = auto_resolve_values();
        assert_eq!(
            values,
            vec![
                0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 15, 18, 21, 24, 30, 36, 48, 72, 96, 120,
                144, 168
            ]
        );
        assert_eq!(values.len(), 25);
    }

    #[test]
    fn auto_resolve_detents_are_strictly_increasing() {
        let values = auto_resolve_values();
        assert_eq!(values.first(), Some(&0));
        assert_eq!(values.last(), Some(&168));
        assert!(values.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn hour_labels() {
        assert_eq!(format_hours(0), "Disabled");
        assert_eq!(format_hours(1), "1 hour");
        assert_eq!(format_hours(5), "5 hours");
        assert_eq!(format_hours(24), "1 day");
        assert_eq!(format_hours(48), "2 days");
        assert_eq!(format_hours(36), "36 hours");
        assert_eq!(format_hours(168), "7 days");
    }

    #[test]
    fn server_descriptors_take_precedence() {
        let server = vec![
            FieldDescriptor::new(NAME_KEY, FieldKind::String, "Display name"),
            FieldDescriptor::new("sentry:origins", FieldKind::Textarea, "Allowed domains"),
        ];
        let merged = merge_descriptors(static_defaults(), server);

        assert_eq!(merged[NAME_KEY].label, "Display name");
        assert_eq!(merged[SLUG_KEY].label, "Short name");
        assert_eq!(
            merged.keys().last().map(String::as_str),
            Some("sentry:origins")
        );
    }

    #[test]
    fn merge_keeps_static_formatter_and_detents() {
        let server = vec![FieldDescriptor::new(AUTO_RESOLVE_KEY, FieldKind::Range, "Resolve after")];
        let merged = merge_descriptors(static_defaults(), server);

        let field = &merged[AUTO_RESOLVE_KEY];
        assert_eq!(field.label, "Resolve after");
        assert_eq!(field.format, Some(LabelFormat::Hours));
        assert_eq!(field.allowed_values, Some(auto_resolve_values()));
    }

    #[test]
    fn server_range_without_detents_still_steps_by_detent() {
        let mut project = project();
        project.config = vec![
            FieldDescriptor::new(AUTO_RESOLVE_KEY, FieldKind::Range, "Auto resolve")
                .range(0, 168, 1),
        ];
        let registry = build(&project);
        let field = &registry[AUTO_RESOLVE_KEY];

        assert_eq!(field.allowed_values, Some(auto_resolve_values()));
        assert_eq!(step_range(field, &json!(12), true), json!(15));
        assert_eq!(step_range(field, &json!(48), false), json!(36));
    }

    #[test]
    fn server_detents_win_over_static_ones() {
        let server = vec![
            FieldDescriptor::new(AUTO_RESOLVE_KEY, FieldKind::Range, "Auto resolve")
                .allowed_values(vec![0, 24]),
        ];
        let merged = merge_descriptors(static_defaults(), server);
        assert_eq!(merged[AUTO_RESOLVE_KEY].allowed_values, Some(vec![0, 24]));
    }

    #[test]
    fn every_registry_key_gets_an_initial_value() {
        let project = project();
        let registry = build(&project);
        let values = initial_values(&registry, &project);

        assert_eq!(
            registry.keys().collect::<Vec<_>>(),
            values.keys().collect::<Vec<_>>()
        );
        assert_eq!(values[NAME_KEY], json!("Backend"));
        assert_eq!(values[SLUG_KEY], json!("backend"));
        assert_eq!(values[TEAM_KEY], json!("core"));
        assert_eq!(values[SECURITY_TOKEN_KEY], json!("tok"));
        assert_eq!(values["mail:subject_prefix"], json!("[backend]"));
        assert_eq!(values[AUTO_RESOLVE_KEY], json!(48));
        assert_eq!(values["sentry:scrub_data"], json!(true));
    }

    #[test]
    fn team_choices_only_include_memberships() {
        let org = Organization {
            slug: "acme".into(),
            name: None,
            teams: vec![
                Team {
                    id: "1".into(),
                    slug: "core".into(),
                    name: None,
                    is_member: true,
                },
                Team {
                    id: "2".into(),
                    slug: "web".into(),
                    name: None,
                    is_member: false,
                },
            ],
        };
        assert_eq!(team_choices(&org), vec![Choice::new("core", "core")]);
    }
}
