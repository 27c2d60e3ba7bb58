//! `show`, `fields`, and `set` handlers.

use std::fmt::Write as _;
use std::io::IsTerminal;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tabled::Tabled;

use projset_core::registry::AUTO_RESOLVE_KEY;
use projset_core::value::{self, as_i64};
use projset_core::{
    ErrorMap, FieldDescriptor, FieldKind, RenderedField, RenderedSection, SubmitOutcome,
};

use super::Session;
use crate::cli::{FieldsArgs, GlobalOpts, SetArgs, ShowArgs};
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    label: String,
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
}

impl From<&RenderedField> for FieldRow {
    fn from(f: &RenderedField) -> Self {
        Self {
            label: f.descriptor.label.clone(),
            key: f.key().to_owned(),
            value: value::display_text(&f.descriptor, &f.value),
        }
    }
}

#[derive(Tabled)]
struct DescriptorRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Required")]
    required: &'static str,
    #[tabled(rename = "Constraints")]
    constraints: String,
}

impl From<&FieldDescriptor> for DescriptorRow {
    fn from(d: &FieldDescriptor) -> Self {
        Self {
            key: d.key.clone(),
            kind: d.kind.into(),
            label: d.label.clone(),
            required: if d.required { "yes" } else { "" },
            constraints: constraints(d),
        }
    }
}

#[derive(Tabled)]
struct ErrorRow {
    #[tabled(rename = "Field")]
    key: String,
    #[tabled(rename = "Error")]
    message: String,
}

/// Short human summary of a descriptor's limits.
fn constraints(d: &FieldDescriptor) -> String {
    if let Some(allowed) = d.allowed_values.as_deref().filter(|a| !a.is_empty()) {
        let first = allowed.first().copied().unwrap_or_default();
        let last = allowed.last().copied().unwrap_or_default();
        return format!("{first}..{last} ({} steps)", allowed.len());
    }
    if !d.choices.is_empty() {
        return d
            .choices
            .iter()
            .map(|c| c.value.as_str())
            .collect::<Vec<_>>()
            .join(" | ");
    }
    match (d.min, d.max) {
        (Some(min), Some(max)) => format!("{min}..{max}"),
        (Some(min), None) => format!(">= {min}"),
        (None, Some(max)) => format!("<= {max}"),
        (None, None) => String::new(),
    }
}

fn plain_line(key: &str, v: &Value) -> String {
    format!("{key}={}", value::edit_text(v).replace('\n', ","))
}

// ── show ────────────────────────────────────────────────────────────

fn render_sections_table(sections: &[RenderedSection], color: bool) -> String {
    let mut out = String::new();
    for section in sections {
        if !out.is_empty() {
            out.push('\n');
        }
        let _ = writeln!(out, "{}", output::heading(section.title, color));
        if let Some(intro) = section.intro {
            let _ = writeln!(out, "{}", output::dim(intro, color));
        }
        if section.fields.is_empty() {
            let _ = writeln!(out, "{}", output::dim("(no fields)", color));
        } else {
            let rows: Vec<FieldRow> = section.fields.iter().map(FieldRow::from).collect();
            let _ = writeln!(out, "{}", output::render_table(&rows));
        }
        if let Some(note) = section.note {
            let _ = writeln!(out, "{}", output::dim(note, color));
        }
    }
    out.trim_end().to_owned()
}

pub async fn show(args: ShowArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let session = Session::open(global, args.route.route.as_deref()).await?;
    let mut sections = session.settings.sections();
    if let Some(filter) = args.section.as_deref() {
        let filter = filter.to_lowercase();
        sections.retain(|s| s.title.to_lowercase().starts_with(&filter));
    }

    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &sections,
        |s| render_sections_table(s, color),
        |s| {
            s.iter()
                .flat_map(|section| &section.fields)
                .map(|f| plain_line(f.key(), &f.value))
                .collect::<Vec<_>>()
                .join("\n")
        },
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── fields ──────────────────────────────────────────────────────────

pub async fn fields(args: FieldsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let session = Session::open(global, args.route.route.as_deref()).await?;
    let descriptors: Vec<&FieldDescriptor> = session.settings.state().fields.values().collect();
    let out = output::render_list(
        &global.output,
        &descriptors,
        |d| DescriptorRow::from(*d),
        |d| d.key.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── set ─────────────────────────────────────────────────────────────

/// Split `KEY=VALUE` at the first `=`.
fn split_assignment(raw: &str) -> Result<(&str, &str), CliError> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value)),
        _ => Err(CliError::Validation {
            field: raw.into(),
            reason: "expected KEY=VALUE".into(),
        }),
    }
}

/// Parse `12`, `12h`, or `2d` into hours.
fn parse_hours(raw: &str) -> Option<i64> {
    let raw = raw.trim().to_lowercase();
    if let Some(days) = raw.strip_suffix('d') {
        return days.trim().parse::<i64>().ok().map(|d| d * 24);
    }
    raw.strip_suffix('h').unwrap_or(&raw).trim().parse().ok()
}

/// Convert command-line text into a value shaped for the field.
fn parse_value(descriptor: &FieldDescriptor, previous: &Value, raw: &str) -> Result<Value, CliError> {
    let invalid = |reason: &str| CliError::Validation {
        field: descriptor.key.clone(),
        reason: reason.into(),
    };
    match descriptor.kind {
        FieldKind::Boolean => match raw.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(Value::Bool(true)),
            "false" | "no" | "off" | "0" => Ok(Value::Bool(false)),
            _ => Err(invalid("expected true or false")),
        },
        FieldKind::Range if descriptor.format.is_some() => parse_hours(raw)
            .map(Value::from)
            .ok_or_else(|| invalid("expected hours, like 12, 12h, or 2d")),
        FieldKind::Range | FieldKind::Number => raw
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| invalid("expected an integer")),
        _ if previous.is_array() => Ok(Value::Array(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| Value::String(s.to_owned()))
                .collect(),
        )),
        _ => Ok(value::from_text(previous, raw)),
    }
}

/// Whether this edit switches auto resolve on.
fn enables_auto_resolve(initial: Option<&Value>, next: Option<&Value>) -> bool {
    let hours = |v: Option<&Value>| v.and_then(as_i64).unwrap_or(0);
    hours(initial) == 0 && hours(next) > 0
}

fn confirm(message: &str, yes: bool) -> Result<bool, CliError> {
    if yes {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: "enable auto resolve".into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

fn spinner(global: &GlobalOpts, message: &'static str) -> Option<indicatif::ProgressBar> {
    if global.quiet || !std::io::stderr().is_terminal() {
        return None;
    }
    let spinner = indicatif::ProgressBar::new_spinner();
    if let Ok(style) = indicatif::ProgressStyle::default_spinner().template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    Some(spinner)
}

fn print_errors(errors: &ErrorMap, color: bool) {
    let rows: Vec<ErrorRow> = errors
        .iter()
        .map(|(key, message)| ErrorRow {
            key: key.clone(),
            message: output::error_text(message, color),
        })
        .collect();
    eprintln!("{}", output::render_table(&rows));
}

#[derive(Serialize)]
struct Change<'a> {
    key: &'a str,
    value: &'a Value,
}

pub async fn set(args: SetArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut session = Session::open(global, args.route.as_deref()).await?;
    let settings = &mut session.settings;

    for assignment in &args.assignments {
        let (key, raw) = split_assignment(assignment)?;
        let state = settings.state();
        let descriptor = state
            .fields
            .get(key)
            .ok_or_else(|| CliError::UnknownField { key: key.into() })?;
        let previous = state.value(key).cloned().unwrap_or(Value::Null);
        let next = if args.json {
            serde_json::from_str(raw)?
        } else {
            parse_value(descriptor, &previous, raw)?
        };
        settings.change_field(key, next)?;
    }

    let changed: Vec<String> = settings
        .state()
        .dirty_keys()
        .into_iter()
        .map(str::to_owned)
        .collect();
    if changed.is_empty() {
        if !global.quiet {
            eprintln!("Nothing to change");
        }
        return Ok(());
    }

    let state = settings.state();
    if enables_auto_resolve(
        state.initial_data.get(AUTO_RESOLVE_KEY),
        state.form_data.get(AUTO_RESOLVE_KEY),
    ) && !confirm(
        "Enabling auto resolve immediately resolves every issue not seen within \
         this window. There is no undo. Continue?",
        global.yes,
    )? {
        return Err(CliError::Aborted);
    }

    if args.dry_run {
        let body = &settings.state().form_data;
        let out = output::render_single(
            &global.output,
            body,
            |b| serde_json::to_string_pretty(b).unwrap_or_default(),
            |b| {
                b.iter()
                    .map(|(k, v)| plain_line(k, v))
                    .collect::<Vec<_>>()
                    .join("\n")
            },
        );
        output::print_output(&out, global.quiet);
        return Ok(());
    }

    let progress = spinner(global, "Saving...");
    let outcome = settings.submit(&session.api).await;
    if let Some(progress) = progress {
        progress.finish_and_clear();
    }

    match outcome.map_err(|e| session.resolved.core_error(e, global))? {
        SubmitOutcome::Saved | SubmitOutcome::Discarded => {
            let state = settings.state();
            let saved: Vec<Change<'_>> = changed
                .iter()
                .filter_map(|key| {
                    state.value(key).map(|value| Change {
                        key: key.as_str(),
                        value,
                    })
                })
                .collect();
            let out = output::render_list(
                &global.output,
                &saved,
                |c| FieldRow {
                    label: state
                        .fields
                        .get(c.key)
                        .map(|d| d.label.clone())
                        .unwrap_or_default(),
                    key: c.key.to_owned(),
                    value: state
                        .fields
                        .get(c.key)
                        .map(|d| value::display_text(d, c.value))
                        .unwrap_or_default(),
                },
                |c| plain_line(c.key, c.value),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
        SubmitOutcome::Failed(err) => {
            let errors = settings.state().errors.clone();
            if !errors.is_empty() {
                print_errors(&errors, output::should_color(&global.color));
            }
            Err(session.resolved.core_error(err, global))
        }
    }
}
