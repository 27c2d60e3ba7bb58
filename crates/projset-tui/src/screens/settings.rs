//! Project settings form: sections of fields, edited in place.
//!
//! Text fields open an inline editor; booleans toggle; choices and ranges
//! step with ←/→. `s` saves the whole form. The screen never talks to the
//! network itself: it emits `Action::Save` with a started request and
//! applies `Action::SaveFinished` when the app reports back.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap};
use serde_json::Value;
use tracing::debug;
use tui_input::Input;

use projset_core::registry::AUTO_RESOLVE_KEY;
use projset_core::value::{self, as_i64};
use projset_core::{
    CoreError, FieldKind, ProjectSettings, RenderedField, RenderedSection, SubmitOutcome,
};

use crate::action::{Action, Notification};
use crate::component::Component;
use crate::text_input;
use crate::theme;

const LABEL_WIDTH: usize = 28;

const CONFIRM_AUTO_RESOLVE: &str = "Enabling auto resolve will immediately resolve anything \
    that has not been seen within this period of time. There is no undo!";

// ── Types ────────────────────────────────────────────────────────────

#[derive(Debug)]
enum Mode {
    Browsing,
    /// Inline editor open on a text field.
    Editing { key: String, input: Input },
    /// Waiting for y/n before a save that turns auto resolve on.
    ConfirmSave,
}

// ── Component ────────────────────────────────────────────────────────

pub struct SettingsScreen {
    settings: Option<ProjectSettings>,
    /// A load is in flight.
    loading: bool,
    load_error: Option<String>,
    /// Index into the visible field keys.
    focus: usize,
    mode: Mode,
    throbber_state: throbber_widgets_tui::ThrobberState,
}

impl SettingsScreen {
    pub fn new() -> Self {
        Self {
            settings: None,
            loading: false,
            load_error: None,
            focus: 0,
            mode: Mode::Browsing,
            throbber_state: throbber_widgets_tui::ThrobberState::default(),
        }
    }

    pub fn settings(&self) -> Option<&ProjectSettings> {
        self.settings.as_ref()
    }

    fn sections(&self) -> Vec<RenderedSection> {
        self.settings
            .as_ref()
            .map(ProjectSettings::sections)
            .unwrap_or_default()
    }

    /// Keys of every drawn field, top to bottom.
    fn visible_keys(&self) -> Vec<String> {
        self.sections()
            .iter()
            .flat_map(|s| s.fields.iter().map(|f| f.key().to_owned()))
            .collect()
    }

    fn focused_field(&self) -> Option<RenderedField> {
        let key = self.visible_keys().into_iter().nth(self.focus)?;
        self.sections()
            .into_iter()
            .flat_map(|s| s.fields)
            .find(|f| f.key() == key)
    }

    fn is_submitting(&self) -> bool {
        self.settings
            .as_ref()
            .is_some_and(|s| s.state().is_submitting())
    }

    // ── Navigation ───────────────────────────────────────────────────

    fn focus_next(&mut self) {
        let len = self.visible_keys().len();
        if len > 0 {
            self.focus = (self.focus + 1).min(len - 1);
        }
    }

    fn focus_prev(&mut self) {
        self.focus = self.focus.saturating_sub(1);
    }

    fn clamp_focus(&mut self) {
        let len = self.visible_keys().len();
        self.focus = self.focus.min(len.saturating_sub(1));
    }

    // ── Editing ──────────────────────────────────────────────────────

    fn set(&mut self, key: &str, value: Value) -> Option<Action> {
        let settings = self.settings.as_mut()?;
        match settings.change_field(key, value) {
            Ok(()) => None,
            Err(e) => Some(Action::Notify(Notification::error(e.to_string()))),
        }
    }

    /// Primary action on the focused field (Enter / Space).
    fn activate(&mut self) -> Option<Action> {
        let field = self.focused_field()?;
        let key = field.key().to_owned();
        match field.descriptor.kind {
            FieldKind::Boolean => self.set(&key, value::toggle(&field.value)),
            FieldKind::Choice => {
                let next = value::cycle_choice(&field.descriptor, &field.value, true)?;
                self.set(&key, next)
            }
            FieldKind::Range => {
                let next = value::step_range(&field.descriptor, &field.value, true);
                self.set(&key, next)
            }
            _ => {
                let text = match &field.value {
                    Value::Array(_) => value::edit_text(&field.value).replace('\n', ", "),
                    other => value::edit_text(other),
                };
                self.mode = Mode::Editing {
                    key,
                    input: Input::new(text),
                };
                None
            }
        }
    }

    /// Step a choice or range field (←/→).
    fn step(&mut self, forward: bool) -> Option<Action> {
        let field = self.focused_field()?;
        let next = match field.descriptor.kind {
            FieldKind::Choice => value::cycle_choice(&field.descriptor, &field.value, forward)?,
            FieldKind::Range => value::step_range(&field.descriptor, &field.value, forward),
            FieldKind::Boolean => value::toggle(&field.value),
            _ => return None,
        };
        self.set(field.key(), next)
    }

    fn commit_edit(&mut self, key: &str, text: &str) -> Option<Action> {
        let previous = self
            .settings
            .as_ref()?
            .state()
            .value(key)
            .cloned()
            .unwrap_or(Value::Null);
        let next = match previous {
            Value::Array(_) => value::from_text(&previous, &text.replace(',', "\n")),
            _ => value::from_text(&previous, text),
        };
        self.set(key, next)
    }

    // ── Saving ───────────────────────────────────────────────────────

    /// Whether saving now would switch auto resolve on.
    fn enables_auto_resolve(&self) -> bool {
        let Some(settings) = &self.settings else {
            return false;
        };
        let state = settings.state();
        let hours = |v: Option<&Value>| v.and_then(as_i64).unwrap_or(0);
        hours(state.initial_data.get(AUTO_RESOLVE_KEY)) == 0
            && hours(state.form_data.get(AUTO_RESOLVE_KEY)) > 0
    }

    fn request_save(&mut self) -> Option<Action> {
        if self.enables_auto_resolve() {
            self.mode = Mode::ConfirmSave;
            return None;
        }
        self.start_save()
    }

    fn start_save(&mut self) -> Option<Action> {
        let settings = self.settings.as_mut()?;
        match settings.begin_submit() {
            Ok(request) => Some(Action::Save(request)),
            Err(e) => Some(Action::Notify(Notification::error(e.to_string()))),
        }
    }

    fn finish_save(
        &mut self,
        revision: u64,
        result: Result<Vec<projset_core::SavedField>, CoreError>,
    ) -> Option<Action> {
        let settings = self.settings.as_mut()?;
        match settings.finish_submit(revision, result) {
            SubmitOutcome::Saved => Some(Action::Notify(Notification::success("Settings saved"))),
            SubmitOutcome::Failed(CoreError::Rejected { errors }) => Some(Action::Notify(
                Notification::error(format!("{} field(s) need attention", errors.len())),
            )),
            SubmitOutcome::Failed(err) => {
                Some(Action::Notify(Notification::error(err.to_string())))
            }
            SubmitOutcome::Discarded => None,
        }
    }

    // ── Key handling by mode ─────────────────────────────────────────

    fn handle_browsing_key(&mut self, key: KeyEvent) -> Option<Action> {
        if self.settings.is_none() {
            return None;
        }
        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, _) => None,
            (_, KeyCode::Down | KeyCode::Char('j')) => {
                self.focus_next();
                None
            }
            (_, KeyCode::Up | KeyCode::Char('k')) => {
                self.focus_prev();
                None
            }
            (_, KeyCode::Home) => {
                self.focus = 0;
                None
            }
            (_, KeyCode::End) => {
                self.focus = self.visible_keys().len().saturating_sub(1);
                None
            }
            (_, KeyCode::Enter | KeyCode::Char(' ' | 'e')) => self.activate(),
            (_, KeyCode::Right | KeyCode::Char('l')) => self.step(true),
            (_, KeyCode::Left | KeyCode::Char('h')) => self.step(false),
            (_, KeyCode::Char('s')) => self.request_save(),
            (_, KeyCode::Char('u')) => {
                let settings = self.settings.as_mut()?;
                if !settings.state().is_dirty() && settings.state().errors.is_empty() {
                    return None;
                }
                settings.reset();
                Some(Action::Notify(Notification::info("Changes discarded")))
            }
            _ => None,
        }
    }

    fn handle_editing_key(&mut self, key: KeyEvent) -> Option<Action> {
        let Mode::Editing {
            key: field_key,
            input,
        } = &mut self.mode
        else {
            return None;
        };
        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Browsing;
                None
            }
            KeyCode::Enter => {
                let field_key = field_key.clone();
                let text = input.value().to_owned();
                self.mode = Mode::Browsing;
                self.commit_edit(&field_key, &text)
            }
            _ => {
                text_input::handle(input, key);
                None
            }
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char('y' | 'Y') => {
                self.mode = Mode::Browsing;
                self.start_save()
            }
            KeyCode::Char('n' | 'N') | KeyCode::Esc => {
                self.mode = Mode::Browsing;
                None
            }
            _ => None,
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    /// Form body lines plus the line index of the focused field.
    fn form_lines(&self, sections: &[RenderedSection], width: u16) -> (Vec<Line<'static>>, usize) {
        let wrap_at = usize::from(width.saturating_sub(4)).max(20);
        let mut lines = Vec::new();
        let mut focused_line = 0;
        let mut index = 0;

        for section in sections.iter().filter(|s| !s.fields.is_empty()) {
            if !lines.is_empty() {
                lines.push(Line::from(""));
            }
            lines.push(Line::from(Span::styled(
                format!(" {}", section.title),
                theme::section_heading(),
            )));
            if let Some(intro) = section.intro {
                lines.extend(prose_lines(intro, wrap_at));
            }

            for field in &section.fields {
                let focused = index == self.focus;
                if focused {
                    focused_line = lines.len();
                }
                lines.push(field_line(field, focused));
                if let Some(error) = &field.error {
                    lines.push(Line::from(Span::styled(
                        format!("     ✗ {error}"),
                        theme::field_error(),
                    )));
                }
                index += 1;
            }

            if let Some(note) = section.note {
                lines.extend(prose_lines(note, wrap_at));
            }
        }

        (lines, focused_line)
    }

    fn render_form(&self, frame: &mut Frame, area: Rect) {
        let sections = self.sections();
        let (lines, focused_line) = self.form_lines(&sections, area.width);

        let height = usize::from(area.height);
        let offset = if focused_line + 2 > height {
            focused_line + 2 - height
        } else {
            0
        };
        frame.render_widget(
            Paragraph::new(lines).scroll((u16::try_from(offset).unwrap_or(u16::MAX), 0)),
            area,
        );

        let Mode::Editing { input, .. } = &self.mode else {
            return;
        };
        let row = focused_line.saturating_sub(offset);
        let Ok(row) = u16::try_from(row) else {
            return;
        };
        let indent = u16::try_from(LABEL_WIDTH + 5).unwrap_or(0);
        if row < area.height && indent < area.width {
            let editor = Rect::new(area.x + indent, area.y + row, area.width - indent, 1);
            frame.render_widget(Clear, editor);
            text_input::render(frame, input, editor);
        }
    }

    fn render_help_line(&self, frame: &mut Frame, area: Rect) {
        let help = self
            .focused_field()
            .and_then(|f| f.descriptor.help)
            .unwrap_or_default();
        frame.render_widget(
            Paragraph::new(Span::styled(help, theme::prose())).wrap(Wrap { trim: true }),
            area,
        );
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        if self.is_submitting() {
            let throbber = throbber_widgets_tui::Throbber::default()
                .label(" Saving...")
                .style(Style::default().fg(theme::NEON_CYAN))
                .throbber_style(Style::default().fg(theme::ELECTRIC_PURPLE));
            frame.render_stateful_widget(throbber, area, &mut self.throbber_state.clone());
            return;
        }

        let hints = match (&self.mode, self.focused_field().map(|f| f.descriptor.kind)) {
            (Mode::Editing { .. }, _) => "Enter apply  Esc cancel  Ctrl+U clear",
            (Mode::ConfirmSave, _) => "y save  n cancel",
            (_, Some(FieldKind::Boolean)) => "Space toggle  ↑/↓ move  s save  u discard",
            (_, Some(FieldKind::Choice | FieldKind::Range)) => {
                "←/→ change  ↑/↓ move  s save  u discard"
            }
            _ => "Enter edit  ↑/↓ move  s save  u discard",
        };

        let dirty = self
            .settings
            .as_ref()
            .map_or(0, |s| s.state().dirty_keys().len());
        let status = if dirty == 0 {
            Span::styled("no unsaved changes", theme::key_hint())
        } else {
            Span::styled(format!("● {dirty} unsaved change(s)"), theme::dirty_marker())
        };

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::raw(" "),
                status,
                Span::styled("  │  ", theme::key_hint()),
                Span::styled(hints, theme::key_hint()),
            ])),
            area,
        );
    }

    fn render_placeholder(&self, frame: &mut Frame, area: Rect) {
        let layout = Layout::vertical([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

        if let Some(err) = &self.load_error {
            frame.render_widget(
                Paragraph::new(Span::styled(err.as_str(), theme::field_error()))
                    .alignment(Alignment::Center),
                layout[1],
            );
            frame.render_widget(
                Paragraph::new(Span::styled("g pick project  r retry", theme::key_hint()))
                    .alignment(Alignment::Center),
                layout[2],
            );
        } else if self.loading {
            let throbber = throbber_widgets_tui::Throbber::default()
                .label(" Loading project...")
                .style(Style::default().fg(theme::NEON_CYAN))
                .throbber_style(Style::default().fg(theme::ELECTRIC_PURPLE));
            frame.render_stateful_widget(throbber, layout[1], &mut self.throbber_state.clone());
        } else {
            frame.render_widget(
                Paragraph::new(Span::styled("Press g to open a project", theme::key_hint()))
                    .alignment(Alignment::Center),
                layout[1],
            );
        }
    }

    #[allow(clippy::unused_self)]
    fn render_confirm(&self, frame: &mut Frame, area: Rect) {
        let w = 56u16.min(area.width.saturating_sub(4));
        let h = 8u16.min(area.height.saturating_sub(2));
        let popup = Rect::new(
            area.x + (area.width.saturating_sub(w)) / 2,
            area.y + (area.height.saturating_sub(h)) / 2,
            w,
            h,
        );
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .title(" Enable auto resolve? ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused())
            .style(Style::default().bg(theme::BG_DARK));
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        let layout = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(inner);
        frame.render_widget(
            Paragraph::new(Span::styled(CONFIRM_AUTO_RESOLVE, theme::field_label()))
                .wrap(Wrap { trim: true }),
            layout[0],
        );
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("y", theme::key_hint_key()),
                Span::styled(" save   ", theme::key_hint()),
                Span::styled("n", theme::key_hint_key()),
                Span::styled(" cancel", theme::key_hint()),
            ]))
            .alignment(Alignment::Center),
            layout[1],
        );
    }
}

/// Word-wrap a paragraph into dim, indented lines.
fn prose_lines(text: &str, width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > width {
            lines.push(Line::from(Span::styled(
                format!("   {current}"),
                theme::prose(),
            )));
            current.clear();
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(Line::from(Span::styled(format!("   {current}"), theme::prose())));
    }
    lines
}

/// One form row: focus arrow, dirty dot, label, and display value.
fn field_line(field: &RenderedField, focused: bool) -> Line<'static> {
    let arrow = if focused { " ▸ " } else { "   " };
    let dirty = if field.dirty { "●" } else { " " };
    let mut label = field.descriptor.label.clone();
    if field.descriptor.required {
        label.push_str(" *");
    }
    let shown = match field.descriptor.kind {
        FieldKind::Secret if !value::edit_text(&field.value).is_empty() => "••••••••".to_owned(),
        FieldKind::Boolean => {
            let mark = if value::as_bool(&field.value) { "[✓]" } else { "[ ]" };
            format!("{mark} {}", value::display_text(&field.descriptor, &field.value))
        }
        FieldKind::Choice | FieldKind::Range => {
            format!("◂ {} ▸", value::display_text(&field.descriptor, &field.value))
        }
        _ => value::display_text(&field.descriptor, &field.value).replace('\n', ", "),
    };

    let label_style = if focused {
        theme::field_selected()
    } else {
        theme::field_label()
    };
    Line::from(vec![
        Span::styled(arrow, label_style),
        Span::styled(dirty, theme::dirty_marker()),
        Span::styled(format!(" {label:<LABEL_WIDTH$}"), label_style),
        Span::styled(shown, theme::field_value()),
    ])
}

// ── Component impl ───────────────────────────────────────────────────

impl Component for SettingsScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match self.mode {
            Mode::Browsing => self.handle_browsing_key(key),
            Mode::Editing { .. } => self.handle_editing_key(key),
            Mode::ConfirmSave => self.handle_confirm_key(key),
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        let follow_up = match action {
            Action::Load(_) => {
                self.loading = true;
                None
            }
            Action::ProjectLoaded(props) => {
                self.loading = false;
                self.load_error = None;
                match &mut self.settings {
                    Some(settings) => {
                        if settings.receive_props(props.as_ref().clone()) {
                            debug!("project changed, form rebuilt");
                            self.focus = 0;
                            self.mode = Mode::Browsing;
                        }
                    }
                    None => self.settings = Some(ProjectSettings::new(props.as_ref().clone())),
                }
                self.clamp_focus();
                None
            }
            Action::LoadFailed(msg) => {
                self.loading = false;
                if self.settings.is_none() {
                    self.load_error = Some(msg.clone());
                }
                None
            }
            Action::SaveFinished { revision, result } => self.finish_save(*revision, result.clone()),
            Action::Tick => {
                if self.loading || self.is_submitting() {
                    self.throbber_state.calc_next();
                }
                None
            }
            _ => None,
        };
        Ok(follow_up)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let title = self.settings.as_ref().map_or_else(
            || " Project settings ".to_owned(),
            |s| {
                let project = &s.props().project;
                format!(" {} · {} ", project.name, s.props().params)
            },
        );
        let block = Block::default()
            .title(Span::styled(title, theme::title_style()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if matches!(self.mode, Mode::Browsing) {
                theme::border_default()
            } else {
                theme::border_focused()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.settings.is_none() {
            self.render_placeholder(frame, inner);
            return;
        }

        let layout = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(2),
            Constraint::Length(1),
        ])
        .split(inner);

        self.render_form(frame, layout[0]);
        self.render_help_line(frame, layout[1]);
        self.render_footer(frame, layout[2]);

        if matches!(self.mode, Mode::ConfirmSave) {
            self.render_confirm(frame, area);
        }
    }

    fn capturing_input(&self) -> bool {
        !matches!(self.mode, Mode::Browsing)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use projset_core::{
        FieldDescriptor, Location, Organization, Project, Props, RouteParams, SavedField, Team,
    };
    use serde_json::json;

    fn props(path: &str) -> Props {
        let params = RouteParams::new("acme", "backend");
        Props {
            project: Project {
                name: "Backend".into(),
                slug: "backend".into(),
                team: Some("core".into()),
                config: vec![FieldDescriptor::new(
                    "sentry:scrub_data",
                    FieldKind::Boolean,
                    "Data scrubber",
                )],
                options: [("sentry:scrub_data".to_owned(), json!(true))]
                    .into_iter()
                    .collect(),
                ..Project::default()
            },
            organization: Organization {
                slug: "acme".into(),
                name: None,
                teams: vec![Team {
                    id: "1".into(),
                    slug: "core".into(),
                    name: None,
                    is_member: true,
                }],
            },
            location: Location::new(path, ""),
            params,
        }
    }

    fn loaded() -> SettingsScreen {
        let mut screen = SettingsScreen::new();
        screen
            .update(&Action::ProjectLoaded(Box::new(props("/acme/backend/settings/"))))
            .unwrap();
        screen
    }

    fn press(screen: &mut SettingsScreen, code: KeyCode) -> Option<Action> {
        screen
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    fn type_text(screen: &mut SettingsScreen, text: &str) {
        for c in text.chars() {
            press(screen, KeyCode::Char(c));
        }
    }

    fn value(screen: &SettingsScreen, key: &str) -> Value {
        screen
            .settings()
            .unwrap()
            .state()
            .value(key)
            .cloned()
            .unwrap()
    }

    fn focus_key(screen: &mut SettingsScreen, key: &str) {
        let pos = screen.visible_keys().iter().position(|k| k == key).unwrap();
        screen.focus = pos;
    }

    #[test]
    fn single_team_is_not_listed() {
        let keys = loaded().visible_keys();
        assert_eq!(
            keys,
            ["name", "slug", AUTO_RESOLVE_KEY, "sentry:scrub_data", "securityToken"]
        );
    }

    #[test]
    fn editing_a_text_field_commits_on_enter() {
        let mut screen = loaded();
        press(&mut screen, KeyCode::Enter);
        assert!(screen.capturing_input());
        press(&mut screen, KeyCode::Backspace);
        type_text(&mut screen, "X");
        press(&mut screen, KeyCode::Enter);
        assert!(!screen.capturing_input());
        assert_eq!(value(&screen, "name"), json!("BackenX"));
    }

    #[test]
    fn escape_abandons_an_edit() {
        let mut screen = loaded();
        press(&mut screen, KeyCode::Enter);
        type_text(&mut screen, "zzz");
        press(&mut screen, KeyCode::Esc);
        assert_eq!(value(&screen, "name"), json!("Backend"));
    }

    #[test]
    fn space_toggles_booleans() {
        let mut screen = loaded();
        focus_key(&mut screen, "sentry:scrub_data");
        press(&mut screen, KeyCode::Char(' '));
        assert_eq!(value(&screen, "sentry:scrub_data"), json!(false));
    }

    #[test]
    fn arrows_step_auto_resolve_detents() {
        let mut screen = loaded();
        focus_key(&mut screen, AUTO_RESOLVE_KEY);
        press(&mut screen, KeyCode::Right);
        press(&mut screen, KeyCode::Right);
        assert_eq!(value(&screen, AUTO_RESOLVE_KEY), json!(2));
        press(&mut screen, KeyCode::Left);
        assert_eq!(value(&screen, AUTO_RESOLVE_KEY), json!(1));
    }

    #[test]
    fn saving_emits_a_started_request() {
        let mut screen = loaded();
        let Some(Action::Save(request)) = press(&mut screen, KeyCode::Char('s')) else {
            panic!("expected a save request");
        };
        assert_eq!(request.data["slug"], json!("backend"));
        assert!(screen.is_submitting());

        let again = press(&mut screen, KeyCode::Char('s'));
        assert!(matches!(again, Some(Action::Notify(_))));
    }

    #[test]
    fn enabling_auto_resolve_asks_first() {
        let mut screen = loaded();
        focus_key(&mut screen, AUTO_RESOLVE_KEY);
        press(&mut screen, KeyCode::Right);

        assert!(press(&mut screen, KeyCode::Char('s')).is_none());
        assert!(screen.capturing_input());
        assert!(press(&mut screen, KeyCode::Char('n')).is_none());
        assert!(!screen.is_submitting());

        press(&mut screen, KeyCode::Char('s'));
        let action = press(&mut screen, KeyCode::Char('y'));
        assert!(matches!(action, Some(Action::Save(_))));
    }

    #[test]
    fn rejected_save_shows_field_errors() {
        let mut screen = loaded();
        let Some(Action::Save(request)) = press(&mut screen, KeyCode::Char('s')) else {
            panic!("expected a save request");
        };
        let errors = [("slug".to_owned(), "Taken".to_owned())].into();
        screen
            .update(&Action::SaveFinished {
                revision: request.revision,
                result: Err(CoreError::Rejected { errors }),
            })
            .unwrap();

        let state = screen.settings().unwrap().state();
        assert_eq!(state.error("slug"), Some("Taken"));
        assert!(!state.is_submitting());
    }

    #[test]
    fn moving_to_another_project_drops_the_pending_save() {
        let mut screen = loaded();
        let Some(Action::Save(request)) = press(&mut screen, KeyCode::Char('s')) else {
            panic!("expected a save request");
        };
        screen
            .update(&Action::ProjectLoaded(Box::new(props("/acme/web/settings/"))))
            .unwrap();

        let follow_up = screen
            .update(&Action::SaveFinished {
                revision: request.revision,
                result: Ok(vec![SavedField {
                    name: "slug".into(),
                    value: Some(json!("stale")),
                    default_value: None,
                }]),
            })
            .unwrap();
        assert!(follow_up.is_none());
        assert_eq!(value(&screen, "slug"), json!("backend"));
    }

    #[test]
    fn reload_at_same_location_keeps_edits() {
        let mut screen = loaded();
        focus_key(&mut screen, "sentry:scrub_data");
        press(&mut screen, KeyCode::Char(' '));
        screen
            .update(&Action::ProjectLoaded(Box::new(props("/acme/backend/settings/"))))
            .unwrap();
        assert_eq!(value(&screen, "sentry:scrub_data"), json!(false));
    }

    #[test]
    fn prose_wraps_on_word_boundaries() {
        let lines = prose_lines("one two three four", 9);
        assert_eq!(lines.len(), 3);
    }
}
