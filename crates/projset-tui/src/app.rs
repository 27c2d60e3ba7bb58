//! Application core: event loop, background requests, action dispatch.

use std::sync::Arc;
use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tui_input::Input;

use projset_core::{RouteParams, SettingsApi, load_props};

use crate::action::{Action, Notification, NotificationLevel};
use crate::component::Component;
use crate::event::{Event, EventReader};
use crate::screens::SettingsScreen;
use crate::text_input;
use crate::theme;
use crate::tui::Tui;

/// Ticks a notification stays in the status bar (4 Hz).
const NOTIFICATION_TICKS: u16 = 16;

/// Top-level application state and event loop.
pub struct App {
    api: Arc<dyn SettingsApi>,
    /// Project currently shown, once one has been requested.
    route: Option<RouteParams>,
    screen: SettingsScreen,
    running: bool,
    help_visible: bool,
    /// Open "go to project" prompt.
    route_prompt: Option<Input>,
    notification: Option<(Notification, u16)>,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
}

impl App {
    pub fn new(api: Arc<dyn SettingsApi>, route: Option<RouteParams>) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        Self {
            api,
            route,
            screen: SettingsScreen::new(),
            running: true,
            help_visible: false,
            route_prompt: None,
            notification: None,
            action_tx,
            action_rx,
        }
    }

    /// Run the main event loop until the user quits.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        let first = match &self.route {
            Some(route) => Action::Load(route.clone()),
            None => Action::OpenRoutePrompt,
        };
        self.action_tx.send(first)?;

        info!("TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;
                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        events.stop();
        info!("TUI event loop ended");
        Ok(())
    }

    // ── Input ────────────────────────────────────────────────────────

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        if let Some(input) = &mut self.route_prompt {
            return Ok(match key.code {
                KeyCode::Esc => Some(Action::CloseRoutePrompt),
                KeyCode::Enter => match RouteParams::parse(input.value()) {
                    Some(route) => {
                        self.route_prompt = None;
                        Some(Action::Load(route))
                    }
                    None => Some(Action::Notify(Notification::error(
                        "Enter the project as org/project",
                    ))),
                },
                _ => {
                    text_input::handle(input, key);
                    None
                }
            });
        }

        if self.help_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Char('?' | 'q') => Some(Action::ToggleHelp),
                _ => None,
            });
        }

        if self.screen.capturing_input() {
            return self.screen.handle_key_event(key);
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),
            (_, KeyCode::Char('?')) => return Ok(Some(Action::ToggleHelp)),
            (KeyModifiers::NONE, KeyCode::Char('g')) => return Ok(Some(Action::OpenRoutePrompt)),
            (KeyModifiers::NONE, KeyCode::Char('r')) => return Ok(Some(Action::Reload)),
            (KeyModifiers::NONE, KeyCode::Esc) => return Ok(Some(Action::DismissNotification)),
            _ => {}
        }

        self.screen.handle_key_event(key)
    }

    // ── Background requests ──────────────────────────────────────────

    fn spawn_load(&self, route: RouteParams) {
        let api = Arc::clone(&self.api);
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            debug!(%route, "loading project");
            let action = match load_props(api.as_ref(), route).await {
                Ok(props) => Action::ProjectLoaded(Box::new(props)),
                Err(e) => {
                    warn!(error = %e, "project load failed");
                    Action::LoadFailed(e.to_string())
                }
            };
            let _ = tx.send(action);
        });
    }

    fn spawn_save(&self, request: projset_core::SubmitRequest) {
        let api = Arc::clone(&self.api);
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let result = api.save(&request.params, &request.data).await;
            let _ = tx.send(Action::SaveFinished {
                revision: request.revision,
                result,
            });
        });
    }

    // ── Dispatch ─────────────────────────────────────────────────────

    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,
            Action::Render | Action::Resize(..) => {}
            Action::ToggleHelp => self.help_visible = !self.help_visible,

            Action::OpenRoutePrompt => {
                let current = self.route.as_ref().map(ToString::to_string);
                self.route_prompt = Some(Input::new(current.unwrap_or_default()));
            }
            Action::CloseRoutePrompt => self.route_prompt = None,

            Action::Reload => match &self.route {
                Some(route) => self.action_tx.send(Action::Load(route.clone()))?,
                None => self.action_tx.send(Action::OpenRoutePrompt)?,
            },

            Action::Load(route) => {
                self.route = Some(route.clone());
                self.spawn_load(route.clone());
                self.forward(action)?;
            }

            Action::LoadFailed(msg) => {
                self.notify(Notification::error(msg.clone()));
                self.forward(action)?;
            }

            Action::Save(request) => self.spawn_save(request.clone()),

            Action::Notify(notification) => self.notify(notification.clone()),
            Action::DismissNotification => self.notification = None,

            Action::Tick => {
                if let Some((_, ticks)) = &mut self.notification {
                    *ticks = ticks.saturating_sub(1);
                    if *ticks == 0 {
                        self.notification = None;
                    }
                }
                self.forward(action)?;
            }

            Action::ProjectLoaded(_) | Action::SaveFinished { .. } => self.forward(action)?,
        }
        Ok(())
    }

    /// Hand an action to the screen and queue whatever it answers with.
    fn forward(&mut self, action: &Action) -> Result<()> {
        if let Some(follow_up) = self.screen.update(action)? {
            self.action_tx.send(follow_up)?;
        }
        Ok(())
    }

    fn notify(&mut self, notification: Notification) {
        self.notification = Some((notification, NOTIFICATION_TICKS));
    }

    // ── Rendering ────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let layout = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(area);

        self.screen.render(frame, layout[0]);
        self.render_status_bar(frame, layout[1]);

        if let Some(input) = &self.route_prompt {
            render_route_prompt(frame, area, input);
        }
        if self.help_visible {
            render_help_overlay(frame, area);
        }
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::raw(" ")];
        if let Some((notification, _)) = &self.notification {
            let color = match notification.level {
                NotificationLevel::Success => theme::SUCCESS_GREEN,
                NotificationLevel::Error => theme::ERROR_RED,
                NotificationLevel::Info => theme::NEON_CYAN,
            };
            spans.push(Span::styled(
                notification.message.clone(),
                Style::default().fg(color),
            ));
        } else {
            let route = self
                .route
                .as_ref()
                .map_or_else(|| "no project".to_owned(), ToString::to_string);
            spans.push(Span::styled(route, theme::field_label()));
            if let Some(settings) = self.screen.settings() {
                spans.push(Span::styled(
                    format!("  {}", settings.props().project.name),
                    theme::field_value(),
                ));
            }
        }
        spans.push(Span::styled(
            " │ ? help  g project  r reload  q quit",
            theme::key_hint(),
        ));
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

/// A rect of at most `w`×`h` centered in `area`.
fn centered(area: Rect, w: u16, h: u16) -> Rect {
    let w = w.min(area.width.saturating_sub(4));
    let h = h.min(area.height.saturating_sub(2));
    Rect::new(
        area.x + (area.width.saturating_sub(w)) / 2,
        area.y + (area.height.saturating_sub(h)) / 2,
        w,
        h,
    )
}

fn overlay_block(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_focused())
        .style(Style::default().bg(theme::BG_DARK))
}

fn render_route_prompt(frame: &mut Frame, area: Rect, input: &Input) {
    let popup = centered(area, 50, 4);
    frame.render_widget(Clear, popup);
    let block = overlay_block(" Open project (org/project) ");
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let rows = Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).split(inner);
    text_input::render(frame, input, rows[0]);
    frame.render_widget(
        Paragraph::new(Span::styled("Enter open  Esc cancel", theme::key_hint())),
        rows[1],
    );
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup = centered(area, 54, 20);
    frame.render_widget(Clear, popup);
    let block = overlay_block(" Keyboard Shortcuts ");
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let row = |key: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {key:<12}"), theme::key_hint_key()),
            Span::styled(what, theme::key_hint()),
        ])
    };
    let heading =
        |text: &'static str| Line::from(Span::styled(text, Style::default().fg(theme::NEON_CYAN)));

    let help_text = vec![
        Line::from(""),
        heading("  Form"),
        row("j/k ↑/↓", "Move between fields"),
        row("Enter", "Edit text / toggle / next choice"),
        row("Space", "Toggle"),
        row("h/l ←/→", "Previous / next choice or step"),
        row("s", "Save all fields"),
        row("u", "Discard unsaved changes"),
        Line::from(""),
        heading("  Global"),
        row("g", "Open another project"),
        row("r", "Reload from the server"),
        row("Esc", "Dismiss notification"),
        row("?", "This help"),
        row("q", "Quit"),
        Line::from(""),
        Line::from(Span::styled("            Esc or ? to close", theme::key_hint())),
    ];
    frame.render_widget(Paragraph::new(help_text), inner);
}
