use crate::api_client::RecommendationService;
use crate::config::Config;
use crate::services::SubmissionDispatcher;
use crate::session::SearchSession;
use crate::ui::key_dispatcher::KeyDispatcher;
use crate::ui::render::{self, StatusKind};
use crate::utils::logging::{get_log_buffer, LogRingBuffer};
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{debug, info};
use tui_input::{backend::crossterm::EventHandler, Input};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Input,
    Results,
}

pub struct TuiApp {
    session: SearchSession,
    dispatcher: SubmissionDispatcher,
    keys: KeyDispatcher,
    input: Input,
    focus: Focus,
    list_state: ListState,
    config: Config,
    base_url: String,
    log_buffer: Option<LogRingBuffer>,
    show_help: bool,
    show_logs: bool,
    should_quit: bool,
}

impl TuiApp {
    pub fn new(
        config: Config,
        base_url: String,
        service: Arc<dyn RecommendationService>,
        runtime: Handle,
    ) -> Self {
        Self {
            session: SearchSession::new(),
            dispatcher: SubmissionDispatcher::new(service, runtime),
            keys: KeyDispatcher::new(),
            input: Input::default(),
            focus: Focus::Input,
            list_state: ListState::default(),
            config,
            base_url,
            log_buffer: get_log_buffer(),
            show_help: false,
            show_logs: false,
            should_quit: false,
        }
    }

    pub fn session(&self) -> &SearchSession {
        &self.session
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        while !self.should_quit {
            self.poll_completions();
            terminal.draw(|f| self.draw(f))?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }
        }
        Ok(())
    }

    /// Apply any finished requests to the session
    pub fn poll_completions(&mut self) {
        if self.dispatcher.drain_into(&mut self.session) > 0 {
            let has_results = !self.session.state().results().is_empty();
            self.list_state.select(if has_results { Some(0) } else { None });
            if !has_results {
                self.focus = Focus::Input;
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if let Some(action) = self.keys.get_global_action(&key) {
            let action = action.to_string();
            self.perform(&action);
            return;
        }

        let action = match self.focus {
            Focus::Input => self.keys.get_input_action(&key),
            Focus::Results => self.keys.get_results_action(&key),
        }
        .map(str::to_string);

        match action {
            Some(action) => self.perform(&action),
            None if self.focus == Focus::Input => {
                self.input.handle_event(&Event::Key(key));
                self.session.update_query(self.input.value());
            }
            None => {}
        }
    }

    fn perform(&mut self, action: &str) {
        debug!(target: "ui", "Action: {}", action);
        match action {
            "quit" => {
                if self.show_help {
                    self.show_help = false;
                } else {
                    self.should_quit = true;
                }
            }
            "toggle_help" => self.show_help = !self.show_help,
            "toggle_logs" => self.show_logs = !self.show_logs,
            "toggle_focus" => {
                self.focus = match self.focus {
                    Focus::Input if !self.session.state().results().is_empty() => Focus::Results,
                    _ => Focus::Input,
                }
            }
            "focus_input" => self.focus = Focus::Input,
            "focus_results" => {
                if !self.session.state().results().is_empty() {
                    self.focus = Focus::Results;
                }
            }
            "submit" => {
                if let Some(dispatch) = self.session.submit() {
                    self.dispatcher.dispatch(dispatch);
                }
            }
            "clear_query" => {
                self.input.reset();
                self.session.update_query("");
            }
            "next_result" => self.move_selection(1),
            "previous_result" => self.move_selection(-1),
            "first_result" => self.select_edge(false),
            "last_result" => self.select_edge(true),
            other => debug!(target: "ui", "Unhandled action: {}", other),
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let count = self.session.state().results().len();
        if count == 0 {
            return;
        }
        let current = self.list_state.selected().unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(count as isize) as usize;
        self.list_state.select(Some(next));
    }

    fn select_edge(&mut self, last: bool) {
        let count = self.session.state().results().len();
        if count > 0 {
            self.list_state
                .select(Some(if last { count - 1 } else { 0 }));
        }
    }

    fn draw(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Query input
                Constraint::Length(1), // Status line
                Constraint::Min(5),    // Results (and logs)
                Constraint::Length(1), // Footer
            ])
            .split(f.area());

        self.draw_input(f, chunks[0]);
        self.draw_status(f, chunks[1]);

        if self.show_logs {
            let panes = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
                .split(chunks[2]);
            self.draw_results(f, panes[0]);
            self.draw_logs(f, panes[1]);
        } else {
            self.draw_results(f, chunks[2]);
        }

        let footer = Paragraph::new(format!(
            " {} · Enter search · Tab switch pane · F5 logs · F1 help · Esc quit",
            self.base_url
        ))
        .style(Style::default().fg(Color::DarkGray));
        f.render_widget(footer, chunks[3]);

        if self.show_help {
            self.draw_help(f);
        }
    }

    fn draw_input(&self, f: &mut Frame, area: Rect) {
        let state = self.session.state();
        let focused = self.focus == Focus::Input;
        let border_style = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };

        let label = render::submit_label(state);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(format!(" {} Describe your look ", self.config.display.icons.search))
            .title_top(Line::from(format!(" [{}] ", label)).right_aligned());

        let width = area.width.saturating_sub(2) as usize;
        let scroll = self.input.visual_scroll(width);

        let paragraph = if self.input.value().is_empty() {
            Paragraph::new(render::INPUT_HINT).style(Style::default().fg(Color::DarkGray))
        } else {
            Paragraph::new(self.input.value()).scroll((0, scroll as u16))
        };
        f.render_widget(paragraph.block(block), area);

        if focused {
            let cursor = self.input.visual_cursor().max(scroll) - scroll;
            f.set_cursor_position((area.x + 1 + cursor as u16, area.y + 1));
        }
    }

    fn draw_status(&self, f: &mut Frame, area: Rect) {
        let status = render::status_line(self.session.state(), &self.config.display);
        let style = match status.kind {
            StatusKind::Hint => Style::default().fg(Color::DarkGray),
            StatusKind::Busy => Style::default().fg(Color::Yellow),
            StatusKind::Error => Style::default().fg(Color::Red),
            StatusKind::Success => Style::default().fg(Color::Green),
        };
        f.render_widget(Paragraph::new(format!(" {}", status.text)).style(style), area);
    }

    fn draw_results(&mut self, f: &mut Frame, area: Rect) {
        let display = &self.config.display;
        let results = self.session.state().results();
        let border_style = if self.focus == Focus::Results {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Results ");

        let items: Vec<ListItem> = results
            .iter()
            .enumerate()
            .map(|(i, outfit)| {
                let mut lines: Vec<Line> = render::outfit_lines(i + 1, outfit, display)
                    .into_iter()
                    .enumerate()
                    .map(|(n, text)| {
                        let style = match n {
                            0 => Style::default().add_modifier(Modifier::BOLD),
                            1 => Style::default().fg(Color::Gray),
                            _ => Style::default().fg(Color::DarkGray),
                        };
                        Line::from(Span::styled(text, style))
                    })
                    .collect();
                lines.push(Line::from(""));
                ListItem::new(lines)
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(Color::DarkGray))
            .highlight_symbol("▶ ");
        f.render_stateful_widget(list, area, &mut self.list_state);
    }

    fn draw_logs(&self, f: &mut Frame, area: Rect) {
        let panes = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(8), Constraint::Min(3)])
            .split(area);

        let history = self.session.history();
        let events: Vec<Line> = history
            .iter()
            .skip(history.len().saturating_sub(6))
            .map(|event| Line::from(event.describe()))
            .collect();
        f.render_widget(
            Paragraph::new(events)
                .block(Block::default().borders(Borders::ALL).title(" Session "))
                .wrap(Wrap { trim: true }),
            panes[0],
        );

        let visible = panes[1].height.saturating_sub(2) as usize;
        let logs: Vec<Line> = self
            .log_buffer
            .as_ref()
            .map(|buffer| buffer.get_recent(visible))
            .unwrap_or_default()
            .into_iter()
            .map(|entry| {
                let color = match entry.level.as_str() {
                    "ERROR" => Color::Red,
                    "WARN" => Color::Yellow,
                    "INFO" => Color::Green,
                    _ => Color::DarkGray,
                };
                Line::from(Span::styled(
                    entry.format_for_display(),
                    Style::default().fg(color),
                ))
            })
            .collect();
        f.render_widget(
            Paragraph::new(logs).block(Block::default().borders(Borders::ALL).title(" Logs ")),
            panes[1],
        );
    }

    fn draw_help(&self, f: &mut Frame) {
        let area = centered_rect(60, 50, f.area());
        let lines: Vec<Line> = KeyDispatcher::help_entries()
            .into_iter()
            .map(|(key, description)| {
                Line::from(vec![
                    Span::styled(
                        format!("{:<14}", key),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(description),
                ])
            })
            .collect();

        f.render_widget(Clear, area);
        f.render_widget(
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Help ")),
            area,
        );
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Set up the terminal, run the app, and restore the terminal afterwards
pub fn run_tui(
    config: Config,
    base_url: String,
    service: Arc<dyn RecommendationService>,
    runtime: Handle,
) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    info!(target: "ui", "Starting TUI against {}", base_url);
    let mut app = TuiApp::new(config, base_url, service, runtime);
    let result = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}
