// Interactive chat surface - terminal UI for asking about the statement
//
// One ChatSession per run: the full history is re-rendered above the input
// line and the new exchange is appended after each answer. The gateway call
// is async, driven from this sync event loop through a tokio runtime.

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;
use tokio::runtime::Runtime;

use statement_assistant::{build_prompt, ChatSession, Gateway, Ledger};

/// Chat surface state
pub struct App {
    pub session: ChatSession,
    pub input: String,
    /// Lines the user has scrolled up from the bottom of the history
    pub scroll_back: u16,
    /// Shown while a question is out at the model
    pub busy: bool,
}

impl App {
    pub fn new() -> Self {
        App {
            session: ChatSession::new(),
            input: String::new(),
            scroll_back: 0,
            busy: false,
        }
    }

    pub fn scroll_up(&mut self) {
        self.scroll_back = self.scroll_back.saturating_add(3);
    }

    pub fn scroll_down(&mut self) {
        self.scroll_back = self.scroll_back.saturating_sub(3);
    }
}

/// Run the chat surface until the user quits (Esc or Ctrl+C)
pub fn run_ui(ledger: &Ledger, gateway: &Gateway, runtime: &Runtime) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new();
    let res = run_app(&mut terminal, &mut app, ledger, gateway, runtime);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    ledger: &Ledger,
    gateway: &Gateway,
    runtime: &Runtime,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Esc => return Ok(()),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(())
                }
                KeyCode::Enter => {
                    let question = app.input.trim().to_string();
                    if question.is_empty() {
                        continue;
                    }
                    app.input.clear();

                    // Show the busy state before the blocking round-trip
                    app.busy = true;
                    terminal.draw(|f| ui(f, app))?;

                    let prompt = build_prompt(ledger, &question);
                    let answer = runtime.block_on(gateway.ask(&prompt));

                    app.session.push(question, answer);
                    app.busy = false;
                    app.scroll_back = 0;
                }
                KeyCode::Backspace => {
                    app.input.pop();
                }
                KeyCode::PageUp => app.scroll_up(),
                KeyCode::PageDown => app.scroll_down(),
                KeyCode::Char(c) => app.input.push(c),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(f.size());

    render_history(f, app, chunks[0]);
    render_input(f, app, chunks[1]);

    let help = Paragraph::new(Line::from(vec![
        Span::styled("Enter", Style::default().fg(Color::Cyan)),
        Span::raw(" ask  "),
        Span::styled("PgUp/PgDn", Style::default().fg(Color::Cyan)),
        Span::raw(" scroll  "),
        Span::styled("Esc", Style::default().fg(Color::Cyan)),
        Span::raw(" quit"),
    ]))
    .style(Style::default().fg(Color::DarkGray));
    f.render_widget(help, chunks[2]);
}

fn render_history(f: &mut Frame, app: &App, area: ratatui::layout::Rect) {
    let mut lines: Vec<Line> = Vec::new();

    if app.session.is_empty() && !app.busy {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "  Ask a question about your transactions...",
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    for exchange in app.session.exchanges() {
        lines.push(Line::from(vec![
            Span::styled(
                "You: ",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw(exchange.question.clone()),
        ]));
        lines.push(Line::from(Span::styled(
            "Assistant:",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )));
        for answer_line in exchange.answer.lines() {
            lines.push(Line::from(format!("  {}", answer_line)));
        }
        lines.push(Line::from(""));
    }

    if app.busy {
        lines.push(Line::from(Span::styled(
            "Analyzing...",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    // Stick to the bottom of the history unless the user scrolled back.
    // The paragraph renders with Wrap, so the offset has to count rendered
    // rows, not logical lines.
    let inner_width = area.width.saturating_sub(2).max(1);
    let inner_height = area.height.saturating_sub(2);
    let total: u16 = lines
        .iter()
        .map(|line| wrapped_rows(line.width(), inner_width))
        .sum();
    let bottom = total.saturating_sub(inner_height);
    let scroll = bottom.saturating_sub(app.scroll_back.min(bottom));

    let history = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Bank Statement Assistant "),
        );
    f.render_widget(history, area);
}

/// Rows a line occupies once wrapped to the given width.
/// An empty line still takes one row.
fn wrapped_rows(line_width: usize, inner_width: u16) -> u16 {
    let width = inner_width as usize;
    ((line_width.max(1) + width - 1) / width) as u16
}

fn render_input(f: &mut Frame, app: &App, area: ratatui::layout::Rect) {
    let input = Paragraph::new(app.input.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Your question "),
    );
    f.render_widget(input, area);

    // Cursor at the end of the typed text
    f.set_cursor(area.x + 1 + app.input.chars().count() as u16, area.y + 1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_starts_idle_and_empty() {
        let app = App::new();
        assert!(app.session.is_empty());
        assert!(app.input.is_empty());
        assert!(!app.busy);
    }

    #[test]
    fn test_scroll_back_saturates_at_zero() {
        let mut app = App::new();
        app.scroll_down();
        assert_eq!(app.scroll_back, 0);

        app.scroll_up();
        app.scroll_up();
        assert_eq!(app.scroll_back, 6);
    }

    #[test]
    fn test_wrapped_rows_counts_rendered_rows() {
        // Empty and exact-fit lines take one row
        assert_eq!(wrapped_rows(0, 40), 1);
        assert_eq!(wrapped_rows(40, 40), 1);
        // One character past the width wraps onto a second row
        assert_eq!(wrapped_rows(41, 40), 2);
        assert_eq!(wrapped_rows(120, 40), 3);
    }
}
