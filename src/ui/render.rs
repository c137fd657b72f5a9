//! Top-level rendering: header with tabs, active tab content, status bar,
//! and modal overlays.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Tabs};
use ratatui::Frame;

use crate::app::{App, AppState, Tab};
use crate::i18n;
use crate::ui::styles;
use crate::ui::tabs::{evaluate, history};

pub fn render(f: &mut Frame, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_header(f, app, layout[0]);

    match app.current_tab {
        Tab::Evaluate => evaluate::render(f, app, layout[1]),
        Tab::History => history::render(f, app, layout[1]),
    }

    render_status_bar(f, app, layout[2]);

    match app.state {
        AppState::ShowingHelp => render_help(f),
        AppState::ConfirmingClear => render_confirm_clear(f),
        _ => {}
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = [Tab::Evaluate, Tab::History]
        .iter()
        .map(|tab| {
            Line::from(Span::styled(
                tab.title(),
                styles::tab_style(*tab == app.current_tab),
            ))
        })
        .collect();

    let selected = match app.current_tab {
        Tab::Evaluate => 0,
        Tab::History => 1,
    };

    let tabs = Tabs::new(titles).select(selected).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(styles::border_style(false))
            .title(Span::styled(
                format!(" {} [{}] ", i18n::t().title, i18n::current().code()),
                styles::title_style(),
            )),
    );
    f.render_widget(tabs, area);
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let offline = if app.offline_ready {
        Span::styled(" offline ✓ ", styles::success_style())
    } else {
        Span::styled(" offline … ", styles::muted_style())
    };

    let message = match &app.status_message {
        Some(msg) if msg.starts_with('⚠') => Span::styled(msg.clone(), styles::error_style()),
        Some(msg) => Span::styled(msg.clone(), styles::success_style()),
        None => Span::styled(
            "Tab:pestañas  1-6:puntaje  s:guardar  p:paciente  l:idioma  ?:ayuda  q:salir",
            styles::muted_style(),
        ),
    };

    let bar = Paragraph::new(Line::from(vec![offline, Span::raw(" "), message]))
        .style(styles::status_bar_style());
    f.render_widget(bar, area);
}

fn render_help(f: &mut Frame) {
    let area = centered_rect(52, 18, f.area());
    f.render_widget(Clear, area);

    let rows: [(&str, &str); 14] = [
        ("Tab", "switch tab"),
        ("j/k ↓/↑", "move selection"),
        ("1-6", "set focused sub-score"),
        ("s", "save evaluation"),
        ("c", "clear form"),
        ("p", "edit patient data"),
        ("l", "cycle language"),
        ("/", "search history"),
        ("f", "cycle score filter"),
        ("d", "delete selected record"),
        ("C", "clear all history"),
        ("x", "export history to CSV"),
        ("Enter", "load record into form"),
        ("q", "quit"),
    ];

    let lines: Vec<Line> = rows
        .iter()
        .map(|(key, desc)| {
            Line::from(vec![
                Span::styled(format!("{:>9}  ", key), styles::help_key_style()),
                Span::styled(*desc, styles::help_desc_style()),
            ])
        })
        .collect();

    let help = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(styles::border_style(true))
            .title(" Help "),
    );
    f.render_widget(help, area);
}

fn render_confirm_clear(f: &mut Frame) {
    let area = centered_rect(44, 5, f.area());
    f.render_widget(Clear, area);

    let confirm = Paragraph::new(vec![
        Line::from(Span::raw("¿Eliminar todo el historial?")),
        Line::from(vec![
            Span::styled("y", styles::help_key_style()),
            Span::raw(" sí   "),
            Span::styled("n", styles::help_key_style()),
            Span::raw(" no"),
        ]),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(styles::error_style())
            .title(" Confirmar "),
    );
    f.render_widget(confirm, area);
}

/// A centered rect of fixed size within `area`.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}
