//! Evaluation form tab: the three sub-score selectors, patient data, and
//! the live score panel.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::{App, AppState, PatientField};
use crate::i18n;
use crate::scoring::{self, Field, Severity};
use crate::ui::styles;

pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_selectors(f, app, columns[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Length(10), Constraint::Min(4)])
        .split(columns[1]);

    render_patient_form(f, app, right[0]);
    render_score_panel(f, app, right[1]);
    render_protocol(f, app, right[2]);
}

fn render_selectors(f: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    for (field, row) in [
        (Field::Ocular, rows[0]),
        (Field::Verbal, rows[1]),
        (Field::Motor, rows[2]),
    ] {
        render_selector(f, app, field, row);
    }
}

fn render_selector(f: &mut Frame, app: &App, field: Field, area: Rect) {
    let bundle = i18n::t();
    let section = bundle.section(field);
    let selected = match field {
        Field::Ocular => app.scores.ocular,
        Field::Verbal => app.scores.verbal,
        Field::Motor => app.scores.motor,
    };
    let focused = app.focused_field == field && app.state == AppState::Normal;

    let items: Vec<ListItem> = section
        .options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let value = (i + 1) as u8;
            let marker = if selected == Some(value) { "●" } else { " " };
            let line = Line::from(vec![
                Span::styled(format!(" {} {} ", marker, value), styles::title_style()),
                Span::styled(*option, styles::list_item_style()),
                Span::styled(
                    format!("  {}", section.descriptions[i]),
                    styles::muted_style(),
                ),
            ]);
            if selected == Some(value) {
                ListItem::new(line).style(styles::selected_style())
            } else {
                ListItem::new(line)
            }
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(styles::border_style(focused))
            .title(Span::styled(section.title, styles::title_style())),
    );
    f.render_widget(list, area);
}

fn render_patient_form(f: &mut Frame, app: &App, area: Rect) {
    let editing = app.state == AppState::EditingPatient;
    let fields = [
        PatientField::Name,
        PatientField::Age,
        PatientField::PatientId,
        PatientField::Location,
        PatientField::Evaluator,
        PatientField::Notes,
    ];

    let lines: Vec<Line> = fields
        .iter()
        .map(|&field| {
            let active = editing && app.patient_field == field;
            let cursor = if active { "▏" } else { "" };
            Line::from(vec![
                Span::styled(format!("{:<12}", field.label()), styles::muted_style()),
                Span::styled(
                    format!("{}{}", app.patient_field_value(field), cursor),
                    if active {
                        styles::search_style()
                    } else {
                        styles::list_item_style()
                    },
                ),
            ])
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(editing))
        .title("Paciente [p]");
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_score_panel(f: &mut Frame, app: &App, area: Rect) {
    let bundle = i18n::t();
    let total = app.total_score();
    let severity = app.severity();
    let complete = scoring::is_complete(&app.scores);

    let mut lines = vec![
        Line::from(Span::styled(bundle.score_total, styles::muted_style())),
        Line::from(Span::styled(
            format!("{}/15", total),
            styles::severity_style(severity),
        )),
        Line::from(Span::styled(
            bundle.band_label(severity),
            styles::severity_style(severity),
        )),
    ];

    if complete {
        if scoring::is_critical(total) {
            lines.push(Line::from(Span::styled(
                bundle.alert_critical,
                styles::error_style(),
            )));
        } else if severity == Severity::Severe {
            lines.push(Line::from(Span::styled(
                bundle.alert_severe,
                styles::error_style(),
            )));
        }
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false))
        .title(Span::styled(bundle.title, styles::title_style()));
    f.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: true }).block(block),
        area,
    );
}

fn render_protocol(f: &mut Frame, app: &App, area: Rect) {
    let bundle = i18n::t();
    let total = app.total_score();

    let text = if !scoring::is_complete(&app.scores) {
        bundle.subtitle
    } else if scoring::is_critical(total) {
        bundle.protocols.critical
    } else {
        match app.severity() {
            Severity::Mild => bundle.protocols.mild,
            Severity::Moderate => bundle.protocols.moderate,
            Severity::Severe => bundle.protocols.severe,
            Severity::Incomplete => bundle.subtitle,
        }
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false))
        .title(bundle.protocols.title);
    f.render_widget(
        Paragraph::new(text).wrap(Wrap { trim: true }).block(block),
        area,
    );
}
