//! History tab: saved evaluations with search, range filter, and detail
//! panel for the selected record.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::{App, AppState, RangeFilter};
use crate::i18n;
use crate::scoring::Severity;
use crate::ui::styles;
use crate::utils::{format_optional, format_timestamp, truncate_string};

pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_list(f, app, columns[0]);
    render_detail(f, app, columns[1]);
}

fn render_list(f: &mut Frame, app: &App, area: Rect) {
    let searching = app.state == AppState::Searching;

    let mut title_spans = vec![Span::styled(
        format!("Historial ({})", app.records.len()),
        styles::title_style(),
    )];
    if searching || !app.search_query.is_empty() {
        title_spans.push(Span::styled(
            format!("  /{}", app.search_query),
            styles::search_style(),
        ));
    }
    if app.range_filter != RangeFilter::All {
        title_spans.push(Span::styled(
            format!("  [{}]", app.range_filter.label(i18n::current())),
            styles::search_style(),
        ));
    }

    let items: Vec<ListItem> = app
        .records
        .iter()
        .map(|record| {
            let severity = Severity::from_total(record.total_score);
            let name = format_optional(&record.patient_name, "—");
            let line = Line::from(vec![
                Span::styled(format_timestamp(record.timestamp), styles::muted_style()),
                Span::raw("  "),
                Span::styled(
                    format!("{:>2}/15", record.total_score),
                    styles::severity_style(severity),
                ),
                Span::raw("  "),
                Span::styled(truncate_string(&name, 24), styles::list_item_style()),
            ]);
            ListItem::new(line)
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(styles::border_style(true))
                .title(Line::from(title_spans)),
        )
        .highlight_style(styles::selected_style());

    let mut state = ListState::default();
    if !app.records.is_empty() {
        state.select(Some(app.history_selection));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn render_detail(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false))
        .title("Detalle");

    let Some(record) = app.records.get(app.history_selection) else {
        f.render_widget(
            Paragraph::new(Span::styled("—", styles::muted_style())).block(block),
            area,
        );
        return;
    };

    let severity = Severity::from_total(record.total_score);
    let scores = &record.scores;
    let lines = vec![
        Line::from(vec![
            Span::styled("#", styles::muted_style()),
            Span::styled(record.id.to_string(), styles::list_item_style()),
            Span::raw("  "),
            Span::styled(format_timestamp(record.timestamp), styles::muted_style()),
        ]),
        Line::from(Span::styled(
            format!("{}/15  {}", record.total_score, record.interpretation),
            styles::severity_style(severity),
        )),
        Line::from(Span::raw(format!(
            "O:{}  V:{}  M:{}",
            scores.ocular.map_or("-".to_string(), |v| v.to_string()),
            scores.verbal.map_or("-".to_string(), |v| v.to_string()),
            scores.motor.map_or("-".to_string(), |v| v.to_string()),
        ))),
        Line::from(Span::raw("")),
        detail_line("Paciente", &record.patient_name),
        Line::from(Span::raw(format!(
            "Edad        {}",
            record.patient_age.map_or("—".to_string(), |a| a.to_string())
        ))),
        detail_line("ID", &record.patient_id),
        detail_line("Ubicación", &record.location),
        detail_line("Evaluador", &record.evaluator),
        detail_line("Observaciones", &record.notes),
    ];

    f.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: true }).block(block),
        area,
    );
}

fn detail_line(label: &str, value: &Option<String>) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<12}", label), styles::muted_style()),
        Span::styled(format_optional(value, "—"), styles::list_item_style()),
    ])
}
