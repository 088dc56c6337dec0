use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::report::{report_title, Report};
use crate::ui::charting::{date_axis_labels, series_color, series_summary, x_bounds, PERCENT_BOUNDS};

pub fn render_report(app: &App, f: &mut Frame, area: Rect) {
    match &app.report {
        Some(report) => render_loaded(report, f, area),
        None => {
            let hint = if app.learner().is_empty() {
                "Enter a learner name under Session Details, then press (r) to load progress."
                    .to_string()
            } else {
                format!("Press (r) to load progress for {}.", app.learner())
            };
            let widget = Paragraph::new(Span::styled(
                hint,
                Style::default().add_modifier(Modifier::ITALIC),
            ))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Progress & Reports"));
            f.render_widget(widget, area);
        }
    }
}

fn render_loaded(report: &Report, f: &mut Frame, area: Rect) {
    let legend_height = report.series.len().max(1) as u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(8),
            Constraint::Length(legend_height),
            Constraint::Length(6),
        ])
        .split(area);

    let bold_style = Style::default().add_modifier(Modifier::BOLD);

    let data: Vec<Vec<(f64, f64)>> = report
        .series
        .iter()
        .map(|s| s.points.iter().map(|&p| p.into()).collect())
        .collect();

    let datasets = report
        .series
        .iter()
        .zip(&data)
        .enumerate()
        .map(|(idx, (series, points))| {
            Dataset::default()
                .name(series.name.clone())
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(series_color(idx)))
                .data(points)
        })
        .collect::<Vec<_>>();

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(report_title(&report.learner)),
        )
        .x_axis(
            Axis::default()
                .title("Date")
                .bounds(x_bounds(&report.series))
                .labels(
                    date_axis_labels(&report.dates)
                        .into_iter()
                        .map(|d| Span::styled(d, bold_style)),
                ),
        )
        .y_axis(
            Axis::default()
                .title("Performance (%)")
                .bounds(PERCENT_BOUNDS)
                .labels(["0", "50", "100"].map(|l| Span::styled(l, bold_style))),
        );
    f.render_widget(chart, chunks[0]);

    let legend: Vec<Line> = if report.series.is_empty() {
        vec![Line::from(Span::styled(
            "No percentage columns to plot yet",
            Style::default().add_modifier(Modifier::DIM),
        ))]
    } else {
        report
            .series
            .iter()
            .enumerate()
            .map(|(idx, s)| {
                Line::from(Span::styled(
                    series_summary(s),
                    Style::default().fg(series_color(idx)),
                ))
            })
            .collect()
    };
    f.render_widget(Paragraph::new(legend), chunks[1]);

    let notes = Paragraph::new(report.notes.as_str())
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Session Notes"));
    f.render_widget(notes, chunks[2]);
}
