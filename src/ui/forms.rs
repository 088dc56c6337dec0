use std::time::Instant;

use itertools::Itertools;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::codes::Choice;
use crate::forms::{DetailsField, DurationForm, SessionDetailsForm, TargetList, TextField, TrialForm};
use crate::scoring::TRIALS_PER_TARGET;
use crate::util::format_number;

const LABEL_WIDTH: usize = 36;
const ROW_LABEL_WIDTH: usize = 16;

fn focused_style() -> Style {
    Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD)
}

fn dim_style() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

fn field_style(focused: bool) -> Style {
    if focused {
        focused_style()
    } else {
        Style::default()
    }
}

/// Display columns between the start of the value and the cursor.
fn cursor_offset(field: &TextField) -> u16 {
    let prefix: String = field.value().chars().take(field.cursor()).collect();
    prefix.width() as u16
}

fn place_cursor(f: &mut Frame, area: Rect, x: u16, y: u16) {
    if x < area.right() && y < area.bottom() {
        f.set_cursor_position(Position::new(x, y));
    }
}

fn padded(label: &str, width: usize) -> String {
    format!("{label:<width$} ")
}

fn select_span<T: std::fmt::Display>(value: T, focused: bool) -> Span<'static> {
    if focused {
        Span::styled(format!("◀ {value} ▶"), focused_style())
    } else {
        Span::raw(format!("  {value}  "))
    }
}

pub fn render_details(form: &SessionDetailsForm, f: &mut Frame, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Session Details");
    let inner = block.inner(area);

    let lines: Vec<Line> = DetailsField::ALL
        .iter()
        .map(|&field| {
            let focused = form.focused() == field;
            let label = Span::styled(padded(field.label(), LABEL_WIDTH), field_style(focused));
            let value = match field {
                DetailsField::StartTime => select_span(form.start_time, focused),
                DetailsField::EndTime => select_span(form.end_time, focused),
                _ => Span::raw(
                    form.text_field(field)
                        .map(|t| t.value().to_string())
                        .unwrap_or_default(),
                ),
            };
            Line::from(vec![label, value])
        })
        .collect();

    f.render_widget(Paragraph::new(lines).block(block), area);

    let focused = form.focused();
    if let Some(text) = form.text_field(focused) {
        let row = DetailsField::ALL
            .iter()
            .position(|d| *d == focused)
            .unwrap_or(0) as u16;
        let x = inner.x + LABEL_WIDTH as u16 + 1 + cursor_offset(text);
        place_cursor(f, inner, x, inner.y + row);
    }
}

fn label_input_lines<'a>(input: &'a TextField, title: &'a str, focused: bool) -> Vec<Line<'a>> {
    vec![
        Line::from(Span::styled(title, field_style(focused))),
        Line::from(Span::raw(input.value())),
        Line::default(),
    ]
}

/// Label input on top, then one select per parsed label.
pub fn render_target_list<T: Choice>(
    form: &TargetList<T>,
    input_title: &str,
    f: &mut Frame,
    area: Rect,
) {
    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);

    let mut lines = label_input_lines(&form.input, input_title, form.input_focused());
    if form.rows().is_empty() {
        lines.push(Line::from(Span::styled(
            "Enter labels above to add rows",
            dim_style(),
        )));
    }
    for (idx, (label, value)) in form.rows().iter().enumerate() {
        let focused = form.focus() == idx + 1;
        lines.push(Line::from(vec![
            Span::styled(padded(label, ROW_LABEL_WIDTH), field_style(focused)),
            select_span(*value, focused),
        ]));
    }

    f.render_widget(Paragraph::new(lines).block(block), area);

    if form.input_focused() {
        place_cursor(f, inner, inner.x + cursor_offset(&form.input), inner.y + 1);
    }
}

pub fn render_trials(form: &TrialForm, f: &mut Frame, area: Rect) {
    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);
    let focused_cell = form.focused_cell();

    let mut lines = label_input_lines(
        &form.input,
        "Targets (comma separated, up to 10)",
        form.input_focused(),
    );

    let header = (1..=TRIALS_PER_TARGET).map(|n| format!("{n:^3}")).join("");
    lines.push(Line::from(Span::styled(
        format!("{}{}   Accuracy", padded("", ROW_LABEL_WIDTH), header),
        dim_style(),
    )));

    for (row, ((label, trials), (_, accuracy))) in
        form.rows().iter().zip(form.accuracies()).enumerate()
    {
        let row_focused = focused_cell.map(|(r, _)| r) == Some(row);
        let mut spans = vec![Span::styled(
            padded(label, ROW_LABEL_WIDTH),
            field_style(row_focused),
        )];
        spans.extend(trials.iter().enumerate().map(|(col, code)| {
            let text = format!("{:^3}", code.to_string());
            if focused_cell == Some((row, col)) {
                Span::styled(text, focused_style().add_modifier(Modifier::REVERSED))
            } else if code.is_correct() {
                Span::styled(text, Style::default().fg(Color::Green))
            } else {
                Span::styled(text, Style::default().fg(Color::Red))
            }
        }));
        spans.push(Span::styled(
            format!("   {}%", format_number(accuracy)),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        lines.push(Line::from(spans));
    }

    f.render_widget(Paragraph::new(lines).block(block), area);

    if form.input_focused() {
        place_cursor(f, inner, inner.x + cursor_offset(&form.input), inner.y + 1);
    }
}

fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

pub fn render_duration(form: &DurationForm, f: &mut Frame, area: Rect) {
    let block = Block::default().borders(Borders::ALL);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(block.inner(area));
    f.render_widget(block, area);

    let timer = match form.timer().elapsed(Instant::now()) {
        Some(elapsed) => Span::styled(
            format!("● Recording  {}", format_clock(elapsed.as_secs())),
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
        ),
        None => Span::styled("Timer idle", dim_style()),
    };
    f.render_widget(
        Paragraph::new(vec![Line::default(), Line::from(timer)])
            .alignment(Alignment::Center),
        chunks[0],
    );

    let episodes = if form.episodes().is_empty() {
        "none yet".to_string()
    } else {
        form.episodes().iter().map(|s| format!("{s}s")).join(", ")
    };
    let summary = vec![
        Line::from(format!("Episodes: {episodes}")),
        Line::from(Span::styled(
            format!("Total Duration: {} seconds", form.total_secs()),
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];
    f.render_widget(Paragraph::new(summary).wrap(Wrap { trim: true }), chunks[1]);
}
