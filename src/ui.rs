pub mod charting;
pub mod forms;
pub mod report;
pub mod screen;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, StatusKind};
use crate::section::Section;
use crate::ui::screen::current_screen;

const HORIZONTAL_MARGIN: u16 = 1;

/// Draws the whole frame: section tabs, header, body, status and legend.
pub fn draw(app: &App, f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(3), // tabs
            Constraint::Length(1), // learner / backend
            Constraint::Min(5),    // section body
            Constraint::Length(1), // status
            Constraint::Length(1), // legend
        ])
        .split(f.area());

    let bold_style = Style::default().add_modifier(Modifier::BOLD);

    let tabs = Tabs::new(Section::ALL.iter().map(|s| s.to_string()))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("ABA Data Collection"),
        )
        .select(app.section.index())
        .highlight_style(bold_style.fg(Color::Cyan));
    f.render_widget(tabs, chunks[0]);

    let learner = match app.learner() {
        "" => Span::styled("no learner set", Style::default().fg(Color::Red)),
        name => Span::styled(name.to_string(), bold_style),
    };
    let header = Paragraph::new(Line::from(vec![
        Span::raw("Learner: "),
        learner,
        Span::styled(
            format!("   Date: {}   Storage: {}", app.session_date(), app.store().describe()),
            Style::default().add_modifier(Modifier::DIM),
        ),
    ]));
    f.render_widget(header, chunks[1]);

    let screen = current_screen(app.section);
    screen.render(app, f, chunks[2]);

    if let Some(status) = &app.status {
        let color = match status.kind {
            StatusKind::Info => Color::Cyan,
            StatusKind::Success => Color::Green,
            StatusKind::Error => Color::Red,
        };
        f.render_widget(
            Paragraph::new(Span::styled(
                status.message.as_str(),
                Style::default().fg(color),
            )),
            chunks[3],
        );
    }

    let save = app
        .section
        .save_label()
        .map(|label| format!("(ctrl+s) {label} / "))
        .unwrap_or_default();
    let legend = Paragraph::new(Span::styled(
        format!("{}  {save}(tab/1-6) section / (esc)ape", screen.keys()),
        Style::default().add_modifier(Modifier::ITALIC),
    ));
    f.render_widget(legend, chunks[4]);
}
