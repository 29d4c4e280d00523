use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle},
        Axis, Chart, Dataset, GraphType, Paragraph, Widget,
    },
};

use crate::game::Phase;
use crate::target::Rgb;
use crate::{util, App};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

// Field tints carried over from the original palette: green before a
// session, black while one runs, blue once it is over.
const IDLE_BACKGROUND: Rgb = Rgb(0x00, 0x80, 0x00);
const RUNNING_BACKGROUND: Rgb = Rgb(0x00, 0x00, 0x00);
const FINISHED_BACKGROUND: Rgb = Rgb(0x00, 0x00, 0x80);

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.game.phase {
            Phase::Idle => render_idle(area, buf),
            Phase::Running => render_playfield(self, area, buf),
            Phase::Finished => render_results(self, area, buf),
        }
    }
}

fn legend_line() -> Line<'static> {
    let mut spans = Vec::new();
    for direction in crate::target::Direction::ALL {
        spans.push(Span::styled(
            format!(" {} {} ", direction.arrow(), direction),
            Style::default()
                .fg(color(direction.color()))
                .add_modifier(Modifier::BOLD),
        ));
    }
    Line::from(spans)
}

fn render_idle(area: Rect, buf: &mut Buffer) {
    buf.set_style(area, Style::default().bg(color(IDLE_BACKGROUND)));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints(
            [
                Constraint::Percentage(40),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
            ]
            .as_ref(),
        )
        .split(area);

    let title = Paragraph::new(Span::styled(
        "blip",
        Style::default().add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center);
    title.render(chunks[1], buf);

    let prompt = Paragraph::new(Span::styled(
        "press enter to start",
        Style::default()
            .add_modifier(Modifier::ITALIC)
            .add_modifier(Modifier::DIM),
    ))
    .alignment(Alignment::Center);
    prompt.render(chunks[2], buf);

    Paragraph::new(legend_line())
        .alignment(Alignment::Center)
        .render(chunks[3], buf);
}

fn render_playfield(app: &App, area: Rect, buf: &mut Buffer) {
    let game = &app.game;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(1)
        .constraints(
            [
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(area);

    let status = Paragraph::new(Span::styled(
        format!(
            "round {}/{}   {} misses   idle strikes {}/{}",
            game.hits + 1,
            game.config.max_matches,
            game.misses,
            game.sequential_idle_misses,
            game.config.max_idle_misses
        ),
        Style::default().add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center);
    status.render(chunks[0], buf);

    let target = *game.target();
    let circle = Circle {
        x: target.x,
        y: target.y,
        radius: game.config.radius,
        color: color(target.direction.color()),
    };
    let canvas = Canvas::default()
        .background_color(color(RUNNING_BACKGROUND))
        .x_bounds([0.0, game.config.width])
        .y_bounds([0.0, game.config.height])
        .paint(move |ctx| ctx.draw(&circle));
    canvas.render(chunks[1], buf);

    Paragraph::new(legend_line())
        .alignment(Alignment::Center)
        .render(chunks[2], buf);
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let game = &app.game;
    let summary = match game.summary() {
        Some(s) => *s,
        None => return,
    };

    buf.set_style(area, Style::default().bg(color(FINISHED_BACKGROUND)));

    let bold_style = Style::default().add_modifier(Modifier::BOLD);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints(
            [
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(area);

    let points: Vec<(f64, f64)> = game
        .results
        .iter()
        .enumerate()
        .map(|(i, &ms)| ((i + 1) as f64, ms))
        .collect();
    let (last_round, highest_ms) = chart_bounds(&points);

    let datasets = vec![Dataset::default()
        .marker(ratatui::symbols::Marker::Braille)
        .style(Style::default().fg(Color::Magenta))
        .graph_type(GraphType::Line)
        .data(&points)];

    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("round")
                .bounds([1.0, last_round])
                .labels(vec![
                    Span::styled("1", bold_style),
                    Span::styled(format!("{last_round:.0}"), bold_style),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("ms")
                .bounds([0.0, highest_ms])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(format!("{highest_ms:.0}"), bold_style),
                ]),
        );
    chart.render(chunks[0], buf);

    let stats = Paragraph::new(Span::styled(
        format!(
            "{} s avg   {} score   {:.0} ms sd",
            util::format_secs(summary.average_ms),
            summary.score,
            summary.std_dev_ms
        ),
        bold_style,
    ))
    .alignment(Alignment::Center);
    stats.render(chunks[1], buf);

    let instructions = Paragraph::new(Span::styled(
        "(enter) play again  (r) reset  (esc) quit",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center);
    instructions.render(chunks[3], buf);
}

/// X (rounds) and Y (latency ms) bounds for the results chart
fn chart_bounds(points: &[(f64, f64)]) -> (f64, f64) {
    let mut highest = 0.0;
    for &(_, ms) in points {
        if ms > highest {
            highest = ms;
        }
    }
    let last_round = points.last().map_or(1.0, |p| p.0).max(1.0);
    (last_round, highest.max(1.0).round())
}
