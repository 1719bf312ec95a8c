use crate::cluster::node::Role;
use crate::forecast::predictor::forecast;
use crate::state::node_state::{NodeState, Status};
use crate::tui::app::App;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::style::Color::White;
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Padding, Paragraph, Row, Table};

pub fn draw_app(frame: &mut Frame, app: &App) {
    let snapshot = app.registry().snapshot_all();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length((snapshot.len() + 4) as u16),
            Constraint::Length(1),
            Constraint::Min(5),
        ])
        .split(frame.area());

    frame.render_widget(build_header(app), chunks[0]);
    frame.render_widget(build_node_table(app, &snapshot), chunks[1]);
    frame.render_widget(build_stats(app, &snapshot), chunks[3]);
}

fn status_style(status: Status) -> Style {
    match status {
        Status::Overloaded => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        Status::High => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        Status::Normal => Style::default().fg(Color::Green),
        Status::Active => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        Status::Standby => Style::default().add_modifier(Modifier::DIM),
    }
}

fn build_header(app: &'_ App) -> Block<'_> {
    let uptime = app.uptime_seconds();
    Block::new()
        .title(Line::from(vec![
            Span::raw(" loadwatch ").style(Style::default().bold().cyan()),
            Span::raw("—").style(Style::default().add_modifier(Modifier::DIM)),
            Span::raw(format!(" threshold {:.0}% ", app.threshold())).style(Style::default().bold()),
            Span::raw("—").style(Style::default().add_modifier(Modifier::DIM)),
            Span::raw(format!(" up {:02}:{:02} ", uptime / 60, uptime % 60)),
            Span::raw("—").style(Style::default().add_modifier(Modifier::DIM)),
            Span::raw(" press q to quit ").style(Style::default().add_modifier(Modifier::DIM)),
        ]))
        .title_alignment(Alignment::Center)
}

fn build_node_table<'a>(app: &'a App, snapshot: &[NodeState]) -> Table<'a> {
    let nodes = app.registry().nodes();

    Table::new(
        nodes.iter().zip(snapshot).map(|(node, state)| {
            let role = match node.role() {
                Role::Primary => "primary",
                Role::Backup => "backup",
            };
            Row::new(vec![
                Cell::from(node.name().to_owned()),
                Cell::from(role),
                Cell::from(format!("{:>6.1}", state.cpu())),
                Cell::from(format!("{:>6.1}", state.memory())),
                Cell::from(format!("{:>6.1}", state.temperature())),
                Cell::from(format!("{:>6.1}", state.load())),
                Cell::from(state.status().label()).style(status_style(state.status())),
                Cell::from(format!("{:>7.1}", forecast(state.history()))),
            ])
        }),
        [
            Constraint::Length(12),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(12),
            Constraint::Length(9),
        ],
    )
    .header(
        Row::new([
            Cell::from("Node"),
            Cell::from("Role"),
            Cell::from("  CPU%"),
            Cell::from("  Mem%"),
            Cell::from("Temp°C"),
            Cell::from(" Load%"),
            Cell::from("Status"),
            Cell::from("Forecast"),
        ])
        .style(Style::default().bg(Color::DarkGray).fg(White)),
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(Line::from(vec![
                Span::from(" Nodes ").style(Style::default().bold()),
            ]))
            .padding(Padding::horizontal(1)),
    )
}

fn build_stats(app: &App, snapshot: &[NodeState]) -> Paragraph<'static> {
    let mean_load = if snapshot.is_empty() {
        0.0
    } else {
        snapshot.iter().map(|s| s.load()).sum::<f64>() / snapshot.len() as f64
    };
    let overloaded = snapshot
        .iter()
        .filter(|s| s.status() == Status::Overloaded)
        .count();

    Paragraph::new(vec![
        Line::from(format!("Mean load: {mean_load:>5.1}%")),
        Line::from(format!("Overloaded nodes: {overloaded}")),
        Line::from(format!(
            "Nodes: {} primary + {} backup",
            app.primaries(),
            app.backups()
        )),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(Line::from(vec![
                Span::from(" Cluster ").style(Style::default().bold()),
            ]))
            .padding(Padding::horizontal(1)),
    )
}
