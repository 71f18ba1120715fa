use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, Gauge, GraphType, List, ListItem, Paragraph, Tabs};
use ratatui::Frame;

use crate::app::{App, Tab};
use crate::wave;

pub fn draw(frame: &mut Frame, app: &App) {
    let [tabs_area, main_area, status_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_tabs(frame, app, tabs_area);

    match app.tab {
        Tab::Dashboard => draw_dashboard(frame, app, main_area),
        Tab::History => draw_history(frame, app, main_area),
        Tab::Logs => draw_logs(frame, app, main_area),
    }

    draw_status(frame, app, status_area);
}

/// Two decimal places, e.g. 0.8734 → "87.34%".
pub fn percent_2dp(confidence: f64) -> String {
    format!("{:.2}%", confidence * 100.0)
}

/// One decimal place, e.g. 0.8734 → "87.3%".
pub fn percent_1dp(confidence: f64) -> String {
    format!("{:.1}%", confidence * 100.0)
}

fn draw_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles = vec!["1:Dashboard", "2:History", "3:Logs"];
    let selected = match app.tab {
        Tab::Dashboard => 0,
        Tab::History => 1,
        Tab::Logs => 2,
    };
    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title("vani"))
        .select(selected)
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, area);
}

fn draw_dashboard(frame: &mut Frame, app: &App, area: Rect) {
    let [wave_area, output_area] =
        Layout::horizontal([Constraint::Fill(3), Constraint::Fill(2)]).areas(area);

    draw_waveform(frame, app, wave_area);
    draw_output(frame, app, output_area);
}

fn draw_waveform(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Waveform");

    match wave::sample_points(&app.state.snapshot.wave, &app.wave) {
        Some(points) => {
            let dataset = Dataset::default()
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::Cyan))
                .data(&points);
            let chart = Chart::new(vec![dataset])
                .block(block)
                .x_axis(Axis::default().bounds([0.0, app.wave.width]))
                .y_axis(Axis::default().bounds([0.0, app.wave.height]));
            frame.render_widget(chart, area);
        }
        None => {
            let para = Paragraph::new("Awaiting signal...")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(para, area);
        }
    }
}

fn draw_output(frame: &mut Frame, app: &App, area: Rect) {
    let [sentence_area, gauge_area, metrics_area, recent_area] = Layout::vertical([
        Constraint::Length(4),
        Constraint::Length(3),
        Constraint::Length(2),
        Constraint::Fill(1),
    ])
    .areas(area);

    let sentence = if app.state.snapshot.sentence.is_empty() {
        Span::styled("Waiting for signal...", Style::default().fg(Color::DarkGray))
    } else {
        Span::styled(
            app.state.snapshot.sentence.as_str(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )
    };
    let para = Paragraph::new(Line::from(sentence))
        .block(Block::default().borders(Borders::ALL).title("Decoded Output"));
    frame.render_widget(para, sentence_area);

    let confidence = app.state.snapshot.confidence.clamp(0.0, 1.0);
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Confidence"))
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(confidence)
        .label(percent_2dp(app.state.snapshot.confidence));
    frame.render_widget(gauge, gauge_area);

    let metrics = format!(
        " accuracy {}   prediction {}   latency ~1s",
        percent_1dp(app.state.snapshot.confidence),
        if app.state.snapshot.prediction.is_empty() {
            "-"
        } else {
            app.state.snapshot.prediction.as_str()
        },
    );
    frame.render_widget(Paragraph::new(metrics), metrics_area);

    // A peek at the newest history entries; full list on the History tab.
    let items: Vec<ListItem> = app
        .state
        .history
        .iter()
        .take(8)
        .map(|e| ListItem::new(format!("{}  {}", e.timestamp, e.text)))
        .collect();
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Recent ({})", app.state.history.len())),
    );
    frame.render_widget(list, recent_area);
}

fn draw_history(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("History ({})", app.state.history.len()));

    if app.state.history.is_empty() {
        let para = Paragraph::new("No sentences yet")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(para, area);
        return;
    }

    let items: Vec<ListItem> = app
        .state
        .history
        .iter()
        .map(|e| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{}  ", e.timestamp),
                    Style::default().fg(Color::Cyan),
                ),
                Span::raw(e.text.as_str()),
            ]))
        })
        .collect();
    frame.render_widget(List::new(items).block(block), area);
}

fn draw_logs(frame: &mut Frame, app: &App, area: Rect) {
    let logs = app.logs.lock().unwrap();
    let total = logs.len();

    let visible_height = area.height.saturating_sub(2) as usize; // account for borders
    let scroll = app.log_scroll.min(total.saturating_sub(visible_height));
    let end = total.saturating_sub(scroll);
    let start = end.saturating_sub(visible_height);

    let items: Vec<ListItem> = logs
        .iter()
        .skip(start)
        .take(end - start)
        .map(|s| ListItem::new(s.as_str()))
        .collect();

    let title = if app.log_auto_scroll {
        "Logs (auto-scroll)"
    } else {
        "Logs (Up/Down=scroll, G=bottom)"
    };
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(list, area);
}

fn draw_status(frame: &mut Frame, app: &App, area: Rect) {
    let link = if app.state.link_up {
        Span::styled("● LIVE", Style::default().fg(Color::Green))
    } else {
        Span::styled("○ OFFLINE", Style::default().fg(Color::Red))
    };
    let playback = if app.state.playback_enabled {
        "on"
    } else {
        "off"
    };

    let mut spans = vec![
        link,
        Span::raw(format!(
            "  polls:{}  playback:{} (p=toggle, v=ask, q=quit)",
            app.state.polls, playback,
        )),
    ];
    if let Some(ref err) = app.state.last_error {
        spans.push(Span::styled(
            format!("  {}", err),
            Style::default().fg(Color::Red),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
