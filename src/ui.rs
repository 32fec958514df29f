use std::io::{self, Write};

use chrono::{Datelike, NaiveDate};
use crossterm::{
    cursor::Show,
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use itertools::Itertools;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Block, Borders, Chart, Clear, Dataset, GraphType, List, ListItem, ListState,
        Paragraph, Wrap,
    },
    Frame,
};

use crate::{
    app::{App, Mode},
    loader::SeriesLoader,
    model::PriceSeries,
};

pub const CHART_TITLE: &str = "平均支払総額の推移（万円）";
const X_AXIS_TITLE: &str = "日付";
const Y_AXIS_TITLE: &str = "価格（万円）";
const DATE_LABEL_FORMAT: &str = "%Y/%m/%d";
const LIST_WIDTH: u16 = 24;

/// Restores the terminal on drop, including while unwinding from a panic.
pub struct TerminalGuard<W: Write> {
    out: W,
    raw_mode: bool,
}

impl<W: Write> TerminalGuard<W> {
    pub fn enter(out: W, raw_mode: bool) -> io::Result<Self> {
        if raw_mode {
            enable_raw_mode()?;
        }
        let mut guard = Self { out, raw_mode };
        execute!(guard.out, EnterAlternateScreen, EnableBracketedPaste)?;
        Ok(guard)
    }
}

impl<W: Write> Drop for TerminalGuard<W> {
    fn drop(&mut self) {
        if self.raw_mode {
            let _ = disable_raw_mode();
        }
        let _ = execute!(self.out, DisableBracketedPaste, LeaveAlternateScreen, Show);
    }
}

pub fn draw<L: SeriesLoader>(f: &mut Frame, app: &App<L>) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(f.area());

    let body = if app.show_model_list() {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(LIST_WIDTH), Constraint::Min(0)])
            .split(rows[0]);
        draw_model_list(f, app, columns[0]);
        columns[1]
    } else {
        rows[0]
    };

    draw_chart(f, app, body);
    draw_status(f, app, rows[1]);

    if app.mode == Mode::PathInput {
        draw_path_input(f, app);
    }
    if let Some(message) = &app.message {
        draw_message(f, message);
    }
}

fn draw_model_list<L: SeriesLoader>(f: &mut Frame, app: &App<L>, area: Rect) {
    let items = app
        .models
        .models()
        .iter()
        .map(|m| ListItem::new(m.name.as_str()))
        .collect_vec();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("車種"))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default().with_selected(app.models.selected_index());
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_chart<L: SeriesLoader>(f: &mut Frame, app: &App<L>, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(CHART_TITLE);

    let Some(chart) = app.chart.as_ref().filter(|c| !c.series.is_empty()) else {
        let hint = match &app.chart {
            Some(chart) => format!("{}: 価格データがありません", chart.model),
            None => "o: フォルダを開く / フォルダをドロップ".to_owned(),
        };
        f.render_widget(
            Paragraph::new(hint).alignment(Alignment::Center).block(block),
            area,
        );
        return;
    };

    let data = chart_data(&chart.series);
    let (x_bounds, y_bounds) = bounds(&data);

    let datasets = vec![
        Dataset::default()
            .name(chart.model.as_str())
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&data),
        Dataset::default()
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(Color::Yellow))
            .data(&data),
    ];

    let x_labels = [x_bounds[0], (x_bounds[0] + x_bounds[1]) / 2.0, x_bounds[1]]
        .into_iter()
        .map(|x| Span::raw(date_label(x)))
        .collect_vec();
    let y_labels = [y_bounds[0], (y_bounds[0] + y_bounds[1]) / 2.0, y_bounds[1]]
        .into_iter()
        .map(|y| Span::raw(format!("{y:.1}")))
        .collect_vec();

    let widget = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .title(X_AXIS_TITLE)
                .bounds(x_bounds)
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title(Y_AXIS_TITLE)
                .bounds(y_bounds)
                .labels(y_labels),
        );

    f.render_widget(widget, area);
}

fn draw_status<L: SeriesLoader>(f: &mut Frame, app: &App<L>, area: Rect) {
    let root = app
        .selection
        .as_ref()
        .map(|s| s.root_path.display().to_string())
        .unwrap_or_default();

    let line = Line::from(vec![
        Span::styled(" o ", Style::default().add_modifier(Modifier::REVERSED)),
        Span::raw(" 開く  "),
        Span::styled(" ↑↓ ", Style::default().add_modifier(Modifier::REVERSED)),
        Span::raw(" 車種  "),
        Span::styled(" q ", Style::default().add_modifier(Modifier::REVERSED)),
        Span::raw(" 終了  "),
        Span::styled(root, Style::default().fg(Color::DarkGray)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn draw_path_input<L: SeriesLoader>(f: &mut Frame, app: &App<L>) {
    let area = centered(f.area(), 70, 3);
    let input = Paragraph::new(app.input.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .title("データフォルダを選択してください"),
    );

    f.render_widget(Clear, area);
    f.render_widget(input, area);
}

fn draw_message(f: &mut Frame, message: &str) {
    let area = centered(f.area(), 60, 7);
    let popup = Paragraph::new(message)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::Red))
        .block(Block::default().borders(Borders::ALL).title("エラー"));

    f.render_widget(Clear, area);
    f.render_widget(popup, area);
}

fn centered(area: Rect, percent_x: u16, height: u16) -> Rect {
    let width = (u32::from(area.width) * u32::from(percent_x) / 100) as u16;
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Points as (days since CE, average price).
pub fn chart_data(series: &PriceSeries) -> Vec<(f64, f64)> {
    series
        .iter()
        .map(|p| (p.date.num_days_from_ce() as f64, p.average_price))
        .collect_vec()
}

/// Axis ranges padded so a single point or a flat line still has extent.
pub fn bounds(data: &[(f64, f64)]) -> ([f64; 2], [f64; 2]) {
    let (x_min, x_max) = min_max(data.iter().map(|(x, _)| *x));
    let (y_min, y_max) = min_max(data.iter().map(|(_, y)| *y));

    let x = if x_min == x_max {
        [x_min - 1.0, x_max + 1.0]
    } else {
        [x_min, x_max]
    };

    let pad = if y_min == y_max {
        y_min.abs().max(1.0) * 0.1
    } else {
        (y_max - y_min) * 0.05
    };

    (x, [y_min - pad, y_max + pad])
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

pub fn date_label(days_from_ce: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(days_from_ce.round() as i32)
        .map(|d| d.format(DATE_LABEL_FORMAT).to_string())
        .unwrap_or_default()
}
