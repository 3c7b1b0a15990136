use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::symbols;
use tui::text::{Span, Spans};
use tui::widgets::{
    Axis, BarChart, Block, Borders, Chart, Dataset, GraphType, List, ListItem, Paragraph, Tabs, Wrap,
};
use tui::Frame;

use crate::app::{App, ChartView, MenuItem, MENU_TITLES};
use crate::chart::{hex_to_rgb, ChartData, ChartSpec, Palette, Series};
use crate::reactive::bindings;

const SERIES_COLORS: [Color; 3] = [Color::Yellow, Color::Magenta, Color::Green];
const PIE_BAR_WIDTH: f64 = 30.0;

fn rgb(hex: &str) -> Color {
    match hex_to_rgb(hex) {
        Some((r, g, b)) => Color::Rgb(r, g, b),
        None => Color::Reset,
    }
}

fn palette_block(title: &str, palette: Palette) -> Block<'_> {
    Block::default()
        .title(Span::styled(
            title,
            Style::default()
                .fg(rgb(palette.font()))
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .style(Style::default().bg(rgb(palette.paper_bg())).fg(rgb(palette.font())))
}

pub fn draw<B: Backend>(f: &mut Frame<B>, app: &App) {
    let size = f.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Length(3), Constraint::Min(10)].as_ref())
        .split(size);

    let header_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(chunks[0]);

    let menu = MENU_TITLES
        .iter()
        .map(|t| {
            let (first, rest) = t.split_at(1);
            Spans::from(vec![
                Span::styled(
                    first,
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::UNDERLINED),
                ),
                Span::styled(rest, Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();

    let tabs = Tabs::new(menu)
        .select(app.active_menu_item.into())
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::Cyan))
        .highlight_style(Style::default().fg(Color::Yellow))
        .divider(Span::raw("|"));
    f.render_widget(tabs, header_chunks[0]);
    f.render_widget(status(app), header_chunks[1]);

    match app.active_menu_item {
        MenuItem::Overview => draw_overview(f, app, chunks[1]),
        MenuItem::Community | MenuItem::State => draw_selection(f, app, chunks[1]),
    }
}

fn status<'a>(app: &App) -> Paragraph<'a> {
    let line = match app.active_menu_item.selector() {
        Some(id) => {
            let selector = app.selector(id);
            let current = selector
                .current()
                .map(|s| s.key().to_string())
                .unwrap_or_else(|| "-".to_string());
            format!(
                "{}: {} ({}/{})  ←/→ to change",
                id,
                current,
                selector.index() + 1,
                selector.options().len()
            )
        }
        None => format!(
            "{} communities, {} charts",
            app.dashboard().dataset().len(),
            app.dashboard().static_charts().len()
        ),
    };
    Paragraph::new(Spans::from(Span::styled(
        line,
        Style::default().add_modifier(Modifier::BOLD),
    )))
    .block(Block::default().title("Selection").borders(Borders::ALL))
    .style(Style::default().fg(Color::Green))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
}

fn draw_overview<B: Backend>(f: &mut Frame<B>, app: &App, area: Rect) {
    let charts = app.dashboard().static_charts();
    let rows = (charts.len() + 1) / 2;
    if rows == 0 {
        return;
    }
    let row_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, rows as u32); rows])
        .split(area);

    for (row, pair) in charts.chunks(2).enumerate() {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, pair.len() as u32); pair.len()])
            .split(row_chunks[row]);
        for (spec, cell) in pair.iter().zip(cells) {
            draw_chart(f, spec, cell);
        }
    }
}

fn draw_selection<B: Backend>(f: &mut Frame<B>, app: &App, area: Rect) {
    let id = match app.active_menu_item.selector() {
        Some(id) => id,
        None => return,
    };
    let charts = bindings(id);
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, charts.len() as u32); charts.len()])
        .split(area);

    for (chart, cell) in charts.iter().zip(cells) {
        match app.view(*chart) {
            Some(ChartView::Ready(spec)) => draw_chart(f, spec, cell),
            Some(ChartView::Unavailable(message)) => {
                let text = Paragraph::new(message.as_str())
                    .block(Block::default().title(chart.name()).borders(Borders::ALL))
                    .style(Style::default().fg(Color::Red))
                    .wrap(Wrap { trim: true });
                f.render_widget(text, cell);
            }
            None => {}
        }
    }
}

pub fn draw_chart<B: Backend>(f: &mut Frame<B>, spec: &ChartSpec, area: Rect) {
    match &spec.data {
        ChartData::Histogram { x, series } => draw_histogram(f, spec, x, series, area),
        ChartData::Line { x, series } => draw_line(f, spec, x, series, area),
        ChartData::Pie { names, values } => draw_pie(f, spec, names, values, area),
    }
}

fn bar_width(area: Rect, bars: usize) -> u16 {
    let per_bar = area.width.saturating_sub(2) / bars.max(1) as u16;
    per_bar.saturating_sub(1).clamp(1, 9)
}

// Only the first series is drawn; bar charts here carry a single measure.
fn draw_histogram<B: Backend>(
    f: &mut Frame<B>,
    spec: &ChartSpec,
    labels: &[String],
    series: &[Series],
    area: Rect,
) {
    let values = series.first().map(|s| s.values.as_slice()).unwrap_or(&[]);
    let data: Vec<(&str, u64)> = labels
        .iter()
        .zip(values)
        .map(|(label, v)| (label.as_str(), v.max(0.0).round() as u64))
        .collect();
    let bars = BarChart::default()
        .block(palette_block(&spec.title, spec.palette))
        .data(&data)
        .bar_width(bar_width(area, data.len()))
        .bar_style(Style::default().fg(rgb(spec.palette.plot_bg())))
        .value_style(
            Style::default()
                .fg(Color::Black)
                .bg(rgb(spec.palette.plot_bg())),
        )
        .label_style(Style::default().fg(rgb(spec.palette.font())));
    f.render_widget(bars, area);
}

fn bounds(values: impl Iterator<Item = f64>) -> [f64; 2] {
    let (lo, hi) = values
        .filter(|v| !v.is_nan())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo > hi {
        [0.0, 1.0]
    } else if lo == hi {
        [lo, lo + 1.0]
    } else {
        [lo, hi]
    }
}

fn axis_labels<'a>(range: [f64; 2]) -> Vec<Span<'a>> {
    let mid = (range[0] + range[1]) / 2.0;
    [range[0], mid, range[1]]
        .iter()
        .map(|v| Span::raw(format!("{:.0}", v)))
        .collect()
}

fn draw_line<B: Backend>(f: &mut Frame<B>, spec: &ChartSpec, x: &[f64], series: &[Series], area: Rect) {
    let points: Vec<Vec<(f64, f64)>> = series
        .iter()
        .map(|s| {
            x.iter()
                .copied()
                .zip(s.values.iter().copied())
                .filter(|(a, b)| !a.is_nan() && !b.is_nan())
                .collect()
        })
        .collect();
    let x_bounds = match spec.x_range {
        Some((lo, hi)) => [lo, hi],
        None => bounds(x.iter().copied()),
    };
    let y_bounds = bounds(
        std::iter::once(0.0).chain(points.iter().flatten().map(|(_, y)| *y)),
    );

    let datasets = series
        .iter()
        .zip(&points)
        .enumerate()
        .map(|(i, (s, data))| {
            Dataset::default()
                .name(s.name.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(SERIES_COLORS[i % SERIES_COLORS.len()]))
                .data(data)
        })
        .collect();

    let axis_style = Style::default().fg(rgb(spec.palette.font()));
    let chart = Chart::new(datasets)
        .block(palette_block(&spec.title, spec.palette))
        .x_axis(
            Axis::default()
                .title(Span::styled(spec.x_title.clone(), axis_style))
                .style(axis_style)
                .bounds(x_bounds)
                .labels(axis_labels(x_bounds)),
        )
        .y_axis(
            Axis::default()
                .title(Span::styled(spec.y_title.clone(), axis_style))
                .style(axis_style)
                .bounds(y_bounds)
                .labels(axis_labels(y_bounds)),
        );
    f.render_widget(chart, area);
}

/// Slice shares of a pie; NaN slices count as zero.
pub fn pie_shares(values: &[f64]) -> Vec<f64> {
    let total: f64 = values.iter().filter(|v| !v.is_nan()).sum();
    values
        .iter()
        .map(|v| if v.is_nan() || total <= 0.0 { 0.0 } else { v / total })
        .collect()
}

fn draw_pie<B: Backend>(f: &mut Frame<B>, spec: &ChartSpec, names: &[String], values: &[f64], area: Rect) {
    let label_width = names.iter().map(|n| n.len()).max().unwrap_or(0);
    let items: Vec<ListItem> = names
        .iter()
        .zip(pie_shares(values))
        .enumerate()
        .map(|(i, (name, share))| {
            let bar = "█".repeat((share * PIE_BAR_WIDTH).round() as usize);
            ListItem::new(Spans::from(vec![
                Span::raw(format!("{:width$} ", name, width = label_width)),
                Span::styled(bar, Style::default().fg(SERIES_COLORS[i % SERIES_COLORS.len()])),
                Span::raw(format!(" {:.1}%", share * 100.0)),
            ]))
        })
        .collect();
    let list = List::new(items).block(palette_block(&spec.title, spec.palette));
    f.render_widget(list, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pie_shares_normalize_and_skip_missing() {
        assert_eq!(pie_shares(&[1.0, 3.0]), vec![0.25, 0.75]);
        assert_eq!(pie_shares(&[f64::NAN, 2.0]), vec![0.0, 1.0]);
        assert_eq!(pie_shares(&[0.0, 0.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn bounds_widen_degenerate_ranges() {
        assert_eq!(bounds([3.0, 1.0, 2.0].into_iter()), [1.0, 3.0]);
        assert_eq!(bounds([5.0].into_iter()), [5.0, 6.0]);
        assert_eq!(bounds(std::iter::empty()), [0.0, 1.0]);
    }

    #[test]
    fn bars_fit_the_area() {
        let area = Rect::new(0, 0, 42, 10);
        assert_eq!(bar_width(area, 8), 4);
        assert_eq!(bar_width(area, 100), 1);
        assert_eq!(bar_width(area, 1), 9);
    }
}
