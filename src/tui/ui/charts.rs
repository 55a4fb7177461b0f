//! Bar charts for the triage distribution and mean mortality risk.

use ratatui::{
    layout::{Direction, Rect},
    style::Style,
    text::Span,
    widgets::{Bar, BarChart, BarGroup, Block, Borders},
    Frame,
};

use crate::application::ChartData;
use crate::domain::{format_risk, TriageLevel};
use crate::tui::styles::TriageTheme;

/// Risk bars are scaled to per-mille so one decimal place survives.
const RISK_SCALE: f64 = 1000.0;

/// Patients per triage level.
pub fn render_distribution_chart(f: &mut Frame, area: Rect, charts: &ChartData) {
    let bars: Vec<Bar> = TriageLevel::ALL
        .iter()
        .map(|level| {
            let count = charts.distribution[level.index()];
            level_bar(*level, count, count.to_string())
        })
        .collect();

    let chart = BarChart::default()
        .block(chart_block(" Distribución por Nivel "))
        .direction(Direction::Vertical)
        .bar_width(8)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars));

    f.render_widget(chart, area);
}

/// Mean mortality risk per triage level.
pub fn render_risk_chart(f: &mut Frame, area: Rect, charts: &ChartData) {
    let bars: Vec<Bar> = TriageLevel::ALL
        .iter()
        .map(|level| {
            let mean = charts.mean_risk[level.index()];
            level_bar(*level, risk_bar_value(mean), format_risk(mean))
        })
        .collect();

    let chart = BarChart::default()
        .block(chart_block(" Riesgo Promedio de Mortalidad "))
        .direction(Direction::Vertical)
        .bar_width(8)
        .bar_gap(1)
        .max(RISK_SCALE as u64)
        .data(BarGroup::default().bars(&bars));

    f.render_widget(chart, area);
}

fn level_bar(level: TriageLevel, value: u64, text: String) -> Bar<'static> {
    Bar::default()
        .value(value)
        .text_value(text)
        .label(level.label().into())
        .style(Style::default().fg(TriageTheme::level_color(Some(level))))
        .value_style(TriageTheme::triage_badge(Some(level)))
}

fn chart_block(title: &'static str) -> Block<'static> {
    Block::default()
        .title(Span::styled(title, TriageTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(TriageTheme::border())
}

fn risk_bar_value(probability: f64) -> u64 {
    if probability.is_finite() {
        (probability.clamp(0.0, 1.0) * RISK_SCALE).round() as u64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::ui::buffer_text;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_risk_bar_value() {
        assert_eq!(risk_bar_value(0.4217), 422);
        assert_eq!(risk_bar_value(0.0), 0);
        assert_eq!(risk_bar_value(2.0), 1000);
        assert_eq!(risk_bar_value(f64::NAN), 0);
    }

    #[test]
    fn test_charts_render_level_labels() {
        let charts = ChartData {
            distribution: [3, 0, 2, 0, 0],
            mean_risk: [0.42, 0.0, 0.1, 0.0, 0.0],
        };

        let mut terminal = Terminal::new(TestBackend::new(60, 24)).expect("Should create terminal");
        terminal
            .draw(|f| {
                let area = f.area();
                let (top, bottom) = (
                    Rect { height: 12, ..area },
                    Rect { y: 12, height: 12, ..area },
                );
                render_distribution_chart(f, top, &charts);
                render_risk_chart(f, bottom, &charts);
            })
            .expect("Should draw");

        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("Distribución por Nivel"));
        assert!(text.contains("Amarillo"));
        assert!(text.contains("42.0%"));
    }
}
