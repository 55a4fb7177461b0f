//! Classification result view.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::domain::TriageResult;
use crate::tui::styles::TriageTheme;

/// Render the most recent classification, or a placeholder if there is none.
pub fn render_result(f: &mut Frame, area: Rect, result: Option<&TriageResult>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Result
            Constraint::Length(2), // Footer
        ])
        .split(area);

    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", TriageTheme::text()),
        Span::styled("Resultado del Triage", TriageTheme::title()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(TriageTheme::border()),
    );
    f.render_widget(header, chunks[0]);

    match result {
        Some(result) => render_classification(f, chunks[1], result),
        None => {
            let empty = Paragraph::new(Span::styled(
                "Aún no se ha clasificado ningún paciente.",
                TriageTheme::text_muted(),
            ))
            .alignment(Alignment::Center);
            f.render_widget(empty, chunks[1]);
        }
    }

    let footer = Paragraph::new(Line::from(vec![
        Span::styled("[Enter] ", TriageTheme::key_hint()),
        Span::styled("Volver al ranking ", TriageTheme::key_desc()),
        Span::styled("[N] ", TriageTheme::key_hint()),
        Span::styled("Nuevo paciente", TriageTheme::key_desc()),
    ]))
    .block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(TriageTheme::border()),
    );
    f.render_widget(footer, chunks[2]);
}

fn render_classification(f: &mut Frame, area: Rect, result: &TriageResult) {
    let level = result.level();
    let level_style = TriageTheme::triage_level(level);

    let block = Block::default()
        .title(Span::styled(" Clasificación ", TriageTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(level_style);

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Level banner
            Constraint::Length(3), // Risk gauge
            Constraint::Length(3), // Ranking position
            Constraint::Min(0),
        ])
        .margin(1)
        .split(inner);

    let description = level.map_or("Nivel no reconocido", |l| l.description());
    let banner = Paragraph::new(vec![
        Line::from(Span::styled(
            format!(
                " Nivel de Triage: {} - {} ",
                result.nivel_triage, result.color_triage
            ),
            TriageTheme::triage_badge(level),
        )),
        Line::from(""),
        Line::from(Span::styled(description, TriageTheme::text_secondary())),
    ])
    .alignment(Alignment::Center);
    f.render_widget(banner, chunks[0]);

    let probability = result.riesgo_mortalidad;
    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(Span::styled(
                    " Riesgo de Mortalidad ",
                    TriageTheme::text_secondary(),
                ))
                .borders(Borders::ALL)
                .border_style(TriageTheme::border()),
        )
        .gauge_style(TriageTheme::risk(probability))
        .percent(gauge_percent(probability))
        .label(result.risk_label());
    f.render_widget(gauge, chunks[1]);

    let position = Paragraph::new(vec![
        Line::from(vec![
            Span::styled("Posición en ranking: ", TriageTheme::text_secondary()),
            Span::styled(result.ranking_label(), TriageTheme::title()),
        ]),
        Line::from(vec![
            Span::styled("ID de paciente: ", TriageTheme::text_secondary()),
            Span::styled(result.id.to_string(), TriageTheme::text()),
        ]),
    ])
    .alignment(Alignment::Center);
    f.render_widget(position, chunks[2]);
}

/// Gauge fill for a probability, clamped to 0..=100.
fn gauge_percent(probability: f64) -> u16 {
    if probability.is_finite() {
        (probability * 100.0).round().clamp(0.0, 100.0) as u16
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::ui::buffer_text;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(result: Option<&TriageResult>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(90, 24)).expect("Should create terminal");
        terminal
            .draw(|f| render_result(f, f.area(), result))
            .expect("Should draw");
        buffer_text(terminal.backend().buffer())
    }

    #[test]
    fn test_renders_risk_and_position() {
        let result = TriageResult {
            id: 7,
            nivel_triage: 1,
            color_triage: "Rojo".into(),
            riesgo_mortalidad: 0.42,
            ranking: 1,
            total_pacientes: 5,
        };

        let text = draw(Some(&result));
        assert!(text.contains("Nivel de Triage: 1 - Rojo"));
        assert!(text.contains("42.0%"));
        assert!(text.contains("Posición en ranking: 1 de 5"));
        assert!(text.contains("ID de paciente: 7"));
    }

    #[test]
    fn test_renders_placeholder_without_result() {
        assert!(draw(None).contains("Aún no se ha clasificado"));
    }

    #[test]
    fn test_gauge_percent_clamps() {
        assert_eq!(gauge_percent(0.42), 42);
        assert_eq!(gauge_percent(1.7), 100);
        assert_eq!(gauge_percent(-0.2), 0);
        assert_eq!(gauge_percent(f64::NAN), 0);
    }
}
