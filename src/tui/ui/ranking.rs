//! Ranking dashboard: waiting list table, summary and charts.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use super::charts::{render_distribution_chart, render_risk_chart};
use crate::application::Console;
use crate::domain::RankingEntry;
use crate::tui::styles::TriageTheme;

/// What the action column offers for a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    MarkAttended(u64),
    Completed,
}

#[must_use]
pub fn row_action(entry: &RankingEntry) -> RowAction {
    if entry.atendido {
        RowAction::Completed
    } else {
        RowAction::MarkAttended(entry.id)
    }
}

const COLUMNS: [&str; 8] = [
    "Pos.", "ID", "Triage", "Edad", "Sexo", "Riesgo", "Estado", "Acción",
];

/// Display cells of one ranking row, in column order.
#[must_use]
pub fn row_cells(entry: &RankingEntry) -> [String; 8] {
    let action = match row_action(entry) {
        RowAction::MarkAttended(_) => "[a] Atender",
        RowAction::Completed => "✓",
    };
    [
        entry.posicion.to_string(),
        entry.id.to_string(),
        format!("{} - {}", entry.nivel_triage, entry.color_triage),
        entry.edad.clone(),
        entry.sex_label().to_string(),
        entry.risk_label(),
        entry.status_label().to_string(),
        action.to_string(),
    ]
}

/// Render the ranking dashboard. `selected` is the highlighted row.
pub fn render_ranking(f: &mut Frame, area: Rect, console: &Console, selected: Option<usize>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Table + charts
            Constraint::Length(2), // Footer
        ])
        .split(area);

    render_header(f, chunks[0], console);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(chunks[1]);

    render_table(f, body[0], &console.ranking, selected);

    let charts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(body[1]);
    render_distribution_chart(f, charts[0], &console.charts);
    render_risk_chart(f, charts[1], &console.charts);

    render_footer(f, chunks[2]);
}

fn render_header(f: &mut Frame, area: Rect, console: &Console) {
    let stats = &console.stats;
    let total = stats
        .total_pacientes
        .unwrap_or(console.ranking.len() as u64);
    let attended = stats
        .atendidos
        .unwrap_or_else(|| console.ranking.iter().filter(|e| e.atendido).count() as u64);
    let waiting = stats
        .no_atendidos
        .unwrap_or_else(|| total.saturating_sub(attended));

    let mut spans = vec![
        Span::styled(" ", TriageTheme::text()),
        Span::styled("Ranking de Pacientes", TriageTheme::title()),
        Span::styled(" │ ", TriageTheme::text_muted()),
        Span::styled(format!("Total: {total} "), TriageTheme::text()),
        Span::styled(format!("En espera: {waiting} "), TriageTheme::warning()),
        Span::styled(format!("Atendidos: {attended}"), TriageTheme::success()),
        Span::styled(" │ ", TriageTheme::text_muted()),
    ];

    if console.is_refreshing() {
        spans.push(Span::styled("Actualizando...", TriageTheme::info()));
    } else if let Some(at) = console.refreshed_at {
        spans.push(Span::styled(
            format!("Actualizado {}", at.format("%H:%M:%S")),
            TriageTheme::text_muted(),
        ));
    } else {
        spans.push(Span::styled("Sin datos", TriageTheme::text_muted()));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(TriageTheme::border()),
    );
    f.render_widget(header, area);
}

fn render_table(f: &mut Frame, area: Rect, ranking: &[RankingEntry], selected: Option<usize>) {
    let block = Block::default()
        .title(Span::styled(" Lista de Espera ", TriageTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(TriageTheme::border());

    if ranking.is_empty() {
        let empty = Paragraph::new(Span::styled(
            " No hay pacientes en el ranking.",
            TriageTheme::text_muted(),
        ))
        .block(block);
        f.render_widget(empty, area);
        return;
    }

    let header = Row::new(
        COLUMNS
            .iter()
            .map(|title| Cell::from(*title).style(TriageTheme::subtitle())),
    )
    .bottom_margin(1);

    let rows = ranking.iter().map(|entry| {
        let level = entry.level();
        let [pos, id, triage, age, sex, risk, status, action] = row_cells(entry);
        let row = Row::new(vec![
            Cell::from(pos),
            Cell::from(id),
            Cell::from(triage).style(TriageTheme::triage_badge(level)),
            Cell::from(age),
            Cell::from(sex),
            Cell::from(risk),
            Cell::from(status),
            Cell::from(action).style(match row_action(entry) {
                RowAction::MarkAttended(_) => TriageTheme::key_hint(),
                RowAction::Completed => TriageTheme::success(),
            }),
        ]);
        if entry.atendido {
            row.style(TriageTheme::attended_row())
        } else {
            row.style(TriageTheme::text())
        }
    });

    let widths = [
        Constraint::Length(5),
        Constraint::Length(6),
        Constraint::Length(14),
        Constraint::Length(5),
        Constraint::Length(10),
        Constraint::Length(7),
        Constraint::Length(10),
        Constraint::Min(11),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(TriageTheme::selected())
        .highlight_symbol("▶ ");

    let mut state = TableState::default().with_selected(selected);
    f.render_stateful_widget(table, area, &mut state);
}

fn render_footer(f: &mut Frame, area: Rect) {
    let footer = Paragraph::new(Line::from(vec![
        Span::styled("[N] ", TriageTheme::key_hint()),
        Span::styled("Nuevo paciente ", TriageTheme::key_desc()),
        Span::styled("[↑↓] ", TriageTheme::key_hint()),
        Span::styled("Seleccionar ", TriageTheme::key_desc()),
        Span::styled("[A] ", TriageTheme::key_hint()),
        Span::styled("Atender ", TriageTheme::key_desc()),
        Span::styled("[R] ", TriageTheme::key_hint()),
        Span::styled("Actualizar ", TriageTheme::key_desc()),
        Span::styled("[E] ", TriageTheme::key_hint()),
        Span::styled("Exportar CSV ", TriageTheme::key_desc()),
        Span::styled("[V] ", TriageTheme::key_hint()),
        Span::styled("Último resultado ", TriageTheme::key_desc()),
        Span::styled("[X] ", TriageTheme::key_hint()),
        Span::styled("Descartar aviso ", TriageTheme::key_desc()),
        Span::styled("[Q] ", TriageTheme::key_hint()),
        Span::styled("Salir", TriageTheme::key_desc()),
    ]))
    .block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(TriageTheme::border()),
    );
    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ConsoleEvent;
    use crate::domain::{RankingSnapshot, Sex};
    use crate::tui::ui::buffer_text;
    use ratatui::{backend::TestBackend, Terminal};

    fn entry(id: u64, atendido: bool) -> RankingEntry {
        RankingEntry {
            posicion: id as u32,
            id,
            nivel_triage: 2,
            color_triage: "Naranjo".into(),
            edad: "61".into(),
            sexo: Some(Sex::Female),
            riesgo_mortalidad: 0.183,
            atendido,
        }
    }

    #[test]
    fn test_row_action() {
        assert_eq!(row_action(&entry(4, false)), RowAction::MarkAttended(4));
        assert_eq!(row_action(&entry(4, true)), RowAction::Completed);
    }

    #[test]
    fn test_row_cells() {
        let cells = row_cells(&entry(9, false));
        assert_eq!(cells[2], "2 - Naranjo");
        assert_eq!(cells[4], "Femenino");
        assert_eq!(cells[5], "18.3%");
        assert_eq!(cells[6], "En espera");
        assert_eq!(cells[7], "[a] Atender");

        assert_eq!(row_cells(&entry(9, true))[7], "✓");
    }

    #[test]
    fn test_render_table_rows() {
        let mut console = Console::default();
        let token = match console.refresh() {
            crate::application::Command::RefreshRanking(token) => token,
            other => panic!("unexpected command {other:?}"),
        };
        console.apply(ConsoleEvent::RankingLoaded {
            token,
            result: Ok(RankingSnapshot {
                ranking: vec![entry(1, false), entry(2, true)],
                stats: Default::default(),
            }),
        });

        let mut terminal = Terminal::new(TestBackend::new(160, 30)).expect("Should create terminal");
        terminal
            .draw(|f| render_ranking(f, f.area(), &console, Some(0)))
            .expect("Should draw");

        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("[a] Atender"));
        assert!(text.contains("Atendido"));
        assert!(text.contains("Total: 2"));
        assert!(text.contains("Atendidos: 1"));
    }

    #[test]
    fn test_render_empty_ranking() {
        let console = Console::default();
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).expect("Should create terminal");
        terminal
            .draw(|f| render_ranking(f, f.area(), &console, None))
            .expect("Should draw");

        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("No hay pacientes en el ranking."));
        assert!(text.contains("Sin datos"));
    }
}
