//! UI module: View components for the TUI.

pub mod charts;
pub mod intake;
pub mod ranking;
pub mod result;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::application::{NotificationKind, Notifications};
use crate::tui::styles::TriageTheme;

/// Notifications shown at once; older ones wait for expiry or dismissal.
pub const MAX_VISIBLE_NOTIFICATIONS: usize = 3;

/// Rows the notification banner needs, zero when there is nothing to show.
#[must_use]
pub fn notification_height(notifications: &Notifications) -> u16 {
    match notifications.items().len().min(MAX_VISIBLE_NOTIFICATIONS) {
        0 => 0,
        n => n as u16 + 1,
    }
}

/// Stacked notification banner, newest on top.
pub fn render_notifications(f: &mut Frame, area: Rect, notifications: &Notifications) {
    let lines: Vec<Line> = notifications
        .items()
        .iter()
        .take(MAX_VISIBLE_NOTIFICATIONS)
        .map(|note| {
            let icon = match note.kind {
                NotificationKind::Success => "✓",
                NotificationKind::Info => "i",
                NotificationKind::Warning | NotificationKind::Danger => "!",
            };
            let style = TriageTheme::notification(note.kind);
            Line::from(vec![
                Span::styled(format!(" {icon} "), style),
                Span::styled(note.message.as_str(), style),
            ])
        })
        .collect();

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(TriageTheme::border());

    f.render_widget(Paragraph::new(lines).block(block), area);
}

pub fn render_disclaimer(f: &mut Frame, area: Rect) {
    let text = vec![Line::from(vec![Span::styled(
        "AVISO: La clasificación es un apoyo a la decisión clínica y no reemplaza la evaluación del profesional de salud.",
        TriageTheme::text_muted(),
    )])];

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(TriageTheme::border());

    let p = Paragraph::new(text).block(block).wrap(Wrap { trim: true });

    f.render_widget(p, area);
}

/// Flatten a rendered buffer into newline-separated rows.
#[cfg(test)]
pub(crate) fn buffer_text(buffer: &ratatui::buffer::Buffer) -> String {
    let width = usize::from(buffer.area.width.max(1));
    buffer
        .content
        .chunks(width)
        .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}
