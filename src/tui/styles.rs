//! Triage console colour palette and styles.
//!
//! Severity colours follow the Chilean triage scale; everything else is a
//! muted slate/teal palette so the triage colours stand out.

use ratatui::style::{Color, Modifier, Style};

use crate::application::NotificationKind;
use crate::domain::TriageLevel;

/// Console theme.
pub struct TriageTheme;

impl TriageTheme {
    /// Deep teal accent
    pub const PRIMARY: Color = Color::Rgb(13, 148, 136); // #0D9488

    pub const PRIMARY_LIGHT: Color = Color::Rgb(45, 212, 191); // #2DD4BF

    /// Light slate for borders
    pub const BORDER: Color = Color::Rgb(148, 163, 184); // #94A3B8

    pub const SUCCESS: Color = Color::Rgb(16, 185, 129); // #10B981
    pub const WARNING: Color = Color::Rgb(251, 191, 36); // #FBBF24
    pub const DANGER: Color = Color::Rgb(244, 63, 94); // #F43F5E
    pub const INFO: Color = Color::Rgb(59, 130, 246); // #3B82F6

    pub const BG_DARK: Color = Color::Rgb(15, 23, 42); // #0F172A

    pub const TEXT_PRIMARY: Color = Color::Rgb(248, 250, 252); // #F8FAFC
    pub const TEXT_SECONDARY: Color = Color::Rgb(148, 163, 184); // #94A3B8
    pub const TEXT_MUTED: Color = Color::Rgb(100, 116, 139); // #64748B

    /// Rows of patients already attended
    pub const ATTENDED_ROW: Color = Color::Rgb(71, 85, 105); // #475569

    #[must_use]
    pub fn title() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn subtitle() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn text() -> Style {
        Style::default().fg(Self::TEXT_PRIMARY)
    }

    #[must_use]
    pub fn text_secondary() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    #[must_use]
    pub fn text_muted() -> Style {
        Style::default().fg(Self::TEXT_MUTED)
    }

    #[must_use]
    pub fn success() -> Style {
        Style::default().fg(Self::SUCCESS)
    }

    #[must_use]
    pub fn warning() -> Style {
        Style::default().fg(Self::WARNING)
    }

    #[must_use]
    pub fn danger() -> Style {
        Style::default().fg(Self::DANGER)
    }

    #[must_use]
    pub fn info() -> Style {
        Style::default().fg(Self::INFO)
    }

    /// Highlighted table row
    #[must_use]
    pub fn selected() -> Style {
        Style::default()
            .fg(Self::BG_DARK)
            .bg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn focused() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn border() -> Style {
        Style::default().fg(Self::BORDER)
    }

    #[must_use]
    pub fn border_focused() -> Style {
        Style::default().fg(Self::PRIMARY)
    }

    /// Border of a field that failed validation
    #[must_use]
    pub fn border_invalid() -> Style {
        Style::default().fg(Self::DANGER)
    }

    #[must_use]
    pub fn cursor() -> Style {
        Style::default().fg(Self::PRIMARY_LIGHT)
    }

    #[must_use]
    pub fn key_hint() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn key_desc() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    #[must_use]
    pub fn attended_row() -> Style {
        Style::default().fg(Self::ATTENDED_ROW)
    }

    /// Foreground colour of a triage level; unknown levels are neutral.
    #[must_use]
    pub fn level_color(level: Option<TriageLevel>) -> Color {
        match level {
            Some(level) => {
                let (r, g, b) = level.color();
                Color::Rgb(r, g, b)
            }
            None => Self::TEXT_SECONDARY,
        }
    }

    /// Bold text in the level's colour.
    #[must_use]
    pub fn triage_level(level: Option<TriageLevel>) -> Style {
        Style::default()
            .fg(Self::level_color(level))
            .add_modifier(Modifier::BOLD)
    }

    /// Badge: dark text on the level's colour.
    #[must_use]
    pub fn triage_badge(level: Option<TriageLevel>) -> Style {
        Style::default()
            .fg(Self::BG_DARK)
            .bg(Self::level_color(level))
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn notification(kind: NotificationKind) -> Style {
        match kind {
            NotificationKind::Success => Self::success(),
            NotificationKind::Info => Self::info(),
            NotificationKind::Warning => Self::warning(),
            NotificationKind::Danger => Self::danger(),
        }
    }

    /// Gauge colour for a mortality risk in [0, 1].
    #[must_use]
    pub fn risk(probability: f64) -> Style {
        if probability >= 0.3 {
            Self::danger()
        } else if probability >= 0.1 {
            Self::warning()
        } else {
            Self::success()
        }
    }
}
