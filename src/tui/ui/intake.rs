//! Patient intake form.

use std::collections::BTreeSet;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::domain::{IntakeDraft, IntakeField, SymptomFlag};
use crate::tui::styles::TriageTheme;

const MAX_INPUT_LEN: usize = 6;

const SEX_CHOICES: &[(&str, &str)] = &[("M", "Masculino"), ("F", "Femenino")];

const CONSCIOUSNESS_CHOICES: &[(&str, &str)] = &[
    ("A", "Alerta"),
    ("V", "Responde a voz"),
    ("P", "Responde a dolor"),
    ("U", "No responde"),
];

/// How a value slot accepts keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Integer,
    Decimal,
    /// One of a fixed set of `(code, label)` pairs
    Choice(&'static [(&'static str, &'static str)]),
}

/// One navigable row of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormSlot {
    Value {
        field: IntakeField,
        label: &'static str,
        hint: &'static str,
        input: InputKind,
    },
    Flag {
        flag: SymptomFlag,
        label: &'static str,
    },
}

/// Navigation order of the form.
pub const FORM_SLOTS: [FormSlot; 15] = [
    FormSlot::Value {
        field: IntakeField::Age,
        label: "Edad",
        hint: "años",
        input: InputKind::Integer,
    },
    FormSlot::Value {
        field: IntakeField::Sex,
        label: "Sexo",
        hint: "M / F",
        input: InputKind::Choice(SEX_CHOICES),
    },
    FormSlot::Value {
        field: IntakeField::SystolicBp,
        label: "Presión sistólica",
        hint: "mmHg",
        input: InputKind::Integer,
    },
    FormSlot::Value {
        field: IntakeField::DiastolicBp,
        label: "Presión diastólica",
        hint: "mmHg",
        input: InputKind::Integer,
    },
    FormSlot::Value {
        field: IntakeField::HeartRate,
        label: "Frecuencia cardíaca",
        hint: "lpm",
        input: InputKind::Integer,
    },
    FormSlot::Value {
        field: IntakeField::Temperature,
        label: "Temperatura",
        hint: "°C (30-45)",
        input: InputKind::Decimal,
    },
    FormSlot::Value {
        field: IntakeField::Saturation,
        label: "Saturación O2",
        hint: "% (50-100)",
        input: InputKind::Decimal,
    },
    FormSlot::Value {
        field: IntakeField::Consciousness,
        label: "Nivel de conciencia",
        hint: "A / V / P / U",
        input: InputKind::Choice(CONSCIOUSNESS_CHOICES),
    },
    FormSlot::Value {
        field: IntakeField::HoursSinceOnset,
        label: "Tiempo de evolución",
        hint: "horas (opcional)",
        input: InputKind::Integer,
    },
    FormSlot::Flag {
        flag: SymptomFlag::ChestPain,
        label: "Dolor torácico",
    },
    FormSlot::Flag {
        flag: SymptomFlag::Dyspnea,
        label: "Disnea",
    },
    FormSlot::Flag {
        flag: SymptomFlag::Fever,
        label: "Fiebre",
    },
    FormSlot::Flag {
        flag: SymptomFlag::RecentTrauma,
        label: "Trauma reciente",
    },
    FormSlot::Flag {
        flag: SymptomFlag::ActiveBleeding,
        label: "Sangrado activo",
    },
    FormSlot::Flag {
        flag: SymptomFlag::ChronicConditions,
        label: "Antecedentes crónicos",
    },
];

const VALUE_SLOTS: usize = 9;

/// Intake form state: the draft being typed and the focused slot.
#[derive(Debug, Default)]
pub struct IntakeFormState {
    pub draft: IntakeDraft,
    pub selected: usize,
}

impl IntakeFormState {
    #[must_use]
    pub fn selected_slot(&self) -> FormSlot {
        FORM_SLOTS[self.selected]
    }

    pub fn next_field(&mut self) {
        self.selected = (self.selected + 1) % FORM_SLOTS.len();
    }

    pub fn prev_field(&mut self) {
        self.selected = self
            .selected
            .checked_sub(1)
            .unwrap_or(FORM_SLOTS.len() - 1);
    }

    /// Feed a typed character to the focused slot.
    ///
    /// Characters the slot cannot hold are ignored.
    pub fn input_char(&mut self, c: char) {
        match self.selected_slot() {
            FormSlot::Flag { flag, .. } => {
                if c == ' ' {
                    self.draft.symptoms.toggle(flag);
                }
            }
            FormSlot::Value { field, input, .. } => {
                let value = self.draft.value_mut(field);
                match input {
                    InputKind::Integer => {
                        if c.is_ascii_digit() && value.len() < MAX_INPUT_LEN {
                            value.push(c);
                        }
                    }
                    InputKind::Decimal => {
                        let c = if c == ',' { '.' } else { c };
                        let accepts = c.is_ascii_digit() || (c == '.' && !value.contains('.'));
                        if accepts && value.len() < MAX_INPUT_LEN {
                            value.push(c);
                        }
                    }
                    InputKind::Choice(choices) => {
                        let typed = c.to_ascii_uppercase().to_string();
                        if let Some((code, _)) = choices.iter().find(|(code, _)| *code == typed) {
                            *value = (*code).to_string();
                        }
                    }
                }
            }
        }
    }

    pub fn delete_char(&mut self) {
        if let FormSlot::Value { field, .. } = self.selected_slot() {
            self.draft.value_mut(field).pop();
        }
    }

    pub fn clear_field(&mut self) {
        match self.selected_slot() {
            FormSlot::Value { field, .. } => self.draft.value_mut(field).clear(),
            FormSlot::Flag { flag, .. } => self.draft.symptoms.set(flag, false),
        }
    }

    /// Step a choice slot through its options, or flip a flag.
    pub fn cycle(&mut self, forward: bool) {
        match self.selected_slot() {
            FormSlot::Flag { flag, .. } => self.draft.symptoms.toggle(flag),
            FormSlot::Value {
                field,
                input: InputKind::Choice(choices),
                ..
            } => {
                let value = self.draft.value_mut(field);
                let current = choices.iter().position(|(code, _)| *code == value.as_str());
                let next = match (current, forward) {
                    (None, true) => 0,
                    (None, false) => choices.len() - 1,
                    (Some(i), true) => (i + 1) % choices.len(),
                    (Some(i), false) => i.checked_sub(1).unwrap_or(choices.len() - 1),
                };
                *value = choices[next].0.to_string();
            }
            FormSlot::Value { .. } => {}
        }
    }

    /// Fill in a plausible patient for demos.
    pub fn load_sample_data(&mut self) {
        const SAMPLE: [(IntakeField, &str); 9] = [
            (IntakeField::Age, "67"),
            (IntakeField::Sex, "M"),
            (IntakeField::SystolicBp, "165"),
            (IntakeField::DiastolicBp, "95"),
            (IntakeField::HeartRate, "112"),
            (IntakeField::Temperature, "38.4"),
            (IntakeField::Saturation, "89"),
            (IntakeField::Consciousness, "V"),
            (IntakeField::HoursSinceOnset, "3"),
        ];

        // Wipe whatever was typed before reusing the buffers.
        self.draft.clear_sensitive();
        for (field, value) in SAMPLE {
            self.draft.value_mut(field).push_str(value);
        }
        self.draft.symptoms.set(SymptomFlag::ChestPain, true);
        self.draft.symptoms.set(SymptomFlag::Dyspnea, true);
        self.draft.symptoms.set(SymptomFlag::ChronicConditions, true);
    }

    /// Wipe the typed values and return focus to the first field.
    pub fn clear_sensitive(&mut self) {
        self.draft.clear_sensitive();
        self.selected = 0;
    }
}

/// Render the intake form. `invalid` holds the fields flagged by the last
/// submission attempt.
pub fn render_intake_form(
    f: &mut Frame,
    area: Rect,
    state: &IntakeFormState,
    invalid: &BTreeSet<IntakeField>,
    submitting: bool,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(2), // Footer
        ])
        .split(area);

    render_form_header(f, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(68), Constraint::Percentage(32)])
        .margin(1)
        .split(chunks[1]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(body[0]);

    let mid = (VALUE_SLOTS + 1) / 2;
    render_value_column(f, columns[0], state, 0..mid, invalid);
    render_value_column(f, columns[1], state, mid..VALUE_SLOTS, invalid);
    render_symptoms(f, body[1], state);

    render_form_footer(f, chunks[2], submitting);
}

fn render_form_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", TriageTheme::text()),
        Span::styled("Ingreso de Paciente", TriageTheme::title()),
        Span::styled(" │ Signos vitales y síntomas", TriageTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(TriageTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_value_column(
    f: &mut Frame,
    area: Rect,
    state: &IntakeFormState,
    slots: std::ops::Range<usize>,
    invalid: &BTreeSet<IntakeField>,
) {
    let constraints: Vec<Constraint> = slots
        .clone()
        .map(|_| Constraint::Length(3))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (row, index) in slots.enumerate() {
        let FormSlot::Value {
            field,
            label,
            hint,
            input,
        } = FORM_SLOTS[index]
        else {
            continue;
        };

        let is_selected = index == state.selected;
        let is_invalid = invalid.contains(&field);

        let border_style = if is_invalid {
            TriageTheme::border_invalid()
        } else if is_selected {
            TriageTheme::border_focused()
        } else {
            TriageTheme::border()
        };
        let title_style = if is_selected {
            TriageTheme::focused()
        } else if is_invalid {
            TriageTheme::danger()
        } else {
            TriageTheme::text_secondary()
        };

        let block = Block::default()
            .title(Span::styled(format!(" {label} "), title_style))
            .borders(Borders::ALL)
            .border_style(border_style);

        let raw = state.draft.value(field);
        let value_display = if raw.is_empty() {
            Span::styled(hint, TriageTheme::text_muted())
        } else {
            Span::styled(display_value(raw, input), TriageTheme::text())
        };

        let content = Paragraph::new(Line::from(vec![
            Span::raw(" "),
            value_display,
            if is_selected {
                Span::styled("▌", TriageTheme::cursor())
            } else {
                Span::raw("")
            },
        ]))
        .block(block);

        f.render_widget(content, chunks[row]);
    }
}

fn display_value(raw: &str, input: InputKind) -> String {
    match input {
        InputKind::Choice(choices) => choices
            .iter()
            .find(|(code, _)| *code == raw)
            .map_or_else(|| raw.to_string(), |(code, label)| format!("{code} · {label}")),
        InputKind::Integer | InputKind::Decimal => raw.to_string(),
    }
}

fn render_symptoms(f: &mut Frame, area: Rect, state: &IntakeFormState) {
    let lines: Vec<Line> = FORM_SLOTS
        .iter()
        .enumerate()
        .filter_map(|(index, slot)| match slot {
            FormSlot::Flag { flag, label } => Some((index, *flag, *label)),
            FormSlot::Value { .. } => None,
        })
        .map(|(index, flag, label)| {
            let checked = state.draft.symptoms.get(flag);
            let is_selected = index == state.selected;
            let mark = if checked { "[x]" } else { "[ ]" };
            let style = if is_selected {
                TriageTheme::focused()
            } else if checked {
                TriageTheme::text()
            } else {
                TriageTheme::text_secondary()
            };
            Line::from(vec![
                Span::styled(if is_selected { "▶ " } else { "  " }, TriageTheme::cursor()),
                Span::styled(format!("{mark} {label}"), style),
            ])
        })
        .collect();

    let block = Block::default()
        .title(Span::styled(" Síntomas ", TriageTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(TriageTheme::border());

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_form_footer(f: &mut Frame, area: Rect, submitting: bool) {
    let content = if submitting {
        Line::from(Span::styled(
            "Clasificando paciente...",
            TriageTheme::text_muted(),
        ))
    } else {
        Line::from(vec![
            Span::styled("[↑↓] ", TriageTheme::key_hint()),
            Span::styled("Navegar ", TriageTheme::key_desc()),
            Span::styled("[←→] ", TriageTheme::key_hint()),
            Span::styled("Opciones ", TriageTheme::key_desc()),
            Span::styled("[Espacio] ", TriageTheme::key_hint()),
            Span::styled("Marcar ", TriageTheme::key_desc()),
            Span::styled("[Enter] ", TriageTheme::key_hint()),
            Span::styled("Clasificar ", TriageTheme::key_desc()),
            Span::styled("[Ctrl+S] ", TriageTheme::key_hint()),
            Span::styled("Ejemplo ", TriageTheme::key_desc()),
            Span::styled("[Esc] ", TriageTheme::key_hint()),
            Span::styled("Cancelar", TriageTheme::key_desc()),
        ])
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(TriageTheme::border()),
    );

    f.render_widget(footer, area);
}
