//! CSV export of the ranked waiting list.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::domain::RankingEntry;
use crate::TriageError;

/// Default export file name.
pub const DEFAULT_EXPORT_FILE: &str = "ranking_triage.csv";

/// Column header of the export.
pub const CSV_HEADER: &str = "Posición,ID,Triage,Color,Edad,Sexo,Riesgo Mortalidad,Estado";

/// Outcome of a completed export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub rows: usize,
}

/// Render the ranking as CSV, one `\n`-terminated line per entry.
#[must_use]
pub fn ranking_to_csv(entries: &[RankingEntry]) -> String {
    let mut out = String::with_capacity(64 * (entries.len() + 1));
    out.push_str(CSV_HEADER);
    out.push('\n');

    for entry in entries {
        let fields = [
            entry.posicion.to_string(),
            entry.id.to_string(),
            entry.nivel_triage.to_string(),
            entry.color_triage.clone(),
            entry.edad.clone(),
            entry.sex_label().to_string(),
            entry.riesgo_mortalidad.to_string(),
            entry.status_label().to_string(),
        ];
        let row: Vec<String> = fields.iter().map(|f| escape_field(f)).collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }

    out
}

/// Quote a field when it contains a delimiter, quote or line break.
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Write the ranking to `path`, replacing any previous export.
///
/// The CSV goes to a temporary file next to `path` and is renamed over it,
/// so concurrent exports leave one complete file rather than a mix.
///
/// # Errors
/// Returns `TriageError::Io` if the file cannot be written.
pub fn write_csv(path: &Path, entries: &[RankingEntry]) -> Result<ExportSummary, TriageError> {
    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent)?;
            parent
        }
        None => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(ranking_to_csv(entries).as_bytes())?;
    tmp.persist(path).map_err(|e| e.error)?;

    tracing::info!(path = %path.display(), rows = entries.len(), "ranking exported");

    Ok(ExportSummary {
        path: path.to_path_buf(),
        rows: entries.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Sex;

    fn sample_entries() -> Vec<RankingEntry> {
        vec![
            RankingEntry {
                posicion: 1,
                id: 4,
                nivel_triage: 1,
                color_triage: "Rojo".into(),
                edad: "80".into(),
                sexo: Some(Sex::Female),
                riesgo_mortalidad: 0.35,
                atendido: false,
            },
            RankingEntry {
                posicion: 2,
                id: 2,
                nivel_triage: 3,
                color_triage: "Amarillo".into(),
                edad: "33".into(),
                sexo: Some(Sex::Male),
                riesgo_mortalidad: 0.02,
                atendido: true,
            },
        ]
    }

    #[test]
    fn test_two_entries_three_lines() {
        let csv = ranking_to_csv(&sample_entries());
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines[1], "1,4,1,Rojo,80,Femenino,0.35,En espera");
        assert_eq!(lines[2], "2,2,3,Amarillo,33,Masculino,0.02,Atendido");
        assert!(csv.ends_with('\n'));
    }

    #[test]
    fn test_empty_ranking_is_header_only() {
        assert_eq!(ranking_to_csv(&[]), format!("{CSV_HEADER}\n"));
    }

    #[test]
    fn test_fields_with_delimiters_are_quoted() {
        let mut entries = sample_entries();
        entries[0].color_triage = "Rojo, \"C1\"".into();

        let csv = ranking_to_csv(&entries[..1]);
        let row = csv.lines().nth(1).expect("Should have a data row");
        assert_eq!(row, "1,4,1,\"Rojo, \"\"C1\"\"\",80,Femenino,0.35,En espera");
    }

    #[test]
    fn test_write_csv() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let path = dir.path().join("out").join(DEFAULT_EXPORT_FILE);

        let summary = write_csv(&path, &sample_entries()).expect("Should write");
        assert_eq!(summary.rows, 2);

        let written = std::fs::read_to_string(&path).expect("Should read back");
        assert_eq!(written.lines().count(), 3);
    }

    #[test]
    fn test_concurrent_exports_leave_one_complete_file() {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let path = dir.path().join(DEFAULT_EXPORT_FILE);

        let long = sample_entries();
        let short = vec![long[1].clone()];
        let long_csv = ranking_to_csv(&long);
        let short_csv = ranking_to_csv(&short);

        std::thread::scope(|scope| {
            for entries in [&long, &short, &long, &short] {
                let path = &path;
                scope.spawn(move || {
                    for _ in 0..25 {
                        write_csv(path, entries).expect("Should write");
                    }
                });
            }
        });

        let written = std::fs::read_to_string(&path).expect("Should read back");
        assert!(written == long_csv || written == short_csv);

        let leftovers = std::fs::read_dir(dir.path())
            .expect("Should list dir")
            .count();
        assert_eq!(leftovers, 1);
    }
}
