//! Log redaction for clinical values and personal identifiers.
//!
//! Request bodies and server responses carry vitals, ages and risk
//! estimates. Log lines are passed through [`redact`] before reaching the
//! sink so that a debug-level trace never leaves patient data on disk.
//!
//! Redacted:
//! - values of clinical keys (`edad=54`, `"saturacion_o2":96.5`, ...)
//! - Chilean RUT numbers
//! - e-mail addresses and phone numbers
//! - bearer tokens
//!
//! ANSI colour sequences are stripped before matching, since the fmt layer
//! wraps field names and `=` in separate escapes.

use regex::{Regex, RegexSet};
use std::borrow::Cow;
use std::sync::OnceLock;
use tracing_subscriber::fmt::MakeWriter;

static PATTERNS: OnceLock<RedactionPatterns> = OnceLock::new();

/// Longest input redacted per call; the remainder is dropped.
const MAX_REDACT_BYTES: usize = 16 * 1024;

/// Keys whose values are clinical data.
const CLINICAL_KEYS: &str = "edad|sexo|presion_sistolica|presion_diastolica|frecuencia_cardiaca|temperatura|saturacion_o2|nivel_conciencia|tiempo_evolucion_horas|riesgo_mortalidad|dolor_toracico|disnea|fiebre|trauma_reciente|sangrado_activo|antecedentes_cronicos";

struct Rule {
    regex: Regex,
    replacement: String,
}

struct RedactionPatterns {
    ansi: Regex,
    set: RegexSet,
    rules: Vec<Rule>,
}

fn patterns() -> &'static RedactionPatterns {
    PATTERNS.get_or_init(|| {
        let clinical = format!(r#"\b({CLINICAL_KEYS})("?\s*[:=]\s*"?)([^,"}}\s]+)"#);
        let sources: Vec<(String, &str)> = vec![
            (clinical, "${1}${2}[REDACTED]"),
            // RUT, with or without thousands separators
            (
                r"\b\d{1,2}\.?\d{3}\.?\d{3}-[\dkK]\b".to_string(),
                "[REDACTED-RUT]",
            ),
            (
                r"(?i)\b[a-z0-9](?:[a-z0-9._%+-]{0,62}[a-z0-9])?@(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,}\b".to_string(),
                "[REDACTED-EMAIL]",
            ),
            (
                r"\+?56[\s-]?9[\s-]?\d{4}[\s-]?\d{4}\b".to_string(),
                "[REDACTED-PHONE]",
            ),
            (
                r"(?i)\bbearer\s+[a-z0-9._~+/-]{16,}=*".to_string(),
                "Bearer [REDACTED-TOKEN]",
            ),
        ];

        let set = RegexSet::new(sources.iter().map(|(p, _)| p.as_str())).expect("Valid regex set");
        let rules = sources
            .into_iter()
            .map(|(pattern, replacement)| Rule {
                regex: Regex::new(&pattern).expect("Valid regex"),
                replacement: replacement.to_string(),
            })
            .collect();

        RedactionPatterns {
            ansi: Regex::new(r"\x1b\[[0-9;]*m").expect("Valid regex"),
            set,
            rules,
        }
    })
}

fn truncate_to_char_boundary(input: &str, max_bytes: usize) -> (&str, bool) {
    if input.len() <= max_bytes {
        return (input, false);
    }

    let mut end = max_bytes;
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    (&input[..end], true)
}

/// Replace clinical values and identifiers in `input`.
#[must_use]
pub fn redact(input: &str) -> String {
    redact_with_limit(input, MAX_REDACT_BYTES)
}

fn redact_with_limit(input: &str, max_bytes: usize) -> String {
    let patterns = patterns();
    let (prefix, truncated) = truncate_to_char_boundary(input, max_bytes);

    let plain = if prefix.contains('\x1b') {
        patterns.ansi.replace_all(prefix, "")
    } else {
        Cow::Borrowed(prefix)
    };

    let mut result = plain.to_string();
    for idx in patterns.set.matches(&plain).into_iter() {
        let rule = &patterns.rules[idx];
        result = rule
            .regex
            .replace_all(&result, rule.replacement.as_str())
            .into_owned();
    }

    if truncated {
        result.push_str(" [TRUNCATED]");
    }
    result
}

/// `MakeWriter` wrapper that redacts each formatted log line.
#[derive(Debug, Clone)]
pub struct RedactingMakeWriter<M> {
    inner: M,
}

impl<M> RedactingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

/// Line-buffering writer produced by [`RedactingMakeWriter`].
pub struct RedactingWriter<W: std::io::Write> {
    inner: W,
    buffer: Vec<u8>,
}

impl<W: std::io::Write> RedactingWriter<W> {
    fn write_lines(&mut self) -> std::io::Result<()> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let redacted = redact(&String::from_utf8_lossy(&line));
            self.inner.write_all(redacted.as_bytes())?;
        }
        Ok(())
    }
}

impl<W: std::io::Write> std::io::Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        if self.buffer.len() > MAX_REDACT_BYTES * 2 {
            let redacted = redact(&String::from_utf8_lossy(&self.buffer));
            self.inner.write_all(redacted.as_bytes())?;
            self.inner.write_all(b"\n")?;
            self.buffer.clear();
            return Ok(buf.len());
        }

        self.write_lines()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.write_lines()?;
        if !self.buffer.is_empty() {
            let redacted = redact(&String::from_utf8_lossy(&self.buffer));
            self.inner.write_all(redacted.as_bytes())?;
            self.buffer.clear();
        }
        self.inner.flush()
    }
}

impl<W: std::io::Write> Drop for RedactingWriter<W> {
    fn drop(&mut self) {
        let _ = std::io::Write::flush(self);
    }
}

impl<'a, M> MakeWriter<'a> for RedactingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = RedactingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter {
            inner: self.inner.make_writer(),
            buffer: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::layer::SubscriberExt;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().expect("buffer lock").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for SharedBuf {
        type Writer = SharedBuf;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_redact_json_vitals() {
        let input = r#"body={"edad":54,"saturacion_o2":96.5,"sexo":"M","nivel_conciencia":"A"}"#;
        let out = redact(input);
        assert!(out.contains(r#""edad":[REDACTED]"#));
        assert!(out.contains(r#""saturacion_o2":[REDACTED]"#));
        assert!(out.contains(r#""sexo":"[REDACTED]""#));
        assert!(!out.contains("96.5"));
        assert!(!out.contains("54"));
    }

    #[test]
    fn test_redact_structured_fields() {
        let out = redact("prediction received riesgo_mortalidad=0.42 ranking=1");
        assert_eq!(out, "prediction received riesgo_mortalidad=[REDACTED] ranking=1");
    }

    #[test]
    fn test_redact_rut() {
        let out = redact("paciente 12.345.678-5 ingresado");
        assert_eq!(out, "paciente [REDACTED-RUT] ingresado");
        assert_eq!(redact("rut 9876543-K"), "rut [REDACTED-RUT]");
    }

    #[test]
    fn test_redact_email_and_phone() {
        let out = redact("contacto enfermeria@hospital.cl +56 9 1234 5678");
        assert!(out.contains("[REDACTED-EMAIL]"));
        assert!(out.contains("[REDACTED-PHONE]"));
    }

    #[test]
    fn test_plain_text_untouched() {
        let input = "ranking refreshed entries=12";
        assert_eq!(redact(input), input);
    }

    #[test]
    fn test_truncates_large_inputs() {
        let out = redact_with_limit("ñandú ñandú ñandú", 3);
        assert!(out.ends_with("[TRUNCATED]"));
    }

    #[test]
    fn test_redact_strips_colour_codes() {
        let out = redact("\x1b[3medad\x1b[0m\x1b[2m=\x1b[0m54 listo");
        assert_eq!(out, "edad=[REDACTED] listo");
    }

    #[test]
    fn test_coloured_fmt_layer_is_redacted() {
        let buf = SharedBuf::default();
        let subscriber = tracing_subscriber::registry().with(
            tracing_subscriber::fmt::layer()
                .with_ansi(true)
                .without_time()
                .with_writer(RedactingMakeWriter::new(buf.clone())),
        );

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(edad = 54, saturacion_o2 = 96.5, "intake");
        });

        let bytes = buf.0.lock().expect("buffer lock").clone();
        let written = String::from_utf8(bytes).expect("Should be UTF-8");
        assert!(written.contains("intake"));
        assert!(written.contains("edad=[REDACTED]"));
        assert!(written.contains("saturacion_o2=[REDACTED]"));
        assert!(!written.contains("54"));
        assert!(!written.contains("96.5"));
    }

    #[test]
    fn test_writer_redacts_per_line() {
        let mut writer = RedactingWriter {
            inner: Vec::new(),
            buffer: Vec::new(),
        };
        writer.write_all(b"edad=54\npartial temperatura=").expect("Should write");
        writer.write_all(b"38.5\n").expect("Should write");
        writer.flush().expect("Should flush");

        let written = String::from_utf8(writer.inner.clone()).expect("Should be UTF-8");
        assert_eq!(
            written,
            "edad=[REDACTED]\npartial temperatura=[REDACTED]\n"
        );
    }
}
