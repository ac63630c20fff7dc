// src/core/transcript.rs — Append-only interaction log

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};

use crate::infra::errors::QaRelayError;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const RULE_WIDTH: usize = 50;

/// One question/answer exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interaction {
    /// Local wall-clock time.
    pub timestamp: NaiveDateTime,
    pub question: String,
    pub model: String,
    pub answer: String,
}

impl Interaction {
    pub fn new(
        question: impl Into<String>,
        model: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self::at(Local::now().naive_local(), question, model, answer)
    }

    pub fn at(
        timestamp: NaiveDateTime,
        question: impl Into<String>,
        model: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            question: question.into(),
            model: model.into(),
            answer: answer.into(),
        }
    }

    /// The block written to the log file.
    pub fn render(&self) -> String {
        format!(
            "\n=== {} ===\nQuestion: {}\nModel: {}\nAnswer: {}\n{}\n",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.question,
            self.model,
            self.answer,
            "=".repeat(RULE_WIDTH),
        )
    }
}

/// Writes interactions to a file that is only ever appended to.
pub struct Transcript {
    path: PathBuf,
    echo: bool,
}

impl Transcript {
    pub fn new(path: impl Into<PathBuf>, echo: bool) -> Self {
        Self {
            path: path.into(),
            echo,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, interaction: &Interaction) -> Result<(), QaRelayError> {
        let entry = interaction.render();
        if self.echo {
            println!("{entry}");
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(entry.as_bytes())?;
        file.flush()?;

        tracing::debug!(
            path = %self.path.display(),
            model = %interaction.model,
            "interaction logged"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn fixed(question: &str, answer: &str) -> Interaction {
        let ts = NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(9, 26, 53)
            .unwrap();
        Interaction::at(ts, question, "Hermes-3-Llama-3.1-70B", answer)
    }

    #[test]
    fn test_render_format() {
        let rendered = fixed("What is pi?", "About 3.14159.").render();
        let expected = "\n=== 2025-03-14 09:26:53 ===\n\
                        Question: What is pi?\n\
                        Model: Hermes-3-Llama-3.1-70B\n\
                        Answer: About 3.14159.\n\
                        ==================================================\n";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_render_keeps_multiline_answer() {
        let rendered = fixed("List two primes.", "2\n3").render();
        assert!(rendered.contains("Answer: 2\n3\n====="));
    }

    #[test]
    fn test_append_creates_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("interactions.log");
        let transcript = Transcript::new(&path, false);

        transcript.append(&fixed("First?", "One.")).unwrap();
        transcript.append(&fixed("Second?", "Two.")).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let first = content.find("Question: First?").unwrap();
        let second = content.find("Question: Second?").unwrap();
        assert!(first < second);
        assert_eq!(content.matches("=== 2025-03-14 09:26:53 ===").count(), 2);
    }

    #[test]
    fn test_append_preserves_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("interactions.log");
        std::fs::write(&path, "earlier run\n").unwrap();

        Transcript::new(&path, false)
            .append(&fixed("Q?", "A."))
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("earlier run\n"));
        assert!(content.ends_with(&fixed("Q?", "A.").render()));
    }

    #[test]
    fn test_append_writes_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("interactions.log");
        Transcript::new(&path, false)
            .append(&fixed("¿Qué es la entropía?", "Désordre — 熵"))
            .unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("¿Qué es la entropía?"));
        assert!(content.contains("熵"));
    }

    #[test]
    fn test_append_to_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let transcript = Transcript::new(dir.path(), false);
        assert!(matches!(
            transcript.append(&fixed("Q?", "A.")),
            Err(QaRelayError::Io(_))
        ));
    }
}
