//! Bug report data model.

use serde::{Deserialize, Serialize};

/// Worksection account credentials, supplied per submission call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// One structured bug report, submitted as one ticket.
///
/// Every field except the title is optional. The report is immutable once
/// constructed; the form filler consumes it to build the composed description
/// block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BugReport {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub steps: Option<String>,
    #[serde(default)]
    pub expected: Option<String>,
    #[serde(default)]
    pub actual: Option<String>,
    #[serde(default)]
    pub environment: Option<String>,
}

impl BugReport {
    /// Report with only a title set.
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            steps: None,
            expected: None,
            actual: None,
            environment: None,
        }
    }

    /// Builds the full description block inserted into the ticket editor.
    ///
    /// Present, non-empty sections are concatenated in fixed order with the
    /// headings the tracker users expect; absent sections produce no heading
    /// at all. The environment text is truncated at the first `\n---` before
    /// insertion (trailing boilerplate after that delimiter is discarded).
    pub fn compose_description(&self) -> String {
        let environment = self
            .environment
            .as_deref()
            .map(clean_environment)
            .unwrap_or_default();

        let sections = [
            ("Описание:", self.description.as_deref().unwrap_or("")),
            ("Шаги для воспроизведения:", self.steps.as_deref().unwrap_or("")),
            ("Ожидаемый результат:", self.expected.as_deref().unwrap_or("")),
            ("Фактический результат:", self.actual.as_deref().unwrap_or("")),
            ("Тестовое окружение:", environment.as_str()),
        ];

        sections
            .iter()
            .filter(|(_, body)| !body.trim().is_empty())
            .map(|(heading, body)| format!("{}\n{}", heading, body.trim()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Drops everything from the first `\n---` delimiter onwards and trims.
pub fn clean_environment(environment: &str) -> String {
    environment
        .split("\n---")
        .next()
        .unwrap_or("")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_report() -> BugReport {
        BugReport {
            title: "Кнопка не работает".to_string(),
            description: Some("Кнопка сохранения не реагирует".to_string()),
            steps: Some("1. Открыть форму\n2. Нажать сохранить".to_string()),
            expected: Some("Данные сохраняются".to_string()),
            actual: Some("Ничего не происходит".to_string()),
            environment: Some("Приложение: LTO 2.0".to_string()),
        }
    }

    #[test]
    fn composed_sections_keep_fixed_order() {
        let text = full_report().compose_description();
        let positions: Vec<usize> = [
            "Описание:",
            "Шаги для воспроизведения:",
            "Ожидаемый результат:",
            "Фактический результат:",
            "Тестовое окружение:",
        ]
        .iter()
        .map(|heading| text.find(heading).expect("heading present"))
        .collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn title_only_report_composes_empty_description() {
        let report = BugReport::with_title("Только заголовок");
        assert_eq!(report.compose_description(), "");
    }

    #[test]
    fn absent_sections_produce_no_heading() {
        let mut report = BugReport::with_title("Баг");
        report.steps = Some("1. Шаг".to_string());
        let text = report.compose_description();
        assert!(text.starts_with("Шаги для воспроизведения:"));
        assert!(!text.contains("Описание:"));
        assert!(!text.contains("Ожидаемый результат:"));
    }

    #[test]
    fn environment_truncated_at_delimiter() {
        assert_eq!(clean_environment("foo\n--- trailing"), "foo");
        assert_eq!(clean_environment("  foo  "), "foo");
        assert_eq!(clean_environment("\n--- only boilerplate"), "");
    }

    #[test]
    fn empty_environment_after_cleanup_is_skipped() {
        let mut report = BugReport::with_title("Баг");
        report.environment = Some("\n--- подпись".to_string());
        assert_eq!(report.compose_description(), "");
    }

    #[test]
    fn ordering_holds_for_sparse_reports() {
        let mut report = BugReport::with_title("Баг");
        report.environment = Some("ОС: Android 10".to_string());
        report.description = Some("Падение".to_string());
        let text = report.compose_description();
        let desc = text.find("Описание:").unwrap();
        let env = text.find("Тестовое окружение:").unwrap();
        assert!(desc < env);
    }
}
