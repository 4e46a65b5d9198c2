//! Report parser - capability layer.
//!
//! Pulls the structured bug-report fields out of a model's markdown answer.
//! Models format the same answer in several shapes (`**Название:**`,
//! `#### Название:`, bare `Название:`), so every field is matched against a
//! small cascade of patterns, most specific first. Missing fields are filled
//! from the ones that were found so the submitted ticket is never half-empty.

use regex::Regex;

use crate::models::BugReport;

const DEFAULT_ENVIRONMENT: &str =
    "Приложение: LTO 2.0, ОС: Android 10+, Оборудование: лазертаг система";

/// Extracts one bug report from a model response.
///
/// Returns `None` when neither a title nor a description can be found, i.e.
/// the answer carries no recognizable structure at all.
pub fn extract_report(response: &str) -> Option<BugReport> {
    let title = match_single_line(response, "Название");
    let description = match_block(response, "Описание");
    let steps = match_block(response, "Шаги").or_else(|| numbered_steps(response));
    let expected = match_block(response, "Ожидаемый результат");
    let actual = match_block(response, "Фактический результат");
    let environment = match_block(response, "Тестовое окружение")
        .or_else(|| match_block(response, "Окружение"))
        .or_else(|| match_block(response, "Environment"));

    if title.is_none() && description.is_none() {
        return None;
    }

    let title = title.unwrap_or_else(|| "Без названия".to_string());

    // Backfill sections the model left out, the way a tester would.
    let description = description.unwrap_or_else(|| {
        format!(
            "Обнаружена проблема: {}. Требуется детальное исследование.",
            title.to_lowercase()
        )
    });
    let steps = steps.unwrap_or_else(|| {
        format!(
            "1. Открыть приложение\n2. Воспроизвести условия для: {}\n3. Наблюдать за результатом",
            title.to_lowercase()
        )
    });
    let expected = expected.unwrap_or_else(|| {
        format!(
            "Система должна работать корректно без проблем связанных с: {}",
            title.to_lowercase()
        )
    });
    let actual =
        actual.unwrap_or_else(|| format!("Наблюдается проблема: {}", title.to_lowercase()));
    let environment = environment.unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());

    Some(BugReport {
        title,
        description: Some(description),
        steps: Some(steps),
        expected: Some(expected),
        actual: Some(actual),
        environment: Some(environment),
    })
}

/// Single-line field: heading and value on one line.
fn match_single_line(response: &str, label: &str) -> Option<String> {
    let patterns = [
        format!(r"(?mi)^\*\*{}:\*\*\s*(.+)$", label),
        format!(r"(?mi)^####\s*{}:\s*(.+)$", label),
        format!(r"(?mi)^{}:\s*(.+)$", label),
    ];
    first_capture(response, &patterns)
}

/// Multi-line field: value runs until the next heading, a blank line, or the
/// end of the answer.
fn match_block(response: &str, label: &str) -> Option<String> {
    let patterns = [
        format!(r"(?si)\*\*{}[^:\n]*:\*\*\s*(.+?)(?:\n\*\*|\n####|\n\n|\z)", label),
        format!(r"(?si)####\s*{}[^:\n]*:\s*(.+?)(?:\n####|\n\*\*|\n\n|\z)", label),
        format!(r"(?si)\b{}[^:\n]*:\s*(.+?)(?:\n\*\*|\n####|\n\n|\z)", label),
    ];
    first_capture(response, &patterns)
}

fn first_capture(response: &str, patterns: &[String]) -> Option<String> {
    for pattern in patterns {
        let Ok(re) = Regex::new(pattern) else {
            continue;
        };
        if let Some(caps) = re.captures(response) {
            let value = caps.get(1).map(|m| m.as_str().trim().to_string());
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                return Some(value);
            }
        }
    }
    None
}

/// Fallback when the steps are not under a heading: any numbered lines in the
/// answer are taken as the reproduction steps.
fn numbered_steps(response: &str) -> Option<String> {
    let Ok(re) = Regex::new(r"(?m)^\s*\d+\.\s*.+$") else {
        return None;
    };
    let steps: Vec<&str> = re.find_iter(response).map(|m| m.as_str().trim()).collect();
    if steps.is_empty() {
        None
    } else {
        Some(steps.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_bold_heading_format() {
        let response = "\
**Название:** Кнопка выхода не работает
**Описание:** При нажатии на кнопку выхода ничего не происходит
**Шаги для воспроизведения:** 1. Войти\n2. Нажать выход
**Ожидаемый результат:** Пользователь выходит
**Фактический результат:** Остается в приложении
**Тестовое окружение:** ОС: Android 12";

        let report = extract_report(response).unwrap();
        assert_eq!(report.title, "Кнопка выхода не работает");
        assert!(report.description.unwrap().contains("ничего не происходит"));
        assert!(report.steps.unwrap().contains("Нажать выход"));
        assert_eq!(report.environment.as_deref(), Some("ОС: Android 12"));
    }

    #[test]
    fn extracts_hash_heading_format() {
        let response = "\
#### Название: Экран мигает
#### Описание: Мигает при входе

#### Ожидаемый результат: Стабильный экран";

        let report = extract_report(response).unwrap();
        assert_eq!(report.title, "Экран мигает");
        assert_eq!(report.expected.as_deref(), Some("Стабильный экран"));
    }

    #[test]
    fn numbered_lines_become_steps_when_no_heading() {
        let response = "\
**Название:** Сбой синхронизации
**Описание:** Данные не доходят до сервера
1. Включить устройство
2. Начать игру";

        let report = extract_report(response).unwrap();
        let steps = report.steps.unwrap();
        assert!(steps.contains("1. Включить устройство"));
        assert!(steps.contains("2. Начать игру"));
    }

    #[test]
    fn missing_fields_are_backfilled_from_the_title() {
        let response = "**Название:** Отваливается датчик";
        let report = extract_report(response).unwrap();
        assert!(report.description.unwrap().contains("отваливается датчик"));
        assert!(report.expected.unwrap().contains("отваливается датчик"));
        assert_eq!(report.environment.as_deref(), Some(DEFAULT_ENVIRONMENT));
    }

    #[test]
    fn unstructured_answer_yields_nothing() {
        assert!(extract_report("просто болтовня без структуры").is_none());
    }
}
