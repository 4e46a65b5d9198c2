//! Browser-dependent integration tests.
//!
//! These drive a real Chrome against the live tracker, so they are ignored by
//! default. Run manually with credentials in the environment:
//!
//! ```text
//! WORKSECTION_EMAIL=... WORKSECTION_PASSWORD=... \
//!     PROJECT_URL=... cargo test -- --ignored
//! ```

use bug_report_submit::browser::BrowserSession;
use bug_report_submit::config::Config;
use bug_report_submit::models::{BugReport, Credentials};
use bug_report_submit::orchestrator::BatchSubmitter;
use bug_report_submit::utils::logging;

fn env_credentials() -> Credentials {
    Credentials {
        email: std::env::var("WORKSECTION_EMAIL").expect("WORKSECTION_EMAIL not set"),
        password: std::env::var("WORKSECTION_PASSWORD").expect("WORKSECTION_PASSWORD not set"),
    }
}

fn env_project_url() -> String {
    std::env::var("PROJECT_URL").expect("PROJECT_URL not set")
}

fn sample_bug(i: usize) -> BugReport {
    BugReport {
        title: format!("Интеграционный тест №{}", i),
        description: Some("Создано автоматическим тестом, можно удалить".to_string()),
        steps: Some("1. Запустить интеграционный тест".to_string()),
        expected: Some("Тикет создается".to_string()),
        actual: Some("Проверяется вручную".to_string()),
        environment: Some("Тестовый стенд\n--- подпись".to_string()),
    }
}

#[tokio::test]
#[ignore]
async fn browser_session_opens_and_closes() {
    logging::init();
    let config = Config::from_env();

    let mut session = BrowserSession::new(&config);
    assert!(!session.is_open());

    session.ensure_open().await.expect("browser should launch");
    assert!(session.is_open());

    // idempotent: second call must not launch a second process
    session.ensure_open().await.expect("reopen is a no-op");

    session.close().await;
    assert!(!session.is_open());
    // closing a closed session is a no-op
    session.close().await;
}

#[tokio::test]
#[ignore]
async fn single_bug_batch_files_one_ticket() {
    logging::init();
    let config = Config::from_env();

    let mut submitter = BatchSubmitter::new(&config);
    let result = submitter
        .submit_batch(&env_credentials(), &env_project_url(), &[sample_bug(1)])
        .await
        .expect("batch should submit");

    assert_eq!(result.created, 1);
    assert!(result.is_clean());

    submitter.close().await;
}

#[tokio::test]
#[ignore]
async fn second_batch_reuses_the_authenticated_session() {
    logging::init();
    let config = Config::from_env();
    let credentials = env_credentials();
    let project_url = env_project_url();

    let mut submitter = BatchSubmitter::new(&config);

    let first = submitter
        .submit_batch(&credentials, &project_url, &[sample_bug(1)])
        .await
        .expect("first batch");
    assert!(first.is_clean());
    assert!(submitter.is_session_open());

    // The session stays open between calls, so this second call must skip
    // authentication entirely and reuse the primary page.
    let second = submitter
        .submit_batch(&credentials, &project_url, &[sample_bug(2), sample_bug(3)])
        .await
        .expect("second batch");
    assert_eq!(second.created, 2);

    submitter.close().await;
}

#[tokio::test]
#[ignore]
async fn bad_credentials_abort_before_any_item() {
    logging::init();
    let config = Config::from_env();

    let bad = Credentials {
        email: "nobody@example.com".to_string(),
        password: "wrong-password".to_string(),
    };

    let mut submitter = BatchSubmitter::new(&config);
    let err = submitter
        .submit_batch(&bad, &env_project_url(), &[sample_bug(1)])
        .await
        .expect_err("login must fail");

    assert_eq!(
        err.kind(),
        bug_report_submit::error::ErrorKind::Authentication
    );

    submitter.close().await;
}
