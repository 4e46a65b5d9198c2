//! Flat-file user storage.
//!
//! One JSON file maps a chat user id to their tracker credentials, their
//! project list and the currently selected project. Credentials carry a
//! `saved_at` timestamp; expiration (30 days by default) is enforced by the
//! caller through [`UserStore::is_expired`], not by the submission core.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info};

use crate::error::{AppError, Result};

/// Stored credentials with their save timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub email: String,
    pub password: String,
    pub saved_at: DateTime<Utc>,
}

/// One tracker project a user can file bugs into.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct UserRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    credentials: Option<StoredCredentials>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    projects: BTreeMap<String, Project>,
    #[serde(skip_serializing_if = "Option::is_none")]
    selected_project: Option<String>,
}

type Users = BTreeMap<String, UserRecord>;

/// JSON-file backed store for per-user credentials and project lists.
pub struct UserStore {
    users_file: PathBuf,
    max_age_days: i64,
}

impl UserStore {
    pub fn new(storage_dir: impl AsRef<Path>, max_age_days: i64) -> Self {
        Self {
            users_file: storage_dir.as_ref().join("users.json"),
            max_age_days,
        }
    }

    /// Creates the storage directory and an empty users file if needed.
    pub async fn init(&self) -> Result<()> {
        if let Some(dir) = self.users_file.parent() {
            fs::create_dir_all(dir).await.map_err(|e| self.storage_error(e))?;
        }
        if !self.users_file.exists() {
            fs::write(&self.users_file, "{}")
                .await
                .map_err(|e| self.storage_error(e))?;
            debug!("created user store at {}", self.users_file.display());
        }
        Ok(())
    }

    // ---- credentials ----

    pub async fn save_credentials(&self, user_id: &str, email: &str, password: &str) -> Result<()> {
        let mut users = self.load_all().await?;
        users.entry(user_id.to_string()).or_default().credentials = Some(StoredCredentials {
            email: email.to_string(),
            password: password.to_string(),
            saved_at: Utc::now(),
        });
        self.save_all(&users).await?;
        info!("credentials saved for user {}", user_id);
        Ok(())
    }

    pub async fn get_credentials(&self, user_id: &str) -> Result<Option<StoredCredentials>> {
        let users = self.load_all().await?;
        Ok(users.get(user_id).and_then(|u| u.credentials.clone()))
    }

    pub async fn clear_credentials(&self, user_id: &str) -> Result<()> {
        let mut users = self.load_all().await?;
        if let Some(user) = users.get_mut(user_id) {
            if user.credentials.take().is_some() {
                self.save_all(&users).await?;
                info!("credentials cleared for user {}", user_id);
            }
        }
        Ok(())
    }

    /// Whether credentials saved at `saved_at` are past the expiration age.
    pub fn is_expired(&self, saved_at: DateTime<Utc>) -> bool {
        Utc::now() - saved_at > Duration::days(self.max_age_days)
    }

    // ---- projects ----

    pub async fn add_project(&self, user_id: &str, name: &str, url: &str) -> Result<String> {
        let mut users = self.load_all().await?;
        let id = format!("project_{}", Utc::now().timestamp_millis());
        users.entry(user_id.to_string()).or_default().projects.insert(
            id.clone(),
            Project {
                name: name.to_string(),
                url: url.to_string(),
            },
        );
        self.save_all(&users).await?;
        info!("project '{}' added for user {}", name, user_id);
        Ok(id)
    }

    pub async fn delete_project(&self, user_id: &str, project_id: &str) -> Result<bool> {
        let mut users = self.load_all().await?;
        let removed = users
            .get_mut(user_id)
            .map(|u| u.projects.remove(project_id).is_some())
            .unwrap_or(false);
        if removed {
            self.save_all(&users).await?;
        }
        Ok(removed)
    }

    pub async fn projects(&self, user_id: &str) -> Result<BTreeMap<String, Project>> {
        let users = self.load_all().await?;
        Ok(users.get(user_id).map(|u| u.projects.clone()).unwrap_or_default())
    }

    pub async fn select_project(&self, user_id: &str, project_id: &str) -> Result<bool> {
        let mut users = self.load_all().await?;
        let Some(user) = users.get_mut(user_id) else {
            return Ok(false);
        };
        if !user.projects.contains_key(project_id) {
            return Ok(false);
        }
        user.selected_project = Some(project_id.to_string());
        self.save_all(&users).await?;
        Ok(true)
    }

    /// The user's selected project. A selection pointing at a deleted project
    /// is cleared and reported as no selection.
    pub async fn selected_project(&self, user_id: &str) -> Result<Option<Project>> {
        let mut users = self.load_all().await?;
        let Some(user) = users.get_mut(user_id) else {
            return Ok(None);
        };
        let Some(project_id) = user.selected_project.clone() else {
            return Ok(None);
        };

        match user.projects.get(&project_id) {
            Some(project) => Ok(Some(project.clone())),
            None => {
                user.selected_project = None;
                self.save_all(&users).await?;
                Ok(None)
            }
        }
    }

    // ---- file plumbing ----

    async fn load_all(&self) -> Result<Users> {
        let data = fs::read_to_string(&self.users_file)
            .await
            .map_err(|e| self.storage_error(e))?;
        Ok(serde_json::from_str(&data)?)
    }

    async fn save_all(&self, users: &Users) -> Result<()> {
        let data = serde_json::to_string_pretty(users)?;
        fs::write(&self.users_file, data)
            .await
            .map_err(|e| self.storage_error(e))
    }

    fn storage_error(&self, source: std::io::Error) -> AppError {
        AppError::Storage {
            path: self.users_file.display().to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_store(name: &str) -> UserStore {
        let dir = std::env::temp_dir().join(format!("bug_report_submit_store_{}", name));
        let _ = fs::remove_dir_all(&dir).await;
        let store = UserStore::new(&dir, 30);
        store.init().await.unwrap();
        store
    }

    #[tokio::test]
    async fn credentials_roundtrip_and_clear() {
        let store = temp_store("creds").await;

        assert!(store.get_credentials("42").await.unwrap().is_none());

        store
            .save_credentials("42", "qa@netronic.team", "secret")
            .await
            .unwrap();
        let creds = store.get_credentials("42").await.unwrap().unwrap();
        assert_eq!(creds.email, "qa@netronic.team");
        assert!(!store.is_expired(creds.saved_at));

        store.clear_credentials("42").await.unwrap();
        assert!(store.get_credentials("42").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn old_credentials_are_expired() {
        let store = temp_store("expiry").await;
        let old = Utc::now() - Duration::days(31);
        assert!(store.is_expired(old));
        assert!(!store.is_expired(Utc::now() - Duration::days(29)));
    }

    #[tokio::test]
    async fn dangling_project_selection_is_cleared() {
        let store = temp_store("projects").await;

        let id = store
            .add_project("7", "LTO 2.0", "https://netronic.worksection.com/project/123/")
            .await
            .unwrap();
        assert!(store.select_project("7", &id).await.unwrap());
        assert!(store.selected_project("7").await.unwrap().is_some());

        assert!(store.delete_project("7", &id).await.unwrap());
        assert!(store.selected_project("7").await.unwrap().is_none());
        // second lookup still clean after the cleanup write
        assert!(store.selected_project("7").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn selecting_unknown_project_fails() {
        let store = temp_store("unknown").await;
        assert!(!store.select_project("7", "project_missing").await.unwrap());
    }
}
