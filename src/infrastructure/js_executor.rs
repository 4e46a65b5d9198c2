//! JS executor - infrastructure layer.
//!
//! Holds one page and exposes only the "run JS" capability.

use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::error::Result;

/// JS executor.
///
/// Responsibilities:
/// - hold one Page handle
/// - expose eval()
/// - knows nothing about bug reports or batches
pub struct JsExecutor {
    page: Page,
}

impl JsExecutor {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    /// The underlying page, for element waits and clicks.
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Runs JS and returns the JSON result.
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// Runs JS and deserializes the result into `T`.
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> Result<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }
}
