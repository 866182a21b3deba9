use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::format_date;

/// Nullable timestamp as the server encodes it: `{"Time": ..., "Valid": bool}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NullTime {
    #[serde(rename = "Time")]
    pub time: Option<DateTime<Utc>>,
    #[serde(rename = "Valid")]
    pub valid: bool,
}

impl NullTime {
    pub fn get(&self) -> Option<DateTime<Utc>> {
        if self.valid {
            self.time
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feed {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: String,
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub last_fetched_at: NullTime,
}

impl Feed {
    /// Title for list display, falling back to the URL for untitled feeds
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            &self.url
        } else {
            &self.title
        }
    }

    pub fn last_fetched_display(&self) -> String {
        match self.last_fetched_at.get() {
            Some(at) => format_date(&at.to_rfc3339()),
            None => "never".to_string(),
        }
    }
}
