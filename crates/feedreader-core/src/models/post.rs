use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::{format_date, strip_html};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub feed_id: String,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
    pub publish_date: DateTime<Utc>,
}

impl Post {
    pub fn published_display(&self) -> String {
        format_date(&self.publish_date.to_rfc3339())
    }

    /// Description with markup removed. Feeds often embed HTML here.
    pub fn summary(&self) -> String {
        strip_html(&self.description)
    }
}
