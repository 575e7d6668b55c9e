//! MemoryPost entity definitions.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Format used when showing a memory's date in the feed.
pub const MEMORY_DATE_LABEL_FORMAT: &str = "%Y/%m/%d";

/// One dated comment in the shared feed, optionally with a photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryPost {
    /// Unique identifier.
    pub id: Uuid,
    /// Comment text. Never empty.
    pub comment: String,
    /// The day the memory is about, at the time of day it was posted.
    pub date: DateTime<Utc>,
    /// Email of the author. Not tied to an existing user record.
    pub author: String,
    /// Name of the uploaded photo, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_name: Option<String>,
}

impl MemoryPost {
    /// Creates a new memory post.
    pub fn new(
        comment: impl Into<String>,
        date: DateTime<Utc>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            comment: comment.into(),
            date,
            author: author.into(),
            image_name: None,
        }
    }

    /// Attaches an uploaded photo.
    pub fn with_image(mut self, image_name: impl Into<String>) -> Self {
        self.image_name = Some(image_name.into());
        self
    }

    /// Returns the date as shown in the feed (`YYYY/MM/DD`).
    pub fn date_label(&self) -> String {
        self.date.format(MEMORY_DATE_LABEL_FORMAT).to_string()
    }
}

/// Combines a chosen calendar day with the current time of day.
pub fn posted_on(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(Utc::now().time()).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_posted_on_keeps_the_chosen_day() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let date = posted_on(day);

        assert_eq!(date.date_naive(), day);
    }

    #[test]
    fn test_date_label() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let post = MemoryPost::new("trip", posted_on(day), "bob@x.com");

        assert_eq!(post.date_label(), "2024/03/09");
        assert!(post.image_name.is_none());
    }

    #[test]
    fn test_image_name_is_omitted_when_absent() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let post = MemoryPost::new("trip", posted_on(day), "bob@x.com");
        let json = serde_json::to_value(&post).unwrap();
        assert!(json.get("image_name").is_none());

        let json = serde_json::to_value(post.with_image("beach.jpg")).unwrap();
        assert_eq!(json["image_name"], "beach.jpg");
    }
}
