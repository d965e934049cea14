//! Newsletters and their recipient lists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use easyvol_core::{NewsletterId, NewsletterStatus, UserId};

/// A newsletter, editable while `draft`, frozen once `sent`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Newsletter {
    pub id: NewsletterId,
    pub subject: String,
    pub body_html: String,
    pub reply_to: Option<String>,
    pub status: NewsletterStatus,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub sent_at: Option<DateTime<Utc>>,
    /// Number of recipients the send reached, filled when sent.
    pub sent_count: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<UserId>,
}

/// One address a newsletter was (or will be) delivered to.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct NewsletterRecipient {
    pub id: i32,
    pub newsletter_id: NewsletterId,
    pub email: String,
    pub recipient_name: Option<String>,
    /// "member" or "junior_member" guardian address.
    pub recipient_type: Option<String>,
    /// Delivery state: "pending", "sent", "failed".
    pub status: String,
}

/// Form payload for creating or updating a draft newsletter.
#[derive(Debug, Clone, Deserialize)]
pub struct NewsletterPayload {
    pub subject: String,
    pub body_html: String,
    #[serde(default)]
    pub reply_to: Option<String>,
    #[serde(default, deserialize_with = "super::forms::option_from_str")]
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// Whitelisted query-string filters for the newsletter list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewsletterFilter {
    #[serde(default, deserialize_with = "super::forms::option_variant")]
    pub status: Option<NewsletterStatus>,
    #[serde(default)]
    pub search: Option<String>,
}
