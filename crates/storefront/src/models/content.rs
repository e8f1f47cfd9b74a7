//! Editorial content (guides, blog posts, FAQ entries).
//!
//! Read-only from the storefront's perspective; authored out of band.

use chrono::{DateTime, Utc};
use serde::Serialize;

use homegrid_core::{ContentId, ContentType};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    pub id: ContentId,
    pub slug: String,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub title: String,
    /// Structured body blocks.
    pub body: serde_json::Value,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
}
