use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::audit::Audit;
use crate::dto::{nullable, nullable_datetime};
use crate::error::ApiResult;
use crate::posts::repo_types::Post;
use crate::validate;

#[derive(Debug, Deserialize)]
pub struct PostCreate {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

fn validate_common(
    content: Option<&str>,
    image: Option<&str>,
    thumbnail_url: Option<&str>,
    tags: Option<&[String]>,
) -> ApiResult<()> {
    if let Some(c) = content {
        validate::max_len("content", c, 10_000)?;
    }
    if let Some(i) = image {
        validate::max_len("image", i, 1024)?;
    }
    if let Some(t) = thumbnail_url {
        validate::max_len("thumbnail_url", t, 1024)?;
    }
    for tag in tags.unwrap_or_default() {
        validate::non_empty("tag", tag, 255)?;
    }
    Ok(())
}

impl PostCreate {
    pub fn validate(&self) -> ApiResult<()> {
        validate::non_empty("title", &self.title, 255)?;
        validate::slug(&self.slug)?;
        validate_common(
            Some(&self.content),
            self.image.as_deref(),
            self.thumbnail_url.as_deref(),
            self.tags.as_deref(),
        )
    }
}

/// Absent fields are left alone; `null` clears an optional field.
#[derive(Debug, Default, Deserialize)]
pub struct PostUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub image: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub thumbnail_url: Option<Option<String>>,
    #[serde(default)]
    pub is_published: Option<bool>,
    #[serde(default)]
    pub is_featured: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub category_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "nullable_datetime")]
    pub published_at: Option<Option<OffsetDateTime>>,
    #[serde(default, deserialize_with = "nullable")]
    pub tags: Option<Option<Vec<String>>>,
}

impl PostUpdate {
    pub fn validate(&self) -> ApiResult<()> {
        if let Some(t) = &self.title {
            validate::non_empty("title", t, 255)?;
        }
        if let Some(s) = &self.slug {
            validate::slug(s)?;
        }
        validate_common(
            self.content.as_deref(),
            self.image.as_ref().and_then(|v| v.as_deref()),
            self.thumbnail_url.as_ref().and_then(|v| v.as_deref()),
            self.tags.as_ref().and_then(|v| v.as_deref()),
        )
    }

    pub fn apply(self, post: &mut Post) {
        if let Some(title) = self.title {
            post.title = title;
        }
        if let Some(slug) = self.slug {
            post.slug = slug;
        }
        if let Some(content) = self.content {
            post.content = content;
        }
        if let Some(image) = self.image {
            post.image = image;
        }
        if let Some(thumbnail_url) = self.thumbnail_url {
            post.thumbnail_url = thumbnail_url;
        }
        if let Some(is_published) = self.is_published {
            post.is_published = is_published;
        }
        if let Some(is_featured) = self.is_featured {
            post.is_featured = is_featured;
        }
        if let Some(category_id) = self.category_id {
            post.category_id = category_id;
        }
        if let Some(published_at) = self.published_at {
            post.published_at = published_at;
        }
        if let Some(tags) = self.tags {
            post.tags = tags;
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostPublic {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub image: Option<String>,
    pub thumbnail_url: Option<String>,
    pub is_published: bool,
    pub is_featured: bool,
    pub category_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
    pub tags: Option<Vec<String>>,
    #[serde(flatten)]
    pub audit: Audit,
}

impl From<Post> for PostPublic {
    fn from(p: Post) -> Self {
        Self {
            id: p.id,
            title: p.title,
            slug: p.slug,
            content: p.content,
            image: p.image,
            thumbnail_url: p.thumbnail_url,
            is_published: p.is_published,
            is_featured: p.is_featured,
            category_id: p.category_id,
            published_at: p.published_at,
            tags: p.tags,
            audit: p.audit,
        }
    }
}
