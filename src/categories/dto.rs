use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit::Audit;
use crate::categories::repo_types::Category;
use crate::dto::nullable;
use crate::error::ApiResult;
use crate::validate;

#[derive(Debug, Deserialize)]
pub struct CategoryCreate {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl CategoryCreate {
    pub fn validate(&self) -> ApiResult<()> {
        validate::non_empty("name", &self.name, 255)?;
        validate::slug(&self.slug)?;
        if let Some(d) = &self.description {
            validate::max_len("description", d, 1000)?;
        }
        if let Some(i) = &self.image {
            validate::max_len("image", i, 1024)?;
        }
        Ok(())
    }
}

/// Absent fields are left alone; `null` clears an optional field.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub image: Option<Option<String>>,
}

impl CategoryUpdate {
    pub fn validate(&self) -> ApiResult<()> {
        if let Some(n) = &self.name {
            validate::non_empty("name", n, 255)?;
        }
        if let Some(s) = &self.slug {
            validate::slug(s)?;
        }
        if let Some(Some(d)) = &self.description {
            validate::max_len("description", d, 1000)?;
        }
        if let Some(Some(i)) = &self.image {
            validate::max_len("image", i, 1024)?;
        }
        Ok(())
    }

    pub fn apply(self, category: &mut Category) {
        if let Some(name) = self.name {
            category.name = name;
        }
        if let Some(slug) = self.slug {
            category.slug = slug;
        }
        if let Some(description) = self.description {
            category.description = description;
        }
        if let Some(image) = self.image {
            category.image = image;
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryPublic {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image: Option<String>,
    #[serde(flatten)]
    pub audit: Audit,
}

impl From<Category> for CategoryPublic {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            slug: c.slug,
            description: c.description,
            image: c.image,
            audit: c.audit,
        }
    }
}
