//! Storage endpoint resolution.

use url::Url;

use crate::config::StorageConfig;
use crate::files::proxy::{SaveMode, SaveTarget};

/// Fully resolved storage URLs, built once from configuration.
#[derive(Debug, Clone)]
pub struct StorageEndpoints {
    pub images: SaveTarget,
    pub private_images: SaveTarget,
    pub documents: SaveTarget,
    pub files: SaveTarget,
    pub delete: String,
    pub from_url: String,
}

impl StorageEndpoints {
    pub fn from_config(config: &StorageConfig) -> Result<Self, url::ParseError> {
        let base = Url::parse(&config.base_url)?;
        let join = |suffix: &str| base.join(suffix).map(String::from);

        Ok(Self {
            images: SaveTarget::new(join(&config.images)?, SaveMode::ForceImage),
            private_images: SaveTarget::new(join(&config.private_images)?, SaveMode::ForceImage),
            documents: SaveTarget::new(join(&config.documents)?, SaveMode::Strict),
            files: SaveTarget::new(join(&config.files)?, SaveMode::Auto),
            delete: join(&config.delete)?,
            from_url: join(&config.from_url)?,
        })
    }

    /// Save target for a bucket name as it appears in the route.
    pub fn bucket(&self, name: &str) -> Option<&SaveTarget> {
        match name {
            "images" => Some(&self.images),
            "private-images" => Some(&self.private_images),
            "documents" => Some(&self.documents),
            "files" => Some(&self.files),
            _ => None,
        }
    }
}
