use anyhow::{Context, Result};
use rand::seq::IndexedRandom;
use tracing::info;

/// Supplies a picture URL for seasonal greetings.
pub trait ImagePicker: Send + Sync {
    fn pick_image(&self) -> String;
}

/// Picks uniformly from a fixed pool of image URLs.
#[derive(Debug, Clone)]
pub struct ImagePool {
    urls: Vec<String>,
}

impl ImagePool {
    /// Fails when no usable URL is configured or any entry is not a valid URL;
    /// the bot should not start without a sendable picture.
    pub fn new(urls: Vec<String>) -> Result<Self> {
        let urls: Vec<String> = urls
            .into_iter()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .collect();
        for url in &urls {
            url.parse::<reqwest::Url>()
                .with_context(|| format!("Invalid image URL in [images]: {}", url))?;
        }
        if urls.is_empty() {
            anyhow::bail!("Image pool is empty: configure at least one URL under [images]");
        }
        info!("Image pool initialized with {} URL(s)", urls.len());
        Ok(Self { urls })
    }
}

impl ImagePicker for ImagePool {
    fn pick_image(&self) -> String {
        // `new` guarantees the pool is non-empty.
        self.urls
            .choose(&mut rand::rng())
            .cloned()
            .unwrap_or_default()
    }
}
