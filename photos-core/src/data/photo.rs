use serde::{Deserialize, Serialize};

/// Image host the API still hands out, which no longer serves images.
pub const PLACEHOLDER_PREFIX: &str = "https://via.placeholder.com";
pub const REPLACEMENT_PREFIX: &str = "https://dummyimage.com";

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub album_id: u64,
    pub id: u64,
    pub title: String,
    pub url: String,
    pub thumbnail_url: String,
}

impl Photo {
    /// Points both image URLs at the replacement host, if `url` uses the
    /// placeholder host.  Records on any other host are returned as-is.
    pub fn normalized(mut self) -> Self {
        if let Some(path) = self.url.strip_prefix(PLACEHOLDER_PREFIX) {
            self.url = format!("{REPLACEMENT_PREFIX}{path}");
            if let Some(path) = self.thumbnail_url.strip_prefix(PLACEHOLDER_PREFIX) {
                self.thumbnail_url = format!("{REPLACEMENT_PREFIX}{path}");
            }
        }
        self
    }
}

pub fn normalize_photo_urls(photos: Vec<Photo>) -> Vec<Photo> {
    photos.into_iter().map(Photo::normalized).collect()
}
