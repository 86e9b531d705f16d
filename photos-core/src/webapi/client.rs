use std::fmt::Display;

use serde::de::DeserializeOwned;
use url::form_urlencoded;

use crate::{
    data::{normalize_photo_urls, Config, Photo},
    error::Error,
};

use super::{PhotoSource, Transport, UreqTransport};

pub const BASE_URL: &str = "https://jsonplaceholder.typicode.com";

pub struct WebApi {
    transport: Box<dyn Transport>,
}

impl WebApi {
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Box::new(transport),
        }
    }

    pub fn with_config(config: &Config) -> Self {
        Self::new(UreqTransport::new(
            Config::proxy().as_deref(),
            config.timeout(),
        ))
    }

    /// Send a GET request and return the deserialized JSON body.
    fn load<T: DeserializeOwned>(&self, request: &RequestBuilder) -> Result<T, Error> {
        let url = request.build();
        log::debug!("GET {}", url);

        let response = self.transport.get(&url)?;
        if !response.is_success() {
            return Err(Error::HttpError {
                status: response.status,
            });
        }
        Ok(serde_json::from_slice(&response.body)?)
    }
}

/// Photo endpoints.
impl WebApi {
    pub fn get_photos(&self, offset: usize, limit: usize) -> Result<Vec<Photo>, Error> {
        let request = &RequestBuilder::new("photos")
            .query("_start", offset)
            .query("_limit", limit);
        let result: Vec<Photo> = self.load(request).inspect_err(|err| {
            log::error!("failed to fetch photos: {}", err);
        })?;
        Ok(normalize_photo_urls(result))
    }

    pub fn search_photos(&self, query: &str) -> Result<Vec<Photo>, Error> {
        let request = &RequestBuilder::new("photos").query("q", query);
        let result: Vec<Photo> = self.load(request).inspect_err(|err| {
            log::error!("failed to search photos: {}", err);
        })?;
        Ok(normalize_photo_urls(result))
    }

    pub fn get_photo(&self, id: u64) -> Result<Photo, Error> {
        let request = &RequestBuilder::new(format!("photos/{}", id));
        let result: Photo = self.load(request).inspect_err(|err| {
            log::error!("failed to fetch photo with ID {}: {}", id, err);
        })?;
        Ok(result.normalized())
    }
}

impl PhotoSource for WebApi {
    fn get_photos(&self, offset: usize, limit: usize) -> Result<Vec<Photo>, Error> {
        WebApi::get_photos(self, offset, limit)
    }

    fn search_photos(&self, query: &str) -> Result<Vec<Photo>, Error> {
        WebApi::search_photos(self, query)
    }

    fn get_photo(&self, id: u64) -> Result<Photo, Error> {
        WebApi::get_photo(self, id)
    }
}

// Builds request URLs against `BASE_URL`, keeping query parameters in the
// order they were added.
#[derive(Debug, Clone)]
struct RequestBuilder {
    path: String,
    queries: Vec<(String, String)>,
}

impl RequestBuilder {
    fn new(path: impl Display) -> Self {
        Self {
            path: path.to_string(),
            queries: Vec::new(),
        }
    }

    fn query(mut self, key: impl Display, value: impl Display) -> Self {
        self.queries.push((key.to_string(), value.to_string()));
        self
    }

    fn build(&self) -> String {
        let mut url = format!("{}/{}", BASE_URL, self.path);
        if !self.queries.is_empty() {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(&self.queries)
                .finish();
            url.push('?');
            url.push_str(&query);
        }
        url
    }
}
