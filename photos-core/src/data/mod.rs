mod config;
mod photo;
mod photos;
mod promise;

pub use crate::data::{
    config::{Config, DEFAULT_PAGE_SIZE, WIDE_PAGE_SIZE},
    photo::{normalize_photo_urls, Photo, PLACEHOLDER_PREFIX, REPLACEMENT_PREFIX},
    photos::{DetailRequest, PageRequest, Photos, SearchRequest, Settled, Status},
    promise::Promise,
};
