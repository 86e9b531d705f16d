mod client;
mod transport;

pub use client::{WebApi, BASE_URL};
pub use transport::{HttpResponse, Transport, UreqTransport};

#[cfg(test)]
pub use transport::MockTransport;

use crate::{data::Photo, error::Error};

/// Remote side of the photo collection, as seen by the controller.
#[cfg_attr(test, mockall::automock)]
pub trait PhotoSource: Send + Sync {
    fn get_photos(&self, offset: usize, limit: usize) -> Result<Vec<Photo>, Error>;

    fn search_photos(&self, query: &str) -> Result<Vec<Photo>, Error>;

    fn get_photo(&self, id: u64) -> Result<Photo, Error>;
}
