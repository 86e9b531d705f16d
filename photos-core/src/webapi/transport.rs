use std::time::Duration;

use ureq::Agent;

use crate::{error::Error, util::default_ureq_agent_builder};

#[derive(Clone, Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues a single GET and hands back whatever the server answered.
/// Non-success statuses are returned, not raised; only a missing response
/// is an error.
#[cfg_attr(test, mockall::automock)]
pub trait Transport: Send + Sync {
    fn get(&self, url: &str) -> Result<HttpResponse, Error>;
}

pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new(proxy_url: Option<&str>, timeout: Duration) -> Self {
        Self {
            agent: default_ureq_agent_builder(proxy_url, timeout).build().into(),
        }
    }
}

impl Transport for UreqTransport {
    fn get(&self, url: &str) -> Result<HttpResponse, Error> {
        let mut response = self
            .agent
            .get(url)
            .header("Accept", "application/json")
            .call()?;
        let status = response.status().as_u16();
        let body = response.body_mut().read_to_vec()?;
        Ok(HttpResponse { status, body })
    }
}
