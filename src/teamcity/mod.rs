pub mod artifact;
pub mod build;
pub mod build_locator;
pub mod build_type;
pub mod config;
pub mod trigger;

use anyhow::Result;
use crate::teamcity::config::TeamcitySettings;

pub struct Client<'a> {
    pub http_client: crate::core::client::Client<'a>,
}

impl<'a> Client<'a> {
    pub fn new(config: &'a TeamcitySettings) -> Result<Self> {
        Ok(Self {
            http_client: crate::core::client::Client::new(&config.client)?,
        })
    }

    pub fn site(&self) -> &str {
        self.http_client.site()
    }
}
