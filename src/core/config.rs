use std::borrow::Cow;
use url::Url;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub host: Url,
    pub username: String,
    pub password: String,
}

impl Config {
    /// Host without the trailing slash, suitable for gluing paths and links onto.
    pub fn site(&self) -> &str {
        self.host.as_str().trim_end_matches('/')
    }

    pub fn username(&self) -> Cow<str> {
        Cow::Borrowed(&self.username)
    }

    pub fn password(&self) -> Cow<str> {
        Cow::Borrowed(&self.password)
    }
}
