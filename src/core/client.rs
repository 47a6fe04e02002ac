use anyhow::Result;
use derive_more::Display;
use reqwest::header;
use tracing::info;
use super::config::Config;

/// Payload flavour negotiated with the server through `Accept`/`Content-Type`.
#[derive(Debug, Clone, Copy, Display)]
pub enum ContentType {
    #[display(fmt = "application/json")]
    Json,

    #[display(fmt = "application/xml")]
    Xml,
}

impl ContentType {
    fn headers(self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();

        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_str(&self.to_string())?,
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_str(&format!("{self}; charset=utf-8"))?,
        );

        Ok(headers)
    }
}

pub struct Client<'a> {
    http_client: reqwest::Client,
    config: &'a Config,
}

impl<'a> Client<'a> {
    pub fn new(config: &'a Config) -> Result<Self> {
        let http_client = reqwest::Client::builder().build()?;

        Ok(Self {
            http_client,
            config,
        })
    }

    pub fn site(&self) -> &str {
        self.config.site()
    }

    fn url(&self, path: &str) -> Result<reqwest::Url> {
        reqwest::Url::parse(&format!("{}{path}", self.site())).map_err(anyhow::Error::new)
    }

    pub async fn get<U, R>(&self, url: U) -> Result<R>
    where
        U: Into<String>,
        R: serde::de::DeserializeOwned
    {
        let u = self.url(&url.into())?;

        info!("GET {u}");

        self
            .http_client
            .get(u)
            .headers(ContentType::Json.headers()?)
            .basic_auth(self.config.username(), Some(self.config.password()))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(anyhow::Error::new)
    }

    /// Posts an XML document and decodes the XML answer.
    pub async fn post_xml<U, R>(&self, url: U, body: String) -> Result<R>
    where
        U: Into<String>,
        R: serde::de::DeserializeOwned
    {
        let u = self.url(&url.into())?;

        info!("POST {u}\n{body}");

        let text = self
            .http_client
            .post(u)
            .headers(ContentType::Xml.headers()?)
            .basic_auth(self.config.username(), Some(self.config.password()))
            .body(body)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        quick_xml::de::from_str(&text).map_err(anyhow::Error::new)
    }
}

#[cfg(test)]
mod tests {
    use super::ContentType;
    use reqwest::header;

    #[test]
    fn content_type_headers_test() {
        let headers = ContentType::Xml.headers().unwrap();

        assert_eq!(headers[header::CONTENT_TYPE], "application/xml");
        assert_eq!(headers[header::ACCEPT], "application/xml; charset=utf-8");

        let headers = ContentType::Json.headers().unwrap();

        assert_eq!(headers[header::ACCEPT], "application/json; charset=utf-8");
    }
}
