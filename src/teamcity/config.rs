use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct TeamcitySettings {
    #[serde(flatten)]
    pub client: crate::core::config::Config,
}
