use anyhow::{Context, Result};
use config::Config;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::repo::GitSettings;
use crate::teamcity::config::TeamcitySettings;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub teamcity: TeamcitySettings,
    pub git: GitSettings,
}

fn default_config_path() -> Result<PathBuf> {
    directories::ProjectDirs::from("", "", "teamcity-buildbot")
        .map(|dirs| dirs.config_dir().join("config.yaml"))
        .context("Cannot find a config directory")
}

impl Settings {
    pub fn new(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_owned(),
            None => default_config_path()?,
        };

        let settings = Config::builder()
            .add_source(config::File::from(config_path).required(false))
            // Eg.. `BUILDBOT_TEAMCITY__PASSWORD=secret` sets `teamcity.password`
            .add_source(config::Environment::with_prefix("BUILDBOT").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn yaml_file_test() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "teamcity:\n  host: https://site.teamcity.com/\n  username: bot\n  password: secret\n\
             git:\n  uri: git@gitlab.example.com:group\n  script: ./cherry-picks.sh"
        )
        .unwrap();

        let settings = Settings::new(Some(file.path())).unwrap();

        assert_eq!(settings.teamcity.client.site(), "https://site.teamcity.com");
        assert_eq!(settings.teamcity.client.username(), "bot");
        assert_eq!(settings.git.uri, "git@gitlab.example.com:group");
        assert_eq!(settings.git.script, "./cherry-picks.sh");
        assert!(settings.git.repos_dir.is_none());
    }

    #[test]
    fn missing_keys_test() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "git:\n  uri: git@gitlab.example.com:group\n  script: ls").unwrap();

        assert!(Settings::new(Some(file.path())).is_err());
    }
}
