use crate::teamcity::Client;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct File {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct Files {
    #[serde(default)]
    count: i64,
    #[serde(default)]
    file: Vec<File>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub name: String,
    pub build_type_id: String,
    pub build_id: String,
}

impl<'a> Client<'a> {
    pub async fn artifacts(&self, build_type: &str, build_id: &str) -> Result<Vec<Artifact>> {
        let files: Files = self
            .http_client
            .get(format!("/app/rest/builds/id:{build_id}/artifacts"))
            .await?;

        if files.count <= 0 {
            return Ok(Vec::new());
        }

        Ok(files
            .file
            .into_iter()
            .filter(|f| !f.name.is_empty())
            .map(|f| Artifact {
                name: f.name,
                build_type_id: build_type.to_owned(),
                build_id: build_id.to_owned(),
            })
            .collect())
    }
}
