use crate::teamcity::Client;
use crate::normalize::*;
use anyhow::Result;
use serde::Deserialize;
use struct_field_names_as_array::FieldNamesAsArray;

#[derive(Debug, Deserialize, FieldNamesAsArray, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
#[field_names_as_array(rename_all = "camelCase")]
pub struct BuildType {
    pub id: String,
    #[serde(default)]
    pub project_name: String,
}

#[derive(Debug, Deserialize, FieldNamesAsArray)]
#[serde(rename_all = "camelCase")]
#[field_names_as_array(rename_all = "camelCase")]
pub struct BuildTypes {
    #[serde(default)]
    pub(crate) build_type: Vec<BuildType>,
}

impl BuildTypes {
    pub fn fields() -> String {
        normalize_field_names(&BuildTypes::FIELD_NAMES_AS_ARRAY).replace(
            "buildType",
            &format!(
                "buildType({})",
                normalize_field_names(&BuildType::FIELD_NAMES_AS_ARRAY)
            ),
        )
    }
}

impl<'a> Client<'a> {
    pub async fn build_type_list(&self, wildcard: Option<&str>) -> Result<Vec<BuildType>> {
        let url = format!("/httpAuth/app/rest/buildTypes?fields={fields}", fields = BuildTypes::fields());

        let response: BuildTypes = self.http_client.get(url).await?;

        Ok(response
            .build_type
            .into_iter()
            .filter(|bt| matches_wildcard(&bt.id, wildcard))
            .collect())
    }
}
