use crate::teamcity::Client;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

const COMMENT: &str = "Triggering build from TeamCity Slack buildbot.";

/// What to queue. Which optional parts are set decides the payload shape:
/// a PR number wins over branch/revision, which default to `trunk`/`HEAD`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildTriggerRequest {
    pub build_type_id: String,
    pub branch: Option<String>,
    pub revision: Option<String>,
    pub pr_number: Option<String>,
}

impl BuildTriggerRequest {
    pub fn new(build_type_id: impl Into<String>) -> Self {
        Self {
            build_type_id: build_type_id.into(),
            ..Self::default()
        }
    }

    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = Some(revision.into());
        self
    }

    pub fn pull_request(mut self, pr_number: impl Into<String>) -> Self {
        self.pr_number = Some(pr_number.into());
        self
    }

    pub fn to_xml(&self) -> Result<String> {
        quick_xml::se::to_string(&BuildBody::from(self)).map_err(anyhow::Error::new)
    }
}

#[derive(Debug, Serialize)]
struct BuildTypeBody<'a> {
    #[serde(rename = "@id")]
    id: &'a str,
}

#[derive(Debug, Serialize)]
struct Property {
    #[serde(rename = "@name")]
    name: &'static str,
    #[serde(rename = "@value")]
    value: String,
}

#[derive(Debug, Serialize)]
struct Properties {
    property: Vec<Property>,
}

#[derive(Debug, Serialize)]
struct Comment {
    text: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename = "build")]
struct BuildBody<'a> {
    #[serde(rename = "@branchName", skip_serializing_if = "Option::is_none")]
    branch_name: Option<String>,
    #[serde(rename = "buildType")]
    build_type: BuildTypeBody<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    properties: Option<Properties>,
    comment: Comment,
}

impl<'a> From<&'a BuildTriggerRequest> for BuildBody<'a> {
    fn from(request: &'a BuildTriggerRequest) -> Self {
        let build_type = BuildTypeBody { id: &request.build_type_id };
        let comment = Comment { text: COMMENT };

        if let Some(pr) = &request.pr_number {
            return Self {
                branch_name: Some(format!("{pr}/merge")),
                build_type,
                properties: None,
                comment,
            };
        }

        let svn_branch = request
            .branch
            .as_ref()
            .map_or_else(|| "trunk".to_owned(), |b| format!("branches/{b}"));
        let svn_revision = request.revision.clone().unwrap_or_else(|| "HEAD".to_owned());

        Self {
            branch_name: None,
            build_type,
            properties: Some(Properties {
                property: vec![
                    Property { name: "env.SVN_BRANCH", value: svn_branch },
                    Property { name: "env.SVN_REVISION", value: svn_revision },
                ],
            }),
            comment,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TriggeredBuild {
    #[serde(rename = "@webUrl")]
    pub web_url: String,
}

impl<'a> Client<'a> {
    pub async fn trigger_build(&self, request: &BuildTriggerRequest) -> Result<TriggeredBuild> {
        let xml = request.to_xml()?;

        info!("{xml}");

        self.http_client.post_xml("/app/rest/buildQueue", xml).await
    }
}
