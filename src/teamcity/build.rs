use crate::teamcity::build_locator::BuildLocatorBuilder;
use crate::teamcity::Client;
use crate::normalize::*;
use anyhow::Result;
use derive_more::Display;
use serde::Deserialize;
use tracing::warn;

/// Paged `{"count": .., "build": [..]}` envelope shared by builds and the queue.
#[derive(Debug, Deserialize)]
pub struct Builds<T> {
    #[serde(default)]
    count: i64,
    #[serde(default = "Vec::new")]
    build: Vec<T>,
}

impl<T> Builds<T> {
    fn filtered<F>(self, wildcard: Option<&str>, build_type_id: F) -> Vec<T>
    where
        F: Fn(&T) -> &str,
    {
        if self.count <= 0 {
            return Vec::new();
        }

        self.build
            .into_iter()
            .filter(|b| matches_wildcard(build_type_id(b), wildcard))
            .collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunningBuild {
    #[serde(deserialize_with = "loose_string")]
    pub id: String,
    pub build_type_id: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub number: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub percentage_complete: String,
    pub branch_name: Option<String>,
    /// filled from the per-build detail request
    #[serde(skip)]
    pub remaining: RemainingTime,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedBuild {
    #[serde(deserialize_with = "loose_string")]
    pub id: String,
    pub build_type_id: String,
    pub branch_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BuildDetail {
    #[serde(rename = "running-info")]
    running_info: Option<RunningInfo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunningInfo {
    #[serde(default, deserialize_with = "loose_seconds")]
    pub elapsed_seconds: i64,
    #[serde(default, deserialize_with = "loose_seconds")]
    pub estimated_total_seconds: i64,
}

impl RunningInfo {
    pub fn remaining(&self) -> RemainingTime {
        let diff = self.estimated_total_seconds.saturating_sub(self.elapsed_seconds);

        RemainingTime {
            duration: format_duration(diff.saturating_abs()),
            overtime: diff < 0,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct RemainingTime {
    pub duration: String,
    pub overtime: bool,
}

/// strftime pattern picked by magnitude; the bounds are exclusive
#[derive(Debug, Clone, Copy, PartialEq, Display)]
pub enum TimeFormat {
    #[display(fmt = "%Hh:%Mm:%Ss")]
    Hours,

    #[display(fmt = "%Mm:%Ss")]
    Minutes,

    #[display(fmt = "%Ss")]
    Seconds,
}

impl TimeFormat {
    pub fn for_seconds(seconds: i64) -> Self {
        if seconds > 3600 {
            TimeFormat::Hours
        } else if seconds > 60 {
            TimeFormat::Minutes
        } else {
            TimeFormat::Seconds
        }
    }
}

/// Renders `seconds` as a UTC wall-clock offset from the epoch, so hours wrap past a day.
pub fn format_duration(seconds: i64) -> String {
    let pattern = TimeFormat::for_seconds(seconds).to_string();

    chrono::DateTime::from_timestamp(seconds, 0)
        .map(|t| t.format(&pattern).to_string())
        .unwrap_or_default()
}

#[derive(Debug, Deserialize)]
struct FinishedBuild {
    #[serde(deserialize_with = "loose_string")]
    id: String,
    #[serde(default, deserialize_with = "loose_string")]
    number: String,
}

/// Resolved build; an empty `id` means nothing matched.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BuildRef {
    pub id: String,
    pub number: String,
}

impl<'a> Client<'a> {
    pub async fn running_builds(&self, wildcard: Option<&str>) -> Result<Vec<RunningBuild>> {
        let locator = BuildLocatorBuilder::default()
            .running(true)
            .any_branch(true)
            .build()?;

        let response: Builds<RunningBuild> = self
            .http_client
            .get(format!("/app/rest/builds?locator={locator}"))
            .await?;

        let mut builds = response.filtered(wildcard, |b| b.build_type_id.as_str());

        for build in builds.iter_mut() {
            build.remaining = self.remaining_time(&build.id).await?;
        }

        Ok(builds)
    }

    pub async fn queued_builds(&self, wildcard: Option<&str>) -> Result<Vec<QueuedBuild>> {
        let response: Builds<QueuedBuild> = self.http_client.get("/app/rest/buildQueue").await?;

        Ok(response.filtered(wildcard, |b| b.build_type_id.as_str()))
    }

    async fn build_detail(&self, build_id: &str) -> Result<BuildDetail> {
        self.http_client.get(format!("/app/rest/builds/id:{build_id}")).await
    }

    pub async fn remaining_time(&self, build_id: &str) -> Result<RemainingTime> {
        let detail = self.build_detail(build_id).await?;

        Ok(detail
            .running_info
            .as_ref()
            .map(RunningInfo::remaining)
            .unwrap_or_default())
    }

    /// Latest successful finished build of `build_type`, optionally pinned to a build number.
    /// Failures are swallowed: the caller gets an empty id and the number it asked for.
    pub async fn resolve_build_id(&self, build_type: &str, number: Option<&str>) -> BuildRef {
        let not_found = BuildRef {
            id: String::new(),
            number: number.unwrap_or_default().to_owned(),
        };

        let mut builder = BuildLocatorBuilder::default();
        builder.build_type(build_type).status("SUCCESS").state("finished");

        if let Some(number) = number {
            builder.number(number);
        }

        let locator = match builder.build() {
            Ok(locator) => locator,
            Err(e) => {
                warn!("{e}");
                return not_found;
            }
        };

        let response: Builds<FinishedBuild> = match self
            .http_client
            .get(format!("/app/rest/builds/?locator={locator}"))
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Cannot resolve a build of {build_type}: {e:#}");
                return not_found;
            }
        };

        if response.count <= 0 {
            return not_found;
        }

        response
            .build
            .into_iter()
            .next()
            .map(|b| BuildRef { id: b.id, number: b.number })
            .unwrap_or(not_found)
    }
}
