use crate::teamcity::artifact::Artifact;
use crate::teamcity::build::{QueuedBuild, RunningBuild};
use crate::teamcity::build_type::BuildType;

/// Renders TeamCity entities as chat lines with `<url|label>` links.
pub struct Formatter<'a> {
    site: &'a str,
}

fn branch_suffix(branch_name: Option<&str>) -> String {
    branch_name.map(|b| format!(" - {b}")).unwrap_or_default()
}

/// Each line gets its own leading newline, the way replies are stitched together.
pub fn join_lines<I>(lines: I) -> String
where
    I: IntoIterator<Item = String>,
{
    lines.into_iter().map(|l| format!("\n{l}")).collect()
}

impl<'a> Formatter<'a> {
    pub fn new(site: &'a str) -> Self {
        Self { site }
    }

    pub fn running_build_link(&self, build_id: &str, build_type_id: &str) -> String {
        format!("{}/viewLog.html?buildId={build_id}&buildTypeId={build_type_id}", self.site)
    }

    pub fn queued_build_link(&self, build_id: &str) -> String {
        format!("{}/viewQueued.html?itemId={build_id}", self.site)
    }

    pub fn artifact_link(&self, artifact: &Artifact) -> String {
        format!(
            "{}/repository/download/{}/{}:id/{}",
            self.site, artifact.build_type_id, artifact.build_id, artifact.name
        )
    }

    pub fn build_type(&self, build_type: &BuildType) -> String {
        format!("{} :: id=`{}`", build_type.project_name, build_type.id)
    }

    pub fn running_build(&self, build: &RunningBuild) -> String {
        let link = self.running_build_link(&build.id, &build.build_type_id);
        let label = if build.remaining.overtime { "Over time" } else { "Time left" };

        format!(
            "<{link}|{build_type_id}> ({number}) - `{percent}%` complete - {label}: `{duration}`{branch}",
            build_type_id = build.build_type_id,
            number = build.number,
            percent = build.percentage_complete,
            duration = build.remaining.duration,
            branch = branch_suffix(build.branch_name.as_deref()),
        )
    }

    pub fn queued_build(&self, build: &QueuedBuild) -> String {
        format!(
            "<{link}|{build_type_id}>{branch}",
            link = self.queued_build_link(&build.id),
            build_type_id = build.build_type_id,
            branch = branch_suffix(build.branch_name.as_deref()),
        )
    }

    pub fn artifact(&self, artifact: &Artifact) -> String {
        format!("<{}|{}>", self.artifact_link(artifact), artifact.name)
    }

    pub fn artifacts_build(&self, build_type: &str, build_id: &str, build_number: &str) -> String {
        format!(
            "<{}&tab=artifacts|{build_type} ({build_number})>",
            self.running_build_link(build_id, build_type)
        )
    }
}
