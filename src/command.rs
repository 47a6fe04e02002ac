//! Chat command grammar.
//!
//! Every command shape is a struct parsed from text by its own anchored regex;
//! [`Command::parse`] tries them in a fixed order and the first full match wins.

use crate::teamcity::trigger::BuildTriggerRequest;
use recap::Recap;
use serde::Deserialize;

#[derive(Debug, Deserialize, Recap, Clone, PartialEq)]
#[recap(regex = r"^list\s(?P<wildcard>[a-zA-Z0-9_]{1,100})\*$")]
pub struct ListWild {
    pub wildcard: String,
}

#[derive(Debug, Deserialize, Recap, Clone, PartialEq)]
#[recap(regex = r"^build\s(?P<build_id>[a-zA-Z0-9_]{1,100})$")]
pub struct Build {
    pub build_id: String,
}

#[derive(Debug, Deserialize, Recap, Clone, PartialEq)]
#[recap(regex = r"^build\spr(?P<pr>[0-9]{1,5})\sfor\s(?P<build_id>[a-zA-Z0-9_]{1,100})$")]
pub struct BuildPr {
    pub pr: String,
    pub build_id: String,
}

#[derive(Debug, Deserialize, Recap, Clone, PartialEq)]
#[recap(regex = r"^build\s(?P<build_id>[a-zA-Z0-9_]{1,100})\s(?P<branch>[a-zA-Z0-9_]{1,100})$")]
pub struct BuildBranch {
    pub build_id: String,
    pub branch: String,
}

#[derive(Debug, Deserialize, Recap, Clone, PartialEq)]
#[recap(regex = r"^build\sr(?P<revision>[0-9]{1,5})\sfor\s(?P<build_id>[a-zA-Z0-9_]{1,100})$")]
pub struct BuildRevision {
    pub revision: String,
    pub build_id: String,
}

#[derive(Debug, Deserialize, Recap, Clone, PartialEq)]
#[recap(
    regex = r"^build\sr(?P<revision>[0-9]{1,5})\sfor\s(?P<build_id>[a-zA-Z0-9_]{1,100})\s(?P<branch>[a-zA-Z0-9_]{1,100})$"
)]
pub struct BuildBranchRevision {
    pub revision: String,
    pub build_id: String,
    pub branch: String,
}

#[derive(Debug, Deserialize, Recap, Clone, PartialEq)]
#[recap(regex = r"^cp_commits\s+(?P<repo>.+)")]
pub struct CpCommits {
    pub repo: String,
}

#[derive(Debug, Deserialize, Recap, Clone, PartialEq)]
#[recap(regex = r"^running\s(?P<wildcard>[a-zA-Z0-9_]{1,100})\*$")]
pub struct RunningWild {
    pub wildcard: String,
}

#[derive(Debug, Deserialize, Recap, Clone, PartialEq)]
#[recap(regex = r"^queue\s(?P<wildcard>[a-zA-Z0-9_]{1,100})\*$")]
pub struct QueueWild {
    pub wildcard: String,
}

#[derive(Debug, Deserialize, Recap, Clone, PartialEq)]
#[recap(regex = r"^artifacts\s(?P<build_type>[a-zA-Z0-9_]{1,100})$")]
pub struct ArtifactsLatest {
    pub build_type: String,
}

#[derive(Debug, Deserialize, Recap, Clone, PartialEq)]
#[recap(regex = r"^artifacts\s(?P<build_type>[a-zA-Z0-9_]{1,100})\s(?P<build_number>[0-9]{1,100})$")]
pub struct ArtifactsSpecific {
    pub build_type: String,
    pub build_number: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    ListAll,
    ListWild(ListWild),
    Build(Build),
    BuildPr(BuildPr),
    BuildBranch(BuildBranch),
    BuildRevision(BuildRevision),
    BuildBranchRevision(BuildBranchRevision),
    CpCommits(CpCommits),
    RunningAll,
    RunningWild(RunningWild),
    QueueAll,
    QueueWild(QueueWild),
    ArtifactsLatest(ArtifactsLatest),
    ArtifactsSpecific(ArtifactsSpecific),
}

type Matcher = fn(&str) -> Option<Command>;

impl Command {
    pub fn parse(text: &str) -> Option<Command> {
        let matchers: [Matcher; 14] = [
            |s| (s == "list").then_some(Command::ListAll),
            |s| s.parse().ok().map(Command::ListWild),
            |s| s.parse().ok().map(Command::Build),
            |s| s.parse().ok().map(Command::BuildPr),
            |s| s.parse().ok().map(Command::BuildBranch),
            |s| s.parse().ok().map(Command::BuildRevision),
            |s| s.parse().ok().map(Command::BuildBranchRevision),
            |s| s.parse().ok().map(Command::CpCommits),
            |s| (s == "running").then_some(Command::RunningAll),
            |s| s.parse().ok().map(Command::RunningWild),
            |s| (s == "queue").then_some(Command::QueueAll),
            |s| s.parse().ok().map(Command::QueueWild),
            |s| s.parse().ok().map(Command::ArtifactsLatest),
            |s| s.parse().ok().map(Command::ArtifactsSpecific),
        ];

        matchers.iter().find_map(|m| m(text))
    }

    /// The queue request behind the `build*` commands.
    pub fn trigger_request(&self) -> Option<BuildTriggerRequest> {
        let request = match self {
            Command::Build(c) => BuildTriggerRequest::new(&c.build_id),
            Command::BuildPr(c) => BuildTriggerRequest::new(&c.build_id).pull_request(&c.pr),
            Command::BuildBranch(c) => BuildTriggerRequest::new(&c.build_id).branch(&c.branch),
            Command::BuildRevision(c) => BuildTriggerRequest::new(&c.build_id).revision(&c.revision),
            Command::BuildBranchRevision(c) => BuildTriggerRequest::new(&c.build_id)
                .branch(&c.branch)
                .revision(&c.revision),
            _ => return None,
        };

        Some(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wild(s: &str) -> String {
        s.to_owned()
    }

    #[test]
    fn listing_commands_test() {
        assert_eq!(Command::parse("list"), Some(Command::ListAll));
        assert_eq!(
            Command::parse("list Wildcard*"),
            Some(Command::ListWild(ListWild { wildcard: wild("Wildcard") }))
        );
        assert_eq!(Command::parse("running"), Some(Command::RunningAll));
        assert_eq!(
            Command::parse("running ABC*"),
            Some(Command::RunningWild(RunningWild { wildcard: wild("ABC") }))
        );
        assert_eq!(Command::parse("queue"), Some(Command::QueueAll));
        assert_eq!(
            Command::parse("queue Master*"),
            Some(Command::QueueWild(QueueWild { wildcard: wild("Master") }))
        );
    }

    #[test]
    fn wildcard_requires_star_test() {
        assert_eq!(Command::parse("list Wildcard"), None);
        assert_eq!(Command::parse("running ABC"), None);
        assert_eq!(Command::parse("queue Wild-card*"), None);
    }

    #[test]
    fn build_commands_test() {
        assert_eq!(
            Command::parse("build XXX_build").and_then(|c| c.trigger_request()),
            Some(BuildTriggerRequest::new("XXX_build"))
        );
        assert_eq!(
            Command::parse("build pr516 for XXX_build").and_then(|c| c.trigger_request()),
            Some(BuildTriggerRequest::new("XXX_build").pull_request("516"))
        );
        assert_eq!(
            Command::parse("build XXX_build branch").and_then(|c| c.trigger_request()),
            Some(BuildTriggerRequest::new("XXX_build").branch("branch"))
        );
        assert_eq!(
            Command::parse("build r111 for XXX_build").and_then(|c| c.trigger_request()),
            Some(BuildTriggerRequest::new("XXX_build").revision("111"))
        );
        assert_eq!(
            Command::parse("build r111 for XXX_build branch").and_then(|c| c.trigger_request()),
            Some(BuildTriggerRequest::new("XXX_build").branch("branch").revision("111"))
        );
    }

    #[test]
    fn branch_that_looks_like_revision_test() {
        assert_eq!(
            Command::parse("build XXX_build r12"),
            Some(Command::BuildBranch(BuildBranch { build_id: wild("XXX_build"), branch: wild("r12") }))
        );
    }

    #[test]
    fn number_limits_test() {
        assert_eq!(Command::parse("build pr123456 for XXX_build"), None);
        assert_eq!(Command::parse("build r123456 for XXX_build"), None);
        assert_eq!(Command::parse(&format!("build {}", "a".repeat(101))), None);
        assert!(Command::parse(&format!("build {}", "a".repeat(100))).is_some());
    }

    #[test]
    fn other_commands_test() {
        assert_eq!(
            Command::parse("cp_commits build-tools"),
            Some(Command::CpCommits(CpCommits { repo: wild("build-tools") }))
        );
        assert_eq!(
            Command::parse("artifacts XXX_Master_Build"),
            Some(Command::ArtifactsLatest(ArtifactsLatest { build_type: wild("XXX_Master_Build") }))
        );
        assert_eq!(
            Command::parse("artifacts XXX_Master_Build 12345"),
            Some(Command::ArtifactsSpecific(ArtifactsSpecific {
                build_type: wild("XXX_Master_Build"),
                build_number: wild("12345"),
            }))
        );
        assert_eq!(Command::parse("artifacts XXX_Master_Build latest"), None);
        assert_eq!(Command::parse("deploy everything"), None);
        assert_eq!(Command::parse("listing"), None);
    }
}
