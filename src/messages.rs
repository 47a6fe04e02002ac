use anyhow::Result;
use serde::Serialize;
use tinytemplate::TinyTemplate;

pub const BUILDS_EMPTY: &str = "Cannot find any builds to list!";
pub const REQUEST_ERROR: &str = "Error fetching TeamCity build types";
pub const GIT_FETCHING: &str = "Fetching, please wait...";
pub const GIT_CLONING: &str = "I need to clone this repo, please wait...";

const TEMPLATES: &[(&str, &str)] = &[
    (
        "buildtypes.list",
        "Here are the builds I found:\n{lines} \n\nUse a build `id` from the list to trigger a build. *@buildbot build `id`*",
    ),
    ("builds.list", "Here are the builds I found:\n{lines}"),
    ("artifacts.error", "Cannot find build {build_type} ({build_number})!"),
    ("artifacts.empty", "No artifact was found in the given build number ({build_number})!"),
    ("artifacts.list", "Here are the artifacts of {header}:\n{lines}"),
    ("build.triggered", "Build has been triggered: {url}"),
    ("cp_commits.result", "*Commits to be cherry picked:* ```{output}```"),
];

#[derive(Serialize)]
pub struct Lines<'a> {
    pub lines: &'a str,
}

#[derive(Serialize)]
pub struct MissingBuild<'a> {
    pub build_type: &'a str,
    pub build_number: &'a str,
}

#[derive(Serialize)]
pub struct ArtifactList<'a> {
    pub header: &'a str,
    pub lines: &'a str,
}

#[derive(Serialize)]
pub struct Triggered<'a> {
    pub url: &'a str,
}

#[derive(Serialize)]
pub struct ScriptOutput<'a> {
    pub output: &'a str,
}

/// Reply texts. Values are inserted verbatim, chat markup included.
pub struct Messages {
    templates: TinyTemplate<'static>,
}

impl Messages {
    pub fn new() -> Result<Self> {
        let mut templates = TinyTemplate::new();
        templates.set_default_formatter(&tinytemplate::format_unescaped);

        for &(name, text) in TEMPLATES {
            templates.add_template(name, text)?;
        }

        Ok(Self { templates })
    }

    pub fn render<C: Serialize>(&self, name: &str, context: &C) -> Result<String> {
        self.templates.render(name, context).map_err(anyhow::Error::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_types_list_test() {
        let messages = Messages::new().unwrap();
        let text = messages
            .render("buildtypes.list", &Lines { lines: "\nA :: id=`A`" })
            .unwrap();

        assert_eq!(
            text,
            "Here are the builds I found:\n\nA :: id=`A` \n\nUse a build `id` from the list to trigger a build. *@buildbot build `id`*"
        );
    }

    #[test]
    fn values_are_not_escaped_test() {
        let messages = Messages::new().unwrap();
        let text = messages
            .render("build.triggered", &Triggered { url: "https://tc/viewQueued.html?itemId=1&a=<b>" })
            .unwrap();

        assert_eq!(text, "Build has been triggered: https://tc/viewQueued.html?itemId=1&a=<b>");
    }

    #[test]
    fn missing_build_test() {
        let messages = Messages::new().unwrap();
        let text = messages
            .render("artifacts.error", &MissingBuild { build_type: "XXX_Master_Build", build_number: "" })
            .unwrap();

        assert_eq!(text, "Cannot find build XXX_Master_Build ()!");
    }
}
