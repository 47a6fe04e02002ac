use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};

use crate::command::Command;
use crate::format::{join_lines, Formatter};
use crate::messages::*;
use crate::repo::RepoSync;
use crate::teamcity::trigger::BuildTriggerRequest;
use crate::teamcity::Client;

/// Where replies to a command go.
pub trait Response {
    fn reply(&mut self, text: String);
}

impl Response for Vec<String> {
    fn reply(&mut self, text: String) {
        self.push(text);
    }
}

pub struct Handler<'a> {
    client: Client<'a>,
    repos: &'a dyn RepoSync,
    messages: Messages,
}

impl<'a> Handler<'a> {
    pub fn new(client: Client<'a>, repos: &'a dyn RepoSync) -> Result<Self> {
        Ok(Self {
            client,
            repos,
            messages: Messages::new()?,
        })
    }

    fn formatter(&self) -> Formatter<'_> {
        Formatter::new(self.client.site())
    }

    /// Runs the command in `text`. Returns `false` when the text is not a command.
    pub async fn dispatch(&self, text: &str, response: &mut dyn Response) -> Result<bool> {
        let Some(command) = Command::parse(text.trim()) else {
            debug!("Not a command: {text}");
            return Ok(false);
        };

        info!("{command:?}");

        match &command {
            Command::ListAll => self.list(None, response).await?,
            Command::ListWild(c) => self.list(Some(&c.wildcard), response).await?,
            Command::CpCommits(c) => self.cherry_picks(&c.repo, response)?,
            Command::RunningAll => self.running(None, response).await?,
            Command::RunningWild(c) => self.running(Some(&c.wildcard), response).await?,
            Command::QueueAll => self.queue(None, response).await?,
            Command::QueueWild(c) => self.queue(Some(&c.wildcard), response).await?,
            Command::ArtifactsLatest(c) => self.artifacts(&c.build_type, None, response).await?,
            Command::ArtifactsSpecific(c) => {
                self.artifacts(&c.build_type, Some(&c.build_number), response).await?
            }
            build => {
                let request = build
                    .trigger_request()
                    .with_context(|| format!("{build:?} does not queue a build"))?;

                self.build(&request, response).await?
            }
        }

        Ok(true)
    }

    fn request_failed(&self, e: anyhow::Error, response: &mut dyn Response) {
        error!("TeamCity HTTPError: {e:#}");
        response.reply(REQUEST_ERROR.to_owned());
    }

    async fn list(&self, wildcard: Option<&str>, response: &mut dyn Response) -> Result<()> {
        let build_types = match self.client.build_type_list(wildcard).await {
            Ok(build_types) => build_types,
            Err(e) => {
                self.request_failed(e, response);
                return Ok(());
            }
        };

        if build_types.is_empty() {
            response.reply(BUILDS_EMPTY.to_owned());
            return Ok(());
        }

        let f = self.formatter();
        let lines = join_lines(build_types.iter().map(|bt| f.build_type(bt)));

        response.reply(self.messages.render("buildtypes.list", &Lines { lines: &lines })?);

        Ok(())
    }

    async fn build(&self, request: &BuildTriggerRequest, response: &mut dyn Response) -> Result<()> {
        let queued = match self.client.trigger_build(request).await {
            Ok(queued) => queued,
            Err(e) => {
                response.reply(REQUEST_ERROR.to_owned());
                return Err(e);
            }
        };

        response.reply(self.messages.render("build.triggered", &Triggered { url: &queued.web_url })?);

        Ok(())
    }

    async fn running(&self, wildcard: Option<&str>, response: &mut dyn Response) -> Result<()> {
        let builds = match self.client.running_builds(wildcard).await {
            Ok(builds) => builds,
            Err(e) => {
                self.request_failed(e, response);
                return Ok(());
            }
        };

        let f = self.formatter();
        self.reply_builds(join_lines(builds.iter().map(|b| f.running_build(b))), response)
    }

    async fn queue(&self, wildcard: Option<&str>, response: &mut dyn Response) -> Result<()> {
        let builds = match self.client.queued_builds(wildcard).await {
            Ok(builds) => builds,
            Err(e) => {
                self.request_failed(e, response);
                return Ok(());
            }
        };

        let f = self.formatter();
        self.reply_builds(join_lines(builds.iter().map(|b| f.queued_build(b))), response)
    }

    fn reply_builds(&self, lines: String, response: &mut dyn Response) -> Result<()> {
        if lines.is_empty() {
            response.reply(BUILDS_EMPTY.to_owned());
        } else {
            response.reply(self.messages.render("builds.list", &Lines { lines: &lines })?);
        }

        Ok(())
    }

    async fn artifacts(
        &self,
        build_type: &str,
        build_number: Option<&str>,
        response: &mut dyn Response,
    ) -> Result<()> {
        let build = self.client.resolve_build_id(build_type, build_number).await;

        if build.id.is_empty() {
            let text = self.messages.render(
                "artifacts.error",
                &MissingBuild { build_type, build_number: &build.number },
            )?;
            response.reply(text);
            return Ok(());
        }

        let artifacts = match self.client.artifacts(build_type, &build.id).await {
            Ok(artifacts) => artifacts,
            Err(e) => {
                self.request_failed(e, response);
                return Ok(());
            }
        };

        // the user-supplied number, not the resolved one
        if artifacts.is_empty() {
            let text = self.messages.render(
                "artifacts.empty",
                &MissingBuild { build_type, build_number: build_number.unwrap_or_default() },
            )?;
            response.reply(text);
            return Ok(());
        }

        let f = self.formatter();
        let header = f.artifacts_build(build_type, &build.id, &build.number);
        let lines = join_lines(artifacts.iter().map(|a| f.artifact(a)));

        response.reply(self.messages.render(
            "artifacts.list",
            &ArtifactList { header: &header, lines: &lines },
        )?);

        Ok(())
    }

    fn cherry_picks(&self, repo: &str, response: &mut dyn Response) -> Result<()> {
        if self.repos.is_cloned(repo) {
            response.reply(GIT_FETCHING.to_owned());
        } else {
            response.reply(GIT_CLONING.to_owned());
        }

        if let Err(e) = self.repos.ensure_cloned(repo) {
            warn!("Cannot sync {repo}: {e:#}");
        }

        let output = self.repos.run_script(repo).unwrap_or_else(|e| {
            warn!("{e:#}");
            String::new()
        });

        response.reply(self.messages.render("cp_commits.result", &ScriptOutput { output: &output })?);

        Ok(())
    }
}
