use std::path::{Component, Path, PathBuf};
use std::process::Command;
use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

/// Local mirror of a remote repository plus the script run inside it.
pub trait RepoSync {
    fn is_cloned(&self, repo: &str) -> bool;

    /// Fetches (with pruning) an existing mirror or clones a missing one.
    fn ensure_cloned(&self, repo: &str) -> Result<()>;

    /// Runs the configured script inside the mirror and returns its stdout.
    fn run_script(&self, repo: &str) -> Result<String>;
}

#[derive(Debug, Deserialize)]
pub struct GitSettings {
    /// base remote, `<uri>/<repo>.git` is cloned
    pub uri: String,
    pub script: String,
    pub repos_dir: Option<PathBuf>,
}

pub struct GitMirror<'a> {
    settings: &'a GitSettings,
    repos_dir: PathBuf,
}

impl<'a> GitMirror<'a> {
    pub fn new(settings: &'a GitSettings) -> Result<Self> {
        let repos_dir = match &settings.repos_dir {
            Some(dir) => dir.clone(),
            None => directories::BaseDirs::new()
                .map(|dirs| dirs.home_dir().join("repos"))
                .context("Cannot find a home directory")?,
        };

        Ok(Self { settings, repos_dir })
    }

    /// A repo name is a single plain path segment, so the mirror stays inside `repos_dir`.
    fn path(&self, repo: &str) -> Result<PathBuf> {
        let mut components = Path::new(repo).components();

        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => Ok(self.repos_dir.join(name)),
            _ => anyhow::bail!("Invalid repository name: {repo}"),
        }
    }

    fn remote_uri(&self, repo: &str) -> String {
        format!("{}/{repo}.git", self.settings.uri)
    }

    fn get_git_remote_callbacks() -> git2::RemoteCallbacks<'static> {
        let mut callbacks = git2::RemoteCallbacks::new();
        let key = directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".ssh").join("id_rsa"))
            .unwrap_or_default();

        callbacks.credentials(move |_url, username_from_url, _allowed_types| {
            git2::Cred::ssh_key(username_from_url.unwrap_or("git"), None, &key, None)
        });

        callbacks.sideband_progress(|data| {
            debug!("remote: {}", String::from_utf8_lossy(data).trim_end());
            true
        });

        callbacks.update_tips(|refname, a, b| {
            if a.is_zero() {
                debug!("[new]     {:20} {}", b, refname);
            } else {
                debug!("[updated] {:10}..{:10} {}", a, b, refname);
            }
            true
        });

        callbacks
    }

    fn clone_mirror(&self, repo: &str) -> Result<()> {
        let uri = self.remote_uri(repo);
        let path = self.path(repo)?;

        info!("git clone {uri} {}", path.display());

        let mut options = git2::FetchOptions::new();
        options.remote_callbacks(Self::get_git_remote_callbacks());

        git2::build::RepoBuilder::new()
            .fetch_options(options)
            .clone(&uri, &path)?;

        Ok(())
    }

    fn fetch_mirror(&self, repo: &str) -> Result<()> {
        let path = self.path(repo)?;

        info!("git fetch -p in {}", path.display());

        let repository = git2::Repository::open(&path)?;
        let mut remote = repository.find_remote("origin")?;

        let mut options = git2::FetchOptions::new();
        options
            .remote_callbacks(Self::get_git_remote_callbacks())
            .prune(git2::FetchPrune::On);

        remote.fetch(&[] as &[&str], Some(&mut options), None)?;

        let stats = remote.stats();
        debug!(
            "Received {}/{} objects in {} bytes",
            stats.indexed_objects(),
            stats.total_objects(),
            stats.received_bytes()
        );

        Ok(())
    }
}

impl<'a> RepoSync for GitMirror<'a> {
    fn is_cloned(&self, repo: &str) -> bool {
        self.path(repo).map_or(false, |path| path.exists())
    }

    fn ensure_cloned(&self, repo: &str) -> Result<()> {
        self.path(repo)?;
        std::fs::create_dir_all(&self.repos_dir)?;

        if self.is_cloned(repo) {
            self.fetch_mirror(repo)
        } else {
            self.clone_mirror(repo)
        }
    }

    fn run_script(&self, repo: &str) -> Result<String> {
        let path = self.path(repo)?;

        info!("{} in {}", self.settings.script, path.display());

        let output = Command::new("sh")
            .arg("-c")
            .arg(&self.settings.script)
            .current_dir(&path)
            .output()
            .with_context(|| format!("Cannot run {}", self.settings.script))?;

        if !output.stderr.is_empty() {
            debug!("{}", String::from_utf8_lossy(&output.stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use git2::{Repository, RepositoryInitOptions};
    use std::path::Path;
    use tempfile::TempDir;

    use super::{GitMirror, GitSettings, RepoSync};

    // https://github.com/rust-lang/git2-rs/blob/master/src/test.rs
    fn repo_init(path: &Path) -> Repository {
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("main");
        let repo = Repository::init_opts(path, &opts).unwrap();
        {
            let mut config = repo.config().unwrap();
            config.set_str("user.name", "name").unwrap();
            config.set_str("user.email", "email").unwrap();
            let mut index = repo.index().unwrap();
            let id = index.write_tree().unwrap();

            let tree = repo.find_tree(id).unwrap();
            let sig = repo.signature().unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, "initial\n\nbody", &tree, &[])
                .unwrap();
        }
        repo
    }

    fn settings(remotes: &TempDir, repos: &TempDir, script: &str) -> GitSettings {
        GitSettings {
            uri: remotes.path().to_str().unwrap().to_owned(),
            script: script.to_owned(),
            repos_dir: Some(repos.path().join("repos")),
        }
    }

    #[test]
    fn clone_then_fetch_test() {
        let remotes = TempDir::new().unwrap();
        let repos = TempDir::new().unwrap();
        repo_init(&remotes.path().join("build-tools.git"));

        let settings = settings(&remotes, &repos, "cat .git/HEAD");
        let mirror = GitMirror::new(&settings).unwrap();

        assert!(!mirror.is_cloned("build-tools"));

        mirror.ensure_cloned("build-tools").unwrap();
        assert!(mirror.is_cloned("build-tools"));
        assert!(repos.path().join("repos/build-tools/.git").exists());

        mirror.ensure_cloned("build-tools").unwrap();

        assert_eq!(mirror.run_script("build-tools").unwrap(), "ref: refs/heads/main\n");
    }

    #[test]
    fn clone_of_unknown_repo_fails_test() {
        let remotes = TempDir::new().unwrap();
        let repos = TempDir::new().unwrap();

        let settings = settings(&remotes, &repos, "true");
        let mirror = GitMirror::new(&settings).unwrap();

        assert!(mirror.ensure_cloned("missing").is_err());
    }

    #[test]
    fn script_output_is_kept_on_failure_test() {
        let remotes = TempDir::new().unwrap();
        let repos = TempDir::new().unwrap();
        repo_init(&remotes.path().join("project.git"));

        let settings = settings(&remotes, &repos, "echo partial; exit 3");
        let mirror = GitMirror::new(&settings).unwrap();
        mirror.ensure_cloned("project").unwrap();

        assert_eq!(mirror.run_script("project").unwrap(), "partial\n");
    }

    #[test]
    fn repo_name_stays_inside_repos_dir_test() {
        let remotes = TempDir::new().unwrap();
        let repos = TempDir::new().unwrap();

        let settings = settings(&remotes, &repos, "pwd");
        let mirror = GitMirror::new(&settings).unwrap();
        let outside = repos.path().to_str().unwrap().to_owned();

        for repo in ["/etc", outside.as_str(), "../x", "..", "a/b", "."] {
            assert!(!mirror.is_cloned(repo), "{repo}");
            assert!(mirror.ensure_cloned(repo).is_err(), "{repo}");
            assert!(mirror.run_script(repo).is_err(), "{repo}");
        }

        assert!(!repos.path().join("repos").exists());
    }
}
