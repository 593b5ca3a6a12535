//! Prompt Loader
//!
//! Loads prompt templates from files or falls back to embedded defaults.

use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use tracing::{debug, info};

use super::embedded;

/// Loads prompt templates
pub struct PromptLoader {
    /// User override directory (config `prompts.dir` or `.collablab/prompts/`)
    user_dir: Option<PathBuf>,
    /// Repo default directory (`prompts/`)
    repo_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a new prompt loader rooted at `base`
    ///
    /// # Arguments
    /// * `base` - Directory used to find `.collablab/prompts/` and `prompts/`
    /// * `override_dir` - Replaces `.collablab/prompts/` when set
    pub fn new(base: impl AsRef<Path>, override_dir: Option<&Path>) -> Self {
        let base = base.as_ref();
        debug!(?base, ?override_dir, "PromptLoader::new: called");
        let user_dir = override_dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| base.join(".collablab/prompts"));
        let repo_dir = base.join("prompts");

        let user_dir_exists = user_dir.is_dir();
        let repo_dir_exists = repo_dir.is_dir();
        debug!(
            ?user_dir,
            %user_dir_exists,
            ?repo_dir,
            %repo_dir_exists,
            "PromptLoader::new: checking directories"
        );

        Self {
            user_dir: if user_dir_exists { Some(user_dir) } else { None },
            repo_dir: if repo_dir_exists { Some(repo_dir) } else { None },
        }
    }

    /// Create a loader that only uses embedded prompts (for testing)
    pub fn embedded_only() -> Self {
        debug!("PromptLoader::embedded_only: called");
        Self {
            user_dir: None,
            repo_dir: None,
        }
    }

    /// Load a template by name
    ///
    /// Checks in order:
    /// 1. User override: `{user_dir}/{name}.pmt`
    /// 2. Repo default: `prompts/{name}.pmt`
    /// 3. Embedded fallback
    pub fn load(&self, name: &str) -> Result<String> {
        debug!(%name, "PromptLoader::load: called");
        for (label, dir) in [("user override", &self.user_dir), ("repo", &self.repo_dir)] {
            let Some(dir) = dir else {
                continue;
            };
            let path = dir.join(format!("{}.pmt", name));
            if path.exists() {
                info!("Loading {} prompt '{}' from {}", label, name, path.display());
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read {} prompt {}: {}", label, path.display(), e));
            }
            debug!(?path, %label, "PromptLoader::load: not found");
        }

        debug!("PromptLoader::load: trying embedded fallback");
        embedded::get_embedded(name)
            .map(str::to_string)
            .ok_or_else(|| eyre!("Prompt template not found: {}", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_embedded_only_loads_all_stage_prompts() {
        let loader = PromptLoader::embedded_only();
        for name in [super::super::INITIATE, super::super::ORCHESTRATE, super::super::SYNTHESIZE] {
            assert!(loader.load(name).is_ok(), "missing embedded prompt {}", name);
        }
    }

    #[test]
    fn test_unknown_template() {
        let loader = PromptLoader::embedded_only();
        let err = loader.load("nonexistent-template").unwrap_err();
        assert!(err.to_string().contains("nonexistent-template"));
    }

    #[test]
    fn test_repo_dir_overrides_embedded() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("prompts")).unwrap();
        std::fs::write(temp.path().join("prompts/initiate.pmt"), "repo {{{initialIdea}}}").unwrap();

        let loader = PromptLoader::new(temp.path(), None);
        assert_eq!(loader.load("initiate").unwrap(), "repo {{{initialIdea}}}");
        // Others still fall back to embedded
        assert!(loader.load("synthesize").unwrap().contains("{{#each ideas}}"));
    }

    #[test]
    fn test_user_dir_wins_over_repo() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("prompts")).unwrap();
        std::fs::create_dir_all(temp.path().join(".collablab/prompts")).unwrap();
        std::fs::write(temp.path().join("prompts/orchestrate.pmt"), "repo").unwrap();
        std::fs::write(temp.path().join(".collablab/prompts/orchestrate.pmt"), "user").unwrap();

        let loader = PromptLoader::new(temp.path(), None);
        assert_eq!(loader.load("orchestrate").unwrap(), "user");
    }

    #[test]
    fn test_explicit_override_dir() {
        let base = TempDir::new().unwrap();
        let custom = TempDir::new().unwrap();
        std::fs::write(custom.path().join("synthesize.pmt"), "custom").unwrap();

        let loader = PromptLoader::new(base.path(), Some(custom.path()));
        assert_eq!(loader.load("synthesize").unwrap(), "custom");
    }
}
