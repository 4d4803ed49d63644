//! Local filesystem mirror of the LIVE prompt set.
//!
//! One `<name>.promptl` file per LIVE document, flat in a single directory.
//! Path separators in prompt names are replaced with `_`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::domain::error::mirror_err;
use crate::domain::{DesiredPrompt, Result, SyncError};

/// Directory used when the caller names none, relative to the working dir.
pub const DEFAULT_MIRROR_DIR: &str = "prompts";

/// Extension of every mirror file (without the dot).
pub const MIRROR_EXTENSION: &str = "promptl";

/// Deterministic mirror filename for a prompt path.
pub fn file_name_for(path: &str) -> String {
    format!("{}.{}", path.replace(['/', '\\'], "_"), MIRROR_EXTENSION)
}

/// Fail if two prompt paths would land on the same mirror file.
pub fn check_collisions<'a, I>(paths: I) -> Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut owners: HashMap<String, &str> = HashMap::new();
    for path in paths {
        let file = file_name_for(path);
        if let Some(first) = owners.get(&file) {
            return Err(SyncError::MirrorCollision {
                file,
                first: first.to_string(),
                second: path.to_string(),
            });
        }
        owners.insert(file, path);
    }
    Ok(())
}

/// Map prompts loaded from mirror files back to the LIVE paths they were
/// pulled from.
///
/// A stem such as `team_reply` becomes `team/reply` when that is the LIVE
/// path whose mirror file it is. Stems with no LIVE counterpart keep their
/// name. A stem shared by several LIVE paths cannot be mapped and is an
/// error. The result is sorted by name.
pub fn restore_names<'a, I>(prompts: Vec<DesiredPrompt>, live_paths: I) -> Result<Vec<DesiredPrompt>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut owners: HashMap<String, Vec<&str>> = HashMap::new();
    for path in live_paths {
        owners.entry(file_name_for(path)).or_default().push(path);
    }

    let mut restored = Vec::with_capacity(prompts.len());
    for prompt in prompts {
        let file = file_name_for(&prompt.name);
        let name = match owners.get(&file).map(Vec::as_slice) {
            Some([only]) => only.to_string(),
            Some([first, second, ..]) => {
                return Err(SyncError::MirrorCollision {
                    file,
                    first: first.to_string(),
                    second: second.to_string(),
                })
            }
            _ => prompt.name,
        };
        restored.push(DesiredPrompt::new(name, prompt.content));
    }
    restored.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(restored)
}

fn is_mirror_file(path: &Path) -> bool {
    path.extension().map(|e| e == MIRROR_EXTENSION).unwrap_or(false)
}

/// A mirror directory.
#[derive(Debug, Clone)]
pub struct LocalMirror {
    dir: PathBuf,
}

impl LocalMirror {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Resolve `output_dir` against the working directory, defaulting to
    /// `./prompts`.
    pub fn resolve(output_dir: Option<&Path>) -> Result<Self> {
        let requested = output_dir.unwrap_or_else(|| Path::new(DEFAULT_MIRROR_DIR));
        if requested.is_absolute() {
            return Ok(Self::new(requested));
        }
        let cwd = std::env::current_dir().map_err(|e| mirror_err(requested, e))?;
        Ok(Self::new(cwd.join(requested)))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the directory (and parents) when missing.
    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| mirror_err(&self.dir, e))
    }

    /// Mirror files currently present, sorted by filename.
    pub async fn existing_files(&self) -> Result<Vec<PathBuf>> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| mirror_err(&self.dir, e))?;
        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| mirror_err(&self.dir, e))?
        {
            let path = entry.path();
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| mirror_err(&path, e))?;
            if file_type.is_file() && is_mirror_file(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Delete every mirror file in the directory. Other files are left alone.
    ///
    /// Returns the number of files removed.
    pub async fn clear(&self) -> Result<usize> {
        let files = self.existing_files().await?;
        for file in &files {
            tokio::fs::remove_file(file)
                .await
                .map_err(|e| mirror_err(file, e))?;
        }
        Ok(files.len())
    }

    /// Write `content` as the mirror file for `path`, replacing any previous
    /// file. Returns the filename written.
    pub async fn write(&self, path: &str, content: &str) -> Result<String> {
        let file_name = file_name_for(path);
        let target = self.dir.join(&file_name);
        tokio::fs::write(&target, content)
            .await
            .map_err(|e| mirror_err(&target, e))?;
        tracing::debug!("wrote: {}", target.display());
        Ok(file_name)
    }

    /// Read every mirror file back as a desired prompt (file stem = name),
    /// sorted by name.
    pub async fn load_prompts(&self) -> Result<Vec<DesiredPrompt>> {
        let mut prompts = Vec::new();
        for file in self.existing_files().await? {
            let Some(name) = file.file_stem().and_then(|s| s.to_str()) else {
                tracing::warn!("skipping non-utf8 file name: {}", file.display());
                continue;
            };
            let content = tokio::fs::read_to_string(&file)
                .await
                .map_err(|e| mirror_err(&file, e))?;
            prompts.push(DesiredPrompt::new(name, content));
        }
        prompts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(prompts)
    }
}
