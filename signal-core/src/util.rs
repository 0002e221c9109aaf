//! Utilities.
use anyhow::Result;
use log::info;
use std::{fs, path::{Path, PathBuf}};

/// Creates the next numbered model directory `{base}/model_{n}`.
///
/// `n` is one more than the largest number among the existing `model_*`
/// directories, or 1 if there is none. `base` is created if missing.
pub fn next_model_dir(base: impl AsRef<Path>) -> Result<PathBuf> {
    let base = base.as_ref();
    fs::create_dir_all(base)?;

    let mut last = 0;
    for entry in fs::read_dir(base)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name();
        if let Some(n) = name
            .to_str()
            .and_then(|s| s.strip_prefix("model_"))
            .and_then(|s| s.parse::<usize>().ok())
        {
            last = last.max(n);
        }
    }

    let dir = base.join(format!("model_{}", last + 1));
    fs::create_dir_all(&dir)?;
    info!("Model directory {:?}", dir);
    Ok(dir)
}

/// Returns `{base}/model_{n}` if it is an existing directory.
pub fn model_dir(base: impl AsRef<Path>, n: usize) -> Option<PathBuf> {
    let dir = base.as_ref().join(format!("model_{}", n));
    dir.is_dir().then_some(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_next_model_dir() -> Result<()> {
        let tmp = TempDir::new("models")?;
        let base = tmp.path().join("models");
        assert_eq!(next_model_dir(&base)?, base.join("model_1"));
        assert_eq!(next_model_dir(&base)?, base.join("model_2"));

        fs::create_dir_all(base.join("model_7"))?;
        fs::write(base.join("model_9"), "not a directory")?;
        fs::create_dir_all(base.join("other"))?;
        assert_eq!(next_model_dir(&base)?, base.join("model_8"));

        assert!(model_dir(&base, 2).is_some());
        assert!(model_dir(&base, 9).is_none());
        Ok(())
    }
}
