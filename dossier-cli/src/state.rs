use anyhow::{Context, Result, bail};
use dossier_core::{DocCategory, ProfileState};
use std::fs;
use std::path::PathBuf;

pub fn dossier_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".dossier"))
}

pub fn ensure_dossier_home() -> Result<PathBuf> {
    let dir = dossier_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn profile_path() -> Result<PathBuf> {
    Ok(ensure_dossier_home()?.join("profile.json"))
}

pub fn write_profile(state: &ProfileState) -> Result<()> {
    let p = profile_path()?;
    let json = serde_json::to_string_pretty(state)?;
    fs::write(&p, json).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn read_profile() -> Result<ProfileState> {
    let p = profile_path()?;
    if !p.exists() {
        return Ok(ProfileState::new());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(serde_json::from_str(&s)?)
}

/// Marks one category's extraction as in flight. Concurrent re-submission
/// for the same category is refused while the lock exists; independent
/// categories do not contend. Released when the guard drops, so a call
/// always runs to completion once admitted.
pub struct ExtractionLock {
    path: PathBuf,
}

pub fn acquire_extraction_lock(category: DocCategory) -> Result<ExtractionLock> {
    let dir = ensure_dossier_home()?.join("locks");
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    let path = dir.join(format!("{}.lock", category.slug()));
    match fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
    {
        Ok(_) => Ok(ExtractionLock { path }),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            bail!(
                "một lần trích xuất '{}' khác đang chạy; chờ xong rồi thử lại (hoặc xóa {})",
                category.slug(),
                path.display()
            )
        }
        Err(e) => Err(e).with_context(|| format!("create {}", path.display())),
    }
}

impl Drop for ExtractionLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}
