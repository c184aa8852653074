use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Get the daybook directory - checks for a local .daybook first, then falls
/// back to the global ~/.daybook
pub fn get_daybook_dir() -> Result<PathBuf> {
    let current_dir = env::current_dir().context("Could not determine current directory")?;
    if let Some(local_dir) = find_local_daybook(&current_dir) {
        return Ok(local_dir);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".daybook"))
}

/// Find a local .daybook directory by walking up the directory tree
fn find_local_daybook(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir;

    loop {
        let daybook_dir = current.join(".daybook");
        if daybook_dir.exists() && daybook_dir.is_dir() {
            return Some(daybook_dir);
        }
        current = current.parent()?;
    }
}

/// Ensure the daybook directory exists
pub fn ensure_daybook_dir() -> Result<PathBuf> {
    let dir = get_daybook_dir()?;
    if !dir.exists() {
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    }
    Ok(dir)
}

/// Initialize a local .daybook directory in the current directory
pub fn init_local_daybook() -> Result<PathBuf> {
    let current_dir = env::current_dir().context("Could not determine current directory")?;
    let daybook_dir = current_dir.join(".daybook");

    if daybook_dir.exists() {
        anyhow::bail!("Daybook directory already exists: {}", daybook_dir.display());
    }

    fs::create_dir_all(&daybook_dir)
        .with_context(|| format!("Failed to create directory: {}", daybook_dir.display()))?;

    Ok(daybook_dir)
}

/// Path to the snapshot file holding every day and task
pub fn data_file() -> Result<PathBuf> {
    Ok(ensure_daybook_dir()?.join("days.json"))
}

/// Path to the user settings file
pub fn settings_file() -> Result<PathBuf> {
    Ok(ensure_daybook_dir()?.join("settings.json"))
}

/// Default export path for a given date (export-YYYY-MM-DD.csv)
pub fn export_file(date: chrono::NaiveDate) -> Result<PathBuf> {
    let filename = format!("export-{}.csv", date.format("%Y-%m-%d"));
    Ok(ensure_daybook_dir()?.join(filename))
}

/// Atomically write content to a file using temp file + rename
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
    let path = path.as_ref();
    let dir = path
        .parent()
        .context("File path has no parent directory")?;

    let mut temp_file =
        NamedTempFile::new_in(dir).context("Failed to create temporary file")?;

    temp_file
        .write_all(content.as_bytes())
        .context("Failed to write to temporary file")?;

    temp_file
        .as_file()
        .sync_all()
        .context("Failed to sync temporary file")?;

    temp_file
        .persist(path)
        .with_context(|| format!("Failed to persist file: {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_daybook_dir() {
        let dir = get_daybook_dir().unwrap();
        assert!(dir.to_string_lossy().contains(".daybook"));
    }

    #[test]
    fn test_atomic_write_and_read() {
        let temp_dir = tempfile::tempdir().unwrap();
        let test_file = temp_dir.path().join("test.txt");

        let content = "Hello, world!";
        atomic_write(&test_file, content).unwrap();

        assert_eq!(fs::read_to_string(&test_file).unwrap(), content);
    }

    #[test]
    fn test_atomic_write_replaces_existing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let test_file = temp_dir.path().join("test.txt");

        atomic_write(&test_file, "first").unwrap();
        atomic_write(&test_file, "second").unwrap();

        assert_eq!(fs::read_to_string(&test_file).unwrap(), "second");
    }
}
