//! `.env` file handling
//!
//! Variables from `~/.ghr/.env` and `./.env` are loaded into the process
//! environment at startup. Variables that are already set win.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::config;

/// Candidate `.env` files in lookup order
pub fn env_file_candidates() -> Vec<PathBuf> {
    vec![config::dotenv_path(), PathBuf::from(".env")]
}

/// Loads every candidate file that exists
pub fn load_env_files() {
    for path in env_file_candidates() {
        match dotenvy::from_path(&path) {
            Ok(()) => debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => warn!("Failed to load {}: {}", path.display(), e),
        }
    }
}

/// First candidate `.env` file that exists
pub fn find_env_file() -> Option<PathBuf> {
    env_file_candidates().into_iter().find(|path| path.is_file())
}

/// Parses a `.env` file without touching the process environment
pub fn read_env_file(path: &Path) -> Result<BTreeMap<String, String>> {
    let iter = dotenvy::from_path_iter(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    iter.map(|item| item.with_context(|| format!("Failed to parse {}", path.display())))
        .collect()
}

/// Writes variables into a `.env` file, merging with what is already there
///
/// Comments and unrelated keys are kept, existing keys are overwritten in
/// place and new keys are appended. The file is only readable by its owner.
pub fn save_env_file(path: &Path, vars: &BTreeMap<String, String>) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let existing = std::fs::read_to_string(path).unwrap_or_default();
    let content = merge_env_content(&existing, vars);

    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("Failed to restrict permissions of {}", path.display()))?;
    }

    Ok(())
}

fn merge_env_content(existing: &str, vars: &BTreeMap<String, String>) -> String {
    let mut written = Vec::new();
    let mut lines = Vec::new();

    for line in existing.lines() {
        let trimmed = line.trim();
        let key = (!trimmed.is_empty() && !trimmed.starts_with('#'))
            .then(|| trimmed.split_once('='))
            .flatten()
            .map(|(key, _)| key.trim());

        match key.and_then(|key| vars.get_key_value(key)) {
            Some((key, value)) => {
                lines.push(env_line(key, value));
                written.push(key.as_str());
            }
            None => lines.push(line.to_string()),
        }
    }

    for (key, value) in vars {
        if !written.contains(&key.as_str()) {
            lines.push(env_line(key, value));
        }
    }

    let mut content = lines.join("\n");
    content.push('\n');
    content
}

fn env_line(key: &str, value: &str) -> String {
    format!("{}={}", key, quote_env_value(value))
}

/// Quotes a value so dotenv parsing gives it back unchanged
///
/// Bare words are written as is. Anything else goes in single quotes, which
/// disable escapes and `$` substitution, or in escaped double quotes when the
/// value holds a single quote or a newline.
fn quote_env_value(value: &str) -> String {
    let bare = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-.,/:@+=%".contains(c));
    if bare {
        return value.to_string();
    }

    if !value.contains(['\'', '\n']) {
        return format!("'{}'", value);
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '\\' | '"' | '$' => {
                quoted.push('\\');
                quoted.push(c);
            }
            '\n' => quoted.push_str("\\n"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_env_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(
            &path,
            "# runner settings\nGH_ORG=acme\nRUNNER_LABELS=\"gpu,linux\"\n\nGH_TOKEN=ghp_abc\n",
        )
        .unwrap();

        let vars = read_env_file(&path).unwrap();

        assert_eq!(vars.len(), 3);
        assert_eq!(vars["GH_ORG"], "acme");
        assert_eq!(vars["RUNNER_LABELS"], "gpu,linux");
    }

    #[test]
    fn test_read_missing_env_file() {
        let dir = TempDir::new().unwrap();
        assert!(read_env_file(&dir.path().join(".env")).is_err());
    }

    #[test]
    fn test_merge_keeps_comments_and_unrelated_keys() {
        let existing = "# secrets\nGH_TOKEN=old\nOTHER=keep\n";
        let vars = BTreeMap::from([
            ("GH_TOKEN".to_string(), "new".to_string()),
            ("GH_ORG".to_string(), "acme".to_string()),
        ]);

        let merged = merge_env_content(existing, &vars);

        assert_eq!(merged, "# secrets\nGH_TOKEN=new\nOTHER=keep\nGH_ORG=acme\n");
    }

    #[test]
    fn test_quote_env_value() {
        assert_eq!(quote_env_value("ghp_abc"), "ghp_abc");
        assert_eq!(quote_env_value("gpu,linux"), "gpu,linux");
        assert_eq!(quote_env_value("My Group"), "'My Group'");
        assert_eq!(quote_env_value(""), "''");
        assert_eq!(quote_env_value("it's"), "\"it's\"");
    }

    #[test]
    fn test_saved_values_read_back_unchanged() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source.env");
        std::fs::write(
            &source,
            "GH_TOKEN=ghp_abc\nRUNNER_GROUP=\"My Group\"\nNOTE='a # b'\n",
        )
        .unwrap();
        let dest = dir.path().join("dest.env");

        let mut vars = read_env_file(&source).unwrap();
        assert_eq!(vars["RUNNER_GROUP"], "My Group");
        vars.insert("QUOTES".to_string(), "say \"hi\" it's $HOME \\o/".to_string());
        vars.insert("EMPTY".to_string(), String::new());

        save_env_file(&dest, &vars).unwrap();

        assert_eq!(read_env_file(&dest).unwrap(), vars);
    }

    #[test]
    fn test_save_env_file_creates_private_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ghr").join(".env");
        let vars = BTreeMap::from([("GH_TOKEN".to_string(), "ghp_abc".to_string())]);

        save_env_file(&path, &vars).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "GH_TOKEN=ghp_abc\n");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }
}
