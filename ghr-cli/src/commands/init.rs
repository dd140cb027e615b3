//! Init command handler
//!
//! Creates the configuration file interactively. Settings can be seeded from
//! an existing `.env` file (`GH_ORG`, `RUNNER_LABELS`, `RUNNER_GROUP`), whose
//! variables are then copied to `~/.ghr/.env`.

use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::*;

use crate::config::{self, Config};
use crate::dotenv;

/// Handle `ghr init`
///
/// # Arguments
/// * `config_path` - Where to write the config (default: ~/.ghr/config.yaml)
/// * `import_env` - Import from a found `.env` file without asking
pub fn handle_init(config_path: Option<&Path>, import_env: bool) -> Result<()> {
    let out_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config::default_config_path);

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    let session = InitSession {
        out_path,
        env_file: dotenv::find_env_file(),
        env_dest: config::dotenv_path(),
        import_env,
    };
    session.run(&mut input, &mut output)
}

struct InitSession {
    out_path: PathBuf,
    /// `.env` file found on disk, if any
    env_file: Option<PathBuf>,
    /// Where imported variables are copied to
    env_dest: PathBuf,
    import_env: bool,
}

impl InitSession {
    fn run<R: BufRead, W: Write>(&self, input: &mut R, output: &mut W) -> Result<()> {
        if self.out_path.exists() {
            let question = format!(
                "Config file {} already exists. Overwrite? [y/N] ",
                self.out_path.display()
            );
            if !ask(input, output, &question)?.eq_ignore_ascii_case("y") {
                writeln!(output, "Aborted.")?;
                return Ok(());
            }
        }

        let mut config = Config::default();
        self.import(input, output, &mut config)?;

        config.scope = prompt(input, output, "Scope", &config.scope)?;
        if config.scope == "org" {
            config.org = prompt(input, output, "Organization", &config.org)?;
        } else {
            config.repo.owner = prompt(input, output, "Repo owner", &config.repo.owner)?;
            config.repo.name = prompt(input, output, "Repo name", &config.repo.name)?;
        }
        config.token = prompt(input, output, "Token reference", &config.token)?;
        config.runners.image = prompt(input, output, "Runner image", &config.runners.image)?;

        let labels = prompt(input, output, "Labels", &config.runners.labels.join(","))?;
        config.runners.labels = split_labels(&labels);

        config.runners.group = prompt(input, output, "Runner group", &config.runners.group)?;
        config.runners.name_prefix =
            prompt(input, output, "Name prefix", &config.runners.name_prefix)?;

        if let Err(e) = config.validate() {
            writeln!(output, "{} {}", "Warning:".yellow().bold(), e)?;
        }

        config.save(&self.out_path)?;
        writeln!(
            output,
            "{}",
            format!("Config written to {}", self.out_path.display()).green()
        )?;
        Ok(())
    }

    fn import<R: BufRead, W: Write>(
        &self,
        input: &mut R,
        output: &mut W,
        config: &mut Config,
    ) -> Result<()> {
        let Some(env_file) = &self.env_file else {
            if self.import_env {
                writeln!(output, "{} no .env file found", "Warning:".yellow().bold())?;
            }
            return Ok(());
        };

        if !self.import_env {
            let question = format!("Found {}. Import settings? [Y/n] ", env_file.display());
            let answer = ask(input, output, &question)?;
            if !(answer.is_empty() || answer.eq_ignore_ascii_case("y")) {
                return Ok(());
            }
        }

        match self.import_file(output, config, env_file) {
            Ok(()) => writeln!(output, "Imported settings from {}", env_file.display())?,
            Err(e) => writeln!(
                output,
                "{} could not import {}: {:#}",
                "Warning:".yellow().bold(),
                env_file.display(),
                e
            )?,
        }
        Ok(())
    }

    fn import_file<W: Write>(&self, output: &mut W, config: &mut Config, path: &Path) -> Result<()> {
        let vars = dotenv::read_env_file(path)?;
        apply_env_vars(config, &vars);

        if !same_file(path, &self.env_dest) {
            dotenv::save_env_file(&self.env_dest, &vars)
                .with_context(|| format!("copying env vars to {}", self.env_dest.display()))?;
            writeln!(
                output,
                "Environment variables copied to {}",
                self.env_dest.display()
            )?;
        }
        Ok(())
    }
}

/// Seeds the configuration from `.env` variables
fn apply_env_vars(config: &mut Config, vars: &BTreeMap<String, String>) {
    if let Some(org) = vars.get("GH_ORG") {
        config.scope = "org".to_string();
        config.org = org.clone();
    }
    if let Some(labels) = vars.get("RUNNER_LABELS") {
        config.runners.labels = split_labels(labels);
    }
    if let Some(group) = vars.get("RUNNER_GROUP") {
        config.runners.group = group.clone();
    }
    // The token stays in the environment
    config.token = "env:GH_TOKEN".to_string();
}

fn split_labels(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect()
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Asks a question and returns the trimmed answer
fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> Result<String> {
    write!(output, "{}", question)?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line).context("Failed to read answer")?;
    Ok(line.trim().to_string())
}

/// Prompts for a value, keeping `default` on an empty answer
fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
    default: &str,
) -> Result<String> {
    let answer = ask(input, output, &format!("{} [{}]: ", label, default))?;
    if answer.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn session(dir: &TempDir, env_file: Option<PathBuf>, import_env: bool) -> InitSession {
        InitSession {
            out_path: dir.path().join("config.yaml"),
            env_file,
            env_dest: dir.path().join("home").join(".env"),
            import_env,
        }
    }

    #[test]
    fn test_prompt_keeps_default() {
        let mut input = Cursor::new("\n  custom  \n");
        let mut output = Vec::new();

        assert_eq!(prompt(&mut input, &mut output, "Scope", "org").unwrap(), "org");
        assert_eq!(prompt(&mut input, &mut output, "Scope", "org").unwrap(), "custom");
        assert!(String::from_utf8(output).unwrap().starts_with("Scope [org]: "));
    }

    #[test]
    fn test_init_writes_config() {
        let dir = TempDir::new().unwrap();
        let session = session(&dir, None, false);
        // scope, org, token, image, labels, group, prefix
        let mut input = Cursor::new("\nacme\n\n\ngpu, linux\n\nci\n");
        let mut output = Vec::new();

        session.run(&mut input, &mut output).unwrap();

        let config = Config::load(&session.out_path).unwrap();
        assert_eq!(config.org, "acme");
        assert_eq!(config.token, "env:GH_TOKEN");
        assert_eq!(config.runners.labels, vec!["gpu", "linux"]);
        assert_eq!(config.runners.name_prefix, "ci");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_init_repo_scope() {
        let dir = TempDir::new().unwrap();
        let session = session(&dir, None, false);
        let mut input = Cursor::new("repo\nocto\napp\n\n\n\n\n\n");
        let mut output = Vec::new();

        session.run(&mut input, &mut output).unwrap();

        let config = Config::load(&session.out_path).unwrap();
        assert_eq!(config.scope, "repo");
        assert_eq!(config.repo.owner, "octo");
        assert_eq!(config.repo.name, "app");
    }

    #[test]
    fn test_init_keeps_existing_config_unless_confirmed() {
        let dir = TempDir::new().unwrap();
        let session = session(&dir, None, false);
        std::fs::write(&session.out_path, "org: keep\n").unwrap();

        let mut input = Cursor::new("n\n");
        let mut output = Vec::new();
        session.run(&mut input, &mut output).unwrap();

        assert_eq!(std::fs::read_to_string(&session.out_path).unwrap(), "org: keep\n");
        assert!(String::from_utf8(output).unwrap().contains("Aborted."));
    }

    #[test]
    fn test_init_imports_env_file() {
        let dir = TempDir::new().unwrap();
        let env_file = dir.path().join(".env");
        std::fs::write(
            &env_file,
            "GH_ORG=acme\nRUNNER_LABELS=gpu,linux\nRUNNER_GROUP=Builders\nGH_TOKEN=ghp_abc\n",
        )
        .unwrap();
        let session = session(&dir, Some(env_file), true);
        let mut input = Cursor::new("\n\n\n\n\n\n\n");
        let mut output = Vec::new();

        session.run(&mut input, &mut output).unwrap();

        let config = Config::load(&session.out_path).unwrap();
        assert_eq!(config.org, "acme");
        assert_eq!(config.runners.labels, vec!["gpu", "linux"]);
        assert_eq!(config.runners.group, "Builders");

        let copied = dotenv::read_env_file(&session.env_dest).unwrap();
        assert_eq!(copied["GH_TOKEN"], "ghp_abc");
    }

    #[test]
    fn test_declined_import_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let env_file = dir.path().join(".env");
        std::fs::write(&env_file, "GH_ORG=acme\n").unwrap();
        let session = session(&dir, Some(env_file), false);
        // decline import, then scope, org, token, image, labels, group, prefix
        let mut input = Cursor::new("n\n\nother\n\n\n\n\n\n");
        let mut output = Vec::new();

        session.run(&mut input, &mut output).unwrap();

        let config = Config::load(&session.out_path).unwrap();
        assert_eq!(config.org, "other");
        assert!(!session.env_dest.exists());
    }
}
