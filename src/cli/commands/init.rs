//! `vigil init` - write a default configuration and a sample region file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use crate::domain::models::Config;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Directory to initialize (defaults to the current directory)
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,

    /// Overwrite existing configuration files
    #[arg(long)]
    pub force: bool,
}

const SAMPLE_REGIONS: &str = r#"{
  "main window": {
    "regions": [
      { "x": 100, "y": 100, "width": 800, "height": 600 }
    ]
  }
}
"#;

fn write_if_absent(path: &Path, content: &str, force: bool) -> Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(true)
}

pub fn execute(args: &InitArgs, json: bool) -> Result<()> {
    if !args.dir.is_dir() {
        bail!("{} is not a directory", args.dir.display());
    }

    let config_path = args.dir.join(".vigil/config.json");
    let regions_path = args.dir.join(".vigil/regions.json");

    let config_json = serde_json::to_string_pretty(&Config::default())
        .context("Failed to serialize default configuration")?;

    let wrote_config = write_if_absent(&config_path, &format!("{config_json}\n"), args.force)?;
    let wrote_regions = write_if_absent(&regions_path, SAMPLE_REGIONS, args.force)?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "config": config_path,
                "config_written": wrote_config,
                "regions": regions_path,
                "regions_written": wrote_regions,
            })
        );
    } else {
        for (path, written) in [(&config_path, wrote_config), (&regions_path, wrote_regions)] {
            if written {
                println!("wrote {}", path.display());
            } else {
                println!("kept existing {} (use --force to overwrite)", path.display());
            }
        }
        println!("Edit the region file to match your monitored window, then run `vigil run`.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_both_files() {
        let dir = TempDir::new().unwrap();
        let args = InitArgs {
            dir: dir.path().to_path_buf(),
            force: false,
        };
        execute(&args, false).unwrap();

        assert!(dir.path().join(".vigil/config.json").exists());
        assert!(dir.path().join(".vigil/regions.json").exists());

        // The written config parses back into a valid Config.
        let raw = fs::read_to_string(dir.path().join(".vigil/config.json")).unwrap();
        let config: Config = serde_json::from_str(&raw).unwrap();
        assert_eq!(config.timing.poll_interval_secs, 20);
    }

    #[test]
    fn test_init_keeps_existing_without_force() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join(".vigil/config.json");
        fs::create_dir_all(config_path.parent().unwrap()).unwrap();
        fs::write(&config_path, "{\"custom\": true}").unwrap();

        let args = InitArgs {
            dir: dir.path().to_path_buf(),
            force: false,
        };
        execute(&args, false).unwrap();

        let raw = fs::read_to_string(&config_path).unwrap();
        assert!(raw.contains("custom"));
    }

    #[test]
    fn test_init_force_overwrites() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join(".vigil/config.json");
        fs::create_dir_all(config_path.parent().unwrap()).unwrap();
        fs::write(&config_path, "{\"custom\": true}").unwrap();

        let args = InitArgs {
            dir: dir.path().to_path_buf(),
            force: true,
        };
        execute(&args, false).unwrap();

        let raw = fs::read_to_string(&config_path).unwrap();
        assert!(!raw.contains("custom"));
    }
}
