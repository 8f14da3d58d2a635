use std::path::Path;

use anyhow::Result;
use gcal_remind_core::RemindConfig;
use owo_colors::OwoColorize;

pub fn run(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}\n\
            Use --force to overwrite it",
            path.display()
        );
    }

    RemindConfig::create_default_config(path)?;

    println!("{} {}", "Wrote".green(), path.display());
    Ok(())
}
