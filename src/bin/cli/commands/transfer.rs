use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::json;

use crate::app::App;
use crate::OutputFormat;

pub fn run_export(app: &App, path: Option<PathBuf>, format: &OutputFormat) -> Result<()> {
    let bundle = app.core.progression.export();
    let path = path.unwrap_or_else(|| PathBuf::from(bundle.file_name()));

    let content = serde_json::to_string_pretty(&bundle)?;
    fs::write(&path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Exported progress to {:?}", path);

    match format {
        OutputFormat::Json => {
            let output = json!({
                "path": path,
                "exportedAt": bundle.exported_at,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("Exported progress to {}", path.display());
        }
    }

    Ok(())
}

pub fn run_import(app: &mut App, path: &Path, format: &OutputFormat) -> Result<()> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let summary = app.core.progression.import_json(&raw)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Plain => {
            println!(
                "Imported {} XP and {} completed lesson(s)",
                summary.xp, summary.completed_lessons
            );
            if !summary.persisted {
                eprintln!("warning: imported progress could not be saved");
            }
        }
    }

    Ok(())
}
