//! Reading and writing tournament documents on disk.

use std::{fs, path::Path};

use anyhow::{Context, Error};
use darts_tournament::{RepairReport, TournamentClass};
use log::{info, warn};

/// Load a document and repair it.
pub fn load(path: &Path) -> Result<(TournamentClass, RepairReport), Error> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let (class, report) = TournamentClass::from_json(&json)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    if report.is_clean() {
        info!("Loaded {} from {}", class.name, path.display());
    } else {
        warn!("Repaired {} on load: {report:?}", path.display());
    }
    Ok((class, report))
}

/// Write a document, replacing any previous file in one rename.
pub fn save(path: &Path, class: &TournamentClass) -> Result<(), Error> {
    let json = class.to_json()?;
    let staging = path.with_extension("json.tmp");

    fs::write(&staging, json)
        .with_context(|| format!("Failed to write {}", staging.display()))?;
    fs::rename(&staging, path)
        .with_context(|| format!("Failed to move document into {}", path.display()))?;

    info!("Saved {} to {}", class.name, path.display());
    Ok(())
}
