//! Litematica schematic inspection.

use std::path::Path;

use tracing::warn;

use super::error::{AnalysisError, AnalysisResult};
use super::version_table::VersionTable;
use crate::domain::entities::LitematicMeta;
use crate::infrastructure::nbt::{self, Tag};

/// Error text recorded for any unreadable schematic.
pub const LITEMATIC_ERROR: &str = "Error processing litematic file";

/// Reads the schematic at `path`.
#[must_use]
pub fn read_litematic(path: &Path, versions: &VersionTable) -> LitematicMeta {
    match std::fs::read(path) {
        Ok(data) => describe_litematic(&data, versions),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read litematic file");
            failed()
        }
    }
}

/// Describes an in-memory schematic.
#[must_use]
pub fn describe_litematic(data: &[u8], versions: &VersionTable) -> LitematicMeta {
    match inspect(data) {
        Ok((extent, data_version)) => LitematicMeta::Parsed {
            size: format!("{}x{}x{}", extent[0], extent[1], extent[2]),
            version: versions.release_name(data_version).to_string(),
        },
        Err(e) => {
            warn!(error = %e, "Error processing litematic file");
            failed()
        }
    }
}

fn failed() -> LitematicMeta {
    LitematicMeta::Failed {
        error: LITEMATIC_ERROR.to_string(),
    }
}

fn inspect(data: &[u8]) -> AnalysisResult<([i64; 3], i32)> {
    let root = nbt::parse(data)?.tag;
    if root.as_compound().is_none() {
        return Err(AnalysisError::format("schematic root is not a compound"));
    }

    let data_version = root
        .get("MinecraftDataVersion")
        .and_then(Tag::as_i32)
        .unwrap_or(0);

    let extent = match region_extent(&root)? {
        Some(extent) => extent,
        None => enclosing_size(&root)?,
    };

    Ok((extent, data_version))
}

fn read_vec3(tag: Option<&Tag>, what: &str) -> AnalysisResult<[i64; 3]> {
    let tag = tag.ok_or_else(|| AnalysisError::format(format!("missing {what}")))?;
    let mut out = [0i64; 3];
    for (slot, axis) in out.iter_mut().zip(["x", "y", "z"]) {
        *slot = tag
            .get(axis)
            .and_then(Tag::as_i32)
            .map(i64::from)
            .ok_or_else(|| AnalysisError::format(format!("{what} has no {axis}")))?;
    }
    Ok(out)
}

/// Combined extent of every region, or `None` when there are no regions.
///
/// A negative size extends the region backwards from its position.
fn region_extent(root: &Tag) -> AnalysisResult<Option<[i64; 3]>> {
    let Some(regions) = root.get("Regions").and_then(Tag::as_compound) else {
        return Ok(None);
    };
    if regions.is_empty() {
        return Ok(None);
    }

    let mut min = [i64::MAX; 3];
    let mut max = [i64::MIN; 3];

    for region in regions.values() {
        let position = read_vec3(region.get("Position"), "region position")?;
        let size = read_vec3(region.get("Size"), "region size")?;

        for axis in 0..3 {
            let (lo, hi) = if size[axis] >= 0 {
                (position[axis], position[axis] + size[axis] - 1)
            } else {
                (position[axis] + size[axis] + 1, position[axis])
            };
            min[axis] = min[axis].min(lo);
            max[axis] = max[axis].max(hi);
        }
    }

    Ok(Some([
        max[0] - min[0] + 1,
        max[1] - min[1] + 1,
        max[2] - min[2] + 1,
    ]))
}

fn enclosing_size(root: &Tag) -> AnalysisResult<[i64; 3]> {
    let size = read_vec3(
        root.get("Metadata").and_then(|m| m.get("EnclosingSize")),
        "enclosing size",
    )?;
    Ok(size.map(i64::abs))
}
