//! Region configuration file parsing.
//!
//! The region file maps a configuration name to the monitored screen
//! region(s). Three layouts exist in the wild and all must keep loading:
//!
//! ```json
//! { "main window": { "regions": [ { "x": 0, "y": 0, "width": 800, "height": 600 } ] } }
//! { "main window": { "region": { "x": 0, "y": 0, "width": 800, "height": 600 } } }
//! { "main window": { "x": 0, "y": 0, "width": 800, "height": 600 } }
//! ```
//!
//! The file is consumed once at start-up, never re-read per tick.

use std::path::Path;

use serde_json::Value;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::Region;

fn invalid(message: impl Into<String>) -> DomainError {
    DomainError::InvalidRegion(message.into())
}

fn region_from_value(value: &Value) -> DomainResult<Region> {
    let field = |name: &str| -> DomainResult<i64> {
        value
            .get(name)
            .and_then(Value::as_i64)
            .ok_or_else(|| invalid(format!("region entry missing numeric field '{name}'")))
    };
    let width = field("width")?;
    let height = field("height")?;
    if width <= 0 || height <= 0 {
        return Err(invalid(format!(
            "region dimensions must be positive, got {width}x{height}"
        )));
    }
    Ok(Region::new(
        field("x")? as i32,
        field("y")? as i32,
        width as u32,
        height as u32,
    ))
}

/// Load the monitored regions from the configuration file.
///
/// Picks the first saved configuration entry and accepts all three
/// historical layouts. Returns at least one region on success.
pub fn load_regions(path: impl AsRef<Path>) -> DomainResult<Vec<Region>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .map_err(|err| invalid(format!("failed to read {}: {err}", path.display())))?;
    let root: Value = serde_json::from_str(&raw)
        .map_err(|err| invalid(format!("{} is not valid JSON: {err}", path.display())))?;

    let Some(object) = root.as_object() else {
        return Err(invalid(
            "region file must be a JSON object of named configurations",
        ));
    };
    let Some((name, entry)) = object.iter().next() else {
        return Err(invalid("region file contains no configurations"));
    };

    let regions = parse_entry(entry)
        .map_err(|err| invalid(format!("configuration '{name}': {err}")))?;
    if regions.is_empty() {
        return Err(invalid(format!("configuration '{name}' contains no regions")));
    }
    Ok(regions)
}

fn parse_entry(entry: &Value) -> DomainResult<Vec<Region>> {
    // Multi-region layout.
    if let Some(list) = entry.get("regions").and_then(Value::as_array) {
        return list.iter().map(region_from_value).collect();
    }
    // Single region nested under "region".
    if let Some(nested) = entry.get("region") {
        return Ok(vec![region_from_value(nested)?]);
    }
    // Legacy flat layout.
    if entry.get("x").is_some() {
        return Ok(vec![region_from_value(entry)?]);
    }
    Err(invalid(
        "expected 'regions', 'region', or flat x/y/width/height fields",
    ))
}
