//! High-level conversion entry points
//!
//! Thin wrappers over [`Root`]: text in, text (or files) out. Anything more
//! surgical goes through the model types directly.

use std::path::Path;

use crate::error::Result;
use crate::models::device::DeviceConfig;
use crate::models::root::{DeviceConfigFile, Root};
use crate::models::settings::SettingsLocation;

/// Convert one device record (JSON text) into a document, with the default
/// placements: shared settings at the root, pitch range on the instrument.
pub fn import(
    device_json: &str,
    product: &str,
    group: &str,
    instrument: &str,
) -> Result<Root> {
    import_with_placements(
        device_json,
        product,
        group,
        instrument,
        Some(SettingsLocation::Root),
        SettingsLocation::Instrument,
    )
}

/// Convert one device record (JSON text) into a document, choosing where the
/// decoded settings and pitch range are stored
pub fn import_with_placements(
    device_json: &str,
    product: &str,
    group: &str,
    instrument: &str,
    store_settings_in: Option<SettingsLocation>,
    store_pitch_range_in: SettingsLocation,
) -> Result<Root> {
    let config = DeviceConfig::from_json_str(device_json)?;
    log::debug!("importing device record as {product}/{group}/{instrument}");
    Root::from_device(
        &config,
        product,
        group,
        instrument,
        store_settings_in,
        store_pitch_range_in,
    )
}

/// Import a device record and merge it into an existing document, the
/// imported material winning on conflicts
pub fn import_merge(
    existing: &Root,
    device_json: &str,
    product: &str,
    group: &str,
    instrument: &str,
) -> Result<Root> {
    let imported = import(device_json, product, group, instrument)?;
    Root::combine(existing, &imported)
}

/// Flatten a document (YAML text) into its device records
pub fn export(document_yaml: &str) -> Result<Vec<DeviceConfigFile>> {
    let root = Root::from_yaml_str(document_yaml)?;
    root.to_device_configs()
}

/// Flatten a document (YAML text) and write each record under `out_dir`
pub fn export_to_dir(document_yaml: &str, out_dir: &Path) -> Result<()> {
    let root = Root::from_yaml_str(document_yaml)?;
    let configs = root.to_device_configs()?;
    log::info!(
        "exporting {} device config(s) to {}",
        configs.len(),
        out_dir.display()
    );
    root.write_device_configs(out_dir)
}
