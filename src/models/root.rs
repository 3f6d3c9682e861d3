//! The hierarchical configuration document
//!
//! Four levels, each a name-keyed map: root -> products -> instrument groups
//! -> instruments. Every level may carry a [`Settings`] node; settings
//! resolution walks the ancestor path outermost-first through
//! [`Settings::combine`]. Levels are plain owned data; export threads the
//! ancestor settings down explicitly instead of keeping parent links.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, Result};
use crate::models::device::{DeviceConfig, KeyswitchSettingsBlock, PianoBlock};
use crate::models::keyswitches::Keyswitches;
use crate::models::settings::{PitchRange, Settings, SettingsLocation};
use crate::utils::tree::deep_join;

/// One exported device record together with its relative output path
/// (`<product>/<group>/<instrument>.json`)
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceConfigFile {
    pub file: PathBuf,
    pub data: DeviceConfig,
}

/// Leaf level: one instrument and its keyswitch grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    #[serde(default, skip_serializing_if = "Settings::is_default")]
    pub settings: Settings,
    pub keyswitches: Keyswitches,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstrumentGroup {
    #[serde(default, skip_serializing_if = "Settings::is_default")]
    pub settings: Settings,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub instruments: BTreeMap<String, Instrument>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, skip_serializing_if = "Settings::is_default")]
    pub settings: Settings,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub instrument_groups: BTreeMap<String, InstrumentGroup>,
}

/// The document root
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Root {
    #[serde(default, skip_serializing_if = "Settings::is_default")]
    pub settings: Settings,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub products: BTreeMap<String, Product>,
}

impl Root {
    /// Parse a document from its YAML text form
    pub fn from_yaml_str(text: &str) -> Result<Root> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Load a document from a YAML file
    pub fn from_yaml_file(path: &Path) -> Result<Root> {
        Root::from_yaml_str(&fs::read_to_string(path)?)
    }

    /// Serialize to the YAML text form
    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Lift one device record into a single-instrument document.
    ///
    /// The record's settings land at `store_settings_in` (or are discarded
    /// when `None`); the pitch range is split out separately and lands at
    /// `store_pitch_range_in`, with the copied settings reset to the default
    /// range so it is stored at exactly one level.
    pub fn from_device(
        config: &DeviceConfig,
        product_name: &str,
        group_name: &str,
        instrument_name: &str,
        store_settings_in: Option<SettingsLocation>,
        store_pitch_range_in: SettingsLocation,
    ) -> Result<Root> {
        let mut settings = Settings::from_device(config)?;
        let keyswitches = Keyswitches::from_device(config, &mut settings)?;

        let pitch_range =
            std::mem::replace(&mut settings.pitch_range, PitchRange::default());

        let mut root = Root::default();
        let mut product = Product::default();
        let mut group = InstrumentGroup::default();
        let mut instrument = Instrument {
            settings: Settings::default(),
            keyswitches,
        };

        match store_settings_in {
            Some(SettingsLocation::Root) => root.settings = settings,
            Some(SettingsLocation::Product) => product.settings = settings,
            Some(SettingsLocation::InstrumentGroup) => group.settings = settings,
            Some(SettingsLocation::Instrument) => instrument.settings = settings,
            None => {}
        }

        let range_target = match store_pitch_range_in {
            SettingsLocation::Root => &mut root.settings,
            SettingsLocation::Product => &mut product.settings,
            SettingsLocation::InstrumentGroup => &mut group.settings,
            SettingsLocation::Instrument => &mut instrument.settings,
        };
        range_target.pitch_range = pitch_range;

        group.instruments.insert(instrument_name.to_string(), instrument);
        product
            .instrument_groups
            .insert(group_name.to_string(), group);
        root.products.insert(product_name.to_string(), product);
        Ok(root)
    }

    /// Merge two documents structurally, `overlay` winning on conflicts.
    /// Both inputs are left untouched.
    pub fn combine(base: &Root, overlay: &Root) -> Result<Root> {
        let base_value = serde_yaml::to_value(base)?;
        let overlay_value = serde_yaml::to_value(overlay)?;
        Ok(serde_yaml::from_value(deep_join(base_value, overlay_value))?)
    }

    /// Flatten every instrument into its device record
    pub fn to_device_configs(&self) -> Result<Vec<DeviceConfigFile>> {
        let mut out = Vec::new();
        for (product_name, product) in &self.products {
            for (group_name, group) in &product.instrument_groups {
                for (instrument_name, instrument) in &group.instruments {
                    out.push(self.make_device_config(
                        product_name,
                        product,
                        group_name,
                        group,
                        instrument_name,
                        instrument,
                    )?);
                }
            }
        }
        Ok(out)
    }

    /// Export all device records under `root_dir`, creating the
    /// `<product>/<group>` directory levels as needed
    pub fn write_device_configs(&self, root_dir: &Path) -> Result<()> {
        for config in self.to_device_configs()? {
            let file = root_dir.join(&config.file);
            if let Some(parent) = file.parent() {
                fs::create_dir_all(parent)?;
            }
            log::info!("writing device config {}", file.display());
            fs::write(&file, config.data.to_json_string()?)?;
        }
        Ok(())
    }

    fn make_device_config(
        &self,
        product_name: &str,
        product: &Product,
        group_name: &str,
        group: &InstrumentGroup,
        instrument_name: &str,
        instrument: &Instrument,
    ) -> Result<DeviceConfigFile> {
        let settings = Settings::combine([
            &self.settings,
            &product.settings,
            &group.settings,
            &instrument.settings,
        ]);
        let middle_c = settings.middle_c;

        let data = DeviceConfig {
            ks: instrument.keyswitches.to_device(&settings)?,
            midi_controls: settings.required_midi_controls()?.to_device()?,
            custom_bank: settings.required_custom_bank()?.to_device()?,
            key_switch_settings: KeyswitchSettingsBlock {
                key_switch_amount: keyswitch_amount_option(
                    instrument_name,
                    &instrument.keyswitches,
                )?,
                send_main_key: settings.send_main_key as i64,
            },
            xy_fade: settings.xy_pad.to_device()?,
            delay_settings: settings.delay.to_device()?,
            automation_settings: settings.automation.to_device(),
            key_switch_manager: settings.router.to_device(settings.mpe_support),
            piano: PianoBlock {
                show_hide_piano: 1,
                pitch_low: settings.pitch_range.low.to_code_with(middle_c),
                pitch_high: settings.pitch_range.high.to_code_with(middle_c),
                automation_key: settings.automation.automation_key.to_code_with(middle_c),
            },
            pad: settings.control_pad.to_device(),
            comments: format_comment(
                &settings.comment_template,
                product_name,
                group_name,
                instrument_name,
            ),
            ..Default::default()
        };

        Ok(DeviceConfigFile {
            file: PathBuf::from(product_name)
                .join(group_name)
                .join(format!("{instrument_name}.json")),
            data,
        })
    }
}

/// The device's keyswitch-bank size menu: one bank of 16, or multiple banks
/// up to the 64-row limit
fn keyswitch_amount_option(instrument_name: &str, keyswitches: &Keyswitches) -> Result<i64> {
    let count = keyswitches.values.len();
    if count <= 16 {
        Ok(1)
    } else if count <= 64 {
        Ok(2)
    } else {
        Err(ConvertError::TooManyKeyswitches {
            instrument: instrument_name.to_string(),
            count,
        })
    }
}

fn format_comment(template: &str, product: &str, group: &str, instrument: &str) -> String {
    if template.is_empty() {
        return String::new();
    }
    template
        .replace("{product}", product)
        .replace("{instrument_group}", group)
        .replace("{instrument}", instrument)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::keyswitches::{CellValue, KeyswitchField, RootOctaves};
    use crate::models::settings::{CustomBank, MidiControls};

    fn small_keyswitches(rows: usize) -> Keyswitches {
        Keyswitches {
            root_octaves: RootOctaves {
                key: Some(1),
                second_key: None,
            },
            mapping: vec![KeyswitchField::Name, KeyswitchField::Key],
            values: (0..rows)
                .map(|i| {
                    vec![
                        CellValue::Str(format!("KS{i}")),
                        CellValue::Str("C".to_string()),
                    ]
                })
                .collect(),
        }
    }

    fn exportable_settings() -> Settings {
        Settings {
            midi_controls: Some(MidiControls::default()),
            custom_bank: Some(CustomBank::default()),
            ..Default::default()
        }
    }

    fn single_instrument_root(rows: usize) -> Root {
        let instrument = Instrument {
            settings: Settings::default(),
            keyswitches: small_keyswitches(rows),
        };
        let mut group = InstrumentGroup::default();
        group.instruments.insert("Violin".into(), instrument);
        let mut product = Product::default();
        product.instrument_groups.insert("Strings".into(), group);
        let mut root = Root {
            settings: exportable_settings(),
            ..Default::default()
        };
        root.products.insert("Orchestra".into(), product);
        root
    }

    #[test]
    fn test_export_produces_one_file_per_instrument() {
        let configs = single_instrument_root(2).to_device_configs().unwrap();
        assert_eq!(configs.len(), 1);
        assert_eq!(
            configs[0].file,
            PathBuf::from("Orchestra").join("Strings").join("Violin.json")
        );
        assert_eq!(configs[0].data.ks.len(), 2);
        assert_eq!(configs[0].data.version, crate::models::device::DEVICE_VERSION);
    }

    #[test]
    fn test_keyswitch_amount_tiers() {
        for (rows, expected) in [(1, 1), (16, 1), (17, 2), (32, 2), (64, 2)] {
            let root = single_instrument_root(rows);
            let configs = root.to_device_configs().unwrap();
            assert_eq!(
                configs[0].data.key_switch_settings.key_switch_amount, expected,
                "{rows} rows"
            );
        }
    }

    #[test]
    fn test_too_many_keyswitches() {
        let root = single_instrument_root(65);
        assert_eq!(
            root.to_device_configs(),
            Err(ConvertError::TooManyKeyswitches {
                instrument: "Violin".into(),
                count: 65,
            })
        );
    }

    #[test]
    fn test_comment_template_substitution() {
        let mut root = single_instrument_root(1);
        root.settings.comment_template =
            "{product} / {instrument_group} / {instrument}".into();
        let configs = root.to_device_configs().unwrap();
        assert_eq!(configs[0].data.comments, "Orchestra / Strings / Violin");
    }

    #[test]
    fn test_export_requires_sub_settings_somewhere() {
        let mut root = single_instrument_root(1);
        root.settings.midi_controls = None;
        assert_eq!(
            root.to_device_configs(),
            Err(ConvertError::UndefinedSubSettings("midi_controls"))
        );
    }

    #[test]
    fn test_export_propagates_sub_settings_projection_errors() {
        let mut root = single_instrument_root(1);
        // CC 1 is claimed by a standard control, so the custom selector
        // cannot be projected back to a menu index
        let controls = root.settings.midi_controls.as_mut().unwrap();
        controls.custom_01.midi_cc = Some(1);
        assert!(matches!(
            root.to_device_configs(),
            Err(ConvertError::EnumMappingFailure { .. })
        ));
    }

    #[test]
    fn test_ancestor_settings_reach_the_leaf() {
        let mut root = single_instrument_root(1);
        root.products
            .get_mut("Orchestra")
            .unwrap()
            .settings
            .comment_template = "from product".into();
        let configs = root.to_device_configs().unwrap();
        assert_eq!(configs[0].data.comments, "from product");
    }

    #[test]
    fn test_from_device_settings_placement() {
        let mut config = DeviceConfig::default();
        config.piano.pitch_low = 24;

        let root = Root::from_device(
            &config,
            "P",
            "G",
            "I",
            Some(SettingsLocation::Root),
            SettingsLocation::Instrument,
        )
        .unwrap();

        // The settings copy at the root has its pitch range reset
        assert_eq!(root.settings.pitch_range, PitchRange::default());
        assert!(root.settings.midi_controls.is_some());

        // The decoded range lives on the instrument alone
        let instrument = &root.products["P"].instrument_groups["G"].instruments["I"];
        assert_eq!(instrument.settings.pitch_range.low.to_string(), "C0");
    }

    #[test]
    fn test_from_device_discarding_settings_keeps_pitch_range() {
        let root = Root::from_device(
            &DeviceConfig::default(),
            "P",
            "G",
            "I",
            None,
            SettingsLocation::Root,
        )
        .unwrap();
        assert!(root.settings.midi_controls.is_none());
        // Pitch range placement is independent of the settings placement
        assert_eq!(root.settings.pitch_range, PitchRange::default());
    }

    #[test]
    fn test_combine_is_non_destructive_union() {
        let base = single_instrument_root(1);
        let mut overlay = Root::default();
        let mut product = Product::default();
        let mut group = InstrumentGroup::default();
        group.instruments.insert(
            "Cello".into(),
            Instrument {
                settings: Settings::default(),
                keyswitches: small_keyswitches(1),
            },
        );
        product.instrument_groups.insert("Strings".into(), group);
        overlay.products.insert("Orchestra".into(), product);

        let merged = Root::combine(&base, &overlay).unwrap();
        let strings = &merged.products["Orchestra"].instrument_groups["Strings"];
        assert_eq!(strings.instruments.len(), 2);
        assert!(strings.instruments.contains_key("Violin"));
        assert!(strings.instruments.contains_key("Cello"));

        // Inputs are untouched
        assert_eq!(
            base.products["Orchestra"].instrument_groups["Strings"]
                .instruments
                .len(),
            1
        );
    }

    #[test]
    fn test_yaml_roundtrip_omits_default_settings() {
        let root = single_instrument_root(1);
        let yaml = root.to_yaml_string().unwrap();
        // Group and instrument settings are default and stay out of the text
        assert!(!yaml.contains("instrument_groups:\n    Strings:\n      settings"));
        let parsed = Root::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed, root);
    }

    #[test]
    fn test_sparse_settings_only_document_parses() {
        let root = Root::from_yaml_str("settings:\n  mpe_support: true\n").unwrap();
        assert!(root.products.is_empty());
        assert!(root.settings.mpe_support);
        // Unspecified fields take their defaults
        assert!(root.settings.send_main_key);
    }
}
