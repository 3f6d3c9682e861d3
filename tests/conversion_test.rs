//! End-to-end conversion tests: document text -> device records -> document

use ksem_convert::api;
use ksem_convert::models::device::{DeviceConfig, Field};
use ksem_convert::models::keyswitches::KeyswitchField;
use ksem_convert::{ConvertError, SettingsLocation};

const DOCUMENT: &str = r##"
settings:
  colors:
    Red: "#FF0000"
  midi_controls: {}
  custom_bank: {}
products:
  Orchestra:
    instrument_groups:
      Strings:
        instruments:
          Violin:
            keyswitches:
              root_octaves:
                key: 1
              mapping: [name, key, color]
              values:
                - [Sustain, C, Red]
                - [Staccato, "D#", Red]
"##;

#[test]
fn test_export_flattens_document() {
    let configs = api::export(DOCUMENT).unwrap();
    assert_eq!(configs.len(), 1);
    assert_eq!(
        configs[0].file.to_str().unwrap(),
        "Orchestra/Strings/Violin.json"
    );

    let data = &configs[0].data;
    assert_eq!(data.ks.len(), 2);
    // C1 and D#1 under the default C3 reference
    assert_eq!(data.ks["1"].key, Field::Int(36));
    assert_eq!(data.ks["2"].key, Field::Int(39));
    assert_eq!(data.ks["1"].color, Field::Rgb(vec![255, 0, 0]));
    // Unmapped cells carry the sentinel
    assert_eq!(data.ks["1"].bnk, Field::Str("-".into()));
    assert_eq!(data.key_switch_settings.key_switch_amount, 1);
}

#[test]
fn test_device_record_roundtrip() {
    // A record produced by export comes back identical after a trip through
    // the document form (spellings may normalize, codes may not)
    let exported = api::export(DOCUMENT).unwrap();
    let json = exported[0].data.to_json_string().unwrap();

    let root = api::import(&json, "Orchestra", "Strings", "Violin").unwrap();
    let reexported = root.to_device_configs().unwrap();
    assert_eq!(reexported.len(), 1);
    assert_eq!(reexported[0].data, exported[0].data);
    assert_eq!(reexported[0].file, exported[0].file);
}

#[test]
fn test_import_rebuilds_document_structure() {
    let json = api::export(DOCUMENT).unwrap()[0].data.to_json_string().unwrap();
    let root = api::import(&json, "Orchestra", "Strings", "Violin").unwrap();

    // Settings land at the root by default, colors relabeled on first sight
    assert!(root.settings.midi_controls.is_some());
    assert_eq!(root.settings.colors["Color00"], "#FF0000");

    let instrument = &root.products["Orchestra"].instrument_groups["Strings"].instruments["Violin"];
    assert_eq!(
        instrument.keyswitches.mapping,
        vec![
            KeyswitchField::Name,
            KeyswitchField::Key,
            KeyswitchField::Color
        ]
    );
    assert_eq!(instrument.keyswitches.root_octaves.key, Some(1));
    // Pitch range defaults to the instrument level
    assert_eq!(
        instrument.settings.pitch_range.low.to_string(),
        "C-2"
    );
}

#[test]
fn test_import_with_instrument_placement() {
    let json = DeviceConfig::default().to_json_string().unwrap();
    let root = api::import_with_placements(
        &json,
        "P",
        "G",
        "I",
        Some(SettingsLocation::Instrument),
        SettingsLocation::Instrument,
    )
    .unwrap();

    assert!(root.settings.is_default());
    let instrument = &root.products["P"].instrument_groups["G"].instruments["I"];
    assert!(instrument.settings.midi_controls.is_some());
}

#[test]
fn test_comment_template_reaches_device_comments() {
    let document = DOCUMENT.replace(
        "settings:\n",
        "settings:\n  comment_template: \"{product} | {instrument}\"\n",
    );
    let configs = api::export(&document).unwrap();
    assert_eq!(configs[0].data.comments, "Orchestra | Violin");
}

#[test]
fn test_export_fails_without_sub_settings() {
    let document = DOCUMENT.replace("  midi_controls: {}\n", "");
    assert_eq!(
        api::export(&document),
        Err(ConvertError::UndefinedSubSettings("midi_controls"))
    );
}

#[test]
fn test_configured_reference_octave_changes_codes() {
    let document = DOCUMENT.replace("settings:\n", "settings:\n  middle_c: C5\n");
    let configs = api::export(&document).unwrap();
    // C1 under C5 (offset 0) is code 12
    assert_eq!(configs[0].data.ks["1"].key, Field::Int(12));
}

#[test]
fn test_import_merge_unions_instruments() {
    let base = ksem_convert::Root::from_yaml_str(DOCUMENT).unwrap();
    let json = api::export(DOCUMENT).unwrap()[0].data.to_json_string().unwrap();

    let merged = api::import_merge(&base, &json, "Orchestra", "Strings", "Cello").unwrap();
    let strings = &merged.products["Orchestra"].instrument_groups["Strings"];
    assert_eq!(strings.instruments.len(), 2);
    // The base document is untouched
    assert_eq!(
        base.products["Orchestra"].instrument_groups["Strings"]
            .instruments
            .len(),
        1
    );

    // Both instruments' color labels resolve through the merged color table
    let configs = merged.to_device_configs().unwrap();
    assert_eq!(configs.len(), 2);
    for config in &configs {
        assert_eq!(config.data.ks["1"].color, Field::Rgb(vec![255, 0, 0]));
    }
}

#[test]
fn test_export_to_dir_writes_files() {
    let out = tempfile::tempdir().unwrap();
    api::export_to_dir(DOCUMENT, out.path()).unwrap();

    let file = out.path().join("Orchestra/Strings/Violin.json");
    assert!(file.is_file());

    let written = DeviceConfig::from_json_str(&std::fs::read_to_string(&file).unwrap()).unwrap();
    assert_eq!(written, api::export(DOCUMENT).unwrap()[0].data);
}

#[test]
fn test_document_yaml_roundtrip() {
    let root = ksem_convert::Root::from_yaml_str(DOCUMENT).unwrap();
    let text = root.to_yaml_string().unwrap();
    let reparsed = ksem_convert::Root::from_yaml_str(&text).unwrap();
    assert_eq!(reparsed, root);
}
