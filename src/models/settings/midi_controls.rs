//! MIDI control settings and their device-record projection
//!
//! The device exposes 16 standard controls (fixed CC assignments) and 8
//! "custom" controls whose CC number is chosen from a menu. Each control is
//! an enabled flag plus a value dial; custom controls add the CC selector,
//! stored in the device as an index into the fixed option list.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, Result};

/// The custom-control CC menu: position 0 is "no CC", then every CC number
/// that is not claimed by one of the 16 standard controls.
pub static CUSTOM_CC_OPTIONS: Lazy<Vec<Option<u8>>> = Lazy::new(|| {
    let mut options: Vec<Option<u8>> = vec![None];
    options.extend(
        (0u8..=119)
            .filter(|cc| {
                !matches!(
                    cc,
                    1 | 2 | 4 | 5 | 7 | 10 | 11 | 64..=68 | 71 | 74 | 91 | 93
                )
            })
            .map(Some),
    );
    options
});

/// A MIDI control: enabled state and value dial
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MidiControl {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub value: i64,
}

/// A custom MIDI control with its selectable CC number
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CustomMidiControl {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub value: i64,
    #[serde(default)]
    pub midi_cc: Option<u8>,
}

/// The full set of 24 MIDI controls
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MidiControls {
    pub m01_modulation: MidiControl,
    pub m02_breath: MidiControl,
    pub m04_foot: MidiControl,
    pub m05_portamento: MidiControl,
    pub m07_volume: MidiControl,
    pub m10_pan: MidiControl,
    pub m11_expression: MidiControl,
    pub m64_hold: MidiControl,
    pub m65_portamento: MidiControl,
    pub m66_sostenuto: MidiControl,
    pub m67_soft: MidiControl,
    pub m68_legato: MidiControl,
    pub m71_resonance: MidiControl,
    pub m74_frequency: MidiControl,
    pub m91_reverb: MidiControl,
    pub m93_chorus: MidiControl,

    pub custom_01: CustomMidiControl,
    pub custom_02: CustomMidiControl,
    pub custom_03: CustomMidiControl,
    pub custom_04: CustomMidiControl,
    pub custom_05: CustomMidiControl,
    pub custom_06: CustomMidiControl,
    pub custom_07: CustomMidiControl,
    pub custom_08: CustomMidiControl,
}

fn block_value(block: &BTreeMap<String, i64>, key: &str) -> i64 {
    // Fields absent from the record default rather than error
    block.get(key).copied().unwrap_or(0)
}

fn standard_from_block(block: &BTreeMap<String, i64>, device_key: &str) -> MidiControl {
    MidiControl {
        enabled: block_value(block, &format!("{device_key}_button")) != 0,
        value: block_value(block, &format!("{device_key}_dial")),
    }
}

fn custom_from_block(block: &BTreeMap<String, i64>, device_key: &str) -> Result<CustomMidiControl> {
    let index = block_value(block, &format!("{device_key}_num"));
    let midi_cc = CUSTOM_CC_OPTIONS
        .get(index as usize)
        .copied()
        .ok_or(ConvertError::EnumMappingFailure {
            domain: "custom MIDI CC",
            value: index,
        })?;
    Ok(CustomMidiControl {
        enabled: block_value(block, &format!("{device_key}_button")) != 0,
        value: block_value(block, &format!("{device_key}_dial")),
        midi_cc,
    })
}

impl MidiControls {
    /// Standard controls paired with their device key prefixes
    fn standard(&self) -> [(&'static str, &MidiControl); 16] {
        [
            ("01Modulation", &self.m01_modulation),
            ("02Breath", &self.m02_breath),
            ("04FootPedal", &self.m04_foot),
            ("05PortamentoTime", &self.m05_portamento),
            ("07Volume", &self.m07_volume),
            ("10Pan", &self.m10_pan),
            ("11Expression", &self.m11_expression),
            ("64HoldPedal", &self.m64_hold),
            ("65PortamentoOnOff", &self.m65_portamento),
            ("66SostenutoPedal", &self.m66_sostenuto),
            ("67SoftPedal", &self.m67_soft),
            ("68LegatoPedal", &self.m68_legato),
            ("71Resonance", &self.m71_resonance),
            ("74FrequencyCutoff", &self.m74_frequency),
            ("91ReverbLevel", &self.m91_reverb),
            ("93ChorusLevel", &self.m93_chorus),
        ]
    }

    /// Custom controls paired with their device key prefixes
    fn customs(&self) -> [(&'static str, &CustomMidiControl); 8] {
        [
            ("CcCustom01", &self.custom_01),
            ("CcCustom02", &self.custom_02),
            ("CcCustom03", &self.custom_03),
            ("CcCustom04", &self.custom_04),
            ("CcCustom05", &self.custom_05),
            ("CcCustom06", &self.custom_06),
            ("CcCustom07", &self.custom_07),
            ("CcCustom08", &self.custom_08),
        ]
    }

    pub fn from_device(block: &BTreeMap<String, i64>) -> Result<MidiControls> {
        Ok(MidiControls {
            m01_modulation: standard_from_block(block, "01Modulation"),
            m02_breath: standard_from_block(block, "02Breath"),
            m04_foot: standard_from_block(block, "04FootPedal"),
            m05_portamento: standard_from_block(block, "05PortamentoTime"),
            m07_volume: standard_from_block(block, "07Volume"),
            m10_pan: standard_from_block(block, "10Pan"),
            m11_expression: standard_from_block(block, "11Expression"),
            m64_hold: standard_from_block(block, "64HoldPedal"),
            m65_portamento: standard_from_block(block, "65PortamentoOnOff"),
            m66_sostenuto: standard_from_block(block, "66SostenutoPedal"),
            m67_soft: standard_from_block(block, "67SoftPedal"),
            m68_legato: standard_from_block(block, "68LegatoPedal"),
            m71_resonance: standard_from_block(block, "71Resonance"),
            m74_frequency: standard_from_block(block, "74FrequencyCutoff"),
            m91_reverb: standard_from_block(block, "91ReverbLevel"),
            m93_chorus: standard_from_block(block, "93ChorusLevel"),
            custom_01: custom_from_block(block, "CcCustom01")?,
            custom_02: custom_from_block(block, "CcCustom02")?,
            custom_03: custom_from_block(block, "CcCustom03")?,
            custom_04: custom_from_block(block, "CcCustom04")?,
            custom_05: custom_from_block(block, "CcCustom05")?,
            custom_06: custom_from_block(block, "CcCustom06")?,
            custom_07: custom_from_block(block, "CcCustom07")?,
            custom_08: custom_from_block(block, "CcCustom08")?,
        })
    }

    pub fn to_device(&self) -> Result<BTreeMap<String, i64>> {
        let mut block = BTreeMap::new();
        for (device_key, control) in self.standard() {
            block.insert(format!("{device_key}_button"), control.enabled as i64);
            block.insert(format!("{device_key}_dial"), control.value);
        }
        for (device_key, control) in self.customs() {
            block.insert(format!("{device_key}_button"), control.enabled as i64);
            block.insert(format!("{device_key}_dial"), control.value);
            let index = CUSTOM_CC_OPTIONS
                .iter()
                .position(|option| *option == control.midi_cc)
                .ok_or(ConvertError::EnumMappingFailure {
                    domain: "custom MIDI CC",
                    value: control.midi_cc.map(i64::from).unwrap_or(-1),
                })?;
            block.insert(format!("{device_key}_num"), index as i64);
        }
        Ok(block)
    }
}
