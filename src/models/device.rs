//! The flat, fixed-schema device configuration record
//!
//! This is the JSON form the virtual-instrument host consumes. Field names
//! follow the wire format exactly (serde renames); structure matches format
//! revision 4.2. Cells in the keyswitch map use the `"-"` sentinel for absent
//! values, modeled by [`Field`].
//!
//! `Default` impls reproduce the block values a freshly-defaulted settings
//! tree projects, so a default record and an exported default document agree.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, Result};

/// Device format revision this crate reads and writes.
pub const DEVICE_VERSION: f64 = 4.2;

/// The `"-"` placeholder marking an absent keyswitch field.
pub const EMPTY_VALUE: &str = "-";

/// One cell of the device keyswitch map: an integer, an RGB triple, or a
/// string (including the `"-"` sentinel)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Field {
    Int(i64),
    Rgb(Vec<i64>),
    Str(String),
}

impl Field {
    pub fn empty() -> Field {
        Field::Str(EMPTY_VALUE.to_string())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Field::Str(s) if s == EMPTY_VALUE)
    }

    /// Short description of the runtime type, for error messages
    pub fn type_name(&self) -> String {
        match self {
            Field::Int(v) => format!("integer {v}"),
            Field::Rgb(v) => format!("list {v:?}"),
            Field::Str(s) => format!("string {s:?}"),
        }
    }
}

impl Default for Field {
    fn default() -> Self {
        Field::empty()
    }
}

/// One row of the device keyswitch map: the fixed 10-field record
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KeyswitchEntry {
    #[serde(default)]
    pub name: Field,
    #[serde(default)]
    pub key: Field,
    #[serde(rename = "+key", default)]
    pub second_key: Field,
    #[serde(default)]
    pub bnk: Field,
    #[serde(default)]
    pub sub: Field,
    #[serde(default)]
    pub pgm: Field,
    #[serde(default)]
    pub ccn: Field,
    #[serde(default)]
    pub ccv: Field,
    #[serde(default)]
    pub chn: Field,
    #[serde(default)]
    pub color: Field,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomBankBlock {
    #[serde(rename = "showHideCustomBank")]
    pub show_hide_custom_bank: i64,
    pub ctrl1_menu: Field,
    pub ctrl2_menu: Field,
    pub ctrl3_menu: Field,
    pub ctrl4_menu: Field,
    pub ctrl5_menu: Field,
    pub ctrl6_menu: Field,
    pub ctrl7_menu: Field,
    pub ctrl8_menu: Field,
    pub label: CustomBankLabelBlock,
}

impl Default for CustomBankBlock {
    fn default() -> Self {
        CustomBankBlock {
            show_hide_custom_bank: 1,
            ctrl1_menu: Field::empty(),
            ctrl2_menu: Field::empty(),
            ctrl3_menu: Field::empty(),
            ctrl4_menu: Field::empty(),
            ctrl5_menu: Field::empty(),
            ctrl6_menu: Field::empty(),
            ctrl7_menu: Field::empty(),
            ctrl8_menu: Field::empty(),
            label: CustomBankLabelBlock::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CustomBankLabelBlock {
    pub ctrl1: String,
    pub ctrl2: String,
    pub ctrl3: String,
    pub ctrl4: String,
    pub ctrl5: String,
    pub ctrl6: String,
    pub ctrl7: String,
    pub ctrl8: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyswitchSettingsBlock {
    #[serde(rename = "keySwitchAmount")]
    pub key_switch_amount: i64,
    #[serde(rename = "sendMainKey")]
    pub send_main_key: i64,
}

impl Default for KeyswitchSettingsBlock {
    fn default() -> Self {
        KeyswitchSettingsBlock {
            key_switch_amount: 1,
            send_main_key: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct XyFadeBlock {
    #[serde(rename = "chooseXFade")]
    pub choose_x_fade: i64,
    #[serde(rename = "chooseYFade")]
    pub choose_y_fade: i64,
    #[serde(rename = "xyFadeShape")]
    pub xy_fade_shape: i64,
    #[serde(rename = "yOrientation")]
    pub y_orientation: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelayBlock {
    #[serde(rename = "usageRack")]
    pub usage_rack: f64,
    #[serde(rename = "filterMIDICtrl")]
    pub filter_midi_ctrl: f64,
    #[serde(rename = "bufferSize")]
    pub buffer_size: f64,
    #[serde(rename = "delayCompensation")]
    pub delay_compensation: f64,
    pub lock: f64,
    #[serde(rename = "delayBank")]
    pub delay_bank: f64,
    #[serde(rename = "delaySub")]
    pub delay_sub: f64,
    #[serde(rename = "delayPgm")]
    pub delay_pgm: f64,
    #[serde(rename = "delayCC")]
    pub delay_cc: f64,
    #[serde(rename = "delayMainKey")]
    pub delay_main_key: f64,
    #[serde(rename = "delayAdditionalKey")]
    pub delay_additional_key: f64,
    #[serde(rename = "delayMIDINote")]
    pub delay_midi_note: f64,
}

impl Default for DelayBlock {
    fn default() -> Self {
        DelayBlock {
            usage_rack: 0.0,
            filter_midi_ctrl: 0.0,
            buffer_size: 3.0,
            delay_compensation: 0.0,
            lock: 1.0,
            delay_bank: 0.0,
            delay_sub: 0.1,
            delay_pgm: 0.2,
            delay_cc: 0.3,
            delay_main_key: 0.5,
            delay_additional_key: 0.6,
            delay_midi_note: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomationBlock {
    #[serde(rename = "automationKeySetting")]
    pub automation_key_setting: i64,
    #[serde(rename = "ignoreRepeatedKey")]
    pub ignore_repeated_key: i64,
    #[serde(rename = "autoTrigger")]
    pub auto_trigger: i64,
    #[serde(rename = "protectAutomation")]
    pub protect_automation: i64,
}

impl Default for AutomationBlock {
    fn default() -> Self {
        AutomationBlock {
            automation_key_setting: 0,
            ignore_repeated_key: 1,
            auto_trigger: 0,
            protect_automation: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerBlock {
    #[serde(rename = "routerTrack")]
    pub router_track: i64,
    #[serde(rename = "routerFilter")]
    pub router_filter: i64,
    #[serde(rename = "mpeSupportButton")]
    pub mpe_support_button: i64,
}

impl Default for ManagerBlock {
    fn default() -> Self {
        ManagerBlock {
            router_track: 1,
            router_filter: 0,
            mpe_support_button: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PianoBlock {
    #[serde(rename = "showHidePiano")]
    pub show_hide_piano: i64,
    #[serde(rename = "pitchLow")]
    pub pitch_low: i64,
    #[serde(rename = "pitchHigh")]
    pub pitch_high: i64,
    #[serde(rename = "automationKey")]
    pub automation_key: i64,
}

impl Default for PianoBlock {
    fn default() -> Self {
        // C-2..C8 and automation key C7, all under the C3 reference
        PianoBlock {
            show_hide_piano: 1,
            pitch_low: 0,
            pitch_high: 120,
            automation_key: 108,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PadBlock {
    #[serde(rename = "fontSize")]
    pub font_size: Vec<i64>,
    pub justification: i64,
    #[serde(rename = "showKSNumbers")]
    pub show_ks_numbers: i64,
    #[serde(rename = "showKSNotes")]
    pub show_ks_notes: i64,
    #[serde(rename = "fontSizeButton")]
    pub font_size_button: i64,
}

impl Default for PadBlock {
    fn default() -> Self {
        PadBlock {
            font_size: vec![0, 0, 1],
            justification: 1,
            show_ks_numbers: 1,
            show_ks_notes: 0,
            font_size_button: 0,
        }
    }
}

/// The complete device configuration record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    #[serde(rename = "KSEM-Version")]
    pub version: f64,
    #[serde(default)]
    pub ks: BTreeMap<String, KeyswitchEntry>,
    #[serde(rename = "midiControls", default)]
    pub midi_controls: BTreeMap<String, i64>,
    #[serde(rename = "customBank", default)]
    pub custom_bank: CustomBankBlock,
    #[serde(rename = "keySwitchSettings", default)]
    pub key_switch_settings: KeyswitchSettingsBlock,
    #[serde(rename = "xyFade", default)]
    pub xy_fade: XyFadeBlock,
    #[serde(rename = "delaySettings", default)]
    pub delay_settings: DelayBlock,
    #[serde(rename = "automationSettings", default)]
    pub automation_settings: AutomationBlock,
    #[serde(rename = "keySwitchManager", default)]
    pub key_switch_manager: ManagerBlock,
    #[serde(default)]
    pub piano: PianoBlock,
    #[serde(default)]
    pub pad: PadBlock,
    #[serde(default)]
    pub comments: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        DeviceConfig {
            version: DEVICE_VERSION,
            ks: BTreeMap::new(),
            midi_controls: BTreeMap::new(),
            custom_bank: CustomBankBlock::default(),
            key_switch_settings: KeyswitchSettingsBlock::default(),
            xy_fade: XyFadeBlock::default(),
            delay_settings: DelayBlock::default(),
            automation_settings: AutomationBlock::default(),
            key_switch_manager: ManagerBlock::default(),
            piano: PianoBlock::default(),
            pad: PadBlock::default(),
            comments: String::new(),
        }
    }
}

impl DeviceConfig {
    /// Parse a device record from its JSON text form
    pub fn from_json_str(text: &str) -> Result<DeviceConfig> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serialize to the JSON text form the host expects (2-space indent)
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Keyswitch rows in numeric row-id order. Row ids must be positive
    /// integers in text form (`"1"`, `"2"`, ...).
    pub fn ks_rows_in_order(&self) -> Result<Vec<&KeyswitchEntry>> {
        let mut numbered: Vec<(u32, &KeyswitchEntry)> = Vec::with_capacity(self.ks.len());
        for (row_id, entry) in &self.ks {
            let number: u32 = row_id.parse().map_err(|_| {
                ConvertError::MalformedRecord(format!("keyswitch row id {row_id:?} is not a number"))
            })?;
            numbered.push((number, entry));
        }
        numbered.sort_by_key(|(number, _)| *number);
        Ok(numbered.into_iter().map(|(_, entry)| entry).collect())
    }
}
