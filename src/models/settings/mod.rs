//! Cascading settings for the 4-level document hierarchy
//!
//! A [`Settings`] node sits at every hierarchy level. Values cascade down:
//! [`Settings::combine`] flattens an outermost-to-innermost list of levels by
//! taking, per top-level field, the innermost value that differs from the
//! global default. Default detection is structural equality against a fresh
//! [`Settings::default`], so a level that explicitly sets a field back to its
//! default is indistinguishable from one that never set it. This is a
//! documented property of the cascade.

pub mod automation;
pub mod control_pad;
pub mod custom_bank;
pub mod delay;
pub mod midi_controls;
pub mod router;
pub mod xy_pad;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, Result};
use crate::models::device::DeviceConfig;
use crate::models::note::{MiddleC, Note, NoteName};

pub use automation::Automation;
pub use control_pad::ControlPad;
pub use custom_bank::CustomBank;
pub use delay::Delay;
pub use midi_controls::MidiControls;
pub use router::Router;
pub use xy_pad::XyPad;

/// The hierarchy level a settings (or pitch-range) block is stored at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsLocation {
    Root,
    Product,
    InstrumentGroup,
    Instrument,
}

impl SettingsLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingsLocation::Root => "root",
            SettingsLocation::Product => "product",
            SettingsLocation::InstrumentGroup => "instrument_group",
            SettingsLocation::Instrument => "instrument",
        }
    }
}

impl fmt::Display for SettingsLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SettingsLocation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "root" => Ok(SettingsLocation::Root),
            "product" => Ok(SettingsLocation::Product),
            "instrument_group" | "group" => Ok(SettingsLocation::InstrumentGroup),
            "instrument" => Ok(SettingsLocation::Instrument),
            other => Err(format!(
                "invalid settings location {other:?}; expected one of: root, product, instrument_group, instrument"
            )),
        }
    }
}

/// The playable pitch range shown on the device's piano strip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchRange {
    pub low: Note,
    pub high: Note,
}

impl Default for PitchRange {
    fn default() -> Self {
        // The full addressable range under the default reference
        PitchRange {
            low: Note {
                name: NoteName::C,
                octave: -2,
                middle_c: Some(MiddleC::C3),
            },
            high: Note {
                name: NoteName::C,
                octave: 8,
                middle_c: Some(MiddleC::C3),
            },
        }
    }
}

impl PitchRange {
    pub fn from_device(config: &DeviceConfig, middle_c: MiddleC) -> Result<PitchRange> {
        Ok(PitchRange {
            low: Note::from_code(config.piano.pitch_low, middle_c)?,
            high: Note::from_code(config.piano.pitch_high, middle_c)?,
        })
    }
}

/// A settings node: every configurable aspect of one hierarchy level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Comment written into exported records; `{product}`,
    /// `{instrument_group}` and `{instrument}` are substituted.
    pub comment_template: String,
    /// Named color table (label -> `#RRGGBB`) referenced by keyswitch rows
    pub colors: BTreeMap<String, String>,
    pub middle_c: MiddleC,
    pub pitch_range: PitchRange,
    pub mpe_support: bool,
    pub send_main_key: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub midi_controls: Option<MidiControls>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_bank: Option<CustomBank>,
    pub xy_pad: XyPad,
    pub delay: Delay,
    pub automation: Automation,
    pub router: Router,
    pub control_pad: ControlPad,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            comment_template: String::new(),
            colors: BTreeMap::new(),
            middle_c: MiddleC::default(),
            pitch_range: PitchRange::default(),
            mpe_support: false,
            send_main_key: true,
            midi_controls: None,
            custom_bank: None,
            xy_pad: XyPad::default(),
            delay: Delay::default(),
            automation: Automation::default(),
            router: Router::default(),
            control_pad: ControlPad::default(),
        }
    }
}

impl Settings {
    /// True when this node matches a freshly constructed default instance;
    /// such nodes are omitted entirely from serialized documents.
    pub fn is_default(&self) -> bool {
        *self == Settings::default()
    }

    pub fn default_pitch_range() -> PitchRange {
        PitchRange::default()
    }

    /// Decode the settings carried by one device record. The record stores
    /// no reference octave, so the default applies.
    pub fn from_device(config: &DeviceConfig) -> Result<Settings> {
        let middle_c = MiddleC::default();
        Ok(Settings {
            pitch_range: PitchRange::from_device(config, middle_c)?,
            mpe_support: config.key_switch_manager.mpe_support_button != 0,
            send_main_key: config.key_switch_settings.send_main_key != 0,
            midi_controls: Some(MidiControls::from_device(&config.midi_controls)?),
            custom_bank: Some(CustomBank::from_device(&config.custom_bank)?),
            xy_pad: XyPad::from_device(&config.xy_fade)?,
            delay: Delay::from_device(&config.delay_settings)?,
            automation: Automation::from_device(
                &config.automation_settings,
                &config.piano,
                middle_c,
            )?,
            router: Router::from_device(&config.key_switch_manager),
            control_pad: ControlPad::from_device(&config.pad)?,
            ..Default::default()
        })
    }

    /// Flatten a cascade, outermost level first. For each field
    /// independently the innermost non-default value wins; fields default at
    /// every level come out as the global default.
    pub fn combine<'a, I>(levels: I) -> Settings
    where
        I: IntoIterator<Item = &'a Settings>,
    {
        let default = Settings::default();
        let mut out = Settings::default();
        for level in levels {
            if level.comment_template != default.comment_template {
                out.comment_template = level.comment_template.clone();
            }
            if level.colors != default.colors {
                out.colors = level.colors.clone();
            }
            if level.middle_c != default.middle_c {
                out.middle_c = level.middle_c;
            }
            if level.pitch_range != default.pitch_range {
                out.pitch_range = level.pitch_range.clone();
            }
            if level.mpe_support != default.mpe_support {
                out.mpe_support = level.mpe_support;
            }
            if level.send_main_key != default.send_main_key {
                out.send_main_key = level.send_main_key;
            }
            if level.midi_controls != default.midi_controls {
                out.midi_controls = level.midi_controls.clone();
            }
            if level.custom_bank != default.custom_bank {
                out.custom_bank = level.custom_bank.clone();
            }
            if level.xy_pad != default.xy_pad {
                out.xy_pad = level.xy_pad.clone();
            }
            if level.delay != default.delay {
                out.delay = level.delay.clone();
            }
            if level.automation != default.automation {
                out.automation = level.automation.clone();
            }
            if level.router != default.router {
                out.router = level.router.clone();
            }
            if level.control_pad != default.control_pad {
                out.control_pad = level.control_pad.clone();
            }
        }
        out
    }

    /// The MIDI controls group, required somewhere in the cascade for export
    pub fn required_midi_controls(&self) -> Result<&MidiControls> {
        self.midi_controls
            .as_ref()
            .ok_or(ConvertError::UndefinedSubSettings("midi_controls"))
    }

    /// The custom bank group, required somewhere in the cascade for export
    pub fn required_custom_bank(&self) -> Result<&CustomBank> {
        self.custom_bank
            .as_ref()
            .ok_or(ConvertError::UndefinedSubSettings("custom_bank"))
    }
}
