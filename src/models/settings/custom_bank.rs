//! Custom control-bank settings (8 assignable knobs)
//!
//! Each knob carries a label and points at one of the MIDI controls (or the
//! keyswitch selector). The device stores the target as a 1-based menu index;
//! the index mapping is derived from the single ordered [`TARGET_ORDER`]
//! list.

use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, Result};
use crate::models::device::{CustomBankBlock, CustomBankLabelBlock, Field};

/// Everything a custom-bank knob can be routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlTarget {
    #[serde(rename = "m01_modulation")]
    M01Modulation,
    #[serde(rename = "m02_breath")]
    M02Breath,
    #[serde(rename = "m04_foot")]
    M04Foot,
    #[serde(rename = "m05_portamento")]
    M05Portamento,
    #[serde(rename = "m07_volume")]
    M07Volume,
    #[serde(rename = "m10_pan")]
    M10Pan,
    #[serde(rename = "m11_expression")]
    M11Expression,
    #[serde(rename = "m64_hold")]
    M64Hold,
    #[serde(rename = "m65_portamento")]
    M65Portamento,
    #[serde(rename = "m66_sostenuto")]
    M66Sostenuto,
    #[serde(rename = "m67_soft")]
    M67Soft,
    #[serde(rename = "m68_legato")]
    M68Legato,
    #[serde(rename = "m71_resonance")]
    M71Resonance,
    #[serde(rename = "m74_frequency")]
    M74Frequency,
    #[serde(rename = "m91_reverb")]
    M91Reverb,
    #[serde(rename = "m93_chorus")]
    M93Chorus,
    #[serde(rename = "custom_01")]
    Custom01,
    #[serde(rename = "custom_02")]
    Custom02,
    #[serde(rename = "custom_03")]
    Custom03,
    #[serde(rename = "custom_04")]
    Custom04,
    #[serde(rename = "custom_05")]
    Custom05,
    #[serde(rename = "custom_06")]
    Custom06,
    #[serde(rename = "custom_07")]
    Custom07,
    #[serde(rename = "custom_08")]
    Custom08,
    #[serde(rename = "keyswitch")]
    Keyswitch,
}

/// Menu order; the device index is the position in this list plus one.
const TARGET_ORDER: [ControlTarget; 25] = [
    ControlTarget::M01Modulation,
    ControlTarget::M02Breath,
    ControlTarget::M04Foot,
    ControlTarget::M05Portamento,
    ControlTarget::M07Volume,
    ControlTarget::M10Pan,
    ControlTarget::M11Expression,
    ControlTarget::M64Hold,
    ControlTarget::M65Portamento,
    ControlTarget::M66Sostenuto,
    ControlTarget::M67Soft,
    ControlTarget::M68Legato,
    ControlTarget::M71Resonance,
    ControlTarget::M74Frequency,
    ControlTarget::M91Reverb,
    ControlTarget::M93Chorus,
    ControlTarget::Custom01,
    ControlTarget::Custom02,
    ControlTarget::Custom03,
    ControlTarget::Custom04,
    ControlTarget::Custom05,
    ControlTarget::Custom06,
    ControlTarget::Custom07,
    ControlTarget::Custom08,
    ControlTarget::Keyswitch,
];

impl ControlTarget {
    pub fn to_device_index(self) -> Result<i64> {
        TARGET_ORDER
            .iter()
            .position(|target| *target == self)
            .map(|position| position as i64 + 1)
            .ok_or(ConvertError::EnumMappingFailure {
                domain: "custom bank target",
                value: -1,
            })
    }

    pub fn from_device_index(index: i64) -> Result<ControlTarget> {
        if index < 1 {
            return Err(ConvertError::EnumMappingFailure {
                domain: "custom bank target",
                value: index,
            });
        }
        TARGET_ORDER
            .get(index as usize - 1)
            .copied()
            .ok_or(ConvertError::EnumMappingFailure {
                domain: "custom bank target",
                value: index,
            })
    }
}

/// A knob in the custom bank: label plus optional routing target
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomBankKnob {
    pub name: String,
    pub control_target: Option<ControlTarget>,
}

/// The custom bank: visibility plus 8 knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomBank {
    pub custom_bank_visible: bool,
    pub knob_01: CustomBankKnob,
    pub knob_02: CustomBankKnob,
    pub knob_03: CustomBankKnob,
    pub knob_04: CustomBankKnob,
    pub knob_05: CustomBankKnob,
    pub knob_06: CustomBankKnob,
    pub knob_07: CustomBankKnob,
    pub knob_08: CustomBankKnob,
}

impl Default for CustomBank {
    fn default() -> Self {
        CustomBank {
            custom_bank_visible: true,
            knob_01: CustomBankKnob::default(),
            knob_02: CustomBankKnob::default(),
            knob_03: CustomBankKnob::default(),
            knob_04: CustomBankKnob::default(),
            knob_05: CustomBankKnob::default(),
            knob_06: CustomBankKnob::default(),
            knob_07: CustomBankKnob::default(),
            knob_08: CustomBankKnob::default(),
        }
    }
}

fn knob_from_device(menu: &Field, label: &str) -> Result<CustomBankKnob> {
    let control_target = match menu {
        Field::Int(index) => Some(ControlTarget::from_device_index(*index)?),
        field if field.is_empty() => None,
        other => {
            return Err(ConvertError::TypeMismatch {
                field: "custom bank menu",
                expected: "an integer menu index or \"-\"",
                found: other.type_name(),
            })
        }
    };
    Ok(CustomBankKnob {
        name: label.to_string(),
        control_target,
    })
}

fn knob_to_device(knob: &CustomBankKnob) -> Result<Field> {
    match knob.control_target {
        Some(target) => Ok(Field::Int(target.to_device_index()?)),
        None => Ok(Field::empty()),
    }
}

impl CustomBank {
    pub fn from_device(block: &CustomBankBlock) -> Result<CustomBank> {
        Ok(CustomBank {
            custom_bank_visible: block.show_hide_custom_bank != 0,
            knob_01: knob_from_device(&block.ctrl1_menu, &block.label.ctrl1)?,
            knob_02: knob_from_device(&block.ctrl2_menu, &block.label.ctrl2)?,
            knob_03: knob_from_device(&block.ctrl3_menu, &block.label.ctrl3)?,
            knob_04: knob_from_device(&block.ctrl4_menu, &block.label.ctrl4)?,
            knob_05: knob_from_device(&block.ctrl5_menu, &block.label.ctrl5)?,
            knob_06: knob_from_device(&block.ctrl6_menu, &block.label.ctrl6)?,
            knob_07: knob_from_device(&block.ctrl7_menu, &block.label.ctrl7)?,
            knob_08: knob_from_device(&block.ctrl8_menu, &block.label.ctrl8)?,
        })
    }

    pub fn to_device(&self) -> Result<CustomBankBlock> {
        Ok(CustomBankBlock {
            show_hide_custom_bank: self.custom_bank_visible as i64,
            ctrl1_menu: knob_to_device(&self.knob_01)?,
            ctrl2_menu: knob_to_device(&self.knob_02)?,
            ctrl3_menu: knob_to_device(&self.knob_03)?,
            ctrl4_menu: knob_to_device(&self.knob_04)?,
            ctrl5_menu: knob_to_device(&self.knob_05)?,
            ctrl6_menu: knob_to_device(&self.knob_06)?,
            ctrl7_menu: knob_to_device(&self.knob_07)?,
            ctrl8_menu: knob_to_device(&self.knob_08)?,
            label: CustomBankLabelBlock {
                ctrl1: self.knob_01.name.clone(),
                ctrl2: self.knob_02.name.clone(),
                ctrl3: self.knob_03.name.clone(),
                ctrl4: self.knob_04.name.clone(),
                ctrl5: self.knob_05.name.clone(),
                ctrl6: self.knob_06.name.clone(),
                ctrl7: self.knob_07.name.clone(),
                ctrl8: self.knob_08.name.clone(),
            },
        })
    }
}
