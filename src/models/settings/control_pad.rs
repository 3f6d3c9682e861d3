//! Display-pad settings
//!
//! The device stores the font size inside a 3-element list (only the third
//! element is meaningful) and `fontSizeButton` appears unused; both are
//! round-tripped as fixed values.

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::error::{ConvertError, Result};
use crate::models::device::PadBlock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum FontSize {
    S1 = 1,
    S2 = 2,
    S3 = 3,
    S4 = 4,
}

const FONT_SIZE_ORDER: [FontSize; 4] = [FontSize::S1, FontSize::S2, FontSize::S3, FontSize::S4];

impl Default for FontSize {
    fn default() -> Self {
        FontSize::S2
    }
}

impl FontSize {
    pub fn to_device_index(self) -> i64 {
        self as i64 - 1
    }

    pub fn from_device_index(index: i64) -> Result<FontSize> {
        usize::try_from(index)
            .ok()
            .and_then(|i| FONT_SIZE_ORDER.get(i).copied())
            .ok_or(ConvertError::EnumMappingFailure {
                domain: "font size",
                value: index,
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Justification {
    Left,
    Center,
}

const JUSTIFICATION_ORDER: [Justification; 2] = [Justification::Left, Justification::Center];

impl Default for Justification {
    fn default() -> Self {
        Justification::Center
    }
}

impl Justification {
    pub fn to_device_index(self) -> i64 {
        match self {
            Justification::Left => 0,
            Justification::Center => 1,
        }
    }

    pub fn from_device_index(index: i64) -> Result<Justification> {
        usize::try_from(index)
            .ok()
            .and_then(|i| JUSTIFICATION_ORDER.get(i).copied())
            .ok_or(ConvertError::EnumMappingFailure {
                domain: "justification",
                value: index,
            })
    }
}

/// The display-pad settings group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlPad {
    pub font_size: FontSize,
    pub justification: Justification,
    pub show_ks_number: bool,
    pub show_ks_note: bool,
}

impl Default for ControlPad {
    fn default() -> Self {
        ControlPad {
            font_size: FontSize::default(),
            justification: Justification::default(),
            show_ks_number: true,
            show_ks_note: false,
        }
    }
}

impl ControlPad {
    pub fn from_device(block: &PadBlock) -> Result<ControlPad> {
        // The font size is the third element of the list
        let font_index = block.font_size.get(2).copied().unwrap_or(1);
        Ok(ControlPad {
            font_size: FontSize::from_device_index(font_index)?,
            justification: Justification::from_device_index(block.justification)?,
            show_ks_number: block.show_ks_numbers != 0,
            show_ks_note: block.show_ks_notes != 0,
        })
    }

    pub fn to_device(&self) -> PadBlock {
        PadBlock {
            font_size: vec![0, 0, self.font_size.to_device_index()],
            justification: self.justification.to_device_index(),
            show_ks_numbers: self.show_ks_number as i64,
            show_ks_notes: self.show_ks_note as i64,
            font_size_button: 0,
        }
    }
}
