//! Crossfade (XY) pad settings
//!
//! Each pad axis targets nothing, note velocity, or a MIDI CC. The device
//! stores the target as an index into one fixed menu: position 0 is "none",
//! position 1 is "velocity", positions 2..=121 are CC 0..=119.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ConvertError, Result};
use crate::models::device::XyFadeBlock;

const CC_COUNT: i64 = 120;

/// What a pad axis drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisTarget {
    None,
    Velocity,
    Cc(u8),
}

impl Default for AxisTarget {
    fn default() -> Self {
        AxisTarget::None
    }
}

impl AxisTarget {
    pub fn to_device_index(self) -> Result<i64> {
        match self {
            AxisTarget::None => Ok(0),
            AxisTarget::Velocity => Ok(1),
            AxisTarget::Cc(cc) if i64::from(cc) < CC_COUNT => Ok(i64::from(cc) + 2),
            AxisTarget::Cc(cc) => Err(ConvertError::EnumMappingFailure {
                domain: "crossfade axis target",
                value: i64::from(cc),
            }),
        }
    }

    pub fn from_device_index(index: i64) -> Result<AxisTarget> {
        match index {
            0 => Ok(AxisTarget::None),
            1 => Ok(AxisTarget::Velocity),
            2..=121 => Ok(AxisTarget::Cc((index - 2) as u8)),
            _ => Err(ConvertError::EnumMappingFailure {
                domain: "crossfade axis target",
                value: index,
            }),
        }
    }
}

// Document form: null, "velocity", or the bare CC number.
impl Serialize for AxisTarget {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            AxisTarget::None => serializer.serialize_unit(),
            AxisTarget::Velocity => serializer.serialize_str("velocity"),
            AxisTarget::Cc(cc) => serializer.serialize_u8(*cc),
        }
    }
}

struct AxisTargetVisitor;

impl<'de> Visitor<'de> for AxisTargetVisitor {
    type Value = AxisTarget;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("null, \"velocity\", or a CC number 0-119")
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<AxisTarget, E> {
        Ok(AxisTarget::None)
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<AxisTarget, E> {
        Ok(AxisTarget::None)
    }

    fn visit_str<E: de::Error>(self, value: &str) -> std::result::Result<AxisTarget, E> {
        match value {
            "velocity" => Ok(AxisTarget::Velocity),
            other => Err(de::Error::invalid_value(de::Unexpected::Str(other), &self)),
        }
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> std::result::Result<AxisTarget, E> {
        if value < CC_COUNT as u64 {
            Ok(AxisTarget::Cc(value as u8))
        } else {
            Err(de::Error::invalid_value(
                de::Unexpected::Unsigned(value),
                &self,
            ))
        }
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> std::result::Result<AxisTarget, E> {
        if (0..CC_COUNT).contains(&value) {
            Ok(AxisTarget::Cc(value as u8))
        } else {
            Err(de::Error::invalid_value(
                de::Unexpected::Signed(value),
                &self,
            ))
        }
    }
}

impl<'de> Deserialize<'de> for AxisTarget {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(AxisTargetVisitor)
    }
}

/// How the pad is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PadShape {
    FilledRectangle,
    Line,
}

const PAD_SHAPE_ORDER: [PadShape; 2] = [PadShape::FilledRectangle, PadShape::Line];

impl Default for PadShape {
    fn default() -> Self {
        PadShape::FilledRectangle
    }
}

impl PadShape {
    pub fn to_device_index(self) -> i64 {
        match self {
            PadShape::FilledRectangle => 0,
            PadShape::Line => 1,
        }
    }

    pub fn from_device_index(index: i64) -> Result<PadShape> {
        usize::try_from(index)
            .ok()
            .and_then(|i| PAD_SHAPE_ORDER.get(i).copied())
            .ok_or(ConvertError::EnumMappingFailure {
                domain: "pad shape",
                value: index,
            })
    }
}

/// The crossfade pad settings group
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct XyPad {
    pub x_axis_target: AxisTarget,
    pub y_axis_target: AxisTarget,
    pub pad_shape: PadShape,
}

impl XyPad {
    pub fn from_device(block: &XyFadeBlock) -> Result<XyPad> {
        Ok(XyPad {
            x_axis_target: AxisTarget::from_device_index(block.choose_x_fade)?,
            y_axis_target: AxisTarget::from_device_index(block.choose_y_fade)?,
            pad_shape: PadShape::from_device_index(block.xy_fade_shape)?,
        })
    }

    pub fn to_device(&self) -> Result<XyFadeBlock> {
        Ok(XyFadeBlock {
            choose_x_fade: self.x_axis_target.to_device_index()?,
            choose_y_fade: self.y_axis_target.to_device_index()?,
            xy_fade_shape: self.pad_shape.to_device_index(),
            // Fixed in this format revision
            y_orientation: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_target_index_bijection() {
        for index in 0..=121 {
            let target = AxisTarget::from_device_index(index).unwrap();
            assert_eq!(target.to_device_index().unwrap(), index);
        }
        assert_eq!(AxisTarget::from_device_index(0).unwrap(), AxisTarget::None);
        assert_eq!(
            AxisTarget::from_device_index(1).unwrap(),
            AxisTarget::Velocity
        );
        assert_eq!(
            AxisTarget::from_device_index(2).unwrap(),
            AxisTarget::Cc(0)
        );
        assert!(AxisTarget::from_device_index(122).is_err());
        assert!(AxisTarget::from_device_index(-1).is_err());
    }

    #[test]
    fn test_axis_target_document_forms() {
        assert_eq!(
            serde_yaml::to_string(&AxisTarget::Velocity).unwrap().trim(),
            "velocity"
        );
        assert_eq!(
            serde_yaml::to_string(&AxisTarget::Cc(11)).unwrap().trim(),
            "11"
        );
        let parsed: AxisTarget = serde_yaml::from_str("velocity").unwrap();
        assert_eq!(parsed, AxisTarget::Velocity);
        let parsed: AxisTarget = serde_yaml::from_str("74").unwrap();
        assert_eq!(parsed, AxisTarget::Cc(74));
        let parsed: AxisTarget = serde_yaml::from_str("null").unwrap();
        assert_eq!(parsed, AxisTarget::None);
    }

    #[test]
    fn test_device_roundtrip() {
        let pad = XyPad {
            x_axis_target: AxisTarget::Cc(1),
            y_axis_target: AxisTarget::Velocity,
            pad_shape: PadShape::Line,
        };
        let block = pad.to_device().unwrap();
        assert_eq!(block.choose_x_fade, 3);
        assert_eq!(block.choose_y_fade, 1);
        assert_eq!(block.xy_fade_shape, 1);
        assert_eq!(block.y_orientation, 0);
        assert_eq!(XyPad::from_device(&block).unwrap(), pad);
    }
}
