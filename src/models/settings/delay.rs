//! Delay and buffering settings
//!
//! The device stores the buffer size and delay mode as menu indices; both
//! mappings are derived from a single ordered list. The per-event delay
//! amounts are plain floats passed through unchanged.

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::error::{ConvertError, Result};
use crate::models::device::DelayBlock;

/// Allowed buffer sizes; the document form is the size itself, the device
/// form the position in [`BUFFER_SIZE_ORDER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(u16)]
pub enum BufferSize {
    B64 = 64,
    B128 = 128,
    B256 = 256,
    B512 = 512,
    B1024 = 1024,
    B2048 = 2048,
}

const BUFFER_SIZE_ORDER: [BufferSize; 6] = [
    BufferSize::B64,
    BufferSize::B128,
    BufferSize::B256,
    BufferSize::B512,
    BufferSize::B1024,
    BufferSize::B2048,
];

impl Default for BufferSize {
    fn default() -> Self {
        BufferSize::B512
    }
}

impl BufferSize {
    pub fn to_device_index(self) -> Result<i64> {
        BUFFER_SIZE_ORDER
            .iter()
            .position(|size| *size == self)
            .map(|position| position as i64)
            .ok_or(ConvertError::EnumMappingFailure {
                domain: "buffer size",
                value: self as i64,
            })
    }

    pub fn from_device_index(index: i64) -> Result<BufferSize> {
        usize::try_from(index)
            .ok()
            .and_then(|i| BUFFER_SIZE_ORDER.get(i).copied())
            .ok_or(ConvertError::EnumMappingFailure {
                domain: "buffer size",
                value: index,
            })
    }
}

/// Whether the configured delays compensate latency or delay the track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelayMode {
    Compensation,
    TrackDelay,
}

const DELAY_MODE_ORDER: [DelayMode; 2] = [DelayMode::Compensation, DelayMode::TrackDelay];

impl Default for DelayMode {
    fn default() -> Self {
        DelayMode::Compensation
    }
}

impl DelayMode {
    pub fn to_device_index(self) -> i64 {
        match self {
            DelayMode::Compensation => 0,
            DelayMode::TrackDelay => 1,
        }
    }

    pub fn from_device_index(index: i64) -> Result<DelayMode> {
        usize::try_from(index)
            .ok()
            .and_then(|i| DELAY_MODE_ORDER.get(i).copied())
            .ok_or(ConvertError::EnumMappingFailure {
                domain: "delay mode",
                value: index,
            })
    }
}

/// The delay/buffering settings group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Delay {
    pub using_rack: bool,
    pub chain_selector_filters_midi_control: bool,
    pub buffer_size: BufferSize,
    pub delay_mode: DelayMode,
    pub lock_midi_control_order: bool,

    pub delay_bank: f64,
    pub delay_sub: f64,
    pub delay_program: f64,
    pub delay_cc: f64,
    pub delay_main_key: f64,
    pub delay_second_key: f64,
    pub delay_passed_thru_midi_note: f64,
}

impl Default for Delay {
    fn default() -> Self {
        Delay {
            using_rack: false,
            chain_selector_filters_midi_control: false,
            buffer_size: BufferSize::default(),
            delay_mode: DelayMode::default(),
            lock_midi_control_order: true,
            delay_bank: 0.0,
            delay_sub: 0.1,
            delay_program: 0.2,
            delay_cc: 0.3,
            delay_main_key: 0.5,
            delay_second_key: 0.6,
            delay_passed_thru_midi_note: 1.0,
        }
    }
}

impl Delay {
    pub fn from_device(block: &DelayBlock) -> Result<Delay> {
        Ok(Delay {
            using_rack: block.usage_rack != 0.0,
            chain_selector_filters_midi_control: block.filter_midi_ctrl != 0.0,
            buffer_size: BufferSize::from_device_index(block.buffer_size as i64)?,
            delay_mode: DelayMode::from_device_index(block.delay_compensation as i64)?,
            lock_midi_control_order: block.lock != 0.0,
            delay_bank: block.delay_bank,
            delay_sub: block.delay_sub,
            delay_program: block.delay_pgm,
            delay_cc: block.delay_cc,
            delay_main_key: block.delay_main_key,
            delay_second_key: block.delay_additional_key,
            delay_passed_thru_midi_note: block.delay_midi_note,
        })
    }

    pub fn to_device(&self) -> Result<DelayBlock> {
        Ok(DelayBlock {
            usage_rack: self.using_rack as i64 as f64,
            filter_midi_ctrl: self.chain_selector_filters_midi_control as i64 as f64,
            buffer_size: self.buffer_size.to_device_index()? as f64,
            delay_compensation: self.delay_mode.to_device_index() as f64,
            lock: self.lock_midi_control_order as i64 as f64,
            delay_bank: self.delay_bank,
            delay_sub: self.delay_sub,
            delay_pgm: self.delay_program,
            delay_cc: self.delay_cc,
            delay_main_key: self.delay_main_key,
            delay_additional_key: self.delay_second_key,
            delay_midi_note: self.delay_passed_thru_midi_note,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_size_index_bijection() {
        for (position, size) in BUFFER_SIZE_ORDER.iter().enumerate() {
            assert_eq!(size.to_device_index().unwrap(), position as i64);
            assert_eq!(
                BufferSize::from_device_index(position as i64).unwrap(),
                *size
            );
        }
        assert!(BufferSize::from_device_index(6).is_err());
        assert!(BufferSize::from_device_index(-1).is_err());
    }

    #[test]
    fn test_buffer_size_document_form_is_the_size() {
        let yaml = serde_yaml::to_string(&BufferSize::B1024).unwrap();
        assert_eq!(yaml.trim(), "1024");
        let parsed: BufferSize = serde_yaml::from_str("256").unwrap();
        assert_eq!(parsed, BufferSize::B256);
    }

    #[test]
    fn test_device_roundtrip() {
        let delay = Delay {
            using_rack: true,
            buffer_size: BufferSize::B2048,
            delay_mode: DelayMode::TrackDelay,
            delay_main_key: 0.75,
            ..Default::default()
        };
        let block = delay.to_device().unwrap();
        assert_eq!(block.buffer_size, 5.0);
        assert_eq!(block.delay_compensation, 1.0);
        assert_eq!(Delay::from_device(&block).unwrap(), delay);
    }

    #[test]
    fn test_default_matches_device_default_block() {
        let block = Delay::default().to_device().unwrap();
        assert_eq!(block, DelayBlock::default());
    }
}
