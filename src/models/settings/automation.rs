//! Automation settings
//!
//! The automation key is a pitch; its device form lives in the piano block
//! (`piano.automationKey`) while the flags live in `automationSettings`.

use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, Result};
use crate::models::device::{AutomationBlock, PianoBlock};
use crate::models::note::{MiddleC, Note, NoteName};

/// What pressing the automation key resets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutomationKeyResets {
    OnlyThisTrack,
    AllKsemInstances,
}

const KEY_RESETS_ORDER: [AutomationKeyResets; 2] = [
    AutomationKeyResets::OnlyThisTrack,
    AutomationKeyResets::AllKsemInstances,
];

impl Default for AutomationKeyResets {
    fn default() -> Self {
        AutomationKeyResets::OnlyThisTrack
    }
}

impl AutomationKeyResets {
    pub fn to_device_index(self) -> i64 {
        match self {
            AutomationKeyResets::OnlyThisTrack => 0,
            AutomationKeyResets::AllKsemInstances => 1,
        }
    }

    pub fn from_device_index(index: i64) -> Result<AutomationKeyResets> {
        usize::try_from(index)
            .ok()
            .and_then(|i| KEY_RESETS_ORDER.get(i).copied())
            .ok_or(ConvertError::EnumMappingFailure {
                domain: "automation key setting",
                value: index,
            })
    }
}

/// The automation settings group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Automation {
    pub automation_key: Note,
    pub automation_key_resets: AutomationKeyResets,
    pub ignore_keyswitch_notes_in_midi_clips: bool,
    pub trigger_keyswitch_on_armed_recording_start: bool,
    pub pressing_keyswitches_affects_automation: bool,
}

impl Default for Automation {
    fn default() -> Self {
        Automation {
            automation_key: Note {
                name: NoteName::C,
                octave: 7,
                middle_c: None,
            },
            automation_key_resets: AutomationKeyResets::default(),
            ignore_keyswitch_notes_in_midi_clips: true,
            trigger_keyswitch_on_armed_recording_start: false,
            pressing_keyswitches_affects_automation: false,
        }
    }
}

impl Automation {
    pub fn from_device(
        block: &AutomationBlock,
        piano: &PianoBlock,
        middle_c: MiddleC,
    ) -> Result<Automation> {
        Ok(Automation {
            automation_key: Note::from_code(piano.automation_key, middle_c)?,
            automation_key_resets: AutomationKeyResets::from_device_index(
                block.automation_key_setting,
            )?,
            ignore_keyswitch_notes_in_midi_clips: block.ignore_repeated_key != 0,
            trigger_keyswitch_on_armed_recording_start: block.auto_trigger != 0,
            pressing_keyswitches_affects_automation: block.protect_automation == 0,
        })
    }

    pub fn to_device(&self) -> AutomationBlock {
        AutomationBlock {
            automation_key_setting: self.automation_key_resets.to_device_index(),
            ignore_repeated_key: self.ignore_keyswitch_notes_in_midi_clips as i64,
            auto_trigger: self.trigger_keyswitch_on_armed_recording_start as i64,
            protect_automation: !self.pressing_keyswitches_affects_automation as i64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_roundtrip() {
        let piano = PianoBlock {
            automation_key: 96,
            ..Default::default()
        };
        let automation = Automation::from_device(&AutomationBlock::default(), &piano, MiddleC::C3)
            .unwrap();
        // Code 96 under C3 is C6
        assert_eq!(automation.automation_key.to_string(), "C6");

        let block = automation.to_device();
        assert_eq!(block, AutomationBlock::default());
        assert_eq!(automation.automation_key.to_code_with(MiddleC::C3), 96);
    }

    #[test]
    fn test_protect_automation_is_inverted() {
        let automation = Automation {
            pressing_keyswitches_affects_automation: true,
            ..Default::default()
        };
        assert_eq!(automation.to_device().protect_automation, 0);
    }

    #[test]
    fn test_bad_key_setting_index() {
        let block = AutomationBlock {
            automation_key_setting: 2,
            ..Default::default()
        };
        assert!(matches!(
            Automation::from_device(&block, &PianoBlock::default(), MiddleC::C3),
            Err(ConvertError::EnumMappingFailure { .. })
        ));
    }
}
