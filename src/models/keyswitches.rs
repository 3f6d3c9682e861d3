//! The keyswitch table: a compact column-mapped grid
//!
//! Instead of repeating all ten device fields for every row, the document
//! names the populated columns once (`mapping`) and stores rows as positional
//! value lists. Key columns hold bare note names; their octave is factored
//! out into `root_octaves`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ConvertError, Result};
use crate::models::device::{DeviceConfig, Field, KeyswitchEntry};
use crate::models::note::{Note, NoteName};
use crate::models::settings::Settings;
use crate::utils::color;

/// One column of the keyswitch grid, in canonical device order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyswitchField {
    Name,
    Key,
    SecondKey,
    Bank,
    Sub,
    Program,
    CcN,
    CcV,
    Chain,
    Color,
}

impl KeyswitchField {
    /// Canonical column order; `mapping` is always sorted this way
    pub const ALL: [KeyswitchField; 10] = [
        KeyswitchField::Name,
        KeyswitchField::Key,
        KeyswitchField::SecondKey,
        KeyswitchField::Bank,
        KeyswitchField::Sub,
        KeyswitchField::Program,
        KeyswitchField::CcN,
        KeyswitchField::CcV,
        KeyswitchField::Chain,
        KeyswitchField::Color,
    ];

    /// The key used for this column in the device record
    pub fn device_key(&self) -> &'static str {
        match self {
            KeyswitchField::Name => "name",
            KeyswitchField::Key => "key",
            KeyswitchField::SecondKey => "+key",
            KeyswitchField::Bank => "bnk",
            KeyswitchField::Sub => "sub",
            KeyswitchField::Program => "pgm",
            KeyswitchField::CcN => "ccn",
            KeyswitchField::CcV => "ccv",
            KeyswitchField::Chain => "chn",
            KeyswitchField::Color => "color",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KeyswitchField::Name => "name",
            KeyswitchField::Key => "key",
            KeyswitchField::SecondKey => "second_key",
            KeyswitchField::Bank => "bank",
            KeyswitchField::Sub => "sub",
            KeyswitchField::Program => "program",
            KeyswitchField::CcN => "cc_n",
            KeyswitchField::CcV => "cc_v",
            KeyswitchField::Chain => "chain",
            KeyswitchField::Color => "color",
        }
    }

    fn cell<'a>(&self, entry: &'a KeyswitchEntry) -> &'a Field {
        match self {
            KeyswitchField::Name => &entry.name,
            KeyswitchField::Key => &entry.key,
            KeyswitchField::SecondKey => &entry.second_key,
            KeyswitchField::Bank => &entry.bnk,
            KeyswitchField::Sub => &entry.sub,
            KeyswitchField::Program => &entry.pgm,
            KeyswitchField::CcN => &entry.ccn,
            KeyswitchField::CcV => &entry.ccv,
            KeyswitchField::Chain => &entry.chn,
            KeyswitchField::Color => &entry.color,
        }
    }

    fn cell_mut<'a>(&self, entry: &'a mut KeyswitchEntry) -> &'a mut Field {
        match self {
            KeyswitchField::Name => &mut entry.name,
            KeyswitchField::Key => &mut entry.key,
            KeyswitchField::SecondKey => &mut entry.second_key,
            KeyswitchField::Bank => &mut entry.bnk,
            KeyswitchField::Sub => &mut entry.sub,
            KeyswitchField::Program => &mut entry.pgm,
            KeyswitchField::CcN => &mut entry.ccn,
            KeyswitchField::CcV => &mut entry.ccv,
            KeyswitchField::Chain => &mut entry.chn,
            KeyswitchField::Color => &mut entry.color,
        }
    }
}

/// The root octave each key column is anchored to. Required for whichever
/// key columns appear in `mapping`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootOctaves {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second_key: Option<i32>,
}

/// One grid cell in the document form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Int(i64),
    Str(String),
}

impl CellValue {
    fn as_note_name(&self, field: KeyswitchField) -> Result<NoteName> {
        match self {
            CellValue::Str(text) => text
                .parse()
                .map_err(|_| ConvertError::TypeMismatch {
                    field: field.as_str(),
                    expected: "note name",
                    found: format!("string {text:?}"),
                }),
            CellValue::Int(value) => Err(ConvertError::TypeMismatch {
                field: field.as_str(),
                expected: "note name",
                found: format!("integer {value}"),
            }),
        }
    }
}

/// The keyswitch grid of one instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyswitches {
    #[serde(default, skip_serializing_if = "RootOctaves::is_empty")]
    pub root_octaves: RootOctaves,
    pub mapping: Vec<KeyswitchField>,
    pub values: Vec<Vec<CellValue>>,
}

impl RootOctaves {
    fn is_empty(&self) -> bool {
        self.key.is_none() && self.second_key.is_none()
    }
}

impl Keyswitches {
    /// Build the grid from a device record's keyswitch map.
    ///
    /// The column set is inferred from which fields are non-sentinel anywhere
    /// in the map. Key cells are decoded under the settings' reference, their
    /// shared octave moves into `root_octaves`, and colors are replaced by
    /// generated labels registered in `settings.colors`.
    pub fn from_device(config: &DeviceConfig, settings: &mut Settings) -> Result<Keyswitches> {
        let rows = config.ks_rows_in_order()?;

        let mapping: Vec<KeyswitchField> = KeyswitchField::ALL
            .into_iter()
            .filter(|field| rows.iter().any(|entry| !field.cell(entry).is_empty()))
            .collect();

        let mut found_colors: Vec<[u8; 3]> = Vec::new();
        let mut key_octaves: Vec<i32> = Vec::new();
        let mut second_key_octaves: Vec<i32> = Vec::new();

        let mut values: Vec<Vec<CellValue>> = Vec::new();
        for entry in rows {
            let mut row: Vec<CellValue> = Vec::new();
            for field in &mapping {
                let raw = field.cell(entry);
                if raw.is_empty() {
                    continue;
                }

                match field {
                    KeyswitchField::Key | KeyswitchField::SecondKey => {
                        let code = match raw {
                            Field::Int(code) => *code,
                            other => {
                                return Err(ConvertError::MalformedRecord(format!(
                                    "keyswitch field {:?} holds {} instead of a pitch code",
                                    field.device_key(),
                                    other.type_name()
                                )))
                            }
                        };
                        let note = Note::from_code(code, settings.middle_c)?;
                        let octaves = match field {
                            KeyswitchField::Key => &mut key_octaves,
                            _ => &mut second_key_octaves,
                        };
                        if !octaves.contains(&note.octave) {
                            octaves.push(note.octave);
                        }
                        row.push(CellValue::Str(note.name.as_str().to_string()));
                    }

                    KeyswitchField::Color => {
                        let rgb = match raw {
                            Field::Rgb(components) if components.len() == 3 => {
                                let mut rgb = [0u8; 3];
                                for (slot, component) in rgb.iter_mut().zip(components) {
                                    *slot = u8::try_from(*component).map_err(|_| {
                                        ConvertError::MalformedRecord(format!(
                                            "keyswitch color component {component} is outside 0-255"
                                        ))
                                    })?;
                                }
                                rgb
                            }
                            other => {
                                return Err(ConvertError::MalformedRecord(format!(
                                    "keyswitch color holds {} instead of an RGB triple",
                                    other.type_name()
                                )))
                            }
                        };
                        let index = match found_colors.iter().position(|c| *c == rgb) {
                            Some(index) => index,
                            None => {
                                found_colors.push(rgb);
                                found_colors.len() - 1
                            }
                        };
                        row.push(CellValue::Str(format!("Color{index:02}")));
                    }

                    _ => row.push(match raw {
                        Field::Int(value) => CellValue::Int(*value),
                        Field::Str(text) => CellValue::Str(text.clone()),
                        Field::Rgb(components) => {
                            return Err(ConvertError::MalformedRecord(format!(
                                "keyswitch field {:?} holds list {components:?}",
                                field.device_key()
                            )))
                        }
                    }),
                }
            }
            if !row.is_empty() {
                values.push(row);
            }
        }

        let root_octaves = RootOctaves {
            key: single_octave(KeyswitchField::Key, &key_octaves)?,
            second_key: single_octave(KeyswitchField::SecondKey, &second_key_octaves)?,
        };

        for (index, rgb) in found_colors.into_iter().enumerate() {
            settings
                .colors
                .insert(format!("Color{index:02}"), color::format_hex(rgb));
        }

        Ok(Keyswitches {
            root_octaves,
            mapping,
            values,
        })
    }

    /// Project the grid back into device keyswitch rows, keyed `"1"`, `"2"`,
    /// ... in order. Cells absent from a (possibly short) row stay sentinel.
    pub fn to_device(&self, settings: &Settings) -> Result<BTreeMap<String, KeyswitchEntry>> {
        let key_octave = self.required_root_octave(KeyswitchField::Key)?;
        let second_key_octave = self.required_root_octave(KeyswitchField::SecondKey)?;

        let mut out = BTreeMap::new();
        for (row_index, row) in self.values.iter().enumerate() {
            if row.len() > self.mapping.len() {
                return Err(ConvertError::MalformedDocument(format!(
                    "keyswitch row {} has {} values but only {} mapped columns",
                    row_index + 1,
                    row.len(),
                    self.mapping.len()
                )));
            }

            let mut entry = KeyswitchEntry::default();
            for (cell, field) in row.iter().zip(&self.mapping) {
                let projected = match field {
                    KeyswitchField::Key => self.encode_key(cell, *field, key_octave, settings)?,
                    KeyswitchField::SecondKey => {
                        self.encode_key(cell, *field, second_key_octave, settings)?
                    }
                    KeyswitchField::Color => {
                        let label = match cell {
                            CellValue::Str(label) => label,
                            CellValue::Int(value) => {
                                return Err(ConvertError::TypeMismatch {
                                    field: field.as_str(),
                                    expected: "color label",
                                    found: format!("integer {value}"),
                                })
                            }
                        };
                        let hex = settings
                            .colors
                            .get(label)
                            .ok_or_else(|| ConvertError::UnresolvedColor(label.clone()))?;
                        let rgb = color::parse_hex(hex)?;
                        Field::Rgb(rgb.iter().map(|c| *c as i64).collect())
                    }
                    KeyswitchField::Name => match cell {
                        CellValue::Str(text) => Field::Str(text.clone()),
                        CellValue::Int(value) => {
                            return Err(ConvertError::TypeMismatch {
                                field: field.as_str(),
                                expected: "a string",
                                found: format!("integer {value}"),
                            })
                        }
                    },
                    _ => match cell {
                        CellValue::Int(value) => Field::Int(*value),
                        CellValue::Str(text) => {
                            return Err(ConvertError::TypeMismatch {
                                field: field.as_str(),
                                expected: "an integer",
                                found: format!("string {text:?}"),
                            })
                        }
                    },
                };
                *field.cell_mut(&mut entry) = projected;
            }
            out.insert((row_index + 1).to_string(), entry);
        }
        Ok(out)
    }

    fn required_root_octave(&self, field: KeyswitchField) -> Result<Option<i32>> {
        let (configured, name) = match field {
            KeyswitchField::Key => (self.root_octaves.key, "key"),
            KeyswitchField::SecondKey => (self.root_octaves.second_key, "second_key"),
            _ => (None, ""),
        };
        if self.mapping.contains(&field) && configured.is_none() {
            return Err(ConvertError::UndefinedRootOctave(name));
        }
        Ok(configured)
    }

    fn encode_key(
        &self,
        cell: &CellValue,
        field: KeyswitchField,
        root_octave: Option<i32>,
        settings: &Settings,
    ) -> Result<Field> {
        let name = cell.as_note_name(field)?;
        // required_root_octave already ruled out None for mapped key columns
        let octave = root_octave.ok_or(ConvertError::UndefinedRootOctave(field.as_str()))?;
        let note = Note::new(name, octave, Some(settings.middle_c))?;
        Ok(Field::Int(note.to_code()?))
    }
}

fn single_octave(field: KeyswitchField, octaves: &[i32]) -> Result<Option<i32>> {
    match octaves {
        [] => Ok(None),
        [only] => Ok(Some(*only)),
        _ => Err(ConvertError::MultiOctaveKeyswitchSpan {
            field: match field {
                KeyswitchField::Key => "key",
                _ => "second_key",
            },
            octaves: octaves.to_vec(),
        }),
    }
}
