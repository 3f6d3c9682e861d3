//! Data model layer
//!
//! `device` is the flat record the virtual-instrument host reads; `root`,
//! `settings` and `keyswitches` form the hierarchical document; `note` is the
//! pitch representation shared by both sides.

pub mod device;
pub mod keyswitches;
pub mod note;
pub mod root;
pub mod settings;

pub use device::DeviceConfig;
pub use keyswitches::Keyswitches;
pub use note::{MiddleC, Note, NoteName};
pub use root::{DeviceConfigFile, Instrument, InstrumentGroup, Product, Root};
pub use settings::{Settings, SettingsLocation};
