//! Bidirectional converter between flat KSEM device configuration records
//! (JSON) and a hierarchical, human-editable document format (YAML).
//!
//! The document groups instruments under products and instrument groups,
//! factors shared settings out into a cascading [`Settings`] hierarchy, and
//! stores keyswitch tables as compact column-mapped grids with pitches
//! written as note names instead of raw codes.
//!
//! Most uses go through [`api`]:
//!
//! - [`api::import`] lifts a device record into a single-instrument document
//! - [`api::export`] flattens a document back into one record per instrument
//!
//! The model types underneath ([`Root`], [`DeviceConfig`], [`Note`], ...) are
//! public for programs that need to build or inspect documents directly.

pub mod api;
pub mod error;
pub mod models;
pub mod utils;

pub use error::{ConvertError, Result};
pub use models::device::DeviceConfig;
pub use models::note::{MiddleC, Note, NoteName};
pub use models::root::{DeviceConfigFile, Root};
pub use models::settings::{Settings, SettingsLocation};
