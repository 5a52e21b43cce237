//! Local persistence for Macrolink: platform paths, the persisted user/profile
//! selection, settings, and the offline profile book.

pub mod json_file;
pub mod paths;
pub mod profiles;
pub mod selection;
pub mod settings;
