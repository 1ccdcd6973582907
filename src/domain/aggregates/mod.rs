//! Aggregates module
pub mod bundle;
pub mod settings;

pub use bundle::{Bundle, BundleComponent, BundleComponentInput, BundleDefaults, BundleInput, BundleOffer, BundleParent, BundleStatus, BundleType};
pub use settings::{AppSettings, SettingsInput};
