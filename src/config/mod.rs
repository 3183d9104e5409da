mod settings;

pub use settings::{ListingSettings, SETTINGS_FILE_NAME, Settings, SettingsError, StoreSettings};
