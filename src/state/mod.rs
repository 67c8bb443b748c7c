pub mod app_settings;
pub mod app_state;

pub use app_settings::AppSettings;
pub use app_state::AppState;
