pub mod app_settings;
pub mod app_state;
pub mod dashboard;
pub mod membership;
pub mod messages;
pub mod navigation;
pub mod network;
pub mod session;
