pub mod dashboard_panel;
pub mod join_button;
