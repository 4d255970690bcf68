pub mod app_settings;
pub mod app_state;
pub mod forms;
pub mod match_card;
pub mod messages;
pub mod network;
