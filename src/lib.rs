//! BelloTreno: real-time Italian train schedules on top of the viaggiatreno
//! API, normalized for display.

pub mod bt_announcements;
pub mod bt_api;
pub mod bt_board;
pub mod bt_catalog;
pub mod bt_config;
pub mod bt_controllers;
pub mod bt_error;
pub mod bt_i18n;
pub mod bt_models;
pub mod bt_navigation;
pub mod bt_recent;
pub mod bt_search;
pub mod bt_state;
pub mod bt_status;
pub mod bt_store;
pub mod bt_timeline;
pub mod bt_views;
