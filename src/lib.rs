// Library exports for Complaint Desk
// This allows integration tests and external code to use its modules

pub mod api;
pub mod config;
pub mod controller;
pub mod db;
pub mod domain;
pub mod error;
pub mod extractors;
pub mod navigation;
pub mod routes;
pub mod session;
pub mod state;
pub mod view;
