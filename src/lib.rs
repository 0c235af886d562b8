pub mod auth;
pub mod browser;
pub mod clock;
pub mod config;
pub mod convert;
pub mod credentials;
pub mod duration;
pub mod error;
pub mod form;
pub mod locator;
pub mod models;
pub mod navigation;
pub mod page;
pub mod pipeline;
pub mod runner;
pub mod session;
pub mod wait;
