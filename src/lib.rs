//! osrbrowser — a multi-tab desktop shell embedding an off-screen-rendered
//! web engine, with an AI chat panel docked beside the page.
//!
//! This library crate exposes all modules for use by the binary and
//! integration tests. The `gui` feature gates the window shell; everything
//! else (frame pipeline, tab registry, controller, engine boundary) builds
//! headless.

pub mod app;
pub mod controller;
pub mod engine;
pub mod managers;
pub mod platform;
pub mod services;
pub mod types;

#[cfg(feature = "gui")]
pub mod ui;
