//! XY2APK Converter
//!
//! This library provides the core functionality for the xy2apk service: an
//! upload-validate-process-persist pipeline that accepts an HTML/ZIP bundle
//! plus an optional icon and produces a simulated APK artifact with a
//! metadata manifest under a per-job directory.

pub mod app_state;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
