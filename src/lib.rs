//! PlanFE — a floor-plan viewer with an interactive layer visibility panel.
//!
//! The library exposes the app state and data source so integration tests
//! can drive the fetch/toggle flow without a window.

#![allow(dead_code)] // API surface kept for future panels and sources

#[macro_use]
pub mod i18n;
#[macro_use]
pub mod logger;

pub mod app;
pub mod assets;
pub mod components;
pub mod plan;
pub mod source;
pub mod theme;
