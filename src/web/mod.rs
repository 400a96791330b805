//! The web module for handling the Axum API and pages.
//! This file declares the other files in this directory as sub-modules.

pub mod api;
pub mod cors;
pub mod models;
pub mod pages;
pub mod view;
