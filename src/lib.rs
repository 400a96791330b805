//! spool-scanner: assign scanned filament spools to OctoPrint printers,
//! backed by a Spoolman inventory.

pub mod config;
pub mod octoprint;
pub mod spoolman;
pub mod upstream;
pub mod web;
