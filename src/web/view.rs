//! Reshapes upstream records into the flat views the selection page renders.

use crate::config::Printer;
use crate::octoprint::PrinterStatus;
use crate::spoolman::Spool;
use crate::web::models::{CurrentSpool, PrinterView, SpoolView};

/// Swatch color used when Spoolman has no color for the filament.
pub const DEFAULT_COLOR: &str = "#888888";

/// Prefix a `#` when missing; empty input falls back to [`DEFAULT_COLOR`].
pub fn normalize_color(color_hex: &str) -> String {
    let color = color_hex.trim();
    if color.is_empty() {
        DEFAULT_COLOR.to_string()
    } else if color.starts_with('#') {
        color.to_string()
    } else {
        format!("#{}", color)
    }
}

/// Human-readable spool name.
///
/// A filament name wins, suffixed with the material when known
/// (`"Galaxy Black | PETG"`). Without a name, vendor and material are joined
/// (`"Acme - PLA"`). With nothing to go on the spool id is used.
pub fn display_name(name: &str, material: &str, vendor: &str, spool_id: &str) -> String {
    let (name, material, vendor) = (name.trim(), material.trim(), vendor.trim());
    if !name.is_empty() {
        return if material.is_empty() {
            name.to_string()
        } else {
            format!("{} | {}", name, material)
        };
    }
    match (vendor.is_empty(), material.is_empty()) {
        (false, false) => format!("{} - {}", vendor, material),
        (false, true) => vendor.to_string(),
        (true, false) => material.to_string(),
        (true, true) => format!("Spool {}", spool_id),
    }
}

fn spool_name(spool_id: &str, spool: &Spool) -> String {
    let filament = &spool.filament;
    display_name(&filament.name, &filament.material, &filament.vendor.name, spool_id)
}

pub fn spool_view(spool_id: &str, spool: &Spool) -> SpoolView {
    let color = normalize_color(&spool.filament.color_hex);
    SpoolView {
        id: spool_id.to_string(),
        name: spool_name(spool_id, spool),
        material: spool.filament.material.clone(),
        color: color.clone(),
        color_hex: color,
        vendor: spool.filament.vendor.name.clone(),
        weight: spool.initial_weight,
        used: spool.used_weight,
        // Not clamped: over-use shows up as a negative remainder.
        remaining: spool.initial_weight - spool.used_weight,
        filament_weight: spool.filament.weight,
    }
}

pub fn current_spool(spool_id: &str, spool: &Spool) -> CurrentSpool {
    CurrentSpool {
        id: spool_id.to_string(),
        name: spool_name(spool_id, spool),
        material: spool.filament.material.clone(),
        color: normalize_color(&spool.filament.color_hex),
    }
}

pub fn printer_view(printer: &Printer, status: PrinterStatus, current: Option<CurrentSpool>) -> PrinterView {
    PrinterView {
        id: printer.id.clone(),
        name: printer.name.clone(),
        status,
        url: printer.octoprint_url.clone(),
        current_spool: current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spoolman::{Filament, Vendor};

    fn spool(name: &str, material: &str, vendor: &str, color: &str, initial: f64, used: f64) -> Spool {
        Spool {
            id: 7,
            initial_weight: initial,
            used_weight: used,
            archived: false,
            filament: Filament {
                name: name.to_string(),
                material: material.to_string(),
                color_hex: color.to_string(),
                weight: 1000.0,
                vendor: Vendor { name: vendor.to_string() },
            },
        }
    }

    #[test]
    fn test_normalize_color() {
        assert_eq!(normalize_color("ABCDEF"), "#ABCDEF");
        assert_eq!(normalize_color("#abcdef"), "#abcdef");
        assert_eq!(normalize_color(""), DEFAULT_COLOR);
        assert_eq!(normalize_color("  "), DEFAULT_COLOR);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("", "PLA", "Acme", "1"), "Acme - PLA");
        assert_eq!(display_name("Galaxy Black", "PETG", "Acme", "1"), "Galaxy Black | PETG");
        assert_eq!(display_name("Galaxy Black", "", "Acme", "1"), "Galaxy Black");
        assert_eq!(display_name("", "PLA", "", "1"), "PLA");
        assert_eq!(display_name("", "", "Acme", "1"), "Acme");
        assert_eq!(display_name("", "", "", "12"), "Spool 12");
    }

    #[test]
    fn test_spool_view() {
        let view = spool_view("7", &spool("", "PLA", "Acme", "ABCDEF", 1000.0, 250.0));
        assert_eq!(view.id, "7");
        assert_eq!(view.name, "Acme - PLA");
        assert_eq!(view.color, "#ABCDEF");
        assert_eq!(view.color_hex, "#ABCDEF");
        assert_eq!(view.vendor, "Acme");
        assert_eq!(view.weight, 1000.0);
        assert_eq!(view.used, 250.0);
        assert_eq!(view.remaining, 750.0);
        assert_eq!(view.filament_weight, 1000.0);
    }

    #[test]
    fn test_remaining_not_clamped() {
        let view = spool_view("7", &spool("", "PLA", "", "", 100.0, 150.0));
        assert_eq!(view.remaining, -50.0);
        assert_eq!(view.color, DEFAULT_COLOR);
    }

    #[test]
    fn test_current_spool() {
        let summary = current_spool("7", &spool("Galaxy Black", "PETG", "Acme", "1A1A1A", 1000.0, 0.0));
        assert_eq!(
            summary,
            CurrentSpool {
                id: "7".to_string(),
                name: "Galaxy Black | PETG".to_string(),
                material: "PETG".to_string(),
                color: "#1A1A1A".to_string(),
            }
        );
    }

    #[test]
    fn test_printer_view() {
        let printer = Printer {
            id: "printer-2".to_string(),
            name: "Garage".to_string(),
            octoprint_url: "http://garage.local".to_string(),
            api_key: "k".to_string(),
        };
        let view = printer_view(&printer, PrinterStatus::Printing, None);
        assert_eq!(view.id, "printer-2");
        assert_eq!(view.url, "http://garage.local");
        assert_eq!(view.status, PrinterStatus::Printing);
        assert!(view.current_spool.is_none());
    }
}
