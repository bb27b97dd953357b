//! # UI Common Components
//!
//! Colors, frames and label helpers shared by the binding window.
//!
//! ## Why This Module Exists
//!
//! The window renders the same few visual elements in several places: the
//! framed notice box, the highlighted control that is listening for input
//! and the control names in the grid. Keeping them here gives the window one
//! palette and one naming scheme.
//!
//! ## Design Rationale
//!
//! ### Constant Palette
//! [`UiColors`] holds associated constants instead of a runtime theme. The
//! window always uses egui's dark theme, and the constants are picked to
//! read on it.
//!
//! ### Labels From Mappings
//! [`control_label`] derives the text from the [`ButtonMapping`] itself. The
//! two stick groups share one config name across two slots, so their slots
//! are spelled out as directions. Other slot controls show the slot number.

use crate::dialog::NoticeLevel;
use crate::mapping::binding::{ButtonMapping, Parameter};
use eframe::egui::{Color32, Frame, Stroke};

/// Dark theme palette
pub struct UiColors;

impl UiColors {
    pub const INNER_BG: Color32 = Color32::from_rgb(25, 25, 25);

    pub const BORDER: Color32 = Color32::from_rgb(60, 60, 60);

    /// Control currently listening for input
    pub const ACTIVE: Color32 = Color32::from_rgb(50, 200, 20);

    pub const ERROR: Color32 = Color32::from_rgb(200, 50, 20);

    pub const WARNING: Color32 = Color32::from_rgb(220, 170, 30);
}

pub fn create_frame(bg_color: Color32, border_color: Color32) -> Frame {
    Frame::new()
        .stroke(Stroke::new(1.0, border_color))
        .fill(bg_color)
        .inner_margin(4)
        .outer_margin(2)
}

pub fn notice_color(level: NoticeLevel) -> Color32 {
    match level {
        NoticeLevel::Error => UiColors::ERROR,
        NoticeLevel::Warning => UiColors::WARNING,
    }
}

/// Human readable name of a control.
///
/// Stick controls share one config name, so the slot is spelled out as the
/// direction it stands for.
pub fn control_label(mapping: &ButtonMapping) -> String {
    match (mapping.config_name, mapping.parameter) {
        ("X Axis", Parameter::Slot(0)) => "Stick Left".to_string(),
        ("X Axis", Parameter::Slot(1)) => "Stick Right".to_string(),
        ("Y Axis", Parameter::Slot(0)) => "Stick Up".to_string(),
        ("Y Axis", Parameter::Slot(1)) => "Stick Down".to_string(),
        (name, Parameter::Slot(slot)) => format!("{name} ({slot})"),
        (name, Parameter::Whole) => name.to_string(),
    }
}
