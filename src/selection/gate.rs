use crate::types::{PickMode, WidgetEnablement};

/// Which pickers are disabled for a pick mode.
///
/// Modes 1-3 enable exactly one picker. The default mode and "nothing chosen"
/// disable all three.
pub fn gate(mode: Option<PickMode>) -> WidgetEnablement {
    match mode {
        Some(PickMode::BySymbol) => WidgetEnablement::new(false, true, true),
        Some(PickMode::BySector) => WidgetEnablement::new(true, false, true),
        Some(PickMode::ByCountry) => WidgetEnablement::new(true, true, false),
        Some(PickMode::Default) | None => WidgetEnablement::ALL_DISABLED,
    }
}
