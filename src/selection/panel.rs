use crate::types::PanelVisibility;

/// Flip the parameter panel. Nothing but a toggle activation changes it.
pub fn toggle(current: PanelVisibility) -> PanelVisibility {
    match current {
        PanelVisibility::Collapsed => PanelVisibility::Expanded,
        PanelVisibility::Expanded => PanelVisibility::Collapsed,
    }
}
