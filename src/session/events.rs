use serde::Deserialize;
use tracing::debug;

use super::SessionError;
use crate::selection::{gate, toggle};
use crate::types::{
    PanelVisibility, Picker, PickMode, Selections, StrategyName, WidgetEnablement,
};

/// Input changes posted by the dashboard page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    PanelToggled,
    PickModeChanged {
        #[serde(default)]
        value: Option<serde_json::Value>,
    },
    SymbolsSelected { values: Vec<String> },
    SectorsSelected { values: Vec<String> },
    CountriesSelected { values: Vec<String> },
    StrategySelected {
        #[serde(default)]
        strategy: Option<String>,
    },
}

impl UiEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            UiEvent::PanelToggled => "panel_toggled",
            UiEvent::PickModeChanged { .. } => "pick_mode_changed",
            UiEvent::SymbolsSelected { .. } => "symbols_selected",
            UiEvent::SectorsSelected { .. } => "sectors_selected",
            UiEvent::CountriesSelected { .. } => "countries_selected",
            UiEvent::StrategySelected { .. } => "strategy_selected",
        }
    }
}

/// Form state owned by one browser session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub panel: PanelVisibility,
    pub pick_mode: Option<PickMode>,
    pub enablement: WidgetEnablement,
    pub selections: Selections,
    pub strategy: Option<StrategyName>,
}

/// Reacts to a subset of UI events by updating session state.
pub trait UiEventHandler: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns `Ok(true)` when the event was consumed.
    fn handle(&self, state: &mut SessionState, event: &UiEvent) -> Result<bool, SessionError>;
}

pub struct PanelToggleHandler;

impl UiEventHandler for PanelToggleHandler {
    fn name(&self) -> &'static str {
        "panel"
    }

    fn handle(&self, state: &mut SessionState, event: &UiEvent) -> Result<bool, SessionError> {
        if !matches!(event, UiEvent::PanelToggled) {
            return Ok(false);
        }
        state.panel = toggle(state.panel);
        Ok(true)
    }
}

pub struct PickModeHandler;

impl UiEventHandler for PickModeHandler {
    fn name(&self) -> &'static str {
        "pick_mode"
    }

    fn handle(&self, state: &mut SessionState, event: &UiEvent) -> Result<bool, SessionError> {
        let UiEvent::PickModeChanged { value } = event else {
            return Ok(false);
        };
        state.pick_mode = PickMode::from_json(value.as_ref());
        state.enablement = gate(state.pick_mode);
        debug!("Pick mode {:?} disables pickers {:?}", state.pick_mode, state.enablement.as_tuple());
        Ok(true)
    }
}

pub struct SelectionHandler;

impl UiEventHandler for SelectionHandler {
    fn name(&self) -> &'static str {
        "selection"
    }

    fn handle(&self, state: &mut SessionState, event: &UiEvent) -> Result<bool, SessionError> {
        match event {
            UiEvent::SymbolsSelected { values } => state.selections.set(Picker::Symbols, values.clone()),
            UiEvent::SectorsSelected { values } => state.selections.set(Picker::Sectors, values.clone()),
            UiEvent::CountriesSelected { values } => state.selections.set(Picker::Countries, values.clone()),
            UiEvent::StrategySelected { strategy } => {
                state.strategy = match strategy.as_deref() {
                    None | Some("") => None,
                    Some(name) => Some(
                        name.parse::<StrategyName>()
                            .map_err(|_| SessionError::UnknownStrategy(name.to_string()))?,
                    ),
                };
            }
            _ => return Ok(false),
        }
        Ok(true)
    }
}

/// Routes UI events to the registered handlers.
pub struct EventBus {
    handlers: Vec<Box<dyn UiEventHandler>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { handlers: Vec::new() }
    }

    pub fn with_default_handlers() -> Self {
        let mut bus = Self::new();
        bus.register(Box::new(PanelToggleHandler));
        bus.register(Box::new(PickModeHandler));
        bus.register(Box::new(SelectionHandler));
        bus
    }

    pub fn register(&mut self, handler: Box<dyn UiEventHandler>) {
        self.handlers.push(handler);
    }

    /// Apply an event. On error the state is left untouched.
    pub fn dispatch(&self, state: &mut SessionState, event: &UiEvent) -> Result<(), SessionError> {
        let mut next = state.clone();
        let mut handled = false;

        for handler in &self.handlers {
            if handler.handle(&mut next, event)? {
                debug!("UI event {} handled by {}", event.kind(), handler.name());
                handled = true;
            }
        }

        if !handled {
            debug!("UI event {} had no handler", event.kind());
        }

        *state = next;
        Ok(())
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_default_handlers()
    }
}
