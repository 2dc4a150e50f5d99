//! Read-only snapshot handed to the rendering layer.

use shared::error::ErrorState;

use crate::{
    config::PanelOptions,
    mode::PanelMode,
    state::{format_begin, EditField, PanelState, SaveStep},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelView {
    /// Configured title followed by the device display name, when loaded.
    pub title: String,
    pub device_loaded: bool,
    pub editing: bool,
    pub saving: bool,
    pub user_description: String,
    pub hives: i64,
    pub description: String,
    pub begin: String,
    pub error: Option<ErrorState>,
    pub mode: PanelMode,
    /// Fields the form exposes; empty outside edit mode.
    pub editable: Vec<EditField>,
}

impl PanelView {
    pub fn new(options: &PanelOptions, state: &PanelState) -> Self {
        let mode = options.mode();
        let title = match state.device.as_ref() {
            Some(device) if !device.device.is_empty() => {
                format!("{} {}", options.title, device.device)
            }
            _ => options.title.clone(),
        };

        Self {
            title: title.trim().to_string(),
            device_loaded: state.has_device(),
            editing: state.editing,
            saving: state.save_step != SaveStep::Idle,
            user_description: state.user_description.clone(),
            hives: state.hives,
            description: state.description.clone(),
            begin: format_begin(&state.begin),
            error: state.error.clone(),
            mode,
            editable: if state.editing {
                mode.editable_fields().to_vec()
            } else {
                Vec::new()
            },
        }
    }

    pub fn can_edit(&self, field: EditField) -> bool {
        self.editable.contains(&field)
    }
}
