//! Plain-text rendering of a `PanelView`.

use std::fmt;

use panel::{EditField, PanelView};

/// Display adapter printing a `PanelView` as a text panel.
pub struct PanelText<'a>(pub &'a PanelView);

impl fmt::Display for PanelText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = self.0;
        writeln!(f, "== {} ==", view.title)?;

        if !view.device_loaded {
            writeln!(f, "(no device loaded)")?;
        } else if view.editing {
            writeln!(f, "[editing, mode {}]", view.mode)?;
            for (field, value) in [
                (EditField::Hives, view.hives.to_string()),
                (EditField::Description, view.description.clone()),
                (EditField::UserDescription, view.user_description.clone()),
                (EditField::Begin, view.begin.clone()),
            ] {
                let marker = if view.can_edit(field) { "*" } else { " " };
                writeln!(f, "{marker} {:<17} {value}", format!("{field}:"))?;
            }
        } else {
            writeln!(f, "Hives:            {}", view.hives)?;
            writeln!(f, "Notes:            {}", view.description)?;
            writeln!(f, "User description: {}", view.user_description)?;
        }

        if let Some(error) = &view.error {
            writeln!(f, "[error] {}", error.summary())?;
        }
        Ok(())
    }
}

pub fn render(view: &PanelView) -> String {
    PanelText(view).to_string()
}
