//! The panel's state record and its pure transitions. The controller owns one
//! `PanelState` and is the only writer; the rendering layer reads it.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use shared::{
    domain::{Annotation, Device},
    error::ErrorState,
};

/// Display and input format of the annotation start time (UTC).
pub const BEGIN_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditField {
    UserDescription,
    Hives,
    Description,
    Begin,
}

impl fmt::Display for EditField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::UserDescription => "user description",
            Self::Hives => "hives",
            Self::Description => "notes",
            Self::Begin => "begin",
        })
    }
}

/// Where a save currently stands. Back at `Idle` once it finishes either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveStep {
    #[default]
    Idle,
    CreatingAnnotation,
    UpdatingDevice,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// `step` is the step that failed; `Idle` means nothing was sent.
    Failed { step: SaveStep, error: ErrorState },
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelState {
    pub device_name: Option<String>,
    pub device: Option<Device>,
    pub user_description: String,
    pub hives: i64,
    pub description: String,
    pub begin: DateTime<Utc>,
    pub editing: bool,
    pub error: Option<ErrorState>,
    pub save_step: SaveStep,
}

impl PanelState {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            device_name: None,
            device: None,
            user_description: String::new(),
            hives: 0,
            description: String::new(),
            begin: now,
            editing: false,
            error: None,
            save_step: SaveStep::Idle,
        }
    }

    pub fn has_device(&self) -> bool {
        self.device.is_some()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn fail(&mut self, error: ErrorState) {
        self.error = Some(error);
    }

    /// Replaces the cached device and re-seeds the edit buffer from it.
    pub fn apply_device(&mut self, device: Device) {
        self.device = Some(device);
        self.seed_from_device();
    }

    /// Copies user description, hive count and notes from the cached device;
    /// without an annotation the count is 0 and the notes are empty.
    pub fn seed_from_device(&mut self) {
        let device = self.device.as_ref();
        let latest = device.and_then(Device::latest_annotation);

        self.user_description = device
            .map(|device| device.user_description().to_string())
            .unwrap_or_default();
        self.hives = latest.map(Annotation::hives).unwrap_or(0);
        self.description = latest
            .map(|annotation| annotation.description.clone())
            .unwrap_or_default();
    }

    pub fn enter_edit_mode(&mut self, now: DateTime<Utc>) {
        self.seed_from_device();
        self.begin = now;
        self.editing = true;
    }

    pub fn exit_edit_mode(&mut self) {
        self.editing = false;
    }

    /// Applies raw operator input to one buffer field. Input that does not
    /// coerce (a non-numeric hive count, a malformed begin time) is dropped.
    pub fn update_field(&mut self, field: EditField, raw: &str) {
        match field {
            EditField::UserDescription => self.user_description = raw.to_string(),
            EditField::Description => self.description = raw.to_string(),
            EditField::Hives => {
                if let Some(hives) = coerce_hives(raw) {
                    self.hives = hives;
                }
            }
            EditField::Begin => {
                if let Some(begin) = parse_begin(raw) {
                    self.begin = begin;
                }
            }
        }
    }

    pub fn begin_save(&mut self) {
        self.clear_error();
        self.save_step = SaveStep::CreatingAnnotation;
    }

    /// Step one done: the created annotation becomes the new baseline and the
    /// newest entry of the cached device.
    pub fn apply_created_annotation(&mut self, annotation: Annotation) {
        self.hives = annotation.hives();
        self.description = annotation.description.clone();
        if let Some(device) = self.device.as_mut() {
            device.annotations.insert(0, annotation);
        }
        self.save_step = SaveStep::UpdatingDevice;
    }

    /// Step two done: the save is complete.
    pub fn apply_updated_device(&mut self, update: Device) {
        let device = match self.device.as_ref() {
            Some(cached) => cached.merge_update(update),
            None => update,
        };
        self.user_description = device.user_description().to_string();
        self.device = Some(device);
        self.save_step = SaveStep::Idle;
        self.editing = false;
    }

    /// Ends a save attempt at `step`, leaving the buffer and edit mode alone.
    pub fn abort_save(&mut self, error: ErrorState) -> SaveOutcome {
        let step = self.save_step;
        self.error = Some(error.clone());
        self.save_step = SaveStep::Idle;
        SaveOutcome::Failed { step, error }
    }
}

/// Numeric coercion of the hive-count input: blank is 0, fractions truncate
/// toward zero, non-numbers yield `None`. Negative counts pass through.
pub fn coerce_hives(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0);
    }
    let value: f64 = trimmed.parse().ok()?;
    value.is_finite().then(|| value.trunc() as i64)
}

pub fn parse_begin(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw.trim(), BEGIN_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

pub fn format_begin(begin: &DateTime<Utc>) -> String {
    begin.format(BEGIN_FORMAT).to_string()
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
