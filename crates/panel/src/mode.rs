use std::fmt;

use crate::state::EditField;

/// Which fields the operator may change while editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelMode {
    #[default]
    EditAll,
    UserDescriptionOnly,
    HivesOnly,
    NotesOnly,
}

impl PanelMode {
    /// Maps the configured integer; anything outside 0..=3 is `EditAll`.
    pub fn from_index(index: i64) -> Self {
        match index {
            1 => Self::UserDescriptionOnly,
            2 => Self::HivesOnly,
            3 => Self::NotesOnly,
            _ => Self::EditAll,
        }
    }

    pub fn index(self) -> i64 {
        match self {
            Self::EditAll => 0,
            Self::UserDescriptionOnly => 1,
            Self::HivesOnly => 2,
            Self::NotesOnly => 3,
        }
    }

    pub fn editable_fields(self) -> &'static [EditField] {
        match self {
            Self::EditAll => &[
                EditField::UserDescription,
                EditField::Hives,
                EditField::Description,
                EditField::Begin,
            ],
            Self::UserDescriptionOnly => &[EditField::UserDescription],
            Self::HivesOnly => &[EditField::Hives],
            Self::NotesOnly => &[EditField::Description],
        }
    }

    pub fn allows(self, field: EditField) -> bool {
        self.editable_fields().contains(&field)
    }
}

impl fmt::Display for PanelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::EditAll => "edit all",
            Self::UserDescriptionOnly => "scale description only",
            Self::HivesOnly => "hive count only",
            Self::NotesOnly => "notes only",
        };
        write!(f, "{} ({label})", self.index())
    }
}
