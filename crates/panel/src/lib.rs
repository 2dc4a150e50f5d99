//! Hive-scale panel core: the view/edit state record, the controller that
//! drives it against the device service, and the panel options.

pub mod config;
pub mod controller;
pub mod mode;
pub mod state;
pub mod view;

pub use config::{load_options, PanelOptions};
pub use controller::DeviceAnnotationController;
pub use mode::PanelMode;
pub use state::{EditField, PanelState, SaveOutcome, SaveStep, BEGIN_FORMAT};
pub use view::PanelView;
