pub mod capabilities;
pub mod config;
pub mod desktop;
pub mod error;
pub mod events;
pub mod geometry;
pub mod gesture;
pub mod monitor;
pub mod service;
pub mod timers;

pub use capabilities::{
    Capabilities, ClipboardAccess, GlobalInputSource, InputSink, KeystrokeSynthesizer,
    PopupSurface, ScreenInfo, SelectionGate, TranslationConsumer,
};
pub use config::SelectionPolicy;
pub use error::MonitorError;
pub use events::{InputEvent, KeyCode, Modifiers, MouseButton, COPY_MODIFIER};
pub use geometry::{popup_bounds, Point, Rect};
pub use gesture::Gesture;
pub use monitor::{DismissReason, MonitorState, PopupHandle, SelectionMonitor, SelectionTimer};
pub use service::{MonitorHandle, MonitorService};
