//! mouse-remap: turn extra mouse buttons into keyboard shortcuts.
//!
//! Reads button presses straight from evdev devices and replays a mapped
//! shortcut through `ydotool`, so it works under any Wayland compositor.
//!
//! ```text
//! supervisor ─ discover (once) ─┬─ listener(event3) ─┐
//!                               ├─ listener(event5) ─┼─ dispatch ─ ydotool key ...
//!                               └─ ...              ─┘
//! ```

pub mod config;
pub mod device;
pub mod injector;
pub mod listener;
pub mod logger;
pub mod mapping;
pub mod supervisor;
