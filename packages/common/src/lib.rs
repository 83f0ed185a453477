pub mod event;
pub mod lifecycle;
pub mod role;
pub mod theme;

pub use event::LifecycleEvent;
pub use lifecycle::{HackathonStatus, LifecyclePhase, Timeline};
pub use role::Role;
pub use theme::Theme;
