// Bluromatic Infrastructure - System Adapters
// Implements: SystemProbe, Notifier

pub mod notifier;
pub mod system_probe_impl;

pub use notifier::{Notification, StatusNotifier};
pub use system_probe_impl::SystemProbeImpl;
