// Notifier Port - user-visible status notifications

/// Posts a status notification
pub trait Notifier: Send + Sync {
    /// Show `message` to the user. Never fails; adapters log problems.
    fn make_status_notification(&self, message: &str);
}

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Records every posted message
    #[derive(Default)]
    pub struct RecordingNotifier {
        messages: Mutex<Vec<String>>,
    }

    impl RecordingNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn messages(&self) -> Vec<String> {
            self.messages.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn make_status_notification(&self, message: &str) {
            self.messages.lock().unwrap().push(message.to_string());
        }
    }
}
