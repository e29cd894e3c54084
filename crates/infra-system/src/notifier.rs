// Status notifications on the terminal

use bluromatic_core::application::worker::constants::{
    CHANNEL_ID, NOTIFICATION_ID, NOTIFICATION_TITLE, VERBOSE_NOTIFICATION_CHANNEL_DESCRIPTION,
    VERBOSE_NOTIFICATION_CHANNEL_NAME,
};
use bluromatic_core::port::Notifier;
use colored::Colorize;
use std::sync::{Mutex, OnceLock};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
struct NotificationChannel {
    id: &'static str,
    name: &'static str,
    description: &'static str,
}

/// A posted notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u32,
    pub channel_id: String,
    pub title: String,
    pub text: String,
}

/// Notifier for the verbose work channel
///
/// The channel is registered on the first post. Without permission nothing
/// is posted and a warning is logged instead.
pub struct StatusNotifier {
    permission_granted: bool,
    echo: bool,
    channel: OnceLock<NotificationChannel>,
    posted: Mutex<Vec<Notification>>,
}

impl StatusNotifier {
    pub fn new(permission_granted: bool) -> Self {
        Self {
            permission_granted,
            echo: true,
            channel: OnceLock::new(),
            posted: Mutex::new(Vec::new()),
        }
    }

    /// Print posted notifications to stderr (default on)
    pub fn with_terminal_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn permission_granted(&self) -> bool {
        self.permission_granted
    }

    pub fn channel_created(&self) -> bool {
        self.channel.get().is_some()
    }

    pub fn posted(&self) -> Vec<Notification> {
        match self.posted.lock() {
            Ok(posted) => posted.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn channel(&self) -> &NotificationChannel {
        self.channel.get_or_init(|| {
            info!(
                channel_id = CHANNEL_ID,
                name = VERBOSE_NOTIFICATION_CHANNEL_NAME,
                description = VERBOSE_NOTIFICATION_CHANNEL_DESCRIPTION,
                "Notification channel created"
            );
            NotificationChannel {
                id: CHANNEL_ID,
                name: VERBOSE_NOTIFICATION_CHANNEL_NAME,
                description: VERBOSE_NOTIFICATION_CHANNEL_DESCRIPTION,
            }
        })
    }
}

impl Notifier for StatusNotifier {
    fn make_status_notification(&self, message: &str) {
        let channel = self.channel();

        if !self.permission_granted {
            warn!(text = message, "Permission required to send notification");
            return;
        }

        let notification = Notification {
            id: NOTIFICATION_ID,
            channel_id: channel.id.to_string(),
            title: NOTIFICATION_TITLE.to_string(),
            text: message.to_string(),
        };

        info!(
            notification_id = notification.id,
            channel_id = %notification.channel_id,
            channel_name = channel.name,
            channel_description = channel.description,
            title = %notification.title,
            text = %notification.text,
            "Status notification"
        );
        if self.echo {
            eprintln!("{} {}", format!("[{}]", NOTIFICATION_TITLE).cyan().bold(), message);
        }

        match self.posted.lock() {
            Ok(mut posted) => posted.push(notification),
            Err(poisoned) => poisoned.into_inner().push(notification),
        }
    }
}
