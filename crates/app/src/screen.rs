// Terminal screen: renders the UI state and reads commands

use crate::config::AppConfig;
use anyhow::Result;
use bluromatic_core::application::worker::constants::ANDROID_Q_API_LEVEL;
use bluromatic_core::application::BlurViewModel;
use bluromatic_core::domain::{BlurAmount, BlurLevel, BlurUiState};
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};

pub const NEED_NOTIFICATION_PERMISSION: &str = "Need Notification Permission to run this";
pub const NEED_STORAGE_PERMISSION: &str = "Need Storage Permission to run this";

/// Screen commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Select(BlurLevel),
    Start,
    Cancel,
    See,
    Quit,
}

pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim().to_ascii_lowercase();
    if let Ok(n) = line.parse::<i64>() {
        return BlurAmount::options()
            .into_iter()
            .find(|o| i64::from(o.level) == n)
            .map(|o| Command::Select(o.level));
    }
    match line.as_str() {
        "go" | "start" => Some(Command::Start),
        "cancel" => Some(Command::Cancel),
        "see" | "see file" | "open" => Some(Command::See),
        "quit" | "q" | "exit" => Some(Command::Quit),
        _ => None,
    }
}

/// Starting the chain needs notification permission, and storage
/// permission below API 29
pub fn check_permissions(config: &AppConfig) -> std::result::Result<(), &'static str> {
    if !config.notifications_enabled {
        return Err(NEED_NOTIFICATION_PERMISSION);
    }
    if config.api_level < ANDROID_Q_API_LEVEL && !config.storage_permission_granted {
        return Err(NEED_STORAGE_PERMISSION);
    }
    Ok(())
}

pub fn render(state: &BlurUiState, options: &[BlurAmount], selected: BlurLevel) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", "Blur-O-Matic".bold()));
    out.push_str("Select Blur Amount:\n");
    for option in options {
        let mark = if option.level == selected { "(x)" } else { "( )" };
        out.push_str(&format!("  {} {} {}\n", option.level, mark, option.label));
    }

    let actions = match state {
        BlurUiState::Default => format!("[{}]", "Start".green()),
        BlurUiState::Loading => format!("[{}]  {}", "Cancel Work".yellow(), "working...".dimmed()),
        BlurUiState::Complete { output_uri } => format!(
            "[{}]  [{}]  {}",
            "Start".green(),
            "See File".cyan(),
            output_uri
        ),
    };
    out.push_str(&actions);
    out
}

const HELP: &str = "commands: 1/2/3 select level, go, cancel, see, quit";

enum Event {
    StateChanged,
    Input(Option<String>),
    Closed,
}

/// Interactive screen loop on stdin/stdout
pub async fn run_interactive(vm: BlurViewModel, config: &AppConfig) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ui = vm.blur_ui_state();
    let mut selected = BlurLevel::default();

    println!("{}", render(&vm.current_state(), vm.blur_amount(), selected));
    println!("{}", HELP.dimmed());

    loop {
        let event = tokio::select! {
            changed = ui.changed() => match changed {
                Ok(()) => Event::StateChanged,
                Err(_) => Event::Closed,
            },
            line = lines.next_line() => Event::Input(line?),
        };

        match event {
            Event::Closed | Event::Input(None) => break,
            Event::StateChanged => {}
            Event::Input(Some(line)) => match parse_command(&line) {
                Some(Command::Select(level)) => selected = level,
                Some(Command::Start) => match check_permissions(config) {
                    Ok(()) => {
                        vm.apply_blur(selected).await?;
                    }
                    Err(message) => println!("{}", message.red()),
                },
                Some(Command::Cancel) => vm.cancel_work().await?,
                Some(Command::See) => match vm.open_result()? {
                    Some(path) => println!("{} {}", "Output:".bold(), path.display()),
                    None => println!("{}", "No finished image yet".dimmed()),
                },
                Some(Command::Quit) => break,
                None => {
                    println!("{}", HELP.dimmed());
                    continue;
                }
            },
        }

        let state = ui.borrow_and_update().clone();
        println!("\n{}", render(&state, vm.blur_amount(), selected));
    }

    if vm.current_state() == BlurUiState::Loading {
        vm.cancel_work().await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bluromatic_core::domain::ImageLocator;
    use std::path::PathBuf;

    fn config(notifications: bool, storage: bool, api_level: u32) -> AppConfig {
        AppConfig {
            files_dir: PathBuf::from("/tmp/files"),
            pictures_dir: PathBuf::from("/tmp/pictures"),
            media_dir: PathBuf::from("/tmp/media"),
            resources_dir: PathBuf::from("/tmp/res"),
            api_level,
            delay_ms: 0,
            notifications_enabled: notifications,
            storage_permission_granted: storage,
            min_free_storage_mb: 64,
            package_name: "com.example.bluromatic".to_string(),
        }
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(
            parse_command("2"),
            Some(Command::Select(BlurLevel::new(2).unwrap()))
        );
        assert_eq!(parse_command(" GO "), Some(Command::Start));
        assert_eq!(parse_command("cancel"), Some(Command::Cancel));
        assert_eq!(parse_command("see"), Some(Command::See));
        assert_eq!(parse_command("q"), Some(Command::Quit));
        assert_eq!(parse_command("4"), None);
        assert_eq!(parse_command("0"), None);
        assert_eq!(parse_command("blur"), None);
    }

    #[test]
    fn test_permission_gate() {
        assert_eq!(check_permissions(&config(true, true, 33)), Ok(()));
        assert_eq!(
            check_permissions(&config(false, true, 33)),
            Err(NEED_NOTIFICATION_PERMISSION)
        );
        // Storage permission only matters below Q
        assert_eq!(check_permissions(&config(true, false, 33)), Ok(()));
        assert_eq!(
            check_permissions(&config(true, false, 28)),
            Err(NEED_STORAGE_PERMISSION)
        );
    }

    #[test]
    fn test_render_actions_per_state() {
        colored::control::set_override(false);
        let options = BlurAmount::options();
        let selected = BlurLevel::new(3).unwrap();

        let idle = render(&BlurUiState::Default, &options, selected);
        assert!(idle.contains("[Start]"));
        assert!(!idle.contains("See File"));
        assert!(idle.contains("3 (x) The most blurred"));
        assert!(idle.contains("1 ( ) A little blurred"));

        let loading = render(&BlurUiState::Loading, &options, selected);
        assert!(loading.contains("[Cancel Work]"));
        assert!(!loading.contains("[Start]"));

        let done = render(
            &BlurUiState::Complete {
                output_uri: ImageLocator::parse("content://media/external/images/media/1")
                    .unwrap(),
            },
            &options,
            selected,
        );
        assert!(done.contains("[Start]"));
        assert!(done.contains("[See File]"));
    }
}
