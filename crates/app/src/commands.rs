// Subcommand handlers

use crate::container::AppContainer;
use crate::screen::{self, check_permissions};
use anyhow::{bail, Context, Result};
use bluromatic_core::application::{
    cancellation_channel, BlurViewModel, BluromaticRepository, CleanupWorker, EnqueueOutcome,
    Worker, WorkerParameters,
};
use bluromatic_core::domain::{
    BlurAmount, BlurLevel, ChainSnapshot, ChainStatus, ImageLocator, WorkData, WorkResult,
    WorkState,
};
use colored::Colorize;
use std::sync::Arc;
use tracing::info;

/// Run the blur chain once and follow it until it finishes
pub async fn run(container: &AppContainer, blur_level: i64) -> Result<()> {
    let blur_level = BlurLevel::new(blur_level)?;
    if let Err(message) = check_permissions(&container.config) {
        bail!(message);
    }

    let repository = &container.repository;
    let mut snapshots = repository.output_work_info()?;
    let run = match repository.apply_blur(blur_level).await? {
        EnqueueOutcome::Started { run } => run,
        EnqueueOutcome::Kept { run } => {
            println!("{}", "A chain is already running; following it".yellow());
            run
        }
    };
    println!(
        "{} blur level {} ({})",
        "Started".green().bold(),
        blur_level,
        "Ctrl+C to cancel".dimmed()
    );

    let mut printed: Vec<WorkState> = Vec::new();
    let mut cancelling = false;
    loop {
        let snapshot = snapshots.borrow_and_update().clone();
        if snapshot.run == run {
            print_transitions(&snapshot, &mut printed);
            if snapshot.status().is_finished() {
                return report(&snapshot.status());
            }
        } else if snapshot.run > run {
            bail!("Run {run} was replaced by run {}", snapshot.run);
        }

        tokio::select! {
            changed = snapshots.changed() => changed.context("Work manager stopped")?,
            signal = tokio::signal::ctrl_c(), if !cancelling => {
                signal?;
                println!("{}", "Cancelling...".yellow());
                cancelling = true;
                repository.cancel_work().await?;
            }
        }
    }
}

fn print_transitions(snapshot: &ChainSnapshot, printed: &mut Vec<WorkState>) {
    printed.resize(snapshot.stages.len(), WorkState::Enqueued);
    for (info, last) in snapshot.stages.iter().zip(printed.iter_mut()) {
        if info.state != *last {
            println!("  {:<8} {}", info.stage, colorize_state(info.state));
            *last = info.state;
        }
    }
}

fn colorize_state(state: WorkState) -> colored::ColoredString {
    let label = state.to_string();
    match state {
        WorkState::Succeeded => label.green(),
        WorkState::Failed => label.red(),
        WorkState::Cancelled => label.yellow(),
        WorkState::Blocked => label.magenta(),
        WorkState::Enqueued | WorkState::Running => label.normal(),
    }
}

fn report(status: &ChainStatus) -> Result<()> {
    match status {
        ChainStatus::Succeeded { output: Some(uri) } => {
            println!("{} {}", "Saved:".green().bold(), uri);
            Ok(())
        }
        ChainStatus::Succeeded { output: None } => {
            println!("{}", "Finished without an output image".yellow());
            Ok(())
        }
        ChainStatus::Cancelled => {
            println!("{}", "Cancelled".yellow());
            Ok(())
        }
        ChainStatus::Failed => bail!("Blur chain failed (see log for the failing stage)"),
        ChainStatus::Idle | ChainStatus::Running => bail!("Chain ended in state {status:?}"),
    }
}

/// Interactive screen
pub async fn interactive(container: &AppContainer) -> Result<()> {
    let repository: Arc<dyn BluromaticRepository> = container.repository.clone();
    let vm = BlurViewModel::new(repository)?;
    screen::run_interactive(vm, &container.config).await
}

/// Run the cleanup stage on its own
pub async fn cleanup(container: &AppContainer) -> Result<()> {
    let worker = CleanupWorker::new(container.env.clone());
    let (_cancel, cancellation) = cancellation_channel();
    let params = WorkerParameters {
        id: container.env.id_provider.generate_id(),
        input: WorkData::new(),
        cancellation,
    };

    match worker.do_work(params).await {
        WorkResult::Success(_) => {
            println!("{}", "Temporary files removed".green());
            Ok(())
        }
        WorkResult::Failure => bail!("Cleanup failed"),
    }
}

/// Resolve a locator to a local path
pub fn open(container: &AppContainer, locator: &str) -> Result<()> {
    let locator = ImageLocator::parse(locator)?;
    let path = container.repository.resolve_output(&locator)?;
    info!(locator = %locator, path = %path.display(), "Locator resolved");
    println!("{}", path.display());
    Ok(())
}

pub fn levels() {
    for option in BlurAmount::options() {
        println!("{}  {}", option.level.to_string().bold(), option.label);
    }
}
