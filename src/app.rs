use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::arbitration::PrimaryLaunch;
use crate::command::CommandString;
use crate::relay::MessageIds;
use crate::settings::{Settings, SettingsStore};
use crate::update::UpdateChecker;
use crate::usage::UsageCounter;

/// Start the thread that consumes commands for the primary instance: the
/// launch command first, then every command relayed by later launches.
pub fn spawn_command_worker(rx: Receiver<CommandString>) -> std::io::Result<JoinHandle<usize>> {
    thread::Builder::new()
        .name("command-worker".to_string())
        .spawn(move || {
            let mut handled = 0;
            for command in rx {
                tracing::info!(%command, "opening group");
                handled += 1;
            }
            tracing::debug!(handled, "command channel closed");
            handled
        })
}

fn spawn_update_check() {
    let spawned = thread::Builder::new()
        .name("update-check".to_string())
        .spawn(|| match UpdateChecker::new() {
            Ok(checker) => {
                let info = checker.check_latest();
                if info.update_available {
                    tracing::info!(latest = ?info.latest_version, url = ?info.release_url, "update available");
                }
            }
            Err(err) => tracing::warn!("unable to build update client: {err:#}"),
        });
    if let Err(err) = spawned {
        tracing::warn!(%err, "unable to start update check");
    }
}

fn record_usage() {
    let mut usage = UsageCounter::default_location();
    match usage.record_launch() {
        Ok(count) => {
            tracing::debug!(count, "launch recorded");
            if usage.prompt_due() {
                tracing::info!(count, "support prompt due");
            }
        }
        Err(err) => tracing::warn!(path = %usage.path().display(), "unable to record launch: {err:#}"),
    }
}

/// Initialise the primary instance.
///
/// The registered message ids are the interop layer that every later launch
/// relies on, so registering them is the first step.
pub fn run_primary(launch: PrimaryLaunch, store: &SettingsStore, settings: &Settings) -> anyhow::Result<()> {
    let ids = MessageIds::register()
        .ok_or_else(|| anyhow::anyhow!("unable to register relay messages"))?;
    tracing::info!(
        silent = launch.silent,
        command = ?launch.command,
        relay_failed = launch.relay_failure.is_some(),
        settings = %store.path().display(),
        "starting primary instance"
    );
    tracing::debug!(
        show_tray_icon = settings.show_tray_icon,
        run_at_startup = settings.run_at_startup,
        use_grayscale_icon = settings.use_grayscale_icon,
        "settings loaded"
    );

    record_usage();
    spawn_update_check();

    let (tx, rx) = channel();
    let worker = spawn_command_worker(rx)?;
    run_host(&launch, ids, tx)?;
    let _ = worker.join();
    Ok(())
}

/// Which windows the primary instance shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostLayout {
    /// Create the `"Popup Window"` that receives relayed commands.
    pub popup: bool,
    pub show_main: bool,
}

impl HostLayout {
    pub fn for_launch(launch: &PrimaryLaunch) -> Self {
        let popup = launch.command.is_some();
        Self {
            popup,
            show_main: !popup && !launch.silent,
        }
    }

    /// Closing the popup ends the process while the main window is hidden;
    /// otherwise nothing visible would be left to close.
    pub fn popup_quits(&self) -> bool {
        !self.show_main
    }

    /// Layout used when the popup could not be created.
    pub fn without_popup(self) -> Self {
        Self {
            popup: false,
            show_main: true,
        }
    }
}

#[cfg(target_os = "windows")]
fn run_host(launch: &PrimaryLaunch, ids: MessageIds, tx: Sender<CommandString>) -> anyhow::Result<()> {
    use crate::dispatch::{CommandReceiver, MessageRouter};
    use crate::host_window::{run_message_loop, HostWindow};
    use crate::window_locator::{MAIN_WINDOW_TITLE, POPUP_WINDOW_TITLE};

    let main = HostWindow::create(MAIN_WINDOW_TITLE, MessageRouter::new(), &[], true)?;

    let mut layout = HostLayout::for_launch(launch);
    let mut popup = None;
    if layout.popup {
        let router = MessageRouter::new();
        let created = CommandReceiver::install(&router, ids, tx.clone())
            .map_err(anyhow::Error::from)
            .and_then(|receiver| {
                let window = HostWindow::create(POPUP_WINDOW_TITLE, router, &[ids.size], layout.popup_quits())?;
                Ok((window, receiver))
            });
        match created {
            Ok(pair) => popup = Some(pair),
            Err(err) => {
                tracing::warn!("popup unavailable, showing main window: {err:#}");
                layout = layout.without_popup();
            }
        }
    }

    if let Some(command) = launch.command.clone() {
        let _ = tx.send(command);
    }
    drop(tx);

    if let Some((window, _)) = &popup {
        window.show();
    }
    if layout.show_main {
        main.show();
    }

    run_message_loop();
    tracing::info!("message loop finished");
    drop(popup);
    drop(main);
    Ok(())
}

#[cfg(not(target_os = "windows"))]
fn run_host(launch: &PrimaryLaunch, ids: MessageIds, tx: Sender<CommandString>) -> anyhow::Result<()> {
    tracing::warn!(?ids, "no desktop host on this platform; handling launch command only");
    if let Some(command) = launch.command.clone() {
        let _ = tx.send(command);
    }
    Ok(())
}
