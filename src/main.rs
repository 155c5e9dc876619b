#![cfg_attr(all(target_os = "windows", not(debug_assertions)), windows_subsystem = "windows")]

use app_group::arbitration::{arbitrate, Activation, LaunchArgs, NativeDesktop};
use app_group::relay::{MessageIds, Win32Transport};
use app_group::settings::SettingsStore;

fn main() {
    let store = SettingsStore::default_location();
    let settings = store.load();
    app_group::logging::init(settings.debug_logging, Some(app_group::paths::log_file()));

    let args = LaunchArgs::from_env();
    let activation = match MessageIds::register() {
        Some(ids) => {
            let desktop = NativeDesktop::new(Win32Transport::new(ids, settings.relay_timeout()));
            arbitrate(&args, &desktop)
        }
        None => {
            tracing::warn!("relay messages unavailable, skipping instance arbitration");
            Activation::Primary(app_group::arbitration::PrimaryLaunch {
                command: args.command.clone(),
                silent: args.silent,
                relay_failure: None,
            })
        }
    };

    // Every path exits with status 0; failures are only logged.
    if let Activation::Primary(launch) = activation {
        if let Err(err) = app_group::app::run_primary(launch, &store, &settings) {
            tracing::error!("primary instance failed: {err:#}");
        }
    }
}
