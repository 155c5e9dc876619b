use app_group::app::{spawn_command_worker, HostLayout};
use app_group::arbitration::PrimaryLaunch;
use app_group::command::CommandString;
use std::sync::mpsc::channel;

fn launch(command: Option<&str>, silent: bool) -> PrimaryLaunch {
    PrimaryLaunch {
        command: command.map(CommandString::from),
        silent,
        ..Default::default()
    }
}

#[test]
fn worker_drains_commands_until_channel_closes() {
    let (tx, rx) = channel();
    let worker = spawn_command_worker(rx).unwrap();
    tx.send(CommandString::from("Games")).unwrap();
    tx.send(CommandString::from("C:\\file.txt")).unwrap();
    drop(tx);
    assert_eq!(worker.join().unwrap(), 2);
}

#[test]
fn command_launch_shows_popup_that_ends_the_process() {
    let layout = HostLayout::for_launch(&launch(Some("Games"), false));
    assert!(layout.popup);
    assert!(!layout.show_main);
    assert!(layout.popup_quits());
}

#[test]
fn plain_launch_shows_main_window() {
    let layout = HostLayout::for_launch(&launch(None, false));
    assert_eq!(
        layout,
        HostLayout {
            popup: false,
            show_main: true
        }
    );

    let silent = HostLayout::for_launch(&launch(None, true));
    assert!(!silent.popup && !silent.show_main);
}

#[test]
fn missing_popup_falls_back_to_main_window() {
    for silent in [false, true] {
        let layout = HostLayout::for_launch(&launch(Some("Games"), silent)).without_popup();
        assert!(!layout.popup);
        assert!(layout.show_main);
    }
}

#[test]
fn a_visible_window_can_always_end_the_process() {
    for command in [None, Some("Games")] {
        let layout = HostLayout::for_launch(&launch(command, false));
        assert!(layout.show_main || (layout.popup && layout.popup_quits()));
    }
}
