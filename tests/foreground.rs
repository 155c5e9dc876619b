use app_group::foreground::bring_to_front_with;

#[path = "mock_desktop.rs"]
mod mock_desktop;
use mock_desktop::{handle, FocusState, MockFocus, MAIN};

const OTHER: isize = 0x3030;

#[test]
fn restores_minimized_window_before_focusing() {
    let focus = MockFocus::with(FocusState {
        minimized: true,
        foreground: Some(handle(OTHER)),
        allow_direct: true,
        ..Default::default()
    });
    bring_to_front_with(&focus, handle(MAIN));

    let state = focus.snapshot();
    assert!(!state.minimized);
    assert!(state.visible);
    assert_eq!(state.foreground, Some(handle(MAIN)));
    assert_eq!(state.calls, vec!["restore", "show", "set_foreground"]);
}

#[test]
fn attaches_input_when_direct_focus_is_denied() {
    let focus = MockFocus::with(FocusState {
        foreground: Some(handle(OTHER)),
        allow_direct: false,
        ..Default::default()
    });
    bring_to_front_with(&focus, handle(MAIN));

    let state = focus.snapshot();
    assert_eq!(state.foreground, Some(handle(MAIN)));
    assert!(!state.attached, "input must be detached again");
    assert_eq!(
        state.calls,
        vec!["show", "set_foreground", "attach", "raise", "set_foreground", "detach"]
    );
}

#[test]
fn denied_without_foreground_owner_still_raises() {
    let focus = MockFocus::with(FocusState::default());
    bring_to_front_with(&focus, handle(MAIN));

    let state = focus.snapshot();
    assert_eq!(state.foreground, None);
    assert_eq!(state.calls, vec!["show", "set_foreground", "raise", "set_foreground"]);
}

#[test]
fn second_call_leaves_the_same_end_state() {
    let focus = MockFocus::with(FocusState {
        minimized: true,
        foreground: Some(handle(OTHER)),
        allow_direct: false,
        ..Default::default()
    });
    bring_to_front_with(&focus, handle(MAIN));
    let mut once = focus.snapshot();

    focus.clear_calls();
    bring_to_front_with(&focus, handle(MAIN));
    let mut twice = focus.snapshot();

    assert_eq!(twice.calls, vec!["show"]);
    once.calls.clear();
    twice.calls.clear();
    assert_eq!(once, twice);
}
