use app_group::dispatch::{Inbound, MessageRouter, RouterError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const THEME_CHANGED: u32 = 0x001A;
const TIMER: u32 = 0x0113;

fn signal(id: u32, wparam: usize) -> Inbound {
    Inbound::Signal { id, wparam, lparam: 0 }
}

#[test]
fn dispatches_to_the_handler_for_the_message_id() {
    let router = MessageRouter::new();
    let theme = Arc::new(AtomicUsize::new(0));
    let timer = Arc::new(AtomicUsize::new(0));

    let t = Arc::clone(&theme);
    let _theme = router
        .register(THEME_CHANGED, move |_| {
            t.fetch_add(1, Ordering::SeqCst);
            true
        })
        .unwrap();
    let t = Arc::clone(&timer);
    let _timer = router
        .register(TIMER, move |msg| {
            if let Inbound::Signal { wparam, .. } = msg {
                t.fetch_add(*wparam, Ordering::SeqCst);
            }
            true
        })
        .unwrap();

    assert!(router.dispatch(&signal(THEME_CHANGED, 0)));
    assert!(router.dispatch(&signal(TIMER, 5)));
    assert!(!router.dispatch(&signal(0x0400, 0)));
    assert_eq!(theme.load(Ordering::SeqCst), 1);
    assert_eq!(timer.load(Ordering::SeqCst), 5);
}

#[test]
fn one_handler_per_message_id() {
    let router = MessageRouter::new();
    let _first = router.register(TIMER, |_| true).unwrap();
    let second = router.register(TIMER, |_| true);
    assert_eq!(second.err(), Some(RouterError::AlreadyRegistered(TIMER)));
}

#[test]
fn dropping_the_registration_unsubscribes() {
    let router = MessageRouter::new();
    let registration = router.register(THEME_CHANGED, |_| true).unwrap();
    assert_eq!(registration.id(), THEME_CHANGED);
    assert!(router.is_registered(THEME_CHANGED));

    drop(registration);
    assert!(!router.is_registered(THEME_CHANGED));
    assert!(!router.dispatch(&signal(THEME_CHANGED, 0)));

    // The slot can be claimed again.
    let _again = router.register(THEME_CHANGED, |_| true).unwrap();
    assert!(router.dispatch(&signal(THEME_CHANGED, 0)));
}

#[test]
fn registration_outliving_router_is_harmless() {
    let router = MessageRouter::new();
    let registration = router.register(TIMER, |_| true).unwrap();
    drop(router);
    drop(registration);
}

#[test]
fn unhandled_result_is_reported() {
    let router = MessageRouter::new();
    let _reg = router.register(TIMER, |msg| matches!(msg, Inbound::Signal { wparam: 1, .. })).unwrap();
    assert!(router.dispatch(&signal(TIMER, 1)));
    assert!(!router.dispatch(&signal(TIMER, 2)));
}
