use std::ffi::OsStr;

use crate::command::CommandString;
use crate::relay::{DeliveryError, MessageTransport};
use crate::window_locator::{WindowHandle, MAIN_WINDOW_TITLE, POPUP_WINDOW_TITLE};

/// Flag marking a background launch (e.g. from the startup task). Matched
/// case-insensitively.
pub const SILENT_FLAG: &str = "--silent";

/// Command-line arguments relevant to instance arbitration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchArgs {
    /// First argument that is not a flag, forwarded verbatim.
    pub command: Option<CommandString>,
    pub silent: bool,
}

impl LaunchArgs {
    pub fn from_env() -> Self {
        Self::parse(std::env::args_os().skip(1))
    }

    /// Parse arguments following the program path.
    pub fn parse<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut parsed = Self::default();
        for arg in args {
            let arg = arg.as_ref();
            if arg
                .to_str()
                .is_some_and(|s| s.eq_ignore_ascii_case(SILENT_FLAG))
            {
                parsed.silent = true;
            } else if parsed.command.is_none() {
                parsed.command = Some(CommandString::from_units(crate::win_util::os_str_to_utf16(arg)));
            } else {
                tracing::debug!(arg = %arg.to_string_lossy(), "ignoring extra argument");
            }
        }
        parsed
    }
}

/// Outcome of arbitration, computed once per launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationDecision {
    /// Forward the command to the running popup window and exit.
    Relay,
    /// Raise the running main window and exit.
    RedirectMain,
    /// No usable instance found; initialise the application.
    Primary,
}

/// The arbitration rules as a pure function of what the probes would find.
///
/// The main window only matters when neither a command nor `--silent` was
/// given; a popup only matters when a command was given.
pub fn decide(args: &LaunchArgs, popup_present: bool, main_present: bool) -> ActivationDecision {
    if popup_present && args.command.is_some() {
        ActivationDecision::Relay
    } else if args.command.is_none() && !args.silent && main_present {
        ActivationDecision::RedirectMain
    } else {
        ActivationDecision::Primary
    }
}

/// The native operations arbitration needs.
pub trait Desktop {
    fn find_window(&self, title: &str) -> Option<WindowHandle>;
    fn send_command(&self, target: WindowHandle, command: &CommandString) -> Result<(), DeliveryError>;
    fn bring_to_front(&self, target: WindowHandle);
}

/// [`Desktop`] backed by the real window manager.
pub struct NativeDesktop<T> {
    transport: T,
}

impl<T: MessageTransport> NativeDesktop<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }
}

impl<T: MessageTransport> Desktop for NativeDesktop<T> {
    fn find_window(&self, title: &str) -> Option<WindowHandle> {
        crate::window_locator::find_window(title)
    }

    fn send_command(&self, target: WindowHandle, command: &CommandString) -> Result<(), DeliveryError> {
        crate::relay::send_command(&self.transport, target, command)
    }

    fn bring_to_front(&self, target: WindowHandle) {
        crate::foreground::bring_to_front(target);
    }
}

/// Everything the primary instance needs to know about its own launch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrimaryLaunch {
    pub command: Option<CommandString>,
    pub silent: bool,
    /// Set when a popup was found but relaying to it failed.
    pub relay_failure: Option<DeliveryError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    Relayed { target: WindowHandle },
    Redirected { target: WindowHandle },
    Primary(PrimaryLaunch),
}

impl Activation {
    pub fn decision(&self) -> ActivationDecision {
        match self {
            Activation::Relayed { .. } => ActivationDecision::Relay,
            Activation::Redirected { .. } => ActivationDecision::RedirectMain,
            Activation::Primary(_) => ActivationDecision::Primary,
        }
    }

    /// Whether the process should exit without initialising the GUI.
    pub fn should_exit(&self) -> bool {
        !matches!(self, Activation::Primary(_))
    }
}

/// Decide and act on how this launch relates to an already running instance.
///
/// Windows are probed lazily: the main window is only looked up when rule 2
/// can apply. Failures never escape; a failed relay falls through to
/// [`Activation::Primary`] so the user always ends up with a window, at the
/// cost of occasionally starting a second instance.
pub fn arbitrate<D: Desktop + ?Sized>(args: &LaunchArgs, desktop: &D) -> Activation {
    let popup = desktop.find_window(POPUP_WINDOW_TITLE);

    if let (Some(popup), Some(command)) = (popup, args.command.as_ref()) {
        match desktop.send_command(popup, command) {
            Ok(()) => {
                desktop.bring_to_front(popup);
                tracing::info!(window = ?popup, %command, "relayed command to running popup");
                return Activation::Relayed { target: popup };
            }
            Err(err) => {
                tracing::warn!(window = ?popup, %err, "relay failed, starting as primary");
                return Activation::Primary(PrimaryLaunch {
                    command: args.command.clone(),
                    silent: args.silent,
                    relay_failure: Some(err),
                });
            }
        }
    }

    if args.command.is_none() && !args.silent {
        if let Some(main) = desktop.find_window(MAIN_WINDOW_TITLE) {
            desktop.bring_to_front(main);
            tracing::info!(window = ?main, "main window already running, raised it");
            return Activation::Redirected { target: main };
        }
    }

    tracing::debug!(popup_found = popup.is_some(), silent = args.silent, "starting as primary");
    Activation::Primary(PrimaryLaunch {
        command: args.command.clone(),
        silent: args.silent,
        relay_failure: None,
    })
}
