// src/actions.rs - Gesture bindings and OS key injection
use std::fmt;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::gesture::{Gesture, GESTURE_COUNT};

/// Keys the bindings can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Space,
    M,
    N,
    Shift,
    VolumeUp,
    VolumeDown,
    Left,
    Right,
}

impl Key {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Space => "space",
            Self::M => "m",
            Self::N => "n",
            Self::Shift => "shift",
            Self::VolumeUp => "volumeup",
            Self::VolumeDown => "volumedown",
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// X11 keysym name understood by `xdotool key`.
    fn xdotool_name(&self) -> &'static str {
        match self {
            Self::Space => "space",
            Self::M => "m",
            Self::N => "n",
            Self::Shift => "shift",
            Self::VolumeUp => "XF86AudioRaiseVolume",
            Self::VolumeDown => "XF86AudioLowerVolume",
            Self::Left => "Left",
            Self::Right => "Right",
        }
    }

    /// AppleScript statement that produces this key on macOS.
    fn applescript(&self, modifier: Option<Key>) -> String {
        let using = match modifier {
            Some(Key::Shift) => " using shift down",
            _ => "",
        };
        let key_code = match self {
            Self::Space => 49,
            Self::M => 46,
            Self::N => 45,
            Self::Left => 123,
            Self::Right => 124,
            // System Events has no media key codes; adjust the output volume directly
            Self::VolumeUp => {
                return "set volume output volume ((output volume of (get volume settings)) + 6)"
                    .to_string()
            }
            Self::VolumeDown => {
                return "set volume output volume ((output volume of (get volume settings)) - 6)"
                    .to_string()
            }
            // Shift alone; as a modifier it goes through `using shift down`
            Self::Shift => 56,
        };
        format!(
            "tell application \"System Events\" to key code {}{}",
            key_code, using
        )
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a gesture does once it gets past its cooldown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Press(Key),
    Hotkey(Key, Key),
}

impl Action {
    /// Hand the action to an injector. Fire-and-forget.
    pub fn send(&self, injector: &mut dyn InputInjector) {
        match *self {
            Action::Press(key) => injector.press(key),
            Action::Hotkey(modifier, key) => injector.hotkey(modifier, key),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Press(key) => write!(f, "{}", key),
            Action::Hotkey(modifier, key) => write!(f, "{}+{}", modifier, key),
        }
    }
}

/// On-screen label shown when a gesture fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Annotation {
    pub text: &'static str,
    /// RGB
    pub color: [u8; 3],
    /// Baseline of the label in overlay pixels
    pub row: u32,
}

/// Everything fixed about one gesture: its key, its cooldown and its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub gesture: Gesture,
    pub action: Action,
    pub minimum_interval: Duration,
    pub annotation: Annotation,
}

/// The process-wide gesture table, in [`Gesture::ALL`] order.
pub const BINDINGS: [Binding; GESTURE_COUNT] = [
    Binding {
        gesture: Gesture::Palm,
        action: Action::Press(Key::Space),
        minimum_interval: Duration::from_millis(2000),
        annotation: Annotation { text: "Play/Pause", color: [0, 255, 0], row: 50 },
    },
    Binding {
        gesture: Gesture::Fist,
        action: Action::Press(Key::M),
        minimum_interval: Duration::from_millis(2000),
        annotation: Annotation { text: "Mute/Unmute", color: [255, 0, 0], row: 80 },
    },
    Binding {
        gesture: Gesture::ThumbsUp,
        action: Action::Press(Key::VolumeUp),
        minimum_interval: Duration::from_millis(200),
        annotation: Annotation { text: "Volume Up", color: [0, 255, 255], row: 110 },
    },
    Binding {
        gesture: Gesture::ThumbsDown,
        action: Action::Press(Key::VolumeDown),
        minimum_interval: Duration::from_millis(300),
        annotation: Annotation { text: "Volume Down", color: [0, 255, 255], row: 140 },
    },
    Binding {
        gesture: Gesture::IndexPointing,
        action: Action::Press(Key::Right),
        minimum_interval: Duration::from_millis(900),
        annotation: Annotation { text: "Seek Forward", color: [255, 255, 0], row: 170 },
    },
    Binding {
        gesture: Gesture::Peace,
        action: Action::Press(Key::Left),
        minimum_interval: Duration::from_millis(900),
        annotation: Annotation { text: "Seek Backward", color: [255, 255, 0], row: 200 },
    },
    Binding {
        gesture: Gesture::Rock,
        action: Action::Hotkey(Key::Shift, Key::N),
        minimum_interval: Duration::from_millis(3000),
        annotation: Annotation { text: "Next Song", color: [200, 0, 200], row: 230 },
    },
];

pub fn binding(gesture: Gesture) -> &'static Binding {
    &BINDINGS[gesture.index()]
}

/// Cooldown intervals straight from [`BINDINGS`].
pub fn default_intervals() -> [Duration; GESTURE_COUNT] {
    BINDINGS.map(|b| b.minimum_interval)
}

/// Sends keystrokes to the operating system.
///
/// Implementations must not block on, retry, or report delivery failures;
/// the engine never looks at the outcome.
pub trait InputInjector {
    fn press(&mut self, key: Key);
    fn hotkey(&mut self, modifier: Key, key: Key);
}

/// Which injector to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputBackend {
    /// `osascript` on macOS, `xdotool` elsewhere
    Auto,
    Xdotool,
    Osascript,
    DryRun,
}

impl Default for InputBackend {
    fn default() -> Self {
        Self::Auto
    }
}

impl InputBackend {
    /// Resolve `Auto` for the current platform.
    pub fn resolve(self) -> Self {
        match self {
            Self::Auto if cfg!(target_os = "macos") => Self::Osascript,
            Self::Auto => Self::Xdotool,
            other => other,
        }
    }
}

/// Build the injector for a backend.
pub fn make_injector(backend: InputBackend) -> Box<dyn InputInjector> {
    match backend.resolve() {
        InputBackend::DryRun => Box::new(DryRunInjector),
        InputBackend::Osascript => Box::new(CommandInjector::new(CommandTool::Osascript)),
        _ => Box::new(CommandInjector::new(CommandTool::Xdotool)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandTool {
    Xdotool,
    Osascript,
}

/// Injects keys by spawning `xdotool` or `osascript`.
///
/// Children are never waited on synchronously; finished ones are reaped on
/// the next call.
pub struct CommandInjector {
    tool: CommandTool,
    children: Vec<Child>,
}

impl CommandInjector {
    pub fn new(tool: CommandTool) -> Self {
        Self {
            tool,
            children: Vec::new(),
        }
    }

    fn command_for(&self, modifier: Option<Key>, key: Key) -> Command {
        match self.tool {
            CommandTool::Xdotool => {
                let chord = match modifier {
                    Some(m) => format!("{}+{}", m.xdotool_name(), key.xdotool_name()),
                    None => key.xdotool_name().to_string(),
                };
                let mut cmd = Command::new("xdotool");
                cmd.args(["key", &chord]);
                cmd
            }
            CommandTool::Osascript => {
                let mut cmd = Command::new("osascript");
                cmd.args(["-e", &key.applescript(modifier)]);
                cmd
            }
        }
    }

    fn reap(&mut self) {
        self.children.retain_mut(|child| match child.try_wait() {
            Ok(Some(status)) => {
                if !status.success() {
                    warn!("Key injection exited with {}", status);
                }
                false
            }
            Ok(None) => true,
            Err(e) => {
                warn!("Could not poll key injection process: {}", e);
                false
            }
        });
    }

    fn spawn(&mut self, modifier: Option<Key>, key: Key) {
        self.reap();

        let mut cmd = self.command_for(modifier, key);
        cmd.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null());

        match cmd.spawn() {
            Ok(child) => {
                debug!("Spawned {:?} for {}", self.tool, key);
                self.children.push(child);
            }
            Err(e) => warn!("Failed to inject {:?} via {:?}: {}", key, self.tool, e),
        }
    }
}

impl InputInjector for CommandInjector {
    fn press(&mut self, key: Key) {
        self.spawn(None, key);
    }

    fn hotkey(&mut self, modifier: Key, key: Key) {
        self.spawn(Some(modifier), key);
    }
}

impl Drop for CommandInjector {
    fn drop(&mut self) {
        // Give in-flight keystrokes a chance to land before exit
        for child in &mut self.children {
            let _ = child.wait();
        }
    }
}

/// Logs keystrokes instead of sending them.
pub struct DryRunInjector;

impl InputInjector for DryRunInjector {
    fn press(&mut self, key: Key) {
        info!("[dry-run] press {}", key);
    }

    fn hotkey(&mut self, modifier: Key, key: Key) {
        info!("[dry-run] hotkey {}+{}", modifier, key);
    }
}

/// Remembers every action it was asked to send.
#[derive(Debug, Default)]
pub struct RecordingInjector {
    pub sent: Vec<Action>,
}

impl RecordingInjector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InputInjector for RecordingInjector {
    fn press(&mut self, key: Key) {
        self.sent.push(Action::Press(key));
    }

    fn hotkey(&mut self, modifier: Key, key: Key) {
        self.sent.push(Action::Hotkey(modifier, key));
    }
}
