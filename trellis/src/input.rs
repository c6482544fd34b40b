//! Per-frame input and the platform services the core calls back into.
//!
//! The host polls its window system once per frame and fills an
//! [`InputSnapshot`]. Side effects that need the window system (clipboard,
//! mouse cursor, IME placement) go through the [`Platform`] trait.

use crate::primitives::Point;

/// Mouse buttons that take part in focus and capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

impl MouseButton {
    pub const ALL: [MouseButton; 3] = [MouseButton::Left, MouseButton::Middle, MouseButton::Right];

    fn slot(self) -> usize {
        match self {
            MouseButton::Left => 0,
            MouseButton::Middle => 1,
            MouseButton::Right => 2,
        }
    }
}

/// Named keys (non-character keys) the core reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    // Navigation
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    PageUp,
    PageDown,

    // Editing
    Backspace,
    Delete,
    Enter,
    Tab,
    Space,
}

impl NamedKey {
    const COUNT: usize = 13;

    fn slot(self) -> usize {
        self as usize
    }
}

/// Keyboard modifier keys held while a key fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
    };

    pub const CTRL: Self = Self {
        shift: false,
        ctrl: true,
    };
}

/// State of one named key for this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyState {
    /// Went down this frame.
    pub tapped: bool,
    /// Held long enough for the platform to repeat it this frame.
    pub auto_repeated: bool,
    pub modifiers: Modifiers,
}

impl KeyState {
    /// Tapped or repeated: the key should act this frame.
    #[inline]
    pub fn fired(&self) -> bool {
        self.tapped || self.auto_repeated
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct ButtonState {
    clicked: bool,
    pressed: bool,
}

/// Platform shortcuts, already resolved from the OS key bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hotkey {
    SelectAll,
    Copy,
    Cut,
    Paste,
}

/// Everything the core reads from the platform in one frame.
#[derive(Debug, Clone, Default)]
pub struct InputSnapshot {
    pointer: Point,
    buttons: [ButtonState; 3],
    /// Wheel velocity. Positive `y` scrolls content up into view.
    scroll: Point,
    keys: [KeyState; NamedKey::COUNT],
    /// Text produced by the keyboard or an input method this frame.
    composed_text: String,
    hotkeys: Vec<Hotkey>,
}

impl InputSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Builders
    // =========================================================================

    pub fn pointer_at(mut self, position: Point) -> Self {
        self.pointer = position;
        self
    }

    /// Button went down this frame. A click is also a press.
    pub fn click(mut self, button: MouseButton) -> Self {
        self.buttons[button.slot()] = ButtonState {
            clicked: true,
            pressed: true,
        };
        self
    }

    /// Button is held down.
    pub fn press(mut self, button: MouseButton) -> Self {
        self.buttons[button.slot()].pressed = true;
        self
    }

    pub fn scroll(mut self, velocity: Point) -> Self {
        self.scroll = velocity;
        self
    }

    pub fn tap(self, key: NamedKey) -> Self {
        self.tap_with(key, Modifiers::NONE)
    }

    pub fn tap_with(mut self, key: NamedKey, modifiers: Modifiers) -> Self {
        self.keys[key.slot()] = KeyState {
            tapped: true,
            auto_repeated: false,
            modifiers,
        };
        self
    }

    pub fn repeat(mut self, key: NamedKey, modifiers: Modifiers) -> Self {
        self.keys[key.slot()] = KeyState {
            tapped: false,
            auto_repeated: true,
            modifiers,
        };
        self
    }

    pub fn compose(mut self, text: &str) -> Self {
        self.composed_text.push_str(text);
        self
    }

    pub fn hotkey(mut self, hotkey: Hotkey) -> Self {
        if !self.hotkeys.contains(&hotkey) {
            self.hotkeys.push(hotkey);
        }
        self
    }

    // =========================================================================
    // Queries
    // =========================================================================

    #[inline]
    pub fn pointer(&self) -> Point {
        self.pointer
    }

    #[inline]
    pub fn clicked(&self, button: MouseButton) -> bool {
        self.buttons[button.slot()].clicked
    }

    #[inline]
    pub fn pressed(&self, button: MouseButton) -> bool {
        self.buttons[button.slot()].pressed
    }

    /// Any of the mouse buttons went down this frame.
    pub fn any_clicked(&self) -> bool {
        MouseButton::ALL.iter().any(|&button| self.clicked(button))
    }

    #[inline]
    pub fn scroll_velocity(&self) -> Point {
        self.scroll
    }

    #[inline]
    pub fn key(&self, key: NamedKey) -> KeyState {
        self.keys[key.slot()]
    }

    #[inline]
    pub fn fired(&self, key: NamedKey) -> bool {
        self.key(key).fired()
    }

    #[inline]
    pub fn composed_text(&self) -> &str {
        &self.composed_text
    }

    #[inline]
    pub fn hotkey_pressed(&self, hotkey: Hotkey) -> bool {
        self.hotkeys.contains(&hotkey)
    }
}

// =============================================================================
// Platform services
// =============================================================================

/// Mouse cursor shapes the core asks for while hovering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorShape {
    #[default]
    Arrow,
    IBeam,
    ProhibitionSign,
}

/// Window-system services used during an update.
pub trait Platform {
    /// Put `text` on the clipboard. Returns false if the clipboard refused it.
    fn copy_to_clipboard(&mut self, text: &str) -> bool;

    /// Ask for the clipboard contents. The host delivers them later through
    /// [`Context::accept_paste_from_clipboard`](crate::Context::accept_paste_from_clipboard).
    fn request_paste(&mut self);

    fn set_cursor(&mut self, shape: CursorShape);

    /// Position the input-method candidate window, in viewport coordinates.
    fn set_ime_anchor(&mut self, position: Point);
}

/// A platform without a window system. Records every request so hosts and
/// tests can inspect them.
#[derive(Debug, Clone, Default)]
pub struct HeadlessPlatform {
    pub clipboard: Option<String>,
    pub paste_requests: usize,
    pub cursor: CursorShape,
    pub ime_anchor: Option<Point>,
}

impl HeadlessPlatform {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Platform for HeadlessPlatform {
    fn copy_to_clipboard(&mut self, text: &str) -> bool {
        self.clipboard = Some(text.to_owned());
        true
    }

    fn request_paste(&mut self) {
        self.paste_requests += 1;
    }

    fn set_cursor(&mut self, shape: CursorShape) {
        self.cursor = shape;
    }

    fn set_ime_anchor(&mut self, position: Point) {
        self.ime_anchor = Some(position);
    }
}

/// Clipboard access through the operating system.
///
/// Paste requests are served immediately but the text is held until the host
/// collects it with [`take_pending_paste`](Self::take_pending_paste) and feeds
/// it back to the context, the same way an asynchronous platform would.
#[cfg(feature = "system-clipboard")]
#[derive(Debug, Default)]
pub struct SystemClipboard {
    pending_paste: Option<String>,
    pub cursor: CursorShape,
    pub ime_anchor: Option<Point>,
}

#[cfg(feature = "system-clipboard")]
impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_pending_paste(&mut self) -> Option<String> {
        self.pending_paste.take()
    }
}

#[cfg(feature = "system-clipboard")]
impl Platform for SystemClipboard {
    fn copy_to_clipboard(&mut self, text: &str) -> bool {
        let copied = arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text));
        match copied {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, "failed to copy to clipboard");
                false
            }
        }
    }

    fn request_paste(&mut self) {
        match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.get_text()) {
            Ok(text) => self.pending_paste = Some(text),
            Err(err) => tracing::warn!(error = %err, "failed to read clipboard"),
        }
    }

    fn set_cursor(&mut self, shape: CursorShape) {
        self.cursor = shape;
    }

    fn set_ime_anchor(&mut self, position: Point) {
        self.ime_anchor = Some(position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_implies_press() {
        let input = InputSnapshot::new().click(MouseButton::Right);
        assert!(input.clicked(MouseButton::Right));
        assert!(input.pressed(MouseButton::Right));
        assert!(!input.pressed(MouseButton::Left));
        assert!(input.any_clicked());
    }

    #[test]
    fn keys_fire_on_tap_or_repeat() {
        let input = InputSnapshot::new()
            .tap_with(NamedKey::ArrowLeft, Modifiers::SHIFT)
            .repeat(NamedKey::Backspace, Modifiers::NONE);
        assert!(input.fired(NamedKey::ArrowLeft));
        assert!(input.key(NamedKey::ArrowLeft).modifiers.shift);
        assert!(input.fired(NamedKey::Backspace));
        assert!(!input.key(NamedKey::Backspace).tapped);
        assert!(!input.fired(NamedKey::Tab));
    }

    #[test]
    fn every_named_key_has_a_slot() {
        assert_eq!(NamedKey::Space.slot() + 1, NamedKey::COUNT);
    }

    #[test]
    fn headless_platform_records_requests() {
        let mut platform = HeadlessPlatform::new();
        assert!(platform.copy_to_clipboard("hi"));
        platform.request_paste();
        platform.set_cursor(CursorShape::IBeam);
        assert_eq!(platform.clipboard.as_deref(), Some("hi"));
        assert_eq!(platform.paste_requests, 1);
        assert_eq!(platform.cursor, CursorShape::IBeam);
    }
}
