//! Trellis: a retained-mode UI layout and interaction engine.
//!
//! Trellis keeps a tree of items (buttons, containers, lists, text blocks
//! and text inputs), lays it out with a flexbox-like two-pass algorithm,
//! typesets text with a bitmap font, and resolves focus, pointer capture and
//! text editing once per frame.
//!
//! # Architecture
//!
//! The host owns the window system. Every frame it fills an
//! [`InputSnapshot`], hands it to [`Context::update`] together with a
//! [`Platform`] for clipboard, cursor and IME side effects, drains the
//! resulting [`Event`]s and replays the [`DrawList`] from [`Context::draw`].
//! Font metrics and text boundaries come in through the [`FontService`] and
//! [`BreakService`] traits.
//!
//! # Usage
//!
//! ```ignore
//! use trellis::{BitmapFont, Container, Context, HeadlessPlatform, InputSnapshot, Rect, UiConfig};
//!
//! let mut ctx = Context::new(UiConfig::default(), BitmapFont::monospace(8.0, 16.0));
//! let ok = ctx.button("OK");
//! let dialog = ctx.create_toplevel_container(Container::column().child(ok));
//! ctx.lay_out(dialog, Rect::new(0.0, 0.0, 320.0, 240.0))?;
//! ctx.update(&InputSnapshot::new(), &mut HeadlessPlatform::new())?;
//! for event in ctx.drain_events() {
//!     println!("{event:?}");
//! }
//! ```

// Core primitives
pub mod primitives;
pub mod error;
pub mod config;
pub mod id;

// Text services and typesetting
pub mod font;
pub mod breaks;
pub mod text_block;
pub mod typeset;

// Item tree and layout (flexbox-inspired containers)
pub mod item;
pub mod layout;

// Interaction
pub mod event_queue;
pub mod input;
pub mod focus;
pub mod list_scroll;
pub mod text_editor;

// Frame driver and drawing
pub mod context;
pub mod render;

// Re-export core types
pub use primitives::{Color, Point, Rect, Size};
pub use error::{Result, UiError};
pub use config::{ScrollConfig, Theme, UiConfig};
pub use id::ItemId;
pub use font::{BitmapFont, FontService, GlyphMetrics};
pub use breaks::{BreakService, LineBreak, UnicodeBreaks};
pub use text_block::{Glyph, Overflow, TextBlock};
pub use typeset::Typesetter;
pub use item::{Button, Container, Item, ItemKind, List, TextInput};
pub use layout::{Alignment, Axis, Direction, Justification, Padding};
pub use event_queue::{Event, EventQueue};
pub use input::{
    CursorShape, HeadlessPlatform, Hotkey, InputSnapshot, KeyState, Modifiers, MouseButton,
    NamedKey, Platform,
};
#[cfg(feature = "system-clipboard")]
pub use input::SystemClipboard;
pub use focus::{CaptureState, FocusState};
pub use list_scroll::ListScrollController;
pub use text_editor::TextEditor;
pub use context::Context;
pub use render::{DrawCommand, DrawList, GlyphQuad};
