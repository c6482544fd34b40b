//! Integration tests driving whole frames through `Context::update`.
//!
//! Every test mounts one or more toplevel containers, lays them out the way
//! a host would at the start of each frame, feeds input snapshots through a
//! `HeadlessPlatform` and inspects the events, the item tree and the
//! recorded platform requests.
//!
//! The font is a programmatic monospace bitmap font: every glyph is 10
//! pixels wide and lines are 20 pixels tall, so positions can be computed by
//! hand.

use trellis::{
    BitmapFont, Button, Container, Context, Event, HeadlessPlatform, Hotkey, InputSnapshot, Item,
    ItemId, ItemKind, Modifiers, MouseButton, NamedKey, Padding, Point, Rect, Size, TextInput,
    UiConfig,
};

const CELL: f32 = 10.0;
const LINE: f32 = 20.0;

/// Test harness owning a context, its platform and the mounted toplevels.
struct Frames {
    ctx: Context,
    platform: HeadlessPlatform,
    roots: Vec<(ItemId, Rect)>,
}

impl Frames {
    fn new() -> Self {
        Self {
            ctx: Context::new(UiConfig::default(), BitmapFont::monospace(CELL, LINE)),
            platform: HeadlessPlatform::new(),
            roots: Vec::new(),
        }
    }

    fn mount(&mut self, container: Container) -> ItemId {
        self.mount_at(container, Rect::new(0.0, 0.0, 200.0, 200.0))
    }

    fn mount_at(&mut self, container: Container, space: Rect) -> ItemId {
        let root = self.ctx.create_toplevel_container(container);
        self.ctx.lay_out(root, space).unwrap();
        self.roots.push((root, space));
        root
    }

    /// Lay out, update and collect the events of one frame.
    fn run(&mut self, input: InputSnapshot) -> Vec<Event> {
        for &(root, space) in &self.roots {
            self.ctx.lay_out(root, space).unwrap();
        }
        self.ctx.update(&input, &mut self.platform).unwrap();
        self.ctx.drain_events().collect()
    }

    fn focus(&mut self, id: ItemId) {
        self.ctx.set_focus(Some(id)).unwrap();
        self.ctx.drain_events().for_each(drop);
    }

    fn bounds(&self, id: ItemId) -> Rect {
        self.ctx.item(id).unwrap().bounds
    }

    fn center(&self, id: ItemId) -> Point {
        let bounds = self.bounds(id);
        Point::new(bounds.x + bounds.width / 2.0, bounds.y + bounds.height / 2.0)
    }

    fn input(&self, id: ItemId) -> &TextInput {
        self.ctx.item(id).unwrap().as_text_input().unwrap()
    }

    fn text(&self, id: ItemId) -> &str {
        self.input(id).text.text()
    }

    fn scroll_top(&self, id: ItemId) -> f32 {
        self.ctx.item(id).unwrap().as_list().unwrap().scroll_top
    }
}

fn text_input(frames: &mut Frames, text: &str) -> Item {
    frames.ctx.create_item(TextInput::new("name").with_text(text))
}

/// A button whose label has no padding: `chars * CELL` by `LINE`.
fn label(frames: &mut Frames, chars: usize) -> Item {
    frames
        .ctx
        .create_item(Button::new("x".repeat(chars)).padding(Padding::default()))
}

fn text_changes(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, Event::TextChange { .. }))
        .count()
}

// =============================================================================
// Editing
// =============================================================================

#[test]
fn backspace_removes_last_character() {
    let mut frames = Frames::new();
    let input = text_input(&mut frames, "hello");
    let id = input.id;
    frames.mount(Container::column().child(input));
    frames.focus(id);

    let events = frames.run(InputSnapshot::new().tap(NamedKey::Backspace));
    assert_eq!(frames.text(id), "hell");
    assert_eq!(frames.input(id).cursor, 4);
    assert_eq!(events, vec![Event::TextChange { id }]);

    // Held keys repeat.
    frames.run(InputSnapshot::new().repeat(NamedKey::Backspace, Modifiers::NONE));
    assert_eq!(frames.text(id), "hel");
}

#[test]
fn select_line_then_delete() {
    let mut frames = Frames::new();
    let input = text_input(&mut frames, "ab");
    let id = input.id;
    frames.mount(Container::column().child(input));
    frames.focus(id);

    assert!(frames.run(InputSnapshot::new().tap(NamedKey::Home)).is_empty());
    assert_eq!(frames.input(id).cursor, 0);

    frames.run(InputSnapshot::new().tap_with(NamedKey::End, Modifiers::SHIFT));
    assert_eq!(frames.input(id).selection_start, 0);
    assert_eq!(frames.input(id).cursor, 2);

    let events = frames.run(InputSnapshot::new().tap(NamedKey::Delete));
    assert_eq!(frames.text(id), "");
    assert_eq!(frames.input(id).cursor, 0);
    assert_eq!(frames.input(id).selection_start, 0);
    assert_eq!(text_changes(&events), 1);
}

#[test]
fn typing_then_erasing_restores_text() {
    let mut frames = Frames::new();
    let input = text_input(&mut frames, "");
    let id = input.id;
    frames.mount(Container::column().child(input));
    frames.focus(id);

    let mut changes = text_changes(&frames.run(InputSnapshot::new().compose("né")));
    changes += text_changes(&frames.run(InputSnapshot::new().compose("e")));
    assert_eq!(frames.text(id), "née");
    assert_eq!(frames.input(id).cursor, "née".len());

    for _ in 0..3 {
        changes += text_changes(&frames.run(InputSnapshot::new().tap(NamedKey::Backspace)));
    }
    assert_eq!(frames.text(id), "");
    assert_eq!(changes, 5);

    // Nothing left to delete: no further change.
    let events = frames.run(InputSnapshot::new().tap(NamedKey::Backspace));
    assert_eq!(text_changes(&events), 0);
}

#[test]
fn cursor_stays_on_character_boundaries() {
    let mut frames = Frames::new();
    let input = text_input(&mut frames, "");
    let id = input.id;
    frames.mount(Container::column().child(input));
    frames.focus(id);

    let script = [
        InputSnapshot::new().compose("añb€"),
        InputSnapshot::new().tap(NamedKey::ArrowLeft),
        InputSnapshot::new().tap_with(NamedKey::ArrowLeft, Modifiers::SHIFT),
        InputSnapshot::new().compose("ü"),
        InputSnapshot::new().tap(NamedKey::Home),
        InputSnapshot::new().tap(NamedKey::Delete),
        InputSnapshot::new().tap(NamedKey::ArrowRight),
        InputSnapshot::new().tap_with(NamedKey::End, Modifiers::SHIFT),
        InputSnapshot::new().tap(NamedKey::ArrowUp),
        InputSnapshot::new().tap(NamedKey::Backspace),
    ];
    for input in script {
        frames.run(input);
        let text_input = frames.input(id);
        let text = text_input.text.text();
        assert!(text_input.cursor <= text.len());
        assert!(text_input.selection_start <= text.len());
        assert!(text.is_char_boundary(text_input.cursor));
        assert!(text.is_char_boundary(text_input.selection_start));
    }
}

#[test]
fn click_places_cursor_and_drag_extends() {
    let mut frames = Frames::new();
    let input = text_input(&mut frames, "hello");
    let id = input.id;
    frames.mount(Container::column().child(input));
    let origin = frames.bounds(id).origin();

    // Text starts after 4 pixels of padding; glyph 2 begins at x = 24.
    let click = Point::new(origin.x + 25.0, origin.y + 10.0);
    frames.run(InputSnapshot::new().pointer_at(click).click(MouseButton::Left));
    assert_eq!(frames.ctx.focused(), Some(id));
    assert_eq!(frames.input(id).cursor, 2);
    assert_eq!(frames.input(id).selection_start, 2);
    assert_eq!(frames.platform.ime_anchor, Some(Point::new(origin.x + 24.0, origin.y + 2.0)));

    // Past the last glyph the end of the text is nearest.
    let drag = Point::new(origin.x + 50.0, origin.y + 10.0);
    frames.run(InputSnapshot::new().pointer_at(drag).press(MouseButton::Left));
    assert_eq!(frames.input(id).cursor, 5);
    assert_eq!(frames.input(id).selection_start, 2);
}

// =============================================================================
// Clipboard
// =============================================================================

#[test]
fn copy_and_paste_through_platform() {
    let mut frames = Frames::new();
    let input = text_input(&mut frames, "hello");
    let id = input.id;
    frames.mount(Container::column().child(input));
    frames.focus(id);

    frames.run(
        InputSnapshot::new()
            .hotkey(Hotkey::SelectAll)
            .hotkey(Hotkey::Copy),
    );
    assert_eq!(frames.platform.clipboard.as_deref(), Some("hello"));

    frames.run(InputSnapshot::new().hotkey(Hotkey::Paste));
    assert_eq!(frames.platform.paste_requests, 1);
    assert_eq!(frames.text(id), "hello");

    // The host delivers the clipboard text later.
    frames
        .ctx
        .accept_paste_from_clipboard("bye", &mut frames.platform)
        .unwrap();
    assert_eq!(frames.text(id), "bye");
    assert_eq!(frames.input(id).cursor, 3);
    assert_eq!(frames.ctx.drain_events().collect::<Vec<_>>(), vec![Event::TextChange { id }]);
    let origin = frames.bounds(id).origin();
    assert_eq!(frames.platform.ime_anchor, Some(Point::new(origin.x + 34.0, origin.y + 2.0)));
}

#[test]
fn selection_survives_idle_frames() {
    let mut frames = Frames::new();
    let input = text_input(&mut frames, "hello");
    let id = input.id;
    frames.mount(Container::column().child(input));
    frames.focus(id);

    frames.run(InputSnapshot::new().tap(NamedKey::End));
    frames.run(InputSnapshot::new().tap_with(NamedKey::Home, Modifiers::SHIFT));
    assert_eq!(frames.input(id).selection_start, 5);
    assert_eq!(frames.input(id).cursor, 0);

    let events = frames.run(InputSnapshot::new());
    assert!(events.is_empty());
    assert_eq!(frames.text(id), "hello");
    assert_eq!(frames.input(id).selection_start, 5);
    assert_eq!(frames.input(id).cursor, 0);

    let events = frames.run(InputSnapshot::new().hotkey(Hotkey::Copy));
    assert_eq!(text_changes(&events), 0);
    assert_eq!(frames.text(id), "hello");
    assert_eq!(frames.platform.clipboard.as_deref(), Some("hello"));
}

#[test]
fn ime_anchor_stays_inside_viewport() {
    let mut frames = Frames::new();
    let input = text_input(&mut frames, "");
    let id = input.id;
    frames.mount(Container::column().child(input));
    frames.ctx.set_viewport(Size::new(20.0, 100.0));
    frames.focus(id);

    frames
        .ctx
        .accept_paste_from_clipboard("hello", &mut frames.platform)
        .unwrap();
    let origin = frames.bounds(id).origin();
    let anchor = frames.platform.ime_anchor.unwrap();
    assert_eq!(anchor.x, 20.0);
    assert_eq!(anchor.y, origin.y + 2.0);
}

#[test]
fn cut_removes_selection() {
    let mut frames = Frames::new();
    let input = text_input(&mut frames, "hello");
    let id = input.id;
    frames.mount(Container::column().child(input));
    frames.focus(id);

    let events = frames.run(InputSnapshot::new().hotkey(Hotkey::SelectAll).hotkey(Hotkey::Cut));
    assert_eq!(frames.platform.clipboard.as_deref(), Some("hello"));
    assert_eq!(frames.text(id), "");
    assert_eq!(text_changes(&events), 1);
}

#[test]
fn paste_without_focused_input_is_ignored() {
    let mut frames = Frames::new();
    let button = label(&mut frames, 2);
    let id = button.id;
    frames.mount(Container::column().child(button));

    frames
        .ctx
        .accept_paste_from_clipboard("text", &mut frames.platform)
        .unwrap();
    frames.focus(id);
    frames
        .ctx
        .accept_paste_from_clipboard("text", &mut frames.platform)
        .unwrap();
    assert_eq!(frames.ctx.dequeue_event(), None);
}

// =============================================================================
// Layout through the context
// =============================================================================

#[test]
fn overflowing_row_shrinks_by_common_factor() {
    let mut frames = Frames::new();
    let a = label(&mut frames, 10);
    let b = label(&mut frames, 15);
    let (a_id, b_id) = (a.id, b.id);
    frames.mount(Container::row().child(a).child(b));

    // 250 pixels of ideal width in 200: everything scales by 0.8.
    assert_eq!(frames.bounds(a_id).width, 80.0);
    assert_eq!(frames.bounds(b_id).width, 120.0);
    assert_eq!(frames.bounds(b_id).x, 80.0);
}

#[test]
fn growable_children_fill_the_row() {
    let mut frames = Frames::new();
    let a = label(&mut frames, 3).growable(true);
    let b = label(&mut frames, 4);
    let c = label(&mut frames, 2).growable(true);
    let ids = [a.id, b.id, c.id];
    frames.mount(
        Container::row()
            .padding(Padding::all(5.0))
            .child(a)
            .child(b)
            .child(c),
    );

    let total: f32 = ids.iter().map(|&id| frames.bounds(id).width).sum();
    assert_eq!(total, 190.0);
    assert_eq!(frames.bounds(ids[0]).x, 5.0);
    assert_eq!(frames.bounds(ids[2]).right(), 195.0);
}

// =============================================================================
// Focus and capture
// =============================================================================

#[test]
fn focus_change_is_reported_once() {
    let mut frames = Frames::new();
    let input = text_input(&mut frames, "hi");
    let id = input.id;
    let root = frames.mount(Container::column().child(input));
    let click = InputSnapshot::new()
        .pointer_at(frames.center(id))
        .click(MouseButton::Left);

    assert_eq!(
        frames.run(click.clone()),
        vec![Event::FocusChange {
            now_focused: Some(id),
            now_unfocused: None,
            scope: Some(root),
        }]
    );
    assert!(frames.run(click).is_empty());
    assert_eq!(frames.ctx.captor(), Some(id));
}

#[test]
fn clicking_bare_container_keeps_focus() {
    let mut frames = Frames::new();
    let a = label(&mut frames, 2);
    let id = a.id;
    frames.mount(Container::column().child(a));
    frames.focus(id);

    // The root is 200 pixels tall; the button only covers its first line.
    let events = frames.run(
        InputSnapshot::new()
            .pointer_at(Point::new(5.0, 150.0))
            .click(MouseButton::Left),
    );
    assert!(events.is_empty());
    assert_eq!(frames.ctx.focused(), Some(id));
}

#[test]
fn topmost_toplevel_takes_the_click() {
    let mut frames = Frames::new();
    let below = label(&mut frames, 20);
    let above = label(&mut frames, 20);
    let (below_id, above_id) = (below.id, above.id);
    frames.mount_at(Container::column().child(below), Rect::new(0.0, 0.0, 200.0, 200.0));
    frames.mount_at(Container::column().child(above), Rect::new(0.0, 0.0, 200.0, 200.0));

    let events = frames.run(
        InputSnapshot::new()
            .pointer_at(Point::new(10.0, 10.0))
            .click(MouseButton::Left),
    );
    assert_eq!(frames.ctx.focused(), Some(above_id));
    assert!(events.contains(&Event::Button { id: above_id }));
    assert!(!events.contains(&Event::Button { id: below_id }));
}

#[test]
fn tab_cycles_through_focusable_items() {
    let mut frames = Frames::new();
    let a = label(&mut frames, 1);
    let heading = frames.ctx.text_block("not focusable");
    let input = text_input(&mut frames, "");
    let b = label(&mut frames, 1);
    let ids = [a.id, input.id, b.id];
    frames.mount(Container::column().child(a).child(heading).child(input).child(b));

    frames.run(InputSnapshot::new().tap(NamedKey::Tab));
    assert_eq!(frames.ctx.focused(), Some(ids[0]));
    frames.run(InputSnapshot::new().tap(NamedKey::Tab));
    assert_eq!(frames.ctx.focused(), Some(ids[1]));
    frames.run(InputSnapshot::new().repeat(NamedKey::Tab, Modifiers::NONE));
    assert_eq!(frames.ctx.focused(), Some(ids[2]));
    frames.run(InputSnapshot::new().tap(NamedKey::Tab));
    assert_eq!(frames.ctx.focused(), Some(ids[0]));
    frames.run(InputSnapshot::new().tap_with(NamedKey::Tab, Modifiers::SHIFT));
    assert_eq!(frames.ctx.focused(), Some(ids[2]));
}

#[test]
fn destroying_toplevel_releases_focus_and_capture() {
    let mut frames = Frames::new();
    let input = text_input(&mut frames, "");
    let id = input.id;
    let root = frames.mount(Container::column().child(input));
    frames.run(
        InputSnapshot::new()
            .pointer_at(frames.center(id))
            .click(MouseButton::Left),
    );
    assert_eq!(frames.ctx.captor(), Some(id));

    frames.ctx.destroy_toplevel_container(root).unwrap();
    frames.roots.clear();
    assert_eq!(frames.ctx.focused(), None);
    assert_eq!(frames.ctx.captor(), None);
    assert!(frames.ctx.toplevels().is_empty());
    assert_eq!(
        frames.ctx.drain_events().collect::<Vec<_>>(),
        vec![Event::FocusChange {
            now_focused: None,
            now_unfocused: Some(id),
            scope: None,
        }]
    );
}

// =============================================================================
// Lists
// =============================================================================

#[test]
fn wheel_scroll_is_clamped() {
    let mut frames = Frames::new();
    let list = frames.ctx.list((0..10).map(|i| format!("row {i}")));
    let id = list.id;
    frames.mount_at(Container::column().child(list), Rect::new(0.0, 0.0, 100.0, 104.0));
    assert_eq!(frames.bounds(id).height, 104.0);

    // Capture the list by clicking its first row.
    let pointer = Point::new(10.0, 10.0);
    let events = frames.run(InputSnapshot::new().pointer_at(pointer).click(MouseButton::Left));
    assert!(events.contains(&Event::ListSelection { id, index: 0, expand: true }));

    // Ten 26 pixel rows in a 104 pixel window.
    frames.run(InputSnapshot::new().pointer_at(pointer).scroll(Point::new(0.0, -100.0)));
    assert_eq!(frames.scroll_top(id), 260.0 - 104.0);

    frames.run(InputSnapshot::new().pointer_at(pointer).scroll(Point::new(0.0, 100.0)));
    assert_eq!(frames.scroll_top(id), 0.0);
}

#[test]
fn list_keyboard_selection_reports_events() {
    let mut frames = Frames::new();
    let list = frames.ctx.list(["a", "b", "c"]);
    let id = list.id;
    frames.mount(Container::column().child(list));
    frames.focus(id);

    assert_eq!(
        frames.run(InputSnapshot::new().tap(NamedKey::ArrowDown)),
        vec![Event::ListSelection { id, index: 0, expand: false }]
    );
    assert_eq!(
        frames.run(InputSnapshot::new().tap(NamedKey::ArrowUp)),
        vec![Event::ListSelection { id, index: 2, expand: false }]
    );
    assert_eq!(
        frames.run(InputSnapshot::new().tap(NamedKey::Enter)),
        vec![Event::ListSelection { id, index: 2, expand: true }]
    );
}

#[test]
fn hovering_list_rows_is_tracked() {
    let mut frames = Frames::new();
    let list = frames.ctx.list(["a", "b", "c"]);
    let id = list.id;
    frames.mount(Container::column().child(list));

    frames.run(InputSnapshot::new().pointer_at(Point::new(10.0, 30.0)));
    assert!(frames.ctx.anything_hovered());
    let ItemKind::List(list) = &frames.ctx.item(id).unwrap().kind else {
        panic!("expected a list");
    };
    assert_eq!(list.hovered, Some(1));
}
