//! Trellis demo - drives a small dialog through scripted frames.
//!
//! Runs headlessly: each frame is an input snapshot, and every event the
//! dialog produces is logged. Pass a JSON config path as the first argument
//! to override the defaults. Set `RUST_LOG=trellis=debug` to see focus and
//! capture changes.

use anyhow::Context as _;
use tracing_subscriber::EnvFilter;
use trellis::{
    Alignment, BitmapFont, Container, Context, Event, HeadlessPlatform, InputSnapshot, ItemId,
    Justification, Modifiers, MouseButton, NamedKey, Padding, Point, Rect, Size, UiConfig,
};

const VIEWPORT: Size = Size::new(320.0, 240.0);

struct Dialog {
    root: ItemId,
    name: ItemId,
    files: ItemId,
    ok: ItemId,
}

fn build(ctx: &mut Context) -> Dialog {
    let name = ctx.text_input("Name");
    let files = ctx.list([
        "README.md",
        "Cargo.toml",
        "src/lib.rs",
        "src/context.rs",
        "tests/frame_tests.rs",
    ]);
    let ok = ctx.button("OK");
    let cancel = ctx.button("Cancel");
    let ids = (name.id, files.id, ok.id);

    let buttons = ctx.create_item(
        Container::row()
            .justify(Justification::End)
            .child(ok)
            .child(cancel),
    );
    let root = ctx.create_toplevel_container(
        Container::column()
            .padding(Padding::all(8.0))
            .align(Alignment::Stretch)
            .child(name)
            .child(files)
            .child(buttons),
    );

    Dialog {
        root,
        name: ids.0,
        files: ids.1,
        ok: ids.2,
    }
}

fn center(ctx: &Context, id: ItemId) -> Point {
    ctx.item(id).map_or(Point::ORIGIN, |item| {
        Point::new(
            item.bounds.x + item.bounds.width / 2.0,
            item.bounds.y + item.bounds.height / 2.0,
        )
    })
}

fn load_config() -> anyhow::Result<UiConfig> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(UiConfig::default());
    };
    let json = std::fs::read_to_string(&path).with_context(|| format!("reading config {path}"))?;
    let config = UiConfig::from_json_str(&json).with_context(|| format!("parsing config {path}"))?;
    tracing::info!(%path, "loaded config");
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trellis=info")),
        )
        .init();

    let config = load_config()?;
    let mut ctx = Context::new(config, BitmapFont::monospace(8.0, 16.0));
    ctx.set_viewport(VIEWPORT);
    let mut platform = HeadlessPlatform::new();
    let dialog = build(&mut ctx);
    let space = Rect::new(0.0, 0.0, VIEWPORT.width, VIEWPORT.height);

    ctx.lay_out(dialog.root, space)?;
    let frames = [
        InputSnapshot::new()
            .pointer_at(center(&ctx, dialog.name))
            .click(MouseButton::Left),
        InputSnapshot::new().compose("hello world"),
        InputSnapshot::new().tap_with(NamedKey::Home, Modifiers::SHIFT),
        InputSnapshot::new().compose("Hi"),
        InputSnapshot::new().tap(NamedKey::Tab),
        InputSnapshot::new().tap(NamedKey::ArrowDown),
        InputSnapshot::new().tap(NamedKey::ArrowDown),
        InputSnapshot::new().tap(NamedKey::Enter),
        InputSnapshot::new()
            .pointer_at(center(&ctx, dialog.files))
            .scroll(Point::new(0.0, -1.0)),
        InputSnapshot::new()
            .pointer_at(center(&ctx, dialog.ok))
            .click(MouseButton::Left),
    ];

    for (frame, input) in frames.iter().enumerate() {
        ctx.lay_out(dialog.root, space)?;
        ctx.update(input, &mut platform)?;
        for event in ctx.drain_events() {
            match event {
                Event::Button { id } if id == dialog.ok => tracing::info!(frame, "OK pressed"),
                event => tracing::info!(frame, ?event, "event"),
            }
        }
        let commands = ctx.draw().len();
        tracing::debug!(frame, commands, cursor = ?platform.cursor, "frame done");
    }

    if let Some(input) = ctx.item(dialog.name).and_then(|item| item.as_text_input()) {
        tracing::info!(text = input.text.text(), "final name");
    }
    ctx.destroy_toplevel_container(dialog.root)?;
    Ok(())
}
