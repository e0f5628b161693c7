//! osrbrowser — a multi-tab desktop shell embedding an off-screen-rendered
//! web engine, with an AI chat panel docked beside the page.
//!
//! Entry point: initializes logging and opens the main browser window.
//! When built without the `gui` feature, runs a console demo that walks the
//! headless pipeline instead.

use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("osrbrowser=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(feature = "gui")]
fn main() {
    init_logging();
    osrbrowser::ui::shell::run();
}

#[cfg(not(feature = "gui"))]
fn main() {
    init_logging();

    println!();
    println!("osrbrowser v{} — headless demo", env!("CARGO_PKG_VERSION"));
    println!();

    demo_frame_buffer();
    demo_tab_registry();
    demo_pipeline();
    demo_shortcuts();
    demo_settings();

    println!("All components demonstrated.");
}

#[cfg(not(feature = "gui"))]
fn section(name: &str) {
    println!("--- {} ---", name);
}

#[cfg(not(feature = "gui"))]
fn demo_frame_buffer() {
    use osrbrowser::managers::frame_buffer::{
        calculate_stride, FrameBufferManager, FrameBufferManagerTrait,
    };
    use osrbrowser::types::frame::{BufferSize, DirtyRect};
    section("Frame Buffer Manager");

    let frames = FrameBufferManager::new();
    let size = BufferSize::new(640, 480);
    let mut dest = frames.allocate(size).expect("allocate");
    println!(
        "  Allocated {}x{} buffer, stride {} ({} bytes)",
        dest.width(),
        dest.height(),
        dest.stride(),
        dest.data().len()
    );
    assert_eq!(dest.stride(), calculate_stride(640));

    let src = vec![0xABu8; 640 * 4 * 480];
    frames.copy_full(&mut dest, &src, size).expect("copy_full");
    println!("  Full copy OK");

    let rects = [DirtyRect::new(10, 10, 100, 50), DirtyRect::new(-5, 0, 50, 50)];
    frames.copy_dirty(&mut dest, &src, size, &rects).expect("copy_dirty");
    println!("  Dirty copy OK (1 valid rect applied, 1 out-of-bounds rect skipped)");
    println!();
}

#[cfg(not(feature = "gui"))]
fn demo_tab_registry() {
    use osrbrowser::managers::tab_registry::TabRegistry;
    use osrbrowser::types::tab::SurfaceId;
    section("Tab Registry");

    let registry = TabRegistry::new();
    let (a, _) = registry.create_tab("https://example.com", SurfaceId(1));
    let (_b, _) = registry.create_tab("https://docs.rs", SurfaceId(2));
    let (_c, _) = registry.create_tab("https://crates.io", SurfaceId(3));
    println!("  Created 3 tabs, active index = {:?}", registry.active_index());

    registry.set_active(0).expect("set_active");
    registry.close_tab(0).expect("close_tab");
    println!(
        "  Closed active tab {}, active shifted to index {:?}",
        a,
        registry.active_index()
    );

    let (summaries, active) = registry.summaries();
    println!("  {} tabs remain, active = {:?}", summaries.len(), active);
    println!();
}

#[cfg(not(feature = "gui"))]
fn demo_pipeline() {
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::time::Duration;

    use osrbrowser::controller::{BrowserController, ShellEvent, ShellNotifier};
    use osrbrowser::engine::null::NullEngine;
    use osrbrowser::managers::tab_registry::TabRegistry;
    use osrbrowser::types::tab::SurfaceId;
    section("End-to-end pipeline (null engine)");

    struct ChannelNotifier(mpsc::Sender<ShellEvent>);
    impl ShellNotifier for ChannelNotifier {
        fn notify(&self, event: ShellEvent) {
            let _ = self.0.send(event);
        }
    }

    let (tx, rx) = mpsc::channel();
    let controller =
        BrowserController::new(Arc::new(TabRegistry::new()), Arc::new(ChannelNotifier(tx)));
    let engine = NullEngine::new(controller.clone());
    controller.set_engine(engine.clone());

    let id = controller.new_tab("https://example.com", SurfaceId(1));
    println!("  Opened {} — waiting for the engine to paint", id);

    let mut frames = 0;
    while let Ok(event) = rx.recv_timeout(Duration::from_millis(500)) {
        if event == ShellEvent::FrameReady(id) {
            frames += 1;
            break;
        }
    }
    let frame = controller.registry().frame_snapshot(id);
    println!(
        "  Received {} frame(s); buffer = {:?}",
        frames,
        frame.map(|(_, size, stride)| (size.width, size.height, stride))
    );

    let source = controller
        .page_source(Some(Duration::from_millis(1000)))
        .expect("engine attached");
    println!(
        "  Page source: {} bytes",
        source.map(|s| s.len()).unwrap_or(0)
    );

    controller.shutdown();
    println!("  Shutdown complete, {} tabs left", controller.registry().len());
    println!();
}

#[cfg(not(feature = "gui"))]
fn demo_shortcuts() {
    use osrbrowser::managers::shortcut_manager::{ShortcutManager, ShortcutManagerTrait};
    section("Shortcut Manager");

    let mgr = ShortcutManager::new();
    println!("  Loaded {} default shortcuts", mgr.list_shortcuts().len());
    println!("  new_tab = {:?}", mgr.get_shortcut("new_tab"));
    println!("  Ctrl+T resolves to {:?}", mgr.action_for_combo("Ctrl+T"));
    println!();
}

#[cfg(not(feature = "gui"))]
fn demo_settings() {
    use osrbrowser::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
    section("Settings Engine");

    let dir = std::env::temp_dir().join("osrbrowser-demo");
    let path = dir.join("settings.json").to_string_lossy().to_string();
    let mut engine = SettingsEngine::new(Some(path));
    let settings = engine.load().expect("load settings");
    println!("  Pump interval: {} ms", settings.engine.pump_interval_ms);
    println!("  Chat panel width: {} px", settings.chat.panel_width);

    engine
        .set_value("engine.pump_interval_ms", serde_json::json!(16))
        .expect("set_value");
    println!(
        "  Changed pump interval to {} ms",
        engine.get_settings().engine.pump_interval_ms
    );
    let _ = std::fs::remove_dir_all(dir);
    println!();
}
