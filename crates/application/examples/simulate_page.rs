//! Example: run the userscript against a simulated page.
//!
//! Run with: cargo run -p userscript-application --example simulate_page -- [user-agent] [db-path]
//!
//! Without arguments an Android phone is simulated with in-memory storage.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use userscript_application::{
    menu_command, App, AppConfig, Capabilities, ExampleModule, InMemoryMenu, InMemoryNotifier,
    KeyPress, MobileModule, PageEnvironment, PERFORM_ACTION_LABEL, SHOW_STATS_LABEL,
    SHOW_VISIT_COUNT_LABEL,
};
use userscript_detect::DeviceProfile;
use userscript_dom::{DomWriter, MemoryDom};
use userscript_gesture::{Phase, PointerSample, RawInput, TokioScheduler};
use userscript_storage::{Database, Storage};

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 13; Pixel 7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Mobile Safari/537.36";

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("userscript_application=debug,userscript_dom=debug")
        .init();

    let mut args = std::env::args().skip(1);
    let user_agent = args.next().unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
    let storage = match args.next().map(PathBuf::from) {
        Some(path) => Storage::new(Arc::new(Database::open(&path)?)),
        None => Storage::in_memory(),
    };

    let device = DeviceProfile::detect(&user_agent, user_agent.contains("Mobile"));
    println!("=== Simulated page ===\n{}\n", device.summary());

    let dom = Arc::new(MemoryDom::without_body());
    dom.set_viewport(412.0, 915.0);
    let menu = Arc::new(InMemoryMenu::new());
    let notifier = Arc::new(InMemoryNotifier::new());
    let scheduler = Arc::new(
        TokioScheduler::current().ok_or_else(|| anyhow::anyhow!("no tokio runtime"))?,
    );
    let env = PageEnvironment::new(
        Arc::clone(&dom),
        storage,
        Capabilities::none()
            .with_menu(menu.clone())
            .with_notifier(notifier.clone()),
        device,
        scheduler,
    );
    let config = AppConfig {
        dev_mode: true,
        ..AppConfig::default()
    };
    let app = App::new(config, env);

    // The page finishes parsing a little after the script starts.
    {
        let dom = Arc::clone(&dom);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            if let Some(html) = dom.document_element() {
                let body = dom.create_element("body");
                dom.append_child(&html, &body);
            }
        });
    }

    app.start().await?;
    println!("Menu: {:?}", menu.labels());

    let button = app
        .environment()
        .watcher
        .watch("button.example-module-button", None, app.config().element_timeout())
        .await?;
    println!("Action button: {:?} \"{}\"", button, dom.text_content(&button));

    app.handle_input(&RawInput::touch(
        Phase::Start,
        vec![PointerSample::new(20.0, 300.0, 1)],
    ));
    app.handle_input(&RawInput::touch(
        Phase::Move,
        vec![PointerSample::new(180.0, 300.0, 1)],
    ));
    app.handle_input(&RawInput::touch(Phase::End, Vec::new()));
    // Rotate to landscape.
    app.handle_input(&RawInput::Viewport {
        width: 915.0,
        height: 412.0,
    });

    if let Some(mobile) = app.module::<MobileModule<MemoryDom>>() {
        let example = app.module::<ExampleModule<MemoryDom>>();
        let quick_menu = mobile.create_menu(vec![(
            "Quick action",
            menu_command(move || {
                if let Some(example) = &example {
                    example.perform_action("mobile-menu");
                }
            }),
        )]);
        mobile.show_menu(&quick_menu, Some((20.0, 300.0)));
        mobile.activate(&quick_menu, 0);
        println!("Mobile menu shown and activated");
    }

    app.handle_key(&KeyPress::new("E", true, true));
    menu.invoke(PERFORM_ACTION_LABEL);
    menu.invoke(SHOW_STATS_LABEL);
    menu.invoke(SHOW_VISIT_COUNT_LABEL);

    tokio::time::sleep(Duration::from_millis(500)).await;

    for notification in notifier.notifications() {
        println!("[{}]\n{}\n", notification.title, notification.message);
    }
    println!("Done.");
    Ok(())
}
