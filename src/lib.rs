mod api;
mod core;
mod shared;
mod system;

use std::sync::Mutex;

use tauri::{
    menu::{Menu, MenuItem, PredefinedMenuItem},
    tray::TrayIconBuilder,
    AppHandle, Manager, WebviewUrl, WebviewWindowBuilder,
};
use tauri_plugin_global_shortcut::{GlobalShortcutExt, Shortcut, ShortcutState};

use crate::api::commands::popup::lock_popup;
use crate::core::clipboard::{ClipboardMonitor, ClipboardState, HistoryStore};
use crate::core::popup::PopupController;
use crate::shared::emit::emit_event;
use crate::shared::events::AppEvent;
use crate::shared::settings::{snapshot, AppSettings, SharedSettings};

const POPUP_LABEL: &str = "popup-window";
const POPUP_WIDTH: f64 = 380.0;
const POPUP_HEIGHT: f64 = 400.0;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .plugin(tauri_plugin_global_shortcut::Builder::new().build())
        .plugin(tauri_plugin_clipboard_manager::init())
        .setup(|app| {
            // Configuration is constructed once here and passed to every
            // component; nothing reads settings ambiently.
            let settings: SharedSettings = AppSettings::load()
                .unwrap_or_else(|e| {
                    eprintln!("Failed to load settings: {}", e);
                    AppSettings::default()
                })
                .into_shared();

            let history = HistoryStore::new(settings.clone());
            let clip_state = ClipboardState::new();
            let monitor =
                ClipboardMonitor::new(settings.clone(), history.clone_arc(), clip_state.clone());
            let popup = Mutex::new(PopupController::new(history.clone_arc()));

            app.manage(settings.clone());
            app.manage(history);
            app.manage(clip_state);
            app.manage(popup);

            monitor.start(app.handle().clone());
            println!("✅ Clipboard capture started");

            // Tray menu: the popup stays reachable even without the shortcut.
            let open_item =
                MenuItem::with_id(app, "open", "Open Clipboard History", true, None::<&str>)?;
            let pause_item =
                MenuItem::with_id(app, "pause", "Pause/Resume Capture", true, None::<&str>)?;
            let clear_item =
                MenuItem::with_id(app, "clear", "Clear Unpinned Entries", true, None::<&str>)?;
            let separator1 = PredefinedMenuItem::separator(app)?;
            let separator2 = PredefinedMenuItem::separator(app)?;
            let quit_item = MenuItem::with_id(app, "quit", "Quit", true, None::<&str>)?;

            let menu = Menu::with_items(
                app,
                &[
                    &open_item,
                    &separator1,
                    &pause_item,
                    &clear_item,
                    &separator2,
                    &quit_item,
                ],
            )?;

            let mut tray = TrayIconBuilder::with_id("main")
                .menu(&menu)
                .tooltip("Clipboard history");
            if let Some(icon) = app.default_window_icon() {
                tray = tray.icon(icon.clone());
            }
            let _tray = tray
                .on_menu_event(|app, event| match event.id().as_ref() {
                    "open" => toggle_popup(app),
                    "pause" => {
                        let settings = app.state::<SharedSettings>();
                        let paused =
                            api::commands::settings::toggle_capture_inner(app, settings.inner());
                        println!(
                            "[Tray] Clipboard capture {}",
                            if paused { "paused" } else { "resumed" }
                        );
                    }
                    "clear" => {
                        let history = app.state::<HistoryStore>();
                        history.clear_unpinned();
                        emit_event(app, AppEvent::HistoryChanged);
                    }
                    "quit" => {
                        app.exit(0);
                    }
                    _ => {}
                })
                .build(app)?;

            // Register the popup shortcut with retry; a busy desktop sometimes
            // rejects the first attempt right after login.
            let shortcut_str = snapshot(&settings).shortcut;
            match shortcut_str.parse::<Shortcut>() {
                Ok(shortcut) => {
                    if let Err(e) = app.global_shortcut().unregister(shortcut) {
                        println!("ℹ️  Unregister attempt (expected on first run): {}", e);
                    }

                    let mut registered = false;
                    let max_retries = 5;
                    for attempt in 0..max_retries {
                        let result = app.global_shortcut().on_shortcut(
                            shortcut,
                            move |app_handle, _shortcut, event| {
                                if event.state() == ShortcutState::Pressed {
                                    toggle_popup(app_handle);
                                }
                            },
                        );
                        match result {
                            Ok(_) => {
                                println!(
                                    "✅ Registered global shortcut: {} (attempt {})",
                                    shortcut_str,
                                    attempt + 1
                                );
                                registered = true;
                                break;
                            }
                            Err(e) => {
                                if attempt < max_retries - 1 {
                                    let delay_ms = 100 * 2_u64.pow(attempt as u32);
                                    eprintln!(
                                        "⚠️  Shortcut registration attempt {} failed: {}. Retrying in {}ms...",
                                        attempt + 1,
                                        e,
                                        delay_ms
                                    );
                                    std::thread::sleep(std::time::Duration::from_millis(delay_ms));
                                } else {
                                    eprintln!(
                                        "❌ Failed to register popup shortcut after {} attempts: {}",
                                        max_retries, e
                                    );
                                }
                            }
                        }
                    }
                    if !registered {
                        eprintln!(
                            "⚠️  App will continue without a global shortcut. Use the tray menu to open the popup."
                        );
                    }
                }
                Err(e) => eprintln!("Failed to parse popup shortcut '{}': {}", shortcut_str, e),
            }

            println!("✅ Clipboard Popup initialized");
            println!("📋 Global shortcut: {}", shortcut_str);

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            api::commands::history::get_history,
            api::commands::history::activate_entry,
            api::commands::history::toggle_pin,
            api::commands::history::remove_entry,
            api::commands::history::clear_history,
            api::commands::history::clear_unpinned,
            api::commands::history::unpin_all,
            api::commands::popup::popup_view,
            api::commands::popup::popup_hide,
            api::commands::popup::popup_set_query,
            api::commands::popup::popup_key,
            api::commands::pickers::get_picker_categories,
            api::commands::pickers::search_picker,
            api::commands::pickers::copy_picker_item,
            api::commands::pickers::search_gifs,
            api::commands::pickers::copy_gif_url,
            api::commands::settings::get_settings,
            api::commands::settings::save_settings,
            api::commands::settings::toggle_capture,
            api::commands::settings::capture_status,
        ])
        .run(tauri::generate_context!())
        .unwrap_or_else(|e| {
            eprintln!("FATAL: Failed to start Clipboard Popup: {}", e);
            std::process::exit(1);
        });
}

/// Toggle the popup from the shortcut or the tray.
fn toggle_popup(app: &AppHandle) {
    let visible = {
        let popup = app.state::<Mutex<PopupController>>();
        let mut controller = lock_popup(&popup);
        controller.toggle()
    };
    if visible {
        if let Err(e) = show_popup_window(app) {
            eprintln!("Failed to show popup window: {}", e);
        }
    } else {
        hide_popup_window(app);
    }
    let view = {
        let popup = app.state::<Mutex<PopupController>>();
        let view = lock_popup(&popup).view();
        view
    };
    emit_event(app, AppEvent::PopupChanged(view));
}

/// Show (creating on first use) the popup window.
fn show_popup_window(app: &AppHandle) -> tauri::Result<()> {
    if let Some(window) = app.get_webview_window(POPUP_LABEL) {
        position_popup(app, &window);
        window.show()?;
        window.set_focus()?;
        return Ok(());
    }

    let window = WebviewWindowBuilder::new(app, POPUP_LABEL, WebviewUrl::App("index.html".into()))
        .title("Clipboard")
        .inner_size(POPUP_WIDTH, POPUP_HEIGHT)
        .resizable(false)
        .decorations(false)
        .always_on_top(true)
        .skip_taskbar(true)
        .visible(false)
        .build()?;

    // Losing input focus to another application forces the popup hidden.
    let handle = app.clone();
    window.on_window_event(move |event| {
        if let tauri::WindowEvent::Focused(false) = event {
            let popup = handle.state::<Mutex<PopupController>>();
            lock_popup(&popup).hide();
            hide_popup_window(&handle);
        }
    });

    position_popup(app, &window);
    window.show()?;
    window.set_focus()?;
    Ok(())
}

pub(crate) fn hide_popup_window(app: &AppHandle) {
    if let Some(window) = app.get_webview_window(POPUP_LABEL) {
        if let Err(e) = window.hide() {
            eprintln!("Failed to hide popup window: {}", e);
        }
    }
}

/// Place the popup near the mouse cursor or centered, per configuration.
fn position_popup(app: &AppHandle, window: &tauri::WebviewWindow) {
    let settings = snapshot(app.state::<SharedSettings>().inner());
    if settings.popup_position == "mouse" {
        use mouse_position::mouse_position::Mouse;
        if let Mouse::Position { x, y } = Mouse::get_mouse_position() {
            let _ = window.set_position(tauri::Position::Physical(tauri::PhysicalPosition { x, y }));
            return;
        }
        println!("[Popup] Failed to get cursor position, centering instead");
    }
    let _ = window.center();
}
