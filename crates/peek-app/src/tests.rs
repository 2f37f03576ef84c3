#[cfg(test)]
mod tests {
    use crate::event_loop::{App, ScriptEvent};
    use crate::settings::{save_panel_enabled, MemoryStore};
    use peek_core::{Cursor, PanelRect, Viewport};

    const REPO: &str = "https://github.com/acme/widgets";
    const PR: &str = "https://github.com/acme/widgets/compare/main...feature";

    /// Fresh panel in a 1200x800 viewport sits at {top 20, left 372, 456x760}.
    const INITIAL: PanelRect = PanelRect::new(20, 372, 456, 760);

    fn app_with(store: MemoryStore) -> App {
        App::new(REPO, Viewport::new(1200, 800), Box::new(store))
    }

    fn app() -> App {
        app_with(MemoryStore::new())
    }

    fn open_preview(app: &mut App, text: &str) {
        app.apply(ScriptEvent::TextareaAdded { value: text.into() });
        app.apply(ScriptEvent::Navigate { url: PR.into() });
        app.apply(ScriptEvent::Focus);
        app.settle();
    }

    fn down(x: f32, y: f32) -> ScriptEvent {
        ScriptEvent::PointerDown { x, y }
    }

    fn drag(x: f32, y: f32) -> ScriptEvent {
        ScriptEvent::PointerMove { x, y, pressed: true }
    }

    fn up(x: f32, y: f32) -> ScriptEvent {
        ScriptEvent::PointerUp { x, y }
    }

    fn panel_rect(app: &App) -> PanelRect {
        app.snapshot().panel.expect("panel exists").rect
    }

    // ── Content sync ────────────────────────────

    #[test]
    fn focus_renders_textarea_into_surface() {
        let mut app = app();
        open_preview(&mut app, "# Hi");

        let snap = app.snapshot();
        assert_eq!(snap.link, "ready");
        assert!(snap.textarea_bound);
        let panel = snap.panel.unwrap();
        assert!(panel.visible);
        assert_eq!(panel.rect, INITIAL);
        assert_eq!(
            snap.preview_html.unwrap().trim(),
            r#"<h1 class="markdown-h1">Hi</h1>"#
        );
    }

    #[test]
    fn typing_updates_preview() {
        let mut app = app();
        open_preview(&mut app, "");
        app.apply(ScriptEvent::Input { value: "**bold**".into() });
        app.settle();
        let html = app.snapshot().preview_html.unwrap();
        assert!(html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn typing_before_focus_does_not_create_panel() {
        let mut app = app();
        app.apply(ScriptEvent::TextareaAdded { value: String::new() });
        app.apply(ScriptEvent::Navigate { url: PR.into() });
        app.apply(ScriptEvent::Input { value: "draft".into() });
        app.settle();
        let snap = app.snapshot();
        assert!(snap.panel.is_none());
        assert_eq!(snap.link, "no_panel");
        assert!(app.surface().is_none());
    }

    // ── Minimize / restore ──────────────────────

    #[test]
    fn minimize_then_restore_at_last_rect() {
        let mut app = app();
        open_preview(&mut app, "# Hi");
        app.apply(down(500.0, 40.0));
        app.apply(drag(400.0, 140.0));
        app.apply(up(400.0, 140.0));
        let moved = panel_rect(&app);
        assert_eq!(moved, PanelRect::new(20, 272, 456, 760));

        app.apply(ScriptEvent::MinimizeClick);
        app.settle();
        let snap = app.snapshot();
        assert!(!snap.panel.as_ref().unwrap().visible);
        assert!(snap.restore_control.unwrap().visible);
        assert!(app.surface().unwrap().is_hidden());

        app.apply(ScriptEvent::RestoreClick);
        app.settle();
        let snap = app.snapshot();
        let panel = snap.panel.unwrap();
        assert!(panel.visible);
        assert_eq!(panel.rect, moved);
        assert_eq!(panel.container, moved);
        assert!(!snap.restore_control.unwrap().visible);
        assert!(!app.surface().unwrap().is_hidden());
    }

    #[test]
    fn header_button_click_minimizes() {
        let mut app = app();
        open_preview(&mut app, "");
        app.apply(down(806.0, 42.0));
        app.apply(up(806.0, 42.0));
        app.settle();
        let snap = app.snapshot();
        assert!(!snap.panel.unwrap().visible);
        assert!(snap.restore_control.unwrap().visible);
        assert_eq!(panel_rect(&app), INITIAL);
    }

    #[test]
    fn edits_while_minimized_show_up_after_restore() {
        let mut app = app();
        open_preview(&mut app, "before");
        app.apply(ScriptEvent::MinimizeClick);
        app.settle();
        app.apply(ScriptEvent::Input { value: "after".into() });
        app.settle();
        assert!(app.snapshot().preview_html.unwrap().contains("before"));

        app.apply(ScriptEvent::RestoreClick);
        app.settle();
        assert!(app.snapshot().preview_html.unwrap().contains("after"));
    }

    // ── Geometry through the host ───────────────

    #[test]
    fn drag_beyond_right_edge_stops_at_padding() {
        let mut app = app();
        open_preview(&mut app, "");
        app.apply(down(500.0, 40.0));
        let snap = app.snapshot();
        assert!(!snap.body.user_select);
        assert_eq!(snap.panel.unwrap().handle_cursor, Cursor::Grabbing);

        app.apply(drag(2000.0, 40.0));
        assert_eq!(panel_rect(&app), PanelRect::new(20, 724, 456, 760));

        app.apply(up(2000.0, 40.0));
        let snap = app.snapshot();
        assert!(snap.body.user_select);
        assert_eq!(snap.panel.unwrap().handle_cursor, Cursor::Grab);
    }

    #[test]
    fn east_resize_below_minimum_floors_width() {
        let mut app = app();
        open_preview(&mut app, "");
        app.apply(down(826.0, 400.0));
        assert_eq!(app.snapshot().body.cursor, Cursor::EwResize);

        app.apply(drag(0.0, 400.0));
        let rect = panel_rect(&app);
        assert_eq!(rect.width, 300);
        assert_eq!(rect.left, 372);

        // Released far outside the panel.
        app.apply(up(0.0, 0.0));
        assert_eq!(app.snapshot().body.cursor, Cursor::Default);
    }

    #[test]
    fn pointer_leaving_document_ends_resize() {
        let mut app = app();
        open_preview(&mut app, "");
        app.apply(down(826.0, 400.0));
        app.apply(ScriptEvent::PointerLeave);
        let before = panel_rect(&app);
        app.apply(drag(0.0, 400.0));
        assert_eq!(panel_rect(&app), before);
        assert!(app.snapshot().body.user_select);
    }

    #[test]
    fn second_press_after_lost_release_restores_selection() {
        let mut app = app();
        open_preview(&mut app, "");
        app.apply(down(500.0, 40.0));
        app.apply(drag(520.0, 40.0));
        assert!(!app.snapshot().body.user_select);

        // Pointer-up of the drag was swallowed; the next click lands on the page.
        app.apply(down(100.0, 400.0));
        app.apply(up(100.0, 400.0));
        app.apply(ScriptEvent::PointerMove { x: 120.0, y: 400.0, pressed: false });

        let snap = app.snapshot();
        assert!(snap.body.user_select);
        assert_eq!(snap.body.cursor, Cursor::Default);
        assert_eq!(snap.panel.unwrap().handle_cursor, Cursor::Grab);
        assert_eq!(panel_rect(&app), PanelRect::new(20, 392, 456, 760));
    }

    #[test]
    fn hover_over_header_shows_grab() {
        let mut app = app();
        open_preview(&mut app, "");
        app.apply(ScriptEvent::PointerMove { x: 500.0, y: 40.0, pressed: false });
        assert_eq!(app.snapshot().panel.unwrap().hover_cursor, Cursor::Grab);
    }

    #[test]
    fn viewport_shrink_reflows_panel() {
        let mut app = app();
        open_preview(&mut app, "");
        app.apply(ScriptEvent::Viewport { width: 1200, height: 600 });
        let panel = app.snapshot().panel.unwrap();
        assert_eq!(panel.rect, PanelRect::new(20, 372, 456, 560));
        assert_eq!(panel.container, panel.rect);
    }

    #[test]
    fn hostile_viewport_sizes_keep_panel_on_screen() {
        let mut app = app();
        app.apply(ScriptEvent::Viewport { width: i32::MIN, height: i32::MIN });
        open_preview(&mut app, "");
        assert_eq!(panel_rect(&app), PanelRect::new(20, 20, 300, 200));

        app.apply(ScriptEvent::Viewport { width: 1200, height: 800 });
        assert_eq!(panel_rect(&app), PanelRect::new(20, 20, 300, 200));
    }

    // ── Enabled flag ────────────────────────────

    #[test]
    fn popup_toggle_disables_panel_and_persists() {
        let mut app = app();
        open_preview(&mut app, "");
        app.apply(ScriptEvent::PopupToggle { enabled: false });
        app.settle();
        let snap = app.snapshot();
        assert!(!snap.enabled);
        assert!(!snap.popup_checked);
        assert!(!snap.panel.unwrap().visible);

        app.apply(ScriptEvent::PopupToggle { enabled: true });
        app.settle();
        assert!(app.snapshot().panel.unwrap().visible);
    }

    #[test]
    fn stored_disabled_flag_blocks_panel_creation() {
        let mut store = MemoryStore::new();
        save_panel_enabled(&mut store, false);
        let mut app = app_with(store);
        open_preview(&mut app, "# Hi");
        let snap = app.snapshot();
        assert!(!snap.enabled);
        assert!(snap.panel.is_none());
    }

    // ── Routes & timers ─────────────────────────

    #[test]
    fn textarea_lookup_retries_every_second() {
        let mut app = app();
        app.apply(ScriptEvent::Navigate { url: PR.into() });
        assert!(!app.host().is_textarea_bound());

        app.apply(ScriptEvent::TextareaAdded { value: String::new() });
        app.apply(ScriptEvent::Tick { ms: 999 });
        assert!(!app.host().is_textarea_bound());
        app.apply(ScriptEvent::Tick { ms: 1 });
        assert!(app.host().is_textarea_bound());
        assert_eq!(app.clock_ms(), 1000);
    }

    #[test]
    fn unannounced_location_change_is_found_by_polling() {
        let mut app = app();
        app.apply(ScriptEvent::TextareaAdded { value: String::new() });
        app.apply(ScriptEvent::Location { url: PR.into() });
        assert!(!app.host().is_textarea_bound());
        app.apply(ScriptEvent::Tick { ms: 1000 });
        assert!(app.host().is_textarea_bound());
    }

    #[test]
    fn leaving_pull_request_page_tears_panel_down() {
        let mut app = app();
        open_preview(&mut app, "# Hi");
        app.apply(ScriptEvent::Navigate {
            url: format!("{}/issues", REPO),
        });
        app.settle();
        let snap = app.snapshot();
        assert!(snap.panel.is_none());
        assert_eq!(snap.link, "no_panel");
        assert_eq!(snap.preview_html, None);
        assert!(!snap.textarea_bound);
    }

    // ── Command line ────────────────────────────

    #[test]
    fn cli_accepts_memory_flag_and_script_path() {
        use clap::Parser;
        let cli = crate::Cli::try_parse_from(["peek", "--memory", "demo.jsonl"]).unwrap();
        assert!(cli.memory);
        assert_eq!(cli.script, Some(std::path::PathBuf::from("demo.jsonl")));

        let cli = crate::Cli::try_parse_from(["peek"]).unwrap();
        assert!(!cli.memory);
        assert_eq!(cli.script, None);
    }

    #[test]
    fn cli_rejects_unknown_flags() {
        use clap::Parser;
        assert!(crate::Cli::try_parse_from(["peek", "--memroy"]).is_err());
    }
}
