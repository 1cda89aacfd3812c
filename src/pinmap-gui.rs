//! Pinmap Demo GUI Application
//!
//! This binary hosts the pin map engine inside an egui window. It provides
//! the two collaborators the engine needs:
//! - a [`MapSurface`] implementation painting overlays onto a flat canvas
//!   and hit-testing pointer positions back into engine events
//! - a [`PinSource`] (the seeded sample source) feeding the pin store
//!
//! The host stays deliberately thin: every interaction is translated into an
//! [`EngineEvent`] and handed to [`MapEngine::handle_event`]; painting reads
//! only what the reconciler wrote into the surface.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use std::collections::BTreeMap;
use std::sync::Arc;

use eframe::egui;
use egui::{Align2, Color32, FontId, Pos2, Rect, Stroke, StrokeKind, Vec2};

use pinmap::geo::{project_world, unproject_world};
use pinmap::{
    EngineEvent, GeoBounds, LatLng, MapEngine, MapSurface, MenuAction, MenuTarget, NodeId,
    OverlayAnchor, OverlayContent, OverlayId, OverlaySpec, PinStore, PointerKind, RefreshOutcome,
    SamplePinSource, SideEffect,
};

/// Owner id used for every sample fetch.
const DEMO_OWNER: u64 = 1;

const MIN_ZOOM: f64 = 3.0;
const MAX_ZOOM: f64 = 19.0;

/// Main application entry point that initializes and launches the demo GUI.
fn main() -> eframe::Result {
    env_logger::init();

    // Pin count and seed are configurable for reproducible demo sessions.
    let count = std::env::var("PINMAP_PINS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(120);
    let seed = std::env::var("PINMAP_SEED")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(42);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("Pinmap Demo"),
        ..Default::default()
    };

    eframe::run_native(
        "Pinmap Demo",
        options,
        Box::new(move |_cc| Ok(Box::new(PinmapApp::new(count, seed)))),
    )
}

/// One overlay object retained by the canvas surface.
struct PaintedOverlay {
    position: LatLng,
    anchor: OverlayAnchor,
    z_index: i32,
    content: OverlayContent,
    interactive: bool,
    visible: bool,
    /// Screen rect from the last paint, used for hit-testing
    screen_rect: Option<Rect>,
}

/// Flat-canvas [`MapSurface`]: Web Mercator projection around a movable
/// center, overlays painted back-to-front by z-index.
struct CanvasSurface {
    center: LatLng,
    zoom: f64,
    viewport: Rect,
    overlays: BTreeMap<OverlayId, PaintedOverlay>,
    next_id: OverlayId,
}

impl CanvasSurface {
    fn new(center: LatLng) -> Self {
        Self {
            center,
            zoom: 13.0,
            viewport: Rect::ZERO,
            overlays: BTreeMap::new(),
            next_id: 0,
        }
    }

    fn has_viewport(&self) -> bool {
        self.viewport.width() > 0.0 && self.viewport.height() > 0.0
    }

    /// Pans the view by a screen-space delta.
    fn pan_by_pixels(&mut self, delta: Vec2) {
        let (cx, cy) = project_world(self.center, self.zoom);
        self.center = unproject_world(cx - delta.x as f64, cy - delta.y as f64, self.zoom);
    }

    fn zoom_by(&mut self, steps: f64) {
        self.zoom = (self.zoom + steps).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Topmost interactive overlay under the pointer, if any.
    fn hit_test(&self, pos: Pos2) -> Option<OverlayId> {
        let mut best: Option<(i32, OverlayId)> = None;
        for (&id, overlay) in &self.overlays {
            if !overlay.interactive || !overlay.visible {
                continue;
            }
            if !overlay.screen_rect.is_some_and(|r| r.contains(pos)) {
                continue;
            }
            let key = (overlay.z_index, id);
            if best.map_or(true, |b| key > b) {
                best = Some(key);
            }
        }
        best.map(|(_, id)| id)
    }
}

impl MapSurface for CanvasSurface {
    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn bounds(&self) -> GeoBounds {
        let (cx, cy) = project_world(self.center, self.zoom);
        let half_w = (self.viewport.width() / 2.0) as f64;
        let half_h = (self.viewport.height() / 2.0) as f64;
        let nw = unproject_world(cx - half_w, cy - half_h, self.zoom);
        let se = unproject_world(cx + half_w, cy + half_h, self.zoom);
        GeoBounds::new(se.lat, nw.lng, nw.lat, se.lng)
    }

    fn project(&self, pos: LatLng) -> Option<Pos2> {
        if !self.has_viewport() {
            return None;
        }
        let (x, y) = project_world(pos, self.zoom);
        let (cx, cy) = project_world(self.center, self.zoom);
        Some(self.viewport.center() + Vec2::new((x - cx) as f32, (y - cy) as f32))
    }

    fn create_overlay(&mut self, spec: OverlaySpec) -> OverlayId {
        self.next_id += 1;
        self.overlays.insert(
            self.next_id,
            PaintedOverlay {
                position: spec.position,
                anchor: spec.anchor,
                z_index: spec.z_index,
                content: spec.content,
                interactive: spec.interactive,
                visible: true,
                screen_rect: None,
            },
        );
        self.next_id
    }

    fn set_position(&mut self, id: OverlayId, pos: LatLng) {
        if let Some(overlay) = self.overlays.get_mut(&id) {
            overlay.position = pos;
        }
    }

    fn set_content(&mut self, id: OverlayId, content: OverlayContent) {
        if let Some(overlay) = self.overlays.get_mut(&id) {
            overlay.content = content;
        }
    }

    fn set_z_index(&mut self, id: OverlayId, z: i32) {
        if let Some(overlay) = self.overlays.get_mut(&id) {
            overlay.z_index = z;
        }
    }

    fn set_visible(&mut self, id: OverlayId, visible: bool) {
        if let Some(overlay) = self.overlays.get_mut(&id) {
            overlay.visible = visible;
        }
    }

    fn destroy_overlay(&mut self, id: OverlayId) {
        self.overlays.remove(&id);
    }

    fn pan_to(&mut self, center: LatLng) {
        self.center = center;
    }

    fn fit_bounds(&mut self, bounds: GeoBounds) {
        self.center = bounds.center();
        if !self.has_viewport() {
            return;
        }
        let (wx, ny) = project_world(LatLng::new(bounds.north, bounds.west), self.zoom);
        let (ex, sy) = project_world(LatLng::new(bounds.south, bounds.east), self.zoom);
        let dx = (ex - wx).abs().max(1e-9);
        let dy = (sy - ny).abs().max(1e-9);
        // Leave breathing room around the fitted bounds.
        let zx = (self.viewport.width() as f64 * 0.6 / dx).log2();
        let zy = (self.viewport.height() as f64 * 0.6 / dy).log2();
        self.zoom = (self.zoom + zx.min(zy)).clamp(MIN_ZOOM, MAX_ZOOM);
    }
}

/// The demo application: engine + store + canvas surface.
struct PinmapApp {
    engine: MapEngine,
    store: PinStore,
    source: Arc<SamplePinSource>,
    surface: CanvasSurface,
    /// Node currently under the pointer, for enter/leave synthesis
    hovered_node: Option<NodeId>,
    /// Simulate touch input (two-tap select) instead of mouse hover
    touch_input: bool,
    /// Whether the initial refresh has been kicked off
    started: bool,
}

impl PinmapApp {
    fn new(count: usize, seed: u64) -> Self {
        let center = LatLng::new(37.5665, 126.9780);
        Self {
            engine: MapEngine::new(),
            store: PinStore::new(),
            source: Arc::new(SamplePinSource::with_config(center, count, seed)),
            surface: CanvasSurface::new(center),
            hovered_node: None,
            touch_input: false,
            started: false,
        }
    }

    fn pointer_kind(&self) -> PointerKind {
        if self.touch_input {
            PointerKind::Touch
        } else {
            PointerKind::Mouse
        }
    }

    fn send(&mut self, event: EngineEvent) {
        if let Some(SideEffect::DeletePin(id)) = self.engine.handle_event(&mut self.surface, event)
        {
            self.store
                .delete_then_refresh(Arc::clone(&self.source) as Arc<dyn pinmap::PinSource>, id, DEMO_OWNER);
        }
    }

    /// Synthesizes enter/leave events from the pointer position.
    fn update_hover(&mut self, pointer: Option<Pos2>) {
        let current = pointer
            .and_then(|pos| self.surface.hit_test(pos))
            .and_then(|overlay| self.engine.node_for_overlay(overlay).cloned());

        if current == self.hovered_node {
            return;
        }
        if let Some(prev) = self.hovered_node.take() {
            self.send(EngineEvent::NodeLeave { node: prev });
        }
        if let Some(node) = current.clone() {
            // Touch devices have no hover; the engine's tap policy covers it.
            if !self.touch_input {
                self.send(EngineEvent::NodeEnter { node });
            }
        }
        self.hovered_node = current;
    }

    fn handle_map_input(&mut self, ctx: &egui::Context, response: &egui::Response) {
        if response.drag_started() {
            self.send(EngineEvent::DragStart {
                pointer: self.pointer_kind(),
            });
        }
        if response.dragged() {
            self.surface.pan_by_pixels(response.drag_delta());
            self.engine.on_view_changed(&mut self.surface);
        }

        if response.hovered() {
            let scroll = ctx.input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                self.surface.zoom_by(scroll as f64 / 240.0);
                self.engine.on_view_changed(&mut self.surface);
            }
        }

        self.update_hover(response.hover_pos());

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                match self
                    .surface
                    .hit_test(pos)
                    .and_then(|o| self.engine.node_for_overlay(o).cloned())
                {
                    Some(node) => self.send(EngineEvent::NodeClick {
                        node,
                        pointer: self.pointer_kind(),
                    }),
                    None => self.send(EngineEvent::BackgroundClick),
                }
            }
        }

        if response.secondary_clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                match self
                    .surface
                    .hit_test(pos)
                    .and_then(|o| self.engine.node_for_overlay(o).cloned())
                {
                    Some(node) => self.send(EngineEvent::NodeContextClick {
                        node,
                        screen_pos: pos,
                    }),
                    None => {
                        let rel = pos - self.surface.viewport.center();
                        let (cx, cy) = project_world(self.surface.center, self.surface.zoom);
                        let position = unproject_world(
                            cx + rel.x as f64,
                            cy + rel.y as f64,
                            self.surface.zoom,
                        );
                        self.send(EngineEvent::MapContextClick {
                            screen_pos: pos,
                            position,
                        });
                    }
                }
            }
        }

        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.send(EngineEvent::BackgroundClick);
        }
    }

    /// Paints all overlays back-to-front and records their hit rects.
    fn paint_overlays(&mut self, painter: &egui::Painter) {
        let mut order: Vec<OverlayId> = self.surface.overlays.keys().copied().collect();
        order.sort_by_key(|id| (self.surface.overlays[id].z_index, *id));

        for id in order {
            let Some(screen) = self
                .surface
                .project(self.surface.overlays[&id].position)
            else {
                continue;
            };
            let overlay = self.surface.overlays.get_mut(&id).unwrap();
            if !overlay.visible {
                overlay.screen_rect = None;
                continue;
            }
            let rect = if overlay.interactive {
                match overlay.anchor {
                    OverlayAnchor::BottomCenter => paint_marker(painter, screen, &overlay.content),
                    OverlayAnchor::Center => paint_cluster(painter, screen, &overlay.content),
                }
            } else {
                paint_info_box(painter, screen, &overlay.content)
            };
            overlay.screen_rect = Some(rect);
        }
    }

    fn render_context_menu(&mut self, ctx: &egui::Context) {
        if !self.engine.menu.is_open() {
            return;
        }
        let target = self.engine.menu.target();
        let pos = self.engine.menu.screen_pos();

        let mut action: Option<MenuAction> = None;
        egui::Area::new(egui::Id::new("pinmap-context-menu"))
            .fixed_pos(pos)
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_min_width(140.0);
                    match target {
                        Some(MenuTarget::Pin(_)) => {
                            if ui.button("Edit listing").clicked() {
                                action = Some(MenuAction::EditPin);
                            }
                            if ui.button("Delete listing").clicked() {
                                action = Some(MenuAction::DeletePin);
                            }
                            if ui.button("Roadview").clicked() {
                                action = Some(MenuAction::OpenRoadview);
                            }
                        }
                        Some(MenuTarget::Ground(_)) => {
                            if ui.button("New listing here").clicked() {
                                action = Some(MenuAction::CreatePin);
                            }
                            if ui.button("Roadview").clicked() {
                                action = Some(MenuAction::OpenRoadview);
                            }
                        }
                        None => {}
                    }
                });
            });

        if let Some(action) = action {
            self.send(EngineEvent::MenuAction(action));
        }
    }

    fn render_workflow_window(&mut self, ctx: &egui::Context) {
        if !self.engine.modes.is_creating() && !self.engine.modes.is_edit_mode() {
            return;
        }
        let title = if self.engine.modes.is_creating() {
            "New listing"
        } else {
            "Edit listing"
        };
        let mut finished = false;
        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                if let Some(pos) = self.engine.create_position() {
                    ui.label(format!("Position: {:.5}, {:.5}", pos.lat, pos.lng));
                }
                if let Some(pin) = self.engine.selection.selected_pin() {
                    ui.label(format!("Listing #{} — {}", pin.id, pin.display_name()));
                }
                ui.label("(The real form lives outside the engine.)");
                if ui.button("Done").clicked() {
                    finished = true;
                }
            });
        if finished {
            self.send(EngineEvent::WorkflowFinished);
        }
    }

    fn render_inspector(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("inspector")
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.heading("Pinmap");
                ui.separator();

                ui.label(format!("Pins: {}", self.store.pins().len()));
                ui.label(format!("Nodes: {}", self.engine.nodes().len()));
                ui.label(format!("Zoom: {:.1}", self.surface.zoom));
                if self.store.is_refreshing() {
                    ui.label("Refreshing…");
                }

                ui.separator();
                ui.checkbox(&mut self.touch_input, "Touch input (two-tap select)");

                let mut selected_theme = self.engine.themes.current_theme().name.clone();
                egui::ComboBox::from_label("Theme")
                    .selected_text(selected_theme.clone())
                    .show_ui(ui, |ui| {
                        let names: Vec<String> = self
                            .engine
                            .themes
                            .list_themes()
                            .iter()
                            .map(|s| s.to_string())
                            .collect();
                        for name in names {
                            ui.selectable_value(&mut selected_theme, name.clone(), name);
                        }
                    });
                if selected_theme != self.engine.themes.current_theme().name {
                    let _ = self.engine.set_theme(&selected_theme, &mut self.surface);
                }

                if ui.button("Refresh pins").clicked() {
                    self.store
                        .refresh(Arc::clone(&self.source) as Arc<dyn pinmap::PinSource>, DEMO_OWNER);
                }

                ui.separator();
                match self.engine.selection.selected_pin() {
                    Some(pin) => {
                        ui.heading(pin.display_name());
                        ui.label(format!("#{} · {:?}", pin.id, pin.status));
                        ui.label(pinmap::presentation::summary::deal_summary(pin));
                        if !pin.keywords.is_empty() {
                            ui.label(pin.keywords.join(", "));
                        }
                    }
                    None => {
                        ui.label("No listing selected.");
                    }
                }

                if self.engine.modes.is_roadview_mode() {
                    ui.separator();
                    ui.label("Roadview active");
                }
            });
    }
}

impl eframe::App for PinmapApp {
    /// Main update loop: poll the store, run the map canvas, render chrome.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply a completed background refresh to the engine.
        match self.store.poll() {
            RefreshOutcome::Applied { .. } | RefreshOutcome::Failed => {
                let pins = self.store.pins().to_vec();
                self.engine.apply_pins(pins, &mut self.surface);
            }
            RefreshOutcome::None => {}
        }

        self.render_inspector(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            let (response, painter) =
                ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
            self.surface.viewport = response.rect;

            // The engine defers all work until the surface can project.
            if self.surface.has_viewport() && !self.engine.is_surface_ready() {
                self.engine.set_surface_ready(&mut self.surface);
            }
            if !self.started && self.engine.is_surface_ready() {
                self.started = true;
                self.store
                    .refresh(Arc::clone(&self.source) as Arc<dyn pinmap::PinSource>, DEMO_OWNER);
            }

            painter.rect_filled(response.rect, 0.0, Color32::from_rgb(230, 233, 228));
            self.handle_map_input(ctx, &response);
            self.paint_overlays(&painter);
        });

        self.render_context_menu(ctx);
        self.render_workflow_window(ctx);

        // Keep polling while a refresh is in flight.
        if self.store.is_refreshing() {
            ctx.request_repaint();
        }
    }
}

// ===== Overlay Painting =====

fn text_width(text: &str) -> f32 {
    10.0 + 7.0 * text.chars().count() as f32
}

/// Paints a pin/stack marker hanging above its coordinate. Returns the hit rect.
fn paint_marker(painter: &egui::Painter, anchor: Pos2, content: &OverlayContent) -> Rect {
    let w = text_width(&content.label).max(36.0) * content.scale;
    let h = 22.0 * content.scale;
    let rect = Rect::from_min_size(Pos2::new(anchor.x - w / 2.0, anchor.y - h - 6.0), Vec2::new(w, h));

    painter.rect_filled(rect, 5.0, content.fill);
    if let Some(outline) = content.outline {
        painter.rect_stroke(rect.expand(1.5), 6.0, Stroke::new(2.0, outline), StrokeKind::Outside);
    }
    // Stem connecting the marker to its coordinate.
    painter.add(egui::Shape::convex_polygon(
        vec![
            Pos2::new(anchor.x - 4.0, rect.bottom()),
            Pos2::new(anchor.x + 4.0, rect.bottom()),
            anchor,
        ],
        content.fill,
        Stroke::NONE,
    ));
    painter.text(
        rect.center(),
        Align2::CENTER_CENTER,
        &content.label,
        FontId::proportional(11.0),
        content.text_color,
    );

    if let Some(badge) = content.badge {
        let badge_center = Pos2::new(rect.right(), rect.top());
        painter.circle_filled(badge_center, 8.0, Color32::from_rgb(220, 38, 38));
        painter.text(
            badge_center,
            Align2::CENTER_CENTER,
            badge.to_string(),
            FontId::proportional(10.0),
            Color32::WHITE,
        );
    }
    rect
}

/// Paints a cluster disc centered on its centroid. Returns the hit rect.
fn paint_cluster(painter: &egui::Painter, center: Pos2, content: &OverlayContent) -> Rect {
    let radius = (14.0 + 2.0 * content.label.chars().count() as f32) * content.scale;
    painter.circle_filled(center, radius, content.fill);
    if let Some(outline) = content.outline {
        painter.circle_stroke(center, radius + 1.5, Stroke::new(2.0, outline));
    }
    painter.text(
        center,
        Align2::CENTER_CENTER,
        &content.label,
        FontId::proportional(12.0),
        content.text_color,
    );
    Rect::from_center_size(center, Vec2::splat(radius * 2.0))
}

/// Paints the hover info box above its anchor. Returns the painted rect.
fn paint_info_box(painter: &egui::Painter, anchor: Pos2, content: &OverlayContent) -> Rect {
    let summary = content.sublabel.as_deref().unwrap_or("");
    let w = text_width(&content.label).max(text_width(summary)).max(120.0);
    let h = 40.0;
    let rect = Rect::from_min_size(
        Pos2::new(anchor.x - w / 2.0, anchor.y - h - 34.0),
        Vec2::new(w, h),
    );

    painter.rect_filled(rect, 6.0, content.fill);
    if let Some(outline) = content.outline {
        painter.rect_stroke(rect, 6.0, Stroke::new(1.5, outline), StrokeKind::Outside);
    }
    painter.text(
        Pos2::new(rect.left() + 8.0, rect.top() + 6.0),
        Align2::LEFT_TOP,
        &content.label,
        FontId::proportional(12.0),
        content.text_color,
    );
    painter.text(
        Pos2::new(rect.left() + 8.0, rect.top() + 22.0),
        Align2::LEFT_TOP,
        summary,
        FontId::proportional(11.0),
        content.text_color,
    );
    rect
}
