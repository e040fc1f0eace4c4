use eframe::egui::{
    self, pos2, vec2, Align2, Color32, FontId, Painter, Pos2, Rect, Response, RichText, Shape,
    Stroke, Ui, Vec2,
};
use walkers::{lat_lon, Map, MapMemory, Plugin, Position, Projector};

use super::logos::LogoTextures;
use crate::color::{self, CompanyColors};
use crate::render::map::{GeoPoint, MapView, Marker, MarkerIcon};
use crate::render::screen::{cluster_points, heat_cells, ClusterSize, ScreenCluster};
use crate::state::{AppState, ViewRequest};

/// Markers within this distance (screen points) of a click are hit.
const HIT_RADIUS: f32 = 18.0;

/// Deepest zoom level a cluster click will ask for.
const MAX_FOCUS_ZOOM: f64 = 18.0;

/// Share of the viewport a focused cluster may span.
const FOCUS_FILL: f32 = 0.7;

fn position(p: GeoPoint) -> Position {
    lat_lon(p.lat, p.lon)
}

fn geo_point(p: Position) -> GeoPoint {
    GeoPoint { lat: p.y(), lon: p.x() }
}

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

/// Map state that has to survive between frames.
#[derive(Default)]
pub struct MapWidget {
    memory: MapMemory,
}

impl MapWidget {
    /// Apply a pending viewport request before the map is drawn.
    fn apply(&mut self, request: ViewRequest, home_zoom: u8) {
        let zoom = match request {
            ViewRequest::Reset => {
                self.memory.follow_my_position();
                f64::from(home_zoom)
            }
            ViewRequest::Focus { center, zoom } => {
                self.memory.center_at(position(center));
                zoom
            }
            ViewRequest::None => return,
        };
        if let Err(e) = self.memory.set_zoom(zoom) {
            log::warn!("Ignoring zoom level {zoom}: {e}");
        }
    }
}

/// Center and zoom level that fit `points` (screen positions at `zoom`)
/// inside `viewport`. Never zooms out.
fn focus_on(projector: &Projector, points: &[Pos2], zoom: f64, viewport: Vec2) -> (GeoPoint, f64) {
    let bounds = Rect::from_points(points);
    let center = geo_point(projector.unproject(bounds.center().to_vec2()));
    let extent = bounds.size().max(Vec2::splat(1.0));
    let scale = (viewport.x * FOCUS_FILL / extent.x).min(viewport.y * FOCUS_FILL / extent.y);
    let target = (zoom + f64::from(scale.log2())).min(MAX_FOCUS_ZOOM);
    (center, target.max(zoom))
}

// ---------------------------------------------------------------------------
// Overlay plugin
// ---------------------------------------------------------------------------

enum Hit {
    Marker(usize),
    Cluster(Vec<usize>),
}

/// Outcome of a click on the map.
enum Click {
    Marker(usize),
    Focus { center: GeoPoint, zoom: f64 },
    Background,
}

/// What the overlay saw this frame, read back once the map is drawn.
#[derive(Default)]
struct OverlayFrame {
    click: Option<Click>,
    popup_anchor: Option<Pos2>,
}

/// Heat, clusters, pins and logos drawn through the map projector.
struct PointsOverlay<'a> {
    view: &'a MapView,
    colors: &'a CompanyColors,
    cluster_radius: f32,
    selected: Option<usize>,
    logos: &'a mut LogoTextures,
    frame: &'a mut OverlayFrame,
}

impl Plugin for PointsOverlay<'_> {
    fn run(
        self: Box<Self>,
        ui: &mut Ui,
        response: &Response,
        projector: &Projector,
        map_memory: &MapMemory,
    ) {
        let PointsOverlay {
            view,
            colors,
            cluster_radius,
            selected,
            logos,
            frame,
        } = *self;

        let painter = ui.painter_at(response.rect);
        let to_screen = |p: GeoPoint| projector.project(position(p)).to_pos2();
        let visible_area = response.rect.expand(40.0);

        // ---- Heat overlay ----
        if let Some(heat) = &view.heat {
            let points: Vec<[f32; 2]> = heat
                .points
                .iter()
                .map(|p| to_screen(*p))
                .filter(|p| visible_area.contains(*p))
                .map(|p| [p.x, p.y])
                .collect();
            for cell in heat_cells(&points, heat.radius) {
                paint_heat_cell(&painter, pos2(cell.center[0], cell.center[1]), heat.radius, cell.intensity);
            }
        }

        let Some(layer) = &view.markers else {
            if response.clicked() {
                frame.click = Some(Click::Background);
            }
            return;
        };

        // ---- Markers / clusters ----
        let positions: Vec<Pos2> = layer.markers.iter().map(|m| to_screen(m.position)).collect();
        let groups = if layer.clustered {
            let raw: Vec<[f32; 2]> = positions.iter().map(|p| [p.x, p.y]).collect();
            cluster_points(&raw, cluster_radius)
        } else {
            positions
                .iter()
                .enumerate()
                .map(|(i, p)| ScreenCluster {
                    anchor: [p.x, p.y],
                    center: [p.x, p.y],
                    members: vec![i],
                })
                .collect()
        };

        let mut hits: Vec<(Pos2, Hit)> = Vec::new();
        for group in groups {
            let pos = pos2(group.center[0], group.center[1]);
            if !visible_area.contains(pos) {
                continue;
            }
            if let [only] = group.members[..] {
                let marker = &layer.markers[only];
                let fallback = colors.color_for(Some(marker.popup.company.as_str())).color32();
                let hit_at = paint_marker(&painter, pos, marker, fallback, logos);
                hits.push((hit_at, Hit::Marker(only)));
            } else {
                paint_cluster(&painter, pos, group.size(), group.members.len());
                hits.push((pos, Hit::Cluster(group.members)));
            }
        }

        // ---- Click handling ----
        if response.clicked() {
            let nearest = response.interact_pointer_pos().and_then(|pointer| {
                hits.into_iter()
                    .map(|(pos, hit)| (pos.distance(pointer), hit))
                    .filter(|(d, _)| *d <= HIT_RADIUS)
                    .min_by(|a, b| a.0.total_cmp(&b.0))
                    .map(|(_, hit)| hit)
            });
            frame.click = Some(match nearest {
                Some(Hit::Marker(i)) => Click::Marker(i),
                Some(Hit::Cluster(members)) => {
                    let points: Vec<Pos2> = members.iter().map(|&i| positions[i]).collect();
                    let (center, zoom) =
                        focus_on(projector, &points, map_memory.zoom(), response.rect.size());
                    Click::Focus { center, zoom }
                }
                None => Click::Background,
            });
        }

        frame.popup_anchor = selected
            .and_then(|i| layer.markers.get(i))
            .map(|m| to_screen(m.position));
    }
}

// ---------------------------------------------------------------------------
// Map widget
// ---------------------------------------------------------------------------

/// Render the map with heat, clusters and markers drawn on top.
pub fn map_view(
    ui: &mut Ui,
    state: &mut AppState,
    widget: &mut MapWidget,
    logos: &mut LogoTextures,
    height: f32,
) {
    let request = std::mem::replace(&mut state.view, ViewRequest::None);
    widget.apply(request, state.output.map.zoom);

    let mut frame = OverlayFrame::default();
    let overlay = PointsOverlay {
        view: &state.output.map,
        colors: &state.context.company_colors,
        cluster_radius: state.context.map.cluster_radius,
        selected: state.selected_marker,
        logos,
        frame: &mut frame,
    };
    // No tile source: the map is drawn without fetching anything.
    let map = Map::new(None, &mut widget.memory, position(state.output.map.center))
        .zoom_with_ctrl(false)
        .panning(false)
        .double_click_to_zoom(true)
        .with_plugin(overlay);
    ui.add_sized([ui.available_width(), height], map);

    match frame.click {
        Some(Click::Marker(i)) => state.selected_marker = Some(i),
        Some(Click::Focus { center, zoom }) => {
            state.view = ViewRequest::Focus { center, zoom };
            state.selected_marker = None;
        }
        Some(Click::Background) => state.selected_marker = None,
        None => {}
    }

    // ---- Popup ----
    let selected = state
        .selected_marker
        .zip(frame.popup_anchor)
        .and_then(|(i, anchor)| {
            let marker = state.output.map.markers.as_ref()?.markers.get(i)?;
            Some((anchor, marker.clone()))
        });
    if let Some((anchor, marker)) = selected {
        if marker_popup(ui.ctx(), anchor, &marker) {
            state.selected_marker = None;
        }
    }
}

// ---------------------------------------------------------------------------
// Painting helpers
// ---------------------------------------------------------------------------

fn paint_heat_cell(painter: &Painter, center: Pos2, radius: f32, intensity: f32) {
    let c = color::heat(intensity);
    let alpha = |a: f32| (a * (0.35 + 0.65 * intensity)).clamp(0.0, 255.0) as u8;
    painter.circle_filled(
        center,
        radius * 2.0,
        Color32::from_rgba_unmultiplied(c.r(), c.g(), c.b(), alpha(50.0)),
    );
    painter.circle_filled(
        center,
        radius,
        Color32::from_rgba_unmultiplied(c.r(), c.g(), c.b(), alpha(130.0)),
    );
}

/// Paint one marker anchored at `pos`; returns the point clicks should hit.
fn paint_marker(
    painter: &Painter,
    pos: Pos2,
    marker: &Marker,
    fallback: Color32,
    logos: &mut LogoTextures,
) -> Pos2 {
    if let MarkerIcon::Custom { path, size } = &marker.icon {
        if let Some(texture) = logos.get(painter.ctx(), path) {
            let rect = Rect::from_center_size(pos, vec2(size[0], size[1]));
            let uv = Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));
            painter.image(texture.id(), rect, uv, Color32::WHITE);
            return pos;
        }
    }
    let fill = match marker.icon {
        MarkerIcon::Pin { color } => color.color32(),
        MarkerIcon::Custom { .. } => fallback,
    };
    paint_pin(painter, pos, fill)
}

/// Teardrop pin with its tip on `tip`; returns the head center.
fn paint_pin(painter: &Painter, tip: Pos2, fill: Color32) -> Pos2 {
    let r = 9.0;
    let head = tip - vec2(0.0, 2.0 * r);
    painter.add(Shape::convex_polygon(
        vec![tip, head + vec2(r * 0.8, r * 0.6), head + vec2(-r * 0.8, r * 0.6)],
        fill,
        Stroke::NONE,
    ));
    painter.circle(head, r, fill, Stroke::new(1.0, Color32::from_black_alpha(120)));
    painter.text(head, Align2::CENTER_CENTER, "i", FontId::proportional(11.0), Color32::WHITE);
    head
}

fn paint_cluster(painter: &Painter, center: Pos2, size: ClusterSize, count: usize) {
    let (r, g, b) = match size {
        ClusterSize::Single | ClusterSize::Small => (110, 204, 57),
        ClusterSize::Medium => (240, 194, 12),
        ClusterSize::Large => (241, 128, 23),
    };
    painter.circle_filled(center, 20.0, Color32::from_rgba_unmultiplied(r, g, b, 90));
    painter.circle_filled(center, 15.0, Color32::from_rgba_unmultiplied(r, g, b, 200));
    painter.text(
        center,
        Align2::CENTER_CENTER,
        count.to_string(),
        FontId::proportional(12.0),
        Color32::BLACK,
    );
}

/// Show the popup next to the marker. Returns `true` when closed.
fn marker_popup(ctx: &egui::Context, anchor: Pos2, marker: &Marker) -> bool {
    let mut close = false;
    egui::Area::new(egui::Id::new("marker_popup"))
        .fixed_pos(anchor + vec2(14.0, -14.0))
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.set_max_width(260.0);
                let popup = &marker.popup;
                ui.horizontal(|ui| {
                    if let MarkerIcon::Custom { path, .. } = &marker.icon {
                        ui.add(
                            egui::Image::new(format!("file://{}", path.display()))
                                .max_size(vec2(32.0, 32.0)),
                        );
                    }
                    ui.label(RichText::new(&popup.name).strong());
                });
                ui.label(&popup.company);
                ui.label(&popup.category);
                ui.label(&popup.address);
                if ui.small_button("Close").clicked() {
                    close = true;
                }
            });
        });
    close
}

/// Legend of fallback pin colours, one swatch per company.
pub fn pin_legend(ui: &mut Ui, state: &AppState) {
    egui::CollapsingHeader::new("Pin colors")
        .default_open(false)
        .show(ui, |ui| {
            ui.horizontal_wrapped(|ui| {
                for (company, c) in state.context.company_colors.legend_entries() {
                    ui.label(RichText::new("●").color(c));
                    ui.label(company);
                    ui.add_space(8.0);
                }
            });
        });
}
