use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use glam::DVec2;
use maptext_common::{LatLng, OverlayId};
use maptext_overlay::{TextOverlay, TextStyle};
use maptext_render::{BackendKind, TextRenderer, Visibility};

use crate::view::{ViewConfig, ViewState};

/// Statistics for one drawing pass over every overlay.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PassStats {
    pub visible: usize,
    pub hidden: usize,
    pub pass_time: Duration,
}

impl PassStats {
    fn record(&mut self, vis: Option<Visibility>) {
        match vis {
            Some(Visibility::Visible) => self.visible += 1,
            Some(Visibility::Hidden) => self.hidden += 1,
            None => {}
        }
    }
}

/// A map view owning a set of text overlays and the renderer drawing them.
pub struct Map<R: TextRenderer> {
    view: ViewState,
    renderer: R,
    overlays: BTreeMap<OverlayId, TextOverlay>,
    last_pass: PassStats,
}

impl<R: TextRenderer> Map<R> {
    pub fn new(config: &ViewConfig, mut renderer: R) -> Self {
        let view = ViewState::new(config);
        renderer.update_bounds(&view);
        Self {
            view,
            renderer,
            overlays: BTreeMap::new(),
            last_pass: PassStats::default(),
        }
    }

    /// Take ownership of an overlay and add it to the display.
    ///
    /// Returns `None`, dropping the overlay, if its id is already on the map
    /// or it is still bound to another display.
    pub fn add_overlay(&mut self, mut overlay: TextOverlay) -> Option<OverlayId> {
        let id = overlay.id();
        if self.overlays.contains_key(&id) {
            tracing::warn!(%id, "overlay id already on map, ignoring add");
            return None;
        }
        let Some(vis) = maptext_render::add(&mut overlay, &mut self.renderer, &self.view) else {
            tracing::warn!(%id, "overlay rejected by renderer pipeline");
            return None;
        };
        tracing::debug!(%id, text = overlay.text(), ?vis, "overlay added to map");
        self.overlays.insert(id, overlay);
        self.refresh_immediate();
        Some(id)
    }

    /// Remove an overlay from the display and hand it back.
    pub fn remove_overlay(&mut self, id: OverlayId) -> Option<TextOverlay> {
        let mut overlay = self.overlays.remove(&id)?;
        maptext_render::remove(&mut overlay, &mut self.renderer);
        self.refresh_immediate();
        Some(overlay)
    }

    /// Replace an overlay's style. Returns false for unknown ids.
    pub fn set_overlay_style(&mut self, id: OverlayId, style: TextStyle) -> bool {
        let Some(overlay) = self.overlays.get_mut(&id) else {
            tracing::warn!(%id, "restyle of unknown overlay ignored");
            return false;
        };
        maptext_render::restyle(overlay, &mut self.renderer, style);
        self.refresh_immediate();
        true
    }

    /// Jump to a new center and zoom, then reproject everything.
    pub fn set_view(&mut self, center: LatLng, zoom: f64) -> PassStats {
        self.view.reset(center, zoom);
        self.view_changed()
    }

    /// Pan by `offset` container pixels, then reproject everything.
    pub fn pan_by(&mut self, offset: DVec2) -> PassStats {
        self.view.pan_by(offset);
        self.view_changed()
    }

    pub fn resize(&mut self, width: u32, height: u32) -> PassStats {
        self.view.resize(width, height);
        self.view_changed()
    }

    /// Draw every overlay again from its last projection.
    pub fn redraw(&mut self) -> PassStats {
        let _span = tracing::info_span!("maptext_redraw").entered();
        let start = Instant::now();
        let mut stats = PassStats::default();

        self.renderer.begin_pass();
        for overlay in self.overlays.values() {
            stats.record(maptext_render::redraw(overlay, &mut self.renderer));
        }
        self.renderer.end_pass();

        stats.pass_time = start.elapsed();
        self.last_pass = stats;
        stats
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    pub fn overlay(&self, id: OverlayId) -> Option<&TextOverlay> {
        self.overlays.get(&id)
    }

    pub fn overlays(&self) -> impl Iterator<Item = &TextOverlay> {
        self.overlays.values()
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    pub fn last_pass(&self) -> PassStats {
        self.last_pass
    }

    fn view_changed(&mut self) -> PassStats {
        let _span = tracing::info_span!("maptext_view_changed").entered();
        let start = Instant::now();
        let mut stats = PassStats::default();

        self.renderer.update_bounds(&self.view);
        self.renderer.begin_pass();
        for overlay in self.overlays.values_mut() {
            stats.record(maptext_render::view_changed(overlay, &mut self.renderer, &self.view));
        }
        self.renderer.end_pass();

        stats.pass_time = start.elapsed();
        tracing::debug!(
            visible = stats.visible,
            hidden = stats.hidden,
            zoom = self.view.zoom(),
            "view pass complete"
        );
        self.last_pass = stats;
        stats
    }

    // immediate backends share one surface, so any change repaints all of it
    fn refresh_immediate(&mut self) {
        if self.renderer.kind() == BackendKind::Immediate {
            self.redraw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maptext_common::AdvanceMetrics;
    use maptext_render::RendererConfig;
    use maptext_render_canvas::{CanvasRenderer, DrawCommand, RecordingSurface};
    use maptext_render_svg::SvgRenderer;

    fn config() -> ViewConfig {
        ViewConfig {
            center: LatLng::new(0.0, 0.0),
            zoom: 2.0,
            size: [400, 300],
        }
    }

    fn fill_texts(map: &Map<CanvasRenderer>) -> Vec<String> {
        map.renderer()
            .surface()
            .visible_text()
            .into_iter()
            .filter_map(|c| match c {
                DrawCommand::FillText { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn canvas_map_draws_visible_labels_only() {
        let mut map = Map::new(&config(), CanvasRenderer::default());
        map.add_overlay(TextOverlay::new([0.0, 0.0], "Null Island", TextStyle::default()));
        map.add_overlay(TextOverlay::new([60.0, 170.0], "Far", TextStyle::default()));

        assert_eq!(fill_texts(&map), vec!["Null Island".to_string()]);
        assert_eq!(map.last_pass().visible, 1);
        assert_eq!(map.last_pass().hidden, 1);
    }

    #[test]
    fn pan_brings_label_into_view() {
        let mut map = Map::new(&config(), CanvasRenderer::default());
        let far = map
            .add_overlay(TextOverlay::new([0.0, 120.0], "East", TextStyle::default()))
            .unwrap();
        assert!(fill_texts(&map).is_empty());

        let before = map.overlay(far).and_then(|o| o.point());
        let stats = map.pan_by(DVec2::new(340.0, 0.0));
        assert_eq!(stats.visible, 1);
        assert_eq!(fill_texts(&map), vec!["East".to_string()]);
        // layer space is stable while panning
        assert_eq!(map.overlay(far).and_then(|o| o.point()), before);
    }

    #[test]
    fn remove_erases_from_canvas() {
        let mut map = Map::new(&config(), CanvasRenderer::default());
        let id = map
            .add_overlay(TextOverlay::new([0.0, 0.0], "Gone", TextStyle::default()))
            .unwrap();
        let removed = map.remove_overlay(id).unwrap();
        assert!(!removed.is_bound());
        assert!(fill_texts(&map).is_empty());
        assert!(map.is_empty());
        assert!(map.remove_overlay(id).is_none());
    }

    #[test]
    fn restyle_repaints_canvas() {
        let mut map = Map::new(&config(), CanvasRenderer::default());
        let id = map
            .add_overlay(TextOverlay::new([0.0, 0.0], "Hi", TextStyle::default()))
            .unwrap();
        assert!(map.set_overlay_style(id, TextStyle::default().with_color("red")));
        let colors: Vec<_> = map
            .renderer()
            .surface()
            .visible_text()
            .into_iter()
            .filter_map(|c| match c {
                DrawCommand::FillText { color, .. } => Some(color.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(colors, vec!["red".to_string()]);
        assert!(!map.set_overlay_style(OverlayId::new(), TextStyle::default()));
    }

    #[test]
    fn zoom_reprojects_and_resizes_boxes() {
        let surface = RecordingSurface::with_metrics(AdvanceMetrics { em_ratio: 1.0 });
        let renderer = CanvasRenderer::new(surface, RendererConfig::default());
        let mut map = Map::new(&config(), renderer);
        let id = map
            .add_overlay(TextOverlay::new([10.0, 10.0], "abcd", TextStyle::default()))
            .unwrap();
        let p2 = map.overlay(id).and_then(|o| o.point()).unwrap();

        map.set_view(LatLng::new(0.0, 0.0), 3.0);
        let p3 = map.overlay(id).and_then(|o| o.point()).unwrap();
        assert_ne!(p2, p3);
        assert_eq!(map.view().zoom(), 3.0);
        let b = map.overlay(id).and_then(|o| o.bounds()).unwrap();
        assert_eq!(b.size(), DVec2::splat(40.0));
    }

    #[test]
    fn svg_map_keeps_one_node_per_overlay() {
        let mut map = Map::new(&config(), SvgRenderer::default());
        let a = map
            .add_overlay(TextOverlay::new([0.0, 0.0], "A", TextStyle::default()))
            .unwrap();
        map.add_overlay(TextOverlay::new([60.0, 170.0], "B", TextStyle::default()));
        assert_eq!(map.renderer().node_count(), 2);

        map.pan_by(DVec2::new(50.0, 0.0));
        assert_eq!(map.renderer().node_count(), 2);
        let node = map.renderer().node(a).unwrap();
        assert_eq!(map.renderer().tree().attribute(node, "x"), Some("200"));

        map.remove_overlay(a);
        assert_eq!(map.renderer().node_count(), 1);
        assert!(!map.renderer().to_svg_string().contains(">A<"));
    }

    #[test]
    fn boxed_renderer_drives_the_same_lifecycle() {
        let renderer: Box<dyn TextRenderer> = Box::new(SvgRenderer::default());
        let mut map = Map::new(&config(), renderer);
        map.add_overlay(TextOverlay::new([0.0, 0.0], "A", TextStyle::default()));
        let stats = map.set_view(LatLng::new(0.0, 0.0), 4.0);
        assert_eq!(stats.visible, 1);
        assert_eq!(map.renderer().kind(), BackendKind::Retained);
    }

    #[test]
    fn cloned_overlay_is_a_separate_label() {
        let mut map = Map::new(&config(), SvgRenderer::default());
        let original = TextOverlay::new([0.0, 0.0], "Twin", TextStyle::default());
        let copy = original.clone();
        let a = map.add_overlay(original).unwrap();
        let b = map.add_overlay(copy).unwrap();
        assert_ne!(a, b);
        assert_eq!(map.len(), 2);
        assert_eq!(map.renderer().node_count(), 2);
    }

    #[test]
    fn overlay_bound_elsewhere_is_refused() {
        let mut other = Map::new(&config(), SvgRenderer::default());
        let mut overlay = TextOverlay::new([0.0, 0.0], "Busy", TextStyle::default());
        maptext_render::add(&mut overlay, other.renderer_mut(), &ViewState::new(&config()));

        let mut map = Map::new(&config(), SvgRenderer::default());
        assert_eq!(map.add_overlay(overlay), None);
        assert!(map.is_empty());
        assert_eq!(map.renderer().node_count(), 0);
    }
}
