use std::collections::BTreeMap;

use glam::DVec2;
use maptext_common::{AdvanceMetrics, Bounds, OverlayId, TextMetrics};
use maptext_overlay::{TextAlign, TextOverlay, TextStyle};
use maptext_render::{BackendKind, MapView, RendererConfig, TextRenderer, padded_bounds};

use crate::tree::{NodeId, SvgTree};

/// Class marking nodes of overlays configured as interactive.
pub const INTERACTIVE_CLASS: &str = "maptext-interactive";

/// Retained-mode renderer keeping one `<text>` node per overlay.
pub struct SvgRenderer<M: TextMetrics = AdvanceMetrics> {
    tree: SvgTree<M>,
    config: RendererConfig,
    bounds: Bounds,
    nodes: BTreeMap<OverlayId, NodeId>,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self::new(RendererConfig::default())
    }
}

impl SvgRenderer {
    pub fn new(config: RendererConfig) -> Self {
        Self::with_metrics(config, AdvanceMetrics::default())
    }
}

impl<M: TextMetrics> SvgRenderer<M> {
    pub fn with_metrics(config: RendererConfig, metrics: M) -> Self {
        Self {
            tree: SvgTree::new(config.font.clone(), metrics),
            config,
            bounds: Bounds::new(DVec2::ZERO, DVec2::ZERO),
            nodes: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn tree(&self) -> &SvgTree<M> {
        &self.tree
    }

    /// Node currently backing the overlay, if it is registered.
    pub fn node(&self, id: OverlayId) -> Option<NodeId> {
        self.nodes.get(&id).copied()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn to_svg_string(&self) -> String {
        self.tree.to_svg_string()
    }

    fn apply_style(&mut self, node: NodeId, style: &TextStyle) {
        let tree = &mut self.tree;
        if style.stroke {
            tree.set_attribute(node, "stroke", &style.color);
            tree.set_attribute(node, "stroke-opacity", &style.opacity.to_string());
            tree.set_attribute(node, "stroke-width", &style.weight.to_string());
            tree.set_attribute(node, "stroke-linecap", "round");
            tree.set_attribute(node, "stroke-linejoin", "round");
        } else {
            tree.set_attribute(node, "stroke", "none");
            for name in ["stroke-opacity", "stroke-width", "stroke-linecap", "stroke-linejoin"] {
                tree.remove_attribute(node, name);
            }
        }
        if style.fill {
            tree.set_attribute(node, "fill", style.effective_fill_color());
            tree.set_attribute(node, "fill-opacity", &style.fill_opacity.to_string());
            tree.set_attribute(node, "fill-rule", "evenodd");
        } else {
            tree.set_attribute(node, "fill", "none");
            tree.remove_attribute(node, "fill-opacity");
            tree.remove_attribute(node, "fill-rule");
        }
    }
}

fn text_anchor(align: TextAlign) -> &'static str {
    match align {
        TextAlign::Center => "middle",
        other => other.as_str(),
    }
}

impl<M: TextMetrics> TextRenderer for SvgRenderer<M> {
    fn kind(&self) -> BackendKind {
        BackendKind::Retained
    }

    fn measure_text_width(&self, overlay: &TextOverlay) -> f64 {
        self.node(overlay.id())
            .map_or(0.0, |node| self.tree.computed_text_length(node))
    }

    fn prepare_element(&mut self, overlay: &TextOverlay) {
        if let Some(stale) = self.nodes.remove(&overlay.id()) {
            self.tree.detach(stale);
        }
        let node = self.tree.create_element("text");
        self.tree.set_text_content(node, overlay.text());

        let style = overlay.style();
        if let Some(class) = &style.class_name {
            self.tree.add_class(node, class);
        }
        if style.interactive {
            self.tree.add_class(node, INTERACTIVE_CLASS);
        }
        self.apply_style(node, style);

        let layer = self.tree.layer();
        self.tree.append(layer, node);
        self.nodes.insert(overlay.id(), node);
        tracing::trace!(id = %overlay.id(), ?node, "svg text node created");
    }

    fn render(&mut self, overlay: &TextOverlay) {
        let Some(node) = self.node(overlay.id()) else {
            tracing::warn!(id = %overlay.id(), "render for overlay without svg node");
            return;
        };
        let Some(p) = overlay.point() else {
            return;
        };
        let style = overlay.style();
        let (x, y) = (p.x.to_string(), p.y.to_string());
        let degrees = style.rotation / std::f64::consts::PI * 180.0;
        let transform = format!("rotate({degrees} {x} {y})");

        self.tree.set_attribute(node, "x", &x);
        self.tree.set_attribute(node, "y", &y);
        self.tree.set_attribute(node, "transform", &transform);
        self.tree
            .set_attribute(node, "text-anchor", text_anchor(style.text_align));
    }

    fn remove_element(&mut self, overlay: &TextOverlay) {
        if let Some(node) = self.nodes.remove(&overlay.id()) {
            self.tree.detach(node);
        }
    }

    fn update_style(&mut self, overlay: &TextOverlay) {
        if let Some(node) = self.node(overlay.id()) {
            self.apply_style(node, overlay.style());
        }
    }

    fn visible_bounds(&self) -> Bounds {
        self.bounds
    }

    fn update_bounds(&mut self, view: &dyn MapView) {
        let bounds = padded_bounds(view, self.config.padding);
        let size = bounds.size();
        let root = self.tree.root();
        self.tree.set_attribute(root, "width", &size.x.to_string());
        self.tree.set_attribute(root, "height", &size.y.to_string());
        self.tree.set_attribute(
            root,
            "viewBox",
            &format!("{} {} {} {}", bounds.min.x, bounds.min.y, size.x, size.y),
        );
        self.bounds = bounds;
        tracing::debug!(%bounds, "svg bounds updated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maptext_common::LatLng;
    use maptext_render::{Visibility, add, remove, restyle, view_changed};

    struct PlaneView(Bounds);

    impl MapView for PlaneView {
        fn project(&self, lat_lng: LatLng) -> DVec2 {
            DVec2::new(lat_lng.lng, lat_lng.lat)
        }

        fn pixel_bounds(&self) -> Bounds {
            self.0
        }
    }

    fn view(size: f64) -> PlaneView {
        PlaneView(Bounds::new(DVec2::ZERO, DVec2::splat(size)))
    }

    fn svg(v: &PlaneView) -> SvgRenderer {
        let mut r = SvgRenderer::new(RendererConfig {
            padding: 0.0,
            ..RendererConfig::default()
        });
        r.update_bounds(v);
        r
    }

    #[test]
    fn prepare_creates_registered_text_node() {
        let v = view(200.0);
        let mut r = svg(&v);
        let style = TextStyle {
            class_name: Some("city".into()),
            interactive: true,
            ..TextStyle::default()
        };
        let overlay = TextOverlay::new([100.0, 100.0], "Oslo", style);
        r.prepare_element(&overlay);

        let node = r.node(overlay.id()).unwrap();
        let tree = r.tree();
        assert_eq!(tree.tag(node), Some("text"));
        assert_eq!(tree.text_content(node), Some("Oslo"));
        assert!(tree.has_class(node, "city"));
        assert!(tree.has_class(node, INTERACTIVE_CLASS));
        assert_eq!(tree.children(tree.layer()), &[node]);
        assert_eq!(tree.attribute(node, "fill"), Some("black"));
        assert_eq!(tree.attribute(node, "stroke"), Some("none"));
    }

    #[test]
    fn non_interactive_has_no_marker() {
        let mut r = SvgRenderer::default();
        let overlay = TextOverlay::new([0.0, 0.0], "Oslo", TextStyle::default());
        r.prepare_element(&overlay);
        let node = r.node(overlay.id()).unwrap();
        assert!(!r.tree().has_class(node, INTERACTIVE_CLASS));
    }

    #[test]
    fn measure_delegates_to_node() {
        let v = view(200.0);
        let mut r = svg(&v);
        let overlay = TextOverlay::new([100.0, 100.0], "Bergen", TextStyle::default());
        assert_eq!(r.measure_text_width(&overlay), 0.0);

        r.prepare_element(&overlay);
        let node = r.node(overlay.id()).unwrap();
        assert_eq!(
            r.measure_text_width(&overlay),
            r.tree().computed_text_length(node)
        );
        assert!(r.measure_text_width(&overlay) > 0.0);
    }

    #[test]
    fn render_sets_position_rotation_and_anchor() {
        let v = view(200.0);
        let mut r = svg(&v);
        let style = TextStyle::default()
            .with_rotation(std::f64::consts::FRAC_PI_2)
            .with_align(TextAlign::Center);
        let mut overlay = TextOverlay::new([100.0, 150.0], "Oslo", style);
        add(&mut overlay, &mut r, &v);

        let node = r.node(overlay.id()).unwrap();
        let tree = r.tree();
        assert_eq!(tree.attribute(node, "x"), Some("150"));
        assert_eq!(tree.attribute(node, "y"), Some("100"));
        assert_eq!(tree.attribute(node, "transform"), Some("rotate(90 150 100)"));
        assert_eq!(tree.attribute(node, "text-anchor"), Some("middle"));
    }

    #[test]
    fn left_and_right_anchors_pass_through() {
        assert_eq!(text_anchor(TextAlign::Left), "left");
        assert_eq!(text_anchor(TextAlign::Right), "right");
    }

    #[test]
    fn render_updates_even_when_culled() {
        let v = view(50.0);
        let mut r = svg(&v);
        let mut overlay = TextOverlay::new([100.0, 100.0], "Oslo", TextStyle::default());
        assert_eq!(add(&mut overlay, &mut r, &v), Some(Visibility::Hidden));

        let node = r.node(overlay.id()).unwrap();
        assert_eq!(r.tree().attribute(node, "x"), Some("100"));

        let moved = PlaneView(Bounds::new(DVec2::ZERO, DVec2::splat(40.0)));
        r.update_bounds(&moved);
        assert_eq!(
            view_changed(&mut overlay, &mut r, &moved),
            Some(Visibility::Hidden)
        );
        assert!(r.tree().attribute(node, "transform").is_some());
        assert!(r.tree().contains(node));
    }

    #[test]
    fn remove_detaches_node() {
        let v = view(200.0);
        let mut r = svg(&v);
        let mut overlay = TextOverlay::new([100.0, 100.0], "Oslo", TextStyle::default());
        add(&mut overlay, &mut r, &v);
        let node = r.node(overlay.id()).unwrap();

        assert!(remove(&mut overlay, &mut r));
        assert!(r.node(overlay.id()).is_none());
        assert!(!r.tree().contains(node));
        assert!(r.tree().children(r.tree().layer()).is_empty());
    }

    #[test]
    fn restyle_rewrites_paint_attributes() {
        let v = view(200.0);
        let mut r = svg(&v);
        let mut overlay = TextOverlay::new([100.0, 100.0], "Oslo", TextStyle::default());
        add(&mut overlay, &mut r, &v);
        let style = TextStyle {
            stroke: true,
            fill: false,
            weight: 2.0,
            ..TextStyle::default().with_color("navy")
        };
        restyle(&mut overlay, &mut r, style);

        let node = r.node(overlay.id()).unwrap();
        let tree = r.tree();
        assert_eq!(tree.attribute(node, "stroke"), Some("navy"));
        assert_eq!(tree.attribute(node, "stroke-width"), Some("2"));
        assert_eq!(tree.attribute(node, "fill"), Some("none"));
        assert_eq!(tree.attribute(node, "fill-opacity"), None);
    }

    #[test]
    fn update_bounds_writes_view_box() {
        let v = PlaneView(Bounds::new(DVec2::new(100.0, 50.0), DVec2::new(300.0, 150.0)));
        let mut r = SvgRenderer::default();
        r.update_bounds(&v);
        let root = r.tree().root();
        assert_eq!(r.tree().attribute(root, "viewBox"), Some("80 40 240 120"));
        assert_eq!(r.tree().attribute(root, "width"), Some("240"));
        assert_eq!(r.visible_bounds().min, DVec2::new(80.0, 40.0));
    }

    #[test]
    fn document_contains_label() {
        let v = view(200.0);
        let mut r = svg(&v);
        let mut overlay = TextOverlay::new([100.0, 100.0], "Tromsø", TextStyle::default());
        add(&mut overlay, &mut r, &v);
        let doc = r.to_svg_string();
        assert!(doc.contains(">Tromsø</text>"));
        assert!(doc.contains("text-anchor=\"middle\""));
    }
}
