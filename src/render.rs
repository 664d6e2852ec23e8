use crate::config::{Config, EditorConfig, RenderConfig};
use crate::geometry::{Bounds, Handle, Point};
use crate::images::ImageCache;
use crate::model::{Diagram, DiagramChild};
use crate::project::Project;
use crate::router::{RouteError, RoutedConnection, route_connections_with};
use crate::scene::{SceneGraph, SceneNode, VectorSceneGraph};
use crate::shapes::{ArchiShapeProvider, ShapeTemplateProvider};
use crate::theme::Theme;
use anyhow::Result;
use std::fmt::Write as _;
use std::path::Path;

/// Renders one diagram view of a project into a retained scene graph
/// that can be re-emitted as SVG after every edit.
pub struct DiagramRenderer {
    theme: Theme,
    editor: EditorConfig,
    render: RenderConfig,
    provider: Box<dyn ShapeTemplateProvider>,
    scene: SceneGraph,
    images: ImageCache,
    routed: Vec<RoutedConnection>,
    selection: Vec<String>,
    drop_target: Option<String>,
    /// Element id + text of the single info tooltip overlay, if shown.
    tooltip: Option<(String, String)>,
    /// Overlay node ids currently in the scene, so they can be dropped
    /// before overlays are redrawn.
    overlay_ids: Vec<String>,
}

impl DiagramRenderer {
    pub fn new(config: &Config) -> Self {
        Self::with_provider(config, Box::new(ArchiShapeProvider))
    }

    pub fn with_provider(config: &Config, provider: Box<dyn ShapeTemplateProvider>) -> Self {
        Self {
            theme: config.theme.clone(),
            editor: config.editor.clone(),
            render: config.render.clone(),
            provider,
            scene: SceneGraph::new(),
            images: ImageCache::default(),
            routed: Vec::new(),
            selection: Vec::new(),
            drop_target: None,
            tooltip: None,
            overlay_ids: Vec::new(),
        }
    }

    /// Replace the image loader, e.g. to resolve paths inside an
    /// archive instead of the filesystem.
    pub fn set_image_cache(&mut self, images: ImageCache) {
        self.images = images;
    }

    pub fn set_selection(&mut self, ids: &[String]) {
        self.selection = ids.to_vec();
    }

    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    pub fn set_drop_target(&mut self, id: Option<&str>) {
        self.drop_target = id.map(str::to_string);
    }

    /// Show the info tooltip overlay on one element, or hide it.
    pub fn set_info_tooltip(&mut self, target: Option<(&str, &str)>) {
        self.tooltip = target.map(|(id, text)| (id.to_string(), text.to_string()));
    }

    pub fn routed(&self) -> &[RoutedConnection] {
        &self.routed
    }

    /// Rebuild the whole scene from the current model state.
    pub fn build(&mut self, project: &Project, diagram: &Diagram) -> Result<(), RouteError> {
        self.scene.clear();
        self.overlay_ids.clear();
        let roots: Vec<String> = diagram.children().map(|c| c.id.clone()).collect();
        for id in roots {
            self.add_element(project, diagram, &id, None);
        }
        self.routed = route_connections_with(diagram, self.render.connection_corner_radius)?;
        self.add_connection_layer();
        self.add_overlays(diagram);
        Ok(())
    }

    /// Drop one element subtree from the scene without touching the rest.
    pub fn remove_element(&mut self, id: &str) {
        self.scene.remove(id);
    }

    /// Drop the whole connection layer; elements stay in place.
    pub fn clear_connections(&mut self) {
        let routed = std::mem::take(&mut self.routed);
        for connection in &routed {
            self.scene.remove(&format!("connection:{}", connection.id));
        }
    }

    /// Re-route and redraw the connection layer over the current elements.
    pub fn add_connections(&mut self, diagram: &Diagram) -> Result<(), RouteError> {
        self.routed = route_connections_with(diagram, self.render.connection_corner_radius)?;
        self.add_connection_layer();
        Ok(())
    }

    /// Redraw the selection, drag-point, drop-target and tooltip overlays.
    pub fn refresh_overlays(&mut self, diagram: &Diagram) {
        for id in std::mem::take(&mut self.overlay_ids) {
            self.scene.remove(&id);
        }
        self.add_overlays(diagram);
    }

    /// Instantiate one element subtree (shape, text, image, nested
    /// children) into the scene under `parent`.
    pub fn add_element(
        &mut self,
        project: &Project,
        diagram: &Diagram,
        child_id: &str,
        parent: Option<&str>,
    ) {
        let Some(child) = diagram.child(child_id) else {
            return;
        };
        let width = child.bounds.width;
        let height = child.bounds.height;
        let fragment = self
            .provider
            .shape_for(&child.entity_type, width, height, &self.theme);

        let mut svg = String::new();
        if let Some(doc) = documentation(project, child) {
            if !doc.is_empty() {
                let _ = write!(svg, "<title>{}</title>", escape_xml(&doc));
            }
        }
        svg.push_str(&styled_fragment(&fragment.svg, &child.style));
        if let Some(path) = &child.style.image_path {
            if let Some(image) = self.images.get(path) {
                svg.push_str(&image_svg(
                    image,
                    width,
                    height,
                    child.style.image_position.as_deref(),
                ));
            }
        }
        let text = display_text(project, child);
        if !text.is_empty() && fragment.text_width > 0.0 {
            svg.push_str(&text_svg(&text, &fragment, &self.theme, &child.style));
        }

        let node = SceneNode::new(
            &child.id,
            child.bounds.origin(),
            Bounds::new(0.0, 0.0, width, height),
            svg,
        )
        .with_class(&format!("element {}", child.entity_type));
        self.scene.upsert(node, parent);

        let nested: Vec<String> = child.child_ids().to_vec();
        for id in nested {
            self.add_element(project, diagram, &id, Some(child_id));
        }
    }

    fn add_connection_layer(&mut self) {
        let routed = std::mem::take(&mut self.routed);
        for connection in &routed {
            let mut svg = String::new();
            let stroke = connection
                .style
                .line_color
                .as_deref()
                .unwrap_or(&self.theme.line_color);
            let stroke_width = connection.style.line_width.unwrap_or(1.0);
            let mut attrs = format!(
                r#"fill="none" stroke="{stroke}" stroke-width="{stroke_width}""#
            );
            if let Some(dash) = &connection.style.dash_pattern {
                let _ = write!(attrs, r#" stroke-dasharray="{dash}""#);
            }
            if connection.style.arrow_end {
                attrs.push_str(r#" marker-end="url(#arrow)""#);
            }
            if connection.style.arrow_start {
                attrs.push_str(r#" marker-start="url(#arrow)""#);
            }
            // A wide invisible twin of the path keeps thin lines clickable.
            let _ = write!(
                svg,
                r#"<path d="{d}" fill="none" stroke="transparent" stroke-width="{hit}" class="RelationshipDetect"/><path d="{d}" {attrs}/>"#,
                d = connection.path_d,
                hit = self.editor.hit_tolerance * 2.0,
            );
            if let Some(label) = &connection.label {
                if !label.is_empty() {
                    let _ = write!(
                        svg,
                        r#"<text x="{x}" y="{y}" text-anchor="middle" font-family="{font}" font-size="{size}" fill="{fill}">{text}</text>"#,
                        x = connection.midpoint.x,
                        y = connection.midpoint.y - 2.0,
                        font = self.theme.font_family,
                        size = self.theme.font_size,
                        fill = self.theme.text_color,
                        text = escape_xml(label),
                    );
                }
            }
            let bounds = polyline_bounds(&connection.coords);
            let class = format!(
                "connection {}",
                connection.relationship_id.as_deref().unwrap_or("Line")
            );
            let node = SceneNode::new(
                &format!("connection:{}", connection.id),
                Point::ZERO,
                bounds,
                svg,
            )
            .with_class(&class);
            self.scene.upsert(node, None);
        }
        self.routed = routed;
    }

    fn add_overlays(&mut self, diagram: &Diagram) {
        let selection = self.selection.clone();
        let primary = selection.last().cloned();
        for id in &selection {
            self.add_selection_overlay(diagram, id, primary.as_deref() == Some(id));
        }
        self.add_drop_highlight(diagram);
        self.add_tooltip_overlay(diagram);
    }

    /// Dashed highlight around one selected object. The primary
    /// selection additionally carries resize handles (elements) or
    /// bend drag points (connections).
    pub fn add_selection_overlay(&mut self, diagram: &Diagram, id: &str, primary: bool) {
        if let Some(bounds) = diagram.absolute_bounds(id) {
            let mut svg = format!(
                r#"<rect x="{x}" y="{y}" width="{w}" height="{h}" fill="none" stroke="{color}" stroke-dasharray="2,2"/>"#,
                x = bounds.x,
                y = bounds.y,
                w = bounds.width,
                h = bounds.height,
                color = self.theme.selection_color,
            );
            if primary {
                let half = self.editor.handle_size / 2.0;
                for handle in Handle::ALL {
                    let at = handle.position(&bounds);
                    let _ = write!(
                        svg,
                        r#"<rect x="{x}" y="{y}" width="{s}" height="{s}" fill="{color}"/>"#,
                        x = at.x - half,
                        y = at.y - half,
                        s = self.editor.handle_size,
                        color = self.theme.selection_color,
                    );
                }
            }
            let node = SceneNode::new(
                &format!("overlay:selection:{id}"),
                Point::ZERO,
                Bounds::ZERO,
                svg,
            )
            .with_class("selection")
            .decoration();
            self.push_overlay(node);
            return;
        }

        if !primary {
            return;
        }
        if let Some(routed) = self.routed.iter().find(|r| r.id == id) {
            let mut svg = String::new();
            for (index, coord) in routed.coords.iter().enumerate() {
                if index == 0 || index == routed.coords.len() - 1 {
                    continue;
                }
                let _ = write!(
                    svg,
                    r#"<circle cx="{x}" cy="{y}" r="{r}" fill="{color}"/>"#,
                    x = coord.x,
                    y = coord.y,
                    r = self.editor.connection_point_radius,
                    color = self.theme.selection_color,
                );
            }
            for pair in routed.coords.windows(2) {
                let mid = pair[0].add(pair[1]).scale(0.5);
                let _ = write!(
                    svg,
                    r#"<circle cx="{x}" cy="{y}" r="{r}" fill="none" stroke="{color}"/>"#,
                    x = mid.x,
                    y = mid.y,
                    r = self.editor.insertion_point_radius,
                    color = self.theme.selection_color,
                );
            }
            let node = SceneNode::new("overlay:drag-points", Point::ZERO, Bounds::ZERO, svg)
                .with_class("drag-points")
                .decoration();
            self.push_overlay(node);
        }
    }

    fn add_drop_highlight(&mut self, diagram: &Diagram) {
        let Some(target) = &self.drop_target else {
            return;
        };
        let Some(bounds) = diagram.absolute_bounds(target) else {
            return;
        };
        let svg = format!(
            r#"<rect x="{x}" y="{y}" width="{w}" height="{h}" fill="none" stroke="{color}" stroke-width="2"/>"#,
            x = bounds.x,
            y = bounds.y,
            w = bounds.width,
            h = bounds.height,
            color = self.theme.drop_target_color,
        );
        let node = SceneNode::new("overlay:drop-target", Point::ZERO, Bounds::ZERO, svg)
            .with_class("drop-target")
            .decoration();
        self.push_overlay(node);
    }

    fn add_tooltip_overlay(&mut self, diagram: &Diagram) {
        let Some((id, text)) = self.tooltip.clone() else {
            return;
        };
        let Some(bounds) = diagram.absolute_bounds(&id) else {
            return;
        };
        let size = self.theme.font_size;
        let line_height = size * 1.3;
        let lines: Vec<&str> = text.lines().collect();
        let box_height = lines.len() as f32 * line_height + 8.0;
        let x = bounds.x;
        let y = bounds.y + bounds.height + 4.0;
        let mut svg = format!(
            r##"<rect x="{x}" y="{y}" width="{w}" height="{box_height}" fill="#FFFFE0" stroke="{color}"/>"##,
            w = bounds.width,
            color = self.theme.line_color,
        );
        for (index, line) in lines.iter().enumerate() {
            let _ = write!(
                svg,
                r#"<text x="{tx}" y="{ty}" font-family="{font}" font-size="{size}" fill="{fill}">{text}</text>"#,
                tx = x + 4.0,
                ty = y + 4.0 + size + index as f32 * line_height,
                font = self.theme.font_family,
                fill = self.theme.text_color,
                text = escape_xml(line),
            );
        }
        let node = SceneNode::new("overlay:tooltip", Point::ZERO, Bounds::ZERO, svg)
            .with_class("tooltip")
            .decoration();
        self.push_overlay(node);
    }

    fn push_overlay(&mut self, node: SceneNode) {
        self.overlay_ids.push(node.id.clone());
        self.scene.upsert(node, None);
    }

    /// Topmost element under an absolute point, ignoring overlays.
    pub fn element_at(&self, point: Point) -> Option<&str> {
        self.scene
            .node_at_point(point, self.editor.hit_tolerance)
            .map(|node| node.id.as_str())
    }

    /// Serialize the scene with a viewBox fitted to the content.
    pub fn svg(&self) -> String {
        let margin = self.render.viewport_margin;
        let bbox = self
            .scene
            .bounding_box()
            .unwrap_or(Bounds::new(0.0, 0.0, 100.0, 100.0));
        let x = bbox.x - margin;
        let y = bbox.y - margin;
        let width = bbox.width + margin * 2.0;
        let height = bbox.height + margin * 2.0;

        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="{x} {y} {width} {height}">"#
        );
        let _ = write!(
            svg,
            r#"<rect x="{x}" y="{y}" width="100%" height="100%" fill="{}"/>"#,
            self.render.background
        );
        let _ = write!(
            svg,
            r#"<defs><marker id="arrow" viewBox="0 0 10 10" refX="10" refY="5" markerWidth="8" markerHeight="8" orient="auto-start-reverse"><path d="M 0 0 L 10 5 L 0 10 z" fill="{}"/></marker></defs>"#,
            self.theme.line_color
        );
        svg.push_str(&self.scene.emit());
        svg.push_str("</svg>");
        svg
    }
}

fn documentation(project: &Project, child: &DiagramChild) -> Option<String> {
    match &child.element_id {
        Some(element_id) => project.entity(element_id).map(|e| e.documentation.clone()),
        None => None,
    }
}

fn display_text(project: &Project, child: &DiagramChild) -> String {
    if let Some(element_id) = &child.element_id {
        if let Some(entity) = project.entity(element_id) {
            return entity.name.clone();
        }
    }
    child
        .content
        .as_deref()
        .map(normalize_note_text)
        .unwrap_or_default()
}

/// Notes exported from desktop tools carry wingdings bullet glyphs and
/// carriage returns; map them to plain text.
pub fn normalize_note_text(text: &str) -> String {
    text.replace('\u{f0b7}', "\u{2022}")
        .replace('\u{f0a7}', "\u{2022}")
        .replace('\r', "")
}

fn styled_fragment(svg: &str, style: &crate::model::ChildStyle) -> String {
    let mut result = svg.to_string();
    if let Some(fill) = &style.fill_color {
        result = replace_attr(&result, "fill", fill);
    }
    if let Some(line) = &style.line_color {
        result = replace_attr(&result, "stroke", line);
    }
    // Alpha is a 0..1 fill opacity on the shape body (the first tag).
    if let Some(alpha) = style.alpha {
        result = result.replacen("/>", &format!(r#" fill-opacity="{alpha}"/>"#), 1);
    }
    result
}

/// Replace the first occurrence of `attr="..."` that is not "none".
fn replace_attr(svg: &str, attr: &str, value: &str) -> String {
    let needle = format!("{attr}=\"");
    let Some(start) = svg.find(&needle) else {
        return svg.to_string();
    };
    let value_start = start + needle.len();
    let Some(end) = svg[value_start..].find('"') else {
        return svg.to_string();
    };
    let old = &svg[value_start..value_start + end];
    if old == "none" {
        return svg.to_string();
    }
    format!(
        "{}{}{}",
        &svg[..value_start],
        value,
        &svg[value_start + end..]
    )
}

fn text_svg(
    text: &str,
    fragment: &crate::shapes::ShapeFragment,
    theme: &Theme,
    style: &crate::model::ChildStyle,
) -> String {
    let fill = style.font_color.as_deref().unwrap_or(&theme.text_color);
    let font = style.font.as_deref().unwrap_or(&theme.font_family);
    let size = theme.font_size;
    let line_height = size * 1.3;
    let lines: Vec<&str> = text.split('\n').collect();

    let (anchor, x) = match style.text_alignment.as_deref() {
        Some("left") => ("start", fragment.text_x),
        Some("right") => ("end", fragment.text_x + fragment.text_width),
        _ => ("middle", fragment.text_x + fragment.text_width / 2.0),
    };
    let block = lines.len() as f32 * line_height;
    let y = match style.text_position.as_deref() {
        Some("center") => fragment.text_y + (fragment.text_height - block) / 2.0 + size,
        Some("bottom") => fragment.text_y + fragment.text_height - block + size,
        _ => fragment.text_y + size + 2.0,
    };

    let mut svg = format!(
        r#"<text x="{x}" y="{y}" text-anchor="{anchor}" font-family="{font}" font-size="{size}" fill="{fill}">"#
    );
    for (index, line) in lines.iter().enumerate() {
        let dy = if index == 0 { 0.0 } else { line_height };
        let _ = write!(
            svg,
            r#"<tspan x="{x}" dy="{dy}">{}</tspan>"#,
            escape_xml(line)
        );
    }
    svg.push_str("</text>");
    svg
}

/// Place an embedded image inside an element. Positions follow a 3x3
/// grid named like "top-left"; unknown or absent positions fill the
/// whole element.
fn image_svg(
    image: &crate::images::CachedImage,
    width: f32,
    height: f32,
    position: Option<&str>,
) -> String {
    let iw = if image.width > 0 {
        (image.width as f32).min(width)
    } else {
        width
    };
    let ih = if image.height > 0 {
        (image.height as f32).min(height)
    } else {
        height
    };
    let (x, y) = match position {
        Some("top-left") => (0.0, 0.0),
        Some("top") => ((width - iw) / 2.0, 0.0),
        Some("top-right") => (width - iw, 0.0),
        Some("left") => (0.0, (height - ih) / 2.0),
        Some("center") => ((width - iw) / 2.0, (height - ih) / 2.0),
        Some("right") => (width - iw, (height - ih) / 2.0),
        Some("bottom-left") => (0.0, height - ih),
        Some("bottom") => ((width - iw) / 2.0, height - ih),
        Some("bottom-right") => (width - iw, height - ih),
        _ => (0.0, 0.0),
    };
    format!(
        r#"<image x="{x}" y="{y}" width="{iw}" height="{ih}" href="{uri}"/>"#,
        uri = image.data_uri
    )
}

fn polyline_bounds(coords: &[Point]) -> Bounds {
    let mut bounds: Option<Bounds> = None;
    for coord in coords {
        let point = Bounds::new(coord.x, coord.y, 0.0, 0.0);
        bounds = Some(match bounds {
            Some(acc) => acc.union(&point),
            None => point,
        });
    }
    bounds.unwrap_or(Bounds::ZERO)
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path) -> Result<()> {
    let opt = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Entity, SourceConnection};

    fn sample_project() -> Project {
        let mut project = Project::new("p", "Sample");
        let mut actor = Entity::new("e1", "BusinessActor", "Client");
        actor.documentation = "The insured party".to_string();
        project.add_entity(actor);
        project.add_entity(Entity::new("e2", "BusinessService", "Claims"));

        let mut diagram = Diagram::new("view", "Overview");
        let mut a = DiagramChild::new("a", "BusinessActor", Bounds::new(0.0, 0.0, 160.0, 60.0));
        a.element_id = Some("e1".to_string());
        let mut b = DiagramChild::new("b", "BusinessService", Bounds::new(300.0, 0.0, 160.0, 60.0));
        b.element_id = Some("e2".to_string());
        b.source_connections.push(SourceConnection::new("c1", "b", "a"));
        diagram.insert_child(a, None).unwrap();
        diagram.insert_child(b, None).unwrap();
        project.add_diagram(diagram);
        project
    }

    #[test]
    fn renders_elements_and_connection() {
        let project = sample_project();
        let mut renderer = DiagramRenderer::new(&Config::default());
        renderer
            .build(&project, project.diagram("view").unwrap())
            .unwrap();
        let svg = renderer.svg();
        assert!(svg.contains("Client"));
        assert!(svg.contains("Claims"));
        assert!(svg.contains("RelationshipDetect"));
        assert!(svg.contains("<title>The insured party</title>"));
    }

    #[test]
    fn primary_selection_draws_eight_handles() {
        let project = sample_project();
        let mut renderer = DiagramRenderer::new(&Config::default());
        renderer.set_selection(&["b".to_string(), "a".to_string()]);
        renderer
            .build(&project, project.diagram("view").unwrap())
            .unwrap();
        let svg = renderer.svg();
        // Both selected elements get a dashed outline, only the primary
        // (last selected) gets the resize handles.
        assert_eq!(svg.matches("stroke-dasharray=\"2,2\"").count(), 2);
        let handles = svg.matches(r#"width="6" height="6""#).count();
        assert_eq!(handles, 8);
    }

    #[test]
    fn connection_layer_can_be_cleared_and_readded() {
        let project = sample_project();
        let diagram = project.diagram("view").unwrap();
        let mut renderer = DiagramRenderer::new(&Config::default());
        renderer.build(&project, diagram).unwrap();
        assert!(renderer.svg().contains("RelationshipDetect"));

        renderer.clear_connections();
        assert!(renderer.routed().is_empty());
        assert!(!renderer.svg().contains("RelationshipDetect"));

        renderer.add_connections(diagram).unwrap();
        assert_eq!(renderer.routed().len(), 1);
        assert!(renderer.svg().contains("RelationshipDetect"));
    }

    #[test]
    fn element_subtree_can_be_removed_and_readded() {
        let project = sample_project();
        let diagram = project.diagram("view").unwrap();
        let mut renderer = DiagramRenderer::new(&Config::default());
        renderer.build(&project, diagram).unwrap();

        renderer.remove_element("a");
        assert!(!renderer.svg().contains("Client"));

        renderer.add_element(&project, diagram, "a", None);
        assert!(renderer.svg().contains("Client"));
    }

    #[test]
    fn info_tooltip_overlay_follows_its_element() {
        let project = sample_project();
        let diagram = project.diagram("view").unwrap();
        let mut renderer = DiagramRenderer::new(&Config::default());
        renderer.set_info_tooltip(Some(("a", "BusinessActor: Client")));
        renderer.build(&project, diagram).unwrap();
        assert!(renderer.svg().contains("BusinessActor: Client"));

        renderer.set_info_tooltip(None);
        renderer.refresh_overlays(diagram);
        assert!(!renderer.svg().contains("overlay:tooltip"));
    }

    #[test]
    fn note_text_normalization() {
        assert_eq!(
            normalize_note_text("\u{f0b7} first\r\n\u{f0a7} second"),
            "\u{2022} first\n\u{2022} second"
        );
    }

    #[test]
    fn style_override_replaces_fill() {
        let replaced =
            replace_attr(r##"<rect fill="#FFFFB5" stroke="#5C5C5C"/>"##, "fill", "#FF0000");
        assert!(replaced.contains(r##"fill="#FF0000""##));
        let untouched =
            replace_attr(r##"<rect fill="none" stroke="#5C5C5C"/>"##, "fill", "#FF0000");
        assert!(untouched.contains(r#"fill="none""#));
    }

    #[test]
    fn configured_corner_radius_reaches_the_router() {
        let mut project = sample_project();
        // One bend gives c1 an interior corner with a 60-unit leg.
        project
            .diagram_mut("view")
            .unwrap()
            .set_bend_points("c1", vec![Point::new(-60.0, 90.0)])
            .unwrap();

        let mut renderer = DiagramRenderer::new(&Config::default());
        renderer
            .build(&project, project.diagram("view").unwrap())
            .unwrap();
        assert!(renderer.svg().contains(" Q "), "radius 12 rounds a 60-unit leg");

        let mut config = Config::default();
        config.render.connection_corner_radius = 40.0;
        let mut renderer = DiagramRenderer::new(&config);
        renderer
            .build(&project, project.diagram("view").unwrap())
            .unwrap();
        assert!(
            !renderer.svg().contains(" Q "),
            "radius 40 does not fit a 60-unit leg"
        );
    }

    #[test]
    fn text_and_alpha_style_overrides_apply() {
        let mut project = sample_project();
        {
            let diagram = project.diagram_mut("view").unwrap();
            let child = diagram.child_mut("a").unwrap();
            child.style.font = Some("monospace".to_string());
            child.style.text_alignment = Some("left".to_string());
            child.style.alpha = Some(0.5);
        }
        let mut renderer = DiagramRenderer::new(&Config::default());
        renderer
            .build(&project, project.diagram("view").unwrap())
            .unwrap();
        let svg = renderer.svg();
        assert!(svg.contains(r#"font-family="monospace""#));
        assert!(svg.contains(r#"text-anchor="start""#));
        assert!(svg.contains(r#"fill-opacity="0.5""#));
    }

    #[test]
    fn viewbox_covers_content_with_margin() {
        let project = sample_project();
        let mut renderer = DiagramRenderer::new(&Config::default());
        renderer
            .build(&project, project.diagram("view").unwrap())
            .unwrap();
        let svg = renderer.svg();
        assert!(svg.contains(r#"viewBox="-10 -10 480 80""#), "{svg}");
    }
}
