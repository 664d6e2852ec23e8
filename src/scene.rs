use std::collections::HashMap;
use std::fmt::Write as _;

use crate::geometry::{Bounds, Point};

/// Minimal retained-mode scene the renderer and editor draw into.
///
/// Nodes carry a local translation relative to their parent and an SVG
/// body; hit testing and bounding boxes work on absolute bounds. The
/// editor only talks to this trait, so a host embedding the crate can
/// substitute its own scene (a DOM, a canvas command list) without
/// touching the edit logic.
pub trait VectorSceneGraph {
    /// Insert or replace a node. `parent` of `None` means top level.
    fn upsert(&mut self, node: SceneNode, parent: Option<&str>);
    fn remove(&mut self, id: &str);
    /// Move a node without rebuilding it.
    fn set_translate(&mut self, id: &str, offset: Point);
    /// Topmost interactive node under `point`, in absolute coordinates.
    fn node_at_point(&self, point: Point, tolerance: f32) -> Option<&SceneNode>;
    fn bounding_box(&self) -> Option<Bounds>;
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub id: String,
    /// Offset from the parent node's origin.
    pub translate: Point,
    /// Untranslated extent of this node's own body.
    pub bounds: Bounds,
    pub svg: String,
    pub class: String,
    /// Nodes that only decorate (highlights, handles) are skipped by
    /// hit testing.
    pub interactive: bool,
}

impl SceneNode {
    pub fn new(id: &str, translate: Point, bounds: Bounds, svg: String) -> Self {
        Self {
            id: id.to_string(),
            translate,
            bounds,
            svg,
            class: String::new(),
            interactive: true,
        }
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.class = class.to_string();
        self
    }

    pub fn decoration(mut self) -> Self {
        self.interactive = false;
        self
    }
}

/// The built-in scene: a flat arena with explicit parent links, emitted
/// as nested `<g transform="translate(..)">` groups.
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: HashMap<String, SceneNode>,
    parents: HashMap<String, String>,
    /// Insertion order, which is also paint order.
    order: Vec<String>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.parents.clear();
        self.order.clear();
    }

    pub fn node(&self, id: &str) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    fn absolute_translate(&self, id: &str) -> Point {
        let mut offset = Point::ZERO;
        let mut current = Some(id);
        while let Some(id) = current {
            if let Some(node) = self.nodes.get(id) {
                offset = offset.add(node.translate);
            }
            current = self.parents.get(id).map(String::as_str);
        }
        offset
    }

    pub fn absolute_bounds(&self, id: &str) -> Option<Bounds> {
        let node = self.nodes.get(id)?;
        let parent_offset = match self.parents.get(id) {
            Some(parent) => self.absolute_translate(parent),
            None => Point::ZERO,
        };
        Some(node.bounds.translated(parent_offset.add(node.translate)))
    }

    fn children_of(&self, id: &str) -> impl Iterator<Item = &str> {
        self.order
            .iter()
            .filter(move |candidate| self.parents.get(*candidate).is_some_and(|p| p == id))
            .map(String::as_str)
    }

    fn emit_node(&self, id: &str, out: &mut String) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let _ = write!(out, r#"<g id="{}""#, escape_attr(&node.id));
        if !node.class.is_empty() {
            let _ = write!(out, r#" class="{}""#, escape_attr(&node.class));
        }
        if node.translate != Point::ZERO {
            let _ = write!(
                out,
                r#" transform="translate({},{})""#,
                node.translate.x, node.translate.y
            );
        }
        out.push('>');
        out.push_str(&node.svg);
        for child in self.children_of(id) {
            self.emit_node(child, out);
        }
        out.push_str("</g>");
    }

    /// Serialize every top-level node in paint order.
    pub fn emit(&self) -> String {
        let mut out = String::new();
        for id in &self.order {
            if !self.parents.contains_key(id) {
                self.emit_node(id, &mut out);
            }
        }
        out
    }
}

impl VectorSceneGraph for SceneGraph {
    fn upsert(&mut self, node: SceneNode, parent: Option<&str>) {
        let id = node.id.clone();
        if !self.nodes.contains_key(&id) {
            self.order.push(id.clone());
        }
        match parent {
            Some(parent) => {
                self.parents.insert(id.clone(), parent.to_string());
            }
            None => {
                self.parents.remove(&id);
            }
        }
        self.nodes.insert(id, node);
    }

    fn remove(&mut self, id: &str) {
        let descendants: Vec<String> = self
            .order
            .iter()
            .filter(|candidate| {
                let mut current = Some(candidate.as_str());
                while let Some(c) = current {
                    if c == id {
                        return true;
                    }
                    current = self.parents.get(c).map(String::as_str);
                }
                false
            })
            .cloned()
            .collect();
        for id in descendants {
            self.nodes.remove(&id);
            self.parents.remove(&id);
            self.order.retain(|o| o != &id);
        }
    }

    fn set_translate(&mut self, id: &str, offset: Point) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.translate = offset;
        }
    }

    fn node_at_point(&self, point: Point, tolerance: f32) -> Option<&SceneNode> {
        // Later nodes paint on top, so walk paint order backwards.
        for id in self.order.iter().rev() {
            let node = self.nodes.get(id)?;
            if !node.interactive {
                continue;
            }
            if let Some(bounds) = self.absolute_bounds(id) {
                if bounds.contains(point, tolerance) {
                    return self.nodes.get(id);
                }
            }
        }
        None
    }

    fn bounding_box(&self) -> Option<Bounds> {
        let mut result: Option<Bounds> = None;
        for id in &self.order {
            if self.nodes.get(id).is_none_or(|node| !node.interactive) {
                continue;
            }
            let Some(bounds) = self.absolute_bounds(id) else {
                continue;
            };
            result = Some(match result {
                Some(acc) => acc.union(&bounds),
                None => bounds,
            });
        }
        result
    }
}

pub fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_node(id: &str, translate: Point, width: f32, height: f32) -> SceneNode {
        SceneNode::new(
            id,
            translate,
            Bounds::new(0.0, 0.0, width, height),
            format!(r#"<rect width="{width}" height="{height}"/>"#),
        )
    }

    #[test]
    fn nested_translates_compose() {
        let mut scene = SceneGraph::new();
        scene.upsert(rect_node("outer", Point::new(100.0, 50.0), 200.0, 100.0), None);
        scene.upsert(
            rect_node("inner", Point::new(20.0, 30.0), 40.0, 20.0),
            Some("outer"),
        );
        assert_eq!(
            scene.absolute_bounds("inner"),
            Some(Bounds::new(120.0, 80.0, 40.0, 20.0))
        );
    }

    #[test]
    fn hit_test_prefers_topmost() {
        let mut scene = SceneGraph::new();
        scene.upsert(rect_node("below", Point::ZERO, 100.0, 100.0), None);
        scene.upsert(rect_node("above", Point::new(10.0, 10.0), 50.0, 50.0), None);
        let hit = scene.node_at_point(Point::new(30.0, 30.0), 0.0).unwrap();
        assert_eq!(hit.id, "above");
    }

    #[test]
    fn decorations_are_transparent_to_hits() {
        let mut scene = SceneGraph::new();
        scene.upsert(rect_node("element", Point::ZERO, 100.0, 100.0), None);
        scene.upsert(
            rect_node("halo", Point::ZERO, 120.0, 120.0).decoration(),
            None,
        );
        let hit = scene.node_at_point(Point::new(50.0, 50.0), 0.0).unwrap();
        assert_eq!(hit.id, "element");
    }

    #[test]
    fn remove_takes_children_along() {
        let mut scene = SceneGraph::new();
        scene.upsert(rect_node("parent", Point::ZERO, 100.0, 100.0), None);
        scene.upsert(rect_node("child", Point::ZERO, 10.0, 10.0), Some("parent"));
        scene.remove("parent");
        assert!(!scene.contains("child"));
        assert!(scene.emit().is_empty());
    }

    #[test]
    fn set_translate_repositions_a_subtree() {
        let mut scene = SceneGraph::new();
        scene.upsert(rect_node("outer", Point::ZERO, 200.0, 100.0), None);
        scene.upsert(
            rect_node("inner", Point::new(20.0, 30.0), 40.0, 20.0),
            Some("outer"),
        );
        scene.set_translate("outer", Point::new(100.0, 50.0));
        assert_eq!(
            scene.absolute_bounds("inner"),
            Some(Bounds::new(120.0, 80.0, 40.0, 20.0))
        );
    }

    #[test]
    fn emit_nests_groups() {
        let mut scene = SceneGraph::new();
        scene.upsert(rect_node("a", Point::new(5.0, 6.0), 10.0, 10.0), None);
        scene.upsert(rect_node("b", Point::ZERO, 4.0, 4.0), Some("a"));
        let svg = scene.emit();
        assert!(svg.contains(r#"<g id="a" transform="translate(5,6)">"#));
        assert!(svg.contains(r#"<g id="b">"#));
        assert!(svg.ends_with("</g></g>"));
    }
}
