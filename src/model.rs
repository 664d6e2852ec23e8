use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{Bounds, Point};

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown diagram child: {0}")]
    UnknownChild(String),
    #[error("unknown connection: {0}")]
    UnknownConnection(String),
    #[error("unknown diagram: {0}")]
    UnknownDiagram(String),
    #[error("cannot reparent {child} into its own descendant {parent}")]
    ReparentIntoDescendant { child: String, parent: String },
}

/// An architecture concept from the model: node, relationship, or diagram.
///
/// `attributes` carries source-document attributes that are not otherwise
/// modeled, so a consumer can round-trip them. Name and relationship
/// endpoint mutations write through to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub entity_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub documentation: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<RelationshipEnds>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipEnds {
    pub source: String,
    pub target: String,
}

impl Entity {
    pub fn new(id: &str, entity_type: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            entity_type: entity_type.to_string(),
            name: name.to_string(),
            documentation: String::new(),
            attributes: BTreeMap::new(),
            relationship: None,
        }
    }

    pub fn is_relationship(&self) -> bool {
        self.relationship.is_some()
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
        self.attributes
            .insert("name".to_string(), name.to_string());
    }

    pub fn set_relationship_source(&mut self, source: &str) {
        if let Some(ends) = &mut self.relationship {
            ends.source = source.to_string();
            self.attributes
                .insert("source".to_string(), source.to_string());
        }
    }

    pub fn set_relationship_target(&mut self, target: &str) {
        if let Some(ends) = &mut self.relationship {
            ends.target = target.to_string();
            self.attributes
                .insert("target".to_string(), target.to_string());
        }
    }
}

/// Visual overrides for a single diagram child.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChildStyle {
    pub fill_color: Option<String>,
    pub line_color: Option<String>,
    pub font: Option<String>,
    pub font_color: Option<String>,
    pub text_alignment: Option<String>,
    pub text_position: Option<String>,
    pub alpha: Option<f32>,
    pub image_path: Option<String>,
    pub image_position: Option<String>,
}

/// Line styling and arrowhead flags for a connection. Project files may
/// carry any subset of the fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionStyle {
    pub line_width: Option<f32>,
    pub line_color: Option<String>,
    pub dash_pattern: Option<String>,
    pub arrow_start: bool,
    pub arrow_end: bool,
}

/// A directed visual connection anchored at its owning child and a target
/// id. The target may be another child or another connection, in which
/// case the anchor is that connection's midpoint.
///
/// Bend points are stored relative to the connection's resolved start
/// anchor. Moving the anchor means re-resolving, never shifting the bend
/// points themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConnection {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship_id: Option<String>,
    #[serde(default)]
    pub bend_points: Vec<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub style: ConnectionStyle,
}

impl SourceConnection {
    pub fn new(id: &str, source: &str, target: &str) -> Self {
        Self {
            id: id.to_string(),
            source: source.to_string(),
            target: target.to_string(),
            relationship_id: None,
            bend_points: Vec::new(),
            label: None,
            style: ConnectionStyle::default(),
        }
    }
}

/// A positioned placement of an entity (or inline content such as a note)
/// on a diagram. Bounds are local to the parent; nesting is expressed via
/// the diagram's arena, not by absolute coordinates.
#[derive(Debug, Clone)]
pub struct DiagramChild {
    pub id: String,
    pub entity_type: String,
    /// Entity this child represents. Notes and groups have none.
    pub element_id: Option<String>,
    pub bounds: Bounds,
    /// Inline text for children that do not reference an entity.
    pub content: Option<String>,
    pub style: ChildStyle,
    pub source_connections: Vec<SourceConnection>,
    parent: Option<String>,
    children: Vec<String>,
}

impl DiagramChild {
    pub fn new(id: &str, entity_type: &str, bounds: Bounds) -> Self {
        Self {
            id: id.to_string(),
            entity_type: entity_type.to_string(),
            element_id: None,
            bounds,
            content: None,
            style: ChildStyle::default(),
            source_connections: Vec::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_element(mut self, element_id: &str) -> Self {
        self.element_id = Some(element_id.to_string());
        self
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn child_ids(&self) -> &[String] {
        &self.children
    }
}

/// Either a child or a connection, as returned by id lookup and the
/// interleaved descendant walk.
#[derive(Debug, Clone, Copy)]
pub enum DiagramObject<'a> {
    Child(&'a DiagramChild),
    Connection(&'a SourceConnection),
}

impl<'a> DiagramObject<'a> {
    pub fn id(&self) -> &'a str {
        match self {
            DiagramObject::Child(child) => &child.id,
            DiagramObject::Connection(connection) => &connection.id,
        }
    }
}

#[derive(Debug, Default)]
struct DiagramIndex {
    /// connection id -> owning child id
    connection_owner: HashMap<String, String>,
}

/// A diagram: an arena of children keyed by id plus the ordered top-level
/// list. The only cached derived view is the by-id index; it is dropped by
/// every structural mutation and rebuilt on the next lookup.
#[derive(Debug)]
pub struct Diagram {
    pub id: String,
    pub name: String,
    pub documentation: String,
    nodes: BTreeMap<String, DiagramChild>,
    roots: Vec<String>,
    index: RefCell<Option<DiagramIndex>>,
}

impl Diagram {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            documentation: String::new(),
            nodes: BTreeMap::new(),
            roots: Vec::new(),
            index: RefCell::new(None),
        }
    }

    /// Attach `child` under `parent` (or at top level). Used by loaders and
    /// tests; interactive edits go through [`Diagram::reparent`].
    pub fn insert_child(
        &mut self,
        mut child: DiagramChild,
        parent: Option<&str>,
    ) -> Result<(), ModelError> {
        if let Some(parent_id) = parent {
            let Some(parent_node) = self.nodes.get_mut(parent_id) else {
                return Err(ModelError::UnknownChild(parent_id.to_string()));
            };
            parent_node.children.push(child.id.clone());
            child.parent = Some(parent_id.to_string());
        } else {
            self.roots.push(child.id.clone());
            child.parent = None;
        }
        self.nodes.insert(child.id.clone(), child);
        self.invalidate();
        Ok(())
    }

    pub fn child(&self, id: &str) -> Option<&DiagramChild> {
        self.nodes.get(id)
    }

    pub(crate) fn child_mut(&mut self, id: &str) -> Option<&mut DiagramChild> {
        self.nodes.get_mut(id)
    }

    /// Top-level children in z-order.
    pub fn children(&self) -> impl Iterator<Item = &DiagramChild> {
        self.roots.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Pre-order flattening of the containment tree. Recomputed from the
    /// arena on every call; O(n) at diagram scale.
    pub fn descendants(&self) -> Vec<&DiagramChild> {
        let mut out = Vec::with_capacity(self.nodes.len());
        for root in &self.roots {
            self.flatten_into(root, &mut out);
        }
        out
    }

    fn flatten_into<'a>(&'a self, id: &str, out: &mut Vec<&'a DiagramChild>) {
        if let Some(node) = self.nodes.get(id) {
            out.push(node);
            for child_id in &node.children {
                self.flatten_into(child_id, out);
            }
        }
    }

    /// Descendants interleaved with their outgoing connections, used when
    /// resolving connections that land on another connection's midpoint.
    pub fn descendants_with_connections(&self) -> Vec<DiagramObject<'_>> {
        let mut out = Vec::new();
        for child in self.descendants() {
            out.push(DiagramObject::Child(child));
            for connection in &child.source_connections {
                out.push(DiagramObject::Connection(connection));
            }
        }
        out
    }

    pub fn connection(&self, id: &str) -> Option<&SourceConnection> {
        let owner = self.with_index(|index| index.connection_owner.get(id).cloned())?;
        self.nodes
            .get(&owner)?
            .source_connections
            .iter()
            .find(|c| c.id == id)
    }

    /// O(1) lookup for a child or connection by id.
    pub fn object_by_id(&self, id: &str) -> Option<DiagramObject<'_>> {
        if let Some(child) = self.nodes.get(id) {
            return Some(DiagramObject::Child(child));
        }
        self.connection(id).map(DiagramObject::Connection)
    }

    /// Absolute top-left of a child: sum of local origins up the parent
    /// chain. Computed on read, never cached.
    pub fn absolute_position(&self, id: &str) -> Option<Point> {
        let mut node = self.nodes.get(id)?;
        let mut pos = node.bounds.origin();
        while let Some(parent_id) = &node.parent {
            node = self.nodes.get(parent_id)?;
            pos = pos.add(node.bounds.origin());
        }
        Some(pos)
    }

    pub fn absolute_bounds(&self, id: &str) -> Option<Bounds> {
        let pos = self.absolute_position(id)?;
        let node = self.nodes.get(id)?;
        Some(node.bounds.with_origin(pos))
    }

    pub fn is_descendant_of(&self, id: &str, ancestor: &str) -> bool {
        let mut current = self.nodes.get(id).and_then(|n| n.parent.as_deref());
        while let Some(parent_id) = current {
            if parent_id == ancestor {
                return true;
            }
            current = self.nodes.get(parent_id).and_then(|n| n.parent.as_deref());
        }
        false
    }

    /// Move `child_id` under `new_parent` (or to top level): detach from the
    /// old sibling list, append to the new one, update the parent pointer,
    /// invalidate the index. Bounds are left untouched; translating them
    /// into the new coordinate space is the caller's job.
    pub fn reparent(&mut self, child_id: &str, new_parent: Option<&str>) -> Result<(), ModelError> {
        if !self.nodes.contains_key(child_id) {
            return Err(ModelError::UnknownChild(child_id.to_string()));
        }
        if let Some(parent_id) = new_parent {
            if !self.nodes.contains_key(parent_id) {
                return Err(ModelError::UnknownChild(parent_id.to_string()));
            }
            if parent_id == child_id || self.is_descendant_of(parent_id, child_id) {
                return Err(ModelError::ReparentIntoDescendant {
                    child: child_id.to_string(),
                    parent: parent_id.to_string(),
                });
            }
        }

        let old_parent = self
            .nodes
            .get(child_id)
            .and_then(|n| n.parent.clone());
        match &old_parent {
            Some(parent_id) => {
                if let Some(parent_node) = self.nodes.get_mut(parent_id) {
                    parent_node.children.retain(|c| c != child_id);
                }
            }
            None => self.roots.retain(|c| c != child_id),
        }
        match new_parent {
            Some(parent_id) => {
                if let Some(parent_node) = self.nodes.get_mut(parent_id) {
                    parent_node.children.push(child_id.to_string());
                }
            }
            None => self.roots.push(child_id.to_string()),
        }
        if let Some(node) = self.nodes.get_mut(child_id) {
            node.parent = new_parent.map(str::to_string);
        }
        self.invalidate();
        Ok(())
    }

    /// Direct bounds replacement. Width/height are kept non-negative; the
    /// editor clamps to its minimum size before calling.
    pub fn set_bounds(&mut self, child_id: &str, bounds: Bounds) -> Result<(), ModelError> {
        let Some(node) = self.nodes.get_mut(child_id) else {
            return Err(ModelError::UnknownChild(child_id.to_string()));
        };
        node.bounds = Bounds::new(
            bounds.x,
            bounds.y,
            bounds.width.max(0.0),
            bounds.height.max(0.0),
        );
        Ok(())
    }

    pub fn set_bend_points(
        &mut self,
        connection_id: &str,
        points: Vec<Point>,
    ) -> Result<(), ModelError> {
        let Some(owner) =
            self.with_index(|index| index.connection_owner.get(connection_id).cloned())
        else {
            return Err(ModelError::UnknownConnection(connection_id.to_string()));
        };
        let connection = self
            .nodes
            .get_mut(&owner)
            .and_then(|n| {
                n.source_connections
                    .iter_mut()
                    .find(|c| c.id == connection_id)
            })
            .ok_or_else(|| ModelError::UnknownConnection(connection_id.to_string()))?;
        connection.bend_points = points;
        Ok(())
    }

    fn invalidate(&mut self) {
        *self.index.get_mut() = None;
    }

    fn with_index<T>(&self, f: impl FnOnce(&DiagramIndex) -> T) -> T {
        let mut slot = self.index.borrow_mut();
        let index = slot.get_or_insert_with(|| {
            let mut index = DiagramIndex::default();
            for node in self.nodes.values() {
                for connection in &node.source_connections {
                    index
                        .connection_owner
                        .insert(connection.id.clone(), node.id.clone());
                }
            }
            index
        });
        f(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_diagram() -> Diagram {
        let mut diagram = Diagram::new("d1", "Sample");
        diagram
            .insert_child(
                DiagramChild::new("a", "BusinessActor", Bounds::new(0.0, 0.0, 160.0, 60.0)),
                None,
            )
            .unwrap();
        diagram
            .insert_child(
                DiagramChild::new("b", "Grouping", Bounds::new(200.0, 100.0, 300.0, 200.0)),
                None,
            )
            .unwrap();
        diagram
            .insert_child(
                DiagramChild::new("c", "BusinessRole", Bounds::new(20.0, 30.0, 120.0, 50.0)),
                Some("b"),
            )
            .unwrap();
        diagram
    }

    #[test]
    fn descendants_are_preorder() {
        let diagram = sample_diagram();
        let ids: Vec<&str> = diagram.descendants().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn absolute_position_sums_parent_chain() {
        let diagram = sample_diagram();
        assert_eq!(
            diagram.absolute_position("c"),
            Some(Point::new(220.0, 130.0))
        );
    }

    #[test]
    fn reparent_moves_between_sibling_lists() {
        let mut diagram = sample_diagram();
        diagram.reparent("a", Some("b")).unwrap();
        assert_eq!(diagram.child("a").unwrap().parent_id(), Some("b"));
        assert!(diagram.child("b").unwrap().child_ids().contains(&"a".to_string()));
        assert_eq!(diagram.children().count(), 1);

        diagram.reparent("a", None).unwrap();
        assert_eq!(diagram.child("a").unwrap().parent_id(), None);
        assert!(!diagram.child("b").unwrap().child_ids().contains(&"a".to_string()));
        assert_eq!(diagram.children().count(), 2);
    }

    #[test]
    fn reparent_into_own_descendant_is_rejected() {
        let mut diagram = sample_diagram();
        let err = diagram.reparent("b", Some("c")).unwrap_err();
        assert!(matches!(err, ModelError::ReparentIntoDescendant { .. }));
    }

    #[test]
    fn connection_lookup_survives_reparent() {
        let mut diagram = sample_diagram();
        diagram
            .child_mut("a")
            .unwrap()
            .source_connections
            .push(SourceConnection::new("conn1", "a", "c"));
        assert!(diagram.connection("conn1").is_some());

        diagram.reparent("a", Some("b")).unwrap();
        // index was invalidated and rebuilt
        assert!(diagram.connection("conn1").is_some());
        assert!(matches!(
            diagram.object_by_id("conn1"),
            Some(DiagramObject::Connection(_))
        ));
    }

    #[test]
    fn descendants_equal_after_noop_edit() {
        let mut diagram = sample_diagram();
        let before: Vec<String> = diagram.descendants().iter().map(|c| c.id.clone()).collect();
        let bounds = diagram.child("a").unwrap().bounds;
        diagram.set_bounds("a", bounds).unwrap();
        let after: Vec<String> = diagram.descendants().iter().map(|c| c.id.clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn partial_style_objects_deserialize() {
        let style: ConnectionStyle = serde_json::from_str(r#"{"dash_pattern":"4,2"}"#).unwrap();
        assert_eq!(style.dash_pattern.as_deref(), Some("4,2"));
        assert!(!style.arrow_start);
        assert!(!style.arrow_end);
        assert_eq!(style.line_width, None);
    }

    #[test]
    fn relationship_mutation_writes_through() {
        let mut entity = Entity::new("r1", "AssignmentRelationship", "");
        entity.relationship = Some(RelationshipEnds {
            source: "a".to_string(),
            target: "b".to_string(),
        });
        entity.set_relationship_target("c");
        assert_eq!(entity.relationship.as_ref().unwrap().target, "c");
        assert_eq!(entity.attributes.get("target"), Some(&"c".to_string()));
    }
}
