use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::geometry::{Bounds, Point};
use crate::model::{
    ChildStyle, ConnectionStyle, Diagram, DiagramChild, DiagramObject, Entity, ModelError,
    RelationshipEnds, SourceConnection,
};

/// The loaded model: entities plus their diagram views. The ArchiMate
/// XML/ZIP container is parsed elsewhere; this crate consumes a prepared
/// description (see [`Project::from_json`]).
#[derive(Debug)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub version: String,
    entities: BTreeMap<String, Entity>,
    diagrams: Vec<Diagram>,
}

impl Project {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            version: String::new(),
            entities: BTreeMap::new(),
            diagrams: Vec::new(),
        }
    }

    pub fn add_entity(&mut self, entity: Entity) {
        self.entities.insert(entity.id.clone(), entity);
    }

    pub fn add_diagram(&mut self, diagram: Diagram) {
        self.diagrams.push(diagram);
    }

    pub fn entity(&self, id: &str) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn entity_mut(&mut self, id: &str) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn diagrams(&self) -> &[Diagram] {
        &self.diagrams
    }

    pub fn diagram(&self, id: &str) -> Option<&Diagram> {
        self.diagrams.iter().find(|d| d.id == id)
    }

    pub fn diagram_mut(&mut self, id: &str) -> Option<&mut Diagram> {
        self.diagrams.iter_mut().find(|d| d.id == id)
    }

    pub fn source_relationships(&self, id: &str) -> Vec<&Entity> {
        self.entities
            .values()
            .filter(|e| {
                e.relationship
                    .as_ref()
                    .is_some_and(|ends| ends.source == id)
            })
            .collect()
    }

    pub fn target_relationships(&self, id: &str) -> Vec<&Entity> {
        self.entities
            .values()
            .filter(|e| {
                e.relationship
                    .as_ref()
                    .is_some_and(|ends| ends.target == id)
            })
            .collect()
    }

    pub fn diagrams_with_element(&self, id: &str) -> Vec<&Diagram> {
        self.diagrams
            .iter()
            .filter(|d| {
                d.descendants()
                    .iter()
                    .any(|c| c.element_id.as_deref() == Some(id))
            })
            .collect()
    }

    /// Entities referenced by no diagram child or connection.
    pub fn unused_entities(&self) -> Vec<&Entity> {
        let mut used: HashSet<&str> = HashSet::new();
        for diagram in &self.diagrams {
            used.insert(diagram.id.as_str());
            for object in diagram.descendants_with_connections() {
                match object {
                    DiagramObject::Child(child) => {
                        if let Some(element_id) = &child.element_id {
                            used.insert(element_id);
                        }
                    }
                    DiagramObject::Connection(connection) => {
                        if let Some(relationship_id) = &connection.relationship_id {
                            used.insert(relationship_id);
                        }
                    }
                }
            }
        }
        self.entities
            .values()
            .filter(|e| !used.contains(e.id.as_str()))
            .collect()
    }

    /// Update the text behind a diagram child. A child that represents a
    /// named entity renames that entity (shared across every diagram that
    /// references it); an inline note updates its own content.
    pub fn set_text(
        &mut self,
        diagram_id: &str,
        child_id: &str,
        text: &str,
    ) -> Result<(), ModelError> {
        let diagram = self
            .diagrams
            .iter_mut()
            .find(|d| d.id == diagram_id)
            .ok_or_else(|| ModelError::UnknownDiagram(diagram_id.to_string()))?;
        let element_id = diagram
            .child(child_id)
            .ok_or_else(|| ModelError::UnknownChild(child_id.to_string()))?
            .element_id
            .clone();
        match element_id.and_then(|id| self.entities.get_mut(&id)) {
            Some(entity) => entity.set_name(text),
            None => {
                if let Some(child) = diagram.child_mut(child_id) {
                    child.content = Some(text.to_string());
                }
            }
        }
        Ok(())
    }

    pub fn from_json(input: &str) -> anyhow::Result<Project> {
        let spec: ProjectSpec = serde_json::from_str(input)?;
        spec.build()
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Project> {
        let input = std::fs::read_to_string(path)?;
        Project::from_json(&input)
    }
}

// ── JSON project description ────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSpec {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub entities: Vec<EntitySpec>,
    #[serde(default)]
    pub diagrams: Vec<DiagramSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySpec {
    pub id: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub documentation: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagramSpec {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub documentation: String,
    #[serde(default)]
    pub children: Vec<ChildSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildSpec {
    pub id: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(default)]
    pub element: Option<String>,
    pub bounds: [f32; 4],
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub style: ChildStyle,
    #[serde(default)]
    pub children: Vec<ChildSpec>,
    #[serde(default)]
    pub connections: Vec<ConnectionSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionSpec {
    pub id: String,
    pub target: String,
    #[serde(default)]
    pub relationship: Option<String>,
    #[serde(default)]
    pub bend_points: Vec<[f32; 2]>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub style: ConnectionStyle,
}

impl ProjectSpec {
    pub fn build(&self) -> anyhow::Result<Project> {
        let mut project = Project::new(&self.id, &self.name);
        project.version = self.version.clone();

        for spec in &self.entities {
            let mut entity = Entity::new(&spec.id, &spec.entity_type, &spec.name);
            entity.documentation = spec.documentation.clone();
            entity.attributes = spec.attributes.clone();
            if let (Some(source), Some(target)) = (&spec.source, &spec.target) {
                entity.relationship = Some(RelationshipEnds {
                    source: source.clone(),
                    target: target.clone(),
                });
            }
            project.add_entity(entity);
        }

        for spec in &self.diagrams {
            let mut diagram = Diagram::new(&spec.id, &spec.name);
            diagram.documentation = spec.documentation.clone();
            for child in &spec.children {
                insert_child_spec(&mut diagram, child, None)?;
            }
            project.add_diagram(diagram);
        }

        Ok(project)
    }
}

fn insert_child_spec(
    diagram: &mut Diagram,
    spec: &ChildSpec,
    parent: Option<&str>,
) -> anyhow::Result<()> {
    let [x, y, width, height] = spec.bounds;
    let mut child = DiagramChild::new(&spec.id, &spec.entity_type, Bounds::new(x, y, width, height));
    child.element_id = spec.element.clone();
    child.content = spec.content.clone();
    child.style = spec.style.clone();
    for connection in &spec.connections {
        let mut built = SourceConnection::new(&connection.id, &spec.id, &connection.target);
        built.relationship_id = connection.relationship.clone();
        built.bend_points = connection
            .bend_points
            .iter()
            .map(|[bx, by]| Point::new(*bx, *by))
            .collect();
        built.label = connection.label.clone();
        built.style = connection.style.clone();
        child.source_connections.push(built);
    }
    diagram.insert_child(child, parent)?;
    for nested in &spec.children {
        insert_child_spec(diagram, nested, Some(&spec.id))?;
    }
    Ok(())
}
