use crate::model::Diagram;
use crate::project::Project;
use crate::router::RoutedConnection;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Machine-readable snapshot of a rendered diagram, for diffing in
/// tests and external tooling.
#[derive(Debug, Serialize)]
pub struct SceneDump {
    pub diagram_id: String,
    pub diagram_name: String,
    pub elements: Vec<ElementDump>,
    pub connections: Vec<ConnectionDump>,
}

#[derive(Debug, Serialize)]
pub struct ElementDump {
    pub id: String,
    pub entity_type: String,
    pub label: String,
    pub parent: Option<String>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Serialize)]
pub struct ConnectionDump {
    pub id: String,
    pub source: String,
    pub target: String,
    pub relationship: Option<String>,
    pub points: Vec<[f32; 2]>,
    pub midpoint: [f32; 2],
}

impl SceneDump {
    pub fn from_diagram(project: &Project, diagram: &Diagram, routed: &[RoutedConnection]) -> Self {
        let elements = diagram
            .descendants()
            .into_iter()
            .map(|child| {
                let bounds = diagram.absolute_bounds(&child.id).unwrap_or(child.bounds);
                let label = child
                    .element_id
                    .as_deref()
                    .and_then(|id| project.entity(id))
                    .map(|entity| entity.name.clone())
                    .or_else(|| child.content.clone())
                    .unwrap_or_default();
                ElementDump {
                    id: child.id.clone(),
                    entity_type: child.entity_type.clone(),
                    label,
                    parent: child.parent_id().map(str::to_string),
                    x: bounds.x,
                    y: bounds.y,
                    width: bounds.width,
                    height: bounds.height,
                }
            })
            .collect();

        let connections = routed
            .iter()
            .map(|connection| ConnectionDump {
                id: connection.id.clone(),
                source: connection.source.clone(),
                target: connection.target.clone(),
                relationship: connection.relationship_id.clone(),
                points: connection.coords.iter().map(|p| [p.x, p.y]).collect(),
                midpoint: [connection.midpoint.x, connection.midpoint.y],
            })
            .collect();

        SceneDump {
            diagram_id: diagram.id.clone(),
            diagram_name: diagram.name.clone(),
            elements,
            connections,
        }
    }
}

pub fn write_scene_dump(
    path: &Path,
    project: &Project,
    diagram: &Diagram,
    routed: &[RoutedConnection],
) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = SceneDump::from_diagram(project, diagram, routed);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
