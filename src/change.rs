use serde::{Deserialize, Serialize};

use crate::geometry::{Bounds, Handle, Point};
use crate::model::ModelError;
use crate::project::Project;

/// One committed edit, carrying both sides so it can be applied in
/// either direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Change {
    Move(MoveChange),
    Resize(ResizeChange),
    Connection(ConnectionChange),
    Text(TextChange),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveChange {
    pub element_id: String,
    pub old_parent: Option<String>,
    pub new_parent: Option<String>,
    pub old_bounds: Bounds,
    pub new_bounds: Bounds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResizeChange {
    pub element_id: String,
    pub handle: Handle,
    pub old_bounds: Bounds,
    pub new_bounds: Bounds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionChange {
    pub connection_id: String,
    pub old_bend_points: Vec<Point>,
    pub new_bend_points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextChange {
    pub element_id: String,
    pub old_text: String,
    pub new_text: String,
}

impl Change {
    /// The reverse edit: old and new sides swapped.
    pub fn invert(&self) -> Change {
        match self {
            Change::Move(change) => Change::Move(MoveChange {
                element_id: change.element_id.clone(),
                old_parent: change.new_parent.clone(),
                new_parent: change.old_parent.clone(),
                old_bounds: change.new_bounds,
                new_bounds: change.old_bounds,
            }),
            Change::Resize(change) => Change::Resize(ResizeChange {
                element_id: change.element_id.clone(),
                handle: change.handle,
                old_bounds: change.new_bounds,
                new_bounds: change.old_bounds,
            }),
            Change::Connection(change) => Change::Connection(ConnectionChange {
                connection_id: change.connection_id.clone(),
                old_bend_points: change.new_bend_points.clone(),
                new_bend_points: change.old_bend_points.clone(),
            }),
            Change::Text(change) => Change::Text(TextChange {
                element_id: change.element_id.clone(),
                old_text: change.new_text.clone(),
                new_text: change.old_text.clone(),
            }),
        }
    }

    /// A change whose two sides are equal is a no-op and never enters
    /// the history.
    pub fn is_changed(&self) -> bool {
        match self {
            Change::Move(change) => {
                change.old_parent != change.new_parent || change.old_bounds != change.new_bounds
            }
            Change::Resize(change) => change.old_bounds != change.new_bounds,
            Change::Connection(change) => change.old_bend_points != change.new_bend_points,
            Change::Text(change) => change.old_text != change.new_text,
        }
    }
}

/// Apply the "new" side of a change to the model. Inverting first makes
/// this the undo path as well.
pub fn apply_change(
    project: &mut Project,
    diagram_id: &str,
    change: &Change,
) -> Result<(), ModelError> {
    match change {
        Change::Move(change) => {
            let diagram = project
                .diagram_mut(diagram_id)
                .ok_or_else(|| ModelError::UnknownDiagram(diagram_id.to_string()))?;
            diagram.reparent(&change.element_id, change.new_parent.as_deref())?;
            diagram.set_bounds(&change.element_id, change.new_bounds)?;
            Ok(())
        }
        Change::Resize(change) => {
            let diagram = project
                .diagram_mut(diagram_id)
                .ok_or_else(|| ModelError::UnknownDiagram(diagram_id.to_string()))?;
            diagram.set_bounds(&change.element_id, change.new_bounds)
        }
        Change::Connection(change) => {
            let diagram = project
                .diagram_mut(diagram_id)
                .ok_or_else(|| ModelError::UnknownDiagram(diagram_id.to_string()))?;
            diagram.set_bend_points(&change.connection_id, change.new_bend_points.clone())
        }
        Change::Text(change) => project.set_text(diagram_id, &change.element_id, &change.new_text),
    }
}

/// Linear undo history with a cursor. Entries above the cursor are the
/// redo tail; committing while undone truncates it.
#[derive(Debug, Default)]
pub struct ChangeManager {
    history: Vec<Change>,
    cursor: usize,
}

impl ChangeManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.history.len()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Record a change that has already been applied to the model.
    pub fn commit(&mut self, change: Change) {
        if !change.is_changed() {
            return;
        }
        self.history.truncate(self.cursor);
        self.history.push(change);
        self.cursor = self.history.len();
    }

    /// Roll the model back one step. Returns false at the bottom.
    pub fn undo(&mut self, project: &mut Project, diagram_id: &str) -> Result<bool, ModelError> {
        if self.cursor == 0 {
            return Ok(false);
        }
        let inverted = self.history[self.cursor - 1].invert();
        apply_change(project, diagram_id, &inverted)?;
        self.cursor -= 1;
        Ok(true)
    }

    /// Re-apply the next undone step. Returns false at the top.
    pub fn redo(&mut self, project: &mut Project, diagram_id: &str) -> Result<bool, ModelError> {
        if self.cursor >= self.history.len() {
            return Ok(false);
        }
        let change = self.history[self.cursor].clone();
        apply_change(project, diagram_id, &change)?;
        self.cursor += 1;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Diagram, DiagramChild, SourceConnection};

    fn sample_project() -> Project {
        let mut project = Project::new("p", "Sample");
        let mut diagram = Diagram::new("view", "Overview");
        diagram
            .insert_child(
                DiagramChild::new("a", "BusinessActor", Bounds::new(0.0, 0.0, 160.0, 60.0)),
                None,
            )
            .unwrap();
        let mut b = DiagramChild::new("b", "Grouping", Bounds::new(200.0, 100.0, 300.0, 200.0));
        b.source_connections.push(SourceConnection::new("c1", "b", "a"));
        diagram.insert_child(b, None).unwrap();
        project.add_diagram(diagram);
        project
    }

    fn bounds_of(project: &Project, id: &str) -> Bounds {
        project.diagram("view").unwrap().child(id).unwrap().bounds
    }

    #[test]
    fn invert_swaps_sides() {
        let change = Change::Resize(ResizeChange {
            element_id: "a".to_string(),
            handle: Handle::BottomRight,
            old_bounds: Bounds::new(0.0, 0.0, 160.0, 60.0),
            new_bounds: Bounds::new(0.0, 0.0, 200.0, 80.0),
        });
        let inverted = change.invert();
        assert_eq!(inverted.invert(), change);
        assert!(change.is_changed());
    }

    #[test]
    fn noop_changes_never_enter_history() {
        let mut manager = ChangeManager::new();
        manager.commit(Change::Text(TextChange {
            element_id: "a".to_string(),
            old_text: "same".to_string(),
            new_text: "same".to_string(),
        }));
        assert!(manager.is_empty());
    }

    #[test]
    fn move_round_trips_through_undo() {
        let mut project = sample_project();
        let change = Change::Move(MoveChange {
            element_id: "a".to_string(),
            old_parent: None,
            new_parent: Some("b".to_string()),
            old_bounds: Bounds::new(0.0, 0.0, 160.0, 60.0),
            new_bounds: Bounds::new(20.0, 30.0, 160.0, 60.0),
        });
        apply_change(&mut project, "view", &change).unwrap();
        let mut manager = ChangeManager::new();
        manager.commit(change);

        assert_eq!(bounds_of(&project, "a"), Bounds::new(20.0, 30.0, 160.0, 60.0));
        assert_eq!(
            project
                .diagram("view")
                .unwrap()
                .child("a")
                .unwrap()
                .parent_id(),
            Some("b")
        );

        assert!(manager.undo(&mut project, "view").unwrap());
        assert_eq!(bounds_of(&project, "a"), Bounds::new(0.0, 0.0, 160.0, 60.0));
        assert_eq!(
            project.diagram("view").unwrap().child("a").unwrap().parent_id(),
            None
        );

        assert!(manager.redo(&mut project, "view").unwrap());
        assert_eq!(bounds_of(&project, "a"), Bounds::new(20.0, 30.0, 160.0, 60.0));
    }

    #[test]
    fn undo_at_bottom_and_redo_at_top_are_noops() {
        let mut project = sample_project();
        let mut manager = ChangeManager::new();
        assert!(!manager.undo(&mut project, "view").unwrap());
        assert!(!manager.redo(&mut project, "view").unwrap());
    }

    #[test]
    fn commit_after_undo_truncates_redo_tail() {
        let mut project = sample_project();
        let mut manager = ChangeManager::new();

        let first = Change::Resize(ResizeChange {
            element_id: "a".to_string(),
            handle: Handle::Right,
            old_bounds: Bounds::new(0.0, 0.0, 160.0, 60.0),
            new_bounds: Bounds::new(0.0, 0.0, 200.0, 60.0),
        });
        apply_change(&mut project, "view", &first).unwrap();
        manager.commit(first);

        let second = Change::Resize(ResizeChange {
            element_id: "a".to_string(),
            handle: Handle::Bottom,
            old_bounds: Bounds::new(0.0, 0.0, 200.0, 60.0),
            new_bounds: Bounds::new(0.0, 0.0, 200.0, 96.0),
        });
        apply_change(&mut project, "view", &second).unwrap();
        manager.commit(second);

        manager.undo(&mut project, "view").unwrap();
        manager.undo(&mut project, "view").unwrap();

        let replacement = Change::Connection(ConnectionChange {
            connection_id: "c1".to_string(),
            old_bend_points: vec![],
            new_bend_points: vec![Point::new(40.0, 50.0)],
        });
        apply_change(&mut project, "view", &replacement).unwrap();
        manager.commit(replacement);

        assert_eq!(manager.len(), 1);
        assert!(!manager.can_redo());
        assert!(manager.can_undo());
    }

    #[test]
    fn bend_point_edit_round_trips() {
        let mut project = sample_project();
        let change = Change::Connection(ConnectionChange {
            connection_id: "c1".to_string(),
            old_bend_points: vec![Point::new(40.0, 0.0)],
            new_bend_points: vec![Point::new(40.0, 50.0)],
        });
        // Seed the starting state, then apply and undo.
        apply_change(
            &mut project,
            "view",
            &Change::Connection(ConnectionChange {
                connection_id: "c1".to_string(),
                old_bend_points: vec![],
                new_bend_points: vec![Point::new(40.0, 0.0)],
            }),
        )
        .unwrap();
        apply_change(&mut project, "view", &change).unwrap();
        let mut manager = ChangeManager::new();
        manager.commit(change);
        manager.undo(&mut project, "view").unwrap();
        assert_eq!(
            project
                .diagram("view")
                .unwrap()
                .connection("c1")
                .unwrap()
                .bend_points,
            vec![Point::new(40.0, 0.0)]
        );
    }
}
