//! Nested instance definitions and their flattening.
//!
//! Hosts model repeated geometry as references into a table of instance
//! definitions, which may themselves reference further definitions.
//! Flattening walks that structure with an explicit work stack so deeply
//! nested references cannot exhaust call-stack depth.

use glam::Mat4;

use crate::object::SceneObject;

/// An entry in a document or an instance definition.
#[derive(Debug, Clone)]
pub enum SceneEntry {
    /// A concrete placed object.
    Object(SceneObject),
    /// A placed reference to an instance definition.
    Instance {
        /// Index into the [`InstanceTable`].
        definition: usize,
        /// Placement of the referenced definition.
        transform: Mat4,
    },
}

/// One reusable block of scene content.
#[derive(Debug, Clone, Default)]
pub struct InstanceDefinition {
    pub name: Option<String>,
    pub entries: Vec<SceneEntry>,
}

/// The host's table of instance definitions.
#[derive(Debug, Clone, Default)]
pub struct InstanceTable {
    definitions: Vec<InstanceDefinition>,
}

impl InstanceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition and return its index.
    pub fn add(&mut self, definition: InstanceDefinition) -> usize {
        self.definitions.push(definition);
        self.definitions.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&InstanceDefinition> {
        self.definitions.get(index)
    }
}

/// Flatten a list of entries into placed objects, multiplying transforms
/// through nested instance references. Exploded pieces keep their source
/// object identity, so repeated references to one definition collapse to
/// a single encoded mesh downstream.
///
/// References to missing definitions are dropped.
pub fn explode_entries(entries: &[SceneEntry], table: &InstanceTable) -> Vec<SceneObject> {
    let mut objects = Vec::new();
    let mut stack: Vec<(&SceneEntry, Mat4)> = Vec::new();

    for entry in entries.iter().rev() {
        stack.push((entry, Mat4::IDENTITY));
    }

    while let Some((entry, parent)) = stack.pop() {
        match entry {
            SceneEntry::Object(object) => {
                let mut placed = object.clone();
                placed.transform = parent * object.transform;
                objects.push(placed);
            }
            SceneEntry::Instance {
                definition,
                transform,
            } => {
                if let Some(def) = table.get(*definition) {
                    let accumulated = parent * *transform;
                    for child in def.entries.iter().rev() {
                        stack.push((child, accumulated));
                    }
                }
            }
        }
    }

    objects
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{MeshData, MeshFace};
    use crate::object::ObjectId;
    use glam::Vec3;

    fn triangle_object(id: u64) -> SceneObject {
        SceneObject::new(ObjectId(id)).with_mesh(MeshData {
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            faces: vec![MeshFace::Triangle([0, 1, 2])],
            closed: true,
            ..Default::default()
        })
    }

    #[test]
    fn test_plain_objects_pass_through() {
        let table = InstanceTable::new();
        let entries = vec![
            SceneEntry::Object(triangle_object(1)),
            SceneEntry::Object(triangle_object(2)),
        ];

        let objects = explode_entries(&entries, &table);
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].id, ObjectId(1));
        assert_eq!(objects[1].id, ObjectId(2));
    }

    #[test]
    fn test_nested_instances_multiply_transforms() {
        let mut table = InstanceTable::new();

        // inner definition holds one object
        let inner = table.add(InstanceDefinition {
            name: Some("inner".into()),
            entries: vec![SceneEntry::Object(triangle_object(7))],
        });

        // outer definition places the inner one, shifted in X
        let outer = table.add(InstanceDefinition {
            name: Some("outer".into()),
            entries: vec![SceneEntry::Instance {
                definition: inner,
                transform: Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0)),
            }],
        });

        let entries = vec![SceneEntry::Instance {
            definition: outer,
            transform: Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0)),
        }];

        let objects = explode_entries(&entries, &table);
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].id, ObjectId(7));

        let translation = objects[0].transform.w_axis;
        assert_eq!(translation.x, 1.0);
        assert_eq!(translation.y, 2.0);
    }

    #[test]
    fn test_repeated_references_share_identity() {
        let mut table = InstanceTable::new();
        let def = table.add(InstanceDefinition {
            name: None,
            entries: vec![SceneEntry::Object(triangle_object(3))],
        });

        let entries = vec![
            SceneEntry::Instance {
                definition: def,
                transform: Mat4::IDENTITY,
            },
            SceneEntry::Instance {
                definition: def,
                transform: Mat4::from_translation(Vec3::Z),
            },
        ];

        let objects = explode_entries(&entries, &table);
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].id, objects[1].id);
        assert_ne!(objects[0].transform, objects[1].transform);
    }

    #[test]
    fn test_missing_definition_dropped() {
        let table = InstanceTable::new();
        let entries = vec![SceneEntry::Instance {
            definition: 42,
            transform: Mat4::IDENTITY,
        }];
        assert!(explode_entries(&entries, &table).is_empty());
    }

    #[test]
    fn test_deep_nesting_does_not_recurse() {
        let mut table = InstanceTable::new();
        let mut previous = table.add(InstanceDefinition {
            name: None,
            entries: vec![SceneEntry::Object(triangle_object(1))],
        });

        for _ in 0..10_000 {
            previous = table.add(InstanceDefinition {
                name: None,
                entries: vec![SceneEntry::Instance {
                    definition: previous,
                    transform: Mat4::IDENTITY,
                }],
            });
        }

        let entries = vec![SceneEntry::Instance {
            definition: previous,
            transform: Mat4::IDENTITY,
        }];
        assert_eq!(explode_entries(&entries, &table).len(), 1);
    }
}
