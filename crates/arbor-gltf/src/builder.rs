//! Scene-graph construction: object nodes, node matrices and the
//! optional layer-grouping hierarchy.

use std::collections::HashMap;

use arbor_scene::{LayerId, LayerTable, SceneObject};
use glam::Mat4;

use crate::document::DocumentBuilder;
use crate::options::ExportOptions;
use crate::schema::Node;

/// Builds the node list, caching synthetic layer nodes so leaves that
/// share an ancestor share its node.
#[derive(Debug, Default)]
pub struct SceneGraphBuilder {
    layer_nodes: HashMap<LayerId, usize>,
}

impl SceneGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the node for a placed object and attach it to the scene
    /// root or its layer chain.
    pub fn add_object_node(
        &mut self,
        doc: &mut DocumentBuilder,
        object: &SceneObject,
        mesh_index: usize,
        options: &ExportOptions,
        layers: &LayerTable,
    ) -> usize {
        let scale = options.units.meters_per_unit() as f32;
        let node = Node {
            name: object.name.clone(),
            mesh: Some(mesh_index),
            matrix: node_matrix(&object.transform, scale, options.map_z_to_y),
            ..Default::default()
        };
        let index = doc.push_node(node);

        let layer = if options.export_layers {
            object.layer
        } else {
            None
        };
        match layer {
            Some(layer_id) => self.add_to_layer(doc, layers, layer_id, index),
            None => doc.push_scene_root(index),
        }
        index
    }

    /// Attach `child` under the node for `layer_id`, creating and
    /// caching the ancestor chain as needed. Layers without a parent
    /// attach to the scene root.
    fn add_to_layer(
        &mut self,
        doc: &mut DocumentBuilder,
        layers: &LayerTable,
        layer_id: LayerId,
        child: usize,
    ) {
        if let Some(&existing) = self.layer_nodes.get(&layer_id) {
            doc.gltf.nodes[existing].children.push(child);
            return;
        }

        let (name, parent) = match layers.find(layer_id) {
            Some(layer) => (layer.name.clone(), layer.parent),
            None => {
                doc.push_scene_root(child);
                return;
            }
        };

        let index = doc.push_node(Node {
            name: Some(name),
            children: vec![child],
            ..Default::default()
        });
        self.layer_nodes.insert(layer_id, index);

        match parent {
            Some(parent_id) => self.add_to_layer(doc, layers, parent_id, index),
            None => doc.push_scene_root(index),
        }
    }
}

/// The change-of-basis node matrix: axis remap applied to the whole
/// 4x4, with the unit scale applied to the translation terms only.
/// Returns `None` when the result is the identity.
pub(crate) fn node_matrix(transform: &Mat4, scale: f32, map_z_to_y: bool) -> Option<[f32; 16]> {
    let t = transform.to_cols_array_2d();
    let remapped: [[f32; 4]; 4] = if map_z_to_y {
        [
            [t[0][0], t[0][2], -t[0][1], t[0][3]],
            [t[2][0], t[2][2], -t[2][1], t[2][3]],
            [-t[1][0], -t[1][2], t[1][1], -t[1][3]],
            [t[3][0] * scale, t[3][2] * scale, -t[3][1] * scale, t[3][3]],
        ]
    } else {
        [
            t[0],
            t[1],
            t[2],
            [t[3][0] * scale, t[3][1] * scale, t[3][2] * scale, t[3][3]],
        ]
    };

    let matrix = Mat4::from_cols_array_2d(&remapped);
    if matrix == Mat4::IDENTITY {
        None
    } else {
        Some(matrix.to_cols_array())
    }
}
