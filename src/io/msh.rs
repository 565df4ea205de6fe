use crate::mesh::{Tri3d2Connectivity, TriangleMesh2d};
use eyre::{eyre, Context};
use log::warn;
use nalgebra::Point2;
use std::path::Path;

/// Loads a triangle mesh from a Gmsh MSH file at the given path.
pub fn load_msh_from_file<P: AsRef<Path>>(file_path: P) -> eyre::Result<TriangleMesh2d<f64>> {
    let file_path = file_path.as_ref();
    let msh_bytes =
        std::fs::read(file_path).wrap_err_with(|| format!("failed to read file {}", file_path.display()))?;
    load_msh_from_bytes(&msh_bytes).wrap_err("failed to load mesh from msh file")
}

/// Loads a triangle mesh by parsing the given bytes as a Gmsh MSH file.
///
/// Only the `Tri3` element blocks of two-dimensional entities are read, other blocks
/// (e.g. boundary lines) are skipped. The z coordinate of nodes is discarded.
pub fn load_msh_from_bytes(bytes: &[u8]) -> eyre::Result<TriangleMesh2d<f64>> {
    let mut msh_file = mshio::parse_msh_bytes(bytes).map_err(|e| eyre!("failed to parse msh file: {}", e))?;

    let msh_nodes = msh_file
        .data
        .nodes
        .take()
        .ok_or(eyre!("MSH file does not contain nodes"))?;
    let msh_elements = msh_file
        .data
        .elements
        .take()
        .ok_or(eyre!("MSH file does not contain elements"))?;

    if !msh_elements.element_blocks.iter().any(is_triangle_block) {
        return Err(eyre!("MSH file does not contain a block of triangles (Tri3 of dim 2)"));
    }

    let mut vertices = Vec::new();
    for node_block in &msh_nodes.node_blocks {
        // Ensure that node tags are consecutive
        if node_block.node_tags.is_some() {
            return Err(eyre!("node block tags are not consecutive in msh file"));
        }
        for node in &node_block.nodes {
            if node.z != 0.0 {
                warn!("Discarding non-zero z coordinate {} of mesh node", node.z);
            }
            vertices.push(Point2::new(node.x, node.y));
        }
    }

    let mut connectivity = Vec::new();
    for element_block in msh_elements.element_blocks.iter().filter(|block| is_triangle_block(block)) {
        if element_block.element_tags.is_some() {
            return Err(eyre!("element block tags are not consecutive in msh file"));
        }
        for element in &element_block.elements {
            if element.nodes.len() < 3 {
                return Err(eyre!("not enough nodes to initialize connectivity"));
            }
            let mut indices = [0; 3];
            for (index, &tag) in indices.iter_mut().zip(&element.nodes) {
                // MSH node tags start at 1
                *index = usize::try_from(tag)
                    .ok()
                    .and_then(|tag| tag.checked_sub(1))
                    .ok_or_else(|| eyre!("invalid node tag {} in element", tag))?;
            }
            connectivity.push(Tri3d2Connectivity(indices));
        }
    }

    TriangleMesh2d::try_from_vertices_and_connectivity(vertices, connectivity)
}

fn is_triangle_block(element_block: &mshio::ElementBlock<u64, i32>) -> bool {
    element_block.element_type == mshio::ElementType::Tri3 && element_block.entity_dim == 2
}
