//! Wavefront OBJ export.

use std::fmt::Write;

use crate::mesh::Mesh;

/// Render a set of meshes as one OBJ document.
///
/// Vertex and normal indices are 1-based and cumulative across objects, as
/// the format requires. Faces reference normals only when the mesh has them.
pub fn export(meshes: &[Mesh]) -> String {
    let mut out = String::new();
    let mut vertex_base = 0u32;
    for (i, mesh) in meshes.iter().enumerate() {
        let _ = writeln!(out, "o mesh_{i}");
        for [x, y, z] in &mesh.positions {
            let _ = writeln!(out, "v {x} {y} {z}");
        }
        if let Some(normals) = &mesh.normals {
            for [x, y, z] in normals {
                let _ = writeln!(out, "vn {x} {y} {z}");
            }
        }
        for [a, b, c] in &mesh.faces {
            let a = vertex_base + a + 1;
            let b = vertex_base + b + 1;
            let c = vertex_base + c + 1;
            if mesh.normals.is_some() {
                let _ = writeln!(out, "f {a}//{a} {b}//{b} {c}//{c}");
            } else {
                let _ = writeln!(out, "f {a} {b} {c}");
            }
        }
        vertex_base += mesh.positions.len() as u32;
    }
    out
}
