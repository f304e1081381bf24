//! OBJ file I/O.
//!
//! Only the OBJ subset the fracture pipeline needs: `v`, `vt`, and `f`
//! directives (normals are recomputed per-face during shell building, so
//! `vn` data is parsed past but not stored). Faces may use any of the
//! `v`, `v/vt`, `v/vt/vn`, `v//vn` reference forms; polygons are fan
//! triangulated.
//!
//! The fracture input contract wants a shared per-vertex index space, so
//! OBJ's separate `vt` index stream is folded down on load: the first `vt`
//! a vertex is referenced with wins. Meshes with per-corner UV seams lose
//! the seam, which is acceptable for fracture input.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{ShatterError, ShatterResult};
use crate::types::{Mesh, Vertex};

/// Load a mesh from an OBJ file.
pub fn load_obj(path: &Path) -> ShatterResult<Mesh> {
    check_extension(path)?;

    let file = File::open(path).map_err(|source| ShatterError::IoRead {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);

    let mut mesh = Mesh::new();
    let mut uvs: Vec<[f64; 2]> = Vec::new();

    for (line_number, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| ShatterError::IoRead {
            path: path.to_path_buf(),
            source,
        })?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("v") => {
                let coords = parse_floats::<3>(parts, path, line_number)?;
                mesh.vertices
                    .push(Vertex::from_coords(coords[0], coords[1], coords[2]));
            }
            Some("vt") => {
                let uv = parse_floats::<2>(parts, path, line_number)?;
                uvs.push(uv);
            }
            Some("f") => {
                let mut refs: Vec<(u32, Option<usize>)> = Vec::with_capacity(4);
                for token in parts {
                    refs.push(parse_face_ref(
                        token,
                        mesh.vertices.len(),
                        uvs.len(),
                        path,
                        line_number,
                    )?);
                }
                if refs.len() < 3 {
                    return Err(parse_error(
                        path,
                        line_number,
                        "face with fewer than 3 vertices",
                    ));
                }

                for (vertex, uv_index) in &refs {
                    if let Some(uv_index) = uv_index {
                        let slot = &mut mesh.vertices[*vertex as usize].uv;
                        if slot.is_none() {
                            *slot = Some(uvs[*uv_index]);
                        }
                    }
                }

                // Fan triangulation for quads and larger polygons.
                for i in 1..refs.len() - 1 {
                    mesh.faces.push([refs[0].0, refs[i].0, refs[i + 1].0]);
                }
            }
            // vn, g, o, s, usemtl, mtllib and friends are irrelevant here.
            _ => {}
        }
    }

    if mesh.is_empty() {
        return Err(ShatterError::empty_mesh(format!(
            "{} contains no triangles",
            path.display()
        )));
    }

    debug!(
        path = %path.display(),
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        uvs = uvs.len(),
        "loaded OBJ"
    );

    Ok(mesh)
}

/// Save a mesh to an OBJ file.
///
/// When any vertex carries a UV, a `vt` line is written for every vertex
/// (defaulting to the UV origin) so face references stay a simple `i/i`.
pub fn save_obj(mesh: &Mesh, path: &Path) -> ShatterResult<()> {
    check_extension(path)?;

    let file = File::create(path).map_err(|source| ShatterError::IoWrite {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);

    let write_err = |source| ShatterError::IoWrite {
        path: path.to_path_buf(),
        source,
    };

    let has_uvs = mesh.has_uvs();

    for vertex in &mesh.vertices {
        let p = &vertex.position;
        writeln!(writer, "v {} {} {}", p.x, p.y, p.z).map_err(write_err)?;
    }
    if has_uvs {
        for vertex in &mesh.vertices {
            let [u, v] = vertex.uv.unwrap_or([0.0, 0.0]);
            writeln!(writer, "vt {} {}", u, v).map_err(write_err)?;
        }
    }
    for face in &mesh.faces {
        if has_uvs {
            writeln!(
                writer,
                "f {0}/{0} {1}/{1} {2}/{2}",
                face[0] + 1,
                face[1] + 1,
                face[2] + 1
            )
            .map_err(write_err)?;
        } else {
            writeln!(writer, "f {} {} {}", face[0] + 1, face[1] + 1, face[2] + 1)
                .map_err(write_err)?;
        }
    }

    writer.flush().map_err(write_err)?;

    debug!(
        path = %path.display(),
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "saved OBJ"
    );

    Ok(())
}

fn check_extension(path: &Path) -> ShatterResult<()> {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase());
    match extension.as_deref() {
        Some("obj") => Ok(()),
        _ => Err(ShatterError::UnsupportedFormat { extension }),
    }
}

fn parse_error(path: &Path, line_number: usize, details: impl Into<String>) -> ShatterError {
    ShatterError::ParseError {
        path: path.to_path_buf(),
        details: format!("line {}: {}", line_number + 1, details.into()),
    }
}

fn parse_floats<'a, const N: usize>(
    mut parts: impl Iterator<Item = &'a str>,
    path: &Path,
    line_number: usize,
) -> ShatterResult<[f64; N]> {
    let mut out = [0.0; N];
    for slot in out.iter_mut() {
        let token = parts
            .next()
            .ok_or_else(|| parse_error(path, line_number, "too few components"))?;
        *slot = token
            .parse::<f64>()
            .map_err(|_| parse_error(path, line_number, format!("bad number {:?}", token)))?;
    }
    Ok(out)
}

/// Parse one face vertex reference: `v`, `v/vt`, `v/vt/vn`, or `v//vn`.
/// Returns the zero-based vertex index and optional zero-based UV index.
fn parse_face_ref(
    token: &str,
    vertex_count: usize,
    uv_count: usize,
    path: &Path,
    line_number: usize,
) -> ShatterResult<(u32, Option<usize>)> {
    let mut fields = token.split('/');

    let vertex_field = fields
        .next()
        .ok_or_else(|| parse_error(path, line_number, "empty face reference"))?;
    let vertex = resolve_index(vertex_field, vertex_count, path, line_number)?;

    let uv = match fields.next() {
        Some("") | None => None,
        Some(field) => {
            let index = resolve_index(field, uv_count, path, line_number)?;
            Some(index as usize)
        }
    };

    Ok((vertex, uv))
}

/// Resolve a 1-based (or negative, relative) OBJ index to zero-based.
fn resolve_index(
    field: &str,
    count: usize,
    path: &Path,
    line_number: usize,
) -> ShatterResult<u32> {
    let raw = field
        .parse::<i64>()
        .map_err(|_| parse_error(path, line_number, format!("bad index {:?}", field)))?;

    let resolved = if raw > 0 {
        raw - 1
    } else if raw < 0 {
        count as i64 + raw
    } else {
        return Err(parse_error(path, line_number, "index 0 is not valid in OBJ"));
    };

    if resolved < 0 || resolved as usize >= count {
        return Err(parse_error(
            path,
            line_number,
            format!("index {} out of range (have {})", field, count),
        ));
    }

    Ok(resolved as u32)
}
