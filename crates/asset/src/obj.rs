//! Minimal OBJ reader: coordinate tables plus per-triangle face indices.
//!
//! Faces keep the file's corner order. Quads are split into the corner
//! triples (0,1,2) and (0,2,3) of their raw token order, which assumes
//! convex planar quads. Any other corner count is rejected.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use crate::error::ObjError;

/// Three 0-based indices into one coordinate table.
pub type Triangle = [usize; 3];

/// Parallel per-triangle index lists recovered from the face records.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FaceIndices {
    pub position: Vec<Triangle>,
    pub normal: Vec<Triangle>,
    /// `None` when any corner of the triangle has no texcoord reference.
    pub texcoord: Vec<Option<Triangle>>,
}

impl FaceIndices {
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.position.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }
}

/// Everything the assembler needs from one OBJ file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjSource {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub texcoords: Vec<[f32; 2]>,
    pub faces: FaceIndices,
}

impl ObjSource {
    /// Table that `faces.normal` indexes into. Files without `vn` records
    /// reuse the position table, so normals point away from the origin.
    pub fn normal_table(&self) -> &[[f32; 3]] {
        if self.normals.is_empty() {
            &self.positions
        } else {
            &self.normals
        }
    }
}

/// Read only the face records of an OBJ file.
pub fn read_face_indices(path: impl AsRef<Path>) -> Result<FaceIndices, ObjError> {
    load_obj_from_path(path).map(|source| source.faces)
}

/// Load an OBJ file from a path.
pub fn load_obj_from_path(path: impl AsRef<Path>) -> Result<ObjSource, ObjError> {
    let file = File::open(path)?;
    load_obj_from_reader(BufReader::new(file))
}

/// Convenience helper to parse an OBJ string literal.
pub fn load_obj_from_str(contents: &str) -> Result<ObjSource, ObjError> {
    load_obj_from_reader(io::Cursor::new(contents))
}

#[derive(Clone, Copy, Debug)]
struct Corner {
    position: usize,
    texcoord: Option<usize>,
    normal: Option<usize>,
}

/// Load OBJ data from a [`BufRead`] implementation.
pub fn load_obj_from_reader<R: BufRead>(reader: R) -> Result<ObjSource, ObjError> {
    let mut source = ObjSource::default();
    // Normal fallback depends on whether any `vn` exists, which may only be
    // known after the last face line.
    let mut pending: Vec<([Corner; 3], usize)> = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let content = line.split_once('#').map_or(line.as_str(), |(head, _)| head);
        let trimmed = content.trim();
        if trimmed.is_empty() {
            continue;
        }

        let mut parts = trimmed.split_whitespace();
        let Some(tag) = parts.next() else {
            continue;
        };

        match tag {
            "v" => {
                let x = parse_f32(parts.next(), line_no, "x coordinate")?;
                let y = parse_f32(parts.next(), line_no, "y coordinate")?;
                let z = parse_f32(parts.next(), line_no, "z coordinate")?;
                source.positions.push([x, y, z]);
            }
            "vt" => {
                let u = parse_f32(parts.next(), line_no, "u coordinate")?;
                let v = parse_f32(parts.next(), line_no, "v coordinate")?;
                source.texcoords.push([u, v]);
            }
            "vn" => {
                let nx = parse_f32(parts.next(), line_no, "nx coordinate")?;
                let ny = parse_f32(parts.next(), line_no, "ny coordinate")?;
                let nz = parse_f32(parts.next(), line_no, "nz coordinate")?;
                source.normals.push([nx, ny, nz]);
            }
            "f" => {
                let corners = parts
                    .map(|token| parse_corner(token, line_no))
                    .collect::<Result<Vec<_>, _>>()?;
                match corners.as_slice() {
                    [a, b, c] => pending.push(([*a, *b, *c], line_no)),
                    [a, b, c, d] => {
                        pending.push(([*a, *b, *c], line_no));
                        pending.push(([*a, *c, *d], line_no));
                    }
                    other => {
                        return Err(ObjError::parse(
                            line_no,
                            format!("expected 3 or 4 face corners, found {}", other.len()),
                        ));
                    }
                }
            }
            _ => {
                // Ignore other directives (o/g/s/usemtl/mtllib/etc.)
            }
        }
    }

    let reuse_positions = source.normals.is_empty();
    let faces = &mut source.faces;
    faces.position.reserve(pending.len());
    faces.normal.reserve(pending.len());
    faces.texcoord.reserve(pending.len());

    for (corners, line_no) in pending {
        let mut normal = [0usize; 3];
        for (slot, corner) in normal.iter_mut().zip(&corners) {
            *slot = match (corner.normal, reuse_positions) {
                (Some(n), _) => n,
                (None, true) => corner.position,
                (None, false) => {
                    return Err(ObjError::parse(line_no, "face corner has no normal index"));
                }
            };
        }

        let texcoord = match (corners[0].texcoord, corners[1].texcoord, corners[2].texcoord) {
            (Some(a), Some(b), Some(c)) => Some([a, b, c]),
            _ => None,
        };

        faces
            .position
            .push([corners[0].position, corners[1].position, corners[2].position]);
        faces.normal.push(normal);
        faces.texcoord.push(texcoord);
    }

    log::debug!(
        "Parsed OBJ: {} positions, {} normals, {} texcoords, {} triangles",
        source.positions.len(),
        source.normals.len(),
        source.texcoords.len(),
        source.faces.triangle_count()
    );

    Ok(source)
}

fn parse_f32(value: Option<&str>, line_no: usize, what: &str) -> Result<f32, ObjError> {
    let token = value.ok_or_else(|| ObjError::parse(line_no, format!("missing {what}")))?;
    token
        .parse::<f32>()
        .map_err(|_| ObjError::parse(line_no, format!("invalid {what} '{token}'")))
}

/// `p`, `p/t`, `p//n` or `p/t/n`.
fn parse_corner(token: &str, line_no: usize) -> Result<Corner, ObjError> {
    let mut split = token.split('/');
    let position = match split.next() {
        Some(value) if !value.is_empty() => parse_index(value, line_no)?,
        _ => {
            return Err(ObjError::parse(
                line_no,
                format!("face element '{token}' has no position index"),
            ));
        }
    };

    let texcoord = match split.next() {
        Some(value) if !value.is_empty() => Some(parse_index(value, line_no)?),
        _ => None,
    };

    let normal = match split.next() {
        Some(value) if !value.is_empty() => Some(parse_index(value, line_no)?),
        _ => None,
    };

    if split.next().is_some() {
        return Err(ObjError::parse(
            line_no,
            format!("face element '{token}' has too many components"),
        ));
    }

    Ok(Corner {
        position,
        texcoord,
        normal,
    })
}

/// 1-based file index to 0-based table index. Relative indices are rejected.
fn parse_index(token: &str, line_no: usize) -> Result<usize, ObjError> {
    let raw = token
        .parse::<i64>()
        .map_err(|_| ObjError::parse(line_no, format!("invalid index '{token}'")))?;
    if raw < 1 {
        return Err(ObjError::parse(
            line_no,
            format!("OBJ indices are 1-based and positive; found {raw}"),
        ));
    }
    usize::try_from(raw - 1)
        .map_err(|_| ObjError::parse(line_no, format!("index {raw} does not fit in memory")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_triangle_positions_only() {
        let src = "
            v 0.0 0.0 0.0
            v 1.0 0.0 0.0
            v 0.0 1.0 0.0
            f 1 2 3
        ";
        let obj = load_obj_from_str(src).expect("parse triangle");
        assert_eq!(obj.faces.position, vec![[0, 1, 2]]);
        // No `vn` records: normals mirror the position indices.
        assert_eq!(obj.faces.normal, vec![[0, 1, 2]]);
        assert_eq!(obj.faces.texcoord, vec![None]);
        assert_eq!(obj.normal_table(), obj.positions.as_slice());
    }

    #[test]
    fn quad_is_split_on_raw_corner_order() {
        let src = "
            v 0 0 0
            v 1 0 0
            v 1 1 0
            v 0 1 0
            vn 0 0 1
            f 1//1 2//1 3//1 4//1
        ";
        let obj = load_obj_from_str(src).expect("parse quad");
        assert_eq!(obj.faces.position, vec![[0, 1, 2], [0, 2, 3]]);
        assert_eq!(obj.faces.normal, vec![[0, 0, 0], [0, 0, 0]]);
    }

    #[test]
    fn position_and_normal_indices_are_independent() {
        let src = "
            v 0 0 0
            v 1 0 0
            v 0 1 0
            vn 1 0 0
            vn 0 1 0
            vn 0 0 1
            vt 0 0
            vt 1 0
            vt 0 1
            f 3/1/2 1/2/3 2/3/1
        ";
        let obj = load_obj_from_str(src).expect("parse full corners");
        assert_eq!(obj.faces.position, vec![[2, 0, 1]]);
        assert_eq!(obj.faces.normal, vec![[1, 2, 0]]);
        assert_eq!(obj.faces.texcoord, vec![Some([0, 1, 2])]);
    }

    #[test]
    fn vn_after_faces_still_disables_fallback() {
        let src = "
            v 0 0 0
            v 1 0 0
            v 0 1 0
            f 1 2 3
            vn 0 0 1
        ";
        let err = load_obj_from_str(src).unwrap_err();
        assert!(matches!(err, ObjError::Parse { line: 5, .. }), "{err}");
    }

    #[test]
    fn non_numeric_index_is_fatal() {
        let src = "
            v 0 0 0
            v 1 0 0
            v 0 1 0
            f 1 two 3
        ";
        let err = load_obj_from_str(src).unwrap_err();
        assert!(matches!(err, ObjError::Parse { line: 5, .. }), "{err}");
    }

    #[test]
    fn wrong_corner_count_is_fatal() {
        let two = load_obj_from_str("v 0 0 0\nv 1 0 0\nf 1 2\n");
        assert!(matches!(two, Err(ObjError::Parse { line: 3, .. })));

        let five = load_obj_from_str("f 1 2 3 4 5\n");
        assert!(matches!(five, Err(ObjError::Parse { line: 1, .. })));
    }

    #[test]
    fn zero_and_relative_indices_are_rejected() {
        assert!(load_obj_from_str("f 0 1 2\n").is_err());
        assert!(load_obj_from_str("f -1 -2 -3\n").is_err());
        assert!(load_obj_from_str("f 1/2/3/4 1 1\n").is_err());
    }

    #[test]
    fn directives_and_comments_are_skipped() {
        let src = "
            # a comment
            mtllib scene.mtl
            o thing
            v 0 0 0
            v 1 0 0
            v 0 1 0
            g group
            usemtl red
            s off
            f 1 2 3
        ";
        let obj = load_obj_from_str(src).expect("parse with directives");
        assert_eq!(obj.faces.triangle_count(), 1);
    }

    #[test]
    fn trailing_comments_are_stripped() {
        let src = "v 0 0 0 # origin\nv 1 0 0\nv 0 1 0#no space\nf 1 2 3 # tri\n";
        let obj = load_obj_from_str(src).expect("parse trailing comments");
        assert_eq!(obj.positions.len(), 3);
        assert_eq!(obj.faces.position, vec![[0, 1, 2]]);

        // A real fourth corner before the comment still counts.
        let quad = load_obj_from_str("v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4 # quad\n")
            .expect("parse quad with comment");
        assert_eq!(quad.faces.triangle_count(), 2);
    }

    #[test]
    fn texcoord_w_component_is_ignored() {
        let obj = load_obj_from_str("vt 0.25 0.75 0.0\n").expect("parse vt");
        assert_eq!(obj.texcoords, vec![[0.25, 0.75]]);
    }

    #[test]
    fn bad_coordinate_reports_line() {
        let err = load_obj_from_str("v 0 0 0\nv 1 nope 0\n").unwrap_err();
        match err {
            ObjError::Parse { line, reason } => {
                assert_eq!(line, 2);
                assert!(reason.contains("y coordinate"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = read_face_indices("/definitely/not/here.obj").unwrap_err();
        assert!(matches!(err, ObjError::Io(_)));
    }
}
