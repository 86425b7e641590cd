// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Binary STL serialization
//!
//! Layout: `[80 byte header][u32 LE facet count][50 byte facet record]*count`.
//! Each record holds the normal, the three vertices in winding order and a
//! zero attribute byte count, all little-endian.

use crate::error::{Error, Result};
use crate::mesh::{Facet, Mesh, HEADER_LEN};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Size of one facet record in bytes
pub const FACET_RECORD_LEN: usize = 50;

/// Exact length of a binary STL file holding `facet_count` facets
#[inline]
pub fn binary_len(facet_count: usize) -> usize {
    HEADER_LEN + 4 + FACET_RECORD_LEN * facet_count
}

/// Write `mesh` in binary STL form
pub fn write_binary<W: Write>(mesh: &Mesh, mut writer: W) -> Result<()> {
    let count = u32::try_from(mesh.len()).map_err(|_| Error::TooManyFacets(mesh.len()))?;

    writer.write_all(mesh.header().as_bytes())?;
    writer.write_all(&count.to_le_bytes())?;

    let mut record = [0u8; FACET_RECORD_LEN];
    for facet in mesh.facets() {
        encode_facet(facet, &mut record);
        writer.write_all(&record)?;
    }

    writer.flush()?;
    Ok(())
}

fn encode_facet(facet: &Facet, record: &mut [u8; FACET_RECORD_LEN]) {
    let normal = facet.normal().as_vector();
    let [a, b, c] = facet.vertices();
    let values = [
        normal.x, normal.y, normal.z, a.x, a.y, a.z, b.x, b.y, b.z, c.x, c.y, c.z,
    ];

    for (chunk, value) in record.chunks_exact_mut(4).zip(values) {
        chunk.copy_from_slice(&value.to_le_bytes());
    }
    record[48..].copy_from_slice(&facet.attribute_byte_count().to_le_bytes());
}

/// Sibling path the output is staged in before being renamed into place
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

impl Mesh {
    /// Render the mesh to an in-memory binary STL buffer
    pub fn to_stl_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(binary_len(self.len()));
        write_binary(self, &mut bytes)?;
        Ok(bytes)
    }

    /// Write the mesh to `path` as binary STL.
    ///
    /// The file is staged next to the destination and renamed into place,
    /// so a failed write never leaves a truncated file at `path`.
    pub fn save_stl(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let staging = staging_path(path);

        let written = fs::File::create(&staging)
            .map_err(Error::from)
            .and_then(|file| write_binary(self, BufWriter::new(file)))
            .and_then(|()| fs::rename(&staging, path).map_err(Error::from));

        written.map_err(|err| {
            let _ = fs::remove_file(&staging);
            match err {
                Error::Io(source) => Error::Serialization {
                    path: path.to_path_buf(),
                    source,
                },
                other => other,
            }
        })?;

        tracing::debug!(path = %path.display(), facets = self.len(), "wrote binary STL");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::StlHeader;
    use nalgebra::Point3;

    fn single_facet_mesh() -> Mesh {
        let mut mesh = Mesh::new(StlHeader::for_application("blanker", "unit.stl"));
        mesh.push(
            Facet::new(
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            )
            .unwrap(),
        );
        mesh
    }

    fn read_f32(bytes: &[u8], offset: usize) -> f32 {
        f32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    #[test]
    fn test_empty_mesh_is_header_and_count() {
        let bytes = Mesh::default().to_stl_bytes().unwrap();
        assert_eq!(bytes.len(), 84);
        assert_eq!(&bytes[80..84], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_record_layout() {
        let bytes = single_facet_mesh().to_stl_bytes().unwrap();
        assert_eq!(bytes.len(), binary_len(1));
        assert_eq!(bytes.len(), 134);

        assert_eq!(&bytes[..20], b"blanker,name:unit.st");
        assert_eq!(u32::from_le_bytes(bytes[80..84].try_into().unwrap()), 1);

        // Normal
        assert_eq!(read_f32(&bytes, 84), 0.0);
        assert_eq!(read_f32(&bytes, 88), 0.0);
        assert_eq!(read_f32(&bytes, 92), 1.0);
        // Vertex B
        assert_eq!(read_f32(&bytes, 108), 1.0);
        assert_eq!(read_f32(&bytes, 112), 0.0);
        // Vertex C
        assert_eq!(read_f32(&bytes, 124), 1.0);
        // Attribute byte count
        assert_eq!(&bytes[132..134], &[0, 0]);
    }

    #[test]
    fn test_save_replaces_destination() {
        let dir = std::env::temp_dir().join(format!("blanker-stl-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("unit.stl");
        fs::write(&path, b"stale").unwrap();

        single_facet_mesh().save_stl(&path).unwrap();

        assert_eq!(fs::metadata(&path).unwrap().len(), binary_len(1) as u64);
        assert!(!staging_path(&path).exists());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_save_into_missing_directory_names_path() {
        let path = std::env::temp_dir()
            .join("blanker-missing-dir-for-stl-test")
            .join("out.stl");

        match single_facet_mesh().save_stl(&path) {
            Err(Error::Serialization { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected serialization error, got {:?}", other),
        }
    }
}
