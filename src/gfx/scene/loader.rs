//! Asset loading: OBJ models, cubemap faces and WGSL sources.

use std::path::{Path, PathBuf};

use image::RgbaImage;
use log::{debug, warn};

use super::object::{MeshData, SceneObject};
use crate::gfx::resources::material::{MaterialId, StandardMaterial, DEFAULT_MATERIAL_ID};

#[derive(thiserror::Error, Debug)]
pub enum AssetError {
    #[error("failed to load OBJ '{path}': {source}")]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("OBJ '{0}' contains no geometry")]
    EmptyModel(PathBuf),

    #[error("failed to load image '{path}': {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to read shader '{path}': {source}")]
    Shader {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("a cubemap needs 6 faces, got {0}")]
    CubemapFaceCount(usize),

    #[error("cubemap face {face} is {width}x{height}, expected {size}x{size}")]
    CubemapFaceSize {
        face: usize,
        width: u32,
        height: u32,
        size: u32,
    },
}

/// Result of [`load_obj`]: one object and the materials its groups reference.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub object: SceneObject,
    pub materials: Vec<StandardMaterial>,
}

/// Loads an OBJ file with its MTL materials.
///
/// Every model in the file becomes one index group of a single object, so a
/// file with several `usemtl` sections yields a multi-material object. Groups
/// whose material is missing use [`DEFAULT_MATERIAL_ID`].
pub fn load_obj(path: impl AsRef<Path>) -> Result<LoadedModel, AssetError> {
    let path = path.as_ref();
    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|source| AssetError::Obj {
        path: path.to_path_buf(),
        source,
    })?;

    let materials = materials.unwrap_or_else(|err| {
        warn!("No usable MTL for {}: {err}, using default material", path.display());
        Vec::new()
    });

    let material_names: Vec<MaterialId> = materials
        .iter()
        .enumerate()
        .map(|(i, mtl)| {
            if mtl.name.is_empty() {
                format!("material_{i}")
            } else {
                mtl.name.clone()
            }
        })
        .collect();

    let standard_materials = materials
        .iter()
        .zip(&material_names)
        .map(|(mtl, name)| {
            let diffuse = mtl.diffuse.unwrap_or([0.8, 0.8, 0.8]);
            StandardMaterial::new(
                name,
                [diffuse[0], diffuse[1], diffuse[2], mtl.dissolve.unwrap_or(1.0)],
                0.0,
                1.0 - (mtl.shininess.unwrap_or(32.0) / 128.0).clamp(0.0, 1.0),
            )
        })
        .collect();

    let mut mesh = MeshData::default();
    let mut material_ids = Vec::with_capacity(models.len());

    for model in &models {
        let source = &model.mesh;
        if source.indices.is_empty() {
            continue;
        }

        let normals = if source.normals.len() == source.positions.len() {
            source.normals.clone()
        } else {
            MeshData::calculate_face_normals(&source.positions, &source.indices)
        };

        let positions: Vec<[f32; 3]> = source
            .positions
            .chunks_exact(3)
            .map(|p| [p[0], p[1], p[2]])
            .collect();
        let normals: Vec<[f32; 3]> = normals.chunks_exact(3).map(|n| [n[0], n[1], n[2]]).collect();
        let tex_coords: Vec<[f32; 2]> = source
            .texcoords
            .chunks_exact(2)
            .map(|t| [t[0], 1.0 - t[1]])
            .collect();

        mesh.append_group(MeshData::from_attributes(
            &positions,
            &normals,
            &tex_coords,
            source.indices.clone(),
        ));

        let material_id = source
            .material_id
            .and_then(|id| material_names.get(id).cloned())
            .unwrap_or_else(|| DEFAULT_MATERIAL_ID.to_string());
        material_ids.push(material_id);
    }

    if mesh.is_empty() {
        return Err(AssetError::EmptyModel(path.to_path_buf()));
    }

    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string());

    debug!(
        "Loaded {} with {} groups, {} vertices",
        path.display(),
        mesh.groups.len(),
        mesh.vertex_count()
    );

    Ok(LoadedModel {
        object: SceneObject::new(name, mesh, material_ids),
        materials: standard_materials,
    })
}

/// Six square RGBA faces of equal size in +X, -X, +Y, -Y, +Z, -Z order.
#[derive(Debug, Clone)]
pub struct CubemapImage {
    faces: [RgbaImage; 6],
}

impl CubemapImage {
    pub fn from_faces(faces: Vec<RgbaImage>) -> Result<Self, AssetError> {
        let faces: [RgbaImage; 6] = faces
            .try_into()
            .map_err(|faces: Vec<RgbaImage>| AssetError::CubemapFaceCount(faces.len()))?;

        let size = faces[0].width();
        for (face, image) in faces.iter().enumerate() {
            if image.width() != size || image.height() != size {
                return Err(AssetError::CubemapFaceSize {
                    face,
                    width: image.width(),
                    height: image.height(),
                    size,
                });
            }
        }

        Ok(Self { faces })
    }

    /// 1x1 cubemap of a single colour, used when no environment is configured.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            faces: std::array::from_fn(|_| RgbaImage::from_pixel(1, 1, image::Rgba(rgba))),
        }
    }

    pub fn size(&self) -> u32 {
        self.faces[0].width()
    }

    pub fn faces(&self) -> &[RgbaImage; 6] {
        &self.faces
    }
}

/// Loads six cubemap faces from disk.
pub fn load_cubemap<P: AsRef<Path>>(paths: &[P]) -> Result<CubemapImage, AssetError> {
    if paths.len() != 6 {
        return Err(AssetError::CubemapFaceCount(paths.len()));
    }

    let faces = paths
        .iter()
        .map(|path| {
            let path = path.as_ref();
            image::open(path)
                .map(|image| image.to_rgba8())
                .map_err(|source| AssetError::Image {
                    path: path.to_path_buf(),
                    source,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    CubemapImage::from_faces(faces)
}

pub fn load_shader_source(path: impl AsRef<Path>) -> Result<String, AssetError> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|source| AssetError::Shader {
        path: path.to_path_buf(),
        source,
    })
}
