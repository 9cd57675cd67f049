//! Background asset loading
//!
//! OBJ parsing happens on a worker thread so the render loop keeps drawing
//! while a load is in flight. Results come back over a channel tagged with a
//! request id; every new request invalidates the previous one, so a late
//! result from a superseded request is dropped instead of double-attaching
//! a model to the scene.

use log::{error, info};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use thiserror::Error;

/// Monotonically increasing id for load requests. Only results carrying the
/// most recent id are ever delivered.
pub type RequestId = u64;

/// Errors from loading a model asset.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to load {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: tobj::LoadError,
    },
}

/// Raw per-mesh data as delivered by the loader: flat position/normal
/// arrays, triangle indices, and a flat base colour.
///
/// Shadow participation defaults to off; the scene decides which meshes
/// cast and receive (see `gfx::scene::object::with_shadows`).
#[derive(Debug, Clone)]
pub struct MeshData {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub indices: Vec<u32>,
    pub color: [f32; 4],
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl MeshData {
    pub fn new(positions: Vec<f32>, normals: Vec<f32>, indices: Vec<u32>, color: [f32; 4]) -> Self {
        Self {
            positions,
            normals,
            indices,
            color,
            cast_shadow: false,
            receive_shadow: false,
        }
    }
}

/// A fully parsed model, ready to be turned into scene meshes.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub name: String,
    pub meshes: Vec<MeshData>,
}

/// Hands out load requests and collects their results.
///
/// One worker thread per request; the channel is shared, and [`poll`]
/// filters out anything that is not the current request.
///
/// [`poll`]: AssetLoader::poll
pub struct AssetLoader {
    current: RequestId,
    tx: Sender<(RequestId, Result<LoadedModel, LoadError>)>,
    rx: Receiver<(RequestId, Result<LoadedModel, LoadError>)>,
}

impl AssetLoader {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { current: 0, tx, rx }
    }

    /// Starts loading `path` in the background and returns the request id.
    ///
    /// Any previously issued request is invalidated: its result (success or
    /// failure) will be silently discarded when it arrives.
    pub fn request(&mut self, path: &str) -> RequestId {
        self.current += 1;
        let id = self.current;
        let tx = self.tx.clone();
        let path = path.to_string();

        info!("loading model from {path} (request {id})");
        thread::spawn(move || {
            let result = load_obj(&path);
            // The receiver only disconnects on shutdown; a send failure
            // just means nobody is listening any more.
            let _ = tx.send((id, result));
        });

        id
    }

    /// Id of the most recent request.
    pub fn current(&self) -> RequestId {
        self.current
    }

    /// Returns the next result of the *current* request, if one has
    /// arrived. Stale results are drained and dropped.
    pub fn poll(&mut self) -> Option<(RequestId, Result<LoadedModel, LoadError>)> {
        loop {
            match self.rx.try_recv() {
                Ok((id, result)) if id == self.current => return Some((id, result)),
                Ok((id, _)) => {
                    info!("dropping result of superseded load request {id}");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return None,
            }
        }
    }
}

impl Default for AssetLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Loads and triangulates an OBJ file, converting materials to flat colours.
pub fn load_obj(path: &str) -> Result<LoadedModel, LoadError> {
    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|source| LoadError::Parse {
        path: path.to_string(),
        source,
    })?;

    let materials = materials.unwrap_or_else(|err| {
        info!("no usable MTL for {path} ({err}), using default colours");
        Vec::new()
    });

    let name = models
        .iter()
        .find(|m| !m.name.is_empty())
        .map(|m| m.name.clone())
        .unwrap_or_else(|| path.to_string());

    let meshes = convert_models(&models, &materials);
    info!(
        "loaded {} ({} meshes, {} triangles)",
        name,
        meshes.len(),
        meshes.iter().map(|m| m.indices.len() / 3).sum::<usize>()
    );

    Ok(LoadedModel { name, meshes })
}

/// Default mesh colour when an OBJ carries no material.
pub const DEFAULT_COLOR: [f32; 4] = [0.8, 0.8, 0.8, 1.0];

fn convert_models(models: &[tobj::Model], materials: &[tobj::Material]) -> Vec<MeshData> {
    models
        .iter()
        .map(|model| {
            let mesh = &model.mesh;

            // Use the file's normals when they line up with the positions,
            // otherwise rebuild them from the triangle faces.
            let normals = if !mesh.normals.is_empty() && mesh.normals.len() == mesh.positions.len()
            {
                mesh.normals.clone()
            } else {
                accumulate_vertex_normals(&mesh.positions, &mesh.indices)
            };

            let color = mesh
                .material_id
                .and_then(|id| materials.get(id))
                .map(|mtl| {
                    let diffuse = mtl.diffuse.unwrap_or([0.8, 0.8, 0.8]);
                    [
                        diffuse[0],
                        diffuse[1],
                        diffuse[2],
                        mtl.dissolve.unwrap_or(1.0),
                    ]
                })
                .unwrap_or(DEFAULT_COLOR);

            MeshData::new(mesh.positions.clone(), normals, mesh.indices.clone(), color)
        })
        .collect()
}

/// Rebuilds smooth vertex normals by accumulating face normals onto each
/// referenced vertex and normalizing the sums.
pub fn accumulate_vertex_normals(positions: &[f32], indices: &[u32]) -> Vec<f32> {
    use cgmath::{InnerSpace, Vector3};

    let vertex_count = positions.len() / 3;
    let mut sums = vec![Vector3::new(0.0f32, 0.0, 0.0); vertex_count];

    let at = |i: usize| Vector3::new(positions[i * 3], positions[i * 3 + 1], positions[i * 3 + 2]);

    for triangle in indices.chunks_exact(3) {
        let (i0, i1, i2) = (
            triangle[0] as usize,
            triangle[1] as usize,
            triangle[2] as usize,
        );
        let face_normal = (at(i1) - at(i0)).cross(at(i2) - at(i0));
        sums[i0] += face_normal;
        sums[i1] += face_normal;
        sums[i2] += face_normal;
    }

    let mut normals = Vec::with_capacity(positions.len());
    for sum in sums {
        let n = if sum.magnitude2() > 0.0 {
            sum.normalize()
        } else {
            Vector3::new(0.0, 1.0, 0.0)
        };
        normals.extend_from_slice(&[n.x, n.y, n.z]);
    }
    normals
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    const TRIANGLE_OBJ: &str = "\
o tri
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
f 1 2 3
";

    fn parse(obj: &str) -> Vec<MeshData> {
        let mut reader = std::io::BufReader::new(obj.as_bytes());
        let (models, materials) = tobj::load_obj_buf(
            &mut reader,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
            |_| Ok((Vec::new(), Default::default())),
        )
        .unwrap();
        convert_models(&models, &materials.unwrap_or_default())
    }

    #[test]
    fn converts_obj_without_normals_or_materials() {
        let meshes = parse(TRIANGLE_OBJ);
        assert_eq!(meshes.len(), 1);

        let mesh = &meshes[0];
        assert_eq!(mesh.positions.len(), 9);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.color, DEFAULT_COLOR);
        assert!(!mesh.cast_shadow && !mesh.receive_shadow);

        // Reconstructed normals for a CCW triangle in the XY plane face +Z
        for n in mesh.normals.chunks_exact(3) {
            assert!((n[0]).abs() < 1e-6);
            assert!((n[1]).abs() < 1e-6);
            assert!((n[2] - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn accumulated_normals_are_unit_length() {
        let positions = [
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, //
            1.0, 1.0, 1.0,
        ];
        let indices = [0, 1, 2, 1, 3, 2];
        let normals = accumulate_vertex_normals(&positions, &indices);
        assert_eq!(normals.len(), positions.len());
        for n in normals.chunks_exact(3) {
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            assert!((len - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn missing_file_reports_parse_error() {
        let err = load_obj("definitely/not/here.obj").unwrap_err();
        let LoadError::Parse { path, .. } = err;
        assert_eq!(path, "definitely/not/here.obj");
    }

    #[test]
    fn stale_results_are_dropped() {
        let mut loader = AssetLoader::new();
        let first = loader.request("no/such/model_a.obj");
        let second = loader.request("no/such/model_b.obj");
        assert_ne!(first, second);
        assert_eq!(loader.current(), second);

        // Both workers will fail fast; only the second request's result may
        // ever surface from poll().
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut delivered = None;
        while Instant::now() < deadline {
            if let Some((id, result)) = loader.poll() {
                assert_eq!(id, second);
                assert!(result.is_err());
                delivered = Some(id);
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(delivered, Some(second));
    }
}
