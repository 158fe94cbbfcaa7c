use serde::{Deserialize, Serialize};

/// A vertex or normal together with the bone it is skinned to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SkinnedPoint {
    pub position: [f32; 3],
    pub bone: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriangleVertex {
    pub vertex: i16,
    pub normal: i16,
    pub s: i16,
    pub t: i16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriangleRun {
    Strip,
    Fan,
}

/// One length-prefixed run of the mesh command stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriangleCommand {
    pub run: TriangleRun,
    pub vertices: Vec<TriangleVertex>,
}

impl TriangleCommand {
    pub fn triangle_count(&self) -> usize {
        self.vertices.len().saturating_sub(2)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub skin_ref: i32,
    pub num_triangles: i32,
    pub num_normals: i32,
    pub commands: Vec<TriangleCommand>,
}

impl Mesh {
    /// Expands strips and fans into plain triangles.
    pub fn triangles(&self) -> Vec<[TriangleVertex; 3]> {
        let mut out = Vec::new();
        for command in &self.commands {
            let v = &command.vertices;
            for i in 2..v.len() {
                let tri = match command.run {
                    TriangleRun::Fan => [v[0], v[i - 1], v[i]],
                    // Odd strip triangles flip winding
                    TriangleRun::Strip if i % 2 == 1 => [v[i - 1], v[i - 2], v[i]],
                    TriangleRun::Strip => [v[i - 2], v[i - 1], v[i]],
                };
                out.push(tri);
            }
        }
        out
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubModel {
    pub name: String,
    pub kind: i32,
    pub bounding_radius: f32,
    pub vertices: Vec<SkinnedPoint>,
    pub normals: Vec<SkinnedPoint>,
    pub meshes: Vec<Mesh>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bodypart {
    pub name: String,
    pub base: i32,
    pub models: Vec<SubModel>,
}

impl Default for Bodypart {
    fn default() -> Self {
        Self {
            name: String::new(),
            base: 1,
            models: Vec::new(),
        }
    }
}

impl Bodypart {
    /// Index of the model selected by a composite body value.
    pub fn active_model(&self, body: i32) -> usize {
        if self.models.is_empty() || self.base <= 0 {
            return 0;
        }
        ((body / self.base) % self.models.len() as i32).max(0) as usize
    }
}
