//! Flat-shaded unit meshes for the instanced particle pipeline.
//!
//! Every mesh is centered on the origin with radius 1 (the cube spans
//! `[-1, 1]`). Faces do not share vertices so normals stay per face.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use wgpu::util::DeviceExt;

use crate::instance::MeshKind;

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl MeshVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// CPU-side triangle list.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u16>,
}

impl MeshData {
    fn push_triangle(&mut self, a: Vec3, b: Vec3, c: Vec3) {
        let mut normal = (b - a).cross(c - a).normalize_or_zero();
        // Keep winding consistent with an outward normal.
        let (b, c) = if normal.dot(a + b + c) < 0.0 {
            normal = -normal;
            (c, b)
        } else {
            (b, c)
        };
        let base = self.vertices.len() as u16;
        for p in [a, b, c] {
            self.vertices.push(MeshVertex {
                position: p.to_array(),
                normal: normal.to_array(),
            });
        }
        self.indices.extend_from_slice(&[base, base + 1, base + 2]);
    }

    fn from_faces(corners: &[Vec3], faces: &[[usize; 3]]) -> Self {
        let mut mesh = Self::default();
        for f in faces {
            mesh.push_triangle(corners[f[0]], corners[f[1]], corners[f[2]]);
        }
        mesh
    }

    pub fn octahedron() -> Self {
        let corners = [Vec3::X, Vec3::NEG_X, Vec3::Y, Vec3::NEG_Y, Vec3::Z, Vec3::NEG_Z];
        let faces = [
            [0, 2, 4],
            [4, 2, 1],
            [1, 2, 5],
            [5, 2, 0],
            [0, 4, 3],
            [4, 1, 3],
            [1, 5, 3],
            [5, 0, 3],
        ];
        Self::from_faces(&corners, &faces)
    }

    /// Stands in for both the dodecahedral motes and the round bulbs.
    pub fn icosahedron() -> Self {
        let t = (1.0 + 5f32.sqrt()) / 2.0;
        let corners: Vec<Vec3> = [
            (-1.0, t, 0.0),
            (1.0, t, 0.0),
            (-1.0, -t, 0.0),
            (1.0, -t, 0.0),
            (0.0, -1.0, t),
            (0.0, 1.0, t),
            (0.0, -1.0, -t),
            (0.0, 1.0, -t),
            (t, 0.0, -1.0),
            (t, 0.0, 1.0),
            (-t, 0.0, -1.0),
            (-t, 0.0, 1.0),
        ]
        .iter()
        .map(|&(x, y, z)| Vec3::new(x, y, z).normalize())
        .collect();
        let faces = [
            [0, 11, 5],
            [0, 5, 1],
            [0, 1, 7],
            [0, 7, 10],
            [0, 10, 11],
            [1, 5, 9],
            [5, 11, 4],
            [11, 10, 2],
            [10, 7, 6],
            [7, 1, 8],
            [3, 9, 4],
            [3, 4, 2],
            [3, 2, 6],
            [3, 6, 8],
            [3, 8, 9],
            [4, 9, 5],
            [2, 4, 11],
            [6, 2, 10],
            [8, 6, 7],
            [9, 8, 1],
        ];
        Self::from_faces(&corners, &faces)
    }

    pub fn cube() -> Self {
        let mut mesh = Self::default();
        for axis in 0..3 {
            for sign in [1.0f32, -1.0] {
                let mut n = Vec3::ZERO;
                n[axis] = sign;
                let mut u = Vec3::ZERO;
                u[(axis + 1) % 3] = 1.0;
                let mut v = Vec3::ZERO;
                v[(axis + 2) % 3] = 1.0;
                let quad = [n - u - v, n + u - v, n + u + v, n - u + v];
                mesh.push_triangle(quad[0], quad[1], quad[2]);
                mesh.push_triangle(quad[0], quad[2], quad[3]);
            }
        }
        mesh
    }

    pub fn for_kind(kind: MeshKind) -> Self {
        match kind {
            MeshKind::Octahedron => Self::octahedron(),
            MeshKind::Icosahedron => Self::icosahedron(),
            MeshKind::Cube => Self::cube(),
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Uploaded mesh.
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl GpuMesh {
    pub fn upload(device: &wgpu::Device, kind: MeshKind) -> Self {
        let data = MeshData::for_kind(kind);
        let label = format!("{:?}", kind);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Vertices")),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Indices")),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len() as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_outward(mesh: &MeshData) {
        for tri in mesh.indices.chunks(3) {
            let p: Vec<Vec3> = tri
                .iter()
                .map(|&i| Vec3::from_array(mesh.vertices[i as usize].position))
                .collect();
            let n = Vec3::from_array(mesh.vertices[tri[0] as usize].normal);
            let wound = (p[1] - p[0]).cross(p[2] - p[0]);
            assert!(wound.dot(n) > 0.0);
            assert!(n.dot(p[0] + p[1] + p[2]) > 0.0);
        }
    }

    #[test]
    fn test_octahedron() {
        let mesh = MeshData::octahedron();
        assert_eq!(mesh.triangle_count(), 8);
        assert_outward(&mesh);
        for v in &mesh.vertices {
            assert!((Vec3::from_array(v.position).length() - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_icosahedron() {
        let mesh = MeshData::icosahedron();
        assert_eq!(mesh.triangle_count(), 20);
        assert_outward(&mesh);
    }

    #[test]
    fn test_cube() {
        let mesh = MeshData::cube();
        assert_eq!(mesh.triangle_count(), 12);
        assert_outward(&mesh);
        for v in &mesh.vertices {
            assert!(Vec3::from_array(v.position).abs().max_element() <= 1.0);
        }
    }
}
