//! Per-instance GPU data.
//!
//! The simulation describes each drawn particle as a [`Transform`] plus a
//! color; [`FrameInstances`] packs them into one buffer, split into
//! [`InstanceBatch`]es that share a mesh.

use std::ops::Range;

use bytemuck::{Pod, Zeroable};
use glam::{EulerRot, Mat4, Quat, Vec3, Vec4};

/// Meshes available to the instanced pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshKind {
    Octahedron,
    Icosahedron,
    Cube,
}

impl MeshKind {
    pub const ALL: [MeshKind; 3] = [MeshKind::Octahedron, MeshKind::Icosahedron, MeshKind::Cube];
}

/// Position, Euler rotation (XYZ order) and uniform scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Vec3,
    pub scale: f32,
}

impl Transform {
    pub fn at(translation: Vec3, scale: f32) -> Self {
        Self {
            translation,
            rotation: Vec3::ZERO,
            scale,
        }
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn matrix(&self) -> Mat4 {
        let rotation = Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z);
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), rotation, self.translation)
    }
}

/// Instance layout consumed by the particle shader.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    /// Linear RGB plus opacity.
    pub color: [f32; 4],
}

impl InstanceRaw {
    pub fn new(model: Mat4, color: Vec4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color: color.to_array(),
        }
    }

    /// Shader locations 2..=6 (0 and 1 are the mesh position and normal).
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        2 => Float32x4,
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// A run of consecutive instances drawn with one mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceBatch {
    pub mesh: MeshKind,
    pub range: Range<u32>,
}

/// All instances for one frame.
#[derive(Debug, Default)]
pub struct FrameInstances {
    instances: Vec<InstanceRaw>,
    batches: Vec<InstanceBatch>,
}

impl FrameInstances {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            instances: Vec::with_capacity(capacity),
            batches: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.instances.clear();
        self.batches.clear();
    }

    /// Append one instance. Consecutive pushes with the same mesh share a
    /// batch.
    pub fn push(&mut self, mesh: MeshKind, transform: &Transform, color: Vec4) {
        self.push_matrix(mesh, transform.matrix(), color);
    }

    /// Like [`push`](Self::push) with a parent transform applied first.
    pub fn push_in(&mut self, parent: Mat4, mesh: MeshKind, transform: &Transform, color: Vec4) {
        self.push_matrix(mesh, parent * transform.matrix(), color);
    }

    fn push_matrix(&mut self, mesh: MeshKind, model: Mat4, color: Vec4) {
        let index = self.instances.len() as u32;
        self.instances.push(InstanceRaw::new(model, color));
        match self.batches.last_mut() {
            Some(batch) if batch.mesh == mesh && batch.range.end == index => batch.range.end += 1,
            _ => self.batches.push(InstanceBatch {
                mesh,
                range: index..index + 1,
            }),
        }
    }

    pub fn instances(&self) -> &[InstanceRaw] {
        &self.instances
    }

    pub fn batches(&self) -> &[InstanceBatch] {
        &self.batches
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_size() {
        assert_eq!(std::mem::size_of::<InstanceRaw>(), 80);
    }

    #[test]
    fn test_transform_matrix() {
        let t = Transform::at(Vec3::new(1.0, 2.0, 3.0), 2.0);
        let p = t.matrix().transform_point3(Vec3::X);
        assert!((p - Vec3::new(3.0, 2.0, 3.0)).length() < 1e-5);
    }

    #[test]
    fn test_zero_scale_collapses() {
        let t = Transform::at(Vec3::ONE, 0.0).with_rotation(Vec3::splat(1.0));
        let p = t.matrix().transform_point3(Vec3::new(5.0, -3.0, 2.0));
        assert!((p - Vec3::ONE).length() < 1e-6);
    }

    #[test]
    fn test_batches_merge_and_split() {
        let mut frame = FrameInstances::default();
        let t = Transform::at(Vec3::ZERO, 1.0);
        frame.push(MeshKind::Octahedron, &t, Vec4::ONE);
        frame.push(MeshKind::Octahedron, &t, Vec4::ONE);
        frame.push(MeshKind::Cube, &t, Vec4::ONE);
        frame.push_in(Mat4::IDENTITY, MeshKind::Octahedron, &t, Vec4::ONE);

        assert_eq!(frame.len(), 4);
        assert_eq!(
            frame.batches(),
            &[
                InstanceBatch { mesh: MeshKind::Octahedron, range: 0..2 },
                InstanceBatch { mesh: MeshKind::Cube, range: 2..3 },
                InstanceBatch { mesh: MeshKind::Octahedron, range: 3..4 },
            ]
        );

        frame.clear();
        assert!(frame.is_empty());
        assert!(frame.batches().is_empty());
    }
}
