// demo_scene.rs
use std::rc::Rc;

use glam::{Mat4, Quat, Vec3};

use crate::asset::{Id, IndexBuffer, VertexBuffer};
use crate::renderer::GraphicsDevice;
use crate::scene::{
    Clip, ClipsState, GeometryState, MaterialState, ShadowCaster, ShadowLight, ShadowScene,
    VertexBufs,
};

pub(crate) struct DemoScene {
    pub scene: ShadowScene,
    pub casters: Vec<ShadowCaster>,
    pub lights: Vec<ShadowLight>,
}

const CUBE_POSITIONS: [[f32; 3]; 8] = [
    [-0.5, -0.5, -0.5],
    [0.5, -0.5, -0.5],
    [0.5, 0.5, -0.5],
    [-0.5, 0.5, -0.5],
    [-0.5, -0.5, 0.5],
    [0.5, -0.5, 0.5],
    [0.5, 0.5, 0.5],
    [-0.5, 0.5, 0.5],
];

const CUBE_INDICES: [u16; 36] = [
    0, 2, 1, 0, 3, 2, // back
    4, 5, 6, 4, 6, 7, // front
    0, 1, 5, 0, 5, 4, // bottom
    3, 6, 2, 3, 7, 6, // top
    0, 4, 7, 0, 7, 3, // left
    1, 2, 6, 1, 6, 5, // right
];

/// A ground quad, a row of cubes batched into shared vertex buffers, and a
/// point cloud, lit by a directional and a spot light, cut by one clip plane.
pub(crate) fn build<D: GraphicsDevice>(device: &mut D) -> DemoScene {
    let mut clips = ClipsState::new();
    clips.push(Clip::new(Vec3::new(0.0, 0.0, 4.0), Vec3::Z));
    let scene = ShadowScene::new("demo-canvas").with_clips(clips);

    let opaque = Rc::new(MaterialState::new(Id::new(1)));
    let double_sided = Rc::new(MaterialState::new(Id::new(2)).with_backfaces(true));
    let points = Rc::new(MaterialState::new(Id::new(3)).with_point_size(4.0));

    let ground_positions = VertexBuffer::from_positions(
        device,
        &[
            [-10.0, 0.0, -10.0],
            [10.0, 0.0, -10.0],
            [10.0, 0.0, 10.0],
            [-10.0, 0.0, 10.0],
        ],
    );
    let ground_indices = IndexBuffer::from_u16(device, &[0, 2, 1, 0, 3, 2]);
    let ground = Rc::new(GeometryState::separate(
        Id::new(1),
        wgpu::PrimitiveTopology::TriangleList,
        ground_positions,
        Some(ground_indices),
    ));

    let mut batched_positions = Vec::with_capacity(CUBE_POSITIONS.len() * 3);
    let mut cube_geometries = Vec::new();
    for cube in 0..3u32 {
        let offset = batched_positions.len() as u16;
        batched_positions.extend_from_slice(&CUBE_POSITIONS);
        let indices: Vec<u16> = CUBE_INDICES.iter().map(|i| i + offset).collect();
        let indices = IndexBuffer::from_u16(device, &indices);
        cube_geometries.push(Rc::new(GeometryState::combined(
            Id::new(10 + cube),
            wgpu::PrimitiveTopology::TriangleList,
            Some(indices),
        )));
    }
    let vertex_bufs = Rc::new(VertexBufs::new(
        Id::new(1),
        VertexBuffer::from_positions(device, &batched_positions),
    ));

    let cloud_positions: Vec<[f32; 3]> = (0..64)
        .map(|i| {
            let t = i as f32 * 0.3;
            [t.cos() * 2.0, 1.0 + (i % 8) as f32 * 0.25, t.sin() * 2.0]
        })
        .collect();
    let cloud = Rc::new(GeometryState::separate(
        Id::new(20),
        wgpu::PrimitiveTopology::PointList,
        VertexBuffer::from_positions(device, &cloud_positions),
        None,
    ));

    let mut casters = vec![ShadowCaster::new(ground, double_sided)];
    for (i, geometry) in cube_geometries.into_iter().enumerate() {
        casters.push(
            ShadowCaster::new(geometry, opaque.clone())
                .with_vertex_bufs(vertex_bufs.clone())
                .with_trs(
                    Vec3::new(i as f32 * 2.0 - 2.0, 0.5, 0.0),
                    Quat::from_rotation_y(i as f32 * 0.4),
                    Vec3::ONE,
                ),
        );
    }
    casters.push(ShadowCaster::new(cloud, points).with_trs(
        Vec3::new(0.0, 0.0, -3.0),
        Quat::IDENTITY,
        Vec3::ONE,
    ));

    let sun_view = Mat4::look_at_rh(Vec3::new(-8.0, 20.0, 6.0), Vec3::ZERO, Vec3::Y);
    let sun_proj = Mat4::orthographic_rh(-15.0, 15.0, -15.0, 15.0, 0.1, 60.0);
    let spot_view = Mat4::look_at_rh(Vec3::new(4.0, 8.0, 4.0), Vec3::ZERO, Vec3::Y);
    let spot_proj = Mat4::perspective_rh(60_f32.to_radians(), 1.0, 0.1, 30.0);
    let lights = vec![
        ShadowLight::new(Id::new(1), sun_view, sun_proj),
        ShadowLight::new(Id::new(2), spot_view, spot_proj),
    ];

    DemoScene {
        scene,
        casters,
        lights,
    }
}
