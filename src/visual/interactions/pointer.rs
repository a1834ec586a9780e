use bevy::math::Affine3A;
use bevy::mesh::{PrimitiveTopology, VertexAttributeValues};
use bevy::prelude::*;

use crate::{
    camera::MainCamera,
    config::MeltConfig,
    input::PointerEvent,
    visual::melt::driver::RawTarget,
};

/// Triangles below this determinant are treated as parallel to the ray
const PARALLEL_EPSILON: f32 = 1e-9;

/// World-space ray from the camera through a point in normalized device coordinates.
///
/// Near and far points come from `Camera::ndc_to_world`, the same unprojection
/// `viewport_to_world` performs after converting pixels to NDC.
pub fn camera_ray(camera: &Camera, camera_transform: &GlobalTransform, ndc: Vec2) -> Option<Ray3d> {
    let near = camera.ndc_to_world(camera_transform, ndc.extend(1.0))?;
    let far = camera.ndc_to_world(camera_transform, ndc.extend(f32::EPSILON))?;

    let direction = Dir3::new(far - near).ok()?;
    Some(Ray3d::new(near, direction))
}

/// Undeformed triangles of a melting object, in its local space.
///
/// Picking runs against this rest shape; the GPU displacement is never read back.
#[derive(Debug, Clone, Default)]
pub struct CollisionMesh {
    triangles: Vec<[Vec3; 3]>,
}

impl CollisionMesh {
    #[cfg(test)]
    pub fn from_triangles(triangles: Vec<[Vec3; 3]>) -> Self {
        Self { triangles }
    }

    /// Extract triangles from a triangle-list mesh with `Float32x3` positions
    pub fn from_mesh(mesh: &Mesh) -> Option<Self> {
        if mesh.primitive_topology() != PrimitiveTopology::TriangleList {
            log::warn!(
                "Collision mesh needs a triangle list, got {:?}",
                mesh.primitive_topology()
            );
            return None;
        }

        let Some(VertexAttributeValues::Float32x3(positions)) =
            mesh.attribute(Mesh::ATTRIBUTE_POSITION)
        else {
            log::warn!("Collision mesh has no Float32x3 positions");
            return None;
        };

        let order: Vec<usize> = match mesh.indices() {
            Some(indices) => indices.iter().collect(),
            None => (0..positions.len()).collect(),
        };

        let mut triangles = Vec::with_capacity(order.len() / 3);
        for chunk in order.chunks_exact(3) {
            let corner = |i: usize| positions.get(chunk[i]).map(|p| Vec3::from_array(*p));
            if let (Some(a), Some(b), Some(c)) = (corner(0), corner(1), corner(2)) {
                triangles.push([a, b, c]);
            }
        }

        Some(Self { triangles })
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Nearest hit along a ray placed in world space by `world_from_local`
    pub fn intersect(&self, ray: Ray3d, world_from_local: &Affine3A) -> Option<Vec3> {
        let local_from_world = world_from_local.inverse();
        let origin = local_from_world.transform_point3(ray.origin);
        let direction = local_from_world.transform_vector3(*ray.direction);

        // `direction` is not renormalized, so `t` orders hits the same way in both spaces
        let t = self
            .triangles
            .iter()
            .filter_map(|triangle| ray_triangle(origin, direction, triangle))
            .min_by(|a, b| a.total_cmp(b))?;

        Some(world_from_local.transform_point3(origin + direction * t))
    }
}

/// Möller–Trumbore; returns the ray parameter of the hit
fn ray_triangle(origin: Vec3, direction: Vec3, [a, b, c]: &[Vec3; 3]) -> Option<f32> {
    let edge1 = *b - *a;
    let edge2 = *c - *a;

    let p = direction.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < PARALLEL_EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;

    let s = origin - *a;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(q) * inv_det;
    (t > 0.0).then_some(t)
}

/// Pickable rest shape of a melting object
#[derive(Component, Debug, Clone)]
pub struct MeltCollider(pub CollisionMesh);

/// Fallback surface for pointer targeting when no collider is hit
#[derive(Resource, Debug, Clone, Copy)]
pub struct ReferencePlane {
    pub origin: Vec3,
    pub plane: InfinitePlane3d,
}

impl ReferencePlane {
    /// Plane facing the camera (+Z normal) at depth `z`
    pub fn facing_camera(z: f32) -> Self {
        Self {
            origin: Vec3::new(0.0, 0.0, z),
            plane: InfinitePlane3d { normal: Dir3::Z },
        }
    }

    pub fn intersect(&self, ray: Ray3d) -> Option<Vec3> {
        ray.intersect_plane(self.origin, self.plane)
            .map(|distance| ray.get_point(distance))
    }
}

/// Resolve where a ray points in the scene.
///
/// The nearest collider hit wins; the reference plane is only consulted when
/// every collider misses. `None` means neither was hit.
pub fn resolve_target<'a>(
    ray: Ray3d,
    colliders: impl IntoIterator<Item = (&'a CollisionMesh, Affine3A)>,
    plane: &ReferencePlane,
) -> Option<Vec3> {
    colliders
        .into_iter()
        .filter_map(|(mesh, world_from_local)| mesh.intersect(ray, &world_from_local))
        .min_by(|a, b| {
            a.distance_squared(ray.origin)
                .total_cmp(&b.distance_squared(ray.origin))
        })
        .or_else(|| plane.intersect(ray))
}

/// System: turn pointer messages into the raw melt target
pub fn target_pointer(
    mut pointer_events: MessageReader<PointerEvent>,
    camera_query: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    colliders: Query<(&MeltCollider, &GlobalTransform)>,
    plane: Res<ReferencePlane>,
    config: Res<MeltConfig>,
    mut raw_target: ResMut<RawTarget>,
) {
    let Ok((camera, camera_transform)) = camera_query.single() else {
        return;
    };

    for event in pointer_events.read() {
        match *event {
            PointerEvent::Move { ndc } => {
                let Some(ray) = camera_ray(camera, camera_transform, ndc) else {
                    continue;
                };

                let hit = resolve_target(
                    ray,
                    colliders
                        .iter()
                        .map(|(collider, transform)| (&collider.0, transform.affine())),
                    &plane,
                );

                // Rays that hit nothing keep the previous target
                if let Some(point) = hit {
                    raw_target.0 = point;
                }
            }
            PointerEvent::Leave => {
                debug!("Pointer left the window - releasing the melt");
                raw_target.0 = config.far_target();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f32 = 1e-4;

    fn unit_sphere() -> CollisionMesh {
        let mesh = Sphere::new(1.0).mesh().uv(32, 18);
        CollisionMesh::from_mesh(&mesh).expect("sphere mesh should be pickable")
    }

    fn ray(origin: Vec3, direction: Vec3) -> Ray3d {
        Ray3d::new(origin, Dir3::new(direction).unwrap())
    }

    /// A default camera's projection is the identity, so rays run straight
    /// down -Z from one unit in front of the camera.
    fn camera_at(translation: Vec3) -> (Camera, GlobalTransform) {
        (Camera::default(), GlobalTransform::from_translation(translation))
    }

    fn pointer_app(plane_depth: f32) -> App {
        let mut app = App::new();
        app.add_message::<PointerEvent>()
            .insert_resource(MeltConfig::default())
            .insert_resource(ReferencePlane::facing_camera(plane_depth))
            .insert_resource(RawTarget(Vec3::new(1.0, 2.0, 3.0)))
            .add_systems(Update, target_pointer);

        let (camera, transform) = camera_at(Vec3::new(0.0, 0.0, 5.0));
        app.world_mut().spawn((camera, transform, MainCamera));
        app
    }

    fn raw_target(app: &App) -> Vec3 {
        app.world().resource::<RawTarget>().0
    }

    #[test]
    fn test_camera_ray_center() {
        let (camera, transform) = camera_at(Vec3::new(0.0, 0.0, 5.0));
        let ray = camera_ray(&camera, &transform, Vec2::ZERO).unwrap();

        assert!((ray.origin - Vec3::new(0.0, 0.0, 6.0)).length() < TOLERANCE);
        assert!((*ray.direction - Vec3::NEG_Z).length() < TOLERANCE);
    }

    #[test]
    fn test_camera_ray_follows_camera_rotation() {
        let camera = Camera::default();
        let transform = GlobalTransform::from(Transform::from_rotation(Quat::from_rotation_y(
            std::f32::consts::FRAC_PI_2,
        )));

        let ray = camera_ray(&camera, &transform, Vec2::new(0.5, 0.0)).unwrap();
        assert!((*ray.direction - Vec3::NEG_X).length() < TOLERANCE);
        assert!((ray.origin.z + 0.5).abs() < TOLERANCE);
    }

    #[test]
    fn test_leave_parks_target_far_away() {
        let mut app = pointer_app(0.0);
        app.world_mut()
            .write_message(PointerEvent::Move { ndc: Vec2::ZERO });
        app.world_mut().write_message(PointerEvent::Leave);
        app.update();

        assert_eq!(raw_target(&app), MeltConfig::default().far_target());
    }

    #[test]
    fn test_move_onto_plane_replaces_target() {
        let mut app = pointer_app(0.0);
        app.world_mut().write_message(PointerEvent::Move {
            ndc: Vec2::new(0.5, -0.25),
        });
        app.update();

        assert!((raw_target(&app) - Vec3::new(0.5, -0.25, 0.0)).length() < TOLERANCE);
    }

    #[test]
    fn test_move_without_hit_keeps_previous_target() {
        // Plane behind the camera, no colliders
        let mut app = pointer_app(10.0);
        app.world_mut()
            .write_message(PointerEvent::Move { ndc: Vec2::ZERO });
        app.update();

        assert_eq!(raw_target(&app), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_move_onto_solid_targets_its_surface() {
        let mut app = pointer_app(-2.0);
        app.world_mut()
            .spawn((MeltCollider(unit_sphere()), GlobalTransform::IDENTITY));
        app.world_mut()
            .write_message(PointerEvent::Move { ndc: Vec2::ZERO });
        app.update();

        let target = raw_target(&app);
        assert!(target.z > 0.9 && target.z <= 1.0 + TOLERANCE);
    }

    #[test]
    fn test_collision_mesh_from_sphere() {
        let sphere = unit_sphere();
        assert!(sphere.triangle_count() > 0);
    }

    #[test]
    fn test_collision_mesh_rejects_non_triangle_lists() {
        let mesh = Mesh::new(
            PrimitiveTopology::LineList,
            bevy::asset::RenderAssetUsages::default(),
        );
        assert!(CollisionMesh::from_mesh(&mesh).is_none());
    }

    #[test]
    fn test_triangle_hit_and_miss() {
        let mesh = CollisionMesh::from_triangles(vec![[
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]]);

        let hit = mesh.intersect(ray(Vec3::new(0.0, 0.0, 3.0), Vec3::NEG_Z), &Affine3A::IDENTITY);
        assert!((hit.unwrap() - Vec3::ZERO).length() < TOLERANCE);

        let miss = mesh.intersect(ray(Vec3::new(2.0, 0.0, 3.0), Vec3::NEG_Z), &Affine3A::IDENTITY);
        assert!(miss.is_none());

        let behind = mesh.intersect(ray(Vec3::new(0.0, 0.0, 3.0), Vec3::Z), &Affine3A::IDENTITY);
        assert!(behind.is_none());
    }

    #[test]
    fn test_collider_hit_wins_over_plane() {
        let sphere = unit_sphere();
        let plane = ReferencePlane::facing_camera(-2.0);
        let pointing = ray(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);

        let solid_hit = sphere.intersect(pointing, &Affine3A::IDENTITY).unwrap();
        let plane_hit = plane.intersect(pointing).unwrap();
        let resolved = resolve_target(pointing, [(&sphere, Affine3A::IDENTITY)], &plane).unwrap();

        assert!((resolved - solid_hit).length() < TOLERANCE);
        assert!((resolved - plane_hit).length() > 1.0);
        assert!(resolved.z > 0.9 && resolved.z <= 1.0 + TOLERANCE);
    }

    #[test]
    fn test_nearest_collider_wins() {
        let sphere = unit_sphere();
        let plane = ReferencePlane::facing_camera(-10.0);
        let pointing = ray(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        let near = Affine3A::from_translation(Vec3::new(0.0, 0.0, 3.0));
        let far = Affine3A::from_translation(Vec3::new(0.0, 0.0, -3.0));

        let resolved =
            resolve_target(pointing, [(&sphere, far), (&sphere, near)], &plane).unwrap();
        assert!(resolved.z > 3.9);
    }

    #[test]
    fn test_falls_back_to_plane_on_miss() {
        let sphere = unit_sphere();
        let plane = ReferencePlane::facing_camera(-2.0);
        let beside = ray(Vec3::new(3.0, 0.5, 5.0), Vec3::NEG_Z);

        let resolved = resolve_target(beside, [(&sphere, Affine3A::IDENTITY)], &plane).unwrap();
        assert!((resolved - Vec3::new(3.0, 0.5, -2.0)).length() < TOLERANCE);
    }

    #[test]
    fn test_moved_collider_is_hit_where_it_is() {
        let sphere = unit_sphere();
        let plane = ReferencePlane::facing_camera(0.0);
        let world_from_local = Affine3A::from_translation(Vec3::new(4.0, 0.0, 0.0));
        let pointing = ray(Vec3::new(4.0, 0.0, 5.0), Vec3::NEG_Z);

        let resolved = resolve_target(pointing, [(&sphere, world_from_local)], &plane).unwrap();
        assert!((resolved.x - 4.0).abs() < TOLERANCE);
        assert!(resolved.z > 0.9);
    }

    #[test]
    fn test_parallel_ray_without_hit_is_none() {
        let sphere = unit_sphere();
        let plane = ReferencePlane::facing_camera(0.0);
        let sideways = ray(Vec3::new(0.0, 5.0, 3.0), Vec3::X);

        assert!(resolve_target(sideways, [(&sphere, Affine3A::IDENTITY)], &plane).is_none());
    }
}
