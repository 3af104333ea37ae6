// Target acquisition: detection sphere, vision cone and line of sight

use glam::Vec3;

use crate::engine::physics::{CollisionQueryProvider, LayerMask, OverlapHit};
use crate::game::characters::EntityId;

/// The looking entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observer {
    pub entity: EntityId,
    pub eye: Vec3,
    pub forward: Vec3,
    /// Layers holding acceptable targets
    pub targets: LayerMask,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vision {
    pub detection_radius: f32,
    /// Full opening angle of the vision cone
    pub vision_angle_degrees: f32,
}

impl Vision {
    /// Nearest candidate inside the detection sphere and the vision cone with a clear line of sight
    pub fn acquire(&self, queries: &dyn CollisionQueryProvider, observer: &Observer) -> Option<OverlapHit> {
        let mut candidates: Vec<OverlapHit> = queries
            .overlap_sphere(observer.eye, self.detection_radius, observer.targets)
            .into_iter()
            .filter(|hit| hit.entity != observer.entity)
            .filter(|hit| self.in_cone(observer, hit.center))
            .filter(|hit| self.can_see(queries, observer, hit.entity, hit.center))
            .collect();

        candidates.sort_by(|a, b| {
            let da = a.center.distance_squared(observer.eye);
            let db = b.center.distance_squared(observer.eye);
            da.total_cmp(&db)
        });
        candidates.into_iter().next()
    }

    /// Target within the detection radius and the first thing a ray toward it hits
    pub fn can_see(
        &self,
        queries: &dyn CollisionQueryProvider,
        observer: &Observer,
        target: EntityId,
        target_center: Vec3,
    ) -> bool {
        let offset = target_center - observer.eye;
        let distance = offset.length();
        if distance > self.detection_radius {
            return false;
        }
        if distance < f32::EPSILON {
            return true;
        }

        queries
            .raycast(observer.eye, offset, distance, LayerMask::SOLID, Some(observer.entity))
            .is_some_and(|hit| hit.entity == Some(target))
    }

    pub fn in_cone(&self, observer: &Observer, point: Vec3) -> bool {
        let offset = point - observer.eye;
        if offset.length_squared() < f32::EPSILON || observer.forward.length_squared() < f32::EPSILON {
            return true;
        }
        observer.forward.angle_between(offset).to_degrees() <= self.vision_angle_degrees * 0.5
    }
}
