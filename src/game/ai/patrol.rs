// Patrol routes: waypoint cycling or wandering inside a radius

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;

use crate::common::math;

#[derive(Debug, Clone, PartialEq)]
pub enum PatrolRoute {
    /// Visit the points in order, wrapping around
    Waypoints(Vec<Vec3>),
    /// Pick random points on the ground plane around `center`
    Wander { center: Vec3, radius: f32 },
}

#[derive(Debug, Clone)]
pub struct Patrol {
    route: PatrolRoute,
    dwell_time: f32,
    arrive_distance: f32,
    next_waypoint: usize,
    destination: Option<Vec3>,
    dwell_remaining: f32,
}

impl Patrol {
    pub fn new(route: PatrolRoute, dwell_time: f32, arrive_distance: f32) -> Self {
        if matches!(&route, PatrolRoute::Waypoints(points) if points.is_empty()) {
            log::warn!("Patrol route has no waypoints; the agent will stand still");
        }
        Self {
            route,
            dwell_time,
            arrive_distance,
            next_waypoint: 0,
            destination: None,
            dwell_remaining: 0.0,
        }
    }

    pub fn route(&self) -> &PatrolRoute {
        &self.route
    }

    pub fn destination(&self) -> Option<Vec3> {
        self.destination
    }

    pub fn is_dwelling(&self) -> bool {
        self.dwell_remaining > 0.0
    }

    /// Point to walk toward this tick, or `None` while idling at a destination
    pub fn update<R: Rng + ?Sized>(&mut self, position: Vec3, dt: f32, rng: &mut R) -> Option<Vec3> {
        if self.dwell_remaining > 0.0 {
            self.dwell_remaining -= dt;
            if self.dwell_remaining > 0.0 {
                return None;
            }
        }

        let destination = match self.destination {
            Some(destination) => destination,
            None => {
                let next = self.pick_destination(rng)?;
                self.destination = Some(next);
                next
            }
        };

        if math::planar_speed(destination - position, Vec3::Y) <= self.arrive_distance {
            self.destination = None;
            self.dwell_remaining = self.dwell_time;
            return None;
        }
        Some(destination)
    }

    fn pick_destination<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Vec3> {
        match &self.route {
            PatrolRoute::Waypoints(points) => {
                if points.is_empty() {
                    return None;
                }
                let point = points[self.next_waypoint % points.len()];
                self.next_waypoint = (self.next_waypoint + 1) % points.len();
                Some(point)
            }
            PatrolRoute::Wander { center, radius } => {
                let angle = rng.gen_range(0.0..TAU);
                // sqrt keeps the points uniform over the disc
                let distance = radius * rng.gen::<f32>().sqrt();
                Some(*center + Vec3::new(angle.cos(), 0.0, angle.sin()) * distance)
            }
        }
    }
}
