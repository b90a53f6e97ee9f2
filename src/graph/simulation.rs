use eframe::egui::{Vec2, vec2};

pub const PULL_STRENGTH: f32 = 0.05;
pub const ALPHA_MIN: f32 = 0.001;
const VELOCITY_RETENTION: f32 = 0.6;
const MAX_SETTLE_STEPS: usize = 1_000;

/// One simulated node: current position, velocity, the anchor point the
/// X/Y pull steers it toward, and its collision exclusion radius.
#[derive(Clone, Copy, Debug)]
pub struct Body {
    pub pos: Vec2,
    pub vel: Vec2,
    pub target: Vec2,
    pub collide_radius: f32,
}

/// Force integrator with a decaying temperature. Each step applies the
/// fixed-strength pull toward every body's target, resolves pairwise
/// collisions as velocity impulses split by radius-squared share, then
/// integrates with velocity retention. The simulation is settled once the
/// temperature decays below `ALPHA_MIN`.
///
/// There is no randomness anywhere in the integrator, so identical bodies
/// settle to identical coordinates on every run.
#[derive(Clone, Debug)]
pub struct Simulation {
    alpha: f32,
    alpha_decay: f32,
}

impl Simulation {
    pub fn new() -> Self {
        Self {
            alpha: 1.0,
            // decays to ALPHA_MIN in ~300 steps
            alpha_decay: 1.0 - ALPHA_MIN.powf(1.0 / 300.0),
        }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn settled(&self) -> bool {
        self.alpha < ALPHA_MIN
    }

    /// Restart the temperature so a settled layout animates again.
    pub fn reheat(&mut self) {
        self.alpha = 1.0;
    }

    /// Advance one tick. Returns false once settled (and does nothing).
    pub fn step(&mut self, bodies: &mut [Body]) -> bool {
        if self.settled() {
            return false;
        }
        self.alpha += (0.0 - self.alpha) * self.alpha_decay;

        for body in bodies.iter_mut() {
            body.vel += (body.target - body.pos) * (PULL_STRENGTH * self.alpha);
        }

        resolve_collisions(bodies);

        for body in bodies.iter_mut() {
            body.vel *= VELOCITY_RETENTION;
            body.pos += body.vel;
        }

        !self.settled()
    }

    /// Drive to convergence synchronously. Returns the number of steps taken.
    pub fn settle(&mut self, bodies: &mut [Body]) -> usize {
        let mut steps = 0;
        while steps < MAX_SETTLE_STEPS && self.step(bodies) {
            steps += 1;
        }
        steps
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve_collisions(bodies: &mut [Body]) {
    for i in 0..bodies.len() {
        for j in (i + 1)..bodies.len() {
            let a = bodies[i];
            let b = bodies[j];
            let delta = (a.pos + a.vel) - (b.pos + b.vel);
            let min_distance = a.collide_radius + b.collide_radius;
            let distance_sq = delta.length_sq();

            // NaN radii (malformed numeric input) fail this comparison and
            // simply never collide.
            if !(distance_sq < min_distance * min_distance) || min_distance <= 0.0 {
                continue;
            }

            let distance = distance_sq.sqrt();
            let direction = if distance > 0.0001 {
                delta / distance
            } else {
                let angle =
                    ((i as f32) * 0.618_034 + (j as f32) * 0.414_214) * std::f32::consts::TAU;
                vec2(angle.cos(), angle.sin())
            };

            let overlap = min_distance - distance;
            let a_sq = a.collide_radius * a.collide_radius;
            let b_sq = b.collide_radius * b.collide_radius;
            let share = b_sq / (a_sq + b_sq);

            bodies[i].vel += direction * (overlap * share);
            bodies[j].vel -= direction * (overlap * (1.0 - share));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(x: f32, y: f32, target: Vec2, collide_radius: f32) -> Body {
        Body {
            pos: vec2(x, y),
            vel: Vec2::ZERO,
            target,
            collide_radius,
        }
    }

    #[test]
    fn settle_reaches_the_temperature_floor() {
        let mut bodies = vec![body(30.0, -12.0, vec2(100.0, 50.0), 10.0)];
        let mut simulation = Simulation::new();
        let steps = simulation.settle(&mut bodies);
        assert!(simulation.settled());
        assert!(steps < MAX_SETTLE_STEPS, "took {steps} steps");
        assert!(!simulation.step(&mut bodies));
    }

    #[test]
    fn lone_body_is_pulled_to_its_anchor() {
        let target = vec2(280.0, 0.0);
        let mut bodies = vec![body(272.0, 8.0, target, 12.0)];
        let mut simulation = Simulation::new();
        simulation.settle(&mut bodies);
        assert!(
            (bodies[0].pos - target).length() < 2.0,
            "ended at {:?}",
            bodies[0].pos
        );
    }

    #[test]
    fn colliding_bodies_separate() {
        let target = vec2(0.0, 280.0);
        let mut bodies = vec![
            body(-1.0, 279.0, target, 15.0),
            body(1.0, 281.0, target, 15.0),
        ];
        let mut simulation = Simulation::new();
        simulation.settle(&mut bodies);
        let distance = (bodies[0].pos - bodies[1].pos).length();
        assert!(distance > 24.0, "still overlapping at distance {distance}");
    }

    #[test]
    fn coincident_bodies_still_separate() {
        let target = vec2(0.0, 280.0);
        let mut bodies = vec![body(0.0, 280.0, target, 9.0), body(0.0, 280.0, target, 9.0)];
        let mut simulation = Simulation::new();
        simulation.settle(&mut bodies);
        let distance = (bodies[0].pos - bodies[1].pos).length();
        assert!(distance > 10.0, "still coincident at distance {distance}");
    }

    #[test]
    fn identical_runs_settle_identically() {
        let make = || {
            vec![
                body(10.0, 5.0, vec2(0.0, 280.0), 12.0),
                body(-8.0, 3.0, vec2(0.0, 280.0), 17.0),
                body(2.0, -9.0, vec2(266.0, -86.0), 9.0),
            ]
        };
        let mut first = make();
        let mut second = make();
        Simulation::new().settle(&mut first);
        Simulation::new().settle(&mut second);
        for (a, b) in first.iter().zip(second.iter()) {
            assert!((a.pos - b.pos).length() < 1e-6);
        }
    }

    #[test]
    fn nan_collision_radius_never_poisons_positions() {
        let target = vec2(0.0, 280.0);
        let mut bodies = vec![
            body(1.0, 279.0, target, f32::NAN),
            body(-1.0, 281.0, target, 12.0),
        ];
        let mut simulation = Simulation::new();
        simulation.settle(&mut bodies);
        assert!(bodies[0].pos.x.is_finite() && bodies[0].pos.y.is_finite());
        assert!(bodies[1].pos.x.is_finite() && bodies[1].pos.y.is_finite());
    }

    #[test]
    fn reheat_restarts_a_settled_simulation() {
        let mut bodies = vec![body(5.0, 5.0, vec2(50.0, 50.0), 8.0)];
        let mut simulation = Simulation::new();
        simulation.settle(&mut bodies);
        assert!(simulation.settled());
        simulation.reheat();
        assert!(!simulation.settled());
        assert!(simulation.step(&mut bodies));
    }
}
