//! Closed-form damped harmonic oscillator.
//!
//! The solver integrates the spring ODE analytically rather than stepping it
//! with Euler ticks, so a single 100 ms advance lands on exactly the same
//! state as ten 10 ms advances. That property is what makes scrubbing and
//! export reproducible at any frame rate.

use cinelens_project_model::SpringParams;

/// Half-width of the damping-ratio band treated as critically damped.
///
/// The underdamped and overdamped branches both divide by quantities that
/// vanish as the ratio approaches 1; inside this band the critical branch is
/// both cheaper and numerically stable.
const CRITICAL_EPSILON: f64 = 0.01;

/// Displacement below which the spring snaps to its target.
const REST_DISPLACEMENT: f64 = 1e-5;
/// Velocity below which the spring is allowed to snap.
const REST_VELOCITY: f64 = 1e-4;

/// Advances a 1-D spring analytically by `t` seconds.
///
/// `displacement` is position minus target, `omega0` the undamped angular
/// frequency `sqrt(tension / mass)`, `zeta` the damping ratio
/// `friction / (2 * sqrt(tension * mass))`. Returns the new
/// `(displacement, velocity)` pair.
pub fn solve_spring_1d(displacement: f64, velocity: f64, t: f64, omega0: f64, zeta: f64) -> (f64, f64) {
    if t <= 0.0 {
        return (displacement, velocity);
    }
    if displacement.abs() < REST_DISPLACEMENT && velocity.abs() < REST_VELOCITY {
        return (0.0, 0.0);
    }

    if zeta < 1.0 - CRITICAL_EPSILON {
        // Underdamped: decaying sinusoid at the damped frequency.
        let omega_d = omega0 * (1.0 - zeta * zeta).sqrt();
        let a = displacement;
        let b = (velocity + displacement * zeta * omega0) / omega_d;
        let decay = (-zeta * omega0 * t).exp();
        let (sin, cos) = (omega_d * t).sin_cos();
        let new_disp = decay * (a * cos + b * sin);
        let new_vel = decay
            * ((b * omega_d - a * zeta * omega0) * cos - (a * omega_d + b * zeta * omega0) * sin);
        (new_disp, new_vel)
    } else if zeta > 1.0 + CRITICAL_EPSILON {
        // Overdamped: sum of two real exponentials.
        let root = (zeta * zeta - 1.0).sqrt();
        let s1 = -omega0 * (zeta - root);
        let s2 = -omega0 * (zeta + root);
        let denom = s1 - s2;
        if denom.abs() < 1e-10 {
            // Roots collapsed in floating point; fall through to the
            // critically damped form, which is the analytic limit.
            return solve_critical(displacement, velocity, t, omega0);
        }
        let c1 = (velocity - displacement * s2) / denom;
        let c2 = displacement - c1;
        let e1 = (s1 * t).exp();
        let e2 = (s2 * t).exp();
        let new_disp = c1 * e1 + c2 * e2;
        let new_vel = c1 * s1 * e1 + c2 * s2 * e2;
        (new_disp, new_vel)
    } else {
        solve_critical(displacement, velocity, t, omega0)
    }
}

fn solve_critical(displacement: f64, velocity: f64, t: f64, omega0: f64) -> (f64, f64) {
    // Critically damped: (a + b t) * exp(-omega0 t).
    let a = displacement;
    let b = velocity + displacement * omega0;
    let decay = (-omega0 * t).exp();
    let new_disp = decay * (a + b * t);
    let new_vel = decay * (b - omega0 * (a + b * t));
    (new_disp, new_vel)
}

fn angular(params: &SpringParams) -> (f64, f64) {
    let tension = params.tension.max(1e-6);
    let mass = params.mass.max(1e-6);
    let friction = params.friction.max(0.0);
    let omega0 = (tension / mass).sqrt();
    let zeta = friction / (2.0 * (tension * mass).sqrt());
    (omega0, zeta)
}

/// A spring-driven scalar that chases a movable target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring1D {
    params: SpringParams,
    position: f64,
    velocity: f64,
    target: f64,
}

impl Spring1D {
    pub fn new(params: SpringParams, value: f64) -> Self {
        Self { params, position: value, velocity: 0.0, target: value }
    }

    pub fn value(&self) -> f64 {
        self.position
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn set_position(&mut self, value: f64) {
        self.position = value;
    }

    pub fn set_velocity(&mut self, velocity: f64) {
        self.velocity = velocity;
    }

    pub fn set_target(&mut self, target: f64) {
        self.target = target;
    }

    /// Swaps spring constants without touching position or velocity, so the
    /// motion stays continuous across a profile change.
    pub fn set_params(&mut self, params: SpringParams) {
        self.params = params;
    }

    /// Advances the spring by `dt_ms` and returns the new position.
    pub fn run(&mut self, dt_ms: f64) -> f64 {
        let (omega0, zeta) = angular(&self.params);
        let (disp, vel) =
            solve_spring_1d(self.position - self.target, self.velocity, dt_ms / 1000.0, omega0, zeta);
        self.position = self.target + disp;
        self.velocity = vel;
        self.position
    }

    /// True once both displacement and velocity are within `threshold`.
    pub fn is_settled(&self, threshold: f64) -> bool {
        (self.position - self.target).abs() < threshold && self.velocity.abs() < threshold
    }
}

/// Two independent [`Spring1D`]s sharing one set of constants, used for 2-D
/// positions. Axes never couple.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring2D {
    x: Spring1D,
    y: Spring1D,
}

impl Spring2D {
    pub fn new(params: SpringParams, value: [f64; 2]) -> Self {
        Self { x: Spring1D::new(params, value[0]), y: Spring1D::new(params, value[1]) }
    }

    pub fn value(&self) -> [f64; 2] {
        [self.x.value(), self.y.value()]
    }

    pub fn velocity(&self) -> [f64; 2] {
        [self.x.velocity(), self.y.velocity()]
    }

    pub fn set_position(&mut self, value: [f64; 2]) {
        self.x.set_position(value[0]);
        self.y.set_position(value[1]);
    }

    pub fn set_velocity(&mut self, velocity: [f64; 2]) {
        self.x.set_velocity(velocity[0]);
        self.y.set_velocity(velocity[1]);
    }

    pub fn set_target(&mut self, target: [f64; 2]) {
        self.x.set_target(target[0]);
        self.y.set_target(target[1]);
    }

    pub fn set_params(&mut self, params: SpringParams) {
        self.x.set_params(params);
        self.y.set_params(params);
    }

    pub fn run(&mut self, dt_ms: f64) -> [f64; 2] {
        [self.x.run(dt_ms), self.y.run(dt_ms)]
    }

    pub fn is_settled(&self, threshold: f64) -> bool {
        self.x.is_settled(threshold) && self.y.is_settled(threshold)
    }
}

/// Spring-shaped ease-in over normalized progress `t in [0, 1]`.
///
/// Simulates a unit spring released from displacement 1 and reports how far
/// it has traveled, which front-loads the motion the way a real zoom-in
/// feels.
pub fn spring_ease_in(t: f64, params: SpringParams) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    let (omega0, zeta) = angular(&params);
    let (disp, _) = solve_spring_1d(1.0, 0.0, t, omega0, zeta);
    (1.0 - disp).clamp(0.0, 1.0)
}

/// Ease-out companion to [`spring_ease_in`], tuned slightly slower and more
/// damped so releases read softer than attacks.
pub fn spring_ease_out(t: f64, params: SpringParams) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    let (omega0, zeta) = angular(&params);
    let (disp, _) = solve_spring_1d(1.0, 0.0, t, omega0 * 0.9, zeta * 1.15);
    (1.0 - disp).clamp(0.0, 1.0)
}

/// Hermite smoothstep, clamped to `[0, 1]`.
pub fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
