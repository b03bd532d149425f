use crate::core::{Axis, AxisSet, Rect3, Vec3};

/// Slides one block back and forth along one or two horizontal axes.
///
/// Each enabled axis has its own velocity sign. After every step the sign on
/// an axis flips once the block's center reaches `origin ± limit` on that
/// axis. The origin is captured by [`Mover::initialize`], so bouncing is
/// centered on wherever the block was when motion started.
///
/// # Example
///
/// ```
/// use towerstack_engine::{Mover, Rect3, Vec3};
///
/// let rect = Rect3::new(Vec3::ZERO, Vec3::new(2.0, 1.0, 2.0));
/// let mut mover = Mover::new(rect, 2.0);
/// mover.initialize(Vec3::new(1.0, 0.0, 0.0), 1.0);
///
/// mover.advance(0.25);
/// assert_eq!(mover.rect().center.x, 0.5);
///
/// mover.stop();
/// mover.advance(0.25);
/// assert_eq!(mover.rect().center.x, 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct Mover {
    rect: Rect3,
    speed: f32,
    limit: f32,
    axes: AxisSet,
    velocity: Vec3,
    origin: Vec3,
    moving: bool,
}

impl Mover {
    /// Creates a stationary mover; call [`Self::initialize`] to set it going.
    #[must_use]
    pub fn new(rect: Rect3, speed: f32) -> Self {
        Self {
            rect,
            speed,
            limit: 0.0,
            axes: AxisSet::EMPTY,
            velocity: Vec3::ZERO,
            origin: rect.center,
            moving: false,
        }
    }

    /// Starts motion along every horizontal axis where `direction` is nonzero.
    ///
    /// The initial velocity sign per axis follows the sign of the
    /// corresponding component. The bounce origin is reset to the current
    /// position.
    pub fn initialize(&mut self, direction: Vec3, limit: f32) {
        self.axes = AxisSet::from_direction(direction);
        self.velocity = Vec3::ZERO;
        for axis in self.axes.iter() {
            self.velocity.set(axis, direction.get(axis).signum());
        }
        self.limit = limit;
        self.origin = self.rect.center;
        self.moving = true;
    }

    /// Moves the block by `speed * dt` along each enabled axis.
    ///
    /// Does nothing once stopped.
    pub fn advance(&mut self, dt: f32) {
        if !self.moving {
            return;
        }
        for axis in self.axes.iter() {
            let velocity = self.velocity.get(axis);
            let position = self.rect.center.get(axis) + velocity * self.speed * dt;
            self.rect.center.set(axis, position);

            let origin = self.origin.get(axis);
            if position >= origin + self.limit {
                self.velocity.set(axis, -1.0);
            } else if position <= origin - self.limit {
                self.velocity.set(axis, 1.0);
            }
        }
    }

    /// Freezes the block where it is.
    pub fn stop(&mut self) {
        self.moving = false;
    }

    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.moving
    }

    #[must_use]
    pub fn rect(&self) -> &Rect3 {
        &self.rect
    }

    #[must_use]
    pub fn axes(&self) -> AxisSet {
        self.axes
    }

    /// Current velocity sign on `axis`: `1.0`, `-1.0`, or `0.0` when disabled.
    #[must_use]
    pub fn velocity(&self, axis: Axis) -> f32 {
        self.velocity.get(axis)
    }

    #[must_use]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }
}
