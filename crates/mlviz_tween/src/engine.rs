//! Tween engine
//!
//! A fixed-capacity pool of tasks that is advanced once per rendered frame.
//! Tasks live in a dense array: a retiring task is swapped with the last active
//! one, so dense indices change between frames. Collaborators keep a [`TaskId`]
//! instead, which stays valid until the task retires.
//!
//! The engine is an explicit value owned by the application and passed by
//! `&mut` to whatever schedules or advances animations.
//!
//! # Example
//!
//! ```ignore
//! let mut engine = TweenEngine::new(1024);
//! let fovy = Tweened::new(45.0_f32);
//!
//! engine
//!     .add_scalar(&fovy, 60.0, 2.0)?
//!     .easing(Easing::EaseOutBounce)
//!     .delay(0.5);
//!
//! // once per frame
//! engine.update(frame_dt);
//! ```

use crate::config::EngineConfig;
use crate::easing::Easing;
use crate::error::{Result, TweenError};
use crate::payload::{with_payload, Payload};
use crate::tweened::{Target, Tweened};
use crate::values::Interpolate;
use mlviz_core::{Color, Vec3};
use slotmap::{new_key_type, SlotMap};
use std::any::Any;
use std::fmt;

new_key_type! {
    /// Stable handle to a scheduled task
    pub struct TaskId;
}

/// Per-frame callback of a draw task: `(eased_progress, payload)`
pub type DrawFn = Box<dyn FnMut(f32, Option<&dyn Any>)>;

/// Callback invoked once when a task retires
pub type CompleteFn = Box<dyn FnOnce(Option<&dyn Any>)>;

// ============================================================================
// Tasks
// ============================================================================

struct ValueTween<T: Copy> {
    target: Target<T>,
    from: T,
    to: T,
}

impl<T: Interpolate> ValueTween<T> {
    fn new(target: &Tweened<T>, to: T) -> Self {
        Self {
            target: target.target(),
            from: target.get(),
            to,
        }
    }

    fn apply(&self, eased: f32) -> bool {
        self.target.write(self.from.lerp(&self.to, eased))
    }
}

enum TaskKind {
    Scalar(ValueTween<f32>),
    Vector3(ValueTween<Vec3>),
    Color(ValueTween<Color>),
    Draw(DrawFn),
}

impl TaskKind {
    fn name(&self) -> &'static str {
        match self {
            TaskKind::Scalar(_) => "scalar",
            TaskKind::Vector3(_) => "vector3",
            TaskKind::Color(_) => "color",
            TaskKind::Draw(_) => "draw",
        }
    }
}

struct Task {
    id: TaskId,
    kind: TaskKind,
    easing: Easing,
    /// Seconds; zero means "complete on the first processed update"
    duration: f32,
    hold: f32,
    /// Negative while the start delay is pending
    elapsed: f32,
    on_complete: Option<CompleteFn>,
    payload: Option<Payload>,
}

impl Task {
    fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    fn is_finished(&self) -> bool {
        self.elapsed >= self.duration + self.hold
    }

    /// Advance by `dt` and apply; returns true when the task should retire
    fn step(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        if self.elapsed < 0.0 {
            return false;
        }

        let eased = self.easing.apply(self.progress());
        let written = match &mut self.kind {
            TaskKind::Scalar(tween) => tween.apply(eased),
            TaskKind::Vector3(tween) => tween.apply(eased),
            TaskKind::Color(tween) => tween.apply(eased),
            TaskKind::Draw(draw) => {
                with_payload(self.payload.as_ref(), |payload| draw(eased, payload));
                true
            }
        };
        if !written {
            tracing::trace!(
                id = ?self.id,
                kind = self.kind.name(),
                "target dropped, skipping write"
            );
        }

        self.is_finished()
    }

    fn retire(mut self) {
        if let Some(on_complete) = self.on_complete.take() {
            with_payload(self.payload.as_ref(), on_complete);
        }
        if let Some(payload) = self.payload.take() {
            if payload.is_owned() {
                tracing::trace!(id = ?self.id, "releasing owned payload");
            }
            drop(payload);
        }
    }
}

// ============================================================================
// Task configuration
// ============================================================================

/// Extra settings accepted by the `*_with` constructors
#[derive(Default)]
pub struct TaskOptions {
    easing: Option<Easing>,
    on_complete: Option<CompleteFn>,
    payload: Option<Payload>,
}

impl TaskOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = Some(easing);
        self
    }

    /// Called exactly once, at retirement, with the task's payload
    pub fn on_complete<F>(mut self, f: F) -> Self
    where
        F: FnOnce(Option<&dyn Any>) + 'static,
    {
        self.on_complete = Some(Box::new(f));
        self
    }

    pub fn payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// Construction-time access to a freshly scheduled task
///
/// Returned by every constructor. Only valid until the next engine call;
/// keep [`TaskMut::id`] to refer to the task later.
pub struct TaskMut<'a> {
    task: &'a mut Task,
}

impl TaskMut<'_> {
    pub fn id(&self) -> TaskId {
        self.task.id
    }

    pub fn easing(self, easing: Easing) -> Self {
        self.task.easing = easing;
        self
    }

    /// Seconds to stay alive at full progress before retiring
    pub fn hold(self, seconds: f32) -> Self {
        self.task.hold = seconds.max(0.0);
        self
    }

    /// Set the running timer directly; negative values delay the start
    ///
    /// Non-finite values are treated as 0.
    pub fn elapsed(self, seconds: f32) -> Self {
        self.task.elapsed = if seconds.is_finite() { seconds } else { 0.0 };
        self
    }

    /// Delay the start by `seconds` (same as `elapsed(-seconds)`)
    pub fn delay(self, seconds: f32) -> Self {
        self.elapsed(-seconds.max(0.0))
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Fixed-capacity pool of tweens advanced by [`TweenEngine::update`]
pub struct TweenEngine {
    /// Active tasks, always dense in `[0, len)`
    items: Vec<Task>,
    /// Stable id -> current dense index
    positions: SlotMap<TaskId, usize>,
    capacity: usize,
    default_easing: Easing,
    max_frame_dt: Option<f32>,
}

impl TweenEngine {
    /// Create an engine with the standard configuration and the given capacity
    pub fn new(capacity: usize) -> Self {
        Self::with_config(&EngineConfig::standard().with_capacity(capacity))
    }

    pub fn with_config(config: &EngineConfig) -> Self {
        tracing::debug!(
            capacity = config.capacity,
            default_easing = ?config.default_easing,
            "creating tween engine"
        );
        Self {
            items: Vec::with_capacity(config.capacity),
            positions: SlotMap::with_capacity_and_key(config.capacity),
            capacity: config.capacity,
            default_easing: config.default_easing,
            max_frame_dt: config.max_frame_dt,
        }
    }

    // =========================================================================
    // Typed constructors
    // =========================================================================

    /// Tween a scalar from its current value to `to` over `duration` seconds
    pub fn add_scalar(
        &mut self,
        target: &Tweened<f32>,
        to: f32,
        duration: f32,
    ) -> Result<TaskMut<'_>> {
        self.add_scalar_with(target, to, duration, TaskOptions::default())
    }

    pub fn add_scalar_with(
        &mut self,
        target: &Tweened<f32>,
        to: f32,
        duration: f32,
        options: TaskOptions,
    ) -> Result<TaskMut<'_>> {
        self.push(TaskKind::Scalar(ValueTween::new(target, to)), duration, options)
    }

    /// Tween a 3D vector from its current value to `to`
    pub fn add_vec3(
        &mut self,
        target: &Tweened<Vec3>,
        to: Vec3,
        duration: f32,
    ) -> Result<TaskMut<'_>> {
        self.add_vec3_with(target, to, duration, TaskOptions::default())
    }

    pub fn add_vec3_with(
        &mut self,
        target: &Tweened<Vec3>,
        to: Vec3,
        duration: f32,
        options: TaskOptions,
    ) -> Result<TaskMut<'_>> {
        self.push(TaskKind::Vector3(ValueTween::new(target, to)), duration, options)
    }

    /// Tween a color from its current value to `to`, channel by channel
    pub fn add_color(
        &mut self,
        target: &Tweened<Color>,
        to: Color,
        duration: f32,
    ) -> Result<TaskMut<'_>> {
        self.add_color_with(target, to, duration, TaskOptions::default())
    }

    pub fn add_color_with(
        &mut self,
        target: &Tweened<Color>,
        to: Color,
        duration: f32,
        options: TaskOptions,
    ) -> Result<TaskMut<'_>> {
        self.push(TaskKind::Color(ValueTween::new(target, to)), duration, options)
    }

    /// Fade a color's alpha from `from` to `to`, keeping its current RGB
    ///
    /// The cell is left untouched until the first update that processes the task.
    pub fn add_alpha(
        &mut self,
        target: &Tweened<Color>,
        from: u8,
        to: u8,
        duration: f32,
    ) -> Result<TaskMut<'_>> {
        let current = target.get();
        let tween = ValueTween {
            target: target.target(),
            from: current.with_alpha(from),
            to: current.with_alpha(to),
        };
        self.push(TaskKind::Color(tween), duration, TaskOptions::default())
    }

    /// Call `draw(eased_progress, payload)` every frame for `duration` seconds
    pub fn add_draw<F>(
        &mut self,
        draw: F,
        duration: f32,
        payload: Option<Payload>,
    ) -> Result<TaskMut<'_>>
    where
        F: FnMut(f32, Option<&dyn Any>) + 'static,
    {
        let options = TaskOptions {
            payload,
            ..TaskOptions::default()
        };
        self.add_draw_with(draw, duration, options)
    }

    pub fn add_draw_with<F>(
        &mut self,
        draw: F,
        duration: f32,
        options: TaskOptions,
    ) -> Result<TaskMut<'_>>
    where
        F: FnMut(f32, Option<&dyn Any>) + 'static,
    {
        self.push(TaskKind::Draw(Box::new(draw)), duration, options)
    }

    fn push(
        &mut self,
        kind: TaskKind,
        duration: f32,
        options: TaskOptions,
    ) -> Result<TaskMut<'_>> {
        if self.items.len() >= self.capacity {
            tracing::warn!(
                capacity = self.capacity,
                kind = kind.name(),
                "tween pool exhausted"
            );
            return Err(TweenError::PoolExhausted {
                capacity: self.capacity,
            });
        }

        // Also catches NaN
        let duration = if duration > 0.0 { duration } else { 0.0 };
        let index = self.items.len();
        let id = self.positions.insert(index);
        tracing::trace!(?id, kind = kind.name(), duration, "task added");

        self.items.push(Task {
            id,
            kind,
            easing: options.easing.unwrap_or(self.default_easing),
            duration,
            hold: 0.0,
            elapsed: 0.0,
            on_complete: options.on_complete,
            payload: options.payload,
        });
        Ok(TaskMut {
            task: &mut self.items[index],
        })
    }

    // =========================================================================
    // Frame update
    // =========================================================================

    /// Advance every task by `dt` seconds, apply values and retire finished tasks
    ///
    /// Tasks are visited from the highest dense index down, so swap-removing the
    /// current task only ever moves an already-visited task into its slot. When
    /// two tasks write the same cell, the one visited last (lower index) wins.
    ///
    /// Returns true if tasks remain active.
    pub fn update(&mut self, dt: f32) -> bool {
        let dt = self.sanitize_dt(dt);

        for index in (0..self.items.len()).rev() {
            if self.items[index].step(dt) {
                self.retire_at(index);
            }
        }

        !self.items.is_empty()
    }

    fn sanitize_dt(&self, dt: f32) -> f32 {
        if !dt.is_finite() || dt < 0.0 {
            tracing::warn!(dt, "ignoring invalid frame delta");
            return 0.0;
        }
        match self.max_frame_dt {
            Some(max) if dt > max => max,
            _ => dt,
        }
    }

    fn retire_at(&mut self, index: usize) {
        let task = self.items.swap_remove(index);
        self.positions.remove(task.id);
        if let Some(moved) = self.items.get(index) {
            self.positions[moved.id] = index;
        }

        tracing::trace!(id = ?task.id, kind = task.kind.name(), "task retired");
        task.retire();
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Number of active tasks
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Whether the task is still active (false once it retired)
    pub fn contains(&self, id: TaskId) -> bool {
        self.positions.contains_key(id)
    }

    /// Linear progress (0.0 to 1.0) of an active task; 0.0 while delayed
    pub fn progress(&self, id: TaskId) -> Option<f32> {
        let &index = self.positions.get(id)?;
        let task = &self.items[index];
        if task.elapsed < 0.0 {
            Some(0.0)
        } else {
            Some(task.progress())
        }
    }
}

impl fmt::Debug for TweenEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TweenEngine")
            .field("len", &self.items.len())
            .field("capacity", &self.capacity)
            .field("default_easing", &self.default_easing)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn linear() -> TaskOptions {
        TaskOptions::new().easing(Easing::Linear)
    }

    #[test]
    fn test_pool_exhaustion_then_completion() {
        let mut engine = TweenEngine::new(2);
        let a = Tweened::new(0.0_f32);
        let b = Tweened::new(0.0_f32);
        let c = Tweened::new(0.0_f32);

        engine.add_scalar(&a, 10.0, 1.0).unwrap();
        engine.add_scalar(&b, 20.0, 1.0).unwrap();
        assert!(engine.is_full());

        let err = engine.add_scalar(&c, 30.0, 1.0).err();
        assert_eq!(err, Some(TweenError::PoolExhausted { capacity: 2 }));
        assert_eq!(engine.len(), 2);

        assert!(!engine.update(1.0));
        assert_eq!(a.get(), 10.0);
        assert_eq!(b.get(), 20.0);
        assert_eq!(c.get(), 0.0);
        assert!(engine.is_empty());
    }

    #[test]
    fn test_retirement_frees_a_slot() {
        let mut engine = TweenEngine::new(1);
        let a = Tweened::new(0.0_f32);

        engine.add_scalar(&a, 1.0, 0.5).unwrap();
        assert!(engine.add_scalar(&a, 2.0, 0.5).is_err());

        engine.update(0.5);
        assert!(engine.add_scalar(&a, 2.0, 0.5).is_ok());
    }

    #[test]
    fn test_color_midpoint() {
        let mut engine = TweenEngine::new(4);
        let color = Tweened::new(Color::rgba(0, 0, 0, 255));

        engine
            .add_color_with(&color, Color::rgba(255, 255, 255, 255), 1.0, linear())
            .unwrap();
        engine.update(0.5);

        let c = color.get();
        for channel in [c.r, c.g, c.b] {
            assert!((127..=128).contains(&channel), "channel {channel}");
        }
        assert_eq!(c.a, 255);
    }

    #[test]
    fn test_vec3_reaches_target() {
        let mut engine = TweenEngine::new(4);
        let pos = Tweened::new(Vec3::ZERO);
        let to = Vec3::new(3.0, -1.0, 8.0);

        engine.add_vec3(&pos, to, 1.0).unwrap();
        for _ in 0..60 {
            engine.update(1.0 / 60.0);
        }
        engine.update(0.1);

        assert!(pos.get().approx_eq(&to, 1e-5));
        assert!(engine.is_empty());
    }

    #[test]
    fn test_hold_keeps_task_at_full_progress() {
        let mut engine = TweenEngine::new(4);
        let value = Tweened::new(0.0_f32);

        let id = engine.add_scalar(&value, 5.0, 2.0).unwrap().hold(1.0).id();

        engine.update(1.0);
        engine.update(1.0);
        assert!(engine.contains(id));
        assert_eq!(engine.progress(id), Some(1.0));
        assert_eq!(value.get(), 5.0);

        // Overwrites made during the hold are reverted to `to`
        value.set(-1.0);
        engine.update(0.5);
        assert_eq!(value.get(), 5.0);
        assert!(engine.contains(id));

        engine.update(0.5);
        assert!(!engine.contains(id));
        assert!(engine.is_empty());
    }

    #[test]
    fn test_hold_boundary() {
        let mut engine = TweenEngine::new(4);
        let value = Tweened::new(0.0_f32);

        let id = engine.add_scalar(&value, 1.0, 1.0).unwrap().hold(0.5).id();

        engine.update(1.25);
        assert!(engine.contains(id));
        engine.update(0.25);
        assert!(!engine.contains(id));
    }

    #[test]
    fn test_delay_leaves_target_unchanged() {
        let mut engine = TweenEngine::new(4);
        let value = Tweened::new(5.0_f32);

        let id = engine
            .add_scalar_with(&value, 10.0, 1.0, linear())
            .unwrap()
            .delay(0.5)
            .id();

        value.set(6.0);
        engine.update(0.25);
        assert_eq!(value.get(), 6.0);
        assert_eq!(engine.progress(id), Some(0.0));

        // Elapsed reaches exactly zero: the `from` snapshot is written
        engine.update(0.25);
        assert_eq!(value.get(), 5.0);

        engine.update(0.5);
        assert!((value.get() - 7.5).abs() < 1e-6);
    }

    #[test]
    fn test_elapsed_can_skip_ahead() {
        let mut engine = TweenEngine::new(4);
        let value = Tweened::new(0.0_f32);

        engine
            .add_scalar_with(&value, 4.0, 2.0, linear())
            .unwrap()
            .elapsed(1.0);
        engine.update(0.0);

        assert!((value.get() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_non_finite_elapsed_still_retires() {
        let mut engine = TweenEngine::new(1);
        let value = Tweened::new(0.0_f32);

        engine
            .add_scalar_with(&value, 2.0, 1.0, linear())
            .unwrap()
            .elapsed(f32::NAN);
        engine.update(0.5);
        assert!((value.get() - 1.0).abs() < 1e-6);

        engine.update(0.5);
        assert_eq!(value.get(), 2.0);
        assert!(engine.is_empty());

        engine
            .add_scalar(&value, 0.0, 1.0)
            .unwrap()
            .elapsed(f32::NEG_INFINITY);
        engine.update(1.0);
        assert!(value.get().is_finite());
        assert!(engine.is_empty());
    }

    #[test]
    fn test_invalid_dt_does_not_rewind() {
        let mut engine = TweenEngine::new(4);
        let value = Tweened::new(0.0_f32);

        let id = engine
            .add_scalar_with(&value, 1.0, 1.0, linear())
            .unwrap()
            .id();
        engine.update(0.5);
        engine.update(-0.4);
        engine.update(f32::NAN);

        assert_eq!(engine.progress(id), Some(0.5));
    }

    #[test]
    fn test_non_positive_duration_completes_immediately() {
        let mut engine = TweenEngine::new(4);
        let a = Tweened::new(0.0_f32);
        let b = Tweened::new(0.0_f32);
        let done = Rc::new(Cell::new(0));

        let counter = done.clone();
        engine
            .add_scalar_with(
                &a,
                3.0,
                0.0,
                TaskOptions::new().on_complete(move |_| counter.set(counter.get() + 1)),
            )
            .unwrap();
        engine.add_scalar(&b, 4.0, -2.0).unwrap();

        engine.update(0.0);
        assert_eq!(a.get(), 3.0);
        assert_eq!(b.get(), 4.0);
        assert_eq!(done.get(), 1);
        assert!(engine.is_empty());
    }

    #[test]
    fn test_default_easing_from_config() {
        let mut standard = TweenEngine::with_config(&EngineConfig::standard());
        let mut testing = TweenEngine::with_config(&EngineConfig::testing());
        let a = Tweened::new(0.0_f32);
        let b = Tweened::new(0.0_f32);

        standard.add_scalar(&a, 10.0, 1.0).unwrap();
        testing.add_scalar(&b, 10.0, 1.0).unwrap();
        standard.update(0.5);
        testing.update(0.5);

        assert!((a.get() - 7.5).abs() < 1e-5);
        assert!((b.get() - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_max_frame_dt_clamps_long_frames() {
        let mut engine = TweenEngine::with_config(&EngineConfig::minimal());
        let value = Tweened::new(0.0_f32);

        engine
            .add_scalar_with(&value, 10.0, 1.0, linear())
            .unwrap();
        engine.update(3.0);

        assert!((value.get() - 2.5).abs() < 1e-5);
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn test_alpha_fade_keeps_rgb() {
        let mut engine = TweenEngine::new(4);
        let label = Tweened::new(Color::rgba(10, 20, 30, 77));

        engine
            .add_alpha(&label, 0, 255, 2.0)
            .unwrap()
            .easing(Easing::Linear)
            .delay(1.0);

        engine.update(0.5);
        assert_eq!(label.get().a, 77);

        engine.update(1.5);
        assert_eq!(label.get(), Color::rgba(10, 20, 30, 128));
    }

    #[test]
    fn test_same_target_lower_index_wins() {
        let mut engine = TweenEngine::new(4);
        let value = Tweened::new(0.0_f32);

        engine.add_scalar(&value, 10.0, 1.0).unwrap();
        engine.add_scalar(&value, 20.0, 1.0).unwrap();
        engine.update(1.0);

        assert_eq!(value.get(), 10.0);
    }

    #[test]
    fn test_ids_survive_swap_removal() {
        let mut engine = TweenEngine::new(4);
        let a = Tweened::new(0.0_f32);
        let b = Tweened::new(0.0_f32);
        let c = Tweened::new(0.0_f32);

        let short = engine.add_scalar(&a, 1.0, 0.5).unwrap().id();
        let long = engine.add_scalar(&b, 1.0, 2.0).unwrap().id();
        let mid = engine.add_scalar(&c, 1.0, 1.0).unwrap().id();

        engine.update(0.5);
        assert!(!engine.contains(short));
        assert_eq!(engine.progress(mid), Some(0.5));
        assert_eq!(engine.progress(long), Some(0.25));

        engine.update(0.5);
        assert!(!engine.contains(mid));
        assert_eq!(engine.progress(long), Some(0.5));
        assert_eq!(engine.len(), 1);

        engine.update(1.0);
        assert!(engine.is_empty());
        assert_eq!(b.get(), 1.0);
    }

    #[test]
    fn test_every_task_visited_once_per_update() {
        let mut engine = TweenEngine::new(16);
        let calls = Rc::new(RefCell::new(vec![0_u32; 16]));

        for i in 0..16 {
            let calls = calls.clone();
            // Mix of durations so several retire within the same pass
            let duration = if i % 3 == 0 { 0.1 } else { 1.0 };
            engine
                .add_draw(move |_, _| calls.borrow_mut()[i] += 1, duration, None)
                .unwrap();
        }

        engine.update(0.1);
        assert!(calls.borrow().iter().all(|&n| n == 1));

        engine.update(0.1);
        for (i, &n) in calls.borrow().iter().enumerate() {
            let expected = if i % 3 == 0 { 1 } else { 2 };
            assert_eq!(n, expected, "task {i}");
        }
    }

    #[test]
    fn test_draw_receives_eased_progress_and_payload() {
        let mut engine = TweenEngine::new(4);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let record = seen.clone();
        engine
            .add_draw_with(
                move |t, payload| {
                    let width = payload.and_then(|p| p.downcast_ref::<f32>()).copied();
                    record.borrow_mut().push((t, width));
                },
                1.0,
                TaskOptions::new()
                    .easing(Easing::EaseInQuad)
                    .payload(Payload::owned(2.0_f32)),
            )
            .unwrap();

        for _ in 0..4 {
            engine.update(0.25);
        }

        let seen = seen.borrow();
        let progress: Vec<f32> = seen.iter().map(|(t, _)| *t).collect();
        assert_eq!(progress, vec![0.0625, 0.25, 0.5625, 1.0]);
        assert!(seen.iter().all(|(_, w)| *w == Some(2.0)));
    }

    struct DropCounter(Rc<Cell<u32>>);

    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_owned_payload_released_exactly_once() {
        let mut engine = TweenEngine::new(4);
        let drops = Rc::new(Cell::new(0));

        engine
            .add_draw(
                |_, _| {},
                0.5,
                Some(Payload::owned(DropCounter(drops.clone()))),
            )
            .unwrap()
            .hold(0.5);

        engine.update(0.5);
        assert_eq!(drops.get(), 0);

        engine.update(0.5);
        assert_eq!(drops.get(), 1);

        engine.update(0.5);
        assert_eq!(drops.get(), 1);
    }

    #[test]
    fn test_borrowed_payload_never_released() {
        let mut engine = TweenEngine::new(4);
        let drops = Rc::new(Cell::new(0));
        let segment = Rc::new(DropCounter(drops.clone()));
        let draws = Rc::new(Cell::new(0));

        let count = draws.clone();
        engine
            .add_draw(
                move |_, payload| {
                    if payload.is_some_and(|p| p.is::<DropCounter>()) {
                        count.set(count.get() + 1);
                    }
                },
                0.5,
                Some(Payload::borrowed(&segment)),
            )
            .unwrap();

        engine.update(0.25);
        engine.update(0.25);
        assert!(engine.is_empty());
        assert_eq!(draws.get(), 2);
        assert_eq!(drops.get(), 0);
        assert_eq!(Rc::strong_count(&segment), 1);
    }

    #[test]
    fn test_on_complete_once_with_payload() {
        let mut engine = TweenEngine::new(4);
        let value = Tweened::new(0.0_f32);
        let completions = Rc::new(RefCell::new(Vec::new()));

        let record = completions.clone();
        engine
            .add_scalar_with(
                &value,
                1.0,
                0.5,
                TaskOptions::new()
                    .payload(Payload::owned(7_u32))
                    .on_complete(move |payload| {
                        let tag = payload.and_then(|p| p.downcast_ref::<u32>()).copied();
                        record.borrow_mut().push(tag);
                    }),
            )
            .unwrap();

        for _ in 0..4 {
            engine.update(0.25);
        }

        assert_eq!(*completions.borrow(), vec![Some(7)]);
    }

    #[test]
    fn test_dropped_target_still_retires() {
        let mut engine = TweenEngine::new(4);
        let done = Rc::new(Cell::new(false));

        {
            let radius = Tweened::new(0.0_f32);
            let flag = done.clone();
            engine
                .add_scalar_with(
                    &radius,
                    1.0,
                    1.0,
                    TaskOptions::new().on_complete(move |_| flag.set(true)),
                )
                .unwrap();
        }

        engine.update(0.5);
        assert!(!done.get());
        engine.update(0.5);
        assert!(done.get());
        assert!(engine.is_empty());
    }
}
