//! Collaborator-owned animatable fields
//!
//! A [`Tweened`] cell is owned by whatever owns the visual property (a camera,
//! a data point, a label). The engine only ever holds a [`Target`], a weak
//! reference that never keeps the cell alive.

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

/// A value that tweens can animate
///
/// # Example
///
/// ```ignore
/// let radius = Tweened::new(0.0_f32);
/// engine.add_scalar(&radius, 0.4, 1.0)?;
/// engine.update(0.5);
/// draw_sphere(center, radius.get());
/// ```
pub struct Tweened<T: Copy> {
    cell: Rc<Cell<T>>,
}

impl<T: Copy> Tweened<T> {
    pub fn new(value: T) -> Self {
        Self {
            cell: Rc::new(Cell::new(value)),
        }
    }

    /// Current value
    pub fn get(&self) -> T {
        self.cell.get()
    }

    /// Overwrite the value directly (a running tween will overwrite it again next frame)
    pub fn set(&self, value: T) {
        self.cell.set(value);
    }

    pub(crate) fn target(&self) -> Target<T> {
        Target {
            cell: Rc::downgrade(&self.cell),
        }
    }
}

impl<T: Copy + Default> Default for Tweened<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Copy + fmt::Debug> fmt::Debug for Tweened<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Tweened").field(&self.get()).finish()
    }
}

/// Non-owning reference from a task to a [`Tweened`] cell
pub(crate) struct Target<T: Copy> {
    cell: Weak<Cell<T>>,
}

impl<T: Copy> Target<T> {
    /// Write through to the cell; returns false once the owner dropped it
    pub(crate) fn write(&self, value: T) -> bool {
        match self.cell.upgrade() {
            Some(cell) => {
                cell.set(value);
                true
            }
            None => false,
        }
    }
}
