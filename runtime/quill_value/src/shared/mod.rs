//! Caller-owned storage that collection values can borrow.
//!
//! Hosts keep their sequences and maps in a [`Shared<T>`]. Converting one
//! with `to_value` produces a collection value holding a non-owning
//! [`SharedRef<T>`]: the host stays the only owner, and changes it makes
//! between two lookups are visible to the second one.
//!
//! A value must not outlive the storage it wraps. When it does anyway, or
//! when the host holds a mutable borrow while an expression reads the
//! storage, the access fails with an `EvalError` instead of panicking.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::errors::{dangling_record, record_busy, EvalResult};

/// Host-owned, single-threaded storage.
///
/// The only way to create the shared allocation; collection values can
/// only ever observe it through [`SharedRef`].
#[repr(transparent)]
pub struct Shared<T>(Rc<RefCell<T>>);

impl<T> Shared<T> {
    #[inline]
    pub fn new(value: T) -> Self {
        Shared(Rc::new(RefCell::new(value)))
    }

    #[inline]
    pub fn borrow(&self) -> Ref<'_, T> {
        self.0.borrow()
    }

    #[inline]
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.0.borrow_mut()
    }

    /// Non-owning handle for a runtime value.
    #[inline]
    pub fn handle(&self) -> SharedRef<T> {
        SharedRef(Rc::downgrade(&self.0))
    }
}

impl<T> Clone for Shared<T> {
    #[inline]
    fn clone(&self) -> Self {
        Shared(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Shared").field(&self.0).finish()
    }
}

impl<T: Default> Default for Shared<T> {
    fn default() -> Self {
        Shared::new(T::default())
    }
}

/// Non-owning handle into a [`Shared<T>`].
pub struct SharedRef<T>(Weak<RefCell<T>>);

impl<T> SharedRef<T> {
    /// Run `f` against the storage.
    ///
    /// `type_name` is only used to describe the failure when the storage
    /// is gone or mutably borrowed.
    pub fn read<R>(&self, type_name: &str, f: impl FnOnce(&T) -> R) -> EvalResult<R> {
        let Some(cell) = self.0.upgrade() else {
            tracing::debug!(type_name, "read through dangling collection handle");
            return Err(dangling_record(type_name));
        };
        let guard = cell.try_borrow().map_err(|_| record_busy(type_name))?;
        Ok(f(&guard))
    }

    /// Identity of the underlying storage.
    ///
    /// Stable for the lifetime of the handle, even after the storage is
    /// dropped.
    #[inline]
    pub fn address(&self) -> usize {
        self.0.as_ptr().cast::<()>() as usize
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}

impl<T> Clone for SharedRef<T> {
    #[inline]
    fn clone(&self) -> Self {
        SharedRef(Weak::clone(&self.0))
    }
}

impl<T> fmt::Debug for SharedRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedRef({:#x})", self.address())
    }
}

#[cfg(test)]
mod tests;
