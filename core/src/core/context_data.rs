// core/src/core/context_data.rs
use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// Shared, lockable context handed to every handler of a pipeline run.
///
/// Cloning is cheap and every clone sees the same data. The guards are
/// blocking `parking_lot` guards: drop them before any `.await`.
#[derive(Debug)]
pub struct FlowData<T: Send + Sync + 'static>(Arc<RwLock<T>>);

impl<T: Send + Sync + 'static> FlowData<T> {
  pub fn new(data: T) -> Self {
    FlowData(Arc::new(RwLock::new(data)))
  }

  pub fn read(&self) -> RwLockReadGuard<'_, T> {
    self.0.read()
  }

  pub fn write(&self) -> RwLockWriteGuard<'_, T> {
    self.0.write()
  }

  /// Read guard narrowed to one part of the context, e.g. `data.map_read(|d| &d.items)`.
  pub fn map_read<F, U: ?Sized>(&self, f: F) -> MappedRwLockReadGuard<'_, U>
  where
    F: FnOnce(&T) -> &U,
  {
    RwLockReadGuard::map(self.read(), f)
  }

  /// Replaces a value under the write lock and returns the previous one.
  /// Handy for moving resources (connections, transactions) out of the context.
  pub fn take<U: Default>(&self, f: impl FnOnce(&mut T) -> &mut U) -> U {
    let mut guard = self.write();
    std::mem::take(f(&mut guard))
  }
}

impl<T: Send + Sync + 'static> Clone for FlowData<T> {
  fn clone(&self) -> Self {
    FlowData(Arc::clone(&self.0))
  }
}

impl<T: Send + Sync + 'static + Default> Default for FlowData<T> {
  fn default() -> Self {
    Self::new(Default::default())
  }
}
