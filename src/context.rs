//! Request-scoped storage.
//!
//! A [`Context`] is an immutable chain of typed entries. Adding a value never
//! touches the existing chain: it returns a new context whose newest entry
//! points at the old one. Two requests can only share entries that existed
//! before they diverged, and there is nothing to mutate, so concurrent
//! requests cannot observe each other's values.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// A named, typed slot in a [`Context`].
///
/// The type parameter ties the key to the type of the value stored under it,
/// so a lookup never needs a cast at the call site.
pub struct Key<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Key<T> {
    pub const fn new(name: &'static str) -> Self {
        Self { name, _marker: PhantomData }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for Key<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Key<T> {}

impl<T> fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self.name)
    }
}

/// Keys the built-in decorators populate.
pub mod keys {
    use super::Key;
    use crate::identity::Identity;
    use crate::logger::Logger;
    use crate::middleware::Auditor;

    pub const TRACE_ID: Key<String> = Key::new("tid");
    pub const CORRELATION_ID: Key<String> = Key::new("cid");
    pub const LOGGER: Key<Logger> = Key::new("log");
    pub const TOKEN: Key<String> = Key::new("token");
    pub const IDENTITY: Key<Identity> = Key::new("identity");
    pub const AUDITOR: Key<Auditor> = Key::new("auditor");
}

struct Entry {
    name: &'static str,
    value: Box<dyn Any + Send + Sync>,
    parent: Option<Arc<Entry>>,
}

/// Immutable key→value association carried by a request.
#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<Entry>>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new context with `value` stored under `key`.
    ///
    /// An existing value under the same key is shadowed, not replaced: the
    /// receiver still sees the old one.
    #[must_use]
    pub fn with_value<T>(&self, key: Key<T>, value: T) -> Self
    where
        T: Send + Sync + 'static,
    {
        Self {
            head: Some(Arc::new(Entry {
                name: key.name,
                value: Box::new(value),
                parent: self.head.clone(),
            })),
        }
    }

    /// Newest value stored under `key`.
    pub fn get<T: 'static>(&self, key: Key<T>) -> Option<&T> {
        let mut cur = self.head.as_deref();
        while let Some(entry) = cur {
            if entry.name == key.name {
                return entry.value.downcast_ref::<T>();
            }
            cur = entry.parent.as_deref();
        }
        None
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        let mut cur = self.head.as_deref();
        while let Some(entry) = cur {
            list.entry(&entry.name);
            cur = entry.parent.as_deref();
        }
        list.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME: Key<String> = Key::new("name");
    const COUNT: Key<u32> = Key::new("count");

    #[test]
    fn empty_context_has_nothing() {
        let ctx = Context::new();
        assert!(ctx.is_empty());
        assert_eq!(ctx.get(NAME), None);
    }

    #[test]
    fn with_value_leaves_original_untouched() {
        let base = Context::new().with_value(COUNT, 1);
        let next = base.with_value(NAME, "alice".to_owned());

        assert_eq!(next.get(NAME).map(String::as_str), Some("alice"));
        assert_eq!(next.get(COUNT), Some(&1));
        assert_eq!(base.get(NAME), None);
    }

    #[test]
    fn newest_value_shadows() {
        let a = Context::new().with_value(COUNT, 1);
        let b = a.with_value(COUNT, 2);
        assert_eq!(a.get(COUNT), Some(&1));
        assert_eq!(b.get(COUNT), Some(&2));
    }

    #[test]
    fn siblings_do_not_see_each_other() {
        let root = Context::new().with_value(COUNT, 0);
        let left = root.with_value(NAME, "left".to_owned());
        let right = root.with_value(NAME, "right".to_owned());
        assert_eq!(left.get(NAME).map(String::as_str), Some("left"));
        assert_eq!(right.get(NAME).map(String::as_str), Some("right"));
    }

    #[test]
    fn debug_lists_newest_first() {
        let ctx = Context::new().with_value(COUNT, 1).with_value(NAME, "x".to_owned());
        assert_eq!(format!("{ctx:?}"), r#"["name", "count"]"#);
    }
}
