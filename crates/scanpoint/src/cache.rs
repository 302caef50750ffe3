//! Derived state attached to configuration values.

/// Lazily computed state owned by a component. Equality ignores the cached
/// value, so a prepared component compares equal to an unprepared copy.
#[derive(Clone, Debug)]
pub struct Cached<T>(Option<T>);

impl<T> Default for Cached<T> {
    fn default() -> Self {
        Self(None)
    }
}

impl<T> PartialEq for Cached<T> {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl<T> Cached<T> {
    /// The cached value, if computed.
    pub fn get(&self) -> Option<&T> {
        self.0.as_ref()
    }

    /// Replace the cached value.
    pub fn set(&mut self, value: T) {
        self.0 = Some(value);
    }

    /// True once a value has been stored.
    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignored_by_equality() {
        let mut a = Cached::default();
        let b: Cached<u32> = Cached::default();
        a.set(3);
        assert_eq!(a, b);
        assert_eq!(a.get(), Some(&3));
        assert!(!b.is_set());
    }
}
