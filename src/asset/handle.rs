use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Identity of a piece of scene state (light, material, geometry, vertex-buffer
/// set). Passes compare identities, never contents, when eliding state changes.
pub struct Id<T> {
    value: u32,
    _marker: PhantomData<fn() -> T>,
}

// Manual impls so `T` does not need to implement any of these itself.
impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.value)
    }
}

impl<T> Id<T> {
    pub const fn new(value: u32) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    pub fn value(self) -> u32 {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker;

    #[test]
    fn id_is_copy_without_copy_marker() {
        let a: Id<Marker> = Id::new(5);
        let b = a;
        let c = a;
        assert_eq!(b, c);
        assert_eq!(a.value(), 5);
    }

    #[test]
    fn ids_compare_by_value() {
        assert_ne!(Id::<Marker>::new(0), Id::<Marker>::new(1));
        assert_eq!(format!("{:?}", Id::<Marker>::new(7)), "Id(7)");
    }
}
