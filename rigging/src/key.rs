use std::{
    any::{self, TypeId},
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};

/// Represents the identity of a binding, i.e. the type that is requested.
///
/// Any `'static` type can be a key, including unsized ones such as `dyn Trait`.
#[derive(Clone, Copy, Debug)]
pub struct Key {
    /// The name of the type.
    pub name: &'static str,
    /// The unique identifier of the type.
    pub id: TypeId,
}

impl Key {
    /// Returns the key of type `K`.
    pub fn of<K: ?Sized + 'static>() -> Key {
        Key {
            name: any::type_name::<K>(),
            id: TypeId::of::<K>(),
        }
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Key {}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Service {}

    #[test]
    fn identity_is_the_type_id() {
        assert_eq!(Key::of::<i32>(), Key::of::<i32>());
        assert_ne!(Key::of::<i32>(), Key::of::<u32>());
        assert_ne!(Key::of::<dyn Service>(), Key::of::<Box<dyn Service>>());
    }

    #[test]
    fn display_uses_the_type_name() {
        assert_eq!(Key::of::<String>().to_string(), "alloc::string::String");
    }
}
