//! Review states for metadata fields.
//!
//! A field that nobody has looked at yet is different from a field a
//! reviewer confirmed to be empty. [`Nullable`] carries all three states,
//! [`Checked`] drops the null state for fields where absence is expressed
//! some other way (an empty list) or is not meaningful at all.

/// Field that can be unreviewed, confirmed absent, or set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Nullable<T> {
    /// No reviewer has recorded anything, not even "no value".
    #[default]
    Unchecked,
    /// A reviewer confirmed there is no value.
    Null,
    /// A reviewed value.
    Set(T),
}

impl<T> Nullable<T> {
    /// Whether a reviewer has recorded a state for this field.
    pub fn is_checked(&self) -> bool {
        !matches!(self, Nullable::Unchecked)
    }

    /// Whether this field was confirmed absent.
    pub fn is_null(&self) -> bool {
        matches!(self, Nullable::Null)
    }

    /// The value, if one is set.
    pub fn value(&self) -> Option<&T> {
        match self {
            Nullable::Set(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> From<Option<T>> for Nullable<T> {
    /// A reviewed option: `None` means confirmed absent.
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Nullable::Set(value),
            None => Nullable::Null,
        }
    }
}

/// Field that can be unreviewed or set, but never null.
///
/// List fields use this type: the empty list is their confirmed-absent state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Checked<T> {
    /// No reviewer has recorded anything.
    #[default]
    Unchecked,
    /// A reviewed value.
    Set(T),
}

impl<T> Checked<T> {
    /// Whether a reviewer has recorded a value.
    pub fn is_checked(&self) -> bool {
        matches!(self, Checked::Set(_))
    }

    /// The value, if one is set.
    pub fn value(&self) -> Option<&T> {
        match self {
            Checked::Set(value) => Some(value),
            Checked::Unchecked => None,
        }
    }
}

impl<T> Checked<Vec<T>> {
    /// Whether this list was reviewed and found empty.
    pub fn is_confirmed_empty(&self) -> bool {
        matches!(self, Checked::Set(items) if items.is_empty())
    }

    /// Iterate over the items; unchecked lists yield nothing.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        match self {
            Checked::Set(items) => items.iter(),
            Checked::Unchecked => [].iter(),
        }
    }
}

impl<T> From<T> for Checked<T> {
    fn from(value: T) -> Self {
        Checked::Set(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_unchecked() {
        assert_eq!(Nullable::<String>::default(), Nullable::Unchecked);
        assert_eq!(Checked::<Vec<String>>::default(), Checked::Unchecked);
    }

    #[test]
    fn test_unchecked_is_falsy_and_stable_under_clone() {
        let field: Nullable<u32> = Nullable::Unchecked;
        assert!(!field.is_checked());
        assert_eq!(field.clone(), Nullable::Unchecked);
        assert_ne!(field, Nullable::Null);
    }

    #[test]
    fn test_null_empty_and_unchecked_are_distinct() {
        let empty: Checked<Vec<String>> = Checked::Set(vec![]);
        assert!(empty.is_checked());
        assert!(empty.is_confirmed_empty());
        assert_ne!(empty, Checked::Unchecked);
        assert!(Nullable::<String>::Null.is_checked());
        assert!(Nullable::<String>::Null.is_null());
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Nullable::from(Some(3)), Nullable::Set(3));
        assert_eq!(Nullable::<u32>::from(None), Nullable::Null);
    }

    #[test]
    fn test_checked_list_iter() {
        let unchecked: Checked<Vec<u32>> = Checked::Unchecked;
        assert_eq!(unchecked.iter().count(), 0);
        let set = Checked::Set(vec![1, 2]);
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
    }
}
