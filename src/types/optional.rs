//! A value-or-absent carrier.
//!
//! `Optional<T>` separates "not provided" from "provided with the zero value".
//! Settings overrides rely on this: an absent field leaves the base value
//! alone, while a present field replaces it even when the replacement is
//! `0` or `false`.
//!
//! Two constructors discriminate differently and must not be confused:
//! [`Optional::from_pointer`] looks at whether a reference exists, while
//! [`Optional::from_non_default`] compares the value against `T::default()`.

use serde::{Deserialize, Serialize};

/// Either absent, or present with a value of type `T`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Optional<T>(Option<T>);

impl<T> Optional<T> {
    /// Creates an absent value.
    pub const fn none() -> Self {
        Optional(None)
    }

    /// Creates a present value holding `value`.
    pub const fn some(value: T) -> Self {
        Optional(Some(value))
    }

    /// Returns true if a value is present.
    pub fn has(&self) -> bool {
        self.0.is_some()
    }

    /// Returns the value, or `default` if absent.
    pub fn value_or(&self, default: T) -> T
    where
        T: Clone,
    {
        self.0.clone().unwrap_or(default)
    }

    /// Borrows the contents as a standard `Option`.
    pub fn as_option(&self) -> Option<&T> {
        self.0.as_ref()
    }

    /// Converts into a standard `Option`.
    pub fn into_option(self) -> Option<T> {
        self.0
    }
}

impl<T: Clone> Optional<T> {
    /// Creates a value from a possibly missing reference.
    ///
    /// Absent iff `pointer` is `None`. The referenced value itself is never
    /// inspected, so `from_pointer(Some(&0))` is present.
    pub fn from_pointer(pointer: Option<&T>) -> Self {
        Optional(pointer.cloned())
    }
}

impl<T: Clone + Default> Optional<T> {
    /// Returns `(present, value)`, with `T::default()` standing in when absent.
    pub fn get(&self) -> (bool, T) {
        match &self.0 {
            Some(value) => (true, value.clone()),
            None => (false, T::default()),
        }
    }

    /// Returns the value, or `T::default()` if absent.
    pub fn value_or_zero(&self) -> T {
        self.0.clone().unwrap_or_default()
    }
}

impl<T: Default + PartialEq> Optional<T> {
    /// Creates a value that is absent iff `value == T::default()`.
    pub fn from_non_default(value: T) -> Self {
        if value == T::default() {
            Optional(None)
        } else {
            Optional(Some(value))
        }
    }
}

impl<T> Default for Optional<T> {
    fn default() -> Self {
        Optional::none()
    }
}

impl<T> From<Option<T>> for Optional<T> {
    fn from(value: Option<T>) -> Self {
        Optional(value)
    }
}

impl<T> From<Optional<T>> for Option<T> {
    fn from(value: Optional<T>) -> Self {
        value.0
    }
}

/// Parses a boolean the way settings files spell them.
///
/// Accepts `1`, `t`, `T`, `TRUE`, `true`, `True` and their false
/// counterparts `0`, `f`, `F`, `FALSE`, `false`, `False`. Anything else,
/// including the empty string, yields an absent value.
pub fn parse_bool(s: &str) -> Optional<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Optional::some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Optional::some(false),
        _ => Optional::none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn none_is_absent() {
        let opt: Optional<i32> = Optional::none();
        assert!(!opt.has());
        assert_eq!(opt.get(), (false, 0));
        assert_eq!(opt.value_or_zero(), 0);
        assert_eq!(opt.value_or(7), 7);
    }

    #[test]
    fn some_zero_is_present() {
        let opt = Optional::some(0);
        assert!(opt.has());
        assert_eq!(opt.get(), (true, 0));
        assert_eq!(opt.value_or(7), 0);
    }

    #[test]
    fn from_pointer_discriminates_on_reference() {
        assert!(!Optional::<i32>::from_pointer(None).has());

        let zero = 0;
        let opt = Optional::from_pointer(Some(&zero));
        assert_eq!(opt.get(), (true, 0));
    }

    #[test]
    fn from_non_default_discriminates_on_value() {
        assert!(!Optional::from_non_default(0u64).has());
        assert!(!Optional::from_non_default(String::new()).has());
        assert_eq!(
            Optional::from_non_default("a".to_string()).get(),
            (true, "a".to_string())
        );
    }

    #[test]
    fn parse_bool_accepts_settings_spellings() {
        for s in ["1", "t", "T", "TRUE", "true", "True"] {
            assert_eq!(parse_bool(s), Optional::some(true), "input {s:?}");
        }
        for s in ["0", "f", "F", "FALSE", "false", "False"] {
            assert_eq!(parse_bool(s), Optional::some(false), "input {s:?}");
        }
    }

    #[test]
    fn parse_bool_rejects_unrecognised() {
        for s in ["", "yes", "no", "tRUE", " true", "2", "on"] {
            assert!(!parse_bool(s).has(), "input {s:?}");
        }
    }

    #[test]
    fn serde_absent_is_null() {
        let absent: Optional<u32> = Optional::none();
        assert_eq!(serde_json::to_string(&absent).unwrap(), "null");
        assert_eq!(serde_json::to_string(&Optional::some(3u32)).unwrap(), "3");

        let parsed: Optional<u32> = serde_json::from_str("null").unwrap();
        assert!(!parsed.has());
        let parsed: Optional<u32> = serde_json::from_str("0").unwrap();
        assert_eq!(parsed.get(), (true, 0));
    }

    #[test]
    fn converts_to_and_from_option() {
        let opt: Optional<u8> = Some(4).into();
        assert_eq!(opt.as_option(), Some(&4));
        let back: Option<u8> = opt.into();
        assert_eq!(back, Some(4));
    }

    proptest! {
        #[test]
        fn some_get_returns_value(v: i64) {
            prop_assert_eq!(Optional::some(v).get(), (true, v));
        }

        #[test]
        fn from_non_default_nonzero_is_present(v in any::<i64>().prop_filter("non-zero", |v| *v != 0)) {
            prop_assert_eq!(Optional::from_non_default(v).get(), (true, v));
        }

        #[test]
        fn value_or_matches_presence(v: u32, d: u32, present: bool) {
            let opt = if present { Optional::some(v) } else { Optional::none() };
            prop_assert_eq!(opt.value_or(d), if present { v } else { d });
        }
    }
}
