//! Three-valued attributes.
//!
//! Every attribute the host tracks is either explicitly absent (`Null`),
//! not yet known because it will be computed during apply (`Unknown`), or
//! a concrete value (`Known`). Models keep this distinction through every
//! conversion instead of collapsing it into `Option`.

/// A host-tracked attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub enum Value<T> {
    /// Explicitly absent.
    #[default]
    Null,
    /// Computed during apply.
    Unknown,
    /// A concrete value.
    Known(T),
}

impl<T> Value<T> {
    /// Wrap a concrete value.
    pub fn known(value: impl Into<T>) -> Self {
        Self::Known(value.into())
    }

    /// `None` becomes `Null`.
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Known(v),
            None => Self::Null,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    #[must_use]
    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    /// Borrow the known value.
    pub fn as_known(&self) -> Option<&T> {
        match self {
            Self::Known(v) => Some(v),
            _ => None,
        }
    }

    /// Take the known value.
    pub fn into_known(self) -> Option<T> {
        match self {
            Self::Known(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_ref(&self) -> Value<&T> {
        match self {
            Self::Null => Value::Null,
            Self::Unknown => Value::Unknown,
            Self::Known(v) => Value::Known(v),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Value<U> {
        match self {
            Self::Null => Value::Null,
            Self::Unknown => Value::Unknown,
            Self::Known(v) => Value::Known(f(v)),
        }
    }

    /// Fallible map that keeps `Null`/`Unknown` untouched.
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns.
    pub fn try_map<U, E, F: FnOnce(T) -> Result<U, E>>(self, f: F) -> Result<Value<U>, E> {
        Ok(match self {
            Self::Null => Value::Null,
            Self::Unknown => Value::Unknown,
            Self::Known(v) => Value::Known(f(v)?),
        })
    }

    /// Request encoding for fields that are merely optional upstream:
    /// only known values are sent.
    pub fn to_option(&self) -> Option<T>
    where
        T: Clone,
    {
        self.as_known().cloned()
    }

    /// Request encoding for fields that are nullable upstream: unknown is
    /// omitted (`None`), null is sent as JSON null (`Some(None)`).
    pub fn to_patch(&self) -> Option<Option<T>>
    where
        T: Clone,
    {
        match self {
            Self::Unknown => None,
            Self::Null => Some(None),
            Self::Known(v) => Some(Some(v.clone())),
        }
    }

    /// Use the prior state value while this one is still unknown.
    #[must_use]
    pub fn or_state(self, state: &Value<T>) -> Value<T>
    where
        T: Clone,
    {
        match self {
            Self::Unknown => state.clone(),
            other => other,
        }
    }

    /// True when both sides are set and differ, or one side is null and the
    /// other is known. Unknown on the plan side is never a change.
    pub fn differs_from(&self, state: &Value<T>) -> bool
    where
        T: PartialEq,
    {
        !self.is_unknown() && self != state
    }
}

impl<T: std::ops::Deref> Value<T> {
    /// Borrow the dereferenced known value, e.g. `&str` for `Value<String>`.
    pub fn as_deref(&self) -> Option<&T::Target> {
        self.as_known().map(|v| &**v)
    }
}

impl From<&str> for Value<String> {
    fn from(value: &str) -> Self {
        Self::Known(value.to_string())
    }
}

impl<T> From<Option<T>> for Value<T> {
    fn from(value: Option<T>) -> Self {
        Self::from_option(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_null() {
        let v: Value<String> = Value::default();
        assert!(v.is_null());
        assert!(!v.is_known());
    }

    #[test]
    fn test_patch_encoding() {
        assert_eq!(Value::<i64>::Unknown.to_patch(), None);
        assert_eq!(Value::<i64>::Null.to_patch(), Some(None));
        assert_eq!(Value::Known(3i64).to_patch(), Some(Some(3)));
        assert_eq!(Value::<i64>::Null.to_option(), None);
    }

    #[test]
    fn test_or_state() {
        let state = Value::Known("abc".to_string());
        assert_eq!(Value::Unknown.or_state(&state), state);
        assert_eq!(Value::<String>::Null.or_state(&state), Value::Null);
        assert_eq!(Value::from("new").or_state(&state), Value::from("new"));
    }

    #[test]
    fn test_differs_from() {
        let state = Value::Known(1i64);
        assert!(!Value::Known(1i64).differs_from(&state));
        assert!(Value::Known(2i64).differs_from(&state));
        assert!(Value::<i64>::Null.differs_from(&state));
        assert!(!Value::<i64>::Unknown.differs_from(&state));
    }

    #[test]
    fn test_as_deref_and_map() {
        let v = Value::from("slug");
        assert_eq!(v.as_deref(), Some("slug"));
        assert_eq!(v.map(|s| s.len()), Value::Known(4));
        assert_eq!(Value::<String>::Unknown.map(|s| s.len()), Value::Unknown);
    }
}
