//! Command and query markers
//!
//! A command is an intent to change state; a query reads without side
//! effects. Each type names its result so the executor can return it typed.

/// An intent to mutate state
pub trait Command: Send + 'static {
    type Output: Send + 'static;
}

/// A side-effect free read
pub trait Query: Send + 'static {
    type Output: Send + 'static;
}

/// Implement [`Command`] for a list of types
///
/// ```
/// # use folio_core::{impl_command, cqs::Command};
/// pub struct RenameThing { pub name: String }
/// impl_command!(RenameThing => ());
/// ```
#[macro_export]
macro_rules! impl_command {
    ($($ty:ty => $out:ty),+ $(,)?) => {
        $(impl $crate::cqs::Command for $ty {
            type Output = $out;
        })+
    };
}

/// Implement [`Query`] for a list of types
#[macro_export]
macro_rules! impl_query {
    ($($ty:ty => $out:ty),+ $(,)?) => {
        $(impl $crate::cqs::Query for $ty {
            type Output = $out;
        })+
    };
}

/// Short type name used as the `op` field in boundary logs
pub fn operation_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PingQuery;
    impl_query!(PingQuery => bool);

    #[test]
    fn test_operation_name_is_short() {
        assert_eq!(operation_name::<PingQuery>(), "PingQuery");
    }
}
