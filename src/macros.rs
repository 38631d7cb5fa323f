pub use enclose::*;

/// Registers a reaction, cloning the listed captures into it.
///
/// ```
/// use observe_props::{on_change, Var};
///
/// let a = Var::new(1);
/// let total = Var::new(0);
/// let handle = on_change!((a, total) _trigger => { total.set(a.get() * 2); }; a).unwrap();
///
/// a.set(4);
/// assert_eq!(total.get(), 8);
/// handle.revoke();
/// ```
#[macro_export]
macro_rules! on_change {
    (( $($d_tt:tt)* ) $trigger:pat_param => $body:block ; $($observable:expr),+ $(,)?) => {
        $crate::register(
            $crate::macros::enclose!(($( $d_tt )*) move |$trigger: $crate::Trigger| $body),
            &[$(&$observable),+],
        )
    };
    ($trigger:pat_param => $body:block ; $($observable:expr),+ $(,)?) => {
        $crate::register(move |$trigger: $crate::Trigger| $body, &[$(&$observable),+])
    };
}

/// Same as [`on_change!`], but also runs the reaction immediately.
#[macro_export]
macro_rules! now_and_on_change {
    (( $($d_tt:tt)* ) $trigger:pat_param => $body:block ; $($observable:expr),+ $(,)?) => {
        $crate::register_now_and_on_change(
            $crate::macros::enclose!(($( $d_tt )*) move |$trigger: $crate::Trigger| $body),
            &[$(&$observable),+],
        )
    };
    ($trigger:pat_param => $body:block ; $($observable:expr),+ $(,)?) => {
        $crate::register_now_and_on_change(move |$trigger: $crate::Trigger| $body, &[$(&$observable),+])
    };
}
