//! Named groups of tensors that can change wrapper type.
//!
//! A matrix kernel sees its tensors in several forms: the autodiff wrapper
//! on the way in, the inner backend's primitive while the iteration runs,
//! and the wrapper again on the way out. [`TensorBundle<T>`] lets one struct
//! definition serve all of them:
//!
//! ```ignore
//! tensor_bundle! {
//!     pub struct SqrtmOutput { sqrt, inv_sqrt }
//! }
//!
//! let tracked: SqrtmOutput<FloatTensor<Autodiff<B>>> = ...;
//! let inner: SqrtmOutput<FloatTensor<B>> = tracked.map(|t| t.primitive);
//! ```
//!
//! The `Array` associated type carries the tensor count, so the autodiff
//! glue can recover it as a const generic without the kernel trait having one.
//! `Mapped<U>` is always `Self<U>` and `Array` is always `[T; N]`; they are
//! associated types only because Rust cannot bound `for<T> TensorBundle<T>`.

use std::fmt::Debug;

/// A fixed set of tensors of type `T`.
pub trait TensorBundle<T: Debug + Clone + Send>: Sized + Clone + Send + Debug {
    /// `[T; N]` for an `N`-tensor bundle.
    type Array;
    /// The same bundle holding `U`.
    type Mapped<U: Debug + Clone + Send>: TensorBundle<U, Array = Self::ArrayMapped<U>>;
    /// `[U; N]`.
    type ArrayMapped<U>;

    fn map<U: Debug + Clone + Send>(self, f: impl FnMut(T) -> U) -> Self::Mapped<U>;
    fn into_array(self) -> Self::Array;
    fn from_array(arr: Self::Array) -> Self;
}

#[doc(hidden)]
#[macro_export]
macro_rules! __replace_expr {
    ($_t:tt, $sub:expr) => {
        $sub
    };
}

/// Declares a tensor bundle struct with a `TensorBundle` implementation.
///
/// Fields are public and kept in declaration order by `into_array` and
/// `from_array`.
#[macro_export]
macro_rules! tensor_bundle {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident { $first_field:ident $(, $field:ident)* $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        $vis struct $name<T> {
            pub $first_field: T,
            $(pub $field: T,)*
        }

        impl<T: std::fmt::Debug + Clone + Send> $crate::TensorBundle<T> for $name<T> {
            type Array = [T; 1usize $(+ $crate::__replace_expr!($field, 1usize))*];
            type Mapped<U: std::fmt::Debug + Clone + Send> = $name<U>;
            type ArrayMapped<U> = [U; 1usize $(+ $crate::__replace_expr!($field, 1usize))*];

            fn map<U: std::fmt::Debug + Clone + Send>(self, mut f: impl FnMut(T) -> U) -> $name<U> {
                $name {
                    $first_field: f(self.$first_field),
                    $($field: f(self.$field),)*
                }
            }

            fn into_array(self) -> [T; 1usize $(+ $crate::__replace_expr!($field, 1usize))*] {
                [self.$first_field $(, self.$field)*]
            }

            fn from_array(arr: [T; 1usize $(+ $crate::__replace_expr!($field, 1usize))*]) -> Self {
                let [$first_field $(, $field)*] = arr;
                $name {
                    $first_field,
                    $($field,)*
                }
            }
        }
    };
}

pub use crate::tensor_bundle;
