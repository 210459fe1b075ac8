//! Implements the standard arithmetic operator traits for single-field newtypes.

/// Generate operator trait implementations for a newtype wrapping a numeric field.
///
/// * `op!(binary T, Add, add)` implements `Add` for `T`, `&T`, and the mixed reference forms.
/// * `op!(inplace T, AddAssign, add_assign)` implements the in-place assignment operator.
/// * `op!(unary T, Neg, neg)` implements the unary operator.
#[macro_export]
macro_rules! op {
    (binary $ty:ty, $trait:ident, $method:ident) => {
        impl std::ops::$trait for $ty {
            type Output = $ty;

            fn $method(self, rhs: Self) -> Self::Output {
                <$ty>::from(std::ops::$trait::$method(self.value(), rhs.value()))
            }
        }

        impl std::ops::$trait<&$ty> for $ty {
            type Output = $ty;

            fn $method(self, rhs: &$ty) -> Self::Output {
                <$ty>::from(std::ops::$trait::$method(self.value(), rhs.value()))
            }
        }

        impl std::ops::$trait<$ty> for &$ty {
            type Output = $ty;

            fn $method(self, rhs: $ty) -> Self::Output {
                <$ty>::from(std::ops::$trait::$method(self.value(), rhs.value()))
            }
        }

        impl std::ops::$trait<&$ty> for &$ty {
            type Output = $ty;

            fn $method(self, rhs: &$ty) -> Self::Output {
                <$ty>::from(std::ops::$trait::$method(self.value(), rhs.value()))
            }
        }
    };
    (inplace $ty:ty, $trait:ident, $method:ident) => {
        impl std::ops::$trait for $ty {
            fn $method(&mut self, rhs: Self) {
                std::ops::$trait::$method(&mut self.0, rhs.0);
            }
        }
    };
    (unary $ty:ty, $trait:ident, $method:ident) => {
        impl std::ops::$trait for $ty {
            type Output = $ty;

            fn $method(self) -> Self::Output {
                <$ty>::from(std::ops::$trait::$method(self.value()))
            }
        }
    };
}
