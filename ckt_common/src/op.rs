//! Boilerplate arithmetic trait impls for single-field integer newtypes.

/// Implements a `std::ops` trait for a tuple newtype over an integer.
///
/// * `op!(binary Cents, Add, add)` implements `Cents + Cents`
/// * `op!(inplace Cents, AddAssign, add_assign)` implements `Cents += Cents`
/// * `op!(unary Cents, Neg, neg)` implements `-Cents`
#[macro_export]
macro_rules! op {
    (binary $t:ty, $imp:ident, $method:ident) => {
        impl std::ops::$imp for $t {
            type Output = Self;

            fn $method(self, rhs: Self) -> Self::Output {
                Self(std::ops::$imp::$method(self.0, rhs.0))
            }
        }
    };
    (inplace $t:ty, $imp:ident, $method:ident) => {
        impl std::ops::$imp for $t {
            fn $method(&mut self, rhs: Self) {
                std::ops::$imp::$method(&mut self.0, rhs.0)
            }
        }
    };
    (unary $t:ty, $imp:ident, $method:ident) => {
        impl std::ops::$imp for $t {
            type Output = Self;

            fn $method(self) -> Self::Output {
                Self(std::ops::$imp::$method(self.0))
            }
        }
    };
}
