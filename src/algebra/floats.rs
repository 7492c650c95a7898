use num_traits::{Float, FloatConst, FromPrimitive, NumAssign};

/// Scalar type over which all solver arithmetic is generic.
///
/// Implementations are provided for `f32` and `f64`.  Any other type can
/// be used provided it satisfies the bounds below, which lean on
/// [num_traits](num_traits) for the arithmetic pieces.
pub trait FloatT:
    'static
    + Send
    + Float
    + FloatConst
    + NumAssign
    + Default
    + FromPrimitive
    + std::fmt::Display
    + std::fmt::LowerExp
    + std::fmt::Debug
{
}
impl FloatT for f32 {}
impl FloatT for f64 {}

/// Conversion of primitive constants into a generic [`FloatT`](FloatT).
///
/// Lets internal code write `(0.5).as_T()` for literal constants instead
/// of spelling out `T::from_f64(0.5).unwrap()` at every use site.
#[allow(non_snake_case)]
pub trait AsFloatT<T>: 'static {
    fn as_T(&self) -> T;
}

macro_rules! impl_as_T {
    ($ty:ty, $ident:ident) => {
        impl<T> AsFloatT<T> for $ty
        where
            T: FromPrimitive + 'static,
        {
            #[inline]
            fn as_T(&self) -> T {
                T::$ident(*self).unwrap()
            }
        }
    };
}
impl_as_T!(u32, from_u32);
impl_as_T!(u64, from_u64);
impl_as_T!(usize, from_usize);
impl_as_T!(f32, from_f32);
impl_as_T!(f64, from_f64);
