//! Conversions from internal models to the shapes the API is allowed to expose.
//!
//! Both traits are implemented for slices, so `Vec<T>`, arrays and `&[T]`
//! convert element by element, keeping their order.

/// Infallible mapping to a public representation.
pub trait PublicConvertible {
  type Public;

  fn convert_to_public(&self) -> Self::Public;
}

/// Mapping to a public representation that may fail.
pub trait ThrowingPublicConvertible {
  type Public;
  type Error;

  fn convert_to_public(&self) -> Result<Self::Public, Self::Error>;
}

impl<T: PublicConvertible> PublicConvertible for [T] {
  type Public = Vec<T::Public>;

  fn convert_to_public(&self) -> Self::Public {
    self.iter().map(PublicConvertible::convert_to_public).collect()
  }
}

impl<T: ThrowingPublicConvertible> ThrowingPublicConvertible for [T] {
  type Public = Vec<T::Public>;
  type Error = T::Error;

  /// Stops at the first element that fails and returns its error.
  fn convert_to_public(&self) -> Result<Self::Public, Self::Error> {
    self.iter().map(ThrowingPublicConvertible::convert_to_public).collect()
  }
}

/// Converts any ordered collection, not just slices.
pub fn convert_all<'a, T, I>(items: I) -> Vec<T::Public>
where
  T: PublicConvertible + 'a,
  I: IntoIterator<Item = &'a T>,
{
  items.into_iter().map(PublicConvertible::convert_to_public).collect()
}

pub fn try_convert_all<'a, T, I>(items: I) -> Result<Vec<T::Public>, T::Error>
where
  T: ThrowingPublicConvertible + 'a,
  I: IntoIterator<Item = &'a T>,
{
  items.into_iter().map(ThrowingPublicConvertible::convert_to_public).collect()
}
