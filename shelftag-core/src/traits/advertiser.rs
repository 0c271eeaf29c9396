//! Advertising control

/// Trait for the BLE peripheral advertising the image characteristic
///
/// Service and characteristic registration happen once at board bring-up;
/// the receiver only (re)starts advertising.
pub trait Advertiser {
    /// Radio error type
    type Error;

    /// Start advertising under `name`
    ///
    /// Calling this while already advertising restarts advertising.
    fn start_advertising(&mut self, name: &str) -> Result<(), Self::Error>;
}

impl<T: Advertiser + ?Sized> Advertiser for &mut T {
    type Error = T::Error;

    fn start_advertising(&mut self, name: &str) -> Result<(), Self::Error> {
        (**self).start_advertising(name)
    }
}
