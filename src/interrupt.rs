//! Global interrupt control.

/// Runs code with global interrupts suspended.
///
/// Implementations must restore the previous interrupt state when `f`
/// returns, and must not enable interrupts that were disabled on entry, so
/// the call is safe from inside an interrupt handler.
pub trait InterruptControl {
    /// Execute `f` with global interrupts suspended.
    fn free<R>(&self, f: impl FnOnce() -> R) -> R;
}

impl<T: InterruptControl + ?Sized> InterruptControl for &T {
    fn free<R>(&self, f: impl FnOnce() -> R) -> R {
        (**self).free(f)
    }
}
