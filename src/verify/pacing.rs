use std::time::Duration;

/// Blocks the current thread between two addresses of a batch.
pub trait Sleep {
    fn sleep(&self, delay: Duration);
}

/// [`Sleep`] on the real clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleep;

impl Sleep for ThreadSleep {
    fn sleep(&self, delay: Duration) {
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}

impl<T: Sleep + ?Sized> Sleep for &T {
    fn sleep(&self, delay: Duration) {
        (**self).sleep(delay)
    }
}
