//! Ownership ledger for device resources.
//!
//! Every object a session allocates is collected here once, at creation.
//! Teardown releases them in reverse creation order.

use std::collections::HashSet;

use super::backend::{DrawingDevice, Resource};

#[derive(Debug, Default)]
pub struct DisposeCollector {
    /// Creation order.
    items: Vec<Resource>,
    owned: HashSet<Resource>,
}

impl DisposeCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `resource`. Collecting the same handle twice is
    /// ignored so it can only be released once.
    pub fn collect(&mut self, resource: impl Into<Resource>) {
        let resource = resource.into();
        if !self.owned.insert(resource) {
            tracing::warn!(?resource, "resource collected twice");
            return;
        }
        self.items.push(resource);
    }

    pub fn contains(&self, resource: impl Into<Resource>) -> bool {
        self.owned.contains(&resource.into())
    }

    /// Release one collected resource now. Unknown handles are left alone.
    pub fn remove_and_dispose<D: DrawingDevice + ?Sized>(
        &mut self,
        device: &mut D,
        resource: impl Into<Resource>,
    ) {
        let resource = resource.into();
        if !self.owned.remove(&resource) {
            return;
        }
        if let Some(idx) = self.items.iter().rposition(|r| *r == resource) {
            self.items.remove(idx);
        }
        device.release(resource);
    }

    /// Release everything, newest first. Returns how many were released.
    pub fn dispose_and_clear<D: DrawingDevice + ?Sized>(&mut self, device: &mut D) -> usize {
        let count = self.items.len();
        while let Some(resource) = self.items.pop() {
            device.release(resource);
        }
        self.owned.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::color::Rgba;
    use crate::render::recording::RecordingDevice;

    #[test]
    fn test_collect_once() {
        let mut device = RecordingDevice::new();
        let mut disposer = DisposeCollector::new();
        let brush = device.create_solid_brush(Rgba::BLACK).unwrap();
        disposer.collect(brush);
        disposer.collect(brush);
        assert_eq!(disposer.len(), 1);

        assert_eq!(disposer.dispose_and_clear(&mut device), 1);
        assert_eq!(device.stats().released, 1);
        assert_eq!(device.stats().double_releases, 0);
        assert_eq!(disposer.dispose_and_clear(&mut device), 0);
    }

    #[test]
    fn test_remove_and_dispose() {
        let mut device = RecordingDevice::new();
        let mut disposer = DisposeCollector::new();
        let a = device.create_solid_brush(Rgba::BLACK).unwrap();
        let b = device.create_solid_brush(Rgba::WHITE).unwrap();
        disposer.collect(a);
        disposer.collect(b);

        disposer.remove_and_dispose(&mut device, a);
        assert!(!disposer.contains(a));
        assert!(disposer.contains(b));
        disposer.remove_and_dispose(&mut device, a);
        assert_eq!(device.stats().released, 1);
        assert_eq!(device.live_resources(), 1);
    }

    #[test]
    fn test_ledger_keeps_creation_order() {
        let mut device = RecordingDevice::new();
        let mut disposer = DisposeCollector::new();
        let brushes: Vec<_> = (0..64u8)
            .map(|i| device.create_solid_brush(Rgba::rgb(i, 0, 0)).unwrap())
            .collect();
        for b in &brushes {
            disposer.collect(*b);
            disposer.collect(*b);
        }
        assert_eq!(disposer.len(), 64);

        disposer.remove_and_dispose(&mut device, brushes[10]);
        assert!(!disposer.contains(brushes[10]));
        assert_eq!(disposer.items.first(), Some(&Resource::from(brushes[0])));
        assert_eq!(disposer.items.last(), Some(&Resource::from(brushes[63])));

        assert_eq!(disposer.dispose_and_clear(&mut device), 63);
        assert!(disposer.is_empty());
        assert!(!disposer.contains(brushes[0]));
        assert_eq!(device.stats().released, 64);
        assert_eq!(device.stats().double_releases, 0);
    }
}
