use async_trait::async_trait;
use parking_lot::RwLock;

use crate::application::ports::LocationPort;
use crate::domain::{
    environment::Coordinates,
    errors::{DomainError, DomainResult},
};

/// Position reported by the device (a browser posting its fix, or `--lat/--lon` on the CLI).
/// Unset means the platform has no location to offer.
#[derive(Default)]
pub struct ReportedLocation {
    fix: RwLock<Option<Coordinates>>,
}

impl ReportedLocation {
    pub fn new(initial: Option<Coordinates>) -> Self {
        Self { fix: RwLock::new(initial) }
    }

    pub fn report(&self, coords: Coordinates) {
        *self.fix.write() = Some(coords);
    }

    pub fn forget(&self) {
        *self.fix.write() = None;
    }
}

#[async_trait]
impl LocationPort for ReportedLocation {
    async fn locate(&self) -> DomainResult<Coordinates> {
        let fix = *self.fix.read();
        fix.ok_or_else(|| DomainError::GeolocationUnavailable("no position reported".into()))
    }
}
