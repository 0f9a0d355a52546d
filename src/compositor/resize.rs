/// Remembers the last size applied to a set of render targets so repeated
/// resize events with identical dimensions are dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResizeGate {
    applied: Option<(u32, u32)>,
}

impl ResizeGate {
    /// Gate that has never applied a size.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gate whose targets were already created at `width x height`.
    #[must_use]
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            applied: Some((width, height)),
        }
    }

    /// Returns `true` (and records the size) if the targets must be
    /// rebuilt for `width x height`. Zero-sized requests are rejected.
    pub fn accept(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 || self.applied == Some((width, height)) {
            return false;
        }
        self.applied = Some((width, height));
        true
    }

    /// Size last applied, if any.
    #[must_use]
    pub fn size(&self) -> Option<(u32, u32)> {
        self.applied
    }
}
