//! htmx response swapping.
//!
//! By default htmx refuses to swap 4xx/5xx responses into the page and flags them as errors. Form
//! endpoints answer validation failures (422) and conflicts (409) with a re-rendered fragment that
//! should be shown, so those statuses are force-swapped in the `htmx:beforeSwap` hook.

use std::collections::BTreeSet;

/// The mutable part of an `htmx:beforeSwap` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeforeSwapDetail {
    pub status: u16,
    pub should_swap: bool,
    pub is_error: bool,
}

impl BeforeSwapDetail {
    /// The detail htmx hands to listeners before any of them ran.
    pub fn for_status(status: u16) -> Self {
        // 2xx and 3xx swap, except 204 No Content.
        let swappable = (200..400).contains(&status) && status != 204;
        Self {
            status,
            should_swap: swappable,
            is_error: status >= 400,
        }
    }
}

pub const DEFAULT_SWAP_STATUSES: [u16; 2] = [409, 422];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapPolicy {
    statuses: BTreeSet<u16>,
}

impl Default for SwapPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_SWAP_STATUSES)
    }
}

impl SwapPolicy {
    pub fn new(statuses: impl IntoIterator<Item = u16>) -> Self {
        Self {
            statuses: statuses.into_iter().collect(),
        }
    }

    pub fn statuses(&self) -> impl Iterator<Item = u16> + '_ {
        self.statuses.iter().copied()
    }

    pub fn swaps(&self, status: u16) -> bool {
        self.statuses.contains(&status)
    }

    /// Returns `true` when the detail was changed.
    pub fn apply(&self, detail: &mut BeforeSwapDetail) -> bool {
        if !self.swaps(detail.status) {
            return false;
        }
        let changed = !detail.should_swap || detail.is_error;
        detail.should_swap = true;
        detail.is_error = false;
        if changed {
            tracing::debug!(status = detail.status, "forcing htmx swap for error response");
        }
        changed
    }

    pub fn resolve(&self, status: u16) -> BeforeSwapDetail {
        let mut detail = BeforeSwapDetail::for_status(status);
        self.apply(&mut detail);
        detail
    }
}
