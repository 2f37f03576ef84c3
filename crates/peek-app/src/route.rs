// Route observer
// The host site navigates client-side, so a URL change can surface through a
// history hook, a structural DOM mutation, or only the periodic poll. All three
// feed one notifier that compares the location once per loop turn.

/// How often the location is polled, in milliseconds of loop time.
pub const POLL_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteSignal {
    /// pushState, replaceState or popstate.
    Navigation,
    /// Nodes were added to or removed from the document.
    Mutation,
    Poll,
}

#[derive(Debug)]
pub struct RouteObserver {
    current: String,
    dirty: bool,
    next_poll_ms: u64,
}

impl RouteObserver {
    pub fn new(location: &str, now_ms: u64) -> Self {
        Self {
            current: location.to_string(),
            dirty: false,
            next_poll_ms: now_ms + POLL_INTERVAL_MS,
        }
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    /// Note that the route may have changed. Signals within one loop turn
    /// collapse into a single comparison.
    pub fn notify(&mut self, signal: RouteSignal) {
        log::trace!("route signal: {:?}", signal);
        self.dirty = true;
    }

    pub fn next_poll(&self) -> u64 {
        self.next_poll_ms
    }

    /// Fire the poll if it is due and schedule the next one.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if now_ms < self.next_poll_ms {
            return false;
        }
        self.notify(RouteSignal::Poll);
        self.next_poll_ms = now_ms + POLL_INTERVAL_MS;
        true
    }

    /// Compare `location` against the last reported one. Returns the new URL
    /// exactly once per distinct change.
    pub fn flush(&mut self, location: &str) -> Option<String> {
        if !std::mem::take(&mut self.dirty) || location == self.current {
            return None;
        }
        log::info!("route changed: {} -> {}", self.current, location);
        self.current = location.to_string();
        Some(self.current.clone())
    }
}

/// True for URLs of pages where a pull-request description can be edited.
pub fn is_pull_request_page(url: &str) -> bool {
    ["/pull/", "/compare/", "/pull-requests/", "/pulls"]
        .iter()
        .any(|marker| url.contains(marker))
}
