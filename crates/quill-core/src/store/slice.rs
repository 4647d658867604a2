/// Lifecycle of a slice's most recent fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SliceStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}

/// Identifies one fetch against a slice.
///
/// Only the ticket from the latest [`Slice::begin`] may settle the slice;
/// outcomes carrying older tickets are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

/// One collection in the store with its fetch status and last error.
#[derive(Debug, Clone, Default)]
pub struct Slice<T> {
    data: T,
    status: SliceStatus,
    error: Option<String>,
    generation: u64,
}

impl<T> Slice<T> {
    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn status(&self) -> SliceStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.status == SliceStatus::Loading
    }

    /// Start a fetch: enter `Loading`, clear the error, supersede older tickets.
    pub fn begin(&mut self) -> Ticket {
        self.generation += 1;
        self.status = SliceStatus::Loading;
        self.error = None;
        Ticket(self.generation)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.generation
    }

    /// Replace the data wholesale. Returns `false` for a superseded ticket.
    pub fn resolve(&mut self, ticket: Ticket, data: T) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.data = data;
        self.status = SliceStatus::Ready;
        self.error = None;
        true
    }

    /// Record a failure; the previous data stays visible.
    pub fn reject(&mut self, ticket: Ticket, message: impl Into<String>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.status = SliceStatus::Failed;
        self.error = Some(message.into());
        true
    }

    /// Local mutation, applied without a round trip.
    pub fn mutate(&mut self, f: impl FnOnce(&mut T)) {
        f(&mut self.data);
    }
}

impl<T: Default> Slice<T> {
    /// Back to `Idle` with empty data; any in-flight ticket becomes stale.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.data = T::default();
        self.status = SliceStatus::Idle;
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_lifecycle() {
        let mut slice: Slice<Vec<u32>> = Slice::default();
        assert_eq!(slice.status(), SliceStatus::Idle);

        let ticket = slice.begin();
        assert!(slice.is_loading());
        assert!(slice.resolve(ticket, vec![1, 2]));
        assert_eq!(slice.status(), SliceStatus::Ready);
        assert_eq!(slice.data(), &vec![1, 2]);
    }

    #[test]
    fn test_failure_keeps_stale_data() {
        let mut slice: Slice<Vec<u32>> = Slice::default();
        let first = slice.begin();
        slice.resolve(first, vec![7]);

        let second = slice.begin();
        assert_eq!(slice.error(), None);
        assert!(slice.reject(second, "boom"));
        assert_eq!(slice.status(), SliceStatus::Failed);
        assert_eq!(slice.error(), Some("boom"));
        assert_eq!(slice.data(), &vec![7]);

        // A new fetch clears the error again.
        slice.begin();
        assert_eq!(slice.error(), None);
    }

    #[test]
    fn test_superseded_ticket_is_ignored() {
        let mut slice: Slice<Vec<u32>> = Slice::default();
        let old = slice.begin();
        let new = slice.begin();

        assert!(slice.resolve(new, vec![2]));
        assert!(!slice.resolve(old, vec![1]));
        assert!(!slice.reject(old, "late failure"));
        assert_eq!(slice.data(), &vec![2]);
        assert_eq!(slice.status(), SliceStatus::Ready);
    }

    #[test]
    fn test_reset_invalidates_in_flight_fetch() {
        let mut slice: Slice<Vec<u32>> = Slice::default();
        let ticket = slice.begin();
        slice.reset();
        assert!(!slice.resolve(ticket, vec![1]));
        assert_eq!(slice.status(), SliceStatus::Idle);
        assert!(slice.data().is_empty());
    }
}
