use retouch_domain::DecodedImage;

/// Identifies one requested load. Only the newest ticket may complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(DecodedImage),
    /// A newer load was requested after this one; the result was dropped.
    Stale,
}

#[derive(Debug, Default)]
pub(crate) struct LoadTickets {
    latest: u64,
}

impl LoadTickets {
    pub(crate) fn issue(&mut self) -> LoadTicket {
        self.latest += 1;
        LoadTicket(self.latest)
    }

    pub(crate) fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_newest_ticket_is_current() {
        let mut tickets = LoadTickets::default();
        let first = tickets.issue();
        assert!(tickets.is_current(first));

        let second = tickets.issue();
        assert!(!tickets.is_current(first));
        assert!(tickets.is_current(second));
        assert!(first < second);
    }
}
