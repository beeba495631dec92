use std::fmt;

use deal_sim::Deal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookError {
    DuplicateDealId,
}

impl fmt::Display for BookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateDealId => write!(f, "a deal with this id is already open"),
        }
    }
}

impl std::error::Error for BookError {}

/// The active set of open deals, in insertion order. Settled deals leave
/// the book through `take_expired`.
#[derive(Debug, Default)]
pub struct DealBook {
    deals: Vec<Deal>,
}

impl DealBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, deal: Deal) -> Result<(), BookError> {
        if self.get(&deal.id).is_some() {
            return Err(BookError::DuplicateDealId);
        }
        self.deals.push(deal);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Deal> {
        self.deals.iter().find(|deal| deal.id == id)
    }

    pub fn snapshot(&self) -> &[Deal] {
        &self.deals
    }

    pub fn len(&self) -> usize {
        self.deals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deals.is_empty()
    }

    /// Removes and returns every open deal whose lifetime has elapsed at
    /// `now_ms`, ready for settlement.
    pub fn take_expired(&mut self, now_ms: u64) -> Vec<Deal> {
        let mut expired = Vec::new();
        let mut remaining = Vec::with_capacity(self.deals.len());

        for deal in self.deals.drain(..) {
            if deal.is_expired(now_ms) && !deal.processed {
                expired.push(deal);
            } else {
                remaining.push(deal);
            }
        }

        self.deals = remaining;
        expired
    }
}
