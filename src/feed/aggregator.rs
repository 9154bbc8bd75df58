//! Live depth built from one snapshot plus a stream of deltas.

use std::collections::BTreeMap;

use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, warn};

use super::{DeltaEvent, DeltaFeed, Side};
use crate::market::{Depth, Market, PriceLevel, RawDepth};
use crate::{CoinbookError, Result};

/// Aggregate volume per price level on both sides of a book.
///
/// Owned by one consumer: draining buffered deltas and reading the view
/// both take `&mut self`, so a shared aggregator belongs behind a mutex.
/// Deltas are relative and applied exactly as received. Replaying one
/// twice double-counts it, and reordering is not corrected.
///
/// If the feed outruns the aggregator by more than its capacity, the
/// skipped deltas make the book permanently wrong. The aggregator is then
/// stale: reads fail with [`CoinbookError::FeedLagged`] until
/// [`resnapshot`](Self::resnapshot) reseeds it.
#[derive(Debug, Default)]
pub struct DepthAggregator {
    asks: BTreeMap<Decimal, Decimal>,
    bids: BTreeMap<Decimal, Decimal>,
    deltas: Option<broadcast::Receiver<DeltaEvent>>,
    skipped: u64,
}

impl DepthAggregator {
    /// Seeds a detached aggregator from `snapshot`. Deltas must be fed
    /// through [`apply_delta`](Self::apply_delta).
    ///
    /// # Errors
    ///
    /// Returns [`CoinbookError::Overflow`] if repeated levels in the
    /// snapshot sum out of range.
    pub fn new(snapshot: &RawDepth) -> Result<Self> {
        let mut aggregator = Self::default();
        aggregator.seed(snapshot)?;
        Ok(aggregator)
    }

    /// Seeds from `snapshot` and subscribes to `feed`.
    ///
    /// Only events published after this call are seen. Anything the feed
    /// carried between capturing `snapshot` and attaching is lost.
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn attach(snapshot: &RawDepth, feed: &DeltaFeed) -> Result<Self> {
        let mut aggregator = Self::new(snapshot)?;
        aggregator.deltas = Some(feed.subscribe());
        debug!(
            asks = aggregator.asks.len(),
            bids = aggregator.bids.len(),
            "aggregator attached"
        );
        Ok(aggregator)
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.deltas.is_some()
    }

    /// `true` once deltas were skipped since the last seed.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.skipped > 0
    }

    /// Replaces the book with `snapshot` and clears the stale state.
    ///
    /// Deltas still buffered from before this call are discarded; they
    /// predate the new snapshot.
    ///
    /// # Errors
    ///
    /// See [`new`](Self::new).
    pub fn resnapshot(&mut self, snapshot: &RawDepth) -> Result<()> {
        let mut discarded = 0;
        if let Some(rx) = self.deltas.as_mut() {
            loop {
                match rx.try_recv() {
                    Ok(_) => discarded += 1,
                    Err(TryRecvError::Lagged(_)) => {}
                    Err(TryRecvError::Empty | TryRecvError::Closed) => break,
                }
            }
        }
        self.asks.clear();
        self.bids.clear();
        self.skipped = 0;
        self.seed(snapshot)?;
        debug!(discarded, "aggregator resnapshotted");
        Ok(())
    }

    /// Adds `delta` to the volume at `level`, creating the level if it is
    /// unknown and removing it when the volume becomes exactly zero.
    ///
    /// # Errors
    ///
    /// Returns [`CoinbookError::Overflow`] if the volume leaves the
    /// representable range; the level is left unchanged.
    pub fn apply_delta(&mut self, level: Decimal, side: Side, delta: Decimal) -> Result<()> {
        let book = match side {
            Side::Ask => &mut self.asks,
            Side::Bid => &mut self.bids,
        };
        let current = book.get(&level).copied().unwrap_or(Decimal::ZERO);
        let volume = current.checked_add(delta).ok_or_else(|| {
            CoinbookError::Overflow(format!("volume {current} + {delta} at level {level}"))
        })?;
        if volume.is_zero() {
            book.remove(&level);
            return Ok(());
        }
        if volume.is_sign_negative() {
            warn!(%level, ?side, %volume, "negative volume at level");
        }
        book.insert(level, volume);
        Ok(())
    }

    /// # Errors
    ///
    /// See [`apply_delta`](Self::apply_delta).
    pub fn apply(&mut self, event: &DeltaEvent) -> Result<()> {
        self.apply_delta(event.price_level, event.side, event.volume_delta)
    }

    /// Applies every delta buffered so far, in arrival order, without
    /// waiting for more. Returns how many were applied.
    ///
    /// A lagged channel marks the aggregator stale and the remaining
    /// deltas are still applied.
    ///
    /// # Errors
    ///
    /// Returns [`CoinbookError::Overflow`] from [`apply_delta`](Self::apply_delta).
    /// Deltas after the failing one stay buffered.
    pub fn drain(&mut self) -> Result<usize> {
        let Some(mut rx) = self.deltas.take() else {
            return Ok(0);
        };
        let mut applied = 0;
        let mut attached = true;
        let mut outcome = Ok(());
        loop {
            match rx.try_recv() {
                Ok(event) => {
                    outcome = self.apply(&event);
                    if outcome.is_err() {
                        break;
                    }
                    applied += 1;
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    self.skipped += skipped;
                    warn!(skipped, total = self.skipped, "delta channel lagged, book is stale");
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Closed) => {
                    debug!("delta feed closed, aggregator detached");
                    attached = false;
                    break;
                }
            }
        }
        if attached {
            self.deltas = Some(rx);
        }
        if applied > 0 {
            debug!(applied, "drained deltas");
        }
        outcome.map(|()| applied)
    }

    /// Current view after draining pending deltas: asks ascending, bids
    /// descending. Calling it again with nothing pending returns the same
    /// view.
    ///
    /// # Errors
    ///
    /// Returns [`CoinbookError::FeedLagged`] while the aggregator is stale,
    /// and propagates [`drain`](Self::drain) failures.
    pub fn depth(&mut self) -> Result<RawDepth> {
        self.drain()?;
        if self.is_stale() {
            return Err(CoinbookError::FeedLagged {
                skipped: self.skipped,
            });
        }
        Ok(RawDepth {
            asks: levels(self.asks.iter()),
            bids: levels(self.bids.iter().rev()),
        })
    }

    /// Current view as typed orders of `market`.
    ///
    /// # Errors
    ///
    /// Propagates [`depth`](Self::depth) and [`Depth::from_raw`] failures,
    /// e.g. a level whose volume went negative.
    pub fn to_depth(&mut self, market: &Market) -> Result<Depth> {
        let raw = self.depth()?;
        Depth::from_raw(market, &raw, Utc::now())
    }

    /// Ask volumes by price level, without draining.
    #[must_use]
    pub fn asks(&self) -> &BTreeMap<Decimal, Decimal> {
        &self.asks
    }

    /// Bid volumes by price level, without draining.
    #[must_use]
    pub fn bids(&self) -> &BTreeMap<Decimal, Decimal> {
        &self.bids
    }

    fn seed(&mut self, snapshot: &RawDepth) -> Result<()> {
        for level in &snapshot.asks {
            self.apply_delta(level.price, Side::Ask, level.qty)?;
        }
        for level in &snapshot.bids {
            self.apply_delta(level.price, Side::Bid, level.qty)?;
        }
        Ok(())
    }
}

fn levels<'a>(iter: impl Iterator<Item = (&'a Decimal, &'a Decimal)>) -> Vec<PriceLevel> {
    iter.map(|(&price, &qty)| PriceLevel { price, qty }).collect()
}
