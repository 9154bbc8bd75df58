//! Streaming depth deltas.
//!
//! A transport adapter owns the socket and turns its frames into
//! [`DeltaEvent`]s. [`forward_frames`] pumps them into a [`DeltaFeed`], a
//! bounded fan-out channel, and every attached
//! [`DepthAggregator`](aggregator::DepthAggregator) drains its own receiver
//! whenever it is asked for the current depth.
//!
//! Events published while no aggregator is attached are dropped. An
//! aggregator attaches at the moment its snapshot is taken, so deltas the
//! exchange emitted between the snapshot request and the attach are lost.
//! Callers that cannot tolerate this must re-snapshot.

pub mod aggregator;

use futures_util::{Stream, StreamExt};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use crate::Result;
use crate::config::{FeedConfig, MAX_FEED_CAPACITY};

pub use aggregator::DepthAggregator;

/// Side of the book a delta applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Ask,
    Bid,
}

/// Relative change of the volume resting at one price level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaEvent {
    pub price_level: Decimal,
    #[serde(rename = "type")]
    pub side: Side,
    pub volume_delta: Decimal,
}

impl DeltaEvent {
    #[must_use]
    pub fn new(price_level: Decimal, side: Side, volume_delta: Decimal) -> Self {
        Self {
            price_level,
            side,
            volume_delta,
        }
    }

    /// Parses a transport frame holding one event or an array of events.
    ///
    /// # Errors
    ///
    /// Returns [`CoinbookError::Json`](crate::CoinbookError::Json) if the
    /// frame is not valid JSON of either shape.
    pub fn parse_frame(text: &str) -> Result<Vec<DeltaEvent>> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Frame {
            Many(Vec<DeltaEvent>),
            One(DeltaEvent),
        }

        Ok(match serde_json::from_str(text)? {
            Frame::Many(events) => events,
            Frame::One(event) => vec![event],
        })
    }
}

/// Bounded fan-out channel of depth deltas.
///
/// Cloning yields another handle to the same channel. Each attached
/// aggregator holds its own receiver; a receiver that falls more than the
/// channel capacity behind loses the oldest events.
#[derive(Debug, Clone)]
pub struct DeltaFeed {
    tx: broadcast::Sender<DeltaEvent>,
}

impl DeltaFeed {
    #[must_use]
    pub fn new(config: &FeedConfig) -> Self {
        Self::with_capacity(config.capacity)
    }

    /// Creates a feed buffering up to `capacity` events per receiver,
    /// clamped to `1..=MAX_FEED_CAPACITY`.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.clamp(1, MAX_FEED_CAPACITY));
        Self { tx }
    }

    /// Publishes one event, returning how many receivers will see it.
    pub fn publish(&self, event: DeltaEvent) -> usize {
        match self.tx.send(event) {
            Ok(receivers) => receivers,
            Err(_) => {
                debug!(
                    price_level = %event.price_level,
                    side = ?event.side,
                    "no aggregator attached, delta dropped"
                );
                0
            }
        }
    }

    /// Number of currently attached receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<DeltaEvent> {
        self.tx.subscribe()
    }
}

/// Forwards every event of `frames` into `feed` until the stream ends.
///
/// Returns the number of events forwarded, including those dropped for
/// lack of an attached aggregator.
pub async fn forward_frames<S>(frames: S, feed: &DeltaFeed) -> usize
where
    S: Stream<Item = DeltaEvent>,
{
    let mut frames = std::pin::pin!(frames);
    let mut forwarded = 0;
    while let Some(event) = frames.next().await {
        feed.publish(event);
        forwarded += 1;
    }
    debug!(forwarded, "delta stream ended");
    forwarded
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn parse_single_event() {
        let events =
            DeltaEvent::parse_frame(r#"{"price_level":"100.5","type":"ask","volume_delta":"-2"}"#)
                .unwrap();
        assert_eq!(
            events,
            vec![DeltaEvent::new(dec!(100.5), Side::Ask, dec!(-2))]
        );
    }

    #[test]
    fn parse_event_array() {
        let events = DeltaEvent::parse_frame(
            r#"[{"price_level":"99","type":"bid","volume_delta":"1"},
                {"price_level":"101","type":"ask","volume_delta":"3"}]"#,
        )
        .unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].side, Side::Bid);
        assert_eq!(events[1].price_level, dec!(101));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(
            DeltaEvent::parse_frame(r#"{"price_level":"1","type":"middle"}"#),
            Err(crate::CoinbookError::Json(_))
        ));
    }

    #[test]
    fn publish_without_receivers_drops() {
        let feed = DeltaFeed::with_capacity(4);
        assert_eq!(feed.receiver_count(), 0);
        assert_eq!(feed.publish(DeltaEvent::new(dec!(1), Side::Bid, dec!(1))), 0);
    }

    #[test]
    fn zero_capacity_is_raised() {
        let feed = DeltaFeed::with_capacity(0);
        let mut rx = feed.subscribe();
        assert_eq!(feed.publish(DeltaEvent::new(dec!(1), Side::Bid, dec!(1))), 1);
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn oversized_capacity_is_clamped() {
        let feed = DeltaFeed::with_capacity(usize::MAX);
        let mut rx = feed.subscribe();
        assert_eq!(feed.publish(DeltaEvent::new(dec!(1), Side::Ask, dec!(1))), 1);
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn forward_frames_publishes_in_order() {
        let feed = DeltaFeed::with_capacity(8);
        let mut rx = feed.subscribe();
        let events = vec![
            DeltaEvent::new(dec!(100), Side::Ask, dec!(1)),
            DeltaEvent::new(dec!(100), Side::Ask, dec!(2)),
            DeltaEvent::new(dec!(90), Side::Bid, dec!(3)),
        ];

        let forwarded = tokio_test::block_on(forward_frames(
            futures_util::stream::iter(events.clone()),
            &feed,
        ));
        assert_eq!(forwarded, 3);
        for expected in events {
            assert_eq!(rx.try_recv().unwrap(), expected);
        }
    }
}
