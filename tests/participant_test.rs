//! Order management through an [`ActiveParticipant`].

mod common;

use std::sync::Mutex;

use rust_decimal_macros::dec;

use coinbook::market::{ActiveParticipant, Order};
use coinbook::money::currency::{BTC, USD};
use coinbook::{CoinbookError, ParticipantError, Result};

/// In-memory exchange account.
struct PaperAccount {
    authorized: bool,
    open: Mutex<Vec<Order>>,
    next_id: Mutex<u32>,
}

impl PaperAccount {
    fn new(authorized: bool) -> Self {
        Self {
            authorized,
            open: Mutex::new(Vec::new()),
            next_id: Mutex::new(1),
        }
    }
}

impl ActiveParticipant for PaperAccount {
    async fn place_order(&self, order: Order) -> Result<Order> {
        if !self.authorized {
            return Err(ParticipantError::NotAuthorized("trading disabled for key".into()).into());
        }
        let id = {
            let mut next = self.next_id.lock().unwrap();
            let id = format!("paper-{next}");
            *next += 1;
            id
        };
        let placed = order.with_id(&id);
        self.open.lock().unwrap().push(placed.clone());
        Ok(placed)
    }

    async fn cancel_order(&self, order: &Order) -> Result<()> {
        let mut open = self.open.lock().unwrap();
        let position = open.iter().position(|o| o.id() == order.id());
        match position {
            Some(index) => {
                open.remove(index);
                Ok(())
            }
            None => Err(ParticipantError::AlreadyClosed {
                order_id: order.id().unwrap_or_default().to_string(),
            }
            .into()),
        }
    }

    async fn list_open_orders(&self) -> Result<Vec<Order>> {
        Ok(self.open.lock().unwrap().clone())
    }
}

fn sample_bid() -> Order {
    let market = common::btc_usd();
    Order::bid(&market, BTC.amount(dec!(0.5)), market.rate(dec!(99)).unwrap())
}

#[tokio::test]
async fn test_place_and_cancel_order() {
    let account = PaperAccount::new(true);

    let placed = account.place_order(sample_bid()).await.expect("place");
    assert_eq!(placed.id(), Some("paper-1"));
    assert_eq!(account.list_open_orders().await.unwrap(), vec![placed.clone()]);

    account.cancel_order(&placed).await.expect("cancel");
    assert!(account.list_open_orders().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_cancel_twice_reports_already_closed() {
    let account = PaperAccount::new(true);
    let placed = account.place_order(sample_bid()).await.unwrap();
    account.cancel_order(&placed).await.unwrap();

    let err = account.cancel_order(&placed).await.unwrap_err();
    match err {
        CoinbookError::Participant(ParticipantError::AlreadyClosed { order_id }) => {
            assert_eq!(order_id, "paper-1");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_unauthorized_placement_propagates() {
    let account = PaperAccount::new(false);
    let err = account.place_order(sample_bid()).await.unwrap_err();

    assert!(matches!(
        err,
        CoinbookError::Participant(ParticipantError::NotAuthorized(_))
    ));
    assert_eq!(err.to_string(), "not authorized: trading disabled for key");
}

#[test]
fn test_expense_of_limit_order() {
    let market = common::btc_usd();
    let bid = Order::bid(&market, USD.amount(dec!(198)), market.rate(dec!(99)).unwrap());
    assert_eq!(bid.expense().unwrap(), BTC.amount(dec!(2)));
    assert_eq!(sample_bid().expense().unwrap(), USD.amount(dec!(49.5)));
    let buy = Order::market_buy(&market, USD.amount(dec!(10)));
    assert!(matches!(buy.expense(), Err(CoinbookError::InvalidOrder(_))));
}
