use futures_util::future::join_all;
use log::*;
use pix_payment_engine::{test_utils::prepare_env::seeded_database, InventoryError, InventoryManagement};

const PRODUCT: i64 = 11;
const START: i64 = 20;
const TAKERS: usize = 60;
const RETURNS: usize = 10;

enum Move {
    Take(Result<i64, InventoryError>),
    Return(Result<i64, InventoryError>),
}

/// Takes and returns race on one product. Stock never goes negative, and no more units are handed out than were on
/// hand plus what was returned.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_takes_and_returns() {
    let (db, _) = seeded_database(&[(PRODUCT, START)]).await;
    let tasks = (0..TAKERS + RETURNS).map(|i| {
        let db = db.clone();
        // Spread the returns through the burst
        let is_return = i % ((TAKERS + RETURNS) / RETURNS) == 0;
        tokio::spawn(async move {
            if is_return {
                Move::Return(db.increment_stock(PRODUCT, 1).await)
            } else {
                Move::Take(db.decrement_stock(PRODUCT, 1).await)
            }
        })
    });
    let moves = join_all(tasks).await.into_iter().map(|r| r.expect("Task panicked")).collect::<Vec<_>>();

    let mut taken = 0;
    let mut returned = 0;
    for m in &moves {
        match m {
            Move::Take(Ok(left)) | Move::Return(Ok(left)) => {
                assert!(*left >= 0, "Stock went negative: {left}");
                if matches!(m, Move::Take(_)) {
                    taken += 1;
                } else {
                    returned += 1;
                }
            },
            Move::Take(Err(InventoryError::InsufficientStock { available, .. })) => assert!(*available >= 0),
            Move::Take(Err(e)) | Move::Return(Err(e)) => panic!("Unexpected ledger error: {e}"),
        }
    }
    info!("🚀️ {taken} units taken, {returned} returned");
    assert_eq!(returned, RETURNS as i64);
    assert!(taken <= START + returned);
    // There were more takers than units, so everything available was handed out at some point
    assert!(taken >= START);
    let stock = db.fetch_inventory(PRODUCT).await.unwrap().unwrap();
    assert_eq!(stock.qty_on_hand, START + returned - taken);
}

#[tokio::test]
async fn ledger_errors() {
    let (db, _) = seeded_database(&[(PRODUCT, 2)]).await;
    assert!(matches!(db.increment_stock(999, 1).await, Err(InventoryError::ProductNotFound(999))));
    assert!(matches!(db.decrement_stock(999, 1).await, Err(InventoryError::ProductNotFound(999))));
    for qty in [0, -3] {
        assert!(matches!(db.decrement_stock(PRODUCT, qty).await, Err(InventoryError::InvalidQuantity(q)) if q == qty));
        assert!(matches!(db.increment_stock(PRODUCT, qty).await, Err(InventoryError::InvalidQuantity(q)) if q == qty));
    }
    assert!(matches!(
        db.decrement_stock(PRODUCT, 3).await,
        Err(InventoryError::InsufficientStock { requested: 3, available: 2, .. })
    ));
    assert_eq!(db.decrement_stock(PRODUCT, 2).await.unwrap(), 0);
    assert_eq!(db.increment_stock(PRODUCT, 5).await.unwrap(), 5);
    assert!(matches!(db.set_stock(PRODUCT, -1).await, Err(InventoryError::InvalidQuantity(-1))));
    assert_eq!(db.fetch_inventory(PRODUCT).await.unwrap().unwrap().qty_on_hand, 5);
}
