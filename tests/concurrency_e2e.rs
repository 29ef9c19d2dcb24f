//! Concurrency tests for the shared board
//!
//! Waiting order, change notification, and rewrites interleaving with flips.

use memory_scramble::{
    sim::{run_simulation, SimulationConfig},
    Board, Result, ScrambleError,
};
use rustc_hash::FxHashMap;
use similar_asserts::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

async fn wait_for_waiters(board: &Board, row: usize, col: usize, count: usize) {
    let pos = (row, col).into();
    for _ in 0..1000 {
        if board.waiters(pos) == count {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("expected {count} waiters at {pos}, found {}", board.waiters(pos));
}

async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

/// Whoever started waiting first gets the card first
#[tokio::test]
async fn test_waiters_served_in_arrival_order() -> Result<()> {
    let board = Arc::new(Board::new(2, 2, ["A", "A", "B", "C"])?);
    board.flip("p1", 0, 0).await?;

    let b = Arc::clone(&board);
    let p2 = tokio::spawn(async move { b.flip("p2", 0, 0).await });
    wait_for_waiters(&board, 0, 0, 1).await;

    let b = Arc::clone(&board);
    let p3 = tokio::spawn(async move { b.flip("p3", 0, 0).await });
    wait_for_waiters(&board, 0, 0, 2).await;

    // p1 mismatches, letting go of (0,0): p2 is first in line
    board.flip("p1", 1, 0).await?;
    p2.await??;
    settle().await;
    assert!(!p3.is_finished());
    assert_eq!(board.waiters((0, 0).into()), 1);
    assert!(board.look("p2").starts_with("2x2\nmy A\n"));

    // p2 mismatches too: now p3's turn
    board.flip("p2", 1, 1).await?;
    p3.await??;
    assert!(board.look("p3").starts_with("2x2\nmy A\n"));
    board.check_rep();
    Ok(())
}

/// A waiter whose flip was dropped does not swallow the wake-up
#[tokio::test]
async fn test_abandoned_waiter_is_skipped() -> Result<()> {
    let board = Arc::new(Board::new(1, 3, ["A", "A", "B"])?);
    board.flip("p1", 0, 0).await?;

    let b = Arc::clone(&board);
    let quitter = tokio::spawn(async move { b.flip("quitter", 0, 0).await });
    wait_for_waiters(&board, 0, 0, 1).await;

    let b = Arc::clone(&board);
    let patient = tokio::spawn(async move { b.flip("patient", 0, 0).await });
    wait_for_waiters(&board, 0, 0, 2).await;

    quitter.abort();
    let _ = quitter.await;
    assert_eq!(board.waiters((0, 0).into()), 1);

    board.flip("p1", 0, 2).await?;
    tokio::time::timeout(Duration::from_secs(1), patient)
        .await
        .expect("patient waiter must be woken")??;
    assert!(board.look("patient").starts_with("1x3\nmy A\n"));
    Ok(())
}

/// A waiter cancelled after being woken passes the wake-up on
#[tokio::test]
async fn test_woken_then_cancelled_waiter_passes_wake_on() -> Result<()> {
    let board = Arc::new(Board::new(1, 3, ["A", "A", "B"])?);
    board.flip("p1", 0, 0).await?;

    let b = Arc::clone(&board);
    let w1 = tokio::spawn(async move { b.flip("w1", 0, 0).await });
    wait_for_waiters(&board, 0, 0, 1).await;

    let b = Arc::clone(&board);
    let w2 = tokio::spawn(async move { b.flip("w2", 0, 0).await });
    wait_for_waiters(&board, 0, 0, 2).await;

    // p1 mismatches, which wakes w1; w1 is cancelled before it ever runs
    board.flip("p1", 0, 2).await?;
    w1.abort();
    assert!(w1.await.unwrap_err().is_cancelled());
    assert_eq!(board.look("w2"), "1x3\nup A\ndown\nup B\n");

    tokio::time::timeout(Duration::from_secs(1), w2)
        .await
        .expect("next waiter must inherit the wake-up")??;
    assert!(board.look("w2").starts_with("1x3\nmy A\n"));
    board.check_rep();
    Ok(())
}

/// A woken waiter that loses the card to a fresh flip keeps its place
#[tokio::test]
async fn test_woken_waiter_outrun_by_fresh_flip_keeps_place() -> Result<()> {
    let board = Arc::new(Board::new(2, 2, ["A", "A", "B", "C"])?);
    board.flip("p1", 0, 0).await?;

    let b = Arc::clone(&board);
    let p2 = tokio::spawn(async move { b.flip("p2", 0, 0).await });
    wait_for_waiters(&board, 0, 0, 1).await;

    let b = Arc::clone(&board);
    let p3 = tokio::spawn(async move { b.flip("p3", 0, 0).await });
    wait_for_waiters(&board, 0, 0, 2).await;

    // p1 lets go and wakes p2, but p4 takes the card before p2 runs
    board.flip("p1", 1, 0).await?;
    board.flip("p4", 0, 0).await?;
    assert!(board.look("p4").starts_with("2x2\nmy A\n"));

    // p2 goes back in line, ahead of p3
    wait_for_waiters(&board, 0, 0, 2).await;
    assert!(!p2.is_finished());
    assert!(!p3.is_finished());

    board.flip("p4", 1, 1).await?;
    p2.await??;
    settle().await;
    assert!(!p3.is_finished());
    assert!(board.look("p2").starts_with("2x2\nmy A\n"));

    board.flip("p2", 1, 1).await?;
    p3.await??;
    assert!(board.look("p3").starts_with("2x2\nmy A\n"));
    board.check_rep();
    Ok(())
}

/// Removing a pair wakes every waiter on it, and they all fail
#[tokio::test]
async fn test_removal_fails_all_waiters() -> Result<()> {
    let board = Arc::new(Board::new(2, 2, ["A", "A", "B", "B"])?);
    board.flip("p1", 0, 0).await?;
    board.flip("p1", 0, 1).await?;

    let mut waiting = Vec::new();
    for (name, col) in [("p2", 0), ("p3", 0), ("p4", 1)] {
        let b = Arc::clone(&board);
        waiting.push(tokio::spawn(async move { b.flip(name, 0, col).await }));
    }
    wait_for_waiters(&board, 0, 0, 2).await;
    wait_for_waiters(&board, 0, 1, 1).await;

    board.flip("p1", 1, 1).await?;

    for handle in waiting {
        let err = handle.await?.unwrap_err();
        assert!(matches!(err, ScrambleError::NoCardAtPosition(_)));
    }
    assert_eq!(board.look("p1"), "2x2\nnone\nnone\ndown\nmy B\n");
    board.check_rep();
    Ok(())
}

/// Two players each holding a first card cannot deadlock on each other
#[tokio::test]
async fn test_crossed_second_flips_do_not_deadlock() -> Result<()> {
    let board = Arc::new(Board::new(1, 2, ["A", "B"])?);
    board.flip("p1", 0, 0).await?;
    board.flip("p2", 0, 1).await?;

    let b = Arc::clone(&board);
    let p1 = tokio::spawn(async move { b.flip("p1", 0, 1).await });
    let b = Arc::clone(&board);
    let p2 = tokio::spawn(async move { b.flip("p2", 0, 0).await });

    let (r1, r2) = tokio::time::timeout(Duration::from_secs(1), async { (p1.await, p2.await) })
        .await
        .expect("crossed second flips must not wait");

    // Whoever ran first failed on the other's card; the other either failed
    // too or found the card already let go of.
    let failures = [r1?, r2?].iter().filter(|r| r.is_err()).count();
    assert!(failures >= 1);
    board.check_rep();
    Ok(())
}

/// Every kind of mutation wakes change listeners
#[tokio::test]
async fn test_changes_wake_listeners() -> Result<()> {
    let board = Board::new(2, 2, ["a", "a", "b", "b"])?;

    let listener = board.subscribe();
    board.flip("p1", 0, 0).await?;
    tokio::time::timeout(Duration::from_secs(1), listener)
        .await
        .expect("turning a card up is a change");

    let listener = board.subscribe();
    board.flip("p1", 0, 1).await?;
    tokio::time::timeout(Duration::from_secs(1), listener)
        .await
        .expect("a match is a change");

    let listener = board.subscribe();
    board.flip("p1", 1, 0).await?;
    tokio::time::timeout(Duration::from_secs(1), listener)
        .await
        .expect("removing a pair is a change");

    let listener = board.subscribe();
    board
        .transform(|v| async move { Ok(v.to_uppercase()) })
        .await?;
    tokio::time::timeout(Duration::from_secs(1), listener)
        .await
        .expect("a rewrite is a change");
    Ok(())
}

/// An identity rewrite is not a change
#[tokio::test]
async fn test_identity_transform_is_quiet() -> Result<()> {
    let board = Board::new(1, 2, ["a", "a"])?;
    let listener = board.subscribe();
    board.transform(|v| async move { Ok(v) }).await?;

    let waited = tokio::time::timeout(Duration::from_millis(50), listener).await;
    assert!(waited.is_err(), "nothing changed, listener must still be waiting");
    Ok(())
}

/// `watch` returns the view after the next change
#[tokio::test]
async fn test_watch_returns_new_view() -> Result<()> {
    let board = Arc::new(Board::new(1, 2, ["a", "a"])?);

    let b = Arc::clone(&board);
    let watcher = tokio::spawn(async move { b.watch("p2").await });
    settle().await;
    assert!(!watcher.is_finished());

    board.flip("p1", 0, 1).await?;
    let view = watcher.await?;
    assert_eq!(view, "1x2\ndown\nup a\n");
    Ok(())
}

/// Groups are rewritten one at a time: a flip can run between two groups
/// and see the first rewritten but not yet the second.
#[tokio::test]
async fn test_transform_groups_are_not_atomic_together() -> Result<()> {
    let board = Arc::new(Board::new(2, 2, ["a", "a", "b", "b"])?);
    let (release_b, gate) = oneshot::channel::<()>();

    let b = Arc::clone(&board);
    let transform = tokio::spawn(async move {
        let mut gate = Some(gate);
        b.transform(move |v| {
            let wait = if v == "b" { gate.take() } else { None };
            async move {
                if let Some(wait) = wait {
                    let _ = wait.await;
                }
                Ok(v.to_uppercase())
            }
        })
        .await
    });
    settle().await;
    assert!(!transform.is_finished());

    // Group "a" is done, group "b" is still being computed
    board.flip("p1", 0, 0).await?;
    board.flip("p1", 1, 0).await?;
    assert_eq!(board.look("p1"), "2x2\nup A\ndown\nup b\ndown\n");

    release_b.send(()).ok();
    transform.await??;
    assert_eq!(board.look("p1"), "2x2\nup A\ndown\nup B\ndown\n");
    board.check_rep();
    Ok(())
}

/// Concurrent play and repeated rewrites keep equal cards equal: every
/// value on the board always appears an even number of times.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_rewrites_preserve_pairs_under_load() -> Result<()> {
    let values = ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l"];
    let cards: Vec<_> = values.iter().chain(values.iter()).copied().collect();
    let board = Arc::new(Board::new(4, 6, cards)?);

    let config = SimulationConfig {
        players: 5,
        turns: 40,
        seed: Some(99),
        max_delay_ms: 1,
    };
    let b = Arc::clone(&board);
    let sim = tokio::spawn(async move { run_simulation(b, &config).await });

    for _ in 0..20 {
        board
            .transform(|v| async move {
                tokio::task::yield_now().await;
                Ok(if v.chars().all(|c| c.is_lowercase()) {
                    v.to_uppercase()
                } else {
                    v.to_lowercase()
                })
            })
            .await?;
        assert_pairs_even(&board);
    }

    sim.await??;
    assert_pairs_even(&board);
    board.check_rep();
    Ok(())
}

fn assert_pairs_even(board: &Board) {
    let mut counts: FxHashMap<String, usize> = FxHashMap::default();
    for (_, card) in board.cards() {
        *counts.entry(card.value().to_string()).or_default() += 1;
    }
    assert!(
        counts.values().all(|n| n % 2 == 0),
        "a value group was split: {counts:?}"
    );
}
