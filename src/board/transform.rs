//! Bulk value rewrite

use super::Board;
use crate::core::Card;
use crate::{Result, ScrambleError};
use std::future::Future;

impl Board {
    /// Rewrite every card value on the board with `rewrite`
    ///
    /// `rewrite` is called once per distinct value, in row-major order of first
    /// appearance, and may take its time (it is awaited with the board
    /// unlocked). Its result is then written to every card of that value in
    /// one step, keeping face state and controller, so no flip ever sees one
    /// card of a group rewritten and another not. Two cards with equal values
    /// before the call have equal values after it.
    ///
    /// Groups are not rewritten together: flips and other transforms can run
    /// between one group and the next.
    ///
    /// One change notification is sent at the end if any value changed.
    ///
    /// # Errors
    /// `InvalidCardValue` if `rewrite` returns an empty or whitespace-containing
    /// value, or whatever `rewrite` itself fails with. Groups rewritten before
    /// the failure stay rewritten.
    pub async fn transform<F, Fut>(&self, mut rewrite: F) -> Result<()>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<String>>,
    {
        let groups = {
            let state = self.lock();
            state.check_rep();
            state.grid.value_groups()
        };

        let mut rewritten = 0;
        let mut outcome = Ok(());

        for (old, positions) in groups {
            let new = match rewrite(old.clone()).await {
                Ok(new) if Card::is_valid_value(&new) => new,
                Ok(new) => {
                    outcome = Err(ScrambleError::InvalidCardValue(new));
                    break;
                }
                Err(e) => {
                    outcome = Err(e);
                    break;
                }
            };
            if new == old {
                continue;
            }

            let mut state = self.lock();
            let count = state.grid.rewrite_value(&positions, &old, &new);
            board_log!(state, Minimal, "transform", "rewrote {count} {old} -> {new}");
            rewritten += count;
            state.check_rep();
        }

        if rewritten > 0 {
            self.lock().notifier.fire_all();
        }
        outcome
    }
}
