//! The flip protocol
//!
//! A turn is two flips. The first flip of a turn takes control of a card,
//! waiting in line if another player holds it. The second flip never waits:
//! if the card is held by anyone it fails at once, so two players can never
//! end up waiting on each other's first card. The next turn's first flip
//! cleans up after the previous one: a matched pair is removed, cards that
//! were turned up and let go of are turned back down.

use super::wait_queue::Waiter;
use super::{Board, BoardState};
use crate::core::{PlayerId, Position, TurnState};
use crate::{Result, ScrambleError};
use smallvec::smallvec;

impl Board {
    /// Flip the card at (`row`, `col`) for `player`
    ///
    /// Creates the player on first use. If the player holds no card this is
    /// the first flip of a new turn, which may suspend until a card held by
    /// someone else is let go of. If the player holds one card this is the
    /// second flip, which never suspends.
    ///
    /// # Errors
    /// - `InvalidIdentifier` if `player` is not `[A-Za-z0-9_]+`
    /// - `InvalidPosition` if (`row`, `col`) is off the board
    /// - `NoCardAtPosition` if the slot is empty, now or once a wait ends
    /// - `CardControlledByOther` if a second flip targets a held card
    ///
    /// A failed second flip still lets go of the player's first card.
    pub async fn flip(&self, player: &str, row: usize, col: usize) -> Result<()> {
        let id = PlayerId::new(player)?;
        let pos = Position::new(row, col);

        let turn = self.turn_lock(&id);
        let _turn = turn.lock_owned().await;

        let turn_state = {
            let mut state = self.lock();
            state.check_rep();
            state.grid.ensure_player(&id).turn_state()
        };

        let result = match turn_state {
            TurnState::HoldingFirst(first) => self.flip_second(&id, first, pos),
            TurnState::NoCards | TurnState::HoldingBoth(..) => self.flip_first(&id, pos).await,
        };

        self.lock().check_rep();
        result
    }

    /// Finish `player`'s turn without starting a new one
    ///
    /// Does the cleanup the next first flip would do, and also lets go of a
    /// lone first card (turning it face down). Players leaving the game call
    /// this so nobody is left waiting on cards they hold.
    pub async fn end_turn(&self, player: &str) -> Result<()> {
        let id = PlayerId::new(player)?;
        let turn = self.turn_lock(&id);
        let _turn = turn.lock_owned().await;

        let mut state = self.lock();
        state.check_rep();
        state.finish_previous_turn(&id);
        state.check_rep();
        Ok(())
    }

    async fn flip_first(&self, id: &PlayerId, pos: Position) -> Result<()> {
        {
            let mut state = self.lock();
            state.finish_previous_turn(id);
            state.grid.card_at(pos)?;
        }

        let mut resumed = false;
        loop {
            let waiter = {
                let mut state = self.lock();
                let holder = match state.grid.get(pos) {
                    Some(card) => card.controller().cloned(),
                    None => {
                        board_log!(state, Verbose, "wait", "{id} gave up on {pos}: card is gone");
                        return Err(ScrambleError::NoCardAtPosition(pos));
                    }
                };

                match holder {
                    Some(holder) if &holder != id => {
                        board_log!(state, Verbose, "wait", "{id} waits for {pos} held by {holder}");
                        if resumed {
                            state.wait_queues.enqueue_front(pos)
                        } else {
                            state.wait_queues.enqueue(pos)
                        }
                    }
                    _ => {
                        state.take_first(id, pos);
                        return Ok(());
                    }
                }
            };

            QueuedFlip::new(self, pos, waiter).woken().await;
            resumed = true;
        }
    }

    fn flip_second(&self, id: &PlayerId, first: Position, pos: Position) -> Result<()> {
        let mut state = self.lock();

        let target = match state.grid.card_at(pos) {
            Ok(card) if card.is_controlled() => Err(ScrambleError::CardControlledByOther(pos)),
            Ok(card) => Ok(card.turned_up()),
            Err(e) => Err(e),
        };
        let card = match target {
            Ok(card) => card,
            Err(e) => {
                board_log!(state, Normal, "flip", "{id} second flip at {pos} failed: {e}");
                state.relinquish_first(id, first);
                return Err(e);
            }
        };

        let matched = state
            .grid
            .get(first)
            .is_some_and(|first_card| first_card.value() == card.value());

        if matched {
            board_log!(state, Normal, "match", "{id} matched {first} and {pos} ({})", card.value());
            state.replace(pos, Some(card.controlled_by(id.clone())));
            state.grid.ensure_player(id).second_card = Some(pos);
        } else {
            board_log!(state, Normal, "flip", "{id} turned up {pos} ({}), no match", card.value());
            if state.grid.get(pos) != Some(&card) {
                state.replace(pos, Some(card));
            }
            state.relinquish_first(id, first);
            state.grid.ensure_player(id).relinquished.push(pos);
        }
        Ok(())
    }
}

/// A first flip suspended in `pos`'s wait queue
///
/// If the flip is dropped after being woken but before it could look at the
/// board again, the wake-up is passed on to the next waiter.
struct QueuedFlip<'a> {
    board: &'a Board,
    pos: Position,
    waiter: Option<Waiter>,
}

impl<'a> QueuedFlip<'a> {
    fn new(board: &'a Board, pos: Position, waiter: Waiter) -> Self {
        QueuedFlip {
            board,
            pos,
            waiter: Some(waiter),
        }
    }

    async fn woken(mut self) {
        if let Some(waiter) = self.waiter.as_mut() {
            // Err only if the board dropped the queue; either way, look again.
            let _ = waiter.await;
        }
        self.waiter = None;
    }
}

impl Drop for QueuedFlip<'_> {
    fn drop(&mut self) {
        let Some(mut waiter) = self.waiter.take() else {
            return;
        };
        if waiter.try_recv().is_ok() {
            let mut state = self.board.lock();
            board_log!(state, Verbose, "wait", "woken flip at {} dropped, passing it on", self.pos);
            state.wait_queues.signal_one(self.pos);
        }
    }
}

impl BoardState {
    /// Take control of the card at `pos` as `id`'s first card, turning it up
    fn take_first(&mut self, id: &PlayerId, pos: Position) {
        let Some(card) = self.grid.get(pos) else {
            return;
        };
        let taken = card.controlled_by(id.clone());
        board_log!(self, Normal, "flip", "{id} takes {pos} ({})", taken.value());
        self.replace(pos, Some(taken));
        self.grid.ensure_player(id).first_card = Some(pos);
    }

    /// Let go of `id`'s first card at `first`, leaving it face up
    ///
    /// The longest waiter for that card is woken.
    fn relinquish_first(&mut self, id: &PlayerId, first: Position) {
        if let Some(card) = self.grid.get(first).filter(|c| c.is_controlled_by(id)) {
            let released = card.released();
            self.replace(first, Some(released));
            self.wait_queues.signal_one(first);
        }

        let player = self.grid.ensure_player(id);
        player.clear_hand();
        player.relinquished = smallvec![first];
    }

    /// Clean up after `id`'s previous turn
    ///
    /// - a matched pair still on the board is removed, waking all its waiters
    /// - a lone first card is let go of and turned face down
    /// - cards let go of last turn are turned face down if still face up and
    ///   nobody has taken them since
    pub(crate) fn finish_previous_turn(&mut self, id: &PlayerId) {
        let (held, relinquished) = {
            let player = self.grid.ensure_player(id);
            let held = player.turn_state();
            player.clear_hand();
            (held, std::mem::take(&mut player.relinquished))
        };

        match held {
            TurnState::HoldingBoth(a, b) => {
                let still_match = match (self.grid.get(a), self.grid.get(b)) {
                    (Some(x), Some(y)) => x.value() == y.value(),
                    _ => false,
                };
                if still_match {
                    board_log!(self, Minimal, "match", "{id} removes pair at {a} and {b}");
                    self.replace(a, None);
                    self.replace(b, None);
                    self.wait_queues.signal_all(a);
                    self.wait_queues.signal_all(b);
                } else {
                    self.let_go_and_turn_down(id, a);
                    self.let_go_and_turn_down(id, b);
                }
            }
            TurnState::HoldingFirst(a) => self.let_go_and_turn_down(id, a),
            TurnState::NoCards => {}
        }

        for pos in relinquished {
            let Some(card) = self.grid.get(pos) else {
                continue;
            };
            if card.is_face_up() && !card.is_controlled() {
                let down = card.turned_down();
                board_log!(self, Verbose, "cleanup", "{id} turns {pos} back down");
                self.replace(pos, Some(down));
            }
        }
    }

    /// Turn a card `id` controls face down and wake its next waiter
    fn let_go_and_turn_down(&mut self, id: &PlayerId, pos: Position) {
        let Some(card) = self.grid.get(pos).filter(|c| c.is_controlled_by(id)) else {
            return;
        };
        let down = card.turned_down();
        board_log!(self, Verbose, "cleanup", "{id} lets go of {pos} face down");
        self.replace(pos, Some(down));
        self.wait_queues.signal_one(pos);
    }
}
