use crate::PlayerId;
use crate::timer::Deadline;
use dealroom_core::Money;
use std::collections::HashMap;
use std::collections::HashSet;

/// The phase label surfaced on the wire. Internally `Phase::Lobby` covers
/// both `waiting` and `selection` — see `Room::phase_label`, which derives
/// the split from contestant count rather than tracking it as distinct
/// engine states (there is no transition event that separately triggers
/// "selection"; it's purely how many contestants have joined so far).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseLabel {
    Waiting,
    Selection,
    Playing,
    Offer,
    Finished,
}

/// Turn-rotation sub-state, present only while `Phase::Playing`. The
/// rotation basis itself (`turn_order`/`current_turn_index`) lives on `Room`
/// since it must survive the `Offer` phase between rounds — only the
/// "someone is on the clock right now" part is phase-scoped.
#[derive(Debug, Clone, Default)]
pub struct PlayingState {
    pub current_turn_player_id: Option<PlayerId>,
    pub turn_deadline: Option<Deadline>,
}

/// Offer sub-state, present only while `Phase::Offer`.
#[derive(Debug, Clone)]
pub struct OfferState {
    pub current_offer: Money,
    pub offer_deadline: Deadline,
    pub eligible_player_ids: HashSet<PlayerId>,
    pub responses: HashMap<PlayerId, bool>,
}

/// Internal engine phase. Carries only the state meaningful to that phase;
/// round-scoped data (`current_round`, `boxes_opened_this_round`) lives
/// directly on `Room` since it's needed across the playing/offer boundary.
#[derive(Debug, Clone)]
pub enum Phase {
    Lobby,
    Playing(PlayingState),
    Offer(OfferState),
    Finished,
}

impl Phase {
    pub fn is_lobby(&self) -> bool {
        matches!(self, Phase::Lobby)
    }
    pub fn is_playing(&self) -> bool {
        matches!(self, Phase::Playing(_))
    }
    pub fn is_offer(&self) -> bool {
        matches!(self, Phase::Offer(_))
    }
    pub fn is_finished(&self) -> bool {
        matches!(self, Phase::Finished)
    }
    pub fn playing(&self) -> Option<&PlayingState> {
        match self {
            Phase::Playing(s) => Some(s),
            _ => None,
        }
    }
    pub fn playing_mut(&mut self) -> Option<&mut PlayingState> {
        match self {
            Phase::Playing(s) => Some(s),
            _ => None,
        }
    }
    pub fn offer(&self) -> Option<&OfferState> {
        match self {
            Phase::Offer(s) => Some(s),
            _ => None,
        }
    }
    pub fn offer_mut(&mut self) -> Option<&mut OfferState> {
        match self {
            Phase::Offer(s) => Some(s),
            _ => None,
        }
    }
}
