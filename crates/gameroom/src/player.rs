use dealroom_core::Money;
use dealroom_core::Round;
use dealroom_core::Unique;
use dealroom_core::ID;

/// A connection-transport identifier, assigned and owned by the transport
/// layer (see `dealroom-hosting`). Opaque here.
pub type ConnectionId = String;

/// A player's stable identity. Survives reconnects and transport churn.
pub type PlayerId = ID<Player>;

/// Contestant-only state. Spectators carry none of this.
#[derive(Debug, Clone)]
pub struct ContestantState {
    pub box_number: Option<u8>,
    pub has_dealt: bool,
    pub deal_amount: Option<Money>,
    /// Snapshot of this contestant's own box value, filled in at game start
    /// so it can be revealed on deal-acceptance or last-standing finalisation
    /// without re-deriving it from the box table.
    pub box_value: Option<Money>,
    pub round_dealt: Option<Round>,
    pub is_last_standing: bool,
    pub timeout_count: u32,
    pub points: i64,
}

impl Default for ContestantState {
    fn default() -> Self {
        Self {
            box_number: None,
            has_dealt: false,
            deal_amount: None,
            box_value: None,
            round_dealt: None,
            is_last_standing: false,
            timeout_count: 0,
            points: 0,
        }
    }
}

/// Tagged player variant: a contestant plays, a spectator only watches.
/// Eligibility is a capability predicate on `Player`, not a type hierarchy.
#[derive(Debug, Clone)]
pub enum Role {
    Contestant(ContestantState),
    Spectator,
}

/// A seated participant in a room — contestant or spectator.
#[derive(Debug, Clone)]
pub struct Player {
    id: PlayerId,
    connection_id: ConnectionId,
    display_name: String,
    is_host: bool,
    role: Role,
    is_ready: bool,
    is_connected: bool,
}

impl Player {
    pub fn new_contestant(connection_id: ConnectionId, display_name: String, is_host: bool) -> Self {
        Self {
            id: PlayerId::default(),
            connection_id,
            display_name,
            is_host,
            role: Role::Contestant(ContestantState::default()),
            is_ready: false,
            is_connected: true,
        }
    }
    /// Spectators are inert to contestant checks: always ready, never
    /// eligible to deal, never blocking game start.
    pub fn new_spectator(connection_id: ConnectionId, display_name: String) -> Self {
        Self {
            id: PlayerId::default(),
            connection_id,
            display_name,
            is_host: false,
            role: Role::Spectator,
            is_ready: true,
            is_connected: true,
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }
    pub fn connection_id(&self) -> &ConnectionId {
        &self.connection_id
    }
    pub fn set_connection_id(&mut self, connection_id: ConnectionId) {
        self.connection_id = connection_id;
    }
    pub fn display_name(&self) -> &str {
        &self.display_name
    }
    pub fn is_host(&self) -> bool {
        self.is_host
    }
    pub fn is_ready(&self) -> bool {
        self.is_ready
    }
    pub fn set_ready(&mut self, ready: bool) {
        self.is_ready = ready;
    }
    pub fn is_connected(&self) -> bool {
        self.is_connected
    }
    pub fn set_connected(&mut self, connected: bool) {
        self.is_connected = connected;
    }
    pub fn role(&self) -> &Role {
        &self.role
    }
    pub fn is_contestant(&self) -> bool {
        matches!(self.role, Role::Contestant(_))
    }
    pub fn is_spectator(&self) -> bool {
        matches!(self.role, Role::Spectator)
    }
    pub fn contestant(&self) -> Option<&ContestantState> {
        match &self.role {
            Role::Contestant(c) => Some(c),
            Role::Spectator => None,
        }
    }
    pub fn contestant_mut(&mut self) -> Option<&mut ContestantState> {
        match &mut self.role {
            Role::Contestant(c) => Some(c),
            Role::Spectator => None,
        }
    }

    /// An active contestant: seated, has picked a box, hasn't dealt yet.
    /// Spectators are never active (`hasDealt` is forced `true` for them).
    pub fn is_active(&self) -> bool {
        self.contestant()
            .is_some_and(|c| c.box_number.is_some() && !c.has_dealt)
    }
    pub fn has_dealt(&self) -> bool {
        match &self.role {
            Role::Contestant(c) => c.has_dealt,
            Role::Spectator => true,
        }
    }
    pub fn can_open_box(&self) -> bool {
        self.is_active()
    }
    pub fn can_chat(&self) -> bool {
        self.is_contestant()
    }
    pub fn can_start_game(&self) -> bool {
        self.is_host
    }
}

impl Unique for Player {
    fn id(&self) -> PlayerId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spectators_are_inert() {
        let spectator = Player::new_spectator("c1".into(), "Watcher".into());
        assert!(spectator.is_ready());
        assert!(spectator.has_dealt());
        assert!(!spectator.can_open_box());
        assert!(!spectator.can_chat());
        assert!(!spectator.is_active());
    }

    #[test]
    fn contestant_not_active_until_box_chosen() {
        let contestant = Player::new_contestant("c1".into(), "Alice".into(), true);
        assert!(!contestant.is_active());
        assert!(contestant.can_chat());
        assert!(!contestant.has_dealt());
    }

    #[test]
    fn contestant_active_once_box_picked() {
        let mut contestant = Player::new_contestant("c1".into(), "Alice".into(), false);
        contestant.contestant_mut().unwrap().box_number = Some(3);
        assert!(contestant.is_active());
        assert!(contestant.can_open_box());
    }

    #[test]
    fn dealt_contestant_is_no_longer_active() {
        let mut contestant = Player::new_contestant("c1".into(), "Alice".into(), false);
        contestant.contestant_mut().unwrap().box_number = Some(3);
        contestant.contestant_mut().unwrap().has_dealt = true;
        assert!(!contestant.is_active());
        assert!(contestant.has_dealt());
    }
}
