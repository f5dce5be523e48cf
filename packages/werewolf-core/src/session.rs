use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeSet;

use crate::error::{ConfigError, GameError};
use crate::models::{
    ActionReceipt, Death, GameConfig, GameEvent, GameState, NightActionPayload, NightPhase, Phase,
    Player, PlayerId, Role,
};
use crate::view::{self, ClientView};
use crate::{hunter, night, scheduler, vote};

/// One game in one room: the state plus the configuration it was started
/// with. Every mutation takes the current time from the caller.
#[derive(Debug, Clone)]
pub struct GameSession {
    state: GameState,
    config: GameConfig,
}

impl GameSession {
    /// Deals the configured roles at random and starts the first night.
    pub fn initialize_game(
        room_id: String,
        players: Vec<(PlayerId, String)>,
        config: GameConfig,
        now: DateTime<Utc>,
    ) -> Result<Self, GameError> {
        Self::initialize_game_with_rng(room_id, players, config, &mut rand::thread_rng(), now)
    }

    pub fn initialize_game_with_rng<R: Rng + ?Sized>(
        room_id: String,
        players: Vec<(PlayerId, String)>,
        config: GameConfig,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<Self, GameError> {
        config.validate(players.len())?;
        let mut deck = config.role_deck();
        deck.shuffle(rng);
        Self::initialize_game_with_roles(room_id, players, deck, config, now)
    }

    /// Starts a game with a fixed deal: `roles[i]` goes to `players[i]`.
    pub fn initialize_game_with_roles(
        room_id: String,
        players: Vec<(PlayerId, String)>,
        roles: Vec<Role>,
        config: GameConfig,
        now: DateTime<Utc>,
    ) -> Result<Self, GameError> {
        config.validate(players.len())?;
        if roles.len() != players.len() {
            return Err(ConfigError::RoleCountMismatch {
                players: players.len(),
                roles: roles.len(),
            }
            .into());
        }
        let mut sorted = roles.clone();
        sorted.sort();
        if sorted != config.role_deck() {
            return Err(ConfigError::DealMismatch.into());
        }

        let mut seen = BTreeSet::new();
        let mut seated = Vec::with_capacity(players.len());
        for ((id, name), role) in players.into_iter().zip(roles) {
            if !seen.insert(id) {
                return Err(ConfigError::DuplicatePlayer(id).into());
            }
            let mut player = Player::new(id, name);
            player.assign_role(role);
            seated.push(player);
        }

        let mut state = GameState::new(room_id, seated);
        log::info!(
            "room {}: starting a game for {} players",
            state.room_id,
            state.players.len()
        );
        let roster: Vec<(PlayerId, Role)> = state
            .players
            .iter()
            .filter_map(|p| p.role.map(|role| (p.id, role)))
            .collect();
        for (player_id, role) in roster {
            state.log_private(player_id, format!("You are the {}.", role), now);
        }
        scheduler::start_night(&mut state, &config, now);
        Ok(GameSession { state, config })
    }

    /// Validates and records a night action. When the last required actor of
    /// the sub-phase has acted the session advances immediately.
    pub fn submit_night_action(
        &mut self,
        player_id: PlayerId,
        phase: NightPhase,
        payload: &NightActionPayload,
        now: DateTime<Utc>,
    ) -> Result<ActionReceipt, GameError> {
        let receipt = night::submit(&mut self.state, &self.config, player_id, phase, payload, now)?;
        if night::phase_complete(&self.state, phase) {
            scheduler::advance(&mut self.state, &self.config, now)?;
        }
        Ok(receipt)
    }

    /// `None` withdraws the player's current vote.
    pub fn cast_vote(&mut self, player_id: PlayerId, target_id: Option<PlayerId>) -> Result<(), GameError> {
        vote::cast_vote(&mut self.state, player_id, target_id)?;
        Ok(())
    }

    pub fn hunter_shoot(
        &mut self,
        hunter_id: PlayerId,
        target_id: PlayerId,
        now: DateTime<Utc>,
    ) -> Result<Vec<Death>, GameError> {
        hunter::shoot(&mut self.state, &self.config, hunter_id, target_id, now)
    }

    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<(), GameError> {
        scheduler::advance(&mut self.state, &self.config, now)
    }

    /// Advances if the phase deadline has passed. Returns whether it did.
    pub fn check_timeout(&mut self, now: DateTime<Utc>) -> Result<bool, GameError> {
        scheduler::check_timeout(&mut self.state, &self.config, now)
    }

    pub fn project(&self, viewer_id: PlayerId) -> Result<ClientView, GameError> {
        Ok(view::project(&self.state, &self.config, viewer_id)?)
    }

    /// Takes every event queued since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.state.outbox)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn is_over(&self) -> bool {
        self.state.is_over()
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.state.phase_deadline
    }

    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.state.players.iter().map(|p| p.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seats(n: u32) -> Vec<(PlayerId, String)> {
        (1..=n).map(|id| (id, format!("P{}", id))).collect()
    }

    fn classic() -> GameConfig {
        GameConfig::with_roles(&[(Role::Werewolf, 1), (Role::Seer, 1), (Role::Villager, 3)])
    }

    #[test]
    fn seeded_deals_are_reproducible() {
        let now = Utc::now();
        let deal = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            let session =
                GameSession::initialize_game_with_rng("room".to_string(), seats(5), classic(), &mut rng, now)
                    .unwrap();
            session
                .state()
                .players
                .iter()
                .map(|p| p.role)
                .collect::<Vec<_>>()
        };
        assert_eq!(deal(7), deal(7));
    }

    #[test]
    fn invalid_tables_are_rejected_before_dealing() {
        let err = GameSession::initialize_game("room".to_string(), seats(4), classic(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, GameError::Config(ConfigError::PlayerCount { actual: 4, .. })));
    }

    #[test]
    fn endless_phases_are_refused_at_start() {
        let config = GameConfig {
            night_duration_secs: u64::MAX,
            ..classic()
        };
        let err = GameSession::initialize_game("room".to_string(), seats(5), config, Utc::now())
            .unwrap_err();
        assert!(matches!(
            err,
            GameError::Config(ConfigError::DurationTooLong { .. })
        ));
    }

    #[test]
    fn fixed_deals_must_match_the_counts() {
        let roles = vec![Role::Werewolf, Role::Werewolf, Role::Villager, Role::Villager, Role::Villager];
        let err = GameSession::initialize_game_with_roles(
            "room".to_string(),
            seats(5),
            roles,
            classic(),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, GameError::Config(ConfigError::DealMismatch)));
    }

    #[test]
    fn duplicate_seats_are_rejected() {
        let mut players = seats(5);
        players[4].0 = 1;
        let roles = vec![Role::Werewolf, Role::Seer, Role::Villager, Role::Villager, Role::Villager];
        let err =
            GameSession::initialize_game_with_roles("room".to_string(), players, roles, classic(), Utc::now())
                .unwrap_err();
        assert!(matches!(err, GameError::Config(ConfigError::DuplicatePlayer(1))));
    }

    #[test]
    fn start_opens_the_first_night_and_queues_an_event() {
        let roles = vec![Role::Werewolf, Role::Seer, Role::Villager, Role::Villager, Role::Villager];
        let mut session =
            GameSession::initialize_game_with_roles("room".to_string(), seats(5), roles, classic(), Utc::now())
                .unwrap();
        assert_eq!(session.phase(), Phase::Night(NightPhase::Seer));
        assert_eq!(session.state().round, 1);
        let events = session.drain_events();
        assert!(matches!(events.last(), Some(GameEvent::PhaseChanged { round: 1, .. })));
        assert!(session.drain_events().is_empty());
    }
}
