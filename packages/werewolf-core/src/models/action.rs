use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::phase::NightPhase;
use super::player::PlayerId;
use super::role::Role;

/// Raw payload of a night submission as it arrives from a client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NightActionPayload {
    #[serde(default)]
    pub target_id: Option<PlayerId>,
    #[serde(default)]
    pub target_ids: Option<Vec<PlayerId>>,
    #[serde(default)]
    pub use_potion: Option<bool>,
    #[serde(default)]
    pub question: Option<String>,
}

impl NightActionPayload {
    pub fn target(target_id: PlayerId) -> Self {
        Self {
            target_id: Some(target_id),
            ..Self::default()
        }
    }

    pub fn targets(target_ids: Vec<PlayerId>) -> Self {
        Self {
            target_ids: Some(target_ids),
            ..Self::default()
        }
    }

    pub fn skip() -> Self {
        Self::default()
    }

    /// Every target named by the payload, whichever field carried it.
    pub fn all_targets(&self) -> Vec<PlayerId> {
        match (&self.target_ids, self.target_id) {
            (Some(ids), _) => ids.clone(),
            (None, Some(id)) => vec![id],
            (None, None) => Vec::new(),
        }
    }
}

/// A validated night action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NightAction {
    Link { first: PlayerId, second: PlayerId },
    ChooseIdol { target_id: PlayerId },
    Divine { target_id: PlayerId },
    Sniff { target_ids: Vec<PlayerId> },
    Guard { target_id: PlayerId },
    Heal { target_id: PlayerId },
    Attack { target_ids: Vec<PlayerId> },
    Convert { target_id: Option<PlayerId> },
    Devour { target_id: Option<PlayerId> },
    Brew { poison_target: Option<PlayerId>, save: bool },
    Stab { target_id: PlayerId },
    Commune { target_id: PlayerId, question: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedAction {
    pub actor_id: PlayerId,
    pub phase: NightPhase,
    pub action: NightAction,
}

/// What the submitting player learns straight away.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActionReceipt {
    Recorded,
    Inspection { target_id: PlayerId, role: Role },
    Seance { target_id: PlayerId, role: Role },
}

/// The night-action buffer. Reset at the start of every night.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NightActions {
    pub actions: Vec<RecordedAction>,
    pub submitted_by: BTreeMap<NightPhase, BTreeSet<PlayerId>>,
}

impl NightActions {
    pub fn record(&mut self, actor_id: PlayerId, phase: NightPhase, action: NightAction) {
        self.actions.push(RecordedAction {
            actor_id,
            phase,
            action,
        });
        self.submitted_by.entry(phase).or_default().insert(actor_id);
    }

    pub fn has_submitted(&self, phase: NightPhase, player_id: PlayerId) -> bool {
        self.submitted_by
            .get(&phase)
            .map_or(false, |set| set.contains(&player_id))
    }

    pub fn in_phase(&self, phase: NightPhase) -> impl Iterator<Item = &RecordedAction> {
        self.actions.iter().filter(move |a| a.phase == phase)
    }

    /// Pack targets ranked by votes, ties broken by first appearance.
    pub fn wolf_targets(&self, count: usize) -> Vec<PlayerId> {
        let mut tally: Vec<(PlayerId, usize)> = Vec::new();
        for recorded in self.in_phase(NightPhase::Werewolves) {
            if let NightAction::Attack { target_ids } = &recorded.action {
                for target in target_ids {
                    match tally.iter_mut().find(|(id, _)| id == target) {
                        Some((_, votes)) => *votes += 1,
                        None => tally.push((*target, 1)),
                    }
                }
            }
        }
        // stable sort keeps first-appearance order among equal counts
        tally.sort_by(|a, b| b.1.cmp(&a.1));
        tally.into_iter().take(count).map(|(id, _)| id).collect()
    }

    /// Wolves that named `target` in their attack, in submission order.
    pub fn attackers_of(&self, target: PlayerId) -> Vec<PlayerId> {
        self.in_phase(NightPhase::Werewolves)
            .filter(|recorded| {
                matches!(&recorded.action, NightAction::Attack { target_ids } if target_ids.contains(&target))
            })
            .map(|recorded| recorded.actor_id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attack(actions: &mut NightActions, wolf: PlayerId, targets: Vec<PlayerId>) {
        actions.record(
            wolf,
            NightPhase::Werewolves,
            NightAction::Attack { target_ids: targets },
        );
    }

    #[test]
    fn wolf_targets_follow_plurality() {
        let mut actions = NightActions::default();
        attack(&mut actions, 1, vec![5]);
        attack(&mut actions, 2, vec![6]);
        attack(&mut actions, 3, vec![6]);
        assert_eq!(actions.wolf_targets(1), vec![6]);
    }

    #[test]
    fn wolf_target_ties_go_to_the_first_named() {
        let mut actions = NightActions::default();
        attack(&mut actions, 1, vec![5]);
        attack(&mut actions, 2, vec![6]);
        assert_eq!(actions.wolf_targets(1), vec![5]);
        assert_eq!(actions.wolf_targets(2), vec![5, 6]);
    }

    #[test]
    fn payload_targets_prefer_the_list() {
        let payload = NightActionPayload {
            target_id: Some(1),
            target_ids: Some(vec![2, 3]),
            ..NightActionPayload::default()
        };
        assert_eq!(payload.all_targets(), vec![2, 3]);
        assert_eq!(NightActionPayload::target(4).all_targets(), vec![4]);
        assert!(NightActionPayload::skip().all_targets().is_empty());
    }

    #[test]
    fn submissions_are_tracked_per_phase() {
        let mut actions = NightActions::default();
        actions.record(7, NightPhase::Seer, NightAction::Divine { target_id: 1 });
        assert!(actions.has_submitted(NightPhase::Seer, 7));
        assert!(!actions.has_submitted(NightPhase::Doctor, 7));
    }
}
