//! Card instances - one physical copy in a match.
//!
//! A `Card` carries its shared identity (definition id, name), its own
//! `InstanceId`, visibility state and a kind-specific `CardBody`. The body is
//! a closed tagged union; engine logic dispatches on it with `match`.

use serde::{Deserialize, Serialize};

use super::definition::{
    ActionEffect, CardDefinition, CardKind, CreatureType, DefinitionId, DefinitionKind, MatchAbility,
    UpgradeEffect,
};
use crate::core::entity::InstanceId;

/// Creature payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Creature {
    pub creature_type: CreatureType,
    pub match_ability: MatchAbility,
    /// Set once the creature has been paired with a same-definition creature.
    pub matched: bool,
}

/// Kind-specific card data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardBody {
    Creature(Creature),
    Upgrade(UpgradeEffect),
    Action(ActionEffect),
}

/// A card copy in play.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Card {
    pub definition_id: DefinitionId,
    pub instance_id: InstanceId,
    pub name: String,
    /// Permanently visible to both players.
    pub face_up: bool,
    pub body: CardBody,
}

impl Card {
    /// Create a fresh face-down copy of a definition.
    #[must_use]
    pub fn from_definition(definition: &CardDefinition, instance_id: InstanceId) -> Self {
        let body = match definition.kind {
            DefinitionKind::Creature { creature_type, match_ability } => CardBody::Creature(Creature {
                creature_type,
                match_ability,
                matched: false,
            }),
            DefinitionKind::Upgrade { upgrade_type } => CardBody::Upgrade(upgrade_type),
            DefinitionKind::Action { action_type } => CardBody::Action(action_type),
        };

        Self {
            definition_id: definition.id.clone(),
            instance_id,
            name: definition.name.clone(),
            face_up: false,
            body,
        }
    }

    #[must_use]
    pub fn kind(&self) -> CardKind {
        match self.body {
            CardBody::Creature(_) => CardKind::Creature,
            CardBody::Upgrade(_) => CardKind::Upgrade,
            CardBody::Action(_) => CardKind::Action,
        }
    }

    #[must_use]
    pub fn is_creature(&self) -> bool {
        matches!(self.body, CardBody::Creature(_))
    }

    #[must_use]
    pub fn creature(&self) -> Option<&Creature> {
        match &self.body {
            CardBody::Creature(c) => Some(c),
            _ => None,
        }
    }

    #[must_use]
    pub fn creature_type(&self) -> Option<CreatureType> {
        self.creature().map(|c| c.creature_type)
    }

    #[must_use]
    pub fn upgrade_effect(&self) -> Option<UpgradeEffect> {
        match self.body {
            CardBody::Upgrade(effect) => Some(effect),
            _ => None,
        }
    }

    #[must_use]
    pub fn action_effect(&self) -> Option<ActionEffect> {
        match self.body {
            CardBody::Action(effect) => Some(effect),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_matched(&self) -> bool {
        self.creature().is_some_and(|c| c.matched)
    }

    /// Matched creature of the given type.
    #[must_use]
    pub fn is_matched_of(&self, creature_type: CreatureType) -> bool {
        self.creature()
            .is_some_and(|c| c.matched && c.creature_type == creature_type)
    }

    /// Mark a creature as matched; also turns it face-up.
    pub fn mark_matched(&mut self) {
        if let CardBody::Creature(creature) = &mut self.body {
            creature.matched = true;
            self.face_up = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dog() -> CardDefinition {
        CardDefinition::creature("dog", "Dog", CreatureType::Dog, MatchAbility::AlwaysWin)
    }

    #[test]
    fn test_from_definition() {
        let card = Card::from_definition(&dog(), InstanceId(3));

        assert_eq!(card.instance_id, InstanceId(3));
        assert_eq!(card.definition_id, DefinitionId::new("dog"));
        assert_eq!(card.kind(), CardKind::Creature);
        assert!(!card.face_up);
        assert!(!card.is_matched());
    }

    #[test]
    fn test_mark_matched_turns_face_up() {
        let mut card = Card::from_definition(&dog(), InstanceId(0));
        card.mark_matched();

        assert!(card.face_up);
        assert!(card.is_matched_of(CreatureType::Dog));
        assert!(!card.is_matched_of(CreatureType::Cat));
    }

    #[test]
    fn test_mark_matched_ignores_non_creatures() {
        let def = CardDefinition::upgrade("shield", "Shield", UpgradeEffect::Defense);
        let mut card = Card::from_definition(&def, InstanceId(1));
        card.mark_matched();

        assert!(!card.face_up);
        assert_eq!(card.upgrade_effect(), Some(UpgradeEffect::Defense));
        assert_eq!(card.action_effect(), None);
    }
}
