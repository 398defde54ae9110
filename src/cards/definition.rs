//! Card definitions - static card data.
//!
//! `CardDefinition` holds the printed properties of a card: every copy of
//! "Basic Dog" shares one definition. The per-copy state (face-up, matched)
//! lives in `Card`.
//!
//! Definitions deserialize directly from the declarative catalog format:
//!
//! ```
//! use dogs_cats_chickens::cards::{CardDefinition, CardKind, CreatureType};
//!
//! let json = r#"{
//!     "id": "dog_basic", "name": "Basic Dog", "type": "creature",
//!     "creatureType": "dog", "matchingAbilityType": "alwaysWin",
//!     "front": "dog_basic.jpg", "back": "back.jpg"
//! }"#;
//! let def: CardDefinition = serde_json::from_str(json).unwrap();
//! assert_eq!(def.kind(), CardKind::Creature);
//! assert_eq!(def.creature_type(), Some(CreatureType::Dog));
//! ```

use serde::{Deserialize, Serialize};

/// Identifier shared by every copy of one printed card.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefinitionId(pub String);

impl DefinitionId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DefinitionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for DefinitionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The three card families.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CardKind {
    Creature,
    Upgrade,
    Action,
}

impl std::fmt::Display for CardKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CardKind::Creature => "creature",
            CardKind::Upgrade => "upgrade",
            CardKind::Action => "action",
        };
        f.write_str(name)
    }
}

/// Creature type in the dog > cat > chicken > dog triangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CreatureType {
    Dog,
    Cat,
    Chicken,
}

impl CreatureType {
    pub const ALL: [CreatureType; 3] = [CreatureType::Dog, CreatureType::Cat, CreatureType::Chicken];

    /// The type this one wins against.
    #[must_use]
    pub const fn prey(self) -> CreatureType {
        match self {
            CreatureType::Dog => CreatureType::Cat,
            CreatureType::Cat => CreatureType::Chicken,
            CreatureType::Chicken => CreatureType::Dog,
        }
    }

    /// Whether `self` beats `other` in the type triangle.
    #[must_use]
    pub fn beats(self, other: CreatureType) -> bool {
        self.prey() == other
    }
}

/// Ability a creature unlocks once matched.
///
/// The engine keys the combat rules on the creature type of a matched
/// creature; the ability is reported to the caller with the match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchAbility {
    /// Matched dogs win every fight against dogs.
    AlwaysWin,
    /// Matched cats may keep attacking after a swing.
    ExtraAttack,
    /// No ability, or one this engine does not recognise.
    #[default]
    #[serde(other)]
    Inert,
}

/// Effect of an upgrade card protecting its row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UpgradeEffect {
    CounterAttack,
    Defense,
    FakeUpgrade,
    SelfDestruct,
    Revive,
}

/// Effect of an action card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionEffect {
    /// Flip one opposing field card face-up.
    PowerOfTea,
    /// Reveal the opponent's hand until the next reinforcement.
    MessyDorm,
    /// Steal a random opposing hand card of a chosen kind.
    BirdArmy,
    /// Revive an action card from the discard pile.
    ActionSpirit,
    /// Revive a creature card from the discard pile.
    CreatureSpirit,
    /// Revive an upgrade card from the discard pile.
    UpgradeSpirit,
}

impl ActionEffect {
    /// Discard category revived by a spirit card.
    #[must_use]
    pub const fn spirit_kind(self) -> Option<CardKind> {
        match self {
            ActionEffect::ActionSpirit => Some(CardKind::Action),
            ActionEffect::CreatureSpirit => Some(CardKind::Creature),
            ActionEffect::UpgradeSpirit => Some(CardKind::Upgrade),
            _ => None,
        }
    }
}

/// Kind-specific fields of a definition, tagged by `type`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DefinitionKind {
    #[serde(rename_all = "camelCase")]
    Creature {
        creature_type: CreatureType,
        #[serde(rename = "matchingAbilityType", default)]
        match_ability: MatchAbility,
    },
    #[serde(rename_all = "camelCase")]
    Upgrade { upgrade_type: UpgradeEffect },
    #[serde(rename_all = "camelCase")]
    Action { action_type: ActionEffect },
}

/// Static card definition, one catalog record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDefinition {
    /// Unique identifier for this definition.
    pub id: DefinitionId,

    /// Display name.
    pub name: String,

    /// Kind tag and its payload.
    #[serde(flatten)]
    pub kind: DefinitionKind,

    /// Front face asset.
    #[serde(default)]
    pub front: String,

    /// Card back asset.
    #[serde(default)]
    pub back: String,
}

impl CardDefinition {
    /// Creature definition without assets.
    #[must_use]
    pub fn creature(
        id: impl Into<DefinitionId>,
        name: impl Into<String>,
        creature_type: CreatureType,
        match_ability: MatchAbility,
    ) -> Self {
        Self::with_kind(id, name, DefinitionKind::Creature { creature_type, match_ability })
    }

    /// Upgrade definition without assets.
    #[must_use]
    pub fn upgrade(id: impl Into<DefinitionId>, name: impl Into<String>, effect: UpgradeEffect) -> Self {
        Self::with_kind(id, name, DefinitionKind::Upgrade { upgrade_type: effect })
    }

    /// Action definition without assets.
    #[must_use]
    pub fn action(id: impl Into<DefinitionId>, name: impl Into<String>, effect: ActionEffect) -> Self {
        Self::with_kind(id, name, DefinitionKind::Action { action_type: effect })
    }

    fn with_kind(id: impl Into<DefinitionId>, name: impl Into<String>, kind: DefinitionKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            front: String::new(),
            back: String::new(),
        }
    }

    /// Set the asset names (builder pattern).
    #[must_use]
    pub fn with_assets(mut self, front: impl Into<String>, back: impl Into<String>) -> Self {
        self.front = front.into();
        self.back = back.into();
        self
    }

    #[must_use]
    pub fn kind(&self) -> CardKind {
        match self.kind {
            DefinitionKind::Creature { .. } => CardKind::Creature,
            DefinitionKind::Upgrade { .. } => CardKind::Upgrade,
            DefinitionKind::Action { .. } => CardKind::Action,
        }
    }

    #[must_use]
    pub fn creature_type(&self) -> Option<CreatureType> {
        match self.kind {
            DefinitionKind::Creature { creature_type, .. } => Some(creature_type),
            _ => None,
        }
    }
}

impl From<String> for DefinitionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
