//! Spell entries and their tagged variants

use serde::{Deserialize, Serialize};

use crate::reference::{EntryId, Reference};

/// An authored spell.
///
/// `desc` and `higher_levels` are raw templates and the `dice` strings in
/// attacks and progressions are raw formulas; both are parsed when the
/// content graph is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spell {
    pub id: EntryId,
    pub name: String,
    /// 0 for cantrips
    pub level: u8,
    pub school: Reference,
    pub casting_times: Vec<CastingTime>,
    pub range: SpellRange,
    #[serde(default)]
    pub components: Components,
    pub durations: Vec<Duration>,
    #[serde(default)]
    pub ritual: bool,
    #[serde(default)]
    pub attack: Option<Attack>,
    #[serde(default)]
    pub damage_progression: Option<Progression>,
    #[serde(default)]
    pub healing_progression: Option<Progression>,
    /// Conditions the spell can inflict
    #[serde(default)]
    pub conditions: Vec<Reference>,
    pub desc: String,
    #[serde(default)]
    pub higher_levels: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CastingTimeUnit {
    Action,
    BonusAction,
    Reaction,
    Minute,
    Hour,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastingTime {
    pub amount: u32,
    pub unit: CastingTimeUnit,
    /// Trigger for reactions, e.g. "when you take damage"
    #[serde(default)]
    pub condition: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AreaShape {
    Cone,
    Cube,
    Cylinder,
    Emanation,
    Line,
    Sphere,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SpellRange {
    #[serde(rename = "self")]
    Caster,
    Touch,
    Sight,
    Unlimited,
    Ranged { feet: u32 },
    /// An area centered on the caster
    Area { shape: AreaShape, feet: u32 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Components {
    #[serde(default)]
    pub verbal: bool,
    #[serde(default)]
    pub somatic: bool,
    #[serde(default)]
    pub material: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimeUnit {
    Round,
    Minute,
    Hour,
    Day,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Duration {
    Instantaneous,
    Timed {
        amount: u32,
        unit: TimeUnit,
        #[serde(default)]
        concentration: bool,
    },
    UntilDispelled,
    Special,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttackKind {
    MeleeSpellAttack,
    RangedSpellAttack,
    SavingThrow,
    /// Hits without a roll (e.g. magic missile)
    Automatic,
}

impl AttackKind {
    pub fn is_saving_throw(&self) -> bool {
        matches!(self, AttackKind::SavingThrow)
    }
}

/// What happens to a target that succeeds on its save
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EffectOnSave {
    HalfDamage,
    NoEffect,
    /// Outcome described in prose only
    Special,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Damage {
    pub dice: String,
    pub damage_type: Reference,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attack {
    pub kind: AttackKind,
    /// Ability the target saves with; required for saving throws
    #[serde(default)]
    pub save: Option<Reference>,
    #[serde(default)]
    pub effect_on_save: Option<EffectOnSave>,
    #[serde(default)]
    pub damage: Vec<Damage>,
}

/// What the keys of a progression table count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProgressionBasis {
    CharacterLevel,
    SlotLevel,
    TargetCount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionStep {
    pub at: u32,
    pub dice: String,
}

/// Damage or healing dice that grow with level, slot or number of targets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progression {
    pub basis: ProgressionBasis,
    pub steps: Vec<ProgressionStep>,
}

impl Progression {
    /// The key the table must start at or below
    pub fn base_key(&self, spell_level: u8) -> u32 {
        match self.basis {
            ProgressionBasis::SlotLevel => u32::from(spell_level),
            ProgressionBasis::CharacterLevel | ProgressionBasis::TargetCount => 1,
        }
    }
}
