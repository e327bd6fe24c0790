//! Structural checks on spells.
//!
//! These look only at the entry itself; references and templates are
//! handled by the resolver.

use crate::config::BuildConfig;
use crate::content::{Duration, Progression, Spell};

use super::diagnostic::Severity;

const MAX_SPELL_LEVEL: u8 = 9;

/// A broken rule, located by field path
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Finding {
    pub field: String,
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            severity: Severity::Error,
            message: message.into(),
        }
    }

    fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

/// Run every structural check on a spell
pub(crate) fn check_spell(spell: &Spell, config: &BuildConfig) -> Vec<Finding> {
    let mut findings = Vec::new();

    if spell.level > MAX_SPELL_LEVEL {
        findings.push(Finding::error(
            "level",
            format!("spell level {} is above {}", spell.level, MAX_SPELL_LEVEL),
        ));
    }

    if spell.casting_times.is_empty() {
        findings.push(Finding::error("castingTimes", "at least one casting time is required"));
    }
    for (i, ct) in spell.casting_times.iter().enumerate() {
        if ct.amount == 0 {
            findings.push(Finding::error(
                format!("castingTimes[{}].amount", i),
                "casting time amount must be positive",
            ));
        }
    }

    if spell.durations.is_empty() {
        findings.push(Finding::error("durations", "at least one duration is required"));
    }
    for (i, d) in spell.durations.iter().enumerate() {
        if let Duration::Timed { amount: 0, .. } = d {
            findings.push(Finding::error(
                format!("durations[{}].amount", i),
                "timed duration must be positive",
            ));
        }
    }

    if let Some(attack) = &spell.attack {
        if attack.kind.is_saving_throw() {
            if attack.effect_on_save.is_none() {
                findings.push(Finding::error(
                    "attack.effectOnSave",
                    "saving throw attacks must say what happens on a successful save",
                ));
            }
            if attack.save.is_none() {
                findings.push(Finding::error(
                    "attack.save",
                    "saving throw attacks must name the saving ability",
                ));
            }
        } else if attack.effect_on_save.is_some() && config.effect_on_save_warnings {
            findings.push(Finding::warning(
                "attack.effectOnSave",
                "effectOnSave is ignored for attacks without a saving throw",
            ));
        }
    }

    if let Some(p) = &spell.damage_progression {
        check_progression("damageProgression", p, spell.level, &mut findings);
    }
    if let Some(p) = &spell.healing_progression {
        check_progression("healingProgression", p, spell.level, &mut findings);
    }

    findings
}

/// Keys strictly ascending, first key at or below the base
fn check_progression(field: &str, progression: &Progression, level: u8, findings: &mut Vec<Finding>) {
    let Some(first) = progression.steps.first() else {
        findings.push(Finding::error(field, "progression table has no steps"));
        return;
    };

    let base = progression.base_key(level);
    if first.at > base {
        findings.push(Finding::error(
            format!("{}.steps[0].at", field),
            format!("first key {} is above the base {}", first.at, base),
        ));
    }

    for (i, pair) in progression.steps.windows(2).enumerate() {
        if pair[1].at <= pair[0].at {
            findings.push(Finding::error(
                format!("{}.steps[{}].at", field, i + 1),
                format!(
                    "keys must be strictly ascending: {} follows {}",
                    pair[1].at, pair[0].at
                ),
            ));
        }
    }
}
