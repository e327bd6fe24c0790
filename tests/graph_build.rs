//! Building the content graph from TOML corpus fixtures

use std::sync::Arc;

use grimoire::content::{Record, Spell};
use grimoire::reference::{ref_to, CollectionName, Registry};
use grimoire::{build_graph, build_graph_with_config, BuildConfig, DiagnosticKind, Severity};
use pretty_assertions::assert_eq;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Corpus {
    spells: Vec<Spell>,
    magic_schools: Vec<Record>,
    damage_types: Vec<Record>,
    ability_scores: Vec<Record>,
    conditions: Vec<Record>,
}

impl Corpus {
    fn load(source: &str) -> Self {
        toml::from_str(source).expect("Fixture should deserialize")
    }

    fn registry(self) -> Registry {
        let mut builder = Registry::builder();
        builder
            .register(CollectionName::MagicSchools, self.magic_schools)
            .register(CollectionName::DamageTypes, self.damage_types)
            .register(CollectionName::AbilityScores, self.ability_scores)
            .register(CollectionName::Conditions, self.conditions)
            .register(CollectionName::Spells, self.spells);
        builder.freeze()
    }
}

const LOOKUPS: &str = r#"
[[magicSchools]]
id = "evocation"
name = "Evocation"

[[damageTypes]]
id = "fire"
name = "Fire"

[[abilityScores]]
id = "dex"
name = "Dexterity"
"#;

const SCORCH: &str = r#"
[[spells]]
id = "scorch"
name = "Scorch"
level = 1
school = { collection = "magicSchools", id = "evocation" }
castingTimes = [{ amount = 1, unit = "action" }]
range = { kind = "ranged", feet = 60 }
durations = [{ kind = "instantaneous" }]
desc = "Flames deal %{dice 3d6} damage."

[spells.attack]
kind = "automatic"
damage = [{ dice = "3d6", damageType = { collection = "damageTypes", id = "fire" } }]
"#;

const FIREBALL: &str = r#"
[[spells]]
id = "fireball"
name = "Fireball"
level = 3
school = { collection = "magicSchools", id = "evocation" }
castingTimes = [{ amount = 1, unit = "action" }]
range = { kind = "ranged", feet = 150 }
components = { verbal = true, somatic = true, material = "a ball of bat guano and sulfur" }
durations = [{ kind = "instantaneous" }]
desc = """
    A bright streak flashes from your pointing finger.
    Each creature takes %{dice 8d6} %{ref damageTypes fire} damage on a failed save.
"""
higherLevels = "The damage increases by %{dice 1d6} for each slot level above 3rd."

[spells.attack]
kind = "savingThrow"
save = { collection = "abilityScores", id = "dex" }
effectOnSave = "halfDamage"
damage = [{ dice = "8d6", damageType = { collection = "damageTypes", id = "fire" } }]

[spells.damageProgression]
basis = "slotLevel"
steps = [{ at = 3, dice = "8d6" }, { at = 4, dice = "9d6" }, { at = 5, dice = "10d6" }]
"#;

fn corpus(spells: &str) -> Registry {
    Corpus::load(&format!("{}\n{}", LOOKUPS, spells)).registry()
}

#[test]
fn test_end_to_end_clean_build() {
    let registry = corpus(SCORCH);
    let graph = build_graph(&registry);

    assert!(graph.diagnostics().is_empty(), "{:?}", graph.diagnostics());
    let scorch = graph.get(CollectionName::Spells, "scorch").expect("scorch");
    assert!(scorch.is_valid());
    assert!(scorch.rendered("desc").expect("desc").contains("3d6"));

    let school = scorch.reference("school").expect("school resolved");
    assert_eq!(school.id().as_str(), "evocation");
    let registered = registry
        .get(CollectionName::MagicSchools, "evocation")
        .expect("registered");
    assert!(Arc::ptr_eq(school, registered));

    assert_eq!(
        scorch
            .reference("attack.damage[0].damageType")
            .map(|e| e.id().as_str()),
        Some("fire")
    );
}

#[test]
fn test_full_spell_fields_resolve() {
    let graph = build_graph(&corpus(FIREBALL));
    assert!(graph.diagnostics().is_empty(), "{:?}", graph.diagnostics());

    let fireball = graph.get(CollectionName::Spells, "fireball").expect("fireball");
    insta::assert_snapshot!(
        fireball.rendered("desc").expect("desc"),
        @r"
    A bright streak flashes from your pointing finger.
    Each creature takes 8d6 Fire damage on a failed save.
    "
    );
    assert_eq!(
        fireball.rendered("higherLevels").as_deref(),
        Some("The damage increases by 1d6 for each slot level above 3rd.")
    );
    assert_eq!(
        fireball.reference("attack.save").map(|e| e.display_name()),
        Some("Dexterity")
    );
    assert_eq!(
        fireball.dice("attack.damage[0].dice").map(|d| d.to_string()),
        Some("8d6".to_string())
    );

    let progression = fireball.progression("damageProgression").expect("progression");
    assert_eq!(progression.at(3).map(|d| d.to_string()), Some("8d6".to_string()));
    assert_eq!(progression.at(9).map(|d| d.to_string()), Some("10d6".to_string()));
}

#[test]
fn test_dangling_school_is_one_diagnostic() {
    let registry = corpus(&SCORCH.replace(r#"id = "evocation""#, r#"id = "conjuration""#));
    let graph = build_graph(&registry);

    assert_eq!(graph.diagnostics().len(), 1);
    let diag = &graph.diagnostics()[0];
    assert_eq!(diag.kind, DiagnosticKind::DanglingReference);
    assert_eq!(diag.severity, Severity::Error);
    assert_eq!(diag.entry_id.as_str(), "scorch");
    assert_eq!(diag.field, "school");

    let scorch = graph.get(CollectionName::Spells, "scorch").expect("still present");
    assert!(!scorch.is_valid());
    assert!(scorch.reference("school").is_none());
    assert_eq!(graph.all().filter(|e| e.collection() == CollectionName::Spells).count(), 1);
    assert_eq!(graph.valid().filter(|e| e.collection() == CollectionName::Spells).count(), 0);
}

#[test]
fn test_school_from_wrong_collection() {
    let registry = corpus(&SCORCH.replace(
        r#"school = { collection = "magicSchools", id = "evocation" }"#,
        r#"school = { collection = "damageTypes", id = "fire" }"#,
    ));
    let graph = build_graph(&registry);

    let kinds: Vec<_> = graph.diagnostics().iter().map(|d| d.kind).collect();
    assert_eq!(kinds, vec![DiagnosticKind::WrongCollection]);
    assert!(!graph
        .get(CollectionName::Spells, "scorch")
        .expect("scorch")
        .is_valid());
}

#[test]
fn test_duplicate_id_keeps_first() {
    let second = FIREBALL.replace(r#"name = "Fireball""#, r#"name = "Fireball Again""#);
    let registry = corpus(&format!("{}\n{}", FIREBALL, second));
    let graph = build_graph(&registry);

    assert_eq!(graph.diagnostics().len(), 1);
    let diag = &graph.diagnostics()[0];
    assert_eq!(diag.kind, DiagnosticKind::DuplicateId);
    assert!(diag.message.contains("spells[0]"));
    assert!(diag.message.contains("spells[1]"));

    let kept = registry.get(CollectionName::Spells, "fireball").expect("kept");
    assert_eq!(kept.display_name(), "Fireball");
    assert_eq!(graph.collection(CollectionName::Spells).count(), 1);
}

#[test]
fn test_empty_durations_excluded_from_valid_view() {
    let registry = corpus(&SCORCH.replace(
        r#"durations = [{ kind = "instantaneous" }]"#,
        "durations = []",
    ));
    let graph = build_graph(&registry);

    let diag = &graph.diagnostics()[0];
    assert_eq!(graph.diagnostics().len(), 1);
    assert_eq!(diag.kind, DiagnosticKind::StructuralInvariant);
    assert_eq!(diag.field, "durations");

    assert!(graph.all().any(|e| e.id().as_str() == "scorch"));
    assert!(!graph.valid().any(|e| e.id().as_str() == "scorch"));
}

#[test]
fn test_bad_required_dice_invalidates_entry() {
    let registry = corpus(&SCORCH.replace(r#"dice = "3d6""#, r#"dice = "2dd6""#));
    let graph = build_graph(&registry);

    let scorch = graph.get(CollectionName::Spells, "scorch").expect("scorch");
    assert!(!scorch.is_valid());
    assert_eq!(scorch.diagnostics().len(), 1);
    assert_eq!(scorch.diagnostics()[0].kind, DiagnosticKind::Parse);
    assert_eq!(scorch.diagnostics()[0].field, "attack.damage[0].dice");
    assert!(scorch.dice("attack.damage[0].dice").is_none());
}

#[test]
fn test_unterminated_desc_invalidates_entry() {
    let registry = corpus(&SCORCH.replace("%{dice 3d6} damage.", "%{dice 3d6 damage."));
    let graph = build_graph(&registry);

    let scorch = graph.get(CollectionName::Spells, "scorch").expect("scorch");
    assert!(!scorch.is_valid());
    assert_eq!(scorch.diagnostics()[0].field, "desc");
    assert!(scorch.rendered("desc").is_none());
}

#[test]
fn test_dangling_template_reference_is_a_warning() {
    let registry = corpus(&SCORCH.replace(
        "%{dice 3d6} damage.",
        "%{dice 3d6} damage and %{ref conditions burning|sets them alight}.",
    ));
    let graph = build_graph(&registry);

    assert!(!graph.has_errors());
    assert_eq!(graph.diagnostics().len(), 1);
    assert_eq!(graph.diagnostics()[0].severity, Severity::Warning);

    let scorch = graph.get(CollectionName::Spells, "scorch").expect("scorch");
    assert!(scorch.is_valid());
    assert_eq!(
        scorch.rendered("desc").as_deref(),
        Some("Flames deal 3d6 damage and sets them alight.")
    );
}

#[test]
fn test_saving_throw_without_effect_on_save() {
    let registry = corpus(&FIREBALL.replace(r#"effectOnSave = "halfDamage""#, ""));
    let graph = build_graph(&registry);

    let fields: Vec<_> = graph.diagnostics().iter().map(|d| d.field.as_str()).collect();
    assert_eq!(fields, vec!["attack.effectOnSave"]);
    assert!(graph.valid().all(|e| e.id().as_str() != "fireball"));
}

/// Without the `parallel` feature both builds run sequentially; see
/// `test_parallel_build_matches_sequential` for the rayon path.
#[test]
fn test_build_order_is_deterministic() {
    let broken = SCORCH
        .replace(r#"id = "scorch""#, r#"id = "aaa-broken""#)
        .replace("durations = [{ kind = \"instantaneous\" }]", "durations = []")
        .replace(r#"id = "evocation""#, r#"id = "necromancy""#);
    let source = format!("{}\n{}\n{}", FIREBALL, broken, SCORCH);

    let sequential = build_graph_with_config(
        &corpus(&source),
        &BuildConfig::default().with_parallel(false),
    );
    let default = build_graph(&corpus(&source));

    assert_eq!(sequential.diagnostics(), default.diagnostics());
    let order = |g: &grimoire::ContentGraph| {
        g.all()
            .map(|e| format!("{}/{}", e.collection(), e.id()))
            .collect::<Vec<_>>()
    };
    assert_eq!(order(&sequential), order(&default));

    let fields: Vec<_> = sequential
        .diagnostics()
        .iter()
        .map(|d| format!("{}.{}", d.entry_id, d.field))
        .collect();
    assert_eq!(fields, vec!["aaa-broken.durations", "aaa-broken.school"]);
}

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_build_matches_sequential() {
    let mut source = String::new();
    for i in 0..64 {
        let spell = SCORCH.replace(r#"id = "scorch""#, &format!(r#"id = "scorch-{:02}""#, i));
        let spell = if i % 3 == 0 {
            spell.replace("durations = [{ kind = \"instantaneous\" }]", "durations = []")
        } else if i % 5 == 0 {
            spell.replace(r#"id = "evocation""#, r#"id = "necromancy""#)
        } else {
            spell
        };
        source.push_str(&spell);
    }

    let sequential = build_graph_with_config(
        &corpus(&source),
        &BuildConfig::default().with_parallel(false),
    );
    let parallel = build_graph_with_config(
        &corpus(&source),
        &BuildConfig::default().with_parallel(true),
    );

    assert_eq!(sequential.diagnostics(), parallel.diagnostics());
    assert!(!parallel.diagnostics().is_empty());
    let ids = |g: &grimoire::ContentGraph| {
        g.all()
            .map(|e| (e.id().to_string(), e.is_valid()))
            .collect::<Vec<_>>()
    };
    assert_eq!(ids(&sequential), ids(&parallel));
}

#[test]
fn test_reference_construction_needs_no_registry() {
    let dangling = ref_to(CollectionName::Monsters, "tarrasque");
    let registry = Registry::default();
    assert!(registry.resolve(&dangling).is_err());
    assert_eq!(dangling.to_string(), "monsters/tarrasque");
}
