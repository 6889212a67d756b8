use world_level_catalog::{Catalog, EnemyCategory};
use world_level_core::{Boss, EntityId};

#[test]
fn every_known_boss_has_an_unlock_level() {
    let catalog = Catalog::standard();
    for boss in Boss::ALL {
        assert!(catalog.required_level(boss).is_some(), "{boss} is not gated");
    }
    assert_eq!(catalog.required_level(Boss::Unknown), None);
    assert_eq!(catalog.required_level(Boss::KingSlime), Some(1));
    assert_eq!(catalog.required_level(Boss::MoonLord), Some(12));
}

#[test]
fn twin_components_share_one_unlock() {
    let catalog = Catalog::standard();
    assert_eq!(catalog.resolve_boss(EntityId::new(125)), Some(Boss::TheTwins));
    assert_eq!(catalog.resolve_boss(EntityId::new(126)), Some(Boss::TheTwins));
    assert_eq!(catalog.resolve_boss(EntityId::new(14)), Some(Boss::EaterOfWorlds));
    assert_eq!(catalog.resolve_boss(EntityId::new(3)), None);
}

#[test]
fn hardmode_pool_is_a_superset_of_the_pre_hardmode_pool() {
    let catalog = Catalog::standard();
    let pre: Vec<&str> = catalog.categories(false).map(EnemyCategory::name).collect();
    let all: Vec<&str> = catalog.categories(true).map(EnemyCategory::name).collect();
    assert!(pre.contains(&"Forest/Surface"));
    assert!(!pre.contains(&"Mechanical"));
    assert!(all.contains(&"Mechanical"));
    for name in &pre {
        assert!(all.contains(name), "{name} dropped once hardmode is active");
    }
}

#[test]
fn zombie_variants_satisfy_a_zombie_task() {
    let catalog = Catalog::standard();
    assert!(catalog.is_valid_kill(EntityId::new(3), EntityId::new(-26)));
    assert!(catalog.is_valid_kill(EntityId::new(590), EntityId::new(132)));
    assert!(!catalog.is_valid_kill(EntityId::new(3), EntityId::new(1)));
    assert_eq!(
        catalog
            .variant_group(EntityId::new(-45))
            .map(|group| group.name()),
        Some("Zombies")
    );
}

#[test]
fn category_difficulty_matches_the_danger_ladder() {
    let catalog = Catalog::standard();
    assert_eq!(catalog.category_difficulty("Forest/Surface"), 1.2);
    assert_eq!(catalog.category_difficulty("Underworld"), 2.1);
    assert_eq!(catalog.category_difficulty("Celestial"), 3.2);
    assert_eq!(catalog.category_difficulty("Goblin Army"), 1.0);
}
