use super::*;

fn entity(id: u32, name: &str, types: &[CategoryTag], base: u32) -> CatalogEntity {
    CatalogEntity {
        pokedex_id: PokedexId(id),
        name: name.to_string(),
        types: types.to_vec(),
        stats: Some(StatBlock {
            hp: base,
            attack: base,
            defense: base,
            special_attack: base,
            special_defense: base,
            speed: base,
        }),
        sprite_url: String::new(),
        is_banned: false,
    }
}

#[test]
fn add_fills_first_gap_and_rejects_seventh_member() {
    let mut roster = Roster::new();
    for id in 1..=6 {
        roster
            .add(entity(id, "mon", &[CategoryTag::Normal], 10))
            .expect("room");
    }
    assert!(roster.is_full());
    assert!(matches!(
        roster.add(entity(7, "extra", &[], 10)),
        Err(ClientError::RosterFull)
    ));

    roster.remove(2).expect("slot");
    let slot = roster
        .add(entity(8, "late", &[], 10))
        .expect("gap");
    assert_eq!(slot, 2);
    assert_eq!(roster.get(2).expect("member").entity.pokedex_id, PokedexId(8));
}

#[test]
fn out_of_range_slots_are_rejected() {
    let mut roster = Roster::new();
    assert!(matches!(
        roster.place(6, entity(1, "a", &[], 1)),
        Err(ClientError::InvalidSlot(6))
    ));
    assert!(matches!(roster.remove(9), Err(ClientError::InvalidSlot(9))));
    assert!(roster.build_mut(0).is_err());
}

#[test]
fn place_replaces_and_returns_previous_member() {
    let mut roster = Roster::new();
    roster.place(3, entity(25, "Pikachu", &[], 50)).expect("slot");
    let previous = roster
        .place(3, entity(26, "Raichu", &[], 60))
        .expect("slot")
        .expect("previous");
    assert_eq!(previous.entity.name, "Pikachu");
    assert_eq!(roster.member_ids(), vec![PokedexId(26)]);
}

#[test]
fn power_sums_all_member_stats() {
    let mut roster = Roster::new();
    roster.add(entity(1, "a", &[], 10)).expect("room");
    roster.add(entity(2, "b", &[], 20)).expect("room");
    assert_eq!(roster.team_power(), 60 + 120);

    roster.clear();
    assert!(roster.is_empty());
    assert_eq!(roster.team_power(), 0);
    assert_eq!(roster.dominant_type(), None);
}

#[test]
fn dominant_type_prefers_first_seen_on_ties() {
    let mut roster = Roster::new();
    roster
        .add(entity(1, "a", &[CategoryTag::Grass, CategoryTag::Poison], 1))
        .expect("room");
    roster
        .add(entity(2, "b", &[CategoryTag::Poison], 1))
        .expect("room");
    assert_eq!(roster.dominant_type(), Some(CategoryTag::Poison));

    roster
        .add(entity(3, "c", &[CategoryTag::Grass], 1))
        .expect("room");
    assert_eq!(roster.dominant_type(), Some(CategoryTag::Grass));
}

#[test]
fn build_limits_are_enforced() {
    let mut build = MemberBuild {
        moves: vec!["a".into(), "b".into(), "c".into(), "d".into(), "e".into()],
        ..MemberBuild::default()
    };
    assert!(build.validate().is_err());

    build.moves.truncate(4);
    build.training_points.hp = 253;
    assert!(build.validate().is_err());

    build.training_points = StatBlock {
        hp: 252,
        attack: 252,
        speed: 6,
        ..StatBlock::default()
    };
    assert!(build.validate().is_ok());
    build.training_points.defense = 1;
    assert!(build.validate().is_err());
}

#[test]
fn payload_carries_builds_and_skips_blank_fields() {
    let mut roster = Roster::new();
    roster
        .add(entity(448, "Lucario", &[CategoryTag::Fighting, CategoryTag::Steel], 70))
        .expect("room");
    {
        let build = roster.build_mut(0).expect("member");
        build.nickname = Some("  ".into());
        build.item = Some("life-orb".into());
        build.nature = Some("Timid".into());
        build.moves = vec!["aura-sphere".into(), " ".into(), "flash-cannon".into()];
        build.training_points.special_attack = 252;
        build.training_points.speed = 252;
    }

    let payload = roster
        .to_team_payload("  ", Some("rain core"), "vgc", Some(TeamId("t-1".into())))
        .expect("payload");
    assert_eq!(payload.team_name, "Untitled team");
    assert_eq!(payload.team_id, Some(TeamId("t-1".into())));
    assert_eq!(payload.description.as_deref(), Some("rain core"));

    let member = &payload.team_members[0];
    assert_eq!(member.base_pokemon, "Lucario");
    assert_eq!(member.nickname, None);
    assert_eq!(member.item.as_deref(), Some("life-orb"));
    assert_eq!(member.moves, vec!["aura-sphere", "flash-cannon"]);
    assert_eq!(member.evs.get("special_attack"), Some(&252));
    assert_eq!(member.evs.get("hp"), None);
    assert_eq!(member.evs.len(), 2);
}

#[test]
fn empty_roster_cannot_be_saved() {
    assert!(Roster::new()
        .to_team_payload("x", None, "ou", None)
        .is_err());
}
