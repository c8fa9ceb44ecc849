use super::*;

fn dirty_state() -> QueryState {
    let mut state = QueryState::new(50);
    state.set_text_query("  pika ");
    state.toggle_type_filter(CategoryTag::Electric);
    state.toggle_type_filter(CategoryTag::Fairy);
    state.set_minimum_stat(Stat::Speed, "90");
    state.set_exclude_restricted(true);
    state.set_sort(SortKey::Stat(Stat::Speed));
    state.set_page(4, None);
    state
}

#[test]
fn fresh_state_sorts_by_id_ascending_on_page_one() {
    let state = QueryState::default();
    assert_eq!(state.sort_key(), SortKey::Id);
    assert!(state.sort_ascending());
    assert_eq!(state.page(), 1);
    assert_eq!(state.page_size(), DEFAULT_PAGE_SIZE);
    assert!(state.type_filters().is_empty());
    assert_eq!(state.minimum_stats().total(), 0);
}

#[test]
fn every_filter_and_sort_mutation_resets_page() {
    let mutations: Vec<Box<dyn Fn(&mut QueryState)>> = vec![
        Box::new(|s| s.set_text_query("char")),
        Box::new(|s| s.toggle_type_filter(CategoryTag::Fire)),
        Box::new(|s| s.clear_type_filters()),
        Box::new(|s| s.set_minimum_stat(Stat::Attack, "50")),
        Box::new(|s| s.set_exclude_restricted(true)),
        Box::new(|s| s.set_sort(SortKey::Name)),
    ];

    for mutate in mutations {
        let mut state = QueryState::default();
        state.set_page(7, None);
        assert_eq!(state.page(), 7);
        mutate(&mut state);
        assert_eq!(state.page(), 1);
    }
}

#[test]
fn set_page_never_goes_below_one_and_respects_known_page_count() {
    let mut state = QueryState::default();
    assert_eq!(state.set_page(0, None), 1);
    assert_eq!(state.set_page(99, Some(21)), 21);
    assert_eq!(state.set_page(3, Some(0)), 3);
    assert_eq!(state.page(), 3);
}

#[test]
fn sort_defaults_depend_on_key_category() {
    let mut state = QueryState::default();
    state.set_sort(SortKey::Stat(Stat::Attack));
    assert!(!state.sort_ascending());

    let mut state = QueryState::default();
    state.set_sort(SortKey::Name);
    assert!(state.sort_ascending());
}

#[test]
fn reselecting_sort_key_only_flips_direction() {
    let mut state = dirty_state();
    state.set_page(1, None);
    let before = state.clone();

    state.set_sort(SortKey::Stat(Stat::Speed));
    assert_eq!(state.sort_ascending(), !before.sort_ascending());
    state.set_sort(SortKey::Stat(Stat::Speed));
    assert_eq!(state, before);
}

#[test]
fn reselecting_current_default_key_flips_to_descending() {
    let mut state = QueryState::default();
    state.set_sort(SortKey::Id);
    assert!(!state.sort_ascending());
}

#[test]
fn type_filters_toggle_in_insertion_order() {
    let mut state = QueryState::default();
    state.toggle_type_filter(CategoryTag::Water);
    state.toggle_type_filter(CategoryTag::Dragon);
    state.toggle_type_filter(CategoryTag::Ground);
    state.toggle_type_filter(CategoryTag::Dragon);
    assert_eq!(
        state.type_filters(),
        &[CategoryTag::Water, CategoryTag::Ground]
    );
    state.clear_type_filters();
    assert!(state.type_filters().is_empty());
}

#[test]
fn stat_input_coerces_to_non_negative_integers() {
    assert_eq!(parse_stat_input("120"), 120);
    assert_eq!(parse_stat_input(" 75 "), 75);
    assert_eq!(parse_stat_input("-30"), 0);
    assert_eq!(parse_stat_input("fast"), 0);
    assert_eq!(parse_stat_input(""), 0);
    assert_eq!(parse_stat_input("80abc"), 80);
    assert_eq!(parse_stat_input("99999999999"), u32::MAX);
    assert_eq!(parse_stat_input("99999999999999999999"), u32::MAX);
    assert_eq!(parse_stat_input("-99999999999999999999"), 0);
}

#[test]
fn same_query_ignores_selected_page() {
    let state = dirty_state();
    let mut other = state.clone();
    other.set_page(9, None);
    assert!(state.same_query(&other));

    other.toggle_type_filter(CategoryTag::Water);
    assert!(!state.same_query(&other));
}

#[test]
fn reset_restores_defaults_but_keeps_page_size() {
    let mut state = dirty_state();
    state.reset();
    assert_eq!(state, QueryState::new(50));

    let mut small = QueryState::new(10);
    small.set_text_query("eevee");
    small.reset();
    assert_eq!(small.page_size(), 10);
    assert_eq!(small.text_query(), "");
}

#[test]
fn fresh_request_contains_only_sort_and_window() {
    let params = build_request(&QueryState::default());
    let expected: Vec<(String, String)> = [
        ("stat", "id"),
        ("order", "asc"),
        ("limit", "50"),
        ("offset", "0"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    assert_eq!(params.pairs(), expected.as_slice());
}

#[test]
fn single_nonzero_minimum_emits_one_wire_parameter() {
    let mut state = QueryState::default();
    state.set_minimum_stat(Stat::Attack, "50");
    let params = build_request(&state);

    let mins: Vec<_> = params
        .pairs()
        .iter()
        .filter(|(k, _)| k.ends_with("_min"))
        .collect();
    assert_eq!(mins.len(), 1);
    assert_eq!(params.get("attack_min"), Some("50"));
}

#[test]
fn minimums_use_wire_names_and_skip_zeroes() {
    let mut state = QueryState::default();
    state.set_minimum_stat(Stat::SpecialAttack, "100");
    state.set_minimum_stat(Stat::SpecialDefense, "0");
    state.set_minimum_stat(Stat::Hp, "-4");
    let params = build_request(&state);

    assert_eq!(params.get("special_attack_min"), Some("100"));
    assert_eq!(params.get("special-attack_min"), None);
    assert_eq!(params.get("special_defense_min"), None);
    assert_eq!(params.get("hp_min"), None);
}

#[test]
fn full_request_repeats_types_and_computes_offset() {
    let mut state = dirty_state();
    state.set_page(3, None);
    let params = build_request(&state);

    assert_eq!(params.get("q"), Some("pika"));
    assert_eq!(params.get_all("types"), vec!["electric", "fairy"]);
    assert_eq!(params.get("speed_min"), Some("90"));
    assert_eq!(params.get("exclude_banned"), Some("true"));
    assert_eq!(params.get("stat"), Some("speed"));
    assert_eq!(params.get("order"), Some("desc"));
    assert_eq!(params.get("limit"), Some("50"));
    assert_eq!(params.get("offset"), Some("100"));
}

#[test]
fn restricted_flag_is_omitted_when_unset() {
    let mut state = QueryState::default();
    state.set_exclude_restricted(false);
    assert_eq!(build_request(&state).get("exclude_banned"), None);
}

#[test]
fn sort_key_translates_to_wire_vocabulary() {
    let mut state = QueryState::default();
    state.set_sort(SortKey::Stat(Stat::SpecialDefense));
    assert_eq!(build_request(&state).get("stat"), Some("special_defense"));
    assert_eq!(
        "special-defense".parse::<SortKey>(),
        Ok(SortKey::Stat(Stat::SpecialDefense))
    );
    assert!("weight".parse::<SortKey>().is_err());
}

#[test]
fn request_building_is_deterministic() {
    let state = dirty_state();
    assert_eq!(build_request(&state), build_request(&state.clone()));
}
