//! End-to-end blueprint suggestion tests

use miniplan::common::{SuggesterConfig, UNCONSTRAINED};
use miniplan::suggester::{suggest_table_blueprint, PlacementInputs};
use miniplan::{
    suggest_blueprint, suggest_blueprints, Activity, Blueprint, BusinessCard, ClusterState,
    Error, KeyRange, NonoverlappingRegions, Region, RegionMap, Role, TableConfig, UsageTally,
};
use miniplan::cluster::ServerRecord;
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

const D1: Uuid = Uuid::from_u128(0xd1);
const D2: Uuid = Uuid::from_u128(0xd2);

fn server(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

/// Ten servers alternating between D1 and D2, all reporting `nothing`
fn ten_server_cluster(affinities: BTreeMap<Uuid, usize>) -> (ClusterState<KeyRange>, Uuid) {
    let table_id = Uuid::from_u128(0x7ab1e);
    let mut state = ClusterState::default();
    for n in 1..=10 {
        let dc = if n % 2 == 1 { D1 } else { D2 };
        state
            .servers
            .insert(server(n), ServerRecord::new(format!("server-{}", n), dc));
        state.directory.insert(
            server(n),
            BTreeMap::from([(table_id, BusinessCard::uniform(Activity::Nothing))]),
        );
    }
    state.tables.insert(
        table_id,
        TableConfig::new(D1, affinities, vec![KeyRange::universe()]),
    );
    (state, table_id)
}

fn datacenter_of(state: &ClusterState<KeyRange>, id: &Uuid) -> Uuid {
    state.servers[id].datacenter
}

#[test]
fn test_two_datacenter_scenario() {
    let (state, table_id) = ten_server_cluster(BTreeMap::from([(D1, 2), (D2, 3)]));
    let config = SuggesterConfig::default();

    let blueprint =
        suggest_table_blueprint(&state, &table_id, &config, &mut UsageTally::new()).unwrap();
    let shard = KeyRange::universe();

    let primaries = blueprint.servers_with(&shard, Role::Primary);
    let secondaries = blueprint.servers_with(&shard, Role::Secondary);
    let unused = blueprint.servers_with(&shard, Role::Nothing);

    assert_eq!(primaries.len(), 1);
    assert_eq!(datacenter_of(&state, &primaries[0]), D1);

    let in_d1 = secondaries
        .iter()
        .filter(|s| datacenter_of(&state, s) == D1)
        .count();
    let in_d2 = secondaries
        .iter()
        .filter(|s| datacenter_of(&state, s) == D2)
        .count();
    assert_eq!(in_d1, 1);
    assert_eq!(in_d2, 3);
    assert_eq!(unused.len(), 5);
}

#[test]
fn test_shortfall_scenario() {
    let (state, table_id) = ten_server_cluster(BTreeMap::from([(D1, 10)]));
    let config = SuggesterConfig::default();
    let mut usage = UsageTally::new();

    let result = suggest_table_blueprint(&state, &table_id, &config, &mut usage);
    match result {
        Err(Error::CannotSatisfyGoals { datacenter, .. }) => assert_eq!(datacenter, D1),
        other => panic!("expected CannotSatisfyGoals, got {:?}", other.map(|_| ())),
    }
    let err = suggest_table_blueprint(&state, &table_id, &config, &mut UsageTally::new())
        .unwrap_err();
    assert_eq!(err.shortfall(), Some(5));
}

#[test]
fn test_every_server_has_a_role_for_every_shard() {
    let (mut state, table_id) = ten_server_cluster(BTreeMap::from([(D1, 2), (D2, 1)]));
    let table = state.tables.get_mut(&table_id).unwrap();
    table.shards = KeyRange::split_universe(&["d", "h", "p", "t"]);

    let blueprint = suggest_table_blueprint(
        &state,
        &table_id,
        &SuggesterConfig::default(),
        &mut UsageTally::new(),
    )
    .unwrap();

    let shards = state.tables[&table_id].shard_set().unwrap();
    blueprint
        .validate(&shards, state.servers.keys())
        .unwrap();
    for shard in &shards {
        assert!(blueprint.primary_of(shard).is_some());
        for id in state.servers.keys() {
            assert!(blueprint.role(id, shard).is_some());
        }
    }
}

#[test]
fn test_sole_primary_pin_is_honored() {
    let (mut state, table_id) = ten_server_cluster(BTreeMap::from([(D1, 2), (D2, 3)]));
    // Server 3 holds the data already; pin server 9 instead
    state.directory.get_mut(&server(3)).unwrap().insert(
        table_id,
        BusinessCard::uniform(Activity::Primary),
    );
    let table = state.tables.get_mut(&table_id).unwrap();
    table.primary_pinnings = RegionMap::from_region(KeyRange::universe(), server(9));

    let blueprint = suggest_table_blueprint(
        &state,
        &table_id,
        &SuggesterConfig::default(),
        &mut UsageTally::new(),
    )
    .unwrap();
    assert_eq!(blueprint.primary_of(&KeyRange::universe()), Some(server(9)));
}

#[test]
fn test_secondary_pins_fill_before_others() {
    let (mut state, table_id) = ten_server_cluster(BTreeMap::from([(D1, 1), (D2, 2)]));
    let table = state.tables.get_mut(&table_id).unwrap();
    table.secondary_pinnings = RegionMap::from_region(
        KeyRange::universe(),
        BTreeSet::from([server(8), server(10)]),
    );

    let blueprint = suggest_table_blueprint(
        &state,
        &table_id,
        &SuggesterConfig::default(),
        &mut UsageTally::new(),
    )
    .unwrap();
    let secondaries = blueprint.servers_with(&KeyRange::universe(), Role::Secondary);
    assert_eq!(secondaries, vec![server(8), server(10)]);
}

#[test]
fn test_unpublished_server_ranks_last() {
    let (mut state, table_id) = ten_server_cluster(BTreeMap::from([(D1, 1)]));
    state.directory.remove(&server(1));
    state.directory.get_mut(&server(5)).unwrap().insert(
        table_id,
        BusinessCard::uniform(Activity::SecondaryUpToDate),
    );

    let blueprint = suggest_table_blueprint(
        &state,
        &table_id,
        &SuggesterConfig::default(),
        &mut UsageTally::new(),
    )
    .unwrap();
    assert_eq!(blueprint.primary_of(&KeyRange::universe()), Some(server(5)));
    assert_eq!(
        blueprint.role(&server(1), &KeyRange::universe()),
        Some(Role::Nothing)
    );
}

#[test]
fn test_identical_input_identical_blueprint() {
    let (mut state, table_id) = ten_server_cluster(BTreeMap::from([(D1, 3), (D2, 2)]));
    state.tables.get_mut(&table_id).unwrap().shards = KeyRange::split_universe(&["c", "k", "s"]);
    let config = SuggesterConfig::default();

    let first: Blueprint<KeyRange> =
        suggest_table_blueprint(&state, &table_id, &config, &mut UsageTally::new()).unwrap();
    let second =
        suggest_table_blueprint(&state, &table_id, &config, &mut UsageTally::new()).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.fingerprint().unwrap(), second.fingerprint().unwrap());
}

#[test]
fn test_prioritize_distribution_spreads_primaries() {
    let shards = NonoverlappingRegions::for_sharding(KeyRange::split_universe(&["m"])).unwrap();
    let servers = BTreeMap::from([(server(1), D1), (server(2), D1)]);
    // Server 1 is primary everywhere today
    let snapshot = BTreeMap::from([(server(1), BusinessCard::uniform(Activity::Primary))]);
    let affinities = BTreeMap::from([(D1, 1)]);

    let primaries = |prioritize_distribution: bool| {
        let config = SuggesterConfig {
            prioritize_distribution,
            ..SuggesterConfig::default()
        };
        let inputs = PlacementInputs {
            snapshot: &snapshot,
            servers: &servers,
            primary_datacenter: D1,
            replica_affinities: &affinities,
            config: &config,
        };
        let blueprint = suggest_blueprint(
            &inputs,
            &shards,
            &RegionMap::new(),
            &RegionMap::new(),
            &mut UsageTally::new(),
        )
        .unwrap();
        shards
            .iter()
            .filter_map(|s| blueprint.primary_of(s))
            .collect::<Vec<_>>()
    };

    assert_eq!(primaries(false), vec![server(1), server(1)]);
    assert_eq!(primaries(true), vec![server(1), server(2)]);
}

#[test]
fn test_multi_table_rolls_back_failed_table() {
    let (mut state, good_table) = ten_server_cluster(BTreeMap::from([(D1, 2), (D2, 3)]));
    let bad_table = Uuid::from_u128(0x1);
    state.tables.insert(
        bad_table,
        TableConfig::new(D2, BTreeMap::from([(D2, 9)]), vec![KeyRange::universe()]),
    );

    let mut usage = UsageTally::new();
    let results = suggest_blueprints(&state, &SuggesterConfig::default(), &mut usage);

    assert_eq!(results.len(), 2);
    assert!(matches!(
        results[&bad_table],
        Err(Error::CannotSatisfyGoals { .. })
    ));
    assert!(results[&good_table].is_ok());
    // Only the successful table is charged: one primary and four secondaries
    assert_eq!(usage.total(), 10 + 4 * 8);
}

#[test]
fn test_unconstrained_affinity_uses_leftovers() {
    let (state, table_id) = ten_server_cluster(BTreeMap::from([(D1, 5), (UNCONSTRAINED, 5)]));

    let blueprint = suggest_table_blueprint(
        &state,
        &table_id,
        &SuggesterConfig::default(),
        &mut UsageTally::new(),
    )
    .unwrap();
    let shard = KeyRange::universe();
    assert_eq!(blueprint.servers_with(&shard, Role::Primary).len(), 1);
    assert_eq!(blueprint.servers_with(&shard, Role::Secondary).len(), 9);
    assert!(blueprint.servers_with(&shard, Role::Nothing).is_empty());
}

#[test]
fn test_deleted_server_still_erasing() {
    let (mut state, table_id) = ten_server_cluster(BTreeMap::from([(D1, 2)]));
    state.servers.get_mut(&server(10)).unwrap().deleted = true;
    state.directory.get_mut(&server(10)).unwrap().insert(
        table_id,
        BusinessCard::uniform(Activity::NothingWhenDoneErasing),
    );

    let blueprint = suggest_table_blueprint(
        &state,
        &table_id,
        &SuggesterConfig::default(),
        &mut UsageTally::new(),
    )
    .unwrap();
    let shard = KeyRange::universe();
    assert_eq!(blueprint.servers_with(&shard, Role::Primary).len(), 1);
    assert_eq!(blueprint.servers_with(&shard, Role::Secondary).len(), 1);
    assert!(blueprint.roles_of(&server(10)).is_none());
}

#[test]
fn test_unknown_table() {
    let (state, _) = ten_server_cluster(BTreeMap::new());
    let result = suggest_table_blueprint(
        &state,
        &Uuid::from_u128(42),
        &SuggesterConfig::default(),
        &mut UsageTally::new(),
    );
    assert!(matches!(result, Err(Error::UnknownTable(_))));
}

#[test]
fn test_malformed_shards_rejected_before_suggesting() {
    let (mut state, table_id) = ten_server_cluster(BTreeMap::from([(D1, 1)]));
    state.tables.get_mut(&table_id).unwrap().shards =
        vec![KeyRange::bounded("", "m"), KeyRange::from_key("n")];

    let result = suggest_table_blueprint(
        &state,
        &table_id,
        &SuggesterConfig::default(),
        &mut UsageTally::new(),
    );
    assert!(matches!(result, Err(Error::InvalidRegionSet(_))));
}
