//! Property tests for partitioning, filtering and moves.

use std::sync::Arc;

use proptest::prelude::*;
use sigboard_board::filter::derive_view;
use sigboard_board::{
    partition, Board, FilterKind, FilterSet, MoveOutcome, MoveRequest, WorkflowState,
};
use sigboard_storage::Record;

const STATUSES: &[&str] = &[
    "intake",
    "analysis",
    "monitoring",
    "confirmed-event",
    "discarded",
    "",
    "archived",
];
const SOURCES: &[&str] = &["Hospital", "Hotline", "Press"];
const RISKS: &[&str] = &["High", "Medium", "Low"];

fn arb_record(id: usize) -> impl Strategy<Value = Record> {
    (
        prop::sample::select(STATUSES),
        prop::option::of(prop::sample::select(SOURCES)),
        prop::option::of(prop::sample::select(RISKS)),
    )
        .prop_map(move |(status, source, risk)| {
            let mut r = Record::new(id as u64, &format!("signal {}", id), status);
            r.source_name = source.map(str::to_string);
            r.risk_level = risk.map(str::to_string);
            r
        })
}

fn arb_records() -> impl Strategy<Value = Vec<Record>> {
    (0usize..24).prop_flat_map(|n| (0..n).map(arb_record).collect::<Vec<_>>())
}

fn arb_filter() -> impl Strategy<Value = FilterSet> {
    (
        prop::option::of(prop::sample::select(SOURCES)),
        prop::option::of(prop::sample::select(RISKS)),
    )
        .prop_map(|(source, risk)| {
            let mut f = FilterSet::new();
            f.set(FilterKind::Source, source);
            f.set(FilterKind::Risk, risk);
            f
        })
}

proptest! {
    #[test]
    fn partition_places_every_record_once(records in arb_records()) {
        let columns = partition(records.clone());
        prop_assert_eq!(columns.total(), records.len());
        for record in &records {
            let (state, _, _) = columns.find(&record.id).unwrap();
            prop_assert_eq!(state, WorkflowState::resolve(&record.status));
        }
    }

    #[test]
    fn filtered_view_is_a_subsequence_of_master(records in arb_records(), filter in arb_filter()) {
        let master = Arc::new(partition(records));
        let view = derive_view(&master, &filter);

        for state in WorkflowState::ALL {
            let full = master.column(state).records();
            let mut cursor = full.iter();
            for shown in view.column(state).records() {
                prop_assert!(filter.matches(shown));
                // Same value, found in order in the master column.
                prop_assert!(cursor.any(|r| Arc::ptr_eq(r, shown)));
            }
            let expected = full.iter().filter(|r| filter.matches(r)).count();
            prop_assert_eq!(view.column(state).len(), expected);
        }
    }

    #[test]
    fn filtering_twice_changes_nothing(records in arb_records(), filter in arb_filter()) {
        let master = Arc::new(partition(records));
        let once = derive_view(&master, &filter);
        let twice = derive_view(&once, &filter);
        prop_assert_eq!(once.as_ref(), twice.as_ref());
    }

    #[test]
    fn inactive_filter_returns_master_itself(records in arb_records()) {
        let master = Arc::new(partition(records));
        prop_assert!(Arc::ptr_eq(&master, &derive_view(&master, &FilterSet::new())));
    }

    #[test]
    fn committed_move_conserves_records(
        records in arb_records(),
        filter in arb_filter(),
        pick in any::<prop::sample::Index>(),
        dest in prop::sample::select(WorkflowState::ALL.to_vec()),
        dest_index in 0usize..30,
    ) {
        prop_assume!(!records.is_empty());
        let mut board = Board::from_records(records.clone());
        board.set_filter(FilterKind::Source, filter.get(FilterKind::Source));
        board.set_filter(FilterKind::Risk, filter.get(FilterKind::Risk));

        let target = pick.get(&records);
        let (source, source_index, _) = board.find(&target.id).unwrap();
        let before_dest_len = board.columns().column(dest).len();

        let request = MoveRequest::new(target.id.clone(), source, source_index, dest, dest_index);
        match board.propose_move(request) {
            MoveOutcome::Committed(commit) => {
                prop_assert_eq!(board.columns().total(), records.len());
                let (state, index, moved) = board.find(&target.id).unwrap();
                prop_assert_eq!(state, dest);
                prop_assert_eq!(moved.status.as_str(), dest.id());
                prop_assert_eq!(commit.status, dest);
                if board.filter().is_active() && source != dest {
                    prop_assert_eq!(index, before_dest_len);
                }
            }
            MoveOutcome::AwaitingAnnotation => {
                prop_assert!(WorkflowState::requires_annotation(source, dest));
                let still_there = &board.columns().column(source).records()[source_index];
                prop_assert_eq!(&still_there.id, &target.id);
            }
            MoveOutcome::Unchanged(_) => {
                prop_assert_eq!(board.columns().total(), records.len());
            }
        }
    }
}
