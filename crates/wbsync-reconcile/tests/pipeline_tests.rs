//! Component tests: mapping resolution, item location, mutation execution
//! and the single-record pipeline against an in-memory board.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use helpers::fake_board::FakeBoard;
use helpers::test_data::*;
use wbsync_monday::api::BoardApi;
use wbsync_monday::column::ColumnValuePayload;
use wbsync_monday::error::MondayClientError;
use wbsync_reconcile::engine::{Action, ActionKind};
use wbsync_reconcile::error::ReconcileError;
use wbsync_reconcile::executor::MutationExecutor;
use wbsync_reconcile::locator::ItemLocator;
use wbsync_reconcile::model::{BoardId, ItemId, ProjectId};
use wbsync_reconcile::pipeline::{Pipeline, PipelineResult, PipelineStage};
use wbsync_reconcile::resolver::BoardMappingResolver;

const TIMEOUT: Duration = Duration::from_secs(5);

fn mapping_resolver(fake: &Arc<FakeBoard>) -> BoardMappingResolver {
    let api: Arc<dyn BoardApi> = fake.clone();
    BoardMappingResolver::new(api, board_mapping_config().mapping, TIMEOUT)
}

fn locator(fake: &Arc<FakeBoard>) -> ItemLocator {
    let api: Arc<dyn BoardApi> = fake.clone();
    ItemLocator::new(api, "wbs__1", TIMEOUT)
}

// ═══════════════════════════════════════════════════════════════════════════
// BoardMappingResolver
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_resolve_from_mapping_board() {
    let fake = Arc::new(FakeBoard::new());
    fake.add_item(
        &mapping_board(),
        1,
        "Project 123",
        &[("text__project", "123"), ("text__board", "1234567890")],
    );
    fake.add_item(
        &mapping_board(),
        2,
        "Project 456",
        &[("text__project", "456"), ("text__board", "2222222222")],
    );

    let mapping = mapping_resolver(&fake)
        .resolve(&ProjectId::new("123"))
        .await
        .unwrap();

    assert_eq!(mapping.board_id, target_board());
    assert_eq!(mapping.project_id.as_str(), "123");
}

#[tokio::test]
async fn test_resolve_is_case_sensitive() {
    let fake = Arc::new(FakeBoard::new());
    fake.add_item(
        &mapping_board(),
        1,
        "Project",
        &[("text__project", "PRJ-A"), ("text__board", "1234567890")],
    );

    let err = mapping_resolver(&fake)
        .resolve(&ProjectId::new("prj-a"))
        .await
        .unwrap_err();
    assert!(matches!(err, ReconcileError::NotFound { .. }));
}

#[tokio::test]
async fn test_resolve_ambiguous_mapping() {
    let fake = Arc::new(FakeBoard::new());
    for id in [1, 2] {
        fake.add_item(
            &mapping_board(),
            id,
            "dup",
            &[("text__project", "123"), ("text__board", "1234567890")],
        );
    }

    let err = mapping_resolver(&fake)
        .resolve(&ProjectId::new("123"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ReconcileError::AmbiguousMapping { count: 2, .. }
    ));
}

#[tokio::test]
async fn test_resolve_row_without_board_id_is_invalid() {
    let fake = Arc::new(FakeBoard::new());
    fake.add_item(
        &mapping_board(),
        1,
        "broken",
        &[("text__project", "123"), ("text__board", "see finance")],
    );
    fake.add_item(&mapping_board(), 2, "empty", &[("text__project", "456")]);

    let resolver = mapping_resolver(&fake);
    assert!(matches!(
        resolver.resolve(&ProjectId::new("123")).await,
        Err(ReconcileError::InvalidMapping { .. })
    ));
    assert!(matches!(
        resolver.resolve(&ProjectId::new("456")).await,
        Err(ReconcileError::InvalidMapping { .. })
    ));
}

#[tokio::test]
async fn test_resolve_static_mapping() {
    let fake = Arc::new(FakeBoard::new());
    let api: Arc<dyn BoardApi> = fake.clone();
    let resolver = BoardMappingResolver::new(api, static_config().mapping, TIMEOUT);

    let mapping = resolver.resolve(&ProjectId::new("123")).await.unwrap();
    assert_eq!(mapping.board_id, target_board());
    assert!(matches!(
        resolver.resolve(&ProjectId::new("999")).await,
        Err(ReconcileError::NotFound { .. })
    ));
    assert_eq!(fake.query_count(), 0);
}

#[tokio::test]
async fn test_resolve_query_failure_classification() {
    let fake = Arc::new(FakeBoard::new());
    fake.fail_next_query(MondayClientError::RateLimited {
        retry_after_secs: None,
    });
    fake.fail_next_query(MondayClientError::AuthError("revoked".into()));

    let resolver = mapping_resolver(&fake);
    let project = ProjectId::new("123");
    assert!(matches!(
        resolver.resolve(&project).await,
        Err(ReconcileError::Transport(_))
    ));
    assert!(matches!(
        resolver.resolve(&project).await,
        Err(ReconcileError::LookupFailed(_))
    ));
}

// ═══════════════════════════════════════════════════════════════════════════
// ItemLocator
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_locate_none_one_many() {
    let fake = Arc::new(FakeBoard::new());
    fake.add_item(&target_board(), EXISTING_ITEM, "X", &[("wbs__1", "2000000036.2")]);
    fake.add_item(&target_board(), 10, "A", &[("wbs__1", "DUP")]);
    fake.add_item(&target_board(), 11, "B", &[("wbs__1", "DUP")]);

    let locator = locator(&fake);

    assert!(locator.find(&target_board(), "2000000036.3").await.unwrap().is_none());

    let found = locator
        .find(&target_board(), "2000000036.2")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, ItemId::from(EXISTING_ITEM));

    match locator.find(&target_board(), "DUP").await {
        Err(ReconcileError::AmbiguousItem { item_ids, key, .. }) => {
            assert_eq!(key, "DUP");
            assert_eq!(item_ids, vec![ItemId::from(10_u64), ItemId::from(11_u64)]);
        }
        other => panic!("expected AmbiguousItem, got {other:?}"),
    }
}

#[tokio::test]
async fn test_locate_filters_loose_server_matches() {
    let fake = Arc::new(FakeBoard::new());
    fake.add_item(&target_board(), 10, "upper", &[("wbs__1", "WBS-A")]);
    fake.add_item(&target_board(), 11, "lower", &[("wbs__1", "wbs-a")]);

    let found = locator(&fake)
        .find(&target_board(), "wbs-a")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, ItemId::from(11_u64));
}

#[tokio::test(start_paused = true)]
async fn test_locate_times_out_as_transport_error() {
    let fake = Arc::new(FakeBoard::new().with_query_delay(Duration::from_secs(60)));
    let api: Arc<dyn BoardApi> = fake.clone();
    let locator = ItemLocator::new(api, "wbs__1", Duration::from_secs(2));

    let err = locator.find(&target_board(), "W").await.unwrap_err();
    assert!(err.is_retryable());
    assert!(err.to_string().contains("timed out"));
}

#[tokio::test]
async fn test_truncated_lookup_fails_record_without_mutation() {
    let fake = Arc::new(FakeBoard::new());
    fake.fail_next_query(MondayClientError::ResultTruncated {
        board_id: target_board(),
        pages: 50,
    });
    let api: Arc<dyn BoardApi> = fake.clone();
    let pipeline = Pipeline::new(api, &static_config());

    let failure = pipeline.run(&scenario_record(), false).await.unwrap_err();
    assert_eq!(failure.stage, PipelineStage::Locating);
    assert!(matches!(failure.error, ReconcileError::LookupFailed(_)));
    assert!(!failure.error.is_retryable());
    assert_eq!(fake.mutation_count(), 0);
}

// ═══════════════════════════════════════════════════════════════════════════
// MutationExecutor
// ═══════════════════════════════════════════════════════════════════════════

fn create(name: &str) -> Action {
    Action::Create {
        board_id: target_board(),
        name: name.into(),
        column_values: ColumnValuePayload::new().with("wbs__1", name),
    }
}

#[tokio::test]
async fn test_execute_create_and_update() {
    let fake = Arc::new(FakeBoard::new());
    fake.add_item(&target_board(), EXISTING_ITEM, "X", &[("wbs__1", "W")]);
    let api: Arc<dyn BoardApi> = fake.clone();
    let executor = MutationExecutor::new(api, TIMEOUT);

    let created = executor.execute(&create("NEW")).await.unwrap();
    assert_eq!(fake.creates().len(), 1);
    assert_eq!(fake.creates()[0].name, "NEW");

    let updated = executor
        .execute(&Action::Update {
            board_id: target_board(),
            item_id: ItemId::from(EXISTING_ITEM),
            column_values: ColumnValuePayload::new().with("wbs__1", "W"),
        })
        .await
        .unwrap();
    assert_eq!(updated, ItemId::from(EXISTING_ITEM));
    assert_ne!(created, updated);
    assert_eq!(fake.mutation_count(), 2);
}

#[tokio::test]
async fn test_execute_rejection_is_not_retryable() {
    let fake = Arc::new(FakeBoard::new());
    fake.fail_next_mutation(MondayClientError::GraphQl {
        code: Some("ColumnValueException".into()),
        message: "invalid value".into(),
    });
    let api: Arc<dyn BoardApi> = fake.clone();
    let executor = MutationExecutor::new(api, TIMEOUT);

    let err = executor.execute(&create("A")).await.unwrap_err();
    assert!(matches!(err, ReconcileError::MutationRejected(_)));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_execute_all_reports_each_action() {
    let fake = Arc::new(FakeBoard::new());
    let api: Arc<dyn BoardApi> = fake.clone();
    let executor = MutationExecutor::new(api, TIMEOUT);

    let missing_item = Action::Update {
        board_id: BoardId::from(5_u64),
        item_id: ItemId::from(1_u64),
        column_values: ColumnValuePayload::new().with("wbs__1", "B"),
    };
    let results = executor
        .execute_all(vec![create("A"), missing_item, create("C")])
        .await;

    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(ReconcileError::MutationRejected(_))));
    assert!(results[2].is_ok());
    assert_eq!(fake.creates().len(), 2);
}

// ═══════════════════════════════════════════════════════════════════════════
// Pipeline
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_pipeline_scenario_create_then_update() {
    let fake = Arc::new(FakeBoard::new());
    let api: Arc<dyn BoardApi> = fake.clone();
    let pipeline = Pipeline::new(api, &static_config());

    let first = pipeline.run(&scenario_record(), false).await.unwrap();
    let PipelineResult::Applied { item_id, kind } = first else {
        panic!("expected applied result");
    };
    assert_eq!(kind, ActionKind::Create);
    assert_eq!(fake.creates()[0].column_values.encode(), SCENARIO_PAYLOAD);

    let second = pipeline.run(&scenario_record(), false).await.unwrap();
    assert_eq!(
        second,
        PipelineResult::Applied {
            item_id,
            kind: ActionKind::Update
        }
    );
    assert_eq!(fake.creates().len(), 1);
    assert_eq!(fake.updates()[0].column_values.encode(), SCENARIO_PAYLOAD);
    assert!(pipeline.locks().is_empty());
}

#[tokio::test]
async fn test_pipeline_failure_reports_stage() {
    let fake = Arc::new(FakeBoard::new());
    fake.add_item(&target_board(), 10, "A", &[("wbs__1", "2000000036.2")]);
    fake.add_item(&target_board(), 11, "B", &[("wbs__1", "2000000036.2")]);
    let api: Arc<dyn BoardApi> = fake.clone();
    let pipeline = Pipeline::new(api, &static_config());

    let failure = pipeline.run(&scenario_record(), false).await.unwrap_err();
    assert_eq!(failure.stage, PipelineStage::Locating);
    assert!(matches!(failure.error, ReconcileError::AmbiguousItem { .. }));
    assert_eq!(fake.mutation_count(), 0);

    let unmapped = pipeline
        .run(&record("999", "W"), false)
        .await
        .unwrap_err();
    assert_eq!(unmapped.stage, PipelineStage::Resolving);
    assert!(unmapped.error.is_skip());
}
