use auratasks_core::db::{open_db, open_db_in_memory};
use auratasks_core::{
    BatchRejection, OrderAssignment, SqliteTaskRepository, Task, TaskDraft, TaskPriority,
    TaskService, TaskServiceError, TaskStatus, MAX_TASK_ORDER,
};
use rusqlite::Connection;
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;
use uuid::Uuid;

const ALICE: &str = "alice@example.com";
const BOB: &str = "bob@example.com";

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn service(conn: &Connection) -> TaskService<SqliteTaskRepository<'_>> {
    TaskService::new(SqliteTaskRepository::try_new(conn).unwrap())
}

fn orders(tasks: &[Task]) -> Vec<i64> {
    tasks.iter().map(|task| task.sort_order).collect()
}

fn titles(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(|task| task.title.as_str()).collect()
}

#[test]
fn append_assigns_consecutive_orders_from_zero() {
    let conn = setup();
    let service = service(&conn);

    let a = service.append(ALICE, TaskDraft::new("A")).unwrap();
    let b = service.append(ALICE, TaskDraft::new("B")).unwrap();
    let c = service.append(ALICE, TaskDraft::new("C")).unwrap();

    assert_eq!((a.sort_order, b.sort_order, c.sort_order), (0, 1, 2));
    let listed = service.list(ALICE).unwrap();
    assert_eq!(titles(&listed), vec!["A", "B", "C"]);
}

#[test]
fn append_is_partitioned_by_owner() {
    let conn = setup();
    let service = service(&conn);

    service.append(ALICE, TaskDraft::new("a0")).unwrap();
    service.append(ALICE, TaskDraft::new("a1")).unwrap();
    let first_of_bob = service.append(BOB, TaskDraft::new("b0")).unwrap();

    assert_eq!(first_of_bob.sort_order, 0);
    assert_eq!(first_of_bob.owner, BOB);
    assert_eq!(service.list(BOB).unwrap().len(), 1);
}

#[test]
fn append_stores_payload_fields() {
    let conn = setup();
    let service = service(&conn);

    let draft = TaskDraft {
        title: "  Ship release ".to_string(),
        description: Some("cut tag".to_string()),
        status: TaskStatus::InProgress,
        due_date: Some(1_717_200_000_000),
        priority: Some(TaskPriority::High),
    };
    let task = service.append(ALICE, draft).unwrap();

    let loaded = service.get(ALICE, task.id).unwrap();
    assert_eq!(loaded.title, "Ship release");
    assert_eq!(loaded.description.as_deref(), Some("cut tag"));
    assert_eq!(loaded.status, TaskStatus::InProgress);
    assert_eq!(loaded.due_date, Some(1_717_200_000_000));
    assert_eq!(loaded.priority, Some(TaskPriority::High));
}

#[test]
fn append_rejects_blank_title_without_writing() {
    let conn = setup();
    let service = service(&conn);

    let err = service.append(ALICE, TaskDraft::new("   ")).unwrap_err();
    assert!(matches!(err, TaskServiceError::InvalidTask(_)));
    assert!(service.list(ALICE).unwrap().is_empty());
}

#[test]
fn delete_compacts_later_orders() {
    let conn = setup();
    let service = service(&conn);

    let ids: Vec<_> = ["t0", "t1", "t2", "t3"]
        .into_iter()
        .map(|title| service.append(ALICE, TaskDraft::new(title)).unwrap().id)
        .collect();

    service.delete(ALICE, ids[1]).unwrap();

    let listed = service.list(ALICE).unwrap();
    assert_eq!(orders(&listed), vec![0, 1, 2]);
    assert_eq!(titles(&listed), vec!["t0", "t2", "t3"]);
}

#[test]
fn delete_of_last_and_only_task_leaves_empty_list() {
    let conn = setup();
    let service = service(&conn);

    let only = service.append(ALICE, TaskDraft::new("only")).unwrap();
    service.delete(ALICE, only.id).unwrap();

    assert!(service.list(ALICE).unwrap().is_empty());
    let next = service.append(ALICE, TaskDraft::new("again")).unwrap();
    assert_eq!(next.sort_order, 0);
}

#[test]
fn delete_of_foreign_task_is_not_found_and_leaves_owner_untouched() {
    let conn = setup();
    let service = service(&conn);

    let bob_task = service.append(BOB, TaskDraft::new("bob's")).unwrap();
    service.append(BOB, TaskDraft::new("bob's second")).unwrap();
    let before = service.list(BOB).unwrap();

    let err = service.delete(ALICE, bob_task.id).unwrap_err();
    assert!(matches!(err, TaskServiceError::NotFound(id) if id == bob_task.id));
    assert!(!err.is_retryable());
    assert_eq!(service.list(BOB).unwrap(), before);
}

#[test]
fn delete_of_missing_task_matches_foreign_task_outcome() {
    let conn = setup();
    let service = service(&conn);

    let missing = Uuid::new_v4();
    let err = service.delete(ALICE, missing).unwrap_err();
    assert!(matches!(err, TaskServiceError::NotFound(id) if id == missing));
}

#[test]
fn density_holds_over_mixed_appends_and_deletes() {
    let conn = setup();
    let service = service(&conn);

    let mut live = Vec::new();
    for round in 0..6 {
        for index in 0..3 {
            let task = service
                .append(ALICE, TaskDraft::new(format!("r{round}-{index}")))
                .unwrap();
            live.push(task.id);
        }
        // Remove from the front, middle and back on alternating rounds.
        let victim = match round % 3 {
            0 => live.remove(0),
            1 => live.remove(live.len() / 2),
            _ => live.pop().unwrap(),
        };
        service.delete(ALICE, victim).unwrap();

        let listed = service.list(ALICE).unwrap();
        let expected: Vec<i64> = (0..listed.len() as i64).collect();
        assert_eq!(orders(&listed), expected);
        assert_eq!(listed.iter().map(|task| task.id).collect::<Vec<_>>(), live);
    }
}

#[test]
fn reorder_applies_assignments_and_list_follows_them() {
    let conn = setup();
    let service = service(&conn);

    let a = service.append(ALICE, TaskDraft::new("A")).unwrap();
    let b = service.append(ALICE, TaskDraft::new("B")).unwrap();
    let c = service.append(ALICE, TaskDraft::new("C")).unwrap();

    service
        .reorder(
            ALICE,
            &[
                OrderAssignment::new(c.id, 0),
                OrderAssignment::new(a.id, 1),
                OrderAssignment::new(b.id, 2),
            ],
        )
        .unwrap();

    let listed = service.list(ALICE).unwrap();
    assert_eq!(titles(&listed), vec!["C", "A", "B"]);
    assert_eq!(orders(&listed), vec![0, 1, 2]);
}

#[test]
fn reorder_with_one_foreign_id_applies_nothing() {
    let conn = setup();
    let service = service(&conn);

    let a = service.append(ALICE, TaskDraft::new("A")).unwrap();
    let b = service.append(ALICE, TaskDraft::new("B")).unwrap();
    let foreign = service.append(BOB, TaskDraft::new("bob's")).unwrap();
    let alice_before = service.list(ALICE).unwrap();
    let bob_before = service.list(BOB).unwrap();

    let err = service
        .reorder(
            ALICE,
            &[
                OrderAssignment::new(a.id, 1),
                OrderAssignment::new(b.id, 0),
                OrderAssignment::new(foreign.id, 2),
            ],
        )
        .unwrap_err();

    assert!(matches!(
        err,
        TaskServiceError::InvalidBatch(BatchRejection::UnknownOrForeignIds)
    ));
    assert_eq!(service.list(ALICE).unwrap(), alice_before);
    assert_eq!(service.list(BOB).unwrap(), bob_before);
}

#[test]
fn reorder_with_unknown_id_is_invalid_batch() {
    let conn = setup();
    let service = service(&conn);
    let a = service.append(ALICE, TaskDraft::new("A")).unwrap();

    let err = service
        .reorder(
            ALICE,
            &[
                OrderAssignment::new(a.id, 3),
                OrderAssignment::new(Uuid::new_v4(), 0),
            ],
        )
        .unwrap_err();
    assert!(matches!(err, TaskServiceError::InvalidBatch(_)));
    assert_eq!(service.get(ALICE, a.id).unwrap().sort_order, 0);
}

#[test]
fn reorder_rejects_duplicate_ids_and_negative_orders() {
    let conn = setup();
    let service = service(&conn);
    let a = service.append(ALICE, TaskDraft::new("A")).unwrap();

    let duplicate = service
        .reorder(
            ALICE,
            &[OrderAssignment::new(a.id, 0), OrderAssignment::new(a.id, 1)],
        )
        .unwrap_err();
    assert!(matches!(
        duplicate,
        TaskServiceError::InvalidBatch(BatchRejection::DuplicateId(id)) if id == a.id
    ));

    let negative = service
        .reorder(ALICE, &[OrderAssignment::new(a.id, -4)])
        .unwrap_err();
    assert!(matches!(
        negative,
        TaskServiceError::InvalidBatch(BatchRejection::NegativeOrder { order: -4, .. })
    ));
}

#[test]
fn empty_reorder_is_a_noop() {
    let conn = setup();
    let service = service(&conn);
    service.append(ALICE, TaskDraft::new("A")).unwrap();
    let before = service.list(ALICE).unwrap();

    service.reorder(ALICE, &[]).unwrap();
    assert_eq!(service.list(ALICE).unwrap(), before);
}

#[test]
fn partial_reorder_keeps_unlisted_orders_even_on_collision() {
    let conn = setup();
    let service = service(&conn);

    let a = service.append(ALICE, TaskDraft::new("A")).unwrap();
    let b = service.append(ALICE, TaskDraft::new("B")).unwrap();
    let c = service.append(ALICE, TaskDraft::new("C")).unwrap();

    service
        .reorder(ALICE, &[OrderAssignment::new(c.id, 0)])
        .unwrap();

    assert_eq!(service.get(ALICE, a.id).unwrap().sort_order, 0);
    assert_eq!(service.get(ALICE, b.id).unwrap().sort_order, 1);
    assert_eq!(service.get(ALICE, c.id).unwrap().sort_order, 0);

    let listed = service.list(ALICE).unwrap();
    assert_eq!(orders(&listed), vec![0, 0, 1]);
    // Ties fall back to creation order.
    assert_eq!(titles(&listed), vec!["A", "C", "B"]);
}

#[test]
fn append_after_reorder_continues_from_max_order() {
    let conn = setup();
    let service = service(&conn);

    let a = service.append(ALICE, TaskDraft::new("A")).unwrap();
    service
        .reorder(ALICE, &[OrderAssignment::new(a.id, 7)])
        .unwrap();

    let next = service.append(ALICE, TaskDraft::new("B")).unwrap();
    assert_eq!(next.sort_order, 8);
}

#[test]
fn reorder_refuses_orders_that_would_exhaust_append() {
    let conn = setup();
    let service = service(&conn);
    let a = service.append(ALICE, TaskDraft::new("A")).unwrap();

    let err = service
        .reorder(ALICE, &[OrderAssignment::new(a.id, i64::MAX)])
        .unwrap_err();
    assert!(matches!(
        err,
        TaskServiceError::InvalidBatch(BatchRejection::OrderTooLarge { order: i64::MAX, .. })
    ));
    assert!(!err.is_retryable());
    assert_eq!(service.get(ALICE, a.id).unwrap().sort_order, 0);

    service
        .reorder(ALICE, &[OrderAssignment::new(a.id, MAX_TASK_ORDER)])
        .unwrap();
    let next = service.append(ALICE, TaskDraft::new("B")).unwrap();
    assert_eq!(next.sort_order, MAX_TASK_ORDER + 1);
}

#[test]
fn update_replaces_payload_but_keeps_order() {
    let conn = setup();
    let service = service(&conn);

    service.append(ALICE, TaskDraft::new("first")).unwrap();
    let second = service.append(ALICE, TaskDraft::new("second")).unwrap();

    let mut draft = TaskDraft::new("second, renamed");
    draft.status = TaskStatus::Done;
    draft.priority = Some(TaskPriority::Low);
    let updated = service.update(ALICE, second.id, draft).unwrap();

    assert_eq!(updated.title, "second, renamed");
    assert_eq!(updated.status, TaskStatus::Done);
    assert_eq!(updated.sort_order, 1);
    assert_eq!(updated.created_at, second.created_at);
}

#[test]
fn update_of_foreign_task_is_not_found() {
    let conn = setup();
    let service = service(&conn);
    let bob_task = service.append(BOB, TaskDraft::new("bob's")).unwrap();

    let err = service
        .update(ALICE, bob_task.id, TaskDraft::new("hijack"))
        .unwrap_err();
    assert!(matches!(err, TaskServiceError::NotFound(_)));
    assert_eq!(service.get(BOB, bob_task.id).unwrap().title, "bob's");
}

#[test]
fn list_is_idempotent_without_mutation() {
    let conn = setup();
    let service = service(&conn);
    for title in ["x", "y", "z"] {
        service.append(ALICE, TaskDraft::new(title)).unwrap();
    }

    let first = service.list(ALICE).unwrap();
    let second = service.list(ALICE).unwrap();
    assert_eq!(first, second);
}

#[test]
fn concurrent_appends_never_share_an_order() {
    const WRITERS: usize = 4;
    const PER_WRITER: usize = 10;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("race.sqlite3");
    drop(open_db(&path).unwrap());

    let barrier = Arc::new(Barrier::new(WRITERS));
    let handles: Vec<_> = (0..WRITERS)
        .map(|writer| {
            let path = path.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let conn = open_db(&path).unwrap();
                let service = TaskService::new(SqliteTaskRepository::try_new(&conn).unwrap());
                barrier.wait();
                (0..PER_WRITER)
                    .map(|index| {
                        service
                            .append(ALICE, TaskDraft::new(format!("w{writer}-{index}")))
                            .unwrap()
                            .sort_order
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut assigned = HashSet::new();
    for handle in handles {
        for order in handle.join().unwrap() {
            assert!(assigned.insert(order), "order {order} assigned twice");
        }
    }

    let conn = open_db(&path).unwrap();
    let listed = service(&conn).list(ALICE).unwrap();
    let expected: Vec<i64> = (0..(WRITERS * PER_WRITER) as i64).collect();
    assert_eq!(orders(&listed), expected);
}

#[test]
fn locked_store_surfaces_retryable_fault_and_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("locked.sqlite3");

    let conn = open_db(&path).unwrap();
    conn.busy_timeout(Duration::from_millis(50)).unwrap();
    let service = service(&conn);
    let a = service.append(ALICE, TaskDraft::new("A")).unwrap();
    let b = service.append(ALICE, TaskDraft::new("B")).unwrap();
    let before = service.list(ALICE).unwrap();

    let blocker = open_db(&path).unwrap();
    blocker.execute_batch("BEGIN IMMEDIATE;").unwrap();

    let failures = [
        service.append(ALICE, TaskDraft::new("C")).unwrap_err(),
        service.delete(ALICE, a.id).unwrap_err(),
        service
            .reorder(
                ALICE,
                &[OrderAssignment::new(a.id, 1), OrderAssignment::new(b.id, 0)],
            )
            .unwrap_err(),
    ];
    for err in &failures {
        assert!(
            matches!(err, TaskServiceError::StoreUnavailable(cause) if cause.is_busy()),
            "unexpected error: {err}"
        );
        assert!(err.is_retryable());
    }

    blocker.execute_batch("ROLLBACK;").unwrap();
    assert_eq!(service.list(ALICE).unwrap(), before);
}
