//! Regras que dependem do Postgres: cada teste roda num banco novo com as migrações aplicadas.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use gestao_ti::{
    db::{RackRepository, TaskRepository, UserRepository, ViewRepository},
    models::{
        auth::{User, UserRole},
        task::{TaskFields, TaskPriority, AUTO_ARCHIVE_AFTER_HOURS},
        views::ViewTarget,
    },
    services::{rack_service::RackService, task_service::TaskService},
};

fn rack_service(pool: &PgPool) -> RackService {
    RackService::new(RackRepository::new(pool.clone()), pool.clone())
}

fn task_service(pool: &PgPool) -> TaskService {
    TaskService::new(TaskRepository::new(pool.clone()), ViewRepository::new(pool.clone()), pool.clone())
}

async fn create_user(pool: &PgPool, email: &str) -> User {
    UserRepository::new(pool.clone())
        .create_user(pool, email, "Pessoa de Teste", None, UserRole::Usuario, "hash")
        .await
        .unwrap()
}

async fn create_concluded_task(pool: &PgPool, creator: &User, updated_at: DateTime<Utc>) -> Uuid {
    let fields = TaskFields {
        title: "Trocar toner".to_string(),
        description: None,
        due_date: None,
        assignee_id: None,
        priority: TaskPriority::Media,
    };
    let task = TaskRepository::new(pool.clone()).create(creator.id, &fields).await.unwrap();
    sqlx::query("UPDATE tasks SET status = 'Concluída', updated_at = $2 WHERE id = $1")
        .bind(task.id)
        .bind(updated_at)
        .execute(pool)
        .await
        .unwrap();
    task.id
}

async fn address_count(pool: &PgPool, rack_id: Uuid) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM rack_addresses WHERE rack_id = $1")
        .bind(rack_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn new_rack_gets_one_address_per_level_and_position(pool: PgPool) {
    let layout = rack_service(&pool).create_rack("  Rack A  ", 3, 4).await.unwrap();

    assert_eq!(layout.rack.name, "Rack A");
    assert_eq!(layout.structure.len(), 3);
    assert_eq!(address_count(&pool, layout.rack.id).await, 12);

    let pairs: HashSet<(i32, String)> = layout
        .structure
        .iter()
        .flat_map(|level| level.positions.iter().map(|a| (a.level, a.name.clone())))
        .collect();
    assert_eq!(pairs.len(), 12);
    assert!(pairs.contains(&(1, "A".to_string())));
    assert!(pairs.contains(&(3, "D".to_string())));
}

#[sqlx::test(migrations = "./migrations")]
async fn deleting_a_rack_removes_its_addresses(pool: PgPool) {
    let service = rack_service(&pool);
    let kept = service.create_rack("Rack Mantido", 1, 2).await.unwrap();
    let removed = service.create_rack("Rack Removido", 2, 3).await.unwrap();

    assert!(service.delete_rack(removed.rack.id, false).await.is_err());
    assert_eq!(address_count(&pool, removed.rack.id).await, 6);

    service.delete_rack(removed.rack.id, true).await.unwrap();

    assert_eq!(address_count(&pool, removed.rack.id).await, 0);
    assert_eq!(address_count(&pool, kept.rack.id).await, 2);
    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM racks").fetch_one(&pool).await.unwrap();
    assert_eq!(remaining, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn repeated_views_keep_one_row_with_the_latest_time(pool: PgPool) {
    let user = create_user(&pool, "viewer@empresa.com").await;
    let task_id = create_concluded_task(&pool, &user, Utc::now()).await;
    let views = ViewRepository::new(pool.clone());

    let first = views.upsert(ViewTarget::Task, task_id, user.id).await.unwrap();
    let second = views.upsert(ViewTarget::Task, task_id, user.id).await.unwrap();
    assert!(second >= first);

    // Um registro no futuro não volta no tempo com um novo upsert
    let future = Utc::now() + Duration::days(1);
    sqlx::query("UPDATE task_views SET viewed_at = $3 WHERE task_id = $1 AND user_id = $2")
        .bind(task_id)
        .bind(user.id)
        .bind(future)
        .execute(&pool)
        .await
        .unwrap();
    let kept = views.upsert(ViewTarget::Task, task_id, user.id).await.unwrap();
    assert_eq!(kept.timestamp(), future.timestamp());

    let stored = views.list_for(ViewTarget::Task, task_id).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].user_id, user.id);
    assert_eq!(stored[0].viewed_at, kept);
}

#[sqlx::test(migrations = "./migrations")]
async fn concluded_tasks_are_archived_only_after_eight_hours(pool: PgPool) {
    let user = create_user(&pool, "quadro@empresa.com").await;
    let now = Utc::now();

    let old = create_concluded_task(&pool, &user, now - Duration::hours(9)).await;
    let exact = create_concluded_task(&pool, &user, now - Duration::hours(AUTO_ARCHIVE_AFTER_HOURS)).await;
    let recent = create_concluded_task(&pool, &user, now - Duration::hours(7)).await;

    let report = task_service(&pool).archive_due(now).await.unwrap();

    let archived: HashSet<Uuid> = report.archived_ids.into_iter().collect();
    assert_eq!(archived, HashSet::from([old, exact]));

    let status: String = sqlx::query_scalar("SELECT status::text FROM tasks WHERE id = $1")
        .bind(recent)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(status, "Concluída");

    let again = task_service(&pool).archive_due(now).await.unwrap();
    assert!(again.archived_ids.is_empty());
}
