use domain::{
    DomainError, NewTodo, SortBy, SortOrder, TodoFilter, TodoPatch, TodoPriority, TodoRepository,
    TodoStatus, UserRepository,
};
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

/// Helper to create a user for todo tests (todos require a valid user_id)
async fn create_test_user(pool: &PgPool, email: &str) -> Result<Uuid, DomainError> {
    let user = UserRepository::create(pool, "tester", email, "hash").await?;
    Ok(user.id)
}

fn new_todo(user_id: Uuid, title: &str) -> NewTodo {
    NewTodo {
        user_id,
        title: title.to_string(),
        description: None,
        priority: TodoPriority::Medium,
        due_date: None,
        tags: Vec::new(),
    }
}

fn filter(user_id: Uuid) -> TodoFilter {
    TodoFilter {
        user_id,
        status: None,
        priority: None,
        search: None,
    }
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_create_todo(pool: PgPool) -> Result<(), DomainError> {
    let user_id = create_test_user(&pool, "todo@example.com").await?;

    let todo = TodoRepository::create(
        &pool,
        NewTodo {
            user_id,
            title: "My Task".to_string(),
            description: Some("A description".to_string()),
            priority: TodoPriority::High,
            due_date: None,
            tags: vec!["home".to_string()],
        },
    )
    .await?;

    assert_eq!(todo.user_id, user_id);
    assert_eq!(todo.title, "My Task");
    assert_eq!(todo.description, Some("A description".to_string()));
    assert_eq!(todo.status, TodoStatus::Pending);
    assert_eq!(todo.priority, TodoPriority::High);
    assert!(todo.completed_at.is_none());
    assert_eq!(todo.tags, vec!["home".to_string()]);
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_find_by_id_scoped_to_owner(pool: PgPool) -> Result<(), DomainError> {
    let owner = create_test_user(&pool, "owner@example.com").await?;
    let stranger = create_test_user(&pool, "stranger@example.com").await?;

    let created = TodoRepository::create(&pool, new_todo(owner, "Mine")).await?;

    let found = TodoRepository::find_by_id(&pool, created.id, owner).await?;
    assert!(found.is_some());
    assert_eq!(found.unwrap().id, created.id);

    // The same id under another user resolves to nothing
    let hidden = TodoRepository::find_by_id(&pool, created.id, stranger).await?;
    assert!(hidden.is_none());
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_list_counts_and_pages(pool: PgPool) -> Result<(), DomainError> {
    let user_id = create_test_user(&pool, "list@example.com").await?;

    for i in 1..=5 {
        TodoRepository::create(&pool, new_todo(user_id, &format!("Task {i}"))).await?;
    }

    let (todos, total) = TodoRepository::list(
        &pool,
        &filter(user_id),
        SortBy::CreatedAt,
        SortOrder::Desc,
        2,
        2,
    )
    .await?;

    assert_eq!(total, 5);
    assert_eq!(todos.len(), 2);
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_list_filters_by_status_and_priority(pool: PgPool) -> Result<(), DomainError> {
    let user_id = create_test_user(&pool, "filter@example.com").await?;

    let done = TodoRepository::create(&pool, new_todo(user_id, "Done task")).await?;
    TodoRepository::create(
        &pool,
        NewTodo {
            priority: TodoPriority::High,
            ..new_todo(user_id, "Urgent task")
        },
    )
    .await?;

    TodoRepository::update(
        &pool,
        done.id,
        user_id,
        TodoPatch {
            status: Some(TodoStatus::Completed),
            ..TodoPatch::default()
        },
    )
    .await?;

    let (completed, total) = TodoRepository::list(
        &pool,
        &TodoFilter {
            status: Some(TodoStatus::Completed),
            ..filter(user_id)
        },
        SortBy::CreatedAt,
        SortOrder::Desc,
        10,
        0,
    )
    .await?;
    assert_eq!(total, 1);
    assert_eq!(completed[0].title, "Done task");

    let (high, total) = TodoRepository::list(
        &pool,
        &TodoFilter {
            priority: Some(TodoPriority::High),
            ..filter(user_id)
        },
        SortBy::CreatedAt,
        SortOrder::Desc,
        10,
        0,
    )
    .await?;
    assert_eq!(total, 1);
    assert_eq!(high[0].title, "Urgent task");
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_list_search_matches_title_and_description(pool: PgPool) -> Result<(), DomainError> {
    let user_id = create_test_user(&pool, "search@example.com").await?;

    TodoRepository::create(&pool, new_todo(user_id, "Buy groceries")).await?;
    TodoRepository::create(
        &pool,
        NewTodo {
            description: Some("pick up groceries on the way".to_string()),
            ..new_todo(user_id, "Errands")
        },
    )
    .await?;
    TodoRepository::create(&pool, new_todo(user_id, "Unrelated")).await?;

    // Case-insensitive, over title or description
    let (matches, total) = TodoRepository::list(
        &pool,
        &TodoFilter {
            search: Some("GROCERIES".to_string()),
            ..filter(user_id)
        },
        SortBy::Title,
        SortOrder::Asc,
        10,
        0,
    )
    .await?;

    assert_eq!(total, 2);
    assert_eq!(matches[0].title, "Buy groceries");
    assert_eq!(matches[1].title, "Errands");
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_list_sorts_priority_semantically(pool: PgPool) -> Result<(), DomainError> {
    let user_id = create_test_user(&pool, "sort@example.com").await?;

    for priority in [TodoPriority::Medium, TodoPriority::High, TodoPriority::Low] {
        TodoRepository::create(
            &pool,
            NewTodo {
                priority,
                ..new_todo(user_id, priority.as_str())
            },
        )
        .await?;
    }

    let (todos, _) = TodoRepository::list(
        &pool,
        &filter(user_id),
        SortBy::Priority,
        SortOrder::Desc,
        10,
        0,
    )
    .await?;

    // high outranks medium outranks low, not alphabetical order
    let priorities: Vec<TodoPriority> = todos.iter().map(|t| t.priority).collect();
    assert_eq!(
        priorities,
        vec![TodoPriority::High, TodoPriority::Medium, TodoPriority::Low]
    );
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_update_patches_only_given_fields(pool: PgPool) -> Result<(), DomainError> {
    let user_id = create_test_user(&pool, "patch@example.com").await?;
    let created = TodoRepository::create(
        &pool,
        NewTodo {
            description: Some("keep me".to_string()),
            ..new_todo(user_id, "Original")
        },
    )
    .await?;

    let updated = TodoRepository::update(
        &pool,
        created.id,
        user_id,
        TodoPatch {
            title: Some("Renamed".to_string()),
            ..TodoPatch::default()
        },
    )
    .await?;

    assert!(updated.is_some());
    let updated = updated.unwrap();
    assert_eq!(updated.title, "Renamed");
    assert_eq!(updated.description, Some("keep me".to_string()));
    assert!(updated.updated_at > created.updated_at);
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_update_sets_and_clears_completed_at(pool: PgPool) -> Result<(), DomainError> {
    let user_id = create_test_user(&pool, "complete@example.com").await?;
    let created = TodoRepository::create(&pool, new_todo(user_id, "Finish me")).await?;

    let completed = TodoRepository::update(
        &pool,
        created.id,
        user_id,
        TodoPatch {
            status: Some(TodoStatus::Completed),
            completed_at: Some(Some(OffsetDateTime::now_utc())),
            ..TodoPatch::default()
        },
    )
    .await?
    .unwrap();
    assert!(completed.completed_at.is_some());

    let reopened = TodoRepository::update(
        &pool,
        created.id,
        user_id,
        TodoPatch {
            status: Some(TodoStatus::Pending),
            completed_at: Some(None),
            ..TodoPatch::default()
        },
    )
    .await?
    .unwrap();
    assert!(reopened.completed_at.is_none());
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_update_sets_and_clears_due_date(pool: PgPool) -> Result<(), DomainError> {
    let user_id = create_test_user(&pool, "due@example.com").await?;
    let created = TodoRepository::create(&pool, new_todo(user_id, "Schedule me")).await?;

    let due = OffsetDateTime::now_utc() + time::Duration::days(3);
    let scheduled = TodoRepository::update(
        &pool,
        created.id,
        user_id,
        TodoPatch {
            due_date: Some(Some(due)),
            ..TodoPatch::default()
        },
    )
    .await?
    .unwrap();
    assert!(scheduled.due_date.is_some());

    let cleared = TodoRepository::update(
        &pool,
        created.id,
        user_id,
        TodoPatch {
            due_date: Some(None),
            ..TodoPatch::default()
        },
    )
    .await?
    .unwrap();
    assert!(cleared.due_date.is_none());
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_update_with_empty_patch_returns_current(pool: PgPool) -> Result<(), DomainError> {
    let user_id = create_test_user(&pool, "noop@example.com").await?;
    let created = TodoRepository::create(&pool, new_todo(user_id, "Unchanged")).await?;

    let updated = TodoRepository::update(&pool, created.id, user_id, TodoPatch::default()).await?;

    assert_eq!(updated, Some(created));
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_update_scoped_to_owner(pool: PgPool) -> Result<(), DomainError> {
    let owner = create_test_user(&pool, "owner2@example.com").await?;
    let stranger = create_test_user(&pool, "stranger2@example.com").await?;
    let created = TodoRepository::create(&pool, new_todo(owner, "Mine")).await?;

    let updated = TodoRepository::update(
        &pool,
        created.id,
        stranger,
        TodoPatch {
            title: Some("Hijacked".to_string()),
            ..TodoPatch::default()
        },
    )
    .await?;

    assert!(updated.is_none());
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_delete_scoped_to_owner(pool: PgPool) -> Result<(), DomainError> {
    let owner = create_test_user(&pool, "owner3@example.com").await?;
    let stranger = create_test_user(&pool, "stranger3@example.com").await?;
    let created = TodoRepository::create(&pool, new_todo(owner, "Mine")).await?;

    assert!(!TodoRepository::delete(&pool, created.id, stranger).await?);
    assert!(TodoRepository::delete(&pool, created.id, owner).await?);
    assert!(!TodoRepository::delete(&pool, created.id, owner).await?);
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_delete_many_skips_other_users_todos(pool: PgPool) -> Result<(), DomainError> {
    let owner = create_test_user(&pool, "owner4@example.com").await?;
    let stranger = create_test_user(&pool, "stranger4@example.com").await?;

    let first = TodoRepository::create(&pool, new_todo(owner, "One")).await?;
    let second = TodoRepository::create(&pool, new_todo(owner, "Two")).await?;
    let theirs = TodoRepository::create(&pool, new_todo(stranger, "Theirs")).await?;

    let deleted =
        TodoRepository::delete_many(&pool, &[first.id, second.id, theirs.id], owner).await?;

    assert_eq!(deleted, 2);
    assert!(
        TodoRepository::find_by_id(&pool, theirs.id, stranger)
            .await?
            .is_some()
    );
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_status_priority_projection(pool: PgPool) -> Result<(), DomainError> {
    let user_id = create_test_user(&pool, "stats@example.com").await?;

    TodoRepository::create(
        &pool,
        NewTodo {
            priority: TodoPriority::High,
            ..new_todo(user_id, "One")
        },
    )
    .await?;
    TodoRepository::create(&pool, new_todo(user_id, "Two")).await?;

    let rows = TodoRepository::status_priority(&pool, user_id).await?;

    assert_eq!(rows.len(), 2);
    assert!(rows.contains(&(TodoStatus::Pending, TodoPriority::High)));
    assert!(rows.contains(&(TodoStatus::Pending, TodoPriority::Medium)));
    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_deleting_user_cascades_to_todos(pool: PgPool) -> Result<(), DomainError> {
    let user_id = create_test_user(&pool, "cascade@example.com").await?;
    let created = TodoRepository::create(&pool, new_todo(user_id, "Orphan")).await?;

    UserRepository::delete(&pool, user_id).await?;

    let found = TodoRepository::find_by_id(&pool, created.id, user_id).await?;
    assert!(found.is_none());
    Ok(())
}
