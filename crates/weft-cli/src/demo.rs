//! デモシナリオ：依存の追加 → 完了ゲート → 統計 → 権限
//!
//! Every step prints the envelope a transport would send.

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use tracing::info;
use weft_core::api::{ApiReply, TaskApi};
use weft_core::app::ListUsersQuery;
use weft_core::domain::{Actor, NewTask, Role, User, UserId};

pub const MANAGER: u64 = 1;
pub const ALICE: u64 = 2;
pub const BOB: u64 = 3;

pub fn seed_users() -> Vec<User> {
    [
        (MANAGER, "Morgan", Role::Manager),
        (ALICE, "Alice", Role::Member),
        (BOB, "Bob", Role::Member),
    ]
    .into_iter()
    .map(|(id, name, role)| User {
        id: UserId::new(id),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        role,
    })
    .collect()
}

fn show(step: &str, reply: &ApiReply) -> Result<()> {
    let body = serde_json::to_string_pretty(&reply.body).context("rendering envelope")?;
    println!("== {step} [{}]\n{body}\n", reply.status);
    Ok(())
}

fn created_code(reply: &ApiReply) -> Result<String> {
    reply
        .body
        .data
        .as_ref()
        .and_then(|data| data["code"].as_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("create failed: {}", reply.body.message))
}

pub async fn run(api: &TaskApi) -> Result<()> {
    let manager = Actor::manager(UserId::new(MANAGER));
    let alice = Actor::member(UserId::new(ALICE));
    let bob = Actor::member(UserId::new(BOB));

    let members = ListUsersQuery {
        role: Some("User".into()),
        ..ListUsersQuery::default()
    };
    show("manager lists assignable users", &api.list_users(&manager, members).await)?;

    info!("creating tasks");
    let design = api
        .create_task(&manager, NewTask::titled("Design schema").assigned_to(UserId::new(ALICE)))
        .await;
    show("create design", &design)?;
    let design = created_code(&design)?;

    let migrate = api
        .create_task(&manager, NewTask::titled("Write migrations").assigned_to(UserId::new(BOB)))
        .await;
    show("create migrate", &migrate)?;
    let migrate = created_code(&migrate)?;

    let mut release = NewTask::titled("Release").assigned_to(UserId::new(ALICE));
    release.due_date = NaiveDate::from_ymd_opt(2025, 12, 31);
    let release = api.create_task(&manager, release).await;
    show("create release", &release)?;
    let release = created_code(&release)?;

    info!("wiring dependencies");
    show(
        "release depends on design + migrate",
        &api.add_dependencies(&manager, &release, &[design.clone(), migrate.clone()])
            .await,
    )?;
    show(
        "design depends on release (cycle), itself, and an unknown code",
        &api.add_dependencies(
            &manager,
            &design,
            &[release.clone(), design.clone(), "TSK-UNKNOWN00000".to_string()],
        )
        .await,
    )?;

    info!("exercising the completion gate");
    show(
        "alice completes release too early",
        &api.update_status(&alice, &release, "completed").await,
    )?;
    show("alice completes design", &api.update_status(&alice, &design, "completed").await)?;
    show("alice views release", &api.get_task(&alice, &release).await)?;
    show("manager views release", &api.get_task(&manager, &release).await)?;
    show("bob completes migrate", &api.update_status(&bob, &migrate, "completed").await)?;
    show("alice completes release", &api.update_status(&alice, &release, "completed").await)?;

    info!("permissions");
    show(
        "bob reads release dependencies",
        &api.get_dependencies(&bob, &release).await,
    )?;
    show("bob deletes design", &api.delete_task(&bob, &design).await)?;
    show(
        "bob lists users",
        &api.list_users(&bob, ListUsersQuery::default()).await,
    )?;
    show(
        "alice lists her tasks",
        &api.list_tasks(&alice, Default::default()).await,
    )?;

    match api.service().graph().detect_cycle().await? {
        None => info!("dependency graph is acyclic"),
        Some(cycle) => info!(?cycle, "dependency graph has a cycle"),
    }
    Ok(())
}
