//! Integration tests for live usage counts.

use fleetgate_core::quota::ResourceKind;
use fleetgate_core::repository::UsageRepository;
use fleetgate_db::repository::SurrealUsageRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    fleetgate_db::run_migrations(&db).await.unwrap();
    db
}

async fn seed(db: &Surreal<surrealdb::engine::local::Db>, table: &str, tenant_id: Uuid, n: usize) {
    for _ in 0..n {
        db.query(format!("CREATE {table} SET tenant_id = $tenant_id"))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .unwrap()
            .check()
            .unwrap();
    }
}

#[tokio::test]
async fn counts_are_scoped_by_tenant() {
    let db = setup().await;
    let repo = SurrealUsageRepository::new(db.clone());

    let mine = Uuid::new_v4();
    let theirs = Uuid::new_v4();
    seed(&db, "vehicle", mine, 3).await;
    seed(&db, "vehicle", theirs, 7).await;

    assert_eq!(repo.count(mine, ResourceKind::Vehicles).await.unwrap(), 3);
    assert_eq!(repo.count(theirs, ResourceKind::Vehicles).await.unwrap(), 7);
}

#[tokio::test]
async fn each_resource_kind_counts_its_own_table() {
    let db = setup().await;
    let repo = SurrealUsageRepository::new(db.clone());
    let tenant = Uuid::new_v4();

    seed(&db, "vehicle", tenant, 2).await;
    seed(&db, "app_user", tenant, 1).await;
    seed(&db, "client", tenant, 4).await;

    assert_eq!(repo.count(tenant, ResourceKind::Vehicles).await.unwrap(), 2);
    assert_eq!(repo.count(tenant, ResourceKind::Users).await.unwrap(), 1);
    assert_eq!(repo.count(tenant, ResourceKind::Clients).await.unwrap(), 4);
    assert_eq!(
        repo.count(tenant, ResourceKind::Contracts).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn count_reflects_inserts_immediately() {
    // No caching: a row created after one evaluation shows up in the
    // next.
    let db = setup().await;
    let repo = SurrealUsageRepository::new(db.clone());
    let tenant = Uuid::new_v4();

    assert_eq!(repo.count(tenant, ResourceKind::Clients).await.unwrap(), 0);
    seed(&db, "client", tenant, 1).await;
    assert_eq!(repo.count(tenant, ResourceKind::Clients).await.unwrap(), 1);
}
