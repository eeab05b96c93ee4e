//! Tests for the in-memory adapters.

use std::sync::Mutex;

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use rstest::{fixture, rstest};

use super::*;

struct SteppingClock(Mutex<DateTime<Utc>>);

impl SteppingClock {
    fn starting_at(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    fn advance(&self, delta: TimeDelta) {
        let mut now = self.0.lock().expect("clock mutex");
        *now += delta;
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.0.lock().expect("clock mutex")
    }
}

fn details(name: &str, province_code: Option<&str>) -> FarmDetails {
    FarmDetails {
        name: name.to_owned(),
        address: None,
        town: Some("Guelph".to_owned()),
        county: None,
        province_code: province_code.map(str::to_owned),
        postal_code: "N1G 2W1".to_owned(),
        home_phone: None,
        cell_phone: None,
        directions: None,
        date_joined: None,
        last_contact_date: None,
    }
}

fn account(user_name: &str, roles: &[&str]) -> UserAccount {
    UserAccount {
        id: UserId::random(),
        email: format!("{user_name}@example.org"),
        user_name: user_name.to_owned(),
        lockout_enabled: false,
        lockout_end: None,
        external_logins: Vec::new(),
        roles: roles.iter().map(|role| (*role).to_owned()).collect(),
    }
}

#[fixture]
fn store() -> MemoryStore {
    MemoryStore::seeded()
}

#[rstest]
#[tokio::test]
async fn seeded_provinces_are_listed_by_name(store: MemoryStore) {
    let provinces = ProvinceRepository::list_by_name(&store)
        .await
        .expect("provinces");

    assert_eq!(provinces.len(), 13);
    assert_eq!(provinces.first().map(|p| p.code.as_str()), Some("AB"));
    assert_eq!(provinces.last().map(|p| p.code.as_str()), Some("YT"));
    assert!(store.exists("ON").await.expect("lookup"));
    assert!(!store.exists("on").await.expect("lookup"));
}

#[rstest]
#[tokio::test]
async fn farm_listing_sorts_by_province_then_name(store: MemoryStore) {
    FarmRepository::insert(&store, &details("Zephyr Acres", Some("AB"))).await.expect("insert");
    FarmRepository::insert(&store, &details("Orchard Hill", None)).await.expect("insert");
    FarmRepository::insert(&store, &details("Apple Row", Some("ON"))).await.expect("insert");
    FarmRepository::insert(&store, &details("Birch Lane", Some("AB"))).await.expect("insert");

    let names: Vec<String> = store
        .list_with_provinces()
        .await
        .expect("listing")
        .into_iter()
        .map(|listing| listing.farm.details.name)
        .collect();

    assert_eq!(
        names,
        ["Birch Lane", "Zephyr Acres", "Apple Row", "Orchard Hill"]
    );
}

#[rstest]
#[tokio::test]
async fn farm_ids_increase_and_are_not_reused(store: MemoryStore) {
    let first = FarmRepository::insert(&store, &details("First", None)).await.expect("insert");
    assert!(store.delete(first.id).await.expect("delete"));
    let second = FarmRepository::insert(&store, &details("Second", None)).await.expect("insert");

    assert!(second.id.get() > first.id.get());
    assert!(!store.delete(first.id).await.expect("delete"));
}

#[rstest]
#[tokio::test]
async fn farm_insert_rejects_unknown_province(store: MemoryStore) {
    let error = FarmRepository::insert(&store, &details("Nowhere", Some("ZZ")))
        .await
        .expect_err("unknown province");

    assert!(error.to_string().contains("province ZZ"));
}

#[rstest]
#[tokio::test]
async fn farm_update_replaces_the_record(store: MemoryStore) {
    let mut farm = FarmRepository::insert(&store, &details("Old", Some("BC"))).await.expect("insert");
    farm.details.name = "New".to_owned();
    farm.details.province_code = None;

    assert!(store.update(&farm).await.expect("update"));
    let stored = FarmRepository::find_by_id(&store, farm.id)
        .await
        .expect("find")
        .expect("present");
    assert_eq!(stored, farm);
}

#[rstest]
#[tokio::test]
async fn farm_update_rejects_unknown_province(store: MemoryStore) {
    let original = details("Maple Acres", Some("ON"));
    let mut farm = FarmRepository::insert(&store, &original).await.expect("insert");
    farm.details.province_code = Some("ZZ".to_owned());

    let error = FarmRepository::update(&store, &farm)
        .await
        .expect_err("unknown province");

    assert!(error.to_string().contains("province ZZ"));
    let stored = FarmRepository::find_by_id(&store, farm.id)
        .await
        .expect("find")
        .expect("present");
    assert_eq!(stored.details, original);
}

#[rstest]
#[tokio::test]
async fn role_names_are_unique_and_substring_search_is_case_sensitive(store: MemoryStore) {
    RoleRepository::insert(&store, "Administrator").await.expect("insert");

    assert!(RoleRepository::insert(&store, "Administrator").await.is_err());
    assert!(store.any_name_contains("Admin").await.expect("search"));
    assert!(!store.any_name_contains("admin").await.expect("search"));
}

#[rstest]
#[tokio::test]
async fn deleting_a_role_strips_it_from_members(store: MemoryStore) {
    let member = account("ada", &["Growers", "Auditors"]);
    let member_id = member.id;
    store.insert_user(member).expect("user");
    let growers = RoleRepository::find_by_name(&store, "Growers")
        .await
        .expect("find")
        .expect("role seeded from account");

    assert!(store.delete_with_memberships(growers.id).await.expect("delete"));
    let remaining = IdentityStore::find_by_id(&store, member_id)
        .await
        .expect("find")
        .expect("present");
    assert_eq!(remaining.roles, ["Auditors"]);
    assert!(!store.delete_with_memberships(growers.id).await.expect("delete"));
}

#[rstest]
#[tokio::test]
async fn membership_changes_report_refusals(store: MemoryStore) {
    let user = account("grace", &[]);
    let id = user.id;
    store.insert_user(user).expect("user");
    store.insert_role("Growers").expect("role");

    store.add_to_role(id, "Growers").await.expect("added");
    let again = store.add_to_role(id, "Growers").await.expect_err("duplicate");
    assert_eq!(again.to_string(), "User already in role Growers.");

    store.remove_from_role(id, "Growers").await.expect("removed");
    let missing = store.remove_from_role(id, "Growers").await.expect_err("absent");
    assert_eq!(missing.to_string(), "User is not in role Growers.");

    let unknown = store.add_to_role(id, "Nobody").await.expect_err("no role");
    assert!(matches!(unknown, IdentityStoreError::RoleNotFound { .. }));
}

#[rstest]
#[tokio::test]
async fn lockout_toggle_clears_timed_lockout(store: MemoryStore) {
    let mut user = account("linus", &[]);
    user.lockout_end = Some(Utc::now());
    let id = user.id;
    store.insert_user(user).expect("user");

    store.set_lockout_enabled(id, true).await.expect("locked");
    let locked = IdentityStore::find_by_id(&store, id)
        .await
        .expect("find")
        .expect("present");

    assert!(locked.lockout_enabled);
    assert_eq!(locked.lockout_end, None);
    assert!(matches!(
        store.set_lockout_enabled(UserId::random(), true).await,
        Err(IdentityStoreError::UserNotFound { .. })
    ));
}

#[rstest]
#[tokio::test]
async fn reset_tokens_are_single_use() {
    let store = MemoryStore::seeded();
    let user = account("barbara", &[]);
    let id = user.id;
    store.insert_user(user).expect("user");

    let token = store.generate_password_reset_token(id).await.expect("token");
    store.reset_password(id, &token, "hunter22").await.expect("reset");
    assert!(store.password_matches(id, "hunter22"));

    let reused = store
        .reset_password(id, &token, "another1")
        .await
        .expect_err("token consumed");
    assert!(matches!(reused, IdentityStoreError::InvalidToken));
    assert!(store.password_matches(id, "hunter22"));
}

#[rstest]
#[tokio::test]
async fn reset_tokens_expire_and_are_bound_to_their_user() {
    let start = Utc
        .with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp");
    let clock = Arc::new(SteppingClock::starting_at(start));
    let store = MemoryStore::seeded().with_clock(clock.clone());
    let owner = account("owner", &[]);
    let other = account("other", &[]);
    let (owner_id, other_id) = (owner.id, other.id);
    store.insert_user(owner).expect("user");
    store.insert_user(other).expect("user");

    let token = store
        .generate_password_reset_token(owner_id)
        .await
        .expect("token");
    assert!(matches!(
        store.reset_password(other_id, &token, "secret1").await,
        Err(IdentityStoreError::InvalidToken)
    ));

    clock.advance(reset_token_ttl());
    assert!(matches!(
        store.reset_password(owner_id, &token, "secret1").await,
        Err(IdentityStoreError::InvalidToken)
    ));
}

#[rstest]
#[tokio::test]
async fn deleting_a_user_drops_pending_tokens(store: MemoryStore) {
    let user = account("ken", &["Growers"]);
    let id = user.id;
    store.insert_user(user).expect("user");
    store.generate_password_reset_token(id).await.expect("token");

    assert!(store.delete_user_with_memberships(id).await.expect("delete"));
    assert!(store.list_users().await.expect("list").is_empty());
    assert!(!store.delete_user_with_memberships(id).await.expect("delete"));
    assert!(store.lock().expect("state").reset_tokens.is_empty());
}
