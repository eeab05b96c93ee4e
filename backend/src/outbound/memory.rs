//! In-process adapters for every driven port.
//!
//! [`MemoryStore`] keeps farms, provinces, roles and accounts in maps behind
//! one `std::sync::Mutex`, so multi-table operations such as "remove members
//! then delete the role" are atomic. The server falls back to it when no
//! database URL is configured and the HTTP integration tests run on it.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::{Clock, DefaultClock};
use uuid::Uuid;

use crate::domain::ports::{
    FarmRepository, FarmRepositoryError, IdentityStore, IdentityStoreError, ProvinceRepository,
    ProvinceRepositoryError, RoleRepository, RoleRepositoryError,
};
use crate::domain::{
    Farm, FarmDetails, FarmId, FarmListing, Province, Role, RoleId, UserAccount, UserId,
    sort_listings,
};
use crate::outbound::identity_secrets::{
    hash_password_blocking, new_reset_token, reset_token_ttl, token_digest,
};

/// Provinces and territories loaded by [`MemoryStore::seeded`].
const PROVINCES: [(&str, &str); 13] = [
    ("AB", "Alberta"),
    ("BC", "British Columbia"),
    ("MB", "Manitoba"),
    ("NB", "New Brunswick"),
    ("NL", "Newfoundland and Labrador"),
    ("NS", "Nova Scotia"),
    ("NT", "Northwest Territories"),
    ("NU", "Nunavut"),
    ("ON", "Ontario"),
    ("PE", "Prince Edward Island"),
    ("QC", "Quebec"),
    ("SK", "Saskatchewan"),
    ("YT", "Yukon"),
];

const POISONED: &str = "memory store lock poisoned";

#[derive(Debug)]
struct StoredUser {
    account: UserAccount,
    password_hash: Option<String>,
}

#[derive(Debug)]
struct PendingReset {
    user_id: UserId,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct MemoryState {
    provinces: BTreeMap<String, String>,
    farms: BTreeMap<i32, FarmDetails>,
    last_farm_id: i32,
    roles: Vec<Role>,
    users: BTreeMap<Uuid, StoredUser>,
    reset_tokens: HashMap<String, PendingReset>,
}

impl MemoryState {
    fn farm_listing(&self, id: i32, details: &FarmDetails) -> Result<FarmListing, FarmRepositoryError> {
        let farm = stored_farm(id, details)?;
        let province_name = details
            .province_code
            .as_ref()
            .and_then(|code| self.provinces.get(code))
            .cloned();
        Ok(FarmListing {
            farm,
            province_name,
        })
    }

    /// Foreign-key check mirroring `farms.province_code REFERENCES provinces`.
    fn require_province(&self, details: &FarmDetails) -> Result<(), FarmRepositoryError> {
        match &details.province_code {
            Some(code) if !self.provinces.contains_key(code) => Err(FarmRepositoryError::query(
                format!("referenced record missing: province {code}"),
            )),
            _ => Ok(()),
        }
    }

    fn user_mut(&mut self, id: UserId) -> Result<&mut StoredUser, IdentityStoreError> {
        self.users
            .get_mut(id.as_uuid())
            .ok_or_else(|| IdentityStoreError::user_not_found(id.to_string()))
    }

    fn require_role(&self, name: &str) -> Result<(), IdentityStoreError> {
        if self.roles.iter().any(|role| role.name == name) {
            Ok(())
        } else {
            Err(IdentityStoreError::role_not_found(name))
        }
    }
}

fn stored_farm(id: i32, details: &FarmDetails) -> Result<Farm, FarmRepositoryError> {
    let id = FarmId::new(id)
        .map_err(|err| FarmRepositoryError::query(format!("stored farm {id}: {err}")))?;
    Ok(Farm {
        id,
        details: details.clone(),
    })
}

/// Shared in-memory implementation of the farm, province, role and
/// identity ports.
///
/// # Examples
///
/// ```
/// use farm_backend::outbound::memory::MemoryStore;
///
/// let store = MemoryStore::seeded();
/// let admin = store.insert_role("Administrator").expect("role stored");
/// assert_eq!(admin.name, "Administrator");
/// ```
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Empty store using the system clock.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            clock: Arc::new(DefaultClock),
        }
    }

    /// Store holding the 13 Canadian provinces and territories.
    pub fn seeded() -> Self {
        let store = Self::new();
        if let Ok(mut state) = store.state.lock() {
            state.provinces = PROVINCES
                .iter()
                .map(|(code, name)| ((*code).to_owned(), (*name).to_owned()))
                .collect();
        }
        store
    }

    /// Replace the clock used to date reset tokens.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, String> {
        self.state.lock().map_err(|_| POISONED.to_owned())
    }

    /// Add a role unless one with the same name exists; returns the stored
    /// role either way.
    ///
    /// # Errors
    ///
    /// Fails only when the store lock is poisoned.
    pub fn insert_role(&self, name: &str) -> Result<Role, RoleRepositoryError> {
        let mut state = self.lock().map_err(RoleRepositoryError::query)?;
        if let Some(existing) = state.roles.iter().find(|role| role.name == name) {
            return Ok(existing.clone());
        }
        let role = Role::new(RoleId::random(), name);
        state.roles.push(role.clone());
        Ok(role)
    }

    /// Register an account, replacing any account with the same id.
    ///
    /// Roles named on the account are created when missing.
    ///
    /// # Errors
    ///
    /// Fails only when the store lock is poisoned.
    pub fn insert_user(&self, account: UserAccount) -> Result<(), IdentityStoreError> {
        for role in &account.roles {
            self.insert_role(role)
                .map_err(|err| IdentityStoreError::query(err.to_string()))?;
        }
        let mut state = self.lock().map_err(IdentityStoreError::query)?;
        state.users.insert(
            *account.id.as_uuid(),
            StoredUser {
                account,
                password_hash: None,
            },
        );
        Ok(())
    }

    /// Whether the stored password hash of `id` matches `password`.
    #[cfg(test)]
    pub(crate) fn password_matches(&self, id: UserId, password: &str) -> bool {
        self.lock().is_ok_and(|state| {
            state
                .users
                .get(id.as_uuid())
                .and_then(|user| user.password_hash.as_deref())
                .is_some_and(|hash| {
                    crate::outbound::identity_secrets::verify_password(hash, password)
                })
        })
    }
}

#[async_trait]
impl FarmRepository for MemoryStore {
    async fn list_with_provinces(&self) -> Result<Vec<FarmListing>, FarmRepositoryError> {
        let state = self.lock().map_err(FarmRepositoryError::query)?;
        let mut listings = state
            .farms
            .iter()
            .map(|(id, details)| state.farm_listing(*id, details))
            .collect::<Result<Vec<_>, _>>()?;
        sort_listings(&mut listings);
        Ok(listings)
    }

    async fn find_by_id(&self, id: FarmId) -> Result<Option<Farm>, FarmRepositoryError> {
        let state = self.lock().map_err(FarmRepositoryError::query)?;
        state
            .farms
            .get(&id.get())
            .map(|details| stored_farm(id.get(), details))
            .transpose()
    }

    async fn insert(&self, details: &FarmDetails) -> Result<Farm, FarmRepositoryError> {
        let mut state = self.lock().map_err(FarmRepositoryError::query)?;
        state.require_province(details)?;
        let id = state
            .last_farm_id
            .checked_add(1)
            .ok_or_else(|| FarmRepositoryError::query("farm id sequence exhausted"))?;
        state.last_farm_id = id;
        state.farms.insert(id, details.clone());
        stored_farm(id, details)
    }

    async fn update(&self, farm: &Farm) -> Result<bool, FarmRepositoryError> {
        let mut state = self.lock().map_err(FarmRepositoryError::query)?;
        state.require_province(&farm.details)?;
        match state.farms.get_mut(&farm.id.get()) {
            Some(details) => {
                *details = farm.details.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: FarmId) -> Result<bool, FarmRepositoryError> {
        let mut state = self.lock().map_err(FarmRepositoryError::query)?;
        Ok(state.farms.remove(&id.get()).is_some())
    }
}

#[async_trait]
impl ProvinceRepository for MemoryStore {
    async fn list_by_name(&self) -> Result<Vec<Province>, ProvinceRepositoryError> {
        let state = self.lock().map_err(ProvinceRepositoryError::query)?;
        let mut provinces: Vec<Province> = state
            .provinces
            .iter()
            .map(|(code, name)| Province::new(code.as_str(), name.as_str()))
            .collect();
        provinces.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(provinces)
    }

    async fn exists(&self, code: &str) -> Result<bool, ProvinceRepositoryError> {
        let state = self.lock().map_err(ProvinceRepositoryError::query)?;
        Ok(state.provinces.contains_key(code))
    }
}

#[async_trait]
impl RoleRepository for MemoryStore {
    async fn list_by_name(&self) -> Result<Vec<Role>, RoleRepositoryError> {
        let state = self.lock().map_err(RoleRepositoryError::query)?;
        let mut roles = state.roles.clone();
        roles.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(roles)
    }

    async fn find_by_id(&self, id: RoleId) -> Result<Option<Role>, RoleRepositoryError> {
        let state = self.lock().map_err(RoleRepositoryError::query)?;
        Ok(state.roles.iter().find(|role| role.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, RoleRepositoryError> {
        let state = self.lock().map_err(RoleRepositoryError::query)?;
        Ok(state.roles.iter().find(|role| role.name == name).cloned())
    }

    async fn any_name_contains(&self, fragment: &str) -> Result<bool, RoleRepositoryError> {
        let state = self.lock().map_err(RoleRepositoryError::query)?;
        Ok(state.roles.iter().any(|role| role.name.contains(fragment)))
    }

    async fn insert(&self, name: &str) -> Result<Role, RoleRepositoryError> {
        let mut state = self.lock().map_err(RoleRepositoryError::query)?;
        if state.roles.iter().any(|role| role.name == name) {
            return Err(RoleRepositoryError::query(format!(
                "duplicate value: role {name}"
            )));
        }
        let role = Role::new(RoleId::random(), name);
        state.roles.push(role.clone());
        Ok(role)
    }

    async fn delete_with_memberships(&self, id: RoleId) -> Result<bool, RoleRepositoryError> {
        let mut state = self.lock().map_err(RoleRepositoryError::query)?;
        let Some(position) = state.roles.iter().position(|role| role.id == id) else {
            return Ok(false);
        };
        let removed = state.roles.remove(position);
        for user in state.users.values_mut() {
            user.account.roles.retain(|held| held != &removed.name);
        }
        Ok(true)
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn list_users(&self) -> Result<Vec<UserAccount>, IdentityStoreError> {
        let state = self.lock().map_err(IdentityStoreError::query)?;
        let mut accounts: Vec<UserAccount> = state
            .users
            .values()
            .map(|user| user.account.clone())
            .collect();
        accounts.sort_by(|left, right| left.user_name.cmp(&right.user_name));
        Ok(accounts)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<UserAccount>, IdentityStoreError> {
        let state = self.lock().map_err(IdentityStoreError::query)?;
        Ok(state.users.get(id.as_uuid()).map(|user| user.account.clone()))
    }

    async fn add_to_role(&self, id: UserId, role: &str) -> Result<(), IdentityStoreError> {
        let mut state = self.lock().map_err(IdentityStoreError::query)?;
        state.require_role(role)?;
        let user = state.user_mut(id)?;
        if user.account.has_role(role) {
            return Err(IdentityStoreError::already_in_role(role));
        }
        user.account.roles.push(role.to_owned());
        user.account.roles.sort();
        Ok(())
    }

    async fn remove_from_role(&self, id: UserId, role: &str) -> Result<(), IdentityStoreError> {
        let mut state = self.lock().map_err(IdentityStoreError::query)?;
        state.require_role(role)?;
        let user = state.user_mut(id)?;
        if !user.account.has_role(role) {
            return Err(IdentityStoreError::not_in_role(role));
        }
        user.account.roles.retain(|held| held != role);
        Ok(())
    }

    async fn set_lockout_enabled(
        &self,
        id: UserId,
        enabled: bool,
    ) -> Result<(), IdentityStoreError> {
        let mut state = self.lock().map_err(IdentityStoreError::query)?;
        let user = state.user_mut(id)?;
        user.account.lockout_enabled = enabled;
        user.account.lockout_end = None;
        Ok(())
    }

    async fn generate_password_reset_token(
        &self,
        id: UserId,
    ) -> Result<String, IdentityStoreError> {
        let expires_at = self.clock.utc() + reset_token_ttl();
        let mut state = self.lock().map_err(IdentityStoreError::query)?;
        state.user_mut(id)?;
        let (token, digest) = new_reset_token();
        state.reset_tokens.insert(
            digest,
            PendingReset {
                user_id: id,
                expires_at,
            },
        );
        Ok(token)
    }

    async fn reset_password(
        &self,
        id: UserId,
        token: &str,
        new_password: &str,
    ) -> Result<(), IdentityStoreError> {
        let password_hash = hash_password_blocking(new_password).await?;
        let digest = token_digest(token);
        let now = self.clock.utc();
        let mut state = self.lock().map_err(IdentityStoreError::query)?;
        state.user_mut(id)?;
        let usable = state
            .reset_tokens
            .get(&digest)
            .is_some_and(|pending| pending.user_id == id && pending.expires_at > now);
        if !usable {
            return Err(IdentityStoreError::invalid_token());
        }
        state.reset_tokens.remove(&digest);
        state.user_mut(id)?.password_hash = Some(password_hash);
        Ok(())
    }

    async fn delete_user_with_memberships(&self, id: UserId) -> Result<bool, IdentityStoreError> {
        let mut state = self.lock().map_err(IdentityStoreError::query)?;
        state.reset_tokens.retain(|_, pending| pending.user_id != id);
        Ok(state.users.remove(id.as_uuid()).is_some())
    }
}

#[cfg(test)]
mod tests;
