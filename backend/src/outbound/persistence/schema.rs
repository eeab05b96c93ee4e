//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Canadian provinces and territories, seeded by the initial migration.
    provinces (code) {
        code -> Varchar,
        name -> Varchar,
    }
}

diesel::table! {
    /// Farms taking part in the programme.
    farms (id) {
        id -> Int4,
        name -> Varchar,
        address -> Nullable<Varchar>,
        town -> Nullable<Varchar>,
        county -> Nullable<Varchar>,
        province_code -> Nullable<Varchar>,
        postal_code -> Varchar,
        home_phone -> Nullable<Varchar>,
        cell_phone -> Nullable<Varchar>,
        directions -> Nullable<Text>,
        date_joined -> Nullable<Date>,
        last_contact_date -> Nullable<Date>,
    }
}

diesel::table! {
    /// Identity-store accounts.
    users (id) {
        id -> Uuid,
        email -> Varchar,
        user_name -> Varchar,
        /// Argon2 PHC string; `NULL` for accounts that only sign in externally.
        password_hash -> Nullable<Text>,
        lockout_enabled -> Bool,
        lockout_end -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    roles (id) {
        id -> Uuid,
        name -> Varchar,
    }
}

diesel::table! {
    user_roles (user_id, role_id) {
        user_id -> Uuid,
        role_id -> Uuid,
    }
}

diesel::table! {
    /// External login providers linked to an account.
    user_logins (provider, provider_key) {
        provider -> Varchar,
        provider_key -> Varchar,
        user_id -> Uuid,
    }
}

diesel::table! {
    /// Outstanding password reset tokens, stored as SHA-256 digests.
    password_reset_tokens (token_digest) {
        token_digest -> Varchar,
        user_id -> Uuid,
        expires_at -> Timestamptz,
    }
}

diesel::joinable!(farms -> provinces (province_code));
diesel::joinable!(user_roles -> users (user_id));
diesel::joinable!(user_roles -> roles (role_id));
diesel::joinable!(user_logins -> users (user_id));
diesel::joinable!(password_reset_tokens -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    provinces,
    farms,
    users,
    roles,
    user_roles,
    user_logins,
    password_reset_tokens,
);
