//! SQL schema for the voltmarket SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,  -- lower-cased; the login identifier
    username      TEXT NOT NULL,
    first_name    TEXT NOT NULL DEFAULT '',
    last_name     TEXT NOT NULL DEFAULT '',
    role          TEXT NOT NULL,         -- 'admin' | 'provider' | 'client'
    password_hash TEXT NOT NULL,         -- argon2 PHC string
    created_at    TEXT NOT NULL
);

-- One store per provider.
CREATE TABLE IF NOT EXISTS stores (
    store_id     TEXT PRIMARY KEY,
    owner_id     TEXT NOT NULL UNIQUE REFERENCES users(user_id) ON DELETE CASCADE,
    name         TEXT NOT NULL,
    description  TEXT NOT NULL DEFAULT '',
    address      TEXT NOT NULL,
    latitude     REAL,
    longitude    REAL,
    image_url    TEXT,
    rating       REAL    NOT NULL DEFAULT 0,  -- cache of AVG(reviews.rating)
    review_count INTEGER NOT NULL DEFAULT 0,  -- cache of COUNT(reviews)
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS categories (
    category_id TEXT PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS components (
    component_id    TEXT PRIMARY KEY,
    store_id        TEXT NOT NULL REFERENCES stores(store_id) ON DELETE CASCADE,
    category_id     TEXT NOT NULL REFERENCES categories(category_id) ON DELETE RESTRICT,
    name            TEXT NOT NULL,
    mpn             TEXT NOT NULL UNIQUE,
    mpn_key         TEXT NOT NULL,           -- normalised MPN for price comparison
    description     TEXT NOT NULL DEFAULT '',
    price           TEXT NOT NULL,           -- decimal string
    stock           INTEGER NOT NULL DEFAULT 0 CHECK (stock >= 0),
    technical_specs TEXT NOT NULL DEFAULT '{}',
    is_available    INTEGER NOT NULL DEFAULT 1,
    is_on_offer     INTEGER NOT NULL DEFAULT 0,
    offer_price     TEXT,                    -- decimal string or NULL
    datasheet_url   TEXT,
    image_url       TEXT,
    created_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS reviews (
    review_id  TEXT PRIMARY KEY,
    user_id    TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    store_id   TEXT NOT NULL REFERENCES stores(store_id) ON DELETE CASCADE,
    rating     INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
    comment    TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL,
    UNIQUE (user_id, store_id)
);

CREATE TABLE IF NOT EXISTS wishlists (
    wishlist_id TEXT PRIMARY KEY,
    user_id     TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    name        TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS wishlist_items (
    item_id      TEXT PRIMARY KEY,
    wishlist_id  TEXT NOT NULL REFERENCES wishlists(wishlist_id) ON DELETE CASCADE,
    component_id TEXT NOT NULL REFERENCES components(component_id) ON DELETE CASCADE,
    quantity     INTEGER NOT NULL CHECK (quantity > 0),
    added_at     TEXT NOT NULL,
    UNIQUE (wishlist_id, component_id)
);

CREATE TABLE IF NOT EXISTS stock_notifications (
    notification_id TEXT PRIMARY KEY,
    user_id         TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    component_id    TEXT NOT NULL REFERENCES components(component_id) ON DELETE CASCADE,
    is_active       INTEGER NOT NULL DEFAULT 1,
    created_at      TEXT NOT NULL,
    UNIQUE (user_id, component_id)
);

-- Append-only. Anonymous searches have a NULL user.
CREATE TABLE IF NOT EXISTS search_history (
    search_id  TEXT PRIMARY KEY,
    user_id    TEXT REFERENCES users(user_id) ON DELETE SET NULL,
    query      TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS components_store_idx    ON components(store_id);
CREATE INDEX IF NOT EXISTS components_category_idx ON components(category_id);
CREATE INDEX IF NOT EXISTS components_mpn_key_idx  ON components(mpn_key);
CREATE INDEX IF NOT EXISTS reviews_store_idx       ON reviews(store_id);
CREATE INDEX IF NOT EXISTS wishlists_user_idx      ON wishlists(user_id);
CREATE INDEX IF NOT EXISTS notifications_comp_idx  ON stock_notifications(component_id);
CREATE INDEX IF NOT EXISTS search_user_idx         ON search_history(user_id, created_at);

PRAGMA user_version = 1;
";
