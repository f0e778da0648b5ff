//! Database schema definitions and SQL constants.
//!
//! Monetary amounts are stored as canonical decimal TEXT, dates as
//! `YYYY-MM-DD`, and timestamps in the `rusqlite` chrono text format, so
//! lexical comparison matches chronological order.

/// Current schema version for the database.
///
/// This version is stored in the metadata table and is used to ensure
/// compatibility between the database and the application.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Key-value table holding the schema version.
pub const CREATE_METADATA_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS metadata (
        key TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL
    )";

/// Registered suppliers, unique by name within a tenant.
pub const CREATE_SUPPLIERS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS suppliers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        org TEXT NOT NULL,
        name TEXT NOT NULL,
        default_priority INTEGER NOT NULL DEFAULT 0,
        UNIQUE (org, name)
    )";

/// Named time-of-day windows per variant.
pub const CREATE_TIME_SLOTS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS time_slots (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        org TEXT NOT NULL,
        variant TEXT NOT NULL,
        name TEXT NOT NULL,
        start_time TEXT NOT NULL,
        end_time TEXT NOT NULL,
        UNIQUE (org, variant, name)
    )";

/// Shared counter authorities.
pub const CREATE_POOLS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS inventory_pools (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        org TEXT NOT NULL,
        name TEXT NOT NULL,
        quantity INTEGER NOT NULL CHECK (quantity >= 0),
        booked INTEGER NOT NULL DEFAULT 0 CHECK (booked >= 0),
        held INTEGER NOT NULL DEFAULT 0 CHECK (held >= 0),
        allow_overbooking INTEGER NOT NULL DEFAULT 0,
        overbooking_limit INTEGER NOT NULL DEFAULT 0 CHECK (overbooking_limit >= 0),
        version INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )";

/// Allocation buckets.
///
/// Exactly one scope shape is stored per row: `end_date` is only set for
/// ranges and `slot_id` only for slots.
pub const CREATE_BUCKETS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS allocation_buckets (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        org TEXT NOT NULL,
        variant TEXT NOT NULL,
        supplier_id INTEGER REFERENCES suppliers(id),
        scope_kind TEXT NOT NULL CHECK (scope_kind IN ('date', 'range', 'slot')),
        start_date TEXT NOT NULL,
        end_date TEXT,
        slot_id INTEGER REFERENCES time_slots(id),
        quantity INTEGER CHECK (quantity IS NULL OR quantity >= 0),
        booked INTEGER NOT NULL DEFAULT 0 CHECK (booked >= 0),
        held INTEGER NOT NULL DEFAULT 0 CHECK (held >= 0),
        allocation_type TEXT NOT NULL,
        stop_sell INTEGER NOT NULL DEFAULT 0,
        blackout INTEGER NOT NULL DEFAULT 0,
        allow_overbooking INTEGER NOT NULL DEFAULT 0,
        overbooking_limit INTEGER NOT NULL DEFAULT 0 CHECK (overbooking_limit >= 0),
        unit_cost TEXT NOT NULL,
        currency TEXT NOT NULL,
        release_period_hours INTEGER NOT NULL DEFAULT 0,
        min_nights INTEGER,
        max_nights INTEGER,
        min_pax INTEGER,
        max_pax INTEGER,
        pool_id INTEGER REFERENCES inventory_pools(id),
        notes TEXT,
        alternates TEXT NOT NULL DEFAULT '[]',
        version INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )";

/// One bucket per (tenant, variant, supplier, scope). Nullable columns are
/// folded so that NULL supplier or slot still collide.
pub const CREATE_BUCKET_SCOPE_INDEX: &str = r"
    CREATE UNIQUE INDEX IF NOT EXISTS idx_buckets_scope ON allocation_buckets (
        org, variant, IFNULL(supplier_id, 0), scope_kind, start_date,
        IFNULL(end_date, ''), IFNULL(slot_id, 0)
    )";

/// Speeds up per-date lookups.
pub const CREATE_BUCKET_DATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_buckets_date ON allocation_buckets(org, variant, start_date)";

/// Speeds up pool membership lookups.
pub const CREATE_BUCKET_POOL_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_buckets_pool ON allocation_buckets(pool_id)";

/// Reservations against buckets.
pub const CREATE_RESERVATIONS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS reservations (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        org TEXT NOT NULL,
        bucket_id INTEGER NOT NULL REFERENCES allocation_buckets(id),
        pool_id INTEGER REFERENCES inventory_pools(id),
        quantity INTEGER NOT NULL CHECK (quantity > 0),
        status TEXT NOT NULL CHECK (status IN ('held', 'booked', 'released')),
        created_at TEXT NOT NULL,
        expires_at TEXT
    )";

/// Speeds up in-use checks.
pub const CREATE_RESERVATION_BUCKET_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_reservations_bucket ON reservations(bucket_id, status)";

/// Speeds up the expiry sweep.
pub const CREATE_RESERVATION_EXPIRY_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_reservations_expiry ON reservations(status, expires_at)";

/// Rate plans. A NULL supplier marks the master rate, which must be
/// preferred freesale.
pub const CREATE_RATE_PLANS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS rate_plans (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        org TEXT NOT NULL,
        variant TEXT NOT NULL,
        supplier_id INTEGER REFERENCES suppliers(id),
        contract_ref TEXT,
        currency TEXT NOT NULL,
        valid_from TEXT NOT NULL,
        valid_to TEXT NOT NULL,
        inventory_model TEXT NOT NULL,
        priority INTEGER NOT NULL DEFAULT 0,
        preferred INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        CHECK (supplier_id IS NOT NULL OR (preferred = 1 AND inventory_model = 'freesale'))
    )";

/// Speeds up rate resolution.
pub const CREATE_RATE_PLAN_INDEX: &str = r"
    CREATE INDEX IF NOT EXISTS idx_rate_plans_lookup
    ON rate_plans(org, variant, valid_from, valid_to)";

/// Seasonal windows of a plan.
pub const CREATE_RATE_SEASONS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS rate_seasons (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        rate_plan_id INTEGER NOT NULL REFERENCES rate_plans(id) ON DELETE CASCADE,
        start_date TEXT NOT NULL,
        end_date TEXT NOT NULL,
        dow_mask INTEGER NOT NULL,
        min_pax INTEGER,
        max_pax INTEGER
    )";

/// Occupancy bands of a plan.
pub const CREATE_RATE_OCCUPANCIES_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS rate_occupancies (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        rate_plan_id INTEGER NOT NULL REFERENCES rate_plans(id) ON DELETE CASCADE,
        min_occupancy INTEGER NOT NULL CHECK (min_occupancy >= 1),
        max_occupancy INTEGER NOT NULL,
        pricing_model TEXT NOT NULL,
        base_amount TEXT NOT NULL,
        per_person_amount TEXT NOT NULL,
        CHECK (min_occupancy <= max_occupancy)
    )";

/// Every table and index, in creation order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_METADATA_TABLE,
    CREATE_SUPPLIERS_TABLE,
    CREATE_TIME_SLOTS_TABLE,
    CREATE_POOLS_TABLE,
    CREATE_BUCKETS_TABLE,
    CREATE_BUCKET_SCOPE_INDEX,
    CREATE_BUCKET_DATE_INDEX,
    CREATE_BUCKET_POOL_INDEX,
    CREATE_RESERVATIONS_TABLE,
    CREATE_RESERVATION_BUCKET_INDEX,
    CREATE_RESERVATION_EXPIRY_INDEX,
    CREATE_RATE_PLANS_TABLE,
    CREATE_RATE_PLAN_INDEX,
    CREATE_RATE_SEASONS_TABLE,
    CREATE_RATE_OCCUPANCIES_TABLE,
];

/// SQL statement to select the schema version from the metadata table.
pub const SELECT_SCHEMA_VERSION: &str = "SELECT value FROM metadata WHERE key = 'schema_version'";

/// SQL statement to insert or update the schema version in the metadata table.
pub const INSERT_SCHEMA_VERSION: &str =
    "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?)";

/// Column list shared by every bucket query; see `row_to_bucket`.
pub const BUCKET_COLUMNS: &str = r"
    id, org, variant, supplier_id, scope_kind, start_date, end_date, slot_id,
    quantity, booked, held, allocation_type, stop_sell, blackout,
    allow_overbooking, overbooking_limit, unit_cost, currency,
    release_period_hours, min_nights, max_nights, min_pax, max_pax,
    pool_id, notes, alternates, version, created_at
";

/// Column list shared by every pool query; see `row_to_pool`.
pub const POOL_COLUMNS: &str =
    "id, org, name, quantity, booked, held, allow_overbooking, overbooking_limit, version";

/// Column list shared by every reservation query; see `row_to_reservation`.
pub const RESERVATION_COLUMNS: &str =
    "id, org, bucket_id, pool_id, quantity, status, created_at, expires_at";
