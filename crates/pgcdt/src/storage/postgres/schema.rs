//! PostgreSQL schema definitions and SQL query constants.
//!
//! Pure data, no I/O. The composite `address` type must list its fields in the
//! same order as `Address`'s `CompositeRecord` impl.

/// Creates the `address` type and the tables. Safe to run repeatedly.
pub const PROVISION: &str = r#"
DO $$
BEGIN
    CREATE TYPE address AS (
        block_no integer,
        street_address varchar,
        city varchar,
        state varchar,
        pin_code integer
    );
EXCEPTION
    WHEN duplicate_object THEN NULL;
END
$$;

CREATE TABLE IF NOT EXISTS users (
    id SERIAL PRIMARY KEY,
    name VARCHAR NOT NULL,
    address address
);

CREATE TABLE IF NOT EXISTS contacts (
    email VARCHAR PRIMARY KEY,
    name VARCHAR NOT NULL,
    phone_numbers JSONB
);

CREATE TABLE IF NOT EXISTS tagged_contacts (
    email VARCHAR PRIMARY KEY,
    name VARCHAR NOT NULL,
    phone_numbers JSONB
);
"#;

/// Drops everything `PROVISION` creates.
pub const TEARDOWN: &str = r#"
DROP TABLE IF EXISTS users;
DROP TABLE IF EXISTS contacts;
DROP TABLE IF EXISTS tagged_contacts;
DROP TYPE IF EXISTS address;
"#;

/// Indexes exercised by the plan comparisons.
pub const CREATE_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_users_pin_code ON users (((address).pin_code));
CREATE INDEX IF NOT EXISTS idx_phone_numbers ON contacts USING gin (phone_numbers);
CREATE INDEX IF NOT EXISTS idx_tagged_phone_numbers ON tagged_contacts USING gin (phone_numbers);
"#;

/// Batch insert head; rows are appended with `QueryBuilder::push_values`.
pub const INSERT_CONTACTS: &str = "INSERT INTO contacts (name, email, phone_numbers) ";

pub const SELECT_CONTACTS: &str =
    "SELECT name, email, phone_numbers::text AS phone_numbers FROM contacts";

/// `?` is the jsonb key-existence operator, not a placeholder.
pub const SELECT_CONTACTS_WITH_LABEL: &str =
    "SELECT name, email, phone_numbers::text AS phone_numbers FROM contacts WHERE phone_numbers ? $1";

/// Batch insert head; rows are appended with `QueryBuilder::push_values`.
pub const INSERT_TAGGED_CONTACTS: &str =
    "INSERT INTO tagged_contacts (name, email, phone_numbers) ";

pub const SELECT_TAGGED_CONTACTS: &str =
    "SELECT name, email, phone_numbers::text AS phone_numbers FROM tagged_contacts";

/// `$1` is a containment operand such as `[{"tag":"Home"}]`.
pub const SELECT_TAGGED_CONTACTS_WITH_TAG: &str = "SELECT name, email, phone_numbers::text AS phone_numbers FROM tagged_contacts WHERE phone_numbers @> $1::jsonb";

/// Unnests the arrays of the rows matched by containment (`$2`) and keeps the
/// entries tagged `$1`. The lateral join itself cannot use the GIN index.
pub const SELECT_TAGGED_NUMBERS: &str = r#"
SELECT (entry.val->>'value')::bigint AS number
FROM tagged_contacts
JOIN LATERAL jsonb_array_elements(tagged_contacts.phone_numbers) AS entry(val)
    ON entry.val->>'tag' = $1
WHERE tagged_contacts.phone_numbers @> $2::jsonb
"#;

/// Batch insert head; rows are appended with `QueryBuilder::push_values`.
pub const INSERT_USERS: &str = "INSERT INTO users (name, address) ";

pub const SELECT_USERS: &str = "SELECT id, name, address FROM users ORDER BY id";

pub const SELECT_USERS_BY_PIN_CODE: &str =
    "SELECT id, name, address FROM users WHERE (address).pin_code = $1 ORDER BY id";

/// Session setting that steers the planner towards indexes.
pub const DISABLE_SEQSCAN: &str = "SET enable_seqscan TO off";

/// Bind parameter ceiling of the wire protocol.
pub const MAX_BIND_PARAMS: usize = 65_535;
