//! SQL schema for the Roster SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS coordinates (
    id  INTEGER PRIMARY KEY AUTOINCREMENT,
    x   REAL NOT NULL,
    y   REAL NOT NULL
);

CREATE TABLE IF NOT EXISTS locations (
    id  INTEGER PRIMARY KEY AUTOINCREMENT,
    x   REAL    NOT NULL,
    y   INTEGER NOT NULL,
    z   INTEGER NOT NULL
);

-- Owned rows are referenced by exactly one person (UNIQUE foreign keys).
CREATE TABLE IF NOT EXISTS persons (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    name           TEXT    NOT NULL
                   CHECK (length(trim(name)) > 0 AND length(name) <= 255),
    coordinates_id INTEGER NOT NULL UNIQUE REFERENCES coordinates(id),
    creation_date  TEXT    NOT NULL,   -- RFC 3339 with the reference offset
    eye_color      TEXT    NOT NULL,   -- Color member name
    hair_color     TEXT    NOT NULL,   -- Color member name
    location_id    INTEGER UNIQUE REFERENCES locations(id),
    height         INTEGER NOT NULL CHECK (height BETWEEN 1 AND 1000000),
    birthday       TEXT,               -- YYYY-MM-DD
    nationality    TEXT    NOT NULL    -- Country member name
);

CREATE INDEX IF NOT EXISTS persons_nationality_idx ON persons(nationality);
CREATE INDEX IF NOT EXISTS persons_hair_color_idx  ON persons(hair_color);
CREATE INDEX IF NOT EXISTS persons_height_idx      ON persons(height);

PRAGMA user_version = 1;
";
