//! SQL schema for the termbridge history ledger.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Strictly append-only: no UPDATE or DELETE is ever issued against this table.
-- `seq` is the 1-based ledger position; `id` is its formatted form.
CREATE TABLE IF NOT EXISTS translation_history (
    seq             INTEGER PRIMARY KEY,
    id              TEXT NOT NULL UNIQUE,
    abha_id         TEXT NOT NULL,
    source_system   TEXT NOT NULL,
    source_code     TEXT NOT NULL,
    target_system   TEXT NOT NULL,
    target_code     TEXT NOT NULL,
    snomed_ct_code  TEXT NOT NULL,
    loinc_code      TEXT NOT NULL,
    timestamp       TEXT NOT NULL    -- ISO 8601 UTC; server-assigned
);

CREATE INDEX IF NOT EXISTS history_abha_idx ON translation_history(abha_id);

PRAGMA user_version = 1;
";
