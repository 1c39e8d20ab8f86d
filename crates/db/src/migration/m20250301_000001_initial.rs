//! Initial database migration.
//!
//! Creates the enums, tables and indexes for companies, profiles, approval
//! rules, expenses and approval steps.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: TENANCY & PEOPLE
        // ============================================================
        db.execute_unprepared(COMPANIES_SQL).await?;
        db.execute_unprepared(PROFILES_SQL).await?;

        // ============================================================
        // PART 3: APPROVAL WORKFLOW
        // ============================================================
        db.execute_unprepared(APPROVAL_RULES_SQL).await?;
        db.execute_unprepared(EXPENSES_SQL).await?;
        db.execute_unprepared(APPROVAL_STEPS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE profile_role AS ENUM ('admin', 'manager', 'employee');
CREATE TYPE approval_rule_type AS ENUM ('percentage', 'specific', 'hybrid');
CREATE TYPE expense_status AS ENUM ('draft', 'pending', 'approved', 'rejected');
CREATE TYPE approval_step_status AS ENUM ('pending', 'approved', 'rejected', 'skipped');
";

const COMPANIES_SQL: &str = r"
CREATE TABLE companies (
    id              UUID PRIMARY KEY,
    name            VARCHAR(255) NOT NULL,
    base_currency   VARCHAR(3) NOT NULL CHECK (base_currency ~ '^[A-Z]{3}$'),
    country         VARCHAR(100) NOT NULL,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const PROFILES_SQL: &str = r"
CREATE TABLE profiles (
    id          UUID PRIMARY KEY,
    company_id  UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    full_name   VARCHAR(255) NOT NULL,
    email       VARCHAR(255) NOT NULL,
    role        profile_role NOT NULL DEFAULT 'employee',
    manager_id  UUID REFERENCES profiles(id) ON DELETE SET NULL,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT profiles_email_unique UNIQUE (company_id, email),
    CONSTRAINT profiles_not_own_manager CHECK (manager_id IS NULL OR manager_id <> id)
);

CREATE INDEX idx_profiles_company ON profiles(company_id);
CREATE INDEX idx_profiles_manager ON profiles(manager_id) WHERE manager_id IS NOT NULL;
";

const APPROVAL_RULES_SQL: &str = r"
CREATE TABLE approval_rules (
    id                   UUID PRIMARY KEY,
    company_id           UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    name                 VARCHAR(255) NOT NULL,
    description          TEXT,
    rule_type            approval_rule_type NOT NULL,
    is_manager_approver  BOOLEAN NOT NULL DEFAULT FALSE,
    approver_ids         UUID[] NOT NULL DEFAULT '{}',
    sequence_order       BOOLEAN NOT NULL DEFAULT FALSE,
    percentage_required  INTEGER CHECK (percentage_required BETWEEN 1 AND 100),
    specific_approver    UUID REFERENCES profiles(id) ON DELETE RESTRICT,
    created_at           TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at           TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT approval_rules_percentage_present CHECK (
        rule_type = 'specific' OR percentage_required IS NOT NULL
    ),
    CONSTRAINT approval_rules_specific_present CHECK (
        rule_type <> 'specific' OR specific_approver IS NOT NULL
    )
);

CREATE INDEX idx_approval_rules_company ON approval_rules(company_id, created_at DESC);
";

const EXPENSES_SQL: &str = r"
CREATE TABLE expenses (
    id                UUID PRIMARY KEY,
    company_id        UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    created_by        UUID NOT NULL REFERENCES profiles(id) ON DELETE RESTRICT,
    description       TEXT NOT NULL,
    category          VARCHAR(100) NOT NULL,
    date_of_expense   DATE NOT NULL,
    paid_by           VARCHAR(100),
    amount            NUMERIC(19, 4) NOT NULL CHECK (amount > 0),
    currency          VARCHAR(3) NOT NULL,
    amount_base       NUMERIC(19, 4) NOT NULL,
    base_currency     VARCHAR(3) NOT NULL,
    status            expense_status NOT NULL DEFAULT 'pending',
    approval_rule_id  UUID REFERENCES approval_rules(id) ON DELETE SET NULL,
    approval_policy   JSONB NOT NULL,
    receipt_path      TEXT,
    created_at        TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at        TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_expenses_company_status ON expenses(company_id, status, created_at DESC);
CREATE INDEX idx_expenses_created_by ON expenses(created_by, created_at DESC);
";

const APPROVAL_STEPS_SQL: &str = r"
CREATE TABLE approval_steps (
    id              UUID PRIMARY KEY,
    expense_id      UUID NOT NULL REFERENCES expenses(id) ON DELETE CASCADE,
    approver_id     UUID NOT NULL REFERENCES profiles(id) ON DELETE RESTRICT,
    sequence_index  INTEGER NOT NULL CHECK (sequence_index >= 0),
    status          approval_step_status NOT NULL DEFAULT 'pending',
    comment         TEXT,
    acted_at        TIMESTAMPTZ,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT approval_steps_one_per_approver UNIQUE (expense_id, approver_id),
    CONSTRAINT approval_steps_dense_index UNIQUE (expense_id, sequence_index),
    CONSTRAINT approval_steps_rejection_comment CHECK (
        status <> 'rejected' OR (comment IS NOT NULL AND btrim(comment) <> '')
    )
);

CREATE INDEX idx_approval_steps_queue ON approval_steps(approver_id, status);
";

const DROP_SQL: &str = r"
DROP TABLE IF EXISTS approval_steps;
DROP TABLE IF EXISTS expenses;
DROP TABLE IF EXISTS approval_rules;
DROP TABLE IF EXISTS profiles;
DROP TABLE IF EXISTS companies;
DROP TYPE IF EXISTS approval_step_status;
DROP TYPE IF EXISTS expense_status;
DROP TYPE IF EXISTS approval_rule_type;
DROP TYPE IF EXISTS profile_role;
";
