// Decimals are bound as text and cast to NUMERIC (`$n::text::numeric`), which keeps their
// full precision without a driver-side decimal type.

//////////////////////////////////////////////////////////////////
// sec
//////////////////////////////////////////////////////////////////

/// One row per reporting manager and quarter; the holdings scraper only fills in the totals.
pub(crate) static CREATE_MANAGER_QUARTER: &str = "
    CREATE TABLE IF NOT EXISTS manager_quarter (
        cik TEXT NOT NULL,
        period_end DATE NOT NULL,
        total_value_m NUMERIC,
        num_holdings INTEGER,
        PRIMARY KEY (cik, period_end)
    )
";

/// Holdings of a manager's 13F, as filed on EDGAR, with values scaled to dollars.
pub(crate) static CREATE_MANAGER_QUARTER_HOLDING: &str = "
    CREATE TABLE IF NOT EXISTS manager_quarter_holding (
        cik TEXT NOT NULL,
        period_end DATE NOT NULL,
        accession_no TEXT NOT NULL,
        line_no INTEGER NOT NULL,
        issuer TEXT,
        title_of_class TEXT,
        cusip TEXT,
        value_usd NUMERIC,
        shares NUMERIC,
        share_type TEXT,
        put_call TEXT,
        investment_discretion TEXT,
        other_manager TEXT,
        voting_sole BIGINT,
        voting_shared BIGINT,
        voting_none BIGINT,
        unit_multiplier INTEGER,
        created_at TIMESTAMP DEFAULT NOW(),
        PRIMARY KEY (cik, period_end, accession_no, line_no)
    )
";

/// Takes the cover-page total in dollars; `total_value_m` is in millions.
pub(crate) static UPDATE_TOTAL_VALUE: &str = "
    UPDATE manager_quarter SET total_value_m = $1::text::numeric / 1000000
    WHERE cik = $2 AND period_end = $3
";

pub(crate) static UPDATE_NUM_HOLDINGS: &str = "
    UPDATE manager_quarter SET num_holdings = $1
    WHERE cik = $2 AND period_end = $3
";

pub(crate) static DELETE_MANAGER_QUARTER_HOLDINGS: &str = "
    DELETE FROM manager_quarter_holding
    WHERE cik = $1 AND period_end = $2
";

pub(crate) static INSERT_MANAGER_QUARTER_HOLDING: &str = "
    INSERT INTO manager_quarter_holding (
        cik,
        period_end,
        accession_no,
        line_no,
        issuer,
        title_of_class,
        cusip,
        value_usd,
        shares,
        share_type,
        put_call,
        investment_discretion,
        other_manager,
        voting_sole,
        voting_shared,
        voting_none,
        unit_multiplier
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8::text::numeric, $9::text::numeric, $10, $11, $12, $13, $14, $15, $16, $17)
    ON CONFLICT (cik, period_end, accession_no, line_no) DO NOTHING
";

//////////////////////////////////////////////////////////////////
// 13f.info
//////////////////////////////////////////////////////////////////

/// Holdings as published by 13f.info, kept beside the EDGAR ones for reconciliation.
pub(crate) static CREATE_EXPECTED_13FINFO_HOLDINGS: &str = "
    CREATE TABLE IF NOT EXISTS expected_13finfo_holdings (
        manager_url TEXT,
        cik TEXT,
        quarter TEXT,
        filing_url TEXT,
        sym TEXT,
        issuer_name TEXT,
        class TEXT,
        cusip TEXT,
        value_000 NUMERIC,
        pct NUMERIC,
        shares NUMERIC,
        principal TEXT,
        option_type TEXT,
        value_usd NUMERIC,
        unit_multiplier INTEGER
    )
";

pub(crate) static DELETE_13FINFO_FILING: &str = "
    DELETE FROM expected_13finfo_holdings
    WHERE filing_url = $1
";

pub(crate) static INSERT_13FINFO_HOLDING: &str = "
    INSERT INTO expected_13finfo_holdings (
        manager_url,
        cik,
        quarter,
        filing_url,
        sym,
        issuer_name,
        class,
        cusip,
        value_000,
        pct,
        shares,
        principal,
        option_type,
        value_usd,
        unit_multiplier
    )
    VALUES (
        $1, $2, $3, $4, $5, $6, $7, $8,
        $9::text::numeric, $10::text::numeric, $11::text::numeric,
        $12, $13, $14::text::numeric, $15
    )
";
