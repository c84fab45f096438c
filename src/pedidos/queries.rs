use chrono::{Days, NaiveDate};

use crate::{
    AthenaError,
    errors::{ErrorKind, error},
    query::{QueryRequest, QueryTarget},
};

/// Lookup queries behind the dashboard's form selects, in the order the
/// form shows them.
pub const FORM_OPTION_QUERIES: [(&str, &str); 5] = [
    ("referencia", "SELECT referencia FROM referencias_unicas"),
    ("maquina", "SELECT maquina FROM maquinas_unicas"),
    ("seccion", "SELECT seccion FROM secciones_unicas"),
    ("proceso", "SELECT proceso FROM procesos_unicos"),
    ("usuario", "SELECT usuario FROM usuarios_unicos"),
];

static DATASET_QUERY: &str = "SELECT * FROM raw";
static DATASET_ORDER: &str = "ORDER BY fecha_inicio DESC";

pub const DEFAULT_LIMIT: u32 = 10;
pub const DEFAULT_DAYS_BACK: u64 = 30;
pub const DEFAULT_BASE_DATE: &str = "2024-01-01";

/// `days_back` value that selects everything up to the base date.
pub const ALL_BEFORE: i64 = -1;

/// The named form option queries, each capped at `limit` rows.
pub fn form_option_queries(target: &QueryTarget, limit: u64) -> Vec<(&'static str, QueryRequest)> {
    FORM_OPTION_QUERIES
        .iter()
        .map(|(name, sql)| (*name, target.request(format!("{sql} LIMIT {limit}"))))
        .collect()
}

/// Range of `fecha_inicio` the dataset query covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateWindow {
    AllBefore(NaiveDate),
    Between { start: NaiveDate, end: NaiveDate },
}

impl DateWindow {
    /// `days_back` of [`ALL_BEFORE`] selects every row up to `base`; `0`
    /// falls back to [`DEFAULT_DAYS_BACK`]. Any other negative value is rejected.
    pub fn from_params(base: NaiveDate, days_back: i64) -> Result<Self, AthenaError> {
        if days_back == ALL_BEFORE {
            return Ok(DateWindow::AllBefore(base));
        }

        let days = match days_back {
            0 => DEFAULT_DAYS_BACK,
            d if d < 0 => {
                return Err(error!(
                    kind = ErrorKind::Config,
                    format!("daysBack must be -1 or positive, got {d}")
                ));
            }
            d => d as u64,
        };

        let start = base.checked_sub_days(Days::new(days)).ok_or(error!(
            kind = ErrorKind::Config,
            format!("daysBack {days} reaches before the earliest supported date")
        ))?;

        Ok(DateWindow::Between { start, end: base })
    }

    pub fn where_clause(&self) -> String {
        match self {
            DateWindow::AllBefore(base) => {
                format!("WHERE fecha_inicio <= DATE '{}'", base.format("%Y-%m-%d"))
            }
            DateWindow::Between { start, end } => format!(
                "WHERE fecha_inicio BETWEEN DATE '{}' AND DATE '{}'",
                start.format("%Y-%m-%d"),
                end.format("%Y-%m-%d")
            ),
        }
    }
}

/// `YYYY-MM-DD` only. Anything else is a [`ErrorKind::Config`] error.
pub fn parse_base_date(raw: &str) -> Result<NaiveDate, AthenaError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| {
        error!(
            kind = ErrorKind::Config,
            format!("baseDate must be YYYY-MM-DD, got '{raw}': {e}")
        )
    })
}

pub fn dataset_sql(window: &DateWindow, limit: Option<u64>) -> String {
    let mut sql = format!("{DATASET_QUERY} {} {DATASET_ORDER}", window.where_clause());
    if let Some(limit) = limit {
        sql.push_str(&format!(" LIMIT {limit}"));
    }
    sql
}

pub fn dataset_query(target: &QueryTarget, window: &DateWindow, limit: Option<u64>) -> QueryRequest {
    target.request(dataset_sql(window, limit))
}
