//! `SQLite` vessel store.
//!
//! Calls live in a single `vessel_calls` table. Timestamps are stored as
//! `TEXT` in `%Y-%m-%d %H:%M:%S%.3f` form, so window filters are plain
//! string comparisons and `strftime` can extract years and months.
//! Durations are taken from `julianday` differences rounded to the
//! millisecond, the same precision the in-memory store keeps.
//! Each [`AggregationQuery`] becomes one `GROUP BY` statement.

use std::path::Path;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use moosicbox_json_utils::database::ToValue as _;
use port_ops_database_models::{
    AggregationQuery, CallFilter, GroupKey, GroupValue, LabelField, Measure, NumericField,
    RawGroup, Reduced, Reducer, ReducerSpec, UNKNOWN_LABEL,
};
use port_ops_vessel_models::{
    CargoType, CoastalOrForeign, DurationComponents, TimeField, VesselCall,
};
use switchy_database::{Database, DatabaseValue};
use switchy_database_connection::init_sqlite_rusqlite;

use crate::{DbError, VesselStore};

/// Storage format of every timestamp column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Columns read back into a [`VesselCall`].
const CALL_COLUMNS: &str = "vessel_id, berth, cargo_type, commodity, flag_country, \
    coastal_or_foreign, cargo_tonnage, container_count, gross_tonnage, \
    arrival_outer_roads, berthing_time, unberthing_time, departure_outer_roads, \
    nor_time, pilot_boarding, pilot_unboarding, pbd_port, pbd_non_port, pbd_total, \
    snwb_total, swb_total, shifting_total, idling_port, idling_non_port, im_time, \
    om_time, trt_total";

/// A store backed by a `SQLite` database file.
pub struct SqliteVesselStore {
    db: Box<dyn Database>,
}

impl std::fmt::Debug for SqliteVesselStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteVesselStore").finish_non_exhaustive()
    }
}

impl SqliteVesselStore {
    /// Opens (or creates) the database at `path` and ensures the schema
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the file cannot be opened or the schema
    /// cannot be created.
    pub async fn open(path: &Path) -> Result<Self, DbError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let db = init_sqlite_rusqlite(Some(path)).map_err(|e| DbError::Connection(e.to_string()))?;

        ensure_schema(db.as_ref()).await?;

        Ok(Self { db })
    }

    /// Inserts calls, returning how many were written.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if any insert fails.
    pub async fn insert_calls(&self, calls: &[VesselCall]) -> Result<u64, DbError> {
        let mut written = 0;
        for call in calls {
            written += self
                .db
                .exec_raw_params(
                    "INSERT INTO vessel_calls (
                        vessel_id, berth, cargo_type, commodity, flag_country,
                        coastal_or_foreign, cargo_tonnage, container_count, gross_tonnage,
                        arrival_outer_roads, berthing_time, unberthing_time,
                        departure_outer_roads, nor_time, pilot_boarding, pilot_unboarding,
                        pbd_port, pbd_non_port, pbd_total, snwb_total, swb_total,
                        shifting_total, idling_port, idling_non_port, im_time, om_time,
                        trt_total
                     ) VALUES (
                        $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                        $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27
                     )",
                    &call_params(call),
                )
                .await?;
        }
        log::debug!("Inserted {written} vessel calls");
        Ok(written)
    }

    /// Total number of stored calls.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the query fails.
    pub async fn count(&self) -> Result<u64, DbError> {
        let rows = self
            .db
            .query_raw_params("SELECT COUNT(*) AS cnt FROM vessel_calls", &[])
            .await?;
        let count: i64 = rows.first().map_or(Ok(0), |r| {
            r.to_value("cnt").map_err(|e| DbError::Conversion {
                message: format!("cnt: {e}"),
            })
        })?;
        u64::try_from(count).map_err(|e| DbError::Conversion {
            message: format!("cnt: {e}"),
        })
    }
}

/// Creates the table and indexes if they don't already exist.
async fn ensure_schema(db: &dyn Database) -> Result<(), DbError> {
    db.exec_raw(
        "CREATE TABLE IF NOT EXISTS vessel_calls (
            id                    INTEGER PRIMARY KEY AUTOINCREMENT,
            vessel_id             TEXT NOT NULL,
            berth                 TEXT,
            cargo_type            TEXT NOT NULL,
            commodity             TEXT,
            flag_country          TEXT,
            coastal_or_foreign    TEXT,
            cargo_tonnage         REAL NOT NULL DEFAULT 0,
            container_count       INTEGER NOT NULL DEFAULT 0,
            gross_tonnage         REAL,
            arrival_outer_roads   TEXT,
            berthing_time         TEXT,
            unberthing_time       TEXT,
            departure_outer_roads TEXT,
            nor_time              TEXT,
            pilot_boarding        TEXT,
            pilot_unboarding      TEXT,
            pbd_port              INTEGER,
            pbd_non_port          INTEGER,
            pbd_total             INTEGER,
            snwb_total            INTEGER,
            swb_total             INTEGER,
            shifting_total        INTEGER,
            idling_port           INTEGER,
            idling_non_port       INTEGER,
            im_time               INTEGER,
            om_time               INTEGER,
            trt_total             INTEGER
        )",
    )
    .await?;

    db.exec_raw(
        "CREATE INDEX IF NOT EXISTS idx_vessel_calls_arrival
         ON vessel_calls (arrival_outer_roads)",
    )
    .await?;

    db.exec_raw(
        "CREATE INDEX IF NOT EXISTS idx_vessel_calls_berthing
         ON vessel_calls (berthing_time)",
    )
    .await?;

    Ok(())
}

fn opt_time(value: Option<NaiveDateTime>) -> DatabaseValue {
    value.map_or(DatabaseValue::Null, |t| {
        DatabaseValue::String(t.format(TIMESTAMP_FORMAT).to_string())
    })
}

fn opt_string(value: Option<&str>) -> DatabaseValue {
    value.map_or(DatabaseValue::Null, |s| DatabaseValue::String(s.to_string()))
}

fn opt_seconds(value: Option<u64>) -> DatabaseValue {
    value
        .and_then(|v| i64::try_from(v).ok())
        .map_or(DatabaseValue::Null, DatabaseValue::Int64)
}

fn call_params(call: &VesselCall) -> Vec<DatabaseValue> {
    let d = &call.durations;
    vec![
        DatabaseValue::String(call.vessel_id.clone()),
        opt_string(call.berth.as_deref()),
        DatabaseValue::String(call.cargo_type.to_string()),
        opt_string(call.commodity.as_deref()),
        opt_string(call.flag_country.as_deref()),
        opt_string(call.coastal_or_foreign.as_ref().map(AsRef::as_ref)),
        DatabaseValue::Real64(call.cargo_tonnage),
        DatabaseValue::Int64(i64::from(call.container_count)),
        call.gross_tonnage
            .map_or(DatabaseValue::Null, DatabaseValue::Real64),
        opt_time(call.arrival_outer_roads),
        opt_time(call.berthing_time),
        opt_time(call.unberthing_time),
        opt_time(call.departure_outer_roads),
        opt_time(call.nor_time),
        opt_time(call.pilot_boarding),
        opt_time(call.pilot_unboarding),
        opt_seconds(d.pbd_port),
        opt_seconds(d.pbd_non_port),
        opt_seconds(d.pbd_total),
        opt_seconds(d.snwb_total),
        opt_seconds(d.swb_total),
        opt_seconds(d.shifting_total),
        opt_seconds(d.idling_port),
        opt_seconds(d.idling_non_port),
        opt_seconds(d.im_time),
        opt_seconds(d.om_time),
        opt_seconds(d.trt_total),
    ]
}

/// Accumulates positional parameters while SQL text is built.
#[derive(Default)]
struct Params {
    values: Vec<DatabaseValue>,
}

impl Params {
    fn bind(&mut self, value: DatabaseValue) -> String {
        self.values.push(value);
        format!("${}", self.values.len())
    }

    fn bind_time(&mut self, at: NaiveDateTime) -> String {
        self.bind(DatabaseValue::String(at.format(TIMESTAMP_FORMAT).to_string()))
    }

    fn bind_cargo(&mut self, cargo: &CargoType) -> String {
        self.bind(DatabaseValue::String(cargo.to_string()))
    }

    fn bind_string(&mut self, value: &str) -> String {
        self.bind(DatabaseValue::String(value.to_string()))
    }
}

fn column(field: TimeField) -> &'static str {
    match field {
        TimeField::ArrivalOuterRoads => "arrival_outer_roads",
        TimeField::BerthingTime => "berthing_time",
        TimeField::UnberthingTime => "unberthing_time",
        TimeField::DepartureOuterRoads => "departure_outer_roads",
        TimeField::NorTime => "nor_time",
        TimeField::PilotBoarding => "pilot_boarding",
        TimeField::PilotUnboarding => "pilot_unboarding",
    }
}

fn numeric_sql(field: NumericField) -> &'static str {
    match field {
        NumericField::CargoTonnage => "cargo_tonnage",
        NumericField::ContainerCount => "container_count",
        NumericField::PbdTotal => "pbd_total",
        NumericField::SnwbTotal => "snwb_total",
        NumericField::SwbTotal => "swb_total",
        NumericField::ShiftingTotal => "shifting_total",
        NumericField::IdlingTotal => {
            "(CASE WHEN idling_port IS NULL AND idling_non_port IS NULL THEN NULL \
             ELSE COALESCE(idling_port, 0) + COALESCE(idling_non_port, 0) END)"
        }
        NumericField::ImTime => "im_time",
        NumericField::OmTime => "om_time",
        NumericField::TrtTotal => "trt_total",
        NumericField::WaitingBeforeBerth => {
            "(CASE WHEN pbd_total IS NULL AND snwb_total IS NULL THEN NULL \
             ELSE COALESCE(pbd_total, 0) + COALESCE(snwb_total, 0) END)"
        }
    }
}

fn label_sql(label: LabelField) -> String {
    match label {
        LabelField::Commodity => "commodity".to_string(),
        LabelField::CargoType => "cargo_type".to_string(),
        LabelField::FlagCountry => {
            format!("COALESCE(NULLIF(flag_country, ''), '{UNKNOWN_LABEL}')")
        }
    }
}

/// Seconds from `from` to `to`, at millisecond precision.
fn seconds_between(from: &str, to: &str) -> String {
    format!("(ROUND((julianday({to}) - julianday({from})) * 86400000.0) / 1000.0)")
}

fn measure_sql(measure: &Measure, params: &mut Params) -> String {
    match measure {
        Measure::Field(field) => numeric_sql(*field).to_string(),
        Measure::Elapsed { from, to } => seconds_between(column(*from), column(*to)),
        Measure::Clipped { from, to, window } => {
            let start = params.bind_time(window.start);
            let end = params.bind_time(window.end);
            let end_again = params.bind_time(window.end);
            format!(
                "MAX(0, {})",
                seconds_between(
                    &format!("MAX({}, {start})", column(*from)),
                    &format!("MIN(COALESCE({}, {end}), {end_again})", column(*to)),
                ),
            )
        }
    }
}

fn reducer_sql(spec: &ReducerSpec, params: &mut Params) -> String {
    let cargo = spec.only_cargo.as_ref().map(|c| params.bind_cargo(c));
    let restrict = |expr: String| match &cargo {
        Some(p) => format!("CASE WHEN cargo_type = {p} THEN {expr} END"),
        None => expr,
    };

    match &spec.reducer {
        Reducer::Count => match &cargo {
            Some(p) => format!("CAST(SUM(CASE WHEN cargo_type = {p} THEN 1 ELSE 0 END) AS REAL)"),
            None => "CAST(COUNT(*) AS REAL)".to_string(),
        },
        Reducer::Sum(m) => {
            let expr = restrict(measure_sql(m, params));
            format!("CAST(COALESCE(SUM({expr}), 0) AS REAL)")
        }
        Reducer::Avg(m) => {
            let expr = restrict(measure_sql(m, params));
            format!("AVG({expr})")
        }
        Reducer::Push(m) => {
            let expr = restrict(measure_sql(m, params));
            format!("GROUP_CONCAT({expr})")
        }
    }
}

fn where_sql(filter: &CallFilter, group_by: GroupKey, params: &mut Params) -> String {
    let mut conditions = Vec::new();

    if let Some((field, window)) = &filter.window {
        let start = params.bind_time(window.start);
        let end = params.bind_time(window.end);
        let col = column(*field);
        conditions.push(format!("{col} >= {start} AND {col} < {end}"));
    }
    if let Some((from, to, window)) = &filter.overlapping {
        let start = params.bind_time(window.start);
        let end = params.bind_time(window.end);
        let (from, to) = (column(*from), column(*to));
        conditions.push(format!(
            "{from} IS NOT NULL AND {from} < {end} AND ({to} IS NULL OR {to} > {start})"
        ));
    }
    for field in &filter.present {
        conditions.push(format!("{} IS NOT NULL", column(*field)));
    }
    for field in &filter.logged {
        conditions.push(format!("{} IS NOT NULL", numeric_sql(*field)));
    }
    for field in &filter.positive {
        conditions.push(format!("{} > 0", numeric_sql(*field)));
    }
    if let Some(cargo) = &filter.cargo_type {
        conditions.push(format!("cargo_type = {}", params.bind_cargo(cargo)));
    }
    if let Some(berth) = &filter.berth {
        conditions.push(format!("berth = {}", params.bind_string(berth)));
    }
    if let Some(vessel_id) = &filter.vessel_id {
        conditions.push(format!("vessel_id = {}", params.bind_string(vessel_id)));
    }
    if let Some(voyage) = filter.voyage {
        conditions.push(format!(
            "coastal_or_foreign = {}",
            params.bind_string(voyage.as_ref())
        ));
    }

    let commodity_present = "commodity IS NOT NULL AND commodity <> ''";
    match group_by {
        GroupKey::All | GroupKey::Label(LabelField::CargoType | LabelField::FlagCountry) => {}
        GroupKey::Year(field) | GroupKey::YearMonth(field) => {
            conditions.push(format!("{} IS NOT NULL", column(field)));
        }
        GroupKey::Label(LabelField::Commodity) => conditions.push(commodity_present.to_string()),
        GroupKey::YearMonthLabel(field, label) => {
            conditions.push(format!("{} IS NOT NULL", column(field)));
            if label == LabelField::Commodity {
                conditions.push(commodity_present.to_string());
            }
        }
    }

    if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    }
}

/// Renders a query as SQL plus its parameters.
fn build_sql(query: &AggregationQuery) -> (String, Vec<DatabaseValue>) {
    let mut params = Params::default();
    let mut select = Vec::new();

    let group_columns: &[&str] = match query.group_by {
        GroupKey::All => &[],
        GroupKey::Year(field) => {
            select.push(format!(
                "CAST(strftime('%Y', {}) AS INTEGER) AS k_year",
                column(field)
            ));
            &["k_year"]
        }
        GroupKey::YearMonth(field) => {
            let col = column(field);
            select.push(format!("CAST(strftime('%Y', {col}) AS INTEGER) AS k_year"));
            select.push(format!("CAST(strftime('%m', {col}) AS INTEGER) AS k_month"));
            &["k_year", "k_month"]
        }
        GroupKey::Label(label) => {
            select.push(format!("{} AS k_label", label_sql(label)));
            &["k_label"]
        }
        GroupKey::YearMonthLabel(field, label) => {
            let col = column(field);
            select.push(format!("CAST(strftime('%Y', {col}) AS INTEGER) AS k_year"));
            select.push(format!("CAST(strftime('%m', {col}) AS INTEGER) AS k_month"));
            select.push(format!("{} AS k_label", label_sql(label)));
            &["k_year", "k_month", "k_label"]
        }
    };

    for (i, spec) in query.reducers.iter().enumerate() {
        let expr = reducer_sql(spec, &mut params);
        select.push(format!("{expr} AS r{i}"));
    }
    select.push("COUNT(*) AS n_calls".to_string());

    let mut sql = format!("SELECT {} FROM vessel_calls", select.join(", "));
    sql.push_str(&where_sql(&query.filter, query.group_by, &mut params));

    if !group_columns.is_empty() {
        let keys = group_columns.join(", ");
        sql.push_str(&format!(" GROUP BY {keys} ORDER BY {keys}"));
    }

    (sql, params.values)
}

fn conversion(column: &str, e: impl std::fmt::Display) -> DbError {
    DbError::Conversion {
        message: format!("{column}: {e}"),
    }
}

fn row_key(row: &switchy_database::Row, group_by: GroupKey) -> Result<GroupValue, DbError> {
    let year = || -> Result<i32, DbError> {
        let value: i64 = row.to_value("k_year").map_err(|e| conversion("k_year", e))?;
        i32::try_from(value).map_err(|e| conversion("k_year", e))
    };

    let month = || -> Result<u32, DbError> {
        let value: i64 = row
            .to_value("k_month")
            .map_err(|e| conversion("k_month", e))?;
        u32::try_from(value).map_err(|e| conversion("k_month", e))
    };
    let label = || -> Result<String, DbError> {
        row.to_value("k_label")
            .map_err(|e| conversion("k_label", e))
    };

    Ok(match group_by {
        GroupKey::All => GroupValue::All,
        GroupKey::Year(_) => GroupValue::Year(year()?),
        GroupKey::YearMonth(_) => GroupValue::YearMonth {
            year: year()?,
            month: month()?,
        },
        GroupKey::Label(_) => GroupValue::Label(label()?),
        GroupKey::YearMonthLabel(..) => GroupValue::YearMonthLabel {
            year: year()?,
            month: month()?,
            label: label()?,
        },
    })
}

fn opt_time_value(
    row: &switchy_database::Row,
    name: &str,
) -> Result<Option<NaiveDateTime>, DbError> {
    let text: Option<String> = row.to_value(name).map_err(|e| conversion(name, e))?;
    text.map(|t| {
        NaiveDateTime::parse_from_str(&t, "%Y-%m-%d %H:%M:%S%.f").map_err(|e| conversion(name, e))
    })
    .transpose()
}

fn opt_seconds_value(row: &switchy_database::Row, name: &str) -> Result<Option<u64>, DbError> {
    let value: Option<i64> = row.to_value(name).map_err(|e| conversion(name, e))?;
    value
        .map(|v| u64::try_from(v).map_err(|e| conversion(name, e)))
        .transpose()
}

fn call_from_row(row: &switchy_database::Row) -> Result<VesselCall, DbError> {
    let text = |name: &str| -> Result<Option<String>, DbError> {
        row.to_value(name).map_err(|e| conversion(name, e))
    };
    let time = |name: &str| opt_time_value(row, name);
    let secs = |name: &str| opt_seconds_value(row, name);

    let cargo_type: String = row
        .to_value("cargo_type")
        .map_err(|e| conversion("cargo_type", e))?;
    let coastal_or_foreign = text("coastal_or_foreign")?
        .map(|v| {
            v.parse::<CoastalOrForeign>()
                .map_err(|e| conversion("coastal_or_foreign", e))
        })
        .transpose()?;
    let container_count: i64 = row
        .to_value("container_count")
        .map_err(|e| conversion("container_count", e))?;

    Ok(VesselCall {
        vessel_id: row
            .to_value("vessel_id")
            .map_err(|e| conversion("vessel_id", e))?,
        berth: text("berth")?,
        cargo_type: CargoType::from(cargo_type),
        commodity: text("commodity")?,
        flag_country: text("flag_country")?,
        coastal_or_foreign,
        cargo_tonnage: row
            .to_value("cargo_tonnage")
            .map_err(|e| conversion("cargo_tonnage", e))?,
        container_count: u32::try_from(container_count)
            .map_err(|e| conversion("container_count", e))?,
        gross_tonnage: row
            .to_value("gross_tonnage")
            .map_err(|e| conversion("gross_tonnage", e))?,
        arrival_outer_roads: time("arrival_outer_roads")?,
        berthing_time: time("berthing_time")?,
        unberthing_time: time("unberthing_time")?,
        departure_outer_roads: time("departure_outer_roads")?,
        nor_time: time("nor_time")?,
        pilot_boarding: time("pilot_boarding")?,
        pilot_unboarding: time("pilot_unboarding")?,
        durations: DurationComponents {
            pbd_port: secs("pbd_port")?,
            pbd_non_port: secs("pbd_non_port")?,
            pbd_total: secs("pbd_total")?,
            snwb_total: secs("snwb_total")?,
            swb_total: secs("swb_total")?,
            shifting_total: secs("shifting_total")?,
            idling_port: secs("idling_port")?,
            idling_non_port: secs("idling_non_port")?,
            im_time: secs("im_time")?,
            om_time: secs("om_time")?,
            trt_total: secs("trt_total")?,
        },
    })
}

fn parse_list(column: &str, joined: Option<String>) -> Result<Vec<f64>, DbError> {
    joined.map_or(Ok(Vec::new()), |joined| {
        joined
            .split(',')
            .filter(|s| !s.is_empty())
            .map(|s| s.trim().parse::<f64>().map_err(|e| conversion(column, e)))
            .collect()
    })
}

#[async_trait]
impl VesselStore for SqliteVesselStore {
    async fn aggregate(&self, query: &AggregationQuery) -> Result<Vec<RawGroup>, DbError> {
        let (sql, params) = build_sql(query);
        log::debug!("sqlite aggregate: {sql}");

        let rows = self.db.query_raw_params(&sql, &params).await?;

        let mut groups = Vec::with_capacity(rows.len());
        for row in &rows {
            let calls: i64 = row
                .to_value("n_calls")
                .map_err(|e| conversion("n_calls", e))?;
            if calls == 0 {
                continue;
            }

            let mut values = Vec::with_capacity(query.reducers.len());
            for (i, spec) in query.reducers.iter().enumerate() {
                let alias = format!("r{i}");
                let value = match spec.reducer {
                    Reducer::Push(_) => {
                        let joined: Option<String> = row
                            .to_value(alias.as_str())
                            .map_err(|e| conversion(&alias, e))?;
                        Reduced::List(parse_list(&alias, joined)?)
                    }
                    Reducer::Count | Reducer::Sum(_) | Reducer::Avg(_) => Reduced::Number(
                        row.to_value::<Option<f64>>(alias.as_str())
                            .map_err(|e| conversion(&alias, e))?,
                    ),
                };
                values.push((spec.name, value));
            }

            groups.push(RawGroup {
                key: row_key(row, query.group_by)?,
                values,
            });
        }

        Ok(groups)
    }

    async fn calls(&self, filter: &CallFilter) -> Result<Vec<VesselCall>, DbError> {
        let mut params = Params::default();
        let sql = format!(
            "SELECT {CALL_COLUMNS} FROM vessel_calls{} ORDER BY id",
            where_sql(filter, GroupKey::All, &mut params)
        );
        log::debug!("sqlite calls: {sql}");

        let rows = self.db.query_raw_params(&sql, &params.values).await?;
        rows.iter().map(call_from_row).collect()
    }

    async fn distinct_berths(&self) -> Result<Vec<String>, DbError> {
        let rows = self
            .db
            .query_raw_params(
                "SELECT DISTINCT berth FROM vessel_calls
                 WHERE berth IS NOT NULL
                 ORDER BY berth",
                &[],
            )
            .await?;

        rows.iter()
            .map(|row| row.to_value("berth").map_err(|e| conversion("berth", e)))
            .collect()
    }
}
