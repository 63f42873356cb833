use std::collections::HashSet;
use std::path::Path;

use tracing::info;

use crate::engine::csv;
use crate::engine::error::LoadError;
use crate::model::scenario::{Outcome, OutcomeTable, Scenario};

const COL_ROUND: &str = "round";
const COL_SCENARIO_ID: &str = "scenario_id";
const COL_TITLE: &str = "scenario_title";
const COL_OPTIONS: &str = "options";
const COL_HUMAN_INFO: &str = "human_private_info";
const COL_AI_INFO: &str = "ai_private_info";

const OUTCOME_COLUMNS: [&str; 4] = [
    "option_A_outcome",
    "option_B_outcome",
    "option_C_outcome",
    "option_D_outcome",
];

/// Immutable, ordered collection of scenarios for one session.
///
/// Loaded once at session start; exposes scenarios only by ordered
/// iteration, ascending by round number.
#[derive(Debug, Clone)]
pub struct ScenarioCatalog {
    scenarios: Vec<Scenario>,
}

impl ScenarioCatalog {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let catalog = Self::from_csv(&raw)?;
        info!(
            scenarios = catalog.len(),
            path = %path.display(),
            "scenario catalog loaded"
        );
        Ok(catalog)
    }

    pub fn from_csv(raw: &str) -> Result<Self, LoadError> {
        let rows = csv::parse(raw);
        let mut rows = rows.into_iter();

        let header = rows.next().ok_or(LoadError::EmptyCatalog)?;
        let columns = ColumnMap::from_header(&header)?;

        let mut scenarios = Vec::new();
        let mut seen_rounds = HashSet::new();
        let mut seen_ids = HashSet::new();

        // Row numbers are 1-based and count the header.
        for (i, row) in rows.enumerate() {
            let row_num = i + 2;
            let scenario = parse_scenario(&columns, &row, row_num)?;

            if !seen_rounds.insert(scenario.round_num) {
                return Err(LoadError::DuplicateRound(scenario.round_num));
            }
            if !seen_ids.insert(scenario.scenario_id.clone()) {
                return Err(LoadError::DuplicateScenarioId(scenario.scenario_id));
            }

            scenarios.push(scenario);
        }

        if scenarios.is_empty() {
            return Err(LoadError::EmptyCatalog);
        }

        scenarios.sort_by_key(|s| s.round_num);

        Ok(Self { scenarios })
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Scenario> {
        self.scenarios.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scenario> {
        self.scenarios.iter()
    }
}

struct ColumnMap {
    round: usize,
    scenario_id: usize,
    title: usize,
    options: usize,
    human_info: usize,
    ai_info: usize,
    outcomes: [usize; 4],
}

impl ColumnMap {
    fn from_header(header: &[String]) -> Result<Self, LoadError> {
        let find = |name: &'static str| -> Result<usize, LoadError> {
            header
                .iter()
                .position(|h| h.trim() == name)
                .ok_or(LoadError::MissingColumn(name))
        };

        Ok(Self {
            round: find(COL_ROUND)?,
            scenario_id: find(COL_SCENARIO_ID)?,
            title: find(COL_TITLE)?,
            options: find(COL_OPTIONS)?,
            human_info: find(COL_HUMAN_INFO)?,
            ai_info: find(COL_AI_INFO)?,
            outcomes: [
                find(OUTCOME_COLUMNS[0])?,
                find(OUTCOME_COLUMNS[1])?,
                find(OUTCOME_COLUMNS[2])?,
                find(OUTCOME_COLUMNS[3])?,
            ],
        })
    }
}

fn parse_scenario(
    columns: &ColumnMap,
    row: &[String],
    row_num: usize,
) -> Result<Scenario, LoadError> {
    let cell = |index: usize| -> Result<&str, LoadError> {
        row.get(index)
            .map(String::as_str)
            .ok_or(LoadError::MalformedScenario {
                row: row_num,
                reason: format!("expected at least {} columns, found {}", index + 1, row.len()),
            })
    };

    let round_raw = cell(columns.round)?;
    let round_num = round_raw
        .trim()
        .parse::<i32>()
        .map_err(|_| LoadError::MalformedScenario {
            row: row_num,
            reason: format!("round {round_raw:?} is not an integer"),
        })?;

    let outcome = |slot: usize| -> Result<Outcome, LoadError> {
        let column = OUTCOME_COLUMNS[slot];
        parse_outcome_cell(cell(columns.outcomes[slot])?).map_err(|reason| {
            LoadError::MalformedOutcome {
                row: row_num,
                column,
                reason,
            }
        })
    };

    Ok(Scenario {
        round_num,
        scenario_id: cell(columns.scenario_id)?.to_string(),
        title: cell(columns.title)?.to_string(),
        options_text: cell(columns.options)?.to_string(),
        human_private_info: cell(columns.human_info)?.to_string(),
        ai_private_info: cell(columns.ai_info)?.to_string(),
        outcomes: OutcomeTable {
            a: outcome(0)?,
            b: outcome(1)?,
            c: outcome(2)?,
            d: outcome(3)?,
        },
    })
}

/// Parses one outcome cell.
///
/// Grammar: an optional `<label>:` prefix, then comma-separated
/// `key=value` pairs over the fixed key set
/// `safety, equity, cost, political, total`. Each key exactly once,
/// every value a signed integer. `total` is stored as given, never
/// recomputed from the components.
pub fn parse_outcome_cell(cell: &str) -> Result<Outcome, String> {
    let body = match cell.split_once(':') {
        Some((_, rest)) => rest,
        None => cell,
    };

    let mut safety = None;
    let mut equity = None;
    let mut cost = None;
    let mut political = None;
    let mut total = None;

    for pair in body.split(',') {
        let pair = pair.trim();
        if pair.is_empty() {
            return Err("empty key=value pair".to_string());
        }

        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("{pair:?} is not a key=value pair"))?;

        let key = key.trim();
        let value: i32 = value
            .trim()
            .parse()
            .map_err(|_| format!("value for {key:?} is not an integer"))?;

        let slot = match key {
            "safety" => &mut safety,
            "equity" => &mut equity,
            "cost" => &mut cost,
            "political" => &mut political,
            "total" => &mut total,
            _ => return Err(format!("unknown key {key:?}")),
        };

        if slot.replace(value).is_some() {
            return Err(format!("duplicate key {key:?}"));
        }
    }

    let require = |slot: Option<i32>, key: &str| slot.ok_or_else(|| format!("missing key {key:?}"));

    Ok(Outcome {
        safety: require(safety, "safety")?,
        equity: require(equity, "equity")?,
        cost: require(cost, "cost")?,
        political: require(political, "political")?,
        total: require(total, "total")?,
    })
}
