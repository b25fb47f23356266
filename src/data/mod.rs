//! Entity data assemblers.
//!
//! Each assembler fetches current entity state, the same entities at
//! historical blocks, and derives windowed metrics from the difference.
//! Network failures never escape: they are logged and the affected period
//! degrades to "unavailable" (zero delta, no percent change).

pub mod global;
pub mod pairs;
pub mod series;

use log::warn;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::{
    graph::{queries::DAY_DATA_PAGE_SIZE, GraphQuery},
    models::Block,
    utils::two_period_change,
};

pub use global::GlobalAssembler;
pub use pairs::PairAssembler;

/// Historical comparison point for one period.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Baseline<T> {
    /// The period's block is not indexed yet: compare against current values.
    Unresolved,
    /// The entity did not exist yet at the period's block: its values count
    /// as zero.
    Missing,
    /// The entity should exist at the period's block but could not be
    /// fetched: metrics over this period are unavailable.
    Unavailable,
    Found(T),
}

impl<T> Baseline<T> {
    /// Baseline value of `field`, or `None` when the period is unavailable.
    pub(crate) fn value(&self, current: &T, field: impl Fn(&T) -> f64) -> Option<f64> {
        match self {
            Baseline::Unresolved => Some(field(current)),
            Baseline::Missing => Some(0.0),
            Baseline::Unavailable => None,
            Baseline::Found(snapshot) => Some(field(snapshot)),
        }
    }

    /// Classify the outcome of a historical lookup at `block`.
    ///
    /// `created_at_block` is the entity's creation block when known; an
    /// entity absent at a block before its creation is `Missing`, any other
    /// absence is `Unavailable`.
    pub(crate) fn from_lookup(
        block: Option<Block>,
        snapshot: Option<T>,
        created_at_block: Option<u64>,
    ) -> Self {
        match (block, snapshot) {
            (None, _) => Baseline::Unresolved,
            (Some(_), Some(snapshot)) => Baseline::Found(snapshot),
            (Some(block), None) => match created_at_block {
                Some(created) if created > block.number => Baseline::Missing,
                _ => Baseline::Unavailable,
            },
        }
    }
}

/// Delta of a cumulative `field` over the latest period and its percent
/// change against the period before.
///
/// An unavailable latest period yields `(0, None)`; an unavailable earlier
/// period keeps the delta but drops the change.
pub(crate) fn period_change<T>(
    current: &T,
    one_ago: &Baseline<T>,
    two_ago: &Baseline<T>,
    field: impl Fn(&T) -> f64,
) -> (f64, Option<f64>) {
    let now = field(current);
    match (one_ago.value(current, &field), two_ago.value(current, &field)) {
        (Some(one), Some(two)) => two_period_change(now, one, two),
        (Some(one), None) => (now - one, None),
        (None, _) => (0.0, None),
    }
}

/// Delta of a cumulative `field` since `baseline`, 0 when unavailable.
pub(crate) fn delta_since<T>(current: &T, baseline: &Baseline<T>, field: impl Fn(&T) -> f64) -> f64 {
    baseline
        .value(current, &field)
        .map(|then| field(current) - then)
        .unwrap_or_default()
}

/// Page through a `first`/`skip` collection until a short page comes back.
///
/// `variables` gets a `skip` entry per page. A failing page ends the walk and
/// whatever was collected so far is returned.
pub(crate) async fn fetch_paged<T: DeserializeOwned>(
    client: &dyn GraphQuery,
    document: &str,
    mut variables: Value,
    field: &str,
) -> Vec<T> {
    let mut collected = Vec::new();
    let mut skip = 0usize;

    loop {
        variables["skip"] = json!(skip);

        let page: Vec<T> = match client.query(document, variables.clone()).await {
            Ok(mut data) => match serde_json::from_value(
                data.get_mut(field).map(Value::take).unwrap_or(Value::Null),
            ) {
                Ok(page) => page,
                Err(e) => {
                    warn!("Malformed {} page at skip {}: {}", field, skip, e);
                    break;
                },
            },
            Err(e) => {
                warn!("Failed to fetch {} page at skip {}: {}", field, skip, e);
                break;
            },
        };

        let page_len = page.len();
        collected.extend(page);

        if page_len < DAY_DATA_PAGE_SIZE {
            break;
        }
        skip += DAY_DATA_PAGE_SIZE;
    }

    collected
}
