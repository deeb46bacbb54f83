//! Per-day buy decisions.
//!
//! Every strategy kind reduces to a pure function of the day's price, the
//! optional SMA-50 feature, the trades made so far and the cash on hand.
//! The only randomness (the chance buy near the moving average) is drawn
//! from a caller-supplied generator so runs can be replayed from a seed.

use chrono::NaiveDate;
use rand::Rng;

use super::error::DcatraderError;
use super::execution::affordable_quantity;
use super::strategy::StrategyKind;

pub const DEEP_DRAWDOWN_PCT: f64 = -5.0;
pub const NEAR_AVERAGE_PCT: f64 = 3.0;
pub const DEEP_TIER_CAP: i64 = 4;
pub const SHALLOW_TIER_CAP: i64 = 2;
pub const CHANCE_TIER_CAP: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawdownParams {
    /// Shares bought on the very first trade, regardless of tier.
    pub opening_lot: i64,
    /// Chance of a chance buy when price sits in [0%, 3%) above the average.
    pub buy_probability: f64,
}

impl Default for DrawdownParams {
    fn default() -> Self {
        DrawdownParams {
            opening_lot: 10,
            buy_probability: 0.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionInput<'a> {
    pub date: NaiveDate,
    pub price: f64,
    pub sma_50: Option<f64>,
    /// Column the moving average was read from; named in errors.
    pub feature_column: &'a str,
    pub cash: f64,
    pub trades_so_far: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub buy: bool,
    pub quantity: i64,
}

impl Decision {
    pub fn hold() -> Self {
        Decision {
            buy: false,
            quantity: 0,
        }
    }

    pub fn buy(quantity: i64) -> Self {
        Decision {
            buy: true,
            quantity,
        }
    }
}

/// Where the price sits relative to its moving average.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawdownTier {
    /// ratio < -5
    Deep,
    /// -5 <= ratio < 0
    Shallow,
    /// 0 <= ratio < 3
    Near,
    /// ratio >= 3
    Above,
}

impl DrawdownTier {
    pub fn classify(ratio: f64) -> Self {
        if ratio < DEEP_DRAWDOWN_PCT {
            DrawdownTier::Deep
        } else if ratio < 0.0 {
            DrawdownTier::Shallow
        } else if ratio < NEAR_AVERAGE_PCT {
            DrawdownTier::Near
        } else {
            DrawdownTier::Above
        }
    }
}

/// 100 * (price / sma - 1), rounded to 1e-9 percent.
///
/// The rounding keeps exact tier boundaries exact: 95 against an average of
/// 100 must land on -5.0, not on -5.000000000000004.
pub fn drawdown_ratio(price: f64, sma: f64) -> f64 {
    let raw = 100.0 * (price - sma) / sma;
    (raw * 1e9).round() / 1e9
}

pub fn decide<R: Rng + ?Sized>(
    kind: StrategyKind,
    input: &DecisionInput<'_>,
    params: &DrawdownParams,
    rng: &mut R,
) -> Result<Decision, DcatraderError> {
    if kind.uses_drawdown() {
        decide_drawdown(kind, input, params, rng)
    } else {
        Ok(decide_always_buy(input))
    }
}

/// Buy-and-hold and plain DCA: spend whatever the cash buys.
pub fn decide_always_buy(input: &DecisionInput<'_>) -> Decision {
    Decision {
        buy: input.cash > input.price,
        quantity: affordable_quantity(input.cash, input.price),
    }
}

fn decide_drawdown<R: Rng + ?Sized>(
    kind: StrategyKind,
    input: &DecisionInput<'_>,
    params: &DrawdownParams,
    rng: &mut R,
) -> Result<Decision, DcatraderError> {
    let sma = input.sma_50.ok_or_else(|| DcatraderError::MissingValue {
        field: input.feature_column.to_string(),
        date: input.date,
    })?;
    let affordable = affordable_quantity(input.cash, input.price);

    if input.trades_so_far == 0 {
        return Ok(Decision::buy(params.opening_lot.min(affordable)));
    }

    let ratio = drawdown_ratio(input.price, sma);
    let decision = match DrawdownTier::classify(ratio) {
        DrawdownTier::Deep => match kind.deep_tier_cap() {
            Some(cap) => Decision::buy(affordable.min(cap)),
            None => Decision::buy(affordable),
        },
        DrawdownTier::Shallow => Decision::buy(affordable.min(SHALLOW_TIER_CAP)),
        DrawdownTier::Near => Decision {
            buy: rng.r#gen::<f64>() < params.buy_probability,
            quantity: affordable.min(CHANCE_TIER_CAP),
        },
        DrawdownTier::Above => Decision::hold(),
    };
    Ok(decision)
}
