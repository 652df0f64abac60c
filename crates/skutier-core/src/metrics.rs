//! # Metric Normalizer
//!
//! Turns the 14 raw metric cells of a row (7 lifetime + 7 recent) into
//! numbers that are either finite and non-negative, or NaN.
//!
//! Rules, per window:
//! - empty, missing or `NaN` cell → NaN
//! - unparsable cell → NaN + [`DiagnosticKind::NonNumeric`]
//! - negative or infinite number → NaN + [`DiagnosticKind::OutOfDomain`]
//! - `sales_velocity` and `conversion_days` are derived from
//!   `lots_sold / active_days` and `lots_sold_days / active_days` when absent;
//!   a derived ratio that overflows is NaN + [`DiagnosticKind::OutOfDomain`]
//! - when `active_days` is not strictly positive both ratios are NaN, even if
//!   the ratio column was supplied

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use serde::Serialize;

// =============================================================================
// WINDOWS AND METRICS
// =============================================================================

/// Observation window of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Window {
    /// Full history of the SKU.
    Lifetime,
    /// The most recent ~3 months.
    Recent,
}

impl Window {
    pub const ALL: [Window; 2] = [Window::Lifetime, Window::Recent];

    /// Column-name prefix of the window.
    pub const fn prefix(self) -> &'static str {
        match self {
            Window::Lifetime => "lifetime_",
            Window::Recent => "last3_months_",
        }
    }
}

/// One of the seven per-window metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    LotsSold,
    ActiveDays,
    SalesVelocity,
    LotsSoldDays,
    ConversionDays,
    NetDeliveredBuyers,
    NetDeliveredLots,
}

impl Metric {
    pub const ALL: [Metric; 7] = [
        Metric::LotsSold,
        Metric::ActiveDays,
        Metric::SalesVelocity,
        Metric::LotsSoldDays,
        Metric::ConversionDays,
        Metric::NetDeliveredBuyers,
        Metric::NetDeliveredLots,
    ];

    /// Column-name suffix of the metric.
    pub const fn suffix(self) -> &'static str {
        match self {
            Metric::LotsSold => "lots_sold",
            Metric::ActiveDays => "active_days",
            Metric::SalesVelocity => "sales_velocity",
            Metric::LotsSoldDays => "lots_sold_days",
            Metric::ConversionDays => "conversion_days",
            Metric::NetDeliveredBuyers => "net_delivered_buyers",
            Metric::NetDeliveredLots => "net_delivered_lots",
        }
    }

    /// Full column name, e.g. `last3_months_sales_velocity`.
    pub fn column(self, window: Window) -> String {
        format!("{}{}", window.prefix(), self.suffix())
    }
}

// =============================================================================
// NORMALIZED METRICS
// =============================================================================

/// The seven metrics of one window. Each is finite and `>= 0`, or NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowMetrics {
    pub lots_sold: f64,
    pub active_days: f64,
    pub sales_velocity: f64,
    pub lots_sold_days: f64,
    pub conversion_days: f64,
    pub net_delivered_buyers: f64,
    pub net_delivered_lots: f64,
}

impl WindowMetrics {
    /// Every metric NaN.
    pub const MISSING: Self = Self {
        lots_sold: f64::NAN,
        active_days: f64::NAN,
        sales_velocity: f64::NAN,
        lots_sold_days: f64::NAN,
        conversion_days: f64::NAN,
        net_delivered_buyers: f64::NAN,
        net_delivered_lots: f64::NAN,
    };

    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::LotsSold => self.lots_sold,
            Metric::ActiveDays => self.active_days,
            Metric::SalesVelocity => self.sales_velocity,
            Metric::LotsSoldDays => self.lots_sold_days,
            Metric::ConversionDays => self.conversion_days,
            Metric::NetDeliveredBuyers => self.net_delivered_buyers,
            Metric::NetDeliveredLots => self.net_delivered_lots,
        }
    }

    fn set(&mut self, metric: Metric, value: f64) {
        let slot = match metric {
            Metric::LotsSold => &mut self.lots_sold,
            Metric::ActiveDays => &mut self.active_days,
            Metric::SalesVelocity => &mut self.sales_velocity,
            Metric::LotsSoldDays => &mut self.lots_sold_days,
            Metric::ConversionDays => &mut self.conversion_days,
            Metric::NetDeliveredBuyers => &mut self.net_delivered_buyers,
            Metric::NetDeliveredLots => &mut self.net_delivered_lots,
        };
        *slot = value;
    }
}

impl Default for WindowMetrics {
    fn default() -> Self {
        Self::MISSING
    }
}

/// Normalized metrics of one SKU.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SkuMetrics {
    pub lifetime: WindowMetrics,
    pub recent: WindowMetrics,
}

impl SkuMetrics {
    pub fn window(&self, window: Window) -> &WindowMetrics {
        match window {
            Window::Lifetime => &self.lifetime,
            Window::Recent => &self.recent,
        }
    }
}

// =============================================================================
// PARSING
// =============================================================================

/// Outcome of reading one metric cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Parsed {
    Missing,
    Value(f64),
    NonNumeric,
    OutOfDomain(f64),
}

/// Parse a metric cell. Whitespace is ignored; `NaN`, `NA` and `null` count
/// as missing, the way dataframe exports write empty numeric cells.
pub fn parse_metric(raw: &str) -> Parsed {
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("nan")
        || trimmed.eq_ignore_ascii_case("na")
        || trimmed.eq_ignore_ascii_case("null")
    {
        return Parsed::Missing;
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_nan() => Parsed::Missing,
        Ok(value) if !value.is_finite() || value < 0.0 => Parsed::OutOfDomain(value),
        // -0.0 is a valid zero
        Ok(value) => Parsed::Value(value.abs()),
        Err(_) => Parsed::NonNumeric,
    }
}

// =============================================================================
// NORMALIZATION
// =============================================================================

/// Ratio metrics and the numerator each one is derived from.
const RATIOS: [(Metric, Metric); 2] = [
    (Metric::SalesVelocity, Metric::LotsSold),
    (Metric::ConversionDays, Metric::LotsSoldDays),
];

/// `numerator / denominator`, or NaN unless the denominator is `> 0`.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        f64::NAN
    }
}

/// Normalize one window.
///
/// `raw` is indexed like [`Metric::ALL`]; `None` means the column is absent
/// from the dataset. Findings are recorded against `row`.
pub fn normalize_window(
    window: Window,
    raw: [Option<&str>; 7],
    row: usize,
    diagnostics: &mut Diagnostics,
) -> WindowMetrics {
    let mut metrics = WindowMetrics::MISSING;

    for (metric, cell) in Metric::ALL.into_iter().zip(raw) {
        let Some(cell) = cell else { continue };
        let value = match parse_metric(cell) {
            Parsed::Value(value) => value,
            Parsed::Missing => f64::NAN,
            Parsed::NonNumeric => {
                diagnostics.push(
                    row,
                    metric.column(window),
                    DiagnosticKind::NonNumeric {
                        raw: cell.trim().to_string(),
                    },
                );
                f64::NAN
            }
            Parsed::OutOfDomain(value) => {
                diagnostics.push(row, metric.column(window), DiagnosticKind::OutOfDomain { value });
                f64::NAN
            }
        };
        metrics.set(metric, value);
    }

    let active_days = metrics.active_days;
    if active_days > 0.0 {
        for (ratio, numerator) in RATIOS {
            if metrics.get(ratio).is_nan() {
                let derived = safe_ratio(metrics.get(numerator), active_days);
                if derived.is_infinite() {
                    diagnostics.push(
                        row,
                        ratio.column(window),
                        DiagnosticKind::OutOfDomain { value: derived },
                    );
                    metrics.set(ratio, f64::NAN);
                } else {
                    metrics.set(ratio, derived);
                }
            }
        }
    } else {
        if active_days == 0.0 {
            diagnostics.push(
                row,
                Metric::ActiveDays.column(window),
                DiagnosticKind::ZeroActiveDays,
            );
        }
        for (ratio, _) in RATIOS {
            metrics.set(ratio, f64::NAN);
        }
    }

    metrics
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn raw<'a>(cells: [&'a str; 7]) -> [Option<&'a str>; 7] {
        cells.map(Some)
    }

    #[test]
    fn column_names() {
        assert_eq!(Metric::SalesVelocity.column(Window::Recent), "last3_months_sales_velocity");
        assert_eq!(Metric::ActiveDays.column(Window::Lifetime), "lifetime_active_days");
    }

    #[test]
    fn parse_cells() {
        assert_eq!(parse_metric(" 12.5 "), Parsed::Value(12.5));
        assert_eq!(parse_metric(""), Parsed::Missing);
        assert_eq!(parse_metric("NaN"), Parsed::Missing);
        assert_eq!(parse_metric("null"), Parsed::Missing);
        assert_eq!(parse_metric("abc"), Parsed::NonNumeric);
        assert_eq!(parse_metric("-4"), Parsed::OutOfDomain(-4.0));
        assert!(matches!(parse_metric("inf"), Parsed::OutOfDomain(_)));
        assert_eq!(parse_metric("-0"), Parsed::Value(0.0));
    }

    #[test]
    fn derives_missing_ratios() {
        let mut diagnostics = Diagnostics::new();
        let metrics = normalize_window(
            Window::Recent,
            raw(["90", "60", "", "30", "", "40", "95"]),
            0,
            &mut diagnostics,
        );
        assert_eq!(metrics.sales_velocity, 1.5);
        assert_eq!(metrics.conversion_days, 0.5);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn keeps_supplied_ratios() {
        let mut diagnostics = Diagnostics::new();
        let metrics = normalize_window(
            Window::Lifetime,
            raw(["90", "60", "2.0", "30", "0.25", "40", "95"]),
            0,
            &mut diagnostics,
        );
        assert_eq!(metrics.sales_velocity, 2.0);
        assert_eq!(metrics.conversion_days, 0.25);
    }

    #[test]
    fn zero_active_days_forces_nan_ratios() {
        let mut diagnostics = Diagnostics::new();
        let metrics = normalize_window(
            Window::Recent,
            raw(["10", "0", "1.2", "5", "0.4", "3", "10"]),
            7,
            &mut diagnostics,
        );
        assert!(metrics.sales_velocity.is_nan());
        assert!(metrics.conversion_days.is_nan());
        assert_eq!(metrics.lots_sold, 10.0);
        assert_eq!(diagnostics.len(), 1);
        let first = diagnostics.iter().next();
        assert_eq!(first.map(|d| d.row), Some(7));
        assert_eq!(first.map(|d| d.kind.clone()), Some(DiagnosticKind::ZeroActiveDays));
    }

    #[test]
    fn missing_active_days_forces_nan_ratios_silently() {
        let mut diagnostics = Diagnostics::new();
        let metrics = normalize_window(
            Window::Recent,
            raw(["10", "", "", "5", "", "3", "10"]),
            0,
            &mut diagnostics,
        );
        assert!(metrics.sales_velocity.is_nan());
        assert!(metrics.conversion_days.is_nan());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn absent_columns_are_nan() {
        let mut diagnostics = Diagnostics::new();
        let metrics = normalize_window(
            Window::Lifetime,
            [Some("10"), Some("20"), None, None, None, Some("4"), None],
            0,
            &mut diagnostics,
        );
        assert_eq!(metrics.sales_velocity, 0.5);
        assert!(metrics.lots_sold_days.is_nan());
        assert!(metrics.conversion_days.is_nan());
        assert!(metrics.net_delivered_lots.is_nan());
    }

    #[test]
    fn bad_cells_are_recorded() {
        let mut diagnostics = Diagnostics::new();
        let metrics = normalize_window(
            Window::Lifetime,
            raw(["ten", "20", "", "-3", "", "4", ""]),
            2,
            &mut diagnostics,
        );
        assert!(metrics.lots_sold.is_nan());
        assert!(metrics.lots_sold_days.is_nan());
        assert!(metrics.sales_velocity.is_nan());
        let counts = diagnostics.count_by_kind();
        assert_eq!(counts.get("non_numeric"), Some(&1));
        assert_eq!(counts.get("out_of_domain"), Some(&1));
    }

    #[test]
    fn overflowing_ratio_is_out_of_domain() {
        let mut diagnostics = Diagnostics::new();
        let metrics = normalize_window(
            Window::Recent,
            raw(["1e308", "0.5", "", "30", "", "40", "95"]),
            4,
            &mut diagnostics,
        );
        assert!(metrics.sales_velocity.is_nan());
        assert_eq!(metrics.conversion_days, 60.0);
        assert_eq!(diagnostics.len(), 1);
        let first = diagnostics.iter().next();
        assert_eq!(first.map(|d| d.row), Some(4));
        assert_eq!(first.map(|d| d.field.as_str()), Some("last3_months_sales_velocity"));
        assert!(matches!(
            first.map(|d| &d.kind),
            Some(DiagnosticKind::OutOfDomain { value }) if value.is_infinite()
        ));
    }

    #[test]
    fn safe_ratio_guards_denominator() {
        assert_eq!(safe_ratio(3.0, 2.0), 1.5);
        assert!(safe_ratio(3.0, 0.0).is_nan());
        assert!(safe_ratio(3.0, f64::NAN).is_nan());
    }
}
