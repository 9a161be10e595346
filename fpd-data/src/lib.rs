//! Data processing for fuel price series.
//!
//! This crate handles transforming aggregated series into forms
//! suitable for charting: aligning two monthly series on their month key
//! and deriving KPI deltas.

/// Month-key alignment of two independently aggregated series.
pub mod alignment {
    use chrono::NaiveDate;
    use serde::Serialize;
    use std::collections::BTreeMap;

    /// A single data point of a monthly series
    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct DataPoint {
        pub date: NaiveDate,
        pub value: f64,
    }

    /// One month of two aligned series. A side is `None` when that series
    /// has no observation for the month.
    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct AlignedPoint {
        pub date: NaiveDate,
        pub a: Option<f64>,
        pub b: Option<f64>,
    }

    impl AlignedPoint {
        /// `a - b`, or `None` when either side is missing.
        pub fn difference(&self) -> Option<f64> {
            match (self.a, self.b) {
                (Some(a), Some(b)) => Some(a - b),
                _ => None,
            }
        }
    }

    /// Outer-join two series on their date key.
    ///
    /// The result holds every date present in either input, ascending.
    /// Duplicate dates within one series keep the last value.
    pub fn align(a: &[DataPoint], b: &[DataPoint]) -> Vec<AlignedPoint> {
        let mut joined: BTreeMap<NaiveDate, (Option<f64>, Option<f64>)> = BTreeMap::new();
        for point in a {
            joined.entry(point.date).or_default().0 = Some(point.value);
        }
        for point in b {
            joined.entry(point.date).or_default().1 = Some(point.value);
        }
        let aligned: Vec<AlignedPoint> = joined
            .into_iter()
            .map(|(date, (a, b))| AlignedPoint { date, a, b })
            .collect();
        let gaps = aligned.iter().filter(|p| p.difference().is_none()).count();
        if gaps > 0 {
            log::debug!("alignment: {} of {} months present in only one series", gaps, aligned.len());
        }
        aligned
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn point(y: i32, m: u32, value: f64) -> DataPoint {
            DataPoint {
                date: NaiveDate::from_ymd_opt(y, m, 1).unwrap(),
                value,
            }
        }

        #[test]
        fn test_align_matching_months() {
            let a = vec![point(2021, 1, 5.0), point(2021, 2, 5.5)];
            let b = vec![point(2021, 1, 4.0), point(2021, 2, 5.0)];
            let aligned = align(&a, &b);
            assert_eq!(aligned.len(), 2);
            assert_eq!(aligned[0].difference(), Some(1.0));
            assert_eq!(aligned[1].difference(), Some(0.5));
        }

        #[test]
        fn test_align_is_key_based_not_positional() {
            // b is missing January; a positional subtraction would pair
            // a's January with b's February
            let a = vec![point(2021, 1, 5.0), point(2021, 2, 5.5), point(2021, 3, 6.0)];
            let b = vec![point(2021, 2, 5.0), point(2021, 3, 5.0)];
            let aligned = align(&a, &b);
            assert_eq!(aligned.len(), 3);
            assert_eq!(aligned[0].a, Some(5.0));
            assert_eq!(aligned[0].b, None);
            assert_eq!(aligned[0].difference(), None);
            assert_eq!(aligned[1].difference(), Some(0.5));
            assert_eq!(aligned[2].difference(), Some(1.0));
        }

        #[test]
        fn test_align_sorts_by_date() {
            let a = vec![point(2021, 3, 1.0), point(2021, 1, 1.0)];
            let b = vec![point(2020, 12, 1.0)];
            let dates: Vec<u32> = align(&a, &b)
                .iter()
                .map(|p| chrono::Datelike::month(&p.date))
                .collect();
            assert_eq!(dates, vec![12, 1, 3]);
        }

        #[test]
        fn test_align_empty() {
            assert!(align(&[], &[]).is_empty());
        }
    }
}

/// Key performance indicator helpers
pub mod kpi {
    /// Relative change from `reference` to `current`, in percent.
    ///
    /// Returns `None` when the reference is zero or not finite.
    pub fn percent_change(reference: f64, current: f64) -> Option<f64> {
        if reference == 0.0 || !reference.is_finite() || !current.is_finite() {
            return None;
        }
        Some((current - reference) / reference * 100.0)
    }

}
