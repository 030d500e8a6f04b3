//! Stagnant inventory detection.
//!
//! An asset is stagnant when it is `in_stock` and has no flow record inside the
//! lookback window. Assets that have never had a flow record are always stagnant.

use crate::{
    entities::{Asset, AssetStatus, FlowRecord, asset, flow_record},
    errors::{Error, Result},
};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use sea_orm::{QueryOrder, QuerySelect, prelude::*};
use std::collections::HashSet;

/// Lookback window for stagnant detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagnantWindow {
    /// The last `n` days up to now
    Days(u32),
    /// Calendar dates, both ends inclusive
    Range {
        /// First day of the window
        start: NaiveDate,
        /// Last day of the window
        end: NaiveDate,
    },
}

impl StagnantWindow {
    /// Creates a date-range window, rejecting ranges that end before they start.
    pub fn range(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(Error::InvalidPayload {
                message: format!("stagnant window ends ({end}) before it starts ({start})"),
            });
        }
        Ok(Self::Range { start, end })
    }

    /// Resolves the window to a half-open `[from, to)` timestamp interval.
    ///
    /// # Errors
    /// `Error::InvalidPayload` when the window reaches outside the representable dates.
    pub fn bounds(&self, now: DateTime<Utc>) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
        let bounds = match *self {
            Self::Days(days) => TimeDelta::try_days(i64::from(days))
                .and_then(|length| now.checked_sub_signed(length))
                .zip(now.checked_add_signed(TimeDelta::nanoseconds(1))),
            Self::Range { start, end } => end.succ_opt().map(|after| {
                (
                    start.and_time(NaiveTime::MIN).and_utc(),
                    after.and_time(NaiveTime::MIN).and_utc(),
                )
            }),
        };
        bounds.ok_or_else(|| Error::InvalidPayload {
            message: format!("stagnant window {self:?} is out of range"),
        })
    }
}

/// In-stock assets with no flow activity in the window, ordered by code.
pub async fn compute_stagnant(
    db: &DatabaseConnection,
    window: &StagnantWindow,
) -> Result<Vec<asset::Model>> {
    compute_stagnant_at(db, window, Utc::now()).await
}

/// [`compute_stagnant`] evaluated at an explicit `now`.
pub async fn compute_stagnant_at(
    db: &DatabaseConnection,
    window: &StagnantWindow,
    now: DateTime<Utc>,
) -> Result<Vec<asset::Model>> {
    let (from, to) = window.bounds(now)?;
    let in_stock = Asset::find()
        .filter(asset::Column::Status.eq(AssetStatus::InStock))
        .order_by_asc(asset::Column::AssetCode)
        .all(db)
        .await?;
    if in_stock.is_empty() {
        return Ok(in_stock);
    }

    let active: HashSet<i64> = FlowRecord::find()
        .select_only()
        .column(flow_record::Column::AssetId)
        .filter(flow_record::Column::AssetId.is_in(in_stock.iter().map(|asset| asset.id)))
        .filter(flow_record::Column::OperationTime.gte(from))
        .filter(flow_record::Column::OperationTime.lt(to))
        .distinct()
        .into_tuple::<i64>()
        .all(db)
        .await?
        .into_iter()
        .collect();

    Ok(in_stock
        .into_iter()
        .filter(|asset| !active.contains(&asset.id))
        .collect())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::{
        ledger::execute_operation,
        operation::{Operation, ReturnDetails},
    };
    use crate::entities::OperationKind;
    use crate::test_utils::*;

    fn codes(assets: &[asset::Model]) -> Vec<&str> {
        assets.iter().map(|asset| asset.asset_code.as_str()).collect()
    }

    #[tokio::test]
    async fn test_old_inbound_is_stagnant_recent_return_is_not() -> Result<()> {
        let db = setup_test_db().await?;
        let now = Utc::now();
        let asset = insert_raw_asset(&db, "AST-001", AssetStatus::InStock).await?;
        insert_flow_at(&db, asset.id, OperationKind::Inbound, now - TimeDelta::days(120)).await?;

        let window = StagnantWindow::Days(90);
        let stagnant = compute_stagnant_at(&db, &window, now).await?;
        assert_eq!(codes(&stagnant), vec!["AST-001"]);

        insert_flow_at(&db, asset.id, OperationKind::Return, now - TimeDelta::days(10)).await?;
        let stagnant = compute_stagnant_at(&db, &window, now).await?;
        assert!(stagnant.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_asset_without_records_is_stagnant() -> Result<()> {
        let db = setup_test_db().await?;
        insert_raw_asset(&db, "AST-001", AssetStatus::InStock).await?;

        let stagnant = compute_stagnant(&db, &StagnantWindow::Days(90)).await?;
        assert_eq!(codes(&stagnant), vec!["AST-001"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_only_in_stock_assets_qualify() -> Result<()> {
        let db = setup_test_db().await?;
        let now = Utc::now();
        for (code, status) in [
            ("AST-001", AssetStatus::InUse),
            ("AST-002", AssetStatus::Scrapped),
            ("AST-003", AssetStatus::Maintenance),
            ("AST-004", AssetStatus::InStock),
        ] {
            let asset = insert_raw_asset(&db, code, status).await?;
            insert_flow_at(&db, asset.id, OperationKind::Inbound, now - TimeDelta::days(400))
                .await?;
        }

        let stagnant = compute_stagnant_at(&db, &StagnantWindow::Days(90), now).await?;
        assert_eq!(codes(&stagnant), vec!["AST-004"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_fresh_intake_is_not_stagnant_and_result_is_stable() -> Result<()> {
        let db = setup_test_db().await?;
        let fresh = create_test_asset(&db, "AST-001").await?;
        insert_raw_asset(&db, "AST-002", AssetStatus::InStock).await?;
        let window = StagnantWindow::Days(90);

        let first = compute_stagnant(&db, &window).await?;
        let second = compute_stagnant(&db, &window).await?;
        assert_eq!(first, second);
        assert_eq!(codes(&first), vec!["AST-002"]);

        execute_operation(&db, &test_operator(), &[fresh.id], &requisition_to("张三")?, None)
            .await?;
        execute_operation(
            &db,
            &test_operator(),
            &[fresh.id],
            &Operation::Return(ReturnDetails::default()),
            None,
        )
        .await?;
        assert_eq!(codes(&compute_stagnant(&db, &window).await?), vec!["AST-002"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_date_range_window_is_inclusive() -> Result<()> {
        let db = setup_test_db().await?;
        let asset = insert_raw_asset(&db, "AST-001", AssetStatus::InStock).await?;
        let day = NaiveDate::from_ymd_opt(2024, 3, 15).ok_or(Error::InvalidPayload {
            message: "bad date".to_string(),
        })?;
        let late_evening = day.and_hms_opt(23, 30, 0).map(|dt| dt.and_utc()).ok_or(
            Error::InvalidPayload {
                message: "bad time".to_string(),
            },
        )?;
        insert_flow_at(&db, asset.id, OperationKind::Inbound, late_evening).await?;

        let covering = StagnantWindow::range(day - TimeDelta::days(5), day)?;
        assert!(compute_stagnant(&db, &covering).await?.is_empty());

        let after = StagnantWindow::range(day + TimeDelta::days(1), day + TimeDelta::days(30))?;
        assert_eq!(codes(&compute_stagnant(&db, &after).await?), vec!["AST-001"]);

        assert!(StagnantWindow::range(day, day - TimeDelta::days(1)).is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_out_of_range_window_is_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        insert_raw_asset(&db, "AST-001", AssetStatus::InStock).await?;

        let too_long = compute_stagnant(&db, &StagnantWindow::Days(u32::MAX)).await;
        assert!(matches!(too_long, Err(Error::InvalidPayload { .. })));

        let last_day = StagnantWindow::range(NaiveDate::MIN, NaiveDate::MAX)?;
        let result = compute_stagnant(&db, &last_day).await;
        assert!(matches!(result, Err(Error::InvalidPayload { .. })));
        Ok(())
    }

    #[test]
    fn test_days_bounds_end_just_after_now() {
        let now = Utc::now();
        let (from, to) = StagnantWindow::Days(90).bounds(now).unwrap();
        assert_eq!(now - from, TimeDelta::days(90));
        assert!(to > now);
    }
}
