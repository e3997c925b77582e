use std::result::Result;
use std::sync::Arc;

use async_trait::async_trait;
use mysql_async::prelude::{Query, Queryable, WithParams};
use mysql_async::{Conn, IsolationLevel, Params, Row, TxOpts};

use delivery_common::error::AppErrorCode;
use delivery_common::logging::{app_log_event, AppLogLevel};

use super::super::{AbstractOrderRepo, AppRepoError, AppRepoErrorDetail, AppRepoErrorFnLabel};
use super::order_converter::{
    order_from_row, parcel_from_row, InsertOrderTreeArgs, RowParseError,
    FETCH_ORDER_STMT, FETCH_PARCELS_STMT, FETCH_PARCEL_BY_ID_STMT,
    RESOLVE_SHORT_ID_STMT,
};
use crate::adapter::datastore::{AppDStoreMariaDB, AppDataStoreContext};
use crate::model::{BulkOrderModel, OrderModel, OrderStatus, ParcelModel};

pub(crate) struct MariadbOrderRepo {
    _dstore: Arc<AppDStoreMariaDB>,
}

impl MariadbOrderRepo {
    pub(crate) async fn new(ds: Arc<AppDataStoreContext>) -> Result<Self, AppRepoError> {
        ds.mariadb(None)
            .map(|found| Self { _dstore: found })
            .ok_or(AppRepoError {
                fn_label: AppRepoErrorFnLabel::InitRepo,
                code: AppErrorCode::MissingDataStore,
                detail: AppRepoErrorDetail::Unknown,
            })
    }

    fn _map_err(&self, fn_label: AppRepoErrorFnLabel, detail: AppRepoErrorDetail) -> AppRepoError {
        let e = AppRepoError {
            fn_label,
            code: AppErrorCode::Unknown,
            detail,
        };
        let logctx = self._dstore.log_context();
        app_log_event!(logctx, AppLogLevel::ERROR, "{:?}", e);
        e
    }

    fn _map_row_err(&self, fn_label: AppRepoErrorFnLabel, value: RowParseError) -> AppRepoError {
        let (code, detail) = value;
        let e = AppRepoError {
            fn_label,
            code,
            detail,
        };
        let logctx = self._dstore.log_context();
        app_log_event!(logctx, AppLogLevel::ERROR, "{:?}", e);
        e
    }

    async fn _acquire(&self, fn_label: AppRepoErrorFnLabel) -> Result<Conn, AppRepoError> {
        self._dstore
            .acquire()
            .await
            .map_err(|e| self._map_err(fn_label, AppRepoErrorDetail::DataStore(e)))
    }

    async fn _run_update(
        &self,
        fn_label: AppRepoErrorFnLabel,
        stmt: &str,
        params: Params,
    ) -> Result<u64, AppRepoError> {
        let mut conn = self._acquire(fn_label).await?;
        conn.exec_drop(stmt, params).await.map_err(|e| {
            self._map_err(fn_label, AppRepoErrorDetail::DatabaseExec(e.to_string()))
        })?;
        Ok(conn.affected_rows())
    }
} // end of impl MariadbOrderRepo

#[async_trait]
impl AbstractOrderRepo for MariadbOrderRepo {
    async fn create_order(
        &self,
        order: &OrderModel,
        parcels: &[ParcelModel],
        bulk: Option<&BulkOrderModel>,
    ) -> Result<(), AppRepoError> {
        let args = InsertOrderTreeArgs::from((order, parcels, bulk));
        let mut conn = self._acquire(AppRepoErrorFnLabel::CreateOrder).await?;
        let mut options = TxOpts::default();
        options.with_isolation_level(IsolationLevel::RepeatableRead);
        let mut tx = conn.start_transaction(options).await.map_err(|e| {
            self._map_err(
                AppRepoErrorFnLabel::CreateOrder,
                AppRepoErrorDetail::DatabaseTxStart(e.to_string()),
            )
        })?;
        for (stmt, params_iter) in args.0 {
            tx.exec_batch(stmt, params_iter).await.map_err(|e| {
                self._map_err(
                    AppRepoErrorFnLabel::CreateOrder,
                    AppRepoErrorDetail::DatabaseExec(e.to_string()),
                )
            })?;
        }
        tx.commit().await.map_err(|e| {
            self._map_err(
                AppRepoErrorFnLabel::CreateOrder,
                AppRepoErrorDetail::DatabaseTxCommit(e.to_string()),
            )
        })
    } // end of fn create_order

    async fn fetch_order(&self, oid: &str) -> Result<Option<OrderModel>, AppRepoError> {
        let mut conn = self._acquire(AppRepoErrorFnLabel::FetchOrder).await?;
        let params = Params::Positional(vec![oid.into()]);
        let maybe_row = FETCH_ORDER_STMT
            .with(params)
            .first::<Row, &mut Conn>(&mut conn)
            .await
            .map_err(|e| {
                self._map_err(
                    AppRepoErrorFnLabel::FetchOrder,
                    AppRepoErrorDetail::DatabaseQuery(e.to_string()),
                )
            })?;
        maybe_row
            .map(|row| {
                order_from_row(row)
                    .map_err(|re| self._map_row_err(AppRepoErrorFnLabel::FetchOrder, re))
            })
            .transpose()
    }

    async fn fetch_parcels(&self, oid: &str) -> Result<Vec<ParcelModel>, AppRepoError> {
        let mut conn = self._acquire(AppRepoErrorFnLabel::FetchParcels).await?;
        let params = Params::Positional(vec![oid.into()]);
        let rows = FETCH_PARCELS_STMT
            .with(params)
            .fetch::<Row, &mut Conn>(&mut conn)
            .await
            .map_err(|e| {
                self._map_err(
                    AppRepoErrorFnLabel::FetchParcels,
                    AppRepoErrorDetail::DatabaseQuery(e.to_string()),
                )
            })?;
        rows.into_iter()
            .map(|row| {
                parcel_from_row(row)
                    .map_err(|re| self._map_row_err(AppRepoErrorFnLabel::FetchParcels, re))
            })
            .collect()
    }

    async fn fetch_parcel(&self, parcel_id: &str) -> Result<Option<ParcelModel>, AppRepoError> {
        let mut conn = self._acquire(AppRepoErrorFnLabel::FetchParcels).await?;
        let params = Params::Positional(vec![parcel_id.into()]);
        let maybe_row = FETCH_PARCEL_BY_ID_STMT
            .with(params)
            .first::<Row, &mut Conn>(&mut conn)
            .await
            .map_err(|e| {
                self._map_err(
                    AppRepoErrorFnLabel::FetchParcels,
                    AppRepoErrorDetail::DatabaseQuery(e.to_string()),
                )
            })?;
        maybe_row
            .map(|row| {
                parcel_from_row(row)
                    .map_err(|re| self._map_row_err(AppRepoErrorFnLabel::FetchParcels, re))
            })
            .transpose()
    }

    async fn update_order_status(
        &self,
        oid: &str,
        status: &OrderStatus,
    ) -> Result<bool, AppRepoError> {
        // the status guard keeps webhook replays from re-triggering
        // downstream effects
        let stmt = "UPDATE `orders` SET `status`=? WHERE `id`=? AND `status`<>?";
        let params = Params::Positional(vec![
            status.as_str().into(),
            oid.into(),
            status.as_str().into(),
        ]);
        let nrows = self
            ._run_update(AppRepoErrorFnLabel::UpdateOrderStatus, stmt, params)
            .await?;
        Ok(nrows > 0)
    }

    async fn update_parcel_statuses(
        &self,
        oid: &str,
        status: &OrderStatus,
    ) -> Result<(), AppRepoError> {
        let stmt = "UPDATE `parcels` SET `status`=? WHERE `order_id`=?";
        let params = Params::Positional(vec![status.as_str().into(), oid.into()]);
        let _nrows = self
            ._run_update(AppRepoErrorFnLabel::UpdateParcelStatus, stmt, params)
            .await?;
        Ok(())
    }

    async fn update_order_shipment_ref(
        &self,
        oid: &str,
        delivery_job_id: &str,
    ) -> Result<(), AppRepoError> {
        let stmt = "UPDATE `orders` SET `detrack_id`=? WHERE `id`=?";
        let params = Params::Positional(vec![delivery_job_id.into(), oid.into()]);
        let _nrows = self
            ._run_update(AppRepoErrorFnLabel::UpdateShipmentRef, stmt, params)
            .await?;
        Ok(())
    }

    async fn update_parcel_job_ref(
        &self,
        parcel_id: &str,
        job_id: &str,
    ) -> Result<(), AppRepoError> {
        let stmt = "UPDATE `parcels` SET `detrack_job_id`=? WHERE `id`=?";
        let params = Params::Positional(vec![job_id.into(), parcel_id.into()]);
        let _nrows = self
            ._run_update(AppRepoErrorFnLabel::UpdateShipmentRef, stmt, params)
            .await?;
        Ok(())
    }

    async fn update_parcel_item_ref(
        &self,
        parcel_id: &str,
        job_id: &str,
        item_id: &str,
    ) -> Result<(), AppRepoError> {
        let stmt = "UPDATE `parcels` SET `detrack_job_id`=?, `detrack_item_id`=? WHERE `id`=?";
        let params = Params::Positional(vec![job_id.into(), item_id.into(), parcel_id.into()]);
        let _nrows = self
            ._run_update(AppRepoErrorFnLabel::UpdateShipmentRef, stmt, params)
            .await?;
        Ok(())
    }

    async fn resolve_short_id(&self, short_id: &str) -> Result<Option<String>, AppRepoError> {
        let mut conn = self._acquire(AppRepoErrorFnLabel::ResolveShortId).await?;
        let params = Params::Positional(vec![short_id.to_lowercase().into()]);
        RESOLVE_SHORT_ID_STMT
            .with(params)
            .first::<String, &mut Conn>(&mut conn)
            .await
            .map_err(|e| {
                self._map_err(
                    AppRepoErrorFnLabel::ResolveShortId,
                    AppRepoErrorDetail::DatabaseQuery(e.to_string()),
                )
            })
    }
} // end of impl MariadbOrderRepo
