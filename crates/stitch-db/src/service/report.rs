//! Reporting queries: load the records, hand them to `stitch_core::reports`.

use chrono::{DateTime, Utc};

use stitch_core::reports::{self, ProcessRevenue, ProfitSummary};
use stitch_core::{Customization, LineItem, Order, Process};

use crate::error::DbResult;
use crate::storage::Storage;

#[derive(Debug, Clone)]
pub struct ReportService<S: Storage> {
    store: S,
}

impl<S: Storage> ReportService<S> {
    pub fn new(store: S) -> Self {
        ReportService { store }
    }

    /// Margin and money summary over active, non-cancelled orders.
    pub async fn profit_summary(&self) -> DbResult<ProfitSummary> {
        let orders: Vec<Order> = self.store.find_all_active().await?;
        Ok(reports::profit_summary(&orders))
    }

    /// Customization revenue per process kind, over active, non-cancelled
    /// orders.
    ///
    /// Deleted processes are still loaded so that revenue already earned
    /// with them keeps its kind.
    pub async fn revenue_by_process(&self) -> DbResult<Vec<ProcessRevenue>> {
        let processes: Vec<Process> = self.store.find_all().await?;
        let customizations: Vec<Customization> = self.store.find_all_active().await?;
        let items: Vec<LineItem> = self.store.find_all_active().await?;
        let orders: Vec<Order> = self.store.find_all_active().await?;
        Ok(reports::revenue_by_process(
            &processes,
            &customizations,
            &items,
            &orders,
        ))
    }

    /// Orders past their estimated delivery date, earliest first.
    pub async fn overdue_orders(&self, now: DateTime<Utc>) -> DbResult<Vec<Order>> {
        let orders: Vec<Order> = self.store.find_all_active().await?;
        Ok(reports::overdue_orders(&orders, now)
            .into_iter()
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShopConfig;
    use crate::service::{CatalogService, NewClient, NewCustomization, NewLineItem, NewOrder, NewProduct, OrderService};
    use crate::storage::MemoryStore;
    use chrono::Duration;
    use stitch_core::{CustomizationSpec, Money, OrderStatus, Percent, ProcessKind, SizeTier};

    #[tokio::test]
    async fn test_reports_over_stored_orders() {
        let store = MemoryStore::new();
        let catalog = CatalogService::new(store.clone());
        let orders = OrderService::new(store.clone(), ShopConfig::default());
        let reports = ReportService::new(store);

        let processes = catalog.install_default_processes().await.unwrap();
        let vinyl = processes
            .iter()
            .find(|p| p.kind() == ProcessKind::Vinyl)
            .unwrap();
        let ana = catalog
            .create_client(NewClient {
                name: "Ana".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let tee = catalog
            .create_product(NewProduct {
                name: "Basic tee".to_string(),
                category: "T-shirt".to_string(),
                base_price: Money::from_cents(5_000),
                description: None,
                sizes: vec![],
                colors: vec![],
            })
            .await
            .unwrap();

        let late = orders
            .create_order(NewOrder {
                client_id: ana.id.clone(),
                estimated_delivery: Some(Utc::now() - Duration::days(2)),
                profit_margin: Some(Percent::from_bps(2000)),
                ..Default::default()
            })
            .await
            .unwrap();
        let item = orders
            .add_line_item(
                &late.id,
                NewLineItem {
                    product_id: tee.id.clone(),
                    size: "L".to_string(),
                    color: "Black".to_string(),
                    quantity: 1,
                    unit_price: None,
                },
            )
            .await
            .unwrap();
        orders
            .add_customization(
                &item.id,
                NewCustomization {
                    process_id: vinyl.id.clone(),
                    quantity: 1,
                    spec: None,
                    unit_price: Some(Money::from_cents(1_200)),
                    position: None,
                },
            )
            .await
            .unwrap();

        let cancelled = orders
            .create_order(NewOrder {
                client_id: ana.id.clone(),
                ..Default::default()
            })
            .await
            .unwrap();
        orders
            .change_status(&cancelled.id, OrderStatus::Cancelled)
            .await
            .unwrap();

        let summary = reports.profit_summary().await.unwrap();
        assert_eq!(summary.order_count, 1);
        assert_eq!(summary.average_margin, Percent::from_bps(2000));
        // 62.00 × 20%
        assert_eq!(summary.total_profit, Money::from_cents(1_240));

        let revenue = reports.revenue_by_process().await.unwrap();
        assert_eq!(revenue.len(), 4);
        let vinyl_revenue = revenue.iter().find(|r| r.kind == ProcessKind::Vinyl).unwrap();
        assert_eq!(vinyl_revenue.customization_count, 1);
        assert_eq!(vinyl_revenue.revenue, Money::from_cents(1_200));

        let overdue = reports.overdue_orders(Utc::now()).await.unwrap();
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].id, late.id);
    }

    #[tokio::test]
    async fn test_cancelled_order_leaves_process_revenue() {
        let store = MemoryStore::new();
        let catalog = CatalogService::new(store.clone());
        let orders = OrderService::new(store.clone(), ShopConfig::default());
        let reports = ReportService::new(store);

        let processes = catalog.install_default_processes().await.unwrap();
        let process = |kind: ProcessKind| processes.iter().find(|p| p.kind() == kind).unwrap();
        let ana = catalog
            .create_client(NewClient {
                name: "Ana".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let tee = catalog
            .create_product(NewProduct {
                name: "Basic tee".to_string(),
                category: "T-shirt".to_string(),
                base_price: Money::from_cents(5_000),
                description: None,
                sizes: vec![],
                colors: vec![],
            })
            .await
            .unwrap();

        let order = orders
            .create_order(NewOrder {
                client_id: ana.id.clone(),
                ..Default::default()
            })
            .await
            .unwrap();
        let item = orders
            .add_line_item(
                &order.id,
                NewLineItem {
                    product_id: tee.id.clone(),
                    size: "M".to_string(),
                    color: "White".to_string(),
                    quantity: 7,
                    unit_price: None,
                },
            )
            .await
            .unwrap();
        for (kind, spec) in [
            (
                ProcessKind::Dtf,
                CustomizationSpec::RollPrint {
                    width_cm: 10.0,
                    height_cm: 10.0,
                },
            ),
            (
                ProcessKind::Embroidery,
                CustomizationSpec::Embroidery {
                    tier: SizeTier::Large,
                    include_setup: true,
                },
            ),
        ] {
            orders
                .add_customization(
                    &item.id,
                    NewCustomization {
                        process_id: process(kind).id.clone(),
                        quantity: 3,
                        spec: Some(spec),
                        unit_price: None,
                        position: None,
                    },
                )
                .await
                .unwrap();
        }

        let revenue = reports.revenue_by_process().await.unwrap();
        assert_eq!(revenue[0].revenue, Money::from_cents(20_000));
        assert_eq!(
            revenue
                .iter()
                .find(|r| r.kind == ProcessKind::Embroidery)
                .unwrap()
                .revenue,
            Money::from_cents(29_000)
        );

        orders
            .change_status(&order.id, OrderStatus::Cancelled)
            .await
            .unwrap();

        assert!(reports.profit_summary().await.unwrap().total_revenue.is_zero());
        let revenue = reports.revenue_by_process().await.unwrap();
        assert!(revenue.iter().all(|r| r.customization_count == 0));
        assert!(revenue.iter().all(|r| r.revenue.is_zero()));
    }
}
