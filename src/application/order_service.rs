use chrono::Utc;

use crate::domain::delivery::{DeliveryCalculator, DeliveryQuote};
use crate::domain::errors::DomainError;
use crate::domain::order::{
    compute_stats, generate_order_id, items_subtotal, normalize_order_id, CustomerInfo,
    NewOrder, Order, OrderFilter, OrderItem, OrderStats, OrderStatus,
};
use crate::domain::pincode::Pincode;
use crate::domain::ports::OrderRepository;

const MAX_ID_ATTEMPTS: usize = 3;

pub struct OrderService<R> {
    repo: R,
    id_prefix: String,
    delivery: DeliveryCalculator,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repo: R, id_prefix: impl Into<String>, delivery: DeliveryCalculator) -> Self {
        Self {
            repo,
            id_prefix: id_prefix.into(),
            delivery,
        }
    }

    /// Places an order priced with `quote`.
    ///
    /// `subtotal` must equal the sum of the item lines, and `quote` must be
    /// the one this service's calculator gives for the customer's pincode and
    /// that subtotal. The total is always `subtotal + quote.charge`.
    pub fn create_order(
        &self,
        mut customer: CustomerInfo,
        items: Vec<OrderItem>,
        subtotal: i64,
        quote: &DeliveryQuote,
    ) -> Result<Order, DomainError> {
        if !quote.valid {
            return Err(DomainError::InvalidDeliveryAddress);
        }
        if items.is_empty() {
            return Err(DomainError::EmptyCart);
        }
        customer.pincode = Pincode::parse(&customer.pincode)?.to_string();

        if let Some(bad) = items.iter().find(|i| i.quantity <= 0 || i.unit_price < 0) {
            return Err(DomainError::InvalidInput(format!(
                "item '{}' needs a positive quantity and a non-negative price",
                bad.name
            )));
        }
        let computed = items_subtotal(&items)?;
        if computed != subtotal {
            return Err(DomainError::InvalidInput(format!(
                "subtotal {subtotal} does not match item total {computed}"
            )));
        }
        if *quote != self.delivery.calculate(&customer.pincode, subtotal) {
            return Err(DomainError::InvalidInput(format!(
                "delivery quote does not match pincode {} and subtotal {subtotal}",
                customer.pincode
            )));
        }
        let total = subtotal
            .checked_add(quote.charge)
            .ok_or_else(|| DomainError::InvalidInput("order total is out of range".into()))?;

        let mut attempts = 0;
        loop {
            attempts += 1;
            let new_order = NewOrder {
                order_id: generate_order_id(&self.id_prefix, Utc::now()),
                customer: customer.clone(),
                items: items.clone(),
                subtotal,
                shipping: quote.charge,
                total,
                status: OrderStatus::Pending,
            };
            match self.repo.insert(new_order) {
                Ok(order) => {
                    log::info!(
                        "Order {} placed: {} item(s), total {}",
                        order.order_id,
                        order.items.len(),
                        order.total
                    );
                    return Ok(order);
                }
                Err(DomainError::DuplicateOrderId) if attempts < MAX_ID_ATTEMPTS => {
                    log::warn!("Order id collision, regenerating (attempt {attempts})");
                }
                Err(e) => {
                    log::error!("Failed to persist order: {e}");
                    return Err(e);
                }
            }
        }
    }

    /// Looks up an order by its public tracking id.
    pub fn get_order(&self, order_id: &str) -> Result<Order, DomainError> {
        self.repo
            .get_by_public_id(&normalize_order_id(order_id))?
            .ok_or(DomainError::UnknownOrder)
    }

    /// Orders matching `filter`, newest first.
    pub fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, DomainError> {
        let mut orders = self.repo.list_all()?;
        orders.retain(|o| filter.matches(o));
        Ok(orders)
    }

    /// Moves an order one step along the lifecycle, or cancels it.
    pub fn transition_status(
        &self,
        order_id: &str,
        next: OrderStatus,
    ) -> Result<Order, DomainError> {
        let order = self.get_order(order_id)?;
        if !order.status.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                from: order.status,
                to: next,
            });
        }
        let updated = self.repo.update_status(order.id, next)?;
        log::info!(
            "Order {} moved {} -> {}",
            updated.order_id,
            order.status,
            updated.status
        );
        Ok(updated)
    }

    /// Sets any status without checking the lifecycle.
    pub fn force_status(&self, order_id: &str, status: OrderStatus) -> Result<Order, DomainError> {
        let order = self.get_order(order_id)?;
        let updated = self.repo.update_status(order.id, status)?;
        log::warn!(
            "Order {} status overridden {} -> {}",
            updated.order_id,
            order.status,
            updated.status
        );
        Ok(updated)
    }

    pub fn stats(&self) -> Result<OrderStats, DomainError> {
        Ok(compute_stats(&self.repo.list_all()?))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use uuid::Uuid;

    use super::*;
    use crate::domain::delivery::DeliveryCalculator;
    use crate::infrastructure::local_store::LocalOrderRepository;

    fn service() -> OrderService<LocalOrderRepository> {
        OrderService::new(
            LocalOrderRepository::in_memory(),
            "FRY",
            DeliveryCalculator::default(),
        )
    }

    fn customer(pincode: &str) -> CustomerInfo {
        CustomerInfo {
            name: "Ravi Patel".to_string(),
            phone: "9898989898".to_string(),
            email: Some("ravi@example.com".to_string()),
            address: "4 Station Road".to_string(),
            city: "Surat".to_string(),
            pincode: pincode.to_string(),
            notes: Some("Ring twice".to_string()),
        }
    }

    fn items() -> Vec<OrderItem> {
        vec![
            OrderItem {
                name: "Soft Plush Teddy Bear".to_string(),
                unit_price: 549,
                quantity: 1,
            },
            OrderItem {
                name: "Baby Romper - Pink".to_string(),
                unit_price: 449,
                quantity: 2,
            },
        ]
    }

    fn place(svc: &OrderService<LocalOrderRepository>, pincode: &str) -> Order {
        let items = items();
        let subtotal = items_subtotal(&items).unwrap();
        let quote = DeliveryCalculator::default().calculate(pincode, subtotal);
        svc.create_order(customer(pincode), items, subtotal, &quote)
            .expect("create failed")
    }

    #[test]
    fn create_order_freezes_totals_and_starts_pending() {
        let svc = service();
        let order = place(&svc, "700001");

        assert_eq!(order.subtotal, 1447);
        assert_eq!(order.shipping, 80);
        assert_eq!(order.total, order.subtotal + order.shipping);
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.updated_at.is_none());
        assert!(order.order_id.starts_with("FRY-"));
    }

    #[test]
    fn local_order_over_threshold_ships_free() {
        let order = place(&service(), " 394210 ");
        assert_eq!(order.shipping, 0);
        assert_eq!(order.total, order.subtotal);
        assert_eq!(order.customer.pincode, "394210");
    }

    #[test]
    fn create_rejects_invalid_quote() {
        let svc = service();
        let quote = DeliveryCalculator::default().calculate("12345", 1447);
        let err = svc
            .create_order(customer("12345"), items(), 1447, &quote)
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidDeliveryAddress));
    }

    #[test]
    fn create_rejects_empty_cart() {
        let svc = service();
        let quote = DeliveryCalculator::default().calculate("394210", 0);
        let err = svc
            .create_order(customer("394210"), vec![], 0, &quote)
            .unwrap_err();
        assert!(matches!(err, DomainError::EmptyCart));
    }

    #[test]
    fn create_rejects_bad_customer_pincode() {
        let svc = service();
        let quote = DeliveryCalculator::default().calculate("394210", 1447);
        let err = svc
            .create_order(customer("39421"), items(), 1447, &quote)
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidPincodeFormat));
    }

    #[test]
    fn create_rejects_subtotal_mismatch_and_bad_lines() {
        let svc = service();
        let quote = DeliveryCalculator::default().calculate("394210", 1000);
        assert!(matches!(
            svc.create_order(customer("394210"), items(), 1000, &quote),
            Err(DomainError::InvalidInput(_))
        ));

        let mut lines = items();
        lines[0].quantity = 0;
        let subtotal = items_subtotal(&lines).unwrap();
        assert!(matches!(
            svc.create_order(customer("394210"), lines, subtotal, &quote),
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[test]
    fn create_rejects_prices_that_overflow() {
        let svc = service();
        let lines: Vec<OrderItem> = (0..4)
            .map(|i| OrderItem {
                name: format!("Gold crib {i}"),
                unit_price: 1 << 62,
                quantity: 1,
            })
            .collect();
        let quote = DeliveryCalculator::default().calculate("394210", 0);
        assert!(matches!(
            svc.create_order(customer("394210"), lines, 0, &quote),
            Err(DomainError::InvalidInput(_))
        ));

        let near_max = vec![OrderItem {
            name: "Gold crib".to_string(),
            unit_price: i64::MAX,
            quantity: 1,
        }];
        let rates = crate::domain::delivery::DeliveryRates {
            free_shipping_threshold: i64::MAX,
            ..Default::default()
        };
        let calc = DeliveryCalculator::new(Default::default(), rates);
        let svc = OrderService::new(LocalOrderRepository::in_memory(), "FRY", calc.clone());
        let quote = calc.calculate("700001", i64::MAX);
        assert!(matches!(
            svc.create_order(customer("700001"), near_max, i64::MAX, &quote),
            Err(DomainError::InvalidInput(_))
        ));
        assert!(svc.list_orders(&OrderFilter::default()).unwrap().is_empty());
    }

    #[test]
    fn create_rejects_quote_for_another_pincode() {
        let svc = service();
        let cheaper = DeliveryCalculator::default().calculate("394210", 1447);
        let err = svc
            .create_order(customer("700001"), items(), 1447, &cheaper)
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
        assert!(svc.list_orders(&OrderFilter::default()).unwrap().is_empty());
    }

    #[test]
    fn two_checkouts_give_two_orders() {
        let svc = service();
        let a = place(&svc, "394210");
        let b = place(&svc, "394210");
        assert_ne!(a.order_id, b.order_id);
        assert_ne!(a.id, b.id);
        assert_eq!(svc.list_orders(&OrderFilter::default()).unwrap().len(), 2);
    }

    #[test]
    fn get_order_normalises_tracking_id() {
        let svc = service();
        let order = place(&svc, "394210");
        let found = svc
            .get_order(&format!("  {}  ", order.order_id.to_lowercase()))
            .unwrap();
        assert_eq!(found.id, order.id);
    }

    #[test]
    fn get_unknown_order() {
        assert!(matches!(
            service().get_order("FRY-NOPE-0000000000"),
            Err(DomainError::UnknownOrder)
        ));
    }

    #[test]
    fn lifecycle_walks_forward_one_step_at_a_time() {
        let svc = service();
        let order = place(&svc, "394210");

        let err = svc
            .transition_status(&order.order_id, OrderStatus::Delivered)
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidTransition {
                from: OrderStatus::Pending,
                to: OrderStatus::Delivered
            }
        ));
        assert_eq!(
            svc.get_order(&order.order_id).unwrap().status,
            OrderStatus::Pending
        );

        for next in [
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
        ] {
            let updated = svc.transition_status(&order.order_id, next).unwrap();
            assert_eq!(updated.status, next);
            assert!(updated.updated_at.is_some());
            assert_eq!(updated.created_at, order.created_at);
        }

        assert!(matches!(
            svc.transition_status(&order.order_id, OrderStatus::Cancelled),
            Err(DomainError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn cancel_from_shipped() {
        let svc = service();
        let order = place(&svc, "380001");
        svc.transition_status(&order.order_id, OrderStatus::Processing)
            .unwrap();
        svc.transition_status(&order.order_id, OrderStatus::Shipped)
            .unwrap();
        let cancelled = svc
            .transition_status(&order.order_id, OrderStatus::Cancelled)
            .unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
    }

    #[test]
    fn transition_unknown_order() {
        assert!(matches!(
            service().transition_status("FRY-X-Y", OrderStatus::Processing),
            Err(DomainError::UnknownOrder)
        ));
    }

    #[test]
    fn force_status_skips_validation() {
        let svc = service();
        let order = place(&svc, "394210");
        let forced = svc
            .force_status(&order.order_id, OrderStatus::Delivered)
            .unwrap();
        assert_eq!(forced.status, OrderStatus::Delivered);
        let back = svc
            .force_status(&order.order_id, OrderStatus::Pending)
            .unwrap();
        assert_eq!(back.status, OrderStatus::Pending);
    }

    #[test]
    fn list_filters_and_stats() {
        let svc = service();
        let first = place(&svc, "394210");
        let second = place(&svc, "700001");
        svc.transition_status(&second.order_id, OrderStatus::Processing)
            .unwrap();

        let all = svc.list_orders(&OrderFilter::default()).unwrap();
        assert_eq!(all[0].order_id, second.order_id, "newest first");
        assert_eq!(all[1].order_id, first.order_id);

        let pending = svc
            .list_orders(&OrderFilter {
                status: Some(OrderStatus::Pending),
                customer_email: None,
            })
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].order_id, first.order_id);

        svc.force_status(&first.order_id, OrderStatus::Delivered)
            .unwrap();
        let stats = svc.stats().unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.processing, 1);
        assert_eq!(stats.delivered, 1);
        assert_eq!(stats.revenue, first.total);
    }

    /// Rejects the first `collisions` inserts as duplicates.
    struct CollidingRepo {
        inner: LocalOrderRepository,
        collisions: usize,
        calls: AtomicUsize,
        seen_ids: std::sync::Mutex<HashSet<String>>,
    }

    impl OrderRepository for CollidingRepo {
        fn insert(&self, order: NewOrder) -> Result<Order, DomainError> {
            self.seen_ids
                .lock()
                .unwrap()
                .insert(order.order_id.clone());
            if self.calls.fetch_add(1, Ordering::SeqCst) < self.collisions {
                return Err(DomainError::DuplicateOrderId);
            }
            self.inner.insert(order)
        }

        fn list_all(&self) -> Result<Vec<Order>, DomainError> {
            self.inner.list_all()
        }

        fn get_by_public_id(&self, order_id: &str) -> Result<Option<Order>, DomainError> {
            self.inner.get_by_public_id(order_id)
        }

        fn update_status(&self, id: Uuid, status: OrderStatus) -> Result<Order, DomainError> {
            self.inner.update_status(id, status)
        }
    }

    fn colliding(collisions: usize) -> Arc<CollidingRepo> {
        Arc::new(CollidingRepo {
            inner: LocalOrderRepository::in_memory(),
            collisions,
            calls: AtomicUsize::new(0),
            seen_ids: Default::default(),
        })
    }

    #[test]
    fn id_collision_is_retried_with_a_fresh_id() {
        let repo = colliding(2);
        let svc = OrderService::new(repo.clone(), "FRY", DeliveryCalculator::default());
        let quote = DeliveryCalculator::default().calculate("394210", 1447);
        svc.create_order(customer("394210"), items(), 1447, &quote)
            .unwrap();
        assert_eq!(repo.calls.load(Ordering::SeqCst), 3);
        assert_eq!(repo.seen_ids.lock().unwrap().len(), 3);
    }

    #[test]
    fn id_collision_gives_up_eventually() {
        let svc = OrderService::new(colliding(usize::MAX), "FRY", DeliveryCalculator::default());
        let quote = DeliveryCalculator::default().calculate("394210", 1447);
        assert!(matches!(
            svc.create_order(customer("394210"), items(), 1447, &quote),
            Err(DomainError::DuplicateOrderId)
        ));
    }

    struct DownRepo;

    impl OrderRepository for DownRepo {
        fn insert(&self, _: NewOrder) -> Result<Order, DomainError> {
            Err(DomainError::Store("connection refused".into()))
        }

        fn list_all(&self) -> Result<Vec<Order>, DomainError> {
            Err(DomainError::Store("connection refused".into()))
        }

        fn get_by_public_id(&self, _: &str) -> Result<Option<Order>, DomainError> {
            Err(DomainError::Store("connection refused".into()))
        }

        fn update_status(&self, _: Uuid, _: OrderStatus) -> Result<Order, DomainError> {
            Err(DomainError::Store("connection refused".into()))
        }
    }

    #[test]
    fn store_failures_surface_to_the_caller() {
        let svc = OrderService::new(DownRepo, "FRY", DeliveryCalculator::default());
        let quote = DeliveryCalculator::default().calculate("394210", 1447);
        assert!(matches!(
            svc.create_order(customer("394210"), items(), 1447, &quote),
            Err(DomainError::Store(_))
        ));
        assert!(matches!(svc.stats(), Err(DomainError::Store(_))));
        assert!(matches!(
            svc.get_order("FRY-A-B"),
            Err(DomainError::Store(_))
        ));
    }
}
