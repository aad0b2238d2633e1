mod support;

use inkind_ledger::views::ViewError;
use inkind_ledger::wire::NewOrder;
use inkind_ledger::{OrderStatus, ProcessStage, ProcessView, Session};
use support::seeded_backend;

#[tokio::test]
async fn selected_order_lead_time_tracks_edits() {
    let backend = seeded_backend();
    let mut view = ProcessView::new(backend.clone(), Session::admin());
    view.refresh().await.unwrap();

    assert_eq!(view.orders().len(), 2);
    assert_eq!(view.expected_lead_time(), None);

    let order = view.select(100).unwrap();
    assert_eq!(order.unit_quote_price(), 250_000);
    assert_eq!(order.margin_rate(), Some(20.0));
    assert_eq!(view.expected_lead_time(), Some(7.5));

    let lead_time = view
        .set_stage_hours(ProcessStage::Machining, Some(3.0))
        .unwrap();
    assert_eq!(lead_time, 10.5);
    let lead_time = view.set_stage_hours(ProcessStage::Design, None).unwrap();
    assert_eq!(lead_time, 8.5);
    assert_eq!(view.expected_lead_time(), Some(8.5));

    // nothing sent yet
    assert_eq!(
        backend
            .stored_order(100)
            .unwrap()
            .process_times
            .hours(ProcessStage::Design),
        Some(2.0)
    );
}

#[tokio::test]
async fn save_times_persists_and_keeps_selection() {
    let backend = seeded_backend();
    let mut view = ProcessView::new(backend.clone(), Session::admin());
    view.refresh().await.unwrap();
    view.select(100).unwrap();
    view.set_stage_hours(ProcessStage::Coating, Some(1.5))
        .unwrap();

    view.save_times().await.unwrap();

    let stored = backend.stored_order(100).unwrap();
    assert_eq!(stored.process_times.hours(ProcessStage::Coating), Some(1.5));
    assert_eq!(backend.request_count("PUT process/orders/100/times"), 1);
    assert_eq!(backend.request_count("GET process/orders"), 2);
    assert_eq!(view.selected().map(|order| order.id), Some(100));
    assert_eq!(view.expected_lead_time(), Some(9.0));
    assert!(!view.drain_notices()[0].is_error());
}

#[tokio::test]
async fn failed_save_times_keeps_local_hours() {
    let backend = seeded_backend();
    let mut view = ProcessView::new(backend.clone(), Session::admin());
    view.refresh().await.unwrap();
    view.select(100).unwrap();
    view.set_stage_hours(ProcessStage::Lsi, Some(4.0)).unwrap();

    backend.fail_writes(true);
    assert!(view.save_times().await.is_err());
    assert_eq!(view.expected_lead_time(), Some(11.5));
    assert!(view.notices()[0].is_error());
    assert_eq!(backend.request_count("GET process/orders"), 1);
}

#[tokio::test]
async fn selection_is_cleared_when_order_disappears() {
    let backend = seeded_backend();
    let mut view = ProcessView::new(backend.clone(), Session::viewer());
    view.refresh().await.unwrap();
    view.select(101).unwrap();

    backend.remove_order(101);
    view.refresh().await.unwrap();
    assert!(view.selected().is_none());
    assert!(matches!(
        view.set_stage_hours(ProcessStage::Design, Some(1.0)),
        Err(ViewError::NoSelection)
    ));
}

#[tokio::test]
async fn viewer_cannot_save_times() {
    let backend = seeded_backend();
    let mut view = ProcessView::new(backend.clone(), Session::viewer());
    view.refresh().await.unwrap();
    view.select(100).unwrap();
    view.set_stage_hours(ProcessStage::Bonding, Some(1.0))
        .unwrap();

    assert!(matches!(
        view.save_times().await,
        Err(ViewError::Forbidden(_))
    ));
    assert_eq!(backend.request_count("PUT process/orders/100/times"), 0);
}

#[tokio::test]
async fn unknown_order_cannot_be_selected() {
    let backend = seeded_backend();
    let mut view = ProcessView::new(backend, Session::admin());
    view.refresh().await.unwrap();

    assert!(matches!(view.select(7), Err(ViewError::UnknownOrder(7))));
    let in_progress: Vec<i64> = view.in_progress_orders().map(|order| order.id).collect();
    assert_eq!(in_progress, vec![101]);
    assert_eq!(view.orders()[1].status, OrderStatus::InProgress);
}

#[tokio::test]
async fn status_change_persists_and_refetches() {
    let backend = seeded_backend();
    let mut view = ProcessView::new(backend.clone(), Session::admin());
    view.refresh().await.unwrap();

    view.set_status(100, OrderStatus::Ordered).await.unwrap();

    assert_eq!(backend.stored_order(100).unwrap().status, OrderStatus::Ordered);
    assert_eq!(backend.request_count("PUT process/orders/100"), 1);
    assert_eq!(backend.request_count("GET process/orders"), 2);
    assert_eq!(view.orders()[0].status, OrderStatus::Ordered);
    assert!(!view.drain_notices()[0].is_error());
}

#[tokio::test]
async fn failed_status_change_keeps_local_status() {
    let backend = seeded_backend();
    let mut view = ProcessView::new(backend.clone(), Session::admin());
    view.refresh().await.unwrap();

    backend.fail_writes(true);
    let status = OrderStatus::from("보류");
    assert!(view.set_status(101, status.clone()).await.is_err());
    assert_eq!(view.orders()[1].status, status);
    assert_eq!(backend.stored_order(101).unwrap().status, OrderStatus::InProgress);
    assert!(view.notices()[0].is_error());
    assert_eq!(backend.request_count("GET process/orders"), 1);

    assert!(matches!(
        view.set_status(7, OrderStatus::Delivered).await,
        Err(ViewError::UnknownOrder(7))
    ));
}

#[tokio::test]
async fn viewer_cannot_change_status_or_register_orders() {
    let backend = seeded_backend();
    let mut view = ProcessView::new(backend.clone(), Session::viewer());
    view.refresh().await.unwrap();

    assert!(matches!(
        view.set_status(100, OrderStatus::Delivered).await,
        Err(ViewError::Forbidden(_))
    ));
    assert!(matches!(
        view.add_order(NewOrder::new("ACME", "Rotor")).await,
        Err(ViewError::Forbidden(_))
    ));
    assert_eq!(view.orders()[0].status, OrderStatus::Quoting);
    assert!(
        backend
            .requests()
            .iter()
            .all(|request| request.starts_with("GET"))
    );
}

#[tokio::test]
async fn registered_order_appears_after_refetch() {
    let backend = seeded_backend();
    let mut view = ProcessView::new(backend.clone(), Session::admin());
    view.refresh().await.unwrap();

    let mut request = NewOrder::new("Initech", "Rotor");
    request.quantity = 2;
    request.total_quote_price = 500.0;
    view.add_order(request).await.unwrap();

    assert_eq!(view.orders().len(), 3);
    let rotor = &view.orders()[2];
    assert_eq!(rotor.id, 102);
    assert_eq!(rotor.status, OrderStatus::Quoting);
    assert_eq!(rotor.unit_quote_price(), 250);

    let err = view.add_order(NewOrder::new(" ", "Rotor")).await.unwrap_err();
    assert!(matches!(err, ViewError::Invalid(_)));
    assert_eq!(backend.request_count("POST process/orders"), 1);
}

#[tokio::test]
async fn non_finite_hours_are_rejected() {
    let backend = seeded_backend();
    let mut view = ProcessView::new(backend, Session::admin());
    view.refresh().await.unwrap();
    view.select(100).unwrap();

    assert!(matches!(
        view.set_stage_hours(ProcessStage::Design, Some(f64::NAN)),
        Err(ViewError::Invalid(_))
    ));
    assert!(matches!(
        view.set_stage_hours(ProcessStage::Design, Some(f64::INFINITY)),
        Err(ViewError::Invalid(_))
    ));
    assert_eq!(view.expected_lead_time(), Some(7.5));
}

#[tokio::test]
async fn cleared_selection_blocks_stage_edits() {
    let backend = seeded_backend();
    let mut view = ProcessView::new(backend, Session::admin());
    view.refresh().await.unwrap();
    view.select(100).unwrap();

    view.clear_selection();
    assert!(view.selected().is_none());
    assert_eq!(view.expected_lead_time(), None);
    assert!(matches!(view.save_times().await, Err(ViewError::NoSelection)));
}
