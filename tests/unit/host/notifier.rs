use super::*;

#[test]
fn listeners_run_on_notify_until_unsubscribed() {
    let notifier = DrawNotifier::new();
    let hits = Rc::new(Cell::new(0u32));

    let h = Rc::clone(&hits);
    let sub = notifier.subscribe(move || h.set(h.get() + 1));
    assert_eq!(notifier.listener_count(), 1);

    notifier.notify();
    notifier.notify();
    assert_eq!(hits.get(), 2);

    drop(sub);
    assert_eq!(notifier.listener_count(), 0);
    notifier.notify();
    assert_eq!(hits.get(), 2);
}

#[test]
fn dropping_one_subscription_keeps_the_others() {
    let notifier = DrawNotifier::new();
    let order = Rc::new(RefCell::new(Vec::new()));

    let o = Rc::clone(&order);
    let first = notifier.subscribe(move || o.borrow_mut().push("first"));
    let o = Rc::clone(&order);
    let _second = notifier.subscribe(move || o.borrow_mut().push("second"));

    notifier.notify();
    drop(first);
    notifier.notify();

    assert_eq!(*order.borrow(), vec!["first", "second", "second"]);
}

#[test]
fn subscription_outliving_notifier_drops_cleanly() {
    let notifier = DrawNotifier::new();
    let sub = notifier.subscribe(|| {});
    drop(notifier);
    drop(sub);
    drop(DrawSubscription::detached());
}
