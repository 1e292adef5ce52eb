use std::cell::RefCell;
use std::rc::Rc;

use super::*;

#[test]
fn update_notifies_every_subscriber_with_new_state() {
    let mut store = StoryStore::default();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let a = seen.clone();
    let b = seen.clone();
    store.subscribe(move |s| a.borrow_mut().push(format!("a:{}", s.title)));
    store.subscribe(move |s| b.borrow_mut().push(format!("b:{}", s.title)));

    store.update(|s| s.title = "Loop".into());
    assert_eq!(store.state().title, "Loop");
    assert_eq!(seen.borrow().as_slice(), &["a:Loop".to_string(), "b:Loop".to_string()]);
}

#[test]
fn unsubscribe_stops_notifications() {
    let mut store = StoryStore::default();
    let count = Rc::new(RefCell::new(0));
    let c = count.clone();
    let id = store.subscribe(move |_| *c.borrow_mut() += 1);
    store.update(|_| {});
    assert!(store.unsubscribe(id));
    assert!(!store.unsubscribe(id));
    store.replace(StoryState::default());
    assert_eq!(*count.borrow(), 1);
    assert_eq!(store.subscriber_count(), 0);
}
