//! Session-change observer registry.
//!
//! Decoupled from any rendering layer: handlers only ever see
//! `Option<&UserAccount>`.

use crate::model::user::UserAccount;
use std::collections::BTreeMap;

/// Callback invoked with the signed-in user, or `None` after sign-out.
pub type SessionHandler = Box<dyn FnMut(Option<&UserAccount>)>;

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

/// Ordered set of session handlers.
///
/// Handlers run in subscription order.
#[derive(Default)]
pub struct SessionObservers {
    handlers: BTreeMap<SubscriptionId, SessionHandler>,
    next_id: u64,
}

impl SessionObservers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a handler and invokes it immediately with `current`.
    pub fn subscribe(
        &mut self,
        mut handler: SessionHandler,
        current: Option<&UserAccount>,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        handler(current);
        self.handlers.insert(id, handler);
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.handlers.remove(&id).is_some()
    }

    pub fn notify(&mut self, current: Option<&UserAccount>) {
        for handler in self.handlers.values_mut() {
            handler(current);
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::SessionObservers;
    use crate::model::user::UserAccount;
    use std::cell::RefCell;
    use std::rc::Rc;
    use uuid::Uuid;

    #[test]
    fn subscribe_invokes_handler_immediately_and_on_notify() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut observers = SessionObservers::new();

        let sink = Rc::clone(&seen);
        observers.subscribe(
            Box::new(move |user: Option<&UserAccount>| {
                sink.borrow_mut().push(user.map(|u| u.email.clone()))
            }),
            None,
        );
        assert_eq!(*seen.borrow(), vec![None]);
        assert_eq!(observers.len(), 1);

        let account = UserAccount {
            id: Uuid::new_v4(),
            email: "ana@example.com".to_string(),
        };
        observers.notify(Some(&account));
        assert_eq!(
            *seen.borrow(),
            vec![None, Some("ana@example.com".to_string())]
        );
    }

    #[test]
    fn unsubscribed_handlers_stop_receiving_updates() {
        let calls = Rc::new(RefCell::new(0));
        let mut observers = SessionObservers::new();

        let counter = Rc::clone(&calls);
        let id = observers.subscribe(
            Box::new(move |_: Option<&UserAccount>| *counter.borrow_mut() += 1),
            None,
        );
        assert!(observers.unsubscribe(id));
        assert!(!observers.unsubscribe(id));
        assert!(observers.is_empty());

        observers.notify(None);
        assert_eq!(*calls.borrow(), 1);
    }
}
