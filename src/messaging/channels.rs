// Session to UI notification channel
//
// Single producer (the session), single consumer (the UI frame loop). A full
// buffer drops new messages instead of blocking playback.

use crate::messaging::notification::Notification;
use ringbuf::{HeapRb, traits::Split};

pub type NotificationProducer = ringbuf::HeapProd<Notification>;
pub type NotificationConsumer = ringbuf::HeapCons<Notification>;

/// Bounded channel holding at most `capacity` undelivered notifications
pub fn create_notification_channel(
    capacity: usize,
) -> (NotificationProducer, NotificationConsumer) {
    let rb = HeapRb::<Notification>::new(capacity);
    rb.split()
}
