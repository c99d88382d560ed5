//! Background delivery of ticket notifications.
//!
//! Services push [`TicketNotification`]s into a bounded [`NotificationQueue`]
//! with `try_send` and never wait for delivery. A single tokio task drains the
//! queue and publishes each event to real-time subscribers straight away.
//! Emails go out on their own tasks, so a slow mail relay never holds back a
//! broadcast. Failures are logged and dropped; there is no retry.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

use crate::domain::TraceId;
use crate::domain::ports::{
    EmailTransport, NotificationSink, NotificationSinkError, TicketEventBus,
};
use crate::domain::{OutboundEmail, TicketEvent, TicketId, TicketNotification};

/// Queue capacity used when none is configured.
pub const DEFAULT_NOTIFICATION_QUEUE_CAPACITY: usize = 256;

/// Receiving half of the notification queue.
pub type NotificationReceiver = mpsc::Receiver<TicketNotification>;

/// Create a bounded queue; a zero capacity is raised to one.
pub fn notification_channel(capacity: usize) -> (NotificationQueue, NotificationReceiver) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    (NotificationQueue { sender }, receiver)
}

/// Sending half of the notification queue.
#[derive(Debug, Clone)]
pub struct NotificationQueue {
    sender: mpsc::Sender<TicketNotification>,
}

impl NotificationSink for NotificationQueue {
    fn enqueue(&self, notification: TicketNotification) -> Result<(), NotificationSinkError> {
        self.sender
            .try_send(notification)
            .map_err(|err| match err {
                mpsc::error::TrySendError::Full(_) => NotificationSinkError::queue_full(),
                mpsc::error::TrySendError::Closed(_) => NotificationSinkError::closed(),
            })
    }
}

/// Port bundle required by the dispatcher.
#[derive(Clone)]
pub struct NotificationDispatcherPorts {
    /// Outbound mail adapter.
    pub mailer: Arc<dyn EmailTransport>,
    /// Real-time fan-out adapter.
    pub events: Arc<dyn TicketEventBus>,
}

/// Email left to send once its event has been broadcast.
struct PendingEmail {
    trace_id: Option<TraceId>,
    event: &'static str,
    ticket_id: TicketId,
    email: OutboundEmail,
}

/// Turns notifications into a broadcast plus an email.
#[derive(Clone)]
pub struct NotificationDispatcher {
    ports: NotificationDispatcherPorts,
}

impl NotificationDispatcher {
    /// Build a dispatcher over the given ports.
    pub fn new(ports: NotificationDispatcherPorts) -> Self {
        Self { ports }
    }

    /// Broadcast one notification, then send its email, inside the trace
    /// scope the notification was created in.
    pub async fn dispatch(&self, notification: TicketNotification) {
        if let Some(pending) = self.broadcast(notification) {
            send_email(Arc::clone(&self.ports.mailer), pending).await;
        }
    }

    fn broadcast(&self, notification: TicketNotification) -> Option<PendingEmail> {
        let TicketNotification {
            trace_id,
            email,
            event,
        } = notification;
        match trace_id {
            Some(id) => TraceId::sync_scope(id, || self.publish(&event)),
            None => self.publish(&event),
        }
        email.map(|email| PendingEmail {
            trace_id,
            event: event.name(),
            ticket_id: event.ticket_id(),
            email,
        })
    }

    fn publish(&self, event: &TicketEvent) {
        let trace_id = TraceId::current().map(|id| id.to_string());
        let name = event.name();
        let ticket_id = event.ticket_id();
        match self.ports.events.publish(event) {
            Ok(receivers) => debug!(
                trace_id = trace_id.as_deref(),
                event = name,
                ticket_id = %ticket_id,
                receivers,
                "ticket event broadcast"
            ),
            Err(err) => warn!(
                trace_id = trace_id.as_deref(),
                event = name,
                ticket_id = %ticket_id,
                error = %err,
                "ticket event broadcast failed"
            ),
        }
    }

    fn hand_off(&self, notification: TicketNotification, emails: &mut JoinSet<()>) {
        if let Some(pending) = self.broadcast(notification) {
            emails.spawn(send_email(Arc::clone(&self.ports.mailer), pending));
        }
    }

    /// Start draining `receiver` on a tokio task.
    pub fn spawn(self, receiver: NotificationReceiver) -> DispatcherHandle {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(run(self, receiver, shutdown_rx));
        DispatcherHandle {
            shutdown: Some(shutdown_tx),
            task,
        }
    }
}

async fn send_email(mailer: Arc<dyn EmailTransport>, pending: PendingEmail) {
    let PendingEmail {
        trace_id,
        event,
        ticket_id,
        email,
    } = pending;
    let result = match trace_id {
        Some(id) => TraceId::scope(id, mailer.send(&email)).await,
        None => mailer.send(&email).await,
    };
    let trace_id = trace_id.map(|id| id.to_string());
    match result {
        Ok(()) => debug!(
            trace_id = trace_id.as_deref(),
            event,
            ticket_id = %ticket_id,
            subject = %email.subject,
            "notification email sent"
        ),
        Err(err) => warn!(
            trace_id = trace_id.as_deref(),
            event,
            ticket_id = %ticket_id,
            error = %err,
            "notification email failed"
        ),
    }
}

fn log_email_task(result: Result<(), JoinError>) {
    if let Err(err) = result {
        error!(error = %err, "notification email task failed");
    }
}

async fn run(
    dispatcher: NotificationDispatcher,
    mut receiver: NotificationReceiver,
    mut shutdown: oneshot::Receiver<()>,
) {
    info!("notification dispatcher started");
    let mut emails = JoinSet::new();
    loop {
        tokio::select! {
            biased;
            next = receiver.recv() => match next {
                Some(notification) => dispatcher.hand_off(notification, &mut emails),
                None => break,
            },
            Some(result) = emails.join_next(), if !emails.is_empty() => log_email_task(result),
            _ = &mut shutdown => {
                receiver.close();
                while let Some(notification) = receiver.recv().await {
                    dispatcher.hand_off(notification, &mut emails);
                }
                break;
            }
        }
    }
    while let Some(result) = emails.join_next().await {
        log_email_task(result);
    }
    info!("notification dispatcher stopped");
}

/// Owner handle for the running dispatcher task.
#[derive(Debug)]
pub struct DispatcherHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl DispatcherHandle {
    /// Stop accepting notifications, deliver what is queued or in flight,
    /// then wait for exit.
    pub async fn shutdown(mut self) {
        let already_stopped = self
            .shutdown
            .take()
            .is_some_and(|signal| signal.send(()).is_err());
        if already_stopped {
            debug!("notification dispatcher already stopped");
        }
        if let Err(err) = (&mut self.task).await {
            error!(error = %err, "notification dispatcher task failed");
        }
    }
}
