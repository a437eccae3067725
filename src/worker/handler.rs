//! The handler trait called by pool workers.

use std::future::Future;

/// Processes batches of items popped from a [`WorkerPoolQueue`].
///
/// `handle` receives up to `batch_length` items and returns the ones it
/// could not process; those are pushed back onto the queue.
///
/// # Example
///
/// ```ignore
/// struct MailSender { smtp: SmtpClient }
///
/// impl Handler<Mail> for MailSender {
///     fn handle(&self, items: Vec<Mail>) -> impl Future<Output = Vec<Mail>> + Send {
///         async move {
///             let mut failed = Vec::new();
///             for mail in items {
///                 if self.smtp.send(&mail).await.is_err() {
///                     failed.push(mail);
///                 }
///             }
///             failed
///         }
///     }
/// }
/// ```
///
/// [`WorkerPoolQueue`]: super::WorkerPoolQueue
pub trait Handler<T>: Send + Sync + 'static {
    /// Handles a batch, returning the unhandled items.
    fn handle(&self, items: Vec<T>) -> impl Future<Output = Vec<T>> + Send;
}
