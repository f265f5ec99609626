use crate::events::{ActionRequest, ActionResult, Notification};
use crate::services::ActionExecutor;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Запрос в очереди вместе с каналом для ответа
struct Job {
    request: ActionRequest,
    reply: oneshot::Sender<ActionResult>,
}

/// Единая очередь действий: нажатия разных запросов никогда не перемешиваются,
/// следующее действие начинается только после завершения предыдущего.
#[derive(Clone)]
pub struct ActionQueue {
    sender: mpsc::Sender<Job>,
}

impl ActionQueue {
    /// Запустить обработчик очереди. Он завершается, когда закрыты все
    /// копии `ActionQueue`, предварительно доделав уже принятые действия.
    pub fn spawn(
        executor: ActionExecutor,
        notifier: broadcast::Sender<Notification>,
        capacity: usize,
    ) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(capacity);
        let handle = tokio::spawn(worker(executor, receiver, notifier));
        (Self { sender }, handle)
    }

    pub async fn submit(&self, request: ActionRequest) -> ActionResult {
        let (reply, response) = oneshot::channel();

        if self.sender.send(Job { request, reply }).await.is_err() {
            return ActionResult::failure("action queue is closed");
        }

        response
            .await
            .unwrap_or_else(|_| ActionResult::failure("action worker stopped"))
    }
}

async fn worker(
    executor: ActionExecutor,
    mut receiver: mpsc::Receiver<Job>,
    notifier: broadcast::Sender<Notification>,
) {
    info!("Очередь действий запущена");

    while let Some(Job { request, reply }) = receiver.recv().await {
        let result = executor.execute(&request).await;

        if reply.send(result.clone()).is_err() {
            debug!("Клиент ушёл до получения результата '{}'", request.kind);
        }

        let notification = match &result.error {
            None => Notification::ActionSucceeded { action: request.clone() },
            Some(error) => Notification::ActionFailed {
                action: request.clone(),
                error: error.clone(),
            },
        };
        notification.publish(&notifier);

        if result.success && request.kind == "model" {
            if let Some(model) = request.model {
                Notification::ModelChanged { model }.publish(&notifier);
            }
        }
    }

    info!("Очередь действий завершена");
}
