use super::hub::EventHub;
use crate::error::{BridgeError, Result};
use crate::events::{ActionRequest, ActionResult, Notification, SystemMessage};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io;
use std::net::SocketAddr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc};
use tokio::time::{sleep, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Предел длины одной строки протокола
const MAX_LINE_BYTES: usize = 64 * 1024;

/// Пауза после ошибки accept (например, EMFILE), чтобы не крутиться вхолостую
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Сообщение от панели (одна строка JSON)
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Execute { id: u64, action: ActionRequest },
}

/// Сообщение панели (одна строка JSON)
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ServerMessage {
    Ack { id: u64, result: ActionResult },
    Event(Notification),
}

/// Источник входящих соединений
#[async_trait]
pub trait Acceptor: Send + Sync + 'static {
    async fn accept(&self) -> io::Result<(TcpStream, SocketAddr)>;
    fn local_addr(&self) -> io::Result<SocketAddr>;
}

#[async_trait]
impl Acceptor for TcpListener {
    async fn accept(&self) -> io::Result<(TcpStream, SocketAddr)> {
        TcpListener::accept(self).await
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        TcpListener::local_addr(self)
    }
}

/// Принимать подключения, пока не отменён `cancel`. Ошибки accept
/// не останавливают сервер.
pub async fn serve<A: Acceptor>(listener: A, hub: EventHub, cancel: CancellationToken) -> Result<()> {
    info!("Сервер слушает {}", listener.local_addr()?);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            accepted = listener.accept() => {
                let (stream, addr) = match accepted {
                    Ok(connection) => connection,
                    Err(e) => {
                        warn!("Не удалось принять подключение: {}", e);
                        sleep(ACCEPT_BACKOFF).await;
                        continue;
                    }
                };
                let hub = hub.clone();
                let cancel = cancel.child_token();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, addr, hub, cancel).await {
                        warn!("Соединение {} закрыто с ошибкой: {}", addr, e);
                    }
                });
            }
        }
    }

    info!("Сервер больше не принимает подключения");
    Ok(())
}

/// Одна входящая строка
#[derive(Debug, PartialEq, Eq)]
enum Frame {
    Line(String),
    Malformed(String),
}

/// Прочитать строку не длиннее `MAX_LINE_BYTES`. `None` - конец потока.
async fn read_frame<R>(reader: &mut R) -> io::Result<Option<Frame>>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let read = (&mut *reader)
        .take(MAX_LINE_BYTES as u64 + 1)
        .read_until(b'\n', &mut buf)
        .await?;
    if read == 0 {
        return Ok(None);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    } else if buf.len() > MAX_LINE_BYTES {
        skip_rest_of_line(reader).await?;
        return Ok(Some(Frame::Malformed(format!("line longer than {} bytes", MAX_LINE_BYTES))));
    }

    match String::from_utf8(buf) {
        Ok(line) => Ok(Some(Frame::Line(line))),
        Err(_) => Ok(Some(Frame::Malformed("invalid UTF-8".to_string()))),
    }
}

async fn skip_rest_of_line<R>(reader: &mut R) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let (consumed, done) = {
            let available = reader.fill_buf().await?;
            if available.is_empty() {
                return Ok(());
            }
            match available.iter().position(|&b| b == b'\n') {
                Some(pos) => (pos + 1, true),
                None => (available.len(), false),
            }
        };
        reader.consume(consumed);
        if done {
            return Ok(());
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    hub: EventHub,
    cancel: CancellationToken,
) -> Result<()> {
    info!("Панель подключилась: {}", addr);

    let (reader, mut writer) = stream.into_split();
    let (outgoing, mut outgoing_rx) = mpsc::channel::<ServerMessage>(64);

    let writer_task = tokio::spawn(async move {
        while let Some(message) = outgoing_rx.recv().await {
            let mut line = serde_json::to_string(&message)?;
            line.push('\n');
            writer.write_all(line.as_bytes()).await?;
        }
        Ok::<(), BridgeError>(())
    });

    // Чтение в отдельной задаче: read_until нельзя прерывать посреди строки
    let (frames_tx, mut frames) = mpsc::channel::<io::Result<Frame>>(16);
    let reader_task = tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        loop {
            let frame = match read_frame(&mut reader).await {
                Ok(Some(frame)) => Ok(frame),
                Ok(None) => break,
                Err(e) => Err(e),
            };
            let failed = frame.is_err();
            if frames_tx.send(frame).await.is_err() || failed {
                break;
            }
        }
    });

    let mut events = hub.subscribe();
    if let Some(greeting) = hub.greeting() {
        let _ = outgoing.send(ServerMessage::Event(greeting)).await;
    }

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            frame = frames.recv() => {
                match frame {
                    Some(Ok(Frame::Line(line))) => handle_line(&line, &hub, &outgoing).await,
                    Some(Ok(Frame::Malformed(reason))) => report_malformed(&reason, &outgoing).await,
                    Some(Err(e)) => return Err(e.into()),
                    None => break,
                }
            }
            event = events.recv() => {
                match event {
                    Ok(notification) => {
                        if outgoing.send(ServerMessage::Event(notification)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Панель {} не успевает за событиями, пропущено {}", addr, skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    reader_task.abort();
    drop(outgoing);
    match writer_task.await {
        Ok(result) => result?,
        Err(e) => debug!("Задача записи {} прервана: {}", addr, e),
    }

    info!("Панель отключилась: {}", addr);
    Ok(())
}

async fn handle_line(line: &str, hub: &EventHub, outgoing: &mpsc::Sender<ServerMessage>) {
    if line.trim().is_empty() {
        return;
    }

    match serde_json::from_str::<ClientMessage>(line) {
        Ok(ClientMessage::Execute { id, action }) => {
            debug!("Запрос действия #{}: {}", id, action.kind);
            // Ответ ждём отдельно, чтобы события продолжали доходить до панели
            let hub = hub.clone();
            let outgoing = outgoing.clone();
            tokio::spawn(async move {
                let result = hub.execute(action).await;
                let _ = outgoing.send(ServerMessage::Ack { id, result }).await;
            });
        }
        Err(e) => report_malformed(&e.to_string(), outgoing).await,
    }
}

/// Ответить панели ошибкой разбора; соединение остаётся открытым
async fn report_malformed(reason: &str, outgoing: &mpsc::Sender<ServerMessage>) {
    warn!("Некорректное сообщение от панели: {}", reason);
    let message = SystemMessage::error(format!("Malformed message: {}", reason));
    let _ = outgoing.send(ServerMessage::Event(Notification::System(message))).await;
}
