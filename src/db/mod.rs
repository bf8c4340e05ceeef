//! SQLite storage. The connection lives on one worker thread; async callers
//! ship closures to it and await the reply.

use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
    time::Duration,
};

use anyhow::{anyhow, Context, Result};
use log::{error, info, warn};
use rusqlite::Connection;
use tokio::sync::oneshot;

mod migrations;
pub mod repositories;

pub use repositories::kv::KeyValueStore;

use migrations::run_migrations;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

type Job = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

enum Request {
    Run(Job),
    Close,
}

/// Where the worker opens its connection.
enum Location {
    File(PathBuf),
    Memory,
}

impl Location {
    fn open(&self) -> Result<Connection> {
        let conn = match self {
            Location::File(path) => Connection::open(path)
                .with_context(|| format!("failed to open SQLite database {}", path.display()))?,
            Location::Memory => {
                Connection::open_in_memory().context("failed to open in-memory SQLite")?
            }
        };

        conn.busy_timeout(BUSY_TIMEOUT)
            .context("failed to set SQLite busy timeout")?;
        if let Location::File(_) = self {
            if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
                warn!("WAL journal unavailable, keeping default: {err}");
            }
        }
        Ok(conn)
    }
}

struct Worker {
    requests: mpsc::Sender<Request>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl Worker {
    /// Spawns the thread and waits until the schema is current.
    fn start(location: Location) -> Result<Self> {
        let (requests, inbox) = mpsc::channel::<Request>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<()>>();

        let thread = thread::Builder::new()
            .name("leafwatch-db".into())
            .spawn(move || {
                let mut conn = match location
                    .open()
                    .and_then(|mut conn| run_migrations(&mut conn).map(|_| conn))
                {
                    Ok(conn) => conn,
                    Err(err) => {
                        let _ = ready_tx.send(Err(err));
                        return;
                    }
                };
                if ready_tx.send(Ok(())).is_err() {
                    return;
                }

                for request in inbox {
                    match request {
                        Request::Run(job) => job(&mut conn),
                        Request::Close => break,
                    }
                }
                info!("Database worker stopped");
            })
            .context("failed to spawn database worker thread")?;

        ready_rx
            .recv()
            .context("database worker exited during startup")??;

        Ok(Self {
            requests,
            thread: Mutex::new(Some(thread)),
        })
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        let handle = match self.thread.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        let Some(handle) = handle else { return };

        if self.requests.send(Request::Close).is_err() {
            error!("Database worker already gone at shutdown");
        }
        if let Err(err) = handle.join() {
            error!("Database worker panicked: {err:?}");
        }
    }
}

/// Cheap to clone; the worker stops when the last clone is dropped.
#[derive(Clone)]
pub struct Database {
    worker: Arc<Worker>,
    path: Option<Arc<PathBuf>>,
}

impl Database {
    pub fn new(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }

        let worker = Worker::start(Location::File(path.clone()))?;
        info!("Database ready at {}", path.display());

        Ok(Self {
            worker: Arc::new(worker),
            path: Some(Arc::new(path)),
        })
    }

    /// Private database that disappears with the handle.
    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            worker: Arc::new(Worker::start(Location::Memory)?),
            path: None,
        })
    }

    /// `None` for in-memory databases.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref().map(PathBuf::as_path)
    }

    /// Runs `task` on the worker thread against the live connection.
    pub async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job: Job = Box::new(move |conn| {
            // The caller may have been cancelled; the work is done either way.
            let _ = reply_tx.send(task(conn));
        });

        self.worker
            .requests
            .send(Request::Run(job))
            .map_err(|_| anyhow!("database worker is not running"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("database worker dropped the request"))?
    }
}
