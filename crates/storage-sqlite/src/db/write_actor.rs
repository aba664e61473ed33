use super::DbPool;
use crate::errors::IntoCore;
use cashflow_core::errors::{DatabaseError, Error, Result};
use diesel::result::Error as DieselError;
use diesel::{Connection, SqliteConnection};
use log::{debug, error};
use std::any::Any;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

// A job runs against the writer's connection and reports a core Result,
// which is what callers expect.
type Job<T> = Box<dyn FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static>;

type ErasedJob = Job<Box<dyn Any + Send + 'static>>;
type ErasedReply = oneshot::Sender<Result<Box<dyn Any + Send + 'static>>>;

/// Handle for sending jobs to the writer actor.
#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::Sender<(ErasedJob, ErasedReply)>,
}

impl WriteHandle {
    /// Executes `job` on the writer's dedicated connection inside one
    /// `BEGIN IMMEDIATE` transaction. An `Err` from the job, or a failed
    /// commit, rolls back everything the job wrote.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static + Any,
    {
        let (ret_tx, ret_rx) = oneshot::channel();

        self.tx
            .send((
                Box::new(move |c| job(c).map(|v| Box::new(v) as Box<dyn Any + Send>)),
                ret_tx,
            ))
            .await
            .map_err(|_| writer_stopped())?;

        let boxed = ret_rx.await.map_err(|_| writer_stopped())??;
        boxed
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| Error::Unexpected("Writer actor returned an unexpected type".to_string()))
    }
}

fn writer_stopped() -> Error {
    Error::Database(DatabaseError::Internal(
        "Database writer is no longer running".to_string(),
    ))
}

/// Runs `job` inside an immediate transaction, keeping the job's own error
/// instead of the rollback marker diesel reports for it.
fn run_immediate(conn: &mut SqliteConnection, job: ErasedJob) -> Result<Box<dyn Any + Send + 'static>> {
    let mut job_error = None;
    let outcome = conn.immediate_transaction::<_, DieselError, _>(|c| {
        job(c).map_err(|e| {
            job_error = Some(e);
            DieselError::RollbackTransaction
        })
    });

    match (outcome, job_error) {
        (_, Some(e)) => Err(e),
        (Ok(value), None) => Ok(value),
        (Err(e), None) => {
            error!("Write transaction failed: {}", e);
            Err(Error::Database(DatabaseError::TransactionFailed(e.to_string())))
        }
    }
}

/// Spawns a background Tokio task that acts as the single writer to the
/// database. It owns one pooled connection and processes jobs serially.
pub fn spawn_writer(pool: Arc<DbPool>) -> Result<WriteHandle> {
    let (tx, mut rx) = mpsc::channel::<(ErasedJob, ErasedReply)>(1024);
    let mut conn = pool.get().into_core()?;

    tokio::spawn(async move {
        while let Some((job, reply_tx)) = rx.recv().await {
            let result = run_immediate(&mut conn, job);
            // The requester may have gone away; the write itself still stands.
            let _ = reply_tx.send(result);
        }
        debug!("Database writer stopped: every handle was dropped");
    });

    Ok(WriteHandle { tx })
}
